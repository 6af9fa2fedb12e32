//! Integration tests for the package version lifecycle facade.

mod common;

use common::*;
use pkgvisor::{
    Config, CreateOptions, EventKind, ExternalSites, InFlightTracker, InstallOptions,
    InstallRequest, MemoryProject, OperationKind, PackageError, PackageId, PackageVersions,
    Platform, PollingPolicy, Project, RemoteError, RemoteStatus, SUPPORT_HINT, Subscribe,
    SubscriberVersionId, VersionCache, VersionChanges,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn policy(freq_s: u64, timeout_s: u64) -> PollingPolicy {
    PollingPolicy::new(Duration::from_secs(freq_s), Duration::from_secs(timeout_s))
}

fn create_options() -> CreateOptions {
    CreateOptions::new(PackageId::parse(PACKAGE_ID).unwrap())
}

// ─── create ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_create_round_trip_publishes_transitions_and_records_alias() {
    let platform = Arc::new(FakePlatform::default().with_create_statuses(&[
        "Queued",
        "InProgress",
        "Success",
    ]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let record = versions
        .create(&create_options(), Some(policy(1, 10)))
        .await
        .unwrap();

    assert_eq!(record.status, RemoteStatus::Success);
    assert_eq!(record.operation_id, CREATE_ID);
    assert_eq!(
        record.payload.subscriber_version_id.as_ref().map(|id| id.as_str()),
        Some(SUBSCRIBER_ID)
    );
    assert_eq!(
        record.payload.package_version_id.as_ref().map(|id| id.as_str()),
        Some(VERSION_ID)
    );

    let events = drain(&mut rx);
    assert_eq!(
        kinds(&events),
        vec![
            EventKind::Submitted,
            EventKind::Enqueued,
            EventKind::Progress,
            EventKind::Success
        ]
    );
    assert!(events.iter().all(|e| e.operation == Some(OperationKind::Create)));
    let remaining: Vec<_> = events.iter().skip(1).map(|e| e.remaining_ms).collect();
    assert_eq!(remaining, vec![Some(10_000), Some(9_000), Some(8_000)]);
    assert_eq!(events[3].name(), "package-version/create-success");

    assert_eq!(project.resolve_alias(ALIAS).as_deref(), Some(SUBSCRIBER_ID));
    assert_eq!(platform.count("create_request"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_create_without_project_update() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let cfg = Config {
        auto_update_project: false,
        ..Config::default()
    };
    let versions = facade_with(&platform, &project, cfg);

    let record = versions
        .create(&create_options(), Some(policy(1, 10)))
        .await
        .unwrap();

    assert!(record.is_success());
    assert!(project.aliases().is_empty());
    assert_eq!(platform.count("version"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_create_error_stops_polling() {
    let platform = Arc::new(FakePlatform::default().with_create_statuses(&[
        "Queued", "Error", "Success",
    ]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let record = versions
        .wait_for_create_version(CREATE_ID, Some(policy(1, 10)))
        .await
        .unwrap();

    assert!(record.is_error());
    assert_eq!(record.errors, vec!["Apex test failure".to_string()]);
    assert_eq!(platform.count("create_request"), 2);
    assert_eq!(
        kinds(&drain(&mut rx)),
        vec![EventKind::Enqueued, EventKind::Error]
    );
    assert!(project.aliases().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_timeout_publishes_one_timed_out() {
    let platform = Arc::new(FakePlatform::default().with_create_statuses(&["InProgress"]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let err = versions
        .wait_for_create_version(CREATE_ID, Some(policy(1, 3)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PackageError::Timeout {
            kind: OperationKind::Create,
            ..
        }
    ));
    let events = drain(&mut rx);
    let timed_out: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::TimedOut)
        .collect();
    assert_eq!(timed_out.len(), 1);
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::TimedOut));
    assert_eq!(timed_out[0].status, Some(RemoteStatus::InProgress));
}

#[tokio::test]
async fn test_create_status_fetches_once_without_events() {
    let platform = Arc::new(FakePlatform::default().with_create_statuses(&["Queued", "Success"]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let record = versions.create_status(CREATE_ID).await.unwrap();

    assert_eq!(record.status, RemoteStatus::Queued);
    assert_eq!(platform.count("create_request"), 1);
    assert!(drain(&mut rx).is_empty());
}

// ─── immediate mutations ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let id = versions
        .update(VERSION_ID, VersionChanges::default().tag("rc1"))
        .await
        .unwrap();

    assert_eq!(id.as_str(), VERSION_ID);
    let updates = platform.updates.lock().unwrap();
    let keys: BTreeSet<_> = updates[0].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, BTreeSet::from(["Id".to_string(), "Tag".to_string()]));
    assert_eq!(updates[0]["Tag"], "rc1");
    assert_eq!(platform.count("version"), 0);
}

#[tokio::test]
async fn test_empty_update_is_a_no_op() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let id = versions
        .update(VERSION_ID, VersionChanges::default())
        .await
        .unwrap();

    assert_eq!(id.as_str(), VERSION_ID);
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn test_rejected_deprecation_reports_every_error() {
    let platform = Arc::new(
        FakePlatform::default()
            .with_save_errors(&["Version is still installed", "Version is the latest release"]),
    );
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let err = versions.delete(VERSION_ID).await.unwrap_err();

    assert_eq!(err.as_label(), "update_rejected");
    let message = err.to_string();
    assert!(message.contains("Version is still installed"));
    assert!(message.contains("Version is the latest release"));
    assert_eq!(platform.updates.lock().unwrap()[0]["IsDeprecated"], true);
}

#[tokio::test]
async fn test_promote_by_alias_resolves_version_id() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new().with_alias(ALIAS, SUBSCRIBER_ID));
    let versions = facade(&platform, &project);

    let id = versions.promote(ALIAS).await.unwrap();

    assert_eq!(id.as_str(), VERSION_ID);
    assert_eq!(platform.calls(), vec!["version", "update_version"]);
    let updates = platform.updates.lock().unwrap();
    assert_eq!(updates[0]["Id"], VERSION_ID);
    assert_eq!(updates[0]["IsReleased"], true);
}

#[tokio::test]
async fn test_undelete_and_report() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    versions.undelete(VERSION_ID).await.unwrap();
    assert_eq!(platform.updates.lock().unwrap()[0]["IsDeprecated"], false);

    let report = versions.report(SUBSCRIBER_ID, true).await.unwrap();
    assert_eq!(report.version.alias(), ALIAS);
    assert_eq!(report.dependencies.len(), 1);
}

#[tokio::test]
async fn test_invalid_ids_never_reach_the_platform() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let errors = vec![
        versions.promote(PACKAGE_ID).await.unwrap_err(),
        versions.create_status(INSTALL_ID).await.unwrap_err(),
        versions.install_status(CREATE_ID, None).await.unwrap_err(),
        versions.uninstall(VERSION_ID, None).await.unwrap_err(),
        versions.uninstall_report("06y-not-an-id").await.unwrap_err(),
        versions.external_sites("billing@9.9.9-9", None).await.unwrap_err(),
    ];

    assert!(errors.iter().all(PackageError::is_validation), "{errors:?}");
    assert!(platform.calls().is_empty());
}

// ─── entity ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_entity_caches_until_refresh_or_save() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut version = versions.version(SUBSCRIBER_ID).unwrap();
    assert!(matches!(version.cache(), VersionCache::Unloaded));

    assert_eq!(version.alias().await.unwrap(), ALIAS);
    assert_eq!(version.version_id().await.unwrap().as_str(), VERSION_ID);
    assert_eq!(platform.count("version"), 1);

    version.refresh().await.unwrap();
    assert_eq!(platform.count("version"), 2);

    version
        .update(VersionChanges::default().description("notes"))
        .await
        .unwrap();
    assert!(matches!(version.cache(), VersionCache::Unloaded));
}

// ─── install / uninstall ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_install_waits_for_publish_then_polls_install() {
    let platform = Arc::new(
        FakePlatform::default()
            .with_publish_available(&[false, true])
            .with_install_statuses(&["UNKNOWN", "IN_PROGRESS", "SUCCESS"]),
    );
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let request = InstallRequest::new(SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap());
    let options = InstallOptions {
        publish_polling: policy(1, 5),
        polling: policy(1, 10),
    };
    let record = versions.install(&request, options).await.unwrap();

    assert!(record.is_success());
    assert_eq!(record.payload.id, INSTALL_ID);
    assert_eq!(platform.count("publish_state"), 2);
    assert_eq!(platform.count("install_request"), 3);

    let seen: Vec<_> = drain(&mut rx)
        .iter()
        .map(|e| (e.operation, e.kind))
        .collect();
    assert_eq!(
        seen,
        vec![
            (Some(OperationKind::Publish), EventKind::Progress),
            (Some(OperationKind::Publish), EventKind::Success),
            (Some(OperationKind::Install), EventKind::Submitted),
            (Some(OperationKind::Install), EventKind::Progress),
            (Some(OperationKind::Install), EventKind::Progress),
            (Some(OperationKind::Install), EventKind::Success),
        ]
    );
}

#[tokio::test]
async fn test_install_of_unpublished_version_is_not_submitted() {
    let platform = Arc::new(FakePlatform::default().with_publish_available(&[false]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let request = InstallRequest::new(SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap());
    let err = versions
        .install(&request, versions.install_options())
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::NotPublishable { ref id } if id == SUBSCRIBER_ID));
    assert_eq!(platform.count("submit_install"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_install_publish_wait_timeout_is_not_publishable() {
    let platform = Arc::new(FakePlatform::default().with_publish_available(&[false]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let request = InstallRequest::new(SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap());
    let options = InstallOptions {
        publish_polling: policy(1, 3),
        polling: policy(1, 10),
    };
    let err = versions.install(&request, options).await.unwrap_err();

    assert!(matches!(err, PackageError::NotPublishable { ref id } if id == SUBSCRIBER_ID));
    assert!(platform.count("publish_state") > 1);
    assert_eq!(platform.count("submit_install"), 0);

    let events = drain(&mut rx);
    let last = events.last().unwrap();
    assert_eq!(last.operation, Some(OperationKind::Publish));
    assert_eq!(last.kind, EventKind::TimedOut);
    assert!(events.iter().all(|e| e.operation == Some(OperationKind::Publish)));
}

#[tokio::test]
async fn test_install_submission_permission_error_carries_hint() {
    let platform = Arc::new(
        FakePlatform::default()
            .with_submit_install_error(RemoteError::new("INSUFFICIENT_ACCESS: cannot install")),
    );
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let request = InstallRequest::new(SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap());
    let err = versions
        .install(&request, versions.install_options())
        .await
        .unwrap_err();

    match err {
        PackageError::Remote { message, hint } => {
            assert!(message.contains("INSUFFICIENT_ACCESS"));
            assert_eq!(hint, Some(SUPPORT_HINT));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.count("submit_install"), 1);
    assert_eq!(platform.count("install_request"), 0);
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| e.operation != Some(OperationKind::Install))
    );
}

#[tokio::test(start_paused = true)]
async fn test_install_status_wait_timeout() {
    let platform = Arc::new(FakePlatform::default().with_install_statuses(&["IN_PROGRESS"]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);
    let mut rx = versions.bus().subscribe();

    let request = InstallRequest::new(SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap());
    let options = InstallOptions {
        publish_polling: policy(1, 0),
        polling: policy(1, 3),
    };
    let err = versions.install(&request, options).await.unwrap_err();

    match err {
        PackageError::Timeout {
            kind,
            operation_id,
            timeout,
        } => {
            assert_eq!(kind, OperationKind::Install);
            assert_eq!(operation_id, INSTALL_ID);
            assert_eq!(timeout, Duration::from_secs(3));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let events = drain(&mut rx);
    let timed_out: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::TimedOut)
        .collect();
    assert_eq!(timed_out.len(), 1);
    assert_eq!(timed_out[0].operation, Some(OperationKind::Install));
    assert!(
        !events
            .iter()
            .any(|e| e.kind == EventKind::Finished && e.operation == Some(OperationKind::Install))
    );
}

#[tokio::test(start_paused = true)]
async fn test_uninstall_polls_to_success() {
    let platform =
        Arc::new(FakePlatform::default().with_uninstall_statuses(&["InProgress", "Success"]));
    let project = Arc::new(MemoryProject::new().with_alias(ALIAS, SUBSCRIBER_ID));
    let versions = facade(&platform, &project);

    let record = versions.uninstall(ALIAS, Some(policy(5, 60))).await.unwrap();

    assert!(record.is_success());
    assert_eq!(record.operation_id, UNINSTALL_ID);
    assert_eq!(platform.count("uninstall_request"), 2);
}

#[tokio::test]
async fn test_uninstall_report_surfaces_remote_errors() {
    let platform = Arc::new(FakePlatform {
        uninstall_errors: vec!["Component in use".into(), "Dependent package".into()],
        ..FakePlatform::default().with_uninstall_statuses(&["Error"])
    });
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let err = versions.uninstall_report(UNINSTALL_ID).await.unwrap_err();

    match err {
        PackageError::UninstallFailed { id, errors } => {
            assert_eq!(id, UNINSTALL_ID);
            assert_eq!(errors.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ─── external sites ──────────────────────────────────────────────────────────

fn sites() -> ExternalSites {
    ExternalSites {
        remote_site_urls: vec!["https://api.example.com".into()],
        csp_trusted_sites: vec!["https://cdn.example.com".into()],
    }
}

#[tokio::test]
async fn test_external_sites_retries_once_without_key() {
    let platform = Arc::new(FakePlatform::default().with_sites(vec![
        Err(RemoteError::new(
            "Implementation restriction: keyed queries are not supported",
        )),
        Ok(sites()),
    ]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let urls = versions
        .external_sites(SUBSCRIBER_ID, Some("secret"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(urls.len(), 2);
    assert_eq!(
        *platform.site_keys.lock().unwrap(),
        vec![Some("secret".to_string()), None]
    );
}

#[tokio::test]
async fn test_external_sites_other_errors_propagate() {
    let platform = Arc::new(FakePlatform::default().with_sites(vec![
        Err(RemoteError::new("INSUFFICIENT_ACCESS: cannot read sites")),
        Ok(sites()),
    ]));
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    let err = versions
        .external_sites(SUBSCRIBER_ID, Some("secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::Remote { hint: Some(_), .. }));
    assert_eq!(platform.count("external_sites"), 1);
}

#[tokio::test]
async fn test_external_sites_none_when_empty() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let versions = facade(&platform, &project);

    assert_eq!(versions.external_sites(SUBSCRIBER_ID, None).await.unwrap(), None);
}

// ─── subscribers ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_in_flight_tracker_sees_operation_finish() {
    let platform = Arc::new(FakePlatform::default().with_create_statuses(&["Queued", "Success"]));
    let project = Arc::new(MemoryProject::new());
    let tracker = Arc::new(InFlightTracker::new());
    let versions = PackageVersions::builder(
        Arc::clone(&platform) as Arc<dyn Platform>,
        Arc::clone(&project) as Arc<dyn Project>,
        Config::default(),
    )
    .with_subscribers(vec![Arc::clone(&tracker) as Arc<dyn Subscribe>])
    .build();
    assert_eq!(versions.subscriber_count(), 1);

    versions
        .create(&create_options(), Some(policy(1, 10)))
        .await
        .unwrap();
    versions.shutdown().await;

    assert!(tracker.snapshot().is_empty());
}

fn tracked_facade(
    platform: &Arc<FakePlatform>,
    project: &Arc<MemoryProject>,
    tracker: &Arc<InFlightTracker>,
) -> PackageVersions {
    PackageVersions::builder(
        Arc::clone(platform) as Arc<dyn Platform>,
        Arc::clone(project) as Arc<dyn Project>,
        Config::default(),
    )
    .with_subscribers(vec![Arc::clone(tracker) as Arc<dyn Subscribe>])
    .build()
}

#[tokio::test]
async fn test_in_flight_tracker_releases_single_fetch_create() {
    let platform = Arc::new(FakePlatform::default());
    let project = Arc::new(MemoryProject::new());
    let tracker = Arc::new(InFlightTracker::new());
    let versions = tracked_facade(&platform, &project, &tracker);
    let mut rx = versions.bus().subscribe();

    let record = versions.create(&create_options(), None).await.unwrap();
    assert!(record.is_success());

    let events = drain(&mut rx);
    assert_eq!(kinds(&events), vec![EventKind::Submitted, EventKind::Finished]);
    assert_eq!(events[1].operation_id.as_deref(), Some(CREATE_ID));
    assert_eq!(events[1].status, Some(RemoteStatus::Success));

    versions.shutdown().await;
    assert!(tracker.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_tracker_releases_create_after_fetch_error() {
    let platform =
        Arc::new(FakePlatform::default().with_create_statuses(&["InProgress", FETCH_FAILS]));
    let project = Arc::new(MemoryProject::new());
    let tracker = Arc::new(InFlightTracker::new());
    let versions = tracked_facade(&platform, &project, &tracker);
    let mut rx = versions.bus().subscribe();

    let err = versions
        .create(&create_options(), Some(policy(1, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, PackageError::Remote { hint: None, .. }));

    let events = drain(&mut rx);
    assert_eq!(
        kinds(&events),
        vec![EventKind::Submitted, EventKind::Progress, EventKind::Finished]
    );
    assert_eq!(events[2].reason.as_deref(), Some("remote_rejected"));
    assert!(project.aliases().is_empty());

    versions.shutdown().await;
    assert!(tracker.snapshot().is_empty());
}
