//! Common test helpers for pkgvisor integration tests
//!
//! Provides an in-memory [`Platform`] fake:
//! - scripted status sequences per request type (the last status repeats once exhausted)
//! - a call log for verifying which remote calls were made
//! - captured update payloads, serialized the way a real platform client would send them

use async_trait::async_trait;
use pkgvisor::{
    Config, CreateOptions, CreateRequestId, CreateRequestRecord, Event, EventKind, ExternalSites,
    InstallRequest, InstallRequestId, InstallRequestRecord, MemoryProject, PackageId,
    PackageVersionId, PackageVersions, Platform, PublishCheck, RemoteError, RemoteResult,
    SaveResult, SubscriberVersionId, UninstallRequestId, UninstallRequestRecord, VersionKey,
    VersionRecord, VersionReport, VersionUpdate,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const PACKAGE_ID: &str = "0Ho000000000001AAA";
pub const VERSION_ID: &str = "05i000000000001AAA";
pub const SUBSCRIBER_ID: &str = "04t000000000001AAA";
pub const CREATE_ID: &str = "08c000000000001AAA";
pub const INSTALL_ID: &str = "0Hf000000000001AAA";
pub const UNINSTALL_ID: &str = "06y000000000001AAA";
pub const ALIAS: &str = "billing@1.2.0-7";
/// Scripted create status that makes the status fetch fail.
pub const FETCH_FAILS: &str = "<fetch fails>";

/// Pops the next scripted value, repeating the last one.
fn next<T: Clone>(q: &Mutex<VecDeque<T>>) -> T {
    let mut q = q.lock().unwrap();
    if q.len() > 1 {
        q.pop_front().unwrap()
    } else {
        q.front().cloned().expect("script is empty")
    }
}

pub fn version_record() -> VersionRecord {
    VersionRecord {
        id: PackageVersionId::parse(VERSION_ID).unwrap(),
        subscriber_version_id: SubscriberVersionId::parse(SUBSCRIBER_ID).unwrap(),
        package_id: PackageId::parse(PACKAGE_ID).unwrap(),
        package_name: "billing".into(),
        name: Some("Spring".into()),
        description: None,
        major: 1,
        minor: 2,
        patch: 0,
        build: 7,
        branch: None,
        tag: None,
        is_released: false,
        is_deprecated: false,
    }
}

/// In-memory platform fake.
pub struct FakePlatform {
    pub calls: Mutex<Vec<String>>,
    pub create_statuses: Mutex<VecDeque<&'static str>>,
    pub publish_checks: Mutex<VecDeque<PublishCheck>>,
    pub install_statuses: Mutex<VecDeque<&'static str>>,
    pub uninstall_statuses: Mutex<VecDeque<&'static str>>,
    pub uninstall_errors: Vec<String>,
    pub save_result: Mutex<SaveResult>,
    /// Every update payload, as JSON.
    pub updates: Mutex<Vec<serde_json::Value>>,
    /// Scripted external-sites answers, one per call.
    pub sites: Mutex<VecDeque<RemoteResult<ExternalSites>>>,
    /// Installation key of every external-sites call.
    pub site_keys: Mutex<Vec<Option<String>>>,
    /// Error returned by `submit_install`, if set.
    pub submit_install_error: Mutex<Option<RemoteError>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            create_statuses: Mutex::new(VecDeque::from(["Success"])),
            publish_checks: Mutex::new(VecDeque::from([PublishCheck::default()])),
            install_statuses: Mutex::new(VecDeque::from(["SUCCESS"])),
            uninstall_statuses: Mutex::new(VecDeque::from(["Success"])),
            uninstall_errors: Vec::new(),
            save_result: Mutex::new(SaveResult {
                id: Some(VERSION_ID.into()),
                success: true,
                errors: Vec::new(),
            }),
            updates: Mutex::new(Vec::new()),
            sites: Mutex::new(VecDeque::new()),
            site_keys: Mutex::new(Vec::new()),
            submit_install_error: Mutex::new(None),
        }
    }
}

#[allow(dead_code)]
impl FakePlatform {
    pub fn with_create_statuses(self, statuses: &[&'static str]) -> Self {
        *self.create_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_install_statuses(self, statuses: &[&'static str]) -> Self {
        *self.install_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_uninstall_statuses(self, statuses: &[&'static str]) -> Self {
        *self.uninstall_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_publish_available(self, available: &[bool]) -> Self {
        *self.publish_checks.lock().unwrap() = available
            .iter()
            .map(|ok| PublishCheck {
                validation: (!ok).then(|| "PACKAGE_UNAVAILABLE".to_string()),
            })
            .collect();
        self
    }

    pub fn with_save_errors(self, errors: &[&str]) -> Self {
        *self.save_result.lock().unwrap() = SaveResult {
            id: None,
            success: false,
            errors: errors.iter().map(|e| e.to_string()).collect(),
        };
        self
    }

    pub fn with_submit_install_error(self, err: RemoteError) -> Self {
        *self.submit_install_error.lock().unwrap() = Some(err);
        self
    }

    pub fn with_sites(self, answers: Vec<RemoteResult<ExternalSites>>) -> Self {
        *self.sites.lock().unwrap() = answers.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn submit_create(&self, _options: &CreateOptions) -> RemoteResult<CreateRequestRecord> {
        self.log("submit_create");
        Ok(CreateRequestRecord {
            id: CREATE_ID.into(),
            status: "Queued".into(),
            ..Default::default()
        })
    }

    async fn create_request(&self, id: &CreateRequestId) -> RemoteResult<CreateRequestRecord> {
        self.log("create_request");
        let status = next(&self.create_statuses);
        if status == FETCH_FAILS {
            return Err(RemoteError::new("connection reset by peer"));
        }
        let done = status == "Success";
        Ok(CreateRequestRecord {
            id: id.to_string(),
            status: status.into(),
            package_id: Some(PACKAGE_ID.into()),
            package_version_id: done.then(|| VERSION_ID.into()),
            subscriber_version_id: done.then(|| SUBSCRIBER_ID.into()),
            errors: if status == "Error" {
                vec!["Apex test failure".into()]
            } else {
                Vec::new()
            },
            ..Default::default()
        })
    }

    async fn version(&self, key: &VersionKey) -> RemoteResult<VersionRecord> {
        self.log("version");
        match key.as_str() {
            VERSION_ID | SUBSCRIBER_ID => Ok(version_record()),
            other => Err(RemoteError::new(format!("no package version {other}"))),
        }
    }

    async fn update_version(&self, update: &VersionUpdate) -> RemoteResult<SaveResult> {
        self.log("update_version");
        self.updates
            .lock()
            .unwrap()
            .push(serde_json::to_value(update).unwrap());
        Ok(self.save_result.lock().unwrap().clone())
    }

    async fn publish_state(
        &self,
        _id: &SubscriberVersionId,
        _installation_key: Option<&str>,
    ) -> RemoteResult<PublishCheck> {
        self.log("publish_state");
        Ok(next(&self.publish_checks))
    }

    async fn submit_install(&self, request: &InstallRequest) -> RemoteResult<InstallRequestRecord> {
        self.log("submit_install");
        if let Some(err) = self.submit_install_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(InstallRequestRecord {
            id: INSTALL_ID.into(),
            status: "IN_PROGRESS".into(),
            subscriber_version_id: Some(request.subscriber_version_id.to_string()),
            errors: Vec::new(),
        })
    }

    async fn install_request(&self, id: &InstallRequestId) -> RemoteResult<InstallRequestRecord> {
        self.log("install_request");
        Ok(InstallRequestRecord {
            id: id.to_string(),
            status: next(&self.install_statuses).into(),
            subscriber_version_id: Some(SUBSCRIBER_ID.into()),
            errors: Vec::new(),
        })
    }

    async fn submit_uninstall(
        &self,
        id: &SubscriberVersionId,
    ) -> RemoteResult<UninstallRequestRecord> {
        self.log("submit_uninstall");
        Ok(UninstallRequestRecord {
            id: UNINSTALL_ID.into(),
            status: "Queued".into(),
            subscriber_version_id: Some(id.to_string()),
        })
    }

    async fn uninstall_request(
        &self,
        id: &UninstallRequestId,
    ) -> RemoteResult<UninstallRequestRecord> {
        self.log("uninstall_request");
        Ok(UninstallRequestRecord {
            id: id.to_string(),
            status: next(&self.uninstall_statuses).into(),
            subscriber_version_id: Some(SUBSCRIBER_ID.into()),
        })
    }

    async fn uninstall_errors(&self, _id: &UninstallRequestId) -> RemoteResult<Vec<String>> {
        self.log("uninstall_errors");
        Ok(self.uninstall_errors.clone())
    }

    async fn external_sites(
        &self,
        _id: &SubscriberVersionId,
        installation_key: Option<&str>,
    ) -> RemoteResult<ExternalSites> {
        self.log("external_sites");
        self.site_keys
            .lock()
            .unwrap()
            .push(installation_key.map(str::to_owned));
        self.sites
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ExternalSites::default()))
    }

    async fn version_report(
        &self,
        _id: &PackageVersionId,
        verbose: bool,
    ) -> RemoteResult<VersionReport> {
        self.log("version_report");
        Ok(VersionReport {
            version: version_record(),
            validation_skipped: false,
            code_coverage: Some(81.0),
            has_passed_code_coverage_check: Some(true),
            ancestor_id: None,
            dependencies: if verbose {
                vec!["04t000000000009AAA".into()]
            } else {
                Vec::new()
            },
        })
    }
}

/// Facade over `platform` with the given project and default config.
#[allow(dead_code)]
pub fn facade(platform: &Arc<FakePlatform>, project: &Arc<MemoryProject>) -> PackageVersions {
    facade_with(platform, project, Config::default())
}

#[allow(dead_code)]
pub fn facade_with(
    platform: &Arc<FakePlatform>,
    project: &Arc<MemoryProject>,
    cfg: Config,
) -> PackageVersions {
    PackageVersions::builder(
        Arc::clone(platform) as Arc<dyn Platform>,
        Arc::clone(project) as Arc<dyn pkgvisor::Project>,
        cfg,
    )
    .build()
}

/// Every event currently buffered in `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[allow(dead_code)]
pub fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}
