//! # Controller: drives one long-running remote operation to a terminal outcome.
//!
//! Polls a [`StatusSource`] on a fixed [`PollingPolicy`]:
//! - classifies every observed status with the transition table in [`crate::status`],
//! - publishes one lifecycle [`Event`] per poll,
//! - bounds the whole loop with the policy timeout.
//!
//! ## Event flow
//! ```text
//! Enqueued / Progress (repeated, one per pending poll)
//!     → Success           (terminal, Ok(record))
//!     → Error             (terminal, Ok(record))
//!     → TimedOut          (budget exhausted, Err(Timeout))
//! ```
//!
//! ## Architecture
//! ```text
//! run(kind, id, source, policy)
//!
//! timeout == 0 ─► source.fetch(id) ─► return (no events)
//!
//! time::timeout(policy.timeout, loop {
//!   ├─► record = source.fetch(id)?          (fetch error ends the loop)
//!   ├─► event  = record.status.event_kind()  (unrecognized → UnrecognizedStatus)
//!   ├─► publish event{record, remaining_ms}
//!   ├─► terminal? → return record
//!   ├─► remaining_ms -= frequency
//!   └─► sleep(frequency)
//! })
//!   └─ elapsed ─► publish TimedOut{last record} ─► Err(Timeout)
//! ```
//!
//! ## Rules
//! - Polls run **sequentially** within one call (never parallel)
//! - The remote is never asked more often than once per `frequency`
//! - Events are published before the next poll starts, so their order is the
//!   status-transition order

use tokio::time;
use tracing::{debug, info, warn};

use crate::{
    core::poller::StatusSource,
    error::{PackageError, Result},
    events::{Bus, Event, EventKind, OperationKind},
    policies::PollingPolicy,
    status::StatusRecord,
};

/// Poll-loop state that must survive the loop being aborted by the timeout.
struct PollState<P> {
    last: Option<StatusRecord<P>>,
    remaining_ms: i64,
}

/// Generic long-running-operation controller.
///
/// Holds only the injected [`Bus`]; one controller serves any number of concurrent
/// operations because each `run` keeps its state on its own stack.
#[derive(Clone, Debug)]
pub struct Controller {
    bus: Bus,
}

impl Controller {
    /// Creates a controller publishing to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Bus this controller publishes to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Drives `operation_id` to a terminal status.
    ///
    /// ### Returns
    /// - `Ok(record)` for terminal `Success` **and** terminal `Error`: a remote error status is
    ///   a normal outcome, callers inspect `record.status`
    /// - `Ok(record)` with any status when the policy is single-fetch
    /// - `Err(Timeout)` when the budget runs out (after publishing `TimedOut`)
    /// - `Err(UnrecognizedStatus)` when the platform reports an unknown status
    /// - the fetch error when the source fails
    pub async fn run<P>(
        &self,
        kind: OperationKind,
        operation_id: &str,
        source: &dyn StatusSource<P>,
        policy: PollingPolicy,
    ) -> Result<StatusRecord<P>>
    where
        P: Clone + Send + Sync + 'static,
    {
        if policy.is_single_fetch() {
            debug!(operation = %kind, operation_id, "single status fetch");
            return source.fetch(operation_id).await;
        }

        let mut state = PollState {
            last: None,
            remaining_ms: policy.budget_ms(),
        };
        let polled = time::timeout(
            policy.timeout,
            self.poll(kind, operation_id, source, policy, &mut state),
        )
        .await;

        match polled {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    operation = %kind,
                    operation_id,
                    timeout = ?policy.timeout,
                    "polling budget exhausted"
                );
                self.publish_timed_out(kind, operation_id, state);
                Err(PackageError::Timeout {
                    kind,
                    operation_id: operation_id.to_owned(),
                    timeout: policy.timeout,
                })
            }
        }
    }

    async fn poll<P>(
        &self,
        kind: OperationKind,
        operation_id: &str,
        source: &dyn StatusSource<P>,
        policy: PollingPolicy,
        state: &mut PollState<P>,
    ) -> Result<StatusRecord<P>>
    where
        P: Clone + Send + Sync + 'static,
    {
        loop {
            let record = source.fetch(operation_id).await?;
            let Some(event) = record.status.event_kind() else {
                warn!(operation = %kind, operation_id, status = %record.status, "unrecognized status");
                return Err(PackageError::UnrecognizedStatus {
                    kind,
                    operation_id: operation_id.to_owned(),
                    status: record.status.as_str().to_owned(),
                });
            };

            debug!(
                operation = %kind,
                operation_id,
                status = %record.status,
                remaining_ms = state.remaining_ms,
                "status polled"
            );
            self.bus.publish(Event::from_record(
                event,
                kind,
                &record,
                state.remaining_ms,
            ));

            if event.is_terminal() {
                info!(operation = %kind, operation_id, status = %record.status, "operation finished");
                return Ok(record);
            }

            state.last = Some(record);
            state.remaining_ms = state.remaining_ms.saturating_sub(policy.step_ms());
            time::sleep(policy.frequency).await;
        }
    }

    fn publish_timed_out<P>(&self, kind: OperationKind, operation_id: &str, state: PollState<P>)
    where
        P: Send + Sync + 'static,
    {
        let mut ev = Event::new(EventKind::TimedOut)
            .with_operation(kind, operation_id)
            .with_remaining_ms(state.remaining_ms);
        if let Some(last) = state.last {
            ev = ev.with_status(last.status.clone()).with_record(last);
        }
        self.bus.publish(ev);
    }
}
