//! # Status source abstraction and function-backed implementation.
//!
//! This module defines the [`StatusSource`] trait (one fetch of one operation's status) and a
//! convenient closure-backed implementation [`FetchFn`].
//!
//! A source must be idempotent: the controller calls it once per poll, any number of times.
//!
//! ## Example
//! ```rust
//! use pkgvisor::{FetchFn, RemoteStatus, StatusRecord, StatusSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pkgvisor::Result<()> {
//! let source = FetchFn::new(|id: String| async move {
//!     Ok(StatusRecord::new(id, RemoteStatus::Queued, ()))
//! });
//!
//! let record = source.fetch("08c000000000001AAA").await?;
//! assert_eq!(record.status, RemoteStatus::Queued);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::error::Result;
use crate::status::StatusRecord;

/// # One status fetch for a remote operation.
///
/// Failures propagate as the poll's terminal failure.
#[async_trait]
pub trait StatusSource<P: Send + 'static>: Send + Sync {
    /// Fetches the current status of `operation_id`.
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<P>>;
}

/// Closure-backed status source.
///
/// Wraps `F: Fn(String) -> Fut`, producing a fresh future per fetch. The closure gets an
/// owned id so the future does not borrow from the controller.
#[derive(Debug)]
pub struct FetchFn<F> {
    f: F,
}

impl<F> FetchFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<P, F, Fut> StatusSource<P> for FetchFn<F>
where
    P: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StatusRecord<P>>> + Send + 'static,
{
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<P>> {
        (self.f)(operation_id.to_owned()).await
    }
}
