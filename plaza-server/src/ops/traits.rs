//! Operation contract
//!
//! A domain operation is the pure state transition for one request: it
//! validates state-machine legality, stages entity mutations through the
//! [`OperationContext`](super::context::OperationContext), and describes the
//! side effects it wants fired. It never touches collaborators and never
//! commits; that is the orchestrator's job.

use async_trait::async_trait;
use serde::Serialize;

use super::context::OperationContext;
use super::descriptor::SideEffect;
use super::error::OpError;

/// Per-request metadata shared by the operation and its fan-out
///
/// Immutable once constructed; `request_id` doubles as the idempotency key.
#[derive(Debug, Clone)]
pub struct OperationMeta {
    pub request_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    pub operator_role: String,
    pub ip_address: Option<String>,
    /// Unix millis
    pub timestamp: i64,
}

/// Result of a successful domain operation: the response payload plus the
/// side effects to fan out after commit.
pub struct Outcome<T> {
    pub output: T,
    pub effects: Vec<SideEffect>,
}

impl<T> Outcome<T> {
    pub fn new(output: T, effects: Vec<SideEffect>) -> Self {
        Self { output, effects }
    }
}

/// A domain operation
#[async_trait]
pub trait Operation: Send + Sync {
    /// Response payload on success, flattened into the envelope's `data`
    type Output: Serialize + Send;

    /// Stable name for tracing and logs
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> Result<Outcome<Self::Output>, OpError>;
}
