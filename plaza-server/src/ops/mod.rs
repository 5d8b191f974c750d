//! Transactional side-effect orchestration
//!
//! Every write endpoint runs through the same component chain instead of
//! re-deriving it per handler:
//!
//! ```text
//! Request → Orchestrator → Operation → staged writes → commit
//!                ↓                                       ↓
//!          OpError mapping                      Side-Effect Fan-out
//!                                         (audit → notify → broadcast → points)
//! ```
//!
//! - **traits**: the [`Operation`] contract and per-request metadata
//! - **context**: staged entity reads/writes over one unit of work
//! - **descriptor**: declarative side-effect records
//! - **fanout**: executes descriptors with per-kind failure policy
//! - **orchestrator**: idempotency, unit of work, commit-before-fan-out
//! - **actions**: the domain operations themselves

pub mod actions;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod fanout;
pub mod orchestrator;
pub mod traits;

#[cfg(test)]
pub mod testkit;

// Re-exports
pub use context::{OperationContext, StagedWrites};
pub use descriptor::{EffectKind, EffectOutcome, SideEffect};
pub use error::{OpError, OpResult};
pub use fanout::{FanOutReport, SideEffectFanout};
pub use orchestrator::{Completed, Execution, Orchestrator};
pub use traits::{Operation, OperationMeta, Outcome};
