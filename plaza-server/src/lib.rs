//! Plaza Server - multi-vertical marketplace backend
//!
//! # Architecture
//!
//! Every write endpoint runs through one transactional side-effect
//! orchestrator instead of hand-wiring transaction + audit + notify +
//! broadcast + points per handler:
//!
//! - **Persistence Gateway** (`store`): redb storage; one write transaction
//!   is the unit of work
//! - **Domain Operations** (`ops::actions`): pure state transitions that
//!   stage writes and describe side effects
//! - **Side-Effect Fan-out** (`ops::fanout`): audit → notify → broadcast →
//!   points, with per-kind failure policy
//! - **Orchestrator** (`ops::orchestrator`): idempotency, unit of work,
//!   commit-before-fan-out
//!
//! # Module structure
//!
//! ```text
//! plaza-server/src/
//! ├── core/          # config, state, server lifecycle
//! ├── store/         # persistence gateway (redb)
//! ├── ops/           # orchestrator, fan-out, domain operations
//! ├── effects/       # audit, notify, broadcast, points collaborators
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod effects;
pub mod ops;
pub mod store;
pub mod utils;

// Re-export public types
pub use crate::core::{AppState, Config, Server, WorkerChannels};
pub use crate::ops::{Completed, Execution, Operation, OperationMeta, Orchestrator, SideEffect};
pub use crate::store::MarketStorage;
pub use crate::utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____  __
   / __ \/ /___ _____  ____ _
  / /_/ / / __ `/_  / / __ `/
 / ____/ / /_/ / / /_/ /_/ /
/_/   /_/\__,_/ /___/\__,_/
    "#
    );
}
