//! Application state
//!
//! `AppState` holds shared handles to every service; it is cheap to clone
//! (everything inside is `Arc`-backed) and is the axum router state.
//!
//! Collaborators are wired into the orchestrator's fan-out here; this is
//! the single composition point; handlers and operations never reach for
//! service singletons.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::core::Config;
use crate::effects::audit::{AuditLogRequest, AuditService, AuditStorage, AuditWorker};
use crate::effects::broadcast::BroadcastService;
use crate::effects::notify::{ChannelNotifier, NotificationWorker};
use crate::effects::points::StoredPointsLedger;
use crate::ops::{Orchestrator, SideEffectFanout};
use crate::store::MarketStorage;
use shared::message::NotificationPayload;

/// Channel receivers handed to the background workers
///
/// Produced by [`AppState::initialize`] and consumed exactly once by
/// [`AppState::start_background_tasks`].
pub struct WorkerChannels {
    pub audit_rx: mpsc::Receiver<AuditLogRequest>,
    pub notify_rx: mpsc::Receiver<NotificationPayload>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: MarketStorage,
    pub orchestrator: Orchestrator,
    pub audit: Arc<AuditService>,
    pub broadcast: Arc<BroadcastService>,
    pub points: StoredPointsLedger,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("work_dir", &self.config.work_dir)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Initialize all services
    ///
    /// Opens the three redb databases under `work_dir/database/` and wires
    /// the collaborators into the orchestrator fan-out.
    pub fn initialize(config: &Config) -> anyhow::Result<(Self, WorkerChannels)> {
        config.ensure_work_dir_structure()?;
        let db_dir = config.database_dir();

        let storage = MarketStorage::open(db_dir.join("market.redb"))?;
        let audit_storage = AuditStorage::open(db_dir.join("audit.redb"))?;
        let points = StoredPointsLedger::open(db_dir.join("points.redb"))?;

        let (audit, audit_rx) = AuditService::new(audit_storage, config.audit_buffer_size);
        let broadcast = Arc::new(BroadcastService::new());
        let (notifier, notify_rx) = ChannelNotifier::new(config.notify_buffer_size);

        let fanout = SideEffectFanout::new(
            audit.clone(),
            Arc::new(notifier),
            broadcast.clone(),
            Arc::new(points.clone()),
        );
        let orchestrator = Orchestrator::new(storage.clone(), fanout);

        let state = Self {
            config: config.clone(),
            storage,
            orchestrator,
            audit,
            broadcast,
            points,
        };
        let channels = WorkerChannels {
            audit_rx,
            notify_rx,
        };
        Ok((state, channels))
    }

    /// Spawn the background workers
    ///
    /// Must be called before `Server::run` starts accepting requests.
    pub fn start_background_tasks(&self, channels: WorkerChannels) {
        let audit_worker = AuditWorker::new(self.audit.storage().clone());
        tokio::spawn(audit_worker.run(channels.audit_rx));

        let notify_worker = NotificationWorker::new(
            self.broadcast.clone(),
            self.config.notify_webhook_url.clone(),
        );
        tokio::spawn(notify_worker.run(channels.notify_rx));
    }
}
