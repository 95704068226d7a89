use std::sync::Arc;

use crate::{
    audit::{AuditLogSink, AuditLogger, PersistentAuditLogger, TracingAuditLogger},
    config::Config,
    db::connection::DbPool,
    repositories::PgUserActionStore,
    services::{
        audit_log::AuditLogService,
        user_actions::{CaseUserActionService, FindLimits},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub user_actions: Arc<CaseUserActionService>,
    pub audit_logs: AuditLogService,
}

impl AppState {
    /// Wires the PostgreSQL store and the configured audit sink.
    pub fn new(pool: DbPool, config: Config) -> Self {
        let audit_logs = AuditLogService::new(pool.clone());
        let audit_logger: Arc<dyn AuditLogger> = match config.audit_log_sink {
            AuditLogSink::Tracing => Arc::new(TracingAuditLogger),
            AuditLogSink::Database => Arc::new(PersistentAuditLogger::new(audit_logs.clone())),
        };
        let user_actions = CaseUserActionService::new(
            Arc::new(PgUserActionStore::new(pool.clone())),
            audit_logger,
            FindLimits {
                default_per_page: config.default_per_page,
                max_per_page: config.max_per_page,
            },
        );

        Self::with_service(pool, config, Arc::new(user_actions))
    }

    pub fn with_service(
        pool: DbPool,
        config: Config,
        user_actions: Arc<CaseUserActionService>,
    ) -> Self {
        Self {
            audit_logs: AuditLogService::new(pool.clone()),
            pool,
            config,
            user_actions,
        }
    }
}
