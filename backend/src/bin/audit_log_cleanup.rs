use chrono::Utc;
use cases_user_actions::{
    config::Config, db::connection::create_pool, services::audit_log::AuditLogService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cases_user_actions=info,audit_log_cleanup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let cutoff = config.audit_log_cutoff(Utc::now())?;
    let deleted = AuditLogService::new(pool.clone())
        .delete_logs_before(cutoff)
        .await?;
    tracing::info!(
        deleted,
        retention_days = config.audit_log_retention_days,
        %cutoff,
        "Deleted expired audit logs"
    );

    if deleted > 0 {
        sqlx::query("VACUUM (ANALYZE) audit_logs")
            .execute(&pool)
            .await?;
    }

    Ok(())
}
