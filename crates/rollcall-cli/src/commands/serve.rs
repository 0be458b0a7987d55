use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use rollcall_core::{
    AttendanceService, AttendanceTracker, Config, Delivery, MemberId, Notice, Notifier,
    NotifyError, SqliteStore, StaticRoster,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Args)]
pub struct ServeArgs {
    /// Roster file (TOML) naming members and the roles they hold
    #[arg(long)]
    pub roster: PathBuf,

    /// Configuration file override
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Notifier that writes notices to the log stream. Stands in for the
/// chat-platform transport during local runs.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send_direct(&self, member: MemberId, notice: &Notice) -> Result<Delivery, NotifyError> {
        info!(%member, title = %notice.title, body = %notice.body, "direct notice");
        Ok(Delivery::Delivered)
    }

    fn send_audit(&self, notice: &Notice) -> Result<(), NotifyError> {
        info!(title = %notice.title, body = %notice.body, "audit notice");
        Ok(())
    }
}

pub fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let roster = Arc::new(StaticRoster::load_from(&args.roster)?);
    let tracker = AttendanceTracker::new(Arc::new(SqliteStore::open_default()?));
    let service = Arc::new(AttendanceService::new(
        tracker,
        &config,
        roster,
        Arc::new(ConsoleNotifier),
    ));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let handles = service.spawn_sweeps();
        info!(
            afk_interval_secs = config.afk.sweep_interval_secs,
            quota_interval_secs = config.quota.sweep_interval_secs,
            "rollcall serving; ctrl-c to stop"
        );
        tokio::signal::ctrl_c().await?;
        info!("shutting down");
        handles.abort();
        Ok(())
    })
}
