/// Background job scheduling
///
/// Three periodic sweeps keep the service lively without any inbound
/// traffic: due-reminder delivery, weekly streak milestone alerts, and the
/// AI digest. Each sweep is an ordinary async function so tests can drive a
/// single pass directly; spawn_sweeps wraps them in tokio tasks for the
/// worker binary.

pub mod digest;
pub mod reminders;
pub mod streak_alerts;

pub use digest::run_digest_sweep;
pub use reminders::run_reminder_sweep;
pub use streak_alerts::run_streak_alert_sweep;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, sleep, Instant};
use tracing::{info, warn};

use crate::ai::TextGenerator;
use crate::notify::Notifier;
use crate::storage::HabitStore;

/// Pause after a failed sweep before its schedule resumes
const ERROR_BACKOFF: Duration = Duration::from_secs(30);

/// How often each background sweep runs
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub reminder_interval: Duration,
    pub streak_alert_interval: Duration,
    pub digest_interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            reminder_interval: Duration::from_secs(60),
            streak_alert_interval: Duration::from_secs(60 * 60 * 24),
            digest_interval: Duration::from_secs(60 * 60 * 24 * 7),
        }
    }
}

/// Spawn the periodic sweeps onto the current tokio runtime
///
/// The reminder sweep fires immediately and then on its interval. The
/// streak alert and digest sweeps wait one full interval before their first
/// pass so a restart does not re-send milestone or digest mail.
pub fn spawn_sweeps<S: HabitStore + 'static>(
    store: Arc<S>,
    generator: Arc<dyn TextGenerator>,
    notifier: Arc<dyn Notifier>,
    config: SweepConfig,
) -> Vec<JoinHandle<()>> {
    let reminder_task = {
        let store = Arc::clone(&store);
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            let mut ticker = interval(config.reminder_interval);
            loop {
                ticker.tick().await;
                match run_reminder_sweep(store.as_ref(), notifier.as_ref(), Utc::now()).await {
                    Ok(0) => {}
                    Ok(sent) => info!("⏰ Reminder sweep sent {} reminder(s)", sent),
                    Err(e) => {
                        warn!("Reminder sweep failed: {}", e);
                        sleep(ERROR_BACKOFF).await;
                    }
                }
            }
        })
    };

    let streak_alert_task = {
        let store = Arc::clone(&store);
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            let period = config.streak_alert_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                match run_streak_alert_sweep(store.as_ref(), notifier.as_ref()).await {
                    Ok(0) => {}
                    Ok(sent) => info!("🔥 Streak alert sweep sent {} alert(s)", sent),
                    Err(e) => {
                        warn!("Streak alert sweep failed: {}", e);
                        sleep(ERROR_BACKOFF).await;
                    }
                }
            }
        })
    };

    let digest_task = tokio::spawn(async move {
        let period = config.digest_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            match run_digest_sweep(store.as_ref(), generator.as_ref(), notifier.as_ref()).await {
                Ok(0) => {}
                Ok(sent) => info!("📨 Digest sweep sent {} digest(s)", sent),
                Err(e) => {
                    warn!("Digest sweep failed: {}", e);
                    sleep(ERROR_BACKOFF).await;
                }
            }
        }
    });

    vec![reminder_task, streak_alert_task, digest_task]
}
