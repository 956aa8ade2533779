/// Reminder sweep
///
/// Finds habits whose next_reminder_at has come due and sends each owner a
/// nudge, honoring the per-user notification switches. A habit is only
/// rescheduled after its reminder actually went out; skipped or failed
/// deliveries stay due and are retried on the next sweep.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::notify::Notifier;
use crate::storage::{HabitStore, StorageError};

/// Run one reminder pass, returning how many reminders were sent
pub async fn run_reminder_sweep<S: HabitStore>(
    store: &S,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> Result<u32, StorageError> {
    let mut sent = 0;

    for mut habit in store.list_due_reminders(now)? {
        let user = match store.get_user(&habit.user_id) {
            Ok(user) => user,
            Err(StorageError::UserNotFound { .. }) => {
                warn!(
                    "Habit {} has no owner, skipping its reminder",
                    habit.id.to_string()
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        if !(user.settings.notifications && user.settings.habit_reminders) {
            debug!(
                "Reminders muted for {}, leaving habit {} due",
                user.email, habit.name
            );
            continue;
        }

        let subject = format!("Reminder: {}", habit.name);
        let body = format!(
            "Hi {},\n\nThis is a reminder to complete your habit: {}.",
            user.display_name, habit.name
        );
        if let Err(e) = notifier.send(&user.email, &subject, &body).await {
            warn!("Reminder to {} failed, will retry: {}", user.email, e);
            continue;
        }

        habit.next_reminder_at = Some(now + Duration::days(1));
        store.update_habit(&habit)?;
        sent += 1;
    }

    Ok(sent)
}
