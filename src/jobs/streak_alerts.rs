/// Streak alert sweep
///
/// Celebrates weekly streak milestones. Every habit sitting exactly on a
/// multiple of 7 earns its owner a congratulations message, provided the
/// user has notifications and streak alerts switched on.

use tracing::warn;

use crate::notify::Notifier;
use crate::storage::{HabitStore, StorageError};

/// Run one milestone pass, returning how many alerts were sent
pub async fn run_streak_alert_sweep<S: HabitStore>(
    store: &S,
    notifier: &dyn Notifier,
) -> Result<u32, StorageError> {
    let mut sent = 0;

    for user in store.list_users()? {
        if !(user.settings.notifications && user.settings.streak_alerts) {
            continue;
        }

        let habits = match store.list_habits_for_user(&user.id) {
            Ok(habits) => habits,
            Err(e) => {
                warn!("Could not load habits for {}: {}", user.email, e);
                continue;
            }
        };

        for habit in habits {
            if habit.streak > 0 && habit.streak % 7 == 0 {
                let subject = format!("Streak Alert for {}!", habit.name);
                let body = format!(
                    "Congratulations {}! You've reached a {}-day streak for your habit: {}! Keep up the great work!",
                    user.display_name, habit.streak, habit.name
                );
                match notifier.send(&user.email, &subject, &body).await {
                    Ok(()) => sent += 1,
                    Err(e) => warn!("Streak alert to {} failed: {}", user.email, e),
                }
            }
        }
    }

    Ok(sent)
}
