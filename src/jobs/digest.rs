/// Weekly digest sweep
///
/// Sends each opted-in user a personalized insight message. The text comes
/// from the generator when it cooperates; otherwise the digest falls back to
/// the offline insight lines so the mail still carries something useful.
/// One user failing never stops the sweep for everyone else.

use tracing::{debug, warn};

use crate::ai::insights::fallback_insight_lines;
use crate::ai::TextGenerator;
use crate::notify::Notifier;
use crate::storage::{HabitStore, StorageError};

/// Run one digest pass, returning how many digests were sent
pub async fn run_digest_sweep<S: HabitStore>(
    store: &S,
    generator: &dyn TextGenerator,
    notifier: &dyn Notifier,
) -> Result<u32, StorageError> {
    let mut sent = 0;

    for user in store.list_users()? {
        if !(user.settings.notifications && user.settings.ai_insights) {
            continue;
        }
        if user.email.is_empty() {
            debug!("User {} has no email on file, skipping digest", user.id.to_string());
            continue;
        }

        let habits = match store.list_habits_for_user(&user.id) {
            Ok(habits) => habits,
            Err(e) => {
                warn!("Could not load habits for {}: {}", user.email, e);
                continue;
            }
        };
        let habit_names = if habits.is_empty() {
            "no habits yet".to_string()
        } else {
            habits
                .iter()
                .map(|h| h.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let prompt = format!(
            "Generate a short, encouraging and personalized AI insight for a user named {}. \
             The user's habits include: {}. Focus on motivation and progress. \
             Format the insight as a friendly, concise message.",
            user.display_name, habit_names
        );
        let insight = match generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Digest generation for {} failed, using offline lines: {}", user.email, e);
                fallback_insight_lines(&habits).join("\n")
            }
        };

        let body = format!(
            "Hello {},\n\nHere's your weekly AI Insight:\n\n{}\n\nKeep up the great work!",
            user.display_name, insight
        );
        match notifier.send(&user.email, "Your Weekly AI Insight", &body).await {
            Ok(()) => sent += 1,
            Err(e) => warn!("Digest to {} failed: {}", user.email, e),
        }
    }

    Ok(sent)
}
