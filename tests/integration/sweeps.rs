/// Background sweep behavior with recording notifiers
use std::sync::Arc;
use std::time::Duration;

use neurohabit::*;

use crate::support::*;

fn mute(store: &SqliteStore, user_id: &str, update: impl FnOnce(&mut UserSettings)) {
    let id = UserId::from_string(user_id).unwrap();
    let mut settings = store.get_user(&id).unwrap().settings;
    update(&mut settings);
    store.update_settings(&id, &settings).unwrap();
}

#[tokio::test]
async fn test_reminder_sweep_delivers_and_reschedules() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    let habit = seed_reminder_habit(&store, &user_id, "Meditate", at(2024, 1, 10, 8));
    let notifier = RecordingNotifier::new();

    let now = at(2024, 1, 10, 9);
    let sent = run_reminder_sweep(&store, &notifier, now)
        .await
        .expect("Failed to run reminder sweep");

    assert_eq!(sent, 1);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, "ada@example.com");
    assert_eq!(messages[0].subject, "Reminder: Meditate");
    assert!(messages[0].body.contains("Hi Ada,"));
    assert!(messages[0].body.contains("complete your habit: Meditate"));

    // Delivered reminders move a day ahead
    let stored = store.get_habit(&habit.id).expect("Failed to reload habit");
    assert_eq!(stored.next_reminder_at, Some(at(2024, 1, 11, 9)));
}

#[tokio::test]
async fn test_reminder_sweep_skips_muted_users_without_rescheduling() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    let habit = seed_reminder_habit(&store, &user_id, "Meditate", at(2024, 1, 10, 8));
    mute(&store, &user_id, |s| s.habit_reminders = false);
    let notifier = RecordingNotifier::new();

    let sent = run_reminder_sweep(&store, &notifier, at(2024, 1, 10, 9))
        .await
        .expect("Failed to run reminder sweep");

    assert_eq!(sent, 0);
    assert!(notifier.messages().is_empty());

    // The habit stays due, so re-enabling picks it straight back up
    let stored = store.get_habit(&habit.id).unwrap();
    assert_eq!(stored.next_reminder_at, Some(at(2024, 1, 10, 8)));

    mute(&store, &user_id, |s| s.habit_reminders = true);
    let sent = run_reminder_sweep(&store, &notifier, at(2024, 1, 10, 10))
        .await
        .expect("Failed to run reminder sweep");
    assert_eq!(sent, 1);
}

#[tokio::test]
async fn test_reminder_sweep_leaves_failed_deliveries_due() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    let habit = seed_reminder_habit(&store, &user_id, "Meditate", at(2024, 1, 10, 8));

    let sent = run_reminder_sweep(&store, &FailingNotifier, at(2024, 1, 10, 9))
        .await
        .expect("Delivery failures must not fail the sweep");

    assert_eq!(sent, 0);
    let stored = store.get_habit(&habit.id).unwrap();
    assert_eq!(stored.next_reminder_at, Some(at(2024, 1, 10, 8)));
}

#[tokio::test]
async fn test_streak_alerts_fire_on_weekly_milestones() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 7);
    seed_streak_habit(&store, &user_id, "Writing", 14);
    seed_streak_habit(&store, &user_id, "Reading", 5);
    seed_streak_habit(&store, &user_id, "Stalled", 0);
    let notifier = RecordingNotifier::new();

    let sent = run_streak_alert_sweep(&store, &notifier)
        .await
        .expect("Failed to run streak alert sweep");

    assert_eq!(sent, 2);
    let messages = notifier.messages();
    assert_eq!(messages[0].subject, "Streak Alert for Meditate!");
    assert_eq!(
        messages[0].body,
        "Congratulations Ada! You've reached a 7-day streak for your habit: Meditate! Keep up the great work!"
    );
    assert_eq!(messages[1].subject, "Streak Alert for Writing!");
}

#[tokio::test]
async fn test_streak_alerts_respect_settings() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 7);
    mute(&store, &user_id, |s| s.streak_alerts = false);
    let notifier = RecordingNotifier::new();

    let sent = run_streak_alert_sweep(&store, &notifier)
        .await
        .expect("Failed to run streak alert sweep");

    assert_eq!(sent, 0);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_digest_sends_generated_text() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 3);
    seed_streak_habit(&store, &user_id, "Writing", 1);
    let generator = RecordingGenerator::new("You are crushing it.");
    let notifier = RecordingNotifier::new();

    let sent = run_digest_sweep(&store, &generator, &notifier)
        .await
        .expect("Failed to run digest sweep");

    assert_eq!(sent, 1);
    let messages = notifier.messages();
    assert_eq!(messages[0].subject, "Your Weekly AI Insight");
    assert_eq!(
        messages[0].body,
        "Hello Ada,\n\nHere's your weekly AI Insight:\n\nYou are crushing it.\n\nKeep up the great work!"
    );

    let prompt = generator.last_prompt();
    assert!(prompt.contains("a user named Ada"));
    assert!(prompt.contains("The user's habits include: Meditate, Writing"));
}

#[tokio::test]
async fn test_digest_prompt_mentions_empty_habit_list() {
    let store = memory_store();
    register_on(&store, "ada@example.com", "Ada");
    let generator = RecordingGenerator::new("Start small.");
    let notifier = RecordingNotifier::new();

    run_digest_sweep(&store, &generator, &notifier)
        .await
        .expect("Failed to run digest sweep");

    assert!(generator.last_prompt().contains("no habits yet"));
}

#[tokio::test]
async fn test_digest_falls_back_when_generator_fails() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 3);
    let notifier = RecordingNotifier::new();

    let sent = run_digest_sweep(&store, &FailingGenerator, &notifier)
        .await
        .expect("Digest must degrade, not fail");

    assert_eq!(sent, 1);
    let messages = notifier.messages();
    assert!(messages[0]
        .body
        .contains("Log completion *within 60 seconds* of finishing."));
}

#[tokio::test]
async fn test_digest_skips_opted_out_users() {
    let store = memory_store();
    let opted_out = register_on(&store, "ada@example.com", "Ada");
    mute(&store, &opted_out, |s| s.ai_insights = false);
    register_on(&store, "sam@example.com", "Sam");
    let notifier = RecordingNotifier::new();

    let sent = run_digest_sweep(&store, &CannedGenerator::new("Nice week."), &notifier)
        .await
        .expect("Failed to run digest sweep");

    assert_eq!(sent, 1);
    assert_eq!(notifier.messages()[0].to, "sam@example.com");
}

#[tokio::test]
async fn test_spawned_sweeps_deliver_on_schedule() {
    let store = Arc::new(memory_store());
    let user_id = register_on(store.as_ref(), "ada@example.com", "Ada");
    seed_reminder_habit(
        store.as_ref(),
        &user_id,
        "Meditate",
        chrono::Utc::now() - chrono::Duration::minutes(5),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let service = HabitService::with_collaborators(
        Arc::clone(&store),
        Arc::new(OfflineGenerator) as Arc<dyn TextGenerator>,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    let handles = service.spawn_sweeps(SweepConfig {
        reminder_interval: Duration::from_millis(50),
        streak_alert_interval: Duration::from_secs(3600),
        digest_interval: Duration::from_secs(3600),
    });

    tokio::time::sleep(Duration::from_millis(250)).await;
    for handle in &handles {
        handle.abort();
    }

    // The reminder fires once and is rescheduled a day out
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].subject, "Reminder: Meditate");
}
