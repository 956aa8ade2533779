/// Conditional-write retry behavior under simulated write races
use neurohabit::*;

use crate::support::*;

fn seeded(completion_rejections: u32, profile_rejections: u32) -> (ContendedStore, String, String) {
    let store = ContendedStore::new(completion_rejections, profile_rejections);
    let user_id = register(&store, "ada@example.com", "Ada");
    let habit_id = add_habit(&store, &user_id, "Exercise");
    (store, user_id, habit_id)
}

#[test]
fn test_lost_race_retries_and_succeeds() {
    let (store, user_id, habit_id) = seeded(1, 0);

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id,
        },
        at(2024, 1, 2, 8),
    )
    .expect("A single lost race should be retried");

    assert!(response.success);
    assert_eq!(response.streak, 1);

    let events = store
        .events_for_user(&UserId::from_string(&user_id).unwrap(), None)
        .unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn test_persistent_conflict_exhausts_attempts() {
    let (store, user_id, habit_id) = seeded(MAX_WRITE_ATTEMPTS, 0);

    let result = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id: habit_id.clone(),
        },
        at(2024, 1, 2, 8),
    );

    assert!(matches!(result, Err(ServiceError::ConcurrentConflict(_))));

    // Nothing was recorded: no ledger entry, no streak, no XP
    let id = UserId::from_string(&user_id).unwrap();
    assert!(store.events_for_user(&id, None).unwrap().is_empty());
    let habit = store
        .get_habit(&HabitId::from_string(&habit_id).unwrap())
        .unwrap();
    assert_eq!(habit.streak, 0);
    assert_eq!(store.get_user(&id).unwrap().profile.xp, 0);
}

#[test]
fn test_reward_race_degrades_to_no_reward() {
    let (store, user_id, habit_id) = seeded(0, MAX_WRITE_ATTEMPTS);

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id,
        },
        at(2024, 1, 2, 8),
    )
    .expect("Completion must survive a reward write failure");

    assert!(response.success);
    assert_eq!(response.streak, 1);
    assert_eq!(response.xp_gained, 0);
    assert_eq!(response.new_level, None);
    assert!(response.new_badges.is_empty());

    // The completion itself is durable even though the reward was dropped
    let id = UserId::from_string(&user_id).unwrap();
    assert_eq!(store.events_for_user(&id, None).unwrap().len(), 1);
    assert_eq!(store.get_user(&id).unwrap().profile.xp, 0);
}

#[test]
fn test_reward_retry_recovers() {
    let (store, user_id, habit_id) = seeded(0, 1);

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id,
        },
        at(2024, 1, 2, 8),
    )
    .expect("Failed to complete habit");

    assert_eq!(response.xp_gained, 10);
    assert_eq!(response.new_badges.len(), 1);

    let id = UserId::from_string(&user_id).unwrap();
    assert_eq!(store.get_user(&id).unwrap().profile.xp, 10);
}
