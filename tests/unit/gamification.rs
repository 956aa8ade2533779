/// XP, level and badge behavior through the completion path
use neurohabit::*;

use crate::support::*;

#[test]
fn test_first_completion_awards_xp_and_first_step() {
    let store = memory_store();
    let user_id = register(&store, "ada@example.com", "Ada");
    let habit_id = add_habit(&store, &user_id, "Exercise");

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
    assert_eq!(response.new_level, None);
    assert_eq!(response.new_badges.len(), 1);
    assert_eq!(response.new_badges[0].id, "first_step");
    assert!(response.message.contains("🌱 Badge earned: First Step!"));

    let profile = get_user_profile(&store, &user_id).unwrap();
    assert_eq!(profile.xp, 10);
    assert_eq!(profile.level, 1);
}

#[test]
fn test_level_up_at_hundred_xp() {
    let store = memory_store();
    let user_id = register(&store, "ada@example.com", "Ada");
    let habit_id = add_habit(&store, &user_id, "Exercise");

    // Push the profile to the edge of level 2
    let id = UserId::from_string(&user_id).unwrap();
    let profile = GamificationProfile {
        xp: 95,
        level: 1,
        badges: Vec::new(),
    };
    assert!(store.update_profile(&id, 0, &profile).unwrap());

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id,
        },
        at(2024, 1, 2, 8),
    )
    .expect("Failed to complete habit");

    assert_eq!(response.new_level, Some(2));
    assert!(response.message.contains("⭐ Level 2 reached!"));

    let view = get_user_profile(&store, &user_id).unwrap();
    assert_eq!(view.xp, 105);
    assert_eq!(view.level, 2);
}

#[test]
fn test_week_milestone_awards_two_badges_at_once() {
    let store = memory_store();
    let user_id = register(&store, "ada@example.com", "Ada");
    let habit = seed_streaky_habit(&store, &user_id, "Meditate", 6, Some("2024-01-01"));

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id,
            habit_id: habit.id.to_string(),
        },
        at(2024, 1, 2, 8),
    )
    .expect("Failed to complete habit");

    assert_eq!(response.streak, 7);
    let names: Vec<&str> = response.new_badges.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["First Step", "Streak Master"]);
    assert!(response.message.contains("🔥 Badge earned: Streak Master!"));
}

#[test]
fn test_month_milestone_awards_full_set() {
    let store = memory_store();
    let user_id = register(&store, "ada@example.com", "Ada");
    let habit = seed_streaky_habit(&store, &user_id, "Meditate", 29, Some("2024-01-01"));

    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id: habit.id.to_string(),
        },
        at(2024, 1, 2, 8),
    )
    .expect("Failed to complete habit");

    assert_eq!(response.streak, 30);
    let ids: Vec<&str> = response.new_badges.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["first_step", "streak_master", "consistency_king"]);

    let profile = get_user_profile(&store, &user_id).unwrap();
    assert_eq!(profile.badges.len(), 3);
}

#[test]
fn test_badges_are_never_reawarded() {
    let store = memory_store();
    let user_id = register(&store, "ada@example.com", "Ada");
    let first = add_habit(&store, &user_id, "Exercise");
    complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id: first,
        },
        at(2024, 1, 2, 8),
    )
    .unwrap();

    // A second habit reaching 7 only earns the badge not yet held
    let habit = seed_streaky_habit(&store, &user_id, "Meditate", 6, Some("2024-01-01"));
    let response = complete_habit(
        &store,
        CompleteHabitParams {
            user_id: user_id.clone(),
            habit_id: habit.id.to_string(),
        },
        at(2024, 1, 2, 9),
    )
    .unwrap();

    let ids: Vec<&str> = response.new_badges.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["streak_master"]);

    let profile = get_user_profile(&store, &user_id).unwrap();
    assert_eq!(profile.badges.len(), 2);
    assert_eq!(profile.xp, 20);
}
