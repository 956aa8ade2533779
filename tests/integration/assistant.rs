/// Assistant flows with scripted generators
use std::sync::Arc;

use neurohabit::*;

use crate::support::*;

#[tokio::test]
async fn test_chat_flattens_history_into_prompt() {
    let generator = RecordingGenerator::new("Keep going!");

    let response = chat(
        &generator,
        ChatParams {
            message: "How do I improve?".to_string(),
            history: vec![
                ChatTurn {
                    role: "user".to_string(),
                    content: "Hi".to_string(),
                },
                ChatTurn {
                    role: "model".to_string(),
                    content: "Hello!".to_string(),
                },
            ],
        },
    )
    .await
    .expect("Failed to chat");

    assert_eq!(response.response, "Keep going!");
    assert_eq!(
        generator.last_prompt(),
        "user: Hi\nmodel: Hello!\nuser: How do I improve?\nmodel:"
    );
}

#[tokio::test]
async fn test_intro_is_personalized_and_split_by_line() {
    let store = Arc::new(memory_store());
    let generator = Arc::new(RecordingGenerator::new(
        "INITIALIZING NEURAL_ASSISTANT...\nUSER IDENTIFIED: RILEY\nALL SYSTEMS READY",
    ));
    let service = HabitService::with_collaborators(
        Arc::clone(&store),
        Arc::clone(&generator) as Arc<dyn TextGenerator>,
        Arc::new(RecordingNotifier::new()),
    );
    let user_id = register_on(store.as_ref(), "riley@example.com", "Riley");

    let lines = service
        .assistant_intro(&user_id)
        .await
        .expect("Failed to build intro");

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "USER IDENTIFIED: RILEY");
    assert!(generator.last_prompt().contains("The user's name is Riley"));
}

#[tokio::test]
async fn test_insights_clean_generated_lines() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    let owner = UserId::from_string(&user_id).unwrap();
    let mut habit = Habit::new(owner, "Morning run".to_string(), None, Frequency::Daily).unwrap();
    habit.streak = 5;
    habit.last_completed = Some("2024-01-09".to_string());
    habit.completion_history.push("2024-01-09".to_string());
    store.create_habit(&habit).unwrap();

    let generator = RecordingGenerator::new(
        "• Your morning runs anchor the rest of your day\n\
         - Keep the reading streak protected this week\n\
         short\n\
         Log your completion immediately after finishing",
    );

    let response = habit_insights(&store, &generator, &user_id, at(2024, 1, 10, 9))
        .await
        .expect("Failed to build insights");

    assert_eq!(response.insights.len(), 3);
    assert_eq!(
        response.insights[0].insight,
        "Your morning runs anchor the rest of your day"
    );
    assert_eq!(
        response.insights[1].insight,
        "Keep the reading streak protected this week"
    );
    assert_eq!(
        response.insights[2].insight,
        "Log your completion immediately after finishing"
    );

    let ids: Vec<&str> = response.insights.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["insight-0", "insight-1", "insight-2"]);
    let confidences: Vec<u32> = response.insights.iter().map(|i| i.confidence).collect();
    assert_eq!(confidences, vec![70, 75, 80]);

    // The prompt carries the persona and the habit matrix
    let prompt = generator.last_prompt();
    assert!(prompt.contains("NEURAL_HABIT_AI"));
    assert!(prompt.contains("- Morning run: Streak 5 days, 1 completions, Last 2024-01-09"));
}

#[tokio::test]
async fn test_insights_cap_at_five() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Exercise", 3);

    let reply = (1..=8)
        .map(|i| format!("Observation number {} about your habits", i))
        .collect::<Vec<_>>()
        .join("\n");
    let generator = CannedGenerator::new(&reply);

    let response = habit_insights(&store, &generator, &user_id, at(2024, 1, 10, 9))
        .await
        .expect("Failed to build insights");

    assert_eq!(response.insights.len(), 5);
    let confidences: Vec<u32> = response.insights.iter().map(|i| i.confidence).collect();
    assert_eq!(confidences, vec![70, 75, 80, 85, 90]);
    let categories: Vec<&str> = response
        .insights
        .iter()
        .map(|i| i.category.as_str())
        .collect();
    assert_eq!(
        categories,
        vec!["Pattern", "Motivation", "Optimization", "Behavior", "Pattern"]
    );
}

#[tokio::test]
async fn test_insights_pad_short_output_with_offline_lines() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Exercise", 0);

    let generator = CannedGenerator::new("A single useful observation about momentum");

    let response = habit_insights(&store, &generator, &user_id, at(2024, 1, 10, 9))
        .await
        .expect("Failed to build insights");

    assert!(response.insights.len() >= 3);
    assert_eq!(
        response.insights[0].insight,
        "A single useful observation about momentum"
    );
    assert_eq!(
        response.insights[1].insight,
        "Zero active streaks. Pick one habit. Complete it *today*. No excuses."
    );
    assert!(response.insights.iter().all(|i| i.id.starts_with("insight-")));
}

#[tokio::test]
async fn test_insights_survive_generator_failure() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Exercise", 3);

    let response = habit_insights(&store, &FailingGenerator, &user_id, at(2024, 1, 10, 9))
        .await
        .expect("Insight generation must degrade, not fail");

    assert!(!response.insights.is_empty());
    assert!(response.insights.iter().all(|i| i.id.starts_with("neural-")));
}

#[tokio::test]
async fn test_breakdown_parses_fenced_json() {
    let generator = CannedGenerator::new(
        "```json\n\
         {\"habits\": [\n\
           {\"name\": \"Run 5k\", \"description\": \"Run five kilometers\", \"frequency\": \"daily\"},\n\
           {\"name\": \"Stretch\", \"description\": \"Ten minutes of stretching\", \"frequency\": \"daily\"},\n\
           {\"name\": \"Long run\", \"description\": \"One long run\", \"frequency\": \"weekly\"}\n\
         ]}\n\
         ```",
    );

    let response = goal_breakdown(
        &generator,
        BreakdownParams {
            goal: "Run a marathon".to_string(),
        },
    )
    .await
    .expect("Failed to break down goal");

    assert_eq!(response.habits.len(), 3);
    assert_eq!(response.habits[0].name, "Run 5k");
    assert_eq!(response.habits[2].frequency, "weekly");
}

#[tokio::test]
async fn test_breakdown_rejects_malformed_json() {
    let generator = CannedGenerator::new("Sure! Here are some habits you could try.");

    let result = goal_breakdown(
        &generator,
        BreakdownParams {
            goal: "Run a marathon".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::AssistantUnavailable(_))));
}

#[tokio::test]
async fn test_schedule_uses_generated_plan_when_valid() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 2);

    let generator = CannedGenerator::new(
        "{\"suggestions\": [{\"habit_id\": \"abc\", \"habit_name\": \"Meditate\", \
         \"suggested_time\": \"06:30\", \"reason\": \"Calm start before work\"}]}",
    );

    let response = schedule_suggestions(&store, &generator, &user_id)
        .await
        .expect("Failed to build schedule");

    assert_eq!(response.suggestions.len(), 1);
    assert_eq!(response.suggestions[0].suggested_time, "06:30");
    assert_eq!(response.suggestions[0].reason, "Calm start before work");
}

#[tokio::test]
async fn test_schedule_recovers_from_malformed_plan() {
    let store = memory_store();
    let user_id = register_on(&store, "ada@example.com", "Ada");
    seed_streak_habit(&store, &user_id, "Meditate", 2);

    let generator = CannedGenerator::new("I think mornings are nice.");

    let response = schedule_suggestions(&store, &generator, &user_id)
        .await
        .expect("Schedule must degrade, not fail");

    assert_eq!(response.suggestions.len(), 1);
    assert_eq!(response.suggestions[0].suggested_time, "08:00");
}
