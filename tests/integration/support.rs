/// Shared fakes and helpers for the integration suite
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use neurohabit::*;

pub fn memory_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("Failed to open in-memory store")
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn register_on<S: HabitStore>(store: &S, email: &str, name: &str) -> String {
    register_user(
        store,
        RegisterUserParams {
            email: email.to_string(),
            display_name: name.to_string(),
        },
    )
    .expect("Failed to register user")
    .user_id
}

/// Store a habit with an already-due reminder
pub fn seed_reminder_habit(
    store: &SqliteStore,
    user_id: &str,
    name: &str,
    due_at: DateTime<Utc>,
) -> Habit {
    let owner = UserId::from_string(user_id).expect("Failed to parse user id");
    let mut habit = Habit::new(owner, name.to_string(), None, Frequency::Daily)
        .expect("Failed to build habit");
    habit.reminder_enabled = true;
    habit.reminder_time = Some("08:00".to_string());
    habit.next_reminder_at = Some(due_at);
    store.create_habit(&habit).expect("Failed to store habit");
    habit
}

/// Store a habit holding a given streak
pub fn seed_streak_habit(store: &SqliteStore, user_id: &str, name: &str, streak: u32) -> Habit {
    let owner = UserId::from_string(user_id).expect("Failed to parse user id");
    let mut habit = Habit::new(owner, name.to_string(), None, Frequency::Daily)
        .expect("Failed to build habit");
    habit.streak = streak;
    store.create_habit(&habit).expect("Failed to store habit");
    habit
}

/// Generator that always answers with the same canned text
pub struct CannedGenerator {
    reply: String,
}

impl CannedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.reply.clone())
    }
}

/// Generator that records every prompt and answers with canned text
pub struct RecordingGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("No prompt was recorded")
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Generator that always fails
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Failed(
            "model endpoint unreachable".to_string(),
        ))
    }
}

/// One notification captured by the recording notifier
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records instead of delivering
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Notifier that always fails to deliver
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp connection refused".to_string()))
    }
}
