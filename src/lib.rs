/// Public library interface for the NeuroHabit service core
///
/// This module wires the storage, domain, analytics, AI, and notification
/// layers into a single HabitService facade and re-exports the public types
/// used by embedding applications and tests.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

// Internal modules
//
// analytics is public so its name is not shadowed by the service glob
// re-export below, which also carries a module called analytics.
mod ai;
pub mod analytics;
mod domain;
mod jobs;
mod notify;
mod service;
mod storage;

// Re-export public modules and types
pub use ai::*;
pub use analytics::*;
pub use domain::*;
pub use jobs::{
    run_digest_sweep, run_reminder_sweep, run_streak_alert_sweep, spawn_sweeps, SweepConfig,
};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use service::*;
pub use storage::{HabitStore, SqliteStore, StorageError};

/// Main service facade over the habit tracking core
///
/// Owns the store plus the pluggable generator and notifier collaborators,
/// and exposes every operation as a method so embedding code never touches
/// the layer functions directly. Time-dependent operations stamp Utc::now()
/// here; the layer functions take an explicit clock so tests can pin it.
pub struct HabitService<S: HabitStore = SqliteStore> {
    store: Arc<S>,
    generator: Arc<dyn TextGenerator>,
    notifier: Arc<dyn Notifier>,
}

impl HabitService<SqliteStore> {
    /// Open (or create) the SQLite database and build a service around it
    ///
    /// Uses the offline generator and the logging notifier, which is the
    /// right default for a worker with no AI key or mail credentials.
    pub fn new(db_path: PathBuf) -> Result<Self, ServiceError> {
        tracing::info!("Opening habit database at {:?}", db_path);
        let store = SqliteStore::new(db_path)?;
        Ok(Self {
            store: Arc::new(store),
            generator: Arc::new(OfflineGenerator),
            notifier: Arc::new(LogNotifier),
        })
    }
}

impl<S: HabitStore> HabitService<S> {
    /// Build a service from explicit collaborators
    pub fn with_collaborators(
        store: Arc<S>,
        generator: Arc<dyn TextGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            generator,
            notifier,
        }
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new user account
    pub fn register_user(
        &self,
        params: RegisterUserParams,
    ) -> Result<RegisterUserResponse, ServiceError> {
        service::users::register_user(self.store.as_ref(), params)
    }

    /// Fetch a user's profile, settings and gamification state
    pub fn get_user_profile(&self, user_id: &str) -> Result<UserView, ServiceError> {
        service::users::get_user_profile(self.store.as_ref(), user_id)
    }

    /// Update a user's notification settings
    pub fn update_settings(
        &self,
        params: UpdateSettingsParams,
    ) -> Result<UpdateSettingsResponse, ServiceError> {
        service::users::update_settings(self.store.as_ref(), params)
    }

    /// Export everything stored for one user
    pub fn export_user_data(&self, user_id: &str) -> Result<ExportResponse, ServiceError> {
        service::users::export_user_data(self.store.as_ref(), user_id, Utc::now())
    }

    /// Create a new habit for a user
    pub fn create_habit(
        &self,
        params: CreateHabitParams,
    ) -> Result<CreateHabitResponse, ServiceError> {
        service::habits::create_habit(self.store.as_ref(), params, Utc::now())
    }

    /// List all of a user's habits
    pub fn list_habits(&self, user_id: &str) -> Result<Vec<HabitView>, ServiceError> {
        service::habits::list_habits(self.store.as_ref(), user_id)
    }

    /// Fetch one habit, enforcing ownership
    pub fn get_habit(&self, user_id: &str, habit_id: &str) -> Result<HabitView, ServiceError> {
        service::habits::get_habit(self.store.as_ref(), user_id, habit_id)
    }

    /// Update a habit's descriptive fields and reminder configuration
    pub fn update_habit(
        &self,
        params: UpdateHabitParams,
    ) -> Result<UpdateHabitResponse, ServiceError> {
        service::habits::update_habit(self.store.as_ref(), params, Utc::now())
    }

    /// Delete a habit, keeping its completion events
    pub fn delete_habit(
        &self,
        user_id: &str,
        habit_id: &str,
    ) -> Result<DeleteHabitResponse, ServiceError> {
        service::habits::delete_habit(self.store.as_ref(), user_id, habit_id)
    }

    /// Record today's completion for a habit and apply rewards
    pub fn complete_habit(
        &self,
        params: CompleteHabitParams,
    ) -> Result<CompleteHabitResponse, ServiceError> {
        service::completion::complete_habit(self.store.as_ref(), params, Utc::now())
    }

    /// Aggregate completion analytics over a trailing window
    pub fn analytics_overview(
        &self,
        params: AnalyticsParams,
    ) -> Result<AnalyticsResponse, ServiceError> {
        service::analytics::analytics_overview(self.store.as_ref(), params, Utc::now())
    }

    /// Build the all-time completion heatmap for a user
    pub fn completion_heatmap(&self, user_id: &str) -> Result<HeatmapResponse, ServiceError> {
        service::analytics::completion_heatmap(self.store.as_ref(), user_id)
    }

    /// Free-form chat with the assistant
    pub async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ServiceError> {
        ai::assistant::chat(self.generator.as_ref(), params).await
    }

    /// Boot-sequence introduction lines for the assistant, personalized
    pub async fn assistant_intro(&self, user_id: &str) -> Result<Vec<String>, ServiceError> {
        let user_id = service::parse_user_id(user_id)?;
        let user = self.store.get_user(&user_id)?;
        ai::assistant::assistant_intro(self.generator.as_ref(), &user.display_name).await
    }

    /// Break a free-form goal into habit drafts
    pub async fn goal_breakdown(
        &self,
        params: BreakdownParams,
    ) -> Result<BreakdownResponse, ServiceError> {
        ai::breakdown::goal_breakdown(self.generator.as_ref(), params).await
    }

    /// Generate behavioral insights from a user's habit data
    pub async fn habit_insights(&self, user_id: &str) -> Result<InsightsResponse, ServiceError> {
        ai::insights::habit_insights(
            self.store.as_ref(),
            self.generator.as_ref(),
            user_id,
            Utc::now(),
        )
        .await
    }

    /// Suggest a time of day for each of a user's habits
    pub async fn schedule_suggestions(
        &self,
        user_id: &str,
    ) -> Result<ScheduleResponse, ServiceError> {
        ai::schedule::schedule_suggestions(self.store.as_ref(), self.generator.as_ref(), user_id)
            .await
    }

    /// Spawn the background sweeps onto the current tokio runtime
    pub fn spawn_sweeps(&self, config: SweepConfig) -> Vec<JoinHandle<()>>
    where
        S: 'static,
    {
        jobs::spawn_sweeps(
            Arc::clone(&self.store),
            Arc::clone(&self.generator),
            Arc::clone(&self.notifier),
            config,
        )
    }
}
