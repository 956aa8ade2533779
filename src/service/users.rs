/// Account operations: registration, profile reads, settings and export
///
/// Registration seeds the gamification profile and default notification
/// settings. The export operation bundles everything the service knows about
/// one user into a single response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{CompletionEvent, EarnedBadge, User, UserSettings};
use crate::service::{parse_user_id, HabitView, ServiceError};
use crate::storage::HabitStore;

/// Parameters for registering a new user
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegisterUserParams {
    /// Contact email, must be unique
    pub email: String,
    /// Name shown in messages and digests
    pub display_name: String,
}

/// Response from registering a user
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUserResponse {
    pub user_id: String,
    pub message: String,
}

/// Register a new user account
pub fn register_user<S: HabitStore>(
    store: &S,
    params: RegisterUserParams,
) -> Result<RegisterUserResponse, ServiceError> {
    let user = User::new(params.email.trim().to_string(), params.display_name)?;
    store.create_user(&user)?;

    info!("Registered user {} ({})", user.display_name, user.id.to_string());

    Ok(RegisterUserResponse {
        user_id: user.id.to_string(),
        message: format!("🎉 Welcome aboard, {}! Your account is ready.", user.display_name),
    })
}

/// User account data shaped for responses
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub xp: u32,
    pub level: u32,
    pub badges: Vec<EarnedBadge>,
    pub settings: UserSettings,
    pub created_at: String,
}

impl UserView {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            xp: user.profile.xp,
            level: user.profile.level,
            badges: user.profile.badges.clone(),
            settings: user.settings.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Get a user's account, profile and settings
pub fn get_user_profile<S: HabitStore>(
    store: &S,
    user_id: &str,
) -> Result<UserView, ServiceError> {
    let id = parse_user_id(user_id)?;
    let user = store.get_user(&id)?;
    Ok(UserView::from_user(&user))
}

/// Parameters for updating notification settings
///
/// Omitted switches keep their current value.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateSettingsParams {
    pub user_id: String,
    pub notifications: Option<bool>,
    pub habit_reminders: Option<bool>,
    pub streak_alerts: Option<bool>,
    pub ai_insights: Option<bool>,
}

/// Response from updating settings
#[derive(Debug, Clone, Serialize)]
pub struct UpdateSettingsResponse {
    pub settings: UserSettings,
    pub message: String,
}

/// Merge the provided switches into a user's notification settings
pub fn update_settings<S: HabitStore>(
    store: &S,
    params: UpdateSettingsParams,
) -> Result<UpdateSettingsResponse, ServiceError> {
    let id = parse_user_id(&params.user_id)?;
    let user = store.get_user(&id)?;

    let settings = UserSettings {
        notifications: params.notifications.unwrap_or(user.settings.notifications),
        habit_reminders: params.habit_reminders.unwrap_or(user.settings.habit_reminders),
        streak_alerts: params.streak_alerts.unwrap_or(user.settings.streak_alerts),
        ai_insights: params.ai_insights.unwrap_or(user.settings.ai_insights),
    };
    store.update_settings(&id, &settings)?;

    Ok(UpdateSettingsResponse {
        settings,
        message: "⚙️ Notification settings saved.".to_string(),
    })
}

/// A completion event shaped for responses
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: String,
    pub habit_id: String,
    pub habit_name: String,
    pub recorded_at: String,
    pub completed_on: String,
}

impl EventView {
    pub fn from_event(event: &CompletionEvent) -> Self {
        Self {
            id: event.id.to_string(),
            habit_id: event.habit_id.to_string(),
            habit_name: event.habit_name.clone(),
            recorded_at: event.recorded_at.to_rfc3339(),
            completed_on: event.completed_on.to_string(),
        }
    }
}

/// Everything the service knows about one user
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub user: UserView,
    pub habits: Vec<HabitView>,
    pub events: Vec<EventView>,
    pub exported_at: String,
}

/// Export a user's account, habits and full completion ledger
pub fn export_user_data<S: HabitStore>(
    store: &S,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<ExportResponse, ServiceError> {
    let id = parse_user_id(user_id)?;
    let user = store.get_user(&id)?;
    let habits = store.list_habits_for_user(&id)?;
    let events = store.events_for_user(&id, None)?;

    Ok(ExportResponse {
        user: UserView::from_user(&user),
        habits: habits.iter().map(HabitView::from_habit).collect(),
        events: events.iter().map(EventView::from_event).collect(),
        exported_at: now.to_rfc3339(),
    })
}
