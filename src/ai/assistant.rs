/// Conversational assistant - chat and the boot-sequence intro
///
/// Unlike insights, these operations have no deterministic fallback. When
/// the generator is down there is nothing sensible to improvise, so the
/// failure is surfaced to the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ai::TextGenerator;
use crate::domain::DomainError;
use crate::service::ServiceError;

/// One prior turn of a conversation
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChatTurn {
    /// Either "user" or "model"
    pub role: String,
    pub content: String,
}

/// Parameters for a chat exchange
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChatParams {
    pub message: String,
    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Response from a chat exchange
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Send a message to the assistant and return its reply
pub async fn chat(
    generator: &dyn TextGenerator,
    params: ChatParams,
) -> Result<ChatResponse, ServiceError> {
    if params.message.trim().is_empty() {
        return Err(DomainError::Validation {
            message: "Message cannot be empty".to_string(),
        }
        .into());
    }

    // Flatten the conversation so stateless generators see the context
    let mut prompt = String::new();
    for turn in &params.history {
        prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    prompt.push_str(&format!("user: {}\nmodel:", params.message));

    let response = generator.generate(&prompt).await?;

    Ok(ChatResponse { response })
}

/// Generate the assistant's boot-sequence introduction
///
/// Returns one line per message, suitable for a typing animation.
pub async fn assistant_intro(
    generator: &dyn TextGenerator,
    display_name: &str,
) -> Result<Vec<String>, ServiceError> {
    let prompt = format!(
        "Generate a short, futuristic, and welcoming introduction for a neural assistant \
         named 'NEURAL_ASSISTANT' for a habit tracking application. The user's name is {}. \
         The introduction should be in the style of a system boot sequence, including \
         elements like system checks, user identification, and readiness confirmation. \
         Each line should be a distinct message, suitable for a typing animation.",
        display_name
    );

    let text = generator.generate(&prompt).await?;

    Ok(text.split('\n').map(|line| line.to_string()).collect())
}
