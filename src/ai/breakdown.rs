/// Goal breakdown - turn a free-form goal into habit drafts
///
/// The generator is asked for strict JSON. Code fences are tolerated because
/// models love wrapping JSON in them, but anything that does not parse into
/// the expected shape is an error: silently inventing habits on the user's
/// behalf would be worse than admitting failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ai::{GenerationError, TextGenerator};
use crate::domain::DomainError;
use crate::service::ServiceError;

/// Parameters for breaking a goal down
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BreakdownParams {
    /// The goal in the user's own words
    pub goal: String,
}

/// One suggested habit, not yet created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    pub description: String,
    /// Suggested cadence, advisory only
    pub frequency: String,
}

/// Response from the goal breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownResponse {
    pub habits: Vec<HabitDraft>,
}

/// Break a goal into 3-5 concrete habit drafts
pub async fn goal_breakdown(
    generator: &dyn TextGenerator,
    params: BreakdownParams,
) -> Result<BreakdownResponse, ServiceError> {
    let goal = params.goal.trim();
    if goal.is_empty() {
        return Err(DomainError::Validation {
            message: "Goal cannot be empty".to_string(),
        }
        .into());
    }

    let prompt = format!(
        "Break the following goal into 3-5 small, concrete daily or weekly habits.\n\
         \n\
         Goal: {}\n\
         \n\
         Respond with STRICT JSON only, no prose, in exactly this shape:\n\
         {{\"habits\": [{{\"name\": \"...\", \"description\": \"...\", \"frequency\": \"daily\"}}]}}\n\
         \n\
         Each name must be short enough to show in a list. Each description is one \
         sentence. Frequency is \"daily\" or \"weekly\".",
        goal
    );

    let text = generator.generate(&prompt).await?;
    let cleaned = strip_code_fences(&text);

    let response: BreakdownResponse = serde_json::from_str(cleaned).map_err(|e| {
        GenerationError::Malformed(format!("Goal breakdown was not valid JSON: {}", e))
    })?;

    Ok(response)
}

/// Strip a surrounding markdown code fence, if any
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The opening fence may carry a language tag, drop that whole line
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or_else(|| body.trim())
}
