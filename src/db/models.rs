use serde::{Deserialize, Serialize};

/// Preference defaults applied when a user is created or when a stored
/// record predates a field.
pub const DEFAULT_AI_ROLE: &str = "Virtual assistant AI.";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_SCENARIO: &str = "en";

/// Identity and preference record in the `users` collection.
///
/// Preference fields are optional here because legacy records may lack
/// them; defaults are applied at aggregation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub ai_role: Option<String>,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub scenario: Option<String>,
    pub created_at: Option<String>,
}

/// One utterance in the `chat_messages` collection. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// Owner reference: the string id of the user document.
    pub user_id: String,
    pub content: String,
    /// True when spoken by the human, false for the assistant reply.
    pub is_user: bool,
    /// ISO-8601; both sides of one exchange share the same value.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// One user-authored scenario in the `custom_scenarios` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub user_id: String,
    pub scenario_id: String,
    pub title: String,
    pub description: String,
    pub role: String,
    pub created_at: String,
}

/// One practice exchange as callers (and legacy snapshots) supply it:
/// a human utterance and/or an assistant reply, sharing a timestamp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Input to the user create-or-update path. Omitted preference fields are
/// left untouched on update and defaulted on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpsert {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A scenario as callers supply it; `id` is the caller-chosen scenario id,
/// unique per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
