use serde::Serialize;

use crate::db::models::{
    ChatMessageRecord, ScenarioRecord, DEFAULT_AI_ROLE, DEFAULT_LANGUAGE, DEFAULT_LOCALE,
    DEFAULT_SCENARIO,
};
use crate::db::{MessageRepository, ScenarioRepository, UserRepository};
use crate::error::AppError;
use crate::store::DocumentStore;

/// One human/assistant exchange as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub user: String,
    pub ai: String,
    pub timestamp: String,
}

/// A scenario as presented to the caller; the owner reference is stripped.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub role: String,
    pub created_at: String,
}

impl From<ScenarioRecord> for ScenarioView {
    fn from(record: ScenarioRecord) -> Self {
        ScenarioView {
            id: record.scenario_id,
            title: record.title,
            description: record.description,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

/// Denormalized view of everything stored for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub ai_role: String,
    pub language: String,
    pub locale: String,
    pub scenario: String,
    pub created_at: Option<String>,
    pub chat_history: Vec<Turn>,
    pub custom_scenarios: Vec<ScenarioView>,
}

/// Compose a user's stored documents into one profile view.
///
/// A missing user is a normal `None` result, not an error; storage
/// failures propagate.
pub async fn get_user_profile(
    store: &dyn DocumentStore,
    username: &str,
) -> Result<Option<UserProfile>, AppError> {
    let Some((user_id, user)) = UserRepository::find_by_username(store, username).await? else {
        return Ok(None);
    };

    let messages = MessageRepository::list_for_user(store, &user_id).await?;
    let scenarios = ScenarioRepository::list_for_user(store, &user_id).await?;

    Ok(Some(UserProfile {
        username: user.username,
        ai_role: user.ai_role.unwrap_or_else(|| DEFAULT_AI_ROLE.to_string()),
        language: user.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        locale: user.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        scenario: user.scenario.unwrap_or_else(|| DEFAULT_SCENARIO.to_string()),
        created_at: user.created_at,
        chat_history: pair_turns(&messages),
        custom_scenarios: scenarios.into_iter().map(ScenarioView::from).collect(),
    }))
}

/// Pair a timestamp-ascending message sequence into turns.
///
/// Messages are stored strictly alternating, human side first, so pairs
/// are taken positionally at (0,1), (2,3), … and the `is_user` flags are
/// trusted rather than re-checked. A trailing unanswered message is
/// omitted from the view; it stays in storage.
pub fn pair_turns(messages: &[ChatMessageRecord]) -> Vec<Turn> {
    messages
        .chunks_exact(2)
        .map(|pair| Turn {
            user: pair[0].content.clone(),
            ai: pair[1].content.clone(),
            timestamp: pair[0].timestamp.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str, is_user: bool, timestamp: &str) -> ChatMessageRecord {
        ChatMessageRecord {
            user_id: "u1".to_string(),
            content: content.to_string(),
            is_user,
            timestamp: timestamp.to_string(),
            audio_url: None,
        }
    }

    #[test]
    fn pairs_even_sequence_completely() {
        let messages = vec![
            message("hi", true, "t1"),
            message("hello!", false, "t1"),
            message("how are you?", true, "t2"),
            message("fine, thanks", false, "t2"),
        ];

        let turns = pair_turns(&messages);
        assert_eq!(turns.len(), 2);
        assert_eq!(
            turns[0],
            Turn {
                user: "hi".to_string(),
                ai: "hello!".to_string(),
                timestamp: "t1".to_string(),
            }
        );
        assert_eq!(turns[1].user, "how are you?");
        assert_eq!(turns[1].timestamp, "t2");
    }

    #[test]
    fn drops_trailing_unanswered_message() {
        let messages = vec![
            message("hi", true, "t1"),
            message("hello!", false, "t1"),
            message("anyone there?", true, "t2"),
        ];

        let turns = pair_turns(&messages);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user, "hi");
    }

    #[test]
    fn yields_floor_half_turns_for_any_length() {
        for n in 0..9 {
            let messages: Vec<_> = (0..n)
                .map(|i| message(&format!("m{}", i), i % 2 == 0, &format!("t{}", i / 2)))
                .collect();
            assert_eq!(pair_turns(&messages).len(), n / 2);
        }
    }

    #[test]
    fn turn_timestamp_comes_from_the_user_side() {
        let messages = vec![message("q", true, "early"), message("a", false, "late")];
        assert_eq!(pair_turns(&messages)[0].timestamp, "early");
    }
}
