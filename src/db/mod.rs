pub mod models;
pub mod users;
pub mod messages;
pub mod scenarios;

pub use models::{ChatMessageRecord, Exchange, NewScenario, ScenarioRecord, UserRecord, UserUpsert};
pub use users::UserRepository;
pub use messages::MessageRepository;
pub use scenarios::ScenarioRepository;

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 string, the timestamp format every record carries.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
