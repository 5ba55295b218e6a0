use bson::doc;

use lingua_store::db::models::{Exchange, NewScenario, UserUpsert};
use lingua_store::db::{MessageRepository, ScenarioRepository, UserRepository};
use lingua_store::error::AppError;
use lingua_store::migrate::migrate_user_from_json;
use lingua_store::profile::get_user_profile;
use lingua_store::store::{DocumentStore, FindOptions, MemoryStore, CHAT_MESSAGES};

fn upsert(username: &str) -> UserUpsert {
    UserUpsert {
        username: username.to_string(),
        ..Default::default()
    }
}

fn exchange(user: &str, ai: &str, timestamp: &str) -> Exchange {
    Exchange {
        user: Some(user.to_string()),
        ai: Some(ai.to_string()),
        timestamp: Some(timestamp.to_string()),
        audio_url: None,
    }
}

#[tokio::test]
async fn create_or_update_is_idempotent_on_identity() {
    let store = MemoryStore::new();

    let first = UserRepository::create_or_update(&store, &upsert("alice"))
        .await
        .unwrap();
    let second = UserRepository::create_or_update(
        &store,
        &UserUpsert {
            username: "alice".to_string(),
            language: Some("German".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(first, second);

    let profile = get_user_profile(&store, "alice").await.unwrap().unwrap();
    assert_eq!(profile.language, "German");
}

#[tokio::test]
async fn new_user_gets_preference_defaults() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("bob"))
        .await
        .unwrap();

    let profile = get_user_profile(&store, "bob").await.unwrap().unwrap();
    assert_eq!(profile.ai_role, "Virtual assistant AI.");
    assert_eq!(profile.language, "English");
    assert_eq!(profile.locale, "en");
    assert_eq!(profile.scenario, "en");
    assert!(profile.created_at.is_some());
}

#[tokio::test]
async fn update_leaves_omitted_preferences_untouched() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(
        &store,
        &UserUpsert {
            username: "carol".to_string(),
            language: Some("Spanish".to_string()),
            locale: Some("es".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    UserRepository::create_or_update(
        &store,
        &UserUpsert {
            username: "carol".to_string(),
            ai_role: Some("Waiter".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let profile = get_user_profile(&store, "carol").await.unwrap().unwrap();
    assert_eq!(profile.ai_role, "Waiter");
    assert_eq!(profile.language, "Spanish");
    assert_eq!(profile.locale, "es");
}

#[tokio::test]
async fn missing_user_profile_is_none_not_error() {
    let store = MemoryStore::new();
    assert!(get_user_profile(&store, "nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn save_conversation_rejects_unknown_user_without_writing() {
    let store = MemoryStore::new();

    let result =
        MessageRepository::save_conversation(&store, "ghost", &[exchange("hi", "hello", "t1")])
            .await;
    assert!(matches!(result, Err(AppError::UserNotFound(_))));

    let stored = store
        .find_many(CHAT_MESSAGES, doc! {}, FindOptions::new())
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn empty_conversation_is_a_successful_no_op() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("dave"))
        .await
        .unwrap();

    MessageRepository::save_conversation(&store, "dave", &[])
        .await
        .unwrap();
    MessageRepository::save_conversation(&store, "dave", &[Exchange::default()])
        .await
        .unwrap();

    let stored = store
        .find_many(CHAT_MESSAGES, doc! {}, FindOptions::new())
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn odd_message_stays_in_storage_but_not_in_the_paired_view() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("erin"))
        .await
        .unwrap();

    MessageRepository::save_conversation(
        &store,
        "erin",
        &[
            exchange("Bonjour", "Salut!", "2024-01-01T10:00:00Z"),
            Exchange {
                user: Some("Comment ça va?".to_string()),
                ai: None,
                timestamp: Some("2024-01-01T10:01:00Z".to_string()),
                audio_url: None,
            },
        ],
    )
    .await
    .unwrap();

    let profile = get_user_profile(&store, "erin").await.unwrap().unwrap();
    assert_eq!(profile.chat_history.len(), 1);
    assert_eq!(profile.chat_history[0].user, "Bonjour");
    assert_eq!(profile.chat_history[0].ai, "Salut!");

    // The unanswered tail is still in the store itself.
    let stored = store
        .find_many(CHAT_MESSAGES, doc! {}, FindOptions::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn both_sides_of_an_exchange_share_a_timestamp() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("frank"))
        .await
        .unwrap();

    MessageRepository::save_conversation(
        &store,
        "frank",
        &[Exchange {
            user: Some("hi".to_string()),
            ai: Some("hello".to_string()),
            timestamp: None,
            audio_url: Some("https://audio/1.mp3".to_string()),
        }],
    )
    .await
    .unwrap();

    let stored = store
        .find_many(
            CHAT_MESSAGES,
            doc! {},
            FindOptions::new().sort(doc! { "timestamp": 1 }),
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(
        stored[0].get_str("timestamp").unwrap(),
        stored[1].get_str("timestamp").unwrap()
    );
    // Audio reference lands on the assistant side only.
    assert!(stored[0].get_str("audio_url").is_err());
    assert_eq!(stored[1].get_str("audio_url").unwrap(), "https://audio/1.mp3");
}

#[tokio::test]
async fn scenarios_appear_in_the_profile_without_the_owner_reference() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("grace"))
        .await
        .unwrap();

    ScenarioRepository::add_custom_scenario(
        &store,
        "grace",
        &NewScenario {
            id: "s1".to_string(),
            title: "Cafe".to_string(),
            description: "Order a coffee".to_string(),
            role: "waiter".to_string(),
            created_at: None,
        },
    )
    .await
    .unwrap();

    let profile = get_user_profile(&store, "grace").await.unwrap().unwrap();
    assert_eq!(profile.custom_scenarios.len(), 1);
    let scenario = &profile.custom_scenarios[0];
    assert_eq!(scenario.id, "s1");
    assert_eq!(scenario.title, "Cafe");
    assert_eq!(scenario.role, "waiter");
    assert!(!scenario.created_at.is_empty());

    let serialized = serde_json::to_value(scenario).unwrap();
    assert!(serialized.get("user_id").is_none());
}

#[tokio::test]
async fn scenario_writes_for_different_ids_are_independent_inserts() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("henry"))
        .await
        .unwrap();

    for id in ["s1", "s2"] {
        ScenarioRepository::add_custom_scenario(
            &store,
            "henry",
            &NewScenario {
                id: id.to_string(),
                title: id.to_string(),
                description: String::new(),
                role: "tutor".to_string(),
                created_at: None,
            },
        )
        .await
        .unwrap();
    }

    let profile = get_user_profile(&store, "henry").await.unwrap().unwrap();
    assert_eq!(profile.custom_scenarios.len(), 2);
    assert_eq!(profile.custom_scenarios[0].id, "s1");
    assert_eq!(profile.custom_scenarios[1].id, "s2");
}

#[tokio::test]
async fn scenario_write_rejects_unknown_user() {
    let store = MemoryStore::new();
    let result = ScenarioRepository::add_custom_scenario(
        &store,
        "ghost",
        &NewScenario {
            id: "s1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            role: "r".to_string(),
            created_at: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::UserNotFound(_))));
}

#[tokio::test]
async fn legacy_snapshot_round_trips_through_the_importer() {
    let store = MemoryStore::new();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alice.json");
    std::fs::write(
        &path,
        serde_json::json!({
            "language": "French",
            "chat_history": [
                { "user": "Bonjour", "ai": "Salut!", "timestamp": "T1" }
            ],
            "custom_scenarios": [
                { "id": "s1", "title": "Cafe", "description": "d", "role": "waiter" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    migrate_user_from_json(&store, &path).await.unwrap();

    let profile = get_user_profile(&store, "alice").await.unwrap().unwrap();
    assert_eq!(profile.language, "French");
    assert_eq!(profile.chat_history.len(), 1);
    assert_eq!(profile.chat_history[0].user, "Bonjour");
    assert_eq!(profile.chat_history[0].ai, "Salut!");
    assert_eq!(profile.chat_history[0].timestamp, "T1");
    assert_eq!(profile.custom_scenarios.len(), 1);
    assert_eq!(profile.custom_scenarios[0].id, "s1");
    assert_eq!(profile.custom_scenarios[0].title, "Cafe");
}

#[tokio::test]
async fn importer_reuses_an_existing_user_instead_of_duplicating() {
    let store = MemoryStore::new();
    let existing = UserRepository::create_or_update(&store, &upsert("bob"))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bob.json");
    std::fs::write(&path, r#"{"language": "Italian"}"#).unwrap();

    migrate_user_from_json(&store, &path).await.unwrap();

    let (id, record) = UserRepository::find_by_username(&store, "bob")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(id, existing);
    assert_eq!(record.language.as_deref(), Some("Italian"));
}

#[tokio::test]
async fn importer_fails_on_malformed_json() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(migrate_user_from_json(&store, &path).await.is_err());
    assert!(get_user_profile(&store, "broken").await.unwrap().is_none());
}

#[tokio::test]
async fn operations_work_transparently_after_close() {
    let store = MemoryStore::new();
    UserRepository::create_or_update(&store, &upsert("iris"))
        .await
        .unwrap();

    store.close().await.unwrap();

    let profile = get_user_profile(&store, "iris").await.unwrap();
    assert!(profile.is_some());
}
