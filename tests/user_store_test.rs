//! UserStore tests against an in-memory SQLite database.

use bbank::domain::{NewUser, User};
use bbank::infra::{Database, UserRepository, UserStore, WriteOutcome};

async fn setup() -> (Database, UserStore) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");
    let store = UserStore::new(db.get_connection());
    (db, store)
}

fn new_user(username: &str, password: &str, api_key: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: password.to_string(),
        first_name: None,
        last_name: None,
        api_key: api_key.to_string(),
    }
}

#[tokio::test]
async fn test_migrations_applied() {
    let (db, _store) = setup().await;
    let status = db.migration_status().await.unwrap();

    assert_eq!(status.len(), 2);
    assert!(status.iter().all(|(_, applied)| *applied));
}

#[tokio::test]
async fn test_create_assigns_fresh_ids() {
    let (_db, store) = setup().await;

    let first = store.create(new_user("alice", "p1", "k1")).await.unwrap();
    let second = store.create(new_user("bob", "p2", "k2")).await.unwrap();

    assert!(first.id > 0);
    assert_ne!(first.id, second.id);
    assert_eq!(second.username, "bob");
    assert_eq!(second.api_key, "k2");
}

#[tokio::test]
async fn test_find_by_id_round_trip() {
    let (_db, store) = setup().await;
    let mut draft = new_user("alice", "p1", "k1");
    draft.first_name = Some("Alice".to_string());

    let created = store.create(draft).await.unwrap();
    let found = store.find_by_id(created.id).await.unwrap();

    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn test_find_by_id_missing_is_none() {
    let (_db, store) = setup().await;
    assert_eq!(store.find_by_id(404).await.unwrap(), None);
}

#[tokio::test]
async fn test_credentials_are_exact_match() {
    let (_db, store) = setup().await;
    let alice = store.create(new_user("alice", "p1", "k1")).await.unwrap();

    let found = store.find_by_credentials("alice", "p1").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(alice.id));

    assert!(store.find_by_credentials("Alice", "p1").await.unwrap().is_none());
    assert!(store.find_by_credentials("alice", "P1").await.unwrap().is_none());
    assert!(store.find_by_credentials("ali", "p1").await.unwrap().is_none());
    assert!(store.find_by_credentials("alice", "").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_usernames_return_first() {
    let (_db, store) = setup().await;
    let first = store.create(new_user("twin", "same", "k1")).await.unwrap();
    store.create(new_user("twin", "same", "k2")).await.unwrap();

    let found = store.find_by_credentials("twin", "same").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(first.id));
}

#[tokio::test]
async fn test_validate_key() {
    let (_db, store) = setup().await;
    store.create(new_user("alice", "p1", "known-key")).await.unwrap();

    assert!(store.validate_key("known-key").await.unwrap());
    assert!(!store.validate_key("KNOWN-KEY").await.unwrap());
    assert!(!store.validate_key("other").await.unwrap());
}

#[tokio::test]
async fn test_update_overwrites_all_fields() {
    let (_db, store) = setup().await;
    let created = store.create(new_user("alice", "p1", "k1")).await.unwrap();

    let changed = User {
        id: created.id,
        username: "alice2".to_string(),
        password: "p2".to_string(),
        first_name: Some("Alice".to_string()),
        last_name: Some("Liddell".to_string()),
        api_key: "k2".to_string(),
    };

    let outcome = store.update(changed.clone()).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Applied);
    assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(changed));
}

#[tokio::test]
async fn test_update_missing_row() {
    let (_db, store) = setup().await;

    let ghost = User {
        id: 77,
        username: "ghost".to_string(),
        password: "boo".to_string(),
        first_name: None,
        last_name: None,
        api_key: "k".to_string(),
    };

    assert_eq!(store.update(ghost).await.unwrap(), WriteOutcome::Missing);
    assert_eq!(store.find_by_id(77).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_then_missing() {
    let (_db, store) = setup().await;
    let created = store.create(new_user("alice", "p1", "k1")).await.unwrap();

    assert_eq!(store.delete(created.id).await.unwrap(), WriteOutcome::Applied);
    assert_eq!(store.find_by_id(created.id).await.unwrap(), None);
    assert_eq!(store.delete(created.id).await.unwrap(), WriteOutcome::Missing);
    assert!(!store.validate_key("k1").await.unwrap());
}
