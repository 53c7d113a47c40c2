use chrono::{TimeDelta, Utc};
use notes_core::models::NewNote;
use notes_core::page::{Direction, PageRequest, Sort, SortProperty};
use notes_db::NoteRepository;
use uuid::Uuid;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn insert_and_find_note() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let new_note = NewNote::new("random-user", "test content");
    let saved = repo.insert(&new_note).await.unwrap();

    assert_eq!(saved.id, new_note.id);
    assert_eq!(saved.username, "random-user");
    assert_eq!(saved.content, "test content");
    assert_eq!(saved.version, 1);
    assert_eq!(saved.created_at, saved.last_modified_at);

    let found = repo
        .find_by_id(saved.id)
        .await
        .unwrap()
        .expect("Should find the note");
    assert_eq!(found, saved);
}

#[tokio::test]
async fn find_unknown_id_returns_none() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    assert!(repo.find_by_id(Uuid::now_v7()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_with_current_version_increments_it() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let saved = repo
        .insert(&NewNote::new("some-user", "first"))
        .await
        .unwrap();

    let updated = repo
        .update_content(saved.id, "second", saved.version)
        .await
        .unwrap()
        .expect("Version matched, update should apply");

    assert_eq!(updated.content, "second");
    assert_eq!(updated.version, 2);
    assert_eq!(updated.created_at, saved.created_at);
    assert!(updated.last_modified_at >= saved.last_modified_at);
}

#[tokio::test]
async fn update_timestamps_use_application_clock() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let saved = repo
        .insert(&NewNote::new("some-user", "first"))
        .await
        .unwrap();

    let before = Utc::now() - TimeDelta::milliseconds(1);
    let updated = repo
        .update_content(saved.id, "second", 1)
        .await
        .unwrap()
        .unwrap();
    let after = Utc::now() + TimeDelta::milliseconds(1);
    assert!(updated.last_modified_at >= before && updated.last_modified_at <= after);

    // A note stamped by a node whose clock runs ahead never goes back in time.
    let mut ahead = NewNote::new("some-user", "from the future");
    ahead.created_at = Utc::now() + TimeDelta::hours(1);
    let saved = repo.insert(&ahead).await.unwrap();
    let updated = repo
        .update_content(saved.id, "edited", 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_modified_at, saved.created_at);
}

#[tokio::test]
async fn update_with_stale_version_changes_nothing() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let saved = repo
        .insert(&NewNote::new("some-user", "first"))
        .await
        .unwrap();
    repo.update_content(saved.id, "second", 1)
        .await
        .unwrap()
        .unwrap();

    let stale = repo.update_content(saved.id, "third", 1).await.unwrap();
    assert!(stale.is_none());

    let current = repo.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(current.content, "second");
    assert_eq!(current.version, 2);
}

#[tokio::test]
async fn delete_returns_removed_note() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let saved = repo
        .insert(&NewNote::new("some-user", "bye"))
        .await
        .unwrap();

    let removed = repo.delete(saved.id).await.unwrap();
    assert_eq!(removed, Some(saved.clone()));
    assert!(repo.find_by_id(saved.id).await.unwrap().is_none());
    assert!(repo.delete(saved.id).await.unwrap().is_none());
}

#[tokio::test]
async fn pages_follow_insertion_order() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    let mut saved = Vec::new();
    for i in 0..30 {
        let note = NewNote::new(format!("user-{}", i % 3), format!("content of note #{}", i + 1));
        saved.push(repo.insert(&note).await.unwrap());
    }

    let first = repo.find_page(&PageRequest::default()).await.unwrap();
    assert_eq!(first.total_elements, 30);
    assert_eq!(first.total_pages(), 2);
    assert_eq!(first.content, saved[..20].to_vec());

    let custom = repo.find_page(&PageRequest::of(3, 5)).await.unwrap();
    assert_eq!(custom.number, 3);
    assert_eq!(custom.content, saved[15..20].to_vec());

    let beyond = repo.find_page(&PageRequest::of(10, 5)).await.unwrap();
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total_elements, 30);
}

#[tokio::test]
async fn pages_can_be_sorted() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    for (user, content) in [("b", "two"), ("a", "one"), ("c", "three")] {
        repo.insert(&NewNote::new(user, content)).await.unwrap();
    }

    let request = PageRequest {
        page: 0,
        size: 10,
        sort: Some(Sort {
            property: SortProperty::Username,
            direction: Direction::Desc,
        }),
    };
    let page = repo.find_page(&request).await.unwrap();
    let owners: Vec<_> = page.content.iter().map(|n| n.username.as_str()).collect();
    assert_eq!(owners, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn delete_all_empties_table() {
    let (pool, _container) = setup_test_db().await;
    let repo = NoteRepository::new(pool);

    for i in 0..4 {
        repo.insert(&NewNote::new("user", format!("note {i}")))
            .await
            .unwrap();
    }

    assert_eq!(repo.delete_all().await.unwrap(), 4);
    let page = repo.find_page(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 0);
    repo.health_check().await.unwrap();
}
