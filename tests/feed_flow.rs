use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

use jobfeed::config::FeedSettings;
use jobfeed::models::NewSubmission;
use jobfeed::store::{SqliteStore, SubmissionStore};
use jobfeed::view::{mount, FeedUpdate};

fn new_submission(company: &str, title: &str) -> NewSubmission {
    NewSubmission {
        company: company.to_string(),
        title: title.to_string(),
        location: "Berlin".to_string(),
        recruiter_link: None,
        link: Some("https://jobs.example.com/1".to_string()),
        pdf_path: Some("resume-1.pdf".to_string()),
    }
}

async fn store_with_user(dir: &TempDir, email: &str) -> (SqliteStore, i64) {
    let store = SqliteStore::open(&dir.path().join("submissions.db"))
        .await
        .unwrap();
    store.ensure_schema().await.unwrap();
    let user_id = store.provision_user(email).await.unwrap();
    (store, user_id)
}

async fn next_update(rx: &mut mpsc::Receiver<FeedUpdate>) -> FeedUpdate {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a feed update")
        .expect("update channel closed")
}

#[tokio::test]
async fn page_and_tail_queries_against_sqlite() {
    let dir = TempDir::new().unwrap();
    let (store, user_id) = store_with_user(&dir, "dev@example.com").await;
    let other_user = store.provision_user("other@example.com").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        let id = store
            .insert_submission(user_id, &new_submission("Initech", &format!("Role {}", i)))
            .await
            .unwrap();
        ids.push(id);
    }
    // a foreign row interleaved in the log must never leak across users
    store
        .insert_submission(other_user, &new_submission("Globex", "Other role"))
        .await
        .unwrap();

    // first page: newest three, descending
    let page = store.page_before(user_id, 3, None).await.unwrap();
    let got: Vec<i64> = page.iter().map(|s| s.id).collect();
    assert_eq!(got, [ids[4], ids[3], ids[2]]);

    // next page from the oldest loaded id
    let page = store.page_before(user_id, 3, Some(ids[2])).await.unwrap();
    let got: Vec<i64> = page.iter().map(|s| s.id).collect();
    assert_eq!(got, [ids[1], ids[0]]);

    // tail: everything newer than a cursor, descending
    let newer = store.newer_than(user_id, Some(ids[2])).await.unwrap();
    let got: Vec<i64> = newer.iter().map(|s| s.id).collect();
    assert_eq!(got, [ids[4], ids[3]]);

    // no cursor means the whole log for that user
    let all = store.newer_than(user_id, None).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(|s| s.user_id == user_id));
}

#[tokio::test]
async fn optional_fields_round_trip() {
    let dir = TempDir::new().unwrap();
    let (store, user_id) = store_with_user(&dir, "dev@example.com").await;

    let mut submission = new_submission("Initech", "Backend Engineer");
    submission.recruiter_link = None;
    submission.pdf_path = None;
    store.insert_submission(user_id, &submission).await.unwrap();

    let rows = store.page_before(user_id, 1, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company, "Initech");
    assert_eq!(rows[0].recruiter_link, None);
    assert_eq!(rows[0].pdf_path, None);
    assert_eq!(rows[0].link.as_deref(), Some("https://jobs.example.com/1"));
}

#[tokio::test]
async fn unprovisioned_email_is_an_empty_state() {
    let dir = TempDir::new().unwrap();
    let (store, _) = store_with_user(&dir, "dev@example.com").await;

    let missing = store.user_id_for_email("nobody@example.com").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn mounted_view_backfills_then_tails_the_log() {
    let dir = TempDir::new().unwrap();
    let (store, user_id) = store_with_user(&dir, "dev@example.com").await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = store
            .insert_submission(user_id, &new_submission("Hooli", &format!("Role {}", i)))
            .await
            .unwrap();
        ids.push(id);
    }

    let settings = FeedSettings {
        page_size: 2,
        poll_interval: Duration::from_millis(500),
        ..FeedSettings::default()
    };
    let (handle, mut updates) = mount(store.clone(), user_id, settings);

    handle.report_visibility(1.0).await;

    match next_update(&mut updates).await {
        FeedUpdate::Appended(rows) => {
            let got: Vec<i64> = rows.iter().map(|s| s.id).collect();
            assert_eq!(got, [ids[2], ids[1]]);
        }
        other => panic!("expected Appended, got {:?}", other),
    }
    match next_update(&mut updates).await {
        FeedUpdate::Appended(rows) => {
            let got: Vec<i64> = rows.iter().map(|s| s.id).collect();
            assert_eq!(got, [ids[0]]);
        }
        other => panic!("expected Appended, got {:?}", other),
    }
    assert_eq!(next_update(&mut updates).await, FeedUpdate::EndReached);

    // the external writer appends; the next tick prepends it
    let new_id = store
        .insert_submission(user_id, &new_submission("Hooli", "Newest role"))
        .await
        .unwrap();
    match next_update(&mut updates).await {
        FeedUpdate::Prepended(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].id, new_id);
        }
        other => panic!("expected Prepended, got {:?}", other),
    }

    // after unmount no tick reaches the observer, even with new rows
    handle.unmount().await;
    store
        .insert_submission(user_id, &new_submission("Hooli", "Unseen role"))
        .await
        .unwrap();
    assert_eq!(updates.recv().await, None);
}
