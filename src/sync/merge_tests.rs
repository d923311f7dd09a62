use super::*;
use crate::provider::{ItemKind, ItemState};
use chrono::TimeZone;
use std::collections::BTreeSet;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

fn comment(id: &str, author: &str, body: &str, hour: u32) -> Comment {
    Comment {
        id: id.to_string(),
        body: body.to_string(),
        author: author.to_string(),
        created_at: at(hour),
    }
}

fn item(comments: Vec<Comment>) -> RemoteItem {
    RemoteItem {
        id: "42".to_string(),
        kind: ItemKind::Issue,
        title: "Login fails".to_string(),
        body: "Steps to reproduce.\n".to_string(),
        state: ItemState::Open,
        url: "https://github.com/acme/notes/issues/42".to_string(),
        labels: BTreeSet::new(),
        assignees: BTreeSet::new(),
        milestone: None,
        updated_at: at(12),
        comments,
    }
}

#[test]
fn test_build_body_without_comments() {
    let body = build_body(&item(vec![]), None, "");

    assert_eq!(
        body,
        format!("# Login fails\n\nSteps to reproduce.\n\n{SYNC_MARKER}\n")
    );
}

#[test]
fn test_build_body_renders_comment_tiers() {
    let item = item(vec![
        comment("1", "alice", "Seen it too.", 9),
        comment("2", "bob", "Fixed in main.\n\nPlease retest.", 11),
    ]);

    let body = build_body(&item, Some(at(10)), "my notes\n");

    let expected = format!(
        "# Login fails\n\nSteps to reproduce.\n\n## Comments\n\n\
         > **alice** commented at 2024-05-01T09:00:00Z\n>\n> Seen it too.\n\n\
         ## New comments\n\n\
         > **bob** commented at 2024-05-01T11:00:00Z\n>\n> Fixed in main.\n>\n> Please retest.\n\n\
         {SYNC_MARKER}\nmy notes\n"
    );
    assert_eq!(body, expected);
}

#[test]
fn test_comment_at_last_sync_is_historical() {
    let item = item(vec![comment("1", "alice", "On the dot.", 10)]);

    let region = render_synced_region(&item, Some(at(10)));

    assert!(region.contains(COMMENTS_HEADING));
    assert!(!region.contains(NEW_COMMENTS_HEADING));
}

#[test]
fn test_no_last_sync_means_all_historical() {
    let item = item(vec![comment("1", "a", "x", 9), comment("2", "b", "y", 23)]);

    let region = render_synced_region(&item, None);

    assert!(!region.contains(NEW_COMMENTS_HEADING));
    assert_eq!(region.matches("commented at").count(), 2);
}

#[test]
fn test_empty_remote_body_is_omitted() {
    let mut item = item(vec![]);
    item.body = "  \n".to_string();

    assert_eq!(render_synced_region(&item, None), "# Login fails");
}

#[test]
fn test_split_body_round_trips_local_region() {
    let local = "  keep *exactly*\n\n  this\n";
    let body = build_body(&item(vec![]), None, local);

    let split = split_body(&body).unwrap();

    assert_eq!(split.local, local);
    assert_eq!(split.synced, "# Login fails\n\nSteps to reproduce.\n\n");
}

#[test]
fn test_split_body_uses_first_marker_line() {
    let body = format!("synced\n{SYNC_MARKER}\nlocal\n{SYNC_MARKER}\nmore\n");

    let split = split_body(&body).unwrap();

    assert_eq!(split.synced, "synced\n");
    assert_eq!(split.local, format!("local\n{SYNC_MARKER}\nmore\n"));
}

#[test]
fn test_split_body_marker_must_be_whole_line() {
    let body = format!("inline {SYNC_MARKER} here\n");
    assert_eq!(split_body(&body), Err(MergeError::MarkerMissing));
    assert_eq!(split_body("no marker at all"), Err(MergeError::MarkerMissing));
}

#[test]
fn test_split_body_marker_on_last_line() {
    let body = format!("synced\n{SYNC_MARKER}");

    let split = split_body(&body).unwrap();

    assert_eq!(split.local, "");
}

#[test]
fn test_rebuild_is_idempotent() {
    let item = item(vec![comment("1", "alice", "Hi", 9)]);
    let first = build_body(&item, Some(at(12)), "pending\n");

    let split = split_body(&first).unwrap();
    let second = build_body(&item, Some(at(12)), split.local);

    assert_eq!(first, second);
}

#[test]
fn test_remote_body_cannot_inject_marker() {
    let mut item = item(vec![]);
    item.body = format!("before\n{SYNC_MARKER}\nafter");
    let body = build_body(&item, None, "local\n");

    let split = split_body(&body).unwrap();

    assert_eq!(split.local, "local\n");
    assert!(split.synced.contains("before\nafter"));
}

#[test]
fn test_publishable_text() {
    assert_eq!(publishable_text("# Title\n\nBody text\n"), "Body text");
    assert_eq!(publishable_text("No heading\n"), "No heading");
    assert_eq!(publishable_text("# Only a heading"), "");
    assert_eq!(
        publishable_text(&format!("# T\n\nBody\n\n{SYNC_MARKER}\nprivate\n")),
        "Body"
    );
}
