#![cfg(feature = "inmem-store")]

use alarmsus::models::{
    CommentBody, EmergencyServices, InteractionKind, InteractionRequest, NewReport, ReplyBody,
    ReportSubmission,
};
use alarmsus::repo::{
    inmem::InMemRepo, CommentRepo, InteractionRepo, Page, RepoError, ReportFilter, ReportRepo,
};
use alarmsus::validate::{normalize_comment, normalize_reply, normalize_submission};
use serial_test::serial;

/// Helper that returns a fresh, empty repository for every test run.
fn repo() -> InMemRepo {
    // isolate state: do **not** persist to the default file path
    std::env::set_var("ALARMSUS_DATA_DIR", tempfile::tempdir().unwrap().path());
    InMemRepo::new()
}

fn submission(caption: &str, services: EmergencyServices) -> ReportSubmission {
    ReportSubmission {
        caption: caption.to_string(),
        is_emergency: services.any(),
        emergency_services: services,
        is_in_danger: false,
        location: Some("Main St".to_string()),
        report_anonymously: false,
        image_url: None,
        user_id: Some("user-1".to_string()),
    }
}

fn new_report(caption: &str, services: EmergencyServices) -> NewReport {
    normalize_submission(submission(caption, services)).unwrap()
}

fn interaction(user: &str, report_id: i64, comment_id: Option<i64>, kind: InteractionKind) -> InteractionRequest {
    InteractionRequest {
        user_id: user.to_string(),
        report_id,
        comment_id,
        kind,
    }
}

#[tokio::test]
#[serial]
async fn report_round_trip() {
    let r = repo();
    let services = EmergencyServices {
        ambulance: true,
        ..Default::default()
    };

    let created = r
        .create_report(new_report("  Someone collapsed near the station  ", services))
        .await
        .unwrap();

    assert_eq!(created.caption, "Someone collapsed near the station");
    assert_eq!(created.category, "health");
    assert_eq!(created.title, "Medical Emergency");
    assert!(created.is_emergency);
    assert!(created.emergency_ambulance);
    assert!(!created.verified);
    assert_eq!(created.alerts, 0);
    assert_eq!(created.comments, 0);
    assert_eq!(created.map_views, 0);
    assert_eq!(created.location.as_deref(), Some("Main St"));

    let fetched = r.get_report(created.id).await.unwrap();
    assert_eq!(fetched.caption, created.caption);
    assert_eq!(fetched.created_at, created.created_at);

    let (rows, total) = r
        .list_reports(&ReportFilter::default(), Page::from_params(None, None))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, created.id);
}

#[tokio::test]
#[serial]
async fn pagination_window_and_ordering() {
    let r = repo();
    for i in 1..=15 {
        r.create_report(new_report(
            &format!("routine event number {i}"),
            EmergencyServices::default(),
        ))
        .await
        .unwrap();
    }

    let filter = ReportFilter::default();

    let page1 = Page::from_params(Some(1), Some(10));
    let (rows, total) = r.list_reports(&filter, page1).await.unwrap();
    assert_eq!(total, 15);
    assert_eq!(rows.len(), 10);
    // latest first
    assert_eq!(rows[0].id, 15);
    assert_eq!(rows[9].id, 6);
    assert!(page1.has_more(total));

    let page2 = Page::from_params(Some(2), Some(10));
    let (rows, total) = r.list_reports(&filter, page2).await.unwrap();
    assert_eq!(total, 15);
    let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    assert!(!page2.has_more(total));
}

#[tokio::test]
#[serial]
async fn filters_apply_to_rows_and_total() {
    let r = repo();
    r.create_report(new_report("warehouse on fire", EmergencyServices::default()))
        .await
        .unwrap();
    r.create_report(new_report(
        "someone collapsed at the mall",
        EmergencyServices::default(),
    ))
    .await
    .unwrap();
    r.create_report(new_report("quiet afternoon", EmergencyServices::default()))
        .await
        .unwrap();

    let filter = ReportFilter {
        category: Some("fire".to_string()),
        ..Default::default()
    };
    let (rows, total) = r
        .list_reports(&filter, Page::from_params(None, None))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].title, "Fire Incident");

    // case-insensitive substring over title and caption
    let filter = ReportFilter {
        search: Some("COLLAPSED".to_string()),
        ..Default::default()
    };
    let (rows, total) = r
        .list_reports(&filter, Page::from_params(None, None))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].category, "health");

    let filter = ReportFilter {
        verified: Some(true),
        ..Default::default()
    };
    let (rows, total) = r
        .list_reports(&filter, Page::from_params(None, None))
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(rows.is_empty());
}

#[tokio::test]
#[serial]
async fn counter_increments_and_missing_id() {
    let r = repo();
    let report = r
        .create_report(new_report("minor flooding", EmergencyServices::default()))
        .await
        .unwrap();

    r.increment_map_views(report.id).await.unwrap();
    r.increment_map_views(report.id).await.unwrap();
    r.increment_alerts(report.id).await.unwrap();

    let fetched = r.get_report(report.id).await.unwrap();
    assert_eq!(fetched.map_views, 2);
    assert_eq!(fetched.alerts, 1);
    assert!(fetched.updated_at >= report.updated_at);

    let err = r.increment_alerts(9999).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
#[serial]
async fn comment_flow_bumps_report_counter() {
    let r = repo();
    let report = r
        .create_report(new_report("stray dog loose", EmergencyServices::default()))
        .await
        .unwrap();

    let body = CommentBody {
        user_id: Some("user-2".to_string()),
        username: "amy".to_string(),
        text: "I saw this too".to_string(),
    };
    let comment = r
        .create_comment(normalize_comment(report.id, body).unwrap())
        .await
        .unwrap();
    assert_eq!(comment.report_id, report.id);
    assert_eq!(r.get_report(report.id).await.unwrap().comments, 1);

    let reply_body = ReplyBody {
        username: "bob".to_string(),
        text: "same here".to_string(),
    };
    let reply = r
        .create_reply(normalize_reply(comment.id, reply_body).unwrap())
        .await
        .unwrap();
    assert_eq!(reply.comment_id, comment.id);

    let comments = r.list_comments(report.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].replies.len(), 1);
    assert_eq!(comments[0].replies[0].username, "bob");

    // dangling targets
    let body = CommentBody {
        user_id: None,
        username: "amy".to_string(),
        text: "hello".to_string(),
    };
    let err = r
        .create_comment(normalize_comment(9999, body).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));

    let reply_body = ReplyBody {
        username: "bob".to_string(),
        text: "hello".to_string(),
    };
    let err = r
        .create_reply(normalize_reply(9999, reply_body).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
#[serial]
async fn interaction_toggle_is_idempotent_over_two_calls() {
    let r = repo();
    let report = r
        .create_report(new_report("burst pipe", EmergencyServices::default()))
        .await
        .unwrap();

    let on = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Alert))
        .await
        .unwrap();
    assert!(on.active);
    assert_eq!(r.get_report(report.id).await.unwrap().alerts, 1);

    let off = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Alert))
        .await
        .unwrap();
    assert!(!off.active);
    assert_eq!(r.get_report(report.id).await.unwrap().alerts, 0);

    // independent users stack
    r.toggle_interaction(interaction("u1", report.id, None, InteractionKind::Share))
        .await
        .unwrap();
    r.toggle_interaction(interaction("u2", report.id, None, InteractionKind::Share))
        .await
        .unwrap();
    assert_eq!(r.get_report(report.id).await.unwrap().shares, 2);

    let err = r
        .toggle_interaction(interaction("u1", 9999, None, InteractionKind::Alert))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
#[serial]
async fn like_and_dislike_displace_each_other() {
    let r = repo();
    let report = r
        .create_report(new_report("loud argument outside", EmergencyServices::default()))
        .await
        .unwrap();
    let body = CommentBody {
        user_id: None,
        username: "amy".to_string(),
        text: "it woke me up".to_string(),
    };
    let comment = r
        .create_comment(normalize_comment(report.id, body).unwrap())
        .await
        .unwrap();

    r.toggle_interaction(interaction("u1", report.id, Some(comment.id), InteractionKind::Like))
        .await
        .unwrap();
    let comments = r.list_comments(report.id).await.unwrap();
    assert_eq!(comments[0].thumbs_up, 1);
    assert_eq!(comments[0].thumbs_down, 0);

    // switching to dislike adjusts both counters in one call
    r.toggle_interaction(interaction("u1", report.id, Some(comment.id), InteractionKind::Dislike))
        .await
        .unwrap();
    let comments = r.list_comments(report.id).await.unwrap();
    assert_eq!(comments[0].thumbs_up, 0);
    assert_eq!(comments[0].thumbs_down, 1);

    // toggling the dislike off returns everything to the baseline
    r.toggle_interaction(interaction("u1", report.id, Some(comment.id), InteractionKind::Dislike))
        .await
        .unwrap();
    let comments = r.list_comments(report.id).await.unwrap();
    assert_eq!(comments[0].thumbs_up, 0);
    assert_eq!(comments[0].thumbs_down, 0);
}

#[tokio::test]
#[serial]
async fn report_level_like_and_dislike_displace_each_other() {
    let r = repo();
    let report = r
        .create_report(new_report("fallen tree blocking road", EmergencyServices::default()))
        .await
        .unwrap();

    let like = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Like))
        .await
        .unwrap();
    assert!(like.active);

    let dislike = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Dislike))
        .await
        .unwrap();
    assert!(dislike.active);

    // the dislike displaced the like, so liking again records a fresh one
    // instead of undoing a stale row
    let like_again = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Like))
        .await
        .unwrap();
    assert!(like_again.active);

    let fetched = r.get_report(report.id).await.unwrap();
    assert_eq!(fetched.alerts, 0);
    assert_eq!(fetched.shares, 0);
}

#[tokio::test]
#[serial]
async fn comment_interaction_requires_matching_report() {
    let r = repo();
    let first = r
        .create_report(new_report("noise complaint", EmergencyServices::default()))
        .await
        .unwrap();
    let second = r
        .create_report(new_report("double parked truck", EmergencyServices::default()))
        .await
        .unwrap();
    let body = CommentBody {
        user_id: None,
        username: "amy".to_string(),
        text: "still going on".to_string(),
    };
    let comment = r
        .create_comment(normalize_comment(first.id, body).unwrap())
        .await
        .unwrap();

    r.toggle_interaction(interaction("u1", first.id, Some(comment.id), InteractionKind::Like))
        .await
        .unwrap();

    // the same comment under a different report id is not a second target
    let err = r
        .toggle_interaction(interaction("u1", second.id, Some(comment.id), InteractionKind::Like))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));

    let comments = r.list_comments(first.id).await.unwrap();
    assert_eq!(comments[0].thumbs_up, 1);
}

#[tokio::test]
#[serial]
async fn like_without_comment_records_but_touches_no_counter() {
    let r = repo();
    let report = r
        .create_report(new_report("odd smell in hallway", EmergencyServices::default()))
        .await
        .unwrap();

    let on = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Like))
        .await
        .unwrap();
    assert!(on.active);
    let fetched = r.get_report(report.id).await.unwrap();
    assert_eq!(fetched.alerts, 0);
    assert_eq!(fetched.shares, 0);

    let off = r
        .toggle_interaction(interaction("u1", report.id, None, InteractionKind::Like))
        .await
        .unwrap();
    assert!(!off.active);
}
