mod common;

use std::sync::Arc;

use common::{new_user, open_app, png_frame, uniform_answers, ScriptedOracle};
use screenwell_lib::aggregation::Trend;
use screenwell_lib::db::models::{AnalysisSource, ContentCategory, SessionStatus, WellnessImpact};
use screenwell_lib::db::{CompletionError, FrameInsert};
use screenwell_lib::oracle::OfflineOracle;

#[tokio::test]
async fn frames_flow_into_session_summary_and_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let oracle = Arc::new(ScriptedOracle::lecture());
    let app = open_app(dir.path(), oracle.clone()).await;

    let user = app.create_user(new_user("riley@example.com")).await.unwrap();
    app.submit_quiz(user.id, uniform_answers(3)).await.unwrap();
    let session = app.start_session(user.id, Some("study".into())).await.unwrap();

    let mut tickets = Vec::new();
    for frame_number in 0..5u32 {
        let upload = app.upload(session.id, frame_number, png_frame(frame_number as u8));
        tickets.push(app.enqueue_frame(upload).await.unwrap());
    }

    // Completion waits for every queued frame.
    let completed = app.complete_session(session.id).await.unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    let summary = completed.summary.clone().unwrap();
    assert_eq!(summary.total_frames, 5);
    assert_eq!(summary.wellness_score, 10.0);
    assert_eq!(summary.productivity_score, 10.0);
    assert_eq!(summary.app_usage.get("Coursera"), Some(&5));
    assert_eq!(summary.content_categories.get("educational"), Some(&5));
    assert_eq!(oracle.vision_calls(), 5);

    for ticket in tickets {
        match ticket.outcome().await.unwrap() {
            FrameInsert::Inserted(frame) => {
                assert_eq!(frame.source, AnalysisSource::Oracle);
                assert_eq!(frame.content_type, ContentCategory::Educational);
                assert_eq!(frame.wellness_impact, WellnessImpact::Positive);
                assert_eq!(frame.sentiment_score, 0.6);
            }
            other => panic!("frame not stored: {other:?}"),
        }
    }

    let frames = app.db().session_frames(session.id).await.unwrap();
    let numbers: Vec<u32> = frames.iter().map(|f| f.frame_number).collect();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    assert_eq!(frames[4].timestamp, 2.0);

    let dashboard = app.dashboard(user.id).await.unwrap();
    assert_eq!(dashboard.stats.total_sessions, 1);
    assert!(!dashboard.stats.no_data);
    assert_eq!(dashboard.app_usage[0].name, "Coursera");
    assert_eq!(dashboard.app_usage[0].percentage, 100.0);
    let data = dashboard.user_data.unwrap();
    assert_eq!(data.avg_wellness, 10.0);
    assert_eq!(data.wellness_trend, Trend::Stable);
    assert!(dashboard.alerts.is_empty());
    assert!(dashboard.quick_insights.len() <= 3);
    assert_eq!(dashboard.wellness_history.len(), 1);

    let detail = app.app_detail(user.id, "coursera").await.unwrap().unwrap();
    assert_eq!(detail.total_frames, 5);

    let graph = app.knowledge_graph(user.id).await.unwrap().unwrap();
    assert!(graph.graph.nodes.iter().any(|n| n.id == "Coursera" && n.node_type == "app"));
    assert!(graph.graph.nodes.iter().any(|n| n.id == "The Balanced Achiever"));

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn completed_session_rejects_new_frames() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(dir.path(), Arc::new(ScriptedOracle::lecture())).await;
    let user = app.create_user(new_user("late@example.com")).await.unwrap();
    let session = app.start_session(user.id, None).await.unwrap();

    app.complete_session(session.id).await.unwrap();
    let err = app
        .submit_frame(app.upload(session.id, 0, png_frame(1)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not recording"));
    assert_eq!(app.db().frame_count(session.id).await.unwrap(), 0);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn empty_session_gets_default_scores() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(dir.path(), Arc::new(ScriptedOracle::lecture())).await;
    let user = app.create_user(new_user("empty@example.com")).await.unwrap();
    let session = app.start_session(user.id, None).await.unwrap();

    let summary = app.complete_session(session.id).await.unwrap().summary.unwrap();
    assert_eq!(summary.total_frames, 0);
    assert_eq!(summary.duration_seconds, 0);
    assert_eq!(summary.wellness_score, 5.0);
    assert_eq!(summary.productivity_score, 5.0);

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_completion_produces_one_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(dir.path(), Arc::new(ScriptedOracle::lecture())).await;
    let user = app.create_user(new_user("race@example.com")).await.unwrap();
    let session = app.start_session(user.id, None).await.unwrap();
    for frame_number in 0..3u32 {
        app.submit_frame(app.upload(session.id, frame_number, png_frame(frame_number as u8)))
            .await
            .unwrap();
    }

    let (first, second) = tokio::join!(
        app.complete_session(session.id),
        app.complete_session(session.id)
    );
    let results = [first, second];
    let successes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].total_frames(), 3);

    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(
        failure.downcast_ref::<CompletionError>(),
        Some(&CompletionError::AlreadyCompleted(session.id))
    );

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn offline_oracle_stores_fallback_frames() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(dir.path(), Arc::new(OfflineOracle)).await;
    let user = app.create_user(new_user("offline@example.com")).await.unwrap();
    let session = app.start_session(user.id, None).await.unwrap();

    let outcome = app
        .submit_frame(app.upload(session.id, 0, png_frame(9)))
        .await
        .unwrap();
    let FrameInsert::Inserted(frame) = outcome else {
        panic!("frame not stored");
    };
    assert_eq!(frame.source, AnalysisSource::Fallback);
    assert_eq!(frame.app_detected, "Unknown");
    assert_eq!(frame.wellness_impact, WellnessImpact::Neutral);

    let summary = app.complete_session(session.id).await.unwrap().summary.unwrap();
    assert_eq!(summary.wellness_score, 5.0);
    assert_eq!(summary.productivity_score, 0.0);

    let insights = app.insights(user.id).await.unwrap();
    assert_eq!(insights["overall_assessment"]["wellness_grade"], "C");

    app.shutdown().await.unwrap();
}

#[tokio::test]
async fn undecodable_frame_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(dir.path(), Arc::new(ScriptedOracle::lecture())).await;
    let user = app.create_user(new_user("bad@example.com")).await.unwrap();
    let session = app.start_session(user.id, None).await.unwrap();

    let result = app
        .submit_frame(app.upload(session.id, 0, b"not an image".to_vec()))
        .await;
    assert!(result.is_err());
    assert_eq!(app.db().frame_count(session.id).await.unwrap(), 0);

    app.shutdown().await.unwrap();
}
