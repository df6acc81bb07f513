//! End-to-end fetch lifecycle tests
//!
//! Drive the app context against a scripted transport and check what the
//! view layer would observe in the store.

mod helpers;

use helpers::TestApp;
use lumen_common::config::StoreConfig;
use lumen_store::error::CONNECTIVITY_MESSAGE;
use lumen_store::models::EmotionFrame;
use lumen_store::slices::{default_catalog, neutral_analysis, SubjectsSlice};
use lumen_store::{ApiError, Method, ResourceStatus, RootState, SliceKey};
use serde_json::json;
use std::time::Duration;

fn assert_error_iff_failed(state: &RootState) {
    for key in SliceKey::ALL {
        let failed = state.status_of(key) == ResourceStatus::Failed;
        assert_eq!(
            failed,
            state.error_of(key).is_some(),
            "slice {} violates status/error pairing",
            key
        );
    }
}

fn assert_nothing_loading(state: &RootState) {
    for key in SliceKey::ALL {
        assert_ne!(state.status_of(key), ResourceStatus::Loading, "slice {} stuck loading", key);
    }
}

fn frame() -> EmotionFrame {
    EmotionFrame {
        image: "aGVsbG8=".to_string(),
        lesson_id: Some("lesson-1".to_string()),
    }
}

async fn wait_for_requests(t: &TestApp, method: Method, path: &str, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while t.transport.request_count(method, path) < count {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {} {} {} request(s)", count, method, path));
}

#[tokio::test]
async fn test_fetch_success_transitions_idle_loading_succeeded() {
    // Given: a fresh store and a held-back subjects response
    let t = TestApp::new();
    assert_eq!(t.store().state().subjects.status(), ResourceStatus::Idle);
    let release = t.transport.respond_gated(
        Method::Get,
        "subjects",
        200,
        json!({ "data": [{ "id": 1, "name": "Algebra", "progress": 40 }] }),
    );

    // When: the fetch runs
    let driver = async {
        wait_for_requests(&t, Method::Get, "subjects", 1).await;
        // Then: loading while the request is outstanding
        let during = t.store().state();
        assert!(during.subjects.is_loading());
        assert!(during.subjects.error().is_none());
        release.send(()).unwrap();
    };
    let (result, _) = tokio::join!(t.app.fetch_subjects(), driver);

    // Then: succeeded with normalised data and no error
    assert_eq!(result.status(), ResourceStatus::Succeeded);
    assert!(result.error().is_none());
    let subjects = result.data().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0].id, "1");
    assert_eq!(subjects[0].name, "Algebra");
    assert!((subjects[0].progress - 0.4).abs() < 1e-9);
    assert_error_iff_failed(&t.store().state());
}

#[tokio::test]
async fn test_manual_retry_after_failure_clears_error() {
    let t = TestApp::new();
    t.transport.fail(Method::Get, "lessons/l-7", ApiError::Transport("connection reset".into()));
    t.transport.respond(
        Method::Get,
        "lessons/l-7",
        200,
        json!({ "id": "l-7", "title": "Fractions", "sections": [{ "heading": "Intro", "body": "..." }] }),
    );

    let first = t.app.fetch_lesson("l-7").await;
    assert!(first.is_failed());
    assert_eq!(first.error(), Some(CONNECTIVITY_MESSAGE));
    assert!(first.data().is_none());

    let second = t.app.fetch_lesson("l-7").await;
    assert_eq!(second.status(), ResourceStatus::Succeeded);
    assert!(second.error().is_none());
    let lesson = second.data().unwrap();
    assert_eq!(lesson.title, "Fractions");
    assert_eq!(lesson.sections.len(), 1);
    assert_error_iff_failed(&t.store().state());
}

#[tokio::test]
async fn test_overlapping_fetches_last_completion_wins() {
    // Given: two subjects fetches whose responses complete first-then-second
    let t = TestApp::new();
    let release_first = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "a", "name": "First" }]));
    let release_second = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "b", "name": "Second" }]));

    let driver = async {
        wait_for_requests(&t, Method::Get, "subjects", 2).await;
        let mut rx = t.store().subscribe();
        release_first.send(()).unwrap();
        rx.wait_for(|s| s.subjects.is_succeeded()).await.unwrap();
        release_second.send(()).unwrap();
    };
    let (_, _, _) = tokio::join!(t.app.fetch_subjects(), t.app.fetch_subjects(), driver);

    // Then: the later completion is what the store shows
    let state = t.store().state();
    assert_eq!(state.subjects.status(), ResourceStatus::Succeeded);
    assert_eq!(state.subjects.data().unwrap()[0].name, "Second");
    assert_nothing_loading(&state);
}

#[tokio::test]
async fn test_stale_completion_overwrites_by_default() {
    // Given: the second fetch completes before the first
    let t = TestApp::new();
    let release_first = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "a", "name": "First" }]));
    let release_second = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "b", "name": "Second" }]));

    let driver = async {
        wait_for_requests(&t, Method::Get, "subjects", 2).await;
        let mut rx = t.store().subscribe();
        release_second.send(()).unwrap();
        rx.wait_for(|s| s.subjects.is_succeeded()).await.unwrap();
        release_first.send(()).unwrap();
    };
    tokio::join!(t.app.fetch_subjects(), t.app.fetch_subjects(), driver);

    // Then: last writer wins, even though it started first
    let state = t.store().state();
    assert_eq!(state.subjects.data().unwrap()[0].name, "First");
    assert_nothing_loading(&state);
}

#[tokio::test]
async fn test_stale_completion_ignored_when_configured() {
    let t = TestApp::with_store_config(&StoreConfig {
        ignore_stale_completions: true,
        ..Default::default()
    });
    let release_first = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "a", "name": "First" }]));
    let release_second = t
        .transport
        .respond_gated(Method::Get, "subjects", 200, json!([{ "id": "b", "name": "Second" }]));

    let driver = async {
        wait_for_requests(&t, Method::Get, "subjects", 2).await;
        let mut rx = t.store().subscribe();
        release_second.send(()).unwrap();
        rx.wait_for(|s| s.subjects.is_succeeded()).await.unwrap();
        release_first.send(()).unwrap();
    };
    let (first, second, _) = tokio::join!(t.app.fetch_subjects(), t.app.fetch_subjects(), driver);

    // Then: the superseded response is dropped
    let state = t.store().state();
    assert_eq!(state.subjects.data().unwrap()[0].name, "Second");
    assert_eq!(first.data().unwrap()[0].name, "Second");
    assert_eq!(second.data().unwrap()[0].name, "Second");
    assert_nothing_loading(&state);
}

#[tokio::test]
async fn test_emotion_retries_transient_failures_then_succeeds() {
    // Given: two transport failures followed by a result
    let t = TestApp::new();
    t.transport.fail(Method::Post, "emotion/analyze", ApiError::Transport("timeout".into()));
    t.transport.fail(Method::Post, "emotion/analyze", ApiError::Transport("timeout".into()));
    t.transport.respond(
        Method::Post,
        "emotion/analyze",
        200,
        json!({ "emotions": { "happy": 0.7, "sad": 0.1, "neutral": 0.2 }, "engagement": 0.9 }),
    );

    // When: analysis runs under the retry policy (3 attempts, 1s base, 10s cap)
    let result = t.app.analyze_emotion(&frame()).await;

    // Then: success on the third attempt after exactly two jittered delays
    assert_eq!(result.status(), ResourceStatus::Succeeded);
    let analysis = result.data().unwrap();
    assert_eq!(analysis.dominant_emotion, "happy");
    assert!((analysis.confidence - 0.7).abs() < 1e-9);
    assert_eq!(t.transport.request_count(Method::Post, "emotion/analyze"), 3);

    let delays = t.sleeper.delays();
    assert_eq!(delays.len(), 2);
    let ms: Vec<f64> = delays.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
    assert!((800.0 - 1e-6..=1200.0 + 1e-6).contains(&ms[0]), "first delay {}ms", ms[0]);
    assert!((1600.0 - 1e-6..=2400.0 + 1e-6).contains(&ms[1]), "second delay {}ms", ms[1]);
}

#[tokio::test]
async fn test_emotion_falls_back_to_neutral_after_exhaustion() {
    let t = TestApp::new();
    for _ in 0..3 {
        t.transport.respond(Method::Post, "emotion/analyze", 503, json!({ "message": "model warming up" }));
    }

    let result = t.app.analyze_emotion(&frame()).await;

    assert!(result.is_failed());
    assert_eq!(result.error(), Some("model warming up"));
    assert_eq!(result.data(), Some(&neutral_analysis()));
    assert_eq!(t.transport.request_count(Method::Post, "emotion/analyze"), 3);
    assert_eq!(t.sleeper.delays().len(), 2);
}

#[tokio::test]
async fn test_emotion_client_error_is_not_retried() {
    let t = TestApp::new();
    t.transport.respond(Method::Post, "emotion/analyze", 400, json!({ "error": "No face detected" }));

    let result = t.app.analyze_emotion(&frame()).await;

    assert!(result.is_failed());
    assert_eq!(result.error(), Some("No face detected"));
    assert_eq!(result.data().unwrap().dominant_emotion, "neutral");
    assert_eq!(t.transport.request_count(Method::Post, "emotion/analyze"), 1);
    assert!(t.sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_subjects_failure_shows_default_catalog() {
    let t = TestApp::new();
    t.transport.fail(Method::Get, "subjects", ApiError::Transport("offline".into()));

    let result = t.app.fetch_subjects().await;

    assert!(result.is_failed());
    assert_eq!(result.error(), Some(CONNECTIVITY_MESSAGE));
    assert_eq!(result.data(), Some(&default_catalog()));
}

#[tokio::test]
async fn test_modules_failure_keeps_previous_modules() {
    let t = TestApp::new();
    t.transport.respond(
        Method::Get,
        "subjects/math/modules",
        200,
        json!({ "modules": [{ "id": "m2", "title": "Two", "order": 2 }, { "id": "m1", "title": "One", "order": 1 }] }),
    );
    t.transport.respond(Method::Get, "subjects/math/modules", 500, json!(null));

    let loaded = t.app.fetch_modules("math").await;
    let ids: Vec<&str> = loaded.data().unwrap().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);

    let failed = t.app.fetch_modules("math").await;
    assert!(failed.is_failed());
    assert_eq!(
        failed.error(),
        Some("The server encountered an error. Please try again later.")
    );
    assert_eq!(failed.data(), loaded.data());
}

#[tokio::test]
async fn test_invalid_id_fails_without_request() {
    let t = TestApp::new();

    let result = t.app.fetch_quizzes("  ").await;

    assert!(result.is_failed());
    assert!(result.error().unwrap().contains("lesson id"));
    assert!(t.transport.requests().is_empty());
}

#[tokio::test]
async fn test_mixed_fetches_settle_without_stuck_loading() {
    let t = TestApp::new();
    t.transport.respond(Method::Get, "subjects", 200, json!([{ "id": "math" }]));
    t.transport.respond(Method::Get, "ar-models", 200, json!({ "models": [{ "id": "heart", "name": "Heart" }] }));
    t.transport.fail(Method::Get, "lessons/l-1/quizzes", ApiError::Transport("reset".into()));

    tokio::join!(
        t.app.fetch_subjects(),
        t.app.fetch_ar_models(),
        t.app.fetch_quizzes("l-1"),
        t.app.fetch_lesson("missing"),
    );

    let state = t.store().state();
    assert_nothing_loading(&state);
    assert_error_iff_failed(&state);
    assert!(state.subjects.is_succeeded());
    assert!(state.ar_models.is_succeeded());
    assert!(state.quizzes.is_failed());
    // unscripted path answers 404
    assert_eq!(
        state.lesson.error(),
        Some("no scripted response for GET lessons/missing")
    );
    assert!(state.get::<SubjectsSlice>().is_succeeded());
}
