//! End-to-end session scenarios over the mock gateway and a temp stats
//! store.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use engvantage_core::model::{StudentLevel, TargetLanguage};
use engvantage_core::session::{LoadState, SessionController};
use engvantage_core::stats::StatsStore;
use engvantage_core::traits::ContentGateway;
use engvantage_gateway::MockGateway;

fn session(dir: &TempDir) -> (Arc<MockGateway>, SessionController) {
    let store = StatsStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let gateway = Arc::new(MockGateway::new());
    let ctrl = SessionController::new(gateway.clone() as Arc<dyn ContentGateway>, store);
    (gateway, ctrl)
}

#[tokio::test]
async fn full_study_session() {
    let dir = TempDir::new().unwrap();
    let (gateway, mut ctrl) = session(&dir);

    // Select Senior High + Traditional Chinese and load.
    ctrl.set_level(StudentLevel::SeniorHigh);
    ctrl.settle().await;
    assert_eq!(ctrl.target_language(), TargetLanguage::TraditionalChinese);

    // Ten well-formed words, none learned, stats unchanged.
    assert_eq!(ctrl.words().len(), 10);
    assert!(ctrl.words().iter().all(|w| !w.learned));
    assert!(ctrl.words().iter().all(|w| w.level == StudentLevel::SeniorHigh));
    assert_eq!(ctrl.stats().total_words_learned, 0);

    // Toggle word #3: counter +1, record persisted.
    let third = ctrl.words()[2].id;
    ctrl.toggle_learned(third);
    assert_eq!(ctrl.stats().total_words_learned, 1);
    assert!(ctrl.words()[2].learned);

    let reread = StatsStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(reread.load().total_words_learned, 1);
    assert_eq!(reread.load().level, StudentLevel::SeniorHigh);

    // Switch to Junior High: the list is replaced wholesale.
    let old_ids: Vec<_> = ctrl.words().iter().map(|w| w.id).collect();
    ctrl.set_level(StudentLevel::JuniorHigh);
    ctrl.settle().await;

    assert_eq!(ctrl.words().len(), 10);
    assert!(ctrl.words().iter().all(|w| w.level == StudentLevel::JuniorHigh));
    assert!(ctrl.words().iter().all(|w| !old_ids.contains(&w.id)));
    assert_eq!(gateway.fetch_calls(), 2);

    // The learned count survives the reload.
    assert_eq!(ctrl.stats().total_words_learned, 1);
}

#[tokio::test]
async fn language_switch_mid_flight_shows_latest() {
    let dir = TempDir::new().unwrap();
    let (gateway, mut ctrl) = session(&dir);

    // The initial fetch is slow; the one fired by the language change wins.
    gateway.delay_next_fetch(Duration::from_millis(80));
    gateway.delay_next_fetch(Duration::from_millis(1));

    ctrl.reload_words();
    ctrl.set_target_language(TargetLanguage::Japanese);
    ctrl.settle().await;

    assert!(ctrl
        .words()
        .iter()
        .all(|w| w.translation.contains("Japanese")));

    // Apply the straggler too: the display must not change.
    assert!(ctrl.tick().await);
    assert!(ctrl
        .words()
        .iter()
        .all(|w| w.translation.contains("Japanese")));
    assert_eq!(*ctrl.words_load(), LoadState::Loaded);
}

#[tokio::test]
async fn failed_reload_surfaces_reason_and_keeps_list() {
    let dir = TempDir::new().unwrap();
    let (gateway, mut ctrl) = session(&dir);

    ctrl.reload_words();
    ctrl.settle().await;
    assert_eq!(ctrl.words().len(), 10);

    gateway.fail_next_fetch(engvantage_core::error::GatewayError::Timeout(60));
    ctrl.reload_words();
    ctrl.settle().await;

    assert_eq!(ctrl.words().len(), 10, "previous list kept on failure");
    assert!(ctrl.words_load().failure().unwrap().contains("timed out"));
}

#[tokio::test]
async fn quiz_round_trip_with_persisted_stats_untouched() {
    let dir = TempDir::new().unwrap();
    let (gateway, mut ctrl) = session(&dir);

    ctrl.reload_words();
    ctrl.settle().await;
    ctrl.start_quiz();
    ctrl.settle().await;

    assert!(ctrl.in_quiz_mode());
    let quiz = ctrl.quiz().unwrap();
    assert_eq!(quiz.len(), 10, "one question per word");
    assert!(quiz.iter().all(|q| q.correct_index().is_some()));
    assert_eq!(gateway.quiz_calls(), 1);

    let outcome = ctrl.complete_quiz(8).unwrap();
    assert_eq!(outcome.score, 8);
    assert_eq!(outcome.total, 10);
    assert!(!ctrl.in_quiz_mode());

    // Quiz scores are not persisted.
    let reread = StatsStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    assert_eq!(reread.load().total_words_learned, 0);
}

#[tokio::test]
async fn stats_survive_process_restart() {
    let dir = TempDir::new().unwrap();
    {
        let (_gateway, mut ctrl) = session(&dir);
        ctrl.reload_words();
        ctrl.settle().await;
        let id = ctrl.words()[0].id;
        ctrl.toggle_learned(id);
        ctrl.set_target_language(TargetLanguage::Korean);
        ctrl.settle().await;
    }

    // A fresh controller restores selection and counters from disk.
    let (_gateway, ctrl) = session(&dir);
    assert_eq!(ctrl.stats().total_words_learned, 1);
    assert_eq!(ctrl.target_language(), TargetLanguage::Korean);
    assert_eq!(ctrl.level(), StudentLevel::JuniorHigh);
}

#[tokio::test]
async fn fire_and_forget_speech_failure_is_invisible() {
    let dir = TempDir::new().unwrap();
    let (gateway, mut ctrl) = session(&dir);
    gateway.fail_speech();

    ctrl.reload_words();
    ctrl.settle().await;

    ctrl.pronounce("accomplish");
    ctrl.pronounce("require");
    tokio::time::sleep(Duration::from_millis(20)).await;
    ctrl.drain_pending();

    assert_eq!(gateway.speech_calls(), 2);
    assert_eq!(ctrl.words().len(), 10);
    assert_eq!(*ctrl.words_load(), LoadState::Loaded);
}
