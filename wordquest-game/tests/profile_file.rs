use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use wordquest_game::constants::PROFILE_FILE_NAME;
use wordquest_game::{
    EmbeddedDataLoader, GameEngine, JsonFileStorage, PersistenceWarning, ProfileStore,
    UnlockOutcome,
};

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("wordquest-{label}-{nanos}"))
}

#[test]
fn profile_round_trips_through_disk() {
    let dir = temp_dir("roundtrip");
    let path = dir.join(PROFILE_FILE_NAME);
    let engine = GameEngine::new(EmbeddedDataLoader, JsonFileStorage::new(&path));

    let mut session = engine.create_session(1).unwrap();
    assert!(session.profile().last_warning().is_none());
    session.start_adventure("Ada");
    loop {
        let question = session.current_question().unwrap();
        let pick = session
            .display_map()
            .unwrap()
            .display_index_of(question.correct_index)
            .unwrap();
        session.submit_answer(pick).unwrap();
        let step = session.advance();
        if step.is_finished() {
            break;
        }
        session.continue_to_next_chapter();
    }
    assert_eq!(
        session.unlock_skin("royal_gold"),
        UnlockOutcome::Unlocked { balance: 1900 }
    );
    session.activate_skin("royal_gold");
    let saved = session.profile().record().clone();

    let reloaded = ProfileStore::load(JsonFileStorage::new(&path));
    assert_eq!(reloaded.record(), &saved);
    assert_eq!(reloaded.record().active_skin, "royal_gold");
    assert!(!dir.join(format!("{PROFILE_FILE_NAME}.tmp")).exists());

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for key in [
        "best_score",
        "best_accuracy",
        "total_coins_earned",
        "coin_balance",
        "highest_chapter_completed",
        "total_correct_all_time",
        "total_questions_all_time",
        "max_coins_single_run",
        "daily_streak",
        "last_daily_date",
        "skins_unlocked",
        "active_skin",
    ] {
        assert!(raw.get(key).is_some(), "missing {key}");
    }

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn corrupt_file_loads_defaults_and_is_overwritten_on_save() {
    let dir = temp_dir("corrupt");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(PROFILE_FILE_NAME);
    fs::write(&path, "{\"best_score\": ").unwrap();

    let mut store = ProfileStore::load(JsonFileStorage::new(&path));
    assert!(matches!(
        store.last_warning(),
        Some(PersistenceWarning::Corrupt(_))
    ));
    assert_eq!(store.record().best_score, 0);

    store.update(|record| record.coin_balance = 5);
    let reloaded = ProfileStore::load(JsonFileStorage::new(&path));
    assert!(reloaded.last_warning().is_none());
    assert_eq!(reloaded.record().coin_balance, 5);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_file_is_not_a_warning() {
    let path = temp_dir("missing").join(PROFILE_FILE_NAME);
    let store = ProfileStore::load(JsonFileStorage::new(path));
    assert!(store.last_warning().is_none());
    assert_eq!(store.record().highest_chapter_completed, 1);
}
