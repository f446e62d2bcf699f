use chrono::NaiveDate;
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use wordquest_game::{
    Advance, DailySummary, EmbeddedDataLoader, FixedClock, GameEngine, MemoryStorage, Mode,
    ProfileRecord, ProfileStorage, SessionEngine, StreakChange,
};

/// Keeps every document written, in order.
#[derive(Clone, Default)]
struct WriteLog(Rc<RefCell<Vec<String>>>);

impl ProfileStorage for WriteLog {
    type Error = Infallible;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.0.borrow().last().cloned())
    }

    fn write(&self, contents: &str) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(contents.to_string());
        Ok(())
    }
}

fn day(y: i32, m: u32, d: u32) -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Answer the first `correct` questions right and the rest wrong.
fn play_daily<S: ProfileStorage>(session: &mut SessionEngine<S>, correct: usize) -> DailySummary {
    session.start_daily();
    assert_eq!(session.state().mode, Mode::Daily);
    let mut answered = 0;
    loop {
        let question = session.current_question().unwrap();
        let right = session
            .display_map()
            .unwrap()
            .display_index_of(question.correct_index)
            .unwrap();
        let pick = if answered < correct { right } else { (right + 1) % 4 };
        session.submit_answer(pick).unwrap();
        answered += 1;
        match session.advance() {
            Advance::NextQuestion => {}
            Advance::DailyComplete { daily } => {
                assert_eq!(answered, 5);
                return daily;
            }
            other => panic!("unexpected advance {other:?}"),
        }
    }
}

fn session_with(storage: MemoryStorage, clock: FixedClock) -> SessionEngine<MemoryStorage> {
    GameEngine::new(EmbeddedDataLoader, storage)
        .create_session(0xDA11)
        .unwrap()
        .with_clock(clock)
}

#[test]
fn first_daily_starts_streak_and_pays_bonus() {
    let storage = MemoryStorage::default();
    let mut session = session_with(storage.clone(), day(2024, 6, 1));
    let daily = play_daily(&mut session, 3);

    assert_eq!(daily.correct, 3);
    assert_eq!(daily.total, 5);
    assert!((daily.accuracy - 60.0).abs() < 1e-9);
    assert_eq!(daily.streak, 1);
    assert_eq!(daily.streak_change, StreakChange::Restarted);
    assert_eq!(daily.bonus, 10);
    assert_eq!(daily.coins, 85);

    let record = session.profile().record();
    assert_eq!(record.last_daily_date, "2024-06-01");
    assert_eq!(record.coin_balance, 85);
    assert_eq!(record.total_coins_earned, 85);
    assert_eq!(record.total_correct_all_time, 3);
    assert_eq!(record.total_questions_all_time, 5);
    // dailies never touch adventure bests
    assert_eq!(record.best_score, 0);
    assert!(storage.contents().unwrap().contains("2024-06-01"));
}

#[test]
fn consecutive_days_extend_and_gaps_restart() {
    let storage = MemoryStorage::default();
    let mut clock = day(2024, 2, 28);
    let mut session = session_with(storage, clock);

    assert_eq!(play_daily(&mut session, 0).streak, 1);
    clock.advance_days(1);
    session.set_clock(clock);
    let second = play_daily(&mut session, 0);
    assert_eq!(second.streak, 2);
    assert_eq!(second.streak_change, StreakChange::Extended);
    assert_eq!(second.bonus, 20);

    clock.advance_days(3);
    session.set_clock(clock);
    let after_gap = play_daily(&mut session, 0);
    assert_eq!(after_gap.streak, 1);
    assert_eq!(after_gap.streak_change, StreakChange::Restarted);
    assert_eq!(session.profile().record().last_daily_date, "2024-03-03");
}

#[test]
fn same_day_replay_keeps_streak_but_pays_again() {
    let storage = MemoryStorage::with_contents(
        r#"{"daily_streak": 4, "last_daily_date": "2024-06-01", "coin_balance": 10}"#,
    );
    let mut session = session_with(storage, day(2024, 6, 1));
    let daily = play_daily(&mut session, 5);
    assert_eq!(daily.streak, 4);
    assert_eq!(daily.streak_change, StreakChange::Unchanged);
    assert_eq!(daily.bonus, 40);
    assert_eq!(daily.coins, 125 + 40);
    assert_eq!(session.profile().record().coin_balance, 10 + 165);
}

#[test]
fn bonus_is_capped_for_long_streaks() {
    let storage = MemoryStorage::with_contents(
        r#"{"daily_streak": 30, "last_daily_date": "2024-05-31"}"#,
    );
    let mut session = session_with(storage, day(2024, 6, 1));
    let daily = play_daily(&mut session, 0);
    assert_eq!(daily.streak, 31);
    assert_eq!(daily.bonus, 100);
    assert_eq!(daily.coins, 100);
}

#[test]
fn finished_daily_is_committed_in_one_write() {
    let log = WriteLog::default();
    let mut session = GameEngine::new(EmbeddedDataLoader, log.clone())
        .create_session(0xDA11)
        .unwrap()
        .with_clock(day(2024, 6, 1));
    let daily = play_daily(&mut session, 2);

    let writes = log.0.borrow();
    assert_eq!(writes.len(), 1);
    let saved = ProfileRecord::from_json(&writes[0]).unwrap();
    assert_eq!(saved.last_daily_date, "2024-06-01");
    assert_eq!(saved.daily_streak, 1);
    assert_eq!(saved.coin_balance, daily.coins);
    assert_eq!(saved.total_coins_earned, 50 + 10);
    assert_eq!(saved.total_questions_all_time, 5);
}
