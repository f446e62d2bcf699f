//! Session engine: question sequencing, scoring and run completion.
//!
//! The engine is a synchronous state machine. The adapter feeds it input
//! (`start_*`, `submit_answer`, `advance`, `continue_to_next_chapter`) and owns
//! all timing: after an answer is scored the engine parks in
//! [`Phase::AwaitingAdvance`] until the adapter's settle timer calls
//! [`SessionEngine::advance`]. Out-of-order input is absorbed as a no-op.

mod achievements;
mod daily;
mod display;
mod state;

pub use achievements::{Achievement, check_achievements};
pub use daily::{DailySummary, StreakChange, build_daily_pool, update_streak};
pub use display::DisplayMap;
pub use state::{
    Advance, AnswerOutcome, ChapterSummary, Mode, Phase, QuestionView, RunSummary, SessionState,
};

use rand::seq::SliceRandom;
use smallvec::SmallVec;
use thiserror::Error;

use crate::bank::{Question, QuestionBank, QuestionRef};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::constants::{DEFAULT_PLAYER_NAME, LOG_TARGET_SESSION};
use crate::presenter::{Cue, EngineEvent, Presenter};
use crate::profile::{ProfileStorage, ProfileStore, ProfileSummary};
use crate::rewards::{adventure_correct_reward, daily_bonus, xp_for};
use crate::rng::RngBundle;
use crate::skins::{ActivateOutcome, Skin, SkinCatalog, SkinListing, UnlockOutcome};

/// An input that arrived in a phase that cannot accept it. Absorbed, logged,
/// and kept for inspection; never surfaced as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} ignored while {phase}")]
pub struct InvalidTransition {
    pub operation: &'static str,
    pub phase: Phase,
}

/// Most recent end-of-segment summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Chapter(ChapterSummary),
    Adventure(RunSummary),
    Daily(DailySummary),
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    f64::from(part) / f64::from(whole) * 100.0
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Owns the in-progress run and drives it against the question bank and the
/// injected profile store.
pub struct SessionEngine<S: ProfileStorage> {
    bank: QuestionBank,
    config: EngineConfig,
    profile: ProfileStore<S>,
    skins: SkinCatalog,
    rng: RngBundle,
    clock: Box<dyn Clock>,
    state: SessionState,
    phase: Phase,
    remembered_name: String,
    events: Vec<EngineEvent>,
    last_summary: Option<Summary>,
    last_rejection: Option<InvalidTransition>,
}

impl<S: ProfileStorage> std::fmt::Debug for SessionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("seed", &self.rng.seed())
            .finish_non_exhaustive()
    }
}

impl<S: ProfileStorage> SessionEngine<S> {
    /// Create an idle engine with default config, skins and the system clock.
    #[must_use]
    pub fn new(bank: QuestionBank, profile: ProfileStore<S>, seed: u64) -> Self {
        Self {
            bank,
            config: EngineConfig::default(),
            profile,
            skins: SkinCatalog::default(),
            rng: RngBundle::from_user_seed(seed),
            clock: Box::new(SystemClock),
            state: SessionState::default(),
            phase: Phase::Idle,
            remembered_name: DEFAULT_PLAYER_NAME.to_string(),
            events: Vec::new(),
            last_summary: None,
            last_rejection: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_skins(mut self, skins: SkinCatalog) -> Self {
        self.skins = skins;
        self
    }

    /// Swap the calendar source, e.g. to simulate the next day.
    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    /// Deterministically reseed both random streams.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
    }

    // ---------------------------------------------------------------- access

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn profile(&self) -> &ProfileStore<S> {
        &self.profile
    }

    #[must_use]
    pub const fn skins(&self) -> &SkinCatalog {
        &self.skins
    }

    #[must_use]
    pub const fn last_summary(&self) -> Option<&Summary> {
        self.last_summary.as_ref()
    }

    #[must_use]
    pub const fn last_rejection(&self) -> Option<&InvalidTransition> {
        self.last_rejection.as_ref()
    }

    /// Display map for the question on screen.
    #[must_use]
    pub const fn display_map(&self) -> Option<&DisplayMap> {
        self.state.option_display_map.as_ref()
    }

    // ---------------------------------------------------------------- events

    /// Queued presenter events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand every queued event to the presenter, in order.
    pub fn dispatch<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        for event in self.events.drain(..) {
            presenter.handle(&event);
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    fn reject(&mut self, operation: &'static str) {
        let rejection = InvalidTransition {
            operation,
            phase: self.phase,
        };
        log::debug!(target: LOG_TARGET_SESSION, "{rejection}");
        self.last_rejection = Some(rejection);
    }

    // ---------------------------------------------------------------- starts

    /// Begin an adventure: sample up to `questions_per_chapter` distinct
    /// questions from every chapter and show the first one.
    pub fn start_adventure(&mut self, player_name: &str) {
        let name = normalize_name(player_name);
        self.remembered_name.clone_from(&name);
        self.state = SessionState::new(Mode::Adventure, name, self.bank.chapter_count());
        let per_chapter = self.config.questions_per_chapter;
        let sampling = self.rng.sampling();
        self.state.chapter_question_sets = self
            .bank
            .chapters()
            .iter()
            .enumerate()
            .map(|(chapter, ch)| {
                let mut pool: Vec<QuestionRef> =
                    (0..ch.len()).map(|slot| QuestionRef { chapter, slot }).collect();
                pool.shuffle(sampling);
                pool.truncate(per_chapter);
                pool
            })
            .collect();
        self.last_summary = None;
        self.phase = Phase::Playing;
        log::debug!(
            target: LOG_TARGET_SESSION,
            "adventure started for {} across {} chapters",
            self.state.player_name,
            self.bank.chapter_count()
        );
        self.show_question();
    }

    /// Begin a daily challenge drawn from the whole bank.
    pub fn start_daily(&mut self) {
        let name = self.remembered_name.clone();
        self.state = SessionState::new(Mode::Daily, name, self.bank.chapter_count());
        self.state.daily_questions = build_daily_pool(
            &self.bank,
            self.config.daily_question_count,
            self.rng.sampling(),
        );
        self.last_summary = None;
        self.phase = Phase::Playing;
        log::debug!(
            target: LOG_TARGET_SESSION,
            "daily started with {} questions",
            self.state.daily_questions.len()
        );
        self.show_question();
    }

    /// Restart an adventure with the last player name.
    pub fn play_again(&mut self) {
        let name = self.remembered_name.clone();
        self.start_adventure(&name);
    }

    /// Abandon any run and return to idle. The profile is not touched.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        self.phase = Phase::Idle;
        self.last_summary = None;
        log::debug!(target: LOG_TARGET_SESSION, "session reset");
    }

    /// Adapter-facing name for [`Self::reset`].
    pub fn reset_to_welcome(&mut self) {
        self.reset();
    }

    // ---------------------------------------------------------------- cursor

    /// Reference to the question on screen. Adventure cursors past the end of
    /// a chapter set clamp to its last question.
    #[must_use]
    pub fn current_ref(&self) -> Option<QuestionRef> {
        if self.phase == Phase::Idle {
            return None;
        }
        match self.state.mode {
            Mode::Daily => {
                let last = self.state.daily_questions.len().checked_sub(1)?;
                self.state
                    .daily_questions
                    .get(self.state.daily_index.min(last))
                    .copied()
            }
            Mode::Adventure => {
                let set = self.state.chapter_question_sets.get(self.state.chapter_index)?;
                set.get(self.state.question_index).or_else(|| set.last()).copied()
            }
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_ref().and_then(|qref| self.bank.question(qref))
    }

    /// 1-based position across the whole run.
    #[must_use]
    pub fn question_number(&self) -> usize {
        match self.state.mode {
            Mode::Daily => self.state.daily_index + 1,
            Mode::Adventure => {
                let prior: usize = self
                    .state
                    .chapter_question_sets
                    .iter()
                    .take(self.state.chapter_index)
                    .map(Vec::len)
                    .sum();
                prior + self.state.question_index + 1
            }
        }
    }

    /// Denominator for progress and accuracy.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        match self.state.mode {
            Mode::Daily => self.state.daily_questions.len(),
            Mode::Adventure => self.bank.chapter_count() * self.config.questions_per_chapter,
        }
    }

    fn last_chapter_index(&self) -> usize {
        self.bank.chapter_count().saturating_sub(1)
    }

    /// Render data for the question on screen.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        if !matches!(self.phase, Phase::Playing | Phase::AwaitingAdvance) {
            return None;
        }
        let qref = self.current_ref()?;
        let question = self.bank.question(qref)?;
        let chapter = self.bank.chapter(qref.chapter)?;
        let map = self.state.option_display_map.unwrap_or_default();
        let options = map
            .order()
            .iter()
            .map(|&option| question.options[option].clone())
            .collect();
        let question_number = self.question_number();
        Some(QuestionView {
            mode: self.state.mode,
            player_name: self.state.player_name.clone(),
            chapter_title: chapter.title.clone(),
            theme: chapter.theme.clone(),
            prompt: question.prompt.clone(),
            options,
            question_number,
            total_questions: self.total_questions(),
            score: self.state.score,
            coins: self.state.coins,
            xp: self.state.xp,
            new_chapter: self.state.mode == Mode::Adventure
                && self.state.question_index == 0
                && question_number != 1,
            locked: self.state.is_locked,
        })
    }

    /// Put the current question on screen: fresh option permutation, unlock,
    /// and a theme change when the chapter differs from the one shown.
    fn show_question(&mut self) {
        let Some(qref) = self.current_ref() else {
            return;
        };
        if self.state.mode == Mode::Daily {
            // the theme follows the chapter the daily question came from
            self.state.chapter_index = qref.chapter;
        }
        if self.state.active_theme_chapter != Some(qref.chapter)
            && let Some(chapter) = self.bank.chapter(qref.chapter)
        {
            let theme = chapter.theme.clone();
            self.state.active_theme_chapter = Some(qref.chapter);
            self.emit(EngineEvent::ThemeApplied { theme });
        }
        self.state.option_display_map = Some(DisplayMap::shuffled(self.rng.display()));
        self.state.is_locked = false;
    }

    // ---------------------------------------------------------------- answer

    /// Score the option at `display_index` of the current display map.
    /// Returns `None` (and changes nothing) when an answer is already being
    /// processed, no question is up, or the index is off the board.
    pub fn submit_answer(&mut self, display_index: usize) -> Option<AnswerOutcome> {
        if self.phase != Phase::Playing || self.state.is_locked {
            self.reject("submit_answer");
            return None;
        }
        let map = self.state.option_display_map?;
        let Some(chosen_option) = map.option_for(display_index) else {
            self.reject("submit_answer");
            return None;
        };
        let question = self.current_question()?.clone();

        self.state.is_locked = true;
        self.phase = Phase::AwaitingAdvance;

        let correct = chosen_option == question.correct_index;
        let mut coins_awarded = 0;
        let mut xp_awarded = 0;
        let mut achievements = SmallVec::new();

        if correct {
            coins_awarded = adventure_correct_reward();
            xp_awarded = xp_for(&question);
            self.state.score += 1;
            self.state.coins = self.state.coins.saturating_add(coins_awarded);
            self.state.xp = self.state.xp.saturating_add(xp_awarded);
            if self.state.mode == Mode::Adventure
                && let Some(count) = self.state.chapter_scores.get_mut(self.state.chapter_index)
            {
                *count += 1;
            }
            self.emit(EngineEvent::Cue { cue: Cue::Correct });
            achievements = check_achievements(
                self.state.score,
                self.state.coins,
                self.state.chapter_index,
                self.last_chapter_index(),
            );
            for achievement in &achievements {
                self.emit(EngineEvent::Achievement {
                    achievement: *achievement,
                });
            }
            self.emit(EngineEvent::RewardPopup {
                amount: coins_awarded,
            });
        } else {
            self.emit(EngineEvent::Cue { cue: Cue::Wrong });
        }
        self.emit(EngineEvent::CoinHud {
            coins: self.state.coins,
        });

        Some(AnswerOutcome {
            correct,
            display_index,
            chosen_option,
            correct_index: question.correct_index,
            correct_option: question.correct_option().to_string(),
            coins_awarded,
            xp_awarded,
            achievements,
        })
    }

    // ---------------------------------------------------------------- advance

    /// Move past a scored answer: next question, chapter boundary, or run end.
    pub fn advance(&mut self) -> Advance {
        if self.phase != Phase::AwaitingAdvance {
            self.reject("advance");
            return Advance::Ignored;
        }
        match self.state.mode {
            Mode::Daily => {
                if self.state.daily_index + 1 < self.state.daily_questions.len() {
                    self.state.daily_index += 1;
                    self.phase = Phase::Playing;
                    self.show_question();
                    Advance::NextQuestion
                } else {
                    let daily = self.finish_daily();
                    Advance::DailyComplete { daily }
                }
            }
            Mode::Adventure => {
                let set_len = self
                    .state
                    .chapter_question_sets
                    .get(self.state.chapter_index)
                    .map_or(0, Vec::len);
                if self.state.question_index + 1 < set_len {
                    self.state.question_index += 1;
                    self.phase = Phase::Playing;
                    self.show_question();
                    return Advance::NextQuestion;
                }
                let chapter = self.finish_chapter();
                if self.state.chapter_index >= self.last_chapter_index() {
                    let run = self.finish_game();
                    Advance::AdventureComplete { chapter, run }
                } else {
                    self.phase = Phase::ChapterBoundary;
                    self.state.is_locked = false;
                    self.last_summary = Some(Summary::Chapter(chapter.clone()));
                    Advance::ChapterComplete { chapter }
                }
            }
        }
    }

    /// Leave the chapter-end screen for the next chapter's first question.
    /// Returns `false` when called anywhere but a chapter boundary.
    pub fn continue_to_next_chapter(&mut self) -> bool {
        if self.phase != Phase::ChapterBoundary {
            self.reject("continue_to_next_chapter");
            return false;
        }
        self.state.chapter_index += 1;
        self.state.question_index = 0;
        self.state.is_locked = false;
        self.phase = Phase::Playing;
        self.show_question();
        true
    }

    fn finish_chapter(&self) -> ChapterSummary {
        let index = self.state.chapter_index;
        let attempted = self
            .state
            .chapter_question_sets
            .get(index)
            .map_or(0, |set| clamp_u32(set.len()));
        let correct = self.state.chapter_scores.get(index).copied().unwrap_or(0);
        ChapterSummary {
            chapter_index: index,
            title: self
                .bank
                .chapter(index)
                .map(|chapter| chapter.title.clone())
                .unwrap_or_default(),
            correct,
            attempted,
            accuracy: percent(correct, attempted),
            coins: self.state.coins,
            question_number: self.question_number(),
            total_questions: self.total_questions(),
        }
    }

    /// Commit an adventure to the profile. Only a completed run gets here.
    fn finish_game(&mut self) -> RunSummary {
        let total = clamp_u32(self.total_questions()).max(1);
        let score = self.state.score;
        let coins = self.state.coins;
        let accuracy = percent(score, total);
        let chapters = clamp_u32(self.bank.chapter_count());

        self.profile.update(|record| {
            record.best_score = record.best_score.max(score);
            record.best_accuracy = record.best_accuracy.max(accuracy);
            record.credit_run(coins, score, total);
            record.highest_chapter_completed = record.highest_chapter_completed.max(chapters);
        });

        let record = self.profile.record();
        let run = RunSummary {
            player_name: self.state.player_name.clone(),
            score,
            total_questions: total,
            accuracy,
            coins,
            xp: self.state.xp,
            best_score: record.best_score,
            best_accuracy: record.best_accuracy,
            total_coins_earned: record.total_coins_earned,
            coin_balance: record.coin_balance,
        };
        log::info!(
            target: LOG_TARGET_SESSION,
            "adventure finished: {score}/{total} correct, {coins} coins"
        );
        self.phase = Phase::Finished;
        self.state.is_locked = false;
        self.last_summary = Some(Summary::Adventure(run.clone()));
        run
    }

    /// Update the streak, pay the bonus and commit the daily to the profile.
    fn finish_daily(&mut self) -> DailySummary {
        let total = clamp_u32(self.state.daily_questions.len()).max(1);
        let correct = self.state.score;
        let accuracy = percent(correct, total);
        let today = self.clock.today();

        let run_coins = self.state.coins;
        // streak, bonus and credit land in a single write
        let (streak, streak_change, bonus, coins) = self.profile.update(|record| {
            let change = update_streak(record, today);
            let streak = record.daily_streak;
            let bonus = daily_bonus(streak);
            let coins = run_coins.saturating_add(bonus);
            record.credit_run(coins, correct, total);
            (streak, change, bonus, coins)
        });
        self.state.coins = coins;
        self.emit(EngineEvent::CoinHud { coins });

        let daily = DailySummary {
            correct,
            total,
            accuracy,
            streak,
            streak_change,
            bonus,
            coins,
            coin_balance: self.profile.record().coin_balance,
        };
        log::info!(
            target: LOG_TARGET_SESSION,
            "daily finished: {correct}/{total} correct, streak {streak}, bonus {bonus}"
        );
        self.phase = Phase::Finished;
        self.state.is_locked = false;
        self.last_summary = Some(Summary::Daily(daily.clone()));
        daily
    }

    // ---------------------------------------------------------------- profile

    #[must_use]
    pub fn profile_summary(&self) -> ProfileSummary {
        let record = self.profile.record();
        ProfileSummary {
            best_score: record.best_score,
            best_accuracy: record.best_accuracy,
            total_correct: record.total_correct_all_time,
            total_questions: record.total_questions_all_time,
            average_accuracy: record.average_accuracy(),
            total_coins_earned: record.total_coins_earned,
            coin_balance: record.coin_balance,
            daily_streak: record.daily_streak,
            active_skin_name: self.active_skin().display_name.clone(),
        }
    }

    #[must_use]
    pub fn active_skin(&self) -> &Skin {
        self.skins.active_skin(&self.profile)
    }

    #[must_use]
    pub fn skin_listing(&self) -> Vec<SkinListing> {
        self.skins.listing(&self.profile)
    }

    /// Buy a skin with the profile's coin balance.
    pub fn unlock_skin(&mut self, skin_id: &str) -> UnlockOutcome {
        let outcome = self.skins.unlock(&mut self.profile, skin_id);
        if let UnlockOutcome::Unlocked { balance } = outcome {
            self.emit(EngineEvent::CoinHud { coins: balance });
        }
        outcome
    }

    pub fn activate_skin(&mut self, skin_id: &str) -> ActivateOutcome {
        self.skins.activate(&mut self.profile, skin_id)
    }
}
