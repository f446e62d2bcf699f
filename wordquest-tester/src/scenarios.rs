use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDate;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use wordquest_game::{
    ActivateOutcome, Advance, DailySummary, FixedClock, GameEngine, MemoryStorage, Phase,
    ProfileStorage, RunSummary, SessionEngine, StreakChange, UnlockOutcome,
    adventure_correct_reward, daily_bonus,
};

use crate::bot::AnswerBot;
use crate::loader::FsDataLoader;
use crate::presenter::ConsolePresenter;

/// Inputs shared by every iteration of a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub loader: FsDataLoader,
    pub seed: u64,
    pub accuracy: f64,
    pub today: NaiveDate,
    pub verbose: bool,
}

impl ScenarioCtx {
    fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    fn session(&self) -> Result<SessionEngine<MemoryStorage>> {
        let engine = GameEngine::new(self.loader.clone(), MemoryStorage::default());
        let session = engine
            .create_session(self.seed)
            .context("failed to create session")?;
        Ok(session.with_clock(FixedClock(self.today)))
    }

    fn bot(&self) -> AnswerBot {
        AnswerBot::new(self.accuracy, self.seed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Adventure,
    Daily,
    Streak,
    Spam,
    Shop,
}

impl Scenario {
    pub const ALL: [Self; 5] = [
        Self::Adventure,
        Self::Daily,
        Self::Streak,
        Self::Spam,
        Self::Shop,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Daily => "daily",
            Self::Streak => "streak",
            Self::Spam => "spam",
            Self::Shop => "shop",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Adventure => "Full Adventure",
            Self::Daily => "Daily Challenge",
            Self::Streak => "Daily Streak Across Days",
            Self::Spam => "Double Submit Guard",
            Self::Shop => "Skin Shop Economy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.key() == key.to_lowercase())
    }

    fn run(self, ctx: &ScenarioCtx) -> Result<()> {
        match self {
            Self::Adventure => adventure_scenario(ctx),
            Self::Daily => daily_scenario(ctx),
            Self::Streak => streak_scenario(ctx),
            Self::Spam => spam_scenario(ctx),
            Self::Shop => shop_scenario(ctx),
        }
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    Scenario::ALL
        .into_iter()
        .map(|scenario| (scenario.key(), scenario.name()))
        .collect()
}

/// Expand `all` and resolve keys, reporting unknown ones.
pub fn expand_scenarios(keys: &[String]) -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for key in keys {
        if key == "all" {
            scenarios.extend(Scenario::ALL);
        } else if let Some(scenario) = Scenario::from_key(key) {
            scenarios.push(scenario);
        } else {
            eprintln!("⚠️  Unknown scenario: {}", key.yellow());
        }
    }
    scenarios.dedup();
    scenarios
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub average_duration: Duration,
}

pub struct ScenarioRunner {
    verbose: bool,
}

impl ScenarioRunner {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: Scenario,
        ctx: &ScenarioCtx,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.name().bright_white()
                    );
                }
                self.run_single(scenario, ctx, seed, iterations)
            })
            .collect()
    }

    fn run_single(
        &self,
        scenario: Scenario,
        ctx: &ScenarioCtx,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut elapsed = Vec::new();

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start = Instant::now();
            match scenario.run(&ctx.with_seed(iteration_seed)) {
                Ok(()) => successes += 1,
                Err(err) => {
                    log::debug!("{} failed on seed {iteration_seed}: {err:#}", scenario.key());
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): {err:#}",
                        i + 1
                    ));
                }
            }
            elapsed.push(start.elapsed());
        }

        let average_duration = if elapsed.is_empty() {
            Duration::ZERO
        } else {
            elapsed.iter().sum::<Duration>() / u32::try_from(elapsed.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name().to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
        }
    }
}

/// What a bot-driven adventure produced.
#[derive(Debug, Clone)]
pub struct AdventureRun {
    pub run: RunSummary,
    pub hits: u32,
    pub questions_seen: usize,
}

/// Play an adventure to completion, checking the question counter as it goes.
pub fn play_adventure<S: ProfileStorage>(
    session: &mut SessionEngine<S>,
    bot: &mut AnswerBot,
    presenter: &mut ConsolePresenter,
    double_submit: bool,
) -> Result<AdventureRun> {
    session.start_adventure("QA Bot");
    let mut hits = 0;
    let mut expected_number = 1;
    loop {
        ensure!(
            session.question_number() == expected_number,
            "question number {} but expected {expected_number}",
            session.question_number()
        );
        if let Some(view) = session.view() {
            presenter.show_question(&view);
        }
        let pick = bot.choose(session).context("no question on screen")?;
        let outcome = session.submit_answer(pick).context("answer was not accepted")?;
        presenter.show_answer(&outcome);
        if outcome.correct {
            hits += 1;
        }
        if double_submit {
            ensure!(
                session.submit_answer(pick).is_none(),
                "second submit for question {expected_number} was scored"
            );
        }
        session.dispatch(presenter);

        let step = session.advance();
        if double_submit {
            ensure!(
                session.advance().is_ignored(),
                "second advance moved the session"
            );
        }
        match step {
            Advance::NextQuestion => {}
            Advance::ChapterComplete { chapter } => {
                log::debug!(
                    "chapter {} done: {}/{}",
                    chapter.title,
                    chapter.correct,
                    chapter.attempted
                );
                ensure!(
                    session.continue_to_next_chapter(),
                    "could not leave chapter boundary"
                );
                if double_submit {
                    ensure!(
                        !session.continue_to_next_chapter(),
                        "continue accepted twice"
                    );
                }
            }
            Advance::AdventureComplete { run, .. } => {
                session.dispatch(presenter);
                return Ok(AdventureRun {
                    run,
                    hits,
                    questions_seen: expected_number,
                });
            }
            other => bail!("unexpected advance result {other:?}"),
        }
        expected_number += 1;
        session.dispatch(presenter);
    }
}

/// Play one daily challenge to completion.
pub fn play_daily<S: ProfileStorage>(
    session: &mut SessionEngine<S>,
    bot: &mut AnswerBot,
    presenter: &mut ConsolePresenter,
) -> Result<(DailySummary, u32)> {
    session.start_daily();
    let mut hits = 0;
    loop {
        if let Some(view) = session.view() {
            presenter.show_question(&view);
        }
        let pick = bot.choose(session).context("no daily question on screen")?;
        let outcome = session.submit_answer(pick).context("answer was not accepted")?;
        presenter.show_answer(&outcome);
        if outcome.correct {
            hits += 1;
        }
        let step = session.advance();
        session.dispatch(presenter);
        match step {
            Advance::NextQuestion => {}
            Advance::DailyComplete { daily } => return Ok((daily, hits)),
            other => bail!("unexpected advance result {other:?}"),
        }
    }
}

fn adventure_scenario(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session()?;
    let mut presenter = ConsolePresenter::new(ctx.verbose);
    let played = play_adventure(&mut session, &mut ctx.bot(), &mut presenter, false)?;
    let run = &played.run;

    let chapters = session.bank().chapter_count();
    let expected_total = chapters * session.config().questions_per_chapter;
    ensure!(
        run.total_questions as usize == expected_total,
        "total questions {} but expected {expected_total}",
        run.total_questions
    );
    ensure!(
        run.score == played.hits,
        "score {} but bot hit {}",
        run.score,
        played.hits
    );
    ensure!(
        run.coins == played.hits * adventure_correct_reward(),
        "coins {} do not match {} hits",
        run.coins,
        played.hits
    );
    ensure!(
        presenter.themes.len() == chapters,
        "{} theme changes for {chapters} chapters",
        presenter.themes.len()
    );
    ensure!(presenter.coin_hud == run.coins, "coin HUD out of sync");

    let record = session.profile().record();
    ensure!(record.best_score == run.score, "best score not recorded");
    ensure!(record.coin_balance == run.coins, "balance not credited");
    ensure!(
        record.total_questions_all_time == run.total_questions,
        "lifetime questions not credited"
    );
    ensure!(session.phase() == Phase::Finished, "session not finished");
    Ok(())
}

fn daily_scenario(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session()?;
    let mut presenter = ConsolePresenter::new(ctx.verbose);
    let (daily, hits) = play_daily(&mut session, &mut ctx.bot(), &mut presenter)?;

    let expected_total = session
        .config()
        .daily_question_count
        .min(session.bank().total_questions());
    ensure!(
        daily.total as usize == expected_total,
        "daily had {} questions",
        daily.total
    );
    ensure!(
        daily.correct == hits,
        "correct {} but bot hit {hits}",
        daily.correct
    );
    ensure!(daily.streak == 1, "first daily streak is {}", daily.streak);
    ensure!(daily.bonus == daily_bonus(1), "bonus {}", daily.bonus);
    ensure!(
        daily.coins == hits * adventure_correct_reward() + daily.bonus,
        "daily coins {} do not include the bonus",
        daily.coins
    );
    let iso = ctx.today.format("%Y-%m-%d").to_string();
    ensure!(
        session.profile().record().last_daily_date == iso,
        "last daily date not stamped"
    );
    Ok(())
}

fn streak_scenario(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session()?;
    let mut presenter = ConsolePresenter::new(ctx.verbose);
    let mut bot = ctx.bot();
    let mut clock = FixedClock(ctx.today);

    let (first, _) = play_daily(&mut session, &mut bot, &mut presenter)?;
    ensure!(
        first.streak_change == StreakChange::Restarted,
        "first daily did not start a streak"
    );

    clock.advance_days(1);
    session.set_clock(clock);
    let (second, _) = play_daily(&mut session, &mut bot, &mut presenter)?;
    ensure!(second.streak == 2, "next-day streak is {}", second.streak);
    ensure!(second.bonus == daily_bonus(2), "next-day bonus is {}", second.bonus);

    let (replay, _) = play_daily(&mut session, &mut bot, &mut presenter)?;
    ensure!(
        replay.streak_change == StreakChange::Unchanged && replay.streak == 2,
        "same-day replay moved the streak to {}",
        replay.streak
    );

    let balance = session.profile().record().coin_balance;
    let earned = first.coins + second.coins + replay.coins;
    ensure!(
        balance == earned,
        "balance {balance} but runs earned {earned}"
    );
    Ok(())
}

fn spam_scenario(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session()?;
    let mut presenter = ConsolePresenter::new(ctx.verbose);
    let played = play_adventure(&mut session, &mut ctx.bot(), &mut presenter, true)?;
    ensure!(
        played.run.score == played.hits,
        "score {} after spamming but only {} hits",
        played.run.score,
        played.hits
    );
    ensure!(
        presenter.correct_cues + presenter.wrong_cues == played.questions_seen,
        "{} cues for {} questions",
        presenter.correct_cues + presenter.wrong_cues,
        played.questions_seen
    );
    ensure!(session.last_rejection().is_some(), "no rejection was recorded");
    Ok(())
}

fn shop_scenario(ctx: &ScenarioCtx) -> Result<()> {
    let mut session = ctx.session()?;
    match session.unlock_skin("royal_gold") {
        UnlockOutcome::InsufficientFunds { needed: 100, balance: 0 } => {}
        other => bail!("broke profile unlock returned {other:?}"),
    }
    ensure!(
        session.activate_skin("royal_gold") == ActivateOutcome::NotOwned,
        "activated a skin that is not owned"
    );

    let mut presenter = ConsolePresenter::new(ctx.verbose);
    let mut perfect = AnswerBot::new(1.0, ctx.seed);
    let played = play_adventure(&mut session, &mut perfect, &mut presenter, false)?;
    let earned = played.run.coins;
    ensure!(session.unlock_skin("plaid") == UnlockOutcome::UnknownSkin, "unknown skin sold");

    let mut skins: Vec<_> = session
        .skins()
        .skins()
        .iter()
        .filter(|skin| skin.cost > 0)
        .map(|skin| (skin.id.clone(), skin.cost))
        .collect();
    skins.sort_by_key(|(_, cost)| *cost);

    let mut balance = earned;
    let mut last_bought = None;
    for (id, cost) in skins {
        let outcome = session.unlock_skin(&id);
        if balance >= cost {
            balance -= cost;
            ensure!(
                outcome == UnlockOutcome::Unlocked { balance },
                "unlocking {id} returned {outcome:?}"
            );
            ensure!(
                session.unlock_skin(&id) == UnlockOutcome::AlreadyOwned,
                "{id} sold twice"
            );
            last_bought = Some(id);
        } else {
            ensure!(
                matches!(outcome, UnlockOutcome::InsufficientFunds { .. }),
                "unaffordable {id} returned {outcome:?}"
            );
        }
    }
    session.dispatch(&mut presenter);
    ensure!(
        presenter.coin_hud == balance,
        "coin HUD shows {}",
        presenter.coin_hud
    );

    if let Some(id) = last_bought {
        ensure!(
            session.activate_skin(&id) == ActivateOutcome::Activated,
            "could not activate {id}"
        );
        ensure!(session.active_skin().id == id, "active skin did not change");
    }
    let record = session.profile().record();
    ensure!(
        record.coin_balance == balance,
        "balance {} expected {balance}",
        record.coin_balance
    );
    ensure!(
        record.total_coins_earned == earned,
        "spending lowered lifetime coins to {}",
        record.total_coins_earned
    );
    Ok(())
}
