mod bot;
mod loader;
mod presenter;
mod reports;
mod scenarios;
mod util;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use wordquest_game::constants::PROFILE_FILE_NAME;
use wordquest_game::{
    ActivateOutcome, FixedClock, GameEngine, JsonFileStorage, SessionEngine, UnlockOutcome,
};

use bot::AnswerBot;
use loader::FsDataLoader;
use presenter::ConsolePresenter;
use scenarios::{
    ScenarioCtx, ScenarioResult, ScenarioRunner, expand_scenarios, list_scenarios, play_adventure,
    play_daily,
};
use util::{parse_seeds, parse_today, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Run QA scenarios against throwaway in-memory profiles
    Scenarios,
    /// Bot plays one adventure against the profile file
    Adventure,
    /// Bot plays one daily challenge against the profile file
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "wordquest-tester", version = "0.1.0")]
#[command(about = "Headless driver and QA scenarios for the WordQuest trivia engine")]
struct Args {
    /// What to run: QA scenarios, or a single adventure / daily played by the bot
    #[arg(long, value_enum, default_value_t = RunMode::Scenarios)]
    mode: RunMode,

    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Probability that the answer bot picks the right option
    #[arg(long, default_value_t = 0.75)]
    accuracy: f64,

    /// Question catalog to load instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Profile file used by play modes and shop commands
    #[arg(long, default_value = PROFILE_FILE_NAME)]
    profile: PathBuf,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the stored profile and exit
    #[arg(long)]
    show_profile: bool,

    /// Buy a skin with the stored coin balance and exit
    #[arg(long)]
    unlock_skin: Option<String>,

    /// Equip an owned skin and exit
    #[arg(long)]
    activate_skin: Option<String>,

    /// Pin the calendar date (YYYY-MM-DD) used for daily streaks
    #[arg(long)]
    today: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }
    if run_profile_commands(&args)? {
        return Ok(());
    }

    announce_banner();
    let today = resolve_today(&args)?;

    match args.mode {
        RunMode::Scenarios => {
            let start_time = Instant::now();
            let results = run_scenarios(&args, today)?;
            write_reports(&args, &results, start_time)?;
            if results.iter().any(|r| !r.passed) {
                std::process::exit(1);
            }
        }
        RunMode::Adventure | RunMode::Daily => play_once(&args, today)?,
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:12} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎮 WordQuest Automated Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn resolve_today(args: &Args) -> Result<NaiveDate> {
    args.today
        .as_deref()
        .map_or_else(|| Ok(Local::now().date_naive()), parse_today)
}

fn file_session(args: &Args, seed: u64) -> Result<SessionEngine<JsonFileStorage>> {
    let engine = GameEngine::new(
        FsDataLoader::new(args.catalog.clone()),
        JsonFileStorage::new(&args.profile),
    );
    let session = engine
        .create_session(seed)
        .context("failed to load question catalog")?;
    if let Some(warning) = session.profile().last_warning() {
        eprintln!("⚠️  {}", warning.to_string().yellow());
    }
    Ok(session)
}

fn run_profile_commands(args: &Args) -> Result<bool> {
    if !args.show_profile && args.unlock_skin.is_none() && args.activate_skin.is_none() {
        return Ok(false);
    }
    let mut session = file_session(args, 0)?;
    let mut output_target = OutputTarget::new(args.output.clone())?;

    if let Some(id) = args.unlock_skin.as_deref() {
        let line = match session.unlock_skin(id) {
            UnlockOutcome::Unlocked { balance } => {
                format!("🛍️  Unlocked {id}; balance now {balance}")
            }
            UnlockOutcome::AlreadyOwned => format!("You already own {id}"),
            UnlockOutcome::UnknownSkin => format!("No skin called {id}"),
            UnlockOutcome::InsufficientFunds { needed, balance } => {
                format!("{id} costs {needed} coins but you have {balance}")
            }
        };
        writeln!(output_target.writer(), "{line}")?;
    }

    if let Some(id) = args.activate_skin.as_deref() {
        let line = match session.activate_skin(id) {
            ActivateOutcome::Activated => format!("🎨 Active skin is now {id}"),
            ActivateOutcome::NotOwned => format!("Unlock {id} before activating it"),
        };
        writeln!(output_target.writer(), "{line}")?;
    }

    if args.show_profile {
        let summary = session.profile_summary();
        match args.report {
            ReportFormat::Json => {
                let json = serde_json::json!({
                    "profile": summary,
                    "skins": session.skin_listing(),
                });
                writeln!(output_target.writer(), "{}", serde_json::to_string_pretty(&json)?)?;
            }
            ReportFormat::Console => {
                let out = output_target.writer();
                writeln!(out, "{}", "👤 Profile".bright_cyan().bold())?;
                writeln!(out, "Best score: {}", summary.best_score)?;
                writeln!(out, "Best accuracy: {:.1}%", summary.best_accuracy)?;
                writeln!(
                    out,
                    "Lifetime: {}/{} correct ({:.1}%)",
                    summary.total_correct, summary.total_questions, summary.average_accuracy
                )?;
                writeln!(
                    out,
                    "Coins: {} balance, {} earned",
                    summary.coin_balance, summary.total_coins_earned
                )?;
                writeln!(out, "Daily streak: {}", summary.daily_streak)?;
                writeln!(out, "Skin: {}", summary.active_skin_name)?;
                for row in session.skin_listing() {
                    let status = if row.active {
                        "active".green()
                    } else if row.owned {
                        "owned".normal()
                    } else {
                        format!("{} coins", row.cost).yellow()
                    };
                    writeln!(out, "  {:16} {status}", row.display_name)?;
                }
            }
        }
    }

    output_target.flush_inner()?;
    Ok(true)
}

fn play_once(args: &Args, today: NaiveDate) -> Result<()> {
    let seed = parse_seeds(&args.seeds)?.first().copied().unwrap_or(1337);
    let mut session = file_session(args, seed)?.with_clock(FixedClock(today));
    let mut presenter = ConsolePresenter::new(true).with_skin(session.active_skin());
    let mut bot = AnswerBot::new(args.accuracy, seed);
    if args.verbose {
        println!("🤖 Answer bot accuracy: {:.0}%", bot.accuracy() * 100.0);
    }

    if args.mode == RunMode::Daily {
        let (daily, _) = play_daily(&mut session, &mut bot, &mut presenter)?;
        println!("{}", "📅 Daily Challenge Complete".bright_green().bold());
        println!(
            "Correct: {}/{} ({:.0}%)",
            daily.correct, daily.total, daily.accuracy
        );
        println!("Streak: {} day(s) · bonus +{}", daily.streak, daily.bonus);
        println!(
            "Coins this run: {} · balance {}",
            daily.coins, daily.coin_balance
        );
    } else {
        let played = play_adventure(&mut session, &mut bot, &mut presenter, false)?;
        let run = played.run;
        println!("{}", "🏁 Adventure Complete".bright_green().bold());
        println!(
            "{}: {}/{} correct ({:.1}%)",
            run.player_name, run.score, run.total_questions, run.accuracy
        );
        println!("Coins: {} · XP: {}", run.coins, run.xp);
        println!(
            "Best: {} ({:.1}%) · balance {}",
            run.best_score, run.best_accuracy, run.coin_balance
        );
    }
    if let Some(warning) = session.profile().last_warning() {
        eprintln!("⚠️  {}", warning.to_string().yellow());
    }
    Ok(())
}

fn run_scenarios(args: &Args, today: NaiveDate) -> Result<Vec<ScenarioResult>> {
    let scenarios = expand_scenarios(&split_csv(&args.scenarios));
    let seeds = parse_seeds(&args.seeds)?;
    let ctx = ScenarioCtx {
        loader: FsDataLoader::new(args.catalog.clone()),
        seed: 0,
        accuracy: args.accuracy,
        today,
        verbose: args.verbose,
    };

    println!("{}", "🧠 Running Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    if args.verbose {
        let source = ctx
            .loader
            .catalog_path()
            .map_or_else(|| "built-in".to_string(), |path| path.display().to_string());
        println!("📚 Catalog: {source}");
    }

    let runner = ScenarioRunner::new(args.verbose);
    let mut results = Vec::new();
    for scenario in scenarios {
        results.extend(runner.run_scenario(scenario, &ctx, &seeds, args.iterations));
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            reports::generate_json_report(&mut output_target, results)?;
        }
        ReportFormat::Console => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
