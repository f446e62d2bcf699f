use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::bank::{QuestionRef, ThemeToken};
use crate::session::Achievement;
use crate::session::display::DisplayMap;

/// Which flavor of run is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Adventure,
    Daily,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// A question is on screen and accepts one answer.
    Playing,
    /// The answer was scored; the adapter calls `advance` after its settle delay.
    AwaitingAdvance,
    /// Between adventure chapters.
    ChapterBoundary,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::AwaitingAdvance => "awaiting advance",
            Self::ChapterBoundary => "chapter boundary",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Everything scoped to a single run. Replaced wholesale on start and reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Mode,
    pub player_name: String,
    pub chapter_index: usize,
    pub question_index: usize,
    pub daily_questions: Vec<QuestionRef>,
    pub daily_index: usize,
    /// Per-chapter sample for an adventure, shuffled at start.
    pub chapter_question_sets: Vec<Vec<QuestionRef>>,
    pub score: u32,
    pub coins: u32,
    pub xp: u32,
    pub chapter_scores: Vec<u32>,
    pub is_locked: bool,
    /// Valid only for the question currently on screen.
    pub option_display_map: Option<DisplayMap>,
    /// Chapter whose theme the adapter currently shows.
    pub active_theme_chapter: Option<usize>,
}

impl SessionState {
    pub(crate) fn new(mode: Mode, player_name: String, chapters: usize) -> Self {
        Self {
            mode,
            player_name,
            chapter_scores: vec![0; chapters],
            ..Self::default()
        }
    }
}

/// What the adapter renders while a question is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub mode: Mode,
    pub player_name: String,
    pub chapter_title: String,
    pub theme: ThemeToken,
    pub prompt: String,
    /// Option texts in on-screen order.
    pub options: Vec<String>,
    pub question_number: usize,
    pub total_questions: usize,
    pub score: u32,
    pub coins: u32,
    pub xp: u32,
    /// First question of a chapter other than the very first of the run.
    pub new_chapter: bool,
    pub locked: bool,
}

/// Result of scoring one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub display_index: usize,
    pub chosen_option: usize,
    pub correct_index: usize,
    /// Text of the right answer, for feedback on a miss.
    pub correct_option: String,
    pub coins_awarded: u32,
    pub xp_awarded: u32,
    pub achievements: SmallVec<[Achievement; 4]>,
}

/// Chapter-end screen data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub chapter_index: usize,
    pub title: String,
    pub correct: u32,
    pub attempted: u32,
    pub accuracy: f64,
    pub coins: u32,
    pub question_number: usize,
    pub total_questions: usize,
}

/// Adventure end screen data, including the updated profile highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub player_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub accuracy: f64,
    pub coins: u32,
    pub xp: u32,
    pub best_score: u32,
    pub best_accuracy: f64,
    pub total_coins_earned: u32,
    pub coin_balance: u32,
}

/// Return value of [`crate::SessionEngine::advance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advance {
    /// Called outside `AwaitingAdvance`; nothing changed.
    Ignored,
    NextQuestion,
    ChapterComplete { chapter: ChapterSummary },
    AdventureComplete {
        chapter: ChapterSummary,
        run: RunSummary,
    },
    DailyComplete {
        daily: crate::session::DailySummary,
    },
}

impl Advance {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::AdventureComplete { .. } | Self::DailyComplete { .. }
        )
    }
}
