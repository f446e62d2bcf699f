//! Question catalog loading and validation.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::OPTION_COUNT;

/// Difficulty bucket of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    /// Any bucket name the reward table does not know.
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Opaque theme identifier resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeToken(pub String);

impl ThemeToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
    /// `None` when a flat catalog entry carried no difficulty at all.
    pub difficulty: Option<Difficulty>,
    /// Per-question XP hint from the catalog.
    pub xp: Option<u32>,
}

impl Question {
    /// Text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

/// A themed group of questions. Questions are stored bucket by bucket
/// (easy, medium, hard, unknown) in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub theme: ThemeToken,
    pub questions: Vec<Question>,
}

impl Chapter {
    /// Questions in a single difficulty bucket.
    pub fn bucket(&self, difficulty: Difficulty) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.difficulty.unwrap_or_default() == difficulty)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Stable pointer to a question inside the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRef {
    pub chapter: usize,
    pub slot: usize,
}

/// Errors that make a catalog unusable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("question catalog unavailable: {0}")]
    Missing(String),
    #[error("question catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question catalog has no chapters")]
    NoChapters,
    #[error("chapter {chapter} (\"{title}\") has no questions")]
    EmptyChapter { chapter: usize, title: String },
    #[error("chapter {chapter}, {bucket} question {index}: missing prompt")]
    MissingPrompt {
        chapter: usize,
        bucket: String,
        index: usize,
    },
    #[error("chapter {chapter}, {bucket} question {index}: expected 4 options, found {found}")]
    OptionCount {
        chapter: usize,
        bucket: String,
        index: usize,
        found: usize,
    },
    #[error("chapter {chapter}, {bucket} question {index}: answer must be an integer")]
    AnswerNotInteger {
        chapter: usize,
        bucket: String,
        index: usize,
    },
    #[error("chapter {chapter}, {bucket} question {index}: answer {answer} out of range 0..=3")]
    AnswerOutOfRange {
        chapter: usize,
        bucket: String,
        index: usize,
        answer: i64,
    },
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    title: String,
    #[serde(default)]
    theme: Option<String>,
    questions: RawQuestions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuestions {
    ByDifficulty(BTreeMap<String, Vec<RawQuestion>>),
    Flat(Vec<RawQuestion>),
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "correct_index", alias = "correctIndex")]
    answer: Option<Value>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    xp: Option<u32>,
}

fn parse_difficulty(name: &str) -> Difficulty {
    name.parse().unwrap_or(Difficulty::Unknown)
}

impl RawQuestion {
    fn validate(
        self,
        chapter: usize,
        bucket: &str,
        index: usize,
        bucket_difficulty: Option<Difficulty>,
    ) -> Result<Question, LoadError> {
        let at = || (chapter, bucket.to_string(), index);

        let Some(prompt) = self.prompt else {
            let (chapter, bucket, index) = at();
            return Err(LoadError::MissingPrompt {
                chapter,
                bucket,
                index,
            });
        };

        let found = self.options.len();
        let options: [String; OPTION_COUNT] = self.options.try_into().map_err(|_| {
            let (chapter, bucket, index) = at();
            LoadError::OptionCount {
                chapter,
                bucket,
                index,
                found,
            }
        })?;

        let answer = self.answer.as_ref().and_then(Value::as_i64).ok_or_else(|| {
            let (chapter, bucket, index) = at();
            LoadError::AnswerNotInteger {
                chapter,
                bucket,
                index,
            }
        })?;
        let correct_index = usize::try_from(answer)
            .ok()
            .filter(|idx| *idx < OPTION_COUNT)
            .ok_or_else(|| {
                let (chapter, bucket, index) = at();
                LoadError::AnswerOutOfRange {
                    chapter,
                    bucket,
                    index,
                    answer,
                }
            })?;

        let difficulty =
            bucket_difficulty.or_else(|| self.difficulty.as_deref().map(parse_difficulty));

        Ok(Question {
            prompt,
            options,
            correct_index,
            difficulty,
            xp: self.xp,
        })
    }
}

impl RawChapter {
    fn validate(self, chapter: usize) -> Result<Chapter, LoadError> {
        let mut questions = Vec::new();
        match self.questions {
            RawQuestions::ByDifficulty(buckets) => {
                let mut ordered: Vec<(Difficulty, String, Vec<RawQuestion>)> = buckets
                    .into_iter()
                    .map(|(name, list)| (parse_difficulty(&name), name, list))
                    .collect();
                ordered.sort_by_key(|(difficulty, _, _)| *difficulty);
                for (difficulty, name, list) in ordered {
                    for (index, raw) in list.into_iter().enumerate() {
                        questions.push(raw.validate(chapter, &name, index, Some(difficulty))?);
                    }
                }
            }
            RawQuestions::Flat(list) => {
                let mut validated = list
                    .into_iter()
                    .enumerate()
                    .map(|(index, raw)| raw.validate(chapter, "flat", index, None))
                    .collect::<Result<Vec<_>, _>>()?;
                validated.sort_by_key(|q| q.difficulty.unwrap_or_default());
                questions = validated;
            }
        }

        if questions.is_empty() {
            return Err(LoadError::EmptyChapter {
                chapter,
                title: self.title,
            });
        }

        let theme = self
            .theme
            .map_or_else(|| ThemeToken(format!("chapter-{}", chapter + 1)), ThemeToken);

        Ok(Chapter {
            title: self.title,
            theme,
            questions,
        })
    }
}

/// Immutable, ordered catalog of chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    chapters: Vec<Chapter>,
}

impl QuestionBank {
    /// Parse and validate a catalog document. Any malformed entry rejects the whole load.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing the first invalid entry.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        if raw.chapters.is_empty() {
            return Err(LoadError::NoChapters);
        }
        let chapters = raw
            .chapters
            .into_iter()
            .enumerate()
            .map(|(idx, chapter)| chapter.validate(idx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { chapters })
    }

    /// Build a bank from already-validated chapters.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NoChapters`] or [`LoadError::EmptyChapter`] when the
    /// chapter list cannot drive a run.
    pub fn from_chapters(chapters: Vec<Chapter>) -> Result<Self, LoadError> {
        if chapters.is_empty() {
            return Err(LoadError::NoChapters);
        }
        if let Some((chapter, empty)) = chapters.iter().enumerate().find(|(_, c)| c.is_empty()) {
            return Err(LoadError::EmptyChapter {
                chapter,
                title: empty.title.clone(),
            });
        }
        Ok(Self { chapters })
    }

    /// The catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails validation.
    pub fn embedded() -> Result<Self, LoadError> {
        Self::from_json(include_str!("../assets/questions.json"))
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    pub fn question(&self, qref: QuestionRef) -> Option<&Question> {
        self.chapters.get(qref.chapter)?.questions.get(qref.slot)
    }

    /// Every question in the bank, chapter by chapter.
    #[must_use]
    pub fn all_refs(&self) -> Vec<QuestionRef> {
        self.chapters
            .iter()
            .enumerate()
            .flat_map(|(chapter, ch)| (0..ch.len()).map(move |slot| QuestionRef { chapter, slot }))
            .collect()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.chapters.iter().map(Chapter::len).sum()
    }
}
