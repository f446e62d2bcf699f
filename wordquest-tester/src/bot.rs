use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use wordquest_game::{ProfileStorage, SessionEngine};

/// Picks on-screen options, answering correctly with a fixed probability.
#[derive(Debug, Clone)]
pub struct AnswerBot {
    accuracy: f64,
    rng: ChaCha20Rng,
}

impl AnswerBot {
    pub fn new(accuracy: f64, seed: u64) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0xB07B_07B0),
        }
    }

    pub const fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Display index to tap for the question on screen, if any.
    pub fn choose<S: ProfileStorage>(&mut self, session: &SessionEngine<S>) -> Option<usize> {
        let question = session.current_question()?;
        let right = session.display_map()?.display_index_of(question.correct_index)?;
        if self.rng.gen_bool(self.accuracy) {
            Some(right)
        } else {
            Some((right + self.rng.gen_range(1..4)) % 4)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordquest_game::{MemoryStorage, ProfileStore, QuestionBank};

    fn session() -> SessionEngine<MemoryStorage> {
        let bank = QuestionBank::embedded().unwrap();
        let mut session = SessionEngine::new(bank, ProfileStore::load(MemoryStorage::default()), 5);
        session.start_adventure("Bot");
        session
    }

    #[test]
    fn perfect_bot_always_hits() {
        let mut session = session();
        let mut bot = AnswerBot::new(1.0, 5);
        let pick = bot.choose(&session).unwrap();
        assert!(session.submit_answer(pick).unwrap().correct);
    }

    #[test]
    fn hopeless_bot_always_misses() {
        let mut session = session();
        let mut bot = AnswerBot::new(0.0, 5);
        let pick = bot.choose(&session).unwrap();
        assert!(!session.submit_answer(pick).unwrap().correct);
    }

    #[test]
    fn accuracy_is_clamped() {
        assert!((AnswerBot::new(3.0, 1).accuracy() - 1.0).abs() < f64::EPSILON);
    }
}
