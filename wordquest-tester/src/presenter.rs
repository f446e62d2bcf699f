use colored::Colorize;

use wordquest_game::{Achievement, AnswerOutcome, Cue, Presenter, QuestionView, Skin, ThemeToken};

/// Renders engine callbacks as console lines. Quiet mode only keeps tallies.
#[derive(Debug, Clone, Default)]
pub struct ConsolePresenter {
    verbose: bool,
    pub themes: Vec<ThemeToken>,
    pub achievements: Vec<Achievement>,
    pub correct_cues: usize,
    pub wrong_cues: usize,
    pub coin_hud: u32,
    skin_label: Option<String>,
}

impl ConsolePresenter {
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            themes: Vec::new(),
            achievements: Vec::new(),
            correct_cues: 0,
            wrong_cues: 0,
            coin_hud: 0,
            skin_label: None,
        }
    }

    /// Skin tint shown next to theme changes.
    pub fn with_skin(mut self, skin: &Skin) -> Self {
        self.skin_label = Some(skin.display_name.clone());
        self
    }

    pub fn show_question(&self, view: &QuestionView) {
        if !self.verbose {
            return;
        }
        if view.new_chapter || view.question_number == 1 {
            println!("{}", format!("📖 {}", view.chapter_title).bright_cyan().bold());
        }
        println!(
            "[{}/{}] {} {}",
            view.question_number,
            view.total_questions,
            view.prompt.bold(),
            format!("(score {} · coins {})", view.score, view.coins).dimmed()
        );
        for (slot, option) in view.options.iter().enumerate() {
            println!("   {}. {option}", slot + 1);
        }
    }

    pub fn show_answer(&self, outcome: &AnswerOutcome) {
        if self.verbose && !outcome.correct {
            println!("   answer was {}", outcome.correct_option.bright_white());
        }
    }
}

impl Presenter for ConsolePresenter {
    fn apply_theme(&mut self, theme: &ThemeToken) {
        self.themes.push(theme.clone());
        if self.verbose {
            let skin = self.skin_label.as_deref().unwrap_or("Default Neon");
            println!("🎨 Theme {} ({skin})", theme.as_str().bright_magenta());
        }
    }

    fn play_cue(&mut self, cue: Cue) {
        match cue {
            Cue::Correct => self.correct_cues += 1,
            Cue::Wrong => self.wrong_cues += 1,
        }
        if self.verbose {
            let label = match cue {
                Cue::Correct => "✅ ding".green(),
                Cue::Wrong => "❌ buzz".red(),
            };
            println!("   {label}");
        }
    }

    fn show_achievement(&mut self, achievement: Achievement) {
        self.achievements.push(achievement);
        if self.verbose {
            println!("🏆 {}", achievement.title().bright_yellow().bold());
        }
    }

    fn show_reward_popup(&mut self, amount: u32) {
        if self.verbose {
            println!("   {}", format!("+{amount} coins").yellow());
        }
    }

    fn update_coin_hud(&mut self, coins: u32) {
        self.coin_hud = coins;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordquest_game::EngineEvent;

    #[test]
    fn tallies_routed_events() {
        let mut presenter = ConsolePresenter::new(false);
        for event in [
            EngineEvent::ThemeApplied {
                theme: ThemeToken("music".into()),
            },
            EngineEvent::Cue { cue: Cue::Correct },
            EngineEvent::Achievement {
                achievement: Achievement::FirstFiveCorrect,
            },
            EngineEvent::CoinHud { coins: 125 },
            EngineEvent::Cue { cue: Cue::Wrong },
        ] {
            presenter.handle(&event);
        }
        assert_eq!(presenter.themes.len(), 1);
        assert_eq!(presenter.correct_cues, 1);
        assert_eq!(presenter.wrong_cues, 1);
        assert_eq!(presenter.achievements, vec![Achievement::FirstFiveCorrect]);
        assert_eq!(presenter.coin_hud, 125);
    }
}
