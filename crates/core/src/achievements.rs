use crate::model::{Category, ScoreEntry};

/// Entries needed for "Quiz Master".
pub const QUIZ_MASTER_COUNT: usize = 10;
/// "Speed Demon" needs a quiz finished in under this many seconds.
pub const SPEED_DEMON_SECS: u64 = 120;
pub const CATEGORY_EXPERT_SCORE: u8 = 90;
pub const CONSISTENCY_RUN: usize = 5;
pub const CONSISTENCY_SCORE: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    FirstQuiz,
    PerfectScore,
    QuizMaster,
    SpeedDemon,
    CategoryExpert,
    Consistency,
}

impl AchievementId {
    pub const ALL: [AchievementId; 6] = [
        AchievementId::FirstQuiz,
        AchievementId::PerfectScore,
        AchievementId::QuizMaster,
        AchievementId::SpeedDemon,
        AchievementId::CategoryExpert,
        AchievementId::Consistency,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "first_quiz",
            AchievementId::PerfectScore => "perfect_score",
            AchievementId::QuizMaster => "quiz_master",
            AchievementId::SpeedDemon => "speed_demon",
            AchievementId::CategoryExpert => "category_expert",
            AchievementId::Consistency => "consistency",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "First Steps",
            AchievementId::PerfectScore => "Perfect Score",
            AchievementId::QuizMaster => "Quiz Master",
            AchievementId::SpeedDemon => "Speed Demon",
            AchievementId::CategoryExpert => "Category Expert",
            AchievementId::Consistency => "Consistency",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            AchievementId::FirstQuiz => "Complete your first quiz",
            AchievementId::PerfectScore => "Get 100% on any quiz",
            AchievementId::QuizMaster => "Complete 10 quizzes",
            AchievementId::SpeedDemon => "Complete a quiz in under 2 minutes",
            AchievementId::CategoryExpert => "Score 90% or higher in all categories",
            AchievementId::Consistency => "Score 80% or higher in 5 quizzes in a row",
        }
    }

    /// Evaluate this achievement against the full score history.
    #[must_use]
    pub fn is_unlocked(self, history: &[ScoreEntry]) -> bool {
        match self {
            AchievementId::FirstQuiz => !history.is_empty(),
            AchievementId::PerfectScore => history.iter().any(|e| e.score_percent() == 100),
            AchievementId::QuizMaster => history.len() >= QUIZ_MASTER_COUNT,
            AchievementId::SpeedDemon => history
                .iter()
                .any(|e| e.time_taken_secs() < SPEED_DEMON_SECS),
            AchievementId::CategoryExpert => Category::ALL.iter().all(|c| {
                history
                    .iter()
                    .any(|e| e.category() == *c && e.score_percent() >= CATEGORY_EXPERT_SCORE)
            }),
            AchievementId::Consistency => {
                if history.len() < CONSISTENCY_RUN {
                    return false;
                }
                let mut recent: Vec<&ScoreEntry> = history.iter().collect();
                recent.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
                recent
                    .iter()
                    .take(CONSISTENCY_RUN)
                    .all(|e| e.score_percent() >= CONSISTENCY_SCORE)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementStatus {
    pub id: AchievementId,
    pub unlocked: bool,
}

/// Every achievement with its current unlock state, in display order.
#[must_use]
pub fn evaluate(history: &[ScoreEntry]) -> Vec<AchievementStatus> {
    AchievementId::ALL
        .into_iter()
        .map(|id| AchievementStatus {
            id,
            unlocked: id.is_unlocked(history),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DifficultyFilter;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn entry(score: u8, category: Category, secs: u64, minutes_ago: i64) -> ScoreEntry {
        ScoreEntry::from_persisted(
            "Ada",
            category,
            score,
            1,
            1,
            secs,
            DifficultyFilter::Medium,
            fixed_now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    fn unlocked(history: &[ScoreEntry]) -> Vec<AchievementId> {
        evaluate(history)
            .into_iter()
            .filter(|s| s.unlocked)
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn display_names() {
        let names: Vec<&str> = AchievementId::ALL.iter().map(|id| id.name()).collect();
        assert_eq!(
            names,
            [
                "First Steps",
                "Perfect Score",
                "Quiz Master",
                "Speed Demon",
                "Category Expert",
                "Consistency"
            ]
        );
    }

    #[test]
    fn empty_history_unlocks_nothing() {
        assert!(unlocked(&[]).is_empty());
    }

    #[test]
    fn single_fast_perfect_quiz() {
        let history = vec![entry(100, Category::Math, 90, 0)];
        assert_eq!(
            unlocked(&history),
            vec![
                AchievementId::FirstQuiz,
                AchievementId::PerfectScore,
                AchievementId::SpeedDemon
            ]
        );
    }

    #[test]
    fn speed_demon_is_strictly_under_two_minutes() {
        let history = vec![entry(50, Category::Math, SPEED_DEMON_SECS, 0)];
        assert!(!AchievementId::SpeedDemon.is_unlocked(&history));
    }

    #[test]
    fn category_expert_needs_every_category() {
        let mut history: Vec<ScoreEntry> = Category::ALL[..4]
            .iter()
            .map(|c| entry(95, *c, 300, 0))
            .collect();
        assert!(!AchievementId::CategoryExpert.is_unlocked(&history));
        history.push(entry(89, Category::ALL[4], 300, 0));
        assert!(!AchievementId::CategoryExpert.is_unlocked(&history));
        history.push(entry(90, Category::ALL[4], 300, 0));
        assert!(AchievementId::CategoryExpert.is_unlocked(&history));
    }

    #[test]
    fn consistency_uses_most_recent_five() {
        // stored by score, so the recent low score sits at the end
        let mut history: Vec<ScoreEntry> = (1..=5).map(|m| entry(90, Category::General, 300, m)).collect();
        assert!(AchievementId::Consistency.is_unlocked(&history));

        history.push(entry(40, Category::General, 300, 0));
        assert!(!AchievementId::Consistency.is_unlocked(&history));

        let mut old_low = (1..=5)
            .map(|m| entry(85, Category::General, 300, m))
            .collect::<Vec<_>>();
        old_low.push(entry(10, Category::General, 300, 60));
        assert!(AchievementId::Consistency.is_unlocked(&old_low));
    }

    #[test]
    fn quiz_master_at_ten() {
        let history: Vec<ScoreEntry> = (0..9).map(|m| entry(10, Category::History, 300, m)).collect();
        assert!(!AchievementId::QuizMaster.is_unlocked(&history));
        let mut history = history;
        history.push(entry(10, Category::History, 300, 10));
        assert!(AchievementId::QuizMaster.is_unlocked(&history));
    }
}
