//! Rank math and the statistics shown on the dashboard and stats page

use crate::achievements::{find_achievement, Achievement, ACHIEVEMENTS};
use crate::engine::Game;
use crate::types::{Attribute, DayStats, Rank, TaskKind};
use crate::utils::day_key;
use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankProgress {
    pub rank: Rank,
    /// `None` once SSS is reached
    pub next: Option<Rank>,
    /// Fraction of the way to `next`, clamped to 0..=1
    pub progress: f32,
}

pub fn calculate_rank(value: f64) -> RankProgress {
    let rank = Rank::ALL
        .iter()
        .rev()
        .copied()
        .find(|r| value >= r.threshold())
        .unwrap_or(Rank::E);
    let next = rank.next();
    let progress = match next {
        Some(next) => {
            let span = next.threshold() - rank.threshold();
            ((value - rank.threshold()) / span).clamp(0.0, 1.0) as f32
        }
        None => 1.0,
    };
    RankProgress {
        rank,
        next,
        progress,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub daily_completed: usize,
    pub weekly_completed: usize,
    pub streak: u32,
    pub max_streak: u32,
    pub lifetime_completed: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStats {
    pub highest: Attribute,
    pub highest_value: f64,
    pub total: f64,
    pub average: f64,
    pub ranks: Vec<(Attribute, RankProgress)>,
}

#[derive(Debug, Clone)]
pub struct AchievementStats {
    pub total_completed: usize,
    pub recent: Vec<&'static Achievement>,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerStats {
    pub current_job: Option<String>,
    pub jobs_held: usize,
    pub average_job_days: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenaltyStats {
    pub total: usize,
    pub average_level: f64,
    pub completion_percent: f64,
    /// Completed penalties counted back from the most recent
    pub completed_streak: usize,
}

/// Completions per weekday (Monday first) and hour of day
pub type Heatmap = [[u32; 24]; 7];

pub fn activity_heatmap(times: impl IntoIterator<Item = NaiveDateTime>) -> Heatmap {
    let mut map = [[0u32; 24]; 7];
    for t in times {
        map[t.weekday().num_days_from_monday() as usize][t.hour() as usize] += 1;
    }
    map
}

impl Game {
    pub fn task_stats(&self) -> TaskStats {
        let tasks = &self.state.tasks;
        let user = &self.state.user_data;
        let total = tasks.total();
        let completed = tasks.total_completed();
        TaskStats {
            total,
            completed,
            daily_completed: tasks.completed_count(TaskKind::Daily),
            weekly_completed: tasks.completed_count(TaskKind::Weekly),
            streak: user.streak,
            max_streak: user.stats.max_streak,
            lifetime_completed: user.stats.tasks_completed,
            completion_rate: if total > 0 {
                completed as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    pub fn attribute_stats(&self) -> AttributeStats {
        let attributes = &self.state.user_data.attributes;
        let (highest, highest_value) = attributes.highest();
        AttributeStats {
            highest,
            highest_value,
            total: attributes.total(),
            average: attributes.average(),
            ranks: attributes
                .iter()
                .map(|(attr, value)| (attr, calculate_rank(value)))
                .collect(),
        }
    }

    pub fn achievement_stats(&self) -> AchievementStats {
        let completed = &self.state.user_data.completed_achievements;
        let recent = completed
            .iter()
            .rev()
            .take(3)
            .filter_map(|id| find_achievement(id))
            .collect();
        AchievementStats {
            total_completed: completed.len(),
            recent,
            completion_rate: completed.len() as f64 / ACHIEVEMENTS.len() as f64,
        }
    }

    /// Average tenure runs until the next job was accepted, or until `now`
    /// for the current one.
    pub fn career_stats(&self, now: NaiveDateTime) -> CareerStats {
        let history = &self.state.user_data.job_history;
        let average_job_days = if history.is_empty() {
            0.0
        } else {
            let total: i64 = history
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let end = history.get(i + 1).map_or(now, |next| next.accepted_at);
                    (end - record.accepted_at).num_days()
                })
                .sum();
            total as f64 / history.len() as f64
        };
        CareerStats {
            current_job: self.state.user_data.current_job.clone(),
            jobs_held: history.len(),
            average_job_days,
        }
    }

    pub fn penalty_stats(&self) -> PenaltyStats {
        let history = &self.state.penalty_history;
        if history.is_empty() {
            return PenaltyStats::default();
        }
        let total = history.len();
        let completed = history.iter().filter(|p| p.completed).count();
        PenaltyStats {
            total,
            average_level: history.iter().map(|p| p.level as f64).sum::<f64>() / total as f64,
            completion_percent: completed as f64 / total as f64 * 100.0,
            completed_streak: history.iter().rev().take_while(|p| p.completed).count(),
        }
    }

    /// Completion times known to the save document itself
    pub fn completion_times(&self) -> Vec<NaiveDateTime> {
        self.state
            .tasks
            .all()
            .filter_map(|t| t.completed_at)
            .collect()
    }

    /// Per-day totals for the last `days` days, oldest first
    pub fn daily_history(&self, now: NaiveDateTime, days: i64) -> Vec<(String, DayStats)> {
        (0..days)
            .rev()
            .map(|back| {
                let key = day_key((now - Duration::days(back)).date());
                let stats = self
                    .state
                    .user_data
                    .daily_stats
                    .get(&key)
                    .cloned()
                    .unwrap_or_default();
                (key, stats)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};
    use crate::types::{JobRecord, PenaltyRecord, PenaltyTarget};

    #[test]
    fn test_calculate_rank_boundaries() {
        let start = calculate_rank(0.0);
        assert_eq!(start.rank, Rank::E);
        assert_eq!(start.next, Some(Rank::D));
        assert_eq!(start.progress, 0.0);

        let mid = calculate_rank(127.5);
        assert_eq!(mid.rank, Rank::D);
        assert_eq!(mid.progress, 0.5);

        assert_eq!(calculate_rank(170.0).rank, Rank::C);

        let top = calculate_rank(10_000.0);
        assert_eq!(top.rank, Rank::SSS);
        assert_eq!(top.next, None);
        assert_eq!(top.progress, 1.0);
    }

    #[test]
    fn test_rank_progress_always_in_unit_range() {
        let mut value = 0.0;
        while value < 800.0 {
            let p = calculate_rank(value).progress;
            assert!((0.0..=1.0).contains(&p), "{value} -> {p}");
            value += 7.3;
        }
    }

    #[test]
    fn test_heatmap_buckets_by_weekday_and_hour() {
        // 2024-05-10 is a Friday
        let map = activity_heatmap([at(2024, 5, 10, 9), at(2024, 5, 10, 9), at(2024, 5, 13, 23)]);
        assert_eq!(map[4][9], 2);
        assert_eq!(map[0][23], 1);
        assert_eq!(map.iter().flatten().sum::<u32>(), 3);
    }

    #[test]
    fn test_task_and_attribute_stats() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let run = game
            .create_task("Run", "", TaskKind::Daily, Attribute::Physical, 1, now)
            .unwrap();
        game.create_task("Read", "", TaskKind::Weekly, Attribute::Intelligence, 3, now)
            .unwrap();
        game.complete_task(TaskKind::Daily, &run, now).unwrap();

        let stats = game.task_stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.daily_completed, 1);
        assert_eq!(stats.completion_rate, 0.5);
        assert_eq!(stats.streak, 1);

        let attrs = game.attribute_stats();
        assert_eq!(attrs.highest, Attribute::Physical);
        assert_eq!(attrs.ranks.len(), Attribute::ALL.len());
        assert_eq!(game.completion_times(), vec![now]);
    }

    #[test]
    fn test_career_stats_average_days() {
        let now = at(2024, 5, 20, 9);
        let mut game = new_game(now);
        game.state.user_data.job_history = vec![
            JobRecord {
                job: "Stray Dog".into(),
                accepted_at: at(2024, 5, 1, 9),
            },
            JobRecord {
                job: "Pugilist".into(),
                accepted_at: at(2024, 5, 11, 9),
            },
        ];
        let career = game.career_stats(now);
        assert_eq!(career.jobs_held, 2);
        assert_eq!(career.average_job_days, 9.5);
    }

    #[test]
    fn test_penalty_stats_trailing_streak() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        assert_eq!(game.penalty_stats(), PenaltyStats::default());
        for (level, completed) in [(1, false), (2, true), (3, true)] {
            game.state.penalty_history.push(PenaltyRecord {
                level,
                points: 1.0,
                target: PenaltyTarget::All,
                inactive_days: 2,
                incomplete_tasks: 1,
                applied_at: now,
                recover_by: now,
                completed,
            });
        }
        let stats = game.penalty_stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average_level, 2.0);
        assert_eq!(stats.completed_streak, 2);
    }

    #[test]
    fn test_daily_history_fills_gaps() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let run = game
            .create_task("Run", "", TaskKind::Daily, Attribute::Physical, 1, now)
            .unwrap();
        game.complete_task(TaskKind::Daily, &run, now).unwrap();
        let history = game.daily_history(now, 7);
        assert_eq!(history.len(), 7);
        assert_eq!(history[6].0, "2024-05-10");
        assert_eq!(history[6].1.completions, 1);
        assert_eq!(history[0].1.completions, 0);
    }
}
