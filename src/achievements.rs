//! One-shot achievements and multi-stage achievement chains

use crate::engine::Game;
use crate::types::Attribute::{Creativity, Health, Intelligence, Physical, Spiritual};
use crate::types::{Attribute, Notice, Rarity, TaskKind};
use crate::utils::format_points;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What must hold for an achievement or a chain stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Requirement {
    /// Lifetime completed tasks
    TasksCompleted(u64),
    Streak(u32),
    /// Every listed attribute at or above its value
    Attributes(&'static [(Attribute, f64)]),
    /// Streak plus a daily+weekly completion rate
    StreakAndCompletion { streak: u32, rate: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    AllAttributes(f64),
    /// Goes to the currently highest attribute
    Points(f64),
    Attribute(Attribute, f64),
    StreakMultiplier(f64),
}

#[derive(Debug)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    pub reward: Reward,
    pub icon: &'static str,
    pub rarity: Rarity,
}

pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_step",
        name: "First Step",
        description: "Complete your first task",
        requirement: Requirement::TasksCompleted(1),
        reward: Reward::AllAttributes(1.0),
        icon: "🎯",
        rarity: Rarity::Common,
    },
    Achievement {
        id: "task_master",
        name: "Task Master",
        description: "Complete 50 tasks",
        requirement: Requirement::TasksCompleted(50),
        reward: Reward::AllAttributes(2.0),
        icon: "✨",
        rarity: Rarity::Uncommon,
    },
    Achievement {
        id: "centurion",
        name: "Centurion",
        description: "Complete 100 tasks",
        requirement: Requirement::TasksCompleted(100),
        reward: Reward::AllAttributes(3.0),
        icon: "💫",
        rarity: Rarity::Rare,
    },
    Achievement {
        id: "consistent",
        name: "Consistent",
        description: "Maintain a 7-day streak",
        requirement: Requirement::Streak(7),
        reward: Reward::StreakMultiplier(1.2),
        icon: "🔥",
        rarity: Rarity::Uncommon,
    },
    Achievement {
        id: "unstoppable",
        name: "Unstoppable",
        description: "Maintain a 30-day streak",
        requirement: Requirement::Streak(30),
        reward: Reward::StreakMultiplier(1.5),
        icon: "⚡",
        rarity: Rarity::Rare,
    },
];

pub fn find_achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievement reward text
pub fn format_reward(reward: &Reward) -> String {
    match *reward {
        Reward::AllAttributes(v) => format!("+{} to all attributes", format_points(v)),
        Reward::Points(v) => format!("+{} points", format_points(v)),
        Reward::Attribute(attr, v) => format!("+{} {}", format_points(v), attr),
        Reward::StreakMultiplier(m) => format!("{}x streak bonus", m),
    }
}

/// Chain stage reward text, joined with ", "
pub fn format_rewards(rewards: &[Reward]) -> String {
    rewards
        .iter()
        .map(|r| match *r {
            Reward::StreakMultiplier(m) => format!("{}x streak multiplier", m),
            other => format_reward(&other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// CHAINS
// ============================================================================

#[derive(Debug)]
pub struct ChainStage {
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    pub rewards: &'static [Reward],
}

#[derive(Debug)]
pub struct AchievementChain {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub stages: &'static [ChainStage],
}

pub static CHAINS: &[AchievementChain] = &[
    AchievementChain {
        id: "physical_mastery",
        name: "Physical Mastery",
        description: "Master your physical capabilities",
        icon: "💪",
        rarity: Rarity::Legendary,
        stages: &[
            ChainStage {
                name: "Beginner Athlete",
                description: "Reach 100 Physical points",
                requirement: Requirement::Attributes(&[(Physical, 100.0)]),
                rewards: &[Reward::Attribute(Physical, 10.0)],
            },
            ChainStage {
                name: "Intermediate Athlete",
                description: "Reach 250 Physical points",
                requirement: Requirement::Attributes(&[(Physical, 250.0)]),
                rewards: &[Reward::Attribute(Physical, 25.0), Reward::Attribute(Health, 10.0)],
            },
            ChainStage {
                name: "Advanced Athlete",
                description: "Reach 500 Physical points",
                requirement: Requirement::Attributes(&[(Physical, 500.0)]),
                rewards: &[Reward::AllAttributes(20.0)],
            },
        ],
    },
    AchievementChain {
        id: "mind_master",
        name: "Mind Master",
        description: "Develop your mental capabilities",
        icon: "🧠",
        rarity: Rarity::Epic,
        stages: &[
            ChainStage {
                name: "Knowledge Seeker",
                description: "Reach 100 Intelligence points",
                requirement: Requirement::Attributes(&[(Intelligence, 100.0)]),
                rewards: &[Reward::Attribute(Intelligence, 10.0)],
            },
            ChainStage {
                name: "Scholar",
                description: "Reach 200 Intelligence and 100 Creativity points",
                requirement: Requirement::Attributes(&[(Intelligence, 200.0), (Creativity, 100.0)]),
                rewards: &[
                    Reward::Attribute(Intelligence, 20.0),
                    Reward::Attribute(Creativity, 10.0),
                ],
            },
            ChainStage {
                name: "Sage",
                description: "Master multiple mental attributes",
                requirement: Requirement::Attributes(&[
                    (Intelligence, 400.0),
                    (Creativity, 200.0),
                    (Spiritual, 100.0),
                ]),
                rewards: &[Reward::AllAttributes(25.0)],
            },
        ],
    },
    AchievementChain {
        id: "consistency_king",
        name: "Consistency King",
        description: "Master the art of consistency",
        icon: "👑",
        rarity: Rarity::Mythical,
        stages: &[
            ChainStage {
                name: "Habit Former",
                description: "Maintain a 7-day streak",
                requirement: Requirement::Streak(7),
                rewards: &[Reward::StreakMultiplier(1.1)],
            },
            ChainStage {
                name: "Routine Master",
                description: "30-day streak with 80% task completion",
                requirement: Requirement::StreakAndCompletion { streak: 30, rate: 0.8 },
                rewards: &[Reward::StreakMultiplier(1.2)],
            },
            ChainStage {
                name: "Living Legend",
                description: "100-day streak with 90% task completion",
                requirement: Requirement::StreakAndCompletion { streak: 100, rate: 0.9 },
                rewards: &[Reward::StreakMultiplier(1.5), Reward::AllAttributes(50.0)],
            },
        ],
    },
];

/// Persisted progress through one chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainProgress {
    pub current_stage: usize,
    pub completed: bool,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

impl ChainProgress {
    /// Fraction of stages cleared
    pub fn fraction(&self, chain: &AchievementChain) -> f32 {
        if self.completed || chain.stages.is_empty() {
            return 1.0;
        }
        self.current_stage as f32 / chain.stages.len() as f32
    }
}

impl Game {
    pub fn requirement_met(&self, requirement: &Requirement) -> bool {
        let user = &self.state.user_data;
        match *requirement {
            Requirement::TasksCompleted(count) => user.stats.tasks_completed >= count,
            Requirement::Streak(days) => user.streak >= days,
            Requirement::Attributes(needs) => needs
                .iter()
                .all(|&(attr, value)| user.attributes.get(attr) >= value),
            Requirement::StreakAndCompletion { streak, rate } => {
                user.streak >= streak
                    && self.periodic_completion_rate().is_some_and(|r| r >= rate)
            }
        }
    }

    /// Completed share of daily and weekly tasks, `None` without any
    pub fn periodic_completion_rate(&self) -> Option<f64> {
        let tasks = &self.state.tasks;
        let total = tasks.count(TaskKind::Daily) + tasks.count(TaskKind::Weekly);
        if total == 0 {
            return None;
        }
        let done = tasks.completed_count(TaskKind::Daily) + tasks.completed_count(TaskKind::Weekly);
        Some(done as f64 / total as f64)
    }

    pub(crate) fn apply_reward(&mut self, reward: &Reward) {
        let attributes = &mut self.state.user_data.attributes;
        match *reward {
            Reward::AllAttributes(v) => attributes.add_all(v),
            Reward::Points(v) => {
                let (attr, _) = attributes.highest();
                attributes.add(attr, v);
            }
            Reward::Attribute(attr, v) => attributes.add(attr, v),
            // Folded into the streak multiplier by refresh_effects
            Reward::StreakMultiplier(_) => {}
        }
    }

    /// Grant every newly satisfied achievement once
    pub fn check_achievements(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        for achievement in ACHIEVEMENTS {
            let done = self
                .state
                .user_data
                .completed_achievements
                .iter()
                .any(|id| id == achievement.id);
            if done || !self.requirement_met(&achievement.requirement) {
                continue;
            }
            let user = &mut self.state.user_data;
            user.completed_achievements.push(achievement.id.to_string());
            user.stats.achievements_unlocked += 1;
            self.apply_reward(&achievement.reward);
            info!(id = achievement.id, "achievement unlocked");
            notices.push(Notice::celebrate(
                format!("Achievement Unlocked! {} {}", achievement.icon, achievement.name),
                format!(
                    "{}. Reward: {}",
                    achievement.description,
                    format_reward(&achievement.reward)
                ),
            ));
        }
        if !notices.is_empty() {
            self.refresh_effects();
        }
        notices
    }

    pub fn available_achievements(&self) -> Vec<&'static Achievement> {
        let done = &self.state.user_data.completed_achievements;
        ACHIEVEMENTS
            .iter()
            .filter(|a| !done.iter().any(|id| id == a.id))
            .collect()
    }

    /// In unlock order; unknown ids from older saves are skipped
    pub fn completed_achievements(&self) -> Vec<&'static Achievement> {
        self.state
            .user_data
            .completed_achievements
            .iter()
            .filter_map(|id| find_achievement(id))
            .collect()
    }

    pub fn chain_progress(&self, chain_id: &str) -> ChainProgress {
        self.state.chains.get(chain_id).cloned().unwrap_or_default()
    }

    /// Advance each open chain by at most one stage
    pub fn check_chains(&mut self, now: NaiveDateTime) -> Vec<Notice> {
        let mut notices = Vec::new();
        for chain in CHAINS {
            let mut progress = self.chain_progress(chain.id);
            if progress.completed {
                continue;
            }
            progress.started_at.get_or_insert(now);

            if let Some(stage) = chain.stages.get(progress.current_stage) {
                if self.requirement_met(&stage.requirement) {
                    for reward in stage.rewards {
                        self.apply_reward(reward);
                    }
                    progress.current_stage += 1;
                    info!(chain = chain.id, stage = progress.current_stage, "chain stage cleared");
                    notices.push(Notice::celebrate(
                        format!("{} {} - Stage {}", chain.icon, chain.name, progress.current_stage),
                        format!("{}. Reward: {}", stage.name, format_rewards(stage.rewards)),
                    ));
                }
            }

            if progress.current_stage >= chain.stages.len() {
                progress.completed = true;
                progress.completed_at = Some(now);
                notices.push(Notice::celebrate(
                    "Achievement Chain Completed!",
                    format!("{} {}: {}", chain.icon, chain.name, chain.description),
                ));
            }
            self.state.chains.insert(chain.id.to_string(), progress);
        }
        if !notices.is_empty() {
            self.refresh_effects();
        }
        notices
    }

    /// Best streak multiplier earned from achievements and chain stages,
    /// plus bonuses won in dynamic event challenges
    pub fn earned_streak_multiplier(&self) -> f64 {
        let user = &self.state.user_data;
        let from_achievements = self.completed_achievements().into_iter().map(|a| a.reward);
        let from_chains = CHAINS.iter().flat_map(|chain| {
            let cleared = self.chain_progress(chain.id).current_stage;
            chain
                .stages
                .iter()
                .take(cleared)
                .flat_map(|s| s.rewards.iter().copied())
        });
        let best = from_achievements
            .chain(from_chains)
            .filter_map(|r| match r {
                Reward::StreakMultiplier(m) => Some(m),
                _ => None,
            })
            .fold(1.0_f64, f64::max);
        best + user.bonus_streak.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};

    #[test]
    fn test_format_reward() {
        assert_eq!(format_reward(&Reward::AllAttributes(1.0)), "+1 to all attributes");
        assert_eq!(format_reward(&Reward::Points(5.0)), "+5 points");
        assert_eq!(format_reward(&Reward::StreakMultiplier(1.2)), "1.2x streak bonus");
        assert_eq!(
            format_rewards(&[Reward::StreakMultiplier(1.5), Reward::AllAttributes(50.0)]),
            "1.5x streak multiplier, +50 to all attributes"
        );
        assert_eq!(
            format_rewards(&[Reward::Attribute(Physical, 25.0), Reward::Attribute(Health, 10.0)]),
            "+25 Physical, +10 Health"
        );
    }

    #[test]
    fn test_achievements_granted_once() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.stats.tasks_completed = 1;
        let first = game.check_achievements();
        assert_eq!(first.len(), 1);
        assert_eq!(game.user().attributes.get(Health), 1.0);
        assert!(game.check_achievements().is_empty());
        assert_eq!(game.user().attributes.get(Health), 1.0);
        assert_eq!(game.user().stats.achievements_unlocked, 1);
        assert_eq!(game.available_achievements().len(), ACHIEVEMENTS.len() - 1);
    }

    #[test]
    fn test_streak_achievement_raises_streak_multiplier() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.set_streak(7);
        game.check_achievements();
        let ids: Vec<_> = game.completed_achievements().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["consistent"]);
        assert_eq!(game.earned_streak_multiplier(), 1.2);
        assert_eq!(game.user().multipliers.streak, 1.2);
    }

    #[test]
    fn test_points_reward_goes_to_highest_attribute() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.attributes.set(Spiritual, 4.0);
        game.apply_reward(&Reward::Points(3.0));
        assert_eq!(game.user().attributes.get(Spiritual), 7.0);
    }

    #[test]
    fn test_chain_advances_one_stage_per_check() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.attributes.set(Physical, 600.0);

        game.check_chains(now);
        let progress = game.chain_progress("physical_mastery");
        assert_eq!(progress.current_stage, 1);
        assert_eq!(progress.started_at, Some(now));
        assert_eq!(game.user().attributes.get(Physical), 610.0);

        game.check_chains(now);
        game.check_chains(now);
        let progress = game.chain_progress("physical_mastery");
        assert!(progress.completed);
        assert_eq!(progress.completed_at, Some(now));
        // 600 + 10 + 25 + 20
        assert_eq!(game.user().attributes.get(Physical), 655.0);
        assert_eq!(game.user().attributes.get(Health), 30.0);

        game.check_chains(now);
        assert_eq!(game.user().attributes.get(Physical), 655.0);
    }

    #[test]
    fn test_completion_rate_requires_periodic_tasks() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.set_streak(30);
        assert_eq!(game.periodic_completion_rate(), None);
        assert!(!game.requirement_met(&Requirement::StreakAndCompletion {
            streak: 30,
            rate: 0.8
        }));

        let id = game
            .create_task("Plan", "", TaskKind::Daily, Intelligence, 1, now)
            .unwrap();
        game.create_task("Trip", "", TaskKind::Special, Spiritual, 1, now)
            .unwrap();
        game.state.tasks.get_mut(TaskKind::Daily, &id).unwrap().completed = true;
        assert_eq!(game.periodic_completion_rate(), Some(1.0));
        assert!(game.requirement_met(&Requirement::StreakAndCompletion {
            streak: 30,
            rate: 0.8
        }));
    }

    #[test]
    fn test_living_legend_grants_both_rewards() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let id = game
            .create_task("Plan", "", TaskKind::Daily, Intelligence, 1, now)
            .unwrap();
        game.state.tasks.get_mut(TaskKind::Daily, &id).unwrap().completed = true;
        game.state.chains.insert(
            "consistency_king".to_string(),
            ChainProgress {
                current_stage: 2,
                ..Default::default()
            },
        );
        game.state.user_data.set_streak(100);
        game.check_chains(now);
        assert!(game.chain_progress("consistency_king").completed);
        assert_eq!(game.user().attributes.get(Creativity), 50.0);
        assert!(game.earned_streak_multiplier() >= 1.5);
    }
}
