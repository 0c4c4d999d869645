//! Job catalogue and career progression

use crate::engine::Game;
use crate::error::{GameError, GameResult};
use crate::progress::calculate_rank;
use crate::types::Attribute::{Creativity, Intelligence, Physical, Resilience, Spiritual};
use crate::types::{Attribute, JobRecord, Notice, Rank};
use chrono::NaiveDateTime;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobTier {
    Low,
    Mid,
    Advanced,
    Elite,
    Special,
}

impl JobTier {
    pub const ALL: [JobTier; 5] = [
        JobTier::Low,
        JobTier::Mid,
        JobTier::Advanced,
        JobTier::Elite,
        JobTier::Special,
    ];

    pub fn label(self) -> &'static str {
        match self {
            JobTier::Low => "Low-Tier Jobs (E-D Rank)",
            JobTier::Mid => "Mid-Tier Jobs (C Rank)",
            JobTier::Advanced => "Advanced Jobs (B Rank)",
            JobTier::Elite => "Elite Jobs (A Rank)",
            JobTier::Special => "Special Jobs (S Rank)",
        }
    }
}

#[derive(Debug)]
pub struct Job {
    pub name: &'static str,
    pub rank: Rank,
    pub requirements: &'static [(Attribute, f64)],
    pub description: &'static str,
    pub perk: &'static str,
    pub multiplier: f64,
    pub tier: JobTier,
    pub icon: &'static str,
}

macro_rules! job {
    ($name:expr, $rank:ident, [$($attr:ident: $val:expr),*], $mult:expr, $tier:ident, $icon:expr, $desc:expr, $perk:expr) => {
        Job {
            name: $name,
            rank: Rank::$rank,
            requirements: &[$(($attr, $val as f64)),*],
            description: $desc,
            perk: $perk,
            multiplier: $mult,
            tier: JobTier::$tier,
            icon: $icon,
        }
    };
}

pub static JOBS: &[Job] = &[
    job!("Master of None", E, [], 1.0, Low, "❓",
        "One who has yet to find their path.", "No perks yet..."),
    job!("Stray Dog", E, [Resilience: 50], 1.1, Low, "🐕",
        "Surviving through instinct and determination.", "Resilience tasks give +10% more points."),
    job!("Pugilist", D, [Physical: 85, Resilience: 50], 1.15, Low, "🥊",
        "Street fighter learning the ways of combat.", "Physical tasks give +15% more points."),
    job!("Swindler", D, [Intelligence: 85, Creativity: 50], 1.15, Low, "🎭",
        "Master of deception and quick wit.", "Intelligence tasks give +15% more points."),
    job!("Apprentice", D, [Intelligence: 85], 1.15, Low, "📚",
        "Beginning the path of knowledge.", "Learning tasks give +15% more points."),
    job!("Duelist", C, [Physical: 170, Resilience: 85], 1.2, Mid, "⚔️",
        "Skilled fighter specializing in one-on-one combat.", "Combat tasks give +20% more points."),
    job!("Phantom Jester", C, [Creativity: 170, Spiritual: 85], 1.2, Mid, "🃏",
        "Mystifying performer of the supernatural.", "Creative tasks give +20% more points."),
    job!("Marksman", C, [Physical: 170, Intelligence: 85], 1.2, Mid, "🎯",
        "Precision shooter with deadly accuracy.", "Precision tasks give +20% more points."),
    job!("Nomad", C, [Resilience: 170, Spiritual: 85], 1.2, Mid, "🌎",
        "Wandering soul seeking truth.", "Exploration tasks give +20% more points."),
    job!("Shaman", C, [Spiritual: 170, Intelligence: 85], 1.25, Mid, "🕯️",
        "Speaker to spirits and natural forces.", "Spiritual tasks give +25% more points."),
    job!("Iron Sentinel", B, [Physical: 255, Resilience: 170], 1.3, Advanced, "🛡️",
        "Unbreakable guardian of order.", "Defense tasks give +30% more points."),
    job!("Shade Operative", B, [Intelligence: 255, Physical: 170], 1.3, Advanced, "🕴️",
        "Elite agent working in the shadows.", "Stealth tasks give +30% more points."),
    job!("Revenant", B, [Spiritual: 255, Resilience: 170], 1.3, Advanced, "👻",
        "One who has returned from the brink.", "Recovery tasks give +30% more points."),
    job!("Battle Hound", B, [Physical: 255, Spiritual: 170], 1.35, Advanced, "🐺",
        "Warrior with bestial instincts.", "Combat tasks give +35% more points."),
    job!("Order Member", A, [Intelligence: 340, Spiritual: 255, Resilience: 170], 1.4, Elite, "⭐",
        "Elite member of a secret organization.", "All attributes gain +40% more points."),
    job!("Elite Assassin", A, [Physical: 340, Intelligence: 255, Resilience: 170], 1.45, Elite, "🗡️",
        "Master of the deadly arts.", "Assassination tasks give +45% more points."),
    job!("Shadow Puppeteer", A, [Creativity: 340, Spiritual: 255, Intelligence: 170], 1.45, Elite, "🎭",
        "Master manipulator of shadows and minds.", "Control tasks give +45% more points."),
    job!("The Glitch", S, [Intelligence: 425, Creativity: 425, Spiritual: 340], 1.5, Special, "🌟",
        "One who has transcended normal limitations.", "All tasks give +50% more points."),
    job!("Enigma", S, [Spiritual: 425, Intelligence: 425, Resilience: 340, Creativity: 340], 1.6, Special, "✨",
        "A being of infinite possibilities.", "All attributes gain +60% more points."),
];

pub fn find_job(name: &str) -> Option<&'static Job> {
    JOBS.iter().find(|j| j.name == name)
}

pub fn jobs_in_tier(tier: JobTier) -> impl Iterator<Item = &'static Job> {
    JOBS.iter().filter(move |j| j.tier == tier)
}

impl Game {
    /// Rank of the player's strongest attribute
    pub fn player_rank(&self) -> Rank {
        let (_, best) = self.state.user_data.attributes.highest();
        calculate_rank(best).rank
    }

    pub fn check_requirements(&self, job: &Job) -> bool {
        let attributes = &self.state.user_data.attributes;
        self.player_rank() >= job.rank
            && job
                .requirements
                .iter()
                .all(|&(attr, needed)| attributes.get(attr) >= needed)
    }

    pub fn available_jobs(&self) -> Vec<&'static Job> {
        JOBS.iter().filter(|j| self.check_requirements(j)).collect()
    }

    pub fn current_job(&self) -> Option<&'static Job> {
        self.state
            .user_data
            .current_job
            .as_deref()
            .and_then(find_job)
    }

    pub fn accept_job(&mut self, name: &str, now: NaiveDateTime) -> GameResult<Notice> {
        let job = find_job(name).ok_or_else(|| GameError::UnknownJob(name.to_string()))?;
        if !self.check_requirements(job) {
            return Err(GameError::RequirementsNotMet(job.name.to_string()));
        }
        let user = &mut self.state.user_data;
        user.current_job = Some(job.name.to_string());
        user.job_history.push(JobRecord {
            job: job.name.to_string(),
            accepted_at: now,
        });
        user.multipliers.job = job.multiplier;
        info!(job = job.name, multiplier = job.multiplier, "job accepted");
        Ok(Notice::celebrate(
            format!("Congratulations! You are now a {}!", job.name),
            job.perk,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};

    #[test]
    fn test_catalogue_shape() {
        assert_eq!(JOBS.len(), 19);
        for tier in JobTier::ALL {
            assert!(jobs_in_tier(tier).count() >= 2);
        }
        assert!(JOBS.iter().all(|j| j.multiplier >= 1.0));
    }

    #[test]
    fn test_new_player_only_has_master_of_none() {
        let game = new_game(at(2024, 5, 10, 9));
        let names: Vec<_> = game.available_jobs().iter().map(|j| j.name).collect();
        assert_eq!(names, vec!["Master of None"]);
    }

    #[test]
    fn test_requirements_use_typed_attributes() {
        let mut game = new_game(at(2024, 5, 10, 9));
        game.state.user_data.attributes.set(Resilience, 50.0);
        assert!(game.check_requirements(find_job("Stray Dog").unwrap()));
        assert!(!game.check_requirements(find_job("Pugilist").unwrap()));
        game.state.user_data.attributes.set(Physical, 85.0);
        assert!(game.check_requirements(find_job("Pugilist").unwrap()));
    }

    #[test]
    fn test_accept_job() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        assert_eq!(
            game.accept_job("Astronaut", now).unwrap_err(),
            GameError::UnknownJob("Astronaut".to_string())
        );
        assert!(matches!(
            game.accept_job("Stray Dog", now),
            Err(GameError::RequirementsNotMet(_))
        ));

        game.state.user_data.attributes.set(Resilience, 60.0);
        game.accept_job("Stray Dog", now).unwrap();
        assert_eq!(game.current_job().map(|j| j.name), Some("Stray Dog"));
        assert_eq!(game.user().multipliers.job, 1.1);
        assert_eq!(game.user().job_history.len(), 1);
        assert_eq!(game.user().job_history[0].accepted_at, now);
    }
}
