//! Task lifecycle, streaks, periodic resets and inactivity penalties

use crate::constants::{
    DESCRIPTION_MAX_CHARS, MAKEUP_WINDOW_HOURS, PENALTY_SINGLE_TARGET_CHANCE,
    WEEKLY_FREQUENCY_MAX,
};
use crate::engine::{pick, Game};
use crate::error::{GameError, GameResult};
use crate::types::{Attribute, Notice, PenaltyRecord, PenaltyTarget, Task, TaskKind};
use crate::utils::{day_key, format_points, same_iso_week};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

/// Penalty tier for a stretch of inactivity
#[derive(Debug, Clone, PartialEq)]
pub struct Severity {
    pub level: u8,
    pub penalty: RangeInclusive<u32>,
    pub message: &'static str,
}

/// 1-3 missed days is a minor setback, 4-7 significant, 8+ critical.
pub fn determine_severity(missed_days: i64) -> Severity {
    match missed_days {
        i64::MIN..=3 => Severity {
            level: 1,
            penalty: 1..=2,
            message: "Minor Setback",
        },
        4..=7 => Severity {
            level: 2,
            penalty: 3..=5,
            message: "Significant Decline",
        },
        _ => Severity {
            level: 3,
            penalty: 6..=8,
            message: "Critical Failure",
        },
    }
}

/// Result of completing a task
#[derive(Debug, Clone)]
pub struct Completion {
    pub task_id: String,
    pub name: String,
    pub kind: TaskKind,
    pub attribute: Attribute,
    pub points: f64,
    pub notices: Vec<Notice>,
}

impl Game {
    /// Case-insensitive name clash within one kind
    pub fn is_duplicate(&self, name: &str, kind: TaskKind) -> bool {
        let needle = name.trim().to_lowercase();
        self.state
            .tasks
            .tasks(kind)
            .any(|t| t.name.trim().to_lowercase() == needle)
    }

    pub fn create_task(
        &mut self,
        name: &str,
        description: &str,
        kind: TaskKind,
        attribute: Attribute,
        frequency: u32,
        now: NaiveDateTime,
    ) -> GameResult<String> {
        let points = if kind == TaskKind::Weekly {
            frequency.clamp(1, WEEKLY_FREQUENCY_MAX)
        } else {
            1
        };
        self.insert_task(name, description, kind, attribute, points, Vec::new(), now)
    }

    /// Shared by the task form and templates
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn insert_task(
        &mut self,
        name: &str,
        description: &str,
        kind: TaskKind,
        attribute: Attribute,
        points: u32,
        requirements: Vec<String>,
        now: NaiveDateTime,
    ) -> GameResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }
        if self.is_duplicate(name, kind) {
            return Err(GameError::Duplicate {
                name: name.to_string(),
                kind,
            });
        }

        let id = self.next_task_id(kind, now);
        let task = Task {
            id: id.clone(),
            name: name.to_string(),
            description: description.trim().chars().take(DESCRIPTION_MAX_CHARS).collect(),
            kind,
            attribute,
            points: points.max(1),
            requirements,
            completed: false,
            created_at: now,
            completed_at: None,
        };
        info!(id = %id, name = %task.name, kind = %kind, "task created");
        self.state.tasks.insert(task);
        Ok(id)
    }

    fn next_task_id(&self, kind: TaskKind, now: NaiveDateTime) -> String {
        let base = format!("{}_{}", kind, now.and_utc().timestamp_millis());
        if !self.state.tasks.contains_id(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{}_{}", base, n))
            .find(|id| !self.state.tasks.contains_id(id))
            .unwrap_or(base)
    }

    pub fn complete_task(
        &mut self,
        kind: TaskKind,
        id: &str,
        now: NaiveDateTime,
    ) -> GameResult<Completion> {
        let task = self
            .state
            .tasks
            .get(kind, id)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        if task.completed {
            return Err(GameError::AlreadyCompleted);
        }
        let attribute = task.attribute;
        let base = task.points as f64;

        // Events that ran out since the last tick must not boost this gain
        let mut expired = self.update_active_events(now);
        expired.extend(self.update_dynamic_events(now));
        let points = base * self.state.user_data.gain_multiplier(attribute);

        let (task_id, name) = match self.state.tasks.get_mut(kind, id) {
            Some(task) => {
                task.completed = true;
                task.completed_at = Some(now);
                (task.id.clone(), task.name.clone())
            }
            None => return Err(GameError::NotFound(id.to_string())),
        };

        let user = &mut self.state.user_data;
        user.attributes.add(attribute, points);
        user.stats.tasks_completed += 1;
        user.stats.total_points_earned += points;
        let day = user.daily_stats.entry(day_key(now.date())).or_default();
        day.completions += 1;
        day.points += points;
        self.record_streak(now.date());

        info!(id = %task_id, attribute = %attribute, points, "task completed");
        let mut notices = vec![Notice::success(
            "Task completed!",
            format!("+{} {} points!", format_points(points), attribute),
        )];
        notices.extend(self.recover_penalties(now));
        notices.extend(expired);
        notices.extend(self.after_progress(now));

        Ok(Completion {
            task_id,
            name,
            kind,
            attribute,
            points,
            notices,
        })
    }

    pub fn remove_task(&mut self, kind: TaskKind, id: &str) -> GameResult<Task> {
        let task = self
            .state
            .tasks
            .remove(kind, id)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        info!(id = %id, name = %task.name, "task removed");
        Ok(task)
    }

    fn record_streak(&mut self, day: NaiveDate) {
        let user = &mut self.state.user_data;
        let streak = match user.last_completion_date {
            Some(last) if last == day => user.streak.max(1),
            Some(last) if (day - last).num_days() == 1 => user.streak + 1,
            _ => 1,
        };
        user.set_streak(streak);
        user.last_completion_date = Some(day);
    }

    /// Completing any task inside a penalty's recovery window counts it as recovered
    fn recover_penalties(&mut self, now: NaiveDateTime) -> Vec<Notice> {
        let mut notices = Vec::new();
        for penalty in self
            .state
            .penalty_history
            .iter_mut()
            .filter(|p| !p.completed && now <= p.recover_by)
        {
            penalty.completed = true;
            notices.push(Notice::success(
                "Penalty recovered",
                format!("You bounced back from a level {} penalty.", penalty.level),
            ));
        }
        notices
    }

    /// Day rollover: streak decay, makeup window, inactivity penalty and resets.
    pub fn update_tasks(&mut self, now: NaiveDateTime, rng: &mut impl Rng) -> Vec<Notice> {
        let mut notices = Vec::new();
        let last_active = self.state.user_data.last_active;
        let inactive_days = (now.date() - last_active.date()).num_days();

        if let Some(last) = self.state.user_data.last_completion_date {
            if (now.date() - last).num_days() > 1 && self.state.user_data.streak > 0 {
                info!(streak = self.state.user_data.streak, "streak lost");
                self.state.user_data.streak = 0;
                notices.push(Notice::warning(
                    "Streak lost",
                    "A day passed without a completed task.",
                ));
            }
        }

        if inactive_days > 0 {
            let incomplete = self.state.tasks.incomplete().count();
            if incomplete > 0 {
                if inactive_days == 1 {
                    let deadline = now + Duration::hours(MAKEUP_WINDOW_HOURS);
                    self.state.user_data.makeup_deadline = Some(deadline);
                    debug!(%deadline, incomplete, "makeup window opened");
                    notices.push(Notice::warning(
                        "Makeup Opportunity Available",
                        format!(
                            "Complete your tasks within {} hours to avoid penalties. Tasks remaining: {}",
                            MAKEUP_WINDOW_HOURS, incomplete
                        ),
                    ));
                } else if self
                    .state
                    .user_data
                    .makeup_deadline
                    .map_or(true, |deadline| now > deadline)
                {
                    notices.push(self.apply_penalty(inactive_days, incomplete, now, rng));
                }
            }
            let reset = self.reset_periodic_tasks(now, last_active);
            if reset > 0 {
                debug!(reset, "periodic tasks reset");
            }
        }

        self.state.user_data.last_active = now;
        notices
    }

    fn apply_penalty(
        &mut self,
        inactive_days: i64,
        incomplete: usize,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Notice {
        let severity = determine_severity(inactive_days);
        let reduction = self.state.user_data.penalty_reduction.clamp(0.0, 1.0);
        let points = rng.random_range(severity.penalty.clone()) as f64 * (1.0 - reduction);

        let attributes = &mut self.state.user_data.attributes;
        let (target, hit) = if rng.random::<f64>() < PENALTY_SINGLE_TARGET_CHANCE {
            let attr = *pick(rng, &Attribute::ALL);
            attributes.subtract(attr, points);
            (
                PenaltyTarget::Single(attr),
                format!("-{} points to {}", format_points(points), attr),
            )
        } else {
            let per = points / Attribute::ALL.len() as f64;
            attributes.subtract_all(per);
            (PenaltyTarget::All, format!("-{:.1} points to all attributes", per))
        };

        warn!(
            level = severity.level,
            points,
            inactive_days,
            incomplete,
            "inactivity penalty applied"
        );
        self.state.penalty_history.push(PenaltyRecord {
            level: severity.level,
            points,
            target,
            inactive_days,
            incomplete_tasks: incomplete,
            applied_at: now,
            recover_by: now + Duration::hours(MAKEUP_WINDOW_HOURS),
            completed: false,
        });

        Notice::error(
            severity.message,
            format!(
                "Inactive days: {}. Penalty: {}. Incomplete tasks: {}. Complete tasks within {} hours to stop further decline!",
                inactive_days, hit, incomplete, MAKEUP_WINDOW_HOURS
            ),
        )
    }

    /// Daily tasks reset when the calendar day changes, weekly tasks when
    /// the ISO week changes. Returns how many tasks were reset.
    pub fn reset_periodic_tasks(&mut self, now: NaiveDateTime, last_active: NaiveDateTime) -> usize {
        let (today, last) = (now.date(), last_active.date());
        let mut count = 0;
        if today != last {
            for task in self.state.tasks.tasks_mut(TaskKind::Daily).filter(|t| t.completed) {
                task.reset();
                count += 1;
            }
        }
        if !same_iso_week(today, last) {
            for task in self.state.tasks.tasks_mut(TaskKind::Weekly).filter(|t| t.completed) {
                task.reset();
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_determine_severity() {
        assert_eq!(determine_severity(0).level, 1);
        assert_eq!(determine_severity(3).level, 1);
        assert_eq!(determine_severity(4).message, "Significant Decline");
        assert_eq!(determine_severity(7).penalty, 3..=5);
        assert_eq!(determine_severity(8).level, 3);
        assert_eq!(determine_severity(400).penalty, 6..=8);
    }

    #[test]
    fn test_create_task_validation() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        assert_eq!(
            game.create_task("   ", "", TaskKind::Daily, Attribute::Health, 1, now),
            Err(GameError::EmptyName)
        );
        game.create_task("Read", "", TaskKind::Daily, Attribute::Intelligence, 1, now)
            .unwrap();
        assert!(matches!(
            game.create_task("READ", "", TaskKind::Daily, Attribute::Intelligence, 1, now),
            Err(GameError::Duplicate { .. })
        ));
        // Same name in another kind is fine
        assert!(game
            .create_task("read", "", TaskKind::Weekly, Attribute::Intelligence, 3, now)
            .is_ok());
    }

    #[test]
    fn test_create_task_points_and_description() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let long = "x".repeat(300);
        let weekly = game
            .create_task("Swim", &long, TaskKind::Weekly, Attribute::Physical, 12, now)
            .unwrap();
        let special = game
            .create_task("Trip", "", TaskKind::Special, Attribute::Spiritual, 5, now)
            .unwrap();
        let task = game.tasks().get(TaskKind::Weekly, &weekly).unwrap();
        assert_eq!(task.points, 7);
        assert_eq!(task.description.chars().count(), 200);
        assert_eq!(game.tasks().get(TaskKind::Special, &special).unwrap().points, 1);
        assert_ne!(weekly, special);
    }

    #[test]
    fn test_ids_are_unique_within_same_instant() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let a = game
            .create_task("A", "", TaskKind::Daily, Attribute::Health, 1, now)
            .unwrap();
        let b = game
            .create_task("B", "", TaskKind::Daily, Attribute::Health, 1, now)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(game.tasks().count(TaskKind::Daily), 2);
    }

    #[test]
    fn test_complete_task_applies_job_multiplier_once() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.multipliers.job = 1.5;
        let id = game
            .create_task("Lift", "", TaskKind::Daily, Attribute::Physical, 1, now)
            .unwrap();
        let done = game.complete_task(TaskKind::Daily, &id, now).unwrap();
        assert_eq!(done.points, 1.5);
        // First Step grants +1 to every attribute
        assert_eq!(game.user().attributes.get(Attribute::Physical), 2.5);
        assert_eq!(game.user().stats.tasks_completed, 1);
        assert_eq!(
            game.complete_task(TaskKind::Daily, &id, now).unwrap_err(),
            GameError::AlreadyCompleted
        );
        assert!(matches!(
            game.complete_task(TaskKind::Daily, "daily_missing", now),
            Err(GameError::NotFound(_))
        ));
    }

    #[test]
    fn test_expired_special_event_does_not_boost_completion() {
        let start = at(2024, 5, 10, 9) + Duration::minutes(30);
        let mut game = new_game(start);
        let mut rng = StdRng::seed_from_u64(21);
        let id = game
            .create_task("Stretch", "", TaskKind::Daily, Attribute::Health, 1, start)
            .unwrap();
        let golden = crate::events::find_special_event("golden_hour").unwrap();
        game.trigger_event(golden, start, &mut rng);
        assert_eq!(game.user().gain_multiplier(Attribute::Health), 2.0);

        // No tick between the event ending at 10:30 and the completion
        let done = game
            .complete_task(TaskKind::Daily, &id, start + Duration::minutes(75))
            .unwrap();
        assert_eq!(done.points, 1.0);
        assert!(game.user().active_events.is_empty());
        assert_eq!(game.user().event_history.len(), 1);
    }

    #[test]
    fn test_remove_task() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let id = game
            .create_task("Journal", "", TaskKind::Daily, Attribute::Creativity, 1, now)
            .unwrap();
        assert_eq!(game.remove_task(TaskKind::Daily, &id).unwrap().name, "Journal");
        assert!(matches!(
            game.remove_task(TaskKind::Daily, &id),
            Err(GameError::NotFound(_))
        ));
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let day1 = at(2024, 5, 10, 9);
        let mut game = new_game(day1);
        let id = game
            .create_task("Walk", "", TaskKind::Daily, Attribute::Health, 1, day1)
            .unwrap();
        game.complete_task(TaskKind::Daily, &id, day1).unwrap();
        assert_eq!(game.user().streak, 1);

        let mut rng = StdRng::seed_from_u64(1);
        let day2 = at(2024, 5, 11, 9);
        game.update_tasks(day2, &mut rng);
        game.complete_task(TaskKind::Daily, &id, day2).unwrap();
        assert_eq!(game.user().streak, 2);
        assert_eq!(game.user().stats.max_streak, 2);

        // Skipping a day loses the streak at rollover
        let day4 = at(2024, 5, 13, 9);
        game.update_tasks(day4, &mut rng);
        assert_eq!(game.user().streak, 0);
        assert_eq!(game.user().stats.max_streak, 2);
    }

    #[test]
    fn test_single_missed_day_opens_makeup_window() {
        let day1 = at(2024, 5, 10, 20);
        let mut game = new_game(day1);
        game.create_task("Stretch", "", TaskKind::Daily, Attribute::Physical, 1, day1)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let day2 = at(2024, 5, 11, 8);
        let notices = game.update_tasks(day2, &mut rng);
        assert_eq!(
            game.user().makeup_deadline,
            Some(day2 + Duration::hours(MAKEUP_WINDOW_HOURS))
        );
        assert!(game.state().penalty_history.is_empty());
        assert!(notices.iter().any(|n| n.title.contains("Makeup")));
    }

    #[test]
    fn test_long_absence_applies_penalty_without_going_negative() {
        let start = at(2024, 5, 1, 9);
        let mut game = new_game(start);
        game.create_task("Stretch", "", TaskKind::Daily, Attribute::Physical, 1, start)
            .unwrap();
        for attr in Attribute::ALL {
            game.state.user_data.attributes.set(attr, 1.0);
        }
        let mut rng = StdRng::seed_from_u64(42);
        let later = at(2024, 5, 6, 9);
        game.update_tasks(later, &mut rng);

        let record = &game.state().penalty_history[0];
        assert_eq!(record.level, 2);
        assert_eq!(record.inactive_days, 5);
        assert!((3.0..=5.0).contains(&record.points));
        assert!(game.user().attributes.iter().all(|(_, v)| v >= 0.0));
        assert!(game.user().attributes.total() < 6.0);
        assert_eq!(game.user().last_active, later);
        assert!(game.has_active_penalty(later));
    }

    #[test]
    fn test_no_penalty_inside_makeup_deadline() {
        let start = at(2024, 5, 1, 9);
        let mut game = new_game(start);
        game.create_task("Stretch", "", TaskKind::Daily, Attribute::Physical, 1, start)
            .unwrap();
        let later = at(2024, 5, 3, 9);
        game.state.user_data.makeup_deadline = Some(later + Duration::hours(2));
        let mut rng = StdRng::seed_from_u64(5);
        game.update_tasks(later, &mut rng);
        assert!(game.state().penalty_history.is_empty());
    }

    #[test]
    fn test_completion_recovers_penalty() {
        let start = at(2024, 5, 1, 9);
        let mut game = new_game(start);
        let id = game
            .create_task("Stretch", "", TaskKind::Daily, Attribute::Physical, 1, start)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let later = at(2024, 5, 4, 9);
        game.update_tasks(later, &mut rng);
        assert_eq!(game.state().penalty_history.len(), 1);

        let done = game
            .complete_task(TaskKind::Daily, &id, later + Duration::hours(1))
            .unwrap();
        assert!(game.state().penalty_history[0].completed);
        assert!(done.notices.iter().any(|n| n.title == "Penalty recovered"));
        assert!(!game.has_active_penalty(later + Duration::hours(1)));
    }

    #[test]
    fn test_reset_periodic_tasks() {
        // 2024-05-10 is a Friday
        let friday = at(2024, 5, 10, 9);
        let mut game = new_game(friday);
        let daily = game
            .create_task("Floss", "", TaskKind::Daily, Attribute::Health, 1, friday)
            .unwrap();
        let weekly = game
            .create_task("Hike", "", TaskKind::Weekly, Attribute::Physical, 2, friday)
            .unwrap();
        game.complete_task(TaskKind::Daily, &daily, friday).unwrap();
        game.complete_task(TaskKind::Weekly, &weekly, friday).unwrap();

        let saturday = at(2024, 5, 11, 9);
        assert_eq!(game.reset_periodic_tasks(saturday, friday), 1);
        assert!(!game.tasks().get(TaskKind::Daily, &daily).unwrap().completed);
        assert!(game.tasks().get(TaskKind::Weekly, &weekly).unwrap().completed);

        let monday = at(2024, 5, 13, 9);
        assert_eq!(game.reset_periodic_tasks(monday, saturday), 1);
        let hike = game.tasks().get(TaskKind::Weekly, &weekly).unwrap();
        assert!(!hike.completed);
        assert_eq!(hike.completed_at, None);
    }
}
