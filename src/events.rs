//! Random special events: timed boosts and challenges

use crate::constants::{EVENT_CHECK_INTERVAL_SECS, SPEED_RUN_WINDOW_SECS};
use crate::dynamic_events::EffectKind;
use crate::engine::{pick, Game};
use crate::types::{Attribute, Notice, Rarity, TaskKind};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Positive,
    Challenge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventEffect {
    PointMultiplier(f64),
    /// Applies to one randomly chosen attribute
    AttributeBoost(f64),
    AllAttributesBoost(f64),
    StreakMultiplier(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeOutcome {
    pub all_attributes: f64,
    pub streak_change: i32,
    /// Starts a Double Points event on success
    pub double_points: bool,
}

#[derive(Debug)]
pub struct SpecialEvent {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub duration_hours: i64,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub chance: f64,
    pub kind: EventKind,
    pub effect: Option<EventEffect>,
    pub success: Option<ChallengeOutcome>,
    pub failure: Option<ChallengeOutcome>,
}

pub static SPECIAL_EVENTS: &[SpecialEvent] = &[
    SpecialEvent {
        id: "double_points",
        name: "Double Points",
        description: "All tasks give double points!",
        duration_hours: 24,
        icon: "✨",
        rarity: Rarity::Common,
        chance: 0.1,
        kind: EventKind::Positive,
        effect: Some(EventEffect::PointMultiplier(2.0)),
        success: None,
        failure: None,
    },
    SpecialEvent {
        id: "attribute_surge",
        name: "Attribute Surge",
        description: "Random attribute gains +50% points",
        duration_hours: 12,
        icon: "💫",
        rarity: Rarity::Uncommon,
        chance: 0.05,
        kind: EventKind::Positive,
        effect: Some(EventEffect::AttributeBoost(1.5)),
        success: None,
        failure: None,
    },
    SpecialEvent {
        id: "golden_hour",
        name: "Golden Hour",
        description: "All attributes gain +100% points for 1 hour",
        duration_hours: 1,
        icon: "⚡",
        rarity: Rarity::Rare,
        chance: 0.02,
        kind: EventKind::Positive,
        effect: Some(EventEffect::AllAttributesBoost(2.0)),
        success: None,
        failure: None,
    },
    SpecialEvent {
        id: "streak_power",
        name: "Streak Power",
        description: "Streak multiplier doubled",
        duration_hours: 24,
        icon: "🔥",
        rarity: Rarity::Epic,
        chance: 0.01,
        kind: EventKind::Positive,
        effect: Some(EventEffect::StreakMultiplier(2.0)),
        success: None,
        failure: None,
    },
    SpecialEvent {
        id: "perfect_day",
        name: "Perfect Day Challenge",
        description: "Complete all tasks perfectly for bonus rewards",
        duration_hours: 24,
        icon: "🎯",
        rarity: Rarity::Uncommon,
        chance: 0.05,
        kind: EventKind::Challenge,
        effect: None,
        success: Some(ChallengeOutcome {
            all_attributes: 5.0,
            streak_change: 1,
            double_points: false,
        }),
        failure: Some(ChallengeOutcome {
            all_attributes: 0.0,
            streak_change: -1,
            double_points: false,
        }),
    },
    SpecialEvent {
        id: "speed_runner",
        name: "Speed Runner Challenge",
        description: "Complete all daily tasks within 6 hours",
        duration_hours: 6,
        icon: "⚡",
        rarity: Rarity::Rare,
        chance: 0.03,
        kind: EventKind::Challenge,
        effect: None,
        success: Some(ChallengeOutcome {
            all_attributes: 10.0,
            streak_change: 0,
            double_points: true,
        }),
        failure: Some(ChallengeOutcome {
            all_attributes: -5.0,
            streak_change: 0,
            double_points: false,
        }),
    },
];

pub fn find_special_event(id: &str) -> Option<&'static SpecialEvent> {
    SPECIAL_EVENTS.iter().find(|e| e.id == id)
}

/// A triggered special event, active or in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInstance {
    pub event: String,
    pub started_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    /// Target of an attribute surge
    #[serde(default)]
    pub attribute: Option<Attribute>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub challenge_completed: Option<bool>,
}

impl EventInstance {
    pub fn definition(&self) -> Option<&'static SpecialEvent> {
        find_special_event(&self.event)
    }
}

impl Game {
    /// Roll every special event, at most once per hour
    pub fn check_for_events(&mut self, now: NaiveDateTime, rng: &mut impl Rng) -> Vec<Notice> {
        let since = now - self.state.user_data.last_event_check;
        if since.num_seconds() < EVENT_CHECK_INTERVAL_SECS {
            return Vec::new();
        }
        self.state.user_data.last_event_check = now;

        let penalized = self.has_active_penalty(now);
        let mut notices = Vec::new();
        for event in SPECIAL_EVENTS {
            let chance = match (event.kind, penalized) {
                (EventKind::Challenge, true) => event.chance * 2.0,
                (EventKind::Positive, false) => event.chance * 1.5,
                _ => event.chance,
            };
            if rng.random::<f64>() < chance {
                notices.push(self.trigger_event(event, now, rng));
            }
        }
        notices
    }

    pub fn trigger_event(
        &mut self,
        event: &'static SpecialEvent,
        now: NaiveDateTime,
        rng: &mut impl Rng,
    ) -> Notice {
        let attribute = match event.effect {
            Some(EventEffect::AttributeBoost(_)) => Some(*pick(rng, &Attribute::ALL)),
            _ => None,
        };
        self.start_event(event, attribute, now)
    }

    fn start_event(
        &mut self,
        event: &'static SpecialEvent,
        attribute: Option<Attribute>,
        now: NaiveDateTime,
    ) -> Notice {
        self.state.user_data.active_events.push(EventInstance {
            event: event.id.to_string(),
            started_at: now,
            ends_at: now + Duration::hours(event.duration_hours),
            attribute,
            completed_at: None,
            challenge_completed: None,
        });
        self.refresh_effects();
        info!(event = event.id, ?attribute, "special event started");

        let target = attribute.map(|a| format!(" ({})", a)).unwrap_or_default();
        Notice::celebrate(
            format!("{} {}{}", event.icon, event.name, target),
            format!("{} Duration: {} hours", event.description, event.duration_hours),
        )
    }

    /// Expire finished events: judge challenges, drop effects, move to history
    pub fn update_active_events(&mut self, now: NaiveDateTime) -> Vec<Notice> {
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.user_data.active_events)
            .into_iter()
            .partition(|e| e.ends_at <= now);
        self.state.user_data.active_events = active;
        if expired.is_empty() {
            return Vec::new();
        }

        let mut notices = Vec::new();
        for mut instance in expired {
            if let Some(event) = instance.definition() {
                if event.kind == EventKind::Challenge {
                    let success = self.challenge_succeeded(event);
                    instance.challenge_completed = Some(success);
                    notices.extend(self.settle_challenge(event, success, now));
                }
            }
            debug!(event = %instance.event, "special event expired");
            instance.completed_at = Some(now);
            self.state.user_data.event_history.push(instance);
        }
        self.refresh_effects();
        notices
    }

    fn challenge_succeeded(&self, event: &SpecialEvent) -> bool {
        let daily: Vec<_> = self.state.tasks.tasks(TaskKind::Daily).collect();
        if daily.is_empty() || daily.iter().any(|t| !t.completed) {
            return false;
        }
        match event.id {
            "perfect_day" => true,
            "speed_runner" => {
                let times: Vec<_> = daily.iter().filter_map(|t| t.completed_at).collect();
                match (times.iter().min(), times.iter().max()) {
                    (Some(first), Some(last)) => {
                        (*last - *first).num_seconds() <= SPEED_RUN_WINDOW_SECS
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn settle_challenge(
        &mut self,
        event: &'static SpecialEvent,
        success: bool,
        now: NaiveDateTime,
    ) -> Vec<Notice> {
        let outcome = if success { event.success } else { event.failure };
        if let Some(outcome) = outcome {
            let user = &mut self.state.user_data;
            if outcome.all_attributes >= 0.0 {
                user.attributes.add_all(outcome.all_attributes);
            } else {
                user.attributes.subtract_all(-outcome.all_attributes);
            }
            let streak = (user.streak as i64 + outcome.streak_change as i64).max(0) as u32;
            user.set_streak(streak);
        }
        info!(event = event.id, success, "challenge settled");

        let mut notices = vec![if success {
            Notice::celebrate(
                "Challenge complete",
                format!("Challenge '{}' completed successfully!", event.name),
            )
        } else {
            Notice::warning("Challenge failed", format!("Challenge '{}' failed!", event.name))
        }];
        if success && outcome.is_some_and(|o| o.double_points) {
            if let Some(double) = find_special_event("double_points") {
                notices.push(self.start_event(double, None, now));
            }
        }
        notices
    }

    pub fn active_event_multiplier(&self) -> f64 {
        self.state.user_data.multipliers.event
    }

    /// Recompute every event-driven multiplier from the active special and
    /// dynamic events. The strongest effect of each kind wins.
    pub(crate) fn refresh_effects(&mut self) {
        let mut event_mult: f64 = 1.0;
        let mut streak_factor: f64 = 1.0;
        let mut attr_mults: BTreeMap<Attribute, f64> = BTreeMap::new();
        let mut boost = |attr: Attribute, value: f64| {
            let slot = attr_mults.entry(attr).or_insert(1.0);
            *slot = slot.max(value);
        };

        for instance in &self.state.user_data.active_events {
            match instance.definition().and_then(|e| e.effect) {
                Some(EventEffect::PointMultiplier(m)) => event_mult = event_mult.max(m),
                Some(EventEffect::AttributeBoost(m)) => {
                    if let Some(attr) = instance.attribute {
                        boost(attr, m);
                    }
                }
                Some(EventEffect::AllAttributesBoost(m)) => {
                    for attr in Attribute::ALL {
                        boost(attr, m);
                    }
                }
                Some(EventEffect::StreakMultiplier(m)) => streak_factor = streak_factor.max(m),
                None => {}
            }
        }

        let mut task_mult: f64 = 1.0;
        let mut penalty_reduction: f64 = 0.0;
        for event in self.state.dynamic_events.iter().filter(|e| e.triggered) {
            let factor = event.effect.factor();
            match event.effect.kind {
                EffectKind::AttributeBoost => {
                    if let Some(attr) = event.effect.attribute {
                        boost(attr, factor);
                    }
                }
                EffectKind::MultiAttribute => {
                    for attr in Attribute::ALL {
                        boost(attr, factor);
                    }
                }
                EffectKind::TaskBonus => task_mult = task_mult.max(factor),
                EffectKind::StreakMultiplier => {
                    streak_factor = streak_factor.max(factor)
                }
                EffectKind::RecoveryBoost => {
                    penalty_reduction = penalty_reduction.max(event.effect.magnitude as f64 / 100.0)
                }
            }
        }

        let earned = self.earned_streak_multiplier();
        let user = &mut self.state.user_data;
        user.multipliers.event = event_mult;
        user.multipliers.streak = earned * streak_factor;
        user.attribute_multipliers = attr_mults;
        user.task_multiplier = task_mult;
        user.penalty_reduction = penalty_reduction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn event(id: &str) -> &'static SpecialEvent {
        find_special_event(id).unwrap()
    }

    #[test]
    fn test_catalogue_chances_are_probabilities() {
        assert_eq!(SPECIAL_EVENTS.len(), 6);
        for e in SPECIAL_EVENTS {
            assert!(e.chance > 0.0 && e.chance * 2.0 <= 1.0);
            assert_eq!(e.kind == EventKind::Challenge, e.effect.is_none());
        }
    }

    #[test]
    fn test_check_runs_at_most_hourly() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(11);
        game.check_for_events(now + Duration::minutes(30), &mut rng);
        assert_eq!(game.user().last_event_check, now);
        game.check_for_events(now + Duration::hours(1), &mut rng);
        assert_eq!(game.user().last_event_check, now + Duration::hours(1));
    }

    #[test]
    fn test_double_points_applies_and_expires() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(1);
        game.trigger_event(event("double_points"), now, &mut rng);
        assert_eq!(game.active_event_multiplier(), 2.0);

        assert!(game.update_active_events(now + Duration::hours(23)).is_empty());
        assert_eq!(game.user().active_events.len(), 1);

        game.update_active_events(now + Duration::hours(24));
        assert_eq!(game.active_event_multiplier(), 1.0);
        assert!(game.user().active_events.is_empty());
        let past = &game.user().event_history[0];
        assert_eq!(past.completed_at, Some(now + Duration::hours(24)));
    }

    #[test]
    fn test_attribute_surge_targets_one_attribute() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(2);
        game.trigger_event(event("attribute_surge"), now, &mut rng);
        let target = game.user().active_events[0].attribute.unwrap();
        assert_eq!(game.user().attribute_multipliers.get(&target), Some(&1.5));
        assert_eq!(game.user().attribute_multipliers.len(), 1);
    }

    #[test]
    fn test_streak_power_keeps_earned_multiplier() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.user_data.set_streak(7);
        game.check_achievements();
        let mut rng = StdRng::seed_from_u64(3);
        game.trigger_event(event("streak_power"), now, &mut rng);
        assert_eq!(game.user().multipliers.streak, 2.4);
        game.update_active_events(now + Duration::hours(25));
        assert_eq!(game.user().multipliers.streak, 1.2);
    }

    #[test]
    fn test_perfect_day_success_and_failure() {
        let now = at(2024, 5, 10, 9);
        let mut rng = StdRng::seed_from_u64(4);

        let mut game = new_game(now);
        let id = game
            .create_task("Read", "", TaskKind::Daily, Attribute::Intelligence, 1, now)
            .unwrap();
        game.trigger_event(event("perfect_day"), now, &mut rng);
        game.complete_task(TaskKind::Daily, &id, now).unwrap();
        let streak = game.user().streak;
        game.update_active_events(now + Duration::hours(24));
        assert_eq!(game.user().event_history[0].challenge_completed, Some(true));
        assert_eq!(game.user().streak, streak + 1);

        let mut game = new_game(now);
        game.create_task("Read", "", TaskKind::Daily, Attribute::Intelligence, 1, now)
            .unwrap();
        game.state.user_data.set_streak(3);
        game.trigger_event(event("perfect_day"), now, &mut rng);
        game.update_active_events(now + Duration::hours(24));
        assert_eq!(game.user().event_history[0].challenge_completed, Some(false));
        assert_eq!(game.user().streak, 2);
    }

    #[test]
    fn test_speed_runner_reward_starts_double_points() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(5);
        let a = game
            .create_task("A", "", TaskKind::Daily, Attribute::Health, 1, now)
            .unwrap();
        let b = game
            .create_task("B", "", TaskKind::Daily, Attribute::Health, 1, now + Duration::seconds(1))
            .unwrap();
        game.trigger_event(event("speed_runner"), now, &mut rng);
        game.complete_task(TaskKind::Daily, &a, now).unwrap();
        game.complete_task(TaskKind::Daily, &b, now + Duration::hours(2)).unwrap();
        let before = game.user().attributes.get(Attribute::Physical);

        game.update_active_events(now + Duration::hours(6));
        assert_eq!(game.user().attributes.get(Attribute::Physical), before + 10.0);
        assert_eq!(game.user().active_events[0].event, "double_points");
        assert_eq!(game.active_event_multiplier(), 2.0);
    }

    #[test]
    fn test_speed_runner_failure_never_goes_negative() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(6);
        game.state.user_data.attributes.set(Attribute::Creativity, 2.0);
        game.trigger_event(event("speed_runner"), now, &mut rng);
        game.update_active_events(now + Duration::hours(6));
        assert_eq!(game.user().attributes.get(Attribute::Creativity), 0.0);
        assert_eq!(game.user().event_history[0].challenge_completed, Some(false));
    }
}
