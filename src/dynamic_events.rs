//! Procedurally generated events with conditions and bonus challenges

use crate::constants::{DYNAMIC_CHALLENGE_CHANCE, DYNAMIC_EVENT_CHANCE, EVENT_CHECK_INTERVAL_SECS};
use crate::engine::{pick, Game};
use crate::types::{Attribute, Attributes, Notice, Rarity, TaskKind};
use chrono::{Duration, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, info};

const PREFIXES: [&str; 10] = [
    "Mysterious", "Ancient", "Divine", "Chaotic", "Harmonious",
    "Celestial", "Shadow", "Elemental", "Temporal", "Ethereal",
];

const CORE_NAMES: [&str; 10] = [
    "Blessing", "Challenge", "Trial", "Awakening", "Convergence",
    "Phenomenon", "Revelation", "Surge", "Manifestation", "Resonance",
];

const DURATIONS: [i64; 5] = [1, 3, 6, 12, 24];

const STREAK_MILESTONES: [u32; 5] = [7, 14, 30, 60, 90];

/// Rarities a dynamic event can roll, with their weights
pub const DYNAMIC_RARITIES: [(Rarity, u32); 5] = [
    (Rarity::Common, 50),
    (Rarity::Uncommon, 30),
    (Rarity::Rare, 15),
    (Rarity::Epic, 4),
    (Rarity::Legendary, 1),
];

/// Hex color stored with each generated event
pub fn rarity_hex(rarity: Rarity) -> &'static str {
    match rarity {
        Rarity::Common => "#808080",
        Rarity::Uncommon => "#00FF00",
        Rarity::Rare => "#0000FF",
        Rarity::Epic => "#800080",
        Rarity::Legendary => "#FFD700",
        Rarity::Mythical => "#FF4500",
    }
}

fn reward_scale(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 1.0,
        Rarity::Uncommon => 1.5,
        Rarity::Rare => 2.0,
        Rarity::Epic => 3.0,
        Rarity::Legendary | Rarity::Mythical => 5.0,
    }
}

// ============================================================================
// EFFECTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    AttributeBoost,
    MultiAttribute,
    TaskBonus,
    StreakMultiplier,
    RecoveryBoost,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::AttributeBoost,
        EffectKind::MultiAttribute,
        EffectKind::TaskBonus,
        EffectKind::StreakMultiplier,
        EffectKind::RecoveryBoost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::AttributeBoost => "Attribute Boost",
            EffectKind::MultiAttribute => "Multi-Attribute Enhancement",
            EffectKind::TaskBonus => "Task Bonus",
            EffectKind::StreakMultiplier => "Streak Power",
            EffectKind::RecoveryBoost => "Recovery Boost",
        }
    }

    /// Magnitude in percent
    pub fn magnitude_range(self) -> RangeInclusive<u32> {
        match self {
            EffectKind::AttributeBoost => 20..=100,
            EffectKind::MultiAttribute => 10..=50,
            EffectKind::TaskBonus => 25..=75,
            EffectKind::StreakMultiplier => 15..=60,
            EffectKind::RecoveryBoost => 20..=50,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            EffectKind::AttributeBoost => "⚡",
            EffectKind::MultiAttribute => "✨",
            EffectKind::TaskBonus => "🎯",
            EffectKind::StreakMultiplier => "🔥",
            EffectKind::RecoveryBoost => "💫",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEffect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default)]
    pub attribute: Option<Attribute>,
    pub magnitude: u32,
    pub description: String,
}

impl DynamicEffect {
    /// Gain multiplier granted by this effect
    pub fn factor(&self) -> f64 {
        1.0 + self.magnitude as f64 / 100.0
    }
}

// ============================================================================
// CONDITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFamily {
    TimeBased,
    StreakBased,
    PerformanceBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum EventCondition {
    MorningRush,
    NightOwl,
    GoldenHour,
    StreakMaintained,
    StreakMilestone,
    PerfectDay,
    AttributeThreshold { attribute: Attribute, threshold: f64 },
}

impl EventCondition {
    pub fn family(&self) -> ConditionFamily {
        match self {
            EventCondition::MorningRush | EventCondition::NightOwl | EventCondition::GoldenHour => {
                ConditionFamily::TimeBased
            }
            EventCondition::StreakMaintained | EventCondition::StreakMilestone => {
                ConditionFamily::StreakBased
            }
            EventCondition::PerfectDay | EventCondition::AttributeThreshold { .. } => {
                ConditionFamily::PerformanceBased
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            EventCondition::MorningRush => "Active during morning hours (6 AM - 10 AM)".into(),
            EventCondition::NightOwl => "Active during night hours (10 PM - 2 AM)".into(),
            EventCondition::GoldenHour => "Active for one hour".into(),
            EventCondition::StreakMaintained => "Remains active while streak is maintained".into(),
            EventCondition::StreakMilestone => "Activates at streak milestones".into(),
            EventCondition::PerfectDay => "Requires completing all daily tasks".into(),
            EventCondition::AttributeThreshold {
                attribute,
                threshold,
            } => format!("Reach {} points in {}", threshold, attribute),
        }
    }
}

// ============================================================================
// BONUS CHALLENGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeWindow {
    pub fn label(&self) -> String {
        format!("{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        (self.start_hour..self.end_hour).contains(&time.hour())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusChallenge {
    TaskStreak { count: u32 },
    AttributeGain { attribute: Attribute, count: u32, baseline: f64 },
    PerfectTiming { windows: Vec<TimeWindow> },
}

impl BonusChallenge {
    pub fn description(&self) -> String {
        match self {
            BonusChallenge::TaskStreak { count } => {
                format!("Complete all tasks for {} days", count)
            }
            BonusChallenge::AttributeGain {
                attribute, count, ..
            } => format!("Gain {} points in {}", count, attribute),
            BonusChallenge::PerfectTiming { windows } => format!(
                "Complete tasks within specific time windows: {}",
                windows.iter().map(TimeWindow::label).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusReward {
    pub attribute_points: u32,
    pub streak_bonus: f64,
    pub description: String,
}

impl BonusReward {
    pub fn for_rarity(rarity: Rarity) -> Self {
        let scale = reward_scale(rarity);
        let attribute_points = (10.0 * scale) as u32;
        let streak_bonus = (0.1 * scale * 100.0).round() / 100.0;
        Self {
            attribute_points,
            streak_bonus,
            description: format!(
                "Bonus: +{} to all attributes and {}x streak multiplier",
                attribute_points, streak_bonus
            ),
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEvent {
    pub id: String,
    pub name: String,
    pub effect: DynamicEffect,
    pub condition: EventCondition,
    pub duration_hours: i64,
    pub rarity: Rarity,
    pub color: String,
    pub icon: String,
    pub created_at: NaiveDateTime,
    /// Condition met and effect in force
    #[serde(default)]
    pub triggered: bool,
    #[serde(default)]
    pub challenge: Option<BonusChallenge>,
    #[serde(default)]
    pub bonus_reward: Option<BonusReward>,
}

impl DynamicEvent {
    pub fn ends_at(&self) -> NaiveDateTime {
        self.created_at + Duration::hours(self.duration_hours)
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.ends_at() <= now
    }
}

/// Weighted rarity roll
pub fn select_rarity(rng: &mut impl Rng) -> Rarity {
    let total: u32 = DYNAMIC_RARITIES.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for (rarity, weight) in DYNAMIC_RARITIES {
        if roll < weight {
            return rarity;
        }
        roll -= weight;
    }
    Rarity::Common
}

fn generate_effect(rng: &mut impl Rng) -> DynamicEffect {
    let kind = *pick(rng, &EffectKind::ALL);
    let magnitude = rng.random_range(kind.magnitude_range());
    let (attribute, description) = match kind {
        EffectKind::AttributeBoost => {
            let attr = *pick(rng, &Attribute::ALL);
            (Some(attr), format!("Increases {} gains by {}%", attr, magnitude))
        }
        EffectKind::MultiAttribute => {
            (None, format!("Increases all attribute gains by {}%", magnitude))
        }
        EffectKind::TaskBonus => (None, format!("Completed tasks give {}% more points", magnitude)),
        EffectKind::StreakMultiplier => {
            (None, format!("Streak multiplier increased by {}%", magnitude))
        }
        EffectKind::RecoveryBoost => (None, format!("Reduces penalty duration by {}%", magnitude)),
    };
    DynamicEffect {
        kind,
        attribute,
        magnitude,
        description,
    }
}

fn generate_condition(attributes: &Attributes, rng: &mut impl Rng) -> EventCondition {
    let family = *pick(
        rng,
        &[
            ConditionFamily::TimeBased,
            ConditionFamily::StreakBased,
            ConditionFamily::PerformanceBased,
        ],
    );
    match family {
        ConditionFamily::TimeBased => pick(
            rng,
            &[
                EventCondition::MorningRush,
                EventCondition::NightOwl,
                EventCondition::GoldenHour,
            ],
        )
        .clone(),
        ConditionFamily::StreakBased => {
            if rng.random_bool(0.5) {
                EventCondition::StreakMaintained
            } else {
                EventCondition::StreakMilestone
            }
        }
        ConditionFamily::PerformanceBased => {
            if rng.random_bool(0.5) {
                EventCondition::PerfectDay
            } else {
                let attribute = *pick(rng, &Attribute::ALL);
                let threshold = attributes.get(attribute) + rng.random_range(20..=50) as f64;
                EventCondition::AttributeThreshold {
                    attribute,
                    threshold: threshold.round(),
                }
            }
        }
    }
}

fn generate_challenge(attributes: &Attributes, rng: &mut impl Rng) -> BonusChallenge {
    match rng.random_range(0..3) {
        0 => BonusChallenge::TaskStreak {
            count: rng.random_range(2..=5),
        },
        1 => {
            let attribute = *pick(rng, &Attribute::ALL);
            BonusChallenge::AttributeGain {
                attribute,
                count: rng.random_range(10..=30),
                baseline: attributes.get(attribute),
            }
        }
        _ => {
            let windows = (0..rng.random_range(2..=4))
                .map(|_| {
                    let start_hour = rng.random_range(6..=20);
                    TimeWindow {
                        start_hour,
                        end_hour: start_hour + rng.random_range(1..=3),
                    }
                })
                .collect();
            BonusChallenge::PerfectTiming { windows }
        }
    }
}

/// Roll a complete event from the player's current attributes
pub fn generate_event(attributes: &Attributes, now: NaiveDateTime, rng: &mut impl Rng) -> DynamicEvent {
    let name = format!("{} {}", pick(rng, &PREFIXES), pick(rng, &CORE_NAMES));
    let effect = generate_effect(rng);
    let condition = generate_condition(attributes, rng);
    let duration_hours = *pick(rng, &DURATIONS);
    let rarity = select_rarity(rng);

    let (challenge, bonus_reward) = if rng.random::<f64>() < DYNAMIC_CHALLENGE_CHANCE {
        (
            Some(generate_challenge(attributes, rng)),
            Some(BonusReward::for_rarity(rarity)),
        )
    } else {
        (None, None)
    };

    DynamicEvent {
        id: format!("event_{}", now.and_utc().timestamp_millis()),
        name,
        icon: effect.kind.icon().to_string(),
        effect,
        condition,
        duration_hours,
        rarity,
        color: rarity_hex(rarity).to_string(),
        created_at: now,
        triggered: false,
        challenge,
        bonus_reward,
    }
}

impl Game {
    /// At most once per hour, with a 30% chance, add a generated event
    pub fn check_for_new_events(&mut self, now: NaiveDateTime, rng: &mut impl Rng) -> Vec<Notice> {
        let since = now - self.state.user_data.last_dynamic_check;
        if since.num_seconds() < EVENT_CHECK_INTERVAL_SECS {
            return Vec::new();
        }
        self.state.user_data.last_dynamic_check = now;
        if rng.random::<f64>() >= DYNAMIC_EVENT_CHANCE {
            return Vec::new();
        }

        let mut event = generate_event(&self.state.user_data.attributes, now, rng);
        while self.state.dynamic_events.iter().any(|e| e.id == event.id) {
            event.id.push('_');
        }
        info!(id = %event.id, name = %event.name, rarity = %event.rarity, "dynamic event generated");
        let notice = Notice::celebrate(
            format!("{} {}", event.icon, event.name),
            format!("{} Condition: {}", event.effect.description, event.condition.description()),
        );
        self.state.dynamic_events.push(event);
        vec![notice]
    }

    pub fn check_event_completion(&self, event: &DynamicEvent, now: NaiveDateTime) -> bool {
        let user = &self.state.user_data;
        match &event.condition {
            EventCondition::MorningRush => (6..=10).contains(&now.hour()),
            EventCondition::NightOwl => now.hour() >= 22 || now.hour() <= 2,
            EventCondition::GoldenHour => true,
            EventCondition::StreakMaintained => user.streak > 0,
            EventCondition::StreakMilestone => STREAK_MILESTONES.contains(&user.streak),
            EventCondition::PerfectDay => {
                let mut daily = self.state.tasks.tasks(TaskKind::Daily).peekable();
                daily.peek().is_some() && daily.all(|t| t.completed)
            }
            EventCondition::AttributeThreshold {
                attribute,
                threshold,
            } => user.attributes.get(*attribute) >= *threshold,
        }
    }

    fn bonus_challenge_met(&self, event: &DynamicEvent) -> bool {
        let user = &self.state.user_data;
        match &event.challenge {
            Some(BonusChallenge::TaskStreak { count }) => user.streak >= *count,
            Some(BonusChallenge::AttributeGain {
                attribute,
                count,
                baseline,
            }) => user.attributes.get(*attribute) >= baseline + *count as f64,
            Some(BonusChallenge::PerfectTiming { windows }) => {
                let (start, end) = (event.created_at, event.ends_at());
                let completions: Vec<NaiveDateTime> = self
                    .state
                    .tasks
                    .all()
                    .filter_map(|t| t.completed_at)
                    .filter(|at| *at >= start && *at <= end)
                    .collect();
                windows
                    .iter()
                    .all(|w| completions.iter().any(|at| w.contains(*at)))
            }
            None => false,
        }
    }

    /// Trigger events whose condition holds, settle and drop expired ones
    pub fn update_dynamic_events(&mut self, now: NaiveDateTime) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut changed = false;

        let pending: Vec<usize> = (0..self.state.dynamic_events.len())
            .filter(|&i| {
                let event = &self.state.dynamic_events[i];
                !event.triggered && !event.is_expired(now) && self.check_event_completion(event, now)
            })
            .collect();
        for i in pending {
            let event = &mut self.state.dynamic_events[i];
            event.triggered = true;
            changed = true;
            debug!(id = %event.id, "dynamic event triggered");
            notices.push(Notice::success(
                format!("{} {} is active", event.icon, event.name),
                event.effect.description.clone(),
            ));
        }

        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.dynamic_events)
            .into_iter()
            .partition(|e| e.is_expired(now));
        self.state.dynamic_events = active;
        for event in expired {
            changed = true;
            debug!(id = %event.id, "dynamic event expired");
            let Some(reward) = event.bonus_reward.as_ref() else {
                continue;
            };
            if self.bonus_challenge_met(&event) {
                let user = &mut self.state.user_data;
                user.attributes.add_all(reward.attribute_points as f64);
                user.bonus_streak += reward.streak_bonus;
                info!(id = %event.id, "bonus challenge completed");
                notices.push(Notice::celebrate(
                    format!("{} bonus challenge complete", event.name),
                    reward.description.clone(),
                ));
            }
        }

        if changed {
            self.refresh_effects();
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_event(condition: EventCondition, kind: EffectKind, now: NaiveDateTime) -> DynamicEvent {
        DynamicEvent {
            id: "event_test".into(),
            name: "Shadow Surge".into(),
            effect: DynamicEffect {
                kind,
                attribute: Some(Attribute::Creativity),
                magnitude: 50,
                description: String::new(),
            },
            condition,
            duration_hours: 3,
            rarity: Rarity::Rare,
            color: rarity_hex(Rarity::Rare).into(),
            icon: kind.icon().into(),
            created_at: now,
            triggered: false,
            challenge: None,
            bonus_reward: None,
        }
    }

    #[test]
    fn test_generated_events_stay_in_bounds() {
        let now = at(2024, 5, 10, 9);
        let mut attrs = Attributes::default();
        attrs.set(Attribute::Health, 40.0);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let event = generate_event(&attrs, now, &mut rng);
            assert!(event.effect.kind.magnitude_range().contains(&event.effect.magnitude));
            assert!(DURATIONS.contains(&event.duration_hours));
            assert_eq!(event.color, rarity_hex(event.rarity));
            assert_eq!(event.name.split(' ').count(), 2);
            assert_eq!(event.challenge.is_some(), event.bonus_reward.is_some());
            assert_eq!(
                event.effect.attribute.is_some(),
                event.effect.kind == EffectKind::AttributeBoost
            );
            if let EventCondition::AttributeThreshold { attribute, threshold } = &event.condition {
                let base = attrs.get(*attribute);
                assert!(*threshold >= base + 20.0 && *threshold <= base + 50.0);
            }
            if let Some(BonusChallenge::PerfectTiming { windows }) = &event.challenge {
                assert!((2..=4).contains(&windows.len()));
                assert!(windows.iter().all(|w| w.end_hour > w.start_hour && w.end_hour <= 23));
            }
        }
    }

    #[test]
    fn test_rarity_weights_order_frequencies() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0u32; 5];
        for _ in 0..10_000 {
            let rarity = select_rarity(&mut rng);
            let idx = DYNAMIC_RARITIES.iter().position(|(r, _)| *r == rarity).unwrap();
            counts[idx] += 1;
        }
        assert!(counts[0] > counts[1] && counts[1] > counts[2] && counts[2] > counts[3]);
        assert!(counts[4] < 300);
    }

    #[test]
    fn test_bonus_reward_scales_with_rarity() {
        let common = BonusReward::for_rarity(Rarity::Common);
        assert_eq!(common.attribute_points, 10);
        assert_eq!(common.streak_bonus, 0.1);
        let uncommon = BonusReward::for_rarity(Rarity::Uncommon);
        assert_eq!(uncommon.attribute_points, 15);
        assert_eq!(uncommon.streak_bonus, 0.15);
        assert_eq!(
            BonusReward::for_rarity(Rarity::Legendary).description,
            "Bonus: +50 to all attributes and 0.5x streak multiplier"
        );
    }

    #[test]
    fn test_time_conditions() {
        let game = new_game(at(2024, 5, 10, 9));
        let morning = sample_event(EventCondition::MorningRush, EffectKind::TaskBonus, at(2024, 5, 10, 9));
        assert!(game.check_event_completion(&morning, at(2024, 5, 10, 7)));
        assert!(!game.check_event_completion(&morning, at(2024, 5, 10, 11)));
        let owl = sample_event(EventCondition::NightOwl, EffectKind::TaskBonus, at(2024, 5, 10, 9));
        assert!(game.check_event_completion(&owl, at(2024, 5, 10, 23)));
        assert!(game.check_event_completion(&owl, at(2024, 5, 11, 1)));
        assert!(!game.check_event_completion(&owl, at(2024, 5, 10, 12)));
    }

    #[test]
    fn test_streak_conditions() {
        let mut game = new_game(at(2024, 5, 10, 9));
        let now = at(2024, 5, 10, 9);
        let milestone = sample_event(EventCondition::StreakMilestone, EffectKind::TaskBonus, now);
        let maintained = sample_event(EventCondition::StreakMaintained, EffectKind::TaskBonus, now);
        assert!(!game.check_event_completion(&maintained, now));
        game.state.user_data.set_streak(14);
        assert!(game.check_event_completion(&milestone, now));
        assert!(game.check_event_completion(&maintained, now));
        game.state.user_data.set_streak(15);
        assert!(!game.check_event_completion(&milestone, now));
    }

    #[test]
    fn test_effect_applies_once_and_clears_on_expiry() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.dynamic_events.push(sample_event(
            EventCondition::GoldenHour,
            EffectKind::AttributeBoost,
            now,
        ));
        let notices = game.update_dynamic_events(now);
        assert_eq!(notices.len(), 1);
        assert_eq!(game.user().attribute_multipliers.get(&Attribute::Creativity), Some(&1.5));
        assert!(game.update_dynamic_events(now + Duration::hours(1)).is_empty());

        game.update_dynamic_events(now + Duration::hours(3));
        assert!(game.state().dynamic_events.is_empty());
        assert!(game.user().attribute_multipliers.is_empty());
    }

    #[test]
    fn test_recovery_boost_sets_penalty_reduction() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.dynamic_events.push(sample_event(
            EventCondition::GoldenHour,
            EffectKind::RecoveryBoost,
            now,
        ));
        game.update_dynamic_events(now);
        assert_eq!(game.user().penalty_reduction, 0.5);
    }

    #[test]
    fn test_bonus_challenge_rewards_on_expiry() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut event = sample_event(EventCondition::GoldenHour, EffectKind::TaskBonus, now);
        event.challenge = Some(BonusChallenge::AttributeGain {
            attribute: Attribute::Physical,
            count: 10,
            baseline: 0.0,
        });
        event.bonus_reward = Some(BonusReward::for_rarity(Rarity::Common));
        game.state.dynamic_events.push(event);
        game.update_dynamic_events(now);
        game.state.user_data.attributes.set(Attribute::Physical, 12.0);

        game.update_dynamic_events(now + Duration::hours(3));
        assert_eq!(game.user().attributes.get(Attribute::Physical), 22.0);
        assert_eq!(game.user().bonus_streak, 0.1);
        assert_eq!(game.user().multipliers.streak, 1.1);
        assert_eq!(game.user().task_multiplier, 1.0);
    }

    #[test]
    fn test_expired_task_bonus_does_not_boost_completion() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.state.dynamic_events.push(sample_event(
            EventCondition::GoldenHour,
            EffectKind::TaskBonus,
            now,
        ));
        game.update_dynamic_events(now);
        assert_eq!(game.user().task_multiplier, 1.5);

        let id = game
            .create_task("Sketch", "", TaskKind::Daily, Attribute::Creativity, 1, now)
            .unwrap();
        let done = game
            .complete_task(TaskKind::Daily, &id, now + Duration::hours(4))
            .unwrap();
        assert_eq!(done.points, 1.0);
        assert!(game.state().dynamic_events.is_empty());
        assert_eq!(game.user().task_multiplier, 1.0);
    }

    #[test]
    fn test_new_events_checked_hourly() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(17);
        assert!(game.check_for_new_events(now + Duration::minutes(59), &mut rng).is_empty());
        let mut hour = now;
        for _ in 0..48 {
            hour += Duration::hours(1);
            game.check_for_new_events(hour, &mut rng);
        }
        assert_eq!(game.user().last_dynamic_check, hour);
        assert!(!game.state().dynamic_events.is_empty());
    }
}
