//! Common types and data structures

use crate::events::EventInstance;
use crate::utils::now_local;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// The six trainable attributes, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Health,
    Physical,
    Intelligence,
    Spiritual,
    Creativity,
    Resilience,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Health,
        Attribute::Physical,
        Attribute::Intelligence,
        Attribute::Spiritual,
        Attribute::Creativity,
        Attribute::Resilience,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Health => "Health",
            Attribute::Physical => "Physical",
            Attribute::Intelligence => "Intelligence",
            Attribute::Spiritual => "Spiritual",
            Attribute::Creativity => "Creativity",
            Attribute::Resilience => "Resilience",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute points. Always holds all six attributes once normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<Attribute, f64>);

impl Default for Attributes {
    fn default() -> Self {
        Self(Attribute::ALL.into_iter().map(|a| (a, 0.0)).collect())
    }
}

impl Attributes {
    pub fn get(&self, attr: Attribute) -> f64 {
        self.0.get(&attr).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, attr: Attribute, value: f64) {
        self.0.insert(attr, value.max(0.0));
    }

    pub fn add(&mut self, attr: Attribute, amount: f64) {
        let value = self.get(attr) + amount;
        self.set(attr, value);
    }

    /// Subtract, clamping at zero
    pub fn subtract(&mut self, attr: Attribute, amount: f64) {
        let value = self.get(attr) - amount;
        self.set(attr, value);
    }

    pub fn add_all(&mut self, amount: f64) {
        for attr in Attribute::ALL {
            self.add(attr, amount);
        }
    }

    pub fn subtract_all(&mut self, amount: f64) {
        for attr in Attribute::ALL {
            self.subtract(attr, amount);
        }
    }

    pub fn total(&self) -> f64 {
        Attribute::ALL.iter().map(|&a| self.get(a)).sum()
    }

    pub fn average(&self) -> f64 {
        self.total() / Attribute::ALL.len() as f64
    }

    /// Highest attribute; ties resolve to the earliest in display order
    pub fn highest(&self) -> (Attribute, f64) {
        let mut best = (Attribute::Health, self.get(Attribute::Health));
        for attr in Attribute::ALL.into_iter().skip(1) {
            let value = self.get(attr);
            if value > best.1 {
                best = (attr, value);
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL.into_iter().map(move |a| (a, self.get(a)))
    }

    /// Fill in missing attributes and clamp negatives left by hand-edited files
    pub fn normalize(&mut self) {
        for attr in Attribute::ALL {
            let value = self.get(attr);
            self.set(attr, if value.is_finite() { value } else { 0.0 });
        }
    }
}

// ============================================================================
// RANKS
// ============================================================================

/// Letter rank derived from attribute points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
    SS,
    SSS,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::E,
        Rank::D,
        Rank::C,
        Rank::B,
        Rank::A,
        Rank::S,
        Rank::SS,
        Rank::SSS,
    ];

    /// Minimum points for this rank
    pub fn threshold(self) -> f64 {
        (self.value() - 1) as f64 * crate::constants::POINTS_PER_RANK as f64
    }

    /// 1 for E through 8 for SSS
    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn next(self) -> Option<Rank> {
        Self::ALL.get(self as usize + 1).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::E => "E",
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::SS => "SS",
            Rank::SSS => "SSS",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// RARITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythical => "Mythical",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// TASKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Daily,
    Weekly,
    Special,
    Penalty,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Daily,
        TaskKind::Weekly,
        TaskKind::Special,
        TaskKind::Penalty,
    ];

    /// Kinds the player can create from the task form
    pub const CREATABLE: [TaskKind; 3] = [TaskKind::Daily, TaskKind::Weekly, TaskKind::Special];

    pub fn key(self) -> &'static str {
        match self {
            TaskKind::Daily => "daily",
            TaskKind::Weekly => "weekly",
            TaskKind::Special => "special",
            TaskKind::Penalty => "penalty",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Daily => "Daily Tasks",
            TaskKind::Weekly => "Weekly Tasks",
            TaskKind::Special => "Special Tasks",
            TaskKind::Penalty => "Penalty Tasks",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            TaskKind::Daily => "Daily",
            TaskKind::Weekly => "Weekly",
            TaskKind::Special => "Special",
            TaskKind::Penalty => "Penalty",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub attribute: Attribute,
    pub points: u32,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn reset(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }
}

/// All tasks, grouped by kind and keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBoard(BTreeMap<TaskKind, BTreeMap<String, Task>>);

impl Default for TaskBoard {
    fn default() -> Self {
        Self(TaskKind::ALL.into_iter().map(|k| (k, BTreeMap::new())).collect())
    }
}

impl TaskBoard {
    pub fn tasks(&self, kind: TaskKind) -> impl Iterator<Item = &Task> {
        self.0.get(&kind).into_iter().flat_map(|m| m.values())
    }

    pub fn tasks_mut(&mut self, kind: TaskKind) -> impl Iterator<Item = &mut Task> {
        self.0.get_mut(&kind).into_iter().flat_map(|m| m.values_mut())
    }

    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.0.values().flat_map(|m| m.values())
    }

    pub fn get(&self, kind: TaskKind, id: &str) -> Option<&Task> {
        self.0.get(&kind).and_then(|m| m.get(id))
    }

    pub fn get_mut(&mut self, kind: TaskKind, id: &str) -> Option<&mut Task> {
        self.0.get_mut(&kind).and_then(|m| m.get_mut(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.0.values().any(|m| m.contains_key(id))
    }

    pub fn insert(&mut self, task: Task) {
        self.0
            .entry(task.kind)
            .or_default()
            .insert(task.id.clone(), task);
    }

    pub fn remove(&mut self, kind: TaskKind, id: &str) -> Option<Task> {
        self.0.get_mut(&kind).and_then(|m| m.remove(id))
    }

    pub fn count(&self, kind: TaskKind) -> usize {
        self.0.get(&kind).map_or(0, |m| m.len())
    }

    pub fn completed_count(&self, kind: TaskKind) -> usize {
        self.tasks(kind).filter(|t| t.completed).count()
    }

    pub fn total(&self) -> usize {
        self.0.values().map(|m| m.len()).sum()
    }

    pub fn total_completed(&self) -> usize {
        self.all().filter(|t| t.completed).count()
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &Task> {
        self.all().filter(|t| !t.completed)
    }

    /// Make sure every kind has a bucket
    pub fn normalize(&mut self) {
        for kind in TaskKind::ALL {
            self.0.entry(kind).or_default();
        }
    }
}

// ============================================================================
// PLAYER STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub streak: f64,
    pub event: f64,
    pub job: f64,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            streak: 1.0,
            event: 1.0,
            job: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job: String,
    pub accepted_at: NaiveDateTime,
}

/// Where a penalty landed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attribute", rename_all = "lowercase")]
pub enum PenaltyTarget {
    Single(Attribute),
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRecord {
    pub level: u8,
    /// Total points removed (split evenly when the target is `All`)
    pub points: f64,
    pub target: PenaltyTarget,
    pub inactive_days: i64,
    pub incomplete_tasks: usize,
    pub applied_at: NaiveDateTime,
    /// Completing a task before this time counts the penalty as recovered
    pub recover_by: NaiveDateTime,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_points_earned: f64,
    pub tasks_completed: u64,
    pub max_streak: u32,
    pub achievements_unlocked: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayStats {
    pub completions: u32,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub attributes: Attributes,
    pub streak: u32,
    pub last_active: NaiveDateTime,
    pub last_completion_date: Option<NaiveDate>,
    pub completed_achievements: Vec<String>,
    pub current_job: Option<String>,
    pub job_history: Vec<JobRecord>,
    pub active_events: Vec<EventInstance>,
    pub event_history: Vec<EventInstance>,
    pub last_event_check: NaiveDateTime,
    pub last_dynamic_check: NaiveDateTime,
    pub multipliers: Multipliers,
    /// Streak multiplier bonus accumulated from dynamic event challenges
    pub bonus_streak: f64,
    /// Per-attribute gain multipliers granted by events
    pub attribute_multipliers: BTreeMap<Attribute, f64>,
    /// Flat gain multiplier from a dynamic task bonus
    pub task_multiplier: f64,
    /// Fraction (0..1) shaved off penalties by a recovery boost
    pub penalty_reduction: f64,
    pub makeup_deadline: Option<NaiveDateTime>,
    pub stats: Stats,
    /// Keyed by `YYYY-MM-DD`
    pub daily_stats: BTreeMap<String, DayStats>,
}

impl Default for UserData {
    fn default() -> Self {
        Self::new(now_local())
    }
}

impl UserData {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            attributes: Attributes::default(),
            streak: 0,
            last_active: now,
            last_completion_date: None,
            completed_achievements: Vec::new(),
            current_job: None,
            job_history: Vec::new(),
            active_events: Vec::new(),
            event_history: Vec::new(),
            last_event_check: now,
            last_dynamic_check: now,
            multipliers: Multipliers::default(),
            bonus_streak: 0.0,
            attribute_multipliers: BTreeMap::new(),
            task_multiplier: 1.0,
            penalty_reduction: 0.0,
            makeup_deadline: None,
            stats: Stats::default(),
            daily_stats: BTreeMap::new(),
        }
    }

    /// Combined multiplier applied to points earned for `attr`
    pub fn gain_multiplier(&self, attr: Attribute) -> f64 {
        let attr_mult = self.attribute_multipliers.get(&attr).copied().unwrap_or(1.0);
        self.multipliers.job
            * self.multipliers.event
            * self.multipliers.streak
            * attr_mult
            * self.task_multiplier
    }

    pub fn set_streak(&mut self, streak: u32) {
        self.streak = streak;
        self.stats.max_streak = self.stats.max_streak.max(streak);
    }
}

// ============================================================================
// NOTICES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
    /// Unlocks and rewards
    Celebrate,
}

/// Player-facing message produced by a game operation
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, body)
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, body)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, body)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, body)
    }

    pub fn celebrate(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Celebrate, title, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_never_negative() {
        let mut attrs = Attributes::default();
        attrs.add(Attribute::Physical, 3.0);
        attrs.subtract(Attribute::Physical, 10.0);
        assert_eq!(attrs.get(Attribute::Physical), 0.0);
        attrs.subtract_all(1.5);
        assert!(attrs.iter().all(|(_, v)| v >= 0.0));
    }

    #[test]
    fn test_highest_prefers_display_order_on_tie() {
        let mut attrs = Attributes::default();
        attrs.set(Attribute::Creativity, 5.0);
        attrs.set(Attribute::Physical, 5.0);
        assert_eq!(attrs.highest(), (Attribute::Physical, 5.0));
    }

    #[test]
    fn test_attribute_from_name_is_case_insensitive() {
        assert_eq!(Attribute::from_name("resilience"), Some(Attribute::Resilience));
        assert_eq!(Attribute::from_name(" Health "), Some(Attribute::Health));
        assert_eq!(Attribute::from_name("luck"), None);
    }

    #[test]
    fn test_rank_thresholds_are_monotone() {
        let thresholds: Vec<f64> = Rank::ALL.iter().map(|r| r.threshold()).collect();
        assert_eq!(thresholds, vec![0.0, 85.0, 170.0, 255.0, 340.0, 425.0, 510.0, 595.0]);
        assert_eq!(Rank::SSS.next(), None);
        assert_eq!(Rank::E.next(), Some(Rank::D));
        assert_eq!(Rank::SSS.value(), 8);
    }

    #[test]
    fn test_attributes_serialize_by_name() {
        let mut attrs = Attributes::default();
        attrs.set(Attribute::Health, 2.5);
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["Health"], 2.5);
        assert_eq!(json["Resilience"], 0.0);
    }

    #[test]
    fn test_task_board_normalize_fills_missing_kinds() {
        let mut board: TaskBoard = serde_json::from_str(r#"{"daily": {}}"#).unwrap();
        board.normalize();
        for kind in TaskKind::ALL {
            assert_eq!(board.count(kind), 0);
        }
        let json = serde_json::to_value(&board).unwrap();
        assert!(json.get("penalty").is_some());
    }

    #[test]
    fn test_gain_multiplier_combines_sources() {
        let mut user = UserData::default();
        user.multipliers.job = 1.5;
        user.multipliers.event = 2.0;
        user.attribute_multipliers.insert(Attribute::Health, 1.5);
        assert_eq!(user.gain_multiplier(Attribute::Health), 4.5);
        assert_eq!(user.gain_multiplier(Attribute::Physical), 3.0);
        user.multipliers.streak = 2.0;
        assert_eq!(user.gain_multiplier(Attribute::Physical), 6.0);
    }
}
