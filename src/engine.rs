//! Game state owner and the periodic update pipeline

use crate::achievements::ChainProgress;
use crate::constants::SAVE_FORMAT_VERSION;
use crate::dynamic_events::DynamicEvent;
use crate::templates::{default_templates, TaskTemplate};
use crate::types::{Notice, PenaltyRecord, TaskBoard, TaskKind, UserData};
use crate::utils::now_local;
use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

fn default_version() -> String {
    SAVE_FORMAT_VERSION.to_string()
}

/// The persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub user_data: UserData,
    #[serde(default)]
    pub tasks: TaskBoard,
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<String, TaskTemplate>,
    #[serde(default)]
    pub chains: BTreeMap<String, ChainProgress>,
    #[serde(default)]
    pub dynamic_events: Vec<DynamicEvent>,
    #[serde(default)]
    pub penalty_history: Vec<PenaltyRecord>,
    #[serde(default = "now_local")]
    pub saved_at: NaiveDateTime,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<NaiveDateTime>,
}

impl SaveState {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            user_data: UserData::new(now),
            tasks: TaskBoard::default(),
            templates: default_templates(),
            chains: BTreeMap::new(),
            dynamic_events: Vec::new(),
            penalty_history: Vec::new(),
            saved_at: now,
            version: default_version(),
            exported_at: None,
        }
    }

    /// Repair documents written by older or hand-edited saves
    pub fn normalize(&mut self) {
        self.tasks.normalize();
        self.user_data.attributes.normalize();
        let max = self.user_data.stats.max_streak.max(self.user_data.streak);
        self.user_data.stats.max_streak = max;
    }
}

/// Single owner of the save state. All game rules are `impl Game` blocks
/// spread across the domain modules.
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) state: SaveState,
}

impl Game {
    pub fn new(mut state: SaveState) -> Self {
        state.normalize();
        let mut game = Self { state };
        game.refresh_effects();
        game
    }

    pub fn state(&self) -> &SaveState {
        &self.state
    }

    pub fn user(&self) -> &UserData {
        &self.state.user_data
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.state.tasks
    }

    /// Replace the whole state (import, restore, reset)
    pub fn replace_state(&mut self, state: SaveState) {
        *self = Self::new(state);
    }

    /// Runs on startup and whenever the clock crosses an hour or a day.
    pub fn tick(&mut self, now: NaiveDateTime, rng: &mut impl Rng) -> Vec<Notice> {
        let mut notices = Vec::new();
        notices.extend(self.update_tasks(now, rng));
        notices.extend(self.check_for_events(now, rng));
        notices.extend(self.update_active_events(now));
        notices.extend(self.check_achievements());
        notices.extend(self.check_for_new_events(now, rng));
        notices.extend(self.update_dynamic_events(now));
        notices.extend(self.check_chains(now));
        debug!(notices = notices.len(), "tick finished");
        notices
    }

    /// Checks that follow any change in points or streak
    pub(crate) fn after_progress(&mut self, now: NaiveDateTime) -> Vec<Notice> {
        let mut notices = self.check_achievements();
        notices.extend(self.update_dynamic_events(now));
        notices.extend(self.check_chains(now));
        notices
    }

    /// A penalty is active while a penalty task is open or a penalty can
    /// still be recovered from.
    pub fn has_active_penalty(&self, now: NaiveDateTime) -> bool {
        self.state.tasks.tasks(TaskKind::Penalty).any(|t| !t.completed)
            || self
                .state
                .penalty_history
                .iter()
                .any(|p| !p.completed && now <= p.recover_by)
    }
}

/// Pick one element uniformly. `items` must not be empty.
pub(crate) fn pick<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    pub fn new_game(now: NaiveDateTime) -> Game {
        Game::new(SaveState::new(now))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::types::Attribute;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_state_has_default_templates_and_all_kinds() {
        let game = new_game(at(2024, 5, 10, 9));
        assert_eq!(game.state().templates.len(), 3);
        assert_eq!(game.tasks().total(), 0);
        assert_eq!(game.state().version, "1.0");
    }

    #[test]
    fn test_save_state_roundtrips_through_json() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.create_task("Run", "", TaskKind::Daily, Attribute::Physical, 1, now)
            .unwrap();
        let json = serde_json::to_string(game.state()).unwrap();
        let back: SaveState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, game.state());
    }

    #[test]
    fn test_minimal_document_loads_with_defaults() {
        let json = r#"{"user_data": {"attributes": {"Health": 4}, "streak": 2}}"#;
        let state: SaveState = serde_json::from_str(json).unwrap();
        let game = Game::new(state);
        assert_eq!(game.user().attributes.get(Attribute::Health), 4.0);
        assert_eq!(game.user().attributes.get(Attribute::Resilience), 0.0);
        assert_eq!(game.user().stats.max_streak, 2);
        assert_eq!(game.tasks().count(TaskKind::Penalty), 0);
    }

    #[test]
    fn test_tick_is_quiet_for_fresh_player() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let mut rng = StdRng::seed_from_u64(7);
        game.tick(now, &mut rng);
        assert_eq!(game.user().attributes.total(), 0.0);
        assert!(game.state().penalty_history.is_empty());
    }
}
