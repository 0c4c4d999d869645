//! Reusable task templates

use crate::engine::Game;
use crate::error::{GameError, GameResult};
use crate::types::{Attribute, TaskKind};
use crate::utils::now_local;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    pub task_type: TaskKind,
    pub attribute: Attribute,
    pub points: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "now_local")]
    pub created_at: NaiveDateTime,
}

impl TaskTemplate {
    /// Text matched by the template search box
    fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.tags.join(" ")).to_lowercase()
    }

    pub fn matches(&self, types: &[TaskKind], attributes: &[Attribute], search: &str) -> bool {
        if !types.is_empty() && !types.contains(&self.task_type) {
            return false;
        }
        if !attributes.is_empty() && !attributes.contains(&self.attribute) {
            return false;
        }
        let search = search.trim().to_lowercase();
        search.is_empty() || self.haystack().contains(&search)
    }
}

fn builtin(
    name: &str,
    attribute: Attribute,
    points: u32,
    description: &str,
    requirements: [&str; 2],
    tags: [&str; 2],
) -> TaskTemplate {
    TaskTemplate {
        name: name.to_string(),
        task_type: TaskKind::Daily,
        attribute,
        points,
        description: description.to_string(),
        requirements: requirements.iter().map(|s| s.to_string()).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        created_at: NaiveDateTime::default(),
    }
}

pub fn default_templates() -> BTreeMap<String, TaskTemplate> {
    BTreeMap::from([
        (
            "workout".to_string(),
            builtin(
                "Workout Session",
                Attribute::Physical,
                2,
                "Complete a workout session",
                ["30 minutes minimum", "Record exercises"],
                ["fitness", "health"],
            ),
        ),
        (
            "study".to_string(),
            builtin(
                "Study Session",
                Attribute::Intelligence,
                2,
                "Focused study session",
                ["45 minutes minimum", "Take notes"],
                ["education", "focus"],
            ),
        ),
        (
            "meditation".to_string(),
            builtin(
                "Meditation",
                Attribute::Spiritual,
                1,
                "Daily meditation practice",
                ["15 minutes minimum", "Find quiet space"],
                ["mindfulness", "peace"],
            ),
        ),
    ])
}

/// Split a comma separated tag field, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

impl Game {
    pub fn templates(&self) -> &BTreeMap<String, TaskTemplate> {
        &self.state.templates
    }

    pub fn add_template(&mut self, mut template: TaskTemplate, now: NaiveDateTime) -> GameResult<String> {
        template.name = template.name.trim().to_string();
        if template.name.is_empty() {
            return Err(GameError::EmptyName);
        }
        template.points = template.points.max(1);
        template.requirements.retain(|r| !r.trim().is_empty());
        template.created_at = now;

        let mut id = format!("template_{}", now.and_utc().timestamp_millis());
        while self.state.templates.contains_key(&id) {
            id.push('_');
        }
        info!(id = %id, name = %template.name, "template added");
        self.state.templates.insert(id.clone(), template);
        Ok(id)
    }

    pub fn delete_template(&mut self, id: &str) -> GameResult<TaskTemplate> {
        let removed = self
            .state
            .templates
            .remove(id)
            .ok_or_else(|| GameError::UnknownTemplate(id.to_string()))?;
        info!(id, "template deleted");
        Ok(removed)
    }

    pub fn filter_templates(
        &self,
        types: &[TaskKind],
        attributes: &[Attribute],
        search: &str,
    ) -> Vec<(&str, &TaskTemplate)> {
        self.state
            .templates
            .iter()
            .filter(|(_, t)| t.matches(types, attributes, search))
            .map(|(id, t)| (id.as_str(), t))
            .collect()
    }

    /// Create a task from a template. Returns the new task id.
    pub fn use_template(&mut self, id: &str, now: NaiveDateTime) -> GameResult<String> {
        let template = self
            .state
            .templates
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::UnknownTemplate(id.to_string()))?;
        self.insert_task(
            &template.name,
            &template.description,
            template.task_type,
            template.attribute,
            template.points,
            template.requirements,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{at, new_game};

    fn custom(name: &str, kind: TaskKind, tags: &str) -> TaskTemplate {
        TaskTemplate {
            name: name.to_string(),
            task_type: kind,
            attribute: Attribute::Creativity,
            points: 3,
            description: "Sketch something".to_string(),
            requirements: vec!["Pencil".to_string(), " ".to_string()],
            tags: parse_tags(tags),
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_parse_tags_drops_blanks() {
        assert_eq!(parse_tags(" art, ,drawing,"), vec!["art", "drawing"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_add_and_delete_template() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        assert_eq!(
            game.add_template(custom("  ", TaskKind::Daily, ""), now),
            Err(GameError::EmptyName)
        );
        let id = game.add_template(custom("Draw", TaskKind::Weekly, "art"), now).unwrap();
        assert!(id.starts_with("template_"));
        assert_eq!(game.templates()[&id].requirements, vec!["Pencil"]);
        assert_eq!(game.templates()[&id].created_at, now);

        let second = game.add_template(custom("Paint", TaskKind::Weekly, "art"), now).unwrap();
        assert_ne!(id, second);

        game.delete_template(&id).unwrap();
        assert!(matches!(
            game.delete_template(&id),
            Err(GameError::UnknownTemplate(_))
        ));
        assert_eq!(game.templates().len(), 4);
    }

    #[test]
    fn test_filter_templates() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        game.add_template(custom("Draw", TaskKind::Weekly, "art, sketch"), now).unwrap();

        assert_eq!(game.filter_templates(&[], &[], "").len(), 4);
        assert_eq!(game.filter_templates(&[TaskKind::Weekly], &[], "").len(), 1);
        assert_eq!(
            game.filter_templates(&[], &[Attribute::Physical, Attribute::Spiritual], "").len(),
            2
        );
        let found = game.filter_templates(&[], &[], "SKETCH");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.name, "Draw");
        let by_tag = game.filter_templates(&[TaskKind::Daily], &[], "focus");
        assert_eq!(by_tag[0].0, "study");
    }

    #[test]
    fn test_use_template_creates_task_once() {
        let now = at(2024, 5, 10, 9);
        let mut game = new_game(now);
        let task_id = game.use_template("workout", now).unwrap();
        let task = game.tasks().get(TaskKind::Daily, &task_id).unwrap();
        assert_eq!(task.points, 2);
        assert_eq!(task.requirements.len(), 2);

        assert!(matches!(
            game.use_template("workout", now),
            Err(GameError::Duplicate { .. })
        ));
        assert!(matches!(
            game.use_template("missing", now),
            Err(GameError::UnknownTemplate(_))
        ));
    }
}
