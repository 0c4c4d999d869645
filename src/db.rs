//! SQLite mirror of the player profile plus the completion log

use crate::engine::SaveState;
use crate::error::StoreResult;
use crate::tasks::Completion;
use crate::types::{Attribute, Attributes, JobRecord, Multipliers, TaskBoard, TaskKind};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, warn};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Profile row as stored in the `profiles` table
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub username: String,
    pub attributes: Attributes,
    pub tasks: TaskBoard,
    pub streak: u32,
    pub last_active: NaiveDateTime,
    pub achievements: Vec<String>,
    pub job_history: Vec<JobRecord>,
    pub multipliers: Multipliers,
}

impl Profile {
    /// Rebuild a save from the mirrored columns. Events, templates and
    /// history not mirrored here start fresh.
    pub fn into_state(self, now: NaiveDateTime) -> SaveState {
        let mut state = SaveState::new(now);
        let user = &mut state.user_data;
        user.attributes = self.attributes;
        user.set_streak(self.streak);
        user.last_active = self.last_active;
        user.completed_achievements = self.achievements;
        user.current_job = self.job_history.last().map(|r| r.job.clone());
        user.job_history = self.job_history;
        user.multipliers = self.multipliers;
        state.tasks = self.tasks;
        state.normalize();
        state
    }
}

/// One row of the completion log
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub task_id: String,
    pub name: String,
    pub kind: TaskKind,
    pub attribute: Attribute,
    pub points: f64,
    pub completed_at: NaiveDateTime,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    #[cfg(test)]
    fn open_in_memory() -> StoreResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                attributes TEXT NOT NULL,
                tasks TEXT NOT NULL,
                streak INTEGER NOT NULL DEFAULT 0,
                last_active TEXT NOT NULL,
                achievements TEXT NOT NULL,
                job_history TEXT NOT NULL,
                multipliers TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id TEXT NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                attribute TEXT NOT NULL,
                points REAL NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_at ON completions(completed_at);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert or update the profile for `username`
    pub fn save_profile(&self, username: &str, state: &SaveState) -> StoreResult<()> {
        let user = &state.user_data;
        self.conn.execute(
            "INSERT INTO profiles (username, attributes, tasks, streak, last_active, achievements, job_history, multipliers)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(username) DO UPDATE SET
                attributes = excluded.attributes,
                tasks = excluded.tasks,
                streak = excluded.streak,
                last_active = excluded.last_active,
                achievements = excluded.achievements,
                job_history = excluded.job_history,
                multipliers = excluded.multipliers",
            params![
                username,
                serde_json::to_string(&user.attributes)?,
                serde_json::to_string(&state.tasks)?,
                user.streak,
                user.last_active.format(TIME_FORMAT).to_string(),
                serde_json::to_string(&user.completed_achievements)?,
                serde_json::to_string(&user.job_history)?,
                serde_json::to_string(&user.multipliers)?,
            ],
        )?;
        debug!(username, "Profile saved");
        Ok(())
    }

    pub fn load_profile(&self, username: &str) -> StoreResult<Option<Profile>> {
        let row = self
            .conn
            .query_row(
                "SELECT attributes, tasks, streak, last_active, achievements, job_history, multipliers
                 FROM profiles WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((attributes, tasks, streak, last_active, achievements, jobs, multipliers)) = row
        else {
            return Ok(None);
        };
        Ok(Some(Profile {
            username: username.to_string(),
            attributes: serde_json::from_str(&attributes)?,
            tasks: serde_json::from_str(&tasks)?,
            streak,
            last_active: parse_time(&last_active)?,
            achievements: serde_json::from_str(&achievements)?,
            job_history: serde_json::from_str(&jobs)?,
            multipliers: serde_json::from_str(&multipliers)?,
        }))
    }

    pub fn log_completion(&self, completion: &Completion, at: NaiveDateTime) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO completions (task_id, name, kind, attribute, points, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                completion.task_id,
                completion.name,
                completion.kind.key(),
                completion.attribute.name(),
                completion.points,
                at.format(TIME_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// Completions at or after `since`, oldest first. Rows that no longer
    /// parse are skipped.
    pub fn completions_since(&self, since: NaiveDateTime) -> StoreResult<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT task_id, name, kind, attribute, points, completed_at
             FROM completions WHERE completed_at >= ?1 ORDER BY completed_at, id",
        )?;
        let rows = stmt
            .query_map(params![since.format(TIME_FORMAT).to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let records = rows
            .into_iter()
            .filter_map(|(task_id, name, kind, attribute, points, at)| {
                let record = CompletionRecord {
                    kind: TaskKind::ALL.into_iter().find(|k| k.key() == kind)?,
                    attribute: Attribute::from_name(&attribute)?,
                    completed_at: parse_time(&at).ok()?,
                    task_id,
                    name,
                    points,
                };
                Some(record)
            })
            .collect();
        Ok(records)
    }

    pub fn completion_count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM completions", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn clear_completions(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM completions", [])?;
        Ok(())
    }

    pub fn get_db_version(&self) -> StoreResult<Option<String>> {
        let version = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = 'version'", [], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(version)
    }

    pub fn set_db_version(&self, version: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![version],
        )?;
        Ok(())
    }
}

fn parse_time(text: &str) -> StoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIME_FORMAT).map_err(|e| {
        warn!(value = text, error = %e, "Bad timestamp in database");
        crate::error::StoreError::InvalidFormat(format!("bad timestamp `{text}`"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::at;
    use chrono::Duration;

    fn completion(name: &str, kind: TaskKind) -> Completion {
        Completion {
            task_id: format!("{}_1", kind),
            name: name.to_string(),
            kind,
            attribute: Attribute::Physical,
            points: 1.5,
            notices: Vec::new(),
        }
    }

    #[test]
    fn test_profile_upsert() {
        let db = Database::open_in_memory().unwrap();
        let now = at(2024, 5, 10, 9);
        assert_eq!(db.load_profile("player").unwrap(), None);

        let mut state = SaveState::new(now);
        state.user_data.attributes.set(Attribute::Health, 3.0);
        state.user_data.streak = 4;
        db.save_profile("player", &state).unwrap();

        state.user_data.streak = 5;
        state.user_data.completed_achievements.push("first_step".into());
        db.save_profile("player", &state).unwrap();

        let profile = db.load_profile("player").unwrap().unwrap();
        assert_eq!(profile.streak, 5);
        assert_eq!(profile.attributes.get(Attribute::Health), 3.0);
        assert_eq!(profile.achievements, vec!["first_step"]);
        assert_eq!(profile.last_active, now);
        assert_eq!(profile.tasks, state.tasks);
    }

    #[test]
    fn test_profile_into_state() {
        let db = Database::open_in_memory().unwrap();
        let then = at(2024, 5, 1, 8);
        let mut state = SaveState::new(then);
        state.user_data.attributes.set(Attribute::Resilience, 60.0);
        state.user_data.streak = 6;
        state.user_data.job_history.push(JobRecord {
            job: "Stray Dog".into(),
            accepted_at: then,
        });
        db.save_profile("player", &state).unwrap();

        let now = at(2024, 5, 10, 9);
        let rebuilt = db.load_profile("player").unwrap().unwrap().into_state(now);
        let user = &rebuilt.user_data;
        assert_eq!(user.attributes.get(Attribute::Resilience), 60.0);
        assert_eq!(user.streak, 6);
        assert_eq!(user.stats.max_streak, 6);
        assert_eq!(user.current_job.as_deref(), Some("Stray Dog"));
        assert_eq!(user.last_active, then);
        assert_eq!(rebuilt.saved_at, now);
    }

    #[test]
    fn test_completion_log() {
        let db = Database::open_in_memory().unwrap();
        let now = at(2024, 5, 10, 9);
        db.log_completion(&completion("Run", TaskKind::Daily), now - Duration::days(3))
            .unwrap();
        db.log_completion(&completion("Read", TaskKind::Weekly), now).unwrap();
        db.log_completion(&completion("Swim", TaskKind::Special), now + Duration::hours(1))
            .unwrap();
        assert_eq!(db.completion_count().unwrap(), 3);

        let recent = db.completions_since(now - Duration::days(1)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].name, "Read");
        assert_eq!(recent[0].kind, TaskKind::Weekly);
        assert_eq!(recent[1].completed_at, now + Duration::hours(1));
        assert_eq!(recent[1].points, 1.5);

        db.clear_completions().unwrap();
        assert_eq!(db.completion_count().unwrap(), 0);
    }

    #[test]
    fn test_db_version_and_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero2one.db");
        {
            let db = Database::open(&path).unwrap();
            assert_eq!(db.get_db_version().unwrap(), None);
            db.set_db_version("1.0").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_db_version().unwrap().as_deref(), Some("1.0"));
    }
}
