//! SQLite-backed persistence for intents and their history.
//!
//! Provides CRUD plus the filtered reads the repository builds its queries
//! from. Each write method is a single transaction; owned rows (urge events,
//! reward entries) are deleted in the same transaction as their intent.
//! Completion records and achievement unlocks are never cascaded.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indoc::indoc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::data_dir;
use crate::error::StoreError;
use crate::intent::{
    AchievementUnlock, CompletionRecord, Intent, IntentCategory, IntentKind, IntentStatus,
    Outcome, RewardEntry, UrgeEvent,
};
use crate::protocol::DelayProtocol;

/// Guard key for the one-time legacy status rewrite.
const STATUS_MIGRATION_KEY: &str = "status_migration_v1";

/// SQLite store for all durable records.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the store at `~/.config/cooloff/cooloff.db`.
    ///
    /// Creates the file and schema if they don't exist and runs migrations.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or migrated.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?
            .join("cooloff.db");
        Self::open(path)
    }

    /// Open the store at an explicit path.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(&path).map_err(|source| StoreError::OpenFailed {
            path,
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS intents (
                    id              TEXT PRIMARY KEY,
                    title           TEXT NOT NULL,
                    rationale       TEXT,
                    category        TEXT NOT NULL,
                    kind            TEXT NOT NULL,
                    start_time      TEXT NOT NULL,
                    checkpoint_time TEXT NOT NULL,
                    status          TEXT NOT NULL,
                    outcome         TEXT,
                    protocol        TEXT NOT NULL,
                    delay_hours     INTEGER NOT NULL,
                    estimated_cost  REAL,
                    fallback_action TEXT,
                    postpone_count  INTEGER NOT NULL DEFAULT 0,
                    resolved_at     TEXT,
                    created_at      TEXT NOT NULL,
                    updated_at      TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS completions (
                    id                   TEXT PRIMARY KEY,
                    intent_id            TEXT NOT NULL,
                    outcome              TEXT NOT NULL,
                    protocol_label       TEXT NOT NULL,
                    delay_hours          INTEGER NOT NULL,
                    duration_days        INTEGER NOT NULL,
                    was_after_checkpoint INTEGER NOT NULL,
                    reflection           TEXT,
                    urge_score           INTEGER,
                    regret_score         INTEGER,
                    cost                 REAL,
                    completed_at         TEXT NOT NULL,
                    created_at           TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS urge_events (
                    id            TEXT PRIMARY KEY,
                    intent_id     TEXT NOT NULL,
                    at            TEXT NOT NULL,
                    intensity     INTEGER NOT NULL,
                    note          TEXT,
                    used_fallback INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS reward_entries (
                    id        TEXT PRIMARY KEY,
                    intent_id TEXT NOT NULL,
                    points    INTEGER NOT NULL,
                    reason    TEXT NOT NULL,
                    at        TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS achievement_unlocks (
                    key         TEXT PRIMARY KEY,
                    unlocked_at TEXT NOT NULL,
                    intent_id   TEXT
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_intents_status ON intents(status);
                CREATE INDEX IF NOT EXISTS idx_intents_checkpoint ON intents(checkpoint_time);
                CREATE INDEX IF NOT EXISTS idx_completions_completed_at ON completions(completed_at);
                CREATE INDEX IF NOT EXISTS idx_urge_events_intent ON urge_events(intent_id);
                CREATE INDEX IF NOT EXISTS idx_reward_entries_intent ON reward_entries(intent_id);
            "})
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        if self.kv_get(STATUS_MIGRATION_KEY)?.is_none() {
            self.rewrite_legacy_statuses()?;
            self.kv_set(STATUS_MIGRATION_KEY, "done")?;
        }
        Ok(())
    }

    /// Rewrite legacy status strings to their canonical four-state values.
    ///
    /// Runs once per database, guarded by a kv flag; returns the number of
    /// rows rewritten.
    pub fn rewrite_legacy_statuses(&self) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut rewritten = tx.execute(
            "UPDATE intents SET status = 'active_wait' WHERE status IN ('active', 'paused')",
            [],
        )?;
        rewritten += tx.execute(
            "UPDATE intents SET status = 'resolved' WHERE status IN ('completed', 'failed')",
            [],
        )?;
        tx.commit()?;
        Ok(rewritten)
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn insert_intent(&self, intent: &Intent) -> Result<(), StoreError> {
        self.conn.execute(
            indoc! {"
                INSERT INTO intents (
                    id, title, rationale, category, kind, start_time, checkpoint_time,
                    status, outcome, protocol, delay_hours, estimated_cost,
                    fallback_action, postpone_count, resolved_at, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "},
            intent_params(intent)?,
        )?;
        Ok(())
    }

    pub fn update_intent(&self, intent: &Intent) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            indoc! {"
                UPDATE intents SET
                    title = ?2, rationale = ?3, category = ?4, kind = ?5,
                    start_time = ?6, checkpoint_time = ?7, status = ?8, outcome = ?9,
                    protocol = ?10, delay_hours = ?11, estimated_cost = ?12,
                    fallback_action = ?13, postpone_count = ?14, resolved_at = ?15,
                    created_at = ?16, updated_at = ?17
                WHERE id = ?1
            "},
            intent_params(intent)?,
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(intent.id.to_string()));
        }
        Ok(())
    }

    /// Delete an intent and its owned urge events and reward entries in one
    /// transaction. Completion records and unlocks are left untouched.
    pub fn delete_intent(&self, id: Uuid) -> Result<bool, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let id_str = id.to_string();
        tx.execute("DELETE FROM urge_events WHERE intent_id = ?1", params![id_str])?;
        tx.execute("DELETE FROM reward_entries WHERE intent_id = ?1", params![id_str])?;
        let deleted = tx.execute("DELETE FROM intents WHERE id = ?1", params![id_str])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    pub fn get_intent(&self, id: Uuid) -> Result<Option<Intent>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT * FROM intents WHERE id = ?1")?;
        let result = stmt.query_row(params![id.to_string()], intent_from_row);
        match result {
            Ok(intent) => Ok(Some(intent)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_intents(&self) -> Result<Vec<Intent>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM intents ORDER BY created_at ASC")?;
        let rows = stmt.query_map([], intent_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Complete a decision: update the intent, write the completion record,
    /// and append reward entries, all in one transaction.
    pub fn apply_completion(
        &self,
        intent: &Intent,
        record: &CompletionRecord,
        rewards: &[RewardEntry],
    ) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            indoc! {"
                UPDATE intents SET
                    title = ?2, rationale = ?3, category = ?4, kind = ?5,
                    start_time = ?6, checkpoint_time = ?7, status = ?8, outcome = ?9,
                    protocol = ?10, delay_hours = ?11, estimated_cost = ?12,
                    fallback_action = ?13, postpone_count = ?14, resolved_at = ?15,
                    created_at = ?16, updated_at = ?17
                WHERE id = ?1
            "},
            intent_params(intent)?,
        )?;
        tx.execute(
            indoc! {"
                INSERT INTO completions (
                    id, intent_id, outcome, protocol_label, delay_hours, duration_days,
                    was_after_checkpoint, reflection, urge_score, regret_score, cost,
                    completed_at, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "},
            params![
                record.id.to_string(),
                record.intent_id.to_string(),
                record.outcome.as_str(),
                record.protocol_label,
                record.delay_hours,
                record.duration_days,
                record.was_after_checkpoint,
                record.reflection,
                record.urge_score.map(i64::from),
                record.regret_score.map(i64::from),
                record.cost,
                record.completed_at.to_rfc3339(),
                record.created_at.to_rfc3339(),
            ],
        )?;
        for reward in rewards {
            tx.execute(
                "INSERT INTO reward_entries (id, intent_id, points, reason, at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reward.id.to_string(),
                    reward.intent_id.to_string(),
                    reward.points,
                    reward.reason,
                    reward.at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Completions ──────────────────────────────────────────────────

    /// Full completion history ordered by completion time ascending.
    pub fn list_completions(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM completions ORDER BY completed_at ASC, created_at ASC")?;
        let rows = stmt.query_map([], completion_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn completions_for(&self, intent_id: Uuid) -> Result<Vec<CompletionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM completions WHERE intent_id = ?1 ORDER BY completed_at ASC",
        )?;
        let rows = stmt.query_map(params![intent_id.to_string()], completion_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Urge events ──────────────────────────────────────────────────

    pub fn insert_urge(&self, urge: &UrgeEvent) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO urge_events (id, intent_id, at, intensity, note, used_fallback)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                urge.id.to_string(),
                urge.intent_id.to_string(),
                urge.at.to_rfc3339(),
                i64::from(urge.intensity),
                urge.note,
                urge.used_fallback,
            ],
        )?;
        Ok(())
    }

    pub fn delete_urge(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM urge_events WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    pub fn urges_for(&self, intent_id: Uuid) -> Result<Vec<UrgeEvent>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM urge_events WHERE intent_id = ?1 ORDER BY at ASC")?;
        let rows = stmt.query_map(params![intent_id.to_string()], urge_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn recent_urges(&self, limit: usize) -> Result<Vec<UrgeEvent>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM urge_events ORDER BY at DESC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], urge_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_urges(&self) -> Result<u32, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM urge_events", [], |row| row.get(0))?;
        Ok(count as u32)
    }

    // ── Rewards ──────────────────────────────────────────────────────

    pub fn rewards_for(&self, intent_id: Uuid) -> Result<Vec<RewardEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM reward_entries WHERE intent_id = ?1 ORDER BY at ASC")?;
        let rows = stmt.query_map(params![intent_id.to_string()], reward_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn total_points(&self) -> Result<i64, StoreError> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM reward_entries",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    // ── Achievement unlocks ──────────────────────────────────────────

    /// Insert an unlock if its key is not already present. Returns whether a
    /// row was written.
    pub fn insert_unlock(&self, unlock: &AchievementUnlock) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO achievement_unlocks (key, unlocked_at, intent_id)
             VALUES (?1, ?2, ?3)",
            params![
                unlock.key,
                unlock.unlocked_at.to_rfc3339(),
                unlock.intent_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn list_unlocks(&self) -> Result<Vec<AchievementUnlock>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM achievement_unlocks ORDER BY unlocked_at ASC")?;
        let rows = stmt.query_map([], unlock_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn unlocked_keys(&self) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key FROM achievement_unlocks")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<HashSet<_>>>()?)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

// ── Row mapping ──────────────────────────────────────────────────────

fn bad_value(column: usize, what: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unrecognized {what}: {raw}").into(),
    )
}

fn parse_ts(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| bad_value(column, "timestamp", raw))
}

fn parse_opt_ts(column: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_ts(column, &s)).transpose()
}

fn parse_uuid(column: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| bad_value(column, "uuid", raw))
}

fn intent_params(intent: &Intent) -> Result<[Box<dyn rusqlite::ToSql>; 17], StoreError> {
    let protocol = serde_json::to_string(&intent.protocol)
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
    Ok([
        Box::new(intent.id.to_string()),
        Box::new(intent.title.clone()),
        Box::new(intent.rationale.clone()),
        Box::new(intent.category.as_str()),
        Box::new(intent.kind.as_str()),
        Box::new(intent.start_time.to_rfc3339()),
        Box::new(intent.checkpoint_time.to_rfc3339()),
        Box::new(intent.status.as_str()),
        Box::new(intent.outcome.map(|o| o.as_str())),
        Box::new(protocol),
        Box::new(intent.delay_hours),
        Box::new(intent.estimated_cost),
        Box::new(intent.fallback_action.clone()),
        Box::new(i64::from(intent.postpone_count)),
        Box::new(intent.resolved_at.map(|t| t.to_rfc3339())),
        Box::new(intent.created_at.to_rfc3339()),
        Box::new(intent.updated_at.to_rfc3339()),
    ])
}

fn intent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Intent> {
    let id: String = row.get(0)?;
    let category: String = row.get(3)?;
    let kind: String = row.get(4)?;
    let start_time: String = row.get(5)?;
    let checkpoint_time: String = row.get(6)?;
    let status: String = row.get(7)?;
    let outcome: Option<String> = row.get(8)?;
    let protocol: String = row.get(9)?;
    let resolved_at: Option<String> = row.get(14)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    Ok(Intent {
        id: parse_uuid(0, &id)?,
        title: row.get(1)?,
        rationale: row.get(2)?,
        category: IntentCategory::parse(&category)
            .ok_or_else(|| bad_value(3, "category", &category))?,
        kind: IntentKind::parse(&kind).ok_or_else(|| bad_value(4, "kind", &kind))?,
        start_time: parse_ts(5, &start_time)?,
        checkpoint_time: parse_ts(6, &checkpoint_time)?,
        status: IntentStatus::parse(&status).ok_or_else(|| bad_value(7, "status", &status))?,
        outcome: outcome
            .map(|o| Outcome::parse(&o).ok_or_else(|| bad_value(8, "outcome", &o)))
            .transpose()?,
        protocol: serde_json::from_str::<DelayProtocol>(&protocol)
            .map_err(|_| bad_value(9, "protocol", &protocol))?,
        delay_hours: row.get(10)?,
        estimated_cost: row.get(11)?,
        fallback_action: row.get(12)?,
        postpone_count: row.get::<_, i64>(13)? as u32,
        resolved_at: parse_opt_ts(14, resolved_at)?,
        created_at: parse_ts(15, &created_at)?,
        updated_at: parse_ts(16, &updated_at)?,
    })
}

fn completion_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompletionRecord> {
    let id: String = row.get(0)?;
    let intent_id: String = row.get(1)?;
    let outcome: String = row.get(2)?;
    let completed_at: String = row.get(11)?;
    let created_at: String = row.get(12)?;

    Ok(CompletionRecord {
        id: parse_uuid(0, &id)?,
        intent_id: parse_uuid(1, &intent_id)?,
        outcome: Outcome::parse(&outcome).ok_or_else(|| bad_value(2, "outcome", &outcome))?,
        protocol_label: row.get(3)?,
        delay_hours: row.get(4)?,
        duration_days: row.get(5)?,
        was_after_checkpoint: row.get(6)?,
        reflection: row.get(7)?,
        urge_score: row.get::<_, Option<i64>>(8)?.map(|v| v as u8),
        regret_score: row.get::<_, Option<i64>>(9)?.map(|v| v as u8),
        cost: row.get(10)?,
        completed_at: parse_ts(11, &completed_at)?,
        created_at: parse_ts(12, &created_at)?,
    })
}

fn urge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UrgeEvent> {
    let id: String = row.get(0)?;
    let intent_id: String = row.get(1)?;
    let at: String = row.get(2)?;

    Ok(UrgeEvent {
        id: parse_uuid(0, &id)?,
        intent_id: parse_uuid(1, &intent_id)?,
        at: parse_ts(2, &at)?,
        intensity: row.get::<_, i64>(3)? as u8,
        note: row.get(4)?,
        used_fallback: row.get(5)?,
    })
}

fn reward_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RewardEntry> {
    let id: String = row.get(0)?;
    let intent_id: String = row.get(1)?;
    let at: String = row.get(4)?;

    Ok(RewardEntry {
        id: parse_uuid(0, &id)?,
        intent_id: parse_uuid(1, &intent_id)?,
        points: row.get(2)?,
        reason: row.get(3)?,
        at: parse_ts(4, &at)?,
    })
}

fn unlock_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AchievementUnlock> {
    let unlocked_at: String = row.get(1)?;
    let intent_id: Option<String> = row.get(2)?;

    Ok(AchievementUnlock {
        key: row.get(0)?,
        unlocked_at: parse_ts(1, &unlocked_at)?,
        intent_id: intent_id.map(|s| parse_uuid(2, &s)).transpose()?,
    })
}
