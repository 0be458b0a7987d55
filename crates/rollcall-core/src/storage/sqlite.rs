//! SQLite-backed ledger store.
//!
//! One row per member, JSON-encoded record. The ledger is small and
//! always read-modify-written as a whole, so a keyed-blob layout fits
//! the snapshot contract better than a normalized schema. Member ids
//! are stored in decimal string form, matching the upstream data
//! layout.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, Store};
use crate::attendance::{Ledger, MemberRecord};
use crate::error::StoreError;
use crate::ids::MemberId;

const SCHEMA_VERSION: i64 = 1;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) the ledger database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open the ledger at `~/.config/rollcall/ledger.db`.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(&data_dir()?.join("ledger.db"))
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS members (
                member_id TEXT PRIMARY KEY,
                record    TEXT NOT NULL
            );",
        )?;

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match version {
            None => {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
                    params![SCHEMA_VERSION.to_string()],
                )?;
                Ok(())
            }
            Some(value) => {
                let found: i64 = value
                    .parse()
                    .map_err(|_| StoreError::QueryFailed(format!("bad schema version: {value}")))?;
                if found == SCHEMA_VERSION {
                    Ok(())
                } else {
                    Err(StoreError::SchemaVersion {
                        found,
                        expected: SCHEMA_VERSION,
                    })
                }
            }
        }
    }
}

impl Store for SqliteStore {
    fn load(&self) -> Result<Ledger, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT member_id, record FROM members")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut ledger = Ledger::new();
        for row in rows {
            let (id, json) = row?;
            let member: MemberId = id
                .parse()
                .map_err(|_| StoreError::QueryFailed(format!("bad member id: {id}")))?;
            let record: MemberRecord = serde_json::from_str(&json)?;
            ledger.insert(member, record);
        }
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM members", [])?;
        for (member, record) in ledger {
            tx.execute(
                "INSERT INTO members (member_id, record) VALUES (?1, ?2)",
                params![member.to_string(), serde_json::to_string(record)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{OpenSession, SessionLog};
    use chrono::{Duration, Utc};

    fn sample_ledger() -> Ledger {
        let now = Utc::now();
        let mut ledger = Ledger::new();
        ledger.insert(
            MemberId(1),
            MemberRecord {
                open: Some(OpenSession {
                    response_deadline: Some(now + Duration::minutes(10)),
                    ..OpenSession::starting(now)
                }),
                completed: vec![SessionLog::close(now - Duration::hours(2), now)],
                last_quota_notice: Some(now - Duration::hours(7)),
                afk_check_outstanding: true,
            },
        );
        ledger.insert(MemberId(2), MemberRecord::default());
        ledger
    }

    #[test]
    fn round_trips_full_records() {
        let store = SqliteStore::open_memory().expect("open");
        let ledger = sample_ledger();
        store.save(&ledger).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.len(), 2);
        let record = &loaded[&MemberId(1)];
        assert!(record.afk_check_outstanding);
        assert!(record.open.as_ref().expect("open").response_deadline.is_some());
        assert_eq!(record.completed.len(), 1);
    }

    #[test]
    fn save_replaces_the_snapshot() {
        let store = SqliteStore::open_memory().expect("open");
        store.save(&sample_ledger()).expect("save");
        store.save(&Ledger::new()).expect("save empty");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn reopens_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ledger.db");

        {
            let store = SqliteStore::open(&path).expect("open");
            store.save(&sample_ledger()).expect("save");
        }

        let store = SqliteStore::open(&path).expect("reopen");
        assert_eq!(store.load().expect("load").len(), 2);
    }

    #[test]
    fn rejects_newer_schema() {
        let store = SqliteStore::open_memory().expect("open");
        {
            let conn = store.conn().expect("lock");
            conn.execute(
                "UPDATE meta SET value = '99' WHERE key = 'schema_version'",
                [],
            )
            .expect("bump version");
        }
        assert!(matches!(
            store.migrate(),
            Err(StoreError::SchemaVersion { found: 99, .. })
        ));
    }
}
