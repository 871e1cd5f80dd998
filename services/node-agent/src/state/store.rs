//! SQLite-backed region store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use gridwide_protocol::RegionDescriptor;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RegionSeed;

/// Errors from region store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Invalid region record {name}: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store connection poisoned")]
    Poisoned,
}

/// Region configuration consumed by the agent.
pub trait RegionStore: Send + Sync {
    /// Every region configured on this node.
    fn list_declared(&self) -> Result<Vec<RegionDescriptor>, StoreError>;

    /// Persist whether `name` starts when the node boots.
    fn persist_startup_flag(&self, name: &str, enabled: bool) -> Result<(), StoreError>;
}

/// Region row in the store.
#[derive(Debug, Clone)]
pub struct StoredRegion {
    pub descriptor: RegionDescriptor,
    pub startup_enabled: bool,
    /// Updated timestamp (Unix seconds).
    pub updated_at: i64,
}

/// SQLite region store.
pub struct SqliteRegionStore {
    conn: Mutex<Connection>,
}

impl SqliteRegionStore {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS regions (
                name TEXT PRIMARY KEY,
                descriptor TEXT NOT NULL,
                startup_enabled INTEGER NOT NULL DEFAULT 1,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        debug!("Region store schema initialized");
        Ok(())
    }

    /// Insert a region, or refresh the descriptor of an existing one.
    ///
    /// The startup flag of an existing region is left alone; it only changes
    /// through [`RegionStore::persist_startup_flag`].
    pub fn upsert_region(
        &self,
        region: &RegionDescriptor,
        startup_enabled: bool,
    ) -> Result<(), StoreError> {
        let descriptor = serde_json::to_string(region).map_err(|source| StoreError::Invalid {
            name: region.name.clone(),
            source,
        })?;

        self.conn()?.execute(
            r#"
            INSERT INTO regions (name, descriptor, startup_enabled, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                descriptor = excluded.descriptor,
                updated_at = excluded.updated_at
            "#,
            params![region.name, descriptor, startup_enabled, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Get a region by name.
    pub fn get_region(&self, name: &str) -> Result<Option<StoredRegion>, StoreError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT name, descriptor, startup_enabled, updated_at FROM regions WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(name, descriptor, startup_enabled, updated_at)| {
            Ok(StoredRegion {
                descriptor: decode_descriptor(name, &descriptor)?,
                startup_enabled,
                updated_at,
            })
        })
        .transpose()
    }

    /// Regions flagged to start at boot.
    pub fn startup_regions(&self) -> Result<Vec<RegionDescriptor>, StoreError> {
        self.select_descriptors(
            "SELECT name, descriptor FROM regions WHERE startup_enabled = 1 ORDER BY name",
        )
    }

    /// Import regions from the regions file.
    ///
    /// Regions without an id in the file keep the id they were stored with.
    pub fn import(&self, seeds: &[RegionSeed]) -> Result<(), StoreError> {
        for seed in seeds {
            let existing_id = self
                .get_region(&seed.name)?
                .map(|stored| stored.descriptor.region_id);
            self.upsert_region(&seed.to_descriptor(existing_id), seed.startup)?;
        }

        info!(count = seeds.len(), "Imported regions");
        Ok(())
    }

    fn select_descriptors(&self, sql: &str) -> Result<Vec<RegionDescriptor>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut regions = Vec::new();
        for row in rows {
            let (name, descriptor) = row?;
            regions.push(decode_descriptor(name, &descriptor)?);
        }
        Ok(regions)
    }
}

impl RegionStore for SqliteRegionStore {
    fn list_declared(&self) -> Result<Vec<RegionDescriptor>, StoreError> {
        self.select_descriptors("SELECT name, descriptor FROM regions ORDER BY name")
    }

    fn persist_startup_flag(&self, name: &str, enabled: bool) -> Result<(), StoreError> {
        let updated = self.conn()?.execute(
            "UPDATE regions SET startup_enabled = ?1, updated_at = ?2 WHERE name = ?3",
            params![enabled, Utc::now().timestamp(), name],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }

        debug!(region = %name, enabled, "Startup flag persisted");
        Ok(())
    }
}

fn decode_descriptor(name: String, descriptor: &str) -> Result<RegionDescriptor, StoreError> {
    serde_json::from_str(descriptor).map_err(|source| StoreError::Invalid { name, source })
}
