//! In-memory snapshot cache.
//!
//! Loads each named columnar snapshot into one registered engine table
//! per process lifetime and hands out its handle. Handle reads are
//! lock-free; the first-load path serializes behind a single async lock
//! so concurrent first callers block behind one loader instead of racing
//! the registration.

use crate::engine::AnalyticsEngine;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tally_commons::config::SnapshotSettings;
use tally_commons::{PipelineError, Result};
use tokio::sync::Mutex;

/// Handle to a registered snapshot table. Owned by the cache for process
/// lifetime; callers only clone the `Arc`.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    /// Snapshot name as requested by callers.
    pub name: String,
    /// Registered engine table name.
    pub table: String,
    /// Backing file the table was loaded from.
    pub path: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

/// Registered-snapshot statistics, for the observability surface.
#[derive(Debug, Clone)]
pub struct SnapshotCacheStats {
    pub registered: usize,
    pub snapshots: Vec<String>,
}

pub struct SnapshotCache {
    engine: Arc<AnalyticsEngine>,
    snapshot_dir: PathBuf,
    table_prefix: String,
    registry: DashMap<String, Arc<SnapshotHandle>>,
    // Small fixed name set, so one global load lock is enough.
    load_lock: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(engine: Arc<AnalyticsEngine>, settings: &SnapshotSettings) -> Self {
        Self {
            engine,
            snapshot_dir: PathBuf::from(&settings.snapshot_dir),
            table_prefix: settings.table_prefix.clone(),
            registry: DashMap::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Get the table handle for a named snapshot, loading the backing
    /// file on first request.
    pub async fn get_table(&self, name: &str) -> Result<Arc<SnapshotHandle>> {
        if let Some(handle) = self.registry.get(name) {
            return Ok(handle.clone());
        }

        let _guard = self.load_lock.lock().await;

        // A concurrent caller may have loaded it while we waited.
        if let Some(handle) = self.registry.get(name) {
            return Ok(handle.clone());
        }

        check_snapshot_name(name)?;

        let path = self.snapshot_dir.join(format!("{}.parquet", name));
        let table = format!("{}{}", self.table_prefix, name);

        self.engine.register_table(&table, &path).await?;

        let handle = Arc::new(SnapshotHandle {
            name: name.to_string(),
            table: table.clone(),
            path,
            loaded_at: Utc::now(),
        });
        self.registry.insert(name.to_string(), handle.clone());

        log::info!("loaded snapshot '{}' into table '{}'", name, table);

        Ok(handle)
    }

    /// Drop one registration. Administrative, used when the backing file
    /// changes; the next `get_table` re-loads.
    pub fn invalidate(&self, name: &str) -> Result<()> {
        if let Some((_, handle)) = self.registry.remove(name) {
            self.engine.deregister_table(&handle.table)?;
            log::info!("invalidated snapshot '{}'", name);
        }
        Ok(())
    }

    /// Drop every registration.
    pub fn invalidate_all(&self) -> Result<()> {
        let names: Vec<String> = self.registry.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.invalidate(&name)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> SnapshotCacheStats {
        let mut snapshots: Vec<String> = self.registry.iter().map(|e| e.key().clone()).collect();
        snapshots.sort();
        SnapshotCacheStats {
            registered: snapshots.len(),
            snapshots,
        }
    }
}

/// Snapshot names come from configuration and admin calls, not end
/// users, but they are still path components: keep them to a tight
/// charset.
fn check_snapshot_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(PipelineError::snapshot(format!(
            "invalid snapshot name '{}'",
            name
        )))
    }
}
