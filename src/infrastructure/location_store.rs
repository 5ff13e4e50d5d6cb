//! Last-known user locations, kept in memory and mirrored to a JSON file
//!
//! Loaded once at start-up, written through on every fix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::location::LastKnownLocation;
use crate::shared::errors::InfraError;

pub struct LocationStore {
    path: Option<PathBuf>,
    entries: DashMap<String, LastKnownLocation>,
    write_lock: Mutex<()>,
}

impl LocationStore {
    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Read `path` if it exists; a missing file starts empty.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, InfraError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let saved: BTreeMap<String, LastKnownLocation> = serde_json::from_slice(&bytes)?;
                for (user_id, location) in saved {
                    entries.insert(user_id, location);
                }
                info!(path = %path.display(), count = entries.len(), "Loaded last-known locations");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No location file yet");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path: Some(path),
            entries,
            write_lock: Mutex::new(()),
        })
    }

    pub fn get(&self, user_id: &str) -> Option<LastKnownLocation> {
        self.entries.get(user_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the user's location and persist the whole set.
    ///
    /// The in-memory entry only changes once the file write succeeded.
    pub async fn record(&self, location: LastKnownLocation) -> Result<(), InfraError> {
        let Some(path) = &self.path else {
            self.entries.insert(location.user_id.clone(), location);
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;

        let mut snapshot: BTreeMap<String, LastKnownLocation> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        snapshot.insert(location.user_id.clone(), location.clone());
        write_snapshot(path, &snapshot).await?;

        self.entries.insert(location.user_id.clone(), location);
        Ok(())
    }
}

async fn write_snapshot(
    path: &Path,
    snapshot: &BTreeMap<String, LastKnownLocation>,
) -> Result<(), InfraError> {
    let json = serde_json::to_vec_pretty(snapshot)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::geo::Coordinates;

    fn fix(user: &str, lat: f64) -> LastKnownLocation {
        LastKnownLocation {
            user_id: user.into(),
            coordinates: Coordinates::new(lat, 10.0).unwrap(),
            recorded_at: Utc::now(),
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("evcharge-test-{}", uuid::Uuid::new_v4()))
            .join("locations.json")
    }

    #[tokio::test]
    async fn survives_reload() {
        let path = temp_path();
        let store = LocationStore::load(&path).await.unwrap();
        assert!(store.is_empty());

        store.record(fix("u1", 1.0)).await.unwrap();
        store.record(fix("u2", 2.0)).await.unwrap();
        store.record(fix("u1", 3.0)).await.unwrap();

        let reloaded = LocationStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("u1").unwrap().coordinates.latitude, 3.0);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        assert!(LocationStore::load(&path).await.is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_location() {
        let path = temp_path();
        let dir = path.parent().unwrap().to_path_buf();
        let store = LocationStore::load(&path).await.unwrap();
        store.record(fix("u1", 1.0)).await.unwrap();

        // A plain file where the directory should be makes every write fail.
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, b"").unwrap();

        assert!(store.record(fix("u1", 5.0)).await.is_err());
        assert!(store.record(fix("u2", 2.0)).await.is_err());
        assert_eq!(store.get("u1").unwrap().coordinates.latitude, 1.0);
        assert!(store.get("u2").is_none());
        assert_eq!(store.len(), 1);

        let _ = std::fs::remove_file(&dir);
    }

    #[tokio::test]
    async fn in_memory_store_keeps_latest() {
        let store = LocationStore::in_memory();
        store.record(fix("u1", 1.0)).await.unwrap();
        assert_eq!(store.get("u1").unwrap().coordinates.latitude, 1.0);
        assert!(store.get("u2").is_none());
    }
}
