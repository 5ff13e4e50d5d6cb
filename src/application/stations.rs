//! Station catalog reads
//!
//! Listings are served from an in-memory snapshot of the catalog that is
//! rebuilt on the first read after any invalidation. A rebuild replaces the
//! whole snapshot, so readers see either the old or the new catalog.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::geo::{rank_by_distance, Coordinates};
use crate::domain::station::{
    Connector, ConnectorType, Station, StationFilter, StationWithConnectors,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Restrict a listing to a circle around a point and sort by distance
#[derive(Debug, Clone, Copy)]
pub struct Proximity {
    pub origin: Coordinates,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct StationQuery {
    pub filter: StationFilter,
    pub near: Option<Proximity>,
}

#[derive(Debug, Clone)]
pub struct ListedStation {
    pub station: StationWithConnectors,
    pub distance_km: Option<f64>,
}

/// One station of an imported catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_kwh: f64,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub connectors: Vec<CatalogConnector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConnector {
    #[serde(default)]
    pub id: Option<String>,
    pub connector_type: String,
    pub power_output: f64,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

pub struct StationService {
    repos: Arc<dyn RepositoryProvider>,
    snapshot: RwLock<Arc<Vec<StationWithConnectors>>>,
    loaded: AtomicBool,
    generation: AtomicU64,
}

impl StationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            loaded: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Every station with its connectors, ordered by name
    pub async fn catalog(&self) -> DomainResult<Vec<StationWithConnectors>> {
        Ok(self.snapshot().await?.as_ref().clone())
    }

    async fn snapshot(&self) -> DomainResult<Arc<Vec<StationWithConnectors>>> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(self.snapshot.read().await.clone());
        }
        self.reload().await
    }

    async fn reload(&self) -> DomainResult<Arc<Vec<StationWithConnectors>>> {
        let generation = self.generation.load(Ordering::Acquire);

        let stations = self.repos.stations().find_all().await?;
        let connectors = self.repos.stations().find_all_connectors().await?;
        let mut joined = StationWithConnectors::join(stations, connectors);
        joined.sort_by(|a, b| {
            a.station
                .name
                .cmp(&b.station.name)
                .then_with(|| a.station.id.cmp(&b.station.id))
        });
        let fresh = Arc::new(joined);

        *self.snapshot.write().await = fresh.clone();

        // An invalidation raced with this read: serve it, but reload next time.
        if self.generation.load(Ordering::Acquire) == generation {
            self.loaded.store(true, Ordering::Release);
        }
        debug!(count = fresh.len(), "Station catalog cached");
        Ok(fresh)
    }

    /// Drop the cached catalog; the next read goes to the database.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.loaded.store(false, Ordering::Release);
        debug!("Station catalog cache invalidated");
    }

    pub async fn list(&self, query: &StationQuery) -> DomainResult<Vec<ListedStation>> {
        let stations = query.filter.apply(self.catalog().await?);

        let Some(near) = query.near else {
            return Ok(stations
                .into_iter()
                .map(|station| ListedStation {
                    station,
                    distance_km: None,
                })
                .collect());
        };

        let radius = near.radius_km.unwrap_or(f64::INFINITY);
        Ok(
            rank_by_distance(stations, &near.origin, radius, |s| s.station.coordinates())
                .into_iter()
                .map(|(station, d)| ListedStation {
                    station,
                    distance_km: Some(d),
                })
                .collect(),
        )
    }

    pub async fn get(&self, id: &str) -> DomainResult<StationWithConnectors> {
        if self.loaded.load(Ordering::Acquire) {
            let snapshot = self.snapshot.read().await.clone();
            if let Some(hit) = snapshot.iter().find(|s| s.station.id == id) {
                return Ok(hit.clone());
            }
        }

        let station = self
            .repos
            .stations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", id))?;
        let connectors = self.repos.stations().find_connectors_for_station(id).await?;
        Ok(StationWithConnectors {
            station,
            connectors,
        })
    }

    /// Insert catalog stations that are not stored yet; returns how many were added.
    pub async fn import_catalog(&self, entries: Vec<CatalogEntry>) -> DomainResult<usize> {
        let mut added = 0;
        for entry in entries {
            if self.repos.stations().find_by_id(&entry.id).await?.is_some() {
                continue;
            }

            let connectors = entry
                .connectors
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let connector_type: ConnectorType = c.connector_type.parse()?;
                    let mut connector = Connector::new(
                        c.id.clone()
                            .unwrap_or_else(|| format!("{}_{}", entry.id, i + 1)),
                        entry.id.clone(),
                        connector_type,
                        c.power_output,
                    );
                    connector.available = c.available;
                    Ok(connector)
                })
                .collect::<DomainResult<Vec<_>>>()?;

            let now = Utc::now();
            let station = Station {
                id: entry.id,
                name: entry.name,
                address: entry.address,
                latitude: entry.latitude,
                longitude: entry.longitude,
                price_per_kwh: entry.price_per_kwh,
                available: entry.available,
                rating: 0.0,
                total_reviews: 0,
                created_at: now,
                updated_at: now,
            };
            self.repos
                .stations()
                .save_with_connectors(station, connectors)
                .await?;
            added += 1;
        }

        if added > 0 {
            info!(added, "Imported stations into catalog");
            self.invalidate();
        }
        Ok(added)
    }
}
