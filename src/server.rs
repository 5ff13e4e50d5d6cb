//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database and
//! migrations, catalog import, services, the REST API and graceful shutdown.

use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::{
    create_event_bus, BookingService, CatalogEntry, IdentityService, LocationService,
    NearbyService, ReviewService, SharedEventBus, StationService,
};
use crate::config::AppConfig;
use crate::domain::booking::PricingPolicy;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::{
    init_database, migrate, DatabaseConfig, GooglePlacesClient, GooglePlacesConfig,
    LocationStore, SeaOrmRepositoryProvider,
};
use crate::interfaces::http::middleware::AuthState;
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::errors::{AppError, InfraError};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run migrations on startup
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// The global recorder can be installed once per process; later starts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Metrics disabled, recorder could not be installed: {}", e);
                None
            }
        })
        .clone()
}

/// Import the JSON catalog at `path` (an array of stations with connectors).
pub async fn import_catalog_file(
    stations: &StationService,
    path: &Path,
) -> Result<usize, AppError> {
    let bytes = tokio::fs::read(path).await.map_err(InfraError::from)?;
    let entries: Vec<CatalogEntry> = serde_json::from_slice(&bytes).map_err(InfraError::from)?;
    let total = entries.len();
    let added = stations.import_catalog(entries).await?;
    info!(
        path = %path.display(),
        total,
        added,
        "Station catalog imported"
    );
    Ok(added)
}

pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, AppError> {
        let cfg = opts.config;
        cfg.validate()?;
        info!("Starting EV charge platform API...");

        let prometheus = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig {
            url: cfg.database.url.clone(),
        })
        .await
        .map_err(InfraError::from)?;
        if opts.auto_migrate {
            migrate(&db).await.map_err(InfraError::from)?;
        }

        // ── Services ───────────────────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let event_bus = create_event_bus();

        let stations = Arc::new(StationService::new(repos.clone()));
        if let Some(path) = &cfg.database.catalog_path {
            import_catalog_file(&stations, path).await?;
        }

        let jwt_config = JwtConfig::new(
            cfg.security.jwt_secret.clone(),
            cfg.security.jwt_expiration_hours,
        );
        let identity = Arc::new(IdentityService::with_cost(
            repos.clone(),
            jwt_config.clone(),
            cfg.security.bcrypt_cost,
        ));

        if cfg.places.api_key.is_empty() {
            warn!("places.api_key is not set; nearby search will fall back to the local catalog");
        }
        let places = Arc::new(GooglePlacesClient::new(GooglePlacesConfig {
            api_key: cfg.places.api_key.clone(),
            base_url: cfg.places.base_url.clone(),
            timeout: std::time::Duration::from_secs(cfg.places.timeout_secs),
        })
        .map_err(InfraError::from)?);
        let nearby = Arc::new(NearbyService::new(
            places,
            stations.clone(),
            cfg.places.default_radius_m,
        ));

        let bookings = Arc::new(BookingService::new(
            repos.clone(),
            stations.clone(),
            event_bus.clone(),
            PricingPolicy {
                default_draw_kw: cfg.booking.default_draw_kw,
                tesla_draw_kw: cfg.booking.tesla_draw_kw,
            },
        ));
        let reviews = Arc::new(ReviewService::new(
            repos.clone(),
            stations.clone(),
            event_bus.clone(),
        ));

        let store = match &cfg.location.store_path {
            Some(path) => LocationStore::load(path).await?,
            None => LocationStore::in_memory(),
        };
        let location = Arc::new(LocationService::new(Arc::new(store)));

        // ── REST API ───────────────────────────────────────────
        let router = create_api_router(
            AppState {
                db: db.clone(),
                auth: AuthState { jwt_config },
                identity,
                stations,
                nearby,
                bookings,
                reviews,
                location,
                event_bus: event_bus.clone(),
                started_at: Arc::new(Instant::now()),
            },
            prometheus,
        );

        let shutdown = ShutdownCoordinator::new(cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let addr = cfg.api_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(InfraError::from)?;
        let api_port = listener.local_addr().map_err(InfraError::from)?.port();
        info!("REST API listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            event_bus,
            repos,
            config: cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGINT / SIGTERM
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API task to stop, bounded by the shutdown timeout, then close the database.
    pub async fn wait(self) {
        let Self {
            shutdown,
            api_task,
            db,
            ..
        } = self;

        let finished = shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API task panicked: {}", e);
                }
            })
            .await;
        if !finished {
            warn!("In-flight requests were cut off");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialise `tracing` from config; `RUST_LOG` wins over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}
