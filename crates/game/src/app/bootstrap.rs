use bluejay_engine::{
    resolve_app_paths, FollowCameraConfig, JsonProgressStore, LocomotionConfig, LoopConfig,
    MapViewport, ProgressStore, ProximityConfig, Representation, SceneRenderer, Session,
    SessionConfig, StartupError,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use super::adapters::{OfflineViewport, TracingRenderer};
use super::campus::{
    default_campus, load_campus_config, nearest_building, CampusConfig, CampusConfigError,
    BUILDING_LOOKUP_RADIUS_METERS,
};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
    pub(crate) viewport: Box<dyn MapViewport>,
    pub(crate) renderer: Box<dyn SceneRenderer>,
    pub(crate) store: Box<dyn ProgressStore>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    CampusConfig(#[from] CampusConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Blue Jay Quest Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        campus_config = %paths.campus_config_path.display(),
        save_path = %paths.save_path.display(),
        "startup"
    );

    let campus = match load_campus_config(&paths.campus_config_path)? {
        Some(campus) => {
            info!(
                campus = %campus.name,
                collectibles = campus.collectibles.len(),
                buildings = campus.buildings.len(),
                "campus_config_loaded"
            );
            campus
        }
        None => {
            info!("campus_config_missing_using_default");
            default_campus()
        }
    };
    if !campus.bounds.contains(campus.origin) {
        warn!(campus = %campus.name, "campus_origin_outside_bounds");
    }
    log_collectible_landmarks(&campus);

    let mut store = JsonProgressStore::new(paths.save_path.clone());
    let mut session = Session::new(
        SessionConfig {
            origin: campus.origin,
            bounds: campus.bounds,
            locomotion: LocomotionConfig::default(),
            camera: FollowCameraConfig::default(),
            proximity: ProximityConfig::default(),
        },
        campus.collectibles.clone(),
    );

    match store.load() {
        Ok(Some(record)) => {
            session.restore_progress(&record);
            info!(score = record.score, "progress_restored");
        }
        Ok(None) => info!("no_saved_progress"),
        Err(error) => warn!(error = %error, "progress_load_failed_using_defaults"),
    }

    // Placeholder avatar assets ship with the binary; a streaming asset
    // source would call these from its completion callbacks instead.
    session.representation_ready(Representation::Idle);
    session.representation_ready(Representation::Moving);

    let viewport = OfflineViewport::new(campus.origin, campus.view.zoom, campus.view.pitch_degrees);
    info!(
        zoom = viewport.zoom(),
        pitch_degrees = viewport.pitch_degrees(),
        "viewport_ready"
    );

    let config = LoopConfig {
        window_title: format!("Blue Jay Quest - {}", campus.name),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        session,
        viewport: Box::new(viewport),
        renderer: Box::new(TracingRenderer),
        store: Box::new(store),
    })
}

fn log_collectible_landmarks(campus: &CampusConfig) {
    for building in &campus.buildings {
        debug!(building = %building.summary(), "campus_building");
    }
    for item in &campus.collectibles {
        match nearest_building(item.location, &campus.buildings, BUILDING_LOOKUP_RADIUS_METERS) {
            Some(building) => info!(
                item = %item.name,
                near = %building.name,
                "collectible_placed"
            ),
            None => info!(item = %item.name, "collectible_placed"),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
