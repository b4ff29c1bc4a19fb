use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod progress;

pub use app::{
    bearing_degrees_from_heading, run_app, run_app_with_metrics, ActionStates, AppError,
    AppearanceStateMachine, AvatarAction, CameraTransform, Collectible, CollectOutcome,
    CoordinateBridge, FollowCameraConfig, GeoBounds, GeoPoint, HudState, LoadStatus, LocalPoint,
    LocomotionConfig, LocomotionController, LocomotionState, LoopConfig, LoopMetricsSnapshot,
    MapViewport, MetricsHandle, MotionIntent, NearestTarget, ProgressStore, ProximityConfig,
    ProximityReport, ProximityTracker, RenderCommand, Representation, SceneRenderer, Session,
    SessionConfig, SessionEvent, TickInput, TickOutcome, ViewportFollowCamera,
    AVATAR_HEIGHT_UNITS, AVATAR_SPEED_UNITS_PER_TICK, CAMERA_LERP_FACTOR, COLLECT_RADIUS_METERS,
    EARTH_RADIUS_METERS, HINT_RADIUS_METERS, IDLE_BLEND_TICKS, SCENE_UNITS_PER_DEGREE,
    TICK_STAGE_ORDER_TEXT, TURN_SPEED_RADIANS_PER_TICK,
};
pub use progress::{
    JsonProgressStore, ProgressError, ProgressRecord, SavedCollectible, SAVE_VERSION,
};

pub const ROOT_ENV_VAR: &str = "BLUEJAY_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub campus_config_path: PathBuf,
    pub save_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "BLUEJAY_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/bluejay-quest\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Resolves the project root and the well-known file locations under it.
/// Creates the save directory so the first collection can persist.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let campus_config_path = root.join("assets").join("campus.json");
    let save_dir = root.join("saves");

    fs::create_dir_all(&save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: save_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        campus_config_path,
        save_path: save_dir.join("progress.save.json"),
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn repo_marker_accepts_a_root_with_crates_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write manifest");
        fs::create_dir(dir.path().join("crates")).expect("create crates dir");
        assert!(is_repo_marker(dir.path()));
    }
}
