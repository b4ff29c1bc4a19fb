mod appearance;
mod camera;
mod geo;
mod input;
mod locomotion;
mod loop_runner;
mod metrics;
mod proximity;
mod session;

pub use appearance::{
    AppearanceStateMachine, LoadStatus, RenderCommand, Representation, IDLE_BLEND_TICKS,
};
pub use camera::{CameraTransform, FollowCameraConfig, ViewportFollowCamera, CAMERA_LERP_FACTOR};
pub use geo::{
    bearing_degrees_from_heading, CoordinateBridge, GeoBounds, GeoPoint, LocalPoint,
    EARTH_RADIUS_METERS, SCENE_UNITS_PER_DEGREE,
};
pub use input::{ActionStates, AvatarAction, MotionIntent, TickInput};
pub use locomotion::{
    step, LocomotionConfig, LocomotionController, LocomotionState, AVATAR_SPEED_UNITS_PER_TICK,
    TURN_SPEED_RADIANS_PER_TICK,
};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use proximity::{
    Collectible, CollectOutcome, NearestTarget, ProximityConfig, ProximityReport, ProximityTracker,
    COLLECT_RADIUS_METERS, HINT_RADIUS_METERS,
};
pub use session::{
    HudState, MapViewport, ProgressStore, SceneRenderer, Session, SessionConfig, SessionEvent,
    TickOutcome, AVATAR_HEIGHT_UNITS, TICK_STAGE_ORDER_TEXT,
};
