use bluejay_engine::{CameraTransform, GeoPoint, LocalPoint, MapViewport, RenderCommand, SceneRenderer};
use tracing::trace;

/// Stands in for the external map-tile service: holds the viewport pose
/// the session pushes each tick. A real map integration would forward
/// these setters to its SDK.
#[derive(Debug)]
pub(crate) struct OfflineViewport {
    center: GeoPoint,
    bearing_degrees: f64,
    zoom: f64,
    pitch_degrees: f64,
}

impl OfflineViewport {
    pub(crate) fn new(center: GeoPoint, zoom: f64, pitch_degrees: f64) -> Self {
        Self {
            center,
            bearing_degrees: 0.0,
            zoom,
            pitch_degrees,
        }
    }

    pub(crate) fn zoom(&self) -> f64 {
        self.zoom
    }

    pub(crate) fn pitch_degrees(&self) -> f64 {
        self.pitch_degrees
    }
}

impl MapViewport for OfflineViewport {
    fn set_center(&mut self, center: GeoPoint) {
        trace!(center = %center, "viewport_center");
        self.center = center;
    }

    fn set_bearing_degrees(&mut self, bearing: f64) {
        trace!(bearing, "viewport_bearing");
        self.bearing_degrees = bearing;
    }

    fn center(&self) -> GeoPoint {
        self.center
    }

    fn bearing_degrees(&self) -> f64 {
        self.bearing_degrees
    }
}

/// Scene renderer that narrates to the log instead of drawing. Keeps the
/// session's render traffic observable without a GPU surface.
#[derive(Debug, Default)]
pub(crate) struct TracingRenderer;

impl SceneRenderer for TracingRenderer {
    fn set_avatar_transform(&mut self, position: LocalPoint, heading_radians: f64) {
        trace!(
            x = position.x,
            y = position.y,
            z = position.z,
            heading_radians,
            "avatar_transform"
        );
    }

    fn apply_appearance(&mut self, command: &RenderCommand) {
        trace!(
            representation = ?command.representation,
            clip_phase_ticks = command.clip_phase_ticks,
            playback_rate = command.playback_rate,
            blend_weight = command.blend_weight,
            "avatar_appearance"
        );
    }

    fn set_camera(&mut self, transform: &CameraTransform) {
        trace!(
            eye_x = transform.eye.x,
            eye_y = transform.eye.y,
            eye_z = transform.eye.z,
            "camera_transform"
        );
    }
}
