use super::geo::LocalPoint;

/// Per-tick low-pass factor for the camera eye.
pub const CAMERA_LERP_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCameraConfig {
    /// How far behind the avatar the eye sits, along -heading.
    pub distance: f64,
    /// Eye height above the avatar.
    pub height: f64,
    pub lerp_factor: f64,
}

impl Default for FollowCameraConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            height: 5.0,
            lerp_factor: CAMERA_LERP_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub eye: LocalPoint,
    pub target: LocalPoint,
}

/// Smoothed chase camera. The eye trails the desired pose through a
/// first-order low-pass; the look-at target is the avatar itself every
/// tick, so framing never lags even while the eye catches up.
#[derive(Debug, Default)]
pub struct ViewportFollowCamera {
    current: Option<CameraTransform>,
}

impl ViewportFollowCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<CameraTransform> {
        self.current
    }

    /// Advances the camera. With no avatar position (or degenerate
    /// inputs) the camera stays where it is.
    pub fn update(
        &mut self,
        avatar: Option<LocalPoint>,
        heading_radians: f64,
        config: &FollowCameraConfig,
    ) -> Option<CameraTransform> {
        let Some(position) = avatar else {
            return self.current;
        };
        if !position.is_finite() || !heading_radians.is_finite() {
            return self.current;
        }

        let (sin_h, cos_h) = heading_radians.sin_cos();
        let desired_eye = LocalPoint {
            x: position.x + sin_h * config.distance,
            y: position.y + config.height,
            z: position.z + cos_h * config.distance,
        };

        let eye = match self.current {
            Some(previous) => lerp_point(previous.eye, desired_eye, config.lerp_factor),
            None => desired_eye,
        };

        let next = CameraTransform {
            eye,
            target: position,
        };
        self.current = Some(next);
        self.current
    }
}

fn lerp_point(from: LocalPoint, to: LocalPoint, t: f64) -> LocalPoint {
    LocalPoint {
        x: from.x + (to.x - from.x) * t,
        y: from.y + (to.y - from.y) * t,
        z: from.z + (to.z - from.z) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_snaps_to_desired_pose() {
        let mut camera = ViewportFollowCamera::new();
        let avatar = LocalPoint::new(0.0, 2.0, 0.0);
        let transform = camera
            .update(Some(avatar), 0.0, &FollowCameraConfig::default())
            .expect("transform");

        // Heading 0: forward is -z, so the eye sits at +z behind the avatar.
        assert!((transform.eye.z - 10.0).abs() < 1e-12);
        assert!((transform.eye.y - 7.0).abs() < 1e-12);
        assert!(transform.eye.x.abs() < 1e-12);
        assert_eq!(transform.target, avatar);
    }

    #[test]
    fn eye_moves_a_tenth_of_the_gap_each_tick() {
        let mut camera = ViewportFollowCamera::new();
        let config = FollowCameraConfig::default();
        camera.update(Some(LocalPoint::default()), 0.0, &config);

        // Teleport the avatar 10 units along -z; desired eye moves to z=0.
        let avatar = LocalPoint::new(0.0, 0.0, -10.0);
        let transform = camera.update(Some(avatar), 0.0, &config).expect("transform");
        assert!((transform.eye.z - 9.0).abs() < 1e-12, "z = {}", transform.eye.z);
    }

    #[test]
    fn target_is_always_the_avatar_even_while_eye_lags() {
        let mut camera = ViewportFollowCamera::new();
        let config = FollowCameraConfig::default();
        camera.update(Some(LocalPoint::default()), 0.0, &config);

        let avatar = LocalPoint::new(5.0, 0.0, -3.0);
        let transform = camera.update(Some(avatar), 1.2, &config).expect("transform");
        assert_eq!(transform.target, avatar);
    }

    #[test]
    fn eye_converges_on_desired_pose_under_constant_input() {
        let mut camera = ViewportFollowCamera::new();
        let config = FollowCameraConfig::default();
        let avatar = LocalPoint::new(0.0, 0.0, -10.0);

        camera.update(Some(LocalPoint::default()), 0.0, &config);
        for _ in 0..200 {
            camera.update(Some(avatar), 0.0, &config);
        }
        let transform = camera.current().expect("transform");
        assert!((transform.eye.z - 0.0).abs() < 1e-6);
    }

    #[test]
    fn missing_avatar_keeps_camera_put() {
        let mut camera = ViewportFollowCamera::new();
        let config = FollowCameraConfig::default();
        let before = camera
            .update(Some(LocalPoint::default()), 0.0, &config)
            .expect("transform");

        let after = camera.update(None, 0.0, &config).expect("transform");
        assert_eq!(after, before);
    }

    #[test]
    fn non_finite_heading_keeps_camera_put() {
        let mut camera = ViewportFollowCamera::new();
        let config = FollowCameraConfig::default();
        let before = camera
            .update(Some(LocalPoint::default()), 0.0, &config)
            .expect("transform");

        let after = camera
            .update(Some(LocalPoint::default()), f64::NAN, &config)
            .expect("transform");
        assert_eq!(after, before);
    }

    #[test]
    fn camera_starts_with_no_transform() {
        let camera = ViewportFollowCamera::new();
        assert!(camera.current().is_none());
    }
}
