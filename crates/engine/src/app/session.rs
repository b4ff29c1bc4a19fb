use tracing::{debug, info, trace, warn};

use super::appearance::{AppearanceStateMachine, RenderCommand, Representation};
use super::camera::{CameraTransform, FollowCameraConfig, ViewportFollowCamera};
use super::geo::{bearing_degrees_from_heading, CoordinateBridge, GeoBounds, GeoPoint, LocalPoint};
use super::input::TickInput;
use super::locomotion::{LocomotionConfig, LocomotionController, LocomotionState};
use super::proximity::{
    Collectible, CollectOutcome, ProximityConfig, ProximityReport, ProximityTracker,
};
use crate::progress::{ProgressError, ProgressRecord};

/// Avatar hover height above the scene plane, in scene units.
pub const AVATAR_HEIGHT_UNITS: f64 = 2.0;

/// Map-tile viewport collaborator. The session pushes a center and
/// bearing every tick; reads come back during bounds enforcement.
pub trait MapViewport {
    fn set_center(&mut self, center: GeoPoint);
    fn set_bearing_degrees(&mut self, bearing: f64);
    fn center(&self) -> GeoPoint;
    fn bearing_degrees(&self) -> f64;
}

/// 3D scene collaborator. Receives the avatar pose, the appearance
/// command, and the camera transform each tick.
pub trait SceneRenderer {
    fn set_avatar_transform(&mut self, position: LocalPoint, heading_radians: f64);
    fn apply_appearance(&mut self, command: &RenderCommand);
    fn set_camera(&mut self, transform: &CameraTransform);
}

/// Persistent progress collaborator.
pub trait ProgressStore {
    fn load(&mut self) -> Result<Option<ProgressRecord>, ProgressError>;
    fn save(&mut self, record: &ProgressRecord) -> Result<(), ProgressError>;
}

/// Plain data for whatever UI surface displays score and hints.
#[derive(Debug, Clone, PartialEq)]
pub struct HudState {
    pub score: u32,
    pub collected: usize,
    pub total: usize,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Collected { reward: u32 },
    QuestComplete,
}

#[derive(Debug)]
pub struct TickOutcome {
    pub hud: HudState,
    pub events: Vec<SessionEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickStage {
    Locomotion,
    ViewportSync,
    Appearance,
    FollowCamera,
    BoundsEnforce,
    Proximity,
}

impl TickStage {
    const fn name(self) -> &'static str {
        match self {
            TickStage::Locomotion => "Locomotion",
            TickStage::ViewportSync => "ViewportSync",
            TickStage::Appearance => "Appearance",
            TickStage::FollowCamera => "FollowCamera",
            TickStage::BoundsEnforce => "BoundsEnforce",
            TickStage::Proximity => "Proximity",
        }
    }
}

/// Stage order for a tick. The dispatch loop walks this array and
/// nothing else decides ordering.
const TICK_STAGE_ORDER: [TickStage; 6] = [
    TickStage::Locomotion,
    TickStage::ViewportSync,
    TickStage::Appearance,
    TickStage::FollowCamera,
    TickStage::BoundsEnforce,
    TickStage::Proximity,
];

pub const TICK_STAGE_ORDER_TEXT: &str =
    "Locomotion>ViewportSync>Appearance>FollowCamera>BoundsEnforce>Proximity";

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub origin: GeoPoint,
    pub bounds: GeoBounds,
    pub locomotion: LocomotionConfig,
    pub camera: FollowCameraConfig,
    pub proximity: ProximityConfig,
}

/// Owns the per-tick simulation: locomotion, viewport sync, appearance,
/// follow camera, bounds enforcement, and proximity, in that order, plus
/// the collect and reset-view input edges.
pub struct Session {
    bridge: CoordinateBridge,
    bounds: GeoBounds,
    locomotion: LocomotionController,
    appearance: AppearanceStateMachine,
    camera: ViewportFollowCamera,
    camera_config: FollowCameraConfig,
    tracker: ProximityTracker,
    collectibles: Vec<Collectible>,
    score: u32,
    last_report: ProximityReport,
}

impl Session {
    pub fn new(config: SessionConfig, collectibles: Vec<Collectible>) -> Self {
        let bridge = CoordinateBridge::new(config.origin);
        let spawn = LocalPoint::new(0.0, AVATAR_HEIGHT_UNITS, 0.0);
        Self {
            bridge,
            bounds: config.bounds,
            locomotion: LocomotionController::new(
                config.locomotion,
                LocomotionState::at(spawn, 0.0),
            ),
            appearance: AppearanceStateMachine::new(),
            camera: ViewportFollowCamera::new(),
            camera_config: config.camera,
            tracker: ProximityTracker::new(config.proximity),
            collectibles,
            score: 0,
            last_report: ProximityReport::default(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn avatar_geo(&self) -> GeoPoint {
        self.bridge.to_geo(self.locomotion.state().position)
    }

    /// Applies a loaded progress record. A session restored from a
    /// finished quest must not re-fire the completion edge later.
    pub fn restore_progress(&mut self, record: &ProgressRecord) {
        record.apply_to(&mut self.collectibles);
        self.score = record.score;
        let _ = self.tracker.take_completion_edge(&self.collectibles);
    }

    pub fn representation_ready(&mut self, representation: Representation) {
        self.appearance.mark_loaded(representation);
        info!(representation = ?representation, "representation_loaded");
    }

    pub fn representation_failed(&mut self, representation: Representation) {
        self.appearance.mark_failed(representation);
        warn!(representation = ?representation, "representation_load_failed");
    }

    /// Re-centers the viewport on the avatar and re-asserts its bearing.
    pub fn reset_view(&self, viewport: &mut dyn MapViewport) {
        let state = self.locomotion.state();
        viewport.set_center(self.bounds.clamp(self.bridge.to_geo(state.position)));
        viewport.set_bearing_degrees(bearing_degrees_from_heading(state.heading));
        debug!("view_reset");
    }

    pub fn hud(&self) -> HudState {
        HudState {
            score: self.score,
            collected: self
                .collectibles
                .iter()
                .filter(|item| item.collected)
                .count(),
            total: self.collectibles.len(),
            hint: self.last_report.hint_text(),
        }
    }

    /// Runs one fixed tick against the collaborators.
    pub fn tick(
        &mut self,
        input: &TickInput,
        dt_ticks: f64,
        viewport: &mut dyn MapViewport,
        renderer: &mut dyn SceneRenderer,
        store: &mut dyn ProgressStore,
    ) -> TickOutcome {
        for stage in TICK_STAGE_ORDER {
            self.run_stage(stage, input, dt_ticks, viewport, renderer);
        }

        let mut events = Vec::new();
        if input.collect_pressed() {
            self.handle_collect_edge(store, &mut events);
        }
        if input.reset_view_pressed() {
            self.reset_view(viewport);
        }

        TickOutcome {
            hud: self.hud(),
            events,
        }
    }

    fn run_stage(
        &mut self,
        stage: TickStage,
        input: &TickInput,
        dt_ticks: f64,
        viewport: &mut dyn MapViewport,
        renderer: &mut dyn SceneRenderer,
    ) {
        trace!(stage = stage.name(), "tick_stage");
        match stage {
            TickStage::Locomotion => {
                self.locomotion.tick(input.intent(), dt_ticks);
            }
            TickStage::ViewportSync => {
                let state = self.locomotion.state();
                viewport.set_center(self.bridge.to_geo(state.position));
                viewport.set_bearing_degrees(bearing_degrees_from_heading(state.heading));
                renderer.set_avatar_transform(state.position, state.heading);
            }
            TickStage::Appearance => {
                let state = self.locomotion.state();
                if let Some(command) = self.appearance.update(&state, dt_ticks) {
                    renderer.apply_appearance(&command);
                }
            }
            TickStage::FollowCamera => {
                let state = self.locomotion.state();
                if let Some(transform) =
                    self.camera
                        .update(Some(state.position), state.heading, &self.camera_config)
                {
                    renderer.set_camera(&transform);
                }
            }
            TickStage::BoundsEnforce => {
                let center = viewport.center();
                let clamped = self.bounds.clamp(center);
                if clamped != center {
                    let state = self.locomotion.state();
                    let mut corrected = self.bridge.to_local(clamped);
                    corrected.y = state.position.y;
                    viewport.set_center(clamped);
                    self.locomotion.set_position(corrected);
                    renderer.set_avatar_transform(corrected, state.heading);
                    debug!(center = %clamped, "viewport_clamped_to_bounds");
                }
            }
            TickStage::Proximity => {
                self.last_report = self.tracker.evaluate(self.avatar_geo(), &self.collectibles);
            }
        }
    }

    fn handle_collect_edge(&mut self, store: &mut dyn ProgressStore, events: &mut Vec<SessionEvent>) {
        let Some(target_id) = self
            .last_report
            .nearest
            .as_ref()
            .map(|nearest| nearest.id.clone())
        else {
            return;
        };

        let avatar = self.avatar_geo();
        match self
            .tracker
            .try_collect(avatar, &target_id, &mut self.collectibles)
        {
            CollectOutcome::Collected { reward } => {
                self.score = self.score.saturating_add(reward);
                info!(target_id = %target_id, reward, score = self.score, "item_collected");
                events.push(SessionEvent::Collected { reward });

                let record = ProgressRecord::capture(self.score, &self.collectibles);
                if let Err(error) = store.save(&record) {
                    warn!(error = %error, "progress_save_failed");
                }

                if self.tracker.take_completion_edge(&self.collectibles) {
                    info!(score = self.score, "quest_complete");
                    events.push(SessionEvent::QuestComplete);
                }

                self.last_report = self.tracker.evaluate(avatar, &self.collectibles);
            }
            CollectOutcome::OutOfRange => {
                debug!(target_id = %target_id, "collect_out_of_range");
            }
            CollectOutcome::AlreadyCollected | CollectOutcome::UnknownTarget => {}
        }
    }
}
