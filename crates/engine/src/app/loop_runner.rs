use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, AvatarAction, MotionIntent, TickInput};
use super::metrics::MetricsAccumulator;
use super::session::{HudState, MapViewport, ProgressStore, SceneRenderer, Session, SessionEvent};
use super::MetricsHandle;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Blue Jay Quest".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    session: Session,
    viewport: Box<dyn MapViewport>,
    renderer: Box<dyn SceneRenderer>,
    store: Box<dyn ProgressStore>,
) -> Result<(), AppError> {
    run_app_with_metrics(config, session, viewport, renderer, store, MetricsHandle::default())
}

/// Runs the fixed-timestep loop until quit. The window carries the HUD
/// in its title; the collaborators do all actual presentation.
pub fn run_app_with_metrics(
    config: LoopConfig,
    mut session: Session,
    mut viewport: Box<dyn MapViewport>,
    mut renderer: Box<dyn SceneRenderer>,
    mut store: Box<dyn ProgressStore>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    let mut latest_hud: Option<HudState> = None;
                    for _ in 0..step_plan.ticks_to_run {
                        let input = input_collector.snapshot_for_tick();
                        let outcome = session.tick(
                            &input,
                            1.0,
                            viewport.as_mut(),
                            renderer.as_mut(),
                            store.as_mut(),
                        );
                        for event in &outcome.events {
                            if matches!(event, SessionEvent::QuestComplete) {
                                info!("all_items_collected");
                            }
                        }
                        latest_hud = Some(outcome.hud);
                        metrics_accumulator.record_tick();
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if let Some(hud) = latest_hud {
                        let next_title = hud_title(&config.window_title, &hud);
                        if last_applied_title.as_deref() != Some(next_title.as_str()) {
                            window.set_title(&next_title);
                            last_applied_title = Some(next_title);
                        }
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn hud_title(base_title: &str, hud: &HudState) -> String {
    let mut title = format!(
        "{base_title} | Score {} | Items {}/{}",
        hud.score, hud.collected, hud.total
    );
    if hud.total > 0 && hud.collected == hud.total {
        title.push_str(" | Quest complete!");
    } else if let Some(hint) = &hud.hint {
        title.push_str(" | ");
        title.push_str(hint);
    }
    title
}

/// Accumulates raw key events between ticks. Held avatar actions stay
/// level-triggered; collect and reset-view are single-tick edges cleared
/// by the snapshot.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    collect_key_is_down: bool,
    collect_pressed_edge: bool,
    reset_key_is_down: bool,
    reset_pressed_edge: bool,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        match key_event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(AvatarAction::Forward, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(AvatarAction::Backward, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(AvatarAction::TurnLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(AvatarAction::TurnRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Space) | PhysicalKey::Code(KeyCode::KeyE) => {
                self.handle_collect_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::KeyR) => {
                self.handle_reset_key_state(key_event.state);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn handle_collect_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.collect_key_is_down {
                    self.collect_pressed_edge = true;
                }
                self.collect_key_is_down = true;
            }
            ElementState::Released => self.collect_key_is_down = false,
        }
    }

    fn handle_reset_key_state(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.reset_key_is_down {
                    self.reset_pressed_edge = true;
                }
                self.reset_key_is_down = true;
            }
            ElementState::Released => self.reset_key_is_down = false,
        }
    }

    fn snapshot_for_tick(&mut self) -> TickInput {
        let input = TickInput::empty()
            .with_intent(MotionIntent::from_actions(&self.action_states))
            .with_collect_pressed(self.collect_pressed_edge)
            .with_reset_view_pressed(self.reset_pressed_edge)
            .with_quit_requested(self.quit_requested);
        self.collect_pressed_edge = false;
        self.reset_pressed_edge = false;
        input
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
