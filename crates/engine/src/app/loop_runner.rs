use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::rendering::{Renderer, Viewport};
use super::{Game, InputAction, InputSnapshot};

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Delay between the start of one tick and the start of the next.
    pub tick_interval: Duration,
    pub clear_color: [u8; 4],
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tanks".to_string(),
            window_width: 640,
            window_height: 480,
            tick_interval: DEFAULT_TICK_INTERVAL,
            clear_color: [0, 0, 0, 255],
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens a window and drives `game` on a fixed-delay tick until the window
/// closes or Escape is pressed.
pub fn run_app(config: LoopConfig, mut game: Box<dyn Game>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let viewport = Viewport {
        width: config.window_width.max(1),
        height: config.window_height.max(1),
    };
    let mut renderer = Renderer::new(Arc::clone(&window), viewport, config.clear_color)
        .map_err(AppError::CreateRenderer)?;

    let tick_interval = normalize_non_zero_duration(config.tick_interval, DEFAULT_TICK_INTERVAL);
    let mut scheduler = TickScheduler::new(tick_interval);
    let mut input_collector = InputCollector::default();
    info!(
        canvas_width = viewport.width,
        canvas_height = viewport.height,
        tick_interval_ms = tick_interval.as_millis() as u64,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
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
                    if !scheduler.is_due(now) {
                        if let Err(error) = renderer.present() {
                            warn!(error = %error, "renderer_present_failed");
                            window_target.exit();
                        }
                        return;
                    }

                    let lateness = scheduler.record_tick(now);
                    if lateness > tick_interval {
                        warn!(
                            late_ms = lateness.as_millis() as u64,
                            tick = scheduler.ticks_run(),
                            "tick_late"
                        );
                    }
                    let input_snapshot = input_collector.snapshot_for_tick();
                    game.update(&input_snapshot);
                    if let Err(error) = renderer.render_frame(game.as_mut()) {
                        warn!(error = %error, tick = scheduler.ticks_run(), "tick_draw_failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => match scheduler.wait_deadline(Instant::now()) {
                Some(deadline) => window_target.set_control_flow(ControlFlow::WaitUntil(deadline)),
                None => {
                    window_target.set_control_flow(ControlFlow::Wait);
                    window.request_redraw();
                }
            },
            Event::LoopExiting => {
                game.shutdown();
                info!(ticks = scheduler.ticks_run(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Fixed-delay tick timing: the next tick is due one interval after the
/// previous tick started. Missed ticks are not replayed.
#[derive(Debug, Clone)]
struct TickScheduler {
    interval: Duration,
    last_tick: Option<Instant>,
    ticks_run: u64,
}

impl TickScheduler {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
            ticks_run: 0,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        self.wait_deadline(now).is_none()
    }

    /// Deadline to sleep until, or `None` when a tick is due now.
    fn wait_deadline(&self, now: Instant) -> Option<Instant> {
        let deadline = self.last_tick? + self.interval;
        (deadline > now).then_some(deadline)
    }

    /// Marks a tick as started at `now`; returns how far past its deadline it started.
    fn record_tick(&mut self, now: Instant) -> Duration {
        let lateness = match self.last_tick {
            Some(last) => now.saturating_duration_since(last + self.interval),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        self.ticks_run = self.ticks_run.saturating_add(1);
        debug!(tick = self.ticks_run, "tick");
        lateness
    }

    fn ticks_run(&self) -> u64 {
        self.ticks_run
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct EdgeTrigger {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeTrigger {
    fn handle(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    rotate_left: EdgeTrigger,
    rotate_right: EdgeTrigger,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let Some(action) = action_for_key(key) else {
            return;
        };
        self.action_states.set(action, is_pressed);
        match action {
            InputAction::RotateLeft => self.rotate_left.handle(state),
            InputAction::RotateRight => self.rotate_right.handle(state),
            InputAction::Quit if is_pressed => self.mark_quit_requested(),
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.action_states,
            self.rotate_left.take(),
            self.rotate_right.take(),
            self.quit_requested,
        )
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
            Some(InputAction::MoveUp)
        }
        PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
            Some(InputAction::MoveDown)
        }
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            Some(InputAction::MoveLeft)
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            Some(InputAction::MoveRight)
        }
        PhysicalKey::Code(KeyCode::KeyQ) => Some(InputAction::RotateLeft),
        PhysicalKey::Code(KeyCode::KeyE) => Some(InputAction::RotateRight),
        PhysicalKey::Code(KeyCode::Escape) => Some(InputAction::Quit),
        _ => None,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
