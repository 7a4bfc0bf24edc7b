use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;
use crate::ui_tree::UiInput;

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
    /// Redraw cap; the loop sleeps between frames instead of spinning.
    pub target_fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: String::from("app"),
            desired_size: PhysicalSize::new(1280, 720),
            clamp_to_monitor: true,
            vsync: None,
            target_fps: 60,
        }
    }
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
    pub surface_size: SurfaceSize,
}

/// Input gathered since the previous frame.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_down: bool,
    pub mouse_up: bool,
    pub keys_pressed: Vec<VirtualKeyCode>,
}

impl InputFrame {
    pub fn ui_input(&self) -> UiInput {
        UiInput {
            mouse_pos: self.mouse_pos,
            mouse_down: self.mouse_down,
            mouse_up: self.mouse_up,
        }
    }

    fn end_frame(&mut self) {
        self.mouse_down = false;
        self.mouse_up = false;
        self.keys_pressed.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A windowed application driven by [`run_app`].
///
/// Every callback runs to completion on the event-loop thread.
pub trait App {
    fn init(&mut self, _size: SurfaceSize) {}

    fn resized(&mut self, _size: SurfaceSize) {}

    /// Called once per frame before rendering.
    fn update(&mut self, input: &InputFrame, now: Instant) -> AppControl;

    fn render(&mut self, renderer: &mut dyn Renderer2d);

    /// Earliest instant the app needs to run again even if no frame is due.
    fn next_wakeup(&self) -> Option<Instant> {
        None
    }
}

fn initial_size(config: &AppConfig, event_loop: &EventLoop<()>) -> PhysicalSize<u32> {
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    match monitor_size {
        Some(monitor) => PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        ),
        None => config.desired_size,
    }
}

pub fn run_app<A: App + 'static>(config: AppConfig, mut app: A) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(initial_size(&config, &event_loop))
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width.max(1), window_size.height.max(1));

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut pixels_builder =
        PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        pixels_builder = pixels_builder.enable_vsync(vsync);
    }
    let pixels = pixels_builder.build()?;
    let renderer = PixelsRenderer2d::new(pixels, surface_size)?;

    let mut ctx = AppContext {
        window,
        renderer,
        surface_size,
    };
    app.init(ctx.surface_size);
    log::debug!(
        "window ready: {}x{}",
        ctx.surface_size.width,
        ctx.surface_size.height
    );

    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.target_fps.max(1)));
    let mut next_redraw = Instant::now();
    let mut input = InputFrame::default();

    event_loop.run(move |event, _, control_flow| {
        let wake_at = match app.next_wakeup() {
            Some(at) => at.min(next_redraw),
            None => next_redraw,
        };
        *control_flow = ControlFlow::WaitUntil(wake_at);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let size = SurfaceSize::new(size.width, size.height);
                    match ctx.renderer.resize(size) {
                        Ok(()) if !size.is_empty() => {
                            ctx.surface_size = size;
                            app.resized(size);
                        }
                        Ok(()) => {}
                        Err(err) => log::warn!("resize failed: {err}"),
                    }
                    ctx.window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.mouse_pos = Some((position.x.max(0.0) as u32, position.y.max(0.0) as u32));
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => input.mouse_down = true,
                    ElementState::Released => input.mouse_up = true,
                },
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    input.keys_pressed.push(key);
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                if app.update(&input, now) == AppControl::Exit {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                input.end_frame();

                ctx.renderer.draw_frame(|gfx| app.render(gfx));
                if let Err(err) = ctx.renderer.present() {
                    log::error!("present failed: {err}");
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                let wakeup_due = app.next_wakeup().is_some_and(|at| at <= now);
                if now >= next_redraw || wakeup_due {
                    next_redraw = now + frame_interval;
                    ctx.window.request_redraw();
                }
            }
            _ => {}
        }
    });
}
