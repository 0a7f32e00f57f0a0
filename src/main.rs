use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use morphfall::prelude::*;
use morphfall::render::GpuState;
use morphfall::shape::SHAPE_PERIOD;
use morphfall::ParticleGpu;

const TITLE_INTERVAL: Duration = Duration::from_millis(500);

struct App {
    pipeline: Pipeline,
    extractor: GridExtractor,
    time: Time,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    last_title: Instant,
}

impl App {
    fn new(pipeline: Pipeline, extractor: GridExtractor) -> Self {
        let period = SHAPE_PERIOD * ShapeLibrary.len() as f32;
        Self {
            pipeline,
            extractor,
            time: Time::new().with_loop_period(period),
            window: None,
            gpu_state: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            last_title: Instant::now(),
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (t, dt) = self.time.update();
        if let Err(e) = self.pipeline.step(&mut self.extractor, FrameInput { t, dt }) {
            error!("pipeline step failed: {}", e);
            event_loop.exit();
            return;
        }

        let particles: Vec<ParticleGpu> = self
            .pipeline
            .particles()
            .iter()
            .map(|p| p.to_gpu())
            .collect();

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        gpu_state.upload(self.pipeline.triangle_vertices(), &particles);

        match gpu_state.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => gpu_state.resize(winit::dpi::PhysicalSize {
                width: gpu_state.config.width,
                height: gpu_state.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(e) => error!("render error: {:?}", e),
        }

        if self.last_title.elapsed() >= TITLE_INTERVAL {
            self.last_title = Instant::now();
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "morphfall [{}] — {}",
                    self.pipeline.shape_name(t),
                    self.pipeline.status(self.time.fps()),
                ));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attrs = Window::default_attributes()
                .with_title("morphfall")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    error!("window creation failed: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            let config = self.pipeline.config();
            let gpu_state = pollster::block_on(GpuState::new(
                window,
                config.triangle_capacity,
                config.particle_capacity,
            ));
            match gpu_state {
                Ok(gpu_state) => self.gpu_state = Some(gpu_state),
                Err(e) => {
                    error!("GPU initialization failed: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.yaw -= dx as f32 * 0.005;
                            gpu_state.camera.pitch += dy as f32 * 0.005;
                            gpu_state.camera.pitch = gpu_state.camera.pitch.clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.distance -= scroll * 0.3;
                    gpu_state.camera.distance = gpu_state.camera.distance.clamp(0.5, 20.0);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn print_help(program: &str) {
    eprintln!("usage: {} [xsize [ysize zsize]]", program);
    eprintln!();
    eprintln!("where [xy]size is the grid resolution along each axis,");
    eprintln!("defaulting to 64 samples per axis.");
    eprintln!();
    eprintln!("controls: drag to orbit, scroll to zoom.");
}

/// Grid from the command line: no args is the 64-cube, one arg a cube of
/// that size, three args per-axis sizes.
fn parse_grid(args: &[String]) -> Result<[u32; 3], String> {
    let parse = |s: &String| {
        s.parse::<u32>()
            .map_err(|_| format!("not a grid size: {:?}", s))
    };
    match args {
        [] => Ok([64, 64, 64]),
        [x] => {
            let x = parse(x)?;
            Ok([x, x, x])
        }
        [x, y, z] => Ok([parse(x)?, parse(y)?, parse(z)?]),
        _ => Err("expected zero, one or three grid sizes".to_string()),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = args.remove(0);
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help(&program);
        return ExitCode::SUCCESS;
    }

    let grid = match parse_grid(&args) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("{}", e);
            print_help(&program);
            return ExitCode::FAILURE;
        }
    };

    let config = PipelineConfig {
        grid,
        ..Default::default()
    };
    let pipeline = match Pipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let extractor = GridExtractor::new(grid);
    info!("sampling grid {}x{}x{}", grid[0], grid[1], grid[2]);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("event loop creation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(pipeline, extractor);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
