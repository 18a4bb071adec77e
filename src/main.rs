use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use umbra::{initialize, vk, AppBuilder, FrameOutcome, Movement, RendererBuilder, SceneMode, ShadowRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum PresentMode {
    Mailbox,
    Fifo,
    Immediate,
}

impl From<PresentMode> for vk::PresentModeKHR {
    fn from(value: PresentMode) -> Self {
        match value {
            PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
            PresentMode::Fifo => vk::PresentModeKHR::FIFO,
            PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        }
    }
}

/// Renders a scene lit by an orbiting light, with shadows.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Display the shadow map instead of the shaded scene.
    #[arg(long, alias = "display-shadow-map")]
    debug: bool,
    /// OBJ model to render instead of the built-in scene.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Directory with the compiled SPIR-V shaders.
    #[arg(long, default_value = "shaders")]
    shaders: PathBuf,
    #[arg(long, default_value_t = 1024)]
    shadow_map_size: u32,
    /// Enable the Vulkan validation layers.
    #[arg(long)]
    validation: bool,
    #[arg(long, value_enum)]
    present_mode: Option<PresentMode>,
}

/// Mouse buttons held down and the last cursor position.
#[derive(Debug, Default)]
struct Mouse {
    rotating: bool,
    panning: bool,
    last: Option<(f32, f32)>,
}

fn movement(key: VirtualKeyCode) -> Option<Movement> {
    match key {
        VirtualKeyCode::W => Some(Movement::Forward),
        VirtualKeyCode::S => Some(Movement::Backward),
        VirtualKeyCode::A => Some(Movement::Left),
        VirtualKeyCode::D => Some(Movement::Right),
        _ => None,
    }
}

fn create_renderer(cli: &Cli, window: &Window) -> Result<ShadowRenderer> {
    let mut app = AppBuilder::new()
        .name("umbra")
        .version((0, 1, 0))
        .validation(cli.validation)
        .window(window);
    if let Some(mode) = cli.present_mode {
        app = app.present_mode(mode.into());
    }
    let ctx = initialize(&app.build())?;

    let mut settings = RendererBuilder::new()
        .extent(cli.width, cli.height)
        .shadow_map_size(cli.shadow_map_size)
        .display_shadow_map(cli.debug)
        .shader_dir(&cli.shaders);
    if let Some(model) = &cli.model {
        settings = settings.model(model);
    }
    ShadowRenderer::new(ctx, window, settings.build()?)
}

fn main() {
    let cli = Cli::parse();
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();
    debug!("Configuration: {cli:?}");

    let event_loop = EventLoop::new();
    let setup = WindowBuilder::new()
        .with_title("umbra")
        .with_inner_size(LogicalSize::new(cli.width, cli.height))
        .build(&event_loop)
        .map_err(anyhow::Error::from)
        .and_then(|window| Ok((create_renderer(&cli, &window)?, window)));
    let (renderer, window) = match setup {
        Ok(setup) => setup,
        Err(err) => {
            error!("Initialization failed: {err:?}");
            std::process::exit(1);
        }
    };

    let mut renderer = Some(renderer);
    let mut mouse = Mouse::default();
    let mut last_frame = Instant::now();
    event_loop.run(move |event, _, control_flow| {
        if let ControlFlow::ExitWithCode(_) = *control_flow {
            return;
        }
        *control_flow = ControlFlow::Poll;
        let Some(r) = renderer.as_mut() else {
            return;
        };

        match event {
            Event::WindowEvent {
                event,
                window_id,
            } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    // Destroys all Vulkan objects while the window is still alive.
                    renderer.take();
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => r.notify_resized(),
                WindowEvent::KeyboardInput {
                    input,
                    ..
                } => {
                    let pressed = input.state == ElementState::Pressed;
                    match input.virtual_keycode {
                        Some(VirtualKeyCode::Space) if !pressed => r.toggle_pause(),
                        Some(VirtualKeyCode::Tab) if !pressed => {
                            let mode = match r.scene_mode() {
                                SceneMode::Shaded => SceneMode::ShadowMapDebug,
                                SceneMode::ShadowMapDebug => SceneMode::Shaded,
                            };
                            info!("Switched to {mode:?}");
                            r.set_scene_mode(mode);
                        }
                        Some(key) => {
                            if let Some(movement) = movement(key) {
                                r.camera_mut().set_key(movement, pressed);
                            }
                        }
                        None => {}
                    }
                }
                WindowEvent::MouseInput {
                    button,
                    state,
                    ..
                } => {
                    let pressed = state == ElementState::Pressed;
                    match button {
                        MouseButton::Left => mouse.rotating = pressed,
                        MouseButton::Right => mouse.panning = pressed,
                        _ => {}
                    }
                }
                WindowEvent::CursorMoved {
                    position,
                    ..
                } => {
                    let current = (position.x as f32, position.y as f32);
                    if let Some((x, y)) = mouse.last {
                        let (dx, dy) = (current.0 - x, current.1 - y);
                        if mouse.rotating {
                            r.camera_mut().rotate(dx, dy);
                        }
                        if mouse.panning {
                            r.camera_mut().pan(dx, dy);
                        }
                    }
                    mouse.last = Some(current);
                }
                _ => {}
            },
            Event::MainEventsCleared => window.request_redraw(),
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                r.update((now - last_frame).as_secs_f32());
                last_frame = now;
                match r.draw_frame(&window) {
                    Ok(FrameOutcome::Recreated) => debug!("Swapchain recreated during frame {}", r.frame_count()),
                    Ok(_) => {}
                    Err(err) => {
                        error!("Rendering failed: {err:?}");
                        renderer.take();
                        *control_flow = ControlFlow::ExitWithCode(1);
                    }
                }
            }
            _ => {}
        }
    })
}
