use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use hangar_assets::{LoadHandle, ModelLoader};
use hangar_input::{KeyDisposition, MoveAction, normalize_key};
use hangar_kernel::{HangarConfig, LoadOutcome, Session};
use hangar_render_wgpu::{OrbitCamera, WgpuRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

const TITLE: &str = "THE MILLENNIUM FALCON";
const LOADING: &str = "Engaging Hyperdrive...";
/// Scroll pixels that count as one wheel line on touchpads.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "hangar-desktop", about = "Hangar model viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// glTF asset to load (overrides the config file)
    #[arg(long)]
    asset: Option<PathBuf>,

    /// YAML tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only suppress keys bound to a movement action
    #[arg(long)]
    mapped_keys_only: bool,
}

/// Window-independent viewer state.
struct AppState {
    session: Session,
    camera: OrbitCamera,
    loader: Option<LoadHandle>,
    instructions: String,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl AppState {
    fn new(config: &HangarConfig) -> Self {
        tracing::info!(asset = %config.asset.display(), "loading model");
        Self {
            session: Session::new(config),
            camera: OrbitCamera::default(),
            loader: Some(ModelLoader::new(config.asset.clone()).spawn()),
            instructions: instruction_line(),
            dragging: false,
            last_cursor: None,
        }
    }

    /// Drain loader events. Returns true when a model was attached this frame.
    fn poll_loader(&mut self) -> bool {
        let Some(handle) = &mut self.loader else {
            return false;
        };
        let mut attached = false;
        for event in handle.poll() {
            if self.session.apply_load_event(event) == LoadOutcome::Attached {
                attached = true;
            }
        }
        if handle.is_finished() {
            self.loader = None;
        }
        attached
    }

    fn handle_key(&mut self, event: &KeyEvent) -> KeyDisposition {
        let Some(name) = key_name(&event.logical_key) else {
            return KeyDisposition::PassThrough;
        };
        match event.state {
            ElementState::Pressed => self.session.key_down(&name),
            ElementState::Released => self.session.key_up(&name),
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>, viewport_height: f32) {
        if self.dragging {
            if let Some(last) = self.last_cursor {
                let dx = (position.x - last.x) as f32;
                let dy = (position.y - last.y) as f32;
                self.camera.rotate(dx, dy, viewport_height);
            }
        }
        self.last_cursor = Some(position);
    }

    fn shutdown(&mut self) {
        self.session.dispose();
        // Dropping the handle closes the channel; a late result is discarded.
        self.loader = None;
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        egui::Area::new(egui::Id::new("title"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(
                        egui::RichText::new(TITLE)
                            .color(egui::Color32::WHITE)
                            .strong(),
                    );
                    ui.label(
                        egui::RichText::new(&self.instructions).color(egui::Color32::LIGHT_GRAY),
                    );
                    if !self.session.model_loaded() {
                        ui.add_space(8.0);
                        ui.label(egui::RichText::new(LOADING).color(egui::Color32::WHITE));
                    }
                });
            });
    }
}

/// Browser-style key identifier for a logical key: lowercase characters and
/// lowercase named keys such as `arrowup`.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(normalize_key(c)),
        Key::Named(named) => Some(normalize_key(&format!("{named:?}"))),
        _ => None,
    }
}

fn instruction_line() -> String {
    let bindings: Vec<String> = MoveAction::ALL
        .iter()
        .map(|action| {
            let key = match action.key() {
                "arrowup" => "↑".to_string(),
                "arrowdown" => "↓".to_string(),
                other => other.to_uppercase(),
            };
            format!("{key}: {}", action.label())
        })
        .collect();
    format!("{}  |  drag: orbit  |  scroll: zoom", bindings.join("  "))
}

/// Window, surface and GPU resources. Created on resume, dropped on close.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn init(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Millennium Falcon")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("hangar_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        // egui draws onto the resolved surface view, so it stays single-sampled.
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render_frame(&mut self, egui_ctx: &EguiContext, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.camera,
            state.session.scene(),
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: &HangarConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::init(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                self.init_error = Some(e);
                self.state.shutdown();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Consumed keys never reach the overlay.
        if let WindowEvent::KeyboardInput { event: key_event, .. } = &event {
            if self.state.handle_key(key_event) == KeyDisposition::Suppressed {
                return;
            }
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.shutdown();
                self.gpu = None;
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.camera.aspect = gpu.aspect();
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .handle_cursor(position, gpu.config.height as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.last_cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => {
                if !self.state.session.is_running() {
                    return;
                }
                if self.state.poll_loader() {
                    if let Some(instance) = self.state.session.scene().model() {
                        gpu.renderer.upload_model(&gpu.device, &gpu.queue, &instance.model);
                    }
                }
                self.state.session.tick();
                self.state.camera.update();
                gpu.render_frame(&self.egui_ctx, &self.state);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.state.session.is_running() {
            return;
        }
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => HangarConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HangarConfig::default(),
    }
    .with_overrides(cli.asset, cli.mapped_keys_only);

    tracing::info!("hangar-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&config);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NamedKey;

    #[test]
    fn key_names_match_browser_identifiers() {
        assert_eq!(key_name(&Key::Character("W".into())).as_deref(), Some("w"));
        assert_eq!(
            key_name(&Key::Named(NamedKey::ArrowUp)).as_deref(),
            Some("arrowup")
        );
        assert_eq!(
            key_name(&Key::Named(NamedKey::ArrowDown)).as_deref(),
            Some("arrowdown")
        );
    }

    #[test]
    fn instruction_line_lists_every_binding() {
        let line = instruction_line();
        for action in MoveAction::ALL {
            assert!(line.contains(action.label()), "missing {action:?}");
        }
        assert!(line.contains("↑: ascend"));
    }
}
