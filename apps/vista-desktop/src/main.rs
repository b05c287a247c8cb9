use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::{Vec2, Vec3};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vista_demos::{DEMO_NAMES, Stage};
use vista_input::{Action, ControlAction, PointerButton, PointerState, key_action};
use vista_render_wgpu::{OrbitControls, PerspectiveCamera, SceneRenderer};
use vista_tools::SceneInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "vista-desktop", about = "Interactive viewer for the vista demo scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to run: materials or text
    #[arg(long, default_value = "materials")]
    demo: String,

    /// Material kind for the materials demo
    #[arg(long, default_value = "standard")]
    material: String,

    /// Directory holding the textures/ and fonts/ trees
    #[arg(long, default_value = "./static")]
    assets: PathBuf,

    /// Seed for random placement; a random one is picked and logged if absent
    #[arg(long)]
    seed: Option<u64>,
}

/// Everything that is not GPU plumbing.
struct AppState {
    stage: Stage,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    pointer: PointerState,
    viewport_height: f32,
}

impl AppState {
    fn new(stage: Stage) -> Self {
        let mut camera = PerspectiveCamera::default();
        let controls = OrbitControls::new(Vec3::ZERO, &mut camera);
        Self {
            stage,
            camera,
            controls,
            pointer: PointerState::new(),
            viewport_height: 1.0,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.viewport_height = height.max(1) as f32;
    }

    fn control(&mut self, action: Option<ControlAction>) {
        if let Some(action) = action {
            self.controls.apply(action, &self.camera, self.viewport_height);
        }
    }

    fn handle_key(&mut self, key: &Key) {
        let Key::Character(text) = key else {
            return;
        };
        match key_action(text) {
            Action::TogglePanel => {
                self.stage.toggle_panel();
            }
            Action::Orbit(action) => self.control(Some(action)),
            Action::Noop => {}
        }
    }

    /// Deliver finished loads, pose the scene for the current time and
    /// settle the camera.
    fn update(&mut self) {
        if let Err(e) = self.stage.pump_assets() {
            tracing::error!("failed to apply loaded asset: {e}");
        }
        if let Err(e) = self.stage.tick() {
            tracing::error!("animation update failed: {e}");
        }
        self.controls.update(&mut self.camera);
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.stage.panel().visible() {
            return;
        }

        let tweaks = self.stage.panel().tweaks().to_vec();
        let summary = SceneInspector::summary(self.stage.scene());

        egui::Window::new("Debug")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Demo: {}", self.stage.demo_name()));
                ui.label(format!(
                    "Nodes: {}  Triangles: {}",
                    summary.nodes, summary.triangles
                ));
                ui.label(format!(
                    "Textures: {}/{}  Failed assets: {}",
                    summary.textures_loaded,
                    summary.textures,
                    self.stage.failed_assets()
                ));
                if self.stage.pending_assets() > 0 {
                    ui.label(format!("Loading {} assets...", self.stage.pending_assets()));
                }

                if !tweaks.is_empty() {
                    ui.separator();
                }
                for tweak in &tweaks {
                    let mut value = tweak.value();
                    let slider = egui::Slider::new(&mut value, tweak.min..=tweak.max)
                        .step_by(tweak.step as f64)
                        .text(tweak.label.as_str());
                    if ui.add(slider).changed() {
                        if let Err(e) = self.stage.set_tweak(&tweak.key, value) {
                            tracing::error!("tweak {} rejected: {e}", tweak.key);
                        }
                    }
                }

                ui.separator();
                ui.small("H: Toggle Panel | LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<SceneRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(stage: Stage) -> Self {
        Self {
            state: AppState::new(stage),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(format!("Vista - {}", self.state.stage.demo_name()))
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("vista_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // Shading writes final colour values directly, so the swapchain must
        // not re-encode them.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

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

        self.state.resize(config.width, config.height);

        let renderer = SceneRenderer::new(&device, &queue, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            format = ?surface_format,
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        self.state.update();

        let (Some(window), Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
        ) else {
            return;
        };
        let (Some(renderer), Some(egui_winit), Some(egui_renderer)) = (
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            return;
        };

        let changes = renderer.sync(device, queue, self.state.stage.scene_mut());
        if changes > 0 {
            tracing::trace!(changes, "scene changes applied");
        }

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
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

        renderer.render(device, queue, &view, &self.state.camera, self.state.stage.scene());

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
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
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("GPU initialization failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                if let WindowEvent::MouseInput { button, state, .. } = event {
                    if let Some(button) = pointer_button(button) {
                        self.state.pointer.ui_button(button, state == ElementState::Pressed);
                    }
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.resize(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(&logical_key);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let mods = modifiers.state();
                self.state
                    .pointer
                    .set_pan_modifier(mods.shift_key() || mods.control_key() || mods.super_key());
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = pointer_button(button) {
                    self.state
                        .pointer
                        .button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .state
                    .pointer
                    .moved(Vec2::new(position.x as f32, position.y as f32));
                self.state.control(action);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling away from the user as positive.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
                };
                let action = self.state.pointer.wheel(delta_y);
                self.state.control(action);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(demo = %cli.demo, seed, "vista-desktop starting");

    let demo = vista_demos::create(&cli.demo, &cli.material, seed)
        .with_context(|| format!("available demos: {}", DEMO_NAMES.join(", ")))?;
    let stage = Stage::new(demo, cli.assets)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(stage);
    event_loop.run_app(&mut app)?;

    Ok(())
}
