use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use life::{Config, Grid};
use wgpu::util::DeviceExt;
use wgpu::StoreOp;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "Conway's Game of Life";
const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
const CELL_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const QUAD_VERTEX_COUNT: u32 = 6;

/// One live cell, as a screen-space rectangle in NDC.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CellInstance {
    min: [f32; 2],
    max: [f32; 2],
    color: [f32; 3],
    _pad: f32,
}

struct State {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    pipeline: wgpu::RenderPipeline,
    quad_vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
}

impl State {
    /// `max_cells` bounds the instance buffer; the grid never draws more
    /// cells than it has.
    async fn new(window: Arc<Window>, max_cells: usize) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::from_env_or_default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let surface = instance.create_surface(window.clone()).context("create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .context("request device")?;

        let capabilities = surface.get_capabilities(&adapter);
        let surface_format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(capabilities.formats[0]);
        let present_mode = capabilities
            .present_modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, wgpu::PresentMode::Mailbox))
            .or_else(|| {
                capabilities
                    .present_modes
                    .iter()
                    .copied()
                    .find(|mode| matches!(mode, wgpu::PresentMode::Immediate))
            })
            .unwrap_or(wgpu::PresentMode::Fifo);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: capabilities.alpha_modes[0],
            desired_maximum_frame_latency: 1,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cell_pipeline_layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&[[0.0_f32, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cell_instance_buffer"),
            size: (max_cells * std::mem::size_of::<CellInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cell_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_cell"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<CellInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                offset: 0,
                                shader_location: 1,
                                format: wgpu::VertexFormat::Float32x2,
                            },
                            wgpu::VertexAttribute {
                                offset: 8,
                                shader_location: 2,
                                format: wgpu::VertexFormat::Float32x2,
                            },
                            wgpu::VertexAttribute {
                                offset: 16,
                                shader_location: 3,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            instance,
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            quad_vertex_buffer,
            instance_buffer,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn render(&mut self, instances: &[CellInstance]) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                match err {
                    wgpu::SurfaceError::Lost => {
                        self.surface.configure(&self.device, &self.config);
                    }
                    wgpu::SurfaceError::OutOfMemory => return Err(err),
                    _ => {}
                }
                self.surface.get_current_texture()?
            }
        };

        if !instances.is_empty() {
            let bytes = bytemuck::cast_slice(instances);
            self.queue.write_buffer(&self.instance_buffer, 0, bytes);
        }

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !instances.is_empty() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                let instance_bytes = std::mem::size_of_val(instances) as u64;
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(0..instance_bytes));
                render_pass.draw(0..QUAD_VERTEX_COUNT, 0..instances.len() as u32);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

struct Simulation {
    grid: Grid,
    cell_size: u32,
    instances: Vec<CellInstance>,
}

impl Simulation {
    fn new(config: &Config) -> Self {
        let mut grid = Grid::new(config);
        grid.randomize();
        Self {
            grid,
            cell_size: config.cell_size,
            instances: Vec::with_capacity(config.width * config.height),
        }
    }

    fn advance(&mut self) {
        self.grid.step();
    }

    fn randomize(&mut self) {
        self.grid.randomize();
    }

    /// One filled square per live cell, at (x * cell_size, y * cell_size).
    fn build_frame(&mut self, window_size: PhysicalSize<u32>) -> &[CellInstance] {
        self.instances.clear();

        let width = window_size.width.max(1) as f32;
        let height = window_size.height.max(1) as f32;
        let cell = self.cell_size as f32;

        let instances = &mut self.instances;
        self.grid.for_each_live(|x, y| {
            let px = x as f32 * cell;
            let py = y as f32 * cell;
            let min = [to_ndc(px, width), to_ndc_y(py, height)];
            let max = [to_ndc(px + cell, width), to_ndc_y(py + cell, height)];
            instances.push(CellInstance {
                min,
                max,
                color: CELL_COLOR,
                _pad: 0.0,
            });
        });

        &self.instances
    }
}

fn to_ndc(x: f32, width: f32) -> f32 {
    (x / width) * 2.0 - 1.0
}

fn to_ndc_y(y: f32, height: f32) -> f32 {
    1.0 - (y / height) * 2.0
}

fn key_matches(event: &KeyEvent, target: &str) -> bool {
    match &event.logical_key {
        Key::Named(NamedKey::Space) => target.eq_ignore_ascii_case("SPACE"),
        Key::Character(text) => text.eq_ignore_ascii_case(target),
        _ => false,
    }
}

struct ConwayApp {
    config: Config,
    window_attrs: WindowAttributes,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    state: Option<State>,
    sim: Simulation,
    frame_count: u32,
    last_fps_log: Instant,
    init_error: Option<anyhow::Error>,
}

impl ConwayApp {
    fn new(config: Config) -> Self {
        let (width_px, height_px) = config.window_size();
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(width_px, height_px))
            .with_resizable(false);
        Self {
            config,
            window_attrs: attrs,
            window: None,
            window_id: None,
            state: None,
            sim: Simulation::new(&config),
            frame_count: 0,
            last_fps_log: Instant::now(),
            init_error: None,
        }
    }

    /// Initialization failures are fatal: remember the error and stop the
    /// event loop so `main` can report it.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.init_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler<()> for ConwayApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(self.window_attrs.clone()).context("create window") {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err),
        };
        let window_id = window.id();

        let max_cells = self.config.width * self.config.height;
        let state = match pollster::block_on(State::new(window.clone(), max_cells)) {
            Ok(state) => state,
            Err(err) => return self.fail(event_loop, err),
        };
        window.request_redraw();

        log::info!(
            "{}x{} cells at {} px per cell",
            self.config.width,
            self.config.height,
            self.config.cell_size
        );

        self.window = Some(window);
        self.window_id = Some(window_id);
        self.state = Some(state);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if Some(window_id) != self.window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { mut inner_size_writer, .. } => {
                if let Some(state) = self.state.as_ref() {
                    let size = PhysicalSize::new(state.config.width, state.config.height);
                    let _ = inner_size_writer.request_inner_size(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if key_matches(&event, "R") || key_matches(&event, "SPACE") {
                        self.sim.randomize();
                    } else if matches!(event.logical_key, Key::Named(NamedKey::Escape)) {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(state) = self.state.as_mut() {
                    self.sim.advance();
                    let instances = self.sim.build_frame(state.size);
                    if let Err(err) = state.render(instances) {
                        match err {
                            wgpu::SurfaceError::Lost => state.resize(state.size),
                            wgpu::SurfaceError::OutOfMemory => event_loop.exit(),
                            _ => {}
                        }
                    } else {
                        self.frame_count += 1;
                        let elapsed = self.last_fps_log.elapsed();
                        if elapsed >= Duration::from_secs(1) {
                            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
                            log::info!("fps: {:.1}, population: {}", fps, self.sim.grid.population());
                            self.frame_count = 0;
                            self.last_fps_log = Instant::now();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::Poll);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    let mut app = ConwayApp::new(Config::default());
    event_loop.run_app(&mut app)?;
    if let Some(err) = app.init_error {
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{to_ndc, to_ndc_y};

    #[test]
    fn ndc_conversion_spans_the_surface() {
        assert_eq!(to_ndc(0.0, 640.0), -1.0);
        assert_eq!(to_ndc(640.0, 640.0), 1.0);
        assert_eq!(to_ndc(320.0, 640.0), 0.0);
        assert_eq!(to_ndc_y(0.0, 480.0), 1.0);
        assert_eq!(to_ndc_y(480.0, 480.0), -1.0);
        assert_eq!(to_ndc_y(240.0, 480.0), 0.0);
    }
}
