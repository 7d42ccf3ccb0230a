//! WebGPU render state
//!
//! Three pipelines share one globals uniform: lit planet meshes, camera-facing
//! points (stars and flow particles) and textured label billboards.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat};
use wgpu::util::DeviceExt;

use super::bubble::BubbleImage;
use super::shapes::uv_sphere;
use super::vertex::{MeshVertex, PlanetInstance, PointInstance, SpriteInstance};
use crate::camera::OrbitCamera;
use crate::consts::*;
use crate::error::RenderError;
use crate::platform;
use crate::scene::{Planet, Scene};
use crate::settings::Settings;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Opacity of flow particles before additive blending
const FLOW_OPACITY: f32 = 0.9;

// ============================================================================
// GPU DATA STRUCTURES (must match the shaders)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    view_proj: [[f32; 4]; 4],     // offset 0
    camera_pos: [f32; 4],         // offset 64, w = time
    camera_right: [f32; 4],       // offset 80
    camera_up: [f32; 4],          // offset 96
    ambient: [f32; 4],            // offset 112
    dir_light_dir: [f32; 4],      // offset 128, w = intensity
    dir_light_color: [f32; 4],    // offset 144
    point_pos: [[f32; 4]; 2],     // offset 160, w = range
    point_color: [[f32; 4]; 2],   // offset 192, w = intensity
    base_color: [f32; 4],         // offset 224, w = metalness
    emissive: [f32; 4],           // offset 240, w = roughness
}

impl Globals {
    /// Pack the camera and the scene's lighting, linearizing sRGB colors
    pub fn new(scene: &Scene, camera: &OrbitCamera) -> Self {
        let view = camera.view();
        let eye = camera.position();
        let lights = &scene.config.lights;
        let material = &scene.config.material;

        let point = |i: usize| {
            let light = &lights.points[i];
            (
                light.position.extend(light.range).to_array(),
                with_w(linear_rgb(light.color), light.intensity),
            )
        };
        let (p0_pos, p0_color) = point(0);
        let (p1_pos, p1_color) = point(1);

        let emissive = linear_rgb(material.emissive).map(|c| c * material.emissive_intensity);

        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: eye.extend(scene.elapsed).to_array(),
            camera_right: view.row(0).truncate().extend(0.0).to_array(),
            camera_up: view.row(1).truncate().extend(0.0).to_array(),
            ambient: with_w(linear_rgb(lights.ambient.color), 1.0),
            dir_light_dir: lights
                .directional
                .position
                .normalize_or_zero()
                .extend(lights.directional.intensity)
                .to_array(),
            dir_light_color: with_w(linear_rgb(lights.directional.color), 1.0),
            point_pos: [p0_pos, p1_pos],
            point_color: [p0_color, p1_color],
            base_color: with_w(linear_rgb(material.color), material.metalness),
            emissive: with_w(emissive, material.roughness),
        }
    }
}

#[inline]
fn with_w(rgb: [f32; 3], w: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], w]
}

/// sRGB transfer function, inverse
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_rgb(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(srgb_to_linear)
}

/// Model matrix for a planet (Euler XYZ rotation, then translation)
pub fn planet_instance(planet: &Planet) -> PlanetInstance {
    let r = planet.rotation;
    let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
    PlanetInstance {
        model: Mat4::from_rotation_translation(rotation, planet.position).to_cols_array_2d(),
    }
}

/// Static star instances, one per star across all layers
pub fn star_instances(scene: &Scene) -> Vec<PointInstance> {
    scene
        .starfield
        .layers
        .iter()
        .flat_map(|layer| {
            let [r, g, b, a] = layer.color;
            let color = with_w(linear_rgb([r, g, b]), a);
            layer
                .positions
                .iter()
                .map(move |p| PointInstance::new(p.to_array(), layer.size, color))
        })
        .collect()
}

/// Fill `out` with the current flow particles
pub fn flow_instances(scene: &Scene, out: &mut Vec<PointInstance>) {
    let flow = &scene.flow;
    out.clear();
    out.extend(
        flow.positions
            .iter()
            .zip(&flow.colors)
            .zip(&flow.sizes)
            .map(|((p, c), &size)| {
                PointInstance::new(p.to_array(), size, with_w(linear_rgb(*c), FLOW_OPACITY))
            }),
    );
}

/// Label billboards in label order; pending labels get zero opacity
pub fn sprite_instances(scene: &Scene) -> Vec<SpriteInstance> {
    scene
        .labels
        .iter()
        .map(|label| SpriteInstance {
            center: label.position.to_array(),
            opacity: label.opacity,
            scale: LABEL_SCALE,
            _pad: [0.0; 2],
        })
        .collect()
}

// ============================================================================
// RENDER STATE
// ============================================================================

/// Depth buffer plus the optional multisampled color target
struct FrameTargets {
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl FrameTargets {
    fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, sample_count: u32) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("msaa_color"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self {
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa_view,
        }
    }
}

struct LabelTexture {
    bind_group: wgpu::BindGroup,
}

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub sample_count: u32,

    planet_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,
    flow_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    sphere_vertices: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,
    planet_buffer: wgpu::Buffer,
    planet_count: u32,

    star_buffer: wgpu::Buffer,
    star_count: u32,
    flow_buffer: wgpu::Buffer,
    flow_scratch: Vec<PointInstance>,

    sprite_buffer: wgpu::Buffer,
    labels: Vec<LabelTexture>,

    targets: FrameTargets,
    clear_color: wgpu::Color,

    pub size: (u32, u32),
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        scene: &Scene,
        settings: &Settings,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("planet-flow-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let msaa_supported = adapter
            .get_texture_format_features(surface_format)
            .flags
            .sample_count_supported(4);
        let sample_count = if settings.quality.antialias() && msaa_supported {
            4
        } else {
            1
        };
        log::info!(
            "Surface config: {}x{}, {}x MSAA",
            config.width,
            config.height,
            sample_count
        );

        // Globals
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("label_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Pipelines
        let planet_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("planet_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("planet.wgsl").into()),
        });
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
        });
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });

        let globals_only = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globals_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            immediate_size: 0,
        });
        let with_texture = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let make = PipelineFactory {
            device: &device,
            format: config.format,
            sample_count,
        };
        let planet_pipeline = make.build(PipelineSpec {
            label: "planet_pipeline",
            layout: &globals_only,
            shader: &planet_shader,
            buffers: &[MeshVertex::desc(), PlanetInstance::desc()],
            blend: None,
            depth_write: true,
            cull_mode: Some(wgpu::Face::Back),
        });
        let star_pipeline = make.build(PipelineSpec {
            label: "star_pipeline",
            layout: &globals_only,
            shader: &points_shader,
            buffers: &[PointInstance::desc()],
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
            cull_mode: None,
        });
        let flow_pipeline = make.build(PipelineSpec {
            label: "flow_pipeline",
            layout: &globals_only,
            shader: &points_shader,
            buffers: &[PointInstance::desc()],
            blend: Some(ADDITIVE_BLENDING),
            depth_write: false,
            cull_mode: None,
        });
        let sprite_pipeline = make.build(PipelineSpec {
            label: "sprite_pipeline",
            layout: &with_texture,
            shader: &sprite_shader,
            buffers: &[SpriteInstance::desc()],
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: false,
            cull_mode: None,
        });

        // Planet geometry
        let sphere = uv_sphere(PLANET_RADIUS, PLANET_SEGMENTS, PLANET_SEGMENTS);
        let sphere_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertices"),
            contents: bytemuck::cast_slice(&sphere.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_indices"),
            contents: bytemuck::cast_slice(&sphere.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let planets: Vec<PlanetInstance> = scene.planets.iter().map(planet_instance).collect();
        let planet_buffer = instance_buffer(&device, "planet_instances", &planets);

        let stars = star_instances(scene);
        let star_buffer = instance_buffer(&device, "star_instances", &stars);

        let mut flow_scratch = Vec::with_capacity(scene.flow.len());
        flow_instances(scene, &mut flow_scratch);
        let flow_buffer = instance_buffer(&device, "flow_instances", &flow_scratch);

        let sprite_buffer = instance_buffer(&device, "sprite_instances", &sprite_instances(scene));

        // One bubble texture per label
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("label_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        let labels = scene
            .labels
            .iter()
            .map(|label| {
                let image = platform::label_image(&label.spec.text);
                upload_label(&device, &queue, &texture_layout, &sampler, &image)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let targets = FrameTargets::new(&device, &config, sample_count);

        let [r, g, b] = linear_rgb(scene.config.background);
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
            planet_pipeline,
            star_pipeline,
            flow_pipeline,
            sprite_pipeline,
            globals_buffer,
            globals_bind_group,
            sphere_vertices,
            sphere_indices,
            sphere_index_count: sphere.indices.len() as u32,
            planet_buffer,
            planet_count: planets.len() as u32,
            star_buffer,
            star_count: stars.len() as u32,
            flow_buffer,
            flow_scratch,
            sprite_buffer,
            labels,
            targets,
            clear_color,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.targets = FrameTargets::new(&self.device, &self.config, self.sample_count);
        }
    }

    /// Reconfigure after the surface was lost or went stale
    pub fn reconfigure(&mut self) {
        let (w, h) = self.size;
        self.resize(w, h);
    }

    /// Upload this frame's state and draw stars, planets, flow and labels
    pub fn render(&mut self, scene: &Scene, camera: &OrbitCamera) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::new(scene, camera);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let planets: Vec<PlanetInstance> = scene.planets.iter().map(planet_instance).collect();
        write_instances(&self.queue, &self.planet_buffer, &planets);

        flow_instances(scene, &mut self.flow_scratch);
        write_instances(&self.queue, &self.flow_buffer, &self.flow_scratch);

        let sprites = sprite_instances(scene);
        write_instances(&self.queue, &self.sprite_buffer, &sprites);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let (color_view, resolve_target) = match &self.targets.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &self.globals_bind_group, &[]);

            if self.star_count > 0 {
                pass.set_pipeline(&self.star_pipeline);
                pass.set_vertex_buffer(0, self.star_buffer.slice(..));
                pass.draw(0..6, 0..self.star_count);
            }

            if self.planet_count > 0 {
                pass.set_pipeline(&self.planet_pipeline);
                pass.set_vertex_buffer(0, self.sphere_vertices.slice(..));
                pass.set_vertex_buffer(1, self.planet_buffer.slice(..));
                pass.set_index_buffer(self.sphere_indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.sphere_index_count, 0, 0..self.planet_count);
            }

            if !self.flow_scratch.is_empty() {
                pass.set_pipeline(&self.flow_pipeline);
                pass.set_vertex_buffer(0, self.flow_buffer.slice(..));
                pass.draw(0..6, 0..self.flow_scratch.len() as u32);
            }

            if !self.labels.is_empty() {
                pass.set_pipeline(&self.sprite_pipeline);
                pass.set_vertex_buffer(0, self.sprite_buffer.slice(..));
                for (i, (label, sprite)) in self.labels.iter().zip(&sprites).enumerate() {
                    if sprite.opacity <= 0.0 {
                        continue;
                    }
                    let i = i as u32;
                    pass.set_bind_group(1, &label.bind_group, &[]);
                    pass.draw(0..6, i..i + 1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

struct PipelineFactory<'a> {
    device: &'a wgpu::Device,
    format: wgpu::TextureFormat,
    sample_count: u32,
}

struct PipelineSpec<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    cull_mode: Option<wgpu::Face>,
}

impl PipelineFactory<'_> {
    fn build(&self, spec: PipelineSpec<'_>) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(spec.label),
                layout: Some(spec.layout),
                vertex: wgpu::VertexState {
                    module: spec.shader,
                    entry_point: Some("vs_main"),
                    buffers: spec.buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: spec.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: spec.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: spec.cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: spec.depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: self.sample_count,
                    ..Default::default()
                },
                multiview_mask: None,
                cache: None,
            })
    }
}

/// Vertex buffer holding `data`, at least one element long
fn instance_buffer<T: Pod + Zeroable>(device: &wgpu::Device, label: &str, data: &[T]) -> wgpu::Buffer {
    let placeholder = [T::zeroed()];
    let contents: &[T] = if data.is_empty() { &placeholder } else { data };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

fn write_instances<T: Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[T]) {
    if !data.is_empty() {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
    }
}

fn upload_label(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &BubbleImage,
) -> Result<LabelTexture, RenderError> {
    let expected = (image.width * image.height * 4) as usize;
    if image.pixels.len() != expected {
        return Err(RenderError::TextureSize {
            actual: image.pixels.len(),
            width: image.width,
            height: image.height,
        });
    }

    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("label_texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("label_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    Ok(LabelTexture { bind_group })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use glam::Vec3;

    fn scene(variant: Variant) -> Scene {
        let settings = Settings::for_variant(variant);
        Scene::new(&settings, 9).unwrap()
    }

    #[test]
    fn test_globals_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 256);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn test_srgb_to_linear_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_globals_carry_camera_and_time() {
        let mut scene = scene(Variant::Azure);
        scene.update(0.05);
        let camera = OrbitCamera::new(1.0, 0.05);
        let g = Globals::new(&scene, &camera);

        assert!((Vec3::from_slice(&g.camera_pos[..3]) - camera.position()).length() < 1e-5);
        assert!((g.camera_pos[3] - scene.elapsed).abs() < 1e-6);
        // Initial camera looks down -Z, so right is +X and up is +Y
        assert!((g.camera_right[0] - 1.0).abs() < 1e-5);
        assert!((g.camera_up[1] - 1.0).abs() < 1e-5);
        assert_eq!(g.point_pos[0][3], 100.0);
        assert_eq!(g.point_color[0][3], 1.5);
    }

    #[test]
    fn test_planet_instance_translation() {
        let scene = scene(Variant::Azure);
        let planet = &scene.planets[0];
        let inst = planet_instance(planet);
        let translation = Vec3::from_slice(&inst.model[3][..3]);
        assert!((translation - planet.position).length() < 1e-5);
    }

    #[test]
    fn test_instance_counts_follow_scene() {
        let scene = scene(Variant::Ember);
        assert_eq!(star_instances(&scene).len(), scene.starfield.star_count());

        let mut flow = Vec::new();
        flow_instances(&scene, &mut flow);
        assert_eq!(flow.len(), scene.flow.len());

        let sprites = sprite_instances(&scene);
        assert_eq!(sprites.len(), scene.labels.len());
        assert!(sprites.iter().all(|s| s.scale == LABEL_SCALE));
    }

    #[test]
    fn test_pending_labels_are_invisible() {
        let scene = scene(Variant::Azure);
        let sprites = sprite_instances(&scene);
        assert!(sprites.iter().all(|s| s.opacity == 0.0));
    }
}
