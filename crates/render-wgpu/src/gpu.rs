use crate::RenderError;
use crate::camera::PerspectiveCamera;
use crate::shaders;
use crate::texture::GpuTexture;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;
use vista_geometry::MeshData;
use vista_scene::{GeometryId, Light, Material, MaterialId, MaterialKind, Scene, SceneEvent, TextureId};

/// Point lights beyond this count are ignored.
pub const MAX_POINT_LIGHTS: usize = 4;
const TEXTURE_SLOTS: usize = 9;
const NORMAL_SLOT: usize = 6;

const FLAG_DISPLACEMENT: u32 = 1;
const FLAG_NORMAL_MAP: u32 = 2;
const FLAG_MATCAP: u32 = 4;
const FLAG_GRADIENT: u32 = 8;
const FLAG_FLAT: u32 = 16;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct PointLightUniform {
    position: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    lights: [PointLightUniform; MAX_POINT_LIGHTS],
    light_count: [u32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct MaterialUniforms {
    color: [f32; 4],
    specular: [f32; 4],
    params: [f32; 4],
    extra: [f32; 4],
    kind: [u32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

impl From<Mat4> for InstanceData {
    fn from(model: Mat4) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
        }
    }
}

fn kind_index(kind: &MaterialKind) -> u32 {
    match kind {
        MaterialKind::Basic => 0,
        MaterialKind::Normal { .. } => 1,
        MaterialKind::Matcap => 2,
        MaterialKind::Depth => 3,
        MaterialKind::Lambert => 4,
        MaterialKind::Phong { .. } => 5,
        MaterialKind::Toon => 6,
        MaterialKind::Standard { .. } => 7,
    }
}

/// Texture slots in binding order.
fn material_slots(material: &Material) -> [Option<TextureId>; TEXTURE_SLOTS] {
    [
        material.map,
        material.alpha_map,
        material.ao_map,
        material.displacement_map,
        material.metalness_map,
        material.roughness_map,
        material.normal_map,
        material.matcap,
        material.gradient_map,
    ]
}

/// Pack a material. `loaded` reports whether a texture is resident; maps
/// whose absence changes shading (displacement, normal, matcap, gradient)
/// only switch on once loaded.
fn material_uniforms(material: &Material, loaded: impl Fn(TextureId) -> bool) -> MaterialUniforms {
    let is_loaded = |slot: Option<TextureId>| slot.is_some_and(&loaded);
    let mut flags = 0;
    if is_loaded(material.displacement_map) {
        flags |= FLAG_DISPLACEMENT;
    }
    if is_loaded(material.normal_map) {
        flags |= FLAG_NORMAL_MAP;
    }
    if is_loaded(material.matcap) {
        flags |= FLAG_MATCAP;
    }
    if is_loaded(material.gradient_map) {
        flags |= FLAG_GRADIENT;
    }

    let (mut specular, mut metalness, mut roughness) = ([0.0; 4], 0.0, 1.0);
    match material.kind {
        MaterialKind::Normal { flat_shading: true } => flags |= FLAG_FLAT,
        MaterialKind::Phong { shininess, specular: color } => {
            let [r, g, b] = color.to_array();
            specular = [r, g, b, shininess];
        }
        MaterialKind::Standard {
            metalness: m,
            roughness: r,
        } => {
            metalness = m;
            roughness = r;
        }
        _ => {}
    }

    let [r, g, b] = material.color.to_array();
    MaterialUniforms {
        color: [r, g, b, material.opacity],
        specular,
        params: [metalness, roughness, material.ao_intensity, material.displacement_scale],
        extra: [
            material.displacement_bias,
            material.normal_scale.x,
            material.normal_scale.y,
            0.0,
        ],
        kind: [kind_index(&material.kind), flags, 0, 0],
    }
}

/// World-to-view matrix. A camera parented to the scene root turns with it.
fn scene_view_matrix(scene: &Scene, camera: &PerspectiveCamera) -> Mat4 {
    let view = camera.view_matrix();
    if scene.camera_on_root() {
        view * scene.transform().matrix().inverse()
    } else {
        view
    }
}

/// Camera matrices plus lights. Point light positions follow the scene root
/// and are handed to the shader in view space.
fn frame_uniforms(scene: &Scene, camera: &PerspectiveCamera) -> FrameUniforms {
    let view = scene_view_matrix(scene, camera);
    let root = scene.transform().matrix();
    let mut ambient = Vec3::ZERO;
    let mut lights = [PointLightUniform::zeroed(); MAX_POINT_LIGHTS];
    let mut count = 0;

    for light in scene.lights() {
        let radiance = Vec3::from_array(light.radiance().to_array());
        match *light {
            Light::Ambient { .. } => ambient += radiance,
            Light::Point {
                position,
                distance,
                decay,
                ..
            } => {
                if count == MAX_POINT_LIGHTS {
                    tracing::trace!("point light limit reached, skipping");
                    continue;
                }
                let p = view.transform_point3(root.transform_point3(position));
                lights[count] = PointLightUniform {
                    position: [p.x, p.y, p.z, distance],
                    color: [radiance.x, radiance.y, radiance.z, decay],
                };
                count += 1;
            }
        }
    }

    FrameUniforms {
        view: view.to_cols_array_2d(),
        proj: camera.projection_matrix().to_cols_array_2d(),
        ambient: [ambient.x, ambient.y, ambient.z, 1.0],
        lights,
        light_count: [count as u32, 0, 0, 0],
    }
}

/// Visible nodes sharing a geometry and material, drawn with one call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub transparent: bool,
    pub models: Vec<Mat4>,
}

/// Draw list for one frame. Opaque nodes are grouped by (geometry,
/// material) and come first. Transparent nodes follow one per batch, sorted
/// back to front by their origin's depth under `view`.
pub fn collect_batches(scene: &Scene, view: Mat4) -> Vec<DrawBatch> {
    let root = scene.transform().matrix();
    let mut opaque: BTreeMap<(GeometryId, MaterialId), Vec<Mat4>> = BTreeMap::new();
    let mut transparent: Vec<(f32, DrawBatch)> = Vec::new();
    for node in scene.nodes().values().filter(|n| n.visible) {
        let Some(material) = scene.material(node.material) else {
            continue;
        };
        let model = root * node.transform.matrix();
        if material.transparent {
            let depth = view.transform_point3(model.w_axis.truncate()).z;
            transparent.push((
                depth,
                DrawBatch {
                    geometry: node.geometry,
                    material: node.material,
                    transparent: true,
                    models: vec![model],
                },
            ));
        } else {
            opaque.entry((node.geometry, node.material)).or_default().push(model);
        }
    }
    // View space looks down -Z: the farthest node has the smallest z.
    transparent.sort_by(|a, b| a.0.total_cmp(&b.0));

    opaque
        .into_iter()
        .map(|((geometry, material), models)| DrawBatch {
            geometry,
            material,
            transparent: false,
            models,
        })
        .chain(transparent.into_iter().map(|(_, batch)| batch))
        .collect()
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, id: GeometryId, mesh: &MeshData) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let vertices: Vec<Vertex> = (0..mesh.vertex_count())
            .map(|i| Vertex {
                position: mesh.positions[i].to_array(),
                normal: mesh.normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                uv: mesh.uvs.get(i).map(|uv| uv.to_array()).unwrap_or([0.0, 0.0]),
            })
            .collect();
        let label = format!("geometry_{}", id.0);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }
}

struct GpuMaterial {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    slots: [Option<TextureId>; TEXTURE_SLOTS],
}

/// wgpu renderer for a [`Scene`].
///
/// GPU resources mirror the scene and are brought up to date by
/// [`SceneRenderer::sync`], which drains the scene's event log. Node
/// transforms are read fresh every frame.
pub struct SceneRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    white: GpuTexture,
    flat_normal: GpuTexture,
    meshes: BTreeMap<GeometryId, GpuMesh>,
    materials: BTreeMap<MaterialId, GpuMaterial>,
    textures: BTreeMap<TextureId, GpuTexture>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
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

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &material_layout_entries(),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let opaque_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            wgpu::BlendState::REPLACE,
        );
        let transparent_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "transparent_pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
        );

        let max_instances = 256u32;
        let instance_buffer = create_instance_buffer(device, max_instances);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            frame_buffer,
            frame_bind_group,
            material_layout,
            white: GpuTexture::solid(device, queue, [255, 255, 255, 255], "white_fallback"),
            flat_normal: GpuTexture::solid(device, queue, [128, 128, 255, 255], "normal_fallback"),
            meshes: BTreeMap::new(),
            materials: BTreeMap::new(),
            textures: BTreeMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Apply pending scene changes to GPU resources. Returns the number of
    /// events consumed. Texture upload failures are logged and the fallback
    /// stays bound.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &mut Scene) -> usize {
        let events = scene.drain_events();
        if events.is_empty() {
            return 0;
        }

        let mut dirty_materials = Vec::new();
        let mut rebind = Vec::new();
        for event in &events {
            match *event {
                SceneEvent::GeometryAdded(id) | SceneEvent::GeometryReplaced(id) => {
                    match scene.geometry(id).and_then(|mesh| GpuMesh::upload(device, id, mesh)) {
                        Some(mesh) => {
                            self.meshes.insert(id, mesh);
                        }
                        None => {
                            self.meshes.remove(&id);
                        }
                    }
                }
                SceneEvent::MaterialAdded(id) | SceneEvent::MaterialChanged(id) => dirty_materials.push(id),
                SceneEvent::TextureLoaded(id) => {
                    if let Err(err) = self.upload_texture(device, queue, scene, id) {
                        tracing::warn!(texture = id.0, "texture upload failed: {err}");
                        continue;
                    }
                    rebind.extend(
                        scene
                            .materials()
                            .iter()
                            .filter(|(_, m)| m.uses_texture(id))
                            .map(|(mid, _)| *mid),
                    );
                }
                SceneEvent::TextureAdded(_) | SceneEvent::NodeAdded(_) => {}
            }
        }

        dirty_materials.extend_from_slice(&rebind);
        dirty_materials.sort();
        dirty_materials.dedup();
        for id in dirty_materials {
            let Some(material) = scene.material(id) else {
                continue;
            };
            // Parameter-only edits rewrite the uniform in place.
            let existing = self
                .materials
                .get(&id)
                .filter(|gpu| gpu.slots == material_slots(material) && !rebind.contains(&id));
            if let Some(gpu) = existing {
                let uniforms = material_uniforms(material, |t| self.textures.contains_key(&t));
                queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            } else {
                let gpu = self.build_material(device, id, material);
                self.materials.insert(id, gpu);
            }
        }

        let needed = scene.node_count() as u32;
        if needed > self.max_instances {
            self.max_instances = needed.next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.max_instances);
            tracing::debug!(capacity = self.max_instances, "instance buffer grown");
        }

        tracing::debug!(events = events.len(), "scene synced to gpu");
        events.len()
    }

    fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        id: TextureId,
    ) -> Result<(), RenderError> {
        let slot = scene.texture(id).ok_or(RenderError::UnknownTexture(id))?;
        let Some(image) = &slot.image else {
            return Err(RenderError::UnknownTexture(id));
        };
        let texture = GpuTexture::from_image(device, queue, image, &slot.options, &slot.path)?;
        self.textures.insert(id, texture);
        Ok(())
    }

    fn build_material(&self, device: &wgpu::Device, id: MaterialId, material: &Material) -> GpuMaterial {
        let uniforms = material_uniforms(material, |t| self.textures.contains_key(&t));
        let label = format!("material_{}", id.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let slots = material_slots(material);
        let bound: Vec<&GpuTexture> = slots
            .iter()
            .enumerate()
            .map(|(slot, texture)| {
                match texture.and_then(|t| self.textures.get(&t)) {
                    Some(gpu) => gpu,
                    None if slot == NORMAL_SLOT => &self.flat_normal,
                    None => &self.white,
                }
            })
            .collect();

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }];
        for (slot, texture) in bound.iter().enumerate() {
            let binding = 1 + 2 * slot as u32;
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: binding + 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: &self.material_layout,
            entries: &entries,
        });
        tracing::trace!(material = id.0, kind = %material.kind, flags = uniforms.kind[1], "material bind group built");
        GpuMaterial {
            uniform_buffer,
            bind_group,
            slots,
        }
    }

    /// Render one frame of `scene` from `camera`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &PerspectiveCamera,
        scene: &Scene,
    ) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms(scene, camera)),
        );

        // Only batches with resident meshes and materials are drawn.
        let mut draws = Vec::new();
        let mut instances: Vec<InstanceData> = Vec::new();
        for batch in collect_batches(scene, scene_view_matrix(scene, camera)) {
            let (Some(mesh), Some(material)) = (self.meshes.get(&batch.geometry), self.materials.get(&batch.material))
            else {
                continue;
            };
            let start = instances.len() as u32;
            let room = self.max_instances as usize - instances.len();
            instances.extend(batch.models.iter().take(room).map(|m| InstanceData::from(*m)));
            let end = instances.len() as u32;
            if end > start {
                draws.push((batch.transparent, mesh, material, start..end));
            }
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let background = scene.background();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.r as f64,
                            g: background.g as f64,
                            b: background.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (transparent, mesh, material, range) in draws {
                pass.set_pipeline(if transparent {
                    &self.transparent_pipeline
                } else {
                    &self.opaque_pipeline
                });
                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, range);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn material_layout_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT;
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    for slot in 0..TEXTURE_SLOTS as u32 {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1 + 2 * slot,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2 + 2 * slot,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    entries
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_buffer"),
        size: capacity as u64 * std::mem::size_of::<InstanceData>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
