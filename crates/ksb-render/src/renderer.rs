use crate::gpu::GpuContext;
use crate::helpers;
use crate::mesh::{self, GpuMesh, InstanceRaw};
use crate::targets::DepthTarget;
use glam::Vec3;
use ksb_core::render::{FrameView, RenderBackend, RenderError};
use ksb_core::MeshId;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    hemi_sky: [f32; 4],
    hemi_ground: [f32; 4],
    sun_dir: [f32; 4],
    sun_color: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

const INITIAL_INSTANCES: usize = 64;

/// wgpu implementation of [`RenderBackend`].
///
/// Meshes are uploaded the first time a draw references them and kept until
/// the mesh library's epoch changes. Draws sharing a mesh go out as one
/// instanced call.
pub struct SceneRenderer {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth: DepthTarget,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    meshes: Vec<Option<GpuMesh>>,
    mesh_epoch: Option<u64>,
    order: Vec<usize>,
    instances: Vec<InstanceRaw>,
    width: u32,
    height: u32,
}

impl SceneRenderer {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;
        let width = gpu.config.width;
        let height = gpu.config.height;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
        });
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
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
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_scene_pipeline(
            device,
            &pipeline_layout,
            &shader,
            &mesh::vertex_layouts(),
            gpu.config.format,
        );
        let depth = DepthTarget::new(device, width, height);
        let instance_buffer = create_instance_buffer(device, INITIAL_INSTANCES);

        Self {
            pipeline,
            globals_buffer,
            bind_group,
            depth,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCES,
            meshes: Vec::new(),
            mesh_epoch: None,
            order: Vec::new(),
            instances: Vec::new(),
            width,
            height,
            gpu,
        }
    }

    fn sync_meshes(&mut self, frame: &FrameView<'_>) {
        let epoch = frame.meshes.epoch();
        if self.mesh_epoch != Some(epoch) {
            if let Some(old) = self.mesh_epoch {
                log::debug!("[gpu] mesh epoch {} -> {}, dropping uploads", old, epoch);
            }
            self.meshes.clear();
            self.mesh_epoch = Some(epoch);
        }
        // slots freed in the library (a replaced figure) release their buffers
        for (slot, gm) in self.meshes.iter_mut().enumerate() {
            if gm.is_some() && !frame.meshes.contains(MeshId(slot as u32)) {
                *gm = None;
            }
        }
        for d in frame.draws {
            let slot = d.mesh.0 as usize;
            if slot >= self.meshes.len() {
                self.meshes.resize_with(slot + 1, || None);
            }
            if self.meshes[slot].is_none() {
                if let Some(data) = frame.meshes.get(d.mesh) {
                    self.meshes[slot] = mesh::upload(&self.gpu.device, data, "scene_mesh");
                }
            }
        }
    }

    fn write_globals(&self, frame: &FrameView<'_>) {
        let cam = frame.camera;
        let l = frame.lighting;
        let globals = Globals {
            view_proj: cam.view_proj().to_cols_array_2d(),
            view: cam.view_matrix().to_cols_array_2d(),
            hemi_sky: l.hemi_sky.extend(l.hemi_intensity).to_array(),
            hemi_ground: l.hemi_ground.extend(0.0).to_array(),
            sun_dir: l.sun_direction.normalize_or_zero().extend(0.0).to_array(),
            sun_color: l.sun_color.extend(l.sun_intensity).to_array(),
            fog_color: frame.fog.color.extend(1.0).to_array(),
            fog_range: [frame.fog.near, frame.fog.far, 0.0, 0.0],
        };
        self.gpu
            .queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Sort draws by mesh and pack their instances; returns (mesh slot,
    /// instance range) runs.
    fn pack_instances(&mut self, frame: &FrameView<'_>) -> Vec<(usize, std::ops::Range<u32>)> {
        let draws = frame.draws;
        self.order.clear();
        self.order.extend(0..draws.len());
        self.order.sort_by_key(|&i| draws[i].mesh);
        self.instances.clear();
        let mut runs: Vec<(usize, std::ops::Range<u32>)> = Vec::new();
        for &i in &self.order {
            let d = &draws[i];
            let slot = d.mesh.0 as usize;
            if !matches!(self.meshes.get(slot), Some(Some(_))) {
                continue;
            }
            let at = self.instances.len() as u32;
            self.instances.push(InstanceRaw::new(d.model, d.color));
            match runs.last_mut() {
                Some((s, r)) if *s == slot => r.end = at + 1,
                _ => runs.push((slot, at..at + 1)),
            }
        }
        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.gpu.device, self.instance_capacity);
        }
        if !self.instances.is_empty() {
            self.gpu.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }
        runs
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_vb"),
        size: (std::mem::size_of::<InstanceRaw>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn to_wgpu_color(c: Vec3) -> wgpu::Color {
    wgpu::Color {
        r: c.x as f64,
        g: c.y as f64,
        b: c.z as f64,
        a: 1.0,
    }
}

impl RenderBackend for SceneRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.gpu.reconfigure(width, height);
        self.depth.recreate(&self.gpu.device, width, height);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_meshes(frame);
        self.write_globals(frame);
        let runs = self.pack_instances(frame);

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(frame.clear_color)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (slot, range) in runs {
                let Some(Some(gm)) = self.meshes.get(slot) else {
                    continue;
                };
                rpass.set_vertex_buffer(0, gm.vertex_buffer.slice(..));
                rpass.set_index_buffer(gm.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..gm.index_count, 0, range);
            }
        }
        self.gpu.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
