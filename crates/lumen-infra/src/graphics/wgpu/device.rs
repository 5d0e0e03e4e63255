// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The wgpu implementation of [`GraphicsDevice`].
//!
//! Every pass is encoded into its own command buffer and submitted immediately, so
//! the GPU executes passes in the order they were recorded. Resources live in
//! ID-keyed maps behind mutexes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use wgpu::util::DeviceExt;

use lumen_core::math::Extent2D;
use lumen_core::renderer::{
    ColorTarget, FrameStatus, FullscreenPass, GraphicsDevice, MeshDescriptor, MeshId,
    ReadbackId, RenderError, RenderTargetDescriptor, RenderTargetId, ResourceError, ScenePass,
    TextureFormat,
};

use super::context::WgpuGraphicsContext;
use super::conversions::IntoWgpu;
use super::pipelines::{PipelineCache, ProgramKind, DEPTH_FORMAT};

/// Size of a readback staging buffer: one row at the copy alignment.
const READBACK_BUFFER_SIZE: wgpu::BufferAddress = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as wgpu::BufferAddress;

#[derive(Debug)]
struct RenderTargetEntry {
    texture: Arc<wgpu::Texture>,
    view: Arc<wgpu::TextureView>,
    size: Extent2D,
    format: TextureFormat,
}

#[derive(Debug)]
struct MeshEntry {
    vertex_buffer: Arc<wgpu::Buffer>,
    index_buffer: Arc<wgpu::Buffer>,
    index_count: u32,
}

#[derive(Debug)]
struct FrameInFlight {
    surface_texture: wgpu::SurfaceTexture,
    view: Arc<wgpu::TextureView>,
}

/// A color attachment resolved from a [`ColorTarget`].
struct ResolvedTarget {
    view: Arc<wgpu::TextureView>,
    format: wgpu::TextureFormat,
    size: Extent2D,
}

/// A draw with all of its GPU objects looked up.
struct PreparedDraw {
    pipeline: Arc<wgpu::RenderPipeline>,
    object_group: wgpu::BindGroup,
    vertex_buffer: Arc<wgpu::Buffer>,
    index_buffer: Arc<wgpu::Buffer>,
    index_count: u32,
}

/// A thread-safe wgpu device bound to one window surface.
#[derive(Debug)]
pub struct WgpuDevice {
    context: Mutex<WgpuGraphicsContext>,
    pipelines: PipelineCache,
    sampler: wgpu::Sampler,
    render_targets: Mutex<HashMap<RenderTargetId, RenderTargetEntry>>,
    meshes: Mutex<HashMap<MeshId, MeshEntry>>,
    readbacks: Mutex<HashMap<ReadbackId, Arc<wgpu::Buffer>>>,
    frame: Mutex<Option<FrameInFlight>>,
    next_id: AtomicUsize,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}")))
}

/// Decodes the first texel of an `Rgba16Float` row.
fn decode_rgba16_float(bytes: &[u8]) -> Option<[f32; 4]> {
    let texel = bytes.get(..8)?;
    let mut channels = [0.0; 4];
    for (channel, pair) in channels.iter_mut().zip(texel.chunks_exact(2)) {
        *channel = half::f16::from_le_bytes([pair[0], pair[1]]).to_f32();
    }
    Some(channels)
}

impl WgpuDevice {
    /// Wraps an initialized context.
    pub fn new(context: WgpuGraphicsContext) -> Self {
        let pipelines = PipelineCache::new(&context.device);
        let sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Clamp Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        log::info!("WgpuDevice ready on \"{}\"", context.adapter_name());
        Self {
            context: Mutex::new(context),
            pipelines,
            sampler,
            render_targets: Mutex::new(HashMap::new()),
            meshes: Mutex::new(HashMap::new()),
            readbacks: Mutex::new(HashMap::new()),
            frame: Mutex::new(None),
            next_id: AtomicUsize::new(1),
        }
    }

    fn generate_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn context(&self) -> Result<MutexGuard<'_, WgpuGraphicsContext>, ResourceError> {
        lock(&self.context, "context")
    }

    /// Polls the device until all submitted work is done.
    pub fn poll_device_blocking(&self) {
        if let Ok(context) = self.context.lock() {
            if let Err(e) = context.device.poll(wgpu::PollType::Wait) {
                log::warn!("Failed to poll device: {e:?}");
            }
        } else {
            log::error!("WgpuDevice context mutex was poisoned during poll.");
        }
    }

    fn resolve_color_target(
        &self,
        target: ColorTarget,
        surface_format: wgpu::TextureFormat,
        surface_size: Extent2D,
    ) -> Result<ResolvedTarget, RenderError> {
        match target {
            ColorTarget::Surface => {
                let frame = lock(&self.frame, "frame")?;
                let frame = frame.as_ref().ok_or(RenderError::NoFrameInFlight)?;
                Ok(ResolvedTarget {
                    view: Arc::clone(&frame.view),
                    format: surface_format,
                    size: surface_size,
                })
            }
            ColorTarget::Offscreen(id) => {
                let targets = lock(&self.render_targets, "render targets")?;
                let entry = targets.get(&id).ok_or(ResourceError::NotFound {
                    kind: "render target",
                    id: id.0,
                })?;
                if entry.format.is_depth() {
                    return Err(ResourceError::InvalidDescriptor(format!(
                        "{id:?} is a depth target and cannot receive color"
                    ))
                    .into());
                }
                Ok(ResolvedTarget {
                    view: Arc::clone(&entry.view),
                    format: entry.format.into_wgpu(),
                    size: entry.size,
                })
            }
        }
    }

    fn target_entry<R>(
        &self,
        id: RenderTargetId,
        read: impl FnOnce(&RenderTargetEntry) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        let targets = lock(&self.render_targets, "render targets")?;
        let entry = targets.get(&id).ok_or(ResourceError::NotFound {
            kind: "render target",
            id: id.0,
        })?;
        read(entry)
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTargetId, ResourceError> {
        if descriptor.size.is_empty() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "render target {:?} has zero size",
                descriptor.label
            )));
        }
        let usage = if descriptor.format.is_depth() {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        };
        let texture = {
            let context = self.context()?;
            context.device.create_texture(&wgpu::TextureDescriptor {
                label: descriptor.label.as_deref(),
                size: descriptor.size.into_wgpu(),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: descriptor.format.into_wgpu(),
                usage,
                view_formats: &[],
            })
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let id = RenderTargetId(self.generate_id());
        log::debug!(
            "WgpuDevice: Created render target {:?} ({id:?}, {}x{} {:?})",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.format
        );
        lock(&self.render_targets, "render targets")?.insert(
            id,
            RenderTargetEntry {
                texture: Arc::new(texture),
                view: Arc::new(view),
                size: descriptor.size,
                format: descriptor.format,
            },
        );
        Ok(id)
    }

    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError> {
        let entry = lock(&self.render_targets, "render targets")?
            .remove(&id)
            .ok_or(ResourceError::NotFound {
                kind: "render target",
                id: id.0,
            })?;
        entry.texture.destroy();
        Ok(())
    }

    fn create_mesh(&self, descriptor: &MeshDescriptor<'_>) -> Result<MeshId, ResourceError> {
        if descriptor.vertices.is_empty() || descriptor.indices.is_empty() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "mesh {:?} has no vertices or no indices",
                descriptor.label
            )));
        }
        let context = self.context()?;
        let vertex_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: descriptor.label,
                contents: bytemuck::cast_slice(descriptor.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: descriptor.label,
                contents: bytemuck::cast_slice(descriptor.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        drop(context);

        let id = MeshId(self.generate_id());
        log::debug!(
            "WgpuDevice: Uploaded mesh {:?} ({id:?}, {} vertices, {} indices)",
            descriptor.label,
            descriptor.vertices.len(),
            descriptor.indices.len()
        );
        lock(&self.meshes, "meshes")?.insert(
            id,
            MeshEntry {
                vertex_buffer: Arc::new(vertex_buffer),
                index_buffer: Arc::new(index_buffer),
                index_count: descriptor.indices.len() as u32,
            },
        );
        Ok(id)
    }

    fn destroy_mesh(&self, id: MeshId) -> Result<(), ResourceError> {
        let entry = lock(&self.meshes, "meshes")?
            .remove(&id)
            .ok_or(ResourceError::NotFound { kind: "mesh", id: id.0 })?;
        entry.vertex_buffer.destroy();
        entry.index_buffer.destroy();
        Ok(())
    }

    fn create_readback(&self, label: Option<&str>) -> Result<ReadbackId, ResourceError> {
        let buffer = self
            .context()?
            .device
            .create_buffer(&wgpu::BufferDescriptor {
                label,
                size: READBACK_BUFFER_SIZE,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
        let id = ReadbackId(self.generate_id());
        lock(&self.readbacks, "readbacks")?.insert(id, Arc::new(buffer));
        Ok(id)
    }

    fn destroy_readback(&self, id: ReadbackId) -> Result<(), ResourceError> {
        let buffer = lock(&self.readbacks, "readbacks")?
            .remove(&id)
            .ok_or(ResourceError::NotFound {
                kind: "readback",
                id: id.0,
            })?;
        buffer.destroy();
        Ok(())
    }

    fn surface_size(&self) -> Extent2D {
        self.context
            .lock()
            .map(|context| context.size())
            .unwrap_or_default()
    }

    fn resize_surface(&self, size: Extent2D) -> Result<(), RenderError> {
        self.context()?.resize(size.width, size.height);
        Ok(())
    }

    fn begin_frame(&self) -> Result<FrameStatus, RenderError> {
        let context = self.context()?;
        let mut frame = lock(&self.frame, "frame")?;
        if frame.take().is_some() {
            log::warn!("begin_frame called with a frame in flight; the old back buffer is dropped");
        }
        match context.surface.get_current_texture() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                *frame = Some(FrameInFlight {
                    surface_texture,
                    view: Arc::new(view),
                });
                Ok(FrameStatus::Ready)
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring and skipping the frame");
                context.reconfigure();
                Ok(FrameStatus::Skipped)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the back buffer, skipping the frame");
                Ok(FrameStatus::Skipped)
            }
            Err(e) => Err(RenderError::SurfaceAcquisitionFailed(e.to_string())),
        }
    }

    fn draw_scene(&self, pass: &ScenePass) -> Result<(), RenderError> {
        let context = self.context()?;
        let device = &context.device;
        let color = self.resolve_color_target(pass.target, context.surface_format(), context.size())?;
        let depth_view = self.target_entry(pass.depth, |entry| {
            if entry.format.into_wgpu() != DEPTH_FORMAT {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "{:?} is not a {DEPTH_FORMAT:?} target",
                    pass.depth
                ))
                .into());
            }
            if entry.size != color.size {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "depth target is {}x{} but the color target is {}x{}",
                    entry.size.width, entry.size.height, color.size.width, color.size.height
                ))
                .into());
            }
            Ok(Arc::clone(&entry.view))
        })?;

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: bytemuck::bytes_of(&pass.frame),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let frame_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &self.pipelines.layouts.scene_frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let mut prepared = Vec::with_capacity(pass.draws.len());
        {
            let meshes = lock(&self.meshes, "meshes")?;
            for draw in &pass.draws {
                let mesh = meshes.get(&draw.mesh).ok_or(ResourceError::NotFound {
                    kind: "mesh",
                    id: draw.mesh.0,
                })?;
                let pipeline = self
                    .pipelines
                    .get_or_create(device, ProgramKind::Scene(draw.program), color.format)
                    .map_err(ResourceError::from)?;
                let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Object Uniforms"),
                    contents: bytemuck::bytes_of(&draw.object),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let object_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Object Bind Group"),
                    layout: &self.pipelines.layouts.scene_object,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: object_buffer.as_entire_binding(),
                    }],
                });
                prepared.push(PreparedDraw {
                    pipeline,
                    object_group,
                    vertex_buffer: Arc::clone(&mesh.vertex_buffer),
                    index_buffer: Arc::clone(&mesh.index_buffer),
                    index_count: mesh.index_count,
                });
            }
        }

        let load = match pass.clear_color {
            Some(color) => wgpu::LoadOp::Clear(color.into_wgpu()),
            None => wgpu::LoadOp::Load,
        };
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(&pass.label),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for draw in &prepared {
                render_pass.set_pipeline(&draw.pipeline);
                render_pass.set_bind_group(0, &frame_group, &[]);
                render_pass.set_bind_group(1, &draw.object_group, &[]);
                render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
        context.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn draw_fullscreen(&self, pass: &FullscreenPass) -> Result<(), RenderError> {
        if pass.target == ColorTarget::Offscreen(pass.source) {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{}: {:?} cannot be sampled and written in the same pass",
                pass.label, pass.source
            ))
            .into());
        }
        let context = self.context()?;
        let device = &context.device;
        let color = self.resolve_color_target(pass.target, context.surface_format(), context.size())?;
        let source_view = self.target_entry(pass.source, |entry| {
            if entry.format.is_depth() {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "{:?} is a depth target and cannot be sampled",
                    pass.source
                ))
                .into());
            }
            Ok(Arc::clone(&entry.view))
        })?;
        let pipeline = self
            .pipelines
            .get_or_create(device, ProgramKind::Fullscreen(pass.program), color.format)
            .map_err(ResourceError::from)?;

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Params"),
            contents: bytemuck::bytes_of(&pass.uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&pass.label),
            layout: &self.pipelines.layouts.fullscreen,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(&pass.label),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&pass.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&pipeline);
            render_pass.set_bind_group(0, &bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        context.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_texel(
        &self,
        source: RenderTargetId,
        staging: ReadbackId,
    ) -> Result<[f32; 4], RenderError> {
        let texture = self.target_entry(source, |entry| {
            if entry.format != TextureFormat::Rgba16Float {
                return Err(RenderError::ReadbackFailed(format!(
                    "{source:?} is {:?}, only Rgba16Float can be read back",
                    entry.format
                )));
            }
            Ok(Arc::clone(&entry.texture))
        })?;
        let buffer = lock(&self.readbacks, "readbacks")?
            .get(&staging)
            .cloned()
            .ok_or(ResourceError::NotFound {
                kind: "readback",
                id: staging.0,
            })?;

        let context = self.context()?;
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Texel Readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        context.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the blocking poll below.
            let _ = sender.send(result);
        });
        context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| RenderError::ReadbackFailed(format!("device poll failed: {e}")))?;
        receiver
            .recv()
            .map_err(|e| RenderError::ReadbackFailed(format!("map callback dropped: {e}")))?
            .map_err(|e| RenderError::ReadbackFailed(format!("buffer map failed: {e}")))?;

        let texel = {
            let data = slice.get_mapped_range();
            decode_rgba16_float(&data)
        };
        buffer.unmap();
        texel.ok_or_else(|| RenderError::ReadbackFailed("staging buffer too small".to_string()))
    }

    fn present(&self) -> Result<(), RenderError> {
        let frame = lock(&self.frame, "frame")?
            .take()
            .ok_or(RenderError::NoFrameInFlight)?;
        drop(frame.view);
        frame.surface_texture.present();
        Ok(())
    }
}

impl Drop for WgpuDevice {
    fn drop(&mut self) {
        log::debug!("WgpuDevice: waiting for the GPU before release");
        self.poll_device_blocking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn encode(values: [f32; 4]) -> Vec<u8> {
        let mut bytes: Vec<u8> = values
            .iter()
            .flat_map(|v| f16::from_f32(*v).to_le_bytes())
            .collect();
        bytes.resize(READBACK_BUFFER_SIZE as usize, 0xAB);
        bytes
    }

    #[test]
    fn test_decode_reads_first_texel() {
        let texel = decode_rgba16_float(&encode([-2.5, 0.5, 1.0, 1.0])).unwrap();
        assert_eq!(texel, [-2.5, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_decode_rejects_short_rows() {
        assert_eq!(decode_rgba16_float(&[0u8; 6]), None);
    }

    #[test]
    fn test_readback_buffer_holds_one_aligned_row() {
        assert_eq!(READBACK_BUFFER_SIZE, 256);
        assert!(READBACK_BUFFER_SIZE >= TextureFormat::Rgba16Float.bytes_per_texel() as u64);
    }
}
