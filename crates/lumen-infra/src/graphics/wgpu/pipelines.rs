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

//! Bind group layouts and the render pipeline cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lumen_core::mesh::MeshVertex;
use lumen_core::renderer::{FullscreenProgram, PipelineError, SceneProgram};

use crate::graphics::shaders::{
    fullscreen_program_source, scene_program_source, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT,
};

/// The depth format of every scene pass.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const MESH_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_VERTEX_ATTRIBUTES,
    }
}

/// A program the cache can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ProgramKind {
    Scene(SceneProgram),
    Fullscreen(FullscreenProgram),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramKind,
    color_format: wgpu::TextureFormat,
}

impl PipelineKey {
    fn label(&self) -> String {
        match self.program {
            ProgramKind::Scene(program) => {
                format!("Scene {program:?} Pipeline ({:?})", self.color_format)
            }
            ProgramKind::Fullscreen(program) => {
                format!("Fullscreen {} Pipeline ({:?})", program.name(), self.color_format)
            }
        }
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// The bind group layouts shared by all programs of a kind.
#[derive(Debug)]
pub(crate) struct BindLayouts {
    /// Scene group 0: `FrameUniforms`.
    pub(crate) scene_frame: wgpu::BindGroupLayout,
    /// Scene group 1: `ObjectUniforms`.
    pub(crate) scene_object: wgpu::BindGroupLayout,
    /// Full-screen group 0: source texture, sampler, `FullscreenUniforms`.
    pub(crate) fullscreen: wgpu::BindGroupLayout,
}

impl BindLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let scene_frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Frame Layout"),
            entries: &[uniform_entry(0, stages)],
        });
        let scene_object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Object Layout"),
            entries: &[uniform_entry(0, stages)],
        });
        let fullscreen = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fullscreen Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        Self {
            scene_frame,
            scene_object,
            fullscreen,
        }
    }
}

/// Builds render pipelines on first use and keeps them for the lifetime of the device.
///
/// A pipeline is identified by its program and the format of its color target, so
/// the same scene program gets one pipeline for the HDR target and one for the
/// swapchain.
#[derive(Debug)]
pub(crate) struct PipelineCache {
    pub(crate) layouts: BindLayouts,
    scene_layout: wgpu::PipelineLayout,
    fullscreen_layout: wgpu::PipelineLayout,
    pipelines: Mutex<HashMap<PipelineKey, Arc<wgpu::RenderPipeline>>>,
}

impl PipelineCache {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let layouts = BindLayouts::new(device);
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&layouts.scene_frame, &layouts.scene_object],
            push_constant_ranges: &[],
        });
        let fullscreen_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fullscreen Pipeline Layout"),
            bind_group_layouts: &[&layouts.fullscreen],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            scene_layout,
            fullscreen_layout,
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the pipeline for `program` writing `color_format`, building it if needed.
    pub(crate) fn get_or_create(
        &self,
        device: &wgpu::Device,
        program: ProgramKind,
        color_format: wgpu::TextureFormat,
    ) -> Result<Arc<wgpu::RenderPipeline>, PipelineError> {
        let key = PipelineKey {
            program,
            color_format,
        };
        let mut pipelines = self.pipelines.lock().map_err(|e| PipelineError::CompilationFailed {
            label: key.label(),
            details: format!("pipeline cache mutex poisoned: {e}"),
        })?;
        if let Some(pipeline) = pipelines.get(&key) {
            return Ok(Arc::clone(pipeline));
        }
        let pipeline = Arc::new(self.build(device, &key)?);
        pipelines.insert(key, Arc::clone(&pipeline));
        Ok(pipeline)
    }

    fn build(
        &self,
        device: &wgpu::Device,
        key: &PipelineKey,
    ) -> Result<wgpu::RenderPipeline, PipelineError> {
        let label = key.label();
        if key.color_format.is_depth_stencil_format() {
            return Err(PipelineError::IncompatibleColorTarget(format!(
                "{label}: {:?} is a depth format",
                key.color_format
            )));
        }
        log::debug!("Building {label}");

        let source = match key.program {
            ProgramKind::Scene(program) => scene_program_source(program),
            ProgramKind::Fullscreen(program) => fullscreen_program_source(program),
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let color_targets = [Some(wgpu::ColorTargetState {
            format: key.color_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let scene_buffers = [mesh_vertex_layout()];

        let (layout, buffers, primitive, depth_stencil): (_, &[wgpu::VertexBufferLayout], _, _) =
            match key.program {
                ProgramKind::Scene(_) => (
                    &self.scene_layout,
                    &scene_buffers[..],
                    wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Cw,
                        cull_mode: Some(wgpu::Face::Back),
                        unclipped_depth: false,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        conservative: false,
                    },
                    Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                ),
                ProgramKind::Fullscreen(_) => (
                    &self.fullscreen_layout,
                    &[],
                    wgpu::PrimitiveState::default(),
                    None,
                ),
            };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY_POINT),
                compilation_options: Default::default(),
                buffers,
            },
            primitive,
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY_POINT),
                compilation_options: Default::default(),
                targets: &color_targets,
            }),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(PipelineError::CompilationFailed {
                label,
                details: error.to_string(),
            });
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_vertex_layout_matches_vertex_struct() {
        let layout = mesh_vertex_layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
    }

    #[test]
    fn test_pipeline_labels_name_program_and_format() {
        let key = PipelineKey {
            program: ProgramKind::Fullscreen(FullscreenProgram::ToneMapping),
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
        };
        assert_eq!(key.label(), "Fullscreen tone-mapping Pipeline (Bgra8UnormSrgb)");
        let key = PipelineKey {
            program: ProgramKind::Scene(SceneProgram::Lit),
            color_format: wgpu::TextureFormat::Rgba16Float,
        };
        assert_eq!(key.label(), "Scene Lit Pipeline (Rgba16Float)");
    }
}
