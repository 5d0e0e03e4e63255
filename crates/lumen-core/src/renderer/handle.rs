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

//! Owning handles that release their GPU resource when dropped.
//!
//! Each handle keeps the device alive through an `Arc` and destroys its resource
//! exactly once, in `Drop`. Handles are not `Clone`; sharing a resource means
//! sharing the handle.

use std::sync::Arc;

use crate::math::Extent2D;
use crate::renderer::api::{
    MeshDescriptor, MeshId, ReadbackId, RenderTargetDescriptor, RenderTargetId, TextureFormat,
};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;

/// An owned render target.
#[derive(Debug)]
pub struct OwnedRenderTarget {
    device: Arc<dyn GraphicsDevice>,
    id: RenderTargetId,
    size: Extent2D,
    format: TextureFormat,
}

impl OwnedRenderTarget {
    /// Creates a render target on `device`.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<Self, ResourceError> {
        let id = device.create_render_target(descriptor)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
            size: descriptor.size,
            format: descriptor.format,
        })
    }

    /// The underlying ID, valid for as long as `self` lives.
    pub fn id(&self) -> RenderTargetId {
        self.id
    }

    /// The size in texels.
    pub fn size(&self) -> Extent2D {
        self.size
    }

    /// The texel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for OwnedRenderTarget {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_render_target(self.id) {
            log::error!("Failed to release render target {:?}: {e}", self.id);
        }
    }
}

/// An owned mesh.
#[derive(Debug)]
pub struct OwnedMesh {
    device: Arc<dyn GraphicsDevice>,
    id: MeshId,
    index_count: u32,
}

impl OwnedMesh {
    /// Uploads a mesh to `device`.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        descriptor: &MeshDescriptor<'_>,
    ) -> Result<Self, ResourceError> {
        let id = device.create_mesh(descriptor)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
            index_count: descriptor.indices.len() as u32,
        })
    }

    /// The underlying ID, valid for as long as `self` lives.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Number of indices drawn.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl Drop for OwnedMesh {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_mesh(self.id) {
            log::error!("Failed to release mesh {:?}: {e}", self.id);
        }
    }
}

/// An owned single-texel staging resource.
#[derive(Debug)]
pub struct OwnedReadback {
    device: Arc<dyn GraphicsDevice>,
    id: ReadbackId,
}

impl OwnedReadback {
    /// Creates a staging resource on `device`.
    pub fn new(device: &Arc<dyn GraphicsDevice>, label: Option<&str>) -> Result<Self, ResourceError> {
        let id = device.create_readback(label)?;
        Ok(Self {
            device: Arc::clone(device),
            id,
        })
    }

    /// The underlying ID, valid for as long as `self` lives.
    pub fn id(&self) -> ReadbackId {
        self.id
    }
}

impl Drop for OwnedReadback {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_readback(self.id) {
            log::error!("Failed to release readback {:?}: {e}", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing::{DeviceCall, RecordingDevice};

    #[test]
    fn test_handles_release_exactly_once() {
        let recording = Arc::new(RecordingDevice::new(Extent2D::new(64, 64)));
        let device: Arc<dyn GraphicsDevice> = recording.clone();
        {
            let _target = OwnedRenderTarget::new(
                &device,
                &RenderTargetDescriptor::new("hdr", Extent2D::new(4, 4), TextureFormat::Rgba16Float),
            )
            .unwrap();
            let _readback = OwnedReadback::new(&device, Some("staging")).unwrap();
            let mesh = OwnedMesh::new(
                &device,
                &MeshDescriptor {
                    label: None,
                    vertices: &[],
                    indices: &[0, 1, 2],
                },
            )
            .unwrap();
            assert_eq!(mesh.index_count(), 3);
            assert_eq!(recording.live_resource_count(), 3);
        }
        assert_eq!(recording.live_resource_count(), 0);
        let destroyed = recording
            .calls()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    DeviceCall::DestroyRenderTarget(_)
                        | DeviceCall::DestroyMesh(_)
                        | DeviceCall::DestroyReadback(_)
                )
            })
            .count();
        assert_eq!(destroyed, 3);
    }

    #[test]
    fn test_handle_keeps_device_alive() {
        let recording = Arc::new(RecordingDevice::new(Extent2D::new(64, 64)));
        let device: Arc<dyn GraphicsDevice> = recording.clone();
        let target = OwnedRenderTarget::new(
            &device,
            &RenderTargetDescriptor::new("depth", Extent2D::new(2, 2), TextureFormat::Depth32Float),
        )
        .unwrap();
        let id = target.id();
        drop(device);
        assert_eq!(target.format(), TextureFormat::Depth32Float);
        drop(target);
        assert_eq!(recording.calls().last(), Some(&DeviceCall::DestroyRenderTarget(id)));
    }
}
