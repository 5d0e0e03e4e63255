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

//! Defines the hierarchy of error types for the rendering subsystem.

use std::fmt;

/// An error related to the creation of a graphics pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// The backend rejected the pipeline state object.
    CompilationFailed {
        /// A descriptive label for the pipeline.
        label: String,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// The color target format cannot be used with the requested program.
    IncompatibleColorTarget(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::CompilationFailed { label, details } => {
                write!(f, "Pipeline compilation failed for '{label}': {details}")
            }
            PipelineError::IncompatibleColorTarget(msg) => {
                write!(f, "Incompatible color target format: {msg}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// No live resource of the given kind has this ID.
    NotFound {
        /// The kind of resource, e.g. `"render target"`.
        kind: &'static str,
        /// The raw ID that was looked up.
        id: usize,
    },
    /// The descriptor passed to a creation call is invalid.
    InvalidDescriptor(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::NotFound { kind, id } => {
                write!(f, "No {kind} found with ID {id}.")
            }
            ResourceError::InvalidDescriptor(msg) => write!(f, "Invalid descriptor: {msg}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// A high-level error raised while driving a frame.
#[derive(Debug)]
pub enum RenderError {
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// Failed to acquire the next frame from the surface.
    SurfaceAcquisitionFailed(String),
    /// A pass was submitted while no frame was in flight.
    NoFrameInFlight,
    /// The luminance texel could not be read back to the CPU.
    ReadbackFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// The graphics device was lost and must be recreated.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "Failed to acquire surface for rendering: {msg}")
            }
            RenderError::NoFrameInFlight => {
                write!(f, "A pass was submitted outside of begin_frame/present.")
            }
            RenderError::ReadbackFailed(msg) => {
                write!(f, "Failed to read back GPU data: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::DeviceLost => write!(
                f,
                "The graphics device was lost and needs to be reinitialized."
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<PipelineError> for RenderError {
    fn from(err: PipelineError) -> Self {
        RenderError::ResourceError(err.into())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn resource_error_display() {
        let err = ResourceError::NotFound {
            kind: "render target",
            id: 7,
        };
        assert_eq!(format!("{err}"), "No render target found with ID 7.");
        assert!(err.source().is_none());
    }

    #[test]
    fn render_error_display_wrapping_pipeline_error() {
        let err: RenderError = PipelineError::CompilationFailed {
            label: "tone-mapping".to_string(),
            details: "bad entry point".to_string(),
        }
        .into();
        assert_eq!(
            format!("{err}"),
            "Graphics resource operation failed: Pipeline resource error: Pipeline compilation failed for 'tone-mapping': bad entry point"
        );
        assert!(err.source().is_some());
        assert!(err.source().unwrap().source().is_some());
    }
}
