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

use std::sync::Arc;

use approx::assert_relative_eq;
use lumen_core::luminance::AdaptationSettings;
use lumen_core::math::Extent2D;
use lumen_core::renderer::testing::{DeviceCall, RecordingDevice};
use lumen_core::renderer::{
    ColorTarget, FullscreenProgram, GraphicsDevice, OwnedRenderTarget, RenderError,
    RenderTargetDescriptor, TextureFormat,
};
use lumen_lanes::render_lane::{LuminanceAdaptationPipeline, LUMINANCE_FORMAT};

struct Fixture {
    recording: Arc<RecordingDevice>,
    pipeline: LuminanceAdaptationPipeline,
    hdr: OwnedRenderTarget,
}

fn fixture(size: Extent2D) -> Fixture {
    let recording = Arc::new(RecordingDevice::new(size));
    let device: Arc<dyn GraphicsDevice> = recording.clone();
    let hdr = OwnedRenderTarget::new(
        &device,
        &RenderTargetDescriptor::new("HDR", size, TextureFormat::Rgba16Float),
    )
    .unwrap();
    let pipeline =
        LuminanceAdaptationPipeline::new(device, size, AdaptationSettings::default()).unwrap();
    recording.clear_calls();
    Fixture {
        recording,
        pipeline,
        hdr,
    }
}

fn fullscreen_calls(calls: &[DeviceCall]) -> Vec<(FullscreenProgram, Extent2D)> {
    calls
        .iter()
        .filter_map(|call| match call {
            DeviceCall::DrawFullscreen {
                program,
                target_size,
                ..
            } => Some((*program, *target_size)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_creation_allocates_square_and_levels() {
    let recording = Arc::new(RecordingDevice::new(Extent2D::new(512, 512)));
    let device: Arc<dyn GraphicsDevice> = recording.clone();
    let pipeline = LuminanceAdaptationPipeline::new(
        device,
        Extent2D::new(512, 512),
        AdaptationSettings::default(),
    )
    .unwrap();
    assert_eq!(pipeline.layout().level_count(), 10);

    let created: Vec<_> = recording
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            DeviceCall::CreateRenderTarget { size, format, .. } => Some((size, format)),
            _ => None,
        })
        .collect();
    // The square copy, then levels 512 down to 1.
    assert_eq!(created.len(), 11);
    assert!(created.iter().all(|(_, format)| *format == LUMINANCE_FORMAT));
    assert_eq!(created[0].0, Extent2D::square(512));
    assert_eq!(created[1].0, Extent2D::square(512));
    assert_eq!(created[10].0, Extent2D::square(1));
}

#[test]
fn test_run_issues_passes_in_order() {
    let mut f = fixture(Extent2D::new(512, 512));
    f.recording.set_texel_value(-1.5);
    f.recording.begin_frame().unwrap();
    f.pipeline
        .run(f.hdr.id(), 0.0, ColorTarget::Surface)
        .unwrap();

    let calls = f.recording.calls();
    let passes = fullscreen_calls(&calls);
    // Copy, log-luminance, 9 downsamples, tone-map.
    assert_eq!(passes.len(), 12);
    assert_eq!(passes[0], (FullscreenProgram::Copy, Extent2D::square(512)));
    assert_eq!(passes[1], (FullscreenProgram::LogLuminance, Extent2D::square(512)));
    for (i, pass) in passes[2..11].iter().enumerate() {
        assert_eq!(*pass, (FullscreenProgram::Copy, Extent2D::square(256 >> i)));
    }
    assert_eq!(passes[11], (FullscreenProgram::ToneMapping, Extent2D::new(512, 512)));

    let readback_at = calls
        .iter()
        .position(|c| matches!(c, DeviceCall::ReadTexel { .. }))
        .unwrap();
    let tone_map_at = calls
        .iter()
        .rposition(|c| matches!(c, DeviceCall::DrawFullscreen { .. }))
        .unwrap();
    assert!(readback_at < tone_map_at);
}

#[test]
fn test_first_measurement_sets_exposure() {
    let mut f = fixture(Extent2D::new(64, 64));
    f.recording.set_texel_value(0.5_f32.ln());
    f.recording.begin_frame().unwrap();
    let report = f
        .pipeline
        .run(f.hdr.id(), 0.0, ColorTarget::Surface)
        .unwrap();
    assert_relative_eq!(report.adapted_log_luminance, 0.5_f32.ln());
    assert_relative_eq!(report.exposure, 0.18 / 0.5, epsilon = 1e-5);

    let uniforms = f
        .recording
        .calls()
        .into_iter()
        .rev()
        .find_map(|call| match call {
            DeviceCall::DrawFullscreen {
                program: FullscreenProgram::ToneMapping,
                uniforms,
                ..
            } => Some(uniforms),
            _ => None,
        })
        .unwrap();
    assert_relative_eq!(uniforms.exposure, report.exposure);
    assert_relative_eq!(uniforms.adapted_log_luminance, report.adapted_log_luminance);
}

#[test]
fn test_adaptation_does_not_jump_to_a_spike() {
    let mut f = fixture(Extent2D::new(64, 64));
    f.recording.set_texel_value(-2.0);
    f.recording.begin_frame().unwrap();
    f.pipeline.run(f.hdr.id(), 0.0, ColorTarget::Surface).unwrap();
    f.recording.present().unwrap();

    f.recording.set_texel_value(3.0);
    f.recording.begin_frame().unwrap();
    let report = f
        .pipeline
        .run(f.hdr.id(), 1.0 / 60.0, ColorTarget::Surface)
        .unwrap();
    let expected = -2.0 + 5.0 * (1.0 - (-1.0_f32 / 60.0).exp());
    assert_relative_eq!(report.adapted_log_luminance, expected, epsilon = 1e-5);
    assert!(report.adapted_log_luminance < 0.0);
}

#[test]
fn test_resize_rebuilds_chain() {
    let mut f = fixture(Extent2D::new(512, 512));
    f.pipeline.resize(Extent2D::new(300, 300)).unwrap();
    assert_eq!(f.pipeline.layout().level_count(), 9);

    let calls = f.recording.calls();
    let destroyed = calls
        .iter()
        .filter(|c| matches!(c, DeviceCall::DestroyRenderTarget(_)))
        .count();
    let created: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            DeviceCall::CreateRenderTarget { size, .. } => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, 11);
    assert_eq!(created.len(), 10);
    assert_eq!(created[0], Extent2D::square(256));
    assert_eq!(created.last(), Some(&Extent2D::square(1)));
}

#[test]
fn test_resize_with_same_layout_keeps_chain() {
    let mut f = fixture(Extent2D::new(512, 512));
    f.pipeline.resize(Extent2D::new(600, 530)).unwrap();
    assert!(f.recording.calls().is_empty());
}

#[test]
fn test_failed_resize_keeps_previous_chain() {
    let mut f = fixture(Extent2D::new(512, 512));
    let live_before = f.recording.live_resource_count();

    // The square and three levels fit, the fourth level does not.
    f.recording.set_render_target_budget(Some(4));
    assert!(f.pipeline.resize(Extent2D::new(300, 300)).is_err());
    assert_eq!(f.pipeline.layout().level_count(), 10);
    assert_eq!(f.recording.live_resource_count(), live_before);

    f.recording.set_render_target_budget(None);
    f.recording.begin_frame().unwrap();
    f.pipeline.measure(f.hdr.id()).unwrap();
    f.recording.present().unwrap();

    // Retrying the same size reallocates instead of matching a stale layout.
    f.recording.clear_calls();
    f.pipeline.resize(Extent2D::new(300, 300)).unwrap();
    assert_eq!(f.pipeline.layout().level_count(), 9);
    assert!(!f.recording.calls().is_empty());
}

#[test]
fn test_tiny_viewport_is_clamped() {
    let f = fixture(Extent2D::new(3, 200));
    assert_eq!(f.pipeline.layout().level_count(), 4);
}

#[test]
fn test_adaptation_survives_resize() {
    let mut f = fixture(Extent2D::new(128, 128));
    f.recording.set_texel_value(1.25);
    f.recording.begin_frame().unwrap();
    f.pipeline.run(f.hdr.id(), 0.0, ColorTarget::Surface).unwrap();
    f.pipeline.resize(Extent2D::new(32, 32)).unwrap();
    assert_eq!(f.pipeline.adaptation().adapted(), Some(1.25));
}

#[test]
fn test_measure_outside_frame_fails() {
    let f = fixture(Extent2D::new(64, 64));
    let err = f.pipeline.measure(f.hdr.id()).unwrap_err();
    assert!(matches!(err, RenderError::NoFrameInFlight));
}

#[test]
fn test_dropping_pipeline_releases_everything() {
    let f = fixture(Extent2D::new(64, 64));
    let Fixture {
        recording,
        pipeline,
        hdr,
    } = f;
    drop(pipeline);
    drop(hdr);
    assert_eq!(recording.live_resource_count(), 0);
}
