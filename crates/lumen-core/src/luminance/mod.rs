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

//! CPU-side state of the luminance adaptation pipeline.
//!
//! The GPU work (copy, log-luminance and reduction passes) lives in the render lanes.
//! This module owns the parts that are pure math: how large each level of the
//! reduction chain is, and how the measured log-average luminance is smoothed over
//! time.

mod adaptation;
mod chain;

pub use self::adaptation::{exposure_from_log_luminance, AdaptationSettings, LuminanceAdaptation};
pub use self::chain::{LuminanceChainLayout, MIN_VIEWPORT_DIMENSION};
