//! Per-device decoder workarounds.
//!
//! Some Amlogic based TV boxes misrender when the decoder output surface is
//! smaller than full HD, so the requested surface is raised to a minimum of
//! 1920x1089 on those devices.

use tracing::debug;

pub const MIN_SURFACE_WIDTH: u32 = 1920;
pub const MIN_SURFACE_HEIGHT: u32 = 1089;

/// Vendor or model substrings (lowercase) of the affected devices.
const CLAMP_VENDORS: &[&str] = &["amlogic", "mibox", "mi box"];

/// Decoder surface dimensions plus the input buffer size that travels with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRequest {
  pub width: u32,
  pub height: u32,
  pub max_input_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProfile {
  pub vendor: String,
  pub model: String,
}

/// Raise width and height to the minimum surface. `max_input_size` is left alone.
pub fn clamp_surface(req: SurfaceRequest) -> SurfaceRequest {
  SurfaceRequest {
    width: req.width.max(MIN_SURFACE_WIDTH),
    height: req.height.max(MIN_SURFACE_HEIGHT),
    max_input_size: req.max_input_size,
  }
}

pub fn needs_surface_clamp(profile: &DeviceProfile) -> bool {
  let vendor = profile.vendor.to_lowercase();
  let model = profile.model.to_lowercase();
  CLAMP_VENDORS.iter().any(|v| vendor.contains(v) || model.contains(v))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderQuirks {
  pub clamp_surface: bool,
}

impl DecoderQuirks {
  /// `force` enables the clamp regardless of the detected device.
  pub fn for_profile(profile: &DeviceProfile, force: bool) -> Self {
    Self { clamp_surface: force || needs_surface_clamp(profile) }
  }

  pub fn apply(&self, req: SurfaceRequest) -> SurfaceRequest {
    if !self.clamp_surface {
      return req;
    }
    let clamped = clamp_surface(req);
    if clamped != req {
      debug!(from = ?(req.width, req.height), to = ?(clamped.width, clamped.height), "decoder surface clamped");
    }
    clamped
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req(width: u32, height: u32) -> SurfaceRequest {
    SurfaceRequest { width, height, max_input_size: 777 }
  }

  #[test]
  fn large_surface_unchanged() {
    assert_eq!(clamp_surface(req(1920, 1089)), req(1920, 1089));
    assert_eq!(clamp_surface(req(3840, 2160)), req(3840, 2160));
  }

  #[test]
  fn small_surface_raised() {
    assert_eq!(clamp_surface(req(1280, 720)), req(1920, 1089));
    assert_eq!(clamp_surface(req(1920, 1080)), req(1920, 1089));
  }

  #[test]
  fn one_dimension_below_threshold() {
    assert_eq!(clamp_surface(req(3840, 800)), req(3840, 1089));
    assert_eq!(clamp_surface(req(640, 2000)), req(1920, 2000));
  }

  #[test]
  fn max_input_size_untouched() {
    let out = clamp_surface(SurfaceRequest { width: 1, height: 1, max_input_size: 42 });
    assert_eq!(out.max_input_size, 42);
  }

  #[test]
  fn vendor_detection() {
    let aml = DeviceProfile { vendor: "Amlogic".into(), model: "S905X".into() };
    let mibox = DeviceProfile { vendor: "Xiaomi".into(), model: "MIBOX3".into() };
    let other = DeviceProfile { vendor: "NVIDIA".into(), model: "SHIELD Android TV".into() };
    assert!(needs_surface_clamp(&aml));
    assert!(needs_surface_clamp(&mibox));
    assert!(!needs_surface_clamp(&other));
  }

  #[test]
  fn quirks_only_apply_when_enabled() {
    let other = DeviceProfile::default();
    assert_eq!(DecoderQuirks::for_profile(&other, false).apply(req(1280, 720)), req(1280, 720));
    assert_eq!(DecoderQuirks::for_profile(&other, true).apply(req(1280, 720)), req(1920, 1089));
  }
}
