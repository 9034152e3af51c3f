use crate::config::QualityConfig;

use super::ViewSurface;

/// Render-quality ramp coupled to session transitions.
///
/// Startup applies a deliberately reduced render scale for fast first
/// paint. The ramp to the target scale happens once, on the first of
/// content-ready or session entry; exit reverts to the platform default
/// and re-arms the ramp for the next entry.
pub struct QualityRamp {
    config: QualityConfig,
    ramped: bool,
    anisotropy_applied: bool,
}

impl QualityRamp {
    pub fn new(config: QualityConfig) -> QualityRamp {
        QualityRamp {
            config,
            ramped: false,
            anisotropy_applied: false,
        }
    }

    pub(crate) fn apply_startup(&self, surface: &mut impl ViewSurface) {
        let dpr = surface.device_pixel_ratio();
        let startup = (dpr * self.config.initial_multiplier).min(self.config.max_pixel_ratio);
        surface.set_render_scale(startup);
    }

    pub(crate) fn target_scale(&self, device_pixel_ratio: f32) -> f32 {
        (device_pixel_ratio * self.config.pixel_ratio_multiplier).min(self.config.max_pixel_ratio)
    }

    pub(crate) fn on_content_ready(&mut self, surface: &mut impl ViewSurface) {
        self.ramp(surface);
    }

    /// Session entry: ramp if content-ready has not already done it, and
    /// elevate texture filtering once for this entry.
    pub(crate) fn on_enter(&mut self, surface: &mut impl ViewSurface) {
        self.ramp(surface);
        if !self.anisotropy_applied {
            surface.set_anisotropy(self.config.anisotropy);
            self.anisotropy_applied = true;
        }
    }

    pub(crate) fn on_exit(&mut self, surface: &mut impl ViewSurface) {
        let default_scale = surface.default_render_scale();
        surface.set_render_scale(default_scale);
        self.ramped = false;
        self.anisotropy_applied = false;
    }

    fn ramp(&mut self, surface: &mut impl ViewSurface) {
        if self.ramped {
            return;
        }
        let dpr = surface.device_pixel_ratio();
        let target = self.target_scale(dpr);
        surface.set_render_scale(target);
        self.ramped = true;
    }
}
