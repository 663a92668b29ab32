use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;
use crate::render::fx::{ColorMatrix, PixelFx};

/// Brightness, contrast and saturation folded into a single color matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Adjustments {
    /// Added to each channel, `-1..=1`.
    pub brightness: f32,
    /// `0..=2`, 1 is neutral.
    pub contrast: f32,
    /// `0..=2`, 1 is neutral.
    pub saturation: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl Adjustments {
    pub const IDENTIFIER: &'static str = "adjustments";

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        let id = Self::IDENTIFIER;
        let d = Self::default();
        Ok(Self {
            brightness: params::get_f64(id, settings, "brightness", f64::from(d.brightness))?
                as f32,
            contrast: params::get_f64(id, settings, "contrast", f64::from(d.contrast))? as f32,
            saturation: params::get_f64(id, settings, "saturation", f64::from(d.saturation))?
                as f32,
        })
    }

    /// Brightness, then contrast, then saturation.
    pub fn matrix(&self) -> ColorMatrix {
        ColorMatrix::brightness(self.brightness)
            .then(&ColorMatrix::contrast(self.contrast))
            .then(&ColorMatrix::saturation(self.saturation))
    }
}

impl Operation for Adjustments {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let id = Self::IDENTIFIER;
        let in_range = |v: f32, lo: f32, hi: f32| v.is_finite() && (lo..=hi).contains(&v);
        ensure(id, in_range(self.brightness, -1.0, 1.0), || {
            format!("brightness must be in -1..=1, got {}", self.brightness)
        })?;
        ensure(id, in_range(self.contrast, 0.0, 2.0), || {
            format!("contrast must be in 0..=2, got {}", self.contrast)
        })?;
        ensure(id, in_range(self.saturation, 0.0, 2.0), || {
            format!("saturation must be in 0..=2, got {}", self.saturation)
        })
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        let m = self.matrix();
        if m.is_identity() {
            return Ok(());
        }
        renderer.apply_fx(&PixelFx::ColorMatrix(m))
    }
}
