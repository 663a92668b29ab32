use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;
use crate::render::fx::{MAX_BLUR_RADIUS_PX, PixelFx};

/// Gaussian blur over the whole surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Blur {
    pub radius_px: u32,
    pub sigma: f32,
}

impl Blur {
    pub const IDENTIFIER: &'static str = "blur";

    /// Blur with the default sigma of `radius_px / 2`.
    pub fn new(radius_px: u32) -> Self {
        Self {
            radius_px,
            sigma: radius_px as f32 / 2.0,
        }
    }

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        let id = Self::IDENTIFIER;
        let radius_px = params::get_u32(id, settings, "radius_px", 0)?;
        let sigma = match params::get_opt_f64(id, settings, "sigma")? {
            Some(s) => s as f32,
            None => radius_px as f32 / 2.0,
        };
        Ok(Self { radius_px, sigma })
    }
}

impl Operation for Blur {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let id = Self::IDENTIFIER;
        ensure(id, self.radius_px <= MAX_BLUR_RADIUS_PX, || {
            format!(
                "radius_px must be <= {MAX_BLUR_RADIUS_PX}, got {}",
                self.radius_px
            )
        })?;
        if self.radius_px == 0 {
            return Ok(());
        }
        ensure(id, self.sigma.is_finite() && self.sigma > 0.0, || {
            format!("sigma must be finite and > 0, got {}", self.sigma)
        })
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        if self.radius_px == 0 {
            return Ok(());
        }
        renderer.apply_fx(&PixelFx::Blur {
            radius_px: self.radius_px,
            sigma: self.sigma,
        })
    }
}
