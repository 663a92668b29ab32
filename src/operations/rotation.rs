use crate::foundation::core::{Affine, Size};
use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;

/// Quarter-turn rotation, clockwise for positive degrees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rotation {
    pub degrees: f64,
}

impl Rotation {
    pub const IDENTIFIER: &'static str = "rotation";

    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        Ok(Self {
            degrees: params::get_f64(Self::IDENTIFIER, settings, "degrees", 0.0)?,
        })
    }

    /// Clockwise quarter turns in `0..4`.
    pub fn quarter_turns(&self) -> u32 {
        (self.degrees.rem_euclid(360.0) / 90.0).round() as u32 % 4
    }

    /// Pixel-exact map from a `size` surface to the rotated surface, and its size.
    pub fn placement(&self, size: Size) -> (Affine, Size) {
        let (w, h) = (f64::from(size.width), f64::from(size.height));
        match self.quarter_turns() {
            1 => (Affine::new([0.0, 1.0, -1.0, 0.0, h, 0.0]), size.transposed()),
            2 => (Affine::new([-1.0, 0.0, 0.0, -1.0, w, h]), size),
            3 => (Affine::new([0.0, -1.0, 1.0, 0.0, 0.0, w]), size.transposed()),
            _ => (Affine::IDENTITY, size),
        }
    }
}

impl Operation for Rotation {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let d = self.degrees;
        ensure(Self::IDENTIFIER, d.is_finite() && d % 90.0 == 0.0, || {
            format!("degrees must be a multiple of 90, got {d}")
        })
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        if self.quarter_turns() == 0 {
            return Ok(());
        }
        let (transform, target) = self.placement(renderer.size());
        tracing::debug!(turns = self.quarter_turns(), %target, "rotation");
        renderer.transform(transform, target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operations/rotation.rs"]
mod tests;
