use crate::foundation::core::{Affine, Size, SourceImage};
use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;

/// Solid border drawn over the edges of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Border width as a fraction of the shorter edge, `(0, 0.5]`.
    pub thickness: f64,
    /// Straight-alpha color.
    pub color: [u8; 4],
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            thickness: 0.05,
            color: [255, 255, 255, 255],
        }
    }
}

impl Frame {
    pub const IDENTIFIER: &'static str = "frame";

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        let id = Self::IDENTIFIER;
        let d = Self::default();
        Ok(Self {
            thickness: params::get_f64(id, settings, "thickness", d.thickness)?,
            color: params::get_rgba(id, settings, "color", d.color)?,
        })
    }

    /// Border width in pixels on a `size` surface: at least 1, at most half the shorter edge.
    pub fn thickness_px(&self, size: Size) -> u32 {
        let short = size.width.min(size.height);
        let t = (self.thickness * f64::from(short)).round() as u32;
        t.min(short / 2).max(1)
    }

    /// Non-overlapping `(x, y, w, h)` strips: top, bottom, left, right.
    ///
    /// The bottom strip never starts before the top one ends and the side strips only cover
    /// the rows between them, so every border pixel is painted once.
    pub fn strips(&self, size: Size) -> Vec<(u32, u32, u32, u32)> {
        let t = self.thickness_px(size);
        let (w, h) = (size.width, size.height);
        let top = t.min(h);
        let bottom = t.min(h - top);
        let left = t.min(w);
        let right = t.min(w - left);
        let inner_h = h - top - bottom;
        [
            (0, 0, w, top),
            (0, h - bottom, w, bottom),
            (0, top, left, inner_h),
            (w - right, top, right, inner_h),
        ]
        .into_iter()
        .filter(|&(_, _, sw, sh)| sw > 0 && sh > 0)
        .collect()
    }
}

impl Operation for Frame {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let t = self.thickness;
        ensure(Self::IDENTIFIER, t.is_finite() && t > 0.0 && t <= 0.5, || {
            format!("thickness must be in (0, 0.5], got {t}")
        })
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        if self.color[3] == 0 {
            return Ok(());
        }
        let size = renderer.size();
        let swatch = SourceImage::solid(1, 1, self.color)?;
        for (x, y, w, h) in self.strips(size) {
            let placement = Affine::translate((f64::from(x), f64::from(y)))
                * Affine::scale_non_uniform(f64::from(w), f64::from(h));
            renderer.composite(&swatch, placement, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operations/frame.rs"]
mod tests;
