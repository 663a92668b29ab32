use crate::foundation::core::{Affine, Point, Size};
use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;

/// Keep the normalized rectangle `start..end` of the working surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Crop {
    pub start: Point,
    pub end: Point,
}

impl Default for Crop {
    fn default() -> Self {
        Self {
            start: Point::ORIGIN,
            end: Point::new(1.0, 1.0),
        }
    }
}

impl Crop {
    pub const IDENTIFIER: &'static str = "crop";

    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        let d = Self::default();
        Ok(Self {
            start: params::get_point(Self::IDENTIFIER, settings, "start", d.start)?,
            end: params::get_point(Self::IDENTIFIER, settings, "end", d.end)?,
        })
    }

    /// Pixel rectangle on a `size` surface as `(x0, y0, target)`; at least 1px on each axis.
    pub fn pixel_rect(&self, size: Size) -> (u32, u32, Size) {
        let span = |lo: f64, hi: f64, len: u32| {
            let len_f = f64::from(len);
            let a = ((lo * len_f).round() as u32).min(len.saturating_sub(1));
            let b = ((hi * len_f).round() as u32).min(len);
            (a, b.saturating_sub(a).max(1))
        };
        let (x0, w) = span(self.start.x, self.end.x, size.width);
        let (y0, h) = span(self.start.y, self.end.y, size.height);
        (x0, y0, Size::new(w, h))
    }
}

impl Operation for Crop {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let id = Self::IDENTIFIER;
        let (s, e) = (self.start, self.end);
        ensure(
            id,
            s.x.is_finite() && s.y.is_finite() && e.x.is_finite() && e.y.is_finite(),
            || "start and end must be finite".to_string(),
        )?;
        ensure(id, s.x >= 0.0 && s.y >= 0.0, || {
            format!("start {s:?} must be >= 0")
        })?;
        ensure(id, e.x <= 1.0 && e.y <= 1.0, || format!("end {e:?} must be <= 1"))?;
        ensure(id, s.x < e.x && s.y < e.y, || {
            format!("start {s:?} must be strictly before end {e:?}")
        })
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        let (x0, y0, target) = self.pixel_rect(renderer.size());
        if x0 == 0 && y0 == 0 && target == renderer.size() {
            return Ok(());
        }
        tracing::debug!(x0, y0, %target, "crop");
        renderer.transform(
            Affine::translate((-f64::from(x0), -f64::from(y0))),
            target,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operations/crop.rs"]
mod tests;
