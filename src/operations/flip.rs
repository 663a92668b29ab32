use crate::foundation::core::Affine;
use crate::foundation::error::PixstackResult;
use crate::operations::{Operation, params};
use crate::render::backend::Renderer;

/// Mirror along either or both axes. Size is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const IDENTIFIER: &'static str = "flip";

    pub fn from_settings(settings: &serde_json::Value) -> PixstackResult<Self> {
        Ok(Self {
            horizontal: params::get_bool(Self::IDENTIFIER, settings, "horizontal", false)?,
            vertical: params::get_bool(Self::IDENTIFIER, settings, "vertical", false)?,
        })
    }
}

impl Operation for Flip {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        Ok(())
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        if !self.horizontal && !self.vertical {
            return Ok(());
        }
        let size = renderer.size();
        let (sx, tx) = if self.horizontal {
            (-1.0, f64::from(size.width))
        } else {
            (1.0, 0.0)
        };
        let (sy, ty) = if self.vertical {
            (-1.0, f64::from(size.height))
        } else {
            (1.0, 0.0)
        };
        renderer.transform(Affine::new([sx, 0.0, 0.0, sy, tx, ty]), size)
    }
}
