use crate::assets::store::AssetStore;
use crate::foundation::core::{Affine, Point, Size, SourceImage};
use crate::foundation::error::{PixstackError, PixstackResult};
use crate::operations::{Operation, ensure, params};
use crate::render::backend::Renderer;

/// Overlay image placed by its center.
///
/// The image is resolved from the [`AssetStore`] when the operation is built; a missing key is
/// reported by `validate_settings`, not while parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Sticker {
    pub asset: String,
    pub image: Option<SourceImage>,
    /// Normalized center on the working surface.
    pub position: Point,
    /// Sticker width as a fraction of the working width.
    pub scale: f64,
    /// Clockwise degrees around the center.
    pub rotation: f64,
    pub opacity: f32,
}

impl Sticker {
    pub const IDENTIFIER: &'static str = "sticker";

    pub fn new(asset: impl Into<String>, image: SourceImage) -> Self {
        Self {
            asset: asset.into(),
            image: Some(image),
            position: Point::new(0.5, 0.5),
            scale: 0.25,
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    pub fn from_settings(
        settings: &serde_json::Value,
        assets: &AssetStore,
    ) -> PixstackResult<Self> {
        let id = Self::IDENTIFIER;
        let asset = params::get_string(id, settings, "asset")?
            .ok_or_else(|| PixstackError::invalid_settings(id, "missing 'asset' key"))?;
        Ok(Self {
            image: assets.get(&asset).cloned(),
            asset,
            position: params::get_point(id, settings, "position", Point::new(0.5, 0.5))?,
            scale: params::get_f64(id, settings, "scale", 0.25)?,
            rotation: params::get_f64(id, settings, "rotation", 0.0)?,
            opacity: params::get_f64(id, settings, "opacity", 1.0)? as f32,
        })
    }

    /// Map from sticker pixels onto a `canvas`-sized surface.
    pub fn placement(&self, sticker: Size, canvas: Size) -> Affine {
        let s = self.scale * f64::from(canvas.width) / f64::from(sticker.width.max(1));
        let center = Point::new(
            self.position.x * f64::from(canvas.width),
            self.position.y * f64::from(canvas.height),
        );
        Affine::translate(center.to_vec2())
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(s)
            * Affine::translate(-sticker.as_vec2() / 2.0)
    }
}

impl Operation for Sticker {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn validate_settings(&self) -> PixstackResult<()> {
        let id = Self::IDENTIFIER;
        ensure(id, self.image.is_some(), || {
            format!("asset '{}' is not in the asset store", self.asset)
        })?;
        ensure(
            id,
            self.position.x.is_finite() && self.position.y.is_finite(),
            || "position must be finite".to_string(),
        )?;
        ensure(id, self.scale.is_finite() && self.scale > 0.0, || {
            format!("scale must be > 0, got {}", self.scale)
        })?;
        ensure(id, self.rotation.is_finite(), || {
            "rotation must be finite".to_string()
        })?;
        ensure(
            id,
            self.opacity.is_finite() && (0.0..=1.0).contains(&self.opacity),
            || format!("opacity must be in 0..=1, got {}", self.opacity),
        )
    }

    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()> {
        let image = self.image.as_ref().ok_or_else(|| {
            let reason = format!("asset '{}' missing", self.asset);
            PixstackError::invalid_settings(Self::IDENTIFIER, reason)
        })?;
        if self.opacity <= 0.0 {
            return Ok(());
        }
        let transform = self.placement(image.size(), renderer.size());
        renderer.composite(image, transform, self.opacity)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operations/sticker.rs"]
mod tests;
