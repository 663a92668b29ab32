use std::sync::Arc;

use crate::foundation::error::{PixstackError, PixstackResult};

pub use kurbo::{Affine, Point, Vec2};

/// Width/height of a surface in pixels.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Axes swapped, as after a quarter turn.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }

    /// Affine map stretching a `self`-sized surface onto `target`.
    pub fn stretch_to(self, target: Size) -> Affine {
        Affine::scale_non_uniform(
            f64::from(target.width) / f64::from(self.width.max(1)),
            f64::from(target.height) / f64::from(self.height.max(1)),
        )
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Immutable decoded bitmap: premultiplied RGBA8, row-major, tightly packed.
///
/// Cloning is cheap; several pipelines can read the same image concurrently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    size: Size,
    rgba8_premul: Arc<[u8]>,
}

impl SourceImage {
    /// Wrap bytes that are already premultiplied.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> PixstackResult<Self> {
        let size = Size::new(width, height);
        if size.is_empty() {
            return Err(PixstackError::validation("source image must be non-empty"));
        }
        let expected = size
            .pixel_count()
            .checked_mul(4)
            .ok_or_else(|| PixstackError::validation("source image size overflow"))?;
        if data.len() != expected {
            return Err(PixstackError::validation(format!(
                "source image expects {expected} bytes for {size}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            size,
            rgba8_premul: data.into(),
        })
    }

    /// Build from straight-alpha RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> PixstackResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// Single-color image, `rgba` in straight alpha.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixstackResult<Self> {
        let px = premul_rgba8(rgba);
        Self::from_premul_rgba8(width, height, px.repeat(Size::new(width, height).pixel_count()))
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

impl TryFrom<&image::RgbaImage> for SourceImage {
    type Error = PixstackError;

    /// Premultiplies a decoded straight-alpha image. Empty images are rejected.
    fn try_from(img: &image::RgbaImage) -> PixstackResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_rgba8(width, height, img.as_raw().clone())
    }
}

pub(crate) fn premul_rgba8([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let a16 = u16::from(a);
    let premul = |c: u8| ((u16::from(c) * a16 + 127) / 255) as u8;
    [premul(r), premul(g), premul(b), a]
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let out = premul_rgba8([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
