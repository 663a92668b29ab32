use crate::foundation::core::{Size, unpremultiply_rgba8_in_place};

/// A readable copy of a renderer's working surface.
///
/// Pixels are **premultiplied** RGBA8; the `premultiplied` flag makes this explicit at API
/// boundaries. Downstream export should go through [`Surface::to_rgba_image`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl Surface {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Premultiplied RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(idx..idx + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy for encoders.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
    }
}
