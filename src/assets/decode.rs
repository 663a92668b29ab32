use std::path::Path;

use anyhow::Context;

use crate::foundation::core::SourceImage;
use crate::foundation::error::PixstackResult;

/// Decode any format `image` understands into a premultiplied [`SourceImage`].
pub fn decode_image(bytes: &[u8]) -> PixstackResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    SourceImage::try_from(&dyn_img.to_rgba8())
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> PixstackResult<SourceImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    SourceImage::try_from(&dyn_img.to_rgba8())
}
