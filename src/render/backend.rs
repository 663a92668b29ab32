use std::str::FromStr;

use crate::{
    foundation::core::{Affine, Size, SourceImage},
    foundation::error::{PixstackError, PixstackResult},
    render::{fx::PixelFx, surface::Surface},
};

/// The mutable drawing surface operations render into.
///
/// Both backends implement exactly this contract, so operations and the pipeline never need to
/// know which one they are talking to.
pub trait Renderer: Send {
    /// Which backend this is (diagnostics only; never branch on it).
    fn kind(&self) -> BackendKind;

    /// Initialize the working surface from `image`, stretched to the construction size.
    fn draw_image(&mut self, image: &SourceImage) -> PixstackResult<()>;

    /// Current working size.
    fn size(&self) -> Size;

    /// Reallocate at `target` and stretch the current content into it.
    fn resize_to(&mut self, target: Size) -> PixstackResult<()>;

    /// Flush deferred passes into a readable surface.
    fn render_final(&mut self) -> PixstackResult<()>;

    /// Read the working surface.
    fn surface(&self) -> PixstackResult<Surface>;

    /// Independent copy of the current content, flushing deferred work first.
    fn snapshot(&mut self) -> PixstackResult<Surface>;

    /// Redraw the current content through `transform` into a fresh `target`-sized surface.
    ///
    /// Pixels mapped from outside the old surface are transparent.
    fn transform(&mut self, transform: Affine, target: Size) -> PixstackResult<()>;

    /// Apply a pixel effect to the whole surface.
    fn apply_fx(&mut self, fx: &PixelFx) -> PixstackResult<()>;

    /// Draw `overlay` source-over the surface, placed by `transform`.
    fn composite(
        &mut self,
        overlay: &SourceImage,
        transform: Affine,
        opacity: f32,
    ) -> PixstackResult<()>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Raster surface backend powered by `vello_cpu`.
    Canvas,
    /// Accelerated backend powered by `wgpu` (requires the `gpu` feature).
    Gpu,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Canvas => "canvas",
            Self::Gpu => "gpu",
        })
    }
}

/// Caller preference consulted during backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Probe the accelerated backend first, fall back to canvas.
    #[default]
    Auto,
    /// Force the raster surface backend.
    Canvas,
}

impl FromStr for BackendPreference {
    type Err = PixstackError;

    fn from_str(s: &str) -> PixstackResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "canvas" | "cpu" => Ok(Self::Canvas),
            other => Err(PixstackError::validation(format!(
                "unknown renderer preference '{other}' (expected auto or canvas)"
            ))),
        }
    }
}

/// Capability probe plus constructor for one backend.
pub trait RendererFactory: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Side-effect free support probe. Must not keep any resources alive.
    fn is_supported(&self) -> bool;

    /// Construct a renderer whose working surface is `size`.
    fn create(&self, size: Size) -> PixstackResult<Box<dyn Renderer>>;
}

/// Factory for [`CanvasRenderer`](crate::render::cpu::CanvasRenderer).
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasFactory;

impl RendererFactory for CanvasFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas
    }

    fn is_supported(&self) -> bool {
        crate::render::cpu::CanvasRenderer::is_supported()
    }

    fn create(&self, size: Size) -> PixstackResult<Box<dyn Renderer>> {
        Ok(Box::new(crate::render::cpu::CanvasRenderer::new(size)?))
    }
}

/// Factory for the `wgpu` renderer. Reports unsupported when built without `gpu`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GpuFactory;

impl RendererFactory for GpuFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn is_supported(&self) -> bool {
        #[cfg(feature = "gpu")]
        {
            crate::render::gpu::GpuRenderer::is_supported()
        }
        #[cfg(not(feature = "gpu"))]
        {
            false
        }
    }

    fn create(&self, _size: Size) -> PixstackResult<Box<dyn Renderer>> {
        #[cfg(feature = "gpu")]
        {
            Ok(Box::new(crate::render::gpu::GpuRenderer::new(_size)?))
        }
        #[cfg(not(feature = "gpu"))]
        {
            Err(PixstackError::backend(
                "gpu backend requires the `gpu` cargo feature",
            ))
        }
    }
}

/// The two backends a pipeline may choose between.
pub struct Backends {
    pub accelerated: Box<dyn RendererFactory>,
    pub raster: Box<dyn RendererFactory>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            accelerated: Box::new(GpuFactory),
            raster: Box::new(CanvasFactory),
        }
    }
}

impl Backends {
    /// Pick a factory: accelerated first unless `Canvas` is requested, then raster.
    pub fn select(&self, preference: BackendPreference) -> PixstackResult<&dyn RendererFactory> {
        if preference != BackendPreference::Canvas {
            if self.accelerated.is_supported() {
                return Ok(self.accelerated.as_ref());
            }
            tracing::debug!(
                kind = %self.accelerated.kind(),
                "accelerated backend unsupported, falling back"
            );
        }
        if self.raster.is_supported() {
            return Ok(self.raster.as_ref());
        }
        Err(PixstackError::NoRendererAvailable)
    }
}

/// Create a rendering backend of a specific kind, skipping selection.
pub fn create_backend(kind: BackendKind, size: Size) -> PixstackResult<Box<dyn Renderer>> {
    match kind {
        BackendKind::Canvas => CanvasFactory.create(size),
        BackendKind::Gpu => GpuFactory.create(size),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
