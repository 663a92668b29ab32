//! pixstack applies ordered image-edit stacks through interchangeable rendering backends.
//!
//! The flow is:
//!
//! - Decode a [`SourceImage`] (or build one from raw RGBA8)
//! - Build an operation stack by hand or through an [`OperationRegistry`]
//! - Create a [`RenderPipeline`], which selects the accelerated backend when available and
//!   falls back to the raster [`CanvasRenderer`]
//! - [`RenderPipeline::render`] validates every operation, applies them in order, flushes the
//!   backend and resizes to the requested [`DimensionSpec`]
#![forbid(unsafe_code)]

mod assets;
mod dimension;
mod document;
mod foundation;
mod operations;
mod pipeline;
mod render;

pub use crate::foundation::core::{Affine, Point, Size, SourceImage, Vec2};
pub use crate::foundation::error::{PixstackError, PixstackResult};

pub use crate::assets::decode::{decode_image, load_image};
pub use crate::assets::store::AssetStore;
pub use crate::dimension::spec::DimensionSpec;
pub use crate::document::model::{EditDocument, OperationSpec};
pub use crate::operations::Operation;
pub use crate::operations::adjustments::Adjustments;
pub use crate::operations::blur::Blur;
pub use crate::operations::crop::Crop;
pub use crate::operations::flip::Flip;
pub use crate::operations::frame::Frame;
pub use crate::operations::registry::{OperationFactory, OperationRegistry};
pub use crate::operations::rotation::Rotation;
pub use crate::operations::sticker::Sticker;
pub use crate::pipeline::render::{
    ENV_DIMENSIONS, ENV_RENDERER, PipelineOpts, PipelineState, RenderPipeline, RenderResult,
    RenderStats, render_image,
};
pub use crate::render::backend::{
    BackendKind, BackendPreference, Backends, CanvasFactory, GpuFactory, Renderer,
    RendererFactory, create_backend,
};
pub use crate::render::cpu::CanvasRenderer;
pub use crate::render::fx::{ColorMatrix, MAX_BLUR_RADIUS_PX, PixelFx};
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuRenderer;
pub use crate::render::surface::Surface;
