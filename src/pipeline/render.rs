use rayon::prelude::*;

use crate::dimension::spec::DimensionSpec;
use crate::foundation::core::{Size, SourceImage};
use crate::foundation::error::{PixstackError, PixstackResult};
use crate::operations::Operation;
use crate::render::backend::{BackendKind, BackendPreference, Backends, Renderer};
use crate::render::surface::Surface;

/// Environment override for [`PipelineOpts::preference`].
pub const ENV_RENDERER: &str = "PIXSTACK_RENDERER";
/// Environment override for [`PipelineOpts::dimensions`].
pub const ENV_DIMENSIONS: &str = "PIXSTACK_DIMENSIONS";

/// Caller-facing knobs for one pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineOpts {
    /// Backend preference consulted during construction.
    pub preference: BackendPreference,
    /// Final output size.
    pub dimensions: DimensionSpec,
}

impl PipelineOpts {
    /// Defaults with `PIXSTACK_RENDERER` / `PIXSTACK_DIMENSIONS` applied.
    pub fn from_env() -> PixstackResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`. Unset or empty variables are ignored.
    pub fn with_env_overrides(self) -> PixstackResult<Self> {
        self.with_overrides(
            std::env::var(ENV_RENDERER).ok().as_deref(),
            std::env::var(ENV_DIMENSIONS).ok().as_deref(),
        )
    }

    pub(crate) fn with_overrides(
        mut self,
        renderer: Option<&str>,
        dimensions: Option<&str>,
    ) -> PixstackResult<Self> {
        if let Some(v) = renderer.filter(|v| !v.trim().is_empty()) {
            self.preference = v.parse()?;
        }
        if let Some(v) = dimensions.filter(|v| !v.trim().is_empty()) {
            self.dimensions = v.parse()?;
        }
        Ok(self)
    }
}

/// Lifecycle of a [`RenderPipeline`]. `Failed` and `Complete` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Constructed,
    Validating,
    Rendering,
    Finalizing,
    Resizing,
    Complete,
    Failed,
}

/// Counters describing one finished render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStats {
    /// Backend that produced the output.
    pub backend: BackendKind,
    /// Operations applied, in order.
    pub operations_applied: usize,
    /// Whether `resize_to` ran during the final resizing step.
    pub resized: bool,
}

/// Output of [`RenderPipeline::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    pub surface: Surface,
    pub size: Size,
    pub stats: RenderStats,
}

/// Applies an operation stack to one source image through one renderer.
///
/// The renderer is chosen and initialized from the source at construction. A pipeline renders
/// at most once; after a failure the renderer keeps whatever the operations before the failing
/// one drew (there is no rollback) and the pipeline should be dropped.
pub struct RenderPipeline {
    renderer: Box<dyn Renderer>,
    opts: PipelineOpts,
    state: PipelineState,
    initial_size: Size,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("backend", &self.renderer.kind())
            .field("size", &self.renderer.size())
            .field("opts", &self.opts)
            .field("state", &self.state)
            .field("initial_size", &self.initial_size)
            .finish()
    }
}

impl RenderPipeline {
    /// Select a backend from the default [`Backends`] and draw `image` into it.
    pub fn new(image: &SourceImage, opts: PipelineOpts) -> PixstackResult<Self> {
        Self::with_backends(image, opts, &Backends::default())
    }

    #[tracing::instrument(skip_all, fields(size = %image.size(), preference = ?opts.preference))]
    pub fn with_backends(
        image: &SourceImage,
        opts: PipelineOpts,
        backends: &Backends,
    ) -> PixstackResult<Self> {
        let initial_size = image.size();
        let factory = backends.select(opts.preference)?;
        tracing::info!(backend = %factory.kind(), "renderer selected");

        let mut renderer = factory.create(initial_size)?;
        renderer.draw_image(image)?;
        Ok(Self {
            renderer,
            opts,
            state: PipelineState::Constructed,
            initial_size,
        })
    }

    /// Validate every operation, apply them in order, flush, then resize.
    #[tracing::instrument(skip_all, fields(ops = ops.len(), backend = %self.renderer.kind()))]
    pub fn render(&mut self, ops: &[Box<dyn Operation>]) -> PixstackResult<RenderResult> {
        if self.state != PipelineState::Constructed {
            return Err(PixstackError::validation(format!(
                "pipeline already rendered (state {:?})",
                self.state
            )));
        }
        let out = self.run(ops);
        self.state = if out.is_ok() {
            PipelineState::Complete
        } else {
            PipelineState::Failed
        };
        out
    }

    fn run(&mut self, ops: &[Box<dyn Operation>]) -> PixstackResult<RenderResult> {
        self.state = PipelineState::Validating;
        validate_all(ops)?;

        self.state = PipelineState::Rendering;
        for (index, op) in ops.iter().enumerate() {
            tracing::debug!(index, op = op.identifier(), "apply");
            op.render(self.renderer.as_mut())
                .map_err(|e| PixstackError::render_failure(index, op.identifier(), e))?;
        }

        self.state = PipelineState::Finalizing;
        self.renderer.render_final()?;

        self.state = PipelineState::Resizing;
        let current = self.renderer.size();
        let target = self.opts.dimensions.resolve(current)?;
        let resized = target != current;
        if resized {
            tracing::debug!(from = %current, to = %target, "resize");
            self.renderer.resize_to(target)?;
        }

        Ok(RenderResult {
            surface: self.renderer.surface()?,
            size: target,
            stats: RenderStats {
                backend: self.renderer.kind(),
                operations_applied: ops.len(),
                resized,
            },
        })
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Source size captured at construction.
    pub fn initial_size(&self) -> Size {
        self.initial_size
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }
}

/// Run every `validate_settings` on the rayon pool; report the first failure in stack order.
fn validate_all(ops: &[Box<dyn Operation>]) -> PixstackResult<()> {
    let results: Vec<PixstackResult<()>> =
        ops.par_iter().map(|op| op.validate_settings()).collect();

    let mut first = None;
    for (index, result) in results.into_iter().enumerate() {
        let Err(e) = result else { continue };
        if first.is_none() {
            first = Some(e);
        } else {
            tracing::warn!(index, error = %e, "additional invalid operation");
        }
    }
    first.map_or(Ok(()), Err)
}

/// Construct a pipeline with `opts` and render `ops` in one go.
pub fn render_image(
    image: &SourceImage,
    ops: &[Box<dyn Operation>],
    opts: PipelineOpts,
) -> PixstackResult<RenderResult> {
    RenderPipeline::new(image, opts)?.render(ops)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/render.rs"]
mod tests;
