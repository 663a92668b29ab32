//! Built-in edit operations and the contract they share.

pub(crate) mod adjustments;
pub(crate) mod blur;
pub(crate) mod crop;
pub(crate) mod flip;
pub(crate) mod frame;
pub(crate) mod params;
pub(crate) mod registry;
pub(crate) mod rotation;
pub(crate) mod sticker;

use crate::foundation::error::PixstackResult;
use crate::render::backend::Renderer;

/// One step of an edit stack.
///
/// `validate_settings` must not touch any renderer; the pipeline calls it for every operation
/// (possibly in parallel) before the first `render`.
pub trait Operation: Send + Sync + std::fmt::Debug {
    /// Stable identifier, also the registry key.
    fn identifier(&self) -> &'static str;

    /// Check settings, failing with [`PixstackError::InvalidOperationSettings`].
    ///
    /// [`PixstackError::InvalidOperationSettings`]: crate::PixstackError::InvalidOperationSettings
    fn validate_settings(&self) -> PixstackResult<()>;

    /// Mutate `renderer` in place.
    fn render(&self, renderer: &mut dyn Renderer) -> PixstackResult<()>;
}

/// Shared range check for settings validation.
pub(crate) fn ensure(id: &str, ok: bool, reason: impl FnOnce() -> String) -> PixstackResult<()> {
    if ok {
        Ok(())
    } else {
        Err(crate::PixstackError::invalid_settings(id, reason()))
    }
}
