/// Convenience result type used across pixstack.
pub type PixstackResult<T> = Result<T, PixstackError>;

/// Top-level error taxonomy used by pipeline, backend and operation APIs.
#[derive(thiserror::Error, Debug)]
pub enum PixstackError {
    /// Neither the accelerated nor the raster backend reported support.
    ///
    /// Raised while constructing a pipeline; nothing else can proceed.
    #[error("no renderer available: neither the accelerated nor the canvas backend is supported")]
    NoRendererAvailable,

    /// A dimension spec could not be parsed or resolves to a non-positive size.
    #[error("invalid dimension spec: {0}")]
    InvalidDimensionSpec(String),

    /// An operation rejected its own settings during the validation phase.
    #[error("invalid settings for operation '{identifier}': {reason}")]
    InvalidOperationSettings {
        /// Stable identifier of the offending operation.
        identifier: String,
        /// The violated constraint.
        reason: String,
    },

    /// An operation failed while being applied to the renderer.
    ///
    /// Operations before `index` have already mutated the renderer.
    #[error("operation #{index} '{identifier}' failed to render: {source}")]
    OperationRenderFailure {
        /// Position of the operation in the stack.
        index: usize,
        /// Stable identifier of the failed operation.
        identifier: String,
        /// Underlying failure.
        #[source]
        source: Box<PixstackError>,
    },

    /// Invalid caller-provided data (documents, registry lookups, API misuse).
    #[error("validation error: {0}")]
    Validation(String),

    /// Backend or device level failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixstackError {
    /// Build a [`PixstackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixstackError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`PixstackError::InvalidDimensionSpec`] value.
    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensionSpec(msg.into())
    }

    /// Build a [`PixstackError::InvalidOperationSettings`] value.
    pub fn invalid_settings(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperationSettings {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Wrap `source` as the render failure of operation `index`.
    pub fn render_failure(index: usize, identifier: impl Into<String>, source: Self) -> Self {
        Self::OperationRenderFailure {
            index,
            identifier: identifier.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
