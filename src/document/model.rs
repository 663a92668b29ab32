use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dimension::spec::DimensionSpec;
use crate::foundation::error::{PixstackError, PixstackResult};
use crate::render::backend::BackendPreference;

/// A saved edit session: renderer preference, output size and the ordered operation stack.
///
/// ```json
/// {
///   "renderer": "auto",
///   "dimensions": "800x",
///   "assets": { "star": "stickers/star.png" },
///   "operations": [
///     { "identifier": "crop", "settings": { "start": [0.1, 0.1], "end": [0.9, 0.9] } },
///     { "identifier": "rotation", "settings": { "degrees": 90 } }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditDocument {
    #[serde(default)]
    pub renderer: BackendPreference,
    #[serde(default)]
    pub dimensions: DimensionSpec,
    /// Sticker asset key -> path relative to the document.
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

/// One entry of the stack, resolved through an [`OperationRegistry`].
///
/// [`OperationRegistry`]: crate::OperationRegistry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationSpec {
    pub identifier: String,
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl OperationSpec {
    pub fn new(identifier: impl Into<String>, settings: serde_json::Value) -> Self {
        Self {
            identifier: identifier.into(),
            settings,
        }
    }
}

impl EditDocument {
    pub fn from_json_str(s: &str) -> PixstackResult<Self> {
        let doc: Self = serde_json::from_str(s)
            .map_err(|e| PixstackError::validation(format!("edit document json: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json_string_pretty(&self) -> PixstackResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PixstackError::validation(format!("edit document json: {e}")))
    }

    /// Structural checks. Operation settings are validated by the operations themselves.
    pub fn validate(&self) -> PixstackResult<()> {
        for (i, op) in self.operations.iter().enumerate() {
            if op.identifier.trim().is_empty() {
                return Err(PixstackError::validation(format!(
                    "operation #{i} has an empty identifier"
                )));
            }
            if !(op.settings.is_object() || op.settings.is_null()) {
                return Err(PixstackError::validation(format!(
                    "operation #{i} '{}' settings must be an object",
                    op.identifier
                )));
            }
        }
        for (key, path) in &self.assets {
            if key.trim().is_empty() {
                return Err(PixstackError::validation("asset keys must be non-empty"));
            }
            crate::assets::store::normalize_rel_path(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
