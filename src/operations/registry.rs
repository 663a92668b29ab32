use std::collections::BTreeMap;

use crate::assets::store::AssetStore;
use crate::document::model::OperationSpec;
use crate::foundation::error::{PixstackError, PixstackResult};
use crate::operations::{
    Operation, adjustments::Adjustments, blur::Blur, crop::Crop, flip::Flip, frame::Frame,
    rotation::Rotation, sticker::Sticker,
};

/// Builds one operation from its JSON settings.
pub type OperationFactory =
    fn(&serde_json::Value, &AssetStore) -> PixstackResult<Box<dyn Operation>>;

/// Explicit identifier -> factory table.
///
/// Construct one per session and pass it to whoever builds stacks; there is no global instance.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    factories: BTreeMap<&'static str, OperationFactory>,
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl OperationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in operation.
    pub fn with_builtin() -> Self {
        let mut r = Self::new();
        r.factories
            .insert(Crop::IDENTIFIER, |v, _| Ok(Box::new(Crop::from_settings(v)?)));
        r.factories.insert(Rotation::IDENTIFIER, |v, _| {
            Ok(Box::new(Rotation::from_settings(v)?))
        });
        r.factories
            .insert(Flip::IDENTIFIER, |v, _| Ok(Box::new(Flip::from_settings(v)?)));
        r.factories.insert(Adjustments::IDENTIFIER, |v, _| {
            Ok(Box::new(Adjustments::from_settings(v)?))
        });
        r.factories
            .insert(Blur::IDENTIFIER, |v, _| Ok(Box::new(Blur::from_settings(v)?)));
        r.factories.insert(Sticker::IDENTIFIER, |v, assets| {
            Ok(Box::new(Sticker::from_settings(v, assets)?))
        });
        r.factories
            .insert(Frame::IDENTIFIER, |v, _| Ok(Box::new(Frame::from_settings(v)?)));
        r
    }

    /// Add a factory. Identifiers are unique; re-registering one is an error.
    pub fn register(
        &mut self,
        identifier: &'static str,
        factory: OperationFactory,
    ) -> PixstackResult<()> {
        if identifier.trim().is_empty() {
            return Err(PixstackError::validation(
                "operation identifier must be non-empty",
            ));
        }
        if self.factories.contains_key(identifier) {
            return Err(PixstackError::validation(format!(
                "operation '{identifier}' is already registered"
            )));
        }
        self.factories.insert(identifier, factory);
        Ok(())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Registered identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn build(
        &self,
        identifier: &str,
        settings: &serde_json::Value,
        assets: &AssetStore,
    ) -> PixstackResult<Box<dyn Operation>> {
        let factory = self.factories.get(identifier).ok_or_else(|| {
            PixstackError::validation(format!("unknown operation '{identifier}'"))
        })?;
        factory(settings, assets)
    }

    /// Build a whole stack, preserving order.
    pub fn build_stack(
        &self,
        specs: &[OperationSpec],
        assets: &AssetStore,
    ) -> PixstackResult<Vec<Box<dyn Operation>>> {
        specs
            .iter()
            .map(|s| self.build(&s.identifier, &s.settings, assets))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operations/registry.rs"]
mod tests;
