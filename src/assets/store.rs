use std::collections::BTreeMap;
use std::path::Path;

use crate::assets::decode::load_image;
use crate::foundation::core::SourceImage;
use crate::foundation::error::{PixstackError, PixstackResult};

/// Keyed overlay images available to operations (stickers).
///
/// Populated up front; operations never perform IO while rendering.
#[derive(Clone, Debug, Default)]
pub struct AssetStore {
    images: BTreeMap<String, SourceImage>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the image stored under `key`, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, image: SourceImage) -> Option<SourceImage> {
        self.images.insert(key.into(), image)
    }

    pub fn get(&self, key: &str) -> Option<&SourceImage> {
        self.images.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// Decode every `key -> relative path` entry under `root`.
    pub fn load_all<'a>(
        root: &Path,
        entries: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> PixstackResult<Self> {
        let mut store = Self::new();
        for (key, rel) in entries {
            let norm = normalize_rel_path(rel)?;
            let image = load_image(&root.join(&norm))?;
            tracing::debug!(key = %key, path = %norm, size = %image.size(), "asset loaded");
            store.insert(key.clone(), image);
        }
        Ok(store)
    }
}

/// Normalize and validate document-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> PixstackResult<String> {
    let s = source.trim().replace('\\', "/");
    if s.is_empty() {
        return Err(PixstackError::validation("asset path must be non-empty"));
    }
    if s.starts_with('/') {
        return Err(PixstackError::validation("asset paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(PixstackError::validation(
                    "asset paths must not contain '..'",
                ));
            }
            _ => out.push(part),
        }
    }
    if out.is_empty() {
        return Err(PixstackError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
