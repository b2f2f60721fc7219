use std::collections::HashMap;
use egui::{Context, TextureHandle, TextureId, ColorImage, TextureOptions};
use thiserror::Error;

use crate::error::ExportError;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Failed to generate texture: {0}")]
    GenerationFailed(String),
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

impl From<ExportError> for TextureGenerationError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Surface { .. } => Self::InvalidDimensions,
            other => Self::GenerationFailed(other.to_string()),
        }
    }
}

/// Caches GPU textures for rasterised content (the composed scene, the reference image),
/// keyed by a name and a version that changes whenever the content does.
pub struct TextureManager {
    /// Cache of textures by (key, version)
    texture_cache: HashMap<(String, u64), TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<(String, u64), u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached", &self.texture_cache.len())
            .field("current_frame", &self.current_frame)
            .field("max_cache_size", &self.max_cache_size)
            .finish()
    }
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets the texture for `key` at `version`, generating it on a miss. Older versions of the
    /// same key are dropped.
    pub fn get_or_create_texture<F>(
        &mut self,
        key: &str,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (key.to_string(), version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureGenerationError::InvalidDimensions);
        }

        self.invalidate(key);
        self.prune_to(self.max_cache_size - 1);

        let name = format!("{key}_v{version}");
        let handle = ctx.load_texture(&name, image, TextureOptions::LINEAR);
        let id = handle.id();
        self.texture_cache.insert(cache_key.clone(), handle);
        self.last_used.insert(cache_key, self.current_frame);
        Ok(id)
    }

    /// Invalidates every cached version of `key`
    pub fn invalidate(&mut self, key: &str) {
        self.texture_cache.retain(|(cached, _), _| cached != key);
        self.last_used.retain(|(cached, _), _| cached != key);
    }

    /// Evicts least recently used textures until at most `limit` remain
    fn prune_to(&mut self, limit: usize) {
        if self.texture_cache.len() <= limit {
            return;
        }

        let mut entries: Vec<((String, u64), u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - limit;
        for (key, _) in entries.into_iter().take(to_remove) {
            self.texture_cache.remove(&key);
            self.last_used.remove(&key);
        }
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn get_texture(&self, key: &str, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(key.to_string(), version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_texture_generator() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let texture_id1 = manager
            .get_or_create_texture("scene", 1, mock_texture_generator, &ctx)
            .unwrap();
        let texture_id2 = manager
            .get_or_create_texture("scene", 1, || panic!("should hit the cache"), &ctx)
            .unwrap();

        assert_eq!(texture_id1, texture_id2);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn new_version_replaces_old() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        manager.get_or_create_texture("scene", 1, mock_texture_generator, &ctx).unwrap();
        manager.get_or_create_texture("scene", 2, mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture("scene", 1).is_none());
        assert!(manager.get_texture("scene", 2).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture("a", 1, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture("b", 1, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture("c", 1, mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture("a", 1).is_none());
        assert!(manager.get_texture("b", 1).is_some());
        assert!(manager.get_texture("c", 1).is_some());
    }

    #[test]
    fn generator_errors_are_not_cached() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);
        let result = manager.get_or_create_texture(
            "scene",
            1,
            || Err(ExportError::Surface { width: 0, height: 0 }.into()),
            &ctx,
        );
        assert!(matches!(result, Err(TextureGenerationError::InvalidDimensions)));
        assert_eq!(manager.cache_size(), 0);
    }
}
