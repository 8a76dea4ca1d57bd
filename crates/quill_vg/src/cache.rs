//! State-to-resource cache
//!
//! Three independent deduplicating maps guarantee that two draw calls with
//! identical effective state share the same backend resource instead of
//! allocating a new one:
//!
//! - draw state -> render configuration
//! - (image identity, wrap mode) -> texture
//! - scissor rectangle -> clip region
//!
//! Entries are created lazily on first miss and live until [`ResourceCache::clear`];
//! nothing is evicted individually. Resolving a byte-identical key twice
//! always yields the identical shared instance.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use quill_core::{Image, RectI, WrapMode};

use crate::backend::{ClipRegion, ConfigDescriptor, RenderBackend, RenderConfig, TextureResource};
use crate::state::DrawState;

/// Texture cache key: image identity plus wrap mode
///
/// Keyed on the image `Arc` pointer, not pixel contents. Swapping to a
/// different image object with identical pixels is a different key.
#[derive(Clone, Debug)]
struct TextureKey {
    image: Arc<Image>,
    wrap: WrapMode,
}

impl PartialEq for TextureKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image) && self.wrap == other.wrap
    }
}

impl Eq for TextureKey {}

impl Hash for TextureKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.image) as usize).hash(state);
        self.wrap.hash(state);
    }
}

/// Deduplicating resource cache
#[derive(Default)]
pub struct ResourceCache {
    configs: FxHashMap<DrawState, Arc<RenderConfig>>,
    textures: FxHashMap<TextureKey, Arc<TextureResource>>,
    clips: FxHashMap<RectI, Arc<ClipRegion>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the render configuration for a draw state snapshot.
    ///
    /// On miss, every state field is translated into a backend request (the
    /// active image going through [`ResourceCache::resolve_texture`]) and the
    /// result is cached. On hit the existing instance is returned unchanged.
    pub fn resolve_config(
        &mut self,
        backend: &mut dyn RenderBackend,
        state: &DrawState,
    ) -> Arc<RenderConfig> {
        if let Some(config) = self.configs.get(state) {
            tracing::trace!(id = config.id(), "config cache hit");
            return config.clone();
        }
        let texture = state
            .image
            .as_ref()
            .map(|image| self.resolve_texture(backend, image, state.wrap_mode));
        let config = backend.create_config(ConfigDescriptor::from_state(state, texture));
        tracing::trace!(id = config.id(), "config cache miss, created");
        self.configs.insert(state.clone(), config.clone());
        config
    }

    /// Resolve the texture for an image/wrap pair, creating it on first miss
    pub fn resolve_texture(
        &mut self,
        backend: &mut dyn RenderBackend,
        image: &Arc<Image>,
        wrap: WrapMode,
    ) -> Arc<TextureResource> {
        let key = TextureKey {
            image: image.clone(),
            wrap,
        };
        if let Some(texture) = self.textures.get(&key) {
            return texture.clone();
        }
        let texture = backend.create_texture(image, wrap);
        tracing::trace!(
            id = texture.id(),
            width = image.width(),
            height = image.height(),
            "texture cache miss, created"
        );
        self.textures.insert(key, texture.clone());
        texture
    }

    /// Resolve the clip region for a rectangle, creating it on first miss
    pub fn resolve_clip(&mut self, backend: &mut dyn RenderBackend, rect: RectI) -> Arc<ClipRegion> {
        if let Some(clip) = self.clips.get(&rect) {
            return clip.clone();
        }
        let clip = backend.create_clip(rect);
        tracing::trace!(id = clip.id(), ?rect, "clip cache miss, created");
        self.clips.insert(rect, clip.clone());
        clip
    }

    /// Discard all three maps
    pub fn clear(&mut self) {
        tracing::debug!(
            configs = self.configs.len(),
            textures = self.textures.len(),
            clips = self.clips.len(),
            "releasing cached resources"
        );
        self.configs.clear();
        self.textures.clear();
        self.clips.clear();
    }

    pub fn config_count(&self) -> usize {
        self.configs.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}
