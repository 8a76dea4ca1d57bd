//! Font provider seam
//!
//! The canvas stores the active font only as an opaque shared handle; glyph
//! layout and rasterization live elsewhere. Providers are injected at canvas
//! construction, so there is no process-wide font manager singleton.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Family used when no font has been set explicitly
pub const DEFAULT_FONT_FAMILY: &str = "monospace";

/// Point size of the default font
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Identity of a font request
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
    pub smooth: bool,
}

/// Opaque shared font handle
///
/// Draw state compares fonts by handle identity, so a provider must return
/// the same `Arc` for repeated identical requests.
#[derive(Debug)]
pub struct FontHandle {
    spec: FontSpec,
}

impl FontHandle {
    pub fn new(spec: FontSpec) -> Self {
        Self { spec }
    }

    pub fn family(&self) -> &str {
        &self.spec.family
    }

    pub fn size(&self) -> u32 {
        self.spec.size
    }

    pub fn smooth(&self) -> bool {
        self.spec.smooth
    }

    pub fn spec(&self) -> &FontSpec {
        &self.spec
    }
}

/// Source of shared font handles
pub trait FontProvider {
    /// Return the shared handle for `(family, size, smooth)`, creating it on
    /// first request
    fn acquire_font(&mut self, family: &str, size: u32, smooth: bool) -> Arc<FontHandle>;

    /// The handle used by a freshly reset draw state
    fn default_font(&mut self) -> Arc<FontHandle> {
        self.acquire_font(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, false)
    }
}

/// Caching font provider
///
/// Deduplicates handles per spec so identical requests keep identical
/// identity across a whole canvas lifetime.
#[derive(Default)]
pub struct FontLibrary {
    fonts: FxHashMap<FontSpec, Arc<FontHandle>>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl FontProvider for FontLibrary {
    fn acquire_font(&mut self, family: &str, size: u32, smooth: bool) -> Arc<FontHandle> {
        let spec = FontSpec {
            family: family.to_owned(),
            size,
            smooth,
        };
        if let Some(handle) = self.fonts.get(&spec) {
            return handle.clone();
        }
        tracing::debug!(family, size, smooth, "acquiring font");
        let handle = Arc::new(FontHandle::new(spec.clone()));
        self.fonts.insert(spec, handle.clone());
        handle
    }
}
