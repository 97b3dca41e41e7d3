//! Weight-map lookup by path.

use std::collections::HashMap;
use std::sync::Arc;

use rigsmith_core::texture::CpuTexture;

/// Resolves weight-map paths to loaded textures.
///
/// Implemented by the host's asset store; loading and decoding happen there.
pub trait WeightMapSource {
    /// The texture at `path`, or `None` if it cannot be resolved.
    fn weight_map(&self, path: &str) -> Option<Arc<CpuTexture>>;
}

impl WeightMapSource for HashMap<String, Arc<CpuTexture>> {
    fn weight_map(&self, path: &str) -> Option<Arc<CpuTexture>> {
        self.get(path).cloned()
    }
}

/// In-memory weight maps keyed by path.
#[derive(Debug, Clone, Default)]
pub struct WeightMapLibrary {
    maps: HashMap<String, Arc<CpuTexture>>,
}

impl WeightMapLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `texture` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, texture: CpuTexture) -> Arc<CpuTexture> {
        let texture = Arc::new(texture);
        self.maps.insert(path.into(), Arc::clone(&texture));
        texture
    }

    #[must_use]
    pub fn with_map(mut self, path: impl Into<String>, texture: CpuTexture) -> Self {
        self.insert(path, texture);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.maps.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl WeightMapSource for WeightMapLibrary {
    fn weight_map(&self, path: &str) -> Option<Arc<CpuTexture>> {
        self.maps.get(path).cloned()
    }
}
