//! Module providers: the probe/load contract and the process' provider set
//!
//! Native module backends are discovered through provider factories rather
//! than reflection: the composition root registers one [`ModuleProvider`] per
//! known module, and the [`ProviderSet`] answers availability (`probe`,
//! memoized) and performs the actual load. The registry never touches a
//! backing library directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use super::catalog::ModuleCatalog;
use super::{LoadedModule, ModuleKind};
use crate::error::Result;

/// Factory through which one known module is probed and loaded.
pub trait ModuleProvider: Send + Sync {
    /// Catalog identifier of the module, e.g. "vpx".
    fn name(&self) -> &str;

    /// Category of the module this provider loads.
    fn kind(&self) -> ModuleKind;

    /// Cheap availability check, e.g. "is the backing library installed".
    ///
    /// Must be side-effect free and must not panic; any failure to probe is
    /// reported as unavailable.
    fn probe(&self) -> bool;

    /// Load the module and return its handle.
    fn load(&self) -> Result<LoadedModule>;

    /// Whether the module drives a hardware engine.
    fn hardware(&self) -> bool {
        false
    }
}

/// Registry of module providers with memoized probe results.
///
/// Registration order is preserved and becomes the discovery order of the
/// [`ModuleCatalog`]. Registering a second provider under an existing
/// (kind, name) replaces the first.
pub struct ProviderSet {
    providers: Vec<Arc<dyn ModuleProvider>>,
    probe_cache: Mutex<HashMap<(ModuleKind, String), bool>>,
    catalog: OnceLock<ModuleCatalog>,
}

impl ProviderSet {
    /// Create an empty provider set.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            probe_cache: Mutex::new(HashMap::new()),
            catalog: OnceLock::new(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, provider: Arc<dyn ModuleProvider>) {
        let slot = self
            .providers
            .iter_mut()
            .find(|p| p.kind() == provider.kind() && p.name() == provider.name());
        match slot {
            Some(existing) => {
                debug!(
                    "replacing {} provider {}",
                    provider.kind(),
                    provider.name()
                );
                *existing = provider;
            }
            None => self.providers.push(provider),
        }
    }

    /// Look up the provider registered for (kind, name).
    pub fn provider(&self, kind: ModuleKind, name: &str) -> Option<&Arc<dyn ModuleProvider>> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind && p.name() == name)
    }

    /// Names of every registered provider of `kind`, in registration order.
    pub fn names(&self, kind: ModuleKind) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.kind() == kind)
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Probe availability of (kind, name), memoized for the provider set's
    /// lifetime.
    pub fn probe(&self, kind: ModuleKind, name: &str) -> bool {
        let key = (kind, name.to_string());
        if let Some(available) = self.probe_cache.lock().unwrap().get(&key) {
            return *available;
        }
        // probe without holding the cache lock; probes are side-effect free,
        // so a racing duplicate probe is harmless
        let available = self
            .provider(kind, name)
            .map(|p| p.probe())
            .unwrap_or(false);
        debug!(
            "{} {} is {}",
            kind,
            name,
            if available { "available" } else { "not available" }
        );
        self.probe_cache.lock().unwrap().insert(key, available);
        available
    }

    /// Freshly re-probe every provider of `kind`, bypassing the memoized
    /// results.
    ///
    /// This is the "installed defaults" check the registry summary compares
    /// module status against.
    pub fn installed(&self, kind: ModuleKind) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.kind() == kind && p.probe())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// The catalog of known modules for this provider set, computed once.
    pub fn catalog(&self) -> &ModuleCatalog {
        self.catalog.get_or_init(|| ModuleCatalog::probe(self))
    }
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self::new()
    }
}
