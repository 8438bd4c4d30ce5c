//! Catalog of known modules, computed once per provider set
//!
//! The catalog answers "which modules exist on this machine" per category,
//! by probing every registered provider exactly once. It is immutable after
//! computation; availability changes after process start are only visible
//! through the registry summary's fresh re-probe.

use tracing::debug;

use super::provider::ProviderSet;
use super::ModuleKind;

/// Encoder module names in preference order, most preferred first.
///
/// Names absent from a machine's provider set are simply never listed; names
/// not mentioned here sort after the preferred ones in registration order.
pub const PREFERRED_ENCODER_ORDER: &[&str] = &["nvenc", "x264", "vpx", "x265"];

/// Decoder module names in preference order, most preferred first.
pub const PREFERRED_DECODER_ORDER: &[&str] = &["avcodec", "vpx"];

/// The known-module lists for one provider set.
///
/// Encoder and decoder lists are ordered preferred-first (see
/// [`PREFERRED_ENCODER_ORDER`] / [`PREFERRED_DECODER_ORDER`]), then by
/// registration order; CSC modules keep registration order.
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    encoders: Vec<String>,
    csc_modules: Vec<String>,
    decoders: Vec<String>,
    hardware_encoders: Vec<String>,
}

impl ModuleCatalog {
    /// Probe every registered provider and build the catalog.
    pub(crate) fn probe(providers: &ProviderSet) -> Self {
        let mut encoders = available(providers, ModuleKind::Encoder);
        sort_preferred(&mut encoders, PREFERRED_ENCODER_ORDER);
        let csc_modules = available(providers, ModuleKind::Csc);
        let mut decoders = available(providers, ModuleKind::Decoder);
        sort_preferred(&mut decoders, PREFERRED_DECODER_ORDER);
        let hardware_encoders = encoders
            .iter()
            .filter(|name| {
                providers
                    .provider(ModuleKind::Encoder, name.as_str())
                    .is_some_and(|p| p.hardware())
            })
            .cloned()
            .collect();
        let catalog = Self {
            encoders,
            csc_modules,
            decoders,
            hardware_encoders,
        };
        debug!(
            "module catalog: encoders={:?} csc={:?} decoders={:?} hardware={:?}",
            catalog.encoders, catalog.csc_modules, catalog.decoders, catalog.hardware_encoders
        );
        catalog
    }

    /// All known encoder modules.
    pub fn encoders(&self) -> &[String] {
        &self.encoders
    }

    /// All known colorspace-conversion modules.
    pub fn csc_modules(&self) -> &[String] {
        &self.csc_modules
    }

    /// All known decoder modules.
    pub fn decoders(&self) -> &[String] {
        &self.decoders
    }

    /// The subset of known encoders backed by a hardware engine.
    pub fn hardware_encoders(&self) -> &[String] {
        &self.hardware_encoders
    }

    /// The known modules of `kind`.
    pub fn known(&self, kind: ModuleKind) -> &[String] {
        match kind {
            ModuleKind::Encoder => &self.encoders,
            ModuleKind::Csc => &self.csc_modules,
            ModuleKind::Decoder => &self.decoders,
        }
    }
}

fn available(providers: &ProviderSet, kind: ModuleKind) -> Vec<String> {
    providers
        .names(kind)
        .into_iter()
        .filter(|name| providers.probe(kind, name))
        .collect()
}

fn sort_preferred(names: &mut [String], preferred: &[&str]) {
    // stable sort: non-preferred names keep their registration order
    names.sort_by_key(|name| {
        preferred
            .iter()
            .position(|p| p == name)
            .unwrap_or(preferred.len())
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{Error, Result};
    use crate::modules::provider::ModuleProvider;
    use crate::modules::LoadedModule;

    struct FixedProvider {
        name: &'static str,
        kind: ModuleKind,
        available: bool,
        hardware: bool,
    }

    impl ModuleProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> ModuleKind {
            self.kind
        }

        fn probe(&self) -> bool {
            self.available
        }

        fn load(&self) -> Result<LoadedModule> {
            Err(Error::ModuleLoad("not loadable in this test".into()))
        }

        fn hardware(&self) -> bool {
            self.hardware
        }
    }

    fn provider(
        name: &'static str,
        kind: ModuleKind,
        available: bool,
        hardware: bool,
    ) -> Arc<dyn ModuleProvider> {
        Arc::new(FixedProvider {
            name,
            kind,
            available,
            hardware,
        })
    }

    #[test]
    fn catalog_filters_unavailable_modules() {
        let mut set = ProviderSet::new();
        set.register(provider("x264", ModuleKind::Encoder, true, false));
        set.register(provider("x265", ModuleKind::Encoder, false, false));
        set.register(provider("swscale", ModuleKind::Csc, true, false));

        let catalog = set.catalog();
        assert_eq!(catalog.encoders(), ["x264"]);
        assert_eq!(catalog.csc_modules(), ["swscale"]);
        assert!(catalog.decoders().is_empty());
    }

    #[test]
    fn encoders_are_ordered_preferred_first() {
        let mut set = ProviderSet::new();
        set.register(provider("homegrown", ModuleKind::Encoder, true, false));
        set.register(provider("vpx", ModuleKind::Encoder, true, false));
        set.register(provider("nvenc", ModuleKind::Encoder, true, true));
        set.register(provider("x264", ModuleKind::Encoder, true, false));

        let catalog = set.catalog();
        assert_eq!(catalog.encoders(), ["nvenc", "x264", "vpx", "homegrown"]);
        assert_eq!(catalog.hardware_encoders(), ["nvenc"]);
    }

    #[test]
    fn unknown_names_keep_registration_order() {
        let mut names = vec![
            "zeta".to_string(),
            "vpx".to_string(),
            "alpha".to_string(),
            "x264".to_string(),
        ];
        sort_preferred(&mut names, PREFERRED_ENCODER_ORDER);
        assert_eq!(names, ["x264", "vpx", "zeta", "alpha"]);
    }

    #[test]
    fn known_selects_by_kind() {
        let mut set = ProviderSet::new();
        set.register(provider("avcodec", ModuleKind::Decoder, true, false));

        let catalog = set.catalog();
        assert_eq!(catalog.known(ModuleKind::Decoder), ["avcodec"]);
        assert!(catalog.known(ModuleKind::Encoder).is_empty());
    }
}
