//! Capability registry: format-keyed spec tables and their lifecycle
//!
//! A [`CodecRegistry`] indexes every format transition the enabled modules
//! declare, in three tables:
//!
//! - encoder specs: encoding -> input colorspace -> specs
//! - CSC specs: input colorspace -> output colorspace -> specs
//! - decoder entries: encoding -> input colorspace -> entries
//!
//! The registry starts empty. `select_modules` narrows the catalog,
//! `init` loads every enabled module exactly once (also under concurrent
//! callers), `cleanup` tears everything down again, and `fork` snapshots an
//! initialized registry so a derived session can prune its own copy.

pub mod summary;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::modules::provider::ProviderSet;
use crate::modules::{
    CodecSpec, CscModule, DecoderEntry, DecoderModule, EncoderModule, LoadedModule, ModuleKind,
};

/// Inner mapping of a capability table: second format key to the ordered
/// list of entries registered for that pair.
pub type SpecMap<T> = HashMap<String, Vec<T>>;

// =============================================================================
// Capability Table
// =============================================================================

/// Two-level capability index: outer format key -> inner format key ->
/// ordered entries.
///
/// Inner lists preserve insertion order, which encodes discovery order and is
/// the only tie-break the registry itself applies. A module is expected to
/// register at most once per exact format pair.
///
/// `Clone` is the fork operation: new outer and inner containers, shared
/// entry values (entries are `Arc`-backed).
#[derive(Clone)]
pub(crate) struct CapabilityTable<T> {
    entries: HashMap<String, SpecMap<T>>,
}

impl<T: Clone> CapabilityTable<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn add(&mut self, outer: &str, inner: &str, value: T) {
        self.entries
            .entry(outer.to_string())
            .or_default()
            .entry(inner.to_string())
            .or_default()
            .push(value);
    }

    pub(crate) fn outer_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn get(&self, outer: &str) -> SpecMap<T> {
        self.entries.get(outer).cloned().unwrap_or_default()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &SpecMap<T>)> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Registry
// =============================================================================

pub(crate) struct RegistryState {
    pub(crate) encoder_specs: CapabilityTable<Arc<dyn CodecSpec>>,
    pub(crate) csc_specs: CapabilityTable<Arc<dyn CodecSpec>>,
    pub(crate) decoder_specs: CapabilityTable<DecoderEntry>,
    pub(crate) video_encoders: Vec<String>,
    pub(crate) csc_modules: Vec<String>,
    pub(crate) video_decoders: Vec<String>,
    cleanup_modules: Vec<LoadedModule>,
    initialized: bool,
}

impl RegistryState {
    fn empty() -> Self {
        Self {
            encoder_specs: CapabilityTable::new(),
            csc_specs: CapabilityTable::new(),
            decoder_specs: CapabilityTable::new(),
            video_encoders: Vec::new(),
            csc_modules: Vec::new(),
            video_decoders: Vec::new(),
            cleanup_modules: Vec::new(),
            initialized: false,
        }
    }
}

/// Registry of discovered encoder, CSC and decoder capabilities.
///
/// One lock guards the whole mutable state: lifecycle transitions take it for
/// writing (held for the duration of the transition, including the module
/// loader calls), all accessors and negotiation queries take it for reading.
/// Readers may run concurrently with each other; a registry must still be
/// fully initialized before it is shared for reading.
pub struct CodecRegistry {
    providers: Arc<ProviderSet>,
    state: RwLock<RegistryState>,
}

impl CodecRegistry {
    /// Create an uninitialized registry over `providers`.
    ///
    /// No modules are enabled until [`select_modules`](Self::select_modules)
    /// is called; initializing an empty selection yields empty tables.
    pub fn new(providers: Arc<ProviderSet>) -> Self {
        Self {
            providers,
            state: RwLock::new(RegistryState::empty()),
        }
    }

    /// The provider set this registry loads modules through.
    pub fn providers(&self) -> &Arc<ProviderSet> {
        &self.providers
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap()
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap()
    }

    // =========================================================================
    // Module Selection
    // =========================================================================

    /// Narrow the enabled module sets before initialization.
    ///
    /// Each list is filtered against the catalog: `-name` entries exclude,
    /// the literal `all` expands to the full catalog for that table, unknown
    /// names are reported and dropped. Exclusions apply after wildcard
    /// expansion, so `["all", "-x264"]` means every known encoder except
    /// x264.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] once initialization has begun.
    pub fn select_modules<S: AsRef<str>>(
        &self,
        video_encoders: &[S],
        csc_modules: &[S],
        video_decoders: &[S],
    ) -> Result<()> {
        let mut state = self.write_state();
        if state.initialized {
            return Err(Error::IllegalState(
                "too late to select modules, the registry is already initialized".into(),
            ));
        }
        let catalog = self.providers.catalog();
        state.video_encoders =
            filter_selection("video encoders", video_encoders, catalog.encoders());
        state.csc_modules = filter_selection("csc modules", csc_modules, catalog.csc_modules());
        state.video_decoders =
            filter_selection("video decoders", video_decoders, catalog.decoders());
        debug!(
            "select_modules: video encoders={:?} csc={:?} video decoders={:?}",
            state.video_encoders, state.csc_modules, state.video_decoders
        );
        Ok(())
    }

    /// Enabled encoder module names.
    pub fn enabled_encoders(&self) -> Vec<String> {
        self.read_state().video_encoders.clone()
    }

    /// Enabled CSC module names.
    pub fn enabled_csc_modules(&self) -> Vec<String> {
        self.read_state().csc_modules.clone()
    }

    /// Enabled decoder module names.
    pub fn enabled_decoders(&self) -> Vec<String> {
        self.read_state().video_decoders.clone()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Load every enabled module and index its declared format transitions.
    ///
    /// Idempotent: a second call, or a concurrent call from another thread,
    /// results in exactly one population pass. Load and introspection
    /// failures are isolated per module, logged and skipped, so one broken
    /// backend cannot abort discovery of the others.
    pub fn init(&self) {
        let mut state = self.write_state();
        // check again with the lock held (in case of a race):
        if state.initialized {
            return;
        }
        self.init_encoder_options(&mut state);
        self.init_csc_options(&mut state);
        self.init_decoder_options(&mut state);
        state.initialized = true;
        info!(
            "capability registry initialized: {} encoding{}, {} csc input{}, {} decoding{}",
            state.encoder_specs.len(),
            plural(state.encoder_specs.len()),
            state.csc_specs.len(),
            plural(state.csc_specs.len()),
            state.decoder_specs.len(),
            plural(state.decoder_specs.len()),
        );
    }

    /// Whether initialization has completed.
    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    /// Tear down every loaded module and reset to uninitialized. Idempotent.
    ///
    /// A failing teardown is logged and does not prevent the remaining
    /// modules from being torn down.
    pub fn cleanup(&self) {
        let mut state = self.write_state();
        // check again with the lock held (in case of a race):
        if !state.initialized {
            return;
        }
        let modules = std::mem::take(&mut state.cleanup_modules);
        debug!("cleanup: {} loaded module{}", modules.len(), plural(modules.len()));
        for module in modules {
            if let Err(e) = module.teardown() {
                error!("error tearing down {}: {}", module.codec_type(), e);
            }
        }
        state.encoder_specs.clear();
        state.csc_specs.clear();
        state.decoder_specs.clear();
        state.video_encoders.clear();
        state.csc_modules.clear();
        state.video_decoders.clear();
        state.initialized = false;
    }

    /// Snapshot this registry into a new, already-initialized one.
    ///
    /// Initializes this registry first if needed. The new registry's tables
    /// are structurally independent (fresh maps and lists) but share the same
    /// spec values, so a derived session can add or drop entries without
    /// perturbing this registry. Loaded modules stay owned by this registry;
    /// the fork's `cleanup` tears nothing down.
    pub fn fork(&self) -> CodecRegistry {
        if !self.is_initialized() {
            self.init();
        }
        let state = self.read_state();
        CodecRegistry {
            providers: self.providers.clone(),
            state: RwLock::new(RegistryState {
                encoder_specs: state.encoder_specs.clone(),
                csc_specs: state.csc_specs.clone(),
                decoder_specs: state.decoder_specs.clone(),
                video_encoders: state.video_encoders.clone(),
                csc_modules: state.csc_modules.clone(),
                video_decoders: state.video_decoders.clone(),
                cleanup_modules: Vec::new(),
                initialized: true,
            }),
        }
    }

    // =========================================================================
    // Population
    // =========================================================================

    fn load_module(&self, kind: ModuleKind, name: &str) -> Result<LoadedModule> {
        let provider = self.providers.provider(kind, name).ok_or_else(|| {
            Error::ModuleLoad(format!("no provider registered for {} {}", kind.label(), name))
        })?;
        provider.load()
    }

    fn init_encoder_options(&self, state: &mut RegistryState) {
        debug!("will try video encoders: {:?}", state.video_encoders);
        for name in state.video_encoders.clone() {
            let module = match self.load_module(ModuleKind::Encoder, &name) {
                Ok(LoadedModule::Encoder(module)) => module,
                Ok(other) => {
                    warn!("cannot add {} encoder: provider returned a {}", name, other.kind());
                    continue;
                }
                Err(e) => {
                    warn!("cannot add {} encoder: {}", name, e);
                    continue;
                }
            };
            state.cleanup_modules.push(LoadedModule::Encoder(module.clone()));
            if let Err(e) = index_encoder(state, module.as_ref()) {
                warn!("cannot index {} encoder: {}", name, e);
            }
        }
        debug!(
            "found {} video encoding{}: {:?}",
            state.encoder_specs.len(),
            plural(state.encoder_specs.len()),
            state.encoder_specs.outer_keys()
        );
    }

    fn init_csc_options(&self, state: &mut RegistryState) {
        debug!("will try csc modules: {:?}", state.csc_modules);
        for name in state.csc_modules.clone() {
            let module = match self.load_module(ModuleKind::Csc, &name) {
                Ok(LoadedModule::Csc(module)) => module,
                Ok(other) => {
                    warn!("cannot add {} csc: provider returned a {}", name, other.kind());
                    continue;
                }
                Err(e) => {
                    warn!("cannot add {} csc: {}", name, e);
                    continue;
                }
            };
            state.cleanup_modules.push(LoadedModule::Csc(module.clone()));
            if let Err(e) = index_csc(state, module.as_ref()) {
                warn!("cannot index {} csc: {}", name, e);
            }
        }
        debug!(
            "found {} csc input{}: {:?}",
            state.csc_specs.len(),
            plural(state.csc_specs.len()),
            state.csc_specs.outer_keys()
        );
    }

    fn init_decoder_options(&self, state: &mut RegistryState) {
        debug!("will try video decoders: {:?}", state.video_decoders);
        for name in state.video_decoders.clone() {
            let module = match self.load_module(ModuleKind::Decoder, &name) {
                Ok(LoadedModule::Decoder(module)) => module,
                Ok(other) => {
                    warn!("cannot add {} decoder: provider returned a {}", name, other.kind());
                    continue;
                }
                Err(e) => {
                    warn!("cannot add {} decoder: {}", name, e);
                    continue;
                }
            };
            state.cleanup_modules.push(LoadedModule::Decoder(module.clone()));
            index_decoder(state, &module);
        }
        debug!(
            "found {} video decoding{}: {:?}",
            state.decoder_specs.len(),
            plural(state.decoder_specs.len()),
            state.decoder_specs.outer_keys()
        );
    }

    // =========================================================================
    // Table Access
    // =========================================================================

    /// Register an encoder spec for (encoding, input colorspace).
    ///
    /// Appends, never overwrites or deduplicates; registering a module twice
    /// for the same exact pair is the caller's mistake.
    pub fn add_encoder_spec(&self, encoding: &str, input_colorspace: &str, spec: Arc<dyn CodecSpec>) {
        self.write_state()
            .encoder_specs
            .add(encoding, input_colorspace, spec);
    }

    /// Register a CSC spec for (input colorspace, output colorspace).
    pub fn add_csc_spec(
        &self,
        input_colorspace: &str,
        output_colorspace: &str,
        spec: Arc<dyn CodecSpec>,
    ) {
        self.write_state()
            .csc_specs
            .add(input_colorspace, output_colorspace, spec);
    }

    /// Register a decoder entry for (encoding, input colorspace).
    pub fn add_decoder_entry(&self, encoding: &str, input_colorspace: &str, entry: DecoderEntry) {
        self.write_state()
            .decoder_specs
            .add(encoding, input_colorspace, entry);
    }

    /// Encodings with at least one encoder spec. Unordered snapshot.
    pub fn encodings(&self) -> Vec<String> {
        self.read_state().encoder_specs.outer_keys()
    }

    /// Encodings with at least one decoder entry. Unordered snapshot.
    pub fn decodings(&self) -> Vec<String> {
        self.read_state().decoder_specs.outer_keys()
    }

    /// Input colorspaces with at least one CSC spec. Unordered snapshot.
    pub fn csc_inputs(&self) -> Vec<String> {
        self.read_state().csc_specs.outer_keys()
    }

    /// Encoder specs for `encoding`, keyed by input colorspace.
    ///
    /// Empty when the encoding is unknown; never fails.
    pub fn encoder_specs(&self, encoding: &str) -> SpecMap<Arc<dyn CodecSpec>> {
        self.read_state().encoder_specs.get(encoding)
    }

    /// CSC specs from `input_colorspace`, keyed by output colorspace.
    pub fn csc_specs(&self, input_colorspace: &str) -> SpecMap<Arc<dyn CodecSpec>> {
        self.read_state().csc_specs.get(input_colorspace)
    }

    /// Decoder entries for `encoding`, keyed by input colorspace.
    pub fn decoder_specs(&self, encoding: &str) -> SpecMap<DecoderEntry> {
        self.read_state().decoder_specs.get(encoding)
    }
}

// =============================================================================
// Population Helpers
// =============================================================================

fn index_encoder(state: &mut RegistryState, module: &dyn EncoderModule) -> Result<()> {
    let codec_type = module.codec_type().to_string();
    let encodings = module.encodings();
    debug!("{} encodings: {:?}", codec_type, encodings);
    for encoding in &encodings {
        let colorspaces = module.input_colorspaces(encoding);
        debug!(
            "{} input colorspaces for {}: {:?}",
            codec_type, encoding, colorspaces
        );
        for colorspace in &colorspaces {
            let spec = module.spec(encoding, colorspace)?;
            state.encoder_specs.add(encoding, colorspace, spec);
        }
    }
    Ok(())
}

fn index_csc(state: &mut RegistryState, module: &dyn CscModule) -> Result<()> {
    let codec_type = module.codec_type().to_string();
    for input in module.input_colorspaces() {
        let outputs = module.output_colorspaces(&input);
        debug!(
            "{} output colorspaces for {}: {:?}",
            codec_type, input, outputs
        );
        for output in &outputs {
            let spec = module.spec(&input, output)?;
            state.csc_specs.add(&input, output, spec);
        }
    }
    Ok(())
}

fn index_decoder(state: &mut RegistryState, module: &Arc<dyn DecoderModule>) {
    let codec_type = module.codec_type().to_string();
    let encodings = module.encodings();
    debug!("{} encodings: {:?}", codec_type, encodings);
    for encoding in &encodings {
        for colorspace in &module.input_colorspaces(encoding) {
            let output = module.output_colorspace(encoding, colorspace);
            debug!(
                "{} output colorspace for {}/{}: {:?}",
                codec_type, encoding, colorspace, output
            );
            if !module.can_decode() {
                warn!(
                    "skipping decoder {} for {}/{}: no decoder constructor",
                    codec_type, encoding, colorspace
                );
                continue;
            }
            state.decoder_specs.add(
                encoding,
                colorspace,
                DecoderEntry::new(codec_type.clone(), module.clone()),
            );
        }
    }
}

// =============================================================================
// Selection Filter
// =============================================================================

/// Apply one selection list against the known catalog for one table.
///
/// `-name` entries exclude, `all` expands to the full catalog, unknown names
/// warn and drop, empty tokens are ignored. Exclusions apply after wildcard
/// expansion.
fn filter_selection<S: AsRef<str>>(label: &str, requested: &[S], known: &[String]) -> Vec<String> {
    let mut excluded: Vec<&str> = Vec::new();
    let mut included: Vec<&str> = Vec::new();
    for entry in requested {
        let entry = entry.as_ref();
        if entry.is_empty() {
            continue;
        }
        match entry.strip_prefix('-') {
            Some(name) => excluded.push(name),
            None => included.push(entry),
        }
    }
    let included: Vec<String> = if included.iter().any(|name| *name == "all") {
        known.to_vec()
    } else {
        let unknown: Vec<&str> = excluded
            .iter()
            .chain(included.iter())
            .copied()
            .filter(|name| !known.iter().any(|k| k == name))
            .collect();
        if !unknown.is_empty() {
            warn!("ignoring unknown {}: {}", label, unknown.join(", "));
        }
        included
            .into_iter()
            .filter(|name| known.iter().any(|k| k == name))
            .map(str::to_string)
            .collect()
    };
    included
        .into_iter()
        .filter(|name| !excluded.iter().any(|e| e == name))
        .collect()
}

/// Split a comma-separated selection string (e.g. `"all,-x264"`) into a
/// selection list accepted by [`CodecRegistry::select_modules`].
pub fn parse_selection(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
