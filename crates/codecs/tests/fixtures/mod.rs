//! Shared mock module providers for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use remoteframe_codecs::{
    CodecRegistry, CodecSpec, CscModule, DecoderModule, EncoderModule, Error, LoadedModule,
    ModuleKind, ModuleProvider, ProviderSet, Result, StaticSpec,
};

// ============================================================================
// Counters
// ============================================================================

/// Observable side effects of one mock provider and its module.
#[derive(Clone)]
pub struct Counters {
    pub loads: Arc<AtomicUsize>,
    pub teardowns: Arc<AtomicUsize>,
}

impl Counters {
    fn new() -> Self {
        Self {
            loads: Arc::new(AtomicUsize::new(0)),
            teardowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock Modules
// ============================================================================

pub struct MockEncoder {
    pub codec_type: String,
    /// (encoding, input colorspace) pairs in declaration order.
    pub pairs: Vec<(String, String)>,
    pub teardowns: Arc<AtomicUsize>,
    pub fail_teardown: bool,
}

impl EncoderModule for MockEncoder {
    fn codec_type(&self) -> &str {
        &self.codec_type
    }

    fn encodings(&self) -> Vec<String> {
        let mut encodings = Vec::new();
        for (encoding, _) in &self.pairs {
            if !encodings.contains(encoding) {
                encodings.push(encoding.clone());
            }
        }
        encodings
    }

    fn input_colorspaces(&self, encoding: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(e, _)| e == encoding)
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn spec(&self, _encoding: &str, _input_colorspace: &str) -> Result<Arc<dyn CodecSpec>> {
        Ok(Arc::new(StaticSpec::new(self.codec_type.clone())))
    }

    fn teardown(&self) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_teardown {
            Err(Error::Teardown(format!("{} exploded", self.codec_type)))
        } else {
            Ok(())
        }
    }
}

pub struct MockCsc {
    pub codec_type: String,
    /// (input colorspace, output colorspace) pairs in declaration order.
    pub pairs: Vec<(String, String)>,
    pub teardowns: Arc<AtomicUsize>,
}

impl CscModule for MockCsc {
    fn codec_type(&self) -> &str {
        &self.codec_type
    }

    fn input_colorspaces(&self) -> Vec<String> {
        let mut inputs = Vec::new();
        for (input, _) in &self.pairs {
            if !inputs.contains(input) {
                inputs.push(input.clone());
            }
        }
        inputs
    }

    fn output_colorspaces(&self, input_colorspace: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(i, _)| i == input_colorspace)
            .map(|(_, o)| o.clone())
            .collect()
    }

    fn spec(&self, _input_colorspace: &str, _output_colorspace: &str) -> Result<Arc<dyn CodecSpec>> {
        Ok(Arc::new(StaticSpec::new(self.codec_type.clone())))
    }

    fn teardown(&self) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockDecoder {
    pub codec_type: String,
    /// (encoding, input colorspace, actual output colorspace) triples.
    pub mappings: Vec<(String, String, String)>,
    pub constructible: bool,
    pub teardowns: Arc<AtomicUsize>,
}

impl DecoderModule for MockDecoder {
    fn codec_type(&self) -> &str {
        &self.codec_type
    }

    fn encodings(&self) -> Vec<String> {
        let mut encodings = Vec::new();
        for (encoding, _, _) in &self.mappings {
            if !encodings.contains(encoding) {
                encodings.push(encoding.clone());
            }
        }
        encodings
    }

    fn input_colorspaces(&self, encoding: &str) -> Vec<String> {
        self.mappings
            .iter()
            .filter(|(e, _, _)| e == encoding)
            .map(|(_, c, _)| c.clone())
            .collect()
    }

    fn output_colorspace(&self, encoding: &str, input_colorspace: &str) -> Option<String> {
        self.mappings
            .iter()
            .find(|(e, c, _)| e == encoding && c == input_colorspace)
            .map(|(_, _, output)| output.clone())
    }

    fn can_decode(&self) -> bool {
        self.constructible
    }

    fn teardown(&self) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Mock Provider
// ============================================================================

pub struct MockProvider {
    pub name: &'static str,
    pub kind: ModuleKind,
    pub present: Arc<AtomicBool>,
    pub loads: Arc<AtomicUsize>,
    pub factory: Box<dyn Fn() -> Result<LoadedModule> + Send + Sync>,
}

impl ModuleProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn probe(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn load(&self) -> Result<LoadedModule> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        (self.factory)()
    }
}

fn string_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Encoder provider declaring the given (encoding, input colorspace) pairs.
pub fn encoder_provider(
    name: &'static str,
    pairs: &[(&str, &str)],
) -> (Arc<MockProvider>, Counters) {
    let counters = Counters::new();
    let pairs = string_pairs(pairs);
    let teardowns = counters.teardowns.clone();
    let provider = MockProvider {
        name,
        kind: ModuleKind::Encoder,
        present: Arc::new(AtomicBool::new(true)),
        loads: counters.loads.clone(),
        factory: Box::new(move || {
            Ok(LoadedModule::Encoder(Arc::new(MockEncoder {
                codec_type: name.to_string(),
                pairs: pairs.clone(),
                teardowns: teardowns.clone(),
                fail_teardown: false,
            })))
        }),
    };
    (Arc::new(provider), counters)
}

/// Encoder provider whose module fails on teardown.
pub fn encoder_provider_failing_teardown(
    name: &'static str,
    pairs: &[(&str, &str)],
) -> (Arc<MockProvider>, Counters) {
    let counters = Counters::new();
    let pairs = string_pairs(pairs);
    let teardowns = counters.teardowns.clone();
    let provider = MockProvider {
        name,
        kind: ModuleKind::Encoder,
        present: Arc::new(AtomicBool::new(true)),
        loads: counters.loads.clone(),
        factory: Box::new(move || {
            Ok(LoadedModule::Encoder(Arc::new(MockEncoder {
                codec_type: name.to_string(),
                pairs: pairs.clone(),
                teardowns: teardowns.clone(),
                fail_teardown: true,
            })))
        }),
    };
    (Arc::new(provider), counters)
}

/// CSC provider declaring the given (input, output) colorspace pairs.
pub fn csc_provider(name: &'static str, pairs: &[(&str, &str)]) -> (Arc<MockProvider>, Counters) {
    let counters = Counters::new();
    let pairs = string_pairs(pairs);
    let teardowns = counters.teardowns.clone();
    let provider = MockProvider {
        name,
        kind: ModuleKind::Csc,
        present: Arc::new(AtomicBool::new(true)),
        loads: counters.loads.clone(),
        factory: Box::new(move || {
            Ok(LoadedModule::Csc(Arc::new(MockCsc {
                codec_type: name.to_string(),
                pairs: pairs.clone(),
                teardowns: teardowns.clone(),
            })))
        }),
    };
    (Arc::new(provider), counters)
}

/// Decoder provider declaring (encoding, input, actual output) triples.
pub fn decoder_provider(
    name: &'static str,
    mappings: &[(&str, &str, &str)],
) -> (Arc<MockProvider>, Counters) {
    decoder_provider_with(name, mappings, true)
}

/// Decoder provider without a decoder constructor.
pub fn unconstructible_decoder_provider(
    name: &'static str,
    mappings: &[(&str, &str, &str)],
) -> (Arc<MockProvider>, Counters) {
    decoder_provider_with(name, mappings, false)
}

fn decoder_provider_with(
    name: &'static str,
    mappings: &[(&str, &str, &str)],
    constructible: bool,
) -> (Arc<MockProvider>, Counters) {
    let counters = Counters::new();
    let mappings: Vec<(String, String, String)> = mappings
        .iter()
        .map(|(e, c, o)| (e.to_string(), c.to_string(), o.to_string()))
        .collect();
    let teardowns = counters.teardowns.clone();
    let provider = MockProvider {
        name,
        kind: ModuleKind::Decoder,
        present: Arc::new(AtomicBool::new(true)),
        loads: counters.loads.clone(),
        factory: Box::new(move || {
            Ok(LoadedModule::Decoder(Arc::new(MockDecoder {
                codec_type: name.to_string(),
                mappings: mappings.clone(),
                constructible,
                teardowns: teardowns.clone(),
            })))
        }),
    };
    (Arc::new(provider), counters)
}

/// Provider whose `load()` always fails.
pub fn broken_provider(name: &'static str, kind: ModuleKind) -> (Arc<MockProvider>, Counters) {
    let counters = Counters::new();
    let provider = MockProvider {
        name,
        kind,
        present: Arc::new(AtomicBool::new(true)),
        loads: counters.loads.clone(),
        factory: Box::new(move || Err(Error::ModuleLoad(format!("{name} backing library gone")))),
    };
    (Arc::new(provider), counters)
}

/// Registry over the given providers.
pub fn registry_with(providers: Vec<Arc<MockProvider>>) -> CodecRegistry {
    let mut set = ProviderSet::new();
    for provider in providers {
        set.register(provider);
    }
    CodecRegistry::new(Arc::new(set))
}
