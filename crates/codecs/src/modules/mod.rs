//! Module contracts: capability specs and the encoder/CSC/decoder handles
//!
//! A video module is an independently loadable backend (a specific encoder,
//! decoder or colorspace converter). The registry never drives a module's
//! codec entry points; it only records what format transitions the module
//! declares. The traits here are the introspection surface a loaded module
//! exposes to the registry:
//!
//! - [`CodecSpec`] - an opaque capability descriptor for one format transition
//! - [`EncoderModule`] / [`CscModule`] / [`DecoderModule`] - the per-category
//!   handle contracts
//! - [`LoadedModule`] - the handle a provider returns from `load()`
//!
//! Decoder handles are special: the output colorspace of a decode is only
//! known once the (encoding, input colorspace) pair is fixed, so the registry
//! keeps the handle itself (see [`DecoderEntry`]) and asks at negotiation
//! time.

pub mod catalog;
pub mod provider;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Module Categories
// =============================================================================

/// Category of a video module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Produces compressed encodings from raw frames
    Encoder,
    /// Converts frames between colorspaces
    Csc,
    /// Decodes compressed encodings into raw frames
    Decoder,
}

impl ModuleKind {
    /// Human-readable label used in log messages ("video encoder", ...).
    pub fn label(&self) -> &'static str {
        match self {
            ModuleKind::Encoder => "video encoder",
            ModuleKind::Csc => "csc module",
            ModuleKind::Decoder => "video decoder",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Capability Specs
// =============================================================================

/// Capability descriptor a module returns for one format transition.
///
/// The registry stores, enumerates and returns specs; it never interprets
/// them beyond the producing module's type tag. The cost/quality metadata is
/// for the session layer, which picks between competing specs when it
/// constructs an actual coder.
pub trait CodecSpec: Send + Sync {
    /// Type name of the producing module (e.g. "x264").
    fn codec_type(&self) -> &str;

    /// Output quality of this transition on a 0-100 scale.
    fn quality(&self) -> u8;

    /// Processing speed of this transition on a 0-100 scale.
    fn speed(&self) -> u8;

    /// Relative cost of instantiating a coder for this transition, 0-100.
    fn setup_cost(&self) -> u8;
}

/// Plain-value [`CodecSpec`] for modules whose metadata is fixed per pair.
#[derive(Debug, Clone)]
pub struct StaticSpec {
    codec_type: String,
    quality: u8,
    speed: u8,
    setup_cost: u8,
}

impl StaticSpec {
    /// Create a spec with neutral (50/50/50) metadata.
    pub fn new(codec_type: impl Into<String>) -> Self {
        Self {
            codec_type: codec_type.into(),
            quality: 50,
            speed: 50,
            setup_cost: 50,
        }
    }

    /// Set the quality score.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the speed score.
    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    /// Set the setup cost score.
    pub fn with_setup_cost(mut self, setup_cost: u8) -> Self {
        self.setup_cost = setup_cost;
        self
    }
}

impl CodecSpec for StaticSpec {
    fn codec_type(&self) -> &str {
        &self.codec_type
    }

    fn quality(&self) -> u8 {
        self.quality
    }

    fn speed(&self) -> u8 {
        self.speed
    }

    fn setup_cost(&self) -> u8 {
        self.setup_cost
    }
}

// =============================================================================
// Module Handle Traits
// =============================================================================

/// Loaded encoder module handle.
pub trait EncoderModule: Send + Sync {
    /// Type name of this module (e.g. "x264").
    fn codec_type(&self) -> &str;

    /// Encodings this module can produce, in declaration order.
    fn encodings(&self) -> Vec<String>;

    /// Input colorspaces accepted when producing `encoding`.
    fn input_colorspaces(&self, encoding: &str) -> Vec<String>;

    /// Capability spec for one declared (encoding, input colorspace) pair.
    fn spec(&self, encoding: &str, input_colorspace: &str) -> Result<Arc<dyn CodecSpec>>;

    /// Release the module's native resources.
    fn teardown(&self) -> Result<()> {
        Ok(())
    }
}

/// Loaded colorspace-conversion module handle.
pub trait CscModule: Send + Sync {
    /// Type name of this module (e.g. "swscale").
    fn codec_type(&self) -> &str;

    /// Input colorspaces this module can convert from.
    fn input_colorspaces(&self) -> Vec<String>;

    /// Output colorspaces reachable from `input_colorspace`.
    fn output_colorspaces(&self, input_colorspace: &str) -> Vec<String>;

    /// Capability spec for one declared (input, output) colorspace pair.
    fn spec(&self, input_colorspace: &str, output_colorspace: &str) -> Result<Arc<dyn CodecSpec>>;

    /// Release the module's native resources.
    fn teardown(&self) -> Result<()> {
        Ok(())
    }
}

/// Loaded decoder module handle.
pub trait DecoderModule: Send + Sync {
    /// Type name of this module (e.g. "avcodec").
    fn codec_type(&self) -> &str;

    /// Encodings this module can decode, in declaration order.
    fn encodings(&self) -> Vec<String>;

    /// Input colorspaces accepted when decoding `encoding`.
    fn input_colorspaces(&self, encoding: &str) -> Vec<String>;

    /// The colorspace this module actually outputs when decoding `encoding`
    /// from `input_colorspace`.
    ///
    /// Some decoders only commit to an output format once the input pair is
    /// fixed, so this may consult negotiated state rather than a static
    /// declaration. `None` means the pair cannot be decoded.
    fn output_colorspace(&self, encoding: &str, input_colorspace: &str) -> Option<String>;

    /// Whether this module can construct decoder instances at all.
    ///
    /// Pairs declared by a module without a decoder constructor are skipped
    /// during registry population.
    fn can_decode(&self) -> bool {
        true
    }

    /// Release the module's native resources.
    fn teardown(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Loaded Handles
// =============================================================================

/// A module handle as returned by a provider's `load()`.
#[derive(Clone)]
pub enum LoadedModule {
    /// An encoder backend
    Encoder(Arc<dyn EncoderModule>),
    /// A colorspace-conversion backend
    Csc(Arc<dyn CscModule>),
    /// A decoder backend
    Decoder(Arc<dyn DecoderModule>),
}

impl LoadedModule {
    /// Category of the loaded module.
    pub fn kind(&self) -> ModuleKind {
        match self {
            LoadedModule::Encoder(_) => ModuleKind::Encoder,
            LoadedModule::Csc(_) => ModuleKind::Csc,
            LoadedModule::Decoder(_) => ModuleKind::Decoder,
        }
    }

    /// Type name of the loaded module.
    pub fn codec_type(&self) -> &str {
        match self {
            LoadedModule::Encoder(m) => m.codec_type(),
            LoadedModule::Csc(m) => m.codec_type(),
            LoadedModule::Decoder(m) => m.codec_type(),
        }
    }

    /// Release the module's native resources.
    pub fn teardown(&self) -> Result<()> {
        match self {
            LoadedModule::Encoder(m) => m.teardown(),
            LoadedModule::Csc(m) => m.teardown(),
            LoadedModule::Decoder(m) => m.teardown(),
        }
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadedModule::{:?}({})", self.kind(), self.codec_type())
    }
}

/// Decoder capability entry stored in the registry's decoder table.
///
/// Unlike encoder and CSC entries, a decoder entry retains the module handle
/// so the actual output colorspace can be resolved per (encoding, input
/// colorspace) at negotiation time.
#[derive(Clone)]
pub struct DecoderEntry {
    /// Type name of the decoding module.
    pub name: String,
    /// The loaded decoder handle.
    pub module: Arc<dyn DecoderModule>,
}

impl DecoderEntry {
    /// Create an entry for a loaded decoder handle.
    pub fn new(name: impl Into<String>, module: Arc<dyn DecoderModule>) -> Self {
        Self {
            name: name.into(),
            module,
        }
    }
}

impl fmt::Debug for DecoderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
