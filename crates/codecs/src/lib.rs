//! RemoteFrame Codecs - video capability registry and negotiation
//!
//! RemoteFrame pipelines are assembled from independently loadable encoder,
//! decoder and colorspace-conversion (CSC) modules; which of them are usable
//! on a given machine is only known at runtime. This crate discovers the
//! usable modules, indexes every (format in -> format out) transition they
//! declare, and answers, for a remote peer's declared pixel formats, which
//! encodings the local side can produce and in which colorspace.
//!
//! # Architecture
//!
//! - [`modules`] - the module contracts: capability specs, the
//!   encoder/CSC/decoder handle traits, the provider (probe/load) registry
//!   and the catalog of known modules
//! - [`registry`] - the capability tables and their lifecycle
//!   (select/init/cleanup/fork) plus the serializable summary
//! - [`negotiation`] - read-only queries resolving a peer capability set
//!   against the registry
//!
//! The crate tracks which modules exist and what transitions they declare;
//! it performs no encoding, decoding or conversion itself, and owns no
//! buffers or bitstreams.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use remoteframe_codecs::{CodecRegistry, ProviderSet};
//!
//! // the composition root registers one provider per known module here
//! let providers = Arc::new(ProviderSet::new());
//!
//! let registry = CodecRegistry::new(providers);
//! registry
//!     .select_modules(&["all"], &["all"], &["all"])
//!     .expect("selection before init");
//! registry.init();
//! assert!(registry.encodings().is_empty()); // no providers registered
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod modules;
pub mod negotiation;
pub mod registry;

pub use error::{Error, Result};
pub use modules::catalog::{ModuleCatalog, PREFERRED_DECODER_ORDER, PREFERRED_ENCODER_ORDER};
pub use modules::provider::{ModuleProvider, ProviderSet};
pub use modules::{
    CodecSpec, CscModule, DecoderEntry, DecoderModule, EncoderModule, LoadedModule, ModuleKind,
    StaticSpec,
};
pub use registry::summary::{ModuleStatus, RegistrySummary};
pub use registry::{parse_selection, CodecRegistry, SpecMap};
