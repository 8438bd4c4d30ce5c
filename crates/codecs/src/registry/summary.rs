//! Serializable summary of a registry's capabilities and module status
//!
//! The summary is the introspection surface the session layer puts on the
//! wire: which module produces which format transition, and what happened to
//! every known module (loaded, deselected, or missing from the machine).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CodecRegistry;
use crate::modules::{CodecSpec, ModuleKind};

/// Availability status of a catalog module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    /// Enabled and populated into the registry tables.
    Active,
    /// Installed on this machine but not enabled by the module selection.
    Disabled,
    /// Not installed.
    NotFound,
}

/// Structured capability report produced by [`CodecRegistry::summary`].
///
/// Pair keys are formatted `"<input>_to_<output>"`; values list the producing
/// module type names in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySummary {
    /// Encoder types per (input colorspace -> encoding) pair.
    pub encoding: BTreeMap<String, Vec<String>>,
    /// CSC types per (input colorspace -> output colorspace) pair.
    pub csc: BTreeMap<String, Vec<String>>,
    /// Decoder names per (encoding -> input colorspace) pair.
    pub decoding: BTreeMap<String, Vec<String>>,
    /// Status of every known encoder module.
    pub video_encoders: BTreeMap<String, ModuleStatus>,
    /// Status of every known CSC module.
    pub csc_modules: BTreeMap<String, ModuleStatus>,
    /// Status of every known decoder module.
    pub video_decoders: BTreeMap<String, ModuleStatus>,
}

impl CodecRegistry {
    /// Build the capability report.
    ///
    /// Module status is computed against a fresh re-probe of the providers,
    /// so a backend that disappeared after startup shows up as not-found even
    /// though the catalog itself is fixed.
    pub fn summary(&self) -> RegistrySummary {
        let state = self.read_state();

        let mut encoding: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (enc, by_colorspace) in state.encoder_specs.iter() {
            for (in_csc, specs) in by_colorspace {
                let entry = encoding.entry(format!("{in_csc}_to_{enc}")).or_default();
                entry.extend(specs.iter().map(|spec| spec.codec_type().to_string()));
            }
        }

        let mut csc: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (in_csc, by_output) in state.csc_specs.iter() {
            for (out_csc, specs) in by_output {
                let entry = csc.entry(format!("{in_csc}_to_{out_csc}")).or_default();
                entry.extend(specs.iter().map(|spec| spec.codec_type().to_string()));
            }
        }

        let mut decoding: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (enc, by_colorspace) in state.decoder_specs.iter() {
            for (in_csc, entries) in by_colorspace {
                let entry = decoding.entry(format!("{enc}_to_{in_csc}")).or_default();
                entry.extend(entries.iter().map(|e| e.name.clone()));
            }
        }

        let catalog = self.providers().catalog();
        let video_encoders = module_statuses(
            catalog.encoders(),
            &self.providers().installed(ModuleKind::Encoder),
            &state.video_encoders,
        );
        let csc_modules = module_statuses(
            catalog.csc_modules(),
            &self.providers().installed(ModuleKind::Csc),
            &state.csc_modules,
        );
        let video_decoders = module_statuses(
            catalog.decoders(),
            &self.providers().installed(ModuleKind::Decoder),
            &state.video_decoders,
        );

        RegistrySummary {
            encoding,
            csc,
            decoding,
            video_encoders,
            csc_modules,
            video_decoders,
        }
    }
}

fn module_statuses(
    known: &[String],
    installed: &[String],
    active: &[String],
) -> BTreeMap<String, ModuleStatus> {
    known
        .iter()
        .map(|name| {
            let status = if active.contains(name) {
                ModuleStatus::Active
            } else if installed.contains(name) {
                ModuleStatus::Disabled
            } else {
                ModuleStatus::NotFound
            };
            (name.clone(), status)
        })
        .collect()
}
