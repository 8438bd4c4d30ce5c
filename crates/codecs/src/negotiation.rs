//! Peer capability negotiation over an initialized registry
//!
//! Both queries are read-only and deterministic for a fixed registry. They
//! answer the server-side question: given the pixel formats a remote peer
//! says it can consume, which encodings can we produce, and in which input
//! colorspace should each one be produced so the peer's decoder output lands
//! in a format it supports.

use std::collections::HashMap;

use tracing::debug;

use crate::modules::DecoderModule;
use crate::registry::CodecRegistry;

impl CodecRegistry {
    /// Resolve the encodings usable against a peer that consumes
    /// `peer_colorspaces`.
    ///
    /// For every encoding in the decoder table, each decoder entry is asked
    /// for the colorspace it would actually output for that exact
    /// (encoding, input colorspace) pair; the input colorspace is viable when
    /// that output is in the peer set. Input colorspaces are visited in
    /// sorted order and recorded first-seen, deduplicated.
    ///
    /// Only encodings with at least one viable colorspace appear in the
    /// result.
    pub fn resolve_by_colorspace(&self, peer_colorspaces: &[&str]) -> HashMap<String, Vec<String>> {
        let state = self.read_state();
        let mut modes: HashMap<String, Vec<String>> = HashMap::new();
        for (encoding, by_colorspace) in state.decoder_specs.iter() {
            let mut colorspaces: Vec<&String> = by_colorspace.keys().collect();
            colorspaces.sort();
            for colorspace in colorspaces {
                for entry in &by_colorspace[colorspace] {
                    let Some(output) = entry.module.output_colorspace(encoding, colorspace) else {
                        continue;
                    };
                    debug!(
                        "decoder {} for {} with {} mode outputs {}",
                        entry.name, encoding, colorspace, output
                    );
                    if peer_colorspaces.iter().any(|c| *c == output) {
                        let viable = modes.entry(encoding.clone()).or_default();
                        if !viable.contains(colorspace) {
                            viable.push(colorspace.clone());
                        }
                    }
                }
            }
        }
        debug!("resolve_by_colorspace({:?}) = {:?}", peer_colorspaces, modes);
        modes
    }

    /// Resolve the encodings usable against a peer that only declares the
    /// RGB-family formats it consumes.
    ///
    /// The peer set is extended with every CSC input colorspace that is one
    /// conversion away from one of the RGB targets, deduplicated and sorted,
    /// then resolved by colorspace. This surfaces encodings whose decoder
    /// output needs an intermediate conversion step before display.
    pub fn resolve_by_rgb(&self, peer_rgb_formats: &[&str]) -> HashMap<String, Vec<String>> {
        let mut supported: Vec<String> = peer_rgb_formats.iter().map(|s| s.to_string()).collect();
        {
            let state = self.read_state();
            for (input, by_output) in state.csc_specs.iter() {
                let reachable = by_output.iter().any(|(output, specs)| {
                    !specs.is_empty() && peer_rgb_formats.iter().any(|c| c == output)
                });
                if reachable {
                    supported.push(input.clone());
                }
            }
        }
        supported.sort();
        supported.dedup();
        debug!(
            "resolve_by_rgb({:?}): extended colorspaces {:?}",
            peer_rgb_formats, supported
        );
        let supported: Vec<&str> = supported.iter().map(String::as_str).collect();
        self.resolve_by_colorspace(&supported)
    }
}
