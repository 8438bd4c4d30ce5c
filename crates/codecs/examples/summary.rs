//! Prints the capability summary and a sample negotiation for a small
//! software-only provider set.
//!
//! Run with `cargo run --example summary`; set `RUST_LOG=debug` to watch the
//! registry populate.

use std::sync::Arc;

use remoteframe_codecs::{
    CodecRegistry, CodecSpec, CscModule, DecoderModule, EncoderModule, LoadedModule, ModuleKind,
    ModuleProvider, ProviderSet, Result, StaticSpec,
};

struct SoftwareEncoder;

impl EncoderModule for SoftwareEncoder {
    fn codec_type(&self) -> &str {
        "x264"
    }

    fn encodings(&self) -> Vec<String> {
        vec!["h264".to_string()]
    }

    fn input_colorspaces(&self, _encoding: &str) -> Vec<String> {
        vec!["YUV420P".to_string(), "YUV444P".to_string()]
    }

    fn spec(&self, _encoding: &str, _input_colorspace: &str) -> Result<Arc<dyn CodecSpec>> {
        Ok(Arc::new(StaticSpec::new("x264").with_quality(80).with_speed(40)))
    }
}

struct SoftwareScaler;

impl CscModule for SoftwareScaler {
    fn codec_type(&self) -> &str {
        "swscale"
    }

    fn input_colorspaces(&self) -> Vec<String> {
        vec!["YUV420P".to_string(), "YUV444P".to_string()]
    }

    fn output_colorspaces(&self, _input_colorspace: &str) -> Vec<String> {
        vec!["RGB".to_string(), "BGRX".to_string()]
    }

    fn spec(&self, _input_colorspace: &str, _output_colorspace: &str) -> Result<Arc<dyn CodecSpec>> {
        Ok(Arc::new(StaticSpec::new("swscale").with_speed(90).with_setup_cost(20)))
    }
}

struct SoftwareDecoder;

impl DecoderModule for SoftwareDecoder {
    fn codec_type(&self) -> &str {
        "avcodec"
    }

    fn encodings(&self) -> Vec<String> {
        vec!["h264".to_string()]
    }

    fn input_colorspaces(&self, _encoding: &str) -> Vec<String> {
        vec!["YUV420P".to_string(), "YUV444P".to_string()]
    }

    fn output_colorspace(&self, _encoding: &str, input_colorspace: &str) -> Option<String> {
        // this software decoder outputs whatever layout it was fed
        Some(input_colorspace.to_string())
    }
}

struct StaticProvider {
    name: &'static str,
    kind: ModuleKind,
    build: fn() -> LoadedModule,
}

impl ModuleProvider for StaticProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn probe(&self) -> bool {
        true
    }

    fn load(&self) -> Result<LoadedModule> {
        Ok((self.build)())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut providers = ProviderSet::new();
    providers.register(Arc::new(StaticProvider {
        name: "x264",
        kind: ModuleKind::Encoder,
        build: || LoadedModule::Encoder(Arc::new(SoftwareEncoder)),
    }));
    providers.register(Arc::new(StaticProvider {
        name: "swscale",
        kind: ModuleKind::Csc,
        build: || LoadedModule::Csc(Arc::new(SoftwareScaler)),
    }));
    providers.register(Arc::new(StaticProvider {
        name: "avcodec",
        kind: ModuleKind::Decoder,
        build: || LoadedModule::Decoder(Arc::new(SoftwareDecoder)),
    }));

    let registry = CodecRegistry::new(Arc::new(providers));
    registry
        .select_modules(&["all"], &["all"], &["all"])
        .expect("module selection before init");
    registry.init();

    let summary = registry.summary();
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("summary serializes")
    );

    // what can we send to a peer that only renders RGB?
    let modes = registry.resolve_by_rgb(&["RGB"]);
    println!("encodings for an RGB-only peer: {modes:?}");

    registry.cleanup();
}
