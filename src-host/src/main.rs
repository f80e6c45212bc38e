//! measure host: attaches the measure plugin and serves method calls from stdin.
//!
//! Each stdin line is a call envelope such as
//! `{"method":"getPhysicalPixelsPerInch"}`; each reply is one JSON line on stdout.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use measure_core::{
    codec, DensityQueryService, MeasureConfig, MeasurePlugin, Messenger, MethodResult,
    PlatformRunner, PlatformRunnerHandle, PluginRegistry,
};
use measure_platform::{set_dpi_aware, SystemDisplayMetrics};
use tracing::{debug, info, warn};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "measure_host=info,measure_core=info,measure_platform=info".into()),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn load_config() -> MeasureConfig {
    match MeasureConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            MeasureConfig::default()
        }
    }
}

/// Answer one reply line per non-blank request line until EOF.
///
/// Lines are passed through as raw bytes, so malformed input (including
/// invalid UTF-8) gets an error reply instead of ending the loop.
fn serve(
    mut reader: impl BufRead,
    mut writer: impl Write,
    runner: &PlatformRunnerHandle,
    channel: &str,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).context("failed to read request")? == 0 {
            return Ok(());
        }

        let line = trim_line(&buf);
        if line.is_empty() {
            continue;
        }

        let reply = runner.send(channel, line.to_vec()).context("platform runner stopped")?;
        let result = codec::decode_result(&reply).unwrap_or_else(|e| {
            warn!("Undecodable reply: {}", e);
            MethodResult::error("bad-reply", e.to_string())
        });
        debug!(?result, "Reply");

        serde_json::to_writer(&mut writer, &result)?;
        writeln!(writer)?;
        writer.flush()?;
    }
}

fn trim_line(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn main() -> anyhow::Result<()> {
    init_logging();
    set_dpi_aware();

    let config = load_config();
    let messenger = Messenger::new();

    let service = DensityQueryService::new(SystemDisplayMetrics::new()).with_fallback(config.fallback_ppi);
    let plugin = MeasurePlugin::with_service(service).on_channel(config.channel.clone());
    info!(channel = plugin.channel_name(), "Registering measure plugin");

    let mut registry = PluginRegistry::new(messenger.clone());
    registry.add(Box::new(plugin));
    registry.start_all();

    let runner = PlatformRunner::spawn(messenger);
    info!("measure host ready");

    serve(io::stdin().lock(), io::stdout().lock(), &runner, &config.channel)?;

    runner.shutdown();
    registry.stop_all();
    info!("measure host stopped");
    Ok(())
}
