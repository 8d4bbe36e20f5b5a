use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_encoder_factory::config::{self, FactoryConfig};
use video_encoder_factory::profiling::TracingProfiler;
use video_encoder_factory::video::encoder::{
    BackendKind, CodecInfo, EncodedImage, EncodedImageCallback, EncoderPreference,
    EncoderSettings, SdpVideoFormat, StatusCode, VideoCodecSettings, VideoEncoderFactory,
};
use video_encoder_factory::video::{Resolution, VideoFrame};

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

/// encoder-factory command line arguments
#[derive(Parser, Debug)]
#[command(name = "encoder-factory")]
#[command(version, about = "Inspect the video encoder factory for this platform", long_about = None)]
struct CliArgs {
    /// Configuration file (JSON). Defaults are used if it does not exist
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Never build the native backend (overrides config)
    #[arg(long)]
    software_only: bool,

    /// Report the embedding runtime bridge as ready (overrides config)
    #[arg(long)]
    runtime_ready: bool,

    /// Do not wrap encoders with the profiling decorator (overrides config)
    #[arg(long)]
    no_profiling: bool,

    /// Encode this many frames with every supported format
    #[arg(short = 'n', long, value_name = "FRAMES", default_value_t = 0)]
    smoke_frames: u32,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, verbose, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for verbose, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One row of the format report
#[derive(Debug, Serialize)]
struct FormatReport {
    format: SdpVideoFormat,
    backend: String,
    info: CodecInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    smoke: Option<SmokeReport>,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    init: i32,
    frames_ok: u32,
    frames_failed: u32,
    bytes: u64,
}

/// Counts encoded output
#[derive(Clone, Default)]
struct ByteCounter(Arc<AtomicU64>);

impl EncodedImageCallback for ByteCounter {
    fn on_encoded_image(&mut self, image: EncodedImage) {
        self.0.fetch_add(image.len() as u64, Ordering::Relaxed);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(args.log_level, args.verbose);

    tracing::info!("Starting encoder-factory v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => config::load_config(path).await?,
        None => FactoryConfig::default(),
    };

    // Apply CLI argument overrides to config (only if explicitly specified)
    if args.software_only {
        config.encoder.preference = EncoderPreference::Software;
    }
    if args.runtime_ready {
        config.platform.runtime_bridge_ready = true;
    }
    if args.no_profiling {
        config.profiling.enabled = false;
    }

    let profiler = Arc::new(TracingProfiler::new());
    let factory = VideoEncoderFactory::builder()
        .config(&config)
        .profiler(profiler.clone())
        .build();

    tracing::info!(
        "Factory ready: backends [{}], profiling {}",
        factory.registry().backend_names().join(", "),
        if factory.is_profiling() { "on" } else { "off" }
    );

    let mut reports = Vec::new();
    for format in factory.supported_formats() {
        let backend = factory
            .backend_for(&format)
            .unwrap_or(BackendKind::Software);
        let info = factory.query_video_encoder(&format)?;
        let smoke = if args.smoke_frames > 0 {
            Some(smoke_encode(&factory, &format, args.smoke_frames)?)
        } else {
            None
        };
        reports.push(FormatReport {
            format,
            backend: backend.to_string(),
            info,
            smoke,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&reports);
        if args.smoke_frames > 0 && factory.is_profiling() {
            for stats in profiler.marker_stats() {
                println!(
                    "marker {}: {} samples, avg {:?}, min {:?}, max {:?}",
                    stats.name,
                    stats.count,
                    stats.avg(),
                    stats.min,
                    stats.max
                );
            }
        }
    }

    Ok(())
}

/// Create, initialize and drive one encoder with black frames
fn smoke_encode(
    factory: &VideoEncoderFactory,
    format: &SdpVideoFormat,
    frames: u32,
) -> anyhow::Result<SmokeReport> {
    let mut encoder = factory.create_video_encoder(format)?;
    let counter = ByteCounter::default();
    encoder.register_encode_complete_callback(Box::new(counter.clone()));

    let resolution = Resolution::VGA;
    let settings = VideoCodecSettings::new(format.codec_type(), resolution);
    let init = encoder.init_encode(&settings, &EncoderSettings::default());

    let mut report = SmokeReport {
        init: init.code(),
        frames_ok: 0,
        frames_failed: 0,
        bytes: 0,
    };
    if init.is_err() {
        tracing::warn!("{}: init_encode failed with {}", format, init);
        return Ok(report);
    }

    // 90 kHz RTP clock at 30 fps
    for i in 0..frames {
        let frame = VideoFrame::black(resolution, i.wrapping_mul(3000));
        let status = encoder.encode(&frame, None);
        if status.is_ok() {
            report.frames_ok += 1;
        } else {
            report.frames_failed += 1;
            tracing::debug!("{}: encode failed with {}", format, status);
        }
    }

    if encoder.release() != StatusCode::OK {
        tracing::warn!("{}: release failed", format);
    }
    report.bytes = counter.0.load(Ordering::Relaxed);
    Ok(report)
}

fn print_reports(reports: &[FormatReport]) {
    println!("{:<4} {:<64} {:<9} {:<4}", "#", "FORMAT", "BACKEND", "HW");
    for (index, report) in reports.iter().enumerate() {
        println!(
            "{:<4} {:<64} {:<9} {:<4}",
            index,
            report.format.to_string(),
            report.backend,
            if report.info.is_hardware_accelerated {
                "yes"
            } else {
                "no"
            }
        );
        if let Some(smoke) = &report.smoke {
            println!(
                "     init={} frames ok={} failed={} bytes={}",
                smoke.init, smoke.frames_ok, smoke.frames_failed, smoke.bytes
            );
        }
    }
}

fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Verbose,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "video_encoder_factory=error,encoder_factory=error",
        LogLevel::Warn => "video_encoder_factory=warn,encoder_factory=warn",
        LogLevel::Info => "video_encoder_factory=info,encoder_factory=info",
        LogLevel::Verbose => "video_encoder_factory=debug,encoder_factory=info",
        LogLevel::Debug => "video_encoder_factory=debug,encoder_factory=debug",
        LogLevel::Trace => "video_encoder_factory=trace,encoder_factory=debug",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}
