//! Measurement CLI: replay depth frames and taps through a session.

use std::{fs, path::Path, path::PathBuf};

use clap::{Parser, Subcommand};
use measure_core::{f16_to_real, DepthMap, PinholeIntrinsics, Pt2, Pt3, Real};
use measure_pipeline::{MeasureConfig, MeasureSession, MeasurementReport, TapResult};
use serde::{Deserialize, Serialize};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "measure")]
#[command(about = "Measure distances between tapped points in LiDAR depth frames")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a frame and a tap sequence, print measurements as JSON.
    Run {
        /// Path to JSON file containing the frame and taps.
        #[arg(long)]
        input: PathBuf,

        /// Optional path to JSON MeasureConfig. Defaults are used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Back-project one pixel with a given depth.
    Backproject {
        #[arg(long)]
        u: Real,
        #[arg(long)]
        v: Real,
        /// Depth along the optical axis, in meters.
        #[arg(long)]
        depth: Real,
        /// Optional path to JSON MeasureConfig for the intrinsics.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Decode a binary16 bit pattern (hex, e.g. 0x3C00).
    DecodeHalf {
        #[arg(long)]
        bits: String,
    },
}

/// Depth frame as stored in input files. Exactly one of `depth` (meters)
/// or `depth_f16` (raw bit patterns) must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameInput {
    width: usize,
    height: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depth: Option<Vec<Real>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depth_f16: Option<Vec<u16>>,
}

impl FrameInput {
    fn into_depth_map(self) -> CliResult<DepthMap> {
        let map = match (self.depth, self.depth_f16) {
            (Some(meters), None) => DepthMap::from_meters(self.width, self.height, &meters)?,
            (None, Some(bits)) => DepthMap::new(self.width, self.height, bits)?,
            _ => return Err("frame needs exactly one of `depth` or `depth_f16`".into()),
        };
        Ok(map)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TapInput {
    /// Tap in view coordinates, resolved through the depth frame.
    View { x: Real, y: Real },
    /// Point from a platform hit-test.
    World { x: Real, y: Real, z: Real },
    /// Discard the points tapped so far.
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeasureInput {
    #[serde(default)]
    frame: Option<FrameInput>,
    taps: Vec<TapInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SkippedTap {
    index: usize,
    reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeasureOutput {
    measurements: Vec<MeasurementReport>,
    skipped: Vec<SkippedTap>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn load_config(path: Option<&Path>) -> CliResult<MeasureConfig> {
    Ok(match path {
        Some(path) => MeasureConfig::load(path)?,
        None => MeasureConfig::default(),
    })
}

fn replay(input: MeasureInput, config: MeasureConfig) -> CliResult<MeasureOutput> {
    let mut session = MeasureSession::new(config)?;
    if let Some(frame) = input.frame {
        session.set_frame(frame.into_depth_map()?);
    }

    let mut output = MeasureOutput {
        measurements: Vec::new(),
        skipped: Vec::new(),
    };
    for (index, tap) in input.taps.into_iter().enumerate() {
        let result = match tap {
            TapInput::View { x, y } => session.tap_view(Pt2::new(x, y)),
            TapInput::World { x, y, z } => Ok(session.tap_world(Pt3::new(x, y, z))),
            TapInput::Reset => {
                session.reset();
                continue;
            }
        };
        match result {
            Ok(TapResult::Measured(report)) => output.measurements.push(*report),
            Ok(TapResult::Pending(_)) => {}
            Err(err) => output.skipped.push(SkippedTap {
                index,
                reason: err.to_string(),
            }),
        }
    }
    Ok(output)
}

fn run_from_files(input_path: &Path, config_path: Option<&Path>) -> CliResult<String> {
    let input: MeasureInput = load_json_file(input_path)?;
    let config = load_config(config_path)?;
    let output = replay(input, config)?;
    Ok(serde_json::to_string_pretty(&output)?)
}

fn run_backproject(u: Real, v: Real, depth: Real, config: Option<&Path>) -> CliResult<()> {
    let intrinsics: PinholeIntrinsics = load_config(config)?.intrinsics;
    let p = intrinsics.backproject(u, v, depth)?;
    println!("{}", serde_json::to_string(&p)?);
    Ok(())
}

fn parse_bits(text: &str) -> CliResult<u16> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    Ok(u16::from_str_radix(digits, 16)?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { input, config } => {
            let json = run_from_files(&input, config.as_deref())?;
            println!("{}", json);
        }
        Commands::Backproject {
            u,
            v,
            depth,
            config,
        } => run_backproject(u, v, depth, config.as_deref())?,
        Commands::DecodeHalf { bits } => {
            let bits = parse_bits(&bits)?;
            println!("{:#06x} -> {}", bits, f16_to_real(bits));
        }
    }
    Ok(())
}
