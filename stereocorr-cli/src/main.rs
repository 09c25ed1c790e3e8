use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use stereocorr::io::{load_rgb_f32, save_score_map};
use stereocorr::{
    CornerField, Extrinsics, Intrinsics, Ncc, NccConfig, PinholeCamera, ScoreField,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "stereocorr CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CameraConfig {
    k: [[f64; 3]; 3],
    rt: [[f64; 4]; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            k: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            rt: *Extrinsics::identity().matrix(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NccConfigJson {
    window_size: usize,
    parallel: bool,
}

impl Default for NccConfigJson {
    fn default() -> Self {
        let cfg = NccConfig::default();
        Self {
            window_size: cfg.window_size,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    reference_image: String,
    candidate_image: String,
    output_path: Option<String>,
    score_map_path: Option<String>,
    camera: CameraConfig,
    depth: f64,
    ncc: NccConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_image: String::new(),
            candidate_image: String::new(),
            output_path: None,
            score_map_path: None,
            camera: CameraConfig::default(),
            depth: 1.0,
            ncc: NccConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScoreSummary {
    valid: usize,
    mean: Option<f32>,
    min: Option<f32>,
    max: Option<f32>,
}

impl ScoreSummary {
    /// Summarizes non-zero scores; zero marks pixels without a usable patch.
    fn from_scores(scores: &ScoreField) -> Self {
        let mut valid = 0usize;
        let mut sum = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &s in scores.data().iter().filter(|&&s| s != 0.0) {
            valid += 1;
            sum += f64::from(s);
            min = min.min(s);
            max = max.max(s);
        }
        if valid == 0 {
            return Self {
                valid,
                mean: None,
                min: None,
                max: None,
            };
        }
        Self {
            valid,
            mean: Some((sum / valid as f64) as f32),
            min: Some(min),
            max: Some(max),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    depth: f64,
    corners: [[[f64; 3]; 2]; 2],
    scores: ScoreSummary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereocorr=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.reference_image.is_empty() || config.candidate_image.is_empty() {
        return Err("reference_image and candidate_image must be set in the config".into());
    }

    let camera = PinholeCamera::new(
        Intrinsics::new(config.camera.k)?,
        Extrinsics::new(config.camera.rt)?,
    );
    let ncc = Ncc::new(NccConfig {
        window_size: config.ncc.window_size,
        parallel: config.ncc.parallel,
    })?;

    let reference = load_rgb_f32(&config.reference_image)?;
    let candidate = load_rgb_f32(&config.candidate_image)?;
    tracing::info!(
        width = reference.width(),
        height = reference.height(),
        "loaded images"
    );
    if (reference.width(), reference.height()) != (candidate.width(), candidate.height()) {
        return Err(format!(
            "image sizes differ: {}x{} vs {}x{}",
            reference.width(),
            reference.height(),
            candidate.width(),
            candidate.height()
        )
        .into());
    }

    let corners: CornerField =
        camera.unproject_corners(reference.width(), reference.height(), config.depth)?;
    let features_ref = ncc.preprocess(reference.view())?;
    let features_cand = ncc.preprocess(candidate.view())?;
    let scores = ncc.correlate(&features_ref, &features_cand)?;

    if let Some(path) = &config.score_map_path {
        save_score_map(&scores, path)?;
    }

    let output = Output {
        width: reference.width(),
        height: reference.height(),
        depth: config.depth,
        corners: *corners.as_array(),
        scores: ScoreSummary::from_scores(&scores),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
