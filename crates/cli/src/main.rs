use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use livescan_core::camera::domain::camera::{Camera, CameraFacing, StreamConstraints};
use livescan_core::camera::infrastructure::image_sequence_camera::ImageSequenceCamera;
use livescan_core::detection::domain::landmark_engine::{
    EngineFactory, EngineOptions, LandmarkEngine,
};
use livescan_core::detection::infrastructure::replay_landmark_engine::ReplayLandmarkEngine;
use livescan_core::scoring::domain::scoring_client::Verdict;
use livescan_core::scoring::infrastructure::http_scoring_client::HttpScoringClient;
use livescan_core::sensors::domain::motion_sensor::MotionSensor;
use livescan_core::sensors::infrastructure::null_motion_sensor::NullMotionSensor;
use livescan_core::sensors::infrastructure::scripted_motion_sensor::ScriptedMotionSensor;
use livescan_core::session::config::CaptureConfig;
use livescan_core::session::controller::{ControllerEvent, SessionController};

/// Replay a recorded capture through the liveness session pipeline.
#[derive(Parser)]
#[command(name = "livescan")]
struct Cli {
    /// Directory of camera frames (image files, replayed in name order).
    frames: PathBuf,

    /// Recorded landmark detections (JSON array, one entry per frame).
    #[arg(long)]
    detections: PathBuf,

    /// Recorded motion readings (JSON); omit to run without sensors.
    #[arg(long)]
    motion: Option<PathBuf>,

    /// Scoring service base URL; omit to write the payload instead.
    #[arg(long)]
    endpoint: Option<String>,

    /// Extra "Name: value" header sent with the scoring request.
    #[arg(long)]
    header: Option<String>,

    /// Payload destination when no endpoint is set ("-" = stdout).
    #[arg(long, default_value = "-")]
    output: String,

    /// Frames to collect before the session completes.
    #[arg(long, default_value = "80")]
    target_frames: usize,

    /// Fewest frames an acceptable session may contain.
    #[arg(long, default_value = "5")]
    min_frames: usize,

    /// Maximum session duration in milliseconds.
    #[arg(long, default_value = "15000")]
    timeout_ms: u64,

    #[arg(long, default_value = "320")]
    width: u32,

    #[arg(long, default_value = "240")]
    height: u32,

    #[arg(long, default_value = "30")]
    fps: f64,

    /// Camera facing: user or environment.
    #[arg(long, default_value = "user")]
    facing: String,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    detection_confidence: f64,

    /// Tracking confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    tracking_confidence: f64,

    /// Enable landmark refinement in the engine.
    #[arg(long)]
    refine_landmarks: bool,

    /// Skip the still image normally attached to the payload.
    #[arg(long)]
    no_still: bool,

    /// Restart the frame sequence when it runs out.
    #[arg(long)]
    loop_frames: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = build_config(&cli);

    let camera: Box<dyn Camera> = Box::new(ImageSequenceCamera::new(&cli.frames, cli.loop_frames));
    let sensor: Box<dyn MotionSensor> = match &cli.motion {
        Some(path) => Box::new(ScriptedMotionSensor::from_file(
            path,
            Duration::from_millis(20),
        )?),
        None => Box::new(NullMotionSensor),
    };
    let detections = cli.detections.clone();
    let engine_factory: EngineFactory = Box::new(move |_options| {
        ReplayLandmarkEngine::from_file(&detections).map(|e| Box::new(e) as Box<dyn LandmarkEngine>)
    });

    let mut controller = match &cli.endpoint {
        Some(url) => {
            let mut client = HttpScoringClient::new(url);
            if let Some((name, value)) = cli.header.as_deref().and_then(parse_header) {
                client = client.with_bypass_header(&name, &value);
            }
            SessionController::with_scoring(Box::new(client))
        }
        None => SessionController::new(),
    };

    let tick = config.constraints.frame_interval();
    controller.begin(config, engine_factory, camera, sensor)?;
    controller.start(Instant::now())?;

    let event = loop {
        match controller.poll(Instant::now()) {
            Some(ControllerEvent::Progress { collected, target }) => {
                eprint!("\rCapturing frame {collected}/{target}");
            }
            Some(event) => break event,
            None => {}
        }
        thread::sleep(tick);
    };
    eprintln!();

    match event {
        ControllerEvent::Completed(verdict) => {
            print_verdict(&verdict);
            Ok(())
        }
        ControllerEvent::PayloadReady(payload) => {
            let json = payload.to_json()?;
            if cli.output == "-" {
                println!("{json}");
            } else {
                std::fs::write(&cli.output, json)?;
                log::info!("Payload written to {}", cli.output);
            }
            Ok(())
        }
        ControllerEvent::SessionFailed(err) => Err(Box::new(err)),
        ControllerEvent::ScoringFailed(msg) => Err(msg.into()),
        ControllerEvent::Progress { .. } => unreachable!("progress is not terminal"),
    }
}

fn build_config(cli: &Cli) -> CaptureConfig {
    CaptureConfig {
        target_frames: cli.target_frames,
        min_frames: cli.min_frames,
        max_duration: Duration::from_millis(cli.timeout_ms),
        constraints: StreamConstraints {
            width: cli.width,
            height: cli.height,
            frame_rate: cli.fps,
            facing: if cli.facing == "environment" {
                CameraFacing::Environment
            } else {
                CameraFacing::User
            },
        },
        engine: EngineOptions {
            refine_landmarks: cli.refine_landmarks,
            min_detection_confidence: cli.detection_confidence,
            min_tracking_confidence: cli.tracking_confidence,
            ..Default::default()
        },
        capture_still: !cli.no_still,
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if cli.target_frames == 0 {
        return Err("Target frames must be at least 1".into());
    }
    if cli.min_frames == 0 || cli.min_frames > cli.target_frames {
        return Err(format!(
            "Min frames must be between 1 and {}, got {}",
            cli.target_frames, cli.min_frames
        )
        .into());
    }
    if cli.timeout_ms == 0 {
        return Err("Timeout must be nonzero".into());
    }
    if cli.width == 0 || cli.height == 0 {
        return Err("Stream resolution must be nonzero".into());
    }
    if !cli.fps.is_finite() || cli.fps <= 0.0 {
        return Err(format!("FPS must be positive, got {}", cli.fps).into());
    }
    if !(0.0..=1.0).contains(&cli.detection_confidence) {
        return Err(format!(
            "Detection confidence must be between 0.0 and 1.0, got {}",
            cli.detection_confidence
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.tracking_confidence) {
        return Err(format!(
            "Tracking confidence must be between 0.0 and 1.0, got {}",
            cli.tracking_confidence
        )
        .into());
    }
    if cli.facing != "user" && cli.facing != "environment" {
        return Err(format!(
            "Facing must be 'user' or 'environment', got '{}'",
            cli.facing
        )
        .into());
    }
    if let Some(header) = &cli.header {
        if parse_header(header).is_none() {
            return Err(format!("Header must look like 'Name: value', got '{header}'").into());
        }
    }
    Ok(())
}

fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

fn print_verdict(verdict: &Verdict) {
    println!(
        "liveness: {}",
        if verdict.is_real { "REAL" } else { "SPOOF" }
    );
    println!("score:    {:.4}", verdict.score);
    if let Some(details) = &verdict.details {
        if let Some(v) = details.motion_consistency {
            println!("motion consistency: {v:.4}");
        }
        if let Some(v) = details.visual_liveness {
            println!("visual liveness:    {v:.4}");
        }
        if let Some(n) = details.frames_processed {
            println!("frames processed:   {n}");
        }
    }
}
