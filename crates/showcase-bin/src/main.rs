// showcase: command-line front end for the car showcase sound engine.
//
// Wires the kira audio backend, the scripted sensor and the on-disk
// configuration together.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use showcase_audio::KiraAudio;
use showcase_core::hotspot::{self, LayoutVariant};
use showcase_core::{AppConfig, Catalog, Language, Preferences, StartScreen};
use showcase_input::{ScriptedSensor, SensorTrace, UnavailableSensor};
use showcase_sound::TiltSoundService;

#[derive(Parser, Debug)]
#[command(name = "showcase", about = "Tilt-driven car showcase sounds")]
struct Args {
    /// Path to the app config JSON file.
    #[arg(long, env = "SHOWCASE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the preferences JSON file.
    #[arg(long, env = "SHOWCASE_PREFS")]
    prefs: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cars and their sound assets.
    Catalog,

    /// Run a tilt session driven by a recorded sensor trace.
    Play {
        /// Car id (e.g. left-paddle) or sound asset name.
        target: String,

        /// JSON array of orientation samples.
        #[arg(long)]
        trace: PathBuf,

        /// How long to keep the session running.
        #[arg(long, default_value_t = 10)]
        seconds: u64,

        /// Replay the trace from the top when it runs out.
        #[arg(long)]
        loop_trace: bool,
    },

    /// Play a car's sound at full volume for the preview window.
    Preview {
        /// Car id or sound asset name.
        target: String,
    },

    /// Which hotspot a touch at (x, y) lands on.
    Hit {
        x: f32,
        y: f32,

        #[arg(long)]
        width: f32,

        #[arg(long)]
        height: f32,

        /// Use the tablet layout regardless of config.
        #[arg(long)]
        tablet: bool,
    },

    /// Show or store the selected language.
    Language {
        /// Language code: en, de or es.
        code: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args.config.unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let prefs_path = args.prefs.unwrap_or_else(Preferences::default_path);
    let catalog = Catalog::builtin();

    match args.command {
        Command::Catalog => print_catalog(&catalog),
        Command::Play {
            target,
            trace,
            seconds,
            loop_trace,
        } => {
            play(
                &config,
                &catalog,
                &target,
                &trace,
                Duration::from_secs(seconds),
                loop_trace,
            )
            .await?
        }
        Command::Preview { target } => preview(&config, &catalog, &target).await?,
        Command::Hit {
            x,
            y,
            width,
            height,
            tablet,
        } => {
            let variant = if tablet {
                LayoutVariant::Tablet
            } else {
                config.layout()
            };
            hit(&catalog, variant, x, y, width, height);
        }
        Command::Language { code } => language(&prefs_path, code.as_deref())?,
    }
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    for record in catalog.iter() {
        let sounds: Vec<&str> = record.sounds.iter().map(|s| s.as_str()).collect();
        println!("{:<12} {:<16} {}", record.id, record.text_key, sounds.join(", "));
    }
}

async fn play(
    config: &AppConfig,
    catalog: &Catalog,
    target: &str,
    trace_path: &Path,
    duration: Duration,
    loop_trace: bool,
) -> Result<()> {
    let trace = SensorTrace::load_from(trace_path)?;
    info!("Loaded {} samples from {}", trace.len(), trace_path.display());

    let audio = KiraAudio::new(&config.asset_dir)?;
    let sensor = ScriptedSensor::new(trace).looping(loop_trace);
    let service = TiltSoundService::new(audio, sensor, &config.sound)?;

    let asset = catalog.asset_for(target);
    service.start(asset.clone());

    let mut volume = service.volume();
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    let mut updates = 0usize;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = volume.changed() => {
                if changed.is_err() {
                    break;
                }
                updates += 1;
                info!("volume {:.3}", *volume.borrow_and_update());
            }
        }
    }

    if !service.is_playing() {
        warn!("{asset} is not playing; see earlier errors");
    }
    service.stop();
    info!("Session over after {updates} volume updates");
    Ok(())
}

async fn preview(config: &AppConfig, catalog: &Catalog, target: &str) -> Result<()> {
    let audio = KiraAudio::new(&config.asset_dir)?;
    let service = TiltSoundService::new(
        audio,
        UnavailableSensor::new("previews do not read the sensor"),
        &config.sound,
    )?;
    let asset = catalog.asset_for(target);
    let completed = service.play_full_volume(asset.clone()).await;
    println!(
        "{asset}: {}",
        if completed { "completed" } else { "interrupted" }
    );
    Ok(())
}

fn hit(catalog: &Catalog, variant: LayoutVariant, x: f32, y: f32, width: f32, height: f32) {
    let hotspots = hotspot::resolve(variant, width, height);
    match hotspot::hit_test(&hotspots, x, y).and_then(|id| catalog.get(id)) {
        Some(record) => println!("{} ({})", record.id, record.text_key),
        None => println!("no hotspot"),
    }
}

fn language(prefs_path: &Path, code: Option<&str>) -> Result<()> {
    let mut prefs = Preferences::load_from(prefs_path)?;
    match code {
        Some(code) => {
            let lang: Language = code.parse()?;
            prefs.set_language(lang);
            prefs.save_to(prefs_path)?;
            println!("{lang} ({})", lang.translation_key());
        }
        None => {
            let lang = prefs.language();
            println!("{lang} ({})", lang.translation_key());
            println!("start screen: {:?}", StartScreen::for_prefs(&prefs));
        }
    }
    Ok(())
}
