//! Feeder entry point
//!
//! Runs the feeder headless: the simulation, menus and audio are live, and
//! each frame's scene goes to the headless renderer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use env_logger::Env;

use feeder::audio::AudioBackend;
use feeder::consts::{SIM_DT, VERSION};
use feeder::scene::HeadlessRenderer;
use feeder::update::UpdateCheck;
use feeder::{FeederApp, FeederError, FeederRegistry, FrameInput, Key, Settings};

#[derive(Debug, Parser)]
#[command(name = "feeder", version, about = "Bird feeder ambiance")]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds; runs until killed otherwise
    #[arg(long)]
    seconds: Option<f32>,

    /// Feeder to start with
    #[arg(long)]
    feeder: Option<String>,

    /// Start with sound off
    #[arg(long)]
    mute: bool,

    /// Step frames back to back instead of at 60 Hz
    #[arg(long)]
    unthrottled: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn run(args: Args) -> Result<(), FeederError> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(feeder) = args.feeder {
        settings.feeder = feeder;
    }
    settings.start_muted |= args.mute;

    let mut registry = FeederRegistry::with_builtin();
    for path in &settings.extra_feeders {
        let context = registry.register_json(path)?;
        log::info!("Registered feeder {}", context.name);
    }

    #[cfg(feature = "rodio")]
    let (_output, backend) = {
        let (output, backend) = feeder::audio::RodioBackend::open()?;
        (output, Arc::new(backend) as Arc<dyn AudioBackend>)
    };
    #[cfg(not(feature = "rodio"))]
    let backend: Arc<dyn AudioBackend> = Arc::new(feeder::audio::SilentBackend::default());

    let update_check = if settings.check_for_updates {
        UpdateCheck::spawn(settings.update_endpoint.clone(), VERSION)
    } else {
        UpdateCheck::disabled()
    };

    let mut app = FeederApp::new(
        settings,
        registry,
        backend,
        HeadlessRenderer::default(),
        update_check,
    )?;

    // Nobody is at the keyboard: dismiss the main menu on the first frame
    let mut keys = vec![Key::Enter];
    let frame_time = Duration::from_secs_f32(SIM_DT);
    let started = Instant::now();
    let mut last = started;
    let mut simulated = 0.0f32;

    loop {
        let dt = if args.unthrottled {
            SIM_DT
        } else {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            dt
        };
        simulated += dt;

        app.frame(&FrameInput {
            keys: std::mem::take(&mut keys),
            dt,
        })?;

        if args.seconds.is_some_and(|limit| simulated >= limit) {
            break;
        }
        if !args.unthrottled {
            thread::sleep(frame_time.saturating_sub(last.elapsed()));
        }
    }

    let state = app.state();
    log::info!(
        "Stopped after {:.1}s simulated ({} ticks, {} birds at the feeder, {} frames drawn)",
        state.time_secs,
        state.time_ticks,
        state.birds.len(),
        app.renderer().frames()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    log::info!("Feeder {VERSION} starting...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
