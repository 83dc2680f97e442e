use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use anyhow::{Context, Result, anyhow};
use cadence_config::{CadenceConfig, CompletionSetting};
use cadence_motion::{
    Animator, CompletionMode, MotionEngine, PresetCatalog, PresetOptions, Tweener, animate_by_preset,
};
use clap::Parser;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "cadence", version, about = "Play a named animation preset and print each frame's style")]
struct Cli {
    /// Preset to play (default: `demo.preset` from cadence.toml)
    #[arg()]
    preset: Option<String>,

    /// Configuration file (default: ./cadence.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame cap per trigger change
    #[arg(short, long)]
    frames: Option<u32>,

    /// Flip the trigger back once the forward cycle completes
    #[arg(short, long)]
    reverse: bool,

    /// List the available presets and exit
    #[arg(short, long)]
    list: bool,
}

fn completion_mode(setting: CompletionSetting) -> CompletionMode {
    match setting {
        CompletionSetting::Timer => CompletionMode::Timer,
        CompletionSetting::Settle => CompletionMode::Settle,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CadenceConfig> {
    let mut config = match path {
        Some(path) => CadenceConfig::load_from_file(path).map_err(|e| anyhow!(e))?,
        None => CadenceConfig::load_or_default(),
    };
    config.merge_with_env();
    Ok(config)
}

fn load_catalog(config: &CadenceConfig) -> Result<PresetCatalog<bool>> {
    let mut catalog = PresetCatalog::builtin();
    if let Some(path) = &config.demo.presets_file {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read presets file {}", path.display()))?;
        let added = catalog
            .extend_from_toml(&source)
            .with_context(|| format!("invalid presets file {}", path.display()))?;
        info!(path = %path.display(), added, "registered presets");
    }
    Ok(catalog)
}

/// Render frames until the cycle completes or `max_frames` is reached.
///
/// `step` advances the engine by one frame; timers are ticked after it so a
/// settle and a timer landing on the same frame are both seen.
fn play<E, F>(animator: &mut Animator<bool, E>, label: &str, frame_ms: f64, max_frames: u32, mut step: F) -> Result<u32>
where
    E: MotionEngine,
    F: FnMut(&mut Animator<bool, E>, f64) -> Result<()>,
{
    let mut frame = 0;
    while animator.is_animating() && frame < max_frames {
        step(animator, frame_ms)?;
        animator.tick(frame_ms);
        frame += 1;

        let line = serde_json::json!({
            "phase": label,
            "frame": frame,
            "t": f64::from(frame) * frame_ms,
            "style": animator.style().to_json(),
        });
        println!("{line}");
    }
    if animator.is_animating() {
        warn!(phase = label, frames = frame, "frame cap reached before completion");
    }
    Ok(frame)
}

fn run_cycles<E, F>(animator: &mut Animator<bool, E>, config: &CadenceConfig, cli: &Cli, mut step: F) -> Result<()>
where
    E: MotionEngine,
    F: FnMut(&mut Animator<bool, E>, f64) -> Result<()>,
{
    let frame_ms = config.engine.frame_ms;
    let max_frames = cli.frames.unwrap_or(config.demo.max_frames);

    animator.set_trigger(true)?;
    let frames = play(animator, "forward", frame_ms, max_frames, &mut step)?;
    debug!(frames, "forward cycle done");

    if cli.reverse {
        animator.set_trigger(false)?;
        let frames = play(animator, "reverse", frame_ms, max_frames, &mut step)?;
        debug!(frames, "reverse cycle done");
    }

    let state = serde_json::to_string(&animator.state()).context("failed to serialize state")?;
    println!("{state}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Logs go to stderr; stdout carries one JSON object per frame.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let catalog = load_catalog(&config)?;
    if cli.list {
        for name in catalog.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let preset = cli.preset.clone().unwrap_or_else(|| config.demo.preset.clone());
    let options = || {
        PresetOptions::new(false)
            .animate_on_mount(config.animator.animate_on_mount)
            .completion(completion_mode(config.animator.completion))
            .on_complete(|| info!("animation complete"))
    };

    info!(
        preset = %preset,
        frame_ms = config.engine.frame_ms,
        threaded = config.engine.threaded,
        "starting"
    );

    if config.engine.threaded {
        let engine = Arc::new(Mutex::new(Tweener::new()));
        let mut animator = animate_by_preset(&catalog, &preset, options(), Arc::clone(&engine))?;

        // The render thread owns frame stepping; the animator stays here and
        // only learns about settles through its mailbox.
        let (frame_tx, frame_rx) = mpsc::channel::<f64>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let render_engine = Arc::clone(&engine);
        let render = thread::Builder::new()
            .name("cadence-render".into())
            .spawn(move || {
                for delta_ms in frame_rx {
                    render_engine
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .advance(delta_ms);
                    if done_tx.send(()).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn render thread")?;

        run_cycles(&mut animator, &config, &cli, |_, delta_ms| {
            frame_tx.send(delta_ms).context("render thread stopped")?;
            done_rx.recv().context("render thread stopped")?;
            Ok(())
        })?;

        drop(frame_tx);
        render.join().map_err(|_| anyhow!("render thread panicked"))?;
    } else {
        let mut animator = animate_by_preset(&catalog, &preset, options(), Tweener::new())?;
        run_cycles(&mut animator, &config, &cli, |animator, delta_ms| {
            animator.engine_mut().advance(delta_ms);
            Ok(())
        })?;
    }

    Ok(())
}
