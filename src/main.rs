use std::process;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use sprite_compositor::{
    config::PlayerConfig, engine::Scene, player::Player, surface::MemorySurface,
};

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "sprite-compositor play <scene.json>";
const SNAPSHOT_USAGE: &str = "sprite-compositor snapshot <scene.json> [frame]";

/// Log to stderr, filtered by `SPRITE_COMPOSITOR_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("SPRITE_COMPOSITOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        Some("snapshot") => {
            let path = args.next().context(SNAPSHOT_USAGE)?;
            let frame = match args.next() {
                Some(f) => f.parse().with_context(|| format!("Invalid frame number `{f}`"))?,
                None => 0,
            };
            snapshot(&path, frame)
        }
        _ => bail!(
            "Sprite Compositor — layered text sprites on a character grid\n\nUsage:\n  {PLAY_USAGE}\n  {SNAPSHOT_USAGE}"
        ),
    }
}

fn play(path: &str) -> Result<()> {
    let scene = Scene::load(path).with_context(|| format!("Failed to load {path}"))?;
    let mut player = Player::new(scene, PlayerConfig::load())?;
    player.play()
}

/// Print the composited text of one frame.
fn snapshot(path: &str, frame: usize) -> Result<()> {
    let scene = Scene::load(path).with_context(|| format!("Failed to load {path}"))?;
    if frame >= scene.frame_count.max(1) {
        bail!("Frame {frame} out of range: scene has {} frames", scene.frame_count);
    }
    let mut compositor = scene.compositor()?;
    let mut surface = MemorySurface::new(usize::from(scene.width), usize::from(scene.height));

    scene.draw_frame(frame, &mut compositor);
    let stats = compositor.render(&mut surface);
    println!("{}", surface.text());
    eprintln!("Frame {frame}: {} runs", stats.runs);
    Ok(())
}
