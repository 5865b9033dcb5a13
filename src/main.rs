use std::{env, error::Error};

use env_logger::Env;
use log::info;
use note_compositor::{pipeline::run, PipelineConfig};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "compose.toml".to_string());
    let config = PipelineConfig::load(&config_path)?;
    info!("rendering {} with {}", config.midi.display(), config_path);

    let audio_clip = run(&config)?;
    info!(
        "done: {} samples at {} Hz",
        audio_clip.len(),
        config.compositor.sample_rate
    );

    Ok(())
}
