//! Interactive viewer for the mug scene

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mug_scene::prelude::*;

#[derive(Parser)]
#[command(name = "mug-scene", about = "Fly around a lit mug on a table")]
struct Cli {
    /// RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding stone.png and grass.png
    #[arg(long)]
    textures: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match ViewerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.textures {
        config = config.with_texture_dir(dir);
    }

    let shadow = ShadowConfig::default().with_resolution(config.shadow_map_size);
    let scene = MugScene::new(config.texture_dir).with_lighting(config.lighting);

    match Engine::new(config.window, scene)
        .with_shadow_config(shadow)
        .run()
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
