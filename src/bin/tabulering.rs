use std::path::Path;

use anyhow::Result;
use log::info;
use regneark_analyse::config::{TabulationConfig, load_or_default};
use regneark_analyse::pipeline::tabulation;

const SETTINGS_FILE: &str = "tabulering.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg: TabulationConfig = load_or_default(Path::new(SETTINGS_FILE))?;
    let written = tabulation::run(&cfg)?;

    let out = std::path::absolute(&cfg.output_dir).unwrap_or_else(|_| cfg.output_dir.clone());
    info!("done: {} files written to {}", written.len(), out.display());
    Ok(())
}
