use std::path::Path;

use anyhow::Result;
use log::info;
use regneark_analyse::config::{RegressionConfig, load_or_default};
use regneark_analyse::pipeline::regression;

const SETTINGS_FILE: &str = "regresjon.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg: RegressionConfig = load_or_default(Path::new(SETTINGS_FILE))?;
    let written = regression::run(&cfg)?;

    for path in &written {
        info!("  {}", path.display());
    }
    Ok(())
}
