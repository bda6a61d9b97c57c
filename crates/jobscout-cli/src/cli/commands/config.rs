//! `jobscout config` – show where the config lives and what is in effect.

use anyhow::Result;
use jobscout_core::config::{self, ScoutConfig};

pub fn run_config(cfg: &ScoutConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", config::to_toml(cfg)?);
    Ok(())
}
