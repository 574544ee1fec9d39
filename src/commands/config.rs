//! Config subcommands handler

use anyhow::Result;

use clipsync::config::CONFIG_ENV;
use clipsync::Config;

/// Show current configuration as TOML.
#[cfg(not(tarpaulin_include))]
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str.trim_end());
    Ok(())
}

/// Print where the configuration is read from.
///
/// The path is printed even if no file exists yet; defaults apply then.
#[cfg(not(tarpaulin_include))]
pub fn handle_path() -> Result<()> {
    let config_path = Config::config_path()?;
    println!("{}", config_path.display());
    if !config_path.exists() {
        eprintln!(
            "(not created yet; defaults in use, set {} to use another file)",
            CONFIG_ENV
        );
    }
    Ok(())
}
