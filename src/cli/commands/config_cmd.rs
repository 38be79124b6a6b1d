//! The `config` command.

use jobscroll::config::Config;

/// Print the effective configuration as TOML.
pub fn cmd_config(config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => eprintln!("# Loaded from {}", path.display()),
        None => eprintln!("# No config file found, using defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
