//! `burnrate config` — configuration file management.

use burnrate_config::{Config, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let path = config_path();
            if path.exists() {
                if !global.quiet {
                    eprintln!("Config already exists at {}", path.display());
                }
                return Ok(());
            }
            save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("Wrote default config to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let mut config = load_config_or_default();
            // Plaintext tokens never reach stdout.
            for settings in config.providers.values_mut() {
                if settings.token.is_some() {
                    settings.token = Some("[REDACTED]".into());
                }
            }
            let toml_str = toml::to_string_pretty(&config)
                .map_err(burnrate_config::ConfigError::Serialization)?;
            output::print_output(toml_str.trim_end(), global.quiet);
            Ok(())
        }
    }
}
