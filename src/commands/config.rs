use crate::core::{
    config::Config,
    dirs::expand_home,
    error::{GitLauncherError, Result},
    output::{print_section_header, print_success},
};
use colored::*;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Changes requested on the `config` command line; unset fields are kept.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigUpdate {
    pub ttl_days: Option<u64>,
    pub base_dir: Option<String>,
    pub default_provider: Option<String>,
    pub shallow: Option<bool>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.ttl_days.is_none()
            && self.base_dir.is_none()
            && self.default_provider.is_none()
            && self.shallow.is_none()
    }

    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(days) = self.ttl_days {
            config.ttl_ms = days.checked_mul(DAY_MS).ok_or_else(|| {
                GitLauncherError::config(format!("TTL of {days} days is too large"))
            })?;
        }

        if let Some(dir) = &self.base_dir {
            if dir.trim().is_empty() {
                return Err(GitLauncherError::config("base directory must not be empty"));
            }
            let dir = expand_home(dir);
            config.base_dir = if dir.is_absolute() {
                dir
            } else {
                config.cache_home.join(dir)
            };
        }

        if let Some(name) = &self.default_provider {
            if !config.providers.contains_key(name) {
                return Err(GitLauncherError::unknown_provider(name));
            }
            config.default_provider = name.clone();
        }

        if let Some(shallow) = self.shallow {
            config.shallow = shallow;
        }
        Ok(())
    }
}

pub fn execute_config(mut config: Config, update: ConfigUpdate) -> Result<()> {
    if !update.is_empty() {
        update.apply(&mut config)?;
        config.save()?;
        print_success(&format!("Saved {}", config.config_path().display()));
    }

    print_section_header(&format!("Configuration ({})", config.config_path().display()));
    println!("  {:<16}{}", "baseDir", config.base_dir.display());
    println!(
        "  {:<16}{} ({} days)",
        "ttlMs",
        config.ttl_ms,
        config.ttl_ms / DAY_MS
    );
    println!("  {:<16}{}", "purgeFloor", config.purge_floor);
    println!("  {:<16}{}", "shallow", config.shallow);
    println!("  {:<16}{}", "defaultProvider", config.default_provider);

    print_section_header("Providers");
    for (name, provider) in &config.providers {
        let marker = if *name == config.default_provider {
            "*".green()
        } else {
            " ".normal()
        };
        let description = provider
            .description
            .as_deref()
            .map(|d| format!("  {}", d.bright_black()))
            .unwrap_or_default();
        println!("  {marker} {:<10}{}{description}", name, provider.command);
    }
    println!();
    Ok(())
}
