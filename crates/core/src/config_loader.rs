use crate::config::EngineConfig;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by merging TOML, environment variables, and
    /// an optional JSON override, in that order of increasing precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be parsed, or if a loaded value
    /// violates an invariant the type system cannot express (see
    /// [`Self::validate`]).
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Toml::file("config/Config.toml"))
            .merge(Env::prefixed("ENGINE_"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Loads configuration with a profile-specific TOML layer merged in
    /// ahead of environment variables (e.g. `config/Config.live.toml`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_profile(profile: &str) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Toml::file("config/Config.toml"))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed("ENGINE_"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Rejects configurations that would make the auto-close controller
    /// quote worse exits than breakeven, or otherwise specify a negative
    /// rate where only a non-negative one is meaningful.
    fn validate(config: &EngineConfig) -> Result<()> {
        if config.auto_close.auto_close_margin_pct < 0.0 {
            bail!(
                "auto_close_margin_pct must be >= 0, got {}",
                config.auto_close.auto_close_margin_pct
            );
        }
        if config.edges.kelly_fraction <= 0.0 || config.edges.kelly_fraction > 1.0 {
            bail!(
                "kelly_fraction must be in (0, 1], got {}",
                config.edges.kelly_fraction
            );
        }
        if config.bailout.bailout_trigger_pct < 0.0 {
            bail!(
                "bailout_trigger_pct must be >= 0, got {}",
                config.bailout.bailout_trigger_pct
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_negative_auto_close_margin() {
        let mut config = EngineConfig::default();
        config.auto_close.auto_close_margin_pct = -1.0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn validate_accepts_default_config() {
        assert!(ConfigLoader::validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_kelly_fraction() {
        let mut config = EngineConfig::default();
        config.edges.kelly_fraction = 1.5;
        assert!(ConfigLoader::validate(&config).is_err());
    }
}
