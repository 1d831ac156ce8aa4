use std::path::Path;

use crate::ai::{GeneticConfig, NegamaxConfig};
use crate::error::ConfigError;
use crate::play::MatchConfig;

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub negamax: NegamaxConfig,
    pub genetic: GeneticConfig,
    pub orchestrator: MatchConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.negamax.depth == 0 {
            return Err(ConfigError::Validation("negamax.depth must be >= 1".into()));
        }
        if self.negamax.search_window == 0 {
            return Err(ConfigError::Validation(
                "negamax.search_window must be >= 1".into(),
            ));
        }

        let genetic = &self.genetic;
        if genetic.search_depth == 0 {
            return Err(ConfigError::Validation(
                "genetic.search_depth must be >= 1".into(),
            ));
        }
        for (name, rate) in [
            ("crossover_rate", genetic.crossover_rate),
            ("mutation_rate", genetic.mutation_rate),
            ("position_mutation_bias", genetic.position_mutation_bias),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Validation(format!(
                    "genetic.{name} must be in [0, 1]"
                )));
            }
        }
        if genetic.initial_population_size == 0 {
            return Err(ConfigError::Validation(
                "genetic.initial_population_size must be >= 1".into(),
            ));
        }
        if genetic.max_population_size < 2 {
            return Err(ConfigError::Validation(
                "genetic.max_population_size must be >= 2".into(),
            ));
        }
        if genetic.initial_population_size > genetic.max_population_size {
            return Err(ConfigError::Validation(
                "genetic.initial_population_size must be <= genetic.max_population_size".into(),
            ));
        }

        if self.orchestrator.retry_limit == 0 {
            return Err(ConfigError::Validation(
                "orchestrator.retry_limit must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        // plain structs of numbers, flags and paths always serialize
        toml::to_string_pretty(&AppConfig::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[negamax]
depth = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.negamax.depth, 3);
        // Other fields should be defaults
        assert_eq!(config.negamax.search_window, 256);
        assert!(config.negamax.transposition_path.is_none());
        assert_eq!(config.genetic.initial_population_size, 3000);
        assert_eq!(config.orchestrator.retry_limit, 3);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.genetic.search_depth, default.genetic.search_depth);
        assert!((config.genetic.mutation_rate - default.genetic.mutation_rate).abs() < 1e-9);
        assert_eq!(config.orchestrator.random_opening, default.orchestrator.random_opening);
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let mut config = AppConfig::default();
        config.negamax.depth = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.genetic.search_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let mut config = AppConfig::default();
        config.negamax.search_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_rates_out_of_range() {
        let mut config = AppConfig::default();
        config.genetic.mutation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.genetic.crossover_rate = -0.1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.genetic.position_mutation_bias = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_population_sizes() {
        let mut config = AppConfig::default();
        config.genetic.initial_population_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.genetic.initial_population_size = 10;
        config.genetic.max_population_size = 5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.genetic.initial_population_size = 1;
        config.genetic.max_population_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_retry_limit() {
        let mut config = AppConfig::default();
        config.orchestrator.retry_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry_limit"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.negamax.depth, 2);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[negamax]
transposition_path = "tables/negamax.json"

[genetic]
max_generations = 4
seed = 17
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(
            config.negamax.transposition_path.as_deref(),
            Some(Path::new("tables/negamax.json"))
        );
        assert_eq!(config.genetic.max_generations, 4);
        assert_eq!(config.genetic.seed, Some(17));
        // Others are defaults
        assert!((config.genetic.crossover_rate - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[orchestrator]\nretry_limit = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("[genetic]"));
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}
