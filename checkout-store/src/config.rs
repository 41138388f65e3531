//! Store configuration.
//!
//! A [`StoreConfig`] can be deserialized from JSON (missing fields take their
//! defaults) or assembled with [`StoreConfig::builder`]. All times are in
//! minutes.

use checkout_core::SimError;
use serde::{Deserialize, Serialize};

use crate::builder::{
    validate_finite, validate_non_negative, validate_positive, validate_range, Validate,
    ValidationError, ValidationResult,
};

/// Parameters of one store run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Total number of cashiers, the pool's maximum capacity.
    pub num_units: usize,
    /// Cashiers open at the start of the day.
    pub initial_open_units: usize,
    pub simulation_horizon: f64,
    pub mean_interarrival_time: f64,
    pub mean_service_time: f64,
    pub repair_duration: f64,
    /// Queue length above which another cashier is opened.
    pub backlog_threshold: usize,
    /// Chance, per arrival, that a cashier breaks down.
    pub repair_probability: f64,
    pub seed: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            num_units: 10,
            initial_open_units: 2,
            simulation_horizon: 480.0,
            mean_interarrival_time: 2.0,
            mean_service_time: 5.0,
            repair_duration: 10.0,
            backlog_threshold: 5,
            repair_probability: 0.1,
            seed: 42,
        }
    }
}

impl Validate for StoreConfig {
    fn validate_fields(&self) -> ValidationResult<()> {
        validate_positive("num_units", self.num_units)?;
        if self.initial_open_units > self.num_units {
            return Err(ValidationError::InvalidValue {
                field: "initial_open_units".to_string(),
                reason: format!(
                    "{} open cashiers requested but only {} exist",
                    self.initial_open_units, self.num_units
                ),
            });
        }

        validate_finite("simulation_horizon", self.simulation_horizon)?;
        validate_non_negative("simulation_horizon", self.simulation_horizon)?;

        for (field, value) in [
            ("mean_interarrival_time", self.mean_interarrival_time),
            ("mean_service_time", self.mean_service_time),
            ("repair_duration", self.repair_duration),
        ] {
            validate_finite(field, value)?;
            validate_positive(field, value)?;
        }

        validate_range("repair_probability", self.repair_probability, 0.0, 1.0)
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Checks every field before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), SimError> {
        self.validate_fields().map_err(SimError::from)
    }

    /// Parses a JSON configuration and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] for malformed JSON, unknown
    /// fields or invalid values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| SimError::Configuration(format!("cannot parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Fluent builder for [`StoreConfig`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn num_units(mut self, num_units: usize) -> Self {
        self.config.num_units = num_units;
        self
    }

    pub fn initial_open_units(mut self, initial_open_units: usize) -> Self {
        self.config.initial_open_units = initial_open_units;
        self
    }

    pub fn simulation_horizon(mut self, minutes: f64) -> Self {
        self.config.simulation_horizon = minutes;
        self
    }

    pub fn mean_interarrival_time(mut self, minutes: f64) -> Self {
        self.config.mean_interarrival_time = minutes;
        self
    }

    pub fn mean_service_time(mut self, minutes: f64) -> Self {
        self.config.mean_service_time = minutes;
        self
    }

    pub fn repair_duration(mut self, minutes: f64) -> Self {
        self.config.repair_duration = minutes;
        self
    }

    pub fn backlog_threshold(mut self, queue_len: usize) -> Self {
        self.config.backlog_threshold = queue_len;
        self
    }

    pub fn repair_probability(mut self, p: f64) -> Self {
        self.config.repair_probability = p;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if any field is invalid.
    pub fn build(self) -> Result<StoreConfig, SimError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_units, 10);
        assert_eq!(config.initial_open_units, 2);
        assert_eq!(config.simulation_horizon, 480.0);
        assert_eq!(config.backlog_threshold, 5);
        assert_eq!(config.repair_probability, 0.1);
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = StoreConfig::builder()
            .num_units(3)
            .initial_open_units(1)
            .simulation_horizon(60.0)
            .mean_interarrival_time(1.0)
            .mean_service_time(4.0)
            .repair_duration(2.0)
            .backlog_threshold(2)
            .repair_probability(0.5)
            .seed(9)
            .build()
            .unwrap();

        assert_eq!(config.num_units, 3);
        assert_eq!(config.initial_open_units, 1);
        assert_eq!(config.mean_service_time, 4.0);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            StoreConfig::builder().num_units(0).initial_open_units(0),
            StoreConfig::builder().num_units(2).initial_open_units(3),
            StoreConfig::builder().simulation_horizon(-1.0),
            StoreConfig::builder().simulation_horizon(f64::INFINITY),
            StoreConfig::builder().mean_interarrival_time(0.0),
            StoreConfig::builder().mean_service_time(f64::NAN),
            StoreConfig::builder().repair_duration(-10.0),
            StoreConfig::builder().repair_probability(1.01),
            StoreConfig::builder().repair_probability(-0.1),
        ];
        for builder in cases {
            let err = builder.clone().build().unwrap_err();
            assert!(matches!(err, SimError::Configuration(_)), "{builder:?}");
        }
    }

    #[test]
    fn test_zero_horizon_is_allowed() {
        assert!(StoreConfig::builder().simulation_horizon(0.0).build().is_ok());
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let config = StoreConfig::from_json(r#"{ "num_units": 4, "seed": 7 }"#).unwrap();
        assert_eq!(config.num_units, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.mean_service_time, 5.0);
    }

    #[test]
    fn test_json_rejects_unknown_and_invalid() {
        assert!(StoreConfig::from_json(r#"{ "cashiers": 4 }"#).is_err());
        assert!(StoreConfig::from_json(r#"{ "repair_probability": 2.0 }"#).is_err());
        assert!(StoreConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = StoreConfig::builder().seed(123).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(StoreConfig::from_json(&json).unwrap(), config);
    }
}
