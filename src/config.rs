//! Generator configuration

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::recommend::{meal_pool, DEFAULT_RECOMMEND_COUNT};
use crate::selector::DEFAULT_MAX_ANOMALIES;
use crate::types::DatasetProfile;

/// Default number of records per batch
pub const DEFAULT_RECORD_COUNT: usize = 5000;

/// Settings for a [`RecordGenerator`](crate::pipeline::RecordGenerator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Records produced by a batch run
    pub count: usize,
    /// Random seed for reproducibility; `None` seeds from entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub profile: DatasetProfile,
    /// Meal recommendations per record
    pub recommend_count: usize,
    /// Anomalies kept per record after ranking
    pub max_anomalies: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_RECORD_COUNT,
            seed: None,
            profile: DatasetProfile::Anomalous,
            recommend_count: DEFAULT_RECOMMEND_COUNT,
            max_anomalies: DEFAULT_MAX_ANOMALIES,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_profile(mut self, profile: DatasetProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_recommend_count(mut self, count: usize) -> Self {
        self.recommend_count = count;
        self
    }

    pub fn with_max_anomalies(mut self, max: usize) -> Self {
        self.max_anomalies = max;
        self
    }

    /// Reject settings no record could satisfy
    pub fn validate(&self) -> Result<(), GenerateError> {
        let pool = meal_pool(self.profile);
        if self.recommend_count > pool.len() {
            return Err(GenerateError::InvalidConfig(format!(
                "recommend_count {} exceeds the {} available meals",
                self.recommend_count,
                pool.len()
            )));
        }
        if self.max_anomalies == 0 {
            return Err(GenerateError::InvalidConfig(
                "max_anomalies must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.count, 5000);
        assert_eq!(config.seed, None);
        assert_eq!(config.profile, DatasetProfile::Anomalous);
        assert_eq!(config.recommend_count, 3);
        assert_eq!(config.max_anomalies, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = GeneratorConfig::new()
            .with_count(10)
            .with_seed(42)
            .with_profile(DatasetProfile::Steady)
            .with_recommend_count(2)
            .with_max_anomalies(3);

        assert_eq!(config.count, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.profile, DatasetProfile::Steady);
        assert_eq!(config.recommend_count, 2);
        assert_eq!(config.max_anomalies, 3);
    }

    #[test]
    fn test_validate_rejects_oversized_recommendations() {
        let config = GeneratorConfig::new().with_recommend_count(151);
        assert!(matches!(
            config.validate(),
            Err(GenerateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_recommendation_limit_follows_profile_pool() {
        let steady = GeneratorConfig::new().with_profile(DatasetProfile::Steady);
        assert!(steady.clone().with_recommend_count(96).validate().is_ok());
        assert!(steady.with_recommend_count(97).validate().is_err());
        assert!(GeneratorConfig::new()
            .with_recommend_count(97)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = GeneratorConfig::new().with_max_anomalies(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_omits_missing_seed() {
        let json = serde_json::to_string(&GeneratorConfig::default()).unwrap();
        assert!(!json.contains("seed"));
        assert!(json.contains(r#""profile":"anomalous""#));
    }
}
