use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    // Training
    pub epochs: usize,
    pub batch_size: usize,
    pub test_batch_size: usize,
    pub learning_rate: f64,

    // Model
    pub num_classes: usize,
    pub img_size: usize,

    // Early stopping
    pub patience: usize,
    pub min_delta: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 2,
            batch_size: 64,
            test_batch_size: 100,
            learning_rate: 0.001,
            num_classes: 133,
            img_size: 224,
            // A single non-improving validation epoch ends the run.
            patience: 1,
            min_delta: 0.0,
        }
    }
}

impl TrainingConfig {
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrainingConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.yaml");

        let mut config = TrainingConfig::default();
        config.epochs = 5;
        config.num_classes = 7;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = TrainingConfig::from_yaml(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.epochs, 5);
        assert_eq!(loaded.num_classes, 7);
        assert_eq!(loaded.batch_size, 64);
    }
}
