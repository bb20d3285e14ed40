use crate::model::backbone::{Backbone, FEATURE_DIM};
use anyhow::Result;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings, Recorder};
use std::path::Path;

/// Transfer-learning classifier: a frozen feature backbone and a fresh
/// trainable linear head sized to the target class count. The backbone is
/// always frozen in full; only the head receives gradient updates.
#[derive(Module, Debug)]
pub struct BreedClassifier<B: Backend> {
    backbone: Backbone<B>,
    fc: Linear<B>,
}

impl<B: Backend> BreedClassifier<B> {
    /// Randomly initialized backbone, still frozen. Used when no pretrained
    /// weights are supplied and by the tests.
    pub fn new(device: &B::Device, num_classes: usize) -> Self {
        let backbone = Backbone::new(device).no_grad();

        Self {
            backbone,
            fc: LinearConfig::new(FEATURE_DIM, num_classes).init(device),
        }
    }

    /// Load backbone weights from a recorder file, then freeze and attach a
    /// new head.
    pub fn with_pretrained(
        device: &B::Device,
        num_classes: usize,
        weights: &Path,
    ) -> Result<Self> {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(weights.to_path_buf(), device)
            .map_err(|e| anyhow::anyhow!("failed to load pretrained backbone: {e:?}"))?;

        let backbone = Backbone::new(device).load_record(record).no_grad();

        Ok(Self {
            backbone,
            fc: LinearConfig::new(FEATURE_DIM, num_classes).init(device),
        })
    }

    /// Rebuild an identical architecture and load previously saved weights
    /// (the full backbone + head record written by the trainer).
    pub fn load(device: &B::Device, num_classes: usize, weights: &Path) -> Result<Self> {
        let model = Self::new(device, num_classes);

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(weights.to_path_buf(), device)
            .map_err(|e| anyhow::anyhow!("failed to load model weights: {e:?}"))?;

        Ok(model.load_record(record))
    }

    /// Per-class scores, `[batch, num_classes]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward(images);
        self.fc.forward(features)
    }
}
