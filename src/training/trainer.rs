use crate::data::{ImageDataLoader, ImageFolderDataset, ImageTransform};
use crate::model::BreedClassifier;
use crate::training::hook::{DebugHook, HookMode};
use crate::training::metrics::{
    correct_predictions, EpochStats, RunningMetrics, PROGRESS_INTERVAL,
};
use crate::training::{EarlyStopping, TrainingConfig};
use anyhow::Result;
use burn::module::AutodiffModule;
use burn::nn::loss::{CrossEntropyLoss, CrossEntropyLossConfig};
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::backend::AutodiffBackend;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of one training run.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    pub best_val_loss: f32,
    pub stopped_early: bool,
}

pub struct Trainer<B: AutodiffBackend> {
    pub model: BreedClassifier<B>,
    loss_fn: CrossEntropyLoss<B>,
    optimizer: OptimizerAdaptor<Adam, BreedClassifier<B>, B>,
    config: TrainingConfig,
    device: B::Device,
    early_stopping: EarlyStopping,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(model: BreedClassifier<B>, config: TrainingConfig, device: B::Device) -> Self {
        let loss_fn = CrossEntropyLossConfig::new().init(&device);
        let early_stopping = EarlyStopping::new(config.patience, config.min_delta);
        let optimizer = AdamConfig::new().init();

        Self {
            model,
            loss_fn,
            optimizer,
            config,
            device,
            early_stopping,
        }
    }

    /// Alternate phases "train" and "valid" for the configured epoch count,
    /// feeding each epoch's average validation loss into early stopping.
    pub fn train(
        &mut self,
        train_dataset: &ImageFolderDataset,
        valid_dataset: &ImageFolderDataset,
        hook: &mut DebugHook,
    ) -> Result<TrainingSummary> {
        println!("Dataset loaded:");
        println!("  Train: {} images", train_dataset.len());
        println!("  Valid: {} images", valid_dataset.len());
        println!();

        let pb = ProgressBar::new(self.config.epochs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap(),
        );

        let mut summary = TrainingSummary {
            epochs_run: 0,
            best_val_loss: f32::INFINITY,
            stopped_early: false,
        };

        for epoch in 1..=self.config.epochs {
            let epoch_start = Instant::now();
            println!("Epoch [{}/{}]", epoch, self.config.epochs);

            let train_stats = self.train_epoch(train_dataset, hook)?;
            let valid_stats = self.validate_epoch(valid_dataset, hook)?;
            summary.epochs_run = epoch;

            pb.set_message(format!(
                "Epoch {}: Train={:.4}, Val={:.4}",
                epoch, train_stats.avg_loss, valid_stats.avg_loss
            ));
            pb.inc(1);

            println!(
                "  Train Loss: {:.4}, Val Loss: {:.4}, Val Acc: {:.2}%",
                train_stats.avg_loss, valid_stats.avg_loss, valid_stats.accuracy
            );
            println!("  Epoch time: {:.2}s", epoch_start.elapsed().as_secs_f32());

            let val_loss = valid_stats.avg_loss;
            if val_loss.is_nan() || val_loss.is_infinite() {
                eprintln!("  Validation loss is NaN/Inf - skipping early stopping check");
                continue;
            }

            if self.early_stopping.should_stop(val_loss) {
                println!("  Early stopping at epoch {}", epoch);
                summary.stopped_early = true;
                break;
            }
        }

        summary.best_val_loss = self.early_stopping.best_loss();
        pb.finish_with_message("Training completed");
        Ok(summary)
    }

    fn train_epoch(
        &mut self,
        dataset: &ImageFolderDataset,
        hook: &mut DebugHook,
    ) -> Result<EpochStats> {
        hook.set_mode(HookMode::Train);

        let loader = ImageDataLoader::<B>::new(
            dataset.clone(),
            ImageTransform::new(self.config.img_size),
            self.config.batch_size,
            true,
            self.device.clone(),
        );

        let total = dataset.len();
        let mut running = RunningMetrics::new();

        for batch in loader {
            let batch = batch?;

            let logits = self.model.forward(batch.images.clone());
            let loss = self.loss_fn.forward(logits.clone(), batch.targets.clone());
            let loss_value = loss.clone().into_scalar().elem::<f32>();

            if loss_value.is_nan() || loss_value.is_infinite() {
                eprintln!("  NaN/Inf training loss - skipping update");
                continue;
            }

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self
                .optimizer
                .step(self.config.learning_rate, self.model.clone(), grads);

            let correct = correct_predictions(&logits, &batch.targets);
            running.update(loss_value, batch.batch_size, correct);
            hook.record_scalar("train_loss", loss_value);

            if running.crossed(PROGRESS_INTERVAL) {
                report_progress("train", &running, total);
            }
        }

        Ok(running.finish())
    }

    fn validate_epoch(
        &self,
        dataset: &ImageFolderDataset,
        hook: &mut DebugHook,
    ) -> Result<EpochStats> {
        hook.set_mode(HookMode::Eval);
        let valid_model = self.model.valid();

        forward_pass(
            &valid_model,
            dataset,
            self.config.batch_size,
            self.config.img_size,
            &self.device,
            hook,
            "valid",
        )
    }

    /// Forward-only pass over the held-out test set with gradients off.
    pub fn test(&self, dataset: &ImageFolderDataset, hook: &mut DebugHook) -> Result<EpochStats> {
        println!("Running test evaluation ({} images)...", dataset.len());
        let valid_model = self.model.valid();

        evaluate(
            &valid_model,
            dataset,
            self.config.test_batch_size,
            self.config.img_size,
            &self.device,
            hook,
        )
    }

    /// Serialize the trained weights to `<dir>/model.bin` with a JSON
    /// sidecar describing the architecture knobs needed to reload them.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let record = self.model.clone().into_record();
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(record, dir.join("model"))
            .map_err(|e| anyhow::anyhow!("failed to save model weights: {e:?}"))?;

        let config_path = dir.join("config.json");
        let config_json = serde_json::json!({
            "model_type": "BreedClassifier",
            "num_classes": self.config.num_classes,
            "img_size": self.config.img_size,
        });
        std::fs::write(&config_path, serde_json::to_string_pretty(&config_json)?)?;

        let weights_path = dir.join("model.bin");
        println!("Model saved:");
        println!("  Weights: {}", weights_path.display());
        println!("  Config:  {}", config_path.display());

        Ok(weights_path)
    }
}

/// Forward-only evaluation of a model on a dataset, reporting average loss
/// and top-1 accuracy. Used for the test phase and by the eval binary.
pub fn evaluate<B: Backend>(
    model: &BreedClassifier<B>,
    dataset: &ImageFolderDataset,
    batch_size: usize,
    img_size: usize,
    device: &B::Device,
    hook: &mut DebugHook,
) -> Result<EpochStats> {
    hook.set_mode(HookMode::Predict);
    forward_pass(model, dataset, batch_size, img_size, device, hook, "test")
}

fn forward_pass<B: Backend>(
    model: &BreedClassifier<B>,
    dataset: &ImageFolderDataset,
    batch_size: usize,
    img_size: usize,
    device: &B::Device,
    hook: &mut DebugHook,
    phase: &str,
) -> Result<EpochStats> {
    let loss_fn: CrossEntropyLoss<B> = CrossEntropyLossConfig::new().init(device);
    let loader = ImageDataLoader::<B>::new(
        dataset.clone(),
        ImageTransform::new(img_size),
        batch_size,
        false,
        device.clone(),
    );

    let total = dataset.len();
    let mut running = RunningMetrics::new();

    for batch in loader {
        let batch = batch?;

        let logits = model.forward(batch.images.clone());
        let loss = loss_fn.forward(logits.clone(), batch.targets.clone());
        let loss_value = loss.into_scalar().elem::<f32>();

        let correct = correct_predictions(&logits, &batch.targets);
        running.update(loss_value, batch.batch_size, correct);
        hook.record_scalar(&format!("{phase}_loss"), loss_value);

        if running.crossed(PROGRESS_INTERVAL) {
            report_progress(phase, &running, total);
        }
    }

    Ok(running.finish())
}

fn report_progress(phase: &str, running: &RunningMetrics, total: usize) {
    println!(
        "  [{}] {}/{} samples - loss: {:.4}, accuracy: {}/{} ({:.2}%)",
        phase,
        running.samples(),
        total,
        running.running_loss(),
        running.correct(),
        running.samples(),
        running.running_accuracy()
    );
}
