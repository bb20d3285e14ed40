use burn::prelude::*;

/// Samples between progress reports within a phase.
pub const PROGRESS_INTERVAL: usize = 2000;

/// Count of rows whose arg-max score matches the target label.
pub fn correct_predictions<B: Backend>(
    logits: &Tensor<B, 2>,
    targets: &Tensor<B, 1, Int>,
) -> usize {
    // argmax keeps the reduced dim: [batch, 1] -> [batch]
    let preds: Tensor<B, 1, Int> = logits.clone().argmax(1).flatten(0, 1);
    preds
        .equal(targets.clone())
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

/// Aggregate result of one pass over a dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochStats {
    pub avg_loss: f32,
    /// Top-1 accuracy in percent.
    pub accuracy: f32,
    pub correct: usize,
    pub samples: usize,
}

/// Loss/accuracy accumulator for one phase. Losses are weighted by batch
/// size so short final batches do not skew the average.
#[derive(Debug, Default)]
pub struct RunningMetrics {
    loss_sum: f64,
    correct: usize,
    samples: usize,
    prev_samples: usize,
}

impl RunningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, batch_loss: f32, batch_size: usize, correct: usize) {
        self.prev_samples = self.samples;
        self.loss_sum += batch_loss as f64 * batch_size as f64;
        self.correct += correct;
        self.samples += batch_size;
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Average loss over the samples seen so far.
    pub fn running_loss(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            (self.loss_sum / self.samples as f64) as f32
        }
    }

    pub fn running_accuracy(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            100.0 * self.correct as f32 / self.samples as f32
        }
    }

    /// True when the last `update` crossed a multiple of `interval` samples.
    pub fn crossed(&self, interval: usize) -> bool {
        interval > 0 && self.prev_samples / interval < self.samples / interval
    }

    pub fn finish(&self) -> EpochStats {
        EpochStats {
            avg_loss: self.running_loss(),
            accuracy: self.running_accuracy(),
            correct: self.correct,
            samples: self.samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn correct_count_matches_argmax() {
        let device = Default::default();
        let logits = Tensor::<B, 2>::from_floats(
            [
                [2.0, 0.5, 0.1],
                [0.1, 3.0, 0.2],
                [0.3, 0.2, 0.1],
                [0.0, 0.0, 5.0],
            ],
            &device,
        );
        let targets = Tensor::<B, 1, Int>::from_ints([0, 1, 2, 2], &device);

        // Rows 0, 1 and 3 match; row 2 predicts class 0 but the label is 2.
        assert_eq!(correct_predictions(&logits, &targets), 3);
    }

    #[test]
    fn running_metrics_weight_by_batch_size() {
        let mut m = RunningMetrics::new();
        m.update(1.0, 4, 2);
        m.update(3.0, 2, 2);

        let stats = m.finish();
        assert_eq!(stats.samples, 6);
        assert_eq!(stats.correct, 4);
        assert!((stats.avg_loss - 10.0 / 6.0).abs() < 1e-6);
        assert!((stats.accuracy - 100.0 * 4.0 / 6.0).abs() < 1e-4);
    }

    #[test]
    fn empty_pass_yields_zeros() {
        let stats = RunningMetrics::new().finish();
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.avg_loss, 0.0);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn progress_boundary_detection() {
        let mut m = RunningMetrics::new();
        m.update(1.0, 1500, 0);
        assert!(!m.crossed(2000));
        m.update(1.0, 600, 0);
        assert!(m.crossed(2000)); // 1500 -> 2100 crosses 2000
        m.update(1.0, 100, 0);
        assert!(!m.crossed(2000));
    }
}
