/// Early stopping on validation loss. The best loss only moves on a strict
/// improvement (`loss < best - min_delta`); every other epoch increments the
/// strike counter, and the run stops once it reaches `patience`. The default
/// configuration (patience 1, min_delta 0) stops after the first epoch that
/// fails to improve.
pub struct EarlyStopping {
    patience: usize,
    min_delta: f32,
    best_loss: f32,
    counter: usize,
    stopped: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self {
            patience,
            min_delta,
            best_loss: f32::INFINITY,
            counter: 0,
            stopped: false,
        }
    }

    pub fn best_loss(&self) -> f32 {
        self.best_loss
    }

    pub fn should_stop(&mut self, current_loss: f32) -> bool {
        if self.stopped {
            return true;
        }

        if current_loss < self.best_loss - self.min_delta {
            self.best_loss = current_loss;
            self.counter = 0;
            false
        } else {
            self.counter += 1;

            if self.counter >= self.patience {
                self.stopped = true;
                println!(
                    "Early stopping triggered! No improvement for {} epoch(s)",
                    self.patience
                );
                true
            } else {
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.best_loss = f32::INFINITY;
        self.counter = 0;
        self.stopped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_first_non_improving_epoch() {
        let mut es = EarlyStopping::new(1, 0.0);
        assert!(!es.should_stop(1.0));
        assert!(!es.should_stop(0.8));
        assert!(es.should_stop(0.9));
    }

    #[test]
    fn equal_loss_is_not_an_improvement() {
        let mut es = EarlyStopping::new(1, 0.0);
        assert!(!es.should_stop(1.0));
        assert!(es.should_stop(1.0));
    }

    #[test]
    fn never_stops_while_strictly_improving() {
        let mut es = EarlyStopping::new(1, 0.0);
        for i in 0..50 {
            assert!(!es.should_stop(1.0 - i as f32 * 0.01));
        }
        assert!((es.best_loss() - 0.51).abs() < 1e-6);
    }

    #[test]
    fn patience_window_allows_strikes() {
        let mut es = EarlyStopping::new(3, 0.0);
        assert!(!es.should_stop(1.0));
        assert!(!es.should_stop(1.1));
        assert!(!es.should_stop(1.1));
        assert!(es.should_stop(1.1));
    }

    #[test]
    fn stays_stopped_once_triggered() {
        let mut es = EarlyStopping::new(1, 0.0);
        assert!(!es.should_stop(1.0));
        assert!(es.should_stop(2.0));
        assert!(es.should_stop(0.1));

        es.reset();
        assert!(!es.should_stop(0.5));
    }
}
