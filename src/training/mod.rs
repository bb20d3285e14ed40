pub mod config;
pub mod early_stopping;
pub mod hook;
pub mod metrics;
pub mod trainer;

pub use config::TrainingConfig;
pub use early_stopping::EarlyStopping;
pub use hook::{DebugHook, HookMode};
pub use metrics::{correct_predictions, EpochStats, RunningMetrics, PROGRESS_INTERVAL};
pub use trainer::{evaluate, Trainer, TrainingSummary};
