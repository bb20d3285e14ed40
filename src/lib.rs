pub mod data;
pub mod model;
pub mod training;

// Re-exports for convenience
pub use data::{ImageBatch, ImageDataLoader, ImageFolderDataset, ImageTransform};
pub use model::{Backbone, BreedClassifier};
pub use training::{
    DebugHook, EarlyStopping, EpochStats, HookMode, Trainer, TrainingConfig, TrainingSummary,
};
