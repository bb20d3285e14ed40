pub mod backbone;
pub mod blocks;
pub mod classifier;

pub use backbone::{Backbone, FEATURE_DIM};
pub use blocks::{BasicBlock, ConvBlock};
pub use classifier::BreedClassifier;
