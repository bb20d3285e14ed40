pub mod dataloader;
pub mod dataset;
pub mod transforms;

pub use dataloader::{ImageBatch, ImageDataLoader};
pub use dataset::ImageFolderDataset;
pub use transforms::{ImageTransform, IMAGENET_MEAN, IMAGENET_STD};
