use crate::data::dataset::ImageFolderDataset;
use crate::data::transforms::ImageTransform;
use anyhow::Result;
use burn::prelude::*;
use rand::seq::SliceRandom;

/// Batch iterator over an [`ImageFolderDataset`]. Yields `Result` so an
/// unreadable image aborts the pass instead of being silently dropped.
pub struct ImageDataLoader<B: Backend> {
    dataset: ImageFolderDataset,
    transform: ImageTransform,
    batch_size: usize,
    device: B::Device,
    indices: Vec<usize>,
    current_idx: usize,
}

pub struct ImageBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub targets: Tensor<B, 1, Int>,
    pub batch_size: usize,
}

impl<B: Backend> ImageDataLoader<B> {
    pub fn new(
        dataset: ImageFolderDataset,
        transform: ImageTransform,
        batch_size: usize,
        shuffle: bool,
        device: B::Device,
    ) -> Self {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();

        if shuffle {
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }

        Self {
            dataset,
            transform,
            batch_size,
            device,
            indices,
            current_idx: 0,
        }
    }

    /// Number of batches one full pass produces.
    pub fn len(&self) -> usize {
        (self.dataset.len() + self.batch_size - 1) / self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

impl<B: Backend> Iterator for ImageDataLoader<B> {
    type Item = Result<ImageBatch<B>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_idx >= self.indices.len() {
            return None;
        }

        let end_idx = (self.current_idx + self.batch_size).min(self.indices.len());
        let batch_indices = &self.indices[self.current_idx..end_idx];
        let actual_batch_size = batch_indices.len();

        let s = self.transform.img_size;
        let mut images_vec = Vec::with_capacity(actual_batch_size * 3 * s * s);
        let mut labels = Vec::with_capacity(actual_batch_size);

        for &idx in batch_indices {
            let (img, label) = match self.dataset.get(idx) {
                Ok(sample) => sample,
                Err(e) => {
                    // Stop iterating after surfacing the error.
                    self.current_idx = self.indices.len();
                    return Some(Err(e));
                }
            };

            images_vec.extend_from_slice(&self.transform.apply(&img));
            labels.push(label as i32);
        }

        let images = Tensor::<B, 1>::from_floats(images_vec.as_slice(), &self.device)
            .reshape([actual_batch_size, 3, s, s]);
        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        self.current_idx = end_idx;

        Some(Ok(ImageBatch {
            images,
            targets,
            batch_size: actual_batch_size,
        }))
    }
}
