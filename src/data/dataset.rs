use anyhow::Result;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Labeled image dataset read from a class-per-directory tree:
/// root/
/// ├── affenpinscher/
/// │   ├── img_001.jpg
/// │   └── ...
/// ├── afghan_hound/
/// └── ...
///
/// Class labels are the indices of the sorted subdirectory names, so two
/// splits with the same class directories agree on the label mapping.
#[derive(Clone)]
pub struct ImageFolderDataset {
    samples: Vec<(PathBuf, usize)>,
    class_names: Vec<String>,
}

impl ImageFolderDataset {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();

        if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "dataset directory not found: {}",
                root.display()
            ));
        }

        let mut class_dirs: Vec<PathBuf> = fs::read_dir(root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        class_dirs.sort();

        if class_dirs.is_empty() {
            return Err(anyhow::anyhow!(
                "no class subdirectories in {}",
                root.display()
            ));
        }

        let mut samples = Vec::new();
        let mut class_names = Vec::new();

        for (label, class_dir) in class_dirs.iter().enumerate() {
            let name = class_dir
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            for entry in WalkDir::new(class_dir).min_depth(1).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_image_file(entry.path()) {
                    samples.push((entry.into_path(), label));
                }
            }

            class_names.push(name);
        }

        if samples.is_empty() {
            return Err(anyhow::anyhow!(
                "no images found under {}. Check the dataset layout.",
                root.display()
            ));
        }

        Ok(Self {
            samples,
            class_names,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Decode one sample. Unreadable images surface the `image` error.
    pub fn get(&self, idx: usize) -> Result<(DynamicImage, usize)> {
        let (path, label) = self.samples.get(idx).ok_or_else(|| {
            anyhow::anyhow!(
                "index {} out of bounds, dataset has {} samples",
                idx,
                self.samples.len()
            )
        })?;

        let img = image::open(path)?;
        Ok((img, *label))
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg" | "png"))
        .unwrap_or(false)
}
