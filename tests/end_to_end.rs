use burn::backend::{Autodiff, NdArray};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

use dogbreed_classifier::data::ImageFolderDataset;
use dogbreed_classifier::model::BreedClassifier;
use dogbreed_classifier::training::{evaluate, DebugHook, Trainer, TrainingConfig};

type AB = Autodiff<NdArray>;

/// Two visually distinct classes, a handful of images per split.
fn write_toy_split(root: &Path, count_per_class: usize) {
    let classes: [(&str, [u8; 3]); 2] = [
        ("class_blue", [20, 40, 200]),
        ("class_red", [210, 30, 25]),
    ];

    for (name, base) in classes {
        let class_dir = root.join(name);
        fs::create_dir_all(&class_dir).unwrap();

        for i in 0..count_per_class {
            // Small per-image jitter so batches are not literally identical.
            let shade = Rgb([
                base[0].saturating_add(5 * i as u8),
                base[1],
                base[2].saturating_add(3 * i as u8),
            ]);
            RgbImage::from_pixel(32, 32, shade)
                .save(class_dir.join(format!("img_{i}.png")))
                .unwrap();
        }
    }
}

#[test]
fn toy_dataset_trains_and_writes_weights() {
    let dir = tempfile::tempdir().unwrap();
    let train_root = dir.path().join("train");
    let valid_root = dir.path().join("valid");
    let test_root = dir.path().join("test");
    write_toy_split(&train_root, 4);
    write_toy_split(&valid_root, 2);
    write_toy_split(&test_root, 2);

    let train_dataset = ImageFolderDataset::new(&train_root).unwrap();
    let valid_dataset = ImageFolderDataset::new(&valid_root).unwrap();
    let test_dataset = ImageFolderDataset::new(&test_root).unwrap();
    assert_eq!(train_dataset.len(), 8);
    assert_eq!(train_dataset.num_classes(), 2);

    let config = TrainingConfig {
        epochs: 2,
        batch_size: 2,
        test_batch_size: 2,
        num_classes: 2,
        img_size: 64,
        ..TrainingConfig::default()
    };

    let device = Default::default();
    let model = BreedClassifier::<AB>::new(&device, config.num_classes);

    let hook_dir = dir.path().join("hook");
    let mut hook = DebugHook::probe(Some(&hook_dir));
    assert!(hook.is_active());

    let mut trainer = Trainer::new(model, config, device);
    let summary = trainer
        .train(&train_dataset, &valid_dataset, &mut hook)
        .unwrap();
    assert!(summary.epochs_run >= 1 && summary.epochs_run <= 2);
    assert!(summary.best_val_loss.is_finite());

    let report = trainer.test(&test_dataset, &mut hook).unwrap();
    assert_eq!(report.samples, 4);
    assert!(report.avg_loss.is_finite());
    assert!((0.0..=100.0).contains(&report.accuracy));

    let model_dir = dir.path().join("model_out");
    let weights_path = trainer.save(&model_dir).unwrap();
    assert!(weights_path.exists(), "expected {}", weights_path.display());
    assert!(model_dir.join("config.json").exists());

    // The hook recorded per-batch losses for each phase.
    drop(hook);
    let recorded = fs::read_to_string(hook_dir.join("tensors.jsonl")).unwrap();
    assert!(recorded.lines().count() > 0);
    assert!(recorded.contains("\"train\""));
    assert!(recorded.contains("\"predict\""));

    // Reloading the saved weights reproduces the test-set evaluation.
    let eval_device = Default::default();
    let reloaded =
        BreedClassifier::<NdArray>::load(&eval_device, 2, &model_dir.join("model")).unwrap();
    let mut quiet_hook = DebugHook::disabled();
    let replay = evaluate(
        &reloaded,
        &test_dataset,
        2,
        64,
        &eval_device,
        &mut quiet_hook,
    )
    .unwrap();

    assert_eq!(replay.samples, report.samples);
    assert!(
        (replay.avg_loss - report.avg_loss).abs() < 1e-4,
        "reloaded loss {} vs original {}",
        replay.avg_loss,
        report.avg_loss
    );
}
