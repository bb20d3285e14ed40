use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::AutodiffBackend;
use clap::Parser;
use std::env;
use std::path::PathBuf;

use dogbreed_classifier::data::ImageFolderDataset;
use dogbreed_classifier::model::BreedClassifier;
use dogbreed_classifier::training::{DebugHook, Trainer, TrainingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Fine-tune a frozen-backbone image classifier on a class-per-folder dataset"
)]
struct Args {
    /// Number of epochs.
    #[arg(long, default_value_t = 2)]
    epochs: usize,

    /// Learning rate for the trainable head.
    #[arg(long, default_value_t = 0.001)]
    lr: f64,

    /// Training batch size.
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Batch size for validation and test passes.
    #[arg(long, default_value_t = 100)]
    test_batch_size: usize,

    /// Number of target classes.
    #[arg(long, default_value_t = 133)]
    num_classes: usize,

    /// Input resolution fed to the network.
    #[arg(long, default_value_t = 224)]
    img_size: usize,

    /// Training images, one directory per class (default: $SM_CHANNEL_TRAIN).
    #[arg(long)]
    train_dir: Option<PathBuf>,

    /// Validation images (default: $SM_CHANNEL_VALID).
    #[arg(long)]
    valid_dir: Option<PathBuf>,

    /// Test images (default: $SM_CHANNEL_TEST).
    #[arg(long)]
    test_dir: Option<PathBuf>,

    /// Output directory for the trained weights (default: $SM_MODEL_DIR).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Pretrained backbone weights to load before freezing.
    #[arg(long)]
    pretrained: Option<PathBuf>,

    /// Directory for scalar instrumentation output (default: $DEBUG_HOOK_DIR;
    /// unset disables recording).
    #[arg(long)]
    hook_dir: Option<PathBuf>,

    /// Use the GPU backend when this binary was built with it.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    gpu: bool,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    #[cfg(feature = "wgpu")]
    if args.gpu {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};
        return run::<Autodiff<Wgpu>>(&args, WgpuDevice::default());
    }

    #[cfg(not(feature = "wgpu"))]
    if args.gpu {
        log::warn!("GPU requested but this build has no wgpu backend, using CPU");
    }

    run::<Autodiff<NdArray>>(&args, Default::default())
}

fn run<B: AutodiffBackend>(args: &Args, device: B::Device) -> Result<()> {
    let train_dir = channel(args.train_dir.clone(), "SM_CHANNEL_TRAIN")?;
    let valid_dir = channel(args.valid_dir.clone(), "SM_CHANNEL_VALID")?;
    let test_dir = channel(args.test_dir.clone(), "SM_CHANNEL_TEST")?;
    let model_dir = channel(args.model_dir.clone(), "SM_MODEL_DIR")?;

    let config = TrainingConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        test_batch_size: args.test_batch_size,
        learning_rate: args.lr,
        num_classes: args.num_classes,
        img_size: args.img_size,
        ..TrainingConfig::default()
    };

    println!("🐕 Dog Breed Classifier Training");
    println!("================================\n");
    println!("Configuration:");
    println!("  Epochs: {}", config.epochs);
    println!("  Learning rate: {}", config.learning_rate);
    println!("  Batch size: {}", config.batch_size);
    println!("  Test batch size: {}", config.test_batch_size);
    println!("  Classes: {}", config.num_classes);
    println!("  Image size: {}x{}", config.img_size, config.img_size);
    println!("  Model dir: {}", model_dir.display());
    println!();

    let train_dataset = ImageFolderDataset::new(&train_dir)?;
    let valid_dataset = ImageFolderDataset::new(&valid_dir)?;
    let test_dataset = ImageFolderDataset::new(&test_dir)?;

    let model: BreedClassifier<B> = match &args.pretrained {
        Some(path) => {
            println!("Loading pretrained backbone from {}", path.display());
            BreedClassifier::with_pretrained(&device, config.num_classes, path)?
        }
        None => {
            log::warn!("no pretrained weights given, backbone is randomly initialized and frozen");
            BreedClassifier::new(&device, config.num_classes)
        }
    };

    let hook_dir = args
        .hook_dir
        .clone()
        .or_else(|| env::var("DEBUG_HOOK_DIR").ok().map(PathBuf::from));
    let mut hook = DebugHook::probe(hook_dir.as_deref());

    let mut trainer = Trainer::new(model, config, device);

    println!("🚀 Starting training...\n");
    let summary = trainer.train(&train_dataset, &valid_dataset, &mut hook)?;

    println!(
        "\nTraining finished after {} epoch(s), best validation loss {:.4}{}",
        summary.epochs_run,
        summary.best_val_loss,
        if summary.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );

    let report = trainer.test(&test_dataset, &mut hook)?;
    println!(
        "\nTest Loss: {:.4}, Accuracy: {}/{} ({:.2}%)\n",
        report.avg_loss, report.correct, report.samples, report.accuracy
    );

    trainer.save(&model_dir)?;

    Ok(())
}

fn channel(cli: Option<PathBuf>, var: &str) -> Result<PathBuf> {
    match cli {
        Some(path) => Ok(path),
        None => env::var(var)
            .map(PathBuf::from)
            .with_context(|| format!("{var} is not set and no corresponding flag was given")),
    }
}
