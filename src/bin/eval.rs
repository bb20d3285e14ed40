use anyhow::{Context, Result};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::NdArray;
use clap::Parser;
use std::env;
use std::path::PathBuf;

use dogbreed_classifier::data::ImageFolderDataset;
use dogbreed_classifier::model::BreedClassifier;
use dogbreed_classifier::training::{evaluate, DebugHook};

/// Re-run the forward-only test pass against previously saved weights.
#[derive(Parser, Debug)]
#[command(name = "eval", about = "Evaluate saved classifier weights on a test set")]
struct Args {
    /// Directory holding model.bin and config.json (default: $SM_MODEL_DIR).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Test images, one directory per class (default: $SM_CHANNEL_TEST).
    #[arg(long)]
    test_dir: Option<PathBuf>,

    /// Evaluation batch size.
    #[arg(long, default_value_t = 100)]
    test_batch_size: usize,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let model_dir = channel(args.model_dir.clone(), "SM_MODEL_DIR")?;
    let test_dir = channel(args.test_dir.clone(), "SM_CHANNEL_TEST")?;

    type MyBackend = NdArray;
    let device = NdArrayDevice::default();

    // Architecture knobs come from the sidecar written at save time.
    let config_path = model_dir.join("config.json");
    let config_content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("cannot read {}", config_path.display()))?;
    let config: serde_json::Value = serde_json::from_str(&config_content)?;

    let num_classes = config["num_classes"].as_u64().unwrap_or(133) as usize;
    let img_size = config["img_size"].as_u64().unwrap_or(224) as usize;

    println!("Loading model from {}", model_dir.display());
    println!("  Classes: {}", num_classes);
    println!("  Image size: {}", img_size);

    let model =
        BreedClassifier::<MyBackend>::load(&device, num_classes, &model_dir.join("model"))?;

    let test_dataset = ImageFolderDataset::new(&test_dir)?;
    println!("Test set: {} images", test_dataset.len());

    let mut hook = DebugHook::disabled();
    let report = evaluate(
        &model,
        &test_dataset,
        args.test_batch_size,
        img_size,
        &device,
        &mut hook,
    )?;

    println!(
        "\nTest Loss: {:.4}, Accuracy: {}/{} ({:.2}%)\n",
        report.avg_loss, report.correct, report.samples, report.accuracy
    );

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
