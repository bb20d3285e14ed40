use burn::backend::{Autodiff, NdArray};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::GradientsParams;
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::Distribution;

use dogbreed_classifier::model::BreedClassifier;

type B = NdArray;
type AB = Autodiff<NdArray>;

#[test]
fn head_emits_one_score_per_class() {
    let device = Default::default();
    let model = BreedClassifier::<B>::new(&device, 133);

    let images = Tensor::<B, 4>::random([2, 3, 64, 64], Distribution::Default, &device);
    let logits = model.forward(images);

    assert_eq!(logits.dims(), [2, 133]);
}

#[test]
fn only_head_parameters_receive_gradients() {
    let device = Default::default();
    let model = BreedClassifier::<AB>::new(&device, 5);

    let images = Tensor::<AB, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let targets = Tensor::<AB, 1, Int>::from_ints([0, 3], &device);

    let logits = model.forward(images);
    let loss = CrossEntropyLossConfig::new()
        .init(&device)
        .forward(logits, targets);

    let grads = GradientsParams::from_grads(loss.backward(), &model);

    // The frozen backbone contributes nothing; the linear head has exactly
    // a weight and a bias.
    assert_eq!(grads.len(), 2);
}

#[test]
fn saved_weights_reproduce_identical_outputs() {
    let device = Default::default();
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("model");

    let model = BreedClassifier::<B>::new(&device, 7);
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(model.clone().into_record(), weights.clone())
        .unwrap();

    let reloaded = BreedClassifier::<B>::load(&device, 7, &weights).unwrap();

    let images = Tensor::<B, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let out_original = model.forward(images.clone());
    let out_reloaded = reloaded.forward(images);

    assert_eq!(out_original.into_data(), out_reloaded.into_data());
}
