use crate::model::blocks::{BasicBlock, ConvBlock};
use burn::nn::pool::{
    AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig,
};
use burn::nn::PaddingConfig2d;
use burn::prelude::*;

/// ResNet-18 layout feature extractor: 7x7 stem, four residual stages,
/// global average pooling. Emits a `[batch, FEATURE_DIM]` embedding.
#[derive(Module, Debug)]
pub struct Backbone<B: Backend> {
    stem: ConvBlock<B>,
    maxpool: MaxPool2d,
    layer1: Vec<BasicBlock<B>>,
    layer2: Vec<BasicBlock<B>>,
    layer3: Vec<BasicBlock<B>>,
    layer4: Vec<BasicBlock<B>>,
    avgpool: AdaptiveAvgPool2d,
}

pub const FEATURE_DIM: usize = 512;

impl<B: Backend> Backbone<B> {
    pub fn new(device: &B::Device) -> Self {
        Self {
            stem: ConvBlock::new(device, 3, 64, 7, 2, 3),
            maxpool: MaxPool2dConfig::new([3, 3])
                .with_strides([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(),
            layer1: make_stage(device, 64, 64, 1),
            layer2: make_stage(device, 64, 128, 2),
            layer3: make_stage(device, 128, 256, 2),
            layer4: make_stage(device, 256, 512, 2),
            avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = self.maxpool.forward(self.stem.forward(x));

        for block in self
            .layer1
            .iter()
            .chain(&self.layer2)
            .chain(&self.layer3)
            .chain(&self.layer4)
        {
            x = block.forward(x);
        }

        let x = self.avgpool.forward(x);
        x.flatten(1, 3)
    }
}

fn make_stage<B: Backend>(
    device: &B::Device,
    in_channels: usize,
    out_channels: usize,
    stride: usize,
) -> Vec<BasicBlock<B>> {
    vec![
        BasicBlock::new(device, in_channels, out_channels, stride),
        BasicBlock::new(device, out_channels, out_channels, 1),
    ]
}
