use image::DynamicImage;

/// ImageNet channel statistics, matching the normalization the backbone
/// weights were trained with.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Fixed deterministic transform: resize, RGB, CHW float, normalize.
#[derive(Debug, Clone)]
pub struct ImageTransform {
    pub img_size: usize,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl ImageTransform {
    pub fn new(img_size: usize) -> Self {
        Self {
            img_size,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    /// Produce the CHW float buffer for one image, length `3 * s * s`.
    pub fn apply(&self, img: &DynamicImage) -> Vec<f32> {
        let s = self.img_size;
        let resized = img.resize_exact(s as u32, s as u32, image::imageops::FilterType::Lanczos3);
        let rgb = resized.to_rgb8();

        let mut out = Vec::with_capacity(3 * s * s);
        for c in 0..3 {
            for y in 0..s {
                for x in 0..s {
                    let pixel = rgb.get_pixel(x as u32, y as u32);
                    let val = pixel[c] as f32 / 255.0;
                    out.push((val - self.mean[c]) / self.std[c]);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn normalizes_with_imagenet_stats() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([128, 128, 128])));
        let transform = ImageTransform::new(4);
        let buf = transform.apply(&img);

        assert_eq!(buf.len(), 3 * 4 * 4);

        let gray = 128.0 / 255.0;
        for c in 0..3 {
            let expected = (gray - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            let got = buf[c * 16];
            assert!(
                (got - expected).abs() < 1e-5,
                "channel {c}: {got} vs {expected}"
            );
        }
    }
}
