use enum_dispatch::enum_dispatch;
use image::imageops::{crop_imm, resize, FilterType};
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::tract_ndarray::{self, Array, Ix4};
use tract_onnx::prelude::Tensor;

use super::ImageTransformResult;
use super::{FilterOption, ImageSize};

#[enum_dispatch]
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ImageTransform {
    ResizeRgbImage(ResizeRgbImage),
    FitRgbImage(FitRgbImage),
    CenterCrop(CenterCrop),
    Normalization(Normalization),
    Transpose(Transpose),
    ToArray(ToArray),
    ToTensor(ToTensor),
}

#[enum_dispatch(ImageTransform)]
pub trait GenericTransform {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str>;
}

/// Stretches the image to exactly `image_size`, ignoring the aspect ratio.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ResizeRgbImage {
    pub image_size: ImageSize,
    #[serde(with = "FilterOption")]
    pub filter: FilterType,
}

impl GenericTransform for ResizeRgbImage {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(image) => Ok(resize(
                &image,
                self.image_size.width as u32,
                self.image_size.height as u32,
                self.filter,
            )
            .into()),
            ImageTransformResult::Tensor(_) => Err("Image resize not implemented for Tensor"),
            ImageTransformResult::Array4(_) => Err("Image resize not implemented for Array4"),
        }
    }
}

/// Crops the largest centered region with the target aspect ratio, then
/// resizes it to `image_size`. Nothing is padded and nothing is stretched.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FitRgbImage {
    pub image_size: ImageSize,
    #[serde(with = "FilterOption")]
    pub filter: FilterType,
}

impl FitRgbImage {
    /// Region `(left, top, width, height)` of a `width x height` source
    /// that gets kept.
    pub fn crop_region(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let target_ratio = self.image_size.width as f64 / self.image_size.height as f64;
        let source_ratio = width as f64 / height as f64;

        let (crop_width, crop_height) = if source_ratio > target_ratio {
            ((height as f64 * target_ratio).round() as u32, height)
        } else {
            (width, (width as f64 / target_ratio).round() as u32)
        };
        let crop_width = crop_width.clamp(1, width);
        let crop_height = crop_height.clamp(1, height);

        (
            (width - crop_width) / 2,
            (height - crop_height) / 2,
            crop_width,
            crop_height,
        )
    }
}

impl GenericTransform for FitRgbImage {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(image) => {
                let (width, height) = image.dimensions();
                if width == 0 || height == 0 {
                    return Err("Cannot fit an empty image");
                }
                let (left, top, crop_width, crop_height) = self.crop_region(width, height);
                let cropped = crop_imm(&image, left, top, crop_width, crop_height).to_image();
                Ok(resize(
                    &cropped,
                    self.image_size.width as u32,
                    self.image_size.height as u32,
                    self.filter,
                )
                .into())
            }
            ImageTransformResult::Tensor(_) => Err("Image fit not implemented for Tensor"),
            ImageTransformResult::Array4(_) => Err("Image fit not implemented for Array4"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CenterCrop {
    pub crop_size: ImageSize,
}

impl GenericTransform for CenterCrop {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(image) => {
                let (width, height) = image.dimensions();
                let crop_width = self.crop_size.width as u32;
                let crop_height = self.crop_size.height as u32;
                if crop_width > width || crop_height > height {
                    return Err("Crop size exceeds image size");
                }
                let left = (width - crop_width) / 2;
                let top = (height - crop_height) / 2;
                Ok(crop_imm(&image, left, top, crop_width, crop_height)
                    .to_image()
                    .into())
            }
            ImageTransformResult::Tensor(_) => Err("Image crop not implemented for Tensor"),
            ImageTransformResult::Array4(_) => Err("Image crop not implemented for Array4"),
        }
    }
}

/// Per-channel `(x - sub) / div` on a channels-last array. With `zeroone`
/// the values are first scaled from [0, 255] to [0, 1].
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Normalization {
    pub sub: [f32; 3],
    pub div: [f32; 3],
    pub zeroone: bool,
}

impl Normalization {
    /// Maps [0, 255] onto [-1, 1].
    pub fn symmetric() -> Self {
        Normalization {
            sub: [127.5; 3],
            div: [127.5; 3],
            zeroone: false,
        }
    }
}

impl GenericTransform for Normalization {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(_) => Err("Normalization expects an Array4"),
            ImageTransformResult::Tensor(_) => Err("Normalization expects an Array4"),
            ImageTransformResult::Array4(arr) => {
                if arr.shape()[3] != 3 {
                    return Err("Normalization expects channels-last input");
                }
                let sub = Array::from_shape_vec((1, 1, 1, 3), self.sub.to_vec())
                    .map_err(|_| "Wrong conversion to array")?;
                let div = Array::from_shape_vec((1, 1, 1, 3), self.div.to_vec())
                    .map_err(|_| "Wrong conversion to array")?;
                let new_arr = if self.zeroone {
                    (arr / 255.0 - sub) / div
                } else {
                    (arr - sub) / div
                };
                Ok(ImageTransformResult::Array4(new_arr))
            }
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Transpose {
    pub axes: [usize; 4],
}

impl GenericTransform for Transpose {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(_) => Err("Transpose expects an Array4 or Tensor"),
            ImageTransformResult::Array4(arr) => {
                let mut seen = [false; 4];
                for &axis in &self.axes {
                    if axis >= 4 || seen[axis] {
                        return Err("Transpose axes must be a permutation of 0..4");
                    }
                    seen[axis] = true;
                }
                // owned copy so later steps see a standard layout
                let arr = arr.permuted_axes(self.axes).as_standard_layout().to_owned();
                Ok(ImageTransformResult::Array4(arr))
            }
            ImageTransformResult::Tensor(tensor) => {
                let tensor = tensor
                    .permute_axes(&self.axes)
                    .map_err(|_| "Transpose should match the shape of the tensor")?;
                Ok(ImageTransformResult::Tensor(tensor))
            }
        }
    }
}

/// Converts an image into a `[1, H, W, 3]` array of raw pixel values.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct ToArray {}

impl GenericTransform for ToArray {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(image) => {
                let (width, height) = image.dimensions();
                let arr = tract_ndarray::Array4::from_shape_fn(
                    (1_usize, height as usize, width as usize, 3_usize),
                    |(_, y, x, c)| image[(x as _, y as _)][c] as f32,
                );
                Ok(ImageTransformResult::Array4(arr))
            }
            ImageTransformResult::Tensor(tensor) => {
                let dyn_arr = tensor
                    .into_array::<f32>()
                    .map_err(|_| "Cannot convert tensor to Array4")?;
                let arr4 = dyn_arr
                    .into_dimensionality::<Ix4>()
                    .map_err(|_| "Cannot convert dynamic Array to Array4")?;
                Ok(ImageTransformResult::Array4(arr4))
            }
            // already an array
            ImageTransformResult::Array4(arr4) => Ok(ImageTransformResult::Array4(arr4)),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct ToTensor {}

impl GenericTransform for ToTensor {
    fn transform(&self, input: ImageTransformResult) -> Result<ImageTransformResult, &'static str> {
        match input {
            ImageTransformResult::RgbImage(image) => {
                let (width, height) = image.dimensions();
                let tensor: Tensor = tract_ndarray::Array4::from_shape_fn(
                    (1_usize, height as usize, width as usize, 3_usize),
                    |(_, y, x, c)| image[(x as _, y as _)][c] as f32,
                )
                .into();
                Ok(ImageTransformResult::Tensor(tensor))
            }
            // already a tensor
            ImageTransformResult::Tensor(tensor) => Ok(ImageTransformResult::Tensor(tensor)),
            ImageTransformResult::Array4(arr4) => Ok(ImageTransformResult::Tensor(arr4.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn solid(width: u32, height: u32, pixel: [u8; 3]) -> RgbImage {
        ImageBuffer::from_pixel(width, height, Rgb(pixel))
    }

    fn fit(side: usize) -> FitRgbImage {
        FitRgbImage {
            image_size: ImageSize::square(side),
            filter: FilterType::Lanczos3,
        }
    }

    #[test]
    fn fit_crops_wide_images_to_centered_square() {
        assert_eq!(fit(224).crop_region(400, 200), (100, 0, 200, 200));
        assert_eq!(fit(224).crop_region(200, 400), (0, 100, 200, 200));
        assert_eq!(fit(224).crop_region(50, 50), (0, 0, 50, 50));
    }

    #[test]
    fn fit_keeps_the_center_of_the_image() {
        // left half black, right half white: a centered square crop keeps both halves
        let mut image = solid(300, 100, [0, 0, 0]);
        for x in 150..300 {
            for y in 0..100 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let out = match fit(10).transform(image.into()).unwrap() {
            ImageTransformResult::RgbImage(out) => out,
            _ => panic!("fit should produce an image"),
        };
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.get_pixel(0, 5)[0] < 20);
        assert!(out.get_pixel(9, 5)[0] > 235);
    }

    #[test]
    fn to_array_is_channels_last() {
        let mut image = solid(4, 2, [0, 0, 0]);
        image.put_pixel(3, 1, Rgb([10, 20, 30]));
        let arr = match (ToArray {}).transform(image.into()).unwrap() {
            ImageTransformResult::Array4(arr) => arr,
            _ => panic!("expected an array"),
        };
        assert_eq!(arr.shape(), &[1, 2, 4, 3]);
        assert_eq!(arr[[0, 1, 3, 0]], 10.0);
        assert_eq!(arr[[0, 1, 3, 1]], 20.0);
        assert_eq!(arr[[0, 1, 3, 2]], 30.0);
    }

    #[test]
    fn symmetric_normalization_maps_to_unit_range() {
        let mut image = solid(2, 1, [0, 0, 0]);
        image.put_pixel(1, 0, Rgb([255, 255, 255]));
        let arr = ToArray {}.transform(image.into()).unwrap();
        let arr = match Normalization::symmetric().transform(arr).unwrap() {
            ImageTransformResult::Array4(arr) => arr,
            _ => panic!("expected an array"),
        };
        assert_eq!(arr[[0, 0, 0, 0]], -1.0);
        assert_eq!(arr[[0, 0, 1, 2]], 1.0);
    }

    #[test]
    fn zeroone_normalization_scales_first() {
        let image = solid(1, 1, [255, 0, 51]);
        let arr = ToArray {}.transform(image.into()).unwrap();
        let norm = Normalization {
            sub: [0.5; 3],
            div: [0.5; 3],
            zeroone: true,
        };
        let arr = match norm.transform(arr).unwrap() {
            ImageTransformResult::Array4(arr) => arr,
            _ => panic!("expected an array"),
        };
        assert!((arr[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((arr[[0, 0, 0, 1]] + 1.0).abs() < 1e-6);
        assert!((arr[[0, 0, 0, 2]] + 0.6).abs() < 1e-6);
    }

    #[test]
    fn transpose_moves_channels_first() {
        let arr = ToArray {}
            .transform(solid(5, 3, [1, 2, 3]).into())
            .unwrap();
        let arr = match (Transpose { axes: [0, 3, 1, 2] }).transform(arr).unwrap() {
            ImageTransformResult::Array4(arr) => arr,
            _ => panic!("expected an array"),
        };
        assert_eq!(arr.shape(), &[1, 3, 3, 5]);
        assert_eq!(arr[[0, 2, 1, 1]], 3.0);
    }

    #[test]
    fn transpose_rejects_bad_axes() {
        let arr = ToArray {}.transform(solid(1, 1, [0; 3]).into()).unwrap();
        assert!((Transpose { axes: [0, 0, 1, 2] }).transform(arr).is_err());
    }

    #[test]
    fn center_crop_rejects_oversized_crop() {
        let crop = CenterCrop {
            crop_size: ImageSize::square(20),
        };
        assert!(crop.transform(solid(10, 30, [0; 3]).into()).is_err());
        let out = crop.transform(solid(30, 30, [0; 3]).into()).unwrap();
        assert_eq!(out.shape(), vec![20, 20, 3]);
    }

    #[test]
    fn image_steps_reject_arrays() {
        let arr = ToArray {}.transform(solid(2, 2, [0; 3]).into()).unwrap();
        assert!(fit(2).transform(arr).is_err());
    }

    #[test]
    fn steps_deserialize_from_tagged_json() {
        let steps: Vec<ImageTransform> = serde_json::from_str(
            r#"[
                {"step": "fit_rgb_image", "image_size": {"width": 128, "height": 128}, "filter": "CatmullRom"},
                {"step": "to_array"},
                {"step": "normalization", "sub": [0.5, 0.5, 0.5], "div": [0.5, 0.5, 0.5], "zeroone": true},
                {"step": "transpose", "axes": [0, 3, 1, 2]},
                {"step": "to_tensor"}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 5);
        assert!(matches!(steps[0], ImageTransform::FitRgbImage(_)));
        assert!(matches!(steps[3], ImageTransform::Transpose(_)));
    }
}
