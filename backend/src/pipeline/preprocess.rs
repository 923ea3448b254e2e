use image::DynamicImage;
use image::imageops::{self, FilterType};
use ndarray::Array4;

use super::PipelineError;
use crate::model::INPUT_CHANNELS;

/// Decodes uploaded bytes, sniffing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    image::load_from_memory(bytes).map_err(PipelineError::InvalidImage)
}

/// Converts `image` to 8-bit RGB, stretches it to `size`x`size` and lays it out as a
/// `(1, size, size, 3)` tensor.
///
/// Aspect ratio is not preserved and pixel values stay in `0.0..=255.0`.
pub fn to_tensor(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, size, size, FilterType::CatmullRom);
    let side = size as usize;
    Array4::from_shape_fn((1, side, side, INPUT_CHANNELS), |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba};
    use std::io::Cursor;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn wide_image_is_stretched_to_both_model_resolutions() {
        let image = gradient(100, 50);

        assert_eq!(to_tensor(&image, 224).shape(), &[1, 224, 224, 3]);
        assert_eq!(to_tensor(&image, 256).shape(), &[1, 256, 256, 3]);
    }

    #[test]
    fn pixel_values_are_not_rescaled() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([255, 0, 128])));
        let tensor = to_tensor(&image, 4);

        assert_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_eq!(tensor[[0, 3, 3, 1]], 0.0);
        assert_eq!(tensor[[0, 2, 1, 2]], 128.0);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(3, 3, Rgba([10, 20, 30, 255])));
        let tensor = to_tensor(&image, 2);

        assert_eq!(tensor.shape(), &[1, 2, 2, 3]);
        assert_eq!(tensor[[0, 1, 1, 2]], 30.0);
    }

    #[test]
    fn transparent_pixels_keep_their_colour() {
        let image =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(5, 5, Rgba([200, 100, 50, 0])));
        let tensor = to_tensor(&image, 3);

        assert_eq!(tensor[[0, 1, 1, 0]], 200.0);
        assert_eq!(tensor[[0, 1, 1, 1]], 100.0);
        assert_eq!(tensor[[0, 1, 1, 2]], 50.0);
    }

    #[test]
    fn sixteen_bit_images_are_narrowed_before_resizing() {
        let image =
            DynamicImage::ImageRgb16(ImageBuffer::from_pixel(6, 6, Rgb([25700u16, 0, 65535])));
        let tensor = to_tensor(&image, 4);

        assert_eq!(tensor[[0, 2, 2, 0]], 100.0);
        assert_eq!(tensor[[0, 2, 2, 1]], 0.0);
        assert_eq!(tensor[[0, 2, 2, 2]], 255.0);
    }

    #[test]
    fn decodes_png_and_jpeg_uploads() {
        let image = gradient(100, 50);

        let png = decode_image(&encode(&image, ImageFormat::Png)).unwrap();
        assert_eq!((png.width(), png.height()), (100, 50));

        let jpeg = decode_image(&encode(&image, ImageFormat::Jpeg)).unwrap();
        assert_eq!((jpeg.width(), jpeg.height()), (100, 50));
    }

    #[test]
    fn undecodable_bytes_are_an_invalid_image() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage(_)));
    }

    #[test]
    fn truncated_png_is_an_invalid_image() {
        let bytes = encode(&gradient(20, 20), ImageFormat::Png);
        let err = decode_image(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage(_)));
    }
}
