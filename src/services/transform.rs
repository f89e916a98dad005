use std::io::Cursor;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Pure image transformation: bytes in, bytes or failure out.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// Gaussian blur, re-encoded in the input's own format.
pub struct GaussianBlur {
    pub sigma: f32,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self { sigma: 10.0 }
    }
}

impl ImageTransform for GaussianBlur {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let format = image::guess_format(input).map_err(|_| TransformError::UnknownFormat)?;
        let img = image::load_from_memory_with_format(input, format)?;

        let blurred = img.blur(self.sigma);

        let mut out = Cursor::new(Vec::new());
        blurred.write_to(&mut out, format)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn blur_preserves_dimensions_and_format() {
        let input = png_fixture(32, 16);
        let output = GaussianBlur::default().apply(&input).unwrap();

        assert_eq!(image::guess_format(&output).unwrap(), image::ImageFormat::Png);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = GaussianBlur::default().apply(b"not an image").unwrap_err();
        assert!(matches!(err, TransformError::UnknownFormat));
    }
}
