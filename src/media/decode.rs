//! Decoding fetched bytes into the classifier's pixel layout.

use image::RgbImage;

use crate::error::DecodeError;

/// An in-memory 3-channel, 8-bit raster image.
#[derive(Debug, Clone)]
pub struct DecodedImage(RgbImage);

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.0
    }
}

/// Decode any supported raster format and convert it to RGB8.
///
/// Alpha is dropped and grayscale is expanded; the format is sniffed from
/// the bytes, not from the locator's extension.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(DecodedImage(img.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn png_decodes_to_rgb() {
        let bytes = encode(DynamicImage::new_rgb8(8, 6), ImageFormat::Png);
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn grayscale_is_expanded() {
        let bytes = encode(DynamicImage::new_luma8(3, 3), ImageFormat::Png);
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.as_rgb().get_pixel(1, 1).0.len(), 3);
    }

    #[test]
    fn empty_bytes_rejected() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn garbage_bytes_rejected() {
        let err = decode_image(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported(_)));
    }

    #[test]
    fn truncated_png_rejected() {
        let bytes = encode(DynamicImage::new_rgb8(16, 16), ImageFormat::Png);
        assert!(decode_image(&bytes[..bytes.len() / 2]).is_err());
    }
}
