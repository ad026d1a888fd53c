//! Frame type and small conversions.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, RgbImage};

use crate::error::VisionResult;

/// A decoded video frame, 8-bit RGB.
pub type Frame = RgbImage;

/// Encode a frame as JPEG.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> VisionResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        ColorType::Rgb8,
    )?;
    Ok(buf)
}

/// Resize to `(width, height)` unless the frame already has that size.
pub fn fit_resolution(frame: Frame, width: u32, height: u32) -> Frame {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        imageops::resize(&frame, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_produces_jfif() {
        let frame = Frame::new(16, 16);
        let bytes = encode_jpeg(&frame, 80).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_fit_resolution() {
        let frame = Frame::new(32, 24);
        assert_eq!(fit_resolution(frame.clone(), 32, 24).dimensions(), (32, 24));
        assert_eq!(fit_resolution(frame, 64, 48).dimensions(), (64, 48));
    }
}
