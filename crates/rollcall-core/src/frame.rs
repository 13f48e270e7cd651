use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;

/// Canvas size used when the camera has not produced a sized frame yet.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("invalid jpeg quality: {0} (expected 1-100)")]
    InvalidQuality(u8),
    #[error("jpeg encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Black frame at the default capture size.
pub fn blank_frame() -> RgbImage {
    RgbImage::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
}

/// Encode a captured frame as the JPEG payload posted to the service.
///
/// `None` or a zero-sized frame (camera not warmed up) encodes a blank
/// default-size canvas instead.
pub fn encode_jpeg(frame: Option<&RgbImage>, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if !(1..=100).contains(&quality) {
        return Err(EncodeError::InvalidQuality(quality));
    }

    let blank;
    let frame = match frame {
        Some(f) if f.width() > 0 && f.height() > 0 => f,
        _ => {
            blank = blank_frame();
            &blank
        }
    };

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(frame)?;
    Ok(buf)
}
