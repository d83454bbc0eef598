//! Grayscale conversion.
//!
//! Decodes whatever format the `image` crate recognises from the bytes, reduces
//! it to a single luminance channel and re-encodes it as JPEG. The work is CPU
//! bound, so the async entry point runs it on the blocking pool.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use lambda_runtime::tracing;

use crate::error::{HandlerError, Result};

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug)]
pub struct GrayscaleImage {
    /// JPEG encoded luminance image
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GrayscaleConverter {
    quality: u8,
}

impl GrayscaleConverter {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// Blocking conversion. Use [`GrayscaleConverter::convert_async`] from
    /// async code.
    pub fn convert(&self, original: &[u8]) -> Result<GrayscaleImage> {
        let img = image::load_from_memory(original).map_err(HandlerError::Decode)?;
        let (width, height) = img.dimensions();
        tracing::debug!(width, height, "Decoded source image");

        let gray = DynamicImage::ImageLuma8(img.to_luma8());

        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), self.quality);
        gray.write_with_encoder(encoder).map_err(HandlerError::Encode)?;

        Ok(GrayscaleImage {
            data: Bytes::from(buf),
            width,
            height,
        })
    }

    pub async fn convert_async(self, original: Bytes) -> Result<GrayscaleImage> {
        tokio::task::spawn_blocking(move || self.convert(&original)).await?
    }
}
