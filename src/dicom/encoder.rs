//! PNG frame encoder.
//!
//! Hands a decoded [`PixelFrame`] to the PNG codec. PNG keeps 16-bit grey and
//! RGB samples as they are, so the re-encoding is lossless.

use bytes::Bytes;
use image::codecs::png::PngEncoder;

use super::frame::PixelFrame;
use crate::error::EncodeError;

/// MIME type of the encoder output.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Encodes frames into PNG byte streams.
#[derive(Debug, Clone, Default)]
pub struct PngFrameEncoder {}

impl PngFrameEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a frame as a complete PNG stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be viewed as a raster image or if
    /// the codec fails.
    pub fn encode(&self, frame: &PixelFrame) -> Result<Bytes, EncodeError> {
        let image = frame.to_dynamic_image()?;

        let mut output = Vec::new();
        image
            .write_with_encoder(PngEncoder::new(&mut output))
            .map_err(|e| EncodeError::Codec {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}
