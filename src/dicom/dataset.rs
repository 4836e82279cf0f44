//! Dataset provider.
//!
//! The resolver and the frame extractor only see the [`Dataset`] and
//! [`PixelSource`] capabilities. [`DicomDataset`] implements both on top of
//! `dicom-object` (parsing) and `dicom-pixeldata` (frame decoding).

use std::path::Path;

use dicom_object::DefaultDicomObject;
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption};

use super::frame::PixelFrame;
use super::tag::{Tag, NUMBER_OF_FRAMES, PIXEL_DATA};
use crate::error::{DatasetParseError, FrameError};

/// Length of the Part 10 preamble that precedes the `DICM` magic code.
const PREAMBLE_LEN: usize = 128;

/// Part 10 magic code.
const MAGIC: &[u8; 4] = b"DICM";

/// A parsed collection of elements, each keyed by a unique tag.
pub trait Dataset {
    /// Textual rendering of the value of the element with this tag, or `None`
    /// if the dataset holds no such element.
    fn element_value(&self, tag: Tag) -> Option<String>;

    /// Whether the dataset holds an element with this tag.
    fn contains(&self, tag: Tag) -> bool {
        self.element_value(tag).is_some()
    }
}

/// Access to the encoded frames of a dataset's pixel data.
pub trait PixelSource: Dataset {
    /// Number of frames in the pixel data.
    fn frame_count(&self) -> Result<u32, FrameError>;

    /// Decode the frame at `index` into a raster.
    fn decode_frame(&self, index: u32) -> Result<PixelFrame, FrameError>;
}

// =============================================================================
// DicomDataset
// =============================================================================

/// A DICOM file parsed by the toolkit.
#[derive(Debug, Clone)]
pub struct DicomDataset {
    object: DefaultDicomObject,
}

impl DicomDataset {
    /// Wrap an already parsed object.
    pub fn new(object: DefaultDicomObject) -> Self {
        Self { object }
    }

    /// Parse a DICOM file held in memory.
    ///
    /// Accepts both a full Part 10 file (preamble + `DICM`) and a stream that
    /// starts directly at the magic code.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatasetParseError> {
        let body = if bytes.len() >= PREAMBLE_LEN + MAGIC.len()
            && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC
        {
            &bytes[PREAMBLE_LEN..]
        } else if bytes.starts_with(MAGIC) {
            bytes
        } else {
            return Err(DatasetParseError::NotDicom);
        };

        let object = dicom_object::from_reader(body)
            .map_err(|e| DatasetParseError::Malformed(e.to_string()))?;

        Ok(Self::new(object))
    }

    /// Read and parse a DICOM file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| DatasetParseError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// The underlying toolkit object.
    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }
}

impl Dataset for DicomDataset {
    fn element_value(&self, tag: Tag) -> Option<String> {
        let element = self.object.element(tag.into()).ok()?;
        let rendered = match element.to_str() {
            Ok(text) => text.into_owned(),
            // Sequences and encapsulated pixel data have no textual form
            Err(_) => format!("<{} value>", element.vr()),
        };
        Some(rendered)
    }

    fn contains(&self, tag: Tag) -> bool {
        self.object.element(tag.into()).is_ok()
    }
}

impl PixelSource for DicomDataset {
    fn frame_count(&self) -> Result<u32, FrameError> {
        if !self.contains(PIXEL_DATA) {
            return Ok(0);
        }
        match self.object.element(NUMBER_OF_FRAMES.into()) {
            Ok(element) => element.to_int::<u32>().map_err(|e| {
                FrameError::Codec(format!("invalid Number of Frames: {}", e))
            }),
            Err(_) => Ok(1),
        }
    }

    fn decode_frame(&self, index: u32) -> Result<PixelFrame, FrameError> {
        let decoded = self
            .object
            .decode_pixel_data_frame(index)
            .map_err(|e| FrameError::Codec(e.to_string()))?;

        // The decoded buffer holds this frame only
        let image = decoded
            .to_dynamic_image_with_options(0, &stored_sample_options())
            .map_err(|e| FrameError::Codec(e.to_string()))?;

        PixelFrame::from_dynamic_image(image)
    }
}

/// Conversion that keeps stored sample values: no rescale, no windowing.
fn stored_sample_options() -> ConvertOptions {
    ConvertOptions::new()
        .with_modality_lut(ModalityLutOption::None)
        .with_voi_lut(VoiLutOption::Identity)
}

// =============================================================================
// In-memory dataset for tests
// =============================================================================
