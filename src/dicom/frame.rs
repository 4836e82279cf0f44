//! Pixel frame extraction.
//!
//! Decoding is kept apart from selection: [`extract_frames`] decodes the
//! whole ordered sequence and stops at the first corrupt frame, reporting its
//! index; [`extract_first_frame`] picks the representative image from it.

use image::{DynamicImage, ImageBuffer, Luma, Rgb};

use super::dataset::PixelSource;
use super::tag::PIXEL_DATA;
use crate::error::{ExtractError, FrameError};

/// Storage width of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDepth {
    /// One byte per sample
    U8,
    /// Two bytes per sample, little-endian
    U16,
}

impl SampleDepth {
    #[inline]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleDepth::U8 => 1,
            SampleDepth::U16 => 2,
        }
    }

    #[inline]
    pub fn bits(self) -> u16 {
        match self {
            SampleDepth::U8 => 8,
            SampleDepth::U16 => 16,
        }
    }
}

/// A decoded two-dimensional raster.
///
/// The sample buffer always holds exactly
/// `width * height * samples_per_pixel * bytes_per_sample` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    samples_per_pixel: u16,
    depth: SampleDepth,
    data: Vec<u8>,
}

impl PixelFrame {
    /// Create a frame, checking the buffer length against the layout.
    pub fn new(
        width: u32,
        height: u32,
        samples_per_pixel: u16,
        depth: SampleDepth,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if samples_per_pixel != 1 && samples_per_pixel != 3 {
            return Err(FrameError::UnsupportedLayout { samples_per_pixel });
        }

        let expected = expected_len(width, height, samples_per_pixel, depth);
        if data.len() != expected {
            return Err(FrameError::Layout {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            samples_per_pixel,
            depth,
            data,
        })
    }

    /// Convert a decoded toolkit image into a frame.
    ///
    /// Grey and RGB images at 8 or 16 bits map directly; any other color type
    /// is converted to the closest of those.
    pub fn from_dynamic_image(image: DynamicImage) -> Result<Self, FrameError> {
        let (width, height) = (image.width(), image.height());

        match image {
            DynamicImage::ImageLuma8(buf) => {
                Self::new(width, height, 1, SampleDepth::U8, buf.into_raw())
            }
            DynamicImage::ImageLuma16(buf) => {
                Self::new(width, height, 1, SampleDepth::U16, le_bytes(buf.into_raw()))
            }
            DynamicImage::ImageRgb8(buf) => {
                Self::new(width, height, 3, SampleDepth::U8, buf.into_raw())
            }
            DynamicImage::ImageRgb16(buf) => {
                Self::new(width, height, 3, SampleDepth::U16, le_bytes(buf.into_raw()))
            }
            DynamicImage::ImageLumaA8(_) => {
                Self::new(width, height, 1, SampleDepth::U8, image.to_luma8().into_raw())
            }
            DynamicImage::ImageLumaA16(_) => Self::new(
                width,
                height,
                1,
                SampleDepth::U16,
                le_bytes(image.to_luma16().into_raw()),
            ),
            DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgb32F(_)
            | DynamicImage::ImageRgba32F(_) => Self::new(
                width,
                height,
                3,
                SampleDepth::U16,
                le_bytes(image.to_rgb16().into_raw()),
            ),
            other => Self::new(width, height, 3, SampleDepth::U8, other.to_rgb8().into_raw()),
        }
    }

    /// View the frame as an image for re-encoding.
    pub fn to_dynamic_image(&self) -> Result<DynamicImage, FrameError> {
        let layout_error = || FrameError::Layout {
            expected: self.expected_len(),
            actual: self.data.len(),
        };

        let image = match (self.samples_per_pixel, self.depth) {
            (1, SampleDepth::U8) => {
                ImageBuffer::<Luma<u8>, _>::from_raw(self.width, self.height, self.data.clone())
                    .map(DynamicImage::ImageLuma8)
            }
            (1, SampleDepth::U16) => {
                ImageBuffer::<Luma<u16>, _>::from_raw(self.width, self.height, self.samples_u16())
                    .map(DynamicImage::ImageLuma16)
            }
            (3, SampleDepth::U8) => {
                ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, self.data.clone())
                    .map(DynamicImage::ImageRgb8)
            }
            (3, SampleDepth::U16) => {
                ImageBuffer::<Rgb<u16>, _>::from_raw(self.width, self.height, self.samples_u16())
                    .map(DynamicImage::ImageRgb16)
            }
            (samples_per_pixel, _) => {
                return Err(FrameError::UnsupportedLayout { samples_per_pixel })
            }
        };

        image.ok_or_else(layout_error)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples_per_pixel(&self) -> u16 {
        self.samples_per_pixel
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    /// Raw sample buffer (16-bit samples are little-endian).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Buffer length implied by the declared layout.
    pub fn expected_len(&self) -> usize {
        expected_len(self.width, self.height, self.samples_per_pixel, self.depth)
    }

    fn samples_u16(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}

fn expected_len(width: u32, height: u32, samples_per_pixel: u16, depth: SampleDepth) -> usize {
    width as usize * height as usize * samples_per_pixel as usize * depth.bytes_per_sample()
}

fn le_bytes(samples: Vec<u16>) -> Vec<u8> {
    samples.into_iter().flat_map(u16::to_le_bytes).collect()
}

// =============================================================================
// Extraction
// =============================================================================

/// Decode every frame of the dataset's pixel data, in order.
///
/// Stops at the first frame that fails to decode and reports its index; no
/// partial list is returned.
pub fn extract_frames<D>(dataset: &D) -> Result<Vec<PixelFrame>, ExtractError>
where
    D: PixelSource + ?Sized,
{
    if !dataset.contains(PIXEL_DATA) {
        return Err(ExtractError::NoPixelData);
    }

    let count = dataset
        .frame_count()
        .map_err(|source| ExtractError::FrameDecode { index: 0, source })?;
    if count == 0 {
        return Err(ExtractError::FrameDecode {
            index: 0,
            source: FrameError::NoFrames,
        });
    }

    (0..count)
        .map(|index| {
            dataset
                .decode_frame(index)
                .map_err(|source| ExtractError::FrameDecode { index, source })
        })
        .collect()
}

/// Decode the pixel data and return the frame at position zero.
pub fn extract_first_frame<D>(dataset: &D) -> Result<PixelFrame, ExtractError>
where
    D: PixelSource + ?Sized,
{
    let frames = extract_frames(dataset)?;
    // extract_frames never yields an empty list
    frames.into_iter().next().ok_or(ExtractError::FrameDecode {
        index: 0,
        source: FrameError::NoFrames,
    })
}
