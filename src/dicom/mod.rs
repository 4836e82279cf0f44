//! DICOM attribute and pixel data access.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────┐
//! │  Attribute Resolver  │      │  Pixel Frame Extractor   │
//! │ (specifier → value)  │      │  (pixel data → frames)   │
//! └──────────┬───────────┘      └────────────┬─────────────┘
//!            │                               │
//!            ▼                               ▼
//! ┌──────────────────────┐      ┌──────────────────────────┐
//! │   Tag Dictionary     │      │    PixelSource trait     │
//! │ (tag → name)         │      │  (frame count / decode)  │
//! └──────────────────────┘      └────────────┬─────────────┘
//!                                            │
//!                         ┌──────────────────┴─────────────┐
//!                         │  Dataset trait / DicomDataset  │
//!                         │  (dicom-object, dicom-pixeldata)│
//!                         └────────────────────────────────┘
//! ```
//!
//! Decoded frames go to [`PngFrameEncoder`] for hand-off to HTTP clients.

mod dataset;
mod dictionary;
mod encoder;
mod frame;
mod resolver;
mod tag;

pub use dataset::{Dataset, DicomDataset, PixelSource};
pub use dictionary::{AttributeDictionary, StandardTagDictionary, TagDictionary, TagDictionaryEntry};
pub use encoder::{PngFrameEncoder, PNG_CONTENT_TYPE};
pub use frame::{extract_first_frame, extract_frames, PixelFrame, SampleDepth};
pub use resolver::{parse_tag_specifier, resolve, resolve_with, AttributeResult};
pub use tag::{Tag, INSTITUTION_NAME, NUMBER_OF_FRAMES, PIXEL_DATA};
