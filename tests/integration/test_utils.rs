//! Test utilities for integration tests.
//!
//! Builds Part 10 DICOM files in memory and multipart upload bodies, so the
//! tests never depend on fixture files.

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use tempfile::TempDir;

use dicom_vault::{create_router, LocalFileStore, RouterConfig};

/// Institution name written into every generated file.
pub const INSTITUTION: &str = "General Hospital";

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "dicom-vault-test-boundary";

// =============================================================================
// DICOM Builders
// =============================================================================

/// Describes a generated DICOM file.
#[derive(Debug, Clone)]
pub struct DicomSpec {
    pub rows: u16,
    pub columns: u16,
    /// Bits stored per sample; up to 8 is written as 8-bit, above as 16-bit
    pub bits_stored: u16,
    /// One entry per frame, each `rows * columns` grey samples
    pub frames: Vec<Vec<u16>>,
    /// Write a NumberOfFrames attribute even for a single frame
    pub number_of_frames: Option<u32>,
    /// Window center and width, as written to the file
    pub window: Option<(&'static str, &'static str)>,
}

impl DicomSpec {
    /// A 2x2 single-frame monochrome image.
    pub fn single_frame() -> Self {
        Self {
            rows: 2,
            columns: 2,
            bits_stored: 8,
            frames: vec![vec![0, 64, 128, 255]],
            number_of_frames: None,
            window: None,
        }
    }

    /// Two 2x3 frames.
    pub fn multi_frame() -> Self {
        Self {
            rows: 2,
            columns: 3,
            bits_stored: 8,
            frames: vec![vec![0, 10, 20, 30, 40, 255], vec![255, 200, 150, 100, 50, 0]],
            number_of_frames: Some(2),
            window: None,
        }
    }

    /// A 2x2 frame of 12-bit samples in 16-bit words, with a narrow window.
    pub fn stored_12bit() -> Self {
        Self {
            rows: 2,
            columns: 2,
            bits_stored: 12,
            frames: vec![vec![0, 100, 1000, 4095]],
            number_of_frames: None,
            window: Some(("500", "200")),
        }
    }

    fn bits_allocated(&self) -> u16 {
        if self.bits_stored <= 8 {
            8
        } else {
            16
        }
    }
}

fn base_elements() -> Vec<DataElement<InMemDicomObject>> {
    vec![
        DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
        ),
        DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("2.25.1234567890"),
        ),
        DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("OT")),
        DataElement::new(tags::INSTITUTION_NAME, VR::LO, PrimitiveValue::from(INSTITUTION)),
        DataElement::new(tags::PATIENT_NAME, VR::PN, PrimitiveValue::from("Doe^Jane")),
    ]
}

fn pixel_elements(spec: &DicomSpec) -> Vec<DataElement<InMemDicomObject>> {
    let mut elements = vec![
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(spec.rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(spec.columns)),
        DataElement::new(
            tags::BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(spec.bits_allocated()),
        ),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(spec.bits_stored)),
        DataElement::new(
            tags::HIGH_BIT,
            VR::US,
            PrimitiveValue::from(spec.bits_stored - 1),
        ),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
    ];

    if let Some(count) = spec.number_of_frames {
        elements.push(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(count.to_string()),
        ));
    }

    if let Some((center, width)) = spec.window {
        elements.push(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from(center),
        ));
        elements.push(DataElement::new(
            tags::WINDOW_WIDTH,
            VR::DS,
            PrimitiveValue::from(width),
        ));
    }

    let samples = spec.frames.concat();
    let (vr, mut pixels) = if spec.bits_allocated() == 8 {
        (VR::OB, samples.iter().map(|&s| s as u8).collect::<Vec<u8>>())
    } else {
        (
            VR::OW,
            samples.iter().flat_map(|s| s.to_le_bytes()).collect::<Vec<u8>>(),
        )
    };
    if pixels.len() % 2 == 1 {
        pixels.push(0);
    }
    elements.push(DataElement::new(
        tags::PIXEL_DATA,
        vr,
        PrimitiveValue::from(pixels),
    ));

    elements
}

fn encode(elements: Vec<DataElement<InMemDicomObject>>) -> Vec<u8> {
    let object = InMemDicomObject::from_element_iter(elements);
    let file = object
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("2.25.1234567890"),
        )
        .expect("valid file meta");

    let mut out = Vec::new();
    file.write_all(&mut out).expect("encode DICOM file");
    out
}

/// A complete Part 10 file with header attributes and pixel data.
pub fn create_dicom_file(spec: &DicomSpec) -> Vec<u8> {
    let mut elements = base_elements();
    elements.extend(pixel_elements(spec));
    encode(elements)
}

/// A complete Part 10 file with header attributes but no pixel data.
pub fn create_dicom_without_pixels() -> Vec<u8> {
    encode(base_elements())
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Build a multipart/form-data body with one file field.
pub fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/dicom\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST request to `/upload` carrying `data` in field `field`.
pub fn upload_request(field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, file_name, data)))
        .unwrap()
}

/// GET request with an empty body.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A router backed by a fresh temporary storage directory.
///
/// The directory lives as long as the returned guard.
pub fn test_router() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalFileStore::new(dir.path().join("files"));
    let router = create_router(store, RouterConfig::new().with_tracing(false));
    (router, dir)
}

/// Check if data is a valid PNG (starts with the PNG signature).
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'])
}

/// Number of entries in a directory, zero if it does not exist.
pub fn count_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
