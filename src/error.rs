use thiserror::Error;

use crate::dicom::Tag;

/// Errors from parsing the canonical `(GGGG,EEEE)` text form of a tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    /// Missing parentheses, wrong digit count, or stray characters
    #[error("Invalid tag text: expected (GGGG,EEEE), got {0:?}")]
    Syntax(String),
}

/// Errors raised while building an attribute dictionary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    /// The same tag was registered twice
    #[error("Duplicate dictionary entry for tag {0}")]
    DuplicateTag(Tag),
}

/// Which half of a tag specifier failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagComponent {
    Group,
    Element,
}

impl std::fmt::Display for TagComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagComponent::Group => f.write_str("group"),
            TagComponent::Element => f.write_str("element"),
        }
    }
}

/// Errors from resolving a header attribute by tag specifier.
///
/// Each variant corresponds to one stage of the resolution pipeline, so
/// callers can tell bad input apart from a tag the dictionary does not know
/// and from a known attribute that is absent in this particular file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The specifier was the empty string
    #[error("Empty tag specifier, a tag of the form (xxxx,yyyy) is expected")]
    EmptySpecifier,

    /// The specifier did not split into exactly two non-empty components
    #[error(
        "Invalid number of values in tag specifier, (xxxx,yyyy) is expected, got: {specifier}"
    )]
    MalformedSpecifier { specifier: String },

    /// A component is not a base-16 number that fits in 16 bits
    #[error("Invalid tag {component} found, expected hexadecimal values, got: {raw}")]
    InvalidTagComponent { component: TagComponent, raw: String },

    /// The tag is well formed but not in the dictionary
    #[error("Invalid tag {specifier} was requested: not present in the data dictionary")]
    UnknownTag { specifier: String },

    /// The dictionary knows the tag but the dataset has no such element
    #[error("No DICOM element was found for the {name} tag {specifier}")]
    ElementNotFound { name: String, specifier: String },
}

/// Errors decoding a single pixel data frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The pixel codec rejected the frame
    #[error("Pixel codec error: {0}")]
    Codec(String),

    /// The pixel data element does not hold any frame
    #[error("Pixel data holds no frames")]
    NoFrames,

    /// Sample buffer length does not match the declared dimensions
    #[error("Sample buffer holds {actual} bytes, {expected} expected for the declared layout")]
    Layout { expected: usize, actual: usize },

    /// Samples per pixel outside of what the raster type supports
    #[error("Unsupported sample layout: {samples_per_pixel} samples per pixel")]
    UnsupportedLayout { samples_per_pixel: u16 },
}

/// Errors from extracting frames out of a dataset's pixel data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The dataset has no Pixel Data element
    #[error("No DICOM Pixel Data was found")]
    NoPixelData,

    /// Frame `index` failed to decode; later frames were not attempted
    #[error("Could not decode frame {index}: {source}")]
    FrameDecode {
        index: u32,
        #[source]
        source: FrameError,
    },
}

/// Errors from re-encoding a frame into an interchange image format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The frame could not be viewed as a raster image
    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),

    /// The image codec failed
    #[error("Image encoding failed: {message}")]
    Codec { message: String },
}

/// Errors raised by the dataset provider while parsing a byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetParseError {
    /// The `DICM` magic code is missing
    #[error("File is not a DICOM file: missing DICM magic code")]
    NotDicom,

    /// The toolkit could not parse the file meta group or the dataset
    #[error("File is invalid DICOM file - {0}")]
    Malformed(String),

    /// The file could not be read from disk
    #[error("Could not read DICOM file {path}: {message}")]
    Io { path: String, message: String },
}

/// Reason a store operation did not write the full stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteFailure {
    /// Reading the source or writing the destination failed midway
    #[error("copy failed after {written} bytes: {message}")]
    Copy { written: u64, message: String },

    /// The stream ended (or ran on) at a different length than declared
    #[error("wrote {written} bytes but {declared} were declared")]
    SizeMismatch { declared: u64, written: u64 },
}

/// Errors from the transactional file store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The storage directory could not be created
    #[error("Could not create upload folder {path}: {message}")]
    DirectoryUnavailable { path: String, message: String },

    /// The destination file could not be created
    #[error("Could not create file destination {path}: {message}")]
    DestinationUnavailable { path: String, message: String },

    /// The write did not complete; the partial file was removed
    #[error("The file {file_name} was not uploaded properly, please try again: {failure}")]
    IncompleteWrite {
        file_name: String,
        failure: WriteFailure,
    },

    /// The write did not complete and the partial file could not be removed
    #[error(
        "Error cleaning the file {file_name} after a failed upload: {cleanup}. Original error: {failure}"
    )]
    CleanupFailure {
        file_name: String,
        failure: WriteFailure,
        cleanup: String,
    },

    /// The requested name is not a bare file name
    #[error("Invalid stored file name: {0:?}")]
    InvalidFileName(String),

    /// No stored file has this name
    #[error("Stored file not found: {0}")]
    NotFound(String),

    /// The stored file exists but could not be read
    #[error("Could not read stored file {file_name}: {message}")]
    Read { file_name: String, message: String },
}
