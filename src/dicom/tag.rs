//! DICOM attribute tags.
//!
//! A tag is a `(group, element)` pair of 16-bit numbers. Its canonical text
//! form is `(GGGG,EEEE)` with four uppercase hexadecimal digits per half.

use std::fmt;
use std::str::FromStr;

use crate::error::TagParseError;

/// The Pixel Data element, holding one or more encoded frames.
pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

/// Number of Frames, an IS value. Absent means a single frame.
pub const NUMBER_OF_FRAMES: Tag = Tag::new(0x0028, 0x0008);

/// Institution Name.
pub const INSTITUTION_NAME: Tag = Tag::new(0x0008, 0x0080);

/// An attribute tag: `(group, element)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    group: u16,
    element: u16,
}

impl Tag {
    /// Create a tag from its two halves.
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// The group number.
    #[inline]
    pub const fn group(&self) -> u16 {
        self.group
    }

    /// The element number.
    #[inline]
    pub const fn element(&self) -> u16 {
        self.element
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// Strict parser for the canonical form. Lowercase hex digits are accepted,
/// everything else (missing parentheses, short components, whitespace) is not.
impl FromStr for Tag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || TagParseError::Syntax(s.to_string());

        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(syntax)?;
        let (group, element) = inner.split_once(',').ok_or_else(syntax)?;

        let parse_half = |half: &str| {
            if half.len() != 4 || !half.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(syntax());
            }
            u16::from_str_radix(half, 16).map_err(|_| syntax())
        };

        Ok(Tag::new(parse_half(group)?, parse_half(element)?))
    }
}

impl From<(u16, u16)> for Tag {
    fn from((group, element): (u16, u16)) -> Self {
        Tag::new(group, element)
    }
}

impl From<Tag> for dicom_core::Tag {
    fn from(tag: Tag) -> Self {
        dicom_core::Tag(tag.group, tag.element)
    }
}

impl From<dicom_core::Tag> for Tag {
    fn from(tag: dicom_core::Tag) -> Self {
        Tag::new(tag.group(), tag.element())
    }
}
