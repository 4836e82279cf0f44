//! Header attribute resolution.
//!
//! A tag specifier such as `(0008,0080)` goes through a staged pipeline:
//!
//! 1. reject the empty string
//! 2. strip one optional pair of enclosing parentheses, split on `,`
//! 3. parse each half as a 16-bit hexadecimal number
//! 4. look the tag up in the attribute dictionary
//! 5. look the element up in the dataset
//!
//! Each stage fails with its own [`ResolveError`] variant. Resolution reads
//! the dataset and the dictionary only, so it is safe to run concurrently and
//! repeated calls give identical results.

use serde::Serialize;

use super::dataset::Dataset;
use super::dictionary::{AttributeDictionary, StandardTagDictionary};
use super::tag::Tag;
use crate::error::{ResolveError, TagComponent};

/// A resolved header attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeResult {
    /// The specifier exactly as the caller passed it
    #[serde(rename = "tag-values")]
    pub tag_values: String,

    /// Dictionary name of the attribute (e.g. `InstitutionName`)
    #[serde(rename = "header-attribute-name")]
    pub attribute_name: String,

    /// Rendered element value
    #[serde(rename = "header-attribute-value")]
    pub attribute_value: String,
}

/// Resolve an attribute against the standard DICOM dictionary.
pub fn resolve<D>(specifier: &str, dataset: &D) -> Result<AttributeResult, ResolveError>
where
    D: Dataset + ?Sized,
{
    resolve_with(specifier, dataset, &StandardTagDictionary)
}

/// Resolve an attribute against the given dictionary.
pub fn resolve_with<D>(
    specifier: &str,
    dataset: &D,
    dictionary: &dyn AttributeDictionary,
) -> Result<AttributeResult, ResolveError>
where
    D: Dataset + ?Sized,
{
    let tag = parse_tag_specifier(specifier)?;

    let entry = dictionary
        .lookup(tag)
        .ok_or_else(|| ResolveError::UnknownTag {
            specifier: specifier.to_string(),
        })?;

    let value = dataset
        .element_value(tag)
        .ok_or_else(|| ResolveError::ElementNotFound {
            name: entry.name.clone(),
            specifier: specifier.to_string(),
        })?;

    Ok(AttributeResult {
        tag_values: specifier.to_string(),
        attribute_name: entry.name,
        attribute_value: value,
    })
}

/// Parse a caller-supplied tag specifier (stages 1 to 3).
///
/// More lenient than the canonical form: parentheses are optional and each
/// half may have any number of hex digits as long as the value fits in 16 bits.
pub fn parse_tag_specifier(specifier: &str) -> Result<Tag, ResolveError> {
    if specifier.is_empty() {
        return Err(ResolveError::EmptySpecifier);
    }

    let inner = specifier
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(specifier);

    let parts: Vec<&str> = inner.split(',').collect();
    let [group, element] = parts.as_slice() else {
        return Err(malformed(specifier));
    };
    if group.is_empty() || element.is_empty() {
        return Err(malformed(specifier));
    }

    let group = parse_component(group, TagComponent::Group)?;
    let element = parse_component(element, TagComponent::Element)?;

    Ok(Tag::new(group, element))
}

fn malformed(specifier: &str) -> ResolveError {
    ResolveError::MalformedSpecifier {
        specifier: specifier.to_string(),
    }
}

fn parse_component(raw: &str, component: TagComponent) -> Result<u16, ResolveError> {
    let invalid = || ResolveError::InvalidTagComponent {
        component,
        raw: raw.to_string(),
    };

    // from_str_radix alone would let a leading '+' through
    if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u16::from_str_radix(raw, 16).map_err(|_| invalid())
}
