//! Tagged traversal: duplicate the input, walk the copy, transform annotated strings.
//!
//! # Algorithm
//!
//! 1. An empty key short-circuits: the input comes back unchanged.
//! 2. The input is duplicated; everything below mutates the copy only.
//! 3. A record root is walked field by field, in declaration order:
//!    - timestamps are skipped without being inspected;
//!    - strings whose annotation under the marker tag equals the marker value
//!      go through the leaf transform;
//!    - nested records are always descended into, annotated or not;
//!    - everything else is left alone.
//! 4. A sequence root walks each element that is a record, in place; other
//!    elements pass through untouched.
//! 5. The first leaf failure aborts the call. The copy is dropped, so the
//!    caller is left with its original value and the error.
//!
//! The typed ([`transform`]), untyped ([`transform_any`]) and slice
//! ([`transform_slice`]) entry points differ only in how they obtain the
//! [`Root`]; the walk itself is shared.

use tracing::debug;

use crate::duplicate::Duplicate;
use crate::error::{LeafError, TransformError};
use crate::record::{AsSlot, Record, Slot};
use crate::shape::{DynTransformable, Root, Transformable};

/// Deepest record nesting the walk will follow.
///
/// Bounds the walk only. Duplication runs first and follows the whole chain,
/// so a value must already be shallow enough to copy; past this depth the
/// walk stops with [`TransformError::DepthExceeded`].
pub const MAX_DEPTH: usize = 128;

/// Default annotation key marking a field for log obscuring.
pub const TAG_NAME: &str = "log";

/// Default annotation value marking a field for log obscuring.
pub const TAG_VALUE: &str = "encrypt";

/// Which annotation selects a field: `tag = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Annotation key looked up on each field.
    pub tag: &'a str,
    /// Value the annotation must equal.
    pub value: &'a str,
}

impl<'a> Marker<'a> {
    /// Marker selecting fields annotated `tag = value`.
    pub const fn new(tag: &'a str, value: &'a str) -> Self {
        Self { tag, value }
    }

    /// A field without the annotation compares as the empty string.
    fn matches(&self, field_tag: Option<&str>) -> bool {
        field_tag.unwrap_or_default() == self.value
    }
}

impl Default for Marker<'static> {
    fn default() -> Self {
        Self::new(TAG_NAME, TAG_VALUE)
    }
}

/// Transform annotated string fields of a statically typed value.
///
/// `leaf` receives each selected string together with `key` and returns its
/// replacement. On success the transformed copy is returned; `input` is never
/// modified.
///
/// # Errors
///
/// - [`TransformError::UnsupportedShape`] if `input` is not a record, a
///   reference to one, or a sequence.
/// - [`TransformError::Leaf`] with the leaf's own error if any leaf call fails.
/// - [`TransformError::DepthExceeded`] past [`MAX_DEPTH`] nested records.
pub fn transform<T, F, E>(
    input: &T,
    key: &str,
    marker: Marker<'_>,
    leaf: F,
) -> Result<T, TransformError>
where
    T: Transformable,
    F: FnMut(&str, &str) -> Result<String, E>,
    E: Into<LeafError>,
{
    let mut copy = input.duplicate();
    if key.is_empty() {
        return Ok(copy);
    }
    Walk::new(key, marker, leaf).root(copy.root())?;
    Ok(copy)
}

/// Untyped counterpart of [`transform`]; identical semantics.
///
/// The result has the same concrete type as `input`; recover it with
/// `downcast` or `downcast_ref` on `dyn DynTransformable`.
///
/// # Errors
///
/// Same as [`transform`].
pub fn transform_any<F, E>(
    input: &dyn DynTransformable,
    key: &str,
    marker: Marker<'_>,
    leaf: F,
) -> Result<Box<dyn DynTransformable>, TransformError>
where
    F: FnMut(&str, &str) -> Result<String, E>,
    E: Into<LeafError>,
{
    let mut copy = input.duplicate_boxed();
    if key.is_empty() {
        return Ok(copy);
    }
    Walk::new(key, marker, leaf).root(copy.root_mut())?;
    Ok(copy)
}

/// [`transform`] for a root sequence held as a slice.
///
/// # Errors
///
/// [`TransformError::Leaf`] or [`TransformError::DepthExceeded`], as for
/// [`transform`]; a slice is always an acceptable shape.
pub fn transform_slice<T, F, E>(
    input: &[T],
    key: &str,
    marker: Marker<'_>,
    leaf: F,
) -> Result<Vec<T>, TransformError>
where
    T: AsSlot + Duplicate,
    F: FnMut(&str, &str) -> Result<String, E>,
    E: Into<LeafError>,
{
    let mut copy: Vec<T> = input.iter().map(Duplicate::duplicate).collect();
    if key.is_empty() {
        return Ok(copy);
    }
    Walk::new(key, marker, leaf).root(copy.root())?;
    Ok(copy)
}

/// State of one traversal.
struct Walk<'w, F> {
    key: &'w str,
    marker: Marker<'w>,
    leaf: F,
}

impl<'w, F, E> Walk<'w, F>
where
    F: FnMut(&str, &str) -> Result<String, E>,
    E: Into<LeafError>,
{
    fn new(key: &'w str, marker: Marker<'w>, leaf: F) -> Self {
        Self { key, marker, leaf }
    }

    fn root(&mut self, root: Root<'_>) -> Result<(), TransformError> {
        match root {
            Root::Record(record) => self.record(record, String::new(), 0),
            Root::Sequence(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    if let Slot::Record(record) = item {
                        self.record(record, format!("[{index}]"), 0)?;
                    }
                }
                Ok(())
            }
            Root::Unsupported(found) => Err(TransformError::UnsupportedShape { found }),
        }
    }

    fn record(
        &mut self,
        record: &mut dyn Record,
        path: String,
        depth: usize,
    ) -> Result<(), TransformError> {
        if depth >= MAX_DEPTH {
            return Err(TransformError::DepthExceeded { limit: MAX_DEPTH });
        }

        for field in record.fields() {
            match field.slot {
                Slot::Opaque | Slot::Skip => {}
                Slot::Text(text) => {
                    if !self.marker.matches(field.tags.get(self.marker.tag)) {
                        continue;
                    }
                    match (self.leaf)(text.as_str(), self.key) {
                        Ok(replacement) => *text = replacement,
                        Err(e) => {
                            let path = join(&path, field.name);
                            debug!(field = %path, "leaf transform failed; discarding copy");
                            return Err(TransformError::Leaf {
                                path,
                                source: e.into(),
                            });
                        }
                    }
                }
                Slot::Record(nested) => {
                    self.record(nested, join(&path, field.name), depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}
