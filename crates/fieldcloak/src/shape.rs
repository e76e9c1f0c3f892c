//! Root shapes accepted by the transform entry points.
//!
//! [`Transformable`] is the statically typed view: the concrete output type is
//! known at the call site. [`DynTransformable`] erases it, so values whose type
//! is only known at runtime (request bodies, log payloads) can go through the
//! same engine and be downcast afterwards.

use std::any::Any;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::duplicate::Duplicate;
use crate::record::{AsSlot, Record, Slot};
use crate::render::{log_string, RenderError};

/// Shape of a root value, after dereferencing a root reference.
pub enum Root<'a> {
    /// A single record.
    Record(&'a mut dyn Record),
    /// An ordered sequence; only elements that are records get walked.
    Sequence(Vec<Slot<'a>>),
    /// Anything else. Carries a short description of what was found.
    Unsupported(&'static str),
}

/// A value that can be handed to the typed transform entry point.
///
/// Implemented by every [`crate::record!`] type, by references to a root
/// (`Option<T>`, `Box<T>`), by ordered sequences (`Vec<T>`) and by
/// [`crate::Value`]. Strings and scalars implement it too, but always report
/// an unsupported shape.
pub trait Transformable: Duplicate {
    /// Expose the root for traversal.
    fn root(&mut self) -> Root<'_>;
}

impl<T: Transformable> Transformable for Option<T> {
    fn root(&mut self) -> Root<'_> {
        match self {
            Some(inner) => inner.root(),
            None => Root::Unsupported("null reference"),
        }
    }
}

impl<T: Transformable> Transformable for Box<T> {
    fn root(&mut self) -> Root<'_> {
        T::root(self)
    }
}

impl<T: AsSlot + Duplicate> Transformable for Vec<T> {
    fn root(&mut self) -> Root<'_> {
        Root::Sequence(self.iter_mut().map(AsSlot::as_slot).collect())
    }
}

impl Transformable for String {
    fn root(&mut self) -> Root<'_> {
        Root::Unsupported("string")
    }
}

macro_rules! impl_unsupported_root {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Transformable for $ty {
                fn root(&mut self) -> Root<'_> {
                    Root::Unsupported($kind)
                }
            }
        )*
    };
}

impl_unsupported_root!(
    () => "unit",
    bool => "bool",
    char => "char",
    i8 => "integer",
    i16 => "integer",
    i32 => "integer",
    i64 => "integer",
    i128 => "integer",
    isize => "integer",
    u8 => "integer",
    u16 => "integer",
    u32 => "integer",
    u64 => "integer",
    u128 => "integer",
    usize => "integer",
    f32 => "float",
    f64 => "float",
    NaiveDate => "date",
    NaiveTime => "time",
    NaiveDateTime => "timestamp",
);

/// Type-erased [`Transformable`], used by the untyped entry point.
///
/// Blanket-implemented for every `Transformable + Send + Sync` type, so the
/// untyped entry point accepts exactly what the typed one does.
pub trait DynTransformable: Any + Send + Sync {
    /// Deep copy behind a fresh box.
    fn duplicate_boxed(&self) -> Box<dyn DynTransformable>;

    /// Expose the root for traversal.
    fn root_mut(&mut self) -> Root<'_>;

    /// Rust type name of the erased value.
    fn value_type(&self) -> &'static str;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> DynTransformable for T
where
    T: Transformable + Send + Sync + 'static,
{
    fn duplicate_boxed(&self) -> Box<dyn DynTransformable> {
        Box::new(self.duplicate())
    }

    fn root_mut(&mut self) -> Root<'_> {
        self.root()
    }

    fn value_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A [`DynTransformable`] that can also be written to a log line.
///
/// Only the untyped log helpers need this; the traversal itself does not.
pub trait DynLoggable: DynTransformable {
    /// View as a plain erased root.
    fn as_transformable(&self) -> &dyn DynTransformable;

    /// Render `value` with [`log_string`], provided it has the same concrete
    /// type as `self`. Field order is kept.
    fn render_same(&self, value: &dyn DynTransformable) -> Option<Result<String, RenderError>>;
}

impl<T> DynLoggable for T
where
    T: Transformable + Serialize + Send + Sync + 'static,
{
    fn as_transformable(&self) -> &dyn DynTransformable {
        self
    }

    fn render_same(&self, value: &dyn DynTransformable) -> Option<Result<String, RenderError>> {
        value.downcast_ref::<T>().map(log_string)
    }
}

impl dyn DynTransformable {
    /// Borrow the erased value as `T`, if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Recover the concrete value, or hand the box back on a type mismatch.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }
}

impl std::fmt::Debug for dyn DynTransformable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynTransformable")
            .field("type", &self.value_type())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(root: Root<'_>) -> String {
        match root {
            Root::Record(r) => format!("record:{}", r.type_name()),
            Root::Sequence(items) => format!("sequence:{}", items.len()),
            Root::Unsupported(found) => format!("unsupported:{found}"),
        }
    }

    #[test]
    fn scalar_roots_are_unsupported() {
        assert_eq!(kind(String::from("x").root()), "unsupported:string");
        assert_eq!(kind(7u32.root()), "unsupported:integer");
    }

    #[test]
    fn null_reference_is_unsupported() {
        let mut none: Option<Vec<String>> = None;
        assert_eq!(kind(none.root()), "unsupported:null reference");
    }

    #[test]
    fn vec_is_a_sequence() {
        let mut items = vec![String::from("a"), String::from("b")];
        assert_eq!(kind(items.root()), "sequence:2");
        let mut boxed = Box::new(vec![1u32]);
        assert_eq!(kind(boxed.root()), "sequence:1");
    }

    #[test]
    fn erased_value_downcasts() {
        let erased: Box<dyn DynTransformable> = Box::new(vec![String::from("a")]);
        assert!(erased.value_type().contains("Vec"));
        assert!(erased.downcast_ref::<Vec<String>>().is_some());
        assert!(erased.downcast_ref::<String>().is_none());
        let back = erased.downcast::<Vec<String>>().unwrap();
        assert_eq!(*back, vec![String::from("a")]);
    }

    #[test]
    fn every_scalar_width_is_unsupported() {
        assert_eq!(kind(7u8.root()), "unsupported:integer");
        assert_eq!(kind(7u16.root()), "unsupported:integer");
        assert_eq!(kind(7usize.root()), "unsupported:integer");
        assert_eq!(kind(7i8.root()), "unsupported:integer");
        assert_eq!(kind(1.5f32.root()), "unsupported:float");
        assert_eq!(kind('c'.root()), "unsupported:char");
    }

    #[test]
    fn render_same_requires_matching_type() {
        let items = vec![String::from("b"), String::from("a")];
        let rendered = items.render_same(&vec![String::from("z")]).unwrap().unwrap();
        assert_eq!(rendered, r#"["z"]"#);
        assert!(items.render_same(&7u32).is_none());
    }
}
