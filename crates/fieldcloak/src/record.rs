//! Field-level access to records: the capability the traversal engine walks.
//!
//! A [`Record`] lists its fields in declaration order. Each [`Field`] carries
//! its annotation set ([`Tags`]) and a [`Slot`] telling the engine what the
//! field holds once optional and boxed references are looked through.
//!
//! Compiled structs implement [`Record`] through the [`crate::record!`] macro;
//! runtime-described records ([`crate::DynRecord`]) implement it by hand.
//! Both therefore reach the engine through the same interface.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A structured value with a fixed, ordered set of named fields.
pub trait Record {
    /// Name of the record type, used in diagnostics.
    fn type_name(&self) -> &str;

    /// Mutable views of every field, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One field of a [`Record`].
pub struct Field<'a> {
    /// Field name as declared.
    pub name: &'a str,
    /// Annotations attached to the field declaration.
    pub tags: Tags<'a>,
    /// What the field holds.
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    /// Bundle a field view.
    pub fn new(name: &'a str, tags: Tags<'a>, slot: Slot<'a>) -> Self {
        Self { name, tags, slot }
    }
}

/// Annotation key/value pairs of a single field.
#[derive(Debug, Clone, Copy)]
pub enum Tags<'a> {
    /// Annotations fixed at compile time by [`crate::record!`].
    Static(&'a [(&'a str, &'a str)]),
    /// Annotations supplied at runtime.
    Map(&'a BTreeMap<String, String>),
}

impl<'a> Tags<'a> {
    /// Value of the annotation stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        match *self {
            Tags::Static(pairs) => pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v),
            Tags::Map(map) => map.get(key).map(String::as_str),
        }
    }

    /// `true` when no annotation is attached.
    pub fn is_empty(&self) -> bool {
        match *self {
            Tags::Static(pairs) => pairs.is_empty(),
            Tags::Map(map) => map.is_empty(),
        }
    }
}

/// Classification of a field value, after dereferencing any reference.
pub enum Slot<'a> {
    /// A timestamp. Never inspected, never transformed.
    Opaque,
    /// A string, or a non-null reference to one.
    Text(&'a mut String),
    /// A nested record, or a non-null reference to one.
    Record(&'a mut dyn Record),
    /// Anything else: numbers, booleans, sequences, maps, null references.
    Skip,
}

impl Slot<'_> {
    /// Short name of the slot kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Opaque => "timestamp",
            Slot::Text(_) => "string",
            Slot::Record(_) => "record",
            Slot::Skip => "other",
        }
    }
}

/// Maps a field type to its [`Slot`].
pub trait AsSlot {
    /// Borrow `self` as a slot.
    fn as_slot(&mut self) -> Slot<'_>;
}

impl AsSlot for String {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl<Tz: TimeZone> AsSlot for DateTime<Tz> {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Opaque
    }
}

macro_rules! impl_skip_slot {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AsSlot for $ty {
                #[inline]
                fn as_slot(&mut self) -> Slot<'_> {
                    Slot::Skip
                }
            }
        )*
    };
}

impl_skip_slot!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
);

impl<T: AsSlot> AsSlot for Option<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        match self {
            Some(inner) => inner.as_slot(),
            None => Slot::Skip,
        }
    }
}

impl<T: AsSlot> AsSlot for Box<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        T::as_slot(self)
    }
}

/// Only a uniquely owned `Arc` can be written through. The engine always
/// works on a duplicate, where that holds.
impl<T: AsSlot> AsSlot for Arc<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        match Arc::get_mut(self) {
            Some(inner) => inner.as_slot(),
            None => Slot::Skip,
        }
    }
}

impl<T: AsSlot> AsSlot for Rc<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        match Rc::get_mut(self) {
            Some(inner) => inner.as_slot(),
            None => Slot::Skip,
        }
    }
}

// Sequences and maps nested inside a record are left as they are.

impl<T> AsSlot for Vec<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Skip
    }
}

impl<T> AsSlot for VecDeque<T> {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Skip
    }
}

impl<K, V> AsSlot for HashMap<K, V> {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Skip
    }
}

impl<K, V> AsSlot for BTreeMap<K, V> {
    fn as_slot(&mut self) -> Slot<'_> {
        Slot::Skip
    }
}

/// Implement the record capability for a named-field struct.
///
/// List every field of the struct in declaration order, attaching
/// annotations in parentheses:
///
/// ```
/// use fieldcloak::record;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Account {
///     pub owner: String,
///     pub iban: String,
///     pub balance: i64,
/// }
///
/// record!(Account {
///     owner(log = "encrypt"),
///     iban(log = "encrypt", audit = "mask"),
///     balance,
/// });
/// ```
///
/// The generated code destructures the struct without `..`, so a field left
/// out of the list is a compile error. Every field type must implement
/// [`crate::Duplicate`] and [`crate::AsSlot`].
#[macro_export]
macro_rules! record {
    ($ty:ident { $( $field:ident $( ( $( $tag:ident = $val:literal ),* $(,)? ) )? ),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn type_name(&self) -> &str {
                ::core::stringify!($ty)
            }

            #[allow(unused_variables)]
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                let $ty { $( $field ),* } = self;
                ::std::vec![
                    $(
                        $crate::Field::new(
                            ::core::stringify!($field),
                            $crate::Tags::Static(&[ $( $( (::core::stringify!($tag), $val) ),* )? ]),
                            $crate::AsSlot::as_slot($field),
                        )
                    ),*
                ]
            }
        }

        impl $crate::Duplicate for $ty {
            #[allow(unused_variables)]
            fn duplicate(&self) -> Self {
                let $ty { $( $field ),* } = self;
                $ty { $( $field: $crate::Duplicate::duplicate($field) ),* }
            }
        }

        impl $crate::AsSlot for $ty {
            fn as_slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::Record(self)
            }
        }

        impl $crate::Transformable for $ty {
            fn root(&mut self) -> $crate::Root<'_> {
                $crate::Root::Record(self)
            }
        }
    };
}
