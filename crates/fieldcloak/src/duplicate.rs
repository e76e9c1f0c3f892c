//! Deep, structurally independent copies of value graphs.
//!
//! [`Duplicate`] differs from [`Clone`] in one place that matters here:
//! shared pointers. Cloning an `Arc<T>` hands back another handle to the same
//! target, whereas duplicating it allocates a fresh target, so that mutating
//! the copy can never be observed through the original.
//!
//! Record types get their implementation from [`crate::record!`], which
//! duplicates field by field.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Produce a copy that shares no mutable state with `self`.
pub trait Duplicate {
    /// Deep-copy `self`.
    fn duplicate(&self) -> Self;
}

macro_rules! impl_duplicate_by_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Duplicate for $ty {
                #[inline]
                fn duplicate(&self) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

impl_duplicate_by_clone!(
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
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
);

impl<Tz: TimeZone> Duplicate for DateTime<Tz> {
    fn duplicate(&self) -> Self {
        self.clone()
    }
}

impl<T: Duplicate> Duplicate for Option<T> {
    fn duplicate(&self) -> Self {
        self.as_ref().map(Duplicate::duplicate)
    }
}

impl<T: Duplicate> Duplicate for Box<T> {
    fn duplicate(&self) -> Self {
        Box::new(T::duplicate(self))
    }
}

impl<T: Duplicate> Duplicate for Arc<T> {
    fn duplicate(&self) -> Self {
        Arc::new(T::duplicate(self))
    }
}

impl<T: Duplicate> Duplicate for Rc<T> {
    fn duplicate(&self) -> Self {
        Rc::new(T::duplicate(self))
    }
}

impl<T: Duplicate> Duplicate for Vec<T> {
    fn duplicate(&self) -> Self {
        self.iter().map(Duplicate::duplicate).collect()
    }
}

impl<T: Duplicate> Duplicate for VecDeque<T> {
    fn duplicate(&self) -> Self {
        self.iter().map(Duplicate::duplicate).collect()
    }
}

impl<K: Clone + Eq + Hash, V: Duplicate> Duplicate for HashMap<K, V> {
    fn duplicate(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.duplicate())).collect()
    }
}

impl<K: Clone + Ord, V: Duplicate> Duplicate for BTreeMap<K, V> {
    fn duplicate(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.duplicate())).collect()
    }
}
