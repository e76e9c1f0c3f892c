//! Runtime-described value graphs.
//!
//! [`Value`] covers data whose record layout and annotations are only known at
//! runtime, and sequences that mix records with other kinds of element. It
//! implements the same [`Record`]/[`AsSlot`]/[`Transformable`] capability as
//! compiled records, so the engine treats both identically.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::duplicate::Duplicate;
use crate::record::{AsSlot, Field, Record, Slot, Tags};
use crate::shape::{Root, Transformable};

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar; eligible for transformation when annotated.
    Str(String),
    /// Opaque timestamp; never inspected.
    Timestamp(DateTime<Utc>),
    /// Nullable reference to another value.
    Ref(Option<Box<Value>>),
    /// Ordered sequence.
    Seq(Vec<Value>),
    /// Record with named, annotated fields.
    Record(DynRecord),
}

impl Value {
    /// A null reference.
    pub const fn null() -> Self {
        Value::Ref(None)
    }

    /// A non-null reference to `value`.
    pub fn reference(value: impl Into<Value>) -> Self {
        Value::Ref(Some(Box::new(value.into())))
    }

    /// Short name of the value kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Ref(None) => "null reference",
            Value::Ref(Some(_)) => "reference",
            Value::Seq(_) => "sequence",
            Value::Record(_) => "record",
        }
    }

    /// Borrow the string content, looking through a reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Ref(Some(inner)) => inner.as_str(),
            _ => None,
        }
    }

    /// Borrow the record, looking through a reference.
    pub fn as_record(&self) -> Option<&DynRecord> {
        match self {
            Value::Record(r) => Some(r),
            Value::Ref(Some(inner)) => inner.as_record(),
            _ => None,
        }
    }

    /// Borrow the sequence elements.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<DynRecord> for Value {
    fn from(r: DynRecord) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

/// A record whose layout is described at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct DynRecord {
    name: String,
    fields: Vec<DynField>,
}

impl DynRecord {
    /// An empty record named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping declaration order.
    pub fn with(mut self, field: DynField) -> Self {
        self.fields.push(field);
        self
    }

    /// Record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn field_list(&self) -> &[DynField] {
        &self.fields
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Mutably look up a field value by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.value)
    }
}

/// One field of a [`DynRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynField {
    name: String,
    tags: BTreeMap<String, String>,
    value: Value,
}

impl DynField {
    /// An unannotated field.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            value: value.into(),
        }
    }

    /// Attach the annotation `key = value`, replacing any previous value for `key`.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Annotation stored under `key`.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

impl Record for DynRecord {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn fields(&mut self) -> Vec<Field<'_>> {
        self.fields
            .iter_mut()
            .map(|f| Field::new(&f.name, Tags::Map(&f.tags), f.value.as_slot()))
            .collect()
    }
}

impl AsSlot for Value {
    fn as_slot(&mut self) -> Slot<'_> {
        match self {
            Value::Str(s) => Slot::Text(s),
            Value::Record(r) => Slot::Record(r),
            Value::Timestamp(_) => Slot::Opaque,
            Value::Ref(Some(inner)) => inner.as_slot(),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Ref(None) | Value::Seq(_) => {
                Slot::Skip
            }
        }
    }
}

impl Duplicate for Value {
    fn duplicate(&self) -> Self {
        self.clone()
    }
}

impl Transformable for Value {
    fn root(&mut self) -> Root<'_> {
        match self {
            Value::Record(r) => Root::Record(r),
            Value::Seq(items) => Root::Sequence(items.iter_mut().map(AsSlot::as_slot).collect()),
            Value::Ref(Some(inner)) => inner.root(),
            other => Root::Unsupported(other.kind()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => ts.serialize(serializer),
            Value::Ref(None) => serializer.serialize_none(),
            Value::Ref(Some(inner)) => inner.serialize(serializer),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(r) => r.serialize(serializer),
        }
    }
}

impl Serialize for DynRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}
