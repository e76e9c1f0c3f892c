//! # fieldcloak
//!
//! Encrypts (or decrypts) the string fields of a structured value that carry a
//! marker annotation, so the value can be written to a log without exposing
//! them. Every call works on a deep copy; the caller's value is never touched.
//!
//! ```
//! use fieldcloak::{record, Cloak};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct Address {
//!     pub street: String,
//!     pub city: String,
//! }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! pub struct User {
//!     pub name: String,
//!     pub age: u32,
//!     pub address: Address,
//! }
//!
//! record!(Address { street(log = "encrypt"), city });
//! record!(User { name(log = "encrypt"), age, address });
//!
//! let user = User {
//!     name: "alice".into(),
//!     age: 30,
//!     address: Address { street: "1 Main St".into(), city: "Springfield".into() },
//! };
//!
//! let hidden = Cloak::new().encrypt(&user, "key").unwrap();
//! assert!(hidden.name.starts_with("v1."));
//! assert!(hidden.address.street.starts_with("v1."));
//! assert_eq!(hidden.address.city, "Springfield");
//! assert_eq!(user.name, "alice");
//! ```
//!
//! ## Modules
//!
//! - [`record`]    – field accessor capability and the [`record!`] macro.
//! - [`duplicate`] – deep copies that never share pointer targets.
//! - [`shape`]     – accepted root shapes, typed and type-erased.
//! - [`value`]     – runtime-described records and mixed sequences.
//! - [`engine`]    – the traversal itself.
//! - [`cipher`]    – AES-256-GCM-SIV field cipher.
//! - [`cloak`]     – engine bound to a cipher and marker.
//! - [`key`]       – process-wide log key.
//! - [`obscure`]   – helpers that use the process-wide key.
//! - [`render`]    – turn any value into a log string.

pub mod cipher;
pub mod cloak;
pub mod duplicate;
pub mod engine;
pub mod error;
pub mod key;
pub mod obscure;
pub mod record;
pub mod render;
pub mod shape;
pub mod value;

pub use cipher::{Cipher, CipherError, EncryptedField, FieldCipher};
pub use cloak::{Cloak, Direction};
pub use duplicate::Duplicate;
pub use engine::{
    transform, transform_any, transform_slice, Marker, MAX_DEPTH, TAG_NAME, TAG_VALUE,
};
pub use error::{LeafError, TransformError};
pub use key::{log_key, set_log_key, LogKey};
pub use obscure::{
    decrypt_log, encrypt_log, encrypt_log_any, encrypt_log_str, obscured, obscured_any,
};
pub use record::{AsSlot, Field, Record, Slot, Tags};
pub use render::{log_string, RenderError};
pub use shape::{DynLoggable, DynTransformable, Root, Transformable};
pub use value::{DynField, DynRecord, Value};
