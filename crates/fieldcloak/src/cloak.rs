//! [`Cloak`]: the traversal engine bound to a [`Cipher`] and a marker.

use std::borrow::Cow;

use crate::cipher::{Cipher, CipherError, FieldCipher};
use crate::duplicate::Duplicate;
use crate::engine::{self, Marker, TAG_NAME, TAG_VALUE};
use crate::error::TransformError;
use crate::record::AsSlot;
use crate::shape::{DynTransformable, Transformable};

/// Which way the leaf cipher runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Plaintext to ciphertext.
    Encrypt,
    /// Ciphertext back to plaintext.
    Decrypt,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Encrypts or decrypts every string field carrying the marker annotation.
///
/// ```
/// use fieldcloak::{record, Cloak};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Login {
///     user: String,
///     password: String,
/// }
///
/// record!(Login {
///     user,
///     password(log = "encrypt"),
/// });
///
/// let cloak = Cloak::new();
/// let login = Login { user: "alice".into(), password: "hunter2".into() };
///
/// let hidden = cloak.encrypt(&login, "my key").unwrap();
/// assert_eq!(hidden.user, "alice");
/// assert_ne!(hidden.password, "hunter2");
///
/// let shown = cloak.decrypt(&hidden, "my key").unwrap();
/// assert_eq!(shown, login);
/// ```
#[derive(Debug, Clone)]
pub struct Cloak<C = FieldCipher> {
    cipher: C,
    tag: Cow<'static, str>,
    value: Cow<'static, str>,
}

impl Cloak<FieldCipher> {
    /// AES-GCM-SIV cipher with the default `log = "encrypt"` marker.
    pub fn new() -> Self {
        Self::with_cipher(FieldCipher)
    }
}

impl Default for Cloak<FieldCipher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Cipher> Cloak<C> {
    /// Use `cipher` for every selected field, with the default marker.
    pub fn with_cipher(cipher: C) -> Self {
        Self {
            cipher,
            tag: Cow::Borrowed(TAG_NAME),
            value: Cow::Borrowed(TAG_VALUE),
        }
    }

    /// Select fields annotated `tag = value` instead of the default marker.
    pub fn with_marker(
        mut self,
        tag: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.tag = tag.into();
        self.value = value.into();
        self
    }

    /// The marker in use.
    pub fn marker(&self) -> Marker<'_> {
        Marker::new(&self.tag, &self.value)
    }

    /// The underlying cipher.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Encrypt the marked fields of `input`.
    ///
    /// # Errors
    ///
    /// See [`engine::transform`]; cipher failures arrive as
    /// [`TransformError::Leaf`] wrapping a [`CipherError`].
    pub fn encrypt<T: Transformable>(&self, input: &T, key: &str) -> Result<T, TransformError> {
        self.apply(Direction::Encrypt, input, key)
    }

    /// Decrypt the marked fields of `input`.
    ///
    /// # Errors
    ///
    /// As for [`Cloak::encrypt`]. A marked field that is not a ciphertext
    /// fails with [`CipherError::InvalidFormat`].
    pub fn decrypt<T: Transformable>(&self, input: &T, key: &str) -> Result<T, TransformError> {
        self.apply(Direction::Decrypt, input, key)
    }

    /// Run the cipher over `input` in `direction`.
    ///
    /// # Errors
    ///
    /// See [`engine::transform`].
    pub fn apply<T: Transformable>(
        &self,
        direction: Direction,
        input: &T,
        key: &str,
    ) -> Result<T, TransformError> {
        engine::transform(input, key, self.marker(), self.leaf(direction))
    }

    /// Untyped [`Cloak::encrypt`].
    ///
    /// # Errors
    ///
    /// See [`engine::transform_any`].
    pub fn encrypt_any(
        &self,
        input: &dyn DynTransformable,
        key: &str,
    ) -> Result<Box<dyn DynTransformable>, TransformError> {
        self.apply_any(Direction::Encrypt, input, key)
    }

    /// Untyped [`Cloak::decrypt`].
    ///
    /// # Errors
    ///
    /// See [`engine::transform_any`].
    pub fn decrypt_any(
        &self,
        input: &dyn DynTransformable,
        key: &str,
    ) -> Result<Box<dyn DynTransformable>, TransformError> {
        self.apply_any(Direction::Decrypt, input, key)
    }

    /// Untyped [`Cloak::apply`].
    ///
    /// # Errors
    ///
    /// See [`engine::transform_any`].
    pub fn apply_any(
        &self,
        direction: Direction,
        input: &dyn DynTransformable,
        key: &str,
    ) -> Result<Box<dyn DynTransformable>, TransformError> {
        engine::transform_any(input, key, self.marker(), self.leaf(direction))
    }

    /// Encrypt the record elements of a root slice.
    ///
    /// # Errors
    ///
    /// See [`engine::transform_slice`].
    pub fn encrypt_slice<T: AsSlot + Duplicate>(
        &self,
        input: &[T],
        key: &str,
    ) -> Result<Vec<T>, TransformError> {
        engine::transform_slice(input, key, self.marker(), self.leaf(Direction::Encrypt))
    }

    /// Decrypt the record elements of a root slice.
    ///
    /// # Errors
    ///
    /// See [`engine::transform_slice`].
    pub fn decrypt_slice<T: AsSlot + Duplicate>(
        &self,
        input: &[T],
        key: &str,
    ) -> Result<Vec<T>, TransformError> {
        engine::transform_slice(input, key, self.marker(), self.leaf(Direction::Decrypt))
    }

    fn leaf(
        &self,
        direction: Direction,
    ) -> impl Fn(&str, &str) -> Result<String, CipherError> + '_ {
        move |value: &str, key: &str| match direction {
            Direction::Encrypt => self.cipher.encrypt(value, key),
            Direction::Decrypt => self.cipher.decrypt(value, key),
        }
    }
}
