//! Log obscuring with the process-wide key and the default marker.
//!
//! These are the calls an application makes right before handing a value to
//! its logger. Without an installed key (or with an empty one) every helper
//! passes its input through unchanged.

use serde::Serialize;
use tracing::warn;

use crate::cipher::{Cipher, CipherError, FieldCipher};
use crate::cloak::Cloak;
use crate::error::TransformError;
use crate::key::current_key;
use crate::render::log_string;
use crate::shape::{DynLoggable, DynTransformable, Transformable};

/// Encrypt the `log = "encrypt"` fields of `input` with the installed key.
///
/// # Errors
///
/// See [`Cloak::encrypt`].
pub fn encrypt_log<T: Transformable>(input: &T) -> Result<T, TransformError> {
    Cloak::new().encrypt(input, current_key())
}

/// Decrypt the `log = "encrypt"` fields of `input` with the installed key.
///
/// # Errors
///
/// See [`Cloak::decrypt`].
pub fn decrypt_log<T: Transformable>(input: &T) -> Result<T, TransformError> {
    Cloak::new().decrypt(input, current_key())
}

/// Untyped [`encrypt_log`].
///
/// # Errors
///
/// See [`Cloak::encrypt_any`].
pub fn encrypt_log_any(
    input: &dyn DynTransformable,
) -> Result<Box<dyn DynTransformable>, TransformError> {
    Cloak::new().encrypt_any(input, current_key())
}

/// Encrypt a bare string with the installed key.
///
/// A string has no fields to select, so the whole value is encrypted.
///
/// # Errors
///
/// Returns the cipher's error; nothing is encrypted with an empty key.
pub fn encrypt_log_str(input: &str) -> Result<String, CipherError> {
    encrypt_str_with(&FieldCipher, input, current_key())
}

/// Encrypt and render `input` for a log field.
///
/// Returns `None` when no key is installed or the value cannot be obscured;
/// a failure is logged without the value itself.
pub fn obscured<T: Transformable + Serialize>(input: &T) -> Option<String> {
    obscured_with(&Cloak::new(), input, current_key())
}

/// Untyped [`obscured`].
pub fn obscured_any(input: &dyn DynLoggable) -> Option<String> {
    obscured_any_with(&Cloak::new(), input, current_key())
}

fn encrypt_str_with<C: Cipher>(
    cipher: &C,
    input: &str,
    key: &str,
) -> Result<String, CipherError> {
    if key.is_empty() {
        return Ok(input.to_owned());
    }
    cipher.encrypt(input, key)
}

fn obscured_with<C: Cipher, T: Transformable + Serialize>(
    cloak: &Cloak<C>,
    input: &T,
    key: &str,
) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let hidden = match cloak.encrypt(input, key) {
        Ok(hidden) => hidden,
        Err(e) => {
            warn!(error = %e, "failed to obscure value for logging");
            return None;
        }
    };
    render(&hidden)
}

fn obscured_any_with<C: Cipher>(
    cloak: &Cloak<C>,
    input: &dyn DynLoggable,
    key: &str,
) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let hidden = match cloak.encrypt_any(input.as_transformable(), key) {
        Ok(hidden) => hidden,
        Err(e) => {
            warn!(
                error = %e,
                value_type = input.value_type(),
                "failed to obscure value for logging"
            );
            return None;
        }
    };
    match input.render_same(&*hidden) {
        Some(Ok(line)) => Some(line),
        Some(Err(e)) => {
            warn!(error = %e, "failed to render obscured value");
            None
        }
        None => {
            warn!(value_type = hidden.value_type(), "obscured value changed type");
            None
        }
    }
}

fn render<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match log_string(value) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to render obscured value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::MockCipher;
    use crate::key::{set_log_key, TEST_KEY};
    use crate::record;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Signup {
        email: String,
        plan: String,
    }

    record!(Signup {
        email(log = "encrypt"),
        plan,
    });

    fn signup() -> Signup {
        Signup {
            email: "bob@example.com".into(),
            plan: "pro".into(),
        }
    }

    #[test]
    fn installed_key_round_trips() {
        set_log_key(TEST_KEY);
        let hidden = encrypt_log(&signup()).unwrap();
        assert_ne!(hidden.email, "bob@example.com");
        assert_eq!(hidden.plan, "pro");
        assert_eq!(decrypt_log(&hidden).unwrap(), signup());
    }

    #[test]
    fn untyped_helper_uses_installed_key() {
        set_log_key(TEST_KEY);
        let hidden = encrypt_log_any(&signup()).unwrap();
        let hidden = hidden.downcast_ref::<Signup>().unwrap();
        assert_eq!(decrypt_log(hidden).unwrap(), signup());
    }

    #[test]
    fn bare_string_is_encrypted_whole() {
        set_log_key(TEST_KEY);
        let hidden = encrypt_log_str("bob").unwrap();
        assert_eq!(FieldCipher.decrypt(&hidden, TEST_KEY).unwrap(), "bob");
    }

    #[test]
    fn empty_key_passes_strings_through() {
        let mut cipher = MockCipher::new();
        cipher.expect_encrypt().never();
        assert_eq!(encrypt_str_with(&cipher, "bob", "").unwrap(), "bob");
    }

    #[test]
    fn obscured_renders_json_without_plaintext() {
        set_log_key(TEST_KEY);
        let line = obscured(&signup()).unwrap();
        assert!(line.starts_with('{'));
        assert!(line.contains(r#""plan":"pro""#));
        assert!(!line.contains("bob@example.com"));

        let line = obscured_any(&signup()).unwrap();
        assert!(!line.contains("bob@example.com"));
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Zed {
        zeta: String,
        alpha: String,
    }

    record!(Zed {
        zeta,
        alpha(log = "encrypt"),
    });

    #[test]
    fn untyped_rendering_keeps_declaration_order() {
        let zed = Zed {
            zeta: "z".into(),
            alpha: "a".into(),
        };
        let cloak = Cloak::new();
        let typed = obscured_with(&cloak, &zed, TEST_KEY).unwrap();
        let untyped = obscured_any_with(&cloak, &zed, TEST_KEY).unwrap();
        assert!(typed.starts_with(r#"{"zeta":"z","alpha":"v1."#));
        assert!(untyped.starts_with(r#"{"zeta":"z","alpha":"v1."#));
    }

    #[test]
    fn obscured_is_none_without_key() {
        let cloak = Cloak::with_cipher(MockCipher::new());
        assert_eq!(obscured_with(&cloak, &signup(), ""), None);
        assert_eq!(obscured_any_with(&cloak, &signup(), ""), None);
    }

    #[test]
    fn obscured_is_none_on_failure() {
        let mut cipher = MockCipher::new();
        cipher
            .expect_encrypt()
            .returning(|_, _| Err(CipherError::Aead));
        let cloak = Cloak::with_cipher(cipher);
        assert_eq!(obscured_with(&cloak, &signup(), "k"), None);
        assert_eq!(obscured_any_with(&cloak, &signup(), "k"), None);
        assert_eq!(obscured_with(&cloak, &String::from("raw"), "k"), None);
    }
}
