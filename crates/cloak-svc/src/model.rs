//! Request and response bodies exchanged over the HTTP API.
//!
//! Fields annotated `log = "encrypt"` are encrypted before a body reaches the
//! exchange log.

use chrono::{DateTime, Utc};
use fieldcloak::record;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Postal address of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

record!(Address {
    street(log = "encrypt"),
    city,
    postal_code(log = "encrypt"),
});

/// Request body for `POST /users` and `POST /users/reveal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

record!(CreateUserRequest {
    name,
    email(log = "encrypt"),
    password(log = "encrypt"),
    phone(log = "encrypt"),
    address,
});

/// A stored user, as returned by the API.
///
/// The password is never part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

record!(User {
    id,
    name,
    email(log = "encrypt"),
    phone(log = "encrypt"),
    address,
    created_at,
});

impl User {
    /// Build a user from a creation request.
    pub fn from_request(id: String, req: CreateUserRequest, created_at: DateTime<Utc>) -> Self {
        let CreateUserRequest {
            name,
            email,
            password: _,
            phone,
            address,
        } = req;
        Self {
            id,
            name,
            email,
            phone,
            address,
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Envelope for every successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    pub code: u16,
    /// Short human-readable outcome.
    pub message: String,
    /// Payload; the only part of the envelope that is logged.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` with a status code and message.
    pub fn new(code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Whether request and response bodies are being logged (obscured).
    pub log_key_installed: bool,
    /// Number of users currently stored.
    pub users: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcloak::Cloak;
    use serde_json::json;

    fn request() -> CreateUserRequest {
        CreateUserRequest {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "hunter2".into(),
            phone: Some("+1 555 0100".into()),
            address: Some(Address {
                street: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
            }),
        }
    }

    #[test]
    fn request_deserialises_without_optional_fields() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "name": "Bob",
            "email": "bob@example.com",
            "password": "pw"
        }))
        .unwrap();
        assert_eq!(req.phone, None);
        assert_eq!(req.address, None);
    }

    #[test]
    fn tagged_fields_are_obscured() {
        let hidden = Cloak::new().encrypt(&request(), "k").unwrap();
        assert_eq!(hidden.name, "Alice");
        assert!(hidden.email.starts_with("v1."));
        assert!(hidden.password.starts_with("v1."));
        assert!(hidden.phone.as_deref().unwrap().starts_with("v1."));
        let address = hidden.address.unwrap();
        assert!(address.street.starts_with("v1."));
        assert_eq!(address.city, "Springfield");
    }

    #[test]
    fn user_drops_password() {
        let user = User::from_request("u-1".into(), request(), Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hunter2"));
        assert_eq!(user.email, "alice@example.com");
    }
}
