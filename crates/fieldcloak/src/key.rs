//! Process-wide key used by the log obscuring helpers.

use std::sync::OnceLock;

static LOG_KEY: OnceLock<LogKey> = OnceLock::new();

/// Key string handed to the leaf cipher when obscuring log output.
///
/// Debug output never includes the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct LogKey(String);

impl LogKey {
    /// Wrap a key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key material.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty key turns every obscuring call into a pass-through.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for LogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LogKey([REDACTED])")
    }
}

/// Install the process-wide log key.
///
/// The first call wins; later calls leave the installed key in place and
/// return `false`.
pub fn set_log_key(key: impl Into<String>) -> bool {
    install(&LOG_KEY, key)
}

/// `OnceLock` runs at most one initialiser, so exactly one caller sees `true`.
fn install(slot: &OnceLock<LogKey>, key: impl Into<String>) -> bool {
    let mut installed = false;
    slot.get_or_init(|| {
        installed = true;
        LogKey::new(key)
    });
    installed
}

/// The installed log key, if any.
pub fn log_key() -> Option<&'static LogKey> {
    LOG_KEY.get()
}

/// Key string to obscure with; empty when none is installed.
pub(crate) fn current_key() -> &'static str {
    log_key().map(LogKey::as_str).unwrap_or_default()
}

/// Key shared by every test in the crate that touches the process-wide slot.
#[cfg(test)]
pub(crate) const TEST_KEY: &str = "0123456789abcdef0123456789abcdef";
