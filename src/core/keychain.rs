//! Keychain storage for store login credentials.
//!
//! Uses the system keychain (macOS Keychain, Linux Secret Service, Windows
//! Credential Manager). Values stored here are read by the publish step and
//! are never written to logs or serialized output.

use keyring::Entry;

use crate::error::{Error, Result};

const SERVICE_NAME: &str = "skiff";

fn keyring_error(e: keyring::Error) -> Error {
    Error::keychain_unavailable(e.to_string())
}

/// Stores a credential under the given id.
pub fn store(id: &str, value: &str) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, id).map_err(keyring_error)?;
    entry.set_password(value).map_err(keyring_error)?;
    Ok(())
}

/// Retrieves a credential. Returns `None` if the id doesn't exist.
pub fn get(id: &str) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, id).map_err(keyring_error)?;

    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Deletes a credential. Deleting a missing id is not an error.
pub fn delete(id: &str) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, id).map_err(keyring_error)?;

    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Checks if a credential exists without exposing its value.
pub fn exists(id: &str) -> bool {
    get(id).map(|v| v.is_some()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires keychain access and may prompt for permissions.
    // Run manually with: cargo test keychain -- --ignored

    #[test]
    #[ignore]
    fn store_get_delete_round_trip() {
        let id = "skiff-test-credential";
        store(id, "secret_value_123").unwrap();
        assert_eq!(get(id).unwrap(), Some("secret_value_123".to_string()));

        delete(id).unwrap();
        assert_eq!(get(id).unwrap(), None);
        assert!(!exists(id));
    }
}
