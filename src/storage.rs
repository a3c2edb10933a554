//! Credential reading over the two browser storage scopes.
//!
//! Scope A (persistent) holds the IMS access token, scope B (session)
//! holds the user profile. Both are read-only to this pipeline.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::error;

/// Persistent-scope key holding the JSON-encoded access token
pub const ACCESS_TOKEN_KEY: &str = "adobeid_ims_access_token/demo-copilot/false/AdobeID,openid";

/// Session-scope key holding the JSON-encoded user profile
pub const PROFILE_KEY: &str = "adobeid_ims_profile/demo-copilot/false/AdobeID,openid";

// TODO: replace with a configurable identity before this ships beyond the
// demo environment. Carried over from the original deployment, where it was
// a development-time placeholder.
pub const FALLBACK_LDAP: &str = "pbakliwal";

/// Raised only when the storage subsystem itself fails, not when a key is
/// merely absent
#[derive(Debug, Error)]
#[error("Storage access failed: {0}")]
pub struct StorageError(pub String);

/// A single key/value storage scope (localStorage or sessionStorage in a
/// browser host). Absent keys are `Ok(None)`.
pub trait StorageScope: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// In-memory storage scope for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.lock().expect("storage lock poisoned");
        items.insert(key.to_string(), value.to_string());
    }

    pub fn remove_item(&self, key: &str) {
        let mut items = self.items.lock().expect("storage lock poisoned");
        items.remove(key);
    }
}

impl StorageScope for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .lock()
            .map_err(|e| StorageError(e.to_string()))?;
        Ok(items.get(key).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct StoredCredential {
    #[serde(rename = "tokenValue")]
    token_value: String,
}

#[derive(Debug, Deserialize)]
struct StoredProfile {
    email: Option<String>,
}

/// Read the access token from the persistent scope.
///
/// Missing key, unparseable value, or a storage failure all yield `None`;
/// the caller treats every `None` the same way (authentication missing).
pub fn auth_token(scope: &dyn StorageScope) -> Option<String> {
    let raw = match scope.get_item(ACCESS_TOKEN_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            error!("No token found in persistent storage");
            return None;
        }
        Err(e) => {
            error!("Error reading token from storage: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<StoredCredential>(&raw) {
        Ok(credential) => Some(credential.token_value),
        Err(e) => {
            error!("Error parsing token data: {}", e);
            None
        }
    }
}

/// Derive the user ldap (local part of the profile email) from the
/// session scope.
///
/// Missing profile, unparseable profile, or missing email soft-fall back
/// to [`FALLBACK_LDAP`]; only a storage failure yields `None`.
pub fn user_ldap(scope: &dyn StorageScope) -> Option<String> {
    let raw = match scope.get_item(PROFILE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            error!("No profile data found in session storage");
            return Some(FALLBACK_LDAP.to_string());
        }
        Err(e) => {
            error!("Error reading profile from storage: {}", e);
            return None;
        }
    };

    let profile = match serde_json::from_str::<StoredProfile>(&raw) {
        Ok(profile) => profile,
        Err(e) => {
            error!("Error parsing profile data: {}", e);
            return Some(FALLBACK_LDAP.to_string());
        }
    };

    match profile.email {
        Some(email) => {
            let ldap = email.split('@').next().unwrap_or_default().to_string();
            Some(ldap)
        }
        None => {
            error!("No email found in profile data");
            Some(FALLBACK_LDAP.to_string())
        }
    }
}
