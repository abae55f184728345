//! User record

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CollectionKind, Record};

/// A registered account
///
/// Credentials are opaque to the store: `password_hash` and
/// `refresh_secret` are produced and checked by the auth layer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id, `0` until inserted
    pub id: u64,

    /// Login email (uniqueness is the caller's concern)
    pub email: String,

    /// Password hash as produced by the auth layer
    #[serde(rename = "password")]
    pub password_hash: String,

    /// Secret behind the outstanding refresh credential, if any
    #[serde(rename = "refresh_token_secret", default)]
    pub refresh_secret: Option<String>,

    /// Set by the billing webhook once the account is upgraded
    #[serde(rename = "is_chirpy_red", default)]
    pub is_upgraded: bool,
}

impl User {
    /// Create a new, not yet stored user
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: 0,
            email: email.into(),
            password_hash: password_hash.into(),
            refresh_secret: None,
            is_upgraded: false,
        }
    }

    /// Drop the outstanding refresh credential
    pub fn revoke_refresh(&mut self) {
        self.refresh_secret = None;
    }
}

impl Record for User {
    const KIND: CollectionKind = CollectionKind::Users;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

// Keep credentials out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field(
                "refresh_secret",
                &self.refresh_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("is_upgraded", &self.is_upgraded)
            .finish()
    }
}
