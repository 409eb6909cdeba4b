use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// The single contact kept by older versions of the app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyContact {
    pub name: String,
    pub phone: String,
}

/// A person the user can reach from the emergency toolkit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl TrustedContact {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            is_default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Name and phone as typed into the contact form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Trimmed `(name, phone)`, or an error if either is blank.
    pub(crate) fn validated(&self) -> Result<(String, String), StoreError> {
        let name = self.name.trim();
        let phone = self.phone.trim();

        if name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "contact name must not be empty".to_string(),
            ));
        }
        if phone.is_empty() {
            return Err(StoreError::InvalidArgument(
                "contact phone must not be empty".to_string(),
            ));
        }

        Ok((name.to_string(), phone.to_string()))
    }
}

/// Keep the default flag on the first flagged contact only.
pub(crate) fn keep_single_default(contacts: &mut [TrustedContact]) {
    let mut seen = false;
    for contact in contacts.iter_mut() {
        if contact.is_default {
            if seen {
                contact.is_default = false;
            }
            seen = true;
        }
    }
}

/// Flag the first contact as default when none is.
pub(crate) fn promote_first_if_no_default(contacts: &mut [TrustedContact]) {
    if contacts.iter().any(|c| c.is_default) {
        return;
    }
    if let Some(first) = contacts.first_mut() {
        first.is_default = true;
    }
}
