//! The context-variable bag.
//!
//! A small set of session-scoped fields (display name, location) echoed
//! to and from the gateway so agents keep continuity across turns. The
//! same shape is used in three places: the session's local bag, the
//! `context_variables` object on outbound requests, and the optional
//! override object on responses.

use serde::{Deserialize, Serialize};

/// Session context echoed to and from the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariables {
    /// Display name of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Free-form location string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ContextVariables {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sync rule for the client side: a field is overwritten only when
    /// the response supplies a new, *different* value for it. Absent or
    /// identical fields are left untouched. Returns true if anything
    /// changed.
    pub fn apply_updates(&mut self, updates: &ContextVariables) -> bool {
        let mut changed = false;
        if let Some(name) = &updates.user_name {
            if self.user_name.as_deref() != Some(name) {
                self.user_name = Some(name.clone());
                changed = true;
            }
        }
        if let Some(location) = &updates.location {
            if self.location.as_deref() != Some(location) {
                self.location = Some(location.clone());
                changed = true;
            }
        }
        changed
    }

    /// Merge rule for the server side: any field the other bag carries
    /// wins, mirroring a dict update.
    pub fn merge(&mut self, other: &ContextVariables) {
        if other.user_name.is_some() {
            self.user_name = other.user_name.clone();
        }
        if other.location.is_some() {
            self.location = other.location.clone();
        }
    }

    /// Display name with the fallback agents use in their instructions.
    pub fn user_name_or(&self, fallback: &str) -> String {
        self.user_name.clone().unwrap_or_else(|| fallback.into())
    }

    /// Location with the fallback agents use in their instructions.
    pub fn location_or(&self, fallback: &str) -> String {
        self.location.clone().unwrap_or_else(|| fallback.into())
    }
}
