use serde::Deserialize;

use crate::MAX_MESSAGE_LEN;

// Every field defaults so that a missing form body never rejects the request
// before the session check runs.

// -- Auth --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
}

impl SignupForm {
    /// Returns the first problem with the submitted fields, if any.
    pub fn problem(&self) -> Option<&'static str> {
        if self.username.trim().is_empty() {
            return Some("Username is required.");
        }
        if !self.email.contains('@') {
            return Some("A valid e-mail address is required.");
        }
        if self.password.len() < 6 {
            return Some("Password must be at least 6 characters.");
        }
        None
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserSearch {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Current password, re-verified before any change is applied.
    pub password: String,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub text: String,
}

impl MessageForm {
    pub fn problem(&self) -> Option<&'static str> {
        let len = self.text.trim().chars().count();
        if len == 0 {
            Some("Message text is required.")
        } else if len > MAX_MESSAGE_LEN {
            Some("Messages are limited to 140 characters.")
        } else {
            None
        }
    }
}

/// Browsers submit untouched optional inputs as empty strings.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
