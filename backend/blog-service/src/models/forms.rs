//! Validated inputs, one per mutating operation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

pub const MAX_USERNAME_LEN: usize = 150;

/// Post create/edit input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Group to tag the post with; `None` leaves it untagged
    #[serde(default)]
    pub group: Option<i64>,
    /// Storage key of a freshly uploaded attachment
    #[serde(default)]
    #[validate(length(max = 255, message = "image key is too long"))]
    pub image: Option<String>,
    /// Drop the current attachment (edit only)
    #[serde(default)]
    pub clear_image: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

/// Administrative group creation input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewGroup {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "title is too long")
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(
        custom(function = "valid_slug"),
        length(max = 200, message = "slug is too long")
    )]
    pub slug: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field is required.".into());
        return Err(err);
    }
    Ok(())
}

fn valid_slug(value: &str) -> Result<(), ValidationError> {
    if !SLUG_RE.is_match(value) {
        let mut err = ValidationError::new("slug");
        err.message =
            Some("Use only letters, numbers, underscores or hyphens.".into());
        return Err(err);
    }
    Ok(())
}

/// Usernames follow the identity provider's rules.
pub fn username_is_valid(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LEN
        && USERNAME_RE.is_match(username)
}
