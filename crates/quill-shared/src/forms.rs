//! Form schemas with typed field validators.
//!
//! Each form validates itself and reports a structured error set; a
//! failed validation performs no mutation and maps to a 422 response
//! carrying the field errors.

use serde::{Deserialize, Serialize};

const MAX_TITLE_LEN: usize = 200;
const MAX_COMMENT_AUTHOR_LEN: usize = 80;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Post authoring form (create and edit).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "title is required"));
        } else if self.title.chars().count() > MAX_TITLE_LEN {
            errors.push(FieldError::new(
                "title",
                format!("title must be at most {MAX_TITLE_LEN} characters"),
            ));
        }
        if self.body.trim().is_empty() {
            errors.push(FieldError::new("body", "body is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Visitor comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    pub author: String,
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.author.trim().is_empty() {
            errors.push(FieldError::new("author", "author is required"));
        } else if self.author.chars().count() > MAX_COMMENT_AUTHOR_LEN {
            errors.push(FieldError::new(
                "author",
                format!("author must be at most {MAX_COMMENT_AUTHOR_LEN} characters"),
            ));
        }
        if self.text.trim().is_empty() {
            errors.push(FieldError::new("text", "text is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        let len = self.username.chars().count();
        if len < MIN_USERNAME_LEN || len > MAX_USERNAME_LEN {
            errors.push(FieldError::new(
                "username",
                format!("username must be {MIN_USERNAME_LEN}-{MAX_USERNAME_LEN} characters"),
            ));
        } else if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            errors.push(FieldError::new(
                "username",
                "username may contain only letters, digits and underscores",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if self.password != self.password_confirm {
            errors.push(FieldError::new(
                "password_confirm",
                "passwords do not match",
            ));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "username is required"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "password is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
