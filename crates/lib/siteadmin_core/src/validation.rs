//! Form checks run before any request is sent.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const OTP_LEN: usize = 6;
/// Largest accepted avatar upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// `None` only if the pattern fails to compile, which is logged when first
/// used; every address is then rejected.
static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .inspect_err(|e| error!(error = %e, "email pattern failed to compile"))
        .ok()
});

/// Field name to messages, sorted by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid input: ")?;
        for (i, (field, messages)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "email is not a valid address");
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    if password.is_empty() {
        errors.add(field, "password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            field,
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

pub fn login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, "password", password);
    errors.into_result()
}

pub fn forgot_password(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    errors.into_result()
}

pub fn change_password(
    email: &str,
    otp: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);

    if otp.trim().is_empty() {
        errors.add("otp", "one-time code is required");
    } else if otp.chars().count() != OTP_LEN {
        errors.add("otp", format!("one-time code must be {OTP_LEN} characters"));
    }

    check_password(&mut errors, "new_password", new_password);
    if confirm_password.is_empty() {
        errors.add("confirm_password", "confirm the new password");
    } else if confirm_password != new_password {
        errors.add("confirm_password", "passwords do not match");
    }
    errors.into_result()
}

pub fn register(full_name: &str, email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if full_name.trim().is_empty() {
        errors.add("full_name", "full name is required");
    }
    check_email(&mut errors, email);
    check_password(&mut errors, "password", password);
    errors.into_result()
}

pub fn profile(
    full_name: &str,
    email: &str,
    avatar_bytes: Option<usize>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if full_name.trim().is_empty() {
        errors.add("full_name", "full name is required");
    }
    check_email(&mut errors, email);
    if avatar_bytes.is_some_and(|n| n > MAX_AVATAR_BYTES) {
        errors.add("profile_image", "image must not exceed 5MB");
    }
    errors.into_result()
}
