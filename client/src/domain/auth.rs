//! Authentication primitives such as login credentials.
//!
//! Keep form parsing outside the services by exposing constructors that
//! validate string inputs before a screen talks to a port or service.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use super::DisplayName;
use super::ports::AvatarUpload;

/// Domain error returned when login form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email did not look like `local@domain`.
    MalformedEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::MalformedEmail => write!(f, "email must look like name@domain"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated login credentials used by the identity provider.
///
/// ## Invariants
/// - `email` is trimmed and shaped `local@domain.tld`.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if !email_regex().is_match(normalized) {
            return Err(LoginValidationError::MalformedEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the account key.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Minimum password length accepted by the hosted identity provider.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Password strength rule enforced before creating an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Build a policy requiring at least `min_length` characters.
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Minimum number of characters.
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Whether `password` satisfies the policy.
    pub fn accepts(&self, password: &str) -> bool {
        password.chars().count() >= self.min_length
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

/// Everything the registration form collects.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Full name stored on the profile document.
    pub display_name: DisplayName,
    /// Credentials for the new account.
    pub credentials: LoginCredentials,
    /// Optional picture chosen from the gallery or camera.
    pub avatar: Option<AvatarUpload>,
}
