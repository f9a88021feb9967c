//! Short code generation and validation utilities.
//!
//! Generated and custom codes share one alphabet: ASCII letters and digits.

use crate::error::AppError;
use rand::Rng;

/// Symbols a short code may contain.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of machine-generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

pub const MIN_CUSTOM_CODE_LENGTH: usize = 3;
pub const MAX_CUSTOM_CODE_LENGTH: usize = 20;

/// Codes that would be shadowed by fixed routes next to `/{code}`.
pub const RESERVED_CODES: &[&str] = &["health", "api"];

/// Generates a random short code.
///
/// Each symbol is drawn independently and uniformly from [`ALPHABET`] using
/// the thread-local CSPRNG. Range sampling is unbiased, so every symbol has
/// probability 1/62.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    let mut rng = rand::rng();

    (0..GENERATED_CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if every character of `code` belongs to [`ALPHABET`].
pub fn is_valid_charset(code: &str) -> bool {
    code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Returns true if `code` collides with a fixed route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters and digits
/// - Not one of [`RESERVED_CODES`]
///
/// # Errors
///
/// Returns [`AppError::InvalidCustomCode`] if a rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let len = code.chars().count();
    if !(MIN_CUSTOM_CODE_LENGTH..=MAX_CUSTOM_CODE_LENGTH).contains(&len) {
        return Err(AppError::InvalidCustomCode(format!(
            "Custom code must be between {MIN_CUSTOM_CODE_LENGTH} and {MAX_CUSTOM_CODE_LENGTH} characters"
        )));
    }

    if !is_valid_charset(code) {
        return Err(AppError::InvalidCustomCode(
            "Custom code can only contain letters and numbers".to_string(),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::InvalidCustomCode(format!(
            "Custom code '{code}' is reserved"
        )));
    }

    Ok(())
}
