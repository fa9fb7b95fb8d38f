// (c) 2025 Ross Younger

//! Interactive terminal input and client-side validation

use anyhow::Result;
use console::Term;

/// Minimum acceptable username length at registration
pub(crate) const MINIMUM_USERNAME_LENGTH: usize = 8;
/// Minimum acceptable password length at registration
pub(crate) const MINIMUM_PASSWORD_LENGTH: usize = 8;

/// Writes `text` and reads one line.
pub(crate) fn prompt(term: &Term, text: &str) -> Result<String> {
    term.write_str(text)?;
    Ok(term.read_line()?)
}

/// As [`prompt`], but without echoing.
pub(crate) fn prompt_secret(term: &Term, text: &str) -> Result<String> {
    term.write_str(text)?;
    Ok(term.read_secure_line()?)
}

/// Strength gate applied at registration time. Returns the failed
/// requirements, empty if the credentials are acceptable.
pub(crate) fn credential_weaknesses(username: &str, password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if username.chars().count() < MINIMUM_USERNAME_LENGTH {
        problems.push(format!(
            "username must be at least {MINIMUM_USERNAME_LENGTH} characters"
        ));
    }
    if password.chars().count() < MINIMUM_PASSWORD_LENGTH {
        problems.push(format!(
            "password must be at least {MINIMUM_PASSWORD_LENGTH} characters"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("password needs at least one digit".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("password needs at least one capital letter".to_string());
    }
    problems
}

/// Directory names sent to the server must be relative, with alphanumeric
/// path segments only.
pub(crate) fn valid_directory_name(name: &str) -> bool {
    if name.starts_with('/') {
        return false;
    }
    let segments: String = name.chars().filter(|c| *c != '/').collect();
    !segments.is_empty() && segments.chars().all(char::is_alphanumeric)
}
