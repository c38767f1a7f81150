//! Take name grammar.

use crate::config::Category;
use crate::error::TakeError;

/// Longest accepted take name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Punctuation accepted besides letters, digits and spaces
const ALLOWED_PUNCTUATION: &[char] = &['-', '_', '\'', '(', ')'];

/// Validate a user-supplied name and return its canonical (trimmed) form.
///
/// Checks run in order: length, then character set. Uniqueness is the
/// store's job since it needs the scope.
pub fn validate_name(candidate: &str) -> Result<String, TakeError> {
    let name = candidate.trim();

    if name.chars().count() > MAX_NAME_LEN {
        return Err(TakeError::TooLong);
    }

    if name.is_empty() || !name.chars().all(is_allowed_char) {
        return Err(TakeError::InvalidCharacters);
    }

    Ok(name.to_string())
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || c == ' ' || ALLOWED_PUNCTUATION.contains(&c)
}

/// Names are unique per scope regardless of case
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Name for a freshly recorded take: "<prefix> <n>" with n starting at count + 1.
///
/// The prefix is shortened when needed so the result always passes
/// `validate_name`.
pub fn next_default_name<'a>(
    category: Category,
    existing: impl IntoIterator<Item = &'a str> + Clone,
) -> String {
    let count = existing.clone().into_iter().count();
    let prefix = category.default_take_prefix();

    let mut index = count + 1;
    loop {
        let number = index.to_string();
        let room = MAX_NAME_LEN.saturating_sub(number.len() + 1);
        let short: String = prefix.chars().take(room).collect();
        let candidate = format!("{} {number}", short.trim_end());
        if !existing
            .clone()
            .into_iter()
            .any(|name| same_name(name, &candidate))
        {
            return candidate;
        }
        index += 1;
    }
}
