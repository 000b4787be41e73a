//! Small string helpers shared by handlers and the repository.

use std::collections::HashSet;

/// Lowercases, trims and joins whitespace-separated words with `-`.
pub fn generate_slug(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Keeps the first occurrence of every non-empty value, preserving order.
pub fn remove_duplicate_strings(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

/// Strips stray quotes and returns the last path segment of an image URL.
pub fn clean_image_url(url: &str) -> String {
    let trimmed = url.trim_matches('"');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// Basename of the URL path, or the input unchanged when it is not a URL.
pub fn object_name_from_url(file_url: &str) -> String {
    match url::Url::parse(file_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => file_url.to_string(),
    }
}

/// Interprets HTML form checkbox/select values.
pub fn parse_bool_field(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on")
}

/// Splits a comma-separated list, dropping blanks and surrounding quotes.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
