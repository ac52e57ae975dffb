/// Longest filename kept from an upload, extension included.
const MAX_FILENAME_LEN: usize = 120;

#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Nothing usable is left after sanitizing.
    Empty,
    /// Name resolves to `.` or `..`.
    PathTraversal,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::PathTraversal => "Invalid filename: '.' and '..' are not allowed",
        }
    }
}

/// Reduces an uploaded filename to a safe basename.
///
/// Browsers may send a full client path, so only the part after the last
/// `/` or `\` is kept. Spaces become underscores and anything other than
/// alphanumerics, `-`, `_` and `.` is dropped.
pub fn sanitize_upload_name(raw: &str) -> Result<String, FilenameError> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    let cleaned: String = last
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if cleaned.is_empty() {
        return Err(FilenameError::Empty);
    }
    if cleaned == "." || cleaned == ".." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(truncate_keeping_extension(&cleaned, MAX_FILENAME_LEN))
}

fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    let keep = max.saturating_sub(ext.chars().count());
    let stem: String = stem.chars().take(keep).collect();
    format!("{stem}{ext}")
}

/// Splits `photo.tar.gz` into `("photo.tar", ".gz")`. A leading dot is part
/// of the stem.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Checks if a path string contains path traversal patterns.
pub fn contains_path_traversal(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Validates a storage path relative to the media root.
pub fn validate_relative_path(path: &str) -> Result<&str, &'static str> {
    if path.is_empty() {
        return Err("Path cannot be empty");
    }
    if path.contains('\0') || path.chars().any(|c| c.is_control()) {
        return Err("Path must not contain control characters");
    }
    if path.contains('\\') {
        return Err("Path must not contain backslashes");
    }
    if path.starts_with('/') {
        return Err("Path must not start with '/'");
    }
    if contains_path_traversal(path) {
        return Err("Path must not contain '..' traversal");
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == ".") {
        return Err("Path must not contain empty segments");
    }
    Ok(path)
}

/// Identifiers become a storage path segment, so they are limited to
/// characters that are safe in one.
pub fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && identifier
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
