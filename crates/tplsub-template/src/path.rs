//! Lexical slash-separated path helpers.
//!
//! These never touch the filesystem; they only rearrange text, treating `/`
//! as the separator on every platform.

/// Returns the shortest path equivalent to `path` by lexical processing.
///
/// Repeated separators collapse, `.` elements drop, and `..` removes the
/// element before it. A rooted path never climbs above `/`. The empty path
/// cleans to `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Returns the last element of `path`, ignoring trailing separators.
///
/// `""` gives `.` and an all-separator path gives `/`.
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed
        .rsplit_once('/')
        .map_or(trimmed, |(_, last)| last)
        .to_string()
}

/// Returns all but the last element of `path`, cleaned.
///
/// A path with no separator gives `.`.
pub fn dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => clean(&path[..=idx]),
        None => ".".to_string(),
    }
}

/// Returns the extension of the last element: the text from its final `.`,
/// or the empty string if it has none.
pub fn ext(path: &str) -> String {
    for (idx, c) in path.char_indices().rev() {
        match c {
            '/' => break,
            '.' => return path[idx..].to_string(),
            _ => {}
        }
    }
    String::new()
}

/// Joins the non-empty segments with `/` and cleans the result.
///
/// Joining nothing (or only empty segments) gives the empty string.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join("/"))
}
