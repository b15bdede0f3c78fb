//! URI and location helpers.

use blueprint_position_tracking::SourceLocation;
use std::path::{Path, PathBuf};
use url::Url;

/// Converts a `file://` URI string to a filesystem path.
pub fn uri_to_fs_path(uri: &str) -> Option<PathBuf> {
    Url::parse(uri).ok()?.to_file_path().ok()
}

/// Converts a filesystem path to a `file://` URI string.
pub fn fs_path_to_uri(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|u| u.to_string())
}

/// Builds an LSP location from a URI string and a resolved source location.
pub fn lsp_location(uri: &str, location: SourceLocation) -> Option<lsp_types::Location> {
    let uri: lsp_types::Uri = uri.parse().ok()?;
    Some(lsp_types::Location { uri, range: location.into() })
}

/// Whether `uri` names a Blueprint document.
pub fn is_bp_uri(uri: &str) -> bool {
    uri.ends_with(".bp")
}

/// Whether `uri` (or path) names a ticket file.
pub fn is_ticket_uri(uri: &str) -> bool {
    uri.ends_with(".tickets.json")
}

/// Bounded Levenshtein distance used by typo quick-fixes.
///
/// Returns `None` when the distance exceeds `max`, which keeps candidate
/// filtering cheap for long names.
pub fn edit_distance_within(a: &str, b: &str, max: usize) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
            row_min = row_min.min(current[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut current);
    }
    (prev[b.len()] <= max).then_some(prev[b.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_round_trip() {
        let uri = fs_path_to_uri(Path::new("/ws/specs/auth.bp")).unwrap();
        assert!(uri.starts_with("file://"));
        assert_eq!(uri_to_fs_path(&uri), Some(PathBuf::from("/ws/specs/auth.bp")));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance_within("basic", "basic", 2), Some(0));
        assert_eq!(edit_distance_within("basic", "basik", 2), Some(1));
        assert_eq!(edit_distance_within("basic", "bsic", 2), Some(1));
        assert_eq!(edit_distance_within("basic", "basics", 2), Some(1));
        assert_eq!(edit_distance_within("basic", "xyzzy", 2), None);
        assert_eq!(edit_distance_within("a", "abcd", 2), None);
    }
}
