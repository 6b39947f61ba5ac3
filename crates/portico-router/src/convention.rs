//! Segment-to-name mapping for convention inference.
//!
//! URL segments are joined into candidate controller names (PascalCase)
//! and action names (camelCase). Hyphens and underscores inside a segment
//! are word separators: `user-profiles` becomes `UserProfiles`.

use http::Method;

/// Converts one URL segment to PascalCase.
fn pascal_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for word in segment.split(['-', '_']).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Joins segments into a PascalCase controller-name candidate.
///
/// `["admin", "users"]` becomes `"AdminUsers"`.
pub(crate) fn pascal_join(segments: &[&str]) -> String {
    segments.iter().map(|s| pascal_segment(s)).collect()
}

/// Joins segments into a camelCase action-name candidate.
///
/// `["bar", "baz"]` becomes `"barBaz"`.
pub(crate) fn camel_join(segments: &[&str]) -> String {
    let pascal = pascal_join(segments);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => pascal,
    }
}

/// REST-convention fallback action for a verb, when no segment names one.
pub(crate) fn rest_fallback(method: &Method) -> Option<&'static str> {
    match *method {
        Method::GET => Some("index"),
        Method::POST => Some("store"),
        Method::PUT | Method::PATCH => Some("update"),
        Method::DELETE => Some("destroy"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_join_capitalizes_each_segment() {
        assert_eq!(pascal_join(&["users"]), "Users");
        assert_eq!(pascal_join(&["admin", "users"]), "AdminUsers");
    }

    #[test]
    fn pascal_join_splits_on_separators() {
        assert_eq!(pascal_join(&["user-profiles"]), "UserProfiles");
        assert_eq!(pascal_join(&["user_profiles"]), "UserProfiles");
    }

    #[test]
    fn camel_join_lowercases_the_first_word() {
        assert_eq!(camel_join(&["show"]), "show");
        assert_eq!(camel_join(&["bar", "baz"]), "barBaz");
        assert_eq!(camel_join(&["reset-password"]), "resetPassword");
    }

    #[test]
    fn rest_fallback_covers_the_crud_verbs() {
        assert_eq!(rest_fallback(&Method::GET), Some("index"));
        assert_eq!(rest_fallback(&Method::POST), Some("store"));
        assert_eq!(rest_fallback(&Method::PUT), Some("update"));
        assert_eq!(rest_fallback(&Method::PATCH), Some("update"));
        assert_eq!(rest_fallback(&Method::DELETE), Some("destroy"));
        assert_eq!(rest_fallback(&Method::OPTIONS), None);
    }
}
