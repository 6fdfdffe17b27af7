//! Model identity resolution
//!
//! A reference containing a `/` (after trimming surrounding slashes) is
//! already a name. Anything else is a candidate ID, matched against the
//! short ID, the bare digest and the full ID of each listed model.

use crate::protocol::Model;

/// Whether `reference` is a repository-qualified name rather than an ID
pub fn is_qualified_name(reference: &str) -> bool {
    reference.trim_matches('/').contains('/')
}

/// Canonical name (first tag) of the first model matching `candidate`
///
/// Models with malformed IDs are skipped when they cannot match. A matching
/// model without tags has no name to offer and yields `None`.
pub fn find_model_name<'a>(models: &'a [Model], candidate: &str) -> Option<&'a str> {
    models
        .iter()
        .find(|model| model.matches_id(candidate))
        .and_then(Model::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "deadbeefcafe0123456789abcdef0123456789abcdef0123456789abcdef0123";

    fn models() -> Vec<Model> {
        vec![
            Model {
                id: "short".to_string(),
                tags: vec!["broken/model:latest".to_string()],
                ..Default::default()
            },
            Model {
                id: format!("sha256:{}", DIGEST),
                tags: vec!["repo/name:tag".to_string(), "repo/name:other".to_string()],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_is_qualified_name() {
        assert!(is_qualified_name("ai/smollm2"));
        assert!(is_qualified_name("/ai/smollm2:latest/"));
        assert!(!is_qualified_name("deadbeefcafe"));
        assert!(!is_qualified_name("/smollm2/"));
        assert!(!is_qualified_name(""));
    }

    #[test]
    fn test_resolve_by_short_id() {
        assert_eq!(find_model_name(&models(), "deadbeefcafe"), Some("repo/name:tag"));
    }

    #[test]
    fn test_resolve_by_bare_digest() {
        assert_eq!(find_model_name(&models(), DIGEST), Some("repo/name:tag"));
    }

    #[test]
    fn test_resolve_by_full_id() {
        let full = format!("sha256:{}", DIGEST);
        assert_eq!(find_model_name(&models(), &full), Some("repo/name:tag"));
    }

    #[test]
    fn test_malformed_id_matches_only_verbatim() {
        assert_eq!(find_model_name(&models(), "short"), Some("broken/model:latest"));
        assert_eq!(find_model_name(&models(), "sho"), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(find_model_name(&models(), "000000000000"), None);
        assert_eq!(find_model_name(&[], "deadbeefcafe"), None);
    }

    #[test]
    fn test_match_without_tags() {
        let untagged = vec![Model {
            id: format!("sha256:{}", DIGEST),
            ..Default::default()
        }];
        assert_eq!(find_model_name(&untagged, "deadbeefcafe"), None);
    }
}
