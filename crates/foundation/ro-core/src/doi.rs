//! DOI normalization.
//!
//! The success status of a published record carries either a full resolver
//! URL or a bare/prefixed DOI (`doi:10.5072/FK2ABC`). Clients always get an
//! absolute URL.

/// Resolver prepended to DOIs that are not already URLs.
pub const DOI_RESOLVER_BASE: &str = "http://dx.doi.org/";

/// Turn a DOI source string into an absolute URL.
///
/// Strings starting with `http` pass through unchanged. Anything else loses
/// everything up to and including the first `:` and gets the resolver base
/// prepended. A string without a colon is prefixed as a whole, so
/// `"Not Found"` becomes `"http://dx.doi.org/Not Found"`.
pub fn normalize_doi(source: &str) -> String {
    if source.starts_with("http") {
        return source.to_string();
    }
    let identifier = match source.find(':') {
        Some(idx) => &source[idx + 1..],
        None => source,
    };
    format!("{DOI_RESOLVER_BASE}{identifier}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_doi_becomes_url() {
        assert_eq!(
            normalize_doi("doi:10.5072/ABC"),
            "http://dx.doi.org/10.5072/ABC"
        );
    }

    #[test]
    fn test_http_doi_unchanged() {
        let url = "https://doi.org/10.5072/FK2XYZ";
        assert_eq!(normalize_doi(url), url);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for source in ["doi:10.5072/ABC", "10.5072/ABC", "http://x.org/1", "Not Found"] {
            let once = normalize_doi(source);
            assert_eq!(normalize_doi(&once), once);
        }
    }

    #[test]
    fn test_only_first_colon_is_stripped() {
        assert_eq!(
            normalize_doi("ark:/99999:fk4"),
            "http://dx.doi.org//99999:fk4"
        );
    }

    #[test]
    fn test_no_colon_prefixes_whole_string() {
        assert_eq!(normalize_doi("10.5072/ABC"), "http://dx.doi.org/10.5072/ABC");
        assert_eq!(normalize_doi("Not Found"), "http://dx.doi.org/Not Found");
    }
}
