//! Endpoint URL construction.

/// Strip trailing slashes so endpoints can be appended without doubling them.
///
/// ```
/// use accessai::utils::url::normalize_base_url;
///
/// assert_eq!(
///     normalize_base_url("https://generativelanguage.googleapis.com/v1beta/"),
///     "https://generativelanguage.googleapis.com/v1beta"
/// );
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use accessai::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://example.test/v1beta/", "/models/gemini-2.5-flash:generateContent"),
///     "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_slashes_and_whitespace() {
        assert_eq!(normalize_base_url("https://a.test/v1beta"), "https://a.test/v1beta");
        assert_eq!(normalize_base_url("https://a.test/v1beta///"), "https://a.test/v1beta");
        assert_eq!(normalize_base_url(" https://a.test/ "), "https://a.test");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        assert_eq!(
            construct_api_url("https://a.test/v1beta", "models"),
            "https://a.test/v1beta/models"
        );
        assert_eq!(
            construct_api_url("https://a.test/v1beta/", "///models"),
            "https://a.test/v1beta/models"
        );
    }
}
