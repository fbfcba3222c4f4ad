//! URL utilities for consistent URL handling
//!
//! Base URLs come from configuration and may carry trailing slashes; these
//! helpers keep endpoint construction free of double slashes.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use persona_chat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v1beta"), "https://api.example.com/v1beta");
/// assert_eq!(normalize_base_url("https://api.example.com/v1beta///"), "https://api.example.com/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use persona_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1beta/", "/models/m:streamGenerateContent"),
///     "https://api.example.com/v1beta/models/m:streamGenerateContent"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Streaming endpoint for a model, requesting server-sent events.
pub fn stream_generate_url(base_url: &str, model: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    construct_api_url(
        base_url,
        &format!("models/{model}:streamGenerateContent?alt=sse"),
    )
}
