use yamler_core::{FetchConfig, YamlerError};

const BLOB_SEGMENT: &str = "/blob/";

/// Check that `url` is something worth fetching.
///
/// Leading and trailing whitespace is ignored for both checks, so
/// `" https://…"` is accepted, and the trimmed URL is returned.
///
/// # Errors
///
/// Returns [`YamlerError::Input`] if the URL is empty or does not start with
/// `http://` or `https://`.
///
/// # Examples
///
/// ```
/// use yamler_fetch::url::validate;
///
/// assert_eq!(validate("  https://example.com/values.yaml ").unwrap(), "https://example.com/values.yaml");
/// assert!(validate("").is_err());
/// assert!(validate("ftp://example.com/values.yaml").is_err());
/// ```
pub fn validate(url: &str) -> Result<&str, YamlerError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(YamlerError::Input("please enter a URL".into()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(YamlerError::Input(
            "please enter a valid URL (must start with http:// or https://)".into(),
        ));
    }
    Ok(url)
}

/// Rewrites repository viewer links into raw-content links.
///
/// # Examples
///
/// ```
/// use yamler_fetch::url::UrlNormalizer;
///
/// let normalizer = UrlNormalizer::default();
/// assert_eq!(
///     normalizer.normalize("https://github.com/x/y/blob/main/values.yaml"),
///     "https://raw.githubusercontent.com/x/y/main/values.yaml"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    raw_host: String,
    repo_host: String,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl UrlNormalizer {
    /// Use the hosts configured under `[fetch]`.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            raw_host: config.raw_host.clone(),
            repo_host: config.repo_host.clone(),
        }
    }

    /// Return the URL that serves the file's literal bytes.
    ///
    /// Raw-host URLs and anything that is not a repository `/blob/` link pass
    /// through unchanged.
    pub fn normalize(&self, url: &str) -> String {
        if url.contains(&self.raw_host) {
            return url.to_string();
        }
        if url.contains(&self.repo_host) && url.contains(BLOB_SEGMENT) {
            return url
                .replacen(&self.repo_host, &self.raw_host, 1)
                .replacen(BLOB_SEGMENT, "/", 1);
        }
        url.to_string()
    }
}

/// [`UrlNormalizer::normalize`] with the default hosts.
pub fn normalize(url: &str) -> String {
    UrlNormalizer::default().normalize(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_url_is_unchanged() {
        let url = "https://raw.githubusercontent.com/x/y/main/values.yaml";
        assert_eq!(normalize(url), url);
    }

    #[test]
    fn blob_url_becomes_raw() {
        assert_eq!(
            normalize("https://github.com/x/y/blob/main/values.yaml"),
            "https://raw.githubusercontent.com/x/y/main/values.yaml"
        );
    }

    #[test]
    fn nested_path_is_preserved() {
        assert_eq!(
            normalize("https://github.com/cert-manager/cert-manager/blob/v1.14.0/deploy/charts/cert-manager/values.yaml"),
            "https://raw.githubusercontent.com/cert-manager/cert-manager/v1.14.0/deploy/charts/cert-manager/values.yaml"
        );
    }

    #[test]
    fn repo_url_without_blob_is_unchanged() {
        let url = "https://github.com/x/y/tree/main/charts";
        assert_eq!(normalize(url), url);
    }

    #[test]
    fn other_hosts_are_unchanged() {
        let url = "https://example.com/blob/values.yaml";
        assert_eq!(normalize(url), url);
    }

    #[test]
    fn only_first_blob_segment_is_removed() {
        assert_eq!(
            normalize("https://github.com/x/y/blob/main/blob/values.yaml"),
            "https://raw.githubusercontent.com/x/y/main/blob/values.yaml"
        );
    }

    #[test]
    fn configured_hosts_are_used() {
        let config = FetchConfig {
            raw_host: "raw.git.example.com".into(),
            repo_host: "git.example.com".into(),
            ..FetchConfig::default()
        };
        let normalizer = UrlNormalizer::from_config(&config);
        assert_eq!(
            normalizer.normalize("https://git.example.com/x/y/blob/main/values.yaml"),
            "https://raw.git.example.com/x/y/main/values.yaml"
        );
        let raw = "https://raw.git.example.com/x/y/main/values.yaml";
        assert_eq!(normalizer.normalize(raw), raw);
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = validate("   ").unwrap_err();
        assert_eq!(err.to_string(), "please enter a URL");
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        let err = validate("github.com/x/y/blob/main/values.yaml").unwrap_err();
        assert!(matches!(err, YamlerError::Input(_)));
        assert!(err.to_string().contains("must start with http:// or https://"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            validate(" https://example.com/values.yaml\n").unwrap(),
            "https://example.com/values.yaml"
        );
    }

    #[test]
    fn plain_http_is_accepted() {
        assert_eq!(validate("http://localhost/values.yaml").unwrap(), "http://localhost/values.yaml");
    }
}
