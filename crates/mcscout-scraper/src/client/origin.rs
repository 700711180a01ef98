//! URL origin helpers for following links between the lookup pages.

/// Extracts the scheme+host origin from a URL.
///
/// Given `"https://ai.fmcsa.dot.gov/SMS/Carrier/123/CarrierRegistration.aspx"`,
/// returns `"https://ai.fmcsa.dot.gov"`.
#[must_use]
pub fn extract_origin(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |e| {
            tracing::debug!(
                url,
                error = %e,
                "could not parse URL, falling back to string split for origin extraction"
            );
            // fallback: take "https://host" by splitting on '/' and taking first 3 parts
            url.trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Joins a site-relative `href` onto `origin`.
///
/// Absolute `http(s)` links are returned unchanged.
#[must_use]
pub fn join_origin(origin: &str, href: &str) -> String {
    let href = href.trim();
    if is_absolute(href) {
        return href.to_owned();
    }
    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

/// Resolves a link found on the page at `page_url` against that page's origin.
///
/// Returns `None` for empty links.
#[must_use]
pub fn resolve_link(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if is_absolute(href) {
        return Some(href.to_owned());
    }
    Some(join_origin(&extract_origin(page_url), href))
}

fn is_absolute(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
