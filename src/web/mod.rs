mod http;
mod resolver;

use scraper::Html;
use url::Url;

pub use http::HttpClient;
pub use resolver::{LinkResolver, Resolved, SitePageResolver};

use crate::result::Result;

/// Interface for getting the HTML document of a page
pub trait DocumentFetcher {
    /// Fetch and parse the document.
    ///
    /// A transport error or a non-success status code must return [`crate::result::Error::Fetch`].
    fn fetch(&self, url: &str) -> Result<Html>;
}

/// Interface for checking that a URL is alive without transferring its body
pub trait LivenessProbe {
    /// Return the HTTP status code of the URL.
    ///
    /// An error means the probe could not reach the server at all.
    fn status(&self, url: &str) -> Result<u16>;
}

/// Resolve a link found on a page against the page URL.
///
/// Absolute links are returned unchanged. Return `None` for links that cannot be resolved.
pub fn absolute_link(page_url: &str, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(page_url)
            .and_then(|base| base.join(href))
            .ok()
            .map(Into::into),
        Err(_) => None,
    }
}
