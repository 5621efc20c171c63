use std::time::Duration;

use miette::{Context, IntoDiagnostic};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, REFERER},
};
use scraper::Html;
use tracing::{debug, trace};

use super::{DocumentFetcher, LivenessProbe};
use crate::{
    result::{Error, Result},
    site::random_user_agent,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP access to the site, posing as a browser coming from the site's home page
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(referer: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer)
                .into_diagnostic()
                .wrap_err("Invalid referer header value")?,
        );

        let user_agent = random_user_agent();
        debug!("HTTP user agent: {user_agent}");

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .into_diagnostic()
            .wrap_err("Could not build the HTTP client")?;

        Ok(Self { client })
    }
}

fn fetch_error(url: &str, reason: impl ToString) -> Error {
    Error::Fetch {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

impl DocumentFetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<Html> {
        debug!("GET {url}");
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|err| fetch_error(url, err))?;

        let status = res.status();
        if !status.is_success() {
            return Err(fetch_error(url, format!("status {status}")));
        }

        let body = res.text().map_err(|err| fetch_error(url, err))?;
        trace!("{url}: {} bytes long", body.len());

        Ok(Html::parse_document(&body))
    }
}

impl LivenessProbe for HttpClient {
    fn status(&self, url: &str) -> Result<u16> {
        debug!("HEAD {url}");
        let res = self
            .client
            .head(url)
            .send()
            .map_err(|err| fetch_error(url, err))?;

        Ok(res.status().as_u16())
    }
}
