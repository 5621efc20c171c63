//! In-memory collaborators recording how they are used

use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use scraper::Html;

use crate::{
    outside::{MetadataEmbedder, StreamTransfer, TransferRequest},
    result::{bail, Error, Result},
    web::{DocumentFetcher, LinkResolver, LivenessProbe, Resolved},
};

/// Serve fixed pages, any other URL is a fetch error
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn new<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url.to_owned(), html.to_owned()))
                .collect(),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl DocumentFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Html> {
        self.calls.borrow_mut().push(url.to_owned());
        match self.pages.get(url) {
            Some(html) => Ok(Html::parse_document(html)),
            None => Err(Error::Fetch {
                url: url.to_owned(),
                reason: "status 404 Not Found".to_owned(),
            }),
        }
    }
}

/// Resolve listings from a fixed table
#[derive(Default)]
pub struct FakeResolver {
    resolved: HashMap<String, Resolved>,
    calls: RefCell<Vec<String>>,
}

impl FakeResolver {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        Self {
            resolved: entries
                .into_iter()
                .map(|(listing, stream)| {
                    let resolved = Resolved {
                        stream_url: stream.map(str::to_owned),
                        source_site: Some("Chaturbate".to_owned()),
                    };
                    (listing.to_owned(), resolved)
                })
                .collect(),
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl LinkResolver for FakeResolver {
    fn resolve(&self, listing_url: &str) -> Result<Resolved> {
        self.calls.borrow_mut().push(listing_url.to_owned());
        Ok(self.resolved.get(listing_url).cloned().unwrap_or_default())
    }
}

/// Every URL answers with the same status, except the dead ones
#[derive(Default)]
pub struct FakeProbe {
    dead: Vec<String>,
    unreachable: bool,
}

impl FakeProbe {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_dead<'a>(dead: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            dead: dead.into_iter().map(str::to_owned).collect(),
            unreachable: false,
        }
    }

    /// No URL can be reached at all
    pub fn unreachable() -> Self {
        Self {
            dead: vec![],
            unreachable: true,
        }
    }
}

impl LivenessProbe for FakeProbe {
    fn status(&self, url: &str) -> Result<u16> {
        if self.unreachable {
            return Err(Error::Fetch {
                url: url.to_owned(),
                reason: "connection refused".to_owned(),
            });
        }

        Ok(if self.dead.iter().any(|d| d == url) {
            404
        } else {
            200
        })
    }
}

/// Write a small file at the destination, unless the stream is listed as failing
#[derive(Default)]
pub struct FakeTransfer {
    failing: Vec<String>,
    not_runnable: bool,
    calls: RefCell<Vec<TransferRequest>>,
}

impl FakeTransfer {
    pub fn failing<'a>(streams: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            failing: streams.into_iter().map(str::to_owned).collect(),
            ..Self::default()
        }
    }

    /// The downloader cannot even be started
    pub fn not_runnable() -> Self {
        Self {
            not_runnable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<TransferRequest> {
        self.calls.borrow().clone()
    }
}

impl StreamTransfer for FakeTransfer {
    fn transfer(&self, request: &TransferRequest) -> Result<()> {
        self.calls.borrow_mut().push(request.clone());
        if self.not_runnable {
            return bail("Could not spawn yt-dlp: No such file or directory");
        }
        if !self.failing.contains(&request.stream_url) {
            std::fs::write(&request.destination, b"fake mp4").unwrap();
        }
        Ok(())
    }
}

/// Record the comments it is asked to embed
#[derive(Default)]
pub struct FakeEmbedder {
    fail: bool,
    calls: RefCell<Vec<(PathBuf, String)>>,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.borrow().clone()
    }
}

impl MetadataEmbedder for FakeEmbedder {
    fn embed_comment(&self, file: &Path, comment: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((file.to_path_buf(), comment.to_owned()));

        if self.fail {
            bail("Not an mp4 container")
        } else {
            Ok(())
        }
    }
}
