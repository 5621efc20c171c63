use std::{fmt::Display, path::PathBuf};

use miette::miette;

/// Why a listing URL could not be turned into a [`crate::identity::VideoListing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The last path segment does not start with the video ID
    NoLeadingDigits(String),

    /// The video ID does not fit in 64 bits
    IdOutOfRange(String),

    /// The last path segment does not end with a capture date and time
    NoTimestampMatch(String),

    /// The date and time digits are not a valid calendar instant
    InvalidDateTime(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::NoLeadingDigits(s) => write!(f, "No leading video ID in '{s}'"),
            ParseError::IdOutOfRange(s) => write!(f, "Video ID '{s}' is too large"),
            ParseError::NoTimestampMatch(s) => write!(f, "No trailing timestamp in '{s}'"),
            ParseError::InvalidDateTime(s) => write!(f, "Invalid date and time '{s}'"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub enum Error {
    /// A document could not be fetched, either from a transport error
    /// or a non-success status code
    Fetch { url: String, reason: String },

    Parse(ParseError),

    /// A ledger line does not follow the `<tag> <id>` format
    LedgerCorrupt {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// The file was downloaded but its provenance could not be written into it
    Embed {
        file: PathBuf,
        report: miette::Report,
    },

    Miette(miette::Report),
}

impl From<miette::Report> for Error {
    fn from(err: miette::Report) -> Self {
        Error::Miette(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<Error> for miette::Report {
    fn from(err: Error) -> Self {
        match err {
            Error::Fetch { url, reason } => miette!("Could not fetch {url}: {reason}"),
            Error::Parse(err) => miette!("{err}"),
            Error::LedgerCorrupt {
                path,
                line,
                content,
            } => miette!(
                "Archive ledger {} is corrupted at line {line}: {content:?}",
                path.display()
            ),
            Error::Embed { file, report } => report.wrap_err(format!(
                "Downloaded {} but could not embed its provenance, it is not archived",
                file.display()
            )),
            Error::Miette(err) => err,
        }
    }
}

impl Error {
    pub fn wrap_err_with<D, F>(self, f: F) -> Error
    where
        D: Display + Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        match self {
            Error::Miette(report) => Error::Miette(report.wrap_err(f())),
            err => err,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn err_msg<D: Display>(msg: D) -> Error {
    Error::Miette(miette!("{msg}"))
}

pub fn bail<T, D: Display>(msg: D) -> Result<T> {
    Err(err_msg(msg))
}
