use thiserror::Error;

/// Failure taxonomy surfaced by the core.
///
/// The boundary layer (CLI, HTTP handler, ...) decides how each variant is
/// presented; upstream detail in `Upstream` and `Malformed` is for logs and
/// must not be shown verbatim to end users.
#[derive(Debug, Error)]
pub enum Error {
    /// The geocoding upstream returned no candidates for the query.
    #[error("no matching location found")]
    NotFound,

    /// Transport failure or non-success status from an upstream API.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Upstream body could not be parsed at all.
    #[error("unexpected upstream payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
