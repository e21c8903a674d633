//! HTTP(S) fetcher.
//!
//! A [`Session`] wraps one libcurl Easy handle for the whole snapshot, so the
//! page and all of its assets share the connection cache, cookie engine and
//! request headers. Bodies are buffered in memory.

mod error;

pub use error::{classify_curl_error, FetchError, FetchErrorKind};

use std::time::Duration;
use url::Url;

/// Anything that can turn a URL into response bytes.
///
/// The archiver only depends on this trait; [`Session`] is the libcurl
/// implementation.
pub trait Fetch {
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Knobs applied to every request of a session.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
            max_redirections: 10,
            user_agent: concat!("pagezip/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Reusable connection context for one snapshot run.
pub struct Session {
    easy: curl::easy::Easy,
}

impl Session {
    /// Build a session. Fails only if libcurl rejects an option.
    pub fn new(opts: &FetchOptions) -> Result<Self, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(opts.max_redirections)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.timeout(opts.timeout)?;
        easy.useragent(&opts.user_agent)?;
        // Empty path: enable the in-memory cookie engine without reading a file.
        easy.cookie_file("")?;
        easy.accept_encoding("")?;
        Ok(Session { easy })
    }

    fn perform(&mut self, url: &Url) -> Result<(Vec<u8>, u32), curl::Error> {
        let mut body = Vec::new();
        self.easy.url(url.as_str())?;
        self.easy.get(true)?;
        {
            let mut transfer = self.easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        let code = self.easy.response_code()?;
        Ok((body, code))
    }
}

impl Fetch for Session {
    fn fetch(&mut self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let (body, status) = self.perform(url).map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        tracing::trace!(%url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
