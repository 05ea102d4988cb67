//! Remote fetching with the one-hop redirection policy.

use crate::config::SourceOptions;
use crate::error::SourceError;
use oxhttp::model::header::{ACCEPT, CONTENT_TYPE, HeaderName, LOCATION};
use oxhttp::model::{Request, StatusCode};
use oxiri::Iri;
use std::fmt;
use std::io::{Error, ErrorKind, Read, Result};
use tracing::debug;

/// Prefix of the error `oxhttp` returns instead of a redirection it does not follow.
const REFUSED_REDIRECTION: &str = "The server requested too many redirects";
const REFUSED_REDIRECTION_TARGET: &str = "The latest redirection target is ";

/// The parts of an HTTP answer the pipeline looks at.
pub struct FetchResponse {
    /// The URL that was requested, used as the base IRI of the body.
    pub url: String,
    pub status: u16,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub body: Box<dyn Read>,
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("location", &self.location)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Issues a single `GET` request without following redirections.
///
/// A redirection is returned as is, with its absolute or relative `location`.
pub trait Fetch {
    fn get(&self, url: &str, accept: &str) -> Result<FetchResponse>;
}

/// [`Fetch`] implementation on top of the `oxhttp` client.
///
/// The client never follows redirections itself. It reports them as an error
/// carrying the resolved target, which is turned back into a `302` answer so
/// that [`fetch_following_one_redirect`] applies the policy and knows the final URL.
pub struct HttpFetcher {
    client: oxhttp::Client,
}

impl HttpFetcher {
    pub fn new(options: &SourceOptions) -> Result<Self> {
        let mut client = oxhttp::Client::new()
            .with_redirection_limit(0)
            .with_user_agent(options.user_agent.clone())
            .map_err(invalid_input_error)?;
        if let Some(timeout) = options.http_timeout {
            client = client.with_global_timeout(timeout);
        }
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str, accept: &str) -> Result<FetchResponse> {
        let request = Request::builder()
            .uri(url)
            .header(ACCEPT, accept)
            .body(())
            .map_err(invalid_input_error)?;
        let response = match self.client.request(request) {
            Ok(response) => response,
            Err(e) => {
                return refused_redirection_target(&e)
                    .map(|target| FetchResponse {
                        url: url.to_owned(),
                        status: StatusCode::FOUND.as_u16(),
                        location: Some(target),
                        content_type: None,
                        body: Box::new(std::io::empty()),
                    })
                    .ok_or(e);
            }
        };
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let location = header(LOCATION);
        let content_type = header(CONTENT_TYPE);
        Ok(FetchResponse {
            url: url.to_owned(),
            status: response.status().as_u16(),
            location,
            content_type,
            body: Box::new(response.into_body()),
        })
    }
}

fn refused_redirection_target(error: &Error) -> Option<String> {
    if error.kind() != ErrorKind::Other {
        return None;
    }
    let message = error.get_ref()?.to_string();
    if !message.starts_with(REFUSED_REDIRECTION) {
        return None;
    }
    let (_, target) = message.split_once(REFUSED_REDIRECTION_TARGET)?;
    Some(target.to_owned())
}

/// Fetches `url`, following at most one redirection.
///
/// Redirections are the `301`, `302`, `303`, `307` and `308` answers, on both
/// hops. A second redirection, a redirection while they are disabled and any
/// other non-2xx status are errors.
pub fn fetch_following_one_redirect(
    fetch: &dyn Fetch,
    url: &str,
    accept: &str,
    follow_redirects: bool,
) -> std::result::Result<FetchResponse, SourceError> {
    let response = fetch.get(url, accept).map_err(|e| SourceError::io(url, e))?;
    match response.status {
        200..=299 => Ok(response),
        status if is_redirection(status) && follow_redirects => {
            let target = redirect_target(url, response.location.as_deref())?;
            debug!(from = url, to = %target, "following redirection");
            let response = fetch
                .get(&target, accept)
                .map_err(|e| SourceError::io(&target, e))?;
            match response.status {
                200..=299 => Ok(response),
                status if is_redirection(status) => {
                    Err(SourceError::TooManyRedirects { location: target })
                }
                status => Err(SourceError::Status {
                    location: target,
                    status,
                }),
            }
        }
        status if is_redirection(status) => Err(SourceError::RedirectDisabled {
            location: url.to_owned(),
        }),
        status => Err(SourceError::Status {
            location: url.to_owned(),
            status,
        }),
    }
}

fn is_redirection(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

fn redirect_target(url: &str, location: Option<&str>) -> std::result::Result<String, SourceError> {
    let location = location.ok_or_else(|| SourceError::MissingLocation {
        location: url.to_owned(),
    })?;
    let invalid = |error| SourceError::InvalidRedirect {
        location: url.to_owned(),
        target: location.to_owned(),
        error,
    };
    let base = Iri::parse(url).map_err(invalid)?;
    Ok(base.resolve(location).map_err(invalid)?.into_inner())
}

fn invalid_input_error(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(ErrorKind::InvalidInput, error)
}
