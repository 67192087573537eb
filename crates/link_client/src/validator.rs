use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::LinkKind,
    error::{ApiErrorBody, ValidationFailure, ValidationResult},
    protocol::ValidateLinkRequest,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

const SUBMIT_PATH: &str = "nonmembers/pings";

/// Confirms with a remote service that a URL is acceptable for a link kind.
///
/// Implementations must report every outcome through the returned
/// [`ValidationResult`]; transport problems become
/// [`ValidationFailure::Network`] rather than errors of their own.
#[async_trait]
pub trait RemoteValidator: Send + Sync {
    async fn validate(&self, kind: LinkKind, url: &str) -> ValidationResult;
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid API base url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("API base url must start with http:// or https://, got '{0}'")]
    UnsupportedScheme(String),
    #[error("API base url must not carry a query or fragment, got '{0}'")]
    UnexpectedQuery(String),
}

/// Resolved API routes, derived once from the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: Url,
    bookmark: Url,
    store: Url,
    submit: Url,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self, EndpointError> {
        let mut base = Url::parse(base_url.trim()).map_err(|source| EndpointError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(base_url.to_string()));
        }
        // `Url::join` would drop these from every route.
        if base.query().is_some() || base.fragment().is_some() {
            return Err(EndpointError::UnexpectedQuery(base_url.to_string()));
        }
        // A trailing slash makes `Url::join` append to the base path instead of replacing it.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path).map_err(|source| EndpointError::InvalidUrl {
                url: base_url.to_string(),
                source,
            })
        };
        let bookmark = join(LinkKind::Bookmark.validation_path())?;
        let store = join(LinkKind::Store.validation_path())?;
        let submit = join(SUBMIT_PATH)?;

        Ok(Self {
            base,
            bookmark,
            store,
            submit,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn validation_url(&self, kind: LinkKind) -> &Url {
        match kind {
            LinkKind::Bookmark => &self.bookmark,
            LinkKind::Store => &self.store,
        }
    }

    pub fn submit_url(&self) -> &Url {
        &self.submit
    }
}

pub struct HttpLinkValidator {
    http: Client,
    endpoints: ApiEndpoints,
}

impl HttpLinkValidator {
    pub fn new(endpoints: ApiEndpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(http: Client, endpoints: ApiEndpoints) -> Self {
        Self { http, endpoints }
    }
}

#[async_trait]
impl RemoteValidator for HttpLinkValidator {
    async fn validate(&self, kind: LinkKind, url: &str) -> ValidationResult {
        let endpoint = self.endpoints.validation_url(kind);
        let response = match self
            .http
            .put(endpoint.clone())
            .json(&ValidateLinkRequest {
                url: url.to_string(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%kind, %endpoint, %error, "link validation request failed");
                return Err(ValidationFailure::network());
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(%kind, status = status.as_u16(), "link accepted");
            return Ok(());
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.into_message(),
            Err(error) => {
                debug!(%kind, %error, "rejection body carried no readable message");
                None
            }
        };
        info!(%kind, status = status.as_u16(), "link rejected by server");
        Err(ValidationFailure::rejected(message))
    }
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
