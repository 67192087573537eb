//! Parent form combining the bookmark and store link fields.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use shared::{
    domain::LinkKind,
    error::ApiErrorBody,
    protocol::{CreatePingsRequest, SubmitLinksRequest},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    runtime::{spawn_watched_field, FieldHandle},
    validator::{ApiEndpoints, RemoteValidator},
};

/// Digits in a participant PIN.
pub const PIN_LENGTH: usize = 4;

/// Links already stored for the user; they start out as valid entries.
#[derive(Debug, Clone, Default)]
pub struct FormSeed {
    pub bookmark_urls: Vec<String>,
    pub store_urls: Vec<String>,
}

/// Name and PIN a first-time participant registers with.
#[derive(Clone, Default)]
pub struct NewParticipant {
    pub name: String,
    pub pin: String,
}

impl NewParticipant {
    pub fn new(name: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pin: pin.into(),
        }
    }

    /// A non-blank name and exactly [`PIN_LENGTH`] ASCII digits.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.pin.len() == PIN_LENGTH
            && self.pin.bytes().all(|b| b.is_ascii_digit())
    }
}

impl std::fmt::Debug for NewParticipant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewParticipant")
            .field("name", &self.name)
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("both link lists need at least one validated link")]
    Incomplete,
    #[error("a name and a {}-digit PIN are required", PIN_LENGTH)]
    MissingCredentials,
    #[error("submission rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("submission request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct LinkForm {
    bookmark: FieldHandle,
    store: FieldHandle,
    bookmark_links: watch::Receiver<Vec<String>>,
    store_links: watch::Receiver<Vec<String>>,
}

impl LinkForm {
    /// Spawns both link fields, sharing one validator.
    pub fn spawn(validator: Arc<dyn RemoteValidator>, seed: FormSeed) -> Self {
        let (bookmark, bookmark_links) =
            spawn_watched_field(LinkKind::Bookmark, seed.bookmark_urls, Arc::clone(&validator));
        let (store, store_links) = spawn_watched_field(LinkKind::Store, seed.store_urls, validator);
        Self {
            bookmark,
            store,
            bookmark_links,
            store_links,
        }
    }

    pub fn field(&self, kind: LinkKind) -> &FieldHandle {
        match kind {
            LinkKind::Bookmark => &self.bookmark,
            LinkKind::Store => &self.store,
        }
    }

    /// Latest validated links for `kind`, without blank strings.
    pub fn links(&self, kind: LinkKind) -> Vec<String> {
        let links = match kind {
            LinkKind::Bookmark => &self.bookmark_links,
            LinkKind::Store => &self.store_links,
        };
        links
            .borrow()
            .iter()
            .filter(|link| !link.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        LinkKind::ALL
            .into_iter()
            .all(|kind| !self.links(kind).is_empty())
    }

    /// Waits until either field publishes a new aggregate.
    ///
    /// Returns false when a field has shut down.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            result = self.bookmark_links.changed() => result.is_ok(),
            result = self.store_links.changed() => result.is_ok(),
        }
    }

    pub fn submission(&self, non_member_id: Option<String>) -> SubmitLinksRequest {
        SubmitLinksRequest {
            non_member_id,
            bookmark_urls: self.links(LinkKind::Bookmark),
            store_urls: self.links(LinkKind::Store),
        }
    }

    pub async fn submit(
        &self,
        submitter: &FormSubmitter,
        non_member_id: Option<String>,
    ) -> Result<(), SubmitError> {
        if !self.is_complete() {
            return Err(SubmitError::Incomplete);
        }
        submitter.submit(&self.submission(non_member_id)).await
    }

    /// Registration payload; links are sent as validated so far and may be empty.
    pub fn create_submission(
        &self,
        event_id: impl Into<String>,
        participant: &NewParticipant,
    ) -> CreatePingsRequest {
        CreatePingsRequest {
            uuid: event_id.into(),
            name: participant.name.trim().to_string(),
            password: participant.pin.clone(),
            bookmark_urls: self.links(LinkKind::Bookmark),
            store_urls: self.links(LinkKind::Store),
        }
    }

    pub async fn create(
        &self,
        submitter: &FormSubmitter,
        event_id: impl Into<String>,
        participant: &NewParticipant,
    ) -> Result<(), SubmitError> {
        if !participant.is_complete() {
            return Err(SubmitError::MissingCredentials);
        }
        submitter
            .create(&self.create_submission(event_id, participant))
            .await
    }
}

pub struct FormSubmitter {
    http: Client,
    endpoints: ApiEndpoints,
}

impl FormSubmitter {
    pub fn new(http: Client, endpoints: ApiEndpoints) -> Self {
        Self { http, endpoints }
    }

    pub async fn submit(&self, payload: &SubmitLinksRequest) -> Result<(), SubmitError> {
        let request = self.http.put(self.endpoints.submit_url().clone()).json(payload);
        send_form(request, "link submission").await?;

        info!(
            bookmark_urls = payload.bookmark_urls.len(),
            store_urls = payload.store_urls.len(),
            "links submitted"
        );
        Ok(())
    }

    /// Registers a new participant with `POST {base}/nonmembers/pings`.
    pub async fn create(&self, payload: &CreatePingsRequest) -> Result<(), SubmitError> {
        let request = self.http.post(self.endpoints.submit_url().clone()).json(payload);
        send_form(request, "participant registration").await?;

        info!(
            event = %payload.uuid,
            bookmark_urls = payload.bookmark_urls.len(),
            store_urls = payload.store_urls.len(),
            "participant registered"
        );
        Ok(())
    }
}

async fn send_form(request: RequestBuilder, action: &'static str) -> Result<(), SubmitError> {
    let response = request.send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(ApiErrorBody::into_message);
    warn!(status = status.as_u16(), ?message, action, "form request rejected");
    Err(SubmitError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
