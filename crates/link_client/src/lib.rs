//! Validated link-list fields: remote validation, the entry-list state
//! machine, aggregate notification and the task that drives them.

use std::time::Duration;

use reqwest::Client;

pub mod entry_list;
pub mod form;
pub mod notifier;
pub mod runtime;
pub mod validator;

pub use entry_list::{
    ApplyOutcome, Entry, EntryListController, EntryListError, EntryStatus, ValidationRequest,
    ValidationResponse,
};
pub use form::{FormSeed, FormSubmitter, LinkForm, NewParticipant, SubmitError, PIN_LENGTH};
pub use notifier::AggregateNotifier;
pub use runtime::{spawn_field, spawn_watched_field, FieldCommand, FieldError, FieldHandle};
pub use validator::{ApiEndpoints, EndpointError, HttpLinkValidator, RemoteValidator};

/// Builds the HTTP client shared by validation and submission calls.
///
/// `None` keeps reqwest's default of no overall request timeout.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
