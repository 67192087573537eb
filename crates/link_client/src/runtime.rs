//! Event loop that owns one [`EntryListController`].
//!
//! User commands and validation completions are funnelled through a single
//! task, so controller state is only ever touched from one place. Remote
//! validations run as separate tasks and report back over a channel.

use std::sync::Arc;

use shared::domain::{EntryId, LinkKind};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::{
    entry_list::{Entry, EntryListController, EntryListError, ValidationRequest, ValidationResponse},
    notifier::AggregateNotifier,
    validator::RemoteValidator,
};

const COMMAND_QUEUE_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, EntryListError>>;

pub enum FieldCommand {
    SetText {
        entry_id: EntryId,
        text: String,
        reply: Reply<()>,
    },
    PasteText {
        entry_id: EntryId,
        text: String,
        reply: Reply<()>,
    },
    Blur {
        entry_id: EntryId,
        reply: Reply<()>,
    },
    AddEntry {
        reply: oneshot::Sender<EntryId>,
    },
    ClearEntry {
        entry_id: EntryId,
        reply: Reply<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Entry>>,
    },
}

impl FieldCommand {
    fn name(&self) -> &'static str {
        match self {
            FieldCommand::SetText { .. } => "set_text",
            FieldCommand::PasteText { .. } => "paste_text",
            FieldCommand::Blur { .. } => "blur",
            FieldCommand::AddEntry { .. } => "add_entry",
            FieldCommand::ClearEntry { .. } => "clear_entry",
            FieldCommand::Snapshot { .. } => "snapshot",
        }
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("link field runtime has stopped")]
    Closed,
    #[error(transparent)]
    Entry(#[from] EntryListError),
}

/// Cloneable sender side of a running field.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    kind: LinkKind,
    commands: mpsc::Sender<FieldCommand>,
}

impl FieldHandle {
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    pub async fn set_text(&self, entry_id: EntryId, text: impl Into<String>) -> Result<(), FieldError> {
        let text = text.into();
        self.request(|reply| FieldCommand::SetText {
            entry_id,
            text,
            reply,
        })
        .await??;
        Ok(())
    }

    pub async fn paste_text(
        &self,
        entry_id: EntryId,
        text: impl Into<String>,
    ) -> Result<(), FieldError> {
        let text = text.into();
        self.request(|reply| FieldCommand::PasteText {
            entry_id,
            text,
            reply,
        })
        .await??;
        Ok(())
    }

    pub async fn blur(&self, entry_id: EntryId) -> Result<(), FieldError> {
        self.request(|reply| FieldCommand::Blur { entry_id, reply })
            .await??;
        Ok(())
    }

    pub async fn add_entry(&self) -> Result<EntryId, FieldError> {
        self.request(|reply| FieldCommand::AddEntry { reply }).await
    }

    pub async fn clear_entry(&self, entry_id: EntryId) -> Result<(), FieldError> {
        self.request(|reply| FieldCommand::ClearEntry { entry_id, reply })
            .await??;
        Ok(())
    }

    /// Ordered copies of every entry.
    pub async fn snapshot(&self) -> Result<Vec<Entry>, FieldError> {
        self.request(|reply| FieldCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> FieldCommand,
    ) -> Result<T, FieldError> {
        let (reply, response) = oneshot::channel();
        let command = build(reply);
        let name = command.name();
        self.commands
            .send(command)
            .await
            .map_err(|_| FieldError::Closed)?;
        debug!(kind = %self.kind, command = name, "queued field command");
        response.await.map_err(|_| FieldError::Closed)
    }
}

/// Starts the event loop for `controller` on the current tokio runtime.
pub fn spawn_field(
    controller: EntryListController,
    validator: Arc<dyn RemoteValidator>,
) -> FieldHandle {
    let kind = controller.kind();
    let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    tokio::spawn(run_field(controller, validator, command_rx));
    FieldHandle { kind, commands }
}

/// Spawns a field whose aggregate is published into a watch channel.
pub fn spawn_watched_field<I, S>(
    kind: LinkKind,
    seed: I,
    validator: Arc<dyn RemoteValidator>,
) -> (FieldHandle, watch::Receiver<Vec<String>>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let (notifier, aggregate) = AggregateNotifier::channel();
    let controller = EntryListController::new(kind, seed, notifier);
    (spawn_field(controller, validator), aggregate)
}

async fn run_field(
    mut controller: EntryListController,
    validator: Arc<dyn RemoteValidator>,
    mut commands: mpsc::Receiver<FieldCommand>,
) {
    let (completed_tx, mut completed_rx) = mpsc::unbounded_channel::<ValidationResponse>();

    loop {
        tokio::select! {
            Some(response) = completed_rx.recv() => {
                controller.apply_validation(response);
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                if let Some(request) = handle_command(&mut controller, command) {
                    dispatch_validation(Arc::clone(&validator), completed_tx.clone(), request);
                }
            }
        }
    }

    debug!(
        kind = %controller.kind(),
        published = controller.published(),
        "link field runtime stopped"
    );
}

fn handle_command(
    controller: &mut EntryListController,
    command: FieldCommand,
) -> Option<ValidationRequest> {
    match command {
        FieldCommand::SetText {
            entry_id,
            text,
            reply,
        } => {
            let _ = reply.send(controller.set_text(entry_id, text));
            None
        }
        FieldCommand::PasteText {
            entry_id,
            text,
            reply,
        } => respond_with_request(reply, controller.paste_text(entry_id, &text)),
        FieldCommand::Blur { entry_id, reply } => {
            respond_with_request(reply, controller.blur(entry_id))
        }
        FieldCommand::AddEntry { reply } => {
            let _ = reply.send(controller.add_entry());
            None
        }
        FieldCommand::ClearEntry { entry_id, reply } => {
            let _ = reply.send(controller.clear_entry(entry_id));
            None
        }
        FieldCommand::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
            None
        }
    }
}

fn respond_with_request(
    reply: Reply<()>,
    result: Result<Option<ValidationRequest>, EntryListError>,
) -> Option<ValidationRequest> {
    match result {
        Ok(request) => {
            let _ = reply.send(Ok(()));
            request
        }
        Err(err) => {
            let _ = reply.send(Err(err));
            None
        }
    }
}

fn dispatch_validation(
    validator: Arc<dyn RemoteValidator>,
    completed: mpsc::UnboundedSender<ValidationResponse>,
    request: ValidationRequest,
) {
    debug!(
        kind = %request.kind,
        entry_id = %request.entry_id,
        seq = request.seq,
        "dispatching link validation"
    );
    tokio::spawn(async move {
        let result = validator.validate(request.kind, &request.url).await;
        // The runtime may already be gone; the result is simply dropped then.
        let _ = completed.send(request.resolve(result));
    });
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
