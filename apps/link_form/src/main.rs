use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use link_client::{
    build_http_client, ApiEndpoints, EntryStatus, FieldHandle, FormSeed, FormSubmitter,
    HttpLinkValidator, LinkForm, NewParticipant, SubmitError,
};
use shared::domain::{EntryId, LinkKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod command;
mod config;

use command::{parse_command, Command, ParseError, HELP};
use config::{load_settings, normalize_base_url, Settings};

#[derive(Parser, Debug)]
#[command(about = "Collect and validate map-pin and store links")]
struct Args {
    /// API base URL, e.g. https://api.example.com/api/v1
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    non_member_id: Option<String>,
    /// Event that `create` registers a new participant for.
    #[arg(long)]
    event_id: Option<String>,
    /// Overall timeout for each request in milliseconds; 0 disables it.
    #[arg(long)]
    request_timeout_ms: Option<u64>,
    /// Previously saved map-pin link (repeatable).
    #[arg(long = "map-link")]
    map_links: Vec<String>,
    /// Previously saved store link (repeatable).
    #[arg(long = "store-link")]
    store_links: Vec<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_base_url {
            settings.api_base_url = normalize_base_url(v);
        }
        if let Some(v) = &self.non_member_id {
            settings.non_member_id = Some(v.clone());
        }
        if let Some(v) = &self.event_id {
            settings.event_id = Some(v.clone());
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.request_timeout_ms = (ms > 0).then_some(ms);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    args.apply(&mut settings);

    let endpoints = ApiEndpoints::new(&settings.api_base_url)
        .with_context(|| format!("invalid api base url '{}'", settings.api_base_url))?;
    let http = build_http_client(settings.request_timeout()).context("failed to build http client")?;
    info!(base_url = %endpoints.base(), "link form ready");

    let validator = Arc::new(HttpLinkValidator::with_client(http.clone(), endpoints.clone()));
    let submitter = FormSubmitter::new(http, endpoints);
    let form = LinkForm::spawn(
        validator,
        FormSeed {
            bookmark_urls: args.map_links,
            store_urls: args.store_links,
        },
    );

    println!("{HELP}");
    print_form(&form).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(err) = run_command(&form, &submitter, &settings, command).await {
            println!("error: {err:#}");
        }
    }

    Ok(())
}

async fn run_command(
    form: &LinkForm,
    submitter: &FormSubmitter,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    match command {
        Command::Edit { kind, index, text } => {
            let field = form.field(kind);
            field.set_text(entry_at(field, index).await?, text).await?;
        }
        Command::Paste { kind, index, text } => {
            let field = form.field(kind);
            field.paste_text(entry_at(field, index).await?, text).await?;
        }
        Command::Blur { kind, index } => {
            let field = form.field(kind);
            field.blur(entry_at(field, index).await?).await?;
        }
        Command::Add { kind } => {
            form.field(kind).add_entry().await?;
        }
        Command::Clear { kind, index } => {
            let field = form.field(kind);
            field.clear_entry(entry_at(field, index).await?).await?;
        }
        Command::Show => {}
        Command::Submit => {
            match form.submit(submitter, settings.non_member_id.clone()).await {
                Ok(()) => println!("submitted"),
                Err(SubmitError::Incomplete) => {
                    println!("add at least one validated link to each list before submitting")
                }
                Err(err) => return Err(err.into()),
            }
            return Ok(());
        }
        Command::Create { pin, name } => {
            let event_id = settings
                .event_id
                .clone()
                .ok_or_else(|| anyhow!("no event id configured; pass --event-id"))?;
            let participant = NewParticipant::new(name, pin);
            match form.create(submitter, event_id, &participant).await {
                Ok(()) => println!("registered"),
                Err(SubmitError::MissingCredentials) => {
                    println!("enter a name and a 4-digit PIN before registering")
                }
                Err(err) => return Err(err.into()),
            }
            return Ok(());
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }

    print_form(form).await
}

async fn entry_at(field: &FieldHandle, index: usize) -> Result<EntryId> {
    field
        .snapshot()
        .await?
        .get(index)
        .map(|entry| entry.id)
        .ok_or_else(|| anyhow!("no {} entry at index {index}", field.kind()))
}

async fn print_form(form: &LinkForm) -> Result<()> {
    for kind in LinkKind::ALL {
        println!("{} ({kind})", kind.label());
        for (index, entry) in form.field(kind).snapshot().await?.iter().enumerate() {
            let marker = match entry.status() {
                EntryStatus::Idle => " ",
                EntryStatus::Typing => "~",
                EntryStatus::Valid => "✓",
                EntryStatus::Errored => "✗",
            };
            match entry.visible_error() {
                Some(error) => println!("  [{index}] {marker} {}  ({error})", entry.text),
                None => println!("  [{index}] {marker} {}", entry.text),
            }
        }
        println!("  valid: {:?}", form.links(kind));
    }
    println!(
        "form complete: {}",
        if form.is_complete() { "yes" } else { "no" }
    );
    Ok(())
}
