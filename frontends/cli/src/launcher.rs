use anyhow::{bail, Context, Result};
use mocking_api::{
    document_id, ApiError, Collection, Field, FieldType, Project, RawDocument, ID_FIELD,
};
use mocking_client::{
    AlwaysConfirm, ApiClient, AuthView, CollectionsView, Confirm, DocumentEditor, FileTokenStore,
    ProjectsView, SchemaEditor, SessionEvent, SignOutReason,
};
use mocking_core::{accepts_format, normalize_fields, string_formats, FieldEdit};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::commands::{
    Cli, CollectionCommands, CollectionsArgs, Commands, DocumentCommands, DocumentsArgs,
    ProjectCommands, SchemaArgs, SchemaCommands,
};
use crate::config::CliConfig;
use crate::prompt::StdinConfirm;

pub async fn run_app(cli: Cli, config: CliConfig) -> Result<()> {
    let store = Arc::new(FileTokenStore::in_dir(config.state_dir()));
    let client = config
        .client_config()
        .connect(store)
        .await
        .context("Failed to set up the API client")?;
    let mut events = client.session().subscribe();

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinConfirm)
    };

    let result = dispatch(&client, &config, cli.command, confirm.as_ref()).await;

    if signed_out_by_server(&mut events) {
        eprintln!("Session expired or invalid. Log in again with `mocking login <email>`.");
    }

    match result {
        Err(e) if is_cancelled(&e) => {
            eprintln!("Cancelled.");
            Ok(())
        }
        other => other,
    }
}

/// Whether the session was dropped because of a 401 during this run.
fn signed_out_by_server(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut signed_out = false;
    while let Ok(event) = events.try_recv() {
        if event
            == (SessionEvent::SignedOut {
                reason: SignOutReason::Unauthorized,
            })
        {
            signed_out = true;
        }
    }
    signed_out
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Cancelled))
}

async fn dispatch(
    client: &ApiClient,
    config: &CliConfig,
    command: Commands,
    confirm: &dyn Confirm,
) -> Result<()> {
    match command {
        Commands::Login(args) => {
            let outcome = AuthView::new(client.clone())
                .login(&args.email, &args.password)
                .await;
            match outcome.error {
                None => println!("Logged in as {}", outcome.user.unwrap_or(args.email)),
                Some(message) => bail!("Login failed: {}", message),
            }
        }
        Commands::Register(args) => {
            let outcome = AuthView::new(client.clone())
                .register(&args.email, &args.password)
                .await;
            match outcome.error {
                None => println!("Registered and logged in as {}", args.email),
                Some(message) => bail!("Registration failed: {}", message),
            }
        }
        Commands::Logout => {
            AuthView::new(client.clone()).logout().await?;
            println!("Logged out");
        }
        Commands::Status => {
            if client.session().is_authenticated().await {
                println!("Logged in (token stored in {})", config.state_dir().display());
            } else {
                println!("Not logged in");
            }
        }
        Commands::Refresh { refresh_token } => {
            let response = client.refresh(&refresh_token).await?;
            if response.access_token.is_none() {
                bail!("Server returned no access token");
            }
            println!("Token refreshed");
        }
        Commands::Health => {
            let body = client.health().await?;
            println!("{} is up: {}", client.base_url(), body);
        }
        Commands::Projects(args) => run_projects(client, args.command, confirm).await?,
        Commands::Collections(args) => run_collections(client, config, args, confirm).await?,
        Commands::Documents(args) => run_documents(client, args, confirm).await?,
        Commands::Schema(args) => run_schema(client, args).await?,
    }
    Ok(())
}

async fn run_projects(
    client: &ApiClient,
    command: ProjectCommands,
    confirm: &dyn Confirm,
) -> Result<()> {
    let mut view = ProjectsView::new(client.clone());
    match command {
        ProjectCommands::List => {
            let projects = view.load().await?;
            if projects.is_empty() {
                println!("No projects yet");
            }
            for project in projects {
                println!(
                    "{:>5}  {:<24} {:<20} {} collections",
                    project.id,
                    project.name,
                    project.api_key,
                    project.collections_count.unwrap_or(0)
                );
            }
        }
        ProjectCommands::Show { id } => {
            let project = client.get_project(id).await?;
            println!("{}", serde_json::to_string_pretty(&project)?);
            println!("API: {}", view.api_url(&project));
        }
        ProjectCommands::Create { name, description } => {
            let project = view.create(&name, description.as_deref()).await?;
            println!(
                "Created project {} ({}), API: {}",
                project.name,
                project.id,
                view.api_url(&project)
            );
        }
        ProjectCommands::Update {
            id,
            name,
            description,
        } => {
            view.update(id, name.as_deref(), description.as_deref())
                .await?;
            println!("Updated project {}", id);
        }
        ProjectCommands::Delete { id } => {
            let project = client.get_project(id).await?;
            view.delete(&project, confirm).await?;
            println!("Deleted project {}", project.name);
        }
    }
    Ok(())
}

async fn run_collections(
    client: &ApiClient,
    config: &CliConfig,
    args: CollectionsArgs,
    confirm: &dyn Confirm,
) -> Result<()> {
    let project = client.get_project(args.project).await?;
    let mut view = CollectionsView::new(client.clone(), project, config.limits);
    view.load().await?;

    match args.command {
        CollectionCommands::List => {
            let max = view.limits().max_collections_per_project;
            println!(
                "{} of {} collections in {}",
                view.collections.len(),
                max,
                view.project().name
            );
            for collection in &view.collections {
                println!(
                    "{:>5}  {:<24} {:>4} docs ({:>3.0}%)  {}",
                    collection.id,
                    collection.name,
                    view.document_count(collection),
                    view.usage(collection) * 100.0,
                    view.public_url(collection)
                );
            }
        }
        CollectionCommands::Create {
            name,
            description,
            fields,
        } => {
            let fields = match fields {
                Some(path) => read_fields(&path)?,
                None => Vec::new(),
            };
            let collection = view.create(&name, description.as_deref(), fields).await?;
            println!(
                "Created collection {} at {}",
                collection.name,
                view.public_url(&collection)
            );
        }
        CollectionCommands::Delete { collection } => {
            let collection = find_collection(&view.collections, &collection)?.clone();
            view.delete(&collection, confirm).await?;
            println!("Deleted collection {}", collection.name);
        }
    }
    Ok(())
}

async fn run_documents(
    client: &ApiClient,
    args: DocumentsArgs,
    confirm: &dyn Confirm,
) -> Result<()> {
    let (project, collection) = locate(client, args.project, &args.collection).await?;
    let mut editor = DocumentEditor::new(client.clone(), &project, collection);

    match args.command {
        DocumentCommands::List(list) => {
            editor.query = list.to_query();
            let documents = editor.load().await?;
            println!("{}", serde_json::to_string_pretty(documents)?);
        }
        DocumentCommands::Template => println!("{}", editor.open_create()),
        DocumentCommands::Show { id } => {
            editor.load().await?;
            let document = editor
                .documents
                .iter()
                .find(|d| document_id(d).as_deref() == Some(id.as_str()))
                .cloned()
                .with_context(|| format!("No document with id {}", id))?;
            println!("{}", editor.open_edit(&document)?);
        }
        DocumentCommands::Dump => {
            editor.load().await?;
            println!("{}", editor.open_bulk());
        }
        DocumentCommands::Create { file } => {
            editor.open_create();
            editor.save(&read_input(file.as_deref())?).await?;
            println!(
                "Created document ({} in collection)",
                editor.documents.len()
            );
        }
        DocumentCommands::Update { id, file } => {
            let text = read_input(file.as_deref())?;
            editor.load().await?;
            let document = editor
                .documents
                .iter()
                .find(|d| document_id(d).as_deref() == Some(id.as_str()))
                .cloned()
                .with_context(|| format!("No document with id {}", id))?;
            editor.open_edit(&document)?;
            editor.save(&text).await?;
            println!("Updated document {}", id);
        }
        DocumentCommands::Bulk { file } => {
            let text = read_input(file.as_deref())?;
            editor.open_bulk();
            editor.save(&text).await?;
            println!("Updated {} documents", editor.documents.len());
        }
        DocumentCommands::Delete { id } => {
            let mut document = RawDocument::new();
            document.insert(ID_FIELD.to_string(), serde_json::Value::String(id.clone()));
            editor.delete(&document, confirm).await?;
            println!("Deleted document {}", id);
        }
        DocumentCommands::Flush => {
            editor.flush(confirm).await?;
            println!("Flushed collection {}", editor.collection().name);
        }
    }
    Ok(())
}

async fn run_schema(client: &ApiClient, args: SchemaArgs) -> Result<()> {
    let (project, collection) = locate(client, args.project, &args.collection).await?;
    let mut editor = SchemaEditor::new(client.clone(), &project, collection);

    match args.command {
        SchemaCommands::Show => {
            println!("{}", serde_json::to_string_pretty(editor.fields())?);
        }
        SchemaCommands::AddField {
            name,
            field_type,
            format,
            required,
        } => {
            let field_type = FieldType::from(field_type);
            check_format(&field_type, format.as_deref())?;
            editor.begin_edit();
            let index = editor.add_field()?;
            editor.update_field(index, FieldEdit::Name(name.clone()))?;
            editor.update_field(index, FieldEdit::Type(field_type))?;
            editor.update_field(index, FieldEdit::Format(format))?;
            editor.update_field(index, FieldEdit::Required(required))?;
            editor.save().await?;
            println!("Added field {}", name);
        }
        SchemaCommands::RemoveField { name } => {
            let index = editor
                .fields()
                .iter()
                .position(|f| f.name == name)
                .with_context(|| format!("No field named {}", name))?;
            editor.begin_edit();
            editor.remove_field(index)?;
            editor.save().await?;
            println!("Removed field {}", name);
        }
        SchemaCommands::Generate { count } => {
            let count = editor.set_generate_count(count);
            info!("Generating {} documents", count);
            let report = editor.generate().await?;
            println!(
                "Generated {} documents, saved {}",
                report.generated, report.saved
            );
        }
    }
    Ok(())
}

async fn locate(
    client: &ApiClient,
    project_id: i64,
    collection: &str,
) -> Result<(Project, Collection)> {
    let project = client.get_project(project_id).await?;
    let collections = client.list_collections(project_id).await?;
    let collection = find_collection(&collections, collection)?.clone();
    Ok((project, collection))
}

/// Look a collection up by name, then by numeric id.
pub fn find_collection<'a>(collections: &'a [Collection], key: &str) -> Result<&'a Collection> {
    collections
        .iter()
        .find(|c| c.name == key)
        .or_else(|| {
            key.parse::<i64>()
                .ok()
                .and_then(|id| collections.iter().find(|c| c.id == id))
        })
        .with_context(|| format!("No collection named {}", key))
}

/// Reject a `--format` the field type cannot use.
///
/// Strings take one of the generator's formats; numbers take a free-form
/// `min:a,max:b` range.
pub fn check_format(field_type: &FieldType, format: Option<&str>) -> Result<()> {
    let Some(format) = format.filter(|f| !f.is_empty()) else {
        return Ok(());
    };
    if !accepts_format(field_type) {
        bail!("Fields of type {} take no format", field_type.as_str());
    }
    if *field_type == FieldType::String
        && !string_formats().iter().any(|(name, _)| *name == format)
    {
        let names: Vec<&str> = string_formats()
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !name.is_empty())
            .collect();
        bail!(
            "Unknown string format {}; expected one of {}",
            format,
            names.join(", ")
        );
    }
    Ok(())
}

/// Field schema from a JSON file, `id` kept first and read-only.
pub fn read_fields(path: &Path) -> Result<Vec<Field>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fields: Vec<Field> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse field schema {}", path.display()))?;
    Ok(normalize_fields(&fields))
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read document JSON from stdin")?;
            Ok(text)
        }
    }
}
