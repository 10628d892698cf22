use clap::{CommandFactory, Parser};
use colored::*;
use directories::ProjectDirs;
use paperz::api::{CmdMessage, ExportOptions, MessageLevel, Mutation, PaperApi};
use paperz::commands::export::default_merge_name;
use paperz::config::PaperzConfig;
use paperz::error::{PaperzError, Result};
use paperz::filter::SecondaryFilter;
use paperz::model::{Document, Entity, EntityKind, Identifier};
use paperz::pattern::Pattern;
use paperz::query::DocumentQuery;
use paperz::remote::http::HttpTransport;
use paperz::remote::RemoteClient;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthChar;

mod args;
use args::{Cli, Commands, ExportArgs, FilterArgs, SetArgs};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: PaperApi<HttpTransport>,
    config: PaperzConfig,
    verbose: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        None => {
            Cli::command().print_help()?;
            return Ok(());
        }
        // config works without a reachable server
        Some(Commands::Config { key, value }) => return handle_config(key, value),
        Some(command) => command,
    };

    let mut ctx = init_context(cli.verbose)?;

    match command {
        Commands::Tags => handle_entities(&mut ctx, EntityKind::Tag),
        Commands::Correspondents => handle_entities(&mut ctx, EntityKind::Correspondent),
        Commands::Doctypes => handle_entities(&mut ctx, EntityKind::DocType),
        Commands::Find { filters, content } => handle_find(&mut ctx, filters, content),
        Commands::Get { ids, content } => handle_get(&mut ctx, ids, content),
        Commands::Set(set) => handle_set(&mut ctx, set),
        Commands::Export(export) => handle_export(&mut ctx, export),
        Commands::Config { .. } => Ok(()), // handled above
    }
}

fn config_dir() -> PathBuf {
    let proj_dirs =
        ProjectDirs::from("com", "paperz", "paperz").expect("Could not determine config dir");
    proj_dirs.config_dir().to_path_buf()
}

fn init_context(verbose: bool) -> Result<AppContext> {
    let config = PaperzConfig::load(config_dir()).unwrap_or_default();
    let server_url = config.server_url()?;
    let token = config.auth_token()?;
    let transport = HttpTransport::new(&token)?;
    let api = PaperApi::new(RemoteClient::new(transport, &server_url));

    Ok(AppContext {
        api,
        config,
        verbose,
    })
}

fn handle_entities(ctx: &mut AppContext, kind: EntityKind) -> Result<()> {
    let result = ctx.api.refresh(kind)?;
    print_entities(kind, &result.entities, ctx.verbose);
    print_messages(&result.messages);
    Ok(())
}

fn handle_find(ctx: &mut AppContext, filters: FilterArgs, content: bool) -> Result<()> {
    ctx.api.refresh_all()?;
    let (query, filter) = build_criteria(&filters);
    if query.is_empty() && filter.is_empty() {
        return Err(PaperzError::Api(
            "No filters given; pass at least one of -c/-d/-t/-l/-w/-y".into(),
        ));
    }
    let result = ctx.api.find_documents(&query, &filter, content)?;
    println!("Found {} documents", result.documents.len());
    print_documents(&result.documents, ctx.verbose);
    print_messages(&result.messages);
    Ok(())
}

fn handle_get(ctx: &mut AppContext, ids: Vec<String>, content: bool) -> Result<()> {
    ctx.api.refresh_all()?;
    let ids = parse_ids(&ids)?;
    let result = ctx.api.get_documents(&ids, content)?;
    print_documents(&result.documents, ctx.verbose);
    print_messages(&result.messages);
    Ok(())
}

fn handle_set(ctx: &mut AppContext, set: SetArgs) -> Result<()> {
    ctx.api.refresh_all()?;

    let mut mutations = Vec::new();
    if let Some(c) = &set.correspondent {
        mutations.push(Mutation::Correspondent(Identifier::parse(c)));
    }
    if let Some(d) = &set.doctype {
        mutations.push(Mutation::DocType(Identifier::parse(d)));
    }
    if let Some(title) = &set.title {
        mutations.push(Mutation::Title(title.clone()));
    }
    if let Some(created) = &set.created {
        mutations.push(Mutation::Created(created.clone()));
    }
    if let Some(tags) = &set.add_tags {
        mutations.push(Mutation::AddTags(Identifier::parse_list(tags)));
    }
    if let Some(tags) = &set.remove_tags {
        mutations.push(Mutation::RemoveTags(Identifier::parse_list(tags)));
    }
    if mutations.is_empty() {
        return Err(PaperzError::Api(
            "Nothing to change; pass at least one modification flag".into(),
        ));
    }

    let result = ctx.api.modify_document(set.id, &mutations, set.dry_run)?;
    print_documents(&result.documents, ctx.verbose);
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &mut AppContext, export: ExportArgs) -> Result<()> {
    ctx.api.refresh_all()?;

    let docs = if let Some(ids) = &export.ids {
        let ids = parse_ids(std::slice::from_ref(ids))?;
        let result = ctx.api.get_documents(&ids, false)?;
        print_messages(&result.messages);
        result.documents
    } else {
        let (query, filter) = build_criteria(&export.filters);
        if query.is_empty() && filter.is_empty() {
            return Err(PaperzError::Api(
                "Refusing to export everything; pass filters or --ids".into(),
            ));
        }
        let result = ctx.api.find_documents(&query, &filter, false)?;
        print_messages(&result.messages);
        result.documents
    };

    println!("Downloading {} files...", docs.len());

    let pattern = export
        .pattern
        .clone()
        .or_else(|| ctx.config.filename_pattern.clone())
        .map(|p| Pattern::compile(&p));
    let merge_output = export.merge_output.clone().or_else(|| {
        export.merge.then(|| {
            default_merge_name(
                &describe_criteria(&export.filters, export.ids.as_deref()),
                export.thumbs,
            )
        })
    });

    let options = ExportOptions {
        pattern,
        output: export.output,
        thumbnails: export.thumbs,
        merge: export.merge,
        merge_output,
        directory: export.dir,
    };
    let result = ctx.api.export_documents(&docs, &options)?;
    for file in &result.files {
        println!("{}", file.display());
    }
    if let Some(merged) = &result.merged_file {
        println!("{}", merged.display().to_string().bold());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(key: Option<String>, value: Option<String>) -> Result<()> {
    let dir = config_dir();
    let mut config = PaperzConfig::load(&dir).unwrap_or_default();

    match (key.as_deref(), value) {
        (None, _) => {
            for (k, v) in config.list_all() {
                println!("{} = {}", k, v);
            }
        }
        (Some("server-url"), None) => {
            println!("server-url = {}", config.server_url.unwrap_or_default());
        }
        (Some("filename-pattern"), None) => {
            println!(
                "filename-pattern = {}",
                config.filename_pattern.unwrap_or_default()
            );
        }
        (Some("server-url"), Some(v)) => {
            config.server_url = Some(v);
            config.save(&dir)?;
        }
        (Some("filename-pattern"), Some(v)) => {
            config.filename_pattern = Some(v);
            config.save(&dir)?;
        }
        (Some(other), _) => println!("Unknown config key: {}", other),
    }
    Ok(())
}

fn build_criteria(filters: &FilterArgs) -> (DocumentQuery, SecondaryFilter) {
    let tags = filters
        .tags
        .as_deref()
        .map(Identifier::parse_list)
        .unwrap_or_default();

    let mut query = DocumentQuery::new().tags(tags.clone());
    if let Some(c) = &filters.correspondent {
        query = query.correspondent(Identifier::parse(c));
    }
    if let Some(d) = &filters.doctype {
        query = query.doc_type(Identifier::parse(d));
    }
    if let Some(w) = &filters.words {
        query = query.content_terms(w.clone());
    }
    if let Some(y) = &filters.date {
        query = query.date(y.clone());
    }

    let filter = SecondaryFilter {
        title_labels: filters.title.clone(),
        has_tags: tags,
        has_any_tags: filters
            .any_tags
            .as_deref()
            .map(Identifier::parse_list)
            .unwrap_or_default(),
    };
    (query, filter)
}

fn describe_criteria(filters: &FilterArgs, ids: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(ids) = ids {
        parts.push(format!("docs {}", ids));
    }
    if let Some(c) = &filters.correspondent {
        parts.push(format!("corr {}", c));
    }
    if let Some(d) = &filters.doctype {
        parts.push(format!("type {}", d));
    }
    if let Some(t) = &filters.tags {
        parts.push(format!("tags {}", t));
    }
    if let Some(t) = &filters.any_tags {
        parts.push(format!("any {}", t));
    }
    if let Some(l) = &filters.title {
        parts.push(format!("title {}", l));
    }
    if let Some(w) = &filters.words {
        parts.push(format!("words {}", w));
    }
    if let Some(y) = &filters.date {
        parts.push(format!("date {}", y));
    }
    if parts.is_empty() {
        "all".to_string()
    } else {
        parts.join(" ")
    }
}

fn parse_ids(inputs: &[String]) -> Result<Vec<u32>> {
    let mut ids = Vec::new();
    for input in inputs {
        for part in input.split(',').filter(|p| !p.trim().is_empty()) {
            let id = part
                .trim()
                .parse::<u32>()
                .map_err(|_| PaperzError::Api(format!("Invalid document id: {}", part)))?;
            ids.push(id);
        }
    }
    Ok(ids)
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn entity_colour(kind: EntityKind, name: &str) -> ColoredString {
    match kind {
        EntityKind::Tag => name.green(),
        EntityKind::Correspondent => name.cyan(),
        EntityKind::DocType => name.yellow(),
    }
}

fn print_entities(kind: EntityKind, entities: &[Entity], verbose: bool) {
    if entities.is_empty() {
        println!("No {}s found.", kind);
        return;
    }
    if verbose {
        for entity in entities {
            println!("{}", entity.describe());
        }
    } else {
        let names: Vec<String> = entities
            .iter()
            .map(|e| entity_colour(kind, &e.name).to_string())
            .collect();
        println!("{}", names.join(", "));
    }
}

const TITLE_WIDTH: usize = 31;
const CORR_WIDTH: usize = 9;
const TYPE_WIDTH: usize = 12;

fn print_documents(docs: &[Document], verbose: bool) {
    if docs.is_empty() {
        println!("No documents found.");
        return;
    }
    for (i, doc) in docs.iter().enumerate() {
        if verbose {
            if i > 0 {
                println!();
            }
            print_full_document(doc);
        } else {
            print_document_row(i + 1, doc);
        }
    }
}

fn print_document_row(idx: usize, doc: &Document) {
    let corr = doc
        .correspondent
        .as_ref()
        .map(|r| r.display_name())
        .unwrap_or_default();
    let dtype = doc
        .doc_type
        .as_ref()
        .map(|r| r.display_name())
        .unwrap_or_default();
    let tags: Vec<String> = doc
        .tags
        .iter()
        .map(|t| t.display_name().green().to_string())
        .collect();

    println!(
        "{} {} {} {} {} {}",
        format!("{:>3}", idx).dimmed(),
        format!("{:>4}", doc.id),
        pad_to_width(&doc.title, TITLE_WIDTH).bold(),
        pad_to_width(&corr, CORR_WIDTH).cyan(),
        pad_to_width(&dtype, TYPE_WIDTH).yellow(),
        tags.join(" ")
    );
}

fn print_full_document(doc: &Document) {
    let corr = doc
        .correspondent
        .as_ref()
        .map(|r| r.display_name())
        .unwrap_or_default();
    let dtype = doc
        .doc_type
        .as_ref()
        .map(|r| r.display_name())
        .unwrap_or_default();
    let tags: Vec<String> = doc.tags.iter().map(|t| t.display_name()).collect();

    println!("Document: {} {}", doc.id, doc.title.bold());
    println!("  correspondent: {}  type: {}", corr.cyan(), dtype.yellow());
    println!("  created: {}  added: {}", doc.created, doc.added);
    println!("  tags: {}", tags.join(",").green());
    if let Some(asn) = doc.asn {
        println!("  serial no: {}", asn);
    }
    println!("  original filename: {}", doc.original_file_name);
    println!("  archived filename: {}", doc.archived_file_name);
    if let Some(content) = &doc.content {
        let preview: String = content.chars().take(200).collect();
        println!("  content: {}", preview.dimmed());
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut current = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current + char_width > width.saturating_sub(1) {
            out.push('…');
            current += 1;
            break;
        }
        out.push(c);
        current += char_width;
    }

    out.push_str(&" ".repeat(width.saturating_sub(current)));
    out
}
