//! Notepy CLI
//!
//! Command-line interface for Notepy: manage notes and tags, prepare the
//! resource directory, and run the REST API.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use notepy_core::{CertificateOptions, Config, ExportFormat, NoteStore, ResourceLayout};

mod commands;
mod editor;
mod exit;
mod logging;
mod output;

use commands::note::{CreateArgs, Destination, EditArgs};
use commands::server::ServerArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "notepy")]
#[command(about = "Notepy - JSON-backed notes with a REST API")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - ids only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <resource dir>/config.toml)
    #[arg(long, global = true, env = "NOTEPY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Prepare the resource directory, config and certificate
    Bootstrap {
        #[command(subcommand)]
        command: BootstrapCommands,
    },
    /// Run the REST API
    Server {
        /// Address to bind (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default from config)
        #[arg(long)]
        port: Option<u16>,
        /// Certificate file (default: <resource dir>/ssl/server.crt)
        #[arg(long)]
        cert: Option<PathBuf>,
        /// Private key file (default: <resource dir>/ssl/server.key)
        #[arg(long)]
        key: Option<PathBuf>,
        /// Serve plain HTTP
        #[arg(long)]
        no_tls: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create a new note
    #[command(alias = "add")]
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        content: Option<String>,
        /// Tag to add (repeatable)
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,
        /// Write the content in $EDITOR
        #[arg(long)]
        edit: bool,
    },
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only notes carrying every given tag
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,
        /// Case-insensitive match on title or content
        #[arg(short, long)]
        search: Option<String>,
        /// Write JSON to a file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indent JSON written with --output
        #[arg(long)]
        pretty: bool,
    },
    /// Show one note
    Show {
        /// Note ID (full UUID or prefix)
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Change a note
    Edit {
        /// Note ID (full UUID or prefix)
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        /// Replace the tags (repeatable)
        #[arg(short = 'g', long = "tag")]
        tags: Vec<String>,
        /// Edit the content in $EDITOR
        #[arg(long)]
        edit: bool,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Search titles and content
    Search {
        query: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Export every note to a file
    Export {
        file: PathBuf,
        /// json or markdown
        #[arg(long, default_value = "json")]
        format: ExportFormat,
    },
    /// Import notes from a JSON file
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum TagCommands {
    /// List tags with usage counts
    #[command(alias = "ls")]
    List,
    /// Add a tag to a note
    Add { id: String, tag: String },
    /// Remove a tag from a note
    #[command(alias = "rm")]
    Remove { id: String, tag: String },
}

#[derive(Subcommand)]
enum BootstrapCommands {
    /// Create directories, default config and a self-signed certificate
    Init {
        /// Certificate validity in days
        #[arg(long, default_value_t = 365)]
        days: u32,
        #[arg(long, default_value = "US")]
        country: String,
        #[arg(long, default_value = "CA")]
        state: String,
        #[arg(long, default_value = "San Francisco")]
        locality: String,
        #[arg(long, default_value = "Notepy")]
        organization: String,
        #[arg(long, default_value = "localhost")]
        common_name: String,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Report resource, certificate and config status
    Check,
    /// Open the resource directory in the file browser
    Open,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            return ExitCode::from(u8::try_from(code).unwrap_or(exit::INVALID_INPUT));
        }
    };

    let layout = ResourceLayout::discover();
    let config_path = layout.config_path_with(cli.config.as_deref());
    let config = Config::load_from_path(&config_path);

    let settings = logging::LogSettings::resolve(
        cli.verbose,
        matches!(cli.command, Commands::Server { .. }),
        config.as_ref().ok().map(|c| &c.logging),
    );
    let _log_guard = logging::init(&settings, &layout.logs_dir());

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli.command, &layout, &config_path, config, &output).await {
        Ok(()) => ExitCode::from(exit::SUCCESS),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let hint = exit::recovery_hint(&err);
            if output.is_json() {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": {
                            "code": exit::error_code(&err),
                            "message": format!("{:#}", err),
                            "hint": hint,
                        }
                    })
                );
            } else {
                eprintln!("Error: {:#}", err);
                if let Some(hint) = hint {
                    eprintln!("  hint: {}", hint);
                }
            }
            ExitCode::from(exit::exit_code(&err))
        }
    }
}

async fn run(
    command: Commands,
    layout: &ResourceLayout,
    config_path: &std::path::Path,
    config: Result<Config>,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Bootstrap { command } => match command {
            BootstrapCommands::Init {
                days,
                country,
                state,
                locality,
                organization,
                common_name,
                force,
            } => {
                let options = CertificateOptions {
                    days_valid: days,
                    country,
                    state,
                    locality,
                    organization,
                    common_name,
                };
                commands::bootstrap::init(layout, config_path, &options, force, output)
            }
            BootstrapCommands::Check => commands::bootstrap::check(layout, config_path, output),
            BootstrapCommands::Open => commands::bootstrap::open(layout, output),
        },
        Commands::Notes { command } => {
            let config = config?;
            let mut store = open_store(layout, &config)?;
            handle_note_command(command, &mut store, output)
        }
        Commands::Tags { command } => {
            let config = config?;
            let mut store = open_store(layout, &config)?;
            match command {
                TagCommands::List => commands::tag::list(&store, output),
                TagCommands::Add { id, tag } => commands::tag::add(&mut store, id, tag, output),
                TagCommands::Remove { id, tag } => {
                    commands::tag::remove(&mut store, id, tag, output)
                }
            }
        }
        Commands::Server {
            host,
            port,
            cert,
            key,
            no_tls,
        } => {
            let config = config?;
            let store = open_store(layout, &config)?;
            let args = ServerArgs {
                host,
                port,
                cert,
                key,
                no_tls,
            };
            commands::server::run(store, &config, layout, args).await
        }
    }
}

fn open_store(layout: &ResourceLayout, config: &Config) -> Result<NoteStore> {
    Ok(NoteStore::open(layout.notes_path(), config.notes)?)
}

fn handle_note_command(command: NoteCommands, store: &mut NoteStore, output: &Output) -> Result<()> {
    match command {
        NoteCommands::Create {
            title,
            content,
            tags,
            edit,
        } => commands::note::create(
            store,
            CreateArgs {
                title,
                content,
                tags,
                edit,
            },
            output,
        ),
        NoteCommands::List {
            tags,
            search,
            output: file,
            pretty,
        } => commands::note::list(store, tags, search, Destination { file, pretty }, output),
        NoteCommands::Show {
            id,
            output: file,
            pretty,
        } => commands::note::show(store, id, Destination { file, pretty }, output),
        NoteCommands::Edit {
            id,
            title,
            content,
            tags,
            edit,
        } => commands::note::edit(
            store,
            id,
            EditArgs {
                title,
                content,
                tags,
                edit,
            },
            output,
        ),
        NoteCommands::Delete { id, force } => commands::note::delete(store, id, force, output),
        NoteCommands::Search {
            query,
            output: file,
            pretty,
        } => commands::note::search(store, query, Destination { file, pretty }, output),
        NoteCommands::Export { file, format } => {
            commands::note::export(store, &file, format, output)
        }
        NoteCommands::Import { file } => commands::note::import(store, &file, output),
    }
}
