//! Linkshelf command-line client.
//!
//! Browses and reorganizes a linkding collection as a folder tree built from
//! dotted tag names. Connection settings come from `linkshelf config connect`
//! or the `--url` / `--token` flags.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use linkshelf::app::App;
use linkshelf::managers::bookmark_manager::BookmarkManager;
use linkshelf::managers::tag_tree::render_outline;
use linkshelf::platform;
use linkshelf::services::bookmarks_bar_sync::{sync_from_remote, InMemoryBookmarkTree};
use linkshelf::services::linkding_client::LinkdingClient;
use linkshelf::services::settings_engine::SettingsEngineTrait;
use linkshelf::types::bookmark::{Bookmark, BookmarkEdit};

#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(about = "Tag-tree companion for a linkding bookmark service", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// linkding base URL, overriding the stored one
    #[arg(long, global = true, env = "LINKSHELF_URL")]
    url: Option<String>,

    /// linkding API token, overriding the stored one
    #[arg(long, global = true, env = "LINKSHELF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path of the cache database
    #[arg(long, global = true, env = "LINKSHELF_DB")]
    db: Option<PathBuf>,

    /// Path of the settings file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// List bookmarks in a folder (the first folder when omitted)
    List {
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print the folder tree
    Tree,
    /// Search titles, descriptions, urls and tags
    Search { term: String },
    /// Create a bookmark
    Add {
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Edit a bookmark
    Edit {
        id: i64,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a bookmark
    Delete { id: i64 },
    /// Remove one tag from a bookmark
    Untag { id: i64, tag: String },
    /// Move a bookmark from one folder to another
    Move { id: i64, from: String, to: String },
    /// Rename or remove folders
    Folder {
        #[command(subcommand)]
        command: FolderCommand,
    },
    /// Write the folder tree as a Netscape bookmark file
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Drop the cached list and refetch
    Refresh,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Test and store the connection
    Connect { url: String, token: String },
    /// Set one value by dotted key, e.g. `popup.show_tags false`
    Set { key: String, value: String },
    /// Print the stored settings
    Show,
}

#[derive(Subcommand)]
enum FolderCommand {
    /// Rename the last segment of a folder
    Rename { tag: String, name: String },
    /// Remove a folder and all sub-folders from every bookmark
    Remove { tag: String },
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn print_bookmark(b: &Bookmark) {
    println!("{:>6}  {}", b.id, b.display_title());
    println!("        {}", b.url);
    if !b.tag_names.is_empty() {
        println!("        [{}]", b.tag_names.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db_path = cli.db.clone().unwrap_or_else(platform::default_cache_db_path);
    debug!("cache database at {}", db_path.display());
    let mut app = App::new(&db_path.to_string_lossy(), cli.config.clone())?;

    if let Commands::Config { command } = &cli.command {
        return run_config(&mut app, command).await;
    }

    let config = app.connection_config(cli.url.as_deref(), cli.token.as_deref())?;
    let mut manager = app.bookmark_manager(&config);
    run(&mut manager, cli.command).await
}

async fn run_config(app: &mut App, command: &ConfigCommand) -> Result<(), Box<dyn Error>> {
    match command {
        ConfigCommand::Connect { url, token } => {
            let config = app.configure(url, token).await?;
            println!("Connected to {}", config.base_url);
        }
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
            app.settings_engine.set_value(key, value)?;
            println!("{} updated", key);
        }
        ConfigCommand::Show => {
            let mut settings = app.settings_engine.get_settings().clone();
            if !settings.connection.api_token.is_empty() {
                settings.connection.api_token = "<hidden>".to_string();
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
            println!("# {}", app.settings_engine.get_config_path());
        }
    }
    Ok(())
}

async fn run(manager: &mut BookmarkManager<LinkdingClient>, command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Config { .. } => {}
        Commands::Export { output } => {
            let mut tree = InMemoryBookmarkTree::new();
            let report = sync_from_remote(manager.api(), &mut tree).await?;
            let html = tree.to_netscape_html();
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!(
                        "Wrote {} folders and {} bookmarks to {}",
                        report.folders,
                        report.bookmarks,
                        path.display()
                    );
                }
                None => print!("{}", html),
            }
        }
        Commands::Refresh => {
            manager.load(true).await?;
            println!("Loaded {} bookmarks", manager.index().bookmarks().len());
        }
        command => {
            manager.load(false).await?;
            run_loaded(manager, command).await?;
        }
    }
    Ok(())
}

async fn run_loaded(
    manager: &mut BookmarkManager<LinkdingClient>,
    command: Commands,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::List { tag } => {
            if let Some(tag) = tag {
                if !manager.select_tag(&tag) {
                    return Err(format!("No folder named {}", tag).into());
                }
            }
            if let Some(tag) = manager.current_tag() {
                println!("{}", tag);
            }
            for b in manager.current_bookmarks() {
                print_bookmark(&b);
            }
        }
        Commands::Tree => {
            for line in render_outline(manager.index().tree()) {
                println!("{}", line);
            }
        }
        Commands::Search { term } => {
            let hits = manager.search(&term);
            if hits.is_empty() {
                println!("No bookmarks found");
            }
            for b in hits {
                print_bookmark(&b);
            }
        }
        Commands::Add { url, title } => {
            let b = manager.add_bookmark(&url, title.as_deref()).await?;
            print_bookmark(&b);
        }
        Commands::Edit { id, url, title, description, tags } => {
            let edit = BookmarkEdit { url, title, description, tags };
            let b = manager.edit_bookmark(id, edit).await?;
            print_bookmark(&b);
        }
        Commands::Delete { id } => {
            manager.delete_bookmark(id).await?;
            println!("Deleted {}", id);
        }
        Commands::Untag { id, tag } => {
            let b = manager.remove_tag(id, &tag).await?;
            print_bookmark(&b);
        }
        Commands::Move { id, from, to } => {
            if manager.move_bookmark(id, &from, &to).await? {
                println!("Moved {} to {}", id, to);
            }
        }
        Commands::Folder { command } => match command {
            FolderCommand::Rename { tag, name } => {
                let new_tag = manager.rename_folder(&tag, &name).await?;
                println!("Renamed {} to {}", tag, new_tag);
            }
            FolderCommand::Remove { tag } => {
                let updated = manager.remove_folder(&tag).await?;
                println!("Removed {} from {} bookmarks", tag, updated);
            }
        },
        Commands::Config { .. } | Commands::Export { .. } | Commands::Refresh => {}
    }
    Ok(())
}
