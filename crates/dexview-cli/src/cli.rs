//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum, value_parser};
use dexview_config::{CatalogConfig, load_from_env};
use dexview_models::{Filters, PageState, SortField, SortOrder, SortSpec, Theme};
use dexview_telemetry::{LoggingConfig, init_logging};

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::catalog::{handle_search, handle_show};
use crate::commands::favorites::{
    handle_favorites_add, handle_favorites_clear, handle_favorites_list, handle_favorites_remove,
    handle_favorites_toggle,
};
use crate::commands::notes::{
    handle_note_get, handle_note_remove, handle_note_set, handle_notes_list,
};
use crate::commands::state::handle_url_normalize;
use crate::commands::theme::{handle_theme_cycle, handle_theme_get, handle_theme_set};
use crate::commands::view::{handle_browse, handle_open};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging =
        LoggingConfig::with_format_name(&cli.global.log_level, cli.global.log_format.as_deref());
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let Cli { global, command } = cli;
    let format = global.output;
    // Pure commands run without configuration or a state directory.
    if let Command::Url(UrlCommand::Normalize(args)) = &command {
        return handle_url_normalize(&args.query, format);
    }

    let config = layered_config(&global)?;
    let ctx = AppContext::open(config)?;

    match command {
        Command::Browse(args) => handle_browse(&ctx, &args, format).await,
        Command::Open(args) => handle_open(&ctx, &args, format).await,
        Command::Search(args) => handle_search(&ctx, &args.query, format).await,
        Command::Show(args) => handle_show(&ctx, &args.target, format).await,
        Command::Favorites(command) => match command {
            FavoritesCommand::List => handle_favorites_list(&ctx, format),
            FavoritesCommand::Add(args) => handle_favorites_add(&ctx, args.id).await,
            FavoritesCommand::Remove(args) => {
                handle_favorites_remove(&ctx, args.id);
                Ok(())
            }
            FavoritesCommand::Toggle(args) => handle_favorites_toggle(&ctx, args.id).await,
            FavoritesCommand::Clear => {
                handle_favorites_clear(&ctx);
                Ok(())
            }
        },
        Command::Notes(command) => match command {
            NotesCommand::List => handle_notes_list(&ctx, format),
            NotesCommand::Get(args) => handle_note_get(&ctx, args.id, format),
            NotesCommand::Set(args) => {
                handle_note_set(&ctx, args.id, &args.text.join(" "));
                Ok(())
            }
            NotesCommand::Rm(args) => {
                handle_note_remove(&ctx, args.id);
                Ok(())
            }
        },
        Command::Theme(command) => match command {
            ThemeCommand::Get => handle_theme_get(&ctx, format),
            ThemeCommand::Set(args) => {
                handle_theme_set(&ctx, args.theme.into());
                Ok(())
            }
            ThemeCommand::Cycle => {
                handle_theme_cycle(&ctx);
                Ok(())
            }
        },
        Command::Url(UrlCommand::Normalize(args)) => handle_url_normalize(&args.query, format),
    }
}

/// Environment first, then explicit flags.
fn layered_config(global: &GlobalArgs) -> CliResult<CatalogConfig> {
    let mut config =
        load_from_env().map_err(|err| CliError::validation(format!("configuration: {err}")))?;
    if let Some(url) = &global.api_url {
        config.api_base_url.clone_from(url);
    }
    if let Some(secs) = global.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = &global.state_dir {
        config.state_dir = Some(dir.clone());
    }
    config
        .validate()
        .map_err(|err| CliError::validation(format!("configuration: {err}")))?;
    Ok(config)
}

#[derive(Parser)]
#[command(name = "dexview", about = "Browse the creature catalog from the terminal")]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    #[arg(long, global = true, env = "DEXVIEW_API_URL")]
    api_url: Option<String>,
    #[arg(long, global = true, env = "DEXVIEW_TIMEOUT_SECS")]
    timeout: Option<u64>,
    #[arg(long, global = true, env = "DEXVIEW_STATE_DIR")]
    state_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "DEXVIEW_LOG_FORMAT")]
    log_format: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Browse the catalog with optional filters and ordering.
    Browse(BrowseArgs),
    /// Render the view encoded in a URL query string.
    Open(OpenArgs),
    /// Search entries by name.
    Search(SearchArgs),
    /// Show one entry by id or name.
    Show(ShowArgs),
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    #[command(subcommand)]
    Notes(NotesCommand),
    #[command(subcommand)]
    Theme(ThemeCommand),
    #[command(subcommand)]
    Url(UrlCommand),
}

#[derive(Args, Default)]
pub(crate) struct BrowseArgs {
    #[arg(short, long, help = "Free-text name query; switches to search mode")]
    pub(crate) query: Option<String>,
    #[arg(long = "type", help = "Only entries carrying this category")]
    pub(crate) category: Option<String>,
    #[arg(long, help = "Restrict browsing to one generation (1-9)")]
    pub(crate) generation: Option<String>,
    #[arg(long, default_value = "id")]
    pub(crate) sort_field: String,
    #[arg(long, default_value = "asc")]
    pub(crate) sort_order: String,
    #[arg(long, help = "Show favorites only")]
    pub(crate) favorites: bool,
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u32).range(1..))]
    pub(crate) pages: u32,
}

impl BrowseArgs {
    pub(crate) fn page_state(&self) -> PageState {
        PageState {
            query: self.query.clone().unwrap_or_default(),
            filters: Filters {
                category: self.category.clone().filter(|value| !value.is_empty()),
                cohort: self.generation.clone().filter(|value| !value.is_empty()),
                favorites_only: self.favorites,
            },
            sort: SortSpec::new(
                SortField::parse(&self.sort_field),
                SortOrder::parse(&self.sort_order),
            ),
            page: 1,
        }
    }
}

#[derive(Args, Default)]
pub(crate) struct OpenArgs {
    #[arg(help = "Query string such as 'type=fire&sortField=weight'")]
    pub(crate) query: String,
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u32).range(1..))]
    pub(crate) pages: u32,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
}

#[derive(Args)]
struct ShowArgs {
    #[arg(help = "Numeric id or entry name")]
    target: String,
}

#[derive(Args)]
struct IdArgs {
    #[arg(value_parser = value_parser!(u32).range(1..))]
    id: u32,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add(IdArgs),
    Remove(IdArgs),
    Toggle(IdArgs),
    Clear,
}

#[derive(Subcommand)]
enum NotesCommand {
    List,
    Get(IdArgs),
    Set(NoteSetArgs),
    Rm(IdArgs),
}

#[derive(Args)]
struct NoteSetArgs {
    #[arg(value_parser = value_parser!(u32).range(1..))]
    id: u32,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    text: Vec<String>,
}

#[derive(Subcommand)]
enum ThemeCommand {
    Get,
    Set(ThemeSetArgs),
    Cycle,
}

#[derive(Args)]
struct ThemeSetArgs {
    #[arg(value_enum)]
    theme: ThemeArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
            ThemeArg::System => Self::System,
        }
    }
}

#[derive(Subcommand)]
enum UrlCommand {
    /// Print the canonical form of a query string.
    Normalize(NormalizeArgs),
}

#[derive(Args)]
struct NormalizeArgs {
    query: String,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
