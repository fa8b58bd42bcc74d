use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use runbook_studio_config::Config;
use runbook_studio_engine::editing::{AnchorPosition, EditorOptions, LineIndex, RunbookEditor};
use runbook_studio_engine::{
    CacheOptions, ContentCache, ContentRequest, FileStore, ParameterExtractor, RunbookId, io,
};
use std::path::{Path, PathBuf};
use std::{fs, process};

#[derive(Parser, Debug)]
#[command(name = "runbook-studio")]
#[command(about = "Inspect runbook scripts and read runbooks from a store")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.config/runbook-studio/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the parameters a local script declares
    Params { file: PathBuf },
    /// Print parse problems in a local script
    Check { file: PathBuf },
    /// Print a runbook from the configured store
    Fetch {
        id: RunbookId,
        /// Read the published version instead of the draft
        #[arg(long)]
        published: bool,
        /// Ask the store even if cached content is still fresh
        #[arg(long)]
        force: bool,
    },
    /// List the runbooks in the configured store
    List,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }
}

fn editor_options(config: Option<&Config>) -> EditorOptions {
    config.map_or_else(EditorOptions::default, |config| EditorOptions {
        code_analysis: config.code_analysis,
    })
}

fn cache_options(config: &Config) -> CacheOptions {
    CacheOptions {
        freshness: config.freshness(),
    }
}

fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn print_parameters(path: &Path) -> Result<()> {
    let report = ParameterExtractor::new().report(&read_script(path)?)?;

    for parameter in &report.parameters {
        let array = if parameter.is_array { "[]" } else { "" };
        println!(
            "{} (${}): {}{array}",
            parameter.display_name, parameter.raw_name, parameter.type_name
        );
    }
    for skipped in &report.skipped {
        eprintln!("skipped: {skipped}");
    }
    Ok(())
}

/// Print parse errors as `file:line:column: message`, the way the editor
/// would mark them. Returns the error count.
fn check_script(path: &Path, options: EditorOptions) -> Result<usize> {
    let editor = RunbookEditor::new(&read_script(path)?, options);
    if !editor.options().code_analysis {
        println!("{}: code analysis is turned off", path.display());
        return Ok(0);
    }

    let buffer = editor.buffer();
    let mut count = 0;
    for bookmark in editor.bookmarks().parse_errors() {
        let AnchorPosition::Offset { start, .. } = bookmark.position() else {
            continue;
        };
        let line = buffer.line_of_offset(start);
        let line_start = buffer.line_span(line).map_or(0, |span| span.start);
        let column = start.saturating_sub(line_start) + 1;
        println!(
            "{}:{line}:{column}: {}",
            path.display(),
            bookmark.message().unwrap_or_default()
        );
        count += 1;
    }
    if count == 0 {
        println!("{}: no problems found", path.display());
    }
    Ok(count)
}

/// Load the config file if there is one.
fn load_config(config_path: &Path) -> Result<Option<Config>> {
    Ok(Config::load_from_path(config_path)?)
}

fn open_store(config_path: &Path) -> Result<(Config, FileStore)> {
    let config = load_config(config_path)?.with_context(|| {
        format!(
            "No config file at '{}'; create one with a store_path",
            config_path.display()
        )
    })?;
    io::validate_store_dir(&config.store_path).with_context(|| {
        format!(
            "Store path from config file '{}' is invalid",
            config_path.display()
        )
    })?;
    log::info!("Using runbook store {}", config.store_path.display());
    let store = FileStore::new(&config.store_path);
    Ok((config, store))
}

fn fetch(config_path: &Path, id: RunbookId, published: bool, force: bool) -> Result<()> {
    let (config, store) = open_store(config_path)?;
    let cache = ContentCache::new(id, store, cache_options(&config));

    let request = if published {
        ContentRequest::published()
    } else {
        ContentRequest::draft()
    };
    let request = if force { request.forced() } else { request };

    print!("{}", cache.get_content(request));
    Ok(())
}

fn list(config_path: &Path) -> Result<()> {
    let (_, store) = open_store(config_path)?;
    for runbook in store.list_runbooks()? {
        let variants: Vec<_> = runbook.variants.iter().map(|v| v.as_str()).collect();
        println!("{}  {}", runbook.id, variants.join(","));
    }
    Ok(())
}

/// Run a command. `Ok(false)` means it ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config_path();
    match cli.command {
        Command::Params { file } => print_parameters(&file).map(|()| true),
        Command::Check { file } => {
            let config = load_config(&config_path)?;
            check_script(&file, editor_options(config.as_ref())).map(|errors| errors == 0)
        }
        Command::Fetch {
            id,
            published,
            force,
        } => fetch(&config_path, id, published, force).map(|()| true),
        Command::List => list(&config_path).map(|()| true),
    }
}

fn main() {
    // Warnings by default, RUST_LOG overrides
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        // --help and --version are not failures
        process::exit(if e.use_stderr() { 1 } else { 0 });
    });

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
