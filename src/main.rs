use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use yamler_core::{OutputFormat, YamlerConfig};
use yamler_fetch::FetchClient;
use yamler_session::{EntryListing, LoadOutcome, LoadState, SearchReport, Session};

#[derive(Parser)]
#[command(
    name = "yamler",
    version,
    about = "Fetch a YAML file, flatten its keys, and fuzzy-search them in place",
    long_about = "Yamler loads a remote YAML document (typically a Helm chart's values.yaml),\n\
                   flattens it into dotted key paths, and lets you fuzzy-search those paths\n\
                   with the surrounding source lines shown for every match.\n\n\
                   GitHub `/blob/` links are rewritten to raw-content links automatically.\n\n\
                   Examples:\n  \
                     yamler load <URL> --list             List every key with its line\n  \
                     yamler search <URL> replicas         Find keys matching 'replicas'\n  \
                     yamler search <URL> image --limit 3  Show the top three matches\n  \
                     yamler explore <URL>                 Search interactively\n  \
                     yamler init                          Write a .yamler.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .yamler.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable listing with context windows (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and flatten a YAML document
    #[command(long_about = "Fetch and flatten a YAML document.\n\n\
        Prints how many entries were found. With --list, prints every entry with\n\
        its dotted path, source line, and value.\n\n\
        Examples:\n  yamler load https://github.com/org/chart/blob/main/values.yaml\n  \
        yamler load https://raw.githubusercontent.com/org/chart/main/values.yaml --list")]
    Load {
        /// URL of the YAML file (http or https)
        url: String,

        /// Print every flattened entry
        #[arg(long)]
        list: bool,
    },
    /// Fuzzy-search the keys of a YAML document
    #[command(long_about = "Fuzzy-search the keys of a YAML document.\n\n\
        Matches the query against each entry's dotted path and final key, tolerating\n\
        partial words and small typos. Each match is printed with its surrounding lines.\n\n\
        Examples:\n  yamler search <URL> replicas\n  yamler search <URL> 'webhook.port' --context 2\n  \
        yamler search <URL> image --limit 5 --format json")]
    Search {
        /// URL of the YAML file (http or https)
        url: String,

        /// Search query
        query: String,

        /// Maximum results to show (default: unlimited, or [search] limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Lines of context around each match (default: 4, or [display] context_lines)
        #[arg(long)]
        context: Option<usize>,
    },
    /// Load a document and search it interactively
    #[command(long_about = "Load a document and search it interactively.\n\n\
        Each line read from stdin is a query. Commands:\n  \
        :load <URL>  load another document\n  \
        :list        list every entry\n  \
        :help        show this help\n  \
        :quit        exit\n\n\
        Examples:\n  yamler explore https://github.com/org/chart/blob/main/values.yaml")]
    Explore {
        /// URL of the YAML file (http or https)
        url: String,
    },
    /// Create a default .yamler.toml configuration file
    #[command(long_about = "Create a default .yamler.toml configuration file.\n\n\
        Writes a commented configuration template to the current directory.\n\
        Refuses to overwrite an existing file.\n\n\
        Examples:\n  yamler init")]
    Init,
    /// Generate shell completions
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

const DEFAULT_CONFIG: &str = r#"# Yamler Configuration
# See: https://github.com/yamler/yamler

[fetch]
# Host serving raw file contents
raw_host = "raw.githubusercontent.com"
# Repository host whose /blob/ links are rewritten to raw_host
repo_host = "github.com"
# Request timeout in seconds (default: none)
# timeout_secs = 30

[search]
# 0.0 accepts exact matches only, 1.0 accepts anything
threshold = 0.4
# Character position where matches are expected
location = 0
# How far from `location` a match may sit before it stops counting
distance = 100
# Score on typos alone, regardless of match position
ignore_location = false
# Maximum number of results (default: unlimited)
# limit = 20

[display]
# Lines shown above and below each match
context_lines = 4
"#;

const EXPLORE_HELP: &str = "\
Type a query to search. Commands:
  :load <URL>  load another document
  :list        list every entry
  :help        show this help
  :quit        exit";

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1myamler\x1b[0m v{version}: fuzzy search for YAML keys\n");

        println!("Quick start:");
        println!("  \x1b[36myamler search <URL> replicas\x1b[0m  Find keys matching 'replicas'");
        println!("  \x1b[36myamler explore <URL>\x1b[0m          Search a document interactively\n");

        println!("All commands:");
        println!("  \x1b[32mload\x1b[0m      Fetch and flatten a YAML document");
        println!("  \x1b[32msearch\x1b[0m    Fuzzy-search keys with context");
        println!("  \x1b[32mexplore\x1b[0m   Interactive search session");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("yamler v{version}: fuzzy search for YAML keys\n");

        println!("Quick start:");
        println!("  yamler search <URL> replicas  Find keys matching 'replicas'");
        println!("  yamler explore <URL>          Search a document interactively\n");

        println!("All commands:");
        println!("  load      Fetch and flatten a YAML document");
        println!("  search    Fuzzy-search keys with context");
        println!("  explore   Interactive search session");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'yamler <command> --help' for details.");
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: String) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Some(pb)
}

async fn load_with_progress(session: &mut Session, client: &FetchClient, url: &str) -> LoadOutcome {
    let pb = spinner(format!("Fetching {}", url.trim()));
    let outcome = session.load(client, url).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    outcome
}

/// Load `url` for a one-shot command, turning a failed load into an error.
async fn load_or_fail(session: &mut Session, client: &FetchClient, url: &str) -> Result<()> {
    match load_with_progress(session, client, url).await {
        LoadOutcome::Loaded { .. } | LoadOutcome::Stale => Ok(()),
        LoadOutcome::Failed(err) => Err(err.into()),
    }
}

fn loaded_url(session: &Session) -> Option<&str> {
    match session.state() {
        LoadState::Loaded { url, .. } => Some(url.trim()),
        _ => None,
    }
}

fn print_listing(session: &Session, format: OutputFormat, use_color: bool) -> Result<()> {
    let listing = EntryListing::new(loaded_url(session), session.entries());
    let rendered = listing.render(format, use_color)?;
    print!("{rendered}");
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn print_search(session: &Session, format: OutputFormat, use_color: bool) -> Result<()> {
    let rendered = SearchReport::from_session(session).render(format, use_color)?;
    print!("{rendered}");
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

async fn run_explore(
    session: &mut Session,
    client: &FetchClient,
    url: &str,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    report_load(load_with_progress(session, client, url).await, session);
    eprintln!("{EXPLORE_HELP}");

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            eprint!("> ");
            std::io::stderr().flush().into_diagnostic()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.into_diagnostic()?;
        let input = line.trim();

        match ExploreInput::parse(input) {
            ExploreInput::Quit => break,
            ExploreInput::Help => eprintln!("{EXPLORE_HELP}"),
            ExploreInput::List => print_listing(session, format, use_color)?,
            ExploreInput::Load(url) => {
                report_load(load_with_progress(session, client, url).await, session);
            }
            ExploreInput::Unknown(command) => {
                eprintln!("unknown command: {command} (type :help for commands)");
            }
            ExploreInput::Query(query) => {
                session.search(query);
                print_search(session, format, use_color)?;
            }
        }
    }
    Ok(())
}

/// One line of input to the explore loop.
enum ExploreInput<'a> {
    Quit,
    Help,
    List,
    Load(&'a str),
    Unknown(&'a str),
    Query(&'a str),
}

impl<'a> ExploreInput<'a> {
    /// Lines starting with `:` are commands; anything else is a query.
    fn parse(input: &'a str) -> Self {
        if !input.starts_with(':') {
            return ExploreInput::Query(input);
        }
        let (command, arg) = match input.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (input, ""),
        };
        match command {
            ":quit" | ":q" | ":exit" => ExploreInput::Quit,
            ":help" => ExploreInput::Help,
            ":list" => ExploreInput::List,
            ":load" => ExploreInput::Load(arg),
            _ => ExploreInput::Unknown(command),
        }
    }
}

fn report_load(outcome: LoadOutcome, session: &Session) {
    match outcome {
        LoadOutcome::Loaded { .. } => eprintln!("{}", session.state()),
        LoadOutcome::Failed(err) => eprintln!("error: {err}"),
        LoadOutcome::Stale => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => YamlerConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".yamler.toml");
            if default_path.exists() {
                YamlerConfig::from_file(default_path)?
            } else {
                YamlerConfig::default()
            }
        }
    };
    tracing::debug!(format = %cli.format, ?config, "resolved configuration");

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    match cli.command {
        None => {
            print_welcome(use_color);
        }
        Some(Command::Load { ref url, list }) => {
            let client = FetchClient::new(&config.fetch)?;
            let mut session = Session::new(config);
            load_or_fail(&mut session, &client, url).await?;

            match cli.format {
                OutputFormat::Json if !list => {
                    let summary = serde_json::json!({
                        "url": loaded_url(&session),
                        "entryCount": session.entries().len(),
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&summary).into_diagnostic()?
                    );
                }
                OutputFormat::Json => print_listing(&session, cli.format, use_color)?,
                OutputFormat::Text | OutputFormat::Markdown => {
                    println!("{}", session.state());
                    if list {
                        if cli.format == OutputFormat::Markdown {
                            println!();
                        }
                        print_listing(&session, cli.format, use_color)?;
                    }
                }
            }
        }
        Some(Command::Search {
            ref url,
            ref query,
            limit,
            context,
        }) => {
            if limit.is_some() {
                config.search.limit = limit;
            }
            if let Some(lines) = context {
                config.display.context_lines = lines;
            }

            let client = FetchClient::new(&config.fetch)?;
            let mut session = Session::new(config);
            load_or_fail(&mut session, &client, url).await?;
            if cli.format == OutputFormat::Text {
                eprintln!("{}", session.state());
            }

            session.search(query);
            print_search(&session, cli.format, use_color)?;
        }
        Some(Command::Explore { ref url }) => {
            let client = FetchClient::new(&config.fetch)?;
            let mut session = Session::new(config);
            run_explore(&mut session, &client, url, cli.format, use_color).await?;
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".yamler.toml");
            if path.exists() {
                miette::bail!(".yamler.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .yamler.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "yamler", &mut std::io::stdout());
        }
    }

    Ok(())
}
