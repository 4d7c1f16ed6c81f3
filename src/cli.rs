use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use inquire::Confirm;

use restdesk::config::{AppConfig, ConfigLoader};
use restdesk::export::{ExportFormat, export_body};
use restdesk::history::printer::print_history;
use restdesk::history::selector::{
    SelectionStrategy, body_text, headers_text, select_entry, to_request_input,
};
use restdesk::history::{DEFAULT_LOAD_LIMIT, StorageBackend, open_store, store_for};
use restdesk::http::{Method, RequestInput};
use restdesk::logger::{EventLog, FileEventLog, TracingEventLog};
use restdesk::runner::{Dispatcher, RequestExecutor, Session};
use restdesk::utils::{ResponseFormatter, ResponseView};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 数据目录 (历史记录、日志、配置文件)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// 本次运行使用的存储后端, 覆盖配置文件
    #[arg(long, global = true, value_parser = parse_backend)]
    pub storage: Option<StorageBackend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a request and print the response
    Send(SendArgs),

    /// Browse, re-send or clear request history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Show or switch the history storage backend
    Storage {
        #[command(subcommand)]
        command: StorageCommand,
    },
}

#[derive(Args)]
pub struct SendArgs {
    /// GET, POST, PUT or DELETE
    #[arg(value_parser = parse_method)]
    pub method: Method,

    pub url: String,

    /// Request headers as a JSON object
    #[arg(short = 'H', long, default_value = "")]
    pub headers: String,

    /// Request body (JSON or plain text)
    #[arg(short = 'd', long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Clone)]
pub struct OutputArgs {
    /// Which part of the response to print
    #[arg(long, value_enum, default_value_t = ViewArg::Body)]
    pub view: ViewArg,

    /// Save the response body (.json → pretty JSON, otherwise text)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ViewArg {
    Body,
    Headers,
    Raw,
    All,
}

impl From<ViewArg> for ResponseView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Body => ResponseView::Body,
            ViewArg::Headers => ResponseView::Headers,
            ViewArg::Raw => ResponseView::Raw,
            ViewArg::All => ResponseView::All,
        }
    }
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List recent requests, most recent first
    List {
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOAD_LIMIT)]
        limit: usize,

        /// Only show entries whose method/URL/time contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print one entry (0 = most recent)
    Show { index: usize },

    /// Send a stored request again; pick interactively when no index is given
    Rerun {
        index: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete all history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum StorageCommand {
    /// Print the active backend
    Show,

    /// Persist a backend choice (applies on next launch)
    Use {
        #[arg(value_parser = parse_backend)]
        backend: StorageBackend,
    },
}

fn parse_method(s: &str) -> std::result::Result<Method, String> {
    s.parse().map_err(|e: restdesk::RestdeskError| e.to_string())
}

fn parse_backend(s: &str) -> std::result::Result<StorageBackend, String> {
    s.parse().map_err(|e: restdesk::RestdeskError| e.to_string())
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigLoader::load(cli.data_dir)?;
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    match cli.command {
        Commands::Send(args) => {
            let body = match (&args.body, &args.body_file) {
                (Some(body), _) => body.clone(),
                (None, Some(path)) => fs::read_to_string(path)
                    .with_context(|| format!("Failed to read body file {}", path.display()))?,
                (None, None) => String::new(),
            };
            let input = RequestInput::new(args.method, &args.url)
                .with_headers(&args.headers)
                .with_body(&body);
            let session = Arc::new(open_session(&config)?);
            send_and_render(&session, input, &args.output).await
        }
        Commands::History { command } => {
            let session = Arc::new(open_session(&config)?);
            history_command(&session, command).await
        }
        Commands::Storage { command } => storage_command(config, command),
    }
}

/// Build the session for `config`. Storage and log-file problems degrade to
/// warnings; the request workflow still runs.
fn open_session(config: &AppConfig) -> Result<Session> {
    let log: Arc<dyn EventLog> = match FileEventLog::in_data_dir(&config.data_dir) {
        Ok(log) => Arc::new(log),
        Err(e) => {
            tracing::warn!("Log file unavailable, logging to stderr only: {}", e);
            Arc::new(TracingEventLog)
        }
    };

    let store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            log.error(&format!("Failed to initialize {} history: {}", config.storage, e));
            store_for(config.storage, &config.data_dir)
        }
    };

    Ok(Session::new(RequestExecutor::new()?, Arc::from(store), log))
}

/// Submit on a background task and render the completion here.
async fn send_and_render(session: &Arc<Session>, input: RequestInput, output: &OutputArgs) -> Result<()> {
    let (dispatcher, mut completions) = Dispatcher::new(Arc::clone(session));
    println!("{}", format!("Sending {} {} ...", input.method, input.url.trim()).dimmed());
    dispatcher.submit(input);
    // Close our sender so the loop ends once the request task finishes
    drop(dispatcher);

    while let Some(completion) = completions.recv().await {
        let exchange = completion.result?;
        let formatter = ResponseFormatter::new(output.view.into());
        println!("{}", formatter.format(&exchange));

        if let Some(path) = &output.save {
            save_response(session.log(), &exchange.pretty_body, path)?;
        }
    }
    Ok(())
}

fn save_response(log: &dyn EventLog, content: &str, path: &Path) -> Result<()> {
    match export_body(content, path) {
        Ok(format) => {
            let kind = match format {
                ExportFormat::Json => "JSON",
                ExportFormat::Text => "text",
            };
            log.info(&format!("Saved response to {}", path.display()));
            println!("Saved {} → {}", kind, path.display());
            Ok(())
        }
        Err(e) => {
            log.error(&format!("Save failed: {}", e));
            Err(e.into())
        }
    }
}

async fn history_command(session: &Arc<Session>, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { limit, search } => {
            let entries = session.history(limit).await;
            print_history(&entries, search.as_deref());
            println!("Loaded {} history items", entries.len());
        }
        HistoryCommand::Show { index } => {
            let entries = session.history(DEFAULT_LOAD_LIMIT).await;
            let entry = select_entry(&entries, SelectionStrategy::Index(index))?;
            println!("{} {}", entry.method.to_string().cyan().bold(), entry.url);
            println!(
                "{}",
                format!("{} • status {} • {:.2} ms", entry.timestamp, entry.status, entry.response_time)
                    .dimmed()
            );
            let headers = headers_text(&entry.headers);
            if !headers.is_empty() {
                println!("\n{}\n{}", "Headers:".blue().bold(), headers);
            }
            let body = body_text(&entry.body);
            if !body.is_empty() {
                println!("\n{}\n{}", "Body:".blue().bold(), body);
            }
        }
        HistoryCommand::Rerun { index, output } => {
            let entries = session.history(DEFAULT_LOAD_LIMIT).await;
            let strategy = match index {
                Some(n) => SelectionStrategy::Index(n),
                None => SelectionStrategy::Interactive,
            };
            let entry = select_entry(&entries, strategy)?;
            send_and_render(session, to_request_input(&entry), &output).await?;
        }
        HistoryCommand::Clear { yes } => {
            let confirmed = yes
                || Confirm::new("Are you sure you want to clear all history?")
                    .with_default(false)
                    .prompt()?;
            if !confirmed {
                println!("Cancelled");
            } else if session.clear_history().await {
                println!("History cleared");
            } else {
                println!("{}", "Failed to clear history (see log)".red());
            }
        }
    }
    Ok(())
}

fn storage_command(config: AppConfig, command: StorageCommand) -> Result<()> {
    match command {
        StorageCommand::Show => {
            println!("Storage: {}", config.storage);
            println!("Data directory: {}", config.data_dir.display());
        }
        StorageCommand::Use { backend } => {
            let previous = config.storage;
            let config = config.with_storage(backend);
            let path = ConfigLoader::save(&config)?;
            if let Ok(log) = FileEventLog::in_data_dir(&config.data_dir) {
                log.info(&format!("Storage toggled: {} -> {}", previous, backend));
            }
            println!(
                "Storage set to {} ({}). Existing history is not migrated; takes effect on next launch.",
                backend,
                path.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "restdesk",
            "send",
            "post",
            "https://example.test/users",
            "-H",
            r#"{"Accept": "application/json"}"#,
            "-d",
            r#"{"name": "foo"}"#,
            "--view",
            "all",
        ])
        .unwrap();

        let Commands::Send(args) = cli.command else {
            panic!("Expected send command");
        };
        assert_eq!(args.method, Method::Post);
        assert_eq!(args.url, "https://example.test/users");
        assert_eq!(args.body.as_deref(), Some(r#"{"name": "foo"}"#));
        assert!(matches!(args.output.view, ViewArg::All));
    }

    #[test]
    fn test_rejects_unsupported_method() {
        assert!(Cli::try_parse_from(["restdesk", "send", "PATCH", "https://example.test"]).is_err());
    }

    #[test]
    fn test_body_and_body_file_conflict() {
        let result = Cli::try_parse_from([
            "restdesk",
            "send",
            "POST",
            "https://example.test",
            "-d",
            "x",
            "--body-file",
            "body.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_storage_use() {
        let cli = Cli::try_parse_from(["restdesk", "storage", "use", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Storage {
                command: StorageCommand::Use {
                    backend: StorageBackend::Json
                }
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "restdesk",
            "history",
            "list",
            "--storage",
            "json",
            "--data-dir",
            "/tmp/restdesk",
        ])
        .unwrap();
        assert_eq!(cli.storage, Some(StorageBackend::Json));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/restdesk")));
    }
}
