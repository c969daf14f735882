use clap::{Parser, Subcommand};
use nginx_panel::config::{self, PanelConfig};
use nginx_panel::routes::Route;
use nginx_panel::stores::{Locale, OpOutcome};
use nginx_panel::types::LogType;
use nginx_panel::PanelContext;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "nginx-panel", about = "Inspect and control the managed nginx service")]
struct Cli {
    /// Backend helper URL (overrides the saved config)
    #[arg(long)]
    backend_url: Option<String>,

    /// Language for status labels and messages (zh, en)
    #[arg(long)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show the derived status view
    Status {
        /// Print the raw backend snapshot instead
        #[arg(long)]
        raw: bool,
    },
    Start,
    Stop,
    Restart,
    /// Print the tail of a log (access, error, service)
    Logs {
        log_type: LogType,
        #[arg(long)]
        lines: Option<usize>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    ClearLogs {
        log_type: LogType,
    },
    OpenLogFolder,
    LogExists {
        log_type: LogType,
    },
    /// Refresh the status view periodically until Ctrl-C
    Watch,
    /// List the panel's views
    Routes,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("Failed to render output: {}", e),
    }
}

fn exit_code(outcome: &OpOutcome) -> i32 {
    if outcome.success { 0 } else { 1 }
}

fn load_effective_config(cli: &Cli) -> Result<PanelConfig, String> {
    let mut panel_config = config::load_config()?;
    if let Some(url) = &cli.backend_url {
        panel_config.backend_url = url.clone();
    }
    if let Some(locale) = cli.locale {
        panel_config.locale = locale;
    }
    panel_config.validate()?;
    Ok(panel_config)
}

async fn run(cli: Cli) -> Result<i32, String> {
    let panel_config = load_effective_config(&cli)?;
    config::init_cache(panel_config.clone());
    let context = PanelContext::connect(panel_config)?;

    let code = match cli.command {
        Cmd::Status { raw: true } => {
            context.service.fetch_service_info().await;
            let snapshot = context.service.snapshot();
            print_json(&snapshot);
            if snapshot.error.is_some() { 1 } else { 0 }
        }
        Cmd::Status { raw: false } => {
            let outcome = context.status.initialize().await;
            print_json(&context.status.snapshot());
            exit_code(&outcome)
        }
        Cmd::Start => {
            let outcome = context.status.start_service().await;
            print_json(&context.status.snapshot());
            exit_code(&outcome)
        }
        Cmd::Stop => {
            let outcome = context.status.stop_service().await;
            print_json(&context.status.snapshot());
            exit_code(&outcome)
        }
        Cmd::Restart => {
            let outcome = context.status.restart_service().await;
            print_json(&context.status.snapshot());
            exit_code(&outcome)
        }
        Cmd::Logs {
            log_type,
            lines,
            search,
            level,
        } => {
            let mut filter = context.default_log_filter();
            if let Some(lines) = lines {
                filter.lines = lines;
            }
            filter.search = search;
            filter.level = level;

            context.service.fetch_logs(log_type, &filter).await;
            match context.service.error() {
                Some(message) => {
                    eprintln!("{}", message);
                    1
                }
                None => {
                    print!("{}", context.service.log(log_type).content);
                    0
                }
            }
        }
        Cmd::ClearLogs { log_type } => {
            context.service.clear_logs(log_type).await;
            report_service_error(&context)
        }
        Cmd::OpenLogFolder => {
            context.service.open_log_folder().await;
            report_service_error(&context)
        }
        Cmd::LogExists { log_type } => {
            context.service.check_log_exists(log_type).await;
            if context.service.error().is_none() {
                print_json(&context.service.log(log_type));
            }
            report_service_error(&context)
        }
        Cmd::Watch => {
            context.status.initialize().await;
            print_json(&context.status.snapshot());

            let mut updates = context.status.subscribe();
            let poller = context.spawn_status_poller();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = updates.borrow_and_update().clone();
                        if !state.loading {
                            print_json(&state);
                        }
                    }
                }
            }
            poller.stop().await;
            context.status.reset_state();
            config::clear_cache();
            0
        }
        Cmd::Routes => {
            for route in Route::ALL {
                println!("{:<10} {}", route.name(), route.path());
            }
            0
        }
    };

    Ok(code)
}

fn report_service_error(context: &PanelContext) -> i32 {
    match context.service.error() {
        Some(message) => {
            eprintln!("{}", message);
            1
        }
        None => 0,
    }
}

#[tokio::main]
async fn main() {
    nginx_panel::init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(2);
        }
    }
}
