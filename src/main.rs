use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notion_tasks::cli::Cli;
use notion_tasks::config::Config;
use notion_tasks::display::{Renderer, TemplateData, TerminalRenderer};
use notion_tasks::orchestrator::Orchestrator;
use notion_tasks::sources::FetchResult;
use notion_tasks::sources::notion::{NotionSource, build_query};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    info!("notion-tasks starting");

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => fail(e),
    };

    info!(?config, "config loaded");

    let json = config.json;
    let once = config.once;
    let dry_run = config.dry_run;
    let name_format = config.name_format;
    let orchestrator = Orchestrator::new(NotionSource::new(), config);

    if dry_run {
        let query = build_query(&orchestrator.next_request());
        match serde_json::to_string_pretty(&query) {
            Ok(text) => println!("{text}"),
            Err(e) => fail(e),
        }
        return;
    }

    let mut renderer = match TerminalRenderer::new(std::io::stdout(), name_format) {
        Ok(r) => r,
        Err(e) => fail(e),
    };

    if once {
        let tasks = match orchestrator.run_once().await {
            Ok(tasks) => tasks,
            Err(e) => fail(e),
        };
        let rendered = if json {
            serde_json::to_string_pretty(&FetchResult { tasks })
                .map(|text| println!("{text}"))
                .map_err(|e| e.to_string())
        } else {
            renderer
                .render(TemplateData {
                    loading: false,
                    tasks: &tasks,
                })
                .map_err(|e| e.to_string())
        };
        if let Err(e) = rendered {
            fail(e);
        }
        return;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl-C");
                // Keep the sender alive so the display keeps running.
                std::future::pending::<()>().await;
            }
        }
    });

    if let Err(e) = orchestrator.run(renderer, shutdown_rx).await {
        fail(e);
    }
    info!("notion-tasks stopped");
}
