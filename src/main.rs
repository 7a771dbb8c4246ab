use clap::{Parser, Subcommand};
use serde::Serialize;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::sync::Arc;

use wayfinder::core::NavigationState;
use wayfinder::core::config::{self, ResolvedConfig};
use wayfinder::core::path;
use wayfinder::platform::{Location, MemoryHistory, MemoryStorage, RecordingReloader};
use wayfinder::routes::{Resolution, Visibility, catalog};
use wayfinder::{PageView, Platform, Router};

#[derive(Parser)]
#[command(name = "wayfinder", about = "Inspect and exercise SPA route resolution")]
struct Args {
    /// Treat the build as a production build
    #[arg(long, global = true)]
    production: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a URL to its navigation state and route outcome
    Resolve {
        url: String,
        #[arg(long)]
        json: bool,
    },
    /// Print the legacy static-host redirect form of a URL
    Encode { url: String },
    /// List every route with its outcome
    Routes {
        #[arg(long)]
        json: bool,
    },
    /// Start at the first URL, navigate through the rest, and render each page
    Visit {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Serialize)]
struct ResolveReport {
    #[serde(flatten)]
    state: NavigationState,
    resolution: Resolution,
}

#[derive(Serialize)]
struct RouteReport<'a> {
    path: &'a str,
    visibility: Visibility,
    resolution: Resolution,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

fn resolve_command(config: &ResolvedConfig, url: &str, json: bool) {
    let table = catalog::build_table(config);
    let state = path::resolve(&Location::parse(url));
    let report = ResolveReport {
        resolution: table.resolution(&state.path),
        state,
    };
    if json {
        print_json(&report);
    } else {
        println!("path:       {}", report.state.path);
        println!("search:     {}", report.state.search);
        println!("resolution: {}", report.resolution);
    }
}

fn routes_command(config: &ResolvedConfig, json: bool) {
    let table = catalog::build_table(config);
    let reports: Vec<RouteReport> = table
        .entries()
        .into_iter()
        .map(|entry| RouteReport {
            path: &entry.path,
            visibility: entry.visibility,
            resolution: table.resolution(&entry.path),
        })
        .collect();
    if json {
        print_json(&reports);
    } else {
        for report in reports {
            println!(
                "{:<28} {:<9} {}",
                report.path,
                format!("{:?}", report.visibility).to_lowercase(),
                report.resolution
            );
        }
    }
}

async fn visit_command(config: &ResolvedConfig, urls: &[String]) {
    let Some((first, rest)) = urls.split_first() else {
        return;
    };
    let history = Arc::new(MemoryHistory::new(first));
    let reloader = Arc::new(RecordingReloader::new());
    let platform = Platform {
        history: history.clone(),
        storage: Arc::new(MemoryStorage::new()),
        reloader: reloader.clone(),
    };
    let router = Router::new(platform, catalog::build_table(config), config);

    show(&router, router.render_current().await);
    for url in rest {
        router.navigate(url);
        show(&router, router.render_current().await);
    }
    println!("history entries: {}", history.len());
    if reloader.count() > 0 {
        println!("reloads requested: {:?}", reloader.urls());
    }
}

fn show(router: &Router, view: PageView) {
    println!("{:<40} {}", router.current().href(), view.render());
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to wayfinder.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("wayfinder.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            eprintln!("warning: {e}, using defaults");
            config::WayfinderConfig::default()
        }
    };
    let config = config::resolve(&file_config, args.production);
    log::info!("Wayfinder starting (production: {})", config.production);

    match args.command {
        Command::Resolve { url, json } => resolve_command(&config, &url, json),
        Command::Encode { url } => {
            let location = Location::parse(&url);
            println!("{}", path::encode_legacy_redirect(&location.pathname, &location.search));
        }
        Command::Routes { json } => routes_command(&config, json),
        Command::Visit { urls } => visit_command(&config, &urls).await,
    }
    Ok(())
}
