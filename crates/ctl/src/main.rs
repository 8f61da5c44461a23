use std::path::PathBuf;

use anyhow::Context;
use buildboard_client::{ClientConfig, Dashboard, HttpSource, RouteStyle};
use buildboard_core::projection::project_fields;
use buildboard_core::view::{CurrentBuilderView, EmptyState, HeaderView, PaginationView, TrayView};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Step table columns and their headings.
const BUILD_STEP_FIELDS: [&str; 3] = ["step_number", "text", "logs"];
const STEP_HEADERS: [&str; 3] = ["no.", "text", "log"];

#[derive(Parser, Debug)]
#[command(name = "buildboardctl", version, about = "Browse CI build snapshots from the terminal")]
struct Args {
    /// TOML file with base_url / page_size / route_style / request_timeout_ms.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dashboard backend base URL, e.g. http://127.0.0.1:8080
    #[arg(long)]
    base_url: Option<String>,

    /// Snapshots per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// `path-segments` (/builders/number=N/offset=M) or `query` (/data?limit=N&offset=M).
    #[arg(long)]
    route_style: Option<RouteStyle>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (env-filter syntax). Overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    /// Print views as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List snapshot headers on a page.
    List {
        #[arg(long, default_value_t = 0)]
        page: u64,
    },
    /// Expand one snapshot and show a builder's steps.
    Show {
        #[arg(long, default_value_t = 0)]
        page: u64,
        /// Position of the snapshot on the page.
        #[arg(long)]
        position: usize,
        /// Builder index within the snapshot.
        #[arg(long, default_value_t = 0)]
        builder: usize,
    },
}

fn resolve_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut cfg = match &args.config {
        Some(path) => ClientConfig::load_from(path).context("load config")?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &args.base_url {
        cfg.base_url = url.clone();
    }
    if let Some(size) = args.page_size {
        cfg.page_size = size;
    }
    if let Some(style) = args.route_style {
        cfg.route_style = style;
    }
    if let Some(ms) = args.timeout_ms {
        cfg.request_timeout_ms = ms;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cfg = resolve_config(&args)?;
    tracing::debug!(?cfg, "resolved config");

    let mut dash = Dashboard::new(HttpSource::new(&cfg), &cfg).context("invalid page size")?;

    let page = match args.cmd {
        Cmd::List { page } | Cmd::Show { page, .. } => page,
    };
    let page = i64::try_from(page).context("page out of range")?;
    dash.change_page(page);
    dash.mount();
    dash.settle().await;

    match args.cmd {
        Cmd::List { .. } => {
            let headers = dash.headers();
            let pagination = dash.pagination_view();
            if args.json {
                let out = list_json(&headers, &pagination, dash.empty_state());
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_headers(&headers, dash.empty_state());
                print_pagination(&pagination);
            }
        }
        Cmd::Show {
            position, builder, ..
        } => {
            if dash.data().is_empty() {
                if args.json {
                    let out = serde_json::json!({ "empty": dash.empty_state() });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    print_headers(&[], dash.empty_state());
                }
                return Ok(());
            }
            dash.toggle(position).context("toggle snapshot")?;
            dash.select_builder(position, builder)
                .context("select builder")?;
            let tray = dash
                .tray(position)
                .with_context(|| format!("no snapshot at position {position}"))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&tray)?);
            } else {
                print_tray(&tray)?;
            }
        }
    }

    Ok(())
}

fn list_json(headers: &[HeaderView], pagination: &PaginationView, empty: Option<EmptyState>) -> Value {
    serde_json::json!({
        "snapshots": headers,
        "pagination": pagination,
        "empty": empty,
    })
}

fn print_headers(headers: &[HeaderView], empty: Option<EmptyState>) {
    match empty {
        Some(EmptyState::Loading) => println!("loading..."),
        Some(EmptyState::NoRevisions { as_of_ms }) => {
            println!("No new revisions to display as of {as_of_ms} (unix ms).")
        }
        Some(EmptyState::Unavailable(e)) => println!("Build data unavailable: {e}"),
        None => {
            for h in headers {
                println!(
                    "[{}] {:<12} {:<8} {}",
                    h.position,
                    h.commit_hash,
                    h.status.to_string(),
                    h.description
                );
            }
        }
    }
}

fn print_pagination(view: &PaginationView) {
    let prev = if view.has_previous { "<prev" } else { "     " };
    let next = if view.has_next { "next>" } else { "     " };
    println!("{prev}  page {}  {next}", view.page_number);
}

fn print_tray(tray: &TrayView) -> anyhow::Result<()> {
    if let Some(ts) = &tray.timestamp {
        println!("pushed: {ts}");
    }
    for chip in &tray.builders {
        let marker = if chip.index == tray.selected_builder_index { '*' } else { ' ' };
        println!("{marker} {:<24} {}", chip.name, chip.status);
    }

    let steps = match &tray.current {
        CurrentBuilderView::Builder { build_steps, .. } => build_steps,
        CurrentBuilderView::NoBuilder => {
            println!("(no builders reported for this snapshot)");
            return Ok(());
        }
    };

    println!();
    println!("{:<5} {:<40} {}", STEP_HEADERS[0], STEP_HEADERS[1], STEP_HEADERS[2]);
    let blank = Value::String(String::new());
    for step in steps {
        let raw = serde_json::to_value(step).context("encode step")?;
        let row = project_fields(Some(&raw), &BUILD_STEP_FIELDS, &blank);
        let cells: Vec<String> = BUILD_STEP_FIELDS
            .iter()
            .map(|f| match &row[*f] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        println!("{:<5} {:<40} {}", cells[0], cells[1], cells[2]);
    }
    Ok(())
}
