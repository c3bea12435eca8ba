use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

use reel::app::{App, AppEvent};
use reel::config::Config;
use reel::feed::VideoRecord;
use reel::ui;
use reel::util::{format_pub_date, strip_control_chars};

#[derive(Parser, Debug)]
#[command(name = "reel", about = "Terminal browser for archive.org video collections")]
struct Args {
    /// Config file (default: ~/.config/reel/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Collection identifier to browse
    #[arg(long, value_name = "ID")]
    collection: Option<String>,

    /// Feed endpoint URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Page to open first
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,

    /// Print one page of records and exit
    #[arg(long)]
    list: bool,

    /// With --list, print records as a JSON array
    #[arg(long, requires = "list")]
    json: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(collection) = &args.collection {
        config.collection = collection.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(page) = args.page {
        config.start_page = page;
    }
    Ok(config)
}

fn print_records(records: &[VideoRecord], json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, records).context("Failed to encode records")?;
        writeln!(out)?;
        return Ok(());
    }

    for record in records {
        writeln!(
            out,
            "{}\t{}\t{}",
            format_pub_date(&record.published_at),
            strip_control_chars(&record.title),
            if record.has_video() {
                &record.video_url
            } else {
                &record.link
            }
        )?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land inside the TUI or --list output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let start_page = config.start_page();

    let mut app = App::new(&config).context("Failed to create application")?;

    if args.list {
        let records = app
            .client
            .fetch_page(start_page)
            .await
            .with_context(|| format!("Failed to fetch page {}", start_page))?;
        return print_records(&records, args.json);
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    app.load_page(start_page, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;
    Ok(())
}
