// pagesift CLI: crawl one or more seed URLs and export the extracted items.
//
// Usage:
//   pagesift <url> [<url>...] [--mode auto|html|browser] [--max-pages N]
//            [--multi-domain N] [--out items.json] [--csv items.csv]
//            [--no-robots] [--delay SECS] [--probe]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::info;

use pagesift::{
    CrawlConfig, CrawlMode, CsvExporter, Credentials, DualModeEngine, JsonExporter,
    ProxyProvider, ResultSink, ScaleHandler,
};

struct CliArgs {
    urls: Vec<String>,
    mode: CrawlMode,
    max_pages: Option<usize>,
    multi_domain: Option<usize>,
    json_out: Option<String>,
    csv_out: Option<String>,
    follow_robots: bool,
    domain_delay: Option<f64>,
    probe: bool,
}

fn parse_args(mut args: std::env::Args) -> Result<CliArgs> {
    let _program = args.next();
    let mut parsed = CliArgs {
        urls: Vec::new(),
        mode: CrawlMode::Auto,
        max_pages: None,
        multi_domain: None,
        json_out: None,
        csv_out: None,
        follow_robots: true,
        domain_delay: None,
        probe: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                let value = args.next().context("--mode needs a value")?;
                parsed.mode = CrawlMode::parse(&value);
            }
            "--max-pages" => {
                let value = args.next().context("--max-pages needs a value")?;
                parsed.max_pages = Some(value.parse().context("--max-pages must be a number")?);
            }
            "--multi-domain" => {
                let value = args.next().context("--multi-domain needs a value")?;
                parsed.multi_domain =
                    Some(value.parse().context("--multi-domain must be a number")?);
            }
            "--out" => parsed.json_out = Some(args.next().context("--out needs a path")?),
            "--csv" => parsed.csv_out = Some(args.next().context("--csv needs a path")?),
            "--no-robots" => parsed.follow_robots = false,
            "--probe" => parsed.probe = true,
            "--delay" => {
                let value = args.next().context("--delay needs a value")?;
                parsed.domain_delay = Some(value.parse().context("--delay must be seconds")?);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            url => parsed.urls.push(url.to_string()),
        }
    }

    if parsed.urls.is_empty() {
        bail!(
            "usage: pagesift <url> [<url>...] [--mode auto|html|browser] [--max-pages N] \
             [--multi-domain N] [--out items.json] [--csv items.csv] [--no-robots] \
             [--delay SECS] [--probe]"
        );
    }
    Ok(parsed)
}

async fn run(args: CliArgs) -> Result<()> {
    let mut builder = CrawlConfig::builder().follow_robots(args.follow_robots);
    if let Some(delay) = args.domain_delay {
        builder = builder.domain_delay_secs(delay);
    }
    let config = builder.build()?;

    let engine = Arc::new(DualModeEngine::new(
        &config,
        Credentials::default(),
        Arc::new(ProxyProvider::disabled()),
    ));

    if args.probe {
        return probe_page(&engine, &args.urls[0], args.mode).await;
    }

    let mut handler = ScaleHandler::new(engine, config);

    let json = args
        .json_out
        .as_ref()
        .map(|path| Arc::new(JsonExporter::new(path)));
    let csv = args.csv_out.as_ref().map(|path| Arc::new(CsvExporter::new(path)));
    let collected = Arc::new(pagesift::CollectingSink::new());

    struct FanOut {
        json: Option<Arc<JsonExporter>>,
        csv: Option<Arc<CsvExporter>>,
        collected: Arc<pagesift::CollectingSink>,
    }
    impl ResultSink for FanOut {
        fn on_item(&self, item: &pagesift::Item) {
            if let Some(json) = &self.json {
                json.on_item(item);
            }
            if let Some(csv) = &self.csv {
                csv.on_item(item);
            }
            self.collected.on_item(item);
        }
    }
    let sink = FanOut {
        json: json.clone(),
        csv: csv.clone(),
        collected: Arc::clone(&collected),
    };

    let summary = match args.multi_domain {
        Some(per_domain) => {
            handler
                .crawl_multi_domain(&args.urls, args.mode, per_domain, &sink)
                .await?
        }
        None => {
            handler
                .crawl(&args.urls, args.mode, args.max_pages, &sink)
                .await?
        }
    };

    if let Some(json) = &json {
        json.flush()?;
        info!("wrote {} items to {}", json.len(), json.path().display());
    }
    if let Some(csv) = &csv {
        csv.flush()?;
        info!("wrote {} items to {}", csv.len(), csv.path().display());
    }

    println!(
        "crawled {} pages ({} errors), extracted {} items across {} domains in {:.1}s",
        summary.pages_crawled,
        summary.errors,
        summary.items_extracted,
        summary.domains_crawled,
        summary.elapsed_seconds
    );
    if args.json_out.is_none() && args.csv_out.is_none() {
        for item in collected.items().iter().take(10) {
            println!(
                "  {} | {}",
                item.get_str("title").unwrap_or("-"),
                item.get_str("link").unwrap_or("-")
            );
        }
    }
    Ok(())
}

/// One-shot page test: show what a crawl of this page would detect.
async fn probe_page(engine: &Arc<DualModeEngine>, url: &str, mode: CrawlMode) -> Result<()> {
    let probe = engine.probe(url, mode).await;

    println!("url:        {}", probe.url);
    println!("mode used:  {}", probe.mode.as_str());
    println!("items:      {}", probe.items.len());
    println!(
        "next page:  {}",
        probe.next_url.as_deref().unwrap_or("none detected")
    );
    if let Some(patterns) = &probe.patterns {
        if let Some(best) = patterns.best_container() {
            println!("selector:   {} ({} matches)", best.selector, best.count);
        }
        if let Some(pagination) = &patterns.pagination {
            println!("pagination: {}", serde_json::to_string(pagination)?);
        }
    }
    for (i, item) in probe.items.iter().take(3).enumerate() {
        println!("sample {}:   {}", i + 1, serde_json::to_string(item)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
