// Static Catalog Renderer
//
// Purpose: Build the catalog once and write the listing page as static HTML
// Usage: cargo run --bin render_catalog -- [QUERY] [--out PATH]
//   e.g. render_catalog "category=education&sort=title-asc" --out programs.html

use anyhow::{bail, Context};
use programmata::{load_catalog, render, RenderOptions, SiteConfig, ViewState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    query: String,
    out: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut query = String::new();
    let mut out = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        if arg == "--out" || arg == "-o" {
            let path = args.next().context("--out needs a path")?;
            out = Some(PathBuf::from(path));
        } else if arg.starts_with('-') {
            bail!("unknown flag {}", arg);
        } else if query.is_empty() {
            query = arg;
        } else {
            bail!("unexpected argument {}", arg);
        }
    }

    Ok(Args { query, out })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean HTML
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "programmata=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let config = SiteConfig::from_env();
    config.log_summary();

    let fetcher = config.fetcher()?;
    let resolver = config.resolver(fetcher.clone());
    let loader = config.loader(fetcher);

    let state = load_catalog(&resolver, &loader).await;
    let view = ViewState::from_query(&args.query);
    let options = RenderOptions::static_site(&config.default_image);
    let page = render::render_listing(&state, &view, &options)?;

    match args.out {
        Some(path) => {
            tokio::fs::write(&path, page)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote listing page to {}", path.display());
        }
        None => print!("{}", page),
    }

    if state.is_failed() {
        bail!("catalog could not be built; page shows the error state");
    }

    Ok(())
}
