use anyhow::{Context, Result};
use salesdash::{aggregate, config::Config, ingest, render};
use std::{env, fs, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    // ─── 2) arguments & config ───────────────────────────────────────
    let mut args = env::args().skip(1);
    let input = PathBuf::from(
        args.next()
            .context("usage: salesdash <sales.csv> [out_dir] [config.yaml]")?,
    );
    let out_override = args.next().map(PathBuf::from);
    let config = match args.next().map(PathBuf::from) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let out_dir = out_override.unwrap_or_else(|| config.output_dir.clone());

    // ─── 3) ingest ───────────────────────────────────────────────────
    let start = Instant::now();
    let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let text = ingest::decode_utf8(&bytes)?;
    let aliases = config.alias_table()?;
    let table = ingest::parse_table(text, &aliases)?;
    info!(rows = table.len(), elapsed = ?start.elapsed(), "parsed sales table");

    // ─── 4) aggregate ────────────────────────────────────────────────
    let series = aggregate::derive_all(&table, config.top_products)?;
    info!(
        months = series.monthly_totals.len(),
        categories = series.category_shares.len(),
        days = series.daily_quantities.len(),
        "derived series"
    );

    // ─── 5) render ───────────────────────────────────────────────────
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let panels = render::render_all(&series, config.top_products, &out_dir)?;
    let page = render::write_dashboard(&out_dir, &panels)?;
    render::write_series_json(&series, &out_dir)?;

    info!(page = %page.display(), elapsed = ?start.elapsed(), "dashboard ready");
    Ok(())
}
