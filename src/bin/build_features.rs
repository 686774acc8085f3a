use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::info;
use tracing_subscriber::EnvFilter;

use match_features::dataset;
use match_features::{FeatureConfig, FeatureInput, build_feature_table};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let input = arg_value(&args, "--input")
        .map(PathBuf::from)
        .context("missing --input <csv>")?;
    let output = arg_value(&args, "--output")
        .map(PathBuf::from)
        .context("missing --output <csv>")?;
    let xlsx = arg_value(&args, "--xlsx").map(PathBuf::from);

    let cfg = match arg_value(&args, "--config") {
        Some(path) => FeatureConfig::load_json(&PathBuf::from(path))?.with_env_overrides(),
        None => FeatureConfig::from_env(),
    };

    let mut records = dataset::load_matches(&input)?;
    // Stable, so same-day rows keep their file order.
    records.sort_by_key(|m| m.date);

    let earliest = dataset::earliest_year(&records)
        .ok_or_else(|| anyhow!("no matches in {}", input.display()))?;
    let first_year = match arg_value(&args, "--first-year") {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .with_context(|| format!("invalid --first-year {raw}"))?,
        None => earliest + 1,
    };
    let last_year = dataset::latest_year(&records).unwrap_or(first_year);
    if last_year < first_year {
        return Err(anyhow!(
            "no matches on or after {first_year} (latest year is {last_year})"
        ));
    }

    let (year_zero, matches) = dataset::split_year_zero(records, first_year);
    let years = dataset::years_between(first_year - 1, last_year);
    info!(
        warmup_rows = year_zero.len(),
        rows = matches.len(),
        first_year,
        last_year,
        "dataset split"
    );

    let table = build_feature_table(
        FeatureInput {
            matches: &matches,
            year_zero: &year_zero,
            years: &years,
        },
        &cfg,
    )?;

    let rows = dataset::table_rows(&table);
    dataset::write_csv(&output, &rows)?;
    if let Some(path) = &xlsx {
        dataset::write_xlsx(path, &rows)?;
    }

    println!("Feature table complete");
    println!("Rows: {}", table.rows.len());
    println!("Warm-up rows: {}", year_zero.len());
    println!("Years: {}..={}", first_year, last_year);
    println!("K-factor: {}", table.k_factor);
    println!(
        "Odds filled: {} (unresolved {})",
        table.odds_filled, table.odds_unresolved
    );
    println!("CSV: {}", output.display());
    if let Some(path) = xlsx {
        println!("XLSX: {}", path.display());
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Value of `--flag value` or `--flag=value`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
