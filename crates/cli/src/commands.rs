// crates/cli/src/commands.rs
use crate::args::{InspectArgs, ProcessArgs};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::presentation;
use chrono::Local;
use enemeter_engine::inspect::{inspect_rows, suggest_units};
use enemeter_engine::source;
use std::io::Write;
use std::path::Path;

/// Files above this size get a hint to use `--stream`.
const LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Run the `process` subcommand.
///
/// # Errors
/// Any argument, engine, rendering or output error.
pub fn process(args: &ProcessArgs) -> Result<()> {
    if !args.input.is_file() {
        return Err(AppError::InputNotFound(args.input.clone()));
    }
    let config = Config::try_from(args)?;

    let size = source::file_size(&args.input)?;
    if size > LARGE_FILE_BYTES && !config.streaming {
        log::warn!(
            "processing a large file ({:.2} MiB); consider --stream for lower memory use",
            size as f64 / (1024.0 * 1024.0)
        );
    }
    match source::estimate_record_count(&args.input) {
        Ok(estimate) => log::info!("estimated records in file: {estimate}"),
        Err(e) => log::warn!("could not estimate record count: {e}"),
    }

    let metrics = enemeter_engine::run(&config)?;
    log::info!("aggregated {} records", metrics.data_points);

    let format = args.output.format;
    let rendered = match config.metrics.requested_metrics.first() {
        Some(name) => presentation::render_metric(&metrics, name, format)?,
        None => presentation::render_report(
            &metrics,
            &args.input,
            format,
            Local::now().naive_local(),
        )?,
    };

    write_output(&rendered, args.output.output.as_deref())
}

/// Run the `inspect` subcommand.
///
/// # Errors
/// The file cannot be opened or read.
pub fn inspect(args: &InspectArgs) -> Result<()> {
    let rows = source::open_rows(&args.input)?;
    let report = inspect_rows(rows, args.samples)?;
    let units = suggest_units(&report.ranges);
    let rendered = presentation::render_inspection(&args.input, args.samples, &report, &units)?;
    write_output(&rendered, None)
}

fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, rendered)?;
            eprintln!("Results saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                writeln!(stdout)?;
            }
            stdout.flush()?;
        }
    }
    Ok(())
}
