//! Read-only views over the activity log.

pub mod analysis;
pub mod chart;

use std::io::Write;

use analysis::{time_per_category, time_per_site};
use anyhow::Result;
use chart::{render_bar_chart, render_share_chart, ChartStyle};
use tracing::instrument;

use crate::storage::log_store::CsvLogStore;

pub const NO_LOGS: &str = "No logs found to generate graph.";
pub const NO_BROWSER_ACTIVITY: &str = "No browser activity to plot.";
pub const NO_ACTIVITY: &str = "No activity to plot.";

/// Bar chart of browser time per domain.
#[instrument(skip(store, out))]
pub fn plot_per_site(store: &CsvLogStore, out: &mut impl Write, style: ChartStyle) -> Result<()> {
    let Some(records) = store.load()? else {
        writeln!(out, "{NO_LOGS}")?;
        return Ok(());
    };
    let usage = time_per_site(&records);
    if usage.is_empty() {
        writeln!(out, "{NO_BROWSER_ACTIVITY}")?;
        return Ok(());
    }

    let rows = usage
        .iter()
        .map(|v| (&*v.domain, v.seconds))
        .collect::<Vec<_>>();
    render_bar_chart(
        out,
        style,
        "Time Spent on Each Website",
        ("Website (Domain)", "Time (seconds)"),
        &rows,
    )?;
    Ok(())
}

/// Share of time per category.
#[instrument(skip(store, out))]
pub fn plot_per_category(
    store: &CsvLogStore,
    out: &mut impl Write,
    style: ChartStyle,
) -> Result<()> {
    let Some(records) = store.load()? else {
        writeln!(out, "{NO_LOGS}")?;
        return Ok(());
    };
    let usage = time_per_category(&records);
    if usage.iter().map(|v| v.seconds).sum::<f64>() <= 0. {
        writeln!(out, "{NO_ACTIVITY}")?;
        return Ok(());
    }

    let labels = usage
        .iter()
        .map(|v| v.category.to_string())
        .collect::<Vec<_>>();
    let rows = labels
        .iter()
        .zip(&usage)
        .map(|(label, v)| (label.as_str(), v.seconds))
        .collect::<Vec<_>>();
    render_share_chart(out, style, "Time Spent by Category", &rows)?;
    Ok(())
}
