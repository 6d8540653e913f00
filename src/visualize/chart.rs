use std::io::{self, Write};

use ansi_term::{Colour, Style};

use crate::utils::percentage::seconds_percentage;

/// Width of the longest bar, in characters.
const BAR_WIDTH: usize = 40;
const SHARE_WIDTH: usize = 50;

const SHARE_COLOURS: [Colour; 4] = [Colour::Cyan, Colour::Yellow, Colour::Green, Colour::Purple];
/// Used instead of colours when writing to something that isn't a terminal.
const SHARE_GLYPHS: [char; 4] = ['█', '▓', '▒', '░'];

#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub colored: bool,
}

impl ChartStyle {
    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|v| v.chars().count()).max().unwrap_or(0)
}

fn pad(label: &str, width: usize) -> String {
    let padding = width.saturating_sub(label.chars().count());
    format!("{label}{}", " ".repeat(padding))
}

/// Horizontal bar chart, one row per `(label, seconds)`, bars scaled to the largest value.
pub fn render_bar_chart(
    out: &mut impl Write,
    style: ChartStyle,
    title: &str,
    axis: (&str, &str),
    rows: &[(&str, f64)],
) -> io::Result<()> {
    let width = label_width(rows.iter().map(|v| v.0).chain([axis.0])).max(1);
    let max = rows.iter().map(|v| v.1).fold(0., f64::max);

    writeln!(out, "{}", style.paint(Style::new().bold(), title))?;
    writeln!(out, "{}  {}", pad(axis.0, width), axis.1)?;
    for (label, seconds) in rows {
        let length = if max > 0. {
            (seconds / max * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = "█".repeat(length);
        writeln!(
            out,
            "{}  {}{} {seconds:.1}",
            pad(label, width),
            style.paint(Colour::Cyan.normal(), &bar),
            " ".repeat(BAR_WIDTH - length),
        )?;
    }
    Ok(())
}

/// Splits `width` cells proportionally to `values`. The last segment absorbs rounding.
fn share_widths(values: &[f64], width: usize) -> Vec<usize> {
    let total: f64 = values.iter().sum();
    if total <= 0. {
        return vec![0; values.len()];
    }
    let mut widths = values
        .iter()
        .map(|v| (v / total * width as f64).round() as usize)
        .collect::<Vec<_>>();
    let used: usize = widths[..widths.len().saturating_sub(1)].iter().sum();
    if let Some(last) = widths.last_mut() {
        *last = width.saturating_sub(used);
    }
    widths
}

/// Terminal rendition of a pie chart: one stacked bar plus a legend with percentages.
pub fn render_share_chart(
    out: &mut impl Write,
    style: ChartStyle,
    title: &str,
    rows: &[(&str, f64)],
) -> io::Result<()> {
    let values = rows.iter().map(|v| v.1).collect::<Vec<_>>();
    let total: f64 = values.iter().sum();
    let widths = share_widths(&values, SHARE_WIDTH);

    writeln!(out, "{}", style.paint(Style::new().bold(), title))?;

    let mut bar = String::new();
    for (i, width) in widths.iter().enumerate() {
        let glyph = if style.colored {
            '█'
        } else {
            SHARE_GLYPHS[i % SHARE_GLYPHS.len()]
        };
        let segment = glyph.to_string().repeat(*width);
        bar += &style.paint(SHARE_COLOURS[i % SHARE_COLOURS.len()].normal(), &segment);
    }
    writeln!(out, "[{bar}]")?;

    let width = label_width(rows.iter().map(|v| v.0));
    for (i, (label, seconds)) in rows.iter().enumerate() {
        let marker = if style.colored {
            style.paint(SHARE_COLOURS[i % SHARE_COLOURS.len()].normal(), "■")
        } else {
            SHARE_GLYPHS[i % SHARE_GLYPHS.len()].to_string()
        };
        let share = seconds_percentage(*seconds, total)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".into());
        writeln!(out, "{marker} {}  {share:>6}  ({seconds:.1}s)", pad(label, width))?;
    }
    Ok(())
}
