use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{chart_style, prepare_tracking, run_tracking, AppContext};
use crate::visualize::{chart::ChartStyle, plot_per_category, plot_per_site};

const PROMPT: &str = "Enter command: ";
const UNKNOWN_COMMAND: &str = "Unknown command. Please try again.";
const EXITING: &str = "Exiting...";

/// Commands understood by the interactive shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Track,
    PlotBrowser,
    PlotCategory,
    Exit,
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(ShellCommand::Track),
            "plot_browser" => Ok(ShellCommand::PlotBrowser),
            "plot_category" => Ok(ShellCommand::PlotCategory),
            "exit" => Ok(ShellCommand::Exit),
            other => Err(anyhow!("Unknown command {other:?}")),
        }
    }
}

fn print_banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Time Tracker Started. Press Ctrl+C to stop.")?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  'track': Start tracking time.")?;
    writeln!(out, "  'plot_browser': Plot browser-based time spent.")?;
    writeln!(out, "  'plot_category': Plot category-based time spent.")?;
    writeln!(out, "  'exit': Exit the program.")
}

/// Reads stdin on a plain thread. A read pending on the runtime's blocking pool would keep the
/// process alive after the shell returned, until the next line arrives.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
        debug!("Stdin reader finished");
    });
    receiver
}

/// Reads commands from stdin until `exit`, end of input or Ctrl+C. Only failing to save tracked
/// records ends the shell with an error.
pub async fn run_shell(context: &AppContext) -> Result<()> {
    let mut lines = spawn_stdin_reader();
    shell_loop(context, &mut lines, &mut io::stdout(), chart_style()).await
}

async fn shell_loop(
    context: &AppContext,
    lines: &mut mpsc::Receiver<io::Result<String>>,
    out: &mut impl Write,
    style: ChartStyle,
) -> Result<()> {
    print_banner(out)?;

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.recv() => line.transpose()?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            writeln!(out)?;
            writeln!(out, "{EXITING}")?;
            return Ok(());
        };

        match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Track) => match prepare_tracking(context) {
                Ok(session) => {
                    run_tracking(context, session).await?;
                }
                Err(e) => {
                    error!("Failed to start tracking {e:?}");
                    writeln!(out, "Can't start tracking: {e}")?;
                }
            },
            Ok(ShellCommand::PlotBrowser) => {
                let result = plot_per_site(&context.store, out, style);
                report(out, result)?;
            }
            Ok(ShellCommand::PlotCategory) => {
                let result = plot_per_category(&context.store, out, style);
                report(out, result)?;
            }
            Ok(ShellCommand::Exit) => {
                writeln!(out, "{EXITING}")?;
                return Ok(());
            }
            Err(_) => writeln!(out, "{UNKNOWN_COMMAND}")?,
        }
    }
}

fn report(out: &mut impl Write, result: Result<()>) -> io::Result<()> {
    if let Err(e) = result {
        error!("Failed to plot {e:?}");
        writeln!(out, "Failed to plot: {e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{io, path::Path};

    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    use super::{shell_loop, ShellCommand, EXITING, PROMPT, UNKNOWN_COMMAND};
    use crate::{
        classify::BrowserDetection,
        cli::AppContext,
        relay::DEFAULT_RELAY_ADDR,
        storage::{
            entities::{ActivityRecord, Category},
            log_store::{CsvLogStore, DEFAULT_LOG_FILE_NAME},
        },
        tracker::TrackingOptions,
        visualize::{chart::ChartStyle, NO_LOGS},
    };

    const PLAIN: ChartStyle = ChartStyle { colored: false };

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn test_context(dir: &Path) -> AppContext {
        AppContext {
            store: CsvLogStore::new(dir.join(DEFAULT_LOG_FILE_NAME)),
            relay_addr: DEFAULT_RELAY_ADDR.parse().unwrap(),
            relay_url: "http://127.0.0.1:9".into(),
            relay_timeout: std::time::Duration::from_millis(100),
            detection: BrowserDetection::Markers,
            tracking: TrackingOptions::default(),
        }
    }

    /// Runs the shell over `input`. The input ends after the last line.
    async fn run_script(context: &AppContext, input: &[&str]) -> Result<String> {
        let (sender, mut lines) = mpsc::channel::<io::Result<String>>(input.len().max(1));
        for line in input {
            sender.send(Ok(line.to_string())).await.unwrap();
        }
        drop(sender);

        let mut out = Vec::new();
        shell_loop(context, &mut lines, &mut out, PLAIN).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn test_shell_reprompts_after_unknown_command() -> Result<()> {
        let dir = tempdir()?;
        let context = test_context(dir.path());

        let out = run_script(&context, &["bogus", "plot_category", "exit", "plot_browser"]).await?;

        assert!(out.starts_with("Time Tracker Started. Press Ctrl+C to stop."));
        assert_eq!(out.matches(UNKNOWN_COMMAND).count(), 1);
        assert_eq!(out.matches(NO_LOGS).count(), 1);
        assert_eq!(out.matches(PROMPT).count(), 3);
        assert!(out.trim_end().ends_with(EXITING));
        Ok(())
    }

    #[tokio::test]
    async fn test_shell_exits_at_end_of_input() -> Result<()> {
        let dir = tempdir()?;
        let context = test_context(dir.path());
        context.store.append(&[ActivityRecord::new(
            "Rust - Mozilla Firefox".into(),
            Category::Browser,
            "docs.rs".into(),
            TEST_START_DATE,
            TEST_START_DATE + Duration::seconds(42),
        )])?;

        let out = run_script(&context, &["  PLOT_BROWSER  "]).await?;

        assert!(out.contains("Time Spent on Each Website"));
        assert!(out.contains("docs.rs"));
        assert!(!out.contains(UNKNOWN_COMMAND));
        assert_eq!(out.matches(PROMPT).count(), 2);
        assert!(out.trim_end().ends_with(EXITING));
        Ok(())
    }

    #[tokio::test]
    async fn test_shell_stops_on_read_error() {
        let dir = tempdir().unwrap();
        let context = test_context(dir.path());
        let (sender, mut lines) = mpsc::channel(1);
        sender
            .send(Err(io::Error::new(io::ErrorKind::InvalidData, "not utf-8")))
            .await
            .unwrap();

        let mut out = Vec::new();
        assert!(shell_loop(&context, &mut lines, &mut out, PLAIN).await.is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("track".parse::<ShellCommand>().unwrap(), ShellCommand::Track);
        assert_eq!(
            "  PLOT_BROWSER\n".parse::<ShellCommand>().unwrap(),
            ShellCommand::PlotBrowser
        );
        assert_eq!(
            "plot_category".parse::<ShellCommand>().unwrap(),
            ShellCommand::PlotCategory
        );
        assert_eq!("Exit".parse::<ShellCommand>().unwrap(), ShellCommand::Exit);
    }

    #[test]
    fn test_unknown_commands() {
        assert!("".parse::<ShellCommand>().is_err());
        assert!("plot".parse::<ShellCommand>().is_err());
        assert!("track now".parse::<ShellCommand>().is_err());
    }
}
