//! Operator commands typed while an ops view is being watched.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use gsb_client::poller::OpsCommand;
use gsb_core::ops::{Filters, Transition};

pub const HELP: &str = "Commands: n (next page), p (previous page), \
f [window=<hours>] [status=<status>] [connector=<id>] (apply filters), \
reset, <enter> (refresh now), q (quit)";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(OpsCommand),
    Help,
}

/// Parse one line. Filter keys not given are submitted empty, like a
/// cleared form field.
pub fn parse_line(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Input::Command(OpsCommand::Refresh));
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => OpsCommand::Transition(Transition::Next),
        "p" | "prev" => OpsCommand::Transition(Transition::Prev),
        "reset" => OpsCommand::Transition(Transition::Reset),
        "r" | "refresh" => OpsCommand::Refresh,
        "q" | "quit" | "exit" => OpsCommand::Quit,
        "h" | "help" | "?" => return Ok(Input::Help),
        "f" | "filter" => OpsCommand::Transition(Transition::ApplyFilters(parse_filters(words)?)),
        other => return Err(format!("Unknown command '{other}'")),
    };
    Ok(Input::Command(command))
}

fn parse_filters<'a>(words: impl Iterator<Item = &'a str>) -> Result<Filters, String> {
    let mut filters = Filters::default();
    for word in words {
        let (key, value) = word
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{word}'"))?;
        match key {
            "window" | "window_hours" => {
                let hours = value
                    .parse::<u32>()
                    .ok()
                    .filter(|h| *h >= 1)
                    .ok_or_else(|| format!("window must be a whole number of hours >= 1, got '{value}'"))?;
                filters.window_hours = Some(hours);
            }
            "status" => filters.status = value.to_string(),
            "connector" | "connector_id" => filters.connector_id = value.to_string(),
            other => return Err(format!("Unknown filter '{other}'")),
        }
    }
    Ok(filters)
}

/// Forward parsed lines to the ops loop until `q` or a closed loop.
///
/// At end of input the reader idles until `cancel` fires, so piping a
/// closed stdin does not stop a watch.
pub async fn read_commands<R>(reader: R, commands: mpsc::Sender<OpsCommand>, cancel: CancellationToken)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            biased;
            line = lines.next_line() => line,
            _ = cancel.cancelled() => return,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read operator input");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Input::Command(command)) => {
                let quit = command == OpsCommand::Quit;
                if commands.send(command).await.is_err() || quit {
                    return;
                }
            }
            Ok(Input::Help) => eprintln!("{HELP}"),
            Err(message) => eprintln!("{message}\n{HELP}"),
        }
    }
    cancel.cancelled().await;
}
