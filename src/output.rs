use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ExtractionAction, ProgressEvent, ProgressSink, RunResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Forwards progress to the tracing subscriber, which `--quiet` mutes.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!("{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => tracing::info!("{}", event.message),
        }
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_run(result: &RunResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::write_run(&mut stdout, result)
    }

    pub fn write_run<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
        let count = |action: ExtractionAction| {
            result
                .items
                .iter()
                .filter(|item| item.action == action)
                .count()
        };
        writeln!(
            out,
            "c20c-grab: {} extracted, {} skipped, {} planned (verified: {})",
            count(ExtractionAction::Extracted),
            count(ExtractionAction::Skipped),
            count(ExtractionAction::Planned),
            if result.verified { "yes" } else { "no" }
        )?;
        for item in &result.items {
            writeln!(
                out,
                "  {:<9} {:<8} {} -> {}",
                item.action.as_str(),
                item.variable,
                item.archive_path,
                item.target_directory
            )?;
        }
        Ok(())
    }
}
