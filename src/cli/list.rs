use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scheduler::{Kind, KeyedStore, Session, Table};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{self, Tone};

const GUTTER: &str = "    ";

/// Command arguments for `sched list`.
#[derive(Debug, Parser, Default)]
#[command(about = "Show cargo and freight entries")]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Collections<'a> {
    cargo: &'a [scheduler::CargoRecord],
    freight: &'a [scheduler::FreightRecord],
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let session = Session::open(root).context("failed to open the cargo and freight files")?;

        match self.output {
            OutputFormat::Json => {
                let collections = Collections {
                    cargo: session.cargo().all_items(),
                    freight: session.freight().all_items(),
                };
                serde_json::to_writer_pretty(std::io::stdout(), &collections)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Table => {
                let cargo = table_lines(session.cargo());
                let freight = table_lines(session.freight());
                for line in layout(&cargo, &freight) {
                    println!("{line}");
                }
            }
        }

        Ok(())
    }
}

/// Renders one collection as a titled, aligned table.
fn table_lines<K: Kind>(store: &KeyedStore<K>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", K::NAME, store.len())];
    if store.is_empty() {
        lines.push(terminal::NONE.to_string());
        return lines;
    }

    let mut table = Table::new(["ID", "Location", "Time"]);
    table.extend(store.iter().map(|record| {
        [
            record.id().to_string(),
            record.location().to_string(),
            record.departure_time().to_string(),
        ]
    }));
    lines.extend(table.lines());
    lines
}

/// Places the two tables side by side when the terminal is wide enough,
/// one above the other otherwise.
fn layout(left: &[String], right: &[String]) -> Vec<String> {
    let left_width = left.iter().map(String::len).max().unwrap_or(0);
    let right_width = right.iter().map(String::len).max().unwrap_or(0);

    if !terminal::fits(left_width + GUTTER.len() + right_width) {
        let mut lines: Vec<String> = left.iter().map(|line| style(line, left)).collect();
        lines.push(String::new());
        lines.extend(right.iter().map(|line| style(line, right)));
        return lines;
    }

    (0..left.len().max(right.len()))
        .map(|idx| {
            let l = left.get(idx).map_or("", String::as_str);
            let r = right.get(idx).map_or("", String::as_str);
            // Pad before styling so escape codes don't disturb alignment.
            let padded = format!("{l:<left_width$}");
            format!(
                "{}{GUTTER}{}",
                style(&padded, left),
                style(r, right)
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

fn style(line: &str, table: &[String]) -> String {
    let title = table.first().map_or("", String::as_str);
    Tone::of_table_line(line, title).map_or_else(|| line.to_string(), |tone| tone.paint(line))
}
