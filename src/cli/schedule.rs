use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use scheduler::Session;
use tracing::instrument;

use super::terminal::Tone;

#[derive(Debug, clap::Subcommand)]
pub enum Schedule {
    /// Match cargo with freight and show the result
    Generate(Generate),

    /// Show the schedule saved in schedule.txt
    Show,
}

impl Schedule {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Generate(command) => command.run(root),
            Self::Show => show(root),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Generate {
    /// Save the generated schedule to schedule.txt
    #[arg(long, short)]
    save: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Generate {
    #[instrument(level = "debug")]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut session =
            Session::open(root).context("failed to open the cargo and freight files")?;
        let result = session.generate_schedule();
        let unmatched = result.unmatched_cargo().len() + result.unmatched_freight().len();

        match self.output {
            OutputFormat::Json => {
                let schedule = session.schedule()?;
                serde_json::to_writer_pretty(io::stdout(), &schedule)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Table => {
                session.display_schedule(&mut io::stdout().lock())?;
                if unmatched > 0 {
                    eprintln!(
                        "\n{}",
                        Tone::Attention.paint_err(&format!("⚠️  {unmatched} entries have no match"))
                    );
                }
            }
        }

        if self.save {
            session
                .save_schedule()
                .context("failed to save schedule")?;
            eprintln!(
                "{}",
                Tone::Done.paint_err(&format!(
                    "✅ Schedule saved to {}",
                    session.root().join(scheduler::session::SCHEDULE_FILE).display()
                ))
            );
        }

        Ok(())
    }
}

#[instrument(level = "debug")]
fn show(root: PathBuf) -> anyhow::Result<()> {
    let session = Session::open(root).context("failed to open the cargo and freight files")?;
    session.display_saved_schedule(&mut io::stdout().lock())?;
    Ok(())
}
