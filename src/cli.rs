use std::{
    io::{self, BufRead},
    path::PathBuf,
};

mod list;
mod schedule;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use list::List;
use schedule::Schedule;
use scheduler::{DepartureTime, Kind, KeyedStore, Location, Record, RecordId, Session};
use terminal::Tone;
use tracing::instrument;

/// Parse a location, normalizing to title case.
///
/// This is a CLI boundary function: input is validated here so that only
/// well-formed locations reach the stores.
fn parse_location(s: &str) -> Result<Location, String> {
    Location::parse(s).map_err(|e| format!("{e}"))
}

/// Parse a departure time given as exactly four digits, e.g. `0900`.
fn parse_time(s: &str) -> Result<DepartureTime, String> {
    DepartureTime::parse_hhmm(s.trim()).map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding Cargo.txt, Freight.txt and schedule.txt
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show cargo and freight (default)
    List(List),

    /// Add a cargo or freight entry with a generated ID
    Add(Add),

    /// Change the location and time of an entry
    Edit(Edit),

    /// Delete an entry
    Delete(Delete),

    /// Generate, view and save the schedule
    ///
    /// The schedule pairs each cargo entry with the first free freight entry
    /// departing from the same location at the same time.
    #[command(subcommand)]
    Schedule(Schedule),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Schedule(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Which collection a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    /// Transport requests
    Cargo,
    /// Transport offers
    Freight,
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The collection to add to
    collection: Collection,

    /// Departure location (letters and spaces only)
    #[arg(long, short, value_parser = parse_location)]
    location: Location,

    /// Departure time in 24-hour HHMM form, e.g. 0900
    #[arg(long, short, value_parser = parse_time)]
    time: DepartureTime,

    /// Save without asking for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl Add {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut session = open(root)?;
        let id = match self.collection {
            Collection::Cargo => add_record(session.cargo_mut(), self.location, self.time),
            Collection::Freight => add_record(session.freight_mut(), self.location, self.time),
        };

        if save_changes(&session, self.yes, io::stdin().lock())? {
            println!("{}", Tone::Done.paint(&format!("✅ Added {id}")));
        }
        Ok(())
    }
}

fn add_record<K: Kind>(
    store: &mut KeyedStore<K>,
    location: Location,
    time: DepartureTime,
) -> RecordId {
    let id = store.next_id();
    if store.exists(id.as_str()) {
        // Count-based IDs can repeat after a deletion.
        tracing::warn!("Generated {} ID {id} is already in use", K::NAME);
    }
    store.add(Record::new(id.clone(), location, time));
    id
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The collection holding the entry
    collection: Collection,

    /// The ID of the entry to edit (case-insensitive)
    id: String,

    /// New departure location (letters and spaces only)
    #[arg(long, short, value_parser = parse_location)]
    location: Location,

    /// New departure time in 24-hour HHMM form, e.g. 0900
    #[arg(long, short, value_parser = parse_time)]
    time: DepartureTime,

    /// Save without asking for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl Edit {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut session = open(root)?;
        let updated = match self.collection {
            Collection::Cargo => session.cargo_mut().edit(&self.id, self.location, self.time),
            Collection::Freight => session
                .freight_mut()
                .edit(&self.id, self.location, self.time),
        };

        if !updated {
            anyhow::bail!("{:?} {} not found", self.collection, self.id);
        }

        if save_changes(&session, self.yes, io::stdin().lock())? {
            println!(
                "{}",
                Tone::Done.paint(&format!("✅ {:?} {} updated", self.collection, self.id))
            );
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The collection holding the entry
    collection: Collection,

    /// The ID of the entry to delete (case-insensitive)
    id: String,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut session = open(root)?;
        let exists = match self.collection {
            Collection::Cargo => session.cargo().exists(&self.id),
            Collection::Freight => session.freight().exists(&self.id),
        };
        if !exists {
            anyhow::bail!("{:?} {} not found", self.collection, self.id);
        }

        // Confirming the deletion also confirms saving it.
        let question = format!("Delete {:?} {} and save?", self.collection, self.id);
        if !self.yes && !confirm(&question, io::stdin().lock())? {
            println!("{}", Tone::Muted.paint("Deletion cancelled"));
            return Ok(());
        }

        let deleted = match self.collection {
            Collection::Cargo => session.cargo_mut().delete(&self.id),
            Collection::Freight => session.freight_mut().delete(&self.id),
        };
        if !deleted {
            anyhow::bail!("Delete failed");
        }
        session.flush().context("failed to save changes")?;

        println!(
            "{}",
            Tone::Done.paint(&format!("✅ Deleted {:?} {}", self.collection, self.id))
        );
        Ok(())
    }
}

fn open(root: PathBuf) -> anyhow::Result<Session> {
    Session::open(root).context("failed to open the cargo and freight files")
}

/// Saves both collections once the user agrees, or straight away with `yes`.
///
/// Returns whether the files were written.
fn save_changes<R: BufRead>(session: &Session, yes: bool, input: R) -> anyhow::Result<bool> {
    if !yes && !confirm("Save changes?", input)? {
        println!("{}", Tone::Muted.paint("Changes discarded"));
        return Ok(false);
    }
    session.flush().context("failed to save changes")?;
    Ok(true)
}

/// Asks a yes/no question on stderr, repeating until the answer is `y` or `n`.
///
/// End of input counts as `n`.
fn confirm<R: BufRead>(question: &str, mut input: R) -> anyhow::Result<bool> {
    loop {
        eprint!("{question} (y/n) ");
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            _ => {}
        }
    }
}
