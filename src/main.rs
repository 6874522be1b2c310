use ringlist::{RingList, RingListError};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Walk a ring list through push, find, sort and remove
#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Values to push, in order
    #[arg(allow_negative_numbers = true, default_values_t = vec![10, 2, -5])]
    pub values: Vec<i64>,

    /// Skip the bubble sort step
    #[arg(long)]
    pub no_sort: bool,
}

impl Cli {
    pub fn parse() -> Self {
        clap::Parser::parse()
    }
}

fn run(cli: &Cli) -> Result<(), RingListError> {
    let mut list = RingList::new();

    for value in &cli.values {
        list.push(*value);
        println!("{list}");
    }

    let Some(last) = cli.values.last() else {
        return Ok(());
    };

    let found = list.find(last).ok_or(RingListError::NotFound)?;
    println!("{}", list.get(found).ok_or(RingListError::InvalidHandle)?);

    if !cli.no_sort {
        list.bubble_sort();
        println!("{list}");
    }

    let prev = list.find_prev(last).ok_or(RingListError::NotFound)?;
    println!("{}", list.get(prev).ok_or(RingListError::InvalidHandle)?);

    for value in cli.values.iter().rev() {
        list.remove(value);
        println!("{list}");
    }

    Ok(())
}

fn main() -> Result<(), RingListError> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(&cli)
}
