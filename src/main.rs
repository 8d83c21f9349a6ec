use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::runtime::Builder;

use atsctools::Config;

mod cmd;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extracts ATSC channels and program guide from a transport stream")]
struct Opt {
    /// Print debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Accept sections whose CRC_32 does not match
    #[arg(long)]
    no_crc: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print virtual channels as JSON lines
    Channels {
        /// Input file, stdin when omitted or "-"
        input: Option<PathBuf>,
    },
    /// Print guide events as JSON lines
    Events {
        /// Input file, stdin when omitted or "-"
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    cmd::init_logger(opt.verbose);

    let config = Config {
        verify_crc: !opt.no_crc,
    };
    let rt = Builder::new_current_thread().enable_all().build()?;
    match opt.command {
        Command::Channels { input } => rt.block_on(cmd::channels::run(input, config)),
        Command::Events { input } => rt.block_on(cmd::events::run(input, config)),
    }
}
