use clap::{ArgAction, Parser};
use tracing::Level;

use self::augment::AugmentArg;

mod augment;

/// Derive statistical and angle-encoded features for flow-record CSV datasets
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    augment: AugmentArg,
    /// Increase log verbosity (`-v` debug, `-vv` trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl CommandArgs {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::util::init_logging(args.log_level())?;
    augment::run(&args.augment)?;
    Ok(())
}
