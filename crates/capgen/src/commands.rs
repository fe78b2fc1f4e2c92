mod check;
mod generate;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum CapgenCommand {
    /// Generate interceptors, stand-ins and the support module
    Generate(self::generate::Generate),
    /// Report problems without writing anything
    Check(self::check::Check),
}

impl Command for CapgenCommand {
    fn execute(&self, args: &Args) -> Result<Exit> {
        match self {
            CapgenCommand::Generate(cmd) => cmd.execute(args),
            CapgenCommand::Check(cmd) => cmd.execute(args),
        }
    }
}
