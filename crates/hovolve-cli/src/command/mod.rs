use clap::{Parser, Subcommand};

use self::{fly::FlyArg, replay::ReplayArg, train::TrainArg};

mod fly;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve pilots with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Fly a saved pilot on its own
    Fly(#[clap(flatten)] FlyArg),
    /// Replay the best pilots of a saved population without scoring them
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Fly(arg) => fly::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }
}
