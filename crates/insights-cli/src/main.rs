use clap::Parser as _;
use tracing_subscriber::filter::LevelFilter;

use self::command::CommandArgs;

mod command;
mod csv_io;
mod util;

fn main() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.log_level());
    command::run(args)
}

fn init_tracing(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
