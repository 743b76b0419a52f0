use clap::Parser;
use enemeter_cli::args::{Args, Command};
use enemeter_cli::{commands, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    logging::init(args.verbose);
    log::debug!("enemeter v{}", enemeter_cli::VERSION);

    let result = match &args.command {
        Command::Process(process) => commands::process(process),
        Command::Inspect(inspect) => commands::inspect(inspect),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
