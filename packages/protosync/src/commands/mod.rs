use std::process::ExitCode;

use clap::Parser;

mod sync;

pub use sync::SyncCommand;

/// Parses the process arguments and runs the sync. Every failure, usage
/// errors included, exits with code 1.
pub async fn run_default() -> ExitCode {
    let command = match SyncCommand::try_parse() {
        Ok(command) => command,

        Err(err) => {
            let _ = err.print();

            return match err.use_stderr() {
                true => ExitCode::FAILURE,
                false => ExitCode::SUCCESS,
            };
        },
    };

    let report
        = command.report();

    match command.execute(report.clone()).await {
        Ok(()) => ExitCode::SUCCESS,

        Err(err) => {
            report.error(err);
            ExitCode::FAILURE
        },
    }
}
