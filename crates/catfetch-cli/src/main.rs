use catfetch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Stderr until the config names the job's log directory.
    logging::init_logging_stderr();

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("catfetch error: {:#}", err);
        std::process::exit(1);
    }
}
