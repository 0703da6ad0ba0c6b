use clap::Parser;

mod cli;
pub mod exit_codes;
mod logging;

use cli::args::Cli;
use cli::commands::dispatch;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                exit_codes::CONFIG_ERROR
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };
    logging::init(cli.verbosity());
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            cli::commands::exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
