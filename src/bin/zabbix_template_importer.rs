use clap::Parser;
use std::process::ExitCode;
use zabbix_template_tools::cli::{self, import::ImportArgs, import::PROGRAM_NAME};
use zabbix_template_tools::logging::LogConfig;

fn main() -> ExitCode {
    let args = ImportArgs::parse();

    let log_config = LogConfig::detect(PROGRAM_NAME, args.debug);
    if let Err(e) = log_config.init() {
        eprintln!("{}: {}", PROGRAM_NAME, e);
        return ExitCode::from(e.exit_code());
    }

    match cli::import::execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
