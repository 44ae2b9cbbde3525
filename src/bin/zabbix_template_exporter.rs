use clap::Parser;
use std::process::ExitCode;
use zabbix_template_tools::cli::{self, export::ExportArgs, export::PROGRAM_NAME};
use zabbix_template_tools::logging::LogConfig;

fn main() -> ExitCode {
    let args = ExportArgs::parse();

    let log_config = LogConfig::detect(PROGRAM_NAME, args.debug);
    if let Err(e) = log_config.init() {
        eprintln!("{}: {}", PROGRAM_NAME, e);
        return ExitCode::from(e.exit_code());
    }

    match cli::export::execute(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
