use std::io;
use std::process::ExitCode;
use task_cli::TaskRepository;
use task_cli::cli::{self, Request};
use task_cli::config::Config;
use task_cli::logging;

fn main() -> ExitCode {
    let request = match Request::try_parse_from(std::env::args_os()) {
        Ok(request) => request,
        Err(err) => {
            let _ = err.print();
            // Help and version are requested output, everything else is a usage error.
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&request) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(request: &Request) -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(file) = &request.cli.file {
        config.file = file.clone();
    }
    let level = logging::raise_level(config.level()?, request.cli.verbose);
    let _log4rs_handle = logging::init(level)?;
    log::debug!("Using tasks file {}", config.file.display());

    let repo = TaskRepository::new(config.file);
    cli::execute(request, &repo, &mut io::stdout().lock(), &mut io::stderr().lock())
}
