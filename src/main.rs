use datatable::cli::Cli;
use datatable::config::Config;
use datatable::logging::setup_logging;
use directories::ProjectDirs;
use log::{debug, error};

fn main() {
    let Some(project_dirs) = ProjectDirs::from("", "", "datatable") else {
        eprintln!("Could not determine the application data directory");
        std::process::exit(1);
    };

    let config = Config::init(&project_dirs);
    let log_dir = project_dirs.data_local_dir().join("logs");

    // Dropping the handle shuts the logger down, so it lives until main returns
    let logger = match setup_logging(&config.logging, &log_dir) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logging: {}", err);
            None
        }
    };

    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        if let Some(logger) = &logger {
            logger.flush();
        }
        std::process::exit(1);
    }
}
