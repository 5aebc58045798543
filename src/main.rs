use RedoxBalancer::cli::cli_args;
use RedoxBalancer::cli::cli_main::{run_batch, run_interactive_menu};
use RedoxBalancer::settings::{ConfigManager, install_config_manager, with_config};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::process::ExitCode;

pub fn main() -> ExitCode {
    let cli = cli_args::parse();
    if let Some(path) = &cli.config {
        install_config_manager(ConfigManager::with_config_file(&path.to_string_lossy()));
    }

    let level = match &cli.log_level {
        Some(level) => match level.parse::<LevelFilter>() {
            Ok(level) => level,
            Err(_) => {
                eprintln!("unknown log level: {}", level);
                return ExitCode::FAILURE;
            }
        },
        None => with_config(|manager| manager.get_config().level_filter()),
    };
    // ignored if a logger is already set
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);

    if cli.equations.is_empty() || cli.interactive {
        if !cli.equations.is_empty() && !run_batch(&cli) {
            return ExitCode::FAILURE;
        }
        run_interactive_menu();
        return ExitCode::SUCCESS;
    }
    if run_batch(&cli) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
