use std::{error::Error, process, sync::Arc};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use appframe::{
    cli::{Cli, Commands, parse_args},
    config::{AppConfig, load_config},
    expected::Expected,
    game::GameLayer,
    lifecycle::{Application, INIT_FAILURE_EXIT_CODE, execute},
    logging::start_logging_service,
    platform::HeadlessPlatform,
    registry::ServiceRegistry,
};

/// Exit code used when Ctrl-C ends a `--wait` run.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    match args.command {
        Commands::Run {
            config,
            exit_code,
            fail_window,
            wait,
            log_file,
            min_severity,
        } => {
            let mut config = match load_config(config.as_deref()) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Unable to load configuration: {err}");
                    process::exit(INIT_FAILURE_EXIT_CODE);
                }
            };
            if let Some(path) = log_file {
                config.logging.path = path;
            }
            if let Some(severity) = min_severity {
                config.logging.min_severity = severity;
            }

            let code = run_application(config, exit_code, fail_window, wait)?;
            process::exit(code);
        }
        Commands::Config { config, json } => {
            let config = load_config(config.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_application(
    config: AppConfig,
    exit_code: i32,
    fail_window: bool,
    wait: bool,
) -> Result<i32, Box<dyn Error>> {
    let registry = ServiceRegistry::global();

    let logger = match start_logging_service(&config.logging, registry) {
        Expected::Success(logger) => logger,
        Expected::Failure(err) => {
            eprintln!("Unable to start logging service: {}", err.report());
            return Ok(INIT_FAILURE_EXIT_CODE);
        }
    };
    let _ = registry.provide(Arc::new(config));

    let mut platform = HeadlessPlatform::new();
    if fail_window {
        platform = platform.refusing_windows();
    }

    let sender = platform.event_sender();
    if wait {
        info!("Waiting for Ctrl-C to quit");
        ctrlc::set_handler(move || {
            sender.quit(INTERRUPTED_EXIT_CODE);
        })?;
    } else {
        sender.quit(exit_code);
    }

    let mut app = match Application::from_registry(platform, GameLayer::new(), registry) {
        Expected::Success(app) => app,
        Expected::Failure(err) => {
            error!("Unable to build the application: {}", err.report());
            return Ok(INIT_FAILURE_EXIT_CODE);
        }
    };
    let code = execute(&mut app);
    drop(app);

    if let Expected::Failure(err) = logger.close() {
        error!("Failed to close the log: {}", err.report());
    }
    Ok(code)
}
