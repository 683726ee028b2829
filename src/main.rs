use clap::{CommandFactory, Parser};
use songplay_etl::cli::CliArgs;
use songplay_etl::core::processor;
use songplay_etl::error::{AppError, AppResult};
use songplay_etl::logging::{log, setup_logging, LogLevel};
use songplay_etl::testing;
use std::process::ExitCode;
use tokio::runtime::Builder;

fn main() -> ExitCode {
    let cli_args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => {
            // --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            setup_logging("info");
            log(LogLevel::Error, &format!("CLI Argument Error: {}", e));
            let _ = CliArgs::command().print_help();
            return ExitCode::from(2);
        }
    };

    setup_logging(if cli_args.is_verbose() { "debug" } else { "info" });

    let runtime = match Builder::new_multi_thread()
        .enable_all()
        .thread_name("etl-worker")
        .worker_threads(num_cpus::get())
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log(
                LogLevel::Error,
                &format!("FATAL: Failed to build Tokio runtime: {}", e),
            );
            return ExitCode::FAILURE;
        }
    };

    let main_result: AppResult<i32> = runtime.block_on(async {
        if let Some(inspect_path) = cli_args.get_inspect_file() {
            if !inspect_path.exists() {
                log(
                    LogLevel::Error,
                    &format!("Inspection input file not found: {}", inspect_path.display()),
                );
                return Err(AppError::Argument(
                    "Inspection input file not found.".to_string(),
                ));
            }

            match testing::inspect_file(
                &inspect_path,
                cli_args.get_inspect_kind(),
                cli_args.get_user_policy(),
                cli_args.get_inspect_output(),
            )
            .await
            {
                Ok(()) => Ok(0),
                Err(e) => {
                    log(LogLevel::Error, &format!("Inspection failed: {}", e));
                    Ok(1)
                }
            }
        } else {
            let config = match cli_args.to_config() {
                Ok(config) => config,
                Err(e) => {
                    log(LogLevel::Error, &e.to_string());
                    let _ = CliArgs::command().print_help();
                    return Err(e);
                }
            };

            processor::run(config).await
        }
    });

    match main_result {
        Ok(exit_code) => ExitCode::from(exit_code as u8),
        Err(AppError::Argument(_)) => ExitCode::from(2),
        Err(e) => {
            log(LogLevel::Error, &format!("FATAL UNEXPECTED ERROR: {:?}", e));
            ExitCode::FAILURE
        }
    }
}
