mod args;
mod logging;

use args::{CliArgs, Command as CliCommand, NeatifyArgs};
use neatify_core::{
    BatchRunner, CommandTransformer, CoreError, ErrorRecord, TidyTransformer, Transformer,
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use console::style;
use std::io;
use std::process::ExitCode;

fn print_completions_cli(shell: clap_complete::Shell) {
    let mut cmd = CliArgs::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
}

fn build_transformer(args: &NeatifyArgs) -> Box<dyn Transformer> {
    match &args.formatter {
        Some(program) => Box::new(CommandTransformer::new(program).args(args.formatter_arg.iter())),
        None => Box::new(TidyTransformer),
    }
}

fn report_errors(errors: &[ErrorRecord]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("{}", style("\nErrors encountered:").red());
    for e in errors {
        eprintln!("  {}", error_line(e));
    }
}

// The message already names the file.
fn error_line(e: &ErrorRecord) -> String {
    style(&e.message).red().to_string()
}

/// Invocation mistakes exit with 2, like clap's own usage errors.
fn failure_code(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<CoreError>() {
        Some(ce) if ce.is_usage_error() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "file" } else { "files" }
}

fn run_check_mode(args: &NeatifyArgs, transformer: &dyn Transformer) -> Result<ExitCode> {
    if args.verbose > 0 && !args.list_different {
        println!("{}", style("Checking files for formatting...").blue());
    }
    let runner = BatchRunner::new(transformer, args.batch_options())?;
    let report = runner
        .run_check(args.files.as_slice())
        .context("Check failed")?;

    report_errors(&report.errors);

    if report.needs_formatting.is_empty() {
        if args.verbose > 0 && !args.list_different {
            println!("{}", style("All files are properly formatted!").green());
        }
    } else if args.list_different {
        for p in &report.needs_formatting {
            println!("{}", p.display());
        }
    } else {
        println!("{}", style("\nFiles that need formatting:").yellow());
        for p in &report.needs_formatting {
            println!("  {}", style(p.display()).yellow());
        }
        let n = report.needs_formatting.len();
        println!(
            "{}",
            style(format!("\nTotal: {} {} need formatting", n, plural(n))).yellow()
        );
    }

    if report.needs_formatting.is_empty() && report.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_write_mode(args: &NeatifyArgs, transformer: &dyn Transformer) -> Result<ExitCode> {
    if args.verbose > 0 {
        println!("{}", style("Formatting files...").blue());
    }
    let runner = BatchRunner::new(transformer, args.batch_options())?;
    let report = runner
        .run_write(args.files.as_slice())
        .context("Formatting failed")?;

    report_errors(&report.errors);

    if args.verbose > 0 || !report.errors.is_empty() {
        println!("{}", style("\nSummary:").blue());
        println!("  Files processed: {}", style(report.stats.total_files).cyan());
        println!("  Files formatted: {}", style(report.stats.formatted_files).green());
        if !report.errors.is_empty() {
            println!("  {}", style(format!("Errors: {}", report.errors.len())).red());
        }
    }

    if report.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> Result<ExitCode> {
    let cli: CliArgs = CliArgs::parse();

    if let Some(command_enum_val) = cli.command {
        match command_enum_val {
            CliCommand::Completion(args) => {
                print_completions_cli(args.shell);
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    let main_app_args = cli.main_opts;
    logging::init_logging(main_app_args.verbose);

    if main_app_args.check_formatter {
        let formatter = CommandTransformer::new(main_app_args.formatter.clone().unwrap_or_default());
        return match formatter.check_available() {
            Ok(()) => {
                println!("{} {}", style("✓").green(), formatter.program());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{}", style(format!("Formatter check failed: {}", e)).red());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let transformer = build_transformer(&main_app_args);
    let outcome = if main_app_args.check || main_app_args.list_different {
        run_check_mode(&main_app_args, transformer.as_ref())
    } else if main_app_args.write {
        run_write_mode(&main_app_args, transformer.as_ref())
    } else {
        eprintln!(
            "{}",
            style("Warning: No action specified. Use --check or --write.").yellow()
        );
        println!("Use --help for more information.");
        return Ok(ExitCode::FAILURE);
    };

    match outcome {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red(), e);
            Ok(failure_code(&e))
        }
    }
}
