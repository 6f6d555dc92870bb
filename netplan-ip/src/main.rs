use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use netplan_core::{current_stamp, format_interface_table, render};
use netplan_ip::collect::{self, Mode, RunOptions};
use netplan_ip::pipeline::{self, NetplanError};
use netplan_ip::prompt::Prompter;
use netplan_ip::report::{note, render_apply_hint, render_progress};
use netplan_ip::settings::Settings;
use netplan_ip::system::{self, CommandApplier, CommandLister, InterfaceLister};

mod cli;

use cli::{Cli, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = resolve_settings(&cli)?;
    let lister = CommandLister::new(settings.list_command.clone());

    if cli.list {
        list_interfaces(&lister, cli.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    pipeline::check_root(settings.require_root, cli.dry_run, system::is_root)?;

    let opts = RunOptions {
        output_path: settings.output_path(),
        backup_enabled: !cli.no_backup,
        apply_enabled: cli.apply,
    };
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());

    let mode = Mode::select(cli.flag_values());
    let interactive = mode.is_interactive();
    let mut params = match mode {
        Mode::NonInteractive(flags) => {
            collect::from_flags(flags, &opts).map_err(NetplanError::from)?
        }
        Mode::Interactive { dhcp_interface } => {
            let interfaces = lister.list_interfaces();
            collect::interactive(&mut prompter, &interfaces, dhcp_interface, &opts)
                .map_err(NetplanError::from)?
        }
    };

    let document = render(&params, &settings.renderer).map_err(NetplanError::from)?;
    println!("\nGenerated netplan config:\n");
    print!("{document}");
    println!();

    if cli.dry_run {
        println!("{}", note("Dry run, nothing written"));
        return Ok(ExitCode::SUCCESS);
    }

    if interactive
        && !params.apply_enabled()
        && prompter
            .confirm("Apply this configuration after writing it?")
            .map_err(NetplanError::from)?
    {
        params = params.with_apply();
    }

    let applier = CommandApplier::new(settings.apply_command.clone());
    let outcome = pipeline::execute(
        &params,
        &document,
        &settings,
        &applier,
        &current_stamp(),
        &mut |event| println!("{}", render_progress(&event)),
    )?;

    if outcome.apply_code.is_none() {
        println!("{}", render_apply_hint(&settings.apply_command));
    }

    Ok(exit_code(outcome.exit_code()))
}

fn resolve_settings(cli: &Cli) -> Result<Settings, NetplanError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::builtin(),
    };
    if let Some(dir) = &cli.netplan_dir {
        settings.netplan_dir = dir.clone();
    }
    if let Some(output) = &cli.output {
        settings.output_file = output.clone();
    }
    tracing::debug!(
        "netplan dir {}, output {}",
        settings.netplan_dir.display(),
        settings.output_path().display()
    );
    Ok(settings)
}

fn list_interfaces(lister: &dyn InterfaceLister, format: OutputFormat) -> Result<()> {
    let interfaces = lister.list_interfaces();
    match format {
        OutputFormat::Text if interfaces.is_empty() => {
            println!("{}", note("No interfaces detected"));
        }
        OutputFormat::Text => println!("{}", format_interface_table(&interfaces)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&interfaces)?),
    }
    Ok(())
}

fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
