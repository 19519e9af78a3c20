use clap::Parser;
use tracing_subscriber::EnvFilter;

use sw_cli::cli::{self, exit, Cli, Command, ConfigCommand, Context, PluginCommand};

fn main() {
    let args = Cli::parse();
    init_cli_tracing(args.verbose);

    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("[stepwise] error: {e:#}");
            exit::exit_code(&e)
        }
    };
    std::process::exit(code);
}

fn run(args: Cli) -> anyhow::Result<i32> {
    // Only commands that touch a workspace resolve it.
    let open = || Context::open(args.workspace.as_deref(), args.auto_commit);

    let output = match args.command {
        Command::Init { process, target } => {
            format!("[stepwise] {}", cli::process::init(&process, &target)?)
        }
        Command::Validate {
            process_path,
            recursive,
        } => {
            return Ok(match cli::process::validate(&process_path, recursive) {
                Ok(msg) => {
                    println!("[stepwise] {msg}");
                    exit::SUCCESS
                }
                Err(msg) => {
                    eprintln!("[stepwise] {msg}");
                    exit::FAILURE
                }
            });
        }
        Command::Start {
            process,
            required,
            process_file,
        } => cli::session::start(&open()?, process.as_deref(), required, process_file.as_deref())?,
        Command::Resume { session_id } => cli::session::resume(&open()?, &session_id)?,
        Command::Reset {
            session_id,
            step_id,
        } => cli::session::reset(&open()?, &session_id, &step_id)?,
        Command::Decide {
            session_id,
            decision,
        } => cli::session::decide(&open()?, &session_id, &decision)?,
        Command::Step {
            session_id,
            step_id,
        } => cli::session::step(&open()?, &session_id, &step_id)?,
        Command::Checkpoint { session_id } => cli::session::checkpoint(&open()?, &session_id)?,
        Command::Status { session_id } => cli::session::status(&open()?, &session_id)?,
        Command::Pause { session_id } => {
            format!("[stepwise] {}", cli::session::pause(&open()?, &session_id)?)
        }
        Command::Complete { session_id } => {
            format!("[stepwise] {}", cli::session::complete(&open()?, &session_id)?)
        }
        Command::Plugin(cmd) => {
            let ctx = open()?;
            match cmd {
                PluginCommand::Add { bundle_path } => {
                    format!("[stepwise] {}", cli::plugin::add(&ctx, &bundle_path)?)
                }
                PluginCommand::List => cli::plugin::list(&ctx)?,
                PluginCommand::Remove { plugin_id } => {
                    format!("[stepwise] {}", cli::plugin::remove(&ctx, &plugin_id)?)
                }
                PluginCommand::Send {
                    plugin_id,
                    payload_json,
                } => cli::plugin::send(&ctx, &plugin_id, &payload_json)?,
                PluginCommand::Export {
                    plugin_id,
                    input_path,
                    output,
                } => cli::plugin::export(&ctx, &plugin_id, &input_path, output.as_deref())?,
                PluginCommand::Hook {
                    plugin_id,
                    context_json,
                } => cli::plugin::hook(&ctx, &plugin_id, &context_json)?,
                PluginCommand::Generate {
                    plugin_id,
                    payload_json,
                } => cli::plugin::generate(&ctx, &plugin_id, &payload_json)?,
            }
        }
        Command::Config(ConfigCommand::Show) => cli::config::show(&open()?.config)?,
        Command::Config(ConfigCommand::Validate) => {
            let ctx = open()?;
            let valid = cli::config::validate(&ctx.config, &ctx.config_path);
            return Ok(if valid { exit::SUCCESS } else { exit::FAILURE });
        }
    };

    println!("{}", output.trim_end());
    Ok(exit::SUCCESS)
}

/// Human-readable logs on stderr; stdout carries command output only.
fn init_cli_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STEPWISE_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
