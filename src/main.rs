use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use clipwise::capture::HotkeyCombination;
use clipwise::cli;
use clipwise::config::{AppConfig, LogLevel};
use clipwise::dispatch::Submission;
use clipwise::request::{parse_param, CONTENT_PARAM};

#[derive(Parser)]
#[command(
    name = "clipwise",
    version,
    about = "Send the clipboard to a text-generation backend with a global hotkey"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the hotkey helper until Ctrl+C
    Run {
        /// Backend endpoint, e.g. tcp://localhost:5555
        #[arg(long)]
        address: Option<String>,
        /// Hotkey combination, e.g. Cmd+L or Ctrl+Shift+L
        #[arg(long, value_parser = HotkeyCombination::from_str)]
        hotkey: Option<HotkeyCombination>,
        /// Template used for captures
        #[arg(long)]
        template: Option<String>,
    },
    /// Submit one request and print the reply
    Send {
        /// Template name, e.g. reply or rewrite
        template: String,
        /// Template parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Text to send as the content parameter (default: clipboard text)
        #[arg(long)]
        content: Option<String>,
        /// Backend endpoint, e.g. tcp://localhost:5555
        #[arg(long)]
        address: Option<String>,
        /// Do not touch the system clipboard
        #[arg(long)]
        no_clipboard: bool,
        /// Give up after this many seconds (default: wait for the backend forever)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Run a development backend that renders prompt templates
    Backend {
        /// Endpoint to bind
        #[arg(long, default_value = "tcp://127.0.0.1:5555")]
        bind: String,
        /// Directory of <template>.txt prompt files
        #[arg(long)]
        prompts: Option<PathBuf>,
    },
    /// Write the default config file
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("clipwise: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("clipwise-rt")
        .build()
        .context("failed to start async runtime")?;

    if let Commands::Init = cli.command {
        cli::init_logging(LogLevel::default());
        runtime.block_on(cli::init::run_init())?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    cli::init_logging(config.log_level);

    match cli.command {
        Commands::Run {
            address,
            hotkey,
            template,
        } => {
            let config = config.with_overrides(address, hotkey, template)?;
            cli::run::run_helper(&runtime, config)?;
        }
        Commands::Send {
            template,
            params,
            content,
            address,
            no_clipboard,
            timeout,
        } => {
            let config = config.with_overrides(address, None, None)?;
            let mut params: BTreeMap<String, String> = params.into_iter().collect();
            if let Some(content) = content {
                params.insert(CONTENT_PARAM.into(), content);
            }
            let options = cli::send::SendOptions {
                submission: Submission { template, params },
                no_clipboard,
                timeout: timeout.map(Duration::from_secs),
            };
            if !runtime.block_on(cli::send::run_send(&config, options))? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Backend { bind, prompts } => {
            runtime.block_on(cli::backend::run_backend(&bind, prompts))?;
        }
        Commands::Init => {}
    }

    Ok(ExitCode::SUCCESS)
}
