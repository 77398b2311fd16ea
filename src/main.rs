use std::process::ExitCode;

use clap::Parser;

use respstream::cli::{self, Cli, Commands, ConfigSubcommands, Session};
use respstream::config::AppConfig;
use respstream::logging::{self, LogConfig};
use respstream::stream::TurnEnd;
use respstream::transport::{HttpTransport, ReplayTransport, Transport};
use respstream::{ClientError, Result};

const EXIT_CANCELLED: u8 = 130;

fn create_transport(config: &AppConfig) -> Result<HttpTransport> {
    Ok(HttpTransport::from_env(&config.api_key_env, config.http_config())?
        .with_base_url(config.base_url.clone()))
}

async fn single_turn<T: Transport + ?Sized>(
    transport: &T,
    config: &AppConfig,
    input: &str,
) -> Result<ExitCode> {
    let mut display = cli::build_display(config, false)?;
    let mut session = Session::new(transport, config);

    let outcome = session
        .turn(input, &mut display, tokio::signal::ctrl_c())
        .await?;
    if outcome.end == TurnEnd::Cancelled {
        eprintln!("Cancelled");
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    cli::ensure_succeeded(&outcome)?;

    Ok(ExitCode::SUCCESS)
}

async fn chat(transport: &HttpTransport, config: &AppConfig) -> Result<ExitCode> {
    let mut display = cli::build_display(config, true)?;
    let mut session = Session::new(transport, config);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    cli::run_chat(
        &mut session,
        &mut display,
        stdin,
        &mut std::io::stderr(),
        tokio::signal::ctrl_c,
    )
    .await?;

    Ok(ExitCode::SUCCESS)
}

fn config_command(command: &ConfigSubcommands) -> ExitCode {
    match command {
        ConfigSubcommands::Init => match AppConfig::init_default() {
            Ok(path) => {
                println!("✓ Created config file at {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("✗ Failed to create config: {e}");
                ExitCode::FAILURE
            }
        },
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => {
                println!("{}", path.display());
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("✗ Could not determine config path");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: Cli, config: AppConfig) -> Result<ExitCode> {
    match args.command {
        Some(Commands::Config { ref command }) => Ok(config_command(command)),
        Some(Commands::Replay {
            ref file,
            chunk_size,
        }) => {
            let mut transport = ReplayTransport::new(file.clone());
            if let Some(size) = chunk_size {
                transport = transport.with_chunk_size(size);
            }
            single_turn(&transport, &config, "").await
        }
        None if args.chat => {
            let transport = create_transport(&config)?;
            chat(&transport, &config).await
        }
        None => {
            let prompt = cli::resolve_prompt(args.prompt)?;
            let transport = create_transport(&config)?;
            single_turn(&transport, &config, &prompt).await
        }
    }
}

fn report(error: &ClientError) {
    eprintln!("Error: {error}");
    if let Some(hint) = error.hint() {
        eprintln!("{hint}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let config = args.apply_to(AppConfig::load());

    let _guard = logging::init(&LogConfig::from_config(&config, args.verbose, None));

    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
