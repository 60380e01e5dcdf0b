mod api;
mod cli;
mod commands;
mod config;
mod doctor;
mod domains;
mod error;
mod openssl;
mod render;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use error::Exit;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(real_main()) {
        // Workflows that manage their own exit status hand it over through
        // Exit; anything else is an ordinary fatal error.
        match e.downcast::<Exit>() {
            Ok(exit) => {
                if !exit.message.is_empty() {
                    render::error(&exit.message);
                }
                std::process::exit(exit.code);
            }
            Err(e) => {
                render::error(&format!("{e:#}"));
                std::process::exit(1);
            }
        }
    }
}

async fn real_main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::load()?;
    let app = config::resolve_app(args.app.as_deref())?;
    let client = api::ApiClient::new(&config)?;

    match &args.command {
        cli::Command::Certs(cli::CertsCommand::Add(add)) => {
            commands::add::run(&client, &app, add).await
        }
        cli::Command::Certs(cli::CertsCommand::Auto) => commands::auto::run(&client, &app).await,
        cli::Command::Ssl(cli::SslCommand::Generate(generate)) => {
            commands::generate::run(&client, &app, generate).await
        }
    }
}
