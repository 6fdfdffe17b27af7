//! model-runner - command-line entry point

use anyhow::{anyhow, Result};
use clap::Parser;
use model_runner_client::{
    cli::{split_target, Args, Commands},
    config::Config,
    models::{listing, ModelClient},
    telemetry, ClientError, ErrorKind,
};
use std::io::Write;

const NOT_RUNNING: &str = "The model runner is not running. Start it and try again.";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate().map_err(|e| anyhow!(e))?;

    let config = Config::load(args.config.as_deref())?;
    telemetry::init(args.log_level(&config.logging.level));

    let client = ModelClient::connect(&config.daemon)?;
    run(&client, args.command).await.map_err(friendly)
}

async fn run(client: &ModelClient, command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::List { json, openai, quiet } => {
            if openai {
                println!("{}", client.list_openai().await?);
                return Ok(());
            }
            let models = client.list().await?;
            if json {
                println!("{}", listing::to_json(&models)?);
            } else if quiet {
                print!("{}", listing::quiet_ids(&models));
            } else {
                print!("{}", listing::format_table(&listing::rows(&models, chrono::Utc::now())));
            }
        }
        Commands::Inspect { model, openai } => {
            if openai {
                println!("{}", client.inspect_openai(&model).await?);
            } else {
                let model = client.inspect(&model).await?;
                println!("{}", listing::to_json(&model)?);
            }
        }
        Commands::Pull { model } => match client.pull(&model, print_progress).await {
            Ok(outcome) => {
                finish_progress(outcome.progress_shown);
                println!("{}", outcome.message);
            }
            Err(failure) => {
                finish_progress(failure.progress_shown);
                return Err(failure.error);
            }
        },
        Commands::Push { model } => match client.push(&model, print_progress).await {
            Ok(outcome) => {
                finish_progress(outcome.progress_shown);
                println!("{}", outcome.message);
            }
            Err(failure) => {
                finish_progress(failure.progress_shown);
                return Err(failure.error);
            }
        },
        Commands::Tag { source, target } => {
            let (repo, tag) = split_target(&target);
            println!("{}", client.tag(&source, &repo, &tag).await?);
        }
        Commands::Rm { models } => match client.remove(models.as_slice()).await {
            Ok(removed) => print!("{}", removed),
            Err(failure) => {
                print!("{}", failure.removed);
                return Err(failure.error);
            }
        },
        Commands::Run { model, prompt } => {
            let mut stdout = std::io::stdout();
            client.chat(&model, &prompt, &mut stdout).await?;
            println!();
        }
        Commands::Status => {
            let status = client.status().await;
            if status.running {
                println!("The model runner is running");
                if !status.status.is_empty() {
                    println!("{}", String::from_utf8_lossy(&status.status));
                }
            } else if let Some(err) = status.error {
                return Err(err);
            } else {
                println!("The model runner is not running");
            }
        }
    }
    Ok(())
}

fn print_progress(message: &str) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r\x1b[K{}", message);
    let _ = stdout.flush();
}

fn finish_progress(progress_shown: bool) {
    if progress_shown {
        println!();
    }
}

fn friendly(err: ClientError) -> anyhow::Error {
    if err.is(ErrorKind::ServiceUnavailable) {
        anyhow!(NOT_RUNNING)
    } else {
        anyhow::Error::new(err)
    }
}
