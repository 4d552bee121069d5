use std::fs::{self, File};

use crate::cli::{validate_ext, Command};
use crate::config::Config;
use crate::core::reader::ParseError;
use crate::delivery::{
    event::StorageEvent, render::Template, storage::LocalObjectStore, TransportError,
};
use crate::pipeline::Pipeline;
use clap::Parser;

mod cli;
mod config;
mod core;
mod delivery;
mod pipeline;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    OpenFileError(#[from] std::io::Error),
    #[error("{0}")]
    InvalidFileExt(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Unable to parse transactions: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Transport(#[from] TransportError),
}

fn main() -> Result<(), AppError> {
    let args = cli::Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = Config::from_args(&args)?;

    worker(args.command, &config).map_err(|err| {
        log::error!("{}", err);
        err
    })
}

pub fn worker(command: Command, config: &Config) -> Result<(), AppError> {
    let mut pipeline = Pipeline::from_config(config);

    match command {
        Command::File {
            transactions_file,
            template,
        } => {
            validate_ext(&transactions_file)?;

            log::info!("Processing {:?}", transactions_file);

            let file = File::open(&transactions_file)?;

            pipeline.run_batch(file, || match template {
                Some(path) => Ok(Template::from_file(&path)?),
                None => Ok(Template::builtin()?),
            })?;
        }
        Command::Event {
            event_file,
            storage_root,
            template_key,
        } => {
            let event = StorageEvent::from_slice(&fs::read(event_file)?)?;
            let store = LocalObjectStore::new(storage_root);

            let reports = pipeline.process_event(&store, &event, &template_key)?;

            log::info!("Delivered {} statements", reports.len());
        }
    }

    Ok(())
}
