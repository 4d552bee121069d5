use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand, ValueEnum};

use crate::AppError;

#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    #[clap(
        long,
        value_enum,
        default_value = "console",
        global = true,
        help = "Where the statement is delivered"
    )]
    pub output: Output,

    #[clap(
        long,
        value_parser,
        global = true,
        help = "Pickup directory of the mail transfer agent, required by `--output spool`"
    )]
    pub spool_dir: Option<PathBuf>,

    #[clap(long, env = "EMAIL_USER", global = true, help = "Sender address")]
    pub mail_from: Option<String>,

    #[clap(
        long,
        env = "EMAIL_TO",
        value_delimiter = ',',
        global = true,
        help = "Recipient addresses, comma separated"
    )]
    pub mail_to: Vec<String>,

    #[clap(long, global = true, help = "Subject of the statement mail")]
    pub subject: Option<String>,

    #[clap(
        long,
        value_parser,
        global = true,
        help = "Csv file raw transactions are appended to"
    )]
    pub audit_log: Option<PathBuf>,

    #[clap(
        long,
        global = true,
        help = "Reject batches containing dates without a valid month"
    )]
    pub strict_dates: bool,

    #[clap(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reads transactions from a local csv file
    File {
        #[clap(value_parser, help = "A path to CSV file with transactions")]
        transactions_file: PathBuf,

        #[clap(long, value_parser, help = "Html template, built-in one is used if omitted")]
        template: Option<PathBuf>,
    },
    /// Processes an object storage upload notification
    Event {
        #[clap(value_parser, help = "A path to JSON upload notification")]
        event_file: PathBuf,

        #[clap(long, value_parser, help = "Directory holding one sub-directory per bucket")]
        storage_root: PathBuf,

        #[clap(long, default_value = "mail.html", help = "Template object in the uploaded bucket")]
        template_key: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// Prints the mail message
    Console,
    /// Drops the mail message into the spool directory
    Spool,
    /// Prints the report as json
    Json,
}

const FILE_EXT: &str = "csv";

pub fn validate_ext(transactions_file: &Path) -> Result<(), AppError> {
    let ext = transactions_file
        .extension()
        .and_then(OsStr::to_str)
        .ok_or(AppError::InvalidFileExt(
            "Unable to validate extension".to_string(),
        ))?;

    if ext != FILE_EXT {
        return Err(AppError::InvalidFileExt(ext.to_string()));
    }

    Ok(())
}
