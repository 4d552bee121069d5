use std::path::PathBuf;

use crate::{
    cli::{Args, Output},
    core::reader::DateMode,
    delivery::mail::MailConfig,
    AppError,
};

const PREVIEW_ADDRESS: &str = "statement@localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputConfig {
    Console,
    Spool(PathBuf),
    Json,
}

/// Settings of a single run, collaborators are built from it and nothing
/// else reads process environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output: OutputConfig,
    pub mail: MailConfig,
    pub audit_log: Option<PathBuf>,
    pub date_mode: DateMode,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, AppError> {
        let recipients: Vec<String> = args
            .mail_to
            .iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect();

        let output = match args.output {
            Output::Console => OutputConfig::Console,
            Output::Json => OutputConfig::Json,
            Output::Spool => {
                let dir = args.spool_dir.clone().ok_or_else(|| {
                    AppError::Config("`--spool-dir` is required by spool output".to_string())
                })?;

                if args.mail_from.is_none() || recipients.is_empty() {
                    return Err(AppError::Config(
                        "sender and recipients are required by spool output".to_string(),
                    ));
                }

                OutputConfig::Spool(dir)
            }
        };

        // console output is a preview, placeholder addresses are good enough
        let from = args
            .mail_from
            .clone()
            .unwrap_or_else(|| PREVIEW_ADDRESS.to_string());
        let to = if recipients.is_empty() {
            vec![PREVIEW_ADDRESS.to_string()]
        } else {
            recipients
        };

        let mut mail = MailConfig::new(from, to);
        if let Some(subject) = &args.subject {
            mail.subject = subject.clone();
        }

        let date_mode = if args.strict_dates {
            DateMode::Strict
        } else {
            DateMode::Lenient
        };

        Ok(Self {
            output,
            mail,
            audit_log: args.audit_log.clone(),
            date_mode,
        })
    }
}
