use std::{
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use super::TransportError;

pub const DEFAULT_SUBJECT: &str = "Account balance";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
}

impl MailConfig {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: from.into(),
            to,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Builds html message ready to be handed to the mail transfer agent
pub fn compose(config: &MailConfig, html: &str) -> Result<String, TransportError> {
    if config.to.is_empty() {
        return Err(TransportError::Send("no recipients configured".to_string()));
    }

    let headers = [
        ("From", config.from.clone()),
        ("To", config.to.join(", ")),
        ("Subject", config.subject.clone()),
        ("MIME-Version", "1.0".to_string()),
        ("Content-Type", "text/html; charset=\"UTF-8\"".to_string()),
    ];

    let mut message = String::with_capacity(html.len() + 256);

    for (name, value) in headers {
        if value.contains(['\r', '\n']) {
            return Err(TransportError::Send(format!(
                "line break in `{}` header",
                name
            )));
        }
        message.push_str(&format!("{}: {}\r\n", name, value));
    }

    message.push_str("\r\n");
    message.push_str(&html.replace("\r\n", "\n").replace('\n', "\r\n"));

    Ok(message)
}

pub trait Mailer {
    fn send(&mut self, message: &str) -> Result<(), TransportError>;
}

/// Prints the whole message, used when statement is only previewed
pub struct ConsoleMailer<W: Write> {
    output: W,
}

impl<W: Write> ConsoleMailer<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> Mailer for ConsoleMailer<W> {
    fn send(&mut self, message: &str) -> Result<(), TransportError> {
        self.output
            .write_all(message.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|err| TransportError::Send(err.to_string()))
    }
}

/// Drops messages as `.eml` files into a pickup directory watched by the mail
/// transfer agent
pub struct SpoolMailer {
    dir: PathBuf,
    sent: u32,
}

impl SpoolMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sent: 0,
        }
    }

    fn next_path(&mut self) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        self.sent += 1;

        self.dir
            .join(format!("statement-{}-{}.eml", nanos, self.sent))
    }
}

impl Mailer for SpoolMailer {
    fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let path = self.next_path();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| TransportError::Send(format!("{:?}: {}", path, err)))?;

        file.write_all(message.as_bytes())
            .map_err(|err| TransportError::Send(format!("{:?}: {}", path, err)))?;

        log::info!("Statement spooled to {:?}", path);

        Ok(())
    }
}
