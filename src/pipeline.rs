use std::io::{Read, Write};

use crate::{
    config::{Config, OutputConfig},
    core::{
        aggregator::aggregate,
        reader::{read_transactions, DateMode},
        report::Report,
    },
    delivery::{
        event::StorageEvent,
        mail::{compose, ConsoleMailer, MailConfig, Mailer, SpoolMailer},
        render::Template,
        repository::{CsvAuditRepository, NoopRepository, TransactionRepository},
        storage::ObjectStore,
        TransportError,
    },
    AppError,
};

/// Where the finished report goes
pub enum Sink {
    /// Rendered into the template and sent as html mail
    Mail {
        mailer: Box<dyn Mailer>,
        config: MailConfig,
    },
    /// Printed as json, no template involved
    Json(Box<dyn Write>),
}

/// Runs batches of transactions from raw csv to delivered statement
///
/// A batch is parsed, persisted for audit, aggregated and delivered in this
/// order. Failure of any step aborts the batch, nothing is delivered for it.
pub struct Pipeline {
    repository: Box<dyn TransactionRepository>,
    sink: Sink,
    date_mode: DateMode,
}

impl Pipeline {
    pub fn new(repository: Box<dyn TransactionRepository>, sink: Sink, date_mode: DateMode) -> Self {
        Self {
            repository,
            sink,
            date_mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let repository: Box<dyn TransactionRepository> = match &config.audit_log {
            Some(path) => Box::new(CsvAuditRepository::new(path)),
            None => Box::new(NoopRepository),
        };

        let sink = match &config.output {
            OutputConfig::Json => Sink::Json(Box::new(std::io::stdout())),
            OutputConfig::Console => Sink::Mail {
                mailer: Box::new(ConsoleMailer::new(std::io::stdout())),
                config: config.mail.clone(),
            },
            OutputConfig::Spool(dir) => Sink::Mail {
                mailer: Box::new(SpoolMailer::new(dir)),
                config: config.mail.clone(),
            },
        };

        Self::new(repository, sink, config.date_mode)
    }

    /// Processes one csv batch, template is loaded only when the statement is mailed
    pub fn run_batch<R, F>(&mut self, input: R, load_template: F) -> Result<Report, AppError>
    where
        R: Read,
        F: FnOnce() -> Result<Template, AppError>,
    {
        let transactions = read_transactions(input, self.date_mode)?;

        self.repository.save_batch(&transactions)?;

        let report = aggregate(&transactions);

        if report.is_empty() {
            log::warn!("Batch has no transactions");
        }

        log::info!(
            "Aggregated {} transactions into {} months, balance {}",
            report.transaction_count(),
            report.rows.len(),
            report.total_balance
        );

        match &mut self.sink {
            Sink::Json(output) => {
                serde_json::to_writer_pretty(&mut *output, &report)
                    .map_err(|err| TransportError::Send(err.to_string()))?;
                writeln!(output).map_err(|err| TransportError::Send(err.to_string()))?;
            }
            Sink::Mail { mailer, config } => {
                let html = load_template()?.render(&report);
                let message = compose(config, &html)?;
                mailer.send(&message)?;
            }
        }

        Ok(report)
    }

    /// Runs one batch per uploaded object, template is read from the same bucket
    pub fn process_event(
        &mut self,
        store: &dyn ObjectStore,
        event: &StorageEvent,
        template_key: &str,
    ) -> Result<Vec<Report>, AppError> {
        let mut reports = Vec::new();

        for object in event.objects()? {
            log::info!("Processing {}/{}", object.bucket, object.key);

            let content = store.fetch(&object.bucket, &object.key)?;
            let report = self.run_batch(content.as_slice(), || {
                let template = store.fetch(&object.bucket, template_key)?;
                Ok(Template::from_bytes(&template)?)
            })?;

            reports.push(report);
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
        io::{self, Write},
        rc::Rc,
    };

    use rust_decimal_macros::dec;

    use super::{Pipeline, Sink};
    use crate::{
        core::{reader::DateMode, transaction::Transaction},
        delivery::{
            event::StorageEvent,
            mail::{MailConfig, Mailer},
            render::Template,
            repository::{NoopRepository, TransactionRepository},
            storage::ObjectStore,
            TransportError,
        },
        AppError,
    };

    const CSV: &str = "Id,Date,Transaction\n1,1/5/2023,100.0\n2,1/20/2023,-40.0\n3,2/1/2023,50.0\n";
    const TEMPLATE: &str = "{{#rows}}{{month}}:{{transactions}} {{/rows}}= {{balance}}";

    #[derive(Clone, Default)]
    struct Outbox(Rc<RefCell<Vec<String>>>);

    impl Mailer for Outbox {
        fn send(&mut self, message: &str) -> Result<(), TransportError> {
            self.0.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Buffer(Rc<RefCell<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Audit(Rc<RefCell<Vec<Transaction>>>);

    impl TransactionRepository for Audit {
        fn save_batch(&mut self, transactions: &[Transaction]) -> Result<(), TransportError> {
            self.0.borrow_mut().extend_from_slice(transactions);
            Ok(())
        }
    }

    struct BrokenAudit;

    impl TransactionRepository for BrokenAudit {
        fn save_batch(&mut self, _: &[Transaction]) -> Result<(), TransportError> {
            Err(TransportError::Persist {
                path: "audit.csv".into(),
                source: io::Error::new(io::ErrorKind::Other, "disk is full").into(),
            })
        }
    }

    struct MemoryStore(HashMap<(String, String), Vec<u8>>);

    impl ObjectStore for MemoryStore {
        fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, TransportError> {
            self.0
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| TransportError::InvalidKey(key.to_string()))
        }
    }

    fn mail_pipeline(outbox: &Outbox, repository: Box<dyn TransactionRepository>) -> Pipeline {
        Pipeline::new(
            repository,
            Sink::Mail {
                mailer: Box::new(outbox.clone()),
                config: MailConfig::new("reports@example.com", vec!["me@example.com".to_string()]),
            },
            DateMode::Lenient,
        )
    }

    fn template() -> Result<Template, AppError> {
        Ok(Template::parse(TEMPLATE)?)
    }

    #[test]
    fn mails_rendered_statement() -> Result<(), AppError> {
        let outbox = Outbox::default();
        let audit = Audit::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(audit.clone()));

        let report = pipeline.run_batch(CSV.as_bytes(), template)?;

        assert_eq!(report.total_balance, dec!(110.0));
        assert_eq!(audit.0.borrow().len(), 3);

        let sent = outbox.0.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("From: reports@example.com\r\nTo: me@example.com\r\n"));
        assert!(sent[0].ends_with("\r\n\r\nJanuary:2 February:1 = 110.0"));

        Ok(())
    }

    #[test]
    fn prints_json_without_loading_template() -> Result<(), AppError> {
        let buffer = Buffer::default();
        let mut pipeline = Pipeline::new(
            Box::new(NoopRepository),
            Sink::Json(Box::new(buffer.clone())),
            DateMode::Lenient,
        );

        pipeline.run_batch(CSV.as_bytes(), || panic!("template is not needed for json"))?;

        let printed: serde_json::Value = serde_json::from_slice(&buffer.0.borrow())
            .expect("output should be json");
        assert_eq!(printed["totalBalance"], "110.0");
        assert_eq!(printed["rows"][0]["month"], "January");
        assert_eq!(printed["rows"][1]["creditTotal"], "50.0");

        Ok(())
    }

    #[test]
    fn parse_error_aborts_batch_before_persisting() {
        let outbox = Outbox::default();
        let audit = Audit::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(audit.clone()));

        let result = pipeline.run_batch("Id,Date,Transaction\n1,1/1/2023,abc\n".as_bytes(), template);

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert!(audit.0.borrow().is_empty());
        assert!(outbox.0.borrow().is_empty());
    }

    #[test]
    fn persistence_failure_aborts_batch() {
        let outbox = Outbox::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(BrokenAudit));

        let result = pipeline.run_batch(CSV.as_bytes(), template);

        assert!(matches!(result, Err(AppError::Transport(_))));
        assert!(outbox.0.borrow().is_empty());
    }

    #[test]
    fn strict_dates_reject_batch() {
        let outbox = Outbox::default();
        let mut pipeline = Pipeline::new(
            Box::new(NoopRepository),
            Sink::Mail {
                mailer: Box::new(outbox.clone()),
                config: MailConfig::new("reports@example.com", vec!["me@example.com".to_string()]),
            },
            DateMode::Strict,
        );

        let result = pipeline.run_batch("Id,Date,Transaction\n1,someday,1\n".as_bytes(), template);

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert!(outbox.0.borrow().is_empty());
    }

    fn store() -> MemoryStore {
        let mut objects = HashMap::new();
        objects.insert(
            ("statements".to_string(), "january.csv".to_string()),
            CSV.as_bytes().to_vec(),
        );
        objects.insert(
            ("statements".to_string(), "mail.html".to_string()),
            TEMPLATE.as_bytes().to_vec(),
        );
        MemoryStore(objects)
    }

    fn event(keys: &[&str]) -> StorageEvent {
        let records: Vec<String> = keys
            .iter()
            .map(|key| {
                format!(
                    r#"{{"s3": {{"bucket": {{"name": "statements"}}, "object": {{"key": "{}"}}}}}}"#,
                    key
                )
            })
            .collect();
        let json = format!(r#"{{"Records": [{}]}}"#, records.join(","));

        StorageEvent::from_slice(json.as_bytes()).expect("event should be valid")
    }

    #[test]
    fn event_runs_batch_per_object() -> Result<(), AppError> {
        let outbox = Outbox::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(NoopRepository));

        let reports = pipeline.process_event(&store(), &event(&["january.csv", "january.csv"]), "mail.html")?;

        assert_eq!(reports.len(), 2);
        assert_eq!(outbox.0.borrow().len(), 2);

        Ok(())
    }

    #[test]
    fn missing_template_object_aborts_event() {
        let outbox = Outbox::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(NoopRepository));

        let result = pipeline.process_event(&store(), &event(&["january.csv"]), "missing.html");

        assert!(matches!(result, Err(AppError::Transport(_))));
        assert!(outbox.0.borrow().is_empty());
    }

    #[test]
    fn missing_csv_object_aborts_event() {
        let outbox = Outbox::default();
        let mut pipeline = mail_pipeline(&outbox, Box::new(NoopRepository));

        let result = pipeline.process_event(&store(), &event(&["february.csv"]), "mail.html");

        assert!(matches!(result, Err(AppError::Transport(TransportError::InvalidKey(_)))));
    }
}
