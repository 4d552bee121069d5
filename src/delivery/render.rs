use std::{fs, path::Path};

use crate::core::report::{display_amount, MonthSummary, Report};

use super::TransportError;

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/mail.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Month,
    Transactions,
    Debit,
    Credit,
    Balance,
}

impl Field {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "month" => Some(Field::Month),
            "transactions" => Some(Field::Transactions),
            "debit" => Some(Field::Debit),
            "credit" => Some(Field::Credit),
            "balance" => Some(Field::Balance),
            _ => None,
        }
    }

    fn is_row_field(&self) -> bool {
        *self != Field::Balance
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
    Rows(Vec<Segment>),
}

/// Statement template
///
/// `{{#rows}} ... {{/rows}}` is repeated for every month with `{{month}}`,
/// `{{transactions}}`, `{{debit}}` and `{{credit}}` available inside.
/// `{{balance}}` may be used anywhere.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

fn render_error(message: impl Into<String>) -> TransportError {
    TransportError::Render(message.into())
}

fn push(top: &mut Vec<Segment>, rows: &mut Option<Vec<Segment>>, segment: Segment) {
    match rows {
        Some(rows) => rows.push(segment),
        None => top.push(segment),
    }
}

impl Template {
    /// Template shipped with the binary
    pub fn builtin() -> Result<Self, TransportError> {
        Self::parse(BUILTIN_TEMPLATE)
    }

    pub fn from_file(path: &Path) -> Result<Self, TransportError> {
        let bytes = fs::read(path).map_err(|source| TransportError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        let source = std::str::from_utf8(bytes)
            .map_err(|err| render_error(format!("template is not valid utf-8: {}", err)))?;

        Self::parse(source)
    }

    pub fn parse(source: &str) -> Result<Self, TransportError> {
        let mut top = Vec::new();
        let mut rows: Option<Vec<Segment>> = None;
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let (text, after) = rest.split_at(start);
            if !text.is_empty() {
                push(&mut top, &mut rows, Segment::Text(text.to_string()));
            }

            let end = after
                .find("}}")
                .ok_or_else(|| render_error("unclosed `{{`"))?;
            let tag = after[2..end].trim();
            rest = &after[end + 2..];

            match tag {
                "#rows" => {
                    if rows.is_some() {
                        return Err(render_error("nested `{{#rows}}` section"));
                    }
                    rows = Some(Vec::new());
                }
                "/rows" => {
                    let body = rows
                        .take()
                        .ok_or_else(|| render_error("`{{/rows}}` without `{{#rows}}`"))?;
                    top.push(Segment::Rows(body));
                }
                _ => {
                    let field = Field::from_tag(tag)
                        .ok_or_else(|| render_error(format!("unknown placeholder `{}`", tag)))?;

                    if field.is_row_field() && rows.is_none() {
                        return Err(render_error(format!(
                            "`{}` used outside of `{{{{#rows}}}}` section",
                            tag
                        )));
                    }
                    push(&mut top, &mut rows, Segment::Field(field));
                }
            }
        }

        if rows.is_some() {
            return Err(render_error("unclosed `{{#rows}}` section"));
        }

        if !rest.is_empty() {
            top.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments: top })
    }

    pub fn render(&self, report: &Report) -> String {
        let mut output = String::new();
        render_segments(&self.segments, report, None, &mut output);
        output
    }
}

fn render_segments(
    segments: &[Segment],
    report: &Report,
    row: Option<&MonthSummary>,
    output: &mut String,
) {
    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Rows(body) => report
                .rows
                .iter()
                .for_each(|row| render_segments(body, report, Some(row), output)),
            Segment::Field(field) => {
                let value = match (field, row) {
                    (Field::Balance, _) => display_amount(&report.total_balance),
                    (Field::Month, Some(row)) => row.month.clone(),
                    (Field::Transactions, Some(row)) => row.transaction_count.to_string(),
                    (Field::Debit, Some(row)) => display_amount(&row.debit_total),
                    (Field::Credit, Some(row)) => display_amount(&row.credit_total),
                    // row fields are only accepted inside a rows section
                    (_, None) => String::new(),
                };
                output.push_str(&escape_html(&value));
            }
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
