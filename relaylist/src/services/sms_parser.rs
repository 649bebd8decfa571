//! SMS CSV export parser
//!
//! Reads exports with the columns `Type`, `Date`, `Name / Number`, `Sender`
//! and `Content`. Unreadable rows are skipped with a warning; only a missing
//! column or an empty file is fatal.

use crate::models::{ConversationContext, ConversationStats, Message, MessageKind, ParsedConversation};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Columns every export must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["Type", "Date", "Name / Number", "Sender", "Content"];

/// Primary export format followed by fallbacks seen in other backup tools
const DATE_FORMATS: [&str; 6] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Default window size for `conversation_contexts`
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\+\d+)\)$").expect("phone pattern is valid"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV must contain columns: {}", REQUIRED_COLUMNS.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("CSV contains no message rows")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column positions resolved from the header row
struct ColumnIndex {
    kind: usize,
    date: usize,
    contact: usize,
    sender: usize,
    content: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ParseError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let find = |column: &str| names.iter().position(|n| n == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ParseError::MissingColumns { missing });
        }

        // Presence checked above
        let at = |column: &str| find(column).unwrap_or_default();
        Ok(Self {
            kind: at("Type"),
            date: at("Date"),
            contact: at("Name / Number"),
            sender: at("Sender"),
            content: at("Content"),
        })
    }
}

/// Parser for SMS CSV exports
#[derive(Debug, Default, Clone)]
pub struct SmsParser;

impl SmsParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedConversation, ParseError> {
        let file = std::fs::File::open(path)?;
        self.parse(file)
    }

    pub fn parse_str(&self, content: &str) -> Result<ParsedConversation, ParseError> {
        self.parse(content.as_bytes())
    }

    /// Parse an export into messages, contact details and statistics
    pub fn parse<R: Read>(&self, reader: R) -> Result<ParsedConversation, ParseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

        let mut contact: Option<(String, String)> = None;
        let mut messages = Vec::new();
        let mut row_count = 0usize;
        let mut skipped_rows = 0usize;

        for (idx, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("Could not parse row {}: {}", idx, e);
                    row_count += 1;
                    skipped_rows += 1;
                    continue;
                }
            };
            row_count += 1;

            // Single conversation per export: the first row names the contact
            let (contact_name, _) = contact.get_or_insert_with(|| {
                parse_contact_info(record.get(columns.contact).unwrap_or(""))
            });

            match parse_row(&record, &columns, contact_name) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {
                    debug!("Skipping empty message at row {}", idx);
                    skipped_rows += 1;
                }
                Err(reason) => {
                    warn!("Could not parse row {}: {}", idx, reason);
                    skipped_rows += 1;
                }
            }
        }

        if row_count == 0 {
            return Err(ParseError::Empty);
        }

        // Stable sort keeps export order for identical timestamps
        messages.sort_by_key(|m| m.timestamp);

        let statistics = generate_statistics(&messages);
        let (contact_name, contact_phone) = contact.unwrap_or_default();

        Ok(ParsedConversation {
            messages,
            contact_name,
            contact_phone,
            statistics,
            skipped_rows,
        })
    }
}

/// Split `"Alex (A-Money) 🏀 (+17185551234)"` into name and phone
///
/// Without a trailing `(+digits)` group the whole string is the name and
/// the phone is `"Unknown"`.
pub fn parse_contact_info(contact: &str) -> (String, String) {
    let contact = contact.trim();
    match PHONE_PATTERN.captures(contact) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(contact.len());
            let phone = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            (contact[..whole].trim().to_string(), phone.to_string())
        }
        None => (contact.to_string(), "Unknown".to_string()),
    }
}

/// Parse an export timestamp, trying each known format
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnIndex,
    contact_name: &str,
) -> Result<Option<Message>, String> {
    let raw_date = record.get(columns.date).unwrap_or("");
    let timestamp =
        parse_timestamp(raw_date).ok_or_else(|| format!("unrecognized date '{}'", raw_date))?;

    let content = record.get(columns.content).unwrap_or("").trim();
    if content.is_empty() || content == "nan" {
        return Ok(None);
    }

    let kind = MessageKind::from_type_column(record.get(columns.kind).unwrap_or(""));
    let sender = match kind {
        MessageKind::Sent => "You".to_string(),
        MessageKind::Received => {
            let sender = record.get(columns.sender).unwrap_or("").trim();
            if sender.is_empty() {
                contact_name.to_string()
            } else {
                sender.to_string()
            }
        }
    };

    Ok(Some(Message {
        timestamp,
        sender,
        content: content.to_string(),
        kind,
    }))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Conversation statistics; `None` for an empty message list
pub fn generate_statistics(messages: &[Message]) -> Option<ConversationStats> {
    let first = messages.first()?;
    let last = messages.last()?;

    let total = messages.len();
    let sent_count = messages
        .iter()
        .filter(|m| m.kind == MessageKind::Sent)
        .count();
    let duration_days = (last.timestamp - first.timestamp).num_days();
    let total_chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();

    Some(ConversationStats {
        total_messages: total,
        sent_count,
        received_count: total - sent_count,
        start_date: first.timestamp,
        end_date: last.timestamp,
        duration_days,
        avg_message_length: round1(total_chars as f64 / total as f64),
        messages_per_day: round1(total as f64 / duration_days.max(1) as f64),
    })
}

/// Group consecutive messages into windows of `window_size`
pub fn conversation_contexts(messages: &[Message], window_size: usize) -> Vec<ConversationContext> {
    messages
        .chunks(window_size.max(1))
        .filter_map(|window| {
            let first = window.first()?;
            let last = window.last()?;
            Some(ConversationContext {
                text: window
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                start_time: first.timestamp,
                end_time: last.timestamp,
                message_count: window.len(),
            })
        })
        .collect()
}
