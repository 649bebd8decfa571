//! Parsed SMS conversation types

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Message direction as exported by the backup tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Sent,
    Received,
}

impl MessageKind {
    /// Map the export's `Type` column; anything other than "Sent" is inbound
    pub fn from_type_column(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sent") {
            MessageKind::Sent
        } else {
            MessageKind::Received
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Sent => "sent",
            MessageKind::Received => "received",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sent" => Some(MessageKind::Sent),
            "received" => Some(MessageKind::Received),
            _ => None,
        }
    }
}

/// A single SMS message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: NaiveDateTime,
    /// "You" for sent messages, otherwise the contact
    pub sender: String,
    pub content: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }
}

/// Summary statistics of a parsed conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_messages: usize,
    pub sent_count: usize,
    pub received_count: usize,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    /// Whole days between the first and last message
    pub duration_days: i64,
    /// Mean content length in characters, one decimal
    pub avg_message_length: f64,
    /// One decimal
    pub messages_per_day: f64,
}

/// Output of the SMS parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedConversation {
    pub messages: Vec<Message>,
    pub contact_name: String,
    pub contact_phone: String,
    /// Absent when no message survived parsing
    pub statistics: Option<ConversationStats>,
    /// Rows dropped because of unreadable dates or empty content
    pub skipped_rows: usize,
}

/// A window of consecutive messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub text: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub message_count: usize,
}
