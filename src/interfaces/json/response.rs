use crate::application::statistics::Statistics;
use crate::domain::transaction::Transaction;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// What the caller gets back for one request.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok { transaction: Transaction },
    Error { kind: String, message: String },
}

impl From<&LedgerError> for Response {
    fn from(error: &LedgerError) -> Self {
        Response::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&Result<Transaction>> for Response {
    fn from(result: &Result<Transaction>) -> Self {
        match result {
            Ok(tx) => Response::Ok {
                transaction: tx.clone(),
            },
            Err(e) => e.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatisticsLine<'a> {
    statistics: &'a Statistics,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub app: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl Health {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            app: env!("CARGO_PKG_NAME"),
            message: "Ledger engine is ready",
            timestamp: Utc::now(),
        }
    }
}

/// Writes one JSON document per line.
pub struct ResponseWriter<W: Write> {
    sink: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_response(&mut self, response: &Response) -> Result<()> {
        self.write_line(response)
    }

    pub fn write_statistics(&mut self, statistics: &Statistics) -> Result<()> {
        self.write_line(&StatisticsLine { statistics })
    }

    pub fn write_health(&mut self, health: &Health) -> Result<()> {
        self.write_line(health)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.sink, value).map_err(io::Error::from)?;
        self.sink.write_all(b"\n")?;
        Ok(())
    }
}
