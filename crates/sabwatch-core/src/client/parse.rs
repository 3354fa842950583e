//! Decode control API JSON bodies into snapshots and action results.

use serde::Deserialize;
use serde_json::Value;

use super::ClientError;
use crate::size::parse_size_gb;
use crate::snapshot::{Job, QueueSnapshot};
use crate::status::{JobStatus, QueueStatus};

/// A value the API sends either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Num(f64),
    Text(String),
}

impl Lenient {
    fn number(&self) -> Option<f64> {
        match self {
            Lenient::Num(n) => Some(*n),
            Lenient::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Size in GB: strings go through the size parser, bare numbers are GB.
    fn size_gb(&self) -> f64 {
        match self {
            Lenient::Num(n) if n.is_finite() && *n >= 0.0 => *n,
            Lenient::Num(_) => 0.0,
            Lenient::Text(s) => parse_size_gb(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueueEnvelope {
    queue: QueueBody,
}

#[derive(Debug, Deserialize)]
struct QueueBody {
    kbpersec: Lenient,
    noofslots: Lenient,
    status: String,
    diskspace1: Lenient,
    #[serde(default)]
    slots: Vec<Slot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Slot {
    nzo_id: String,
    filename: String,
    name: String,
    status: String,
    size: Option<Lenient>,
    sizeleft: Option<Lenient>,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    history: HistoryBody,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    slots: Vec<Slot>,
}

/// Surface `{"status": false, "error": "..."}` replies before shape checks.
fn check_rejected(value: &Value) -> Result<(), ClientError> {
    if let Some(err) = value.get("error").and_then(Value::as_str) {
        if !err.is_empty() {
            return Err(ClientError::Rejected(err.to_string()));
        }
    }
    Ok(())
}

fn invalid(msg: &str) -> ClientError {
    ClientError::Parse(serde::de::Error::custom(msg))
}

/// Parse a `mode=queue` response body.
pub(crate) fn parse_queue(body: &[u8]) -> Result<QueueSnapshot, ClientError> {
    let value: Value = serde_json::from_slice(body)?;
    check_rejected(&value)?;
    let envelope: QueueEnvelope = serde_json::from_value(value)?;
    let queue = envelope.queue;

    let kbps = queue
        .kbpersec
        .number()
        .ok_or_else(|| invalid("kbpersec is not a number"))?;
    let slots = queue
        .noofslots
        .number()
        .ok_or_else(|| invalid("noofslots is not a number"))?;
    let disk_free_gb = queue
        .diskspace1
        .number()
        .ok_or_else(|| invalid("diskspace1 is not a number"))?;

    let jobs: Vec<Job> = queue.slots.into_iter().map(job_from_slot).collect();
    let post_processing_active = jobs.iter().any(|j| j.status.is_post_processing());

    Ok(QueueSnapshot {
        speed_bytes_per_sec: kbps * 1024.0,
        active_slots: slots.max(0.0) as u32,
        status: QueueStatus::from_api(&queue.status),
        post_processing_active,
        disk_free_gb,
        jobs,
    })
}

fn job_from_slot(slot: Slot) -> Job {
    let name = if slot.filename.is_empty() {
        slot.name
    } else {
        slot.filename
    };
    Job {
        id: slot.nzo_id,
        name,
        status: JobStatus::from_api(&slot.status),
        total_size_gb: slot.size.as_ref().map_or(0.0, Lenient::size_gb),
        size_left_gb: slot.sizeleft.as_ref().map_or(0.0, Lenient::size_gb),
    }
}

/// Parse a `mode=history` body; true if any entry is still post-processing.
pub(crate) fn parse_history_post_processing(body: &[u8]) -> Result<bool, ClientError> {
    let value: Value = serde_json::from_slice(body)?;
    check_rejected(&value)?;
    let envelope: HistoryEnvelope = serde_json::from_value(value)?;
    Ok(envelope
        .history
        .slots
        .iter()
        .any(|s| JobStatus::from_api(&s.status).is_post_processing()))
}

/// Parse an action reply; succeeds only on a truthy `status`.
pub(crate) fn parse_action(body: &[u8]) -> Result<(), ClientError> {
    let value: Value = serde_json::from_slice(body)?;
    check_rejected(&value)?;
    let ok = match value.get("status") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ClientError::Rejected(value.to_string()))
    }
}
