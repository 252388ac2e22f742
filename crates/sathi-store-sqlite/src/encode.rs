//! Encoding and decoding helpers between the legacy domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps reuse the document row encoding (fixed-precision RFC 3339).
//! Calendar dates are stored as `YYYY-MM-DD`. The grievance update history
//! is stored as a compact JSON array.

use chrono::{DateTime, NaiveDate, Utc};
use sathi_core::{
  legacy::{DEFAULT_PRIORITY, DEFAULT_STATUS, Grievance, GrievanceUpdate, Workflow, WorkflowStep},
  row::{decode_dt, encode_dt},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> String { encode_dt(dt) }

pub fn decode_ts(s: &str) -> Result<DateTime<Utc>> { Ok(decode_dt(s)?) }

fn decode_ts_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.filter(|s| !s.is_empty()).as_deref().map(decode_ts).transpose()
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_date_opt(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.filter(|s| !s.is_empty()).as_deref().map(decode_date).transpose()
}

// ─── Grievance updates ───────────────────────────────────────────────────────

pub fn encode_updates(updates: &[GrievanceUpdate]) -> Result<String> {
  Ok(serde_json::to_string(updates)?)
}

pub fn decode_updates(s: Option<&str>) -> Result<Vec<GrievanceUpdate>> {
  match s {
    Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(raw)?),
    _ => Ok(Vec::new()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read directly from a `grievances` row.
pub struct RawGrievance {
  pub id:             String,
  pub subject:        String,
  pub details:        Option<String>,
  pub priority:       Option<String>,
  pub status:         Option<String>,
  pub submitted_date: Option<String>,
  pub due_date:       Option<String>,
  pub resolved_date:  Option<String>,
  pub department:     Option<String>,
  pub citizen_name:   Option<String>,
  pub contact:        Option<String>,
  pub source_doc_id:  Option<String>,
  pub updates_json:   Option<String>,
}

pub const GRIEVANCE_COLUMNS: &str = "id, subject, details, priority, status, \
  submitted_date, due_date, resolved_date, department, citizen_name, contact, \
  source_doc_id, updates_json";

impl RawGrievance {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      subject:        row.get(1)?,
      details:        row.get(2)?,
      priority:       row.get(3)?,
      status:         row.get(4)?,
      submitted_date: row.get(5)?,
      due_date:       row.get(6)?,
      resolved_date:  row.get(7)?,
      department:     row.get(8)?,
      citizen_name:   row.get(9)?,
      contact:        row.get(10)?,
      source_doc_id:  row.get(11)?,
      updates_json:   row.get(12)?,
    })
  }

  /// A missing submission date decodes as the Unix epoch.
  pub fn into_grievance(self) -> Result<Grievance> {
    Ok(Grievance {
      submitted_date: decode_ts_opt(self.submitted_date)?
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
      due_date:       decode_date_opt(self.due_date)?,
      resolved_date:  decode_ts_opt(self.resolved_date)?,
      updates:        decode_updates(self.updates_json.as_deref())?,
      id:             self.id,
      subject:        self.subject,
      details:        self.details,
      priority:       self.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_owned()),
      status:         self.status.unwrap_or_else(|| DEFAULT_STATUS.to_owned()),
      department:     self.department,
      citizen_name:   self.citizen_name,
      contact:        self.contact,
      source_doc_id:  self.source_doc_id,
    })
  }
}

/// Raw column values read directly from a `workflows` row.
pub struct RawWorkflow {
  pub doc_id:              String,
  pub title:               Option<String>,
  pub current_status:      Option<String>,
  pub created_at:          Option<String>,
  pub updated_at:          Option<String>,
  pub priority:            Option<String>,
  pub expected_completion: Option<String>,
}

pub const WORKFLOW_COLUMNS: &str = "doc_id, title, current_status, created_at, \
  updated_at, priority, expected_completion";

impl RawWorkflow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      doc_id:              row.get(0)?,
      title:               row.get(1)?,
      current_status:      row.get(2)?,
      created_at:          row.get(3)?,
      updated_at:          row.get(4)?,
      priority:            row.get(5)?,
      expected_completion: row.get(6)?,
    })
  }

  pub fn into_workflow(self) -> Result<Workflow> {
    let created_at =
      decode_ts_opt(self.created_at)?.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let updated_at = decode_ts_opt(self.updated_at)?.unwrap_or(created_at);
    Ok(Workflow {
      doc_id: self.doc_id,
      title: self.title,
      current_status: self.current_status,
      created_at,
      updated_at,
      priority: self.priority,
      expected_completion: decode_date_opt(self.expected_completion)?,
    })
  }
}

/// Raw column values read directly from a `workflow_steps` row.
pub struct RawWorkflowStep {
  pub id:        i64,
  pub doc_id:    String,
  pub status:    String,
  pub timestamp: Option<String>,
  pub officer:   Option<String>,
  pub remarks:   Option<String>,
}

impl RawWorkflowStep {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      doc_id:    row.get(1)?,
      status:    row.get(2)?,
      timestamp: row.get(3)?,
      officer:   row.get(4)?,
      remarks:   row.get(5)?,
    })
  }

  pub fn into_step(self) -> Result<WorkflowStep> {
    Ok(WorkflowStep {
      id:        self.id,
      doc_id:    self.doc_id,
      status:    self.status,
      timestamp: decode_ts_opt(self.timestamp)?.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
      officer:   self.officer,
      remarks:   self.remarks,
    })
  }
}
