//! Legacy entities kept in the embedded local store.
//!
//! Grievances and workflows predate the document layer and never moved to
//! the remote store. They carry no matching logic; the local store exposes
//! plain CRUD over them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIORITY: &str = "normal";
pub const DEFAULT_STATUS: &str = "pending";
/// Setting a grievance to this status stamps its `resolved_date`.
pub const RESOLVED_STATUS: &str = "resolved";

// ─── Grievance ───────────────────────────────────────────────────────────────

/// One entry of a grievance's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrievanceUpdate {
  pub at:     DateTime<Utc>,
  pub status: String,
  pub note:   Option<String>,
}

/// A citizen grievance, optionally linked to the document it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grievance {
  pub id:             String,
  pub subject:        String,
  pub details:        Option<String>,
  pub priority:       String,
  pub status:         String,
  pub submitted_date: DateTime<Utc>,
  pub due_date:       Option<NaiveDate>,
  pub resolved_date:  Option<DateTime<Utc>>,
  pub department:     Option<String>,
  pub citizen_name:   Option<String>,
  pub contact:        Option<String>,
  pub source_doc_id:  Option<String>,
  pub updates:        Vec<GrievanceUpdate>,
}

/// Input to `save_grievance`. A missing id is generated by the store; a
/// missing priority becomes [`DEFAULT_PRIORITY`].
#[derive(Debug, Clone, Default)]
pub struct NewGrievance {
  pub id:            Option<String>,
  pub subject:       String,
  pub details:       Option<String>,
  pub priority:      Option<String>,
  pub due_date:      Option<NaiveDate>,
  pub department:    Option<String>,
  pub citizen_name:  Option<String>,
  pub contact:       Option<String>,
  pub source_doc_id: Option<String>,
}

impl NewGrievance {
  pub fn new(subject: impl Into<String>) -> Self {
    Self { subject: subject.into(), ..Self::default() }
  }
}

// ─── Workflow ────────────────────────────────────────────────────────────────

/// The processing workflow of a single document, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
  pub doc_id:              String,
  pub title:               Option<String>,
  pub current_status:      Option<String>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
  pub priority:            Option<String>,
  pub expected_completion: Option<NaiveDate>,
}

/// Input to `save_workflow`.
#[derive(Debug, Clone, Default)]
pub struct NewWorkflow {
  pub doc_id:              String,
  pub title:               Option<String>,
  pub current_status:      Option<String>,
  pub priority:            Option<String>,
  pub expected_completion: Option<NaiveDate>,
}

impl NewWorkflow {
  pub fn new(doc_id: impl Into<String>) -> Self {
    Self { doc_id: doc_id.into(), ..Self::default() }
  }
}

/// One step in a workflow's history. Steps are deleted with their workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
  pub id:        i64,
  pub doc_id:    String,
  pub status:    String,
  pub timestamp: DateTime<Utc>,
  pub officer:   Option<String>,
  pub remarks:   Option<String>,
}

/// Input to `add_workflow_step`.
#[derive(Debug, Clone, Default)]
pub struct NewWorkflowStep {
  pub status:  String,
  pub officer: Option<String>,
  pub remarks: Option<String>,
}

impl NewWorkflowStep {
  pub fn new(status: impl Into<String>) -> Self {
    Self { status: status.into(), ..Self::default() }
  }
}
