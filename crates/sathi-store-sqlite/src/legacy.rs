//! CRUD over the legacy grievance and workflow tables.

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use sathi_core::legacy::{
  DEFAULT_PRIORITY, DEFAULT_STATUS, Grievance, GrievanceUpdate, NewGrievance, NewWorkflow,
  NewWorkflowStep, RESOLVED_STATUS, Workflow, WorkflowStep,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    GRIEVANCE_COLUMNS, RawGrievance, RawWorkflow, RawWorkflowStep, WORKFLOW_COLUMNS,
    encode_date, encode_ts, encode_updates,
  },
  store::SqliteStore,
};

impl SqliteStore {
  // ── Grievances ────────────────────────────────────────────────────────────

  /// Insert a grievance, or replace the one with the same id. The store
  /// assigns the submission date, the `pending` status and an empty update
  /// history.
  pub async fn save_grievance(&self, input: NewGrievance) -> Result<Grievance> {
    let grievance = Grievance {
      id:             input
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string()),
      subject:        input.subject,
      details:        input.details,
      priority:       input.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_owned()),
      status:         DEFAULT_STATUS.to_owned(),
      submitted_date: Utc::now(),
      due_date:       input.due_date,
      resolved_date:  None,
      department:     input.department,
      citizen_name:   input.citizen_name,
      contact:        input.contact,
      source_doc_id:  input.source_doc_id,
      updates:        Vec::new(),
    };
    self.write_grievance(&grievance).await?;
    // Round-trip so the returned timestamps carry the stored precision.
    self
      .get_grievance(&grievance.id)
      .await?
      .ok_or_else(|| Error::GrievanceNotFound(grievance.id.clone()))
  }

  async fn write_grievance(&self, g: &Grievance) -> Result<()> {
    let id             = g.id.clone();
    let subject        = g.subject.clone();
    let details        = g.details.clone();
    let priority       = g.priority.clone();
    let status         = g.status.clone();
    let submitted_date = encode_ts(g.submitted_date);
    let due_date       = g.due_date.map(encode_date);
    let resolved_date  = g.resolved_date.map(encode_ts);
    let department     = g.department.clone();
    let citizen_name   = g.citizen_name.clone();
    let contact        = g.contact.clone();
    let source_doc_id  = g.source_doc_id.clone();
    let updates_json   = encode_updates(&g.updates)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT OR REPLACE INTO grievances ({GRIEVANCE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
          ),
          rusqlite::params![
            id,
            subject,
            details,
            priority,
            status,
            submitted_date,
            due_date,
            resolved_date,
            department,
            citizen_name,
            contact,
            source_doc_id,
            updates_json,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Retrieve a grievance by id. Returns `None` if not found.
  pub async fn get_grievance(&self, id: &str) -> Result<Option<Grievance>> {
    let id = id.to_owned();

    let raw: Option<RawGrievance> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {GRIEVANCE_COLUMNS} FROM grievances WHERE id = ?1"),
              rusqlite::params![id],
              RawGrievance::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGrievance::into_grievance).transpose()
  }

  /// All grievances, most recently submitted first, optionally restricted to
  /// one status.
  pub async fn list_grievances(&self, status: Option<&str>) -> Result<Vec<Grievance>> {
    let status = status.map(str::to_owned);

    let raws: Vec<RawGrievance> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status {
          let mut stmt = conn.prepare(&format!(
            "SELECT {GRIEVANCE_COLUMNS} FROM grievances
             WHERE status = ?1 ORDER BY submitted_date DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![s], RawGrievance::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {GRIEVANCE_COLUMNS} FROM grievances ORDER BY submitted_date DESC"
          ))?;
          stmt
            .query_map([], RawGrievance::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGrievance::into_grievance).collect()
  }

  /// Move a grievance to `status`, appending an entry to its update history.
  /// Moving to `resolved` stamps the resolution date.
  pub async fn update_grievance_status(
    &self,
    id: &str,
    status: &str,
    note: Option<String>,
  ) -> Result<Grievance> {
    let mut grievance = self
      .get_grievance(id)
      .await?
      .ok_or_else(|| Error::GrievanceNotFound(id.to_owned()))?;

    let now = Utc::now();
    grievance.status = status.to_owned();
    grievance.updates.push(GrievanceUpdate {
      at: now,
      status: status.to_owned(),
      note,
    });
    if status == RESOLVED_STATUS {
      grievance.resolved_date = Some(now);
    }

    self.write_grievance(&grievance).await?;
    self
      .get_grievance(id)
      .await?
      .ok_or_else(|| Error::GrievanceNotFound(id.to_owned()))
  }

  /// Delete a grievance if present.
  pub async fn delete_grievance(&self, id: &str) -> Result<()> {
    let id = id.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM grievances WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Workflows ─────────────────────────────────────────────────────────────

  /// Create a workflow, or replace the fields of an existing one. Replacing
  /// keeps the original `created_at` and the step history.
  pub async fn save_workflow(&self, input: NewWorkflow) -> Result<Workflow> {
    let now                 = encode_ts(Utc::now());
    let doc_id              = input.doc_id.clone();
    let title               = input.title;
    let current_status      = input.current_status;
    let priority            = input.priority;
    let expected_completion = input.expected_completion.map(encode_date);

    // An upsert rather than INSERT OR REPLACE: replacing the row would fire
    // the cascade and drop the steps.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO workflows (
             doc_id, title, current_status, created_at, updated_at,
             priority, expected_completion
           ) VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6)
           ON CONFLICT (doc_id) DO UPDATE SET
             title               = excluded.title,
             current_status      = excluded.current_status,
             updated_at          = excluded.updated_at,
             priority            = excluded.priority,
             expected_completion = excluded.expected_completion",
          rusqlite::params![
            doc_id,
            title,
            current_status,
            now,
            priority,
            expected_completion,
          ],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_workflow(&input.doc_id)
      .await?
      .ok_or(Error::WorkflowNotFound(input.doc_id))
  }

  /// Retrieve a workflow by document id. Returns `None` if not found.
  pub async fn get_workflow(&self, doc_id: &str) -> Result<Option<Workflow>> {
    let doc_id = doc_id.to_owned();

    let raw: Option<RawWorkflow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE doc_id = ?1"),
              rusqlite::params![doc_id],
              RawWorkflow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWorkflow::into_workflow).transpose()
  }

  /// All workflows, most recently updated first.
  pub async fn list_workflows(&self) -> Result<Vec<Workflow>> {
    let raws: Vec<RawWorkflow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WORKFLOW_COLUMNS} FROM workflows ORDER BY updated_at DESC"
        ))?;
        let rows = stmt
          .query_map([], RawWorkflow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWorkflow::into_workflow).collect()
  }

  /// Append a step to a workflow and make its status the workflow's current
  /// status.
  pub async fn add_workflow_step(
    &self,
    doc_id: &str,
    input: NewWorkflowStep,
  ) -> Result<WorkflowStep> {
    let doc_id_owned = doc_id.to_owned();
    let now          = encode_ts(Utc::now());

    let step_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let updated = tx.execute(
          "UPDATE workflows SET current_status = ?2, updated_at = ?3 WHERE doc_id = ?1",
          rusqlite::params![doc_id_owned, input.status, now],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO workflow_steps (doc_id, status, timestamp, officer, remarks)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![doc_id_owned, input.status, now, input.officer, input.remarks],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let step_id = step_id.ok_or_else(|| Error::WorkflowNotFound(doc_id.to_owned()))?;

    self
      .workflow_steps(doc_id)
      .await?
      .into_iter()
      .find(|step| step.id == step_id)
      .ok_or_else(|| Error::WorkflowNotFound(doc_id.to_owned()))
  }

  /// The steps of a workflow in the order they were added.
  pub async fn workflow_steps(&self, doc_id: &str) -> Result<Vec<WorkflowStep>> {
    let doc_id = doc_id.to_owned();

    let raws: Vec<RawWorkflowStep> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, doc_id, status, timestamp, officer, remarks
           FROM workflow_steps WHERE doc_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![doc_id], RawWorkflowStep::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWorkflowStep::into_step).collect()
  }

  /// Delete a workflow and, through the foreign key cascade, its steps.
  pub async fn delete_workflow(&self, doc_id: &str) -> Result<()> {
    let doc_id = doc_id.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM workflows WHERE doc_id = ?1", rusqlite::params![doc_id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
