//! [`SqliteStore`] — the SQLite implementation of [`LicenseStore`].

use std::path::Path;

use chrono::Utc;
use lictype_core::{
  license::{DecisionSource, License, ManualOverride, NewLicense},
  store::LicenseStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{LICENSE_COLUMNS, RawLicense, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A license store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Fetch one row by primary key on an open connection.
fn select_by_id(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawLicense>> {
  conn
    .query_row(
      &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE license_id = ?1"),
      rusqlite::params![id],
      RawLicense::from_row,
    )
    .optional()
}

// ─── LicenseStore impl ───────────────────────────────────────────────────────

impl LicenseStore for SqliteStore {
  type Error = crate::Error;

  async fn upsert(&self, input: NewLicense) -> Result<License> {
    let now_str = encode_dt(Utc::now());
    let name = input.name;
    let external_id = input.external_id;
    let classification = input.classification.map(|c| {
      (c.typology().as_str().to_owned(), c.explanation().to_owned())
    });

    let (raw, guarded) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO licenses (name, external_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)
           ON CONFLICT (name) DO UPDATE SET
             external_id = COALESCE(excluded.external_id, licenses.external_id)",
          rusqlite::params![name, external_id, now_str],
        )?;

        // Manual decisions are never overwritten by an automated result.
        let mut guarded = false;
        if let Some((typology, explanation)) = classification {
          let changed = tx.execute(
            "UPDATE licenses
             SET typology = ?2, explanation = ?3, decision_source = ?4,
                 updated_at = ?5
             WHERE name = ?1 AND decision_source IS NOT 'manual'",
            rusqlite::params![
              name,
              typology,
              explanation,
              DecisionSource::Model.as_str(),
              now_str,
            ],
          )?;
          guarded = changed == 0;
        }

        let raw = tx.query_row(
          &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE name = ?1"),
          rusqlite::params![name],
          RawLicense::from_row,
        )?;
        tx.commit()?;
        Ok((raw, guarded))
      })
      .await?;

    if guarded {
      tracing::debug!(
        license_id = raw.license_id,
        "kept manual override; automated result discarded"
      );
    }
    raw.into_license()
  }

  async fn get(&self, id: i64) -> Result<Option<License>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_by_id(conn, id)?))
      .await?;

    raw.map(RawLicense::into_license).transpose()
  }

  async fn list(&self) -> Result<Vec<License>> {
    let raws: Vec<RawLicense> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LICENSE_COLUMNS} FROM licenses ORDER BY license_id"
        ))?;
        let rows = stmt
          .query_map([], RawLicense::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLicense::into_license).collect()
  }

  async fn apply_override(
    &self,
    id:         i64,
    correction: ManualOverride,
  ) -> Result<Option<License>> {
    let typology    = correction.typology().as_str().to_owned();
    let explanation = correction.explanation().to_owned();
    let now_str     = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE licenses
           SET typology = ?2, explanation = ?3, decision_source = ?4,
               updated_at = ?5
           WHERE license_id = ?1",
          rusqlite::params![
            id,
            typology,
            explanation,
            DecisionSource::Manual.as_str(),
            now_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_by_id(conn, id)?)
      })
      .await?;

    raw.map(RawLicense::into_license).transpose()
  }

  async fn clear_override(&self, id: i64) -> Result<Option<License>> {
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE licenses SET decision_source = NULL, updated_at = ?2
           WHERE license_id = ?1 AND decision_source = 'manual'",
          rusqlite::params![id, now_str],
        )?;
        Ok(select_by_id(conn, id)?)
      })
      .await?;

    raw.map(RawLicense::into_license).transpose()
  }

  async fn is_manually_overridden(&self, id: i64) -> Result<Option<bool>> {
    let source: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT decision_source FROM licenses WHERE license_id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(source.map(|s| s.as_deref() == Some(DecisionSource::Manual.as_str())))
  }
}
