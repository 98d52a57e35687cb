//! The `LicenseStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `lictype-store-sqlite`).
//! The classification service and the API depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::license::{License, ManualOverride, NewLicense};

/// Abstraction over a single-table license store.
///
/// Classification fields (typology, explanation, decision source) are always
/// written together. Two methods may write them:
///
/// - [`LicenseStore::upsert`] with a classification, which sets
///   `decision_source = model` and must leave manually overridden records'
///   classification untouched;
/// - [`LicenseStore::apply_override`], the only writer of
///   `decision_source = manual`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LicenseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a record for `input.name`, or update the existing one.
  ///
  /// An existing record keeps its id and name. `external_id` is replaced
  /// only when the input carries one.
  fn upsert(
    &self,
    input: NewLicense,
  ) -> impl Future<Output = Result<License, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<License>, Self::Error>> + Send + '_;

  /// All records in ascending id order.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<License>, Self::Error>> + Send + '_;

  /// Record a manual correction. Returns `None` if the id is unknown.
  fn apply_override(
    &self,
    id: i64,
    correction: ManualOverride,
  ) -> impl Future<Output = Result<Option<License>, Self::Error>> + Send + '_;

  /// Return a manually overridden record to the pending state so the next
  /// run may reclassify it. Returns `None` if the id is unknown.
  fn clear_override(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<License>, Self::Error>> + Send + '_;

  /// Whether the record is protected from automated classification.
  /// Returns `None` if the id is unknown.
  fn is_manually_overridden(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + '_ {
    async move { Ok(self.get(id).await?.map(|l| l.is_manual())) }
  }
}
