//! The classification service: one sequential pass over the record set.
//!
//! For every record that is not manually overridden, ask the classifier,
//! govern the answer, and persist the outcome. Per-record inference failures
//! become fallback classifications; store failures abort the run.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use uuid::Uuid;

use crate::{
  inference::{Classifier, InferenceError},
  license::{License, NewLicense},
  policy::{Verdict, govern},
  store::LicenseStore,
};

/// Default upper bound for a single classification call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
  pub run_id:         Uuid,
  pub total:          usize,
  pub classified:     usize,
  pub skipped_manual: usize,
  pub fallback:       usize,
}

/// Runs classification passes against a store with a classifier.
///
/// Cloning is cheap; both collaborators are reference-counted.
pub struct ClassificationService<S, C> {
  store:      Arc<S>,
  classifier: Arc<C>,
  timeout:    Duration,
}

impl<S, C> Clone for ClassificationService<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      classifier: Arc::clone(&self.classifier),
      timeout:    self.timeout,
    }
  }
}

impl<S, C> ClassificationService<S, C>
where
  S: LicenseStore,
  C: Classifier,
{
  pub fn new(store: Arc<S>, classifier: Arc<C>) -> Self {
    Self { store, classifier, timeout: DEFAULT_CALL_TIMEOUT }
  }

  /// Bound each classification call; an expired call is treated as
  /// [`InferenceError::Unavailable`].
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Classify every record in id order.
  pub async fn run(&self) -> Result<BatchSummary, S::Error> {
    let records = self.store.list().await?;
    let mut summary = BatchSummary {
      run_id: Uuid::new_v4(),
      total: records.len(),
      ..BatchSummary::default()
    };

    tracing::info!(run_id = %summary.run_id, total = summary.total, "classification run started");

    for record in &records {
      if record.is_manual() {
        tracing::debug!(license_id = record.license_id, "skipping manual override");
        summary.skipped_manual += 1;
        continue;
      }

      let verdict = self.decide(record).await;
      let input =
        NewLicense::named(&record.name).with_classification(verdict.classification());
      let stored = self.store.upsert(input).await?;

      // An override that landed while the model was answering wins.
      if stored.is_manual() {
        tracing::debug!(
          license_id = record.license_id,
          "overridden during the run; model result discarded"
        );
        summary.skipped_manual += 1;
      } else if verdict.is_fallback() {
        summary.fallback += 1;
      } else {
        summary.classified += 1;
      }
    }

    tracing::info!(
      run_id = %summary.run_id,
      total = summary.total,
      classified = summary.classified,
      skipped_manual = summary.skipped_manual,
      fallback = summary.fallback,
      "classification run finished"
    );

    Ok(summary)
  }

  async fn decide(&self, record: &License) -> Verdict {
    let call = self.classifier.classify(&record.name);
    let result = match tokio::time::timeout(self.timeout, call).await {
      Ok(r) => r,
      Err(_) => Err(InferenceError::Unavailable(format!(
        "no answer within {}s",
        self.timeout.as_secs_f32()
      ))),
    };

    let verdict = govern(result);
    match &verdict {
      Verdict::Accepted(c) => tracing::debug!(
        license_id = record.license_id,
        typology = %c.typology(),
        "classified"
      ),
      Verdict::Fallback(reason) => tracing::warn!(
        license_id = record.license_id,
        name = %record.name,
        %reason,
        "falling back to unresolved"
      ),
    }
    verdict
  }
}
