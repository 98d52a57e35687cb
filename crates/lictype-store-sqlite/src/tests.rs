//! Integration tests for `SqliteStore` against an in-memory database.

use lictype_core::{
  license::{
    Classification, DecisionSource, ManualOverride, NewLicense, Typology,
    FALLBACK_EXPLANATION,
  },
  store::LicenseStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn model(typology: Typology, explanation: &str) -> Classification {
  Classification::new(typology, explanation)
}

// ─── Ingest ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_pending_record() {
  let s = store().await;

  let rec = s
    .upsert(NewLicense::named("Dynamics 365 Sales").with_external_id(Some(7)))
    .await
    .unwrap();
  assert_eq!(rec.name, "Dynamics 365 Sales");
  assert_eq!(rec.external_id, Some(7));
  assert!(rec.typology.is_none());
  assert!(rec.explanation.is_none());
  assert!(rec.decision_source.is_none());

  let fetched = s.get(rec.license_id).await.unwrap().unwrap();
  assert_eq!(fetched, rec);
}

#[tokio::test]
async fn reingest_same_name_keeps_identity() {
  let s = store().await;

  let first = s.upsert(NewLicense::named("Slack")).await.unwrap();
  let second = s
    .upsert(NewLicense::named("Slack").with_external_id(Some(42)))
    .await
    .unwrap();
  let third = s.upsert(NewLicense::named("Slack")).await.unwrap();

  assert_eq!(first.license_id, second.license_id);
  assert_eq!(second.license_id, third.license_id);
  // A later ingest without an id does not erase the known one.
  assert_eq!(third.external_id, Some(42));
  assert_eq!(s.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reingest_does_not_clear_classification() {
  let s = store().await;
  s.upsert(NewLicense::named("Figma").with_classification(model(Typology::Design, "ui design")))
    .await
    .unwrap();

  let again = s.upsert(NewLicense::named("Figma")).await.unwrap();
  assert_eq!(again.typology, Some(Typology::Design));
  assert_eq!(again.decision_source, Some(DecisionSource::Model));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(99).await.unwrap().is_none());
  assert!(s.is_manually_overridden(99).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_ordered_by_id() {
  let s = store().await;
  for name in ["Zoom", "Adobe XD", "Jira"] {
    s.upsert(NewLicense::named(name)).await.unwrap();
  }

  let all = s.list().await.unwrap();
  let names: Vec<_> = all.iter().map(|l| l.name.as_str()).collect();
  assert_eq!(names, ["Zoom", "Adobe XD", "Jira"]);
  assert!(all.windows(2).all(|w| w[0].license_id < w[1].license_id));
  assert_eq!(s.list().await.unwrap(), all);
}

// ─── Automated classification ────────────────────────────────────────────────

#[tokio::test]
async fn upsert_with_classification_marks_model() {
  let s = store().await;
  let rec = s
    .upsert(
      NewLicense::named("QuickBooks")
        .with_classification(model(Typology::Finance, "accounting suite")),
    )
    .await
    .unwrap();

  assert_eq!(rec.typology, Some(Typology::Finance));
  assert_eq!(rec.explanation.as_deref(), Some("accounting suite"));
  assert_eq!(rec.decision_source, Some(DecisionSource::Model));
}

#[tokio::test]
async fn fallback_classification_round_trips() {
  let s = store().await;
  let rec = s
    .upsert(NewLicense::named("Mystery").with_classification(Classification::fallback()))
    .await
    .unwrap();

  let fetched = s.get(rec.license_id).await.unwrap().unwrap();
  assert_eq!(fetched.typology, Some(Typology::Unresolved));
  assert_eq!(fetched.explanation.as_deref(), Some(FALLBACK_EXPLANATION));
}

#[tokio::test]
async fn reclassification_overwrites_model_decision() {
  let s = store().await;
  s.upsert(NewLicense::named("Notion").with_classification(model(Typology::Design, "first")))
    .await
    .unwrap();
  let rec = s
    .upsert(
      NewLicense::named("Notion")
        .with_classification(model(Typology::Productivity, "second")),
    )
    .await
    .unwrap();

  assert_eq!(rec.typology, Some(Typology::Productivity));
  assert_eq!(rec.explanation.as_deref(), Some("second"));
}

// ─── Manual overrides ────────────────────────────────────────────────────────

#[tokio::test]
async fn override_sets_manual_and_blocks_automation() {
  let s = store().await;
  let rec = s.upsert(NewLicense::named("Salesforce")).await.unwrap();

  let correction = ManualOverride::new(Typology::Finance, "manually reviewed").unwrap();
  let updated = s.apply_override(rec.license_id, correction).await.unwrap().unwrap();
  assert_eq!(updated.decision_source, Some(DecisionSource::Manual));
  assert_eq!(s.is_manually_overridden(rec.license_id).await.unwrap(), Some(true));

  let after = s
    .upsert(
      NewLicense::named("Salesforce")
        .with_classification(model(Typology::Marketing, "crm")),
    )
    .await
    .unwrap();
  assert_eq!(after.typology, Some(Typology::Finance));
  assert_eq!(after.explanation.as_deref(), Some("manually reviewed"));
  assert_eq!(after.decision_source, Some(DecisionSource::Manual));
}

#[tokio::test]
async fn override_unknown_id_returns_none() {
  let s = store().await;
  let correction = ManualOverride::new(Typology::Design, "x").unwrap();
  assert!(s.apply_override(5, correction).await.unwrap().is_none());
}

#[tokio::test]
async fn clear_override_returns_record_to_pending() {
  let s = store().await;
  let rec = s.upsert(NewLicense::named("Miro")).await.unwrap();
  let correction = ManualOverride::new(Typology::Communication, "whiteboard").unwrap();
  s.apply_override(rec.license_id, correction).await.unwrap();

  let cleared = s.clear_override(rec.license_id).await.unwrap().unwrap();
  assert!(cleared.decision_source.is_none());
  assert_eq!(cleared.typology, Some(Typology::Communication));
  assert_eq!(s.is_manually_overridden(rec.license_id).await.unwrap(), Some(false));

  let reclassified = s
    .upsert(NewLicense::named("Miro").with_classification(model(Typology::Design, "boards")))
    .await
    .unwrap();
  assert_eq!(reclassified.typology, Some(Typology::Design));
  assert_eq!(reclassified.decision_source, Some(DecisionSource::Model));
}

#[tokio::test]
async fn clear_override_leaves_model_records_alone() {
  let s = store().await;
  let rec = s
    .upsert(NewLicense::named("Canva").with_classification(model(Typology::Design, "graphics")))
    .await
    .unwrap();

  let same = s.clear_override(rec.license_id).await.unwrap().unwrap();
  assert_eq!(same.decision_source, Some(DecisionSource::Model));
  assert!(s.clear_override(1234).await.unwrap().is_none());
}

#[tokio::test]
async fn store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("reopen.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.upsert(NewLicense::named("GitHub").with_classification(model(Typology::Development, "code hosting")))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let all = s.list().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].typology, Some(Typology::Development));
}
