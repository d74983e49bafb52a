//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveTime, TimeZone, Utc};
use freshet_core::{
  Error as CoreError,
  entity::NewSite,
  error::RefKind,
  store::SurveyStore as _,
  submission::{
    DeviceLink, DeviceRef, EnvelopeFacts, GaugeFacts, PersonaLink, PersonaRef,
    ProfileRef, RiverFacts, SampleEntry, SampleGroup, Submission,
    VegetationContext, VegetationLink, VegetationRef, VisitFacts, WeatherFacts,
  },
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Seed one water body with one site and return the site id.
async fn seed_site(store: &SqliteStore) -> i64 {
  let water_body = store
    .add_water_body("Rio Claro".into())
    .await
    .expect("water body");
  store
    .add_site(NewSite {
      name:          "Puente Norte".into(),
      abbreviation:  Some("PN".into()),
      water_body_id: water_body.id,
    })
    .await
    .expect("site")
    .id
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn submission(site_id: i64) -> Submission {
  Submission {
    site_id,
    visit: VisitFacts {
      number:            4,
      season:            Some("autumn".into()),
      hydrological_year: Some("2023-2024".into()),
    },
    envelope: EnvelopeFacts {
      arrival_time:   Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap(),
      departure_time: Utc.with_ymd_and_hms(2024, 5, 14, 13, 0, 0).unwrap(),
      latitude:       -33.45,
      longitude:      -70.66,
      observations:   Some("clear access".into()),
    },
    weather: WeatherFacts {
      air_temp:      14.5,
      cloudiness:    "overcast".into(),
      wind_status:   "light".into(),
      wind_velocity: 8.0,
      precipitation: "none".into(),
    },
    gauge: GaugeFacts {
      gauge:         1.2,
      area:          3.4,
      average_speed: 0.8,
      width:         5.5,
      depth_factor:  0.6,
      observations:  None,
    },
    river: RiverFacts { status: "normal".into(), water_color: "clear".into() },
    devices: vec![],
    device_links: vec![],
    personas: vec![],
    persona_links: vec![],
    profiles: vec![],
    sample_groups: vec![],
    vegetation: vec![],
    vegetation_links: vec![],
  }
}

fn device(id: i64, make: &str) -> DeviceRef {
  DeviceRef {
    id,
    make: make.into(),
    model: "ProDSS".into(),
    owner: "lab".into(),
  }
}

fn persona(id: i64, first_name: &str) -> PersonaRef {
  PersonaRef {
    id,
    first_name: first_name.into(),
    last_name: "Rios".into(),
    id_document: format!("DOC-{id}"),
    affiliation: "university".into(),
  }
}

fn profile(id: i64, site_id: i64, code: &str) -> ProfileRef {
  ProfileRef {
    id,
    site_id,
    code: code.into(),
    mix_criteria: Some("temperature".into()),
    mix_notes: None,
    stratification_criteria: None,
    stratification_notes: None,
  }
}

fn sample(number: i64, profile_id: i64) -> SampleEntry {
  SampleEntry {
    number,
    time: NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
    profile_id,
    observations: None,
    laboratory: None,
  }
}

// ─── Envelope writes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_writes_one_envelope_graph() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut sub = submission(site_id);
  sub.profiles.push(profile(1, site_id, "P1"));
  sub.sample_groups.push(SampleGroup {
    depth:   0.5,
    samples: vec![sample(1, 1), sample(2, 1)],
  });
  sub
    .sample_groups
    .push(SampleGroup { depth: 1.5, samples: vec![sample(3, 1)] });

  let receipt = s.ingest(sub).await.unwrap();
  assert_eq!(receipt.records, 2);
  assert_eq!(receipt.samples, 3);

  let view = s
    .get_survey(receipt.record_metadata_id)
    .await
    .unwrap()
    .expect("survey view");
  assert_eq!(view.visit.number, 4);
  assert_eq!(view.visit.date, view.metadata.arrival_time);
  assert_eq!(view.weather.cloudiness, "overcast");
  assert_eq!(view.gauge.depth_factor, 0.6);
  assert_eq!(view.river.record_metadata_id, receipt.record_metadata_id);
  assert_eq!(view.river.site_id, site_id);
  assert_eq!(view.records.len(), 2);
  assert_eq!(view.records[0].record.depth, 0.5);
  assert_eq!(view.records[0].samples.len(), 2);
  assert_eq!(view.records[1].samples.len(), 1);

  let all = s.list_surveys().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].record_metadata_id, receipt.record_metadata_id);
  assert_eq!(all[0].site_id, site_id);
}

#[tokio::test]
async fn get_survey_missing_returns_none() {
  let s = store().await;
  assert!(s.get_survey(42).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_site_is_rejected() {
  let s = store().await;
  let err = s.ingest(submission(999)).await.unwrap_err();
  assert!(matches!(err, Error::UnknownSite(999)));
  assert!(s.list_surveys().await.unwrap().is_empty());
}

// ─── Reference resolution ────────────────────────────────────────────────────

#[tokio::test]
async fn existing_device_is_reused_and_never_updated() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut first = submission(site_id);
  first.devices.push(device(7, "YSI"));
  first
    .device_links
    .push(DeviceLink { device_id: 7, category: "multiparameter".into() });
  let r1 = s.ingest(first).await.unwrap();
  assert_eq!(r1.created_refs, 1);

  // Same device id, different attributes: the stored row must not change.
  let mut second = submission(site_id);
  second.devices.push(device(7, "Hanna"));
  second
    .device_links
    .push(DeviceLink { device_id: 7, category: "turbidity".into() });
  let r2 = s.ingest(second).await.unwrap();
  assert_eq!(r2.created_refs, 0);
  assert_eq!(r2.reused_refs, 1);

  let stored = s.get_device(7).await.unwrap().expect("device 7");
  assert_eq!(stored.make, "YSI");
}

#[tokio::test]
async fn duplicated_listing_resolves_to_one_row() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  // The same new device id listed twice, linked twice: one row, two links,
  // and both resolutions must land on the same id.
  let mut sub = submission(site_id);
  sub.devices.push(device(7, "YSI"));
  sub.devices.push(device(7, "Hanna"));
  sub
    .device_links
    .push(DeviceLink { device_id: 7, category: "multiparameter".into() });
  sub
    .device_links
    .push(DeviceLink { device_id: 7, category: "backup".into() });

  let receipt = s.ingest(sub).await.unwrap();
  assert_eq!(receipt.created_refs, 1);
  assert_eq!(receipt.reused_refs, 0);
  assert_eq!(receipt.device_links, 2);

  let view = s
    .get_survey(receipt.record_metadata_id)
    .await
    .unwrap()
    .expect("survey view");
  assert_eq!(view.devices.len(), 2);
  assert!(view.devices.iter().all(|d| d.device.id == 7));
  // First occurrence won.
  assert!(view.devices.iter().all(|d| d.device.make == "YSI"));
}

#[tokio::test]
async fn profile_attributes_follow_first_write() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut first = submission(site_id);
  first.profiles.push(profile(1, site_id, "P1"));
  first
    .sample_groups
    .push(SampleGroup { depth: 0.5, samples: vec![sample(1, 1)] });
  s.ingest(first).await.unwrap();

  let mut second = submission(site_id);
  let mut changed = profile(1, site_id, "P1-changed");
  changed.mix_criteria = Some("conductivity".into());
  second.profiles.push(changed);
  second
    .sample_groups
    .push(SampleGroup { depth: 1.0, samples: vec![sample(1, 1)] });
  let r2 = s.ingest(second).await.unwrap();
  assert_eq!(r2.reused_refs, 1);

  let stored = s.get_profile(1).await.unwrap().expect("profile 1");
  assert_eq!(stored.code, "P1");
  assert_eq!(stored.mix_criteria.as_deref(), Some("temperature"));
}

#[tokio::test]
async fn vegetation_natural_key_is_per_context() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  // The same name in both strata is two distinct rows in two tables.
  let mut sub = submission(site_id);
  sub.vegetation.push(VegetationRef {
    id:      1,
    name:    "Reed".into(),
    context: VegetationContext::Shore,
  });
  sub.vegetation.push(VegetationRef {
    id:      2,
    name:    "Reed".into(),
    context: VegetationContext::Water,
  });
  sub.vegetation_links.push(VegetationLink { vegetation_id: 1 });
  sub.vegetation_links.push(VegetationLink { vegetation_id: 2 });

  let receipt = s.ingest(sub).await.unwrap();
  assert_eq!(receipt.created_refs, 2);
  assert_eq!(receipt.vegetation_links, 2);

  let view = s
    .get_survey(receipt.record_metadata_id)
    .await
    .unwrap()
    .expect("survey view");
  assert_eq!(view.shore_vegetation.len(), 1);
  assert_eq!(view.water_vegetation.len(), 1);

  let shore = s
    .find_vegetation(VegetationContext::Shore, "Reed")
    .await
    .unwrap()
    .expect("shore reed");
  let water = s
    .find_vegetation(VegetationContext::Water, "Reed")
    .await
    .unwrap()
    .expect("water reed");
  assert_eq!(shore.name, "Reed");
  assert_eq!(water.name, "Reed");
}

#[tokio::test]
async fn vegetation_row_is_shared_across_submissions() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut first = submission(site_id);
  first.vegetation.push(VegetationRef {
    id:      1,
    name:    "Reed".into(),
    context: VegetationContext::Shore,
  });
  first.vegetation_links.push(VegetationLink { vegetation_id: 1 });
  s.ingest(first).await.unwrap();

  let mut second = submission(site_id);
  second.vegetation.push(VegetationRef {
    id:      9,
    name:    "Reed".into(),
    context: VegetationContext::Shore,
  });
  second.vegetation_links.push(VegetationLink { vegetation_id: 9 });
  let r2 = s.ingest(second).await.unwrap();
  assert_eq!(r2.created_refs, 0);
  assert_eq!(r2.reused_refs, 1);

  let reed = s
    .find_vegetation(VegetationContext::Shore, "Reed")
    .await
    .unwrap()
    .expect("shore reed");
  let view = s
    .get_survey(r2.record_metadata_id)
    .await
    .unwrap()
    .expect("survey view");
  assert_eq!(view.shore_vegetation[0].id, reed.id);
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unmatched_vegetation_link_rolls_back_everything() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut sub = submission(site_id);
  sub.devices.push(device(7, "YSI"));
  sub
    .device_links
    .push(DeviceLink { device_id: 7, category: "multiparameter".into() });
  // Link names vegetation id 99, which the submission never lists.
  sub.vegetation_links.push(VegetationLink { vegetation_id: 99 });

  let err = s.ingest(sub).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::UnresolvedReference {
      kind: RefKind::Vegetation,
      id:   99,
    })
  ));

  // Nothing from the submission may survive, including the envelope rows
  // and the device staged before the linker failed.
  assert!(s.list_surveys().await.unwrap().is_empty());
  assert!(s.get_device(7).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_sample_profile_rolls_back_everything() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut sub = submission(site_id);
  sub
    .sample_groups
    .push(SampleGroup { depth: 0.5, samples: vec![sample(1, 5)] });

  let err = s.ingest(sub).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::UnresolvedReference {
      kind: RefKind::Profile,
      id:   5,
    })
  ));
  assert!(s.list_surveys().await.unwrap().is_empty());
}

#[tokio::test]
async fn unmatched_device_link_rolls_back_everything() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut sub = submission(site_id);
  sub
    .device_links
    .push(DeviceLink { device_id: 7, category: "multiparameter".into() });

  let err = s.ingest(sub).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::UnresolvedReference {
      kind: RefKind::Device,
      id:   7,
    })
  ));
  assert!(s.list_surveys().await.unwrap().is_empty());
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_submissions_share_one_persona_row() {
  let s = store().await;
  let site_id = seed_site(&s).await;
  let s2 = s.clone();

  let mut a = submission(site_id);
  a.personas.push(persona(3, "Ana"));
  a.persona_links.push(PersonaLink { persona_id: 3, role: "lead".into() });

  let mut b = submission(site_id);
  b.personas.push(persona(3, "Beto"));
  b.persona_links
    .push(PersonaLink { persona_id: 3, role: "assistant".into() });

  let (ra, rb) = tokio::join!(s.ingest(a), s2.ingest(b));
  let ra = ra.unwrap();
  let rb = rb.unwrap();

  // Exactly one submission created the persona; the other reused it.
  assert_eq!(ra.created_refs + rb.created_refs, 1);
  assert_eq!(ra.reused_refs + rb.reused_refs, 1);

  let stored = s.get_persona(3).await.unwrap().expect("persona 3");
  assert!(stored.first_name == "Ana" || stored.first_name == "Beto");

  for id in [ra.record_metadata_id, rb.record_metadata_id] {
    let view = s.get_survey(id).await.unwrap().expect("survey view");
    assert_eq!(view.crew.len(), 1);
    assert_eq!(view.crew[0].persona.id, 3);
  }
}

// ─── End-to-end scenario ─────────────────────────────────────────────────────

#[tokio::test]
async fn single_visit_scenario_commits_together() {
  let s = store().await;
  let site_id = seed_site(&s).await;

  let mut sub = submission(site_id);
  sub.devices.push(device(7, "YSI"));
  sub
    .device_links
    .push(DeviceLink { device_id: 7, category: "multiparameter".into() });
  sub.profiles.push(profile(1, site_id, "P1"));
  sub
    .sample_groups
    .push(SampleGroup { depth: 1.2, samples: vec![sample(1, 1)] });
  sub.vegetation.push(VegetationRef {
    id:      1,
    name:    "Reed".into(),
    context: VegetationContext::Shore,
  });
  sub.vegetation_links.push(VegetationLink { vegetation_id: 1 });

  let receipt = s.ingest(sub).await.unwrap();
  assert_eq!(receipt.records, 1);
  assert_eq!(receipt.samples, 1);
  assert_eq!(receipt.device_links, 1);
  assert_eq!(receipt.persona_links, 0);
  assert_eq!(receipt.vegetation_links, 1);
  assert_eq!(receipt.created_refs, 3); // device, profile, vegetation

  let view = s
    .get_survey(receipt.record_metadata_id)
    .await
    .unwrap()
    .expect("survey view");
  assert_eq!(view.devices.len(), 1);
  assert_eq!(view.devices[0].device.id, 7);
  assert_eq!(view.devices[0].category, "multiparameter");
  assert!(view.crew.is_empty());
  assert_eq!(view.records.len(), 1);
  assert_eq!(view.records[0].record.depth, 1.2);
  assert_eq!(view.records[0].samples[0].profile_id, 1);
  assert_eq!(view.shore_vegetation.len(), 1);
  assert_eq!(view.shore_vegetation[0].name, "Reed");
  assert!(view.water_vegetation.is_empty());

  assert!(s.get_device(7).await.unwrap().is_some());
  assert_eq!(s.get_profile(1).await.unwrap().expect("profile").code, "P1");
  assert!(
    s.find_vegetation(VegetationContext::Shore, "Reed")
      .await
      .unwrap()
      .is_some()
  );
  assert!(
    s.find_vegetation(VegetationContext::Water, "Reed")
      .await
      .unwrap()
      .is_none()
  );
}
