//! Handler-level tests against an in-memory store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use freshet_core::{
  entity::NewSite,
  store::SurveyStore as _,
  submission::{
    EnvelopeFacts, GaugeFacts, RiverFacts, Submission, VegetationLink,
    VisitFacts, WeatherFacts,
  },
};
use freshet_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{AppState, router};

async fn app() -> (Router, i64) {
  let store = SqliteStore::open_in_memory().await.expect("store");
  let water_body = store
    .add_water_body("Rio Claro".into())
    .await
    .expect("water body");
  let site = store
    .add_site(NewSite {
      name:          "Puente Norte".into(),
      abbreviation:  None,
      water_body_id: water_body.id,
    })
    .await
    .expect("site");
  (router(AppState { store }), site.id)
}

fn submission(site_id: i64) -> Submission {
  Submission {
    site_id,
    visit: VisitFacts {
      number:            1,
      season:            None,
      hydrological_year: None,
    },
    envelope: EnvelopeFacts {
      arrival_time:   Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap(),
      departure_time: Utc.with_ymd_and_hms(2024, 5, 14, 13, 0, 0).unwrap(),
      latitude:       -33.45,
      longitude:      -70.66,
      observations:   None,
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

fn post_surveys(body: &Submission) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/surveys")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(serde_json::to_string(body).unwrap()))
    .unwrap()
}

#[tokio::test]
async fn post_survey_returns_created() {
  let (app, site_id) = app().await;
  let response = app.oneshot(post_surveys(&submission(site_id))).await.unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn unmatched_vegetation_link_is_unprocessable() {
  let (app, site_id) = app().await;
  let mut sub = submission(site_id);
  sub.vegetation_links.push(VegetationLink { vegetation_id: 99 });

  let response = app.oneshot(post_surveys(&sub)).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_survey_is_not_found() {
  let (app, _) = app().await;
  let request = Request::builder()
    .method("GET")
    .uri("/surveys/999")
    .body(Body::empty())
    .unwrap();

  let response = app.oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
