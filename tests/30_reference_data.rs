mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};

async fn seed_base(pool: &sqlx::PgPool, base_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO base_mapping (base_id, iata, icao, fbo_name, city, state, active, base_time_zone)
        VALUES ($1, 'LAS', 'KLAS', 'Signature LAS', 'Las Vegas', 'NV', true, 'America/Los_Angeles')
        ON CONFLICT (base_id) DO NOTHING
        "#,
    )
    .bind(base_id)
    .execute(pool)
    .await?;
    Ok(())
}

fn register(email: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/base-email")
        .header("x-client-id", common::ADMIN_ID)
        .header("x-client-secret", common::ADMIN_SECRET)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": email }).to_string()))
        .unwrap()
}

fn unique_email() -> String {
    format!("Ops.{}@Example.com", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn base_mapping_lists_seeded_bases() -> Result<()> {
    let Some((app, state)) = common::db_app().await? else { return Ok(()) };
    let base_id = format!("T{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    seed_base(&state.pool, &base_id).await?;

    let res = common::get(&app, "/base-mapping", None).await?;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    let bases = body["bases"].as_array().unwrap();
    assert_eq!(body["count"], bases.len());
    let seeded = bases.iter().find(|b| b["base_id"] == base_id.as_str()).unwrap();
    assert_eq!(seeded["icao"], "KLAS");
    assert_eq!(seeded["active"], true);
    Ok(())
}

#[tokio::test]
async fn reservation_view_includes_base_details() -> Result<()> {
    let Some((app, state)) = common::db_app().await? else { return Ok(()) };
    let base_id = format!("T{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    seed_base(&state.pool, &base_id).await?;
    let no = common::unique_reservation("R-BASE");

    let mut body = common::consent_body(&no, b"sig");
    body["reservation"]["baseId"] = json!(base_id);
    let res = common::post(&app, "/consents", Some(&common::token()), &body).await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let view = common::get(&app, &format!("/consents?reservationId={}", no), None).await?.json();
    assert_eq!(view["reservation"]["baseId"], base_id.as_str());
    assert_eq!(view["baseDetails"]["fboName"], "Signature LAS");
    assert_eq!(view["baseDetails"]["baseTimeZone"], "America/Los_Angeles");

    let no = common::unique_reservation("R-NOBASE");
    let mut body = common::consent_body(&no, b"sig");
    body["reservation"]["baseId"] = json!("ZZZ-UNKNOWN");
    common::post(&app, "/consents", Some(&common::token()), &body).await?;
    let view = common::get(&app, &format!("/consents?reservationId={}", no), None).await?.json();
    assert_eq!(view["baseDetails"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn email_registration_is_idempotent() -> Result<()> {
    let Some((app, _state)) = common::db_app().await? else { return Ok(()) };
    let email = unique_email();

    let res = common::send(&app, register(&email)).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["email"], email.to_lowercase());
    assert!(body["data"]["createdAt"].is_string());

    let res = common::send(&app, register(&email.to_uppercase())).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Email already exists");
    Ok(())
}

#[tokio::test]
async fn preferences_require_registration() -> Result<()> {
    let Some((app, _state)) = common::db_app().await? else { return Ok(()) };
    let token = common::token_for(&unique_email());

    let res = common::get(&app, "/base-preferences", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Email not found or not configured");

    let res = common::post(&app, "/base-preferences", Some(&token), &json!({ "basePreferences": ["LAS"] })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Email not found. Contact admin to add your email first.");
    Ok(())
}

#[tokio::test]
async fn preferences_round_trip_for_registered_email() -> Result<()> {
    let Some((app, _state)) = common::db_app().await? else { return Ok(()) };
    let email = unique_email();
    common::send(&app, register(&email)).await?;
    let token = common::token_for(&email);

    let res = common::get(&app, "/base-preferences", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["basePreferences"], json!([]));

    let res = common::post(
        &app,
        "/base-preferences",
        Some(&token),
        &json!({ "basePreferences": ["LAS", " TEB ", ""] }),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["email"], email.to_lowercase());
    assert_eq!(body["data"]["basePreferences"], json!(["LAS", "TEB"]));

    let res = common::get(&app, "/base-preferences", Some(&token)).await?;
    assert_eq!(res.json()["basePreferences"], json!(["LAS", "TEB"]));
    Ok(())
}
