//! Router tests over an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use pointage_core::{
  admin::{Admin, AdminRole, PROTECTED_ADMIN_ID},
  store::AttendanceStore,
};
use pointage_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{
  AppState, JwtConfig,
  auth::{Claims, password::hash_password},
  router,
};

const SUPER_PASSWORD: &str = "superpass";

struct Harness {
  app:   Router,
  state: AppState<SqliteStore>,
}

impl Harness {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .bootstrap_superadmin("superadmin".into(), hash_password(SUPER_PASSWORD).unwrap())
      .await
      .unwrap();
    let state = AppState::new(Arc::new(store), JwtConfig::new("test-secret", 24));
    Self { app: router(state.clone()), state }
  }

  async fn admin(&self, id: i64) -> Admin {
    self
      .state
      .store
      .get_admin_credentials(id)
      .await
      .unwrap()
      .unwrap()
      .admin
  }

  async fn super_token(&self) -> String {
    let admin = self.admin(PROTECTED_ADMIN_ID).await;
    self.state.jwt.issue(&admin).unwrap()
  }

  /// Create a plain admin directly in the store and return a token for it.
  async fn admin_token(&self, username: &str) -> String {
    let admin = self
      .state
      .store
      .add_admin(username.into(), "unused".into(), AdminRole::Admin)
      .await
      .unwrap();
    self.state.jwt.issue(&admin).unwrap()
  }

  async fn send(
    &self,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn upload(&self, token: &str, csv: &str) -> (StatusCode, Value) {
    self.upload_file(token, "members.csv", "text/csv", csv.as_bytes()).await
  }

  async fn upload_file(
    &self,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
  ) -> (StatusCode, Value) {
    let boundary = "pointage-test-boundary";
    let mut body = format!(
      "--{boundary}\r\n\
       Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
       Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let req = Request::builder()
      .method(Method::POST)
      .uri("/import")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
      )
      .body(Body::from(body))
      .unwrap();
    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  /// Send a raw request and return the status, content type and body text.
  async fn send_raw(&self, req: Request<Body>) -> (StatusCode, String, Value) {
    let resp = self.app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_owned();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  async fn create_member(&self, token: &str, name: &str, phone: &str) -> i64 {
    let (status, body) = self
      .send(
        Method::POST,
        "/members",
        Some(token),
        Some(json!({ "name": name, "surname": "Jean", "phone": phone })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["member"]["member_id"].as_i64().unwrap()
  }

  async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
    self
      .send(
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
      )
      .await
  }
}

// ── Public routes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
  let h = Harness::new().await;
  let (status, body) = h.send(Method::GET, "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn login_returns_token_role_and_username() {
  let h = Harness::new().await;
  let (status, body) = h.login("superadmin", SUPER_PASSWORD).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["success"], true);
  assert_eq!(body["role"], "superadmin");
  assert_eq!(body["username"], "superadmin");

  let claims = h.state.jwt.verify(body["token"].as_str().unwrap()).unwrap();
  assert_eq!(claims.sub, PROTECTED_ADMIN_ID);
}

#[tokio::test]
async fn login_failures() {
  let h = Harness::new().await;

  let (status, body) = h.login("superadmin", "wrong").await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["success"], false);
  assert_eq!(body["code"], "unauthorized");

  let (status, _) = h.login("nobody", "whatever").await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) = h.login("", "").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "bad_request");
}

// ── Token checks ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
  let h = Harness::new().await;

  let (status, body) = h.send(Method::GET, "/members", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["code"], "unauthorized");

  let (status, _) = h.send(Method::GET, "/members", Some("garbage"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let now = Utc::now().timestamp();
  let expired = h.state.jwt.sign(&Claims {
    sub:      PROTECTED_ADMIN_ID,
    username: "superadmin".into(),
    role:     AdminRole::Superadmin,
    exp:      now - 300,
    iat:      now - 3900,
    jti:      Uuid::new_v4().to_string(),
  });
  let (status, _) = h.send(Method::GET, "/stats", Some(&expired), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let foreign = JwtConfig::new("other-secret", 24)
    .issue(&h.admin(PROTECTED_ADMIN_ID).await)
    .unwrap();
  let (status, _) = h.send(Method::GET, "/stats", Some(&foreign), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_role_cannot_reach_superadmin_routes() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;

  let (status, _) = h.send(Method::GET, "/members", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);

  for (method, uri) in [
    (Method::GET, "/admins"),
    (Method::POST, "/reset"),
    (Method::DELETE, "/admins/2"),
  ] {
    let (status, body) = h.send(method, uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    assert_eq!(body["code"], "forbidden");
  }
}

// ── Scenario D: change password ──────────────────────────────────────────────

#[tokio::test]
async fn change_password_verifies_old_password() {
  let h = Harness::new().await;
  let token = h.super_token().await;
  let before = h
    .state
    .store
    .get_admin_credentials(PROTECTED_ADMIN_ID)
    .await
    .unwrap()
    .unwrap()
    .password_hash;

  let (status, body) = h
    .send(
      Method::POST,
      "/change-password",
      Some(&token),
      Some(json!({ "oldPassword": "wrongOld", "newPassword": "newpass1" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "wrong_password");
  let unchanged = h
    .state
    .store
    .get_admin_credentials(PROTECTED_ADMIN_ID)
    .await
    .unwrap()
    .unwrap()
    .password_hash;
  assert_eq!(unchanged, before);

  let (status, body) = h
    .send(
      Method::POST,
      "/change-password",
      Some(&token),
      Some(json!({ "old_password": SUPER_PASSWORD, "new_password": "newpass1" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["success"], true);

  assert_eq!(h.login("superadmin", "newpass1").await.0, StatusCode::OK);
  assert_eq!(
    h.login("superadmin", SUPER_PASSWORD).await.0,
    StatusCode::UNAUTHORIZED
  );
}

#[tokio::test]
async fn change_password_rejects_short_or_missing_fields() {
  let h = Harness::new().await;
  let token = h.super_token().await;

  let (status, body) = h
    .send(
      Method::POST,
      "/change-password",
      Some(&token),
      Some(json!({ "old_password": SUPER_PASSWORD, "new_password": "12345" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "validation");

  let (status, _) = h
    .send(
      Method::POST,
      "/change-password",
      Some(&token),
      Some(json!({ "new_password": "newpass1" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Scenario E: protected admin ──────────────────────────────────────────────

#[tokio::test]
async fn protected_admin_is_never_deleted() {
  let h = Harness::new().await;
  let super_token = h.super_token().await;
  let admin_token = h.admin_token("alice").await;

  let (status, body) = h
    .send(Method::DELETE, "/admins/1", Some(&super_token), None)
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["code"], "protected_admin");

  let (status, _) = h
    .send(Method::DELETE, "/admins/1", Some(&admin_token), None)
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  assert!(
    h.state
      .store
      .get_admin_credentials(PROTECTED_ADMIN_ID)
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn superadmin_manages_admins() {
  let h = Harness::new().await;
  let token = h.super_token().await;

  let (status, body) = h
    .send(
      Method::POST,
      "/admins",
      Some(&token),
      Some(json!({ "username": "bob", "password": "bobpass" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  assert_eq!(body["admin"]["role"], "admin");
  let bob_id = body["admin"]["admin_id"].as_i64().unwrap();

  let (status, body) = h
    .send(
      Method::POST,
      "/admins",
      Some(&token),
      Some(json!({ "username": "bob", "password": "another" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "duplicate_username");

  let (status, body) = h
    .send(
      Method::POST,
      "/admins",
      Some(&token),
      Some(json!({ "username": "carol", "password": "abc" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "validation");

  let (_, list) = h.send(Method::GET, "/admins", Some(&token), None).await;
  assert_eq!(list.as_array().unwrap().len(), 2);
  assert!(list[0].get("password_hash").is_none());

  let (status, _) = h
    .send(Method::DELETE, &format!("/admins/{bob_id}"), Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = h
    .send(Method::DELETE, &format!("/admins/{bob_id}"), Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["code"], "not_found");
}

// ── Members and presence ─────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_member_is_a_client_error() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  h.create_member(&token, "Dupont", "0601020304").await;

  let (status, body) = h
    .send(
      Method::POST,
      "/members",
      Some(&token),
      Some(json!({ "name": "DUPONT ", "surname": "jean", "phone": "0699999999" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "duplicate_person");

  let (status, body) = h
    .send(
      Method::POST,
      "/members",
      Some(&token),
      Some(json!({ "name": "Martin", "surname": "Paul", "phone": "06-01" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn kiosk_search_and_toggle() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  let id = h.create_member(&token, "Dupont", "0601020304").await;

  let (status, hits) = h.send(Method::GET, "/search-members/0203", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(hits[0]["member_id"], id);
  let (_, hits) = h.send(Method::GET, "/search-members/06", None, None).await;
  assert_eq!(hits.as_array().unwrap().len(), 0);

  let (status, first) = h
    .send(
      Method::POST,
      "/pointer-by-id",
      None,
      Some(json!({ "membreId": id, "reason": "Lecture" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{first}");
  assert_eq!(first["success"], true);
  assert_eq!(first["type"], "entry");
  assert_eq!(first["member"]["affiliation"], "Membre");

  let (_, present) = h.send(Method::GET, "/present", Some(&token), None).await;
  assert_eq!(present[0]["member_id"], id);

  let (_, second) = h
    .send(Method::POST, "/pointer-by-id", None, Some(json!({ "member_id": id })))
    .await;
  assert_eq!(second["type"], "exit");

  let (_, present) = h.send(Method::GET, "/present", Some(&token), None).await;
  assert_eq!(present.as_array().unwrap().len(), 0);

  let (_, history) = h
    .send(Method::GET, "/movements?limit=1", Some(&token), None)
    .await;
  assert_eq!(history.as_array().unwrap().len(), 1);
  assert_eq!(history[0]["kind"], "exit");
  assert_eq!(history[0]["reason"], Value::Null);
}

#[tokio::test]
async fn pointer_rejects_unknown_inactive_or_missing_member() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  let id = h.create_member(&token, "Dupont", "0601020304").await;

  let (status, _) = h
    .send(Method::POST, "/pointer-by-id", None, Some(json!({ "member_id": 999 })))
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) = h
    .send(Method::POST, "/pointer-by-id", None, Some(json!({})))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "validation");

  for _ in 0..2 {
    let (status, body) = h
      .send(Method::DELETE, &format!("/members/{id}"), Some(&token), None)
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member"]["status"], "inactive");
  }
  let (status, _) = h
    .send(Method::POST, "/pointer-by-id", None, Some(json!({ "member_id": id })))
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Import / export ──────────────────────────────────────────────────────────

#[tokio::test]
async fn import_isolates_bad_rows() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;

  let csv = "Nom;Prénom;Téléphone;Lien\n\
             A;One;0600000001;Etudiant\n\
             B;Two;;\n\
             C;Three;0600000003;\n\
             D;Four;0600000004;\n\
             E;Five;0600000005;";
  let (status, report) = h.upload(&token, csv).await;
  assert_eq!(status, StatusCode::OK, "{report}");
  assert_eq!(report["importes"], 4);
  assert_eq!(report["erreurs"], 1);
  let first_error = report["errors"][0].as_str().unwrap();
  assert!(first_error.starts_with("row 3:"), "{first_error}");

  let (_, members) = h.send(Method::GET, "/members", Some(&token), None).await;
  assert_eq!(members.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn import_without_rows_is_rejected() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;

  let (status, body) = h.upload(&token, "nom,prenom,telephone").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "invalid_sheet");

  let (status, body) = h.upload(&token, "").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "bad_request");
}

async fn export(h: &Harness, token: &str, uri: &str) -> (String, String, Vec<u8>) {
  let req = Request::builder()
    .uri(uri)
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .body(Body::empty())
    .unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let header_text =
    |name: header::HeaderName| resp.headers()[name].to_str().unwrap().to_owned();
  let content_type = header_text(header::CONTENT_TYPE);
  let disposition = header_text(header::CONTENT_DISPOSITION);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (content_type, disposition, bytes.to_vec())
}

#[tokio::test]
async fn exports_default_to_workbooks() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  h.create_member(&token, "Dupont", "0601020304").await;

  let (content_type, disposition, body) = export(&h, &token, "/export/members").await;
  assert!(content_type.contains("spreadsheetml"), "{content_type}");
  assert!(disposition.contains("members.xlsx"), "{disposition}");
  assert!(body.starts_with(b"PK\x03\x04"));

  let rows = pointage_sheet::read_members(&body).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].member.name, "Dupont");
  assert_eq!(rows[0].member.phone, "0601020304");

  let (content_type, disposition, _) =
    export(&h, &token, "/export/movements").await;
  assert!(content_type.contains("spreadsheetml"));
  assert!(disposition.contains("movements.xlsx"));

  let (status, _) = h.send(Method::GET, "/export/movements", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn exports_can_be_csv() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  h.create_member(&token, "Dupont", "0601020304").await;

  let (content_type, disposition, body) =
    export(&h, &token, "/export/members?format=csv").await;
  assert!(content_type.starts_with("text/csv"));
  assert!(disposition.contains("members.csv"));
  let text = std::str::from_utf8(&body).unwrap();
  assert!(text.contains("Dupont,Jean,0601020304"));

  let (status, body) = h
    .send(Method::GET, "/export/members?format=pdf", Some(&token), None)
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn workbook_import_round_trips_an_export() {
  let source = Harness::new().await;
  let token = source.admin_token("alice").await;
  source.create_member(&token, "Dupont", "0601020304").await;
  source.create_member(&token, "Martin", "0601020305").await;
  let (_, _, workbook) = export(&source, &token, "/export/members").await;

  let target = Harness::new().await;
  let token = target.admin_token("alice").await;
  let (status, report) = target
    .upload_file(
      &token,
      "members.xlsx",
      "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
      &workbook,
    )
    .await;
  assert_eq!(status, StatusCode::OK, "{report}");
  assert_eq!(report["importes"], 2);
  assert_eq!(report["erreurs"], 0);

  let (status, body) = target
    .upload_file(&token, "broken.xlsx", "application/octet-stream", b"PK\x03\x04junk")
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], "invalid_sheet");
}

#[tokio::test]
async fn quoted_line_breaks_survive_csv_import() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;

  let csv = "nom,prenom,telephone\n\"Le\nGall\",Anne,0600000001\nBad,Row,12\n";
  let (status, report) = h.upload(&token, csv).await;
  assert_eq!(status, StatusCode::OK, "{report}");
  assert_eq!(report["importes"], 1);
  assert_eq!(report["erreurs"], 1);
  let error = report["errors"][0].as_str().unwrap();
  assert!(error.starts_with("row 4:"), "{error}");
}

// ── Malformed requests ───────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_requests_get_json_errors() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;

  let json_post = |uri: &str, body: &'static str| {
    Request::builder()
      .method(Method::POST)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body))
      .unwrap()
  };

  let cases = [
    json_post("/pointer-by-id", r#"{"member_id":"abc"}"#),
    json_post("/pointer-by-id", "not json"),
    json_post("/login", r#"{"username":5,"password":"x"}"#),
    Request::builder()
      .method(Method::POST)
      .uri("/login")
      .body(Body::from(r#"{"username":"a","password":"b"}"#))
      .unwrap(),
    Request::builder()
      .method(Method::DELETE)
      .uri("/members/abc")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty())
      .unwrap(),
    Request::builder()
      .uri("/movements?limit=lots")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty())
      .unwrap(),
    Request::builder()
      .method(Method::POST)
      .uri("/import")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .header(header::CONTENT_TYPE, "text/plain")
      .body(Body::from("nom,prenom"))
      .unwrap(),
  ];

  for req in cases {
    let target = format!("{} {}", req.method(), req.uri());
    let (status, content_type, body) = h.send_raw(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{target}");
    assert!(content_type.starts_with("application/json"), "{target}: {content_type}");
    assert_eq!(body["success"], false, "{target}");
    assert_eq!(body["code"], "bad_request", "{target}");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{target}");
  }
}

// ── Reporting and maintenance ────────────────────────────────────────────────

#[tokio::test]
async fn stats_reflect_presence() {
  let h = Harness::new().await;
  let token = h.admin_token("alice").await;
  let a = h.create_member(&token, "Dupont", "0601020304").await;
  h.create_member(&token, "Martin", "0601020305").await;
  h.send(
    Method::POST,
    "/pointer-by-id",
    None,
    Some(json!({ "member_id": a, "reason": "Lecture, Wifi" })),
  )
  .await;

  let (_, summary) = h.send(Method::GET, "/stats", Some(&token), None).await;
  assert_eq!(summary["total_members"], 2);
  assert_eq!(summary["present_now"], 1);

  let (_, top) = h
    .send(Method::GET, "/stats/top-members?limit=1", Some(&token), None)
    .await;
  assert_eq!(top.as_array().unwrap().len(), 1);
  assert_eq!(top[0]["member_id"], a);

  let (_, daily) = h
    .send(Method::GET, "/stats/daily?days=3", Some(&token), None)
    .await;
  assert_eq!(daily.as_array().unwrap().len(), 3);
  assert_eq!(daily[2]["entries"], 1);

  let (_, reasons) = h.send(Method::GET, "/stats/reasons", Some(&token), None).await;
  assert_eq!(reasons.as_array().unwrap().len(), 2);

  let (_, genders) = h.send(Method::GET, "/stats/gender", Some(&token), None).await;
  assert_eq!(genders[0]["count"], 2);
}

#[tokio::test]
async fn reset_wipes_members_for_superadmin() {
  let h = Harness::new().await;
  let token = h.super_token().await;
  h.create_member(&token, "Dupont", "0601020304").await;

  let (status, body) = h.send(Method::POST, "/reset", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["deleted"]["members"], 1);

  let (_, members) = h.send(Method::GET, "/members", Some(&token), None).await;
  assert_eq!(members.as_array().unwrap().len(), 0);
  assert_eq!(h.login("superadmin", SUPER_PASSWORD).await.0, StatusCode::OK);
}
