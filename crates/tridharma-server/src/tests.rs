use std::{path::PathBuf, sync::Arc};

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
  response::Response,
};
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use tridharma_store_sqlite::SqliteStore;
use uuid::Uuid;

use super::*;

const BOUNDARY: &str = "tridharma-test-boundary";

fn test_config() -> ServerConfig {
  let scratch = std::env::temp_dir().join(format!("tridharma-test-{}", Uuid::new_v4()));
  ServerConfig {
    host:               "127.0.0.1".to_string(),
    port:               4000,
    store_path:         PathBuf::from(":memory:"),
    jwt_secret:         "test-secret".to_string(),
    token_ttl_hours:    token::DEFAULT_TTL_HOURS,
    upload_dir:         scratch.join("uploads"),
    upload_limit_bytes: 1024 * 1024,
    chromium_path:      scratch.join("no-such-chromium"),
    open_registration:  true,
  }
}

async fn make_state_with(config: ServerConfig) -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState::new(Arc::new(store), config)
}

async fn make_state() -> AppState<SqliteStore> { make_state_with(test_config()).await }

async fn send(state: &AppState<SqliteStore>, req: Request<Body>) -> Response {
  router(state.clone()).oneshot(req).await.unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
  let mut builder = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json");
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
  Request::builder()
    .uri(uri)
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .body(Body::empty())
    .unwrap()
}

/// A part in a hand-built multipart body: `(name, file_name, bytes)`.
type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

fn multipart_request(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
  let mut body = Vec::new();
  for (name, file_name, bytes) in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match file_name {
      Some(file_name) => body.extend_from_slice(
        format!(
          "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
           Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
      ),
      None => body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
      ),
    }
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(body))
    .unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
  to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(resp: Response) -> Value {
  serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

async fn register(
  state: &AppState<SqliteStore>,
  email: &str,
  role: &str,
  prodi: Option<&str>,
  nidn: Option<&str>,
) {
  let name = email.split('@').next().unwrap_or(email);
  let resp = send(
    state,
    json_request(
      "POST",
      "/api/register",
      None,
      json!({
        "name": name, "email": email, "password": "rahasia",
        "role": role, "prodi": prodi, "nidn": nidn,
      }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
}

async fn login(state: &AppState<SqliteStore>, email: &str) -> String {
  let resp = send(
    state,
    json_request("POST", "/api/login", None, json!({ "email": email, "password": "rahasia" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn account(
  state: &AppState<SqliteStore>,
  email: &str,
  role: &str,
  prodi: Option<&str>,
  nidn: Option<&str>,
) -> String {
  register(state, email, role, prodi, nidn).await;
  login(state, email).await
}

// ── Session ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login_returns_token_and_identity() {
  let state = make_state().await;
  let resp = send(
    &state,
    json_request(
      "POST",
      "/api/register",
      None,
      json!({ "name": "Ani", "email": "ani@kampus.id", "password": "rahasia",
              "role": "admin_prodi", "prodi": "CS" }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, json!({ "ok": true, "id": 1 }));

  let resp = send(
    &state,
    json_request(
      "POST",
      "/api/login",
      None,
      json!({ "email": "ani@kampus.id", "password": "rahasia" }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = body_json(resp).await;
  assert_eq!(body["user"]["role"], "admin_prodi");
  assert_eq!(body["user"]["prodi"], "CS");
  assert!(body["user"].get("password_hash").is_none());

  let identity = state.tokens.verify(body["token"].as_str().unwrap()).unwrap();
  assert_eq!(identity.id, 1);
  assert_eq!(identity.name, "Ani");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
  let state = make_state().await;
  register(&state, "ani@kampus.id", "dosen", None, None).await;

  for body in [
    json!({ "email": "ani@kampus.id", "password": "salah" }),
    json!({ "email": "budi@kampus.id", "password": "rahasia" }),
  ] {
    let resp = send(&state, json_request("POST", "/api/login", None, body)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(resp).await["error"].is_string());
  }
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let state = make_state().await;
  register(&state, "ani@kampus.id", "dosen", None, None).await;

  let resp = send(
    &state,
    json_request(
      "POST",
      "/api/register",
      None,
      json!({ "name": "Ani", "email": "ani@kampus.id", "password": "x", "role": "dosen" }),
    ),
  )
  .await;
  assert!(resp.status().is_server_error());
}

#[tokio::test]
async fn unknown_role_is_stored_as_member() {
  let state = make_state().await;
  let token = account(&state, "siti@kampus.id", "mahasiswa", Some("CS"), None).await;

  let identity = state.tokens.verify(&token).unwrap();
  assert_eq!(identity.role.as_str(), "dosen");

  let resp = send(
    &state,
    json_request(
      "POST",
      "/api/dosen",
      Some(&token),
      json!({ "name": "Siti", "prodi": "CS", "nidn": "0099" }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn closed_registration_is_forbidden() {
  let mut config = test_config();
  config.open_registration = false;
  let state = make_state_with(config).await;

  let resp = send(
    &state,
    json_request(
      "POST",
      "/api/register",
      None,
      json!({ "name": "Ani", "email": "ani@kampus.id", "password": "x", "role": "admin_pusat" }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
  let state = make_state().await;
  for uri in ["/api/dosen", "/api/kegiatan", "/api/export/excel", "/api/export/pdf"] {
    let resp = send(&state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri} without token");

    let resp = send(&state, get(uri, "not.a.token")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri} with garbage token");
  }
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
  let state = make_state().await;
  let mut other = test_config();
  other.jwt_secret = "another-secret".to_string();
  let foreign = make_state_with(other).await;
  let token = account(&foreign, "ani@kampus.id", "admin_pusat", None, None).await;

  let resp = send(&state, get("/api/dosen", &token)).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ── Dosen ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_admins_create_faculty() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), Some("0011")).await;
  let admin = account(&state, "pusat@kampus.id", "admin_pusat", None, None).await;
  let dosen = json!({ "name": "Budi", "prodi": "CS", "nidn": "0011" });

  let resp = send(&state, json_request("POST", "/api/dosen", Some(&member), dosen.clone())).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let resp = send(&state, json_request("POST", "/api/dosen", Some(&admin), dosen)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, json!({ "ok": true, "id": 1 }));
}

#[tokio::test]
async fn faculty_missing_field_is_bad_request() {
  let state = make_state().await;
  let admin = account(&state, "pusat@kampus.id", "admin_pusat", None, None).await;

  let resp = send(
    &state,
    json_request("POST", "/api/dosen", Some(&admin), json!({ "name": "Budi", "prodi": "CS" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn faculty_listing_is_scoped_by_role() {
  let state = make_state().await;
  let pusat = account(&state, "pusat@kampus.id", "admin_pusat", None, None).await;
  let prodi = account(&state, "kaprodi@kampus.id", "admin_prodi", Some("CS"), None).await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), Some("0011")).await;

  for (name, dept, nidn) in [("Budi", "CS", "0011"), ("Citra", "CS", "0012"), ("Dewi", "EE", "0021")] {
    let body = json!({ "name": name, "prodi": dept, "nidn": nidn });
    let resp = send(&state, json_request("POST", "/api/dosen", Some(&pusat), body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let names = |v: Value| -> Vec<String> {
    v.as_array()
      .unwrap()
      .iter()
      .map(|r| r["name"].as_str().unwrap().to_string())
      .collect()
  };

  let all = body_json(send(&state, get("/api/dosen", &pusat)).await).await;
  assert_eq!(names(all), ["Budi", "Citra", "Dewi"]);

  let cs = body_json(send(&state, get("/api/dosen", &prodi)).await).await;
  assert_eq!(names(cs), ["Budi", "Citra"]);

  let own = body_json(send(&state, get("/api/dosen", &member)).await).await;
  assert_eq!(names(own.clone()), ["Budi"]);
  assert_eq!(own[0]["nidn"], "0011");
}

// ── Kegiatan ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn activity_owner_comes_from_token() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), Some("0011")).await;

  let body = json!({ "type": "penelitian", "judul": "Graf", "user_id": 99, "user_name": "Eve" });
  let resp = send(&state, json_request("POST", "/api/kegiatan", Some(&member), body)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["ok"], true);

  let list = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  let rows = list.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["user_name"], "budi");
  assert_eq!(rows[0]["user_id"], 1);
  assert!(rows[0]["prodi"].is_null());
  assert_eq!(rows[0]["type"], "penelitian");
  assert_eq!(rows[0]["data"]["judul"], "Graf");
  assert!(rows[0]["file_path"].is_null());
}

#[tokio::test]
async fn activity_without_type_is_bad_request() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let resp = send(
    &state,
    json_request("POST", "/api/kegiatan", Some(&member), json!({ "judul": "Graf" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn activity_listing_is_scoped_and_newest_first() {
  let state = make_state().await;
  let pusat = account(&state, "pusat@kampus.id", "admin_pusat", None, None).await;
  let prodi = account(&state, "kaprodi@kampus.id", "admin_prodi", Some("CS"), None).await;
  let budi = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;
  let dewi = account(&state, "dewi@kampus.id", "dosen", Some("EE"), None).await;

  let posts = [(&budi, "CS", "satu"), (&dewi, "EE", "dua"), (&budi, "CS", "tiga")];
  for (token, dept, judul) in posts {
    let body = json!({ "type": "pengabdian", "prodi": dept, "judul": judul });
    let resp = send(&state, json_request("POST", "/api/kegiatan", Some(token), body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let titles = |v: Value| -> Vec<String> {
    v.as_array()
      .unwrap()
      .iter()
      .map(|r| r["data"]["judul"].as_str().unwrap().to_string())
      .collect()
  };

  let all = body_json(send(&state, get("/api/kegiatan", &pusat)).await).await;
  assert_eq!(titles(all), ["tiga", "dua", "satu"]);

  let cs = body_json(send(&state, get("/api/kegiatan", &prodi)).await).await;
  assert_eq!(titles(cs), ["tiga", "satu"]);

  let mine = body_json(send(&state, get("/api/kegiatan", &dewi)).await).await;
  assert_eq!(titles(mine), ["dua"]);
}

#[tokio::test]
async fn multipart_activity_stores_attachment() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let resp = send(
    &state,
    multipart_request(
      "/api/kegiatan",
      &member,
      &[
        ("type", None, b"publikasi".as_slice()),
        ("judul", None, b"Jurnal".as_slice()),
        ("file", Some("artikel.pdf"), b"%PDF-1.4 test".as_slice()),
      ],
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let list = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  let row = &list[0];
  assert_eq!(row["type"], "publikasi");
  assert_eq!(row["data"]["judul"], "Jurnal");
  let path = row["file_path"].as_str().unwrap().to_string();
  assert!(path.starts_with("/uploads/") && path.ends_with(".pdf"));

  let resp = send(&state, Request::builder().uri(&path).body(Body::empty()).unwrap()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_bytes(resp).await, b"%PDF-1.4 test");

  std::fs::remove_dir_all(&state.config.upload_dir).ok();
}

fn upload_dir_is_empty(state: &AppState<SqliteStore>) -> bool {
  match std::fs::read_dir(&state.config.upload_dir) {
    Ok(mut entries) => entries.next().is_none(),
    Err(e) => e.kind() == std::io::ErrorKind::NotFound,
  }
}

#[tokio::test]
async fn rejected_multipart_activity_leaves_no_file() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let resp = send(
    &state,
    multipart_request(
      "/api/kegiatan",
      &member,
      &[
        ("judul", None, b"Tanpa tipe".as_slice()),
        ("file", Some("artikel.pdf"), b"%PDF-1.4 test".as_slice()),
      ],
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(upload_dir_is_empty(&state));

  let list = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  assert_eq!(list, json!([]));

  std::fs::remove_dir_all(&state.config.upload_dir).ok();
}

#[tokio::test]
async fn second_file_part_is_rejected() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let resp = send(
    &state,
    multipart_request(
      "/api/kegiatan",
      &member,
      &[
        ("type", None, b"publikasi".as_slice()),
        ("file", Some("satu.pdf"), b"one".as_slice()),
        ("file", Some("dua.pdf"), b"two".as_slice()),
      ],
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(upload_dir_is_empty(&state));

  let list = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn activity_without_prodi_is_hidden_from_department_admin() {
  let state = make_state().await;
  let prodi = account(&state, "kaprodi@kampus.id", "admin_prodi", Some("CS"), None).await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let body = json!({ "type": "penelitian", "judul": "tanpa prodi" });
  let resp = send(&state, json_request("POST", "/api/kegiatan", Some(&member), body)).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let cs = body_json(send(&state, get("/api/kegiatan", &prodi)).await).await;
  assert_eq!(cs, json!([]));

  let mine = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  assert!(mine[0]["prodi"].is_null());
}

#[tokio::test]
async fn activity_listing_honours_if_none_match() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;
  let body = json!({ "type": "penelitian" });
  send(&state, json_request("POST", "/api/kegiatan", Some(&member), body.clone())).await;

  let resp = send(&state, get("/api/kegiatan", &member)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let etag = resp.headers()[header::ETAG].to_str().unwrap().to_string();

  let mut req = get("/api/kegiatan", &member);
  req.headers_mut().insert(header::IF_NONE_MATCH, etag.parse().unwrap());
  let resp = send(&state, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
  assert!(body_bytes(resp).await.is_empty());

  send(&state, json_request("POST", "/api/kegiatan", Some(&member), body)).await;
  let mut req = get("/api/kegiatan", &member);
  req.headers_mut().insert(header::IF_NONE_MATCH, etag.parse().unwrap());
  let resp = send(&state, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_ne!(resp.headers()[header::ETAG].to_str().unwrap(), etag);
}

// ── Import / export ───────────────────────────────────────────────────────────

fn import_workbook() -> Vec<u8> {
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  for (col, key) in ["type", "judul", "tahun"].iter().enumerate() {
    sheet.write_string(0, col as u16, *key).unwrap();
  }
  sheet.write_string(1, 0, "pengabdian").unwrap();
  sheet.write_string(1, 1, "Desa Binaan").unwrap();
  sheet.write_number(1, 2, 2024).unwrap();
  sheet.write_string(2, 1, "Tanpa Tipe").unwrap();
  sheet.write_number(2, 2, 2023).unwrap();
  workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn excel_import_creates_owned_activities() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;

  let workbook = import_workbook();
  let resp = send(
    &state,
    multipart_request(
      "/api/import/excel",
      &member,
      &[("file", Some("data.xlsx"), workbook.as_slice())],
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let report = body_json(resp).await;
  assert_eq!(report["ok"], true);
  assert_eq!(report["imported"], 2);
  assert_eq!(report["failed"], json!([]));

  let list = body_json(send(&state, get("/api/kegiatan", &member)).await).await;
  let rows = list.as_array().unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0]["type"], "penelitian");
  assert_eq!(rows[0]["data"]["tahun"], 2023);
  assert_eq!(rows[1]["type"], "pengabdian");
  assert!(rows.iter().all(|r| r["user_name"] == "budi" && r["prodi"] == "CS"));
}

#[tokio::test]
async fn excel_import_without_file_is_bad_request() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", None, None).await;

  let resp = send(
    &state,
    multipart_request("/api/import/excel", &member, &[("note", None, b"lupa".as_slice())]),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(body_json(resp).await["error"], "No file");
}

#[tokio::test]
async fn excel_import_of_garbage_is_bad_request() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", None, None).await;

  let resp = send(
    &state,
    multipart_request(
      "/api/import/excel",
      &member,
      &[("file", Some("x.xlsx"), b"not a workbook".as_slice())],
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn excel_export_matches_visible_rows() {
  let state = make_state().await;
  let prodi = account(&state, "kaprodi@kampus.id", "admin_prodi", Some("CS"), None).await;
  let budi = account(&state, "budi@kampus.id", "dosen", Some("CS"), None).await;
  let dewi = account(&state, "dewi@kampus.id", "dosen", Some("EE"), None).await;

  for (token, dept) in [(&budi, "CS"), (&dewi, "EE")] {
    let body = json!({ "type": "penelitian", "prodi": dept, "judul": "X" });
    send(&state, json_request("POST", "/api/kegiatan", Some(token), body)).await;
  }

  let resp = send(&state, get("/api/export/excel", &prodi)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(
    resp.headers()[header::CONTENT_DISPOSITION]
      .to_str()
      .unwrap()
      .contains(".xlsx")
  );

  let rows = tridharma_transfer::spreadsheet::read_rows(&body_bytes(resp).await).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["user_name"], "budi");
  assert_eq!(rows[0]["prodi"], "CS");
  let data: Value = serde_json::from_str(rows[0]["data"].as_str().unwrap()).unwrap();
  assert_eq!(data["judul"], "X");
}

#[tokio::test]
async fn pdf_export_without_renderer_is_server_error() {
  let state = make_state().await;
  let member = account(&state, "budi@kampus.id", "dosen", None, None).await;

  let resp = send(&state, get("/api/export/pdf", &member)).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body_json(resp).await["error"].is_string());
}
