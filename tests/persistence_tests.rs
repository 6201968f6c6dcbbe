// tests/persistence_tests.rs
//
// These tests need a running Postgres. Set DATABASE_URL to run them; each
// test creates its own schema from tests/fixtures/schema.sql.

use jsonwebtoken::{EncodingKey, Header, encode};
use question_wizard_admin::{config::Config, routes, state::AppState, utils::jwt::Claims};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const TEST_SECRET: &str = "test_secret_for_integration_tests";
const PARKING_OFFSET: i64 = 100_000;

static SCHEMA_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TestApp {
    address: String,
    pool: PgPool,
    client: reqwest::Client,
}

fn unique_schema() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!(
        "wizard_test_{}_{}_{}",
        std::process::id(),
        nanos,
        SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Spawns the app against a fresh schema, or returns `None` when no database
/// is configured.
async fn spawn_app() -> Option<TestApp> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping persistence test");
        return None;
    };

    // 1. Create an isolated schema
    let admin_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");
    let schema = unique_schema();
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test schema");

    // 2. Create a pool scoped to it and load the tables
    let options = database_url
        .parse::<PgConnectOptions>()
        .expect("Invalid DATABASE_URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .expect("Failed to connect test pool");
    sqlx::raw_sql(include_str!("fixtures/schema.sql"))
        .execute(&pool)
        .await
        .expect("Failed to create test tables");

    // 3. Create test configuration and state
    let config = Config {
        activity_database_url: database_url.clone(),
        book_database_url: database_url,
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        cors_origins: Vec::new(),
        db_connection_limit: 4,
        body_size_limit_mb: 1,
    };
    let state = AppState {
        activity_pool: pool.clone(),
        book_pool: pool.clone(),
        config,
    };

    // 4. Bind to port 0 and serve in the background
    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    })
}

fn token(id: i64, role: &str) -> String {
    let exp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap() + Duration::from_secs(600);
    encode(
        &Header::default(),
        &Claims {
            id,
            role: role.to_string(),
            exp: exp.as_secs() as usize,
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

impl TestApp {
    async fn activity(&self, owner: i64) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO etkinlikler (ad, olusturan_id, durum) VALUES ('Hayvanlar', $1, 'taslak') RETURNING id",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    async fn book(&self) -> i64 {
        sqlx::query_scalar("INSERT INTO kitaplar (ad) VALUES ('Unite 1') RETURNING id")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.address, path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.expect("Failed to execute request")
    }

    /// Creates a question and returns its id.
    async fn create(&self, path: &str, token: &str, body: Value) -> i64 {
        let response = self.send(reqwest::Method::POST, path, token, Some(body)).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().expect("id in response")
    }

    async fn question_number(&self, question_id: i64) -> i64 {
        sqlx::query_scalar("SELECT soru_numarasi::bigint FROM etkinlik_sorulari WHERE id = $1")
            .bind(question_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

fn grouping() -> Value {
    json!({ "type": "gruplama", "options": [{ "text": "elma", "category": "meyve" }] })
}

#[tokio::test]
async fn create_stores_options_and_first_correct_answer() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(7).await;
    let teacher = token(7, "ogretmen");
    let path = format!("/api/activities/{}/questions", activity);

    let id = app
        .create(
            &path,
            &teacher,
            json!({
                "type": "dinle_sec",
                "audio": "sesler/kedi.mp3",
                "image": "play.png",
                "options": [
                    { "text": "köpek" },
                    { "secenek_metni": "kedi", "dogru_cevap": 1 },
                    { "text": "kuş", "is_correct": true }
                ]
            }),
        )
        .await;

    let options: Vec<(i64, Option<String>, i16)> = sqlx::query_as(
        "SELECT id, secenek_metni, dogru_cevap FROM soru_secenekleri WHERE soru_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&app.pool)
    .await
    .unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(options[1].1.as_deref(), Some("kedi"));
    assert_eq!(options.iter().map(|o| o.2).collect::<Vec<_>>(), vec![0, 1, 1]);

    let answer: Option<i64> =
        sqlx::query_scalar("SELECT dogru_cevap_id FROM etkinlik_sorulari WHERE id = $1")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(answer, Some(options[1].0));
    assert_eq!(app.question_number(id).await, 1);

    // The activity takes the first question's type and becomes active.
    let (kind, status): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT tur, durum FROM etkinlikler WHERE id = $1")
            .bind(activity)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(kind.as_deref(), Some("dinle_sec"));
    assert_eq!(status.as_deref(), Some("aktif"));

    let second = app.create(&path, &teacher, grouping()).await;
    assert_eq!(app.question_number(second).await, 2);
    let kind: Option<String> = sqlx::query_scalar("SELECT tur FROM etkinlikler WHERE id = $1")
        .bind(activity)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(kind.as_deref(), Some("dinle_sec"));
}

#[tokio::test]
async fn stages_default_to_their_position() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(7).await;

    let id = app
        .create(
            &format!("/api/activities/{}/questions", activity),
            &token(7, "ogretmen"),
            json!({
                "type": "gorsele_uygun_kelime",
                "staged": true,
                "stages": [
                    { "content": { "image": "kedi.png", "correct_word": "kedi" } },
                    { "stage_number": 5, "content": "{\"image\":\"kus.png\",\"correct_word\":\"kuş\"}" },
                    { "soru_gorseli": "at.png", "dogru_kelime": "at" }
                ]
            }),
        )
        .await;

    let stages: Vec<(i32, Value)> = sqlx::query_as(
        "SELECT asama_numarasi, icerik FROM etkinlik_soru_asamalari WHERE soru_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&app.pool)
    .await
    .unwrap();

    assert_eq!(stages.iter().map(|s| s.0).collect::<Vec<_>>(), vec![1, 5, 3]);
    assert_eq!(stages[1].1, json!({ "image": "kus.png", "correct_word": "kuş" }));
    assert_eq!(stages[2].1, json!({ "soru_gorseli": "at.png", "dogru_kelime": "at" }));

    let staged: bool = sqlx::query_scalar("SELECT asamali FROM etkinlik_sorulari WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(staged);
}

#[tokio::test]
async fn update_replaces_stages_and_options() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(7).await;
    let teacher = token(7, "ogretmen");

    let id = app
        .create(
            &format!("/api/activities/{}/questions", activity),
            &teacher,
            json!({
                "type": "gruplama",
                "options": [{ "text": "elma", "is_correct": true }, { "text": "armut" }],
                "staged": true,
                "stages": [{ "content": { "group": 1 } }, { "content": { "group": 2 } }]
            }),
        )
        .await;

    let response = app
        .send(
            reqwest::Method::PUT,
            &format!("/api/activities/{}/questions/{}", activity, id),
            &teacher,
            Some(json!({ "options": [{ "text": "muz" }] })),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let texts: Vec<Option<String>> =
        sqlx::query_scalar("SELECT secenek_metni FROM soru_secenekleri WHERE soru_id = $1")
            .bind(id)
            .fetch_all(&app.pool)
            .await
            .unwrap();
    assert_eq!(texts, vec![Some("muz".to_string())]);

    let stage_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM etkinlik_soru_asamalari WHERE soru_id = $1")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(stage_count, 0);

    let (kind, answer): (Option<String>, Option<i64>) = sqlx::query_as(
        "SELECT soru_turu, dogru_cevap_id FROM etkinlik_sorulari WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(kind.as_deref(), Some("gruplama"));
    assert_eq!(answer, None);
}

#[tokio::test]
async fn update_keeps_stored_legacy_type() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(7).await;
    let teacher = token(7, "ogretmen");

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO etkinlik_sorulari (etkinlik_id, soru_numarasi, soru_turu) VALUES ($1, 1, 'eski_tur') RETURNING id",
    )
    .bind(activity)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    let path = format!("/api/activities/{}/questions/{}", activity, id);

    let response = app
        .send(reqwest::Method::PUT, &path, &teacher, Some(json!({ "options": [{ "text": "a" }] })))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .send(reqwest::Method::PUT, &path, &teacher, Some(json!({ "type": "eski_tur", "options": [{ "text": "a" }] })))
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let kind: Option<String> = sqlx::query_scalar("SELECT soru_turu FROM etkinlik_sorulari WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(kind.as_deref(), Some("eski_tur"));
}

#[tokio::test]
async fn reorder_parks_displaced_questions() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(7).await;
    let teacher = token(7, "ogretmen");
    let path = format!("/api/activities/{}/questions", activity);

    let first = app.create(&path, &teacher, grouping()).await;
    let second = app.create(&path, &teacher, grouping()).await;
    let third = app.create(&path, &teacher, grouping()).await;

    let order_path = format!("/api/activities/{}/questions/order", activity);
    let response = app
        .send(
            reqwest::Method::PUT,
            &order_path,
            &teacher,
            Some(json!({ "orders": [{ "question_id": first, "question_number": 2 }] })),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(app.question_number(first).await, 2);
    assert_eq!(app.question_number(second).await, second + PARKING_OFFSET);
    assert_eq!(app.question_number(third).await, 3);

    let response = app
        .send(
            reqwest::Method::PUT,
            &order_path,
            &teacher,
            Some(json!({ "soruSiralamalari": [
                { "soru_id": third, "soru_numarasi": 1 },
                { "soru_id": first, "soru_numarasi": 3 }
            ] })),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.question_number(third).await, 1);
    assert_eq!(app.question_number(first).await, 3);

    let response = app
        .send(
            reqwest::Method::PUT,
            &order_path,
            &teacher,
            Some(json!({ "orders": [{ "question_id": 987_654, "question_number": 1 }] })),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn ownership_and_missing_rows_are_enforced() {
    let Some(app) = spawn_app().await else { return };
    let activity = app.activity(99).await;
    let path = format!("/api/activities/{}/questions", activity);

    let response = app
        .send(reqwest::Method::POST, &path, &token(7, "ogretmen"), Some(grouping()))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let admin = token(1, "admin");
    let id = app.create(&path, &admin, grouping()).await;

    let response = app
        .send(reqwest::Method::POST, "/api/activities/987654/questions", &admin, Some(grouping()))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .send(
            reqwest::Method::PUT,
            &format!("/api/activities/{}/questions/987654", activity),
            &admin,
            Some(grouping()),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let delete_path = format!("/api/activities/{}/questions/{}", activity, id);
    let response = app
        .send(reqwest::Method::DELETE, &delete_path, &token(7, "ogretmen"), None)
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.send(reqwest::Method::DELETE, &delete_path, &admin, None).await;
    assert_eq!(response.status().as_u16(), 204);

    let status: Option<String> = sqlx::query_scalar("SELECT durum FROM etkinlikler WHERE id = $1")
        .bind(activity)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status.as_deref(), Some("taslak"));

    let response = app.send(reqwest::Method::DELETE, &delete_path, &admin, None).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn book_scene_image_is_stored_as_question_image() {
    let Some(app) = spawn_app().await else { return };
    let book = app.book().await;

    let id = app
        .create(
            &format!("/api/books/{}/questions", book),
            &token(7, "ogretmen"),
            json!({ "type": "gorsel_ver_yazi_iste", "background_image": "sahne.png" }),
        )
        .await;

    let image: Option<String> = sqlx::query_scalar("SELECT soru_gorseli FROM kitap_sorulari WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(image.as_deref(), Some("sahne.png"));

    let id = app
        .create(
            &format!("/api/books/{}/questions", book),
            &token(7, "ogretmen"),
            json!({ "type": "diyalog", "soru_gorseli": "oda.png" }),
        )
        .await;
    let image: Option<String> = sqlx::query_scalar("SELECT soru_gorseli FROM kitap_sorulari WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(image.as_deref(), Some("oda.png"));

    // Books keep no type or status of their own.
    let kind: Option<String> = sqlx::query_scalar("SELECT tur FROM kitaplar WHERE id = $1")
        .bind(book)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(kind, None);
}
