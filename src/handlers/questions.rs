// src/handlers/questions.rs

//! Question CRUD shared by the activity and book wizards.
//!
//! The router tags each wizard's routes with its `ContentDomain`; the domain
//! picks the pool and the tables.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{QuestionTables, ReorderQuestionsRequest, tables_for},
    question_types::{
        ContentDomain, requested_update_type, resolve_update_type, validate_for_create,
        validate_for_update,
        normalize::{QuestionFields, option_row, question_fields, stage_rows},
        payload::Payload,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Offset used to park question numbers while renumbering, so the unique
/// (content, number) pair never collides mid-update.
const RENUMBER_OFFSET: i64 = 100_000;

/// Checks that the parent content exists and that the caller may edit it.
async fn ensure_editable(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    content_id: i64,
    claims: &Claims,
) -> Result<(), AppError> {
    let owner_column = tables.owner_column.unwrap_or("NULL");
    let row: Option<Option<i64>> = sqlx::query_scalar(&format!(
        "SELECT {}::bigint FROM {} WHERE id = $1",
        owner_column, tables.content
    ))
    .bind(content_id)
    .fetch_optional(&mut *conn)
    .await?;

    let owner = row.ok_or(AppError::NotFound("Content not found".to_string()))?;

    if tables.owner_column.is_some() && !claims.is_admin() && owner != Some(claims.id) {
        return Err(AppError::Forbidden(
            "You are not allowed to edit this content".to_string(),
        ));
    }
    Ok(())
}

/// Stored type of a question, or 404 when it is not part of the content.
async fn stored_type(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    content_id: i64,
    question_id: i64,
) -> Result<Option<String>, AppError> {
    let row: Option<Option<String>> = sqlx::query_scalar(&format!(
        "SELECT soru_turu FROM {} WHERE id = $1 AND {} = $2",
        tables.questions, tables.content_fk
    ))
    .bind(question_id)
    .bind(content_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.ok_or(AppError::NotFound("Question not found".to_string()))
}

async fn next_question_number(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    content_id: i64,
) -> Result<i64, AppError> {
    let next: i64 = sqlx::query_scalar(&format!(
        "SELECT COALESCE(MAX(soru_numarasi), 0)::bigint + 1 FROM {} WHERE {} = $1",
        tables.questions, tables.content_fk
    ))
    .bind(content_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(next)
}

/// Columns written for every question, in bind order.
const COMMON_COLUMNS: [&str; 13] = [
    "soru_numarasi",
    "soru_turu",
    "soru_adi",
    "soru_metni",
    "soru_puan",
    "ses_dosyasi",
    "ek_bilgi",
    "yonerge",
    "yonerge_ses_dosyasi",
    "secenek_arka_plan_gorseli",
    "video_url",
    "soru_gorseli",
    "asamali",
];

/// Domain-specific columns, in bind order.
fn domain_columns(domain: ContentDomain) -> &'static [&'static str] {
    match domain {
        ContentDomain::Activity => &[
            "soru_yildiz",
            "arka_plan_gorsel_yatay",
            "arka_plan_gorsel_dikey",
        ],
        ContentDomain::Book => &["dogru_tik_gorsel"],
    }
}

async fn insert_question(
    conn: &mut PgConnection,
    domain: ContentDomain,
    content_id: i64,
    question_number: i64,
    type_id: &str,
    fields: &QuestionFields,
) -> Result<i64, AppError> {
    let tables = tables_for(domain);
    let columns: Vec<&str> = std::iter::once(tables.content_fk)
        .chain(COMMON_COLUMNS)
        .chain(domain_columns(domain).iter().copied())
        .collect();

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        tables.questions,
        columns.join(", ")
    ));
    builder.push_values([fields], |mut row, f| {
        row.push_bind(content_id)
            .push_bind(question_number)
            .push_bind(type_id.to_string())
            .push_bind(f.name.clone())
            .push_bind(f.question_text.clone())
            .push_bind(f.points)
            .push_bind(f.audio.clone())
            .push_bind(f.extra.clone())
            .push_bind(f.instruction.clone())
            .push_bind(f.instruction_audio.clone())
            .push_bind(f.option_background_image.clone())
            .push_bind(f.video_url.clone())
            .push_bind(f.stored_image(domain))
            .push_bind(f.staged);
        match domain {
            ContentDomain::Activity => {
                row.push_bind(f.stars)
                    .push_bind(f.background_image.clone())
                    .push_bind(f.background_image_portrait.clone());
            }
            ContentDomain::Book => {
                row.push_bind(f.check_mark_image.clone());
            }
        }
    });
    builder.push(" RETURNING id::bigint");

    let id: i64 = builder.build_query_scalar().fetch_one(&mut *conn).await?;
    Ok(id)
}

async fn update_question_row(
    conn: &mut PgConnection,
    domain: ContentDomain,
    content_id: i64,
    question_id: i64,
    type_id: &str,
    fields: &QuestionFields,
) -> Result<(), AppError> {
    let tables = tables_for(domain);
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("UPDATE {} SET ", tables.questions));
    let mut separated = builder.separated(", ");

    separated.push("soru_turu = ");
    separated.push_bind_unseparated(type_id.to_string());
    separated.push("soru_adi = ");
    separated.push_bind_unseparated(fields.name.clone());
    separated.push("soru_metni = ");
    separated.push_bind_unseparated(fields.question_text.clone());
    separated.push("soru_puan = ");
    separated.push_bind_unseparated(fields.points);
    separated.push("ses_dosyasi = ");
    separated.push_bind_unseparated(fields.audio.clone());
    separated.push("ek_bilgi = ");
    separated.push_bind_unseparated(fields.extra.clone());
    separated.push("yonerge = ");
    separated.push_bind_unseparated(fields.instruction.clone());
    separated.push("yonerge_ses_dosyasi = ");
    separated.push_bind_unseparated(fields.instruction_audio.clone());
    separated.push("secenek_arka_plan_gorseli = ");
    separated.push_bind_unseparated(fields.option_background_image.clone());
    separated.push("video_url = ");
    separated.push_bind_unseparated(fields.video_url.clone());
    separated.push("soru_gorseli = ");
    separated.push_bind_unseparated(fields.stored_image(domain));
    separated.push("asamali = ");
    separated.push_bind_unseparated(fields.staged);
    separated.push("dogru_cevap_id = NULL");

    match domain {
        ContentDomain::Activity => {
            separated.push("soru_yildiz = ");
            separated.push_bind_unseparated(fields.stars);
            separated.push("arka_plan_gorsel_yatay = ");
            separated.push_bind_unseparated(fields.background_image.clone());
            separated.push("arka_plan_gorsel_dikey = ");
            separated.push_bind_unseparated(fields.background_image_portrait.clone());
        }
        ContentDomain::Book => {
            separated.push("dogru_tik_gorsel = ");
            separated.push_bind_unseparated(fields.check_mark_image.clone());
        }
    }

    if let Some(number) = fields.question_number {
        separated.push("soru_numarasi = ");
        separated.push_bind_unseparated(number);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(question_id);
    builder.push(format!(" AND {} = ", tables.content_fk));
    builder.push_bind(content_id);

    builder.build().execute(&mut *conn).await?;
    Ok(())
}

/// Inserts a question's stages and options. The first correct option becomes
/// the question's answer.
async fn insert_children(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    question_id: i64,
    payload: &Payload<'_>,
) -> Result<(), AppError> {
    let insert_stage = format!(
        "INSERT INTO {} (soru_id, asama_numarasi, icerik) VALUES ($1, $2, $3)",
        tables.stages
    );
    for stage in stage_rows(payload) {
        sqlx::query(&insert_stage)
            .bind(question_id)
            .bind(stage.stage_number)
            .bind(stage.content)
            .execute(&mut *conn)
            .await?;
    }

    let insert_option = format!(
        "INSERT INTO {} (soru_id, secenek_metni, secenek_gorseli, secenek_ses_dosyasi, \
         secenek_rengi, kategori, dogru_cevap, siralama) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id::bigint",
        tables.options
    );
    let mut correct_option_id = None;
    for option in payload.options() {
        let row = option_row(option);
        let option_id: i64 = sqlx::query_scalar(&insert_option)
            .bind(question_id)
            .bind(row.text)
            .bind(row.image)
            .bind(row.audio)
            .bind(row.color)
            .bind(row.category)
            .bind(row.is_correct)
            .bind(row.sort_order)
            .fetch_one(&mut *conn)
            .await?;
        if row.is_correct == 1 && correct_option_id.is_none() {
            correct_option_id = Some(option_id);
        }
    }

    if let Some(option_id) = correct_option_id {
        sqlx::query(&format!(
            "UPDATE {} SET dogru_cevap_id = $1 WHERE id = $2",
            tables.questions
        ))
        .bind(option_id)
        .bind(question_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn delete_children(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    question_id: i64,
) -> Result<(), AppError> {
    for table in [tables.stages, tables.options] {
        sqlx::query(&format!("DELETE FROM {} WHERE soru_id = $1", table))
            .bind(question_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Gives the content the type of its first question.
async fn backfill_content_type(
    conn: &mut PgConnection,
    tables: &QuestionTables,
    content_id: i64,
    type_id: &str,
) -> Result<(), AppError> {
    sqlx::query(&format!(
        "UPDATE {} SET tur = $1 WHERE id = $2 AND tur IS NULL",
        tables.content
    ))
    .bind(type_id)
    .bind(content_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Sets the content `aktif` while it has questions and `taslak` otherwise.
///
/// Runs in a savepoint; a failure is logged and leaves the surrounding
/// transaction usable.
async fn sync_content_status(conn: &mut PgConnection, tables: &QuestionTables, content_id: i64) {
    let result: Result<(), sqlx::Error> = async {
        let mut savepoint = conn.begin().await?;
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            tables.questions, tables.content_fk
        ))
        .bind(content_id)
        .fetch_one(&mut *savepoint)
        .await?;

        let status = if count >= 1 { "aktif" } else { "taslak" };
        sqlx::query(&format!("UPDATE {} SET durum = $1 WHERE id = $2", tables.content))
            .bind(status)
            .bind(content_id)
            .execute(&mut *savepoint)
            .await?;
        savepoint.commit().await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to sync status of {} {}: {:?}", tables.content, content_id, e);
    }
}

/// Adds a question to an activity or book.
/// Admins and teachers; activity owners only.
pub async fn create_question(
    State(state): State<AppState>,
    Extension(domain): Extension<ContentDomain>,
    Extension(claims): Extension<Claims>,
    Path(content_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    validate_for_create(&body, domain)?;

    let payload = Payload::new(&body);
    let type_id = payload.type_id().unwrap_or_default();
    let fields = question_fields(&payload);
    let tables = tables_for(domain);

    let mut tx = state.pool_for(domain).begin().await?;
    ensure_editable(&mut tx, tables, content_id, &claims).await?;

    let question_number = match fields.question_number {
        Some(number) => number,
        None => next_question_number(&mut tx, tables, content_id).await?,
    };
    let id = insert_question(&mut tx, domain, content_id, question_number, type_id, &fields).await?;
    insert_children(&mut tx, tables, id, &payload).await?;

    if tables.tracks_status {
        backfill_content_type(&mut tx, tables, content_id, type_id).await?;
        sync_content_status(&mut tx, tables, content_id).await;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to create {} question: {:?}", domain, e);
        AppError::InternalServerError(e.to_string())
    })?;
    tracing::info!(%domain, content_id, question_id = id, "question created");

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Replaces a question, including its stages and options.
/// The type may be changed by the body; otherwise the stored type is kept.
pub async fn update_question(
    State(state): State<AppState>,
    Extension(domain): Extension<ContentDomain>,
    Extension(claims): Extension<Claims>,
    Path((content_id, question_id)): Path<(i64, i64)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    requested_update_type(&body)?;

    let tables = tables_for(domain);
    let mut tx = state.pool_for(domain).begin().await?;

    let stored = stored_type(&mut tx, tables, content_id, question_id).await?;
    let type_id = resolve_update_type(&body, stored.as_deref())?
        .unwrap_or_default()
        .to_string();
    validate_for_update(&body, &type_id, domain)?;
    ensure_editable(&mut tx, tables, content_id, &claims).await?;

    let payload = Payload::new(&body);
    let fields = question_fields(&payload);
    update_question_row(&mut tx, domain, content_id, question_id, &type_id, &fields).await?;
    delete_children(&mut tx, tables, question_id).await?;
    insert_children(&mut tx, tables, question_id, &payload).await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to update {} question: {:?}", domain, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::OK, Json(serde_json::json!({"id": question_id}))))
}

/// Deletes a question with its stages and options.
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(domain): Extension<ContentDomain>,
    Extension(claims): Extension<Claims>,
    Path((content_id, question_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let tables = tables_for(domain);
    let mut tx = state.pool_for(domain).begin().await?;

    ensure_editable(&mut tx, tables, content_id, &claims).await?;
    stored_type(&mut tx, tables, content_id, question_id).await?;

    delete_children(&mut tx, tables, question_id).await?;
    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", tables.questions))
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    if tables.tracks_status {
        sync_content_status(&mut tx, tables, content_id).await;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to delete {} question: {:?}", domain, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Renumbers questions of one activity or book.
pub async fn reorder_questions(
    State(state): State<AppState>,
    Extension(domain): Extension<ContentDomain>,
    Extension(claims): Extension<Claims>,
    Path(content_id): Path<i64>,
    Json(payload): Json<ReorderQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tables = tables_for(domain);
    let mut tx = state.pool_for(domain).begin().await?;
    ensure_editable(&mut tx, tables, content_id, &claims).await?;

    for order in &payload.orders {
        stored_type(&mut tx, tables, content_id, order.question_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    AppError::NotFound(format!("Question {} not found", order.question_id))
                }
                other => other,
            })?;
    }

    let ids: Vec<i64> = payload.orders.iter().map(|o| o.question_id).collect();
    let numbers: Vec<i64> = payload.orders.iter().map(|o| o.question_number).collect();

    // Questions outside the request that hold a target number move out of the way.
    sqlx::query(&format!(
        "UPDATE {q} SET soru_numarasi = id + $1 \
         WHERE {fk} = $2 AND soru_numarasi = ANY($3) AND NOT (id = ANY($4))",
        q = tables.questions,
        fk = tables.content_fk
    ))
    .bind(RENUMBER_OFFSET)
    .bind(content_id)
    .bind(numbers)
    .bind(ids)
    .execute(&mut *tx)
    .await?;

    let set_number = format!(
        "UPDATE {} SET soru_numarasi = $1 WHERE id = $2 AND {} = $3",
        tables.questions, tables.content_fk
    );
    for order in &payload.orders {
        sqlx::query(&set_number)
            .bind(RENUMBER_OFFSET + order.question_id)
            .bind(order.question_id)
            .bind(content_id)
            .execute(&mut *tx)
            .await?;
    }
    for order in &payload.orders {
        sqlx::query(&set_number)
            .bind(order.question_number)
            .bind(order.question_id)
            .bind(content_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to reorder {} questions: {:?}", domain, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::OK)
}
