use crate::dashboard::PdfDownload;
use crate::errors::AppError;
use crate::models::{
    ChartAggregate, ModalSnapshot, OpenModalRequest, PasswordRequest, StudentIdRequest,
    StudentRecord,
};
use crate::state::AppState;
use crate::ui::render_index;
use crate::wizard::{SearchForm, StudentForm};
use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.mount(&state.gateway).await;
    let alert = dashboard.take_alert();
    Html(render_index(&dashboard, alert.as_deref()))
}

pub async fn get_students(State(state): State<AppState>) -> Json<Vec<StudentRecord>> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.mount(&state.gateway).await;
    Json(dashboard.students.clone())
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ChartAggregate>, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.mount(&state.gateway).await;
    dashboard
        .charts
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::not_found("chart counts are not available"))
}

pub async fn get_modal(State(state): State<AppState>) -> Json<ModalSnapshot> {
    let dashboard = state.dashboard.lock().await;
    Json(dashboard.modal.snapshot())
}

pub async fn open_modal(
    State(state): State<AppState>,
    Form(payload): Form<OpenModalRequest>,
) -> Redirect {
    state.dashboard.lock().await.open_modal(&payload.kind);
    Redirect::to("/")
}

pub async fn close_modal(State(state): State<AppState>) -> Redirect {
    state.dashboard.lock().await.close_modal();
    Redirect::to("/")
}

pub async fn add_student(
    State(state): State<AppState>,
    Form(payload): Form<StudentForm>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.submit_add(payload, &state.gateway).await?;
    Ok(Redirect::to("/"))
}

pub async fn edit_lookup(
    State(state): State<AppState>,
    Form(payload): Form<StudentIdRequest>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard
        .submit_edit_lookup(&payload.student_id, &state.gateway)
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn edit_student(
    State(state): State<AppState>,
    Form(payload): Form<StudentForm>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.submit_edit(payload, &state.gateway).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_unlock(
    State(state): State<AppState>,
    Form(payload): Form<PasswordRequest>,
) -> Result<Redirect, AppError> {
    state
        .dashboard
        .lock()
        .await
        .submit_delete_unlock(&payload.password)?;
    Ok(Redirect::to("/"))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Form(payload): Form<StudentIdRequest>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard
        .submit_delete(&payload.student_id, &state.gateway)
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn search_students(
    State(state): State<AppState>,
    Form(payload): Form<SearchForm>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.submit_search(payload, &state.gateway).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_menu(State(state): State<AppState>, Path(index): Path<usize>) -> Redirect {
    state.dashboard.lock().await.toggle_menu(index);
    Redirect::to("/")
}

pub async fn download(State(state): State<AppState>, Path(index): Path<usize>) -> Response {
    let mut dashboard = state.dashboard.lock().await;
    match dashboard.download(index, &state.gateway).await {
        Some(pdf) => attachment(pdf),
        None => Redirect::to("/").into_response(),
    }
}

fn attachment(pdf: PdfDownload) -> Response {
    let disposition = content_disposition(&pdf.filename);
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response()
}

// RFC 5987 attr-char: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// ASCII `filename` for old clients plus the exact UTF-8 name in `filename*`.
fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        header_safe_filename(filename),
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}

// Header values must be visible ASCII; anything else becomes '_'.
fn header_safe_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|ch| {
            if (ch.is_ascii_graphic() || ch == ' ') && ch != '"' && ch != '\\' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
