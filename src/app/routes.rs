use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;

use crate::app::session::{self, Session, SessionStore, TopicForm, lock};
use crate::auth::AccessGate;
use crate::document::PDF_FILE_NAME;
use crate::generator::TextGenerator;

#[derive(Clone)]
pub struct AppState {
    gate: Arc<AccessGate>,
    sessions: SessionStore,
    generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(gate: AccessGate, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            gate: Arc::new(gate),
            sessions: SessionStore::new(),
            generator,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn session(&self, headers: &HeaderMap) -> Option<Arc<Session>> {
        session_token(headers).and_then(|token| self.sessions.get(&token))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session::token_from_cookie_header)
        .map(str::to_owned)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/", get(index))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/teasers", post(request_teasers))
        .route("/teasers/select", post(select_teaser))
        .route("/outline", post(request_outline))
        .route("/content", post(generate_content))
        .route("/progress", get(progress))
        .route("/pdf", post(build_pdf))
        .route("/download", get(download))
        .with_state(state)
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let Some(session) = state.session(&headers) else {
        return Html(super::views::login_page(None));
    };
    let progress = session.progress();
    let html = match session.try_wizard() {
        Some(wizard) => super::views::wizard_page(&wizard, &progress),
        None => super::views::busy_page(&progress),
    };
    Html(html)
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.gate.check(&form.password) {
        tracing::warn!("rejected login");
        return (
            StatusCode::UNAUTHORIZED,
            Html(super::views::login_page(Some("Incorrect password"))),
        )
            .into_response();
    }

    // A browser that still holds a live session keeps it.
    let token = match session_token(&headers) {
        Some(token) if state.sessions.get(&token).is_some() => token,
        _ => state.sessions.create(),
    };
    redirect_with_cookie(&session::session_cookie(&token))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }
    redirect_with_cookie(&session::expired_session_cookie())
}

fn redirect_with_cookie(cookie: &str) -> Response {
    let mut resp = Redirect::to("/").into_response();
    match HeaderValue::from_str(cookie) {
        Ok(cookie) => {
            resp.headers_mut().insert(header::SET_COOKIE, cookie);
            resp
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct TopicRequest {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content_type: String,
    #[serde(default)]
    topic: String,
}

async fn request_teasers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TopicRequest>,
) -> Response {
    let Some(session) = state.session(&headers) else {
        return Redirect::to("/").into_response();
    };
    let generator = Arc::clone(&state.generator);
    run_blocking(move || {
        let mut wizard = lock(&session.wizard);
        wizard.form = TopicForm {
            author: form.author.trim().to_owned(),
            content_type: form.content_type.trim().to_owned(),
            topic: form.topic.trim().to_owned(),
        };
        let inputs = wizard.form.inputs();
        let outcome = wizard
            .workflow
            .request_teasers(generator.as_ref(), inputs)
            .map(|teasers| format!("Received {} teasers.", teasers.len()));
        wizard.record(outcome);
    })
    .await
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    teaser: usize,
}

async fn select_teaser(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SelectRequest>,
) -> Response {
    let Some(session) = state.session(&headers) else {
        return Redirect::to("/").into_response();
    };
    run_blocking(move || {
        let mut wizard = lock(&session.wizard);
        let outcome = wizard
            .workflow
            .select_teaser(form.teaser)
            .map(|teaser| format!("Selected \"{}\".", teaser.title));
        wizard.record(outcome);
    })
    .await
}

async fn request_outline(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = state.session(&headers) else {
        return Redirect::to("/").into_response();
    };
    let generator = Arc::clone(&state.generator);
    run_blocking(move || {
        let mut wizard = lock(&session.wizard);
        let outcome = wizard
            .workflow
            .request_outline(generator.as_ref())
            .map(|outline| {
                format!(
                    "Outline has {} sections and {} points.",
                    outline.table_of_contents.len(),
                    outline.point_count()
                )
            });
        wizard.record(outcome);
    })
    .await
}

async fn generate_content(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = state.session(&headers) else {
        return Redirect::to("/").into_response();
    };
    let generator = Arc::clone(&state.generator);
    run_blocking(move || {
        let mut wizard = lock(&session.wizard);
        let total = wizard
            .workflow
            .outline()
            .map(|outline| outline.point_count())
            .unwrap_or_default();
        session.start_progress(total);
        let outcome = wizard
            .workflow
            .generate_content(generator.as_ref(), |event| session.record_progress(event))
            .map(|document| document.pages.len());
        let progress = session.finish_progress();
        wizard.record(outcome.map(|pages| match progress.failed {
            0 => format!("Generated {pages} pages."),
            failed => format!("Generated {pages} pages; {failed} points have no content."),
        }));
    })
    .await
}

async fn progress(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.session(&headers) {
        Some(session) => Json(session.progress()).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn build_pdf(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = state.session(&headers) else {
        return Redirect::to("/").into_response();
    };
    run_blocking(move || {
        let mut wizard = lock(&session.wizard);
        let outcome = wizard
            .workflow
            .build_pdf()
            .map(|bytes| format!("Built a {} byte PDF.", bytes.len()));
        wizard.record(outcome);
    })
    .await
}

async fn download(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = state.session(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let bytes = {
        let Some(wizard) = session.try_wizard() else {
            return (StatusCode::CONFLICT, "content generation is running").into_response();
        };
        match wizard.workflow.download() {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return (StatusCode::CONFLICT, err.to_string()).into_response(),
        }
    };

    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Runs a wizard action off the async workers; generation calls block.
async fn run_blocking<F>(action: F) -> Response
where
    F: FnOnce() + Send + 'static,
{
    match tokio::task::spawn_blocking(action).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => {
            tracing::error!(?err, "wizard action panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
