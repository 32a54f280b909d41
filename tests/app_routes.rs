use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;

use pdfwizard::app::routes::{AppState, router};
use pdfwizard::app::session::SESSION_COOKIE;
use pdfwizard::auth::AccessGate;
use pdfwizard::generator::{GenerationStep, NoopGenerator, Prompt, TextGenerator};

const PASSWORD: &str = "open sesame";

fn app() -> (Router, AppState) {
    let state = AppState::new(AccessGate::new(PASSWORD), Arc::new(NoopGenerator));
    (router(state.clone()), state)
}

/// Noop output, but every point takes `delay` and the first one reports in.
struct SlowHydration {
    delay: Duration,
    started: Mutex<Option<Sender<()>>>,
}

impl SlowHydration {
    fn new(delay: Duration) -> (Self, Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        let generator = Self {
            delay,
            started: Mutex::new(Some(tx)),
        };
        (generator, rx)
    }
}

impl TextGenerator for SlowHydration {
    fn complete_json(&self, prompt: &Prompt) -> anyhow::Result<String> {
        if prompt.step == GenerationStep::Hydration {
            if let Some(started) = self.started.lock().unwrap().take() {
                let _ = started.send(());
            }
            std::thread::sleep(self.delay);
        }
        NoopGenerator.complete_json(prompt)
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("route request")
}

async fn text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).expect("build request")
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("build request")
}

async fn login(app: &Router) -> String {
    let response = send(app, form("/login", None, "password=open+sesame")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("session cookie");
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_owned()
}

#[tokio::test]
async fn healthz_is_open() {
    let (app, _) = app();
    let response = send(&app, get("/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok\n");
}

#[tokio::test]
async fn wrong_password_re_prompts_without_a_session() {
    let (app, state) = app();

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("name=\"password\""));

    let response = send(&app, form("/login", None, "password=nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(text(response).await.contains("Incorrect password"));
    assert!(state.sessions().is_empty());
}

#[tokio::test]
async fn actions_without_a_session_go_back_to_login() {
    let (app, state) = app();

    let response = send(
        &app,
        form("/teasers", None, "author=A&content_type=How-to&topic=T"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = send(&app, get("/download", Some("pdfwizard_session=forged"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.sessions().is_empty());
}

#[tokio::test]
async fn full_wizard_flow_downloads_a_pdf() {
    let (app, _) = app();
    let cookie = login(&app).await;
    let cookie = Some(cookie.as_str());

    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("value=\"John Doe\""));

    let response = send(&app, get("/download", cookie)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        form(
            "/teasers",
            cookie,
            "author=John+Doe&content_type=How-to&topic=Personal+Branding",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("Received 3 teasers."));
    assert!(page.contains("<option value=\"1\">Personal Branding, Volume 2 - "));
    assert!(page.contains("<option selected>How-to</option>"));

    send(&app, form("/teasers/select", cookie, "teaser=1")).await;
    send(&app, form("/outline", cookie, "")).await;
    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("Outline has 7 sections and 14 points."));
    assert!(page.contains("&quot;tableOfContents&quot;"));

    send(&app, form("/content", cookie, "")).await;
    let progress: serde_json::Value =
        serde_json::from_str(&text(send(&app, get("/progress", cookie)).await).await)
            .expect("progress json");
    assert_eq!(progress["completed"], 14);
    assert_eq!(progress["total"], 14);
    assert_eq!(progress["percent"], 100);
    assert_eq!(progress["running"], false);

    send(&app, form("/pdf", cookie, "")).await;
    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("data:application/pdf;base64,"));

    let response = send(&app, get("/download", cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"generated_pdf.pdf\""
    );
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    assert!(bytes.starts_with(b"%PDF"));

    // Picking another teaser discards the outline, content and pdf.
    send(&app, form("/teasers/select", cookie, "teaser=0")).await;
    let response = send(&app, get("/download", cookie)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn empty_topic_is_reported_inline() {
    let (app, _) = app();
    let cookie = login(&app).await;
    let cookie = Some(cookie.as_str());

    send(
        &app,
        form("/teasers", cookie, "author=John+Doe&content_type=How-to&topic="),
    )
    .await;
    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("topic is required"));
    assert!(page.contains("Stage: idle"));
}

#[tokio::test]
async fn out_of_order_action_is_reported_inline() {
    let (app, _) = app();
    let cookie = login(&app).await;
    let cookie = Some(cookie.as_str());

    send(&app, form("/pdf", cookie, "")).await;
    let page = text(send(&app, get("/", cookie)).await).await;
    assert!(page.contains("cannot build the pdf while the wizard is at stage idle"));
}

#[tokio::test]
async fn logging_in_again_reuses_the_session() {
    let (app, state) = app();
    let cookie = login(&app).await;

    let response = send(
        &app,
        form("/login", Some(&cookie), "password=open+sesame"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let again = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie header")
        .to_owned();
    assert!(again.starts_with(&format!("{cookie};")));
    assert_eq!(state.sessions().len(), 1);

    // A stale cookie gets a fresh session.
    send(
        &app,
        form(
            "/login",
            Some("pdfwizard_session=stale"),
            "password=open+sesame",
        ),
    )
    .await;
    assert_eq!(state.sessions().len(), 2);
}

#[tokio::test]
async fn logout_drops_the_session() {
    let (app, state) = app();
    let cookie = login(&app).await;
    assert_eq!(state.sessions().len(), 1);

    let response = send(&app, form("/logout", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cleared = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie header")
        .to_owned();
    assert!(cleared.contains("Max-Age=0"));
    assert!(state.sessions().is_empty());

    let page = text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(page.contains("name=\"password\""));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn page_stays_responsive_during_a_content_run() {
    let (generator, started) = SlowHydration::new(Duration::from_millis(150));
    let state = AppState::new(AccessGate::new(PASSWORD), Arc::new(generator));
    let app = router(state);
    let cookie = login(&app).await;

    send(
        &app,
        form(
            "/teasers",
            Some(&cookie),
            "author=John+Doe&content_type=How-to&topic=Personal+Branding",
        ),
    )
    .await;
    send(&app, form("/teasers/select", Some(&cookie), "teaser=0")).await;
    send(&app, form("/outline", Some(&cookie), "")).await;

    let content = tokio::spawn({
        let app = app.clone();
        let cookie = cookie.clone();
        async move { send(&app, form("/content", Some(&cookie), "")).await }
    });
    tokio::task::spawn_blocking(move || started.recv_timeout(Duration::from_secs(10)))
        .await
        .expect("join")
        .expect("content run started");

    // Fourteen points at 150ms each; the page must not wait for them.
    let begun = Instant::now();
    let page = text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(begun.elapsed() < Duration::from_secs(1));
    assert!(page.contains("Content generation is running."));

    let response = send(&app, get("/download", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = content.await.expect("content task");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let page = text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(page.contains("Generated 10 pages."));
}
