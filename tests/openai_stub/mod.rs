use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub const SECTION_COUNT: usize = 7;
pub const POINTS_PER_SECTION: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct OpenAiStubConfig {
    pub expected_model: Option<String>,
    /// Hydration requests for this point answer with HTTP 500.
    pub failing_point: Option<String>,
    /// Every completion's content is not JSON.
    pub non_json_content: bool,
}

pub struct OpenAiStub {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl OpenAiStub {
    pub fn spawn(config: OpenAiStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start openai stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let path = request.url().to_string();
                if request.method() != &tiny_http::Method::Post || path != "/v1/chat/completions" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let parsed: Value = match serde_json::from_str(&body) {
                    Ok(value) => value,
                    Err(_) => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("invalid json").with_status_code(400),
                        );
                        continue;
                    }
                };

                if parsed.pointer("/response_format/type").and_then(Value::as_str)
                    != Some("json_object")
                {
                    let _ = request.respond(error_response(400, "json mode is required"));
                    continue;
                }
                if let Some(expected) = config.expected_model.as_deref() {
                    let actual = parsed.get("model").and_then(Value::as_str).unwrap_or("");
                    if actual != expected {
                        let _ = request.respond(error_response(
                            400,
                            &format!("unexpected model: expected={expected} actual={actual}"),
                        ));
                        continue;
                    }
                }

                let Some(user) = parsed
                    .pointer("/messages/1/content")
                    .and_then(Value::as_str)
                else {
                    let _ = request.respond(error_response(400, "missing user message"));
                    continue;
                };

                if let Some(point) = config.failing_point.as_deref()
                    && user.contains(&format!("called {point} in"))
                {
                    let _ = request.respond(error_response(500, "the model is overloaded"));
                    continue;
                }

                let content = if config.non_json_content {
                    "Sure! Here is your content.".to_owned()
                } else if user.contains("CoversResult") {
                    covers_response()
                } else if user.contains("OutlineResult") {
                    outline_response()
                } else if user.contains("BodyResult") {
                    body_response(user)
                } else {
                    let _ = request.respond(error_response(400, "unknown prompt mode"));
                    continue;
                };

                let response_body = serde_json::json!({
                    "id": "chatcmpl_stub",
                    "object": "chat.completion",
                    "model": parsed.get("model").cloned().unwrap_or(Value::String("stub-model".to_owned())),
                    "choices": [
                        {
                            "index": 0,
                            "message": { "role": "assistant", "content": content },
                            "finish_reason": "stop"
                        }
                    ]
                });

                let mut response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(200);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for OpenAiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn error_response(status: u16, message: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": { "message": message, "type": "stub" } });
    tiny_http::Response::from_string(body.to_string()).with_status_code(status)
}

fn covers_response() -> String {
    let covers = [
        ("Own Your Name", "Building a personal brand that lasts"),
        ("The Brand Called You", "A practical guide to standing out"),
        ("Signal Over Noise", "Being known for the right things"),
    ]
    .iter()
    .map(|(title, subtext)| {
        serde_json::json!({
            "title": title,
            "subtext": subtext,
            "author": "Someone Else",
            "photo": "https://example.com/cover.png",
        })
    })
    .collect::<Vec<_>>();
    serde_json::json!({ "covers": covers, "timestamp": 1_700_000_000 }).to_string()
}

fn outline_response() -> String {
    let sections = (1..=SECTION_COUNT)
        .map(|s| {
            let points = (1..=POINTS_PER_SECTION)
                .map(|p| serde_json::json!({ "text": format!("Idea {s}.{p}") }))
                .collect::<Vec<_>>();
            serde_json::json!({ "title": format!("Part {s}"), "points": points })
        })
        .collect::<Vec<_>>();
    serde_json::json!({
        "outline": {
            "overview": "Personal branding is how people remember you. This guide starts with \
self-knowledge. It moves on to visibility. It ends with keeping your brand honest over time.",
            "tableOfContents": sections,
        },
        "timestamp": 1_700_000_000,
    })
    .to_string()
}

fn body_response(user: &str) -> String {
    let point = extract_between(user, "called ", " in the ").unwrap_or("this point");
    serde_json::json!({
        "paragraphs": [
            { "content": format!("{point} is where it starts.") },
            { "content": format!("Practise {point} every week.") },
        ],
        "timestamp": 1_700_000_000,
    })
    .to_string()
}

fn extract_between<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = text.find(begin)? + begin.len();
    let rest = &text[start..];
    let end_rel = rest.find(end)?;
    Some(&rest[..end_rel])
}
