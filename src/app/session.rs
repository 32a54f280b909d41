use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::WizardError;
use crate::hydrate::HydrationEvent;
use crate::workflow::{TopicInputs, Workflow};

pub const SESSION_COOKIE: &str = "pdfwizard_session";
pub const CONTENT_TYPES: [&str; 2] = ["Comprehensive Guide", "How-to"];

/// Last values typed into the topic form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicForm {
    pub author: String,
    pub content_type: String,
    pub topic: String,
}

impl Default for TopicForm {
    fn default() -> Self {
        Self {
            author: "John Doe".to_owned(),
            content_type: CONTENT_TYPES[0].to_owned(),
            topic: "Personal Branding".to_owned(),
        }
    }
}

impl TopicForm {
    pub fn inputs(&self) -> TopicInputs {
        TopicInputs {
            author: self.author.clone(),
            content_type: self.content_type.clone(),
            topic: self.topic.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Notice(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct WizardSession {
    pub workflow: Workflow,
    pub form: TopicForm,
    pub flash: Option<Flash>,
}

impl WizardSession {
    /// Keeps the outcome of the last action for the next page render.
    pub fn record(&mut self, outcome: Result<String, WizardError>) {
        self.flash = Some(match outcome {
            Ok(notice) => Flash::Notice(notice),
            Err(err) => {
                tracing::warn!(error = %err, stage = %self.workflow.stage(), "wizard action failed");
                Flash::Error(err.to_string())
            }
        });
    }
}

/// Hydration progress, readable while the content run holds the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
    pub running: bool,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub failed: usize,
    pub current: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    pub wizard: Mutex<WizardSession>,
    pub progress: Mutex<Progress>,
    last_used: Mutex<Instant>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            wizard: Mutex::default(),
            progress: Mutex::default(),
            last_used: Mutex::new(Instant::now()),
        }
    }
}

impl Session {
    /// The wizard, unless a long action (a content run) holds it.
    pub fn try_wizard(&self) -> Option<MutexGuard<'_, WizardSession>> {
        match self.wizard.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(err)) => Some(err.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    fn touch(&self) {
        *lock(&self.last_used) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*lock(&self.last_used))
    }

    pub fn start_progress(&self, total: usize) {
        *lock(&self.progress) = Progress {
            running: true,
            total,
            ..Progress::default()
        };
    }

    pub fn record_progress(&self, event: &HydrationEvent) {
        let mut progress = lock(&self.progress);
        progress.completed = event.completed;
        progress.total = event.total;
        progress.percent = event.percent();
        if event.error.is_some() {
            progress.failed += 1;
        }
        progress.current = Some(format!("{} / {}", event.section_title, event.point_text));
    }

    pub fn finish_progress(&self) -> Progress {
        let mut progress = lock(&self.progress);
        progress.running = false;
        progress.current = None;
        progress.clone()
    }

    pub fn progress(&self) -> Progress {
        lock(&self.progress).clone()
    }
}

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// Logged-in browsers, keyed by the cookie token.
///
/// Sessions idle longer than the timeout are dropped whenever a new one is
/// created, except while a content run is in progress.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Arc<Session>>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    pub fn create(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = lock(&self.sessions);
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, session| {
            session.idle_for(now) <= self.idle_timeout || session.progress().running
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "idle sessions dropped");
        }
        sessions.insert(token.clone(), Arc::new(Session::default()));
        tracing::info!(active = sessions.len(), "session created");
        token
    }

    pub fn get(&self, token: &str) -> Option<Arc<Session>> {
        let session = lock(&self.sessions).get(token).cloned()?;
        session.touch();
        Some(session)
    }

    pub fn remove(&self, token: &str) -> bool {
        let removed = lock(&self.sessions).remove(token).is_some();
        if removed {
            tracing::info!("session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Finds our token in a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}
