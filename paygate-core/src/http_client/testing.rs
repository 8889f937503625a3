//! Test doubles for the executor and scheduler seams.
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for dependent crates.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::executor::HttpExecutor;
use super::request::{HttpMethod, HttpRequest};
use super::response::HttpResponse;
use super::scheduler::{MainTask, ThreadScheduler};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a [`ScriptedExecutor`] saw for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Method of the call
    pub method: HttpMethod,
    /// Resolved URL, or `None` if it did not resolve
    pub url: Option<String>,
    /// Headers in insertion order
    pub headers: Vec<(String, String)>,
    /// Body bytes as they were before disposal
    pub body: Option<Vec<u8>>,
}

/// [`HttpExecutor`] that replays queued outcomes in order.
///
/// Like the real executor, it zeroes the request body after reading it.
/// Once the queue is empty every call fails with a connection error.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    outcomes: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    /// Creates an executor with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful body.
    pub fn push_ok(&self, body: impl Into<String>) -> &Self {
        lock(&self.outcomes).push_back(Ok(body.into()));
        self
    }

    /// Queues a failure.
    pub fn push_err(&self, error: Error) -> &Self {
        lock(&self.outcomes).push_back(Err(error));
        self
    }

    /// Number of times `execute` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: &mut HttpRequest) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let started_at = Utc::now();

        lock(&self.requests).push(RecordedRequest {
            method: request.method(),
            url: request.url().ok().map(|url| url.to_string()),
            headers: request
                .headers()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: request.body().map(|b| b.expose_secret().to_vec()),
        });
        request.dispose();

        let outcome = lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Err(Error::network("No scripted outcome left")));
        outcome.map(|body| HttpResponse::new(body, started_at, Utc::now()))
    }
}

/// [`ThreadScheduler`] that counts what it runs.
///
/// Background futures are spawned on the current Tokio runtime; main-lane
/// tasks run inline on the submitting thread.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    background: AtomicUsize,
    main: AtomicUsize,
}

impl RecordingScheduler {
    /// Creates a scheduler with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of background tasks submitted.
    pub fn background_calls(&self) -> usize {
        self.background.load(Ordering::SeqCst)
    }

    /// Number of main-lane tasks submitted.
    pub fn main_calls(&self) -> usize {
        self.main.load(Ordering::SeqCst)
    }
}

impl ThreadScheduler for RecordingScheduler {
    fn run_on_background(&self, task: BoxFuture<'static, ()>) {
        self.background.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(task);
    }

    fn run_on_main(&self, task: MainTask) {
        self.main.fetch_add(1, Ordering::SeqCst);
        task();
    }
}
