use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use tracing::{debug, error, warn};

use super::builder::HttpClient;
use super::request::HttpRequest;
use super::response::HttpResponse;

/// Completion callback for asynchronous sends. Runs on the main lane.
pub type HttpResponseCallback = Box<dyn FnOnce(Result<HttpResponse>) + Send + 'static>;

/// One logical call moving through its attempts.
///
/// Holds the caller's request for the whole call; every attempt executes a
/// clone so each dispatch starts from the original body.
pub(crate) struct RetryCall {
    client: HttpClient,
    request: HttpRequest,
    policy: RetryPolicy,
    callback: Option<HttpResponseCallback>,
    attempt: u32,
}

impl RetryCall {
    pub(crate) fn new(
        client: HttpClient,
        request: HttpRequest,
        policy: RetryPolicy,
        callback: Option<HttpResponseCallback>,
    ) -> Self {
        Self {
            client,
            request,
            policy,
            callback,
            attempt: 0,
        }
    }

    pub(crate) fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Queues the next attempt on the background lane.
    pub(crate) fn dispatch(self) {
        let scheduler = self.client.scheduler().clone();
        scheduler.run_on_background(Box::pin(self.run_attempt()));
    }

    async fn run_attempt(mut self) {
        self.attempt += 1;

        let mut attempt_request = self.request.clone();
        let outcome = self
            .client
            .executor()
            .execute(&mut attempt_request)
            .await;
        attempt_request.dispose();

        match outcome {
            Ok(response) => {
                debug!(attempt = self.attempt, "Request completed successfully");
                self.finish(Ok(response));
            }
            Err(e) if self.attempt < self.policy.max_attempts => {
                warn!(
                    attempt = self.attempt,
                    max_attempts = self.policy.max_attempts,
                    delay_ms = %self.policy.delay.as_millis(),
                    error = %e,
                    "Request failed, retrying"
                );
                if self.policy.delay.is_zero() {
                    self.dispatch();
                } else {
                    // The delay runs outside the background lane so it holds no slot.
                    let delay = self.policy.delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        self.dispatch();
                    });
                }
            }
            Err(e) => {
                error!(
                    attempt = self.attempt,
                    error = %e,
                    "Request failed, not retrying"
                );
                let err = if self.policy.retries() {
                    Error::retry_limit_exceeded(e)
                } else {
                    e
                };
                self.finish(Err(err));
            }
        }
    }

    /// Delivers the terminal outcome, if anyone is listening, and wipes the
    /// retained body.
    pub(crate) fn finish(mut self, outcome: Result<HttpResponse>) {
        self.request.dispose();
        if let Some(callback) = self.callback.take() {
            self.client
                .scheduler()
                .run_on_main(Box::new(move || callback(outcome)));
        }
    }
}
