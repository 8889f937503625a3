use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use tokio::sync::oneshot;
use tracing::{instrument, warn};

use super::builder::HttpClient;
use super::request::HttpRequest;
use super::response::HttpResponse;
use super::retry::{HttpResponseCallback, RetryCall};

impl HttpClient {
    /// Sends `request` once in the background.
    ///
    /// `callback`, when given, runs exactly once on the main lane with the
    /// outcome. Without a callback the request still executes and the
    /// outcome is dropped.
    pub fn send(&self, request: HttpRequest, callback: Option<HttpResponseCallback>) {
        self.send_with_retry(request, RetryPolicy::none(), callback);
    }

    /// Sends `request` in the background, re-dispatching failed attempts
    /// until `policy.max_attempts` is spent.
    ///
    /// A request whose URL cannot be resolved fails immediately without
    /// reaching the executor. When every attempt of a retrying policy fails,
    /// the callback receives [`Error::RetryLimitExceeded`] with the last
    /// attempt's error as its source.
    #[instrument(
        name = "http_send",
        skip(self, request, callback),
        fields(method = %request.method(), max_attempts = policy.max_attempts)
    )]
    pub fn send_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
        callback: Option<HttpResponseCallback>,
    ) {
        let call = RetryCall::new(self.clone(), request, policy, callback);
        if let Err(e) = call.request().validate() {
            warn!(error = %e, "Rejecting request before dispatch");
            call.finish(Err(e));
            return;
        }
        call.dispatch();
    }

    /// Sends `request` once and returns the decoded body.
    ///
    /// Runs on the caller's task; the scheduler is not involved.
    ///
    /// # Errors
    ///
    /// Any error the executor produces, unchanged.
    #[instrument(name = "http_send_synchronous", skip(self, request), fields(method = %request.method()))]
    pub async fn send_synchronous(&self, mut request: HttpRequest) -> Result<String> {
        let outcome = self.executor().execute(&mut request).await;
        request.dispose();
        outcome.map(HttpResponse::into_body)
    }

    /// Awaitable form of [`send_with_retry`](Self::send_with_retry) using
    /// the configured retry policy.
    ///
    /// # Errors
    ///
    /// The error the callback would have received.
    pub async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let policy = self.config().retry_policy;
        self.fetch_with_retry(request, policy).await
    }

    /// Awaitable form of [`send_with_retry`](Self::send_with_retry).
    ///
    /// # Errors
    ///
    /// The error the callback would have received, or a network error if
    /// the scheduler dropped the call.
    pub async fn fetch_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.send_with_retry(
            request,
            policy,
            Some(Box::new(move |outcome| {
                let _ = tx.send(outcome);
            })),
        );
        rx.await
            .map_err(|_| Error::network("Scheduler dropped the request before it completed"))?
    }
}
