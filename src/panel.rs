use std::future::Future;
use tokio::task::JoinHandle;

use crate::error::ToolError;

/// The per-operation state machine every panel instantiates: idle ->
/// loading -> idle-with-result | idle-with-error, then back to loading on the
/// next submit. Starting clears the prior outcome; a terminal transition
/// populates exactly one of result or error; a start while loading is
/// ignored, so one call is in flight per operation at most.
pub struct AsyncTask<T> {
    loading: bool,
    error: Option<String>,
    result: Option<T>,
    failure_message: &'static str,
    handle: Option<JoinHandle<Result<T, ToolError>>>,
}

impl<T> Default for AsyncTask<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            result: None,
            failure_message: "Sorry, something went wrong. Please try again.",
            handle: None,
        }
    }
}

impl<T: Send + 'static> AsyncTask<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Record a locally-caught error (validation, speech) without spawning.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.loading {
            return;
        }
        self.result = None;
        self.error = Some(message.into());
    }

    /// Spawn the operation. `failure_message` is the tool's generic message
    /// shown in place of backend and decode errors.
    pub fn start<F>(&mut self, operation: F, failure_message: &'static str)
    where
        F: Future<Output = Result<T, ToolError>> + Send + 'static,
    {
        if self.loading {
            return;
        }
        self.loading = true;
        self.error = None;
        self.result = None;
        self.failure_message = failure_message;
        self.handle = Some(tokio::spawn(operation));
    }

    /// Called from the UI tick; folds a finished task into the terminal
    /// state. Does nothing while the task is still running.
    pub async fn poll(&mut self) {
        let finished = self
            .handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        let handle = self.handle.take().expect("finished handle present");
        self.loading = false;
        match handle.await {
            Ok(Ok(value)) => self.result = Some(value),
            Ok(Err(err)) => self.error = Some(err.display_message(self.failure_message)),
            Err(_) => self.error = Some(self.failure_message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn poll_until_settled<T: Send + 'static>(task: &mut AsyncTask<T>) {
        for _ in 0..200 {
            task.poll().await;
            if !task.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task never settled");
    }

    #[tokio::test]
    async fn test_success_populates_result_only() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.start(async { Ok(42) }, "failed");
        assert!(task.is_loading());
        poll_until_settled(&mut task).await;
        assert_eq!(task.result(), Some(&42));
        assert!(task.error().is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_shows_generic_message() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.start(
            async { Err(ToolError::backend("Gemini API error 500: boom")) },
            "Sorry, I couldn't create a recipe at the moment. Please try again later.",
        );
        poll_until_settled(&mut task).await;
        assert!(task.result().is_none());
        assert_eq!(
            task.error(),
            Some("Sorry, I couldn't create a recipe at the moment. Please try again later.")
        );
    }

    #[tokio::test]
    async fn test_validation_failure_shows_its_own_message() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.start(
            async { Err(ToolError::validation("Please enter some ingredients.")) },
            "generic",
        );
        poll_until_settled(&mut task).await;
        assert_eq!(task.error(), Some("Please enter some ingredients."));
    }

    #[tokio::test]
    async fn test_start_clears_prior_outcome() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.start(async { Err(ToolError::backend("boom")) }, "failed");
        poll_until_settled(&mut task).await;
        assert!(task.error().is_some());

        task.start(async { Ok(7) }, "failed");
        assert!(task.error().is_none());
        assert!(task.result().is_none());
        poll_until_settled(&mut task).await;
        assert_eq!(task.result(), Some(&7));
        assert!(task.error().is_none());
    }

    #[tokio::test]
    async fn test_start_while_loading_is_ignored() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.start(
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(1)
            },
            "failed",
        );
        // A second submission while in flight must not replace the task.
        task.start(async { Ok(2) }, "failed");
        poll_until_settled(&mut task).await;
        assert_eq!(task.result(), Some(&1));
    }

    #[tokio::test]
    async fn test_fail_records_local_error() {
        let mut task: AsyncTask<u32> = AsyncTask::new();
        task.fail("Please enter a prompt to generate an image.");
        assert!(!task.is_loading());
        assert_eq!(task.error(), Some("Please enter a prompt to generate an image."));
        assert!(task.result().is_none());
    }
}
