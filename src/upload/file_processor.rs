use crate::error::{Error, Result};
use crate::upload::response::{is_confirmation, is_pending, SummaryBody};
use crate::upload::service::SummaryService;
use crate::upload::types::{FileUpdate, SelectedFile, Stage};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How often and how long to ask the webhook for a finished summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Multiplier applied to the interval after each attempt; 1.0 keeps it fixed.
    pub backoff: f64,
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
            backoff: 1.0,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

enum PollOutcome {
    Pending,
    Failed,
}

/// Drives one record through upload, polling and completion. Cheap to clone;
/// every spawned upload task gets its own copy.
#[derive(Clone)]
pub struct FileProcessor {
    service: Arc<dyn SummaryService>,
    policy: PollPolicy,
}

impl FileProcessor {
    pub fn new(service: Arc<dyn SummaryService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Runs the full sequence and always finishes with exactly one
    /// `Completed` or `Failed` update for `id`.
    pub async fn process(&self, id: String, file: SelectedFile, sender: Sender<FileUpdate>) {
        let update = match self.upload_and_wait(&id, &file, &sender).await {
            Ok(summary) => {
                info!(file_id = %id, file = %file.name, chars = summary.len(), "Summary received");
                FileUpdate::Completed { id, summary }
            }
            Err(e) => {
                error!(file_id = %id, file = %file.name, "Upload failed: {}", e);
                FileUpdate::Failed {
                    id,
                    error: e.to_string(),
                }
            }
        };
        sender.send(update).unwrap_or_default();
    }

    async fn upload_and_wait(
        &self,
        id: &str,
        file: &SelectedFile,
        sender: &Sender<FileUpdate>,
    ) -> Result<String> {
        send_stage(sender, id, Stage::Uploading);
        info!(file_id = id, file = %file.name, size = file.size(), "Uploading file");

        let body = self.service.submit(id, file).await?;

        if is_confirmation(&body) {
            info!(file_id = id, "Upload confirmed, waiting for summary");
            send_stage(sender, id, Stage::Uploaded);
            send_stage(sender, id, Stage::Processing);
            return self.poll_for_summary(id).await;
        }

        let parsed = SummaryBody::parse(&body);
        debug!(file_id = id, shape = parsed.shape(), "Submission returned a result directly");
        parsed.into_summary()
    }

    async fn poll_for_summary(&self, id: &str) -> Result<String> {
        let mut interval = self.policy.interval;
        let mut last = PollOutcome::Pending;

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(interval).await;
            debug!(
                file_id = id,
                attempt,
                max_attempts = self.policy.max_attempts,
                "Polling for summary"
            );

            last = match self.service.check_status(id).await {
                Ok(body) if is_pending(&body) => PollOutcome::Pending,
                Ok(body) => {
                    let parsed = SummaryBody::parse(&body);
                    debug!(file_id = id, shape = parsed.shape(), "Poll returned a result");
                    match parsed.into_summary() {
                        Ok(summary) => return Ok(summary),
                        Err(e) => {
                            warn!(file_id = id, attempt, "Unusable poll response: {}", e);
                            PollOutcome::Failed
                        }
                    }
                }
                Err(Error::HttpStatus(code)) => {
                    warn!(file_id = id, attempt, code, "Poll answered with error status");
                    PollOutcome::Pending
                }
                Err(e) => {
                    warn!(file_id = id, attempt, "Poll request failed: {}", e);
                    PollOutcome::Failed
                }
            };

            interval = self.policy.next_interval(interval);
        }

        warn!(file_id = id, "Max polling attempts reached");
        match last {
            PollOutcome::Pending => Err(Error::PollTimeout),
            PollOutcome::Failed => Err(Error::PollFailed),
        }
    }
}

fn send_stage(sender: &Sender<FileUpdate>, id: &str, stage: Stage) {
    sender
        .send(FileUpdate::Stage {
            id: id.to_string(),
            stage,
        })
        .unwrap_or_default();
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;

    /// Webhook stand-in that replays queued responses. Once the status queue
    /// runs dry every further check answers "File Uploaded".
    #[derive(Default)]
    pub(crate) struct ScriptedService {
        submissions: Mutex<VecDeque<Result<String>>>,
        statuses: Mutex<VecDeque<Result<String>>>,
        pub(crate) submit_calls: AtomicU32,
        pub(crate) status_calls: AtomicU32,
    }

    impl ScriptedService {
        pub(crate) fn on_submit(self, response: Result<String>) -> Self {
            self.submissions.lock().unwrap().push_back(response);
            self
        }

        pub(crate) fn on_status(self, response: Result<String>) -> Self {
            self.statuses.lock().unwrap().push_back(response);
            self
        }
    }

    #[async_trait]
    impl SummaryService for ScriptedService {
        async fn submit(&self, _id: &str, _file: &SelectedFile) -> Result<String> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.submissions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("File Uploaded".to_string()))
        }

        async fn check_status(&self, _id: &str) -> Result<String> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("File Uploaded".to_string()))
        }
    }

    fn text_file() -> SelectedFile {
        SelectedFile::new("notes.txt", "text/plain", b"some notes".to_vec())
    }

    async fn run(service: Arc<ScriptedService>) -> Vec<FileUpdate> {
        let processor = FileProcessor::new(service, PollPolicy::default());
        let (sender, receiver) = mpsc::channel();
        processor.process("f1".to_string(), text_file(), sender).await;
        receiver.try_iter().collect()
    }

    fn stage(stage: Stage) -> FileUpdate {
        FileUpdate::Stage {
            id: "f1".to_string(),
            stage,
        }
    }

    fn failed(error: &str) -> FileUpdate {
        FileUpdate::Failed {
            id: "f1".to_string(),
            error: error.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn direct_object_response_completes_without_polling() {
        let service = Arc::new(ScriptedService::default().on_submit(Ok(r#"{"text":"hello"}"#.into())));

        let updates = run(service.clone()).await;

        assert_eq!(
            updates,
            vec![
                stage(Stage::Uploading),
                FileUpdate::Completed {
                    id: "f1".into(),
                    summary: "hello".into()
                }
            ]
        );
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn direct_list_response_uses_first_text() {
        let service = Arc::new(ScriptedService::default().on_submit(Ok(r#"[{"text":"hi"}]"#.into())));

        let updates = run(service).await;

        assert_eq!(
            updates.last(),
            Some(&FileUpdate::Completed {
                id: "f1".into(),
                summary: "hi".into()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_moves_to_processing_and_polls() {
        let service = Arc::new(
            ScriptedService::default()
                .on_submit(Ok("  file uploaded \n".into()))
                .on_status(Ok(String::new()))
                .on_status(Ok("File Uploaded".into()))
                .on_status(Ok(r#"[{"text":"the summary"}]"#.into())),
        );

        let updates = run(service.clone()).await;

        assert_eq!(
            updates,
            vec![
                stage(Stage::Uploading),
                stage(Stage::Uploaded),
                stage(Stage::Processing),
                FileUpdate::Completed {
                    id: "f1".into(),
                    summary: "the summary".into()
                }
            ]
        );
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_wait_one_interval_between_attempts() {
        let service = Arc::new(
            ScriptedService::default()
                .on_status(Ok(String::new()))
                .on_status(Ok("done".into())),
        );
        let started = tokio::time::Instant::now();

        run(service).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn only_confirmations_time_out_after_max_attempts() {
        let service = Arc::new(ScriptedService::default());

        let updates = run(service.clone()).await;

        assert_eq!(updates.last(), Some(&failed("Summary generation timed out")));
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_errors_are_retried() {
        let service = Arc::new(
            ScriptedService::default()
                .on_status(Err(Error::Transport("connection reset".into())))
                .on_status(Err(Error::Transport("connection reset".into())))
                .on_status(Ok("Plain text summary".into())),
        );

        let updates = run(service).await;

        assert_eq!(
            updates.last(),
            Some(&FileUpdate::Completed {
                id: "f1".into(),
                summary: "Plain text summary".into()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_poll_errors_fail_to_retrieve() {
        let mut service = ScriptedService::default();
        for _ in 0..30 {
            service = service.on_status(Err(Error::Transport("dns failure".into())));
        }

        let updates = run(Arc::new(service)).await;

        assert_eq!(updates.last(), Some(&failed("Failed to retrieve summary")));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_error_status_counts_as_still_pending() {
        let mut service = ScriptedService::default();
        for _ in 0..30 {
            service = service.on_status(Err(Error::HttpStatus(503)));
        }

        let updates = run(Arc::new(service)).await;

        assert_eq!(updates.last(), Some(&failed("Summary generation timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn submission_transport_error_fails_immediately() {
        let service = Arc::new(
            ScriptedService::default()
                .on_submit(Err(Error::Transport("Failed to send request: refused".into()))),
        );

        let updates = run(service.clone()).await;

        assert_eq!(
            updates,
            vec![
                stage(Stage::Uploading),
                failed("Failed to send request: refused")
            ]
        );
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_error_status_fails_with_code() {
        let service = Arc::new(ScriptedService::default().on_submit(Err(Error::HttpStatus(500))));

        let updates = run(service).await;

        assert_eq!(updates.last(), Some(&failed("HTTP error! status: 500")));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submission_body_is_an_invalid_summary() {
        let service = Arc::new(ScriptedService::default().on_submit(Ok("   ".into())));

        let updates = run(service).await;

        assert_eq!(
            updates.last(),
            Some(&failed("Empty or invalid summary response"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn huge_backoff_still_ends_the_sequence() {
        let policy = PollPolicy {
            backoff: 1e300,
            ..PollPolicy::default()
        };
        let processor = FileProcessor::new(Arc::new(ScriptedService::default()), policy);
        let (sender, receiver) = mpsc::channel();

        processor.process("f1".to_string(), text_file(), sender).await;

        let updates: Vec<FileUpdate> = receiver.try_iter().collect();
        assert_eq!(updates.last(), Some(&failed("Summary generation timed out")));
    }

    #[test]
    fn overflowing_backoff_clamps_to_the_ceiling() {
        let policy = PollPolicy {
            backoff: 1e300,
            ..PollPolicy::default()
        };
        assert_eq!(
            policy.next_interval(Duration::from_secs(2)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn backoff_grows_up_to_the_ceiling() {
        let policy = PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: 5,
            backoff: 2.0,
            max_interval: Duration::from_secs(5),
        };

        let second = policy.next_interval(policy.interval);
        assert_eq!(second, Duration::from_secs(4));
        assert_eq!(policy.next_interval(second), Duration::from_secs(5));
        assert_eq!(
            PollPolicy::default().next_interval(Duration::from_secs(2)),
            Duration::from_secs(2)
        );
    }
}
