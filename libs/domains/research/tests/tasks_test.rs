use async_trait::async_trait;
use domain_research::tasks::{
    CleanupOldFilesTask, DataProcessor, EmailMessage, EmailTransport, HealthCheckTask,
    ProcessDataTask, SendEmailTask, SimulatedProcessor, SimulatedTransport, SystemSampler,
    SystemSnapshot,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use task_worker::{
    Progress, Task, TaskContext, TaskError, TaskRegistry, TaskState, TaskWorker, WorkerConfig,
};
use tokio::sync::watch;

fn simulated_process_data() -> ProcessDataTask {
    ProcessDataTask::new(Arc::new(SimulatedProcessor::new(Duration::from_millis(100))))
}

/// Fails on item `fail_at` for the first `failures` attempts.
struct FlakyProcessor {
    fail_at: u64,
    failures: u32,
    attempts: AtomicU32,
}

#[async_trait]
impl DataProcessor for FlakyProcessor {
    async fn process_item(&self, current: u64, _total: u64) -> eyre::Result<()> {
        if current == self.fail_at {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                eyre::bail!("disk full");
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> eyre::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct FailingTransport;

#[async_trait]
impl EmailTransport for FailingTransport {
    async fn send(&self, _message: &EmailMessage) -> eyre::Result<()> {
        eyre::bail!("SMTP connection refused")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

struct FixedSampler(Result<SystemSnapshot, String>);

impl SystemSampler for FixedSampler {
    fn sample(&self) -> eyre::Result<SystemSnapshot> {
        self.0.clone().map_err(|e| eyre::eyre!(e))
    }
}

async fn run_in_worker(registry: TaskRegistry, name: &str, payload: Value) -> task_worker::TaskStatus {
    let worker = TaskWorker::new(registry, WorkerConfig::default());
    let queue = worker.queue();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(worker.run(shutdown_rx));

    let id = queue.enqueue(name, payload).await.unwrap();
    let status = queue.store().wait_for_completion(&id).await.unwrap();

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    status
}

#[tokio::test(start_paused = true)]
async fn test_process_data_reports_progress_for_each_item() {
    let (ctx, mut progress) = TaskContext::detached("process_data");

    let result = simulated_process_data()
        .run(&ctx, json!({"total": 5}))
        .await
        .unwrap();

    assert_eq!(result["status"], "completed");
    assert_eq!(result["processed_items"], 5);
    assert_eq!(result["task_id"], ctx.task_id().to_string());

    let mut updates = Vec::new();
    while let Ok(update) = progress.try_recv() {
        updates.push(update);
    }
    let expected: Vec<_> = (1..=5).map(|current| Progress { current, total: 5 }).collect();
    assert_eq!(updates, expected);
}

#[tokio::test(start_paused = true)]
async fn test_process_data_defaults_to_100_items() {
    let (ctx, mut progress) = TaskContext::detached("process_data");
    let start = tokio::time::Instant::now();

    let result = simulated_process_data().run(&ctx, json!({})).await.unwrap();

    assert_eq!(result["processed_items"], 100);
    assert!(start.elapsed() >= Duration::from_secs(10));

    let mut last = None;
    while let Ok(update) = progress.try_recv() {
        last = Some(update);
    }
    assert_eq!(last, Some(Progress { current: 100, total: 100 }));
}

#[tokio::test]
async fn test_process_data_rejects_malformed_payload() {
    let (ctx, _progress) = TaskContext::detached("process_data");

    let err = simulated_process_data()
        .run(&ctx, json!({"total": -1}))
        .await
        .unwrap_err();

    assert!(matches!(err, TaskError::InvalidPayload(_)));
    assert!(!err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_process_data_retries_then_succeeds() {
    let processor = Arc::new(FlakyProcessor {
        fail_at: 2,
        failures: 2,
        attempts: AtomicU32::new(0),
    });
    let registry = TaskRegistry::new().with(ProcessDataTask::new(processor));

    let status = run_in_worker(registry, "process_data", json!({"total": 3})).await;

    assert_eq!(status.state, TaskState::Success);
    assert_eq!(status.retries, 2);
    assert_eq!(status.result.unwrap()["processed_items"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_process_data_fails_with_original_error_after_three_retries() {
    let processor = Arc::new(FlakyProcessor {
        fail_at: 1,
        failures: u32::MAX,
        attempts: AtomicU32::new(0),
    });
    let registry = TaskRegistry::new().with(ProcessDataTask::new(processor.clone()));

    let status = run_in_worker(registry, "process_data", json!({"total": 3})).await;

    assert_eq!(status.state, TaskState::Failure);
    assert_eq!(status.retries, 3);
    assert_eq!(status.error.as_deref(), Some("disk full"));
    assert_eq!(processor.attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_send_email_returns_confirmation() {
    let transport = Arc::new(RecordingTransport::default());
    let task = SendEmailTask::new(transport.clone());
    let (ctx, _progress) = TaskContext::detached("send_email");

    let result = task
        .run(
            &ctx,
            json!({"recipient": "a@example.com", "subject": "Report ready", "body": "See attached"}),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({"status": "sent", "recipient": "a@example.com", "subject": "Report ready"})
    );
    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, "See attached");
}

#[tokio::test(start_paused = true)]
async fn test_simulated_transport_takes_two_seconds() {
    let task = SendEmailTask::new(Arc::new(SimulatedTransport::new(Duration::from_secs(2))));
    let (ctx, _progress) = TaskContext::detached("send_email");
    let start = tokio::time::Instant::now();

    task.run(&ctx, json!({"recipient": "a@example.com", "subject": "s", "body": "b"}))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_send_email_failure_is_terminal() {
    let registry = TaskRegistry::new().with(SendEmailTask::new(Arc::new(FailingTransport)));

    let status = run_in_worker(
        registry,
        "send_email",
        json!({"recipient": "a@example.com", "subject": "s", "body": "b"}),
    )
    .await;

    assert_eq!(status.state, TaskState::Failure);
    assert_eq!(status.retries, 0);
    assert_eq!(status.error.as_deref(), Some("SMTP connection refused"));
}

#[tokio::test]
async fn test_cleanup_reports_nothing_removed() {
    let task = CleanupOldFilesTask::new(PathBuf::from("/tmp"));
    let (ctx, _progress) = TaskContext::detached("cleanup_old_files");

    let result = task.run(&ctx, json!({})).await.unwrap();

    assert_eq!(
        result,
        json!({"status": "completed", "cleaned_files": 0, "directory": "/tmp"})
    );
}

#[tokio::test]
async fn test_health_check_without_sampler_is_minimal() {
    let task = HealthCheckTask::new(None);
    let (ctx, _progress) = TaskContext::detached("health_check");

    let result = task.run(&ctx, Value::Null).await.unwrap();

    let obj = result.as_object().unwrap();
    assert_eq!(obj.len(), 2);
    assert_eq!(obj["status"], "healthy");
    assert!(chrono::DateTime::parse_from_rfc3339(obj["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_health_check_with_sampler_reports_utilisation() {
    let sampler = FixedSampler(Ok(SystemSnapshot {
        cpu_percent: 12.5,
        memory_percent: 40.0,
        disk_percent: 70.1,
    }));
    let task = HealthCheckTask::new(Some(Arc::new(sampler)));
    let (ctx, _progress) = TaskContext::detached("health_check");

    let result = task.run(&ctx, json!({})).await.unwrap();

    assert_eq!(result["status"], "healthy");
    assert_eq!(result["cpu_percent"], 12.5);
    assert_eq!(result["memory_percent"], 40.0);
    assert_eq!(result["disk_percent"], 70.1);
    assert!(result["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_check_sampling_error_is_reported_not_raised() {
    let sampler = FixedSampler(Err("permission denied reading /proc".to_string()));
    let task = HealthCheckTask::new(Some(Arc::new(sampler)));
    let (ctx, _progress) = TaskContext::detached("health_check");

    let result = task.run(&ctx, json!({})).await.unwrap();

    assert_eq!(result["status"], "unhealthy");
    assert_eq!(result["error"], "permission denied reading /proc");
    assert!(result["timestamp"].is_string());
}
