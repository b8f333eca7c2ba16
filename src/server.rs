//! Server wiring for the stdio and TCP line transports.
//!
//! Both transports feed requests through one mpsc job queue into a single
//! blocking worker that owns the database connection, so every request is
//! processed strictly in arrival order no matter how many connections are
//! open. The scheduled retention pass submits through the same queue.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use crate::config::{MnemoConfig, RetentionConfig};
use crate::db;
use crate::dispatch::Dispatcher;

/// One raw protocol line waiting for its response.
struct Job {
    line: String,
    reply: oneshot::Sender<String>,
}

const JOB_QUEUE_DEPTH: usize = 64;

/// Open the database and run the configured transport until it ends.
pub async fn serve(config: MnemoConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let dispatcher = Dispatcher::new(conn, config.clone());
    let (jobs, queue) = mpsc::channel::<Job>(JOB_QUEUE_DEPTH);
    let worker = spawn_worker(dispatcher, queue);

    let retention = config
        .retention
        .enabled
        .then(|| spawn_retention(jobs.clone(), config.retention.clone()));

    match config.server.transport.as_str() {
        "tcp" => serve_tcp(&config.server.listen, jobs.clone()).await?,
        _ => serve_stdio(jobs.clone()).await?,
    }

    if let Some(task) = retention {
        task.abort();
    }
    drop(jobs);
    worker.await?;
    tracing::info!("server shut down");

    Ok(())
}

/// The single worker. Owns the connection; drains the queue until every
/// sender is gone.
fn spawn_worker(
    mut dispatcher: Dispatcher,
    mut queue: mpsc::Receiver<Job>,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Some(job) = queue.blocking_recv() {
            let response = dispatcher.handle_line(&job.line);
            // A dropped reply means the submitter went away; keep draining.
            let _ = job.reply.send(response.to_string());
        }
        tracing::debug!("job queue closed, worker exiting");
    })
}

/// Queue one line and wait for its response. `None` means the worker is gone.
async fn submit(jobs: &mpsc::Sender<Job>, line: String) -> Option<String> {
    let (reply, response) = oneshot::channel();
    jobs.send(Job { line, reply }).await.ok()?;
    response.await.ok()
}

/// One request per stdin line, one response per stdout line. Logs go to
/// stderr so stdout stays protocol-clean. Exits on EOF.
async fn serve_stdio(jobs: mpsc::Sender<Job>) -> Result<()> {
    tracing::info!("serving line protocol on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(response) = submit(&jobs, line).await else {
            break;
        };
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed");
    Ok(())
}

/// Same line protocol over a local TCP socket. Connections share the one
/// worker, so cross-connection writes stay serialized. Ctrl-C stops the
/// accept loop.
async fn serve_tcp(listen: &str, jobs: mpsc::Sender<Job>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(addr = %listen, "serving line protocol on tcp");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                tracing::debug!(peer = %peer, "connection opened");
                let jobs = jobs.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(socket, jobs).await {
                        tracing::debug!(error = %err, "connection ended with error");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down tcp server");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(socket: TcpStream, jobs: mpsc::Sender<Job>) -> std::io::Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(response) = submit(&jobs, line).await else {
            break;
        };
        write_half.write_all(response.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
        write_half.flush().await?;
    }

    Ok(())
}

/// Periodic cleanup, submitted through the job queue like any other request
/// so it never races a client write. A failed pass is logged and waited out,
/// never retried early.
fn spawn_retention(
    jobs: mpsc::Sender<Job>,
    retention: RetentionConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval =
            std::time::Duration::from_secs(retention.interval_hours.saturating_mul(3600));
        tracing::info!(
            every_hours = retention.interval_hours,
            max_age_days = retention.max_age_days,
            "scheduled retention enabled"
        );

        loop {
            tokio::time::sleep(interval).await;

            let line = serde_json::json!({
                "method": "cleanup_memories",
                "params": {
                    "days": retention.max_age_days,
                    "min_importance": retention.min_importance,
                }
            })
            .to_string();

            let Some(raw) = submit(&jobs, line).await else {
                break;
            };
            match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(v) if v["success"] == serde_json::json!(true) => {
                    tracing::info!(deleted = %v["deleted_count"], "scheduled cleanup finished");
                }
                Ok(v) => {
                    tracing::warn!(error = %v["error"], "scheduled cleanup failed");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "scheduled cleanup response unreadable");
                }
            }
        }
    })
}
