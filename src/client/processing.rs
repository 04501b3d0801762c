use super::SummarizerClient;
use crate::error::{IndexingError, SummarizerError};
use crate::indexer::{DiscoveredFile, FileWalker};
use crate::summary::describe;
use crate::types::{FunctionRecord, ProcessingResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What one worker hands back to the aggregator
enum FileOutcome {
    Records(Vec<FunctionRecord>),
    Failed {
        path: String,
        error: SummarizerError,
    },
}

impl SummarizerClient {
    /// Extract, embed and describe every snippet of one file.
    ///
    /// `cancel` is checked while parsing and before each snippet, so a
    /// timed-out file releases its worker promptly.
    pub(crate) fn summarize_file(
        &self,
        path: &Path,
        display_path: &str,
        repo_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FunctionRecord>, SummarizerError> {
        let Some(extraction) = self.extractor.try_extract_cancellable(path, cancel)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::with_capacity(extraction.snippets.len());
        for snippet in extraction.snippets {
            if cancel.is_cancelled() {
                tracing::debug!(
                    "Stopping {} after {} of its functions",
                    display_path,
                    records.len()
                );
                return Err(IndexingError::Cancelled.into());
            }

            let embedding = self.encoder.embed(&snippet.content);
            let summary = describe(&snippet.content);

            records.push(FunctionRecord {
                repo_id: repo_id.to_string(),
                file_path: display_path.to_string(),
                language: extraction.language,
                function_code: snippet.content,
                summary,
                embedding,
            });
        }

        tracing::debug!("Processed {}: {} functions", display_path, records.len());
        Ok(records)
    }
}

/// Walk `root`, fan files out to the worker pool and merge the batches in
/// traversal order.
pub(crate) async fn process_repository(
    client: &SummarizerClient,
    root: &Path,
    repo_id: &str,
) -> Result<ProcessingResult, SummarizerError> {
    let start = Instant::now();
    let indexing = &client.config.indexing;

    tracing::info!(
        "Processing repository {} from {} with {} workers",
        repo_id,
        root.display(),
        indexing.max_workers
    );

    // Walk the directory (on a blocking thread since it touches the disk)
    let walker = FileWalker::new(root, indexing.max_file_size)
        .with_exclude_patterns(indexing.exclude_patterns.clone())
        .with_gitignore(indexing.respect_gitignore);
    let walk = tokio::task::spawn_blocking(move || walker.walk())
        .await
        .map_err(|e| IndexingError::WalkFailed(format!("File walker task failed: {}", e)))??;

    let mut result = ProcessingResult {
        files_visited: walk.files.len(),
        files_skipped: walk.skipped,
        errors: walk.errors,
        ..Default::default()
    };

    let file_timeout = Duration::from_secs(indexing.file_timeout_secs);
    let deadline = indexing
        .repository_timeout_secs
        .and_then(|secs| start.checked_add(Duration::from_secs(secs)));
    let semaphore = Arc::new(Semaphore::new(indexing.max_workers));
    let repo_id: Arc<str> = Arc::from(repo_id);

    let mut tasks = JoinSet::new();
    for (index, file) in walk.files.into_iter().enumerate() {
        let client = client.clone();
        let semaphore = semaphore.clone();
        let repo_id = repo_id.clone();
        tasks.spawn(async move {
            let outcome =
                run_file(client, file, repo_id, semaphore, file_timeout, deadline).await;
            (index, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(result.files_visited);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(pair) => outcomes.push(pair),
            Err(e) => {
                tracing::error!("File task failed: {}", e);
                result.files_failed += 1;
                result.errors.push(format!("File task failed: {}", e));
            }
        }
    }

    // Workers finish in any order; restore traversal order
    outcomes.sort_by_key(|(index, _)| *index);
    for (_, outcome) in outcomes {
        match outcome {
            FileOutcome::Records(records) => {
                if !records.is_empty() {
                    result.files_with_records += 1;
                }
                result.records.extend(records);
            }
            FileOutcome::Failed { path, error } => {
                tracing::error!("Failed to process {}: {}", path, error);
                result.files_failed += 1;
                result.errors.push(format!("{}: {}", path, error));
            }
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    tracing::info!("Finished {}: {}", repo_id, result);
    Ok(result)
}

/// Run one file on a blocking thread under the per-file and repository
/// time limits.
async fn run_file(
    client: SummarizerClient,
    file: DiscoveredFile,
    repo_id: Arc<str>,
    semaphore: Arc<Semaphore>,
    file_timeout: Duration,
    deadline: Option<Instant>,
) -> FileOutcome {
    let path = file.relative_path.clone();

    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return FileOutcome::Failed {
                path,
                error: IndexingError::Cancelled.into(),
            };
        }
    };

    let budget = match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return FileOutcome::Failed {
                    error: IndexingError::RepositoryTimeout(path.clone()).into(),
                    path,
                };
            }
            remaining.min(file_timeout)
        }
        None => file_timeout,
    };

    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let handle = tokio::task::spawn_blocking(move || {
        // Held until the work actually stops, even after a timeout
        let _permit = permit;
        client.summarize_file(&file.path, &file.relative_path, &repo_id, &worker_cancel)
    });

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(Ok(records))) => FileOutcome::Records(records),
        Ok(Ok(Err(error))) => FileOutcome::Failed { path, error },
        Ok(Err(e)) => FileOutcome::Failed {
            error: IndexingError::WorkerPanicked {
                file: path.clone(),
                reason: e.to_string(),
            }
            .into(),
            path,
        },
        Err(_) => {
            cancel.cancel();
            let error = if budget < file_timeout {
                IndexingError::RepositoryTimeout(path.clone())
            } else {
                IndexingError::FileTimeout {
                    file: path.clone(),
                    seconds: file_timeout.as_secs(),
                }
            };
            FileOutcome::Failed {
                path,
                error: error.into(),
            }
        }
    }
}
