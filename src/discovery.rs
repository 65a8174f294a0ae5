use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Version-control metadata directories whose contents are never visited.
pub const VCS_DIRS: [&str; 3] = ["CVS", ".svn", ".git"];

/// Extensions scanned when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["js", "hh", "cc"];

/// Configuration for source-file discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// File extensions (without the dot) that are lint candidates
    pub extensions: Vec<String>,
    /// Whether to fail fast on first traversal error or continue processing
    pub fail_fast: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            fail_fast: false,
        }
    }
}

impl DiscoveryConfig {
    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|want| want == e))
    }
}

fn is_pruned_dir(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| VCS_DIRS.contains(&n))
}

/// Discovers candidate source files recursively under the given root,
/// pruning version-control metadata directories and filtering by extension.
/// Returns an async stream of file paths. No traversal order is guaranteed.
pub fn discover_source_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<PathBuf>> {
    let root_path = root_dir.as_ref().to_path_buf();

    futures::stream::unfold(WalkerState::new(root_path, config), |mut state| async move {
        state.next_file().await.map(|result| (result, state))
    })
}

/// Parallel directory traversal using the ripgrep walker
/// WHY: the parallel walker amortizes stat calls across threads on large trees
pub fn discover_source_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<PathBuf>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let config = Arc::new(config);

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        info!("Starting parallel directory traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();

        let walker = WalkBuilder::new(&root_path)
            .threads((num_cpus::get() / 2).max(1))
            .follow_links(false)
            .hidden(false) // pruning is by directory name, hidden files are still scanned
            .ignore(false)
            .git_ignore(false)
            .filter_entry(|entry| {
                !(entry.file_type().is_some_and(|ft| ft.is_dir())
                    && is_pruned_dir(entry.file_name()))
            })
            .build_parallel();

        let (result_tx, result_rx) = std::sync::mpsc::channel();
        let walk_config = Arc::clone(&config);

        // Run the walker on its own thread so the blocking callbacks never
        // stall the async runtime.
        std::thread::spawn(move || {
            walker.run(|| {
                let result_tx = result_tx.clone();
                let config = Arc::clone(&walk_config);
                Box::new(move |result| {
                    match result {
                        Ok(entry) => {
                            if entry.file_type().is_some_and(|ft| ft.is_file())
                                && config.matches_extension(entry.path())
                            {
                                debug!("Found candidate file: {}", entry.path().display());
                                let _ = result_tx.send(Ok(entry.path().to_path_buf()));
                            }
                        }
                        Err(e) => {
                            let _ = result_tx
                                .send(Err(anyhow::anyhow!("Directory traversal error: {e}")));
                        }
                    }
                    WalkState::Continue
                })
            });
            drop(result_tx);
        });

        let mut file_count = 0;
        while let Ok(result) = result_rx.recv() {
            match result {
                Ok(path) => {
                    file_count += 1;
                    if tx.send(Ok(path)).is_err() {
                        debug!("Receiver dropped, stopping discovery");
                        break;
                    }
                }
                Err(e) => {
                    if config.fail_fast {
                        if tx.send(Err(e)).is_err() {
                            debug!("Receiver dropped, stopping discovery");
                        }
                        break;
                    } else {
                        warn!("Traversal error (continuing): {}", e);
                    }
                }
            }
        }

        let traversal_time = traversal_start.elapsed();
        info!(
            "Parallel discovery streamed {} files in {}ms",
            file_count,
            traversal_time.as_millis()
        );
    });

    futures::stream::unfold(rx, |mut receiver| async move {
        receiver.recv().await.map(|result| (result, receiver))
    })
}

/// Internal state for serial file discovery iteration
struct WalkerState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    walker: Option<Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + Send>>,
}

impl WalkerState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            walker: None,
        }
    }

    async fn next_file(&mut self) -> Option<Result<PathBuf>> {
        // Initialize the walker on first call
        if self.walker.is_none() {
            debug!("Starting source discovery under: {}", self.root_dir.display());
            let walker = WalkDir::new(&self.root_dir)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| {
                    !(entry.file_type().is_dir() && is_pruned_dir(entry.file_name()))
                });
            self.walker = Some(Box::new(walker));
            info!("Source discovery initialized for root: {}", self.root_dir.display());
        }

        let walker = self.walker.as_mut()?;
        loop {
            match walker.next() {
                Some(Ok(entry)) => {
                    if entry.file_type().is_file() && self.config.matches_extension(entry.path())
                    {
                        debug!("Found candidate file: {}", entry.path().display());
                        return Some(Ok(entry.path().to_path_buf()));
                    }
                }
                Some(Err(e)) => {
                    let error_msg = format!("Directory traversal error: {e}");
                    warn!("{}", error_msg);

                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                    // Continue to the next entry on non-fatal walk errors
                }
                None => {
                    info!("Source discovery completed");
                    return None;
                }
            }
        }
    }
}

/// Collect all discovered files into a Vec for easier processing
pub async fn collect_source_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_source_files(root_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    info!("Discovered {} candidate files", files.len());
    Ok(files)
}

/// Collect all discovered files using parallel directory traversal
pub async fn collect_source_files_parallel(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_source_files_parallel(root_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    info!("Parallel discovery completed: {} candidate files", files.len());
    Ok(files)
}
