use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::{debug, info, warn};

/// Removes a local file. Missing files are a no-op and failures are only logged.
pub async fn cleanup_local_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "local_cleanup: removed file"),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "local_cleanup: nothing to remove")
        }
        Err(err) => warn!(
            path = %path.display(),
            error = %err,
            "local_cleanup: failed to remove file"
        ),
    }
}
