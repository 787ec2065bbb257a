use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crates::{
    application::usecases::upload_file::{CleanupPolicy, UploadFileUseCase},
    config,
    infra::storages::build_uploader,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "media-upload", about = "Upload a downloaded file to R2")]
pub struct Cli {
    /// Path to the local file to upload
    pub local_path: PathBuf,
    /// Task identifier, used as the key prefix
    pub task_id: String,
    /// Object name under the task prefix (defaults to the local file name)
    #[arg(long)]
    pub filename: Option<String>,
    /// When to delete the local file after the upload attempt
    #[arg(long, value_enum, default_value_t = CleanupArg::Never)]
    pub cleanup: CleanupArg,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CleanupArg {
    Always,
    OnSuccess,
    Never,
}

impl From<CleanupArg> for CleanupPolicy {
    fn from(arg: CleanupArg) -> Self {
        match arg {
            CleanupArg::Always => CleanupPolicy::Always,
            CleanupArg::OnSuccess => CleanupPolicy::OnSuccess,
            CleanupArg::Never => CleanupPolicy::Never,
        }
    }
}

/// Returns whether the upload succeeded.
pub async fn run(cli: Cli) -> Result<bool> {
    crates::observability::init_observability("media-upload")?;

    let uploader_config = config::config_loader::load()?;
    info!(mode = ?uploader_config.mode, "ENV has been loaded");

    let filename = resolve_filename(&cli)?;
    let usecase = UploadFileUseCase::new(build_uploader(&uploader_config).await?);

    let result = usecase
        .upload_then_cleanup(&cli.local_path, &cli.task_id, &filename, cli.cleanup.into())
        .await;

    if cli.json {
        println!("{}", serde_json::to_string(&result)?);
    } else if let Some(url) = result.url.as_deref() {
        println!("uploaded {} -> {}", cli.local_path.display(), url);
    } else {
        println!(
            "upload failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(result.success)
}

fn resolve_filename(cli: &Cli) -> Result<String> {
    if let Some(filename) = cli.filename.as_deref().filter(|f| !f.is_empty()) {
        return Ok(filename.to_string());
    }

    cli.local_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| {
            format!(
                "cannot derive a filename from {}; pass --filename",
                cli.local_path.display()
            )
        })
}
