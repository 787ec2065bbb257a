use crate::infra::storages::{r2::R2StorageConfig, worker_binding::WorkerBindingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Sign requests ourselves against the R2 S3 API.
    Direct,
    /// PUT to the worker, which writes through its R2 binding.
    WorkerBinding,
}

#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub mode: UploadMode,
    pub r2: R2StorageConfig,
    pub worker_binding: WorkerBindingConfig,
}
