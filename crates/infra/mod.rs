pub mod local_files;
pub mod storages;
