use std::env;
use std::fs;
use std::path::PathBuf;

/// Filesystem layout for a backend instance.
///
/// All state lives under one data directory: uploaded source files, the
/// vector store snapshot, and log output.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub vector_dir: PathBuf,
    pub log_dir: PathBuf,
    pub snapshot_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = discover_data_dir();
        Self::with_data_dir(data_dir)
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let upload_dir = data_dir.join("uploads");
        let vector_dir = data_dir.join("vector_store");
        let log_dir = data_dir.join("logs");
        let snapshot_path = vector_dir.join("vs_index.json");

        for dir in [&data_dir, &upload_dir, &vector_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            upload_dir,
            vector_dir,
            log_dir,
            snapshot_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("EVENTEASE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}
