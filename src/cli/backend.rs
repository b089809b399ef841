use std::path::PathBuf;

use crate::backend::{BackendServer, PromptLibrary};
use crate::error::Result;

/// Run the development backend until Ctrl+C.
pub async fn run_backend(bind: &str, prompts: Option<PathBuf>) -> Result<()> {
    let library = PromptLibrary::new(prompts)?;
    if let Some(dir) = library.dir() {
        eprintln!("clipwise: loading prompts from {}", dir.display());
    }

    let server = BackendServer::bind(bind, library).await?;
    eprintln!("clipwise: backend listening on {}", server.endpoint());

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.notify_one();
        }
    });

    server.serve().await
}
