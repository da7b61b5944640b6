//! Response body for a typeset PDF.
//!
//! The stream owns the job's temporary directory, so the directory is removed
//! when the body has been sent or when it is dropped early (client gone).

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_web::web::Bytes;
use futures_util::Stream;
use tempfile::TempDir;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub struct PdfStream {
    inner: ReaderStream<File>,
    workspace: Option<TempDir>,
}

impl PdfStream {
    pub async fn open(path: &Path, workspace: TempDir) -> io::Result<(Self, u64)> {
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok((
            Self {
                inner: ReaderStream::new(file),
                workspace: Some(workspace),
            },
            len,
        ))
    }

    /// Directory that will be removed when the stream ends.
    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace.as_ref().map(|dir| dir.path())
    }

    fn release_workspace(&mut self) {
        if let Some(workspace) = self.workspace.take() {
            let path = workspace.path().to_path_buf();
            if let Err(e) = workspace.close() {
                log::error!("Failed to remove job workspace {}: {}", path.display(), e);
            } else {
                log::debug!("Removed job workspace {}", path.display());
            }
        }
    }
}

impl Stream for PdfStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let poll = Pin::new(&mut self.inner).poll_next(cx);
        if let Poll::Ready(None) = poll {
            self.release_workspace();
        }
        poll
    }
}

impl Drop for PdfStream {
    fn drop(&mut self) {
        self.release_workspace();
    }
}
