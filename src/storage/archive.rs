//! Streams a whole namespace as a gzip-compressed tar archive.
//!
//! The archive is produced incrementally through an in-memory pipe: a
//! builder task tars each stored file into a gzip encoder whose output is
//! read by the HTTP response body. Nothing is materialized on disk and at
//! most one pipe buffer of archive bytes exists in memory at a time.

use async_compression::Level;
use async_compression::tokio::write::GzipEncoder;
use tokio::io::{AsyncWriteExt, DuplexStream, duplex};
use tokio_tar::Builder;

use crate::error::Result;

use super::namespace::Namespace;
use super::store::FileStore;

const PIPE_BUFFER: usize = 64 * 1024;

/// Content type of the produced archive.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/gzip";

/// Download file name for a namespace archive.
#[must_use]
pub fn archive_file_name(namespace: Namespace) -> String {
    format!("{namespace}-files.tar.gz")
}

/// Returns a stream of archive bytes covering every regular file directly
/// under the namespace root.
///
/// A failure after streaming has begun truncates the stream; the error is
/// logged here and surfaces to the client as a short read. Gzip is run at
/// maximum compression.
#[must_use]
pub fn stream_namespace_archive(store: FileStore, namespace: Namespace) -> DuplexStream {
    let (writer, reader) = duplex(PIPE_BUFFER);

    tokio::spawn(async move {
        if let Err(e) = build_archive(&store, namespace, writer).await {
            tracing::error!("archive stream for namespace {namespace} aborted: {e}");
        }
    });

    reader
}

async fn build_archive(
    store: &FileStore,
    namespace: Namespace,
    writer: DuplexStream,
) -> Result<()> {
    let encoder = GzipEncoder::with_quality(writer, Level::Best);
    let mut builder = Builder::new(encoder);

    for entry in store.list(namespace).await? {
        if entry.is_directory {
            continue;
        }
        let (mut file, _len) = store.open_for_read(namespace, &entry.name).await?;
        builder.append_file(&entry.name, &mut file).await?;
    }

    // Terminating tar blocks, then the gzip trailer. Dropping the encoder
    // afterwards closes the pipe and ends the response body.
    let mut encoder = builder.into_inner().await?;
    encoder.shutdown().await?;
    Ok(())
}
