//! Connector package archives and extraction.

use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::metadata::ConnectorMetadata;

/// A downloaded connector package: an open archive plus its identity.
///
/// Created once a package download completes and its archive is opened. The
/// caller that opened the reader owns it; dropping the package releases the
/// underlying handle. Extraction borrows the archive and never closes it.
pub struct ConnectorPackage<R: Read + Seek> {
    metadata: ConnectorMetadata,
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ConnectorPackage<R> {
    /// Wrap an open archive reader.
    ///
    /// Fails with [`Error::Archive`] if the reader does not contain a valid
    /// archive.
    pub fn new(metadata: ConnectorMetadata, reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| Error::archive(e.to_string()))?;
        Ok(Self { metadata, archive })
    }

    /// Identity of the packaged connector.
    pub fn metadata(&self) -> &ConnectorMetadata {
        &self.metadata
    }

    /// Extract all file entries beneath `destination`.
    ///
    /// Entries are written in archive order. Directory entries are not
    /// materialized separately; intermediate directories are created as
    /// files are written. Existing files are overwritten, so re-extracting
    /// the same package converges to the same tree.
    ///
    /// Extraction is not transactional: on failure or cancellation, entries
    /// already written remain on disk. Callers that need a clean destination
    /// should extract into a fresh temporary directory and rename it into
    /// place.
    pub async fn extract(
        &mut self,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        for index in 0..self.archive.len() {
            if cancel.is_cancelled() {
                tracing::debug!(
                    connector = %self.metadata,
                    entries_written = index,
                    "extraction canceled"
                );
                return Err(Error::Canceled);
            }

            // The zip reader is synchronous; buffer the entry, then hand the
            // write to the async filesystem.
            let (name, contents) = {
                let mut entry = self
                    .archive
                    .by_index(index)
                    .map_err(|e| Error::archive(e.to_string()))?;
                if entry.is_dir() {
                    continue;
                }
                let name = entry.name().to_string();
                let mut contents = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut contents)
                    .map_err(|e| Error::archive(format!("{name}: {e}")))?;
                (name, contents)
            };

            let target = safe_join(destination, &name)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::io(parent, e))?;
            }
            tokio::fs::write(&target, &contents)
                .await
                .map_err(|e| Error::io(&target, e))?;

            tracing::debug!(entry = %name, target = %target.display(), "extracted entry");
        }

        tracing::debug!(connector = %self.metadata, destination = %destination.display(), "package extracted");
        Ok(())
    }
}

/// Join `entry_name` beneath `destination`, rejecting entries that resolve
/// outside it.
///
/// Archive entry names are attacker-controlled: absolute paths, drive
/// prefixes, and parent-directory traversal must not escape the destination
/// (zip-slip). Dot segments are resolved lexically and the joined path is
/// then checked to still be a strict descendant of `destination`. The
/// containment check is explicit rather than delegated to the archive
/// library.
fn safe_join(destination: &Path, entry_name: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        entry: entry_name.to_string(),
    };

    let mut target = destination.to_path_buf();
    for component in Path::new(entry_name).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !target.pop() || !target.starts_with(destination) {
                    return Err(unsafe_path());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_path()),
        }
    }

    if !target.starts_with(destination) || target == destination {
        return Err(unsafe_path());
    }
    Ok(target)
}
