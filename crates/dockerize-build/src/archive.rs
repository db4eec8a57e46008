use std::io::{Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use dockerize_core::{AppStream, Entry, EntryData};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Archive path of the recipe; always the last entry.
pub const RECIPE_ENTRY: &str = "Dockerfile";

const FILE_MODE: u32 = 0o644;

const STREAM_CHUNK: usize = 64 * 1024;

/// Assembles build-context tarballs.
///
/// Entries are written in the order given, followed by the recipe.
/// Streams are spooled to an anonymous temporary file in chunks and copied
/// from there into the archive.
///
/// In-memory and streamed entries get mode 0644 and a fixed mtime so the
/// same inputs always produce the same bytes. Files and directory trees
/// keep their on-disk metadata; trees are walked in file name order.
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    mtime: u64,
}

/// An entry whose data no longer needs async I/O.
enum Staged {
    Memory { name: PathBuf, data: Bytes },
    Spooled { name: PathBuf, file: std::fs::File, size: u64 },
    File { name: PathBuf, path: PathBuf },
    Tree { name: PathBuf, root: PathBuf },
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modification time, in seconds since the unix epoch, for in-memory entries.
    pub fn mtime(mut self, mtime: u64) -> Self {
        self.mtime = mtime;
        self
    }

    /// Builds the complete archive.
    ///
    /// Nothing is returned until every entry has been written, so a failed
    /// read never yields a truncated archive.
    pub async fn build(&self, recipe: &str, entries: Vec<Entry>) -> Result<Bytes, ArchiveError> {
        let mut staged = Vec::with_capacity(entries.len() + 1);
        for entry in entries {
            staged.push(stage(entry).await?);
        }
        staged.push(Staged::Memory {
            name: PathBuf::from(RECIPE_ENTRY),
            data: Bytes::from(recipe.to_owned()),
        });

        let mtime = self.mtime;
        let count = staged.len();
        let tarball = tokio::task::spawn_blocking(move || encode(staged, mtime))
            .await
            .map_err(|e| ArchiveError::Task { source: e })??;

        tracing::debug!(entries = count, bytes = tarball.len(), "archive assembled");
        Ok(Bytes::from(tarball))
    }
}

/// Builds an archive with the default [`ArchiveBuilder`].
pub async fn build_archive(recipe: &str, entries: Vec<Entry>) -> Result<Bytes, ArchiveError> {
    ArchiveBuilder::new().build(recipe, entries).await
}

/// Writes a built archive to disk.
pub async fn write_archive(path: &Path, archive: &[u8]) -> Result<(), ArchiveError> {
    tokio::fs::write(path, archive)
        .await
        .map_err(|e| ArchiveError::Write {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn stage(entry: Entry) -> Result<Staged, ArchiveError> {
    let name = archive_name(&entry.name)?;
    let staged = match entry.data {
        EntryData::Text(text) => Staged::Memory {
            name,
            data: Bytes::from(text),
        },
        EntryData::Bytes(data) => Staged::Memory { name, data },
        EntryData::Stream(stream) => {
            let (file, size) = spool(&entry.name, stream).await?;
            Staged::Spooled { name, file, size }
        }
        EntryData::File(path) => Staged::File { name, path },
        EntryData::Directory(root) => Staged::Tree { name, root },
    };
    Ok(staged)
}

/// Drains `stream` into an unnamed temporary file; returns it rewound with its size.
async fn spool(name: &str, mut stream: AppStream) -> Result<(std::fs::File, u64), ArchiveError> {
    let spool_err = |e| ArchiveError::Spool {
        name: name.to_owned(),
        source: e,
    };
    let file = tempfile::tempfile().map_err(spool_err)?;
    let mut file = tokio::fs::File::from_std(file);

    let mut chunk = vec![0u8; STREAM_CHUNK];
    let mut size = 0u64;
    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| ArchiveError::ReadStream {
                name: name.to_owned(),
                source: e,
            })?;
        if n == 0 {
            break;
        }
        file.write_all(&chunk[..n]).await.map_err(spool_err)?;
        size += n as u64;
    }
    file.flush().await.map_err(spool_err)?;

    let mut file = file.into_std().await;
    file.seek(SeekFrom::Start(0)).map_err(spool_err)?;
    Ok((file, size))
}

/// Converts an entry name into a relative archive path.
///
/// `/app/index.js` becomes `app/index.js`; `..` is rejected.
fn archive_name(name: &str) -> Result<PathBuf, ArchiveError> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(ArchiveError::InvalidName {
                    name: name.to_owned(),
                    reason: "must stay inside the build context",
                });
            }
        }
    }

    if path.as_os_str().is_empty() {
        return Err(ArchiveError::InvalidName {
            name: name.to_owned(),
            reason: "must not be empty",
        });
    }
    Ok(path)
}

fn encode(staged: Vec<Staged>, mtime: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(true);

    for entry in staged {
        match entry {
            Staged::Memory { name, data } => {
                let mut header = memory_header(data.len() as u64, mtime);
                builder
                    .append_data(&mut header, &name, data.as_ref())
                    .map_err(|e| ArchiveError::Encode {
                        name: name.clone(),
                        source: e,
                    })?;
            }
            Staged::Spooled { name, file, size } => {
                let mut header = memory_header(size, mtime);
                builder
                    .append_data(&mut header, &name, file)
                    .map_err(|e| ArchiveError::Encode {
                        name: name.clone(),
                        source: e,
                    })?;
            }
            Staged::File { name, path } => {
                builder
                    .append_path_with_name(&path, &name)
                    .map_err(|e| ArchiveError::ReadFile { path, source: e })?;
            }
            Staged::Tree { name, root } => append_tree(&mut builder, &name, &root)?,
        }
    }

    builder
        .into_inner()
        .map_err(|e| ArchiveError::Encode {
            name: PathBuf::from(RECIPE_ENTRY),
            source: e,
        })
}

fn memory_header(size: u64, mtime: u64) -> tar::Header {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(size);
    header.set_mode(FILE_MODE);
    header.set_mtime(mtime);
    header
}

fn append_tree(
    builder: &mut tar::Builder<Vec<u8>>,
    name: &Path,
    root: &Path,
) -> Result<(), ArchiveError> {
    let walker = walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name();

    for item in walker {
        let item = item.map_err(|e| ArchiveError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        // WalkDir yields paths under `root`, so the prefix is always present.
        let relative = item.path().strip_prefix(root).unwrap_or(item.path());
        let target = name.join(relative);

        builder
            .append_path_with_name(item.path(), &target)
            .map_err(|e| ArchiveError::ReadFile {
                path: item.path().to_path_buf(),
                source: e,
            })?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("invalid archive entry name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("failed to read stream for entry {name}")]
    ReadStream {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to spool stream for entry {name}")]
    Spool {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk directory {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to encode archive entry {name}")]
    Encode {
        name: PathBuf,
        source: std::io::Error,
    },

    #[error("archive task failed")]
    Task { source: tokio::task::JoinError },

    #[error("failed to write archive to {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
