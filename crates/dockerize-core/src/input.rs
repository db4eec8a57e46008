use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::AsyncRead;

/// Byte stream accepted as application input.
pub type AppStream = Box<dyn AsyncRead + Send + Unpin>;

/// Application handed to `dockerize`.
pub enum AppInput {
    /// Inline source code
    Source(String),
    /// Source code as raw bytes
    Bytes(Bytes),
    /// Source code read from a stream until EOF
    Stream(AppStream),
    /// A single source file
    File(PathBuf),
    /// A directory that supplies its own package.json
    Directory(PathBuf),
}

impl AppInput {
    /// Classifies a string the way the `dockerize` CLI does.
    ///
    /// A string naming an existing directory becomes [`AppInput::Directory`],
    /// one naming an existing file becomes [`AppInput::File`]. Anything else,
    /// including a path that fails to stat, is taken as inline source code.
    /// A mistyped path therefore ends up in the image as source code.
    pub async fn detect(value: impl Into<String>) -> Self {
        let value = value.into();
        match tokio::fs::metadata(&value).await {
            Ok(meta) if meta.is_dir() => Self::Directory(PathBuf::from(value)),
            Ok(_) => Self::File(PathBuf::from(value)),
            Err(e) => {
                tracing::debug!(error = %e, "input does not stat as a path, treating it as inline source");
                Self::Source(value)
            }
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Source(_) => EntryKind::String,
            Self::Bytes(_) => EntryKind::Buffer,
            Self::Stream(_) => EntryKind::Stream,
            Self::File(_) => EntryKind::File,
            Self::Directory(_) => EntryKind::Directory,
        }
    }

    /// Checks that a `File` or `Directory` input exists and has the declared kind.
    pub async fn verify(&self) -> crate::Result<()> {
        let (path, want_dir) = match self {
            Self::File(path) => (path, false),
            Self::Directory(path) => (path, true),
            _ => return Ok(()),
        };

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| crate::Error::InputStat {
                path: path.clone(),
                source: e,
            })?;

        if meta.is_dir() != want_dir {
            return Err(crate::Error::InputKindMismatch {
                path: path.clone(),
                expected: self.kind(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for AppInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(s) => f.debug_tuple("Source").field(s).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::File(p) => f.debug_tuple("File").field(p).finish(),
            Self::Directory(p) => f.debug_tuple("Directory").field(p).finish(),
        }
    }
}

impl From<String> for AppInput {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<&str> for AppInput {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<Vec<u8>> for AppInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for AppInput {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

/// How an entry's data is read into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    String,
    Buffer,
    Stream,
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Buffer => "buffer",
            Self::Stream => "stream",
            Self::File => "file",
            Self::Directory => "directory",
        })
    }
}

pub enum EntryData {
    Text(String),
    Bytes(Bytes),
    Stream(AppStream),
    File(PathBuf),
    Directory(PathBuf),
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(&s.len()).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::File(p) => f.debug_tuple("File").field(p).finish(),
            Self::Directory(p) => f.debug_tuple("Directory").field(p).finish(),
        }
    }
}

/// One named unit of data destined for the archive.
///
/// Directory entries contribute the whole tree under `name`.
#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub data: EntryData,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: EntryData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, EntryData::Text(text.into()))
    }

    pub fn kind(&self) -> EntryKind {
        match self.data {
            EntryData::Text(_) => EntryKind::String,
            EntryData::Bytes(_) => EntryKind::Buffer,
            EntryData::Stream(_) => EntryKind::Stream,
            EntryData::File(_) => EntryKind::File,
            EntryData::Directory(_) => EntryKind::Directory,
        }
    }
}

impl From<AppInput> for EntryData {
    fn from(input: AppInput) -> Self {
        match input {
            AppInput::Source(s) => Self::Text(s),
            AppInput::Bytes(b) => Self::Bytes(b),
            AppInput::Stream(s) => Self::Stream(s),
            AppInput::File(p) => Self::File(p),
            AppInput::Directory(p) => Self::Directory(p),
        }
    }
}
