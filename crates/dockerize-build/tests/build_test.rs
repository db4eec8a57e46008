use std::io::Read;
use std::path::Path;

use bytes::Bytes;
use dockerize_build::normalize::{APP_DIR_ENTRY, APP_ENTRY, MANIFEST_ENTRY};
use dockerize_build::{ArchiveBuilder, ArchiveError, RecipeTemplate, build_archive, default_recipe, entries_for};
use dockerize_core::{AppInput, AppStream, Entry, EntryData, EntryKind, RecipeConfig};
use tempfile::TempDir;

const CODE: &str = "require('http').createServer((q, s) => s.end('Hello world')).listen(8080);";
const MANIFEST: &str = r#"{ "dependencies": { "express": "*" } }"#;

/// (path, entry type, content) for every member of a tarball.
fn unpack(archive: &[u8]) -> Vec<(String, tar::EntryType, Vec<u8>)> {
    let mut reader = tar::Archive::new(archive);
    reader
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let kind = entry.header().entry_type();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (path, kind, content)
        })
        .collect()
}

fn files(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    unpack(archive)
        .into_iter()
        .filter(|(_, kind, _)| kind.is_file())
        .map(|(path, _, content)| (path, content))
        .collect()
}

fn write_app_dir(dir: &Path) {
    std::fs::write(dir.join("index.js"), CODE).unwrap();
    std::fs::write(dir.join("package.json"), MANIFEST).unwrap();
}

// ── Recipe Tests ──

#[test]
fn default_recipe_matches_node_template() {
    assert_eq!(
        default_recipe(),
        "FROM tatsushid/tinycore-node:4.2\n\
         COPY /app /app\n\
         RUN cd /app; npm install\n\
         EXPOSE  8080\n\
         CMD [\"node\", \"/app\"]"
    );
}

#[test]
fn recipe_uses_configured_image_and_port() {
    let config = RecipeConfig {
        base_image: "node:20-alpine".to_owned(),
        internal_port: 7070,
    };
    let output = RecipeTemplate::new(&config).render();

    assert!(output.starts_with("FROM node:20-alpine\n"));
    assert!(output.contains("EXPOSE  7070"));
    assert!(!output.contains("8080"));
}

// ── Normalization Tests ──

#[tokio::test]
async fn inline_source_yields_code_and_empty_manifest() {
    let entries = entries_for(AppInput::from(CODE), None).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, APP_ENTRY);
    assert_eq!(entries[0].kind(), EntryKind::String);
    assert_eq!(entries[1].name, MANIFEST_ENTRY);
    assert!(matches!(entries[1].data, EntryData::Text(ref m) if m == "{}"));
}

#[tokio::test]
async fn supplied_manifest_is_used_for_non_directory_input() {
    let entries = entries_for(AppInput::from(CODE.as_bytes().to_vec()), Some(MANIFEST))
        .await
        .unwrap();

    assert_eq!(entries[0].kind(), EntryKind::Buffer);
    assert!(matches!(entries[1].data, EntryData::Text(ref m) if m == MANIFEST));
}

#[tokio::test]
async fn directory_input_ignores_manifest() {
    let tmp = TempDir::new().unwrap();
    write_app_dir(tmp.path());

    let entries = entries_for(AppInput::Directory(tmp.path().to_path_buf()), Some("{\"x\":1}"))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, APP_DIR_ENTRY);
    assert_eq!(entries[0].kind(), EntryKind::Directory);
}

#[tokio::test]
async fn missing_file_input_fails_before_archiving() {
    let tmp = TempDir::new().unwrap();
    let result = entries_for(AppInput::File(tmp.path().join("nope.js")), None).await;

    assert!(matches!(
        result,
        Err(dockerize_core::Error::InputStat { .. })
    ));
}

// ── Archive Tests ──

#[tokio::test]
async fn archive_appends_recipe_last() {
    let entries = entries_for(AppInput::from(CODE), None).await.unwrap();
    let archive = build_archive("FROM scratch", entries).await.unwrap();

    let members = files(&archive);
    let names: Vec<&str> = members.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(names, ["app/index.js", "app/package.json", "Dockerfile"]);
    assert_eq!(members[0].1, CODE.as_bytes());
    assert_eq!(members[1].1, b"{}");
    assert_eq!(members[2].1, b"FROM scratch");
}

#[tokio::test]
async fn archive_with_no_entries_holds_only_recipe() {
    let archive = build_archive("FROM scratch", Vec::new()).await.unwrap();

    let members = files(&archive);
    assert_eq!(members, [("Dockerfile".to_owned(), b"FROM scratch".to_vec())]);
}

#[tokio::test]
async fn in_memory_headers_carry_size_mode_and_mtime() {
    let archive = ArchiveBuilder::new()
        .mtime(1_700_000_000)
        .build("FROM scratch", vec![Entry::text("/app/index.js", CODE)])
        .await
        .unwrap();

    let mut reader = tar::Archive::new(archive.as_ref());
    let first = reader.entries().unwrap().next().unwrap().unwrap();
    let header = first.header();
    assert_eq!(header.size().unwrap(), CODE.len() as u64);
    assert_eq!(header.mode().unwrap(), 0o644);
    assert_eq!(header.mtime().unwrap(), 1_700_000_000);
}

async fn build_fixture(dir: &Path) -> Bytes {
    let entries = vec![
        Entry::text("/app/index.js", CODE),
        Entry::new("extra", EntryData::Directory(dir.to_path_buf())),
    ];
    build_archive(&default_recipe(), entries).await.unwrap()
}

#[tokio::test]
async fn archive_is_deterministic_for_same_inputs() {
    let tmp = TempDir::new().unwrap();
    write_app_dir(tmp.path());

    let first = build_fixture(tmp.path()).await;
    let second = build_fixture(tmp.path()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn stream_entry_is_drained() {
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let stream: AppStream = Box::new(std::io::Cursor::new(payload.clone()));

    let archive = build_archive("FROM scratch", vec![Entry::new("blob.bin", EntryData::Stream(stream))])
        .await
        .unwrap();

    let members = files(&archive);
    assert_eq!(members[0].0, "blob.bin");
    assert_eq!(members[0].1, payload);
}

#[tokio::test]
async fn chunked_stream_gets_in_memory_header() {
    let first = std::io::Cursor::new(b"console.".to_vec());
    let second = std::io::Cursor::new(b"log('chunked')".to_vec());
    let stream: AppStream = Box::new(tokio::io::AsyncReadExt::chain(first, second));

    let archive = ArchiveBuilder::new()
        .mtime(42)
        .build("FROM scratch", vec![Entry::new("/app/index.js", EntryData::Stream(stream))])
        .await
        .unwrap();

    let mut tar = tar::Archive::new(archive.as_ref());
    let mut entries = tar.entries().unwrap();
    let mut entry = entries.next().unwrap().unwrap();
    assert_eq!(entry.path().unwrap().to_str(), Some("app/index.js"));
    assert_eq!(entry.header().size().unwrap(), 22);
    assert_eq!(entry.header().mode().unwrap(), 0o644);
    assert_eq!(entry.header().mtime().unwrap(), 42);
    let mut body = String::new();
    entry.read_to_string(&mut body).unwrap();
    assert_eq!(body, "console.log('chunked')");
}

#[tokio::test]
async fn directory_tree_is_preserved_under_entry_name() {
    let tmp = TempDir::new().unwrap();
    write_app_dir(tmp.path());
    std::fs::create_dir_all(tmp.path().join("lib/util")).unwrap();
    std::fs::write(tmp.path().join("lib/util/strings.js"), "module.exports = {};").unwrap();

    let entries = entries_for(AppInput::Directory(tmp.path().to_path_buf()), None)
        .await
        .unwrap();
    let archive = build_archive("FROM scratch", entries).await.unwrap();

    let members = unpack(&archive);
    let dirs: Vec<&str> = members
        .iter()
        .filter(|(_, kind, _)| kind.is_dir())
        .map(|(p, _, _)| p.trim_end_matches('/'))
        .collect();
    assert_eq!(dirs, ["app", "app/lib", "app/lib/util"]);

    let files = files(&archive);
    let names: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        names,
        ["app/index.js", "app/lib/util/strings.js", "app/package.json", "Dockerfile"]
    );
}

#[tokio::test]
async fn long_entry_names_survive() {
    let name = format!("app/{}/index.js", "nested".repeat(30));
    let archive = build_archive("FROM scratch", vec![Entry::text(name.clone(), "x")])
        .await
        .unwrap();

    assert_eq!(files(&archive)[0].0, name);
}

#[tokio::test]
async fn parent_dir_names_are_rejected() {
    let result = build_archive("FROM scratch", vec![Entry::text("../escape.js", "x")]).await;

    assert!(matches!(result, Err(ArchiveError::InvalidName { .. })));
}

#[tokio::test]
async fn empty_names_are_rejected() {
    let result = build_archive("FROM scratch", vec![Entry::text("/", "x")]).await;

    assert!(matches!(result, Err(ArchiveError::InvalidName { .. })));
}

#[tokio::test]
async fn missing_file_entry_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let entries = vec![
        Entry::text("ok.txt", "fine"),
        Entry::new("gone.js", EntryData::File(tmp.path().join("gone.js"))),
    ];

    let result = build_archive("FROM scratch", entries).await;

    assert!(matches!(result, Err(ArchiveError::ReadFile { .. })));
}

#[tokio::test]
async fn missing_directory_entry_fails() {
    let tmp = TempDir::new().unwrap();
    let entries = vec![Entry::new("app", EntryData::Directory(tmp.path().join("absent")))];

    let result = build_archive("FROM scratch", entries).await;

    assert!(matches!(result, Err(ArchiveError::Walk { .. })));
}

#[tokio::test]
async fn broken_stream_fails() {
    struct Broken;

    impl tokio::io::AsyncRead for Broken {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe closed",
            )))
        }
    }

    let entries = vec![Entry::new("app.js", EntryData::Stream(Box::new(Broken)))];
    let result = build_archive("FROM scratch", entries).await;

    assert!(matches!(
        result,
        Err(ArchiveError::ReadStream { ref name, .. }) if name == "app.js"
    ));
}

#[tokio::test]
async fn write_archive_persists_bytes() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("context.tar");
    let archive = build_archive("FROM scratch", Vec::new()).await.unwrap();

    dockerize_build::write_archive(&target, &archive).await.unwrap();

    assert_eq!(std::fs::read(&target).unwrap(), archive.to_vec());
}

// ── Input equivalence ──

#[tokio::test]
async fn every_input_kind_yields_the_same_application_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("app");
    std::fs::create_dir(&dir).unwrap();
    write_app_dir(&dir);
    let file = dir.join("index.js");

    let stream: AppStream = Box::new(std::io::Cursor::new(CODE.as_bytes().to_vec()));
    let inputs = vec![
        (AppInput::from(CODE), Some(MANIFEST)),
        (AppInput::from(Bytes::from_static(CODE.as_bytes())), Some(MANIFEST)),
        (AppInput::Stream(stream), Some(MANIFEST)),
        (AppInput::File(file), Some(MANIFEST)),
        (AppInput::Directory(dir), None),
    ];

    let mut outputs = Vec::new();
    for (input, manifest) in inputs {
        let entries = entries_for(input, manifest).await.unwrap();
        let archive = build_archive(&default_recipe(), entries).await.unwrap();
        let mut members = files(&archive);
        members.sort();
        outputs.push(members);
    }

    let expected = vec![
        ("Dockerfile".to_owned(), default_recipe().into_bytes()),
        ("app/index.js".to_owned(), CODE.as_bytes().to_vec()),
        ("app/package.json".to_owned(), MANIFEST.as_bytes().to_vec()),
    ];
    for output in outputs {
        assert_eq!(output, expected);
    }
}

mod prop {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn byte_content_is_preserved(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let archive = runtime
                .block_on(build_archive(
                    "FROM scratch",
                    vec![Entry::new("/app/index.js", EntryData::Bytes(Bytes::from(data.clone())))],
                ))
                .unwrap();

            let members = files(&archive);
            prop_assert_eq!(members.len(), 2);
            prop_assert_eq!(&members[0].1, &data);
        }
    }
}
