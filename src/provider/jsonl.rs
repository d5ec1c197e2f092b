//! One-record-per-line JSON files with advisory locks: shared for reads,
//! exclusive while a mutation rewrites the file. Malformed lines are skipped
//! with a warning instead of failing the whole read.

use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader},
};
use tracing::warn;

/// Reads every parseable record from `path`. A missing file is an empty
/// collection.
pub async fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;

    let buffer = BufReader::new(file);
    let mut lines = buffer.lines();
    let mut records = vec![];
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(v) => records.push(v),
            // Might happen after a shutdown cut a write short
            Err(e) => warn!("Skipping malformed record in {path:?}: {e}"),
        }
    }

    lines.into_inner().into_inner().unlock_async().await?;
    Ok(records)
}

/// Applies `mutate` to the full collection and rewrites the file with the
/// result, holding an exclusive lock for the whole read-modify-write. When
/// `mutate` fails nothing is written.
pub async fn rewrite<T, F>(path: &Path, mutate: F) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Vec<T>) -> Result<Vec<T>>,
{
    let mut file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;
    file.lock_exclusive()?;
    let result = rewrite_with_file(&mut file, path, mutate).await;
    file.unlock_async().await?;
    result
}

async fn rewrite_with_file<T, F>(file: &mut File, path: &Path, mutate: F) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Vec<T>) -> Result<Vec<T>>,
{
    let mut contents = String::new();
    file.read_to_string(&mut contents).await?;

    let mut records = vec![];
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(v) => records.push(v),
            Err(e) => warn!("Skipping malformed record in {path:?}: {e}"),
        }
    }

    let records = mutate(records)?;

    let mut buffer = Vec::<u8>::new();
    for record in &records {
        serde_json::to_writer(&mut buffer, record)?;
        buffer.push(b'\n');
    }

    file.rewind().await?;
    file.set_len(0).await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}
