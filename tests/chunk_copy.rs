use std::fs;
use std::io::{self, Cursor, Read};
use std::sync::{Arc, Mutex};

use rand::prelude::*;
use tempfile::TempDir;
use workpool::chunk::{copy_chunked, ChunkReader, ChunkWriter};
use workpool::{PoolConfig, PoolError, Result, WorkerPool};

fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut data = vec![0; len];
    rng.fill_bytes(&mut data);
    data
}

#[test]
fn chunks_cover_the_stream() -> Result<()> {
    let data = random_bytes(1000);
    let jobs = ChunkReader::new(Cursor::new(data.clone()), 300)?.collect::<Result<Vec<_>>>()?;

    assert_eq!(jobs.len(), 4);
    let mut joined = Vec::new();
    for (i, job) in jobs.iter().enumerate() {
        assert_eq!(job.seq(), Some(i as u64));
        assert_eq!(job.payload().offset(), i as u64 * 300);
        joined.extend_from_slice(job.payload().data());
    }
    assert_eq!(jobs[3].payload().data().len(), 100);
    assert_eq!(joined, data);
    Ok(())
}

#[test]
fn zero_chunk_size_rejected() {
    assert!(matches!(
        ChunkReader::new(Cursor::new(vec![1, 2, 3]), 0),
        Err(PoolError::InvalidChunkSize)
    ));
}

#[test]
fn oversized_chunk_size_reads_what_is_there() -> Result<()> {
    let mut chunks = ChunkReader::new(Cursor::new(vec![1u8, 2, 3]), usize::MAX)?;
    let job = chunks.next().expect("one chunk")?;
    assert_eq!(job.payload().offset(), 0);
    assert_eq!(job.payload().data(), &[1, 2, 3]);
    assert!(chunks.next().is_none());
    Ok(())
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn read_error_ends_the_chunks() -> Result<()> {
    let mut chunks = ChunkReader::new(FailingReader, 16)?;
    assert!(matches!(chunks.next(), Some(Err(PoolError::Io(_)))));
    assert!(chunks.next().is_none());
    Ok(())
}

#[test]
fn chunk_writer_reassembles_out_of_order_chunks() -> Result<()> {
    let data = random_bytes(4096);
    let sink = Arc::new(Mutex::new(Cursor::new(vec![0_u8; data.len()])));
    let jobs: Vec<_> = ChunkReader::new(Cursor::new(data.clone()), 100)?
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .rev()
        .collect();

    let written: usize = WorkerPool::from_source(4, jobs, ChunkWriter::new(sink.clone()))?
        .map(|r| r.into_outcome().unwrap())
        .sum();
    assert_eq!(written, data.len());
    assert_eq!(sink.lock().unwrap().get_ref(), &data);
    Ok(())
}

#[test]
fn copies_file_byte_for_byte() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let src = dir.path().join("src.bin");
    let dst = dir.path().join("dst.bin");
    let data = random_bytes(200_003);
    fs::write(&src, &data)?;

    let report = copy_chunked(&src, &dst, PoolConfig::new(4).intake_capacity(2), 4096)?;
    assert!(report.is_complete());
    assert_eq!(report.bytes, data.len() as u64);
    assert_eq!(report.chunks, 49);
    assert_eq!(fs::read(&dst)?, data);
    Ok(())
}

#[test]
fn copies_empty_file() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let src = dir.path().join("empty");
    let dst = dir.path().join("copy");
    fs::write(&src, b"")?;

    let report = copy_chunked(&src, &dst, PoolConfig::new(2), 16)?;
    assert_eq!(report.chunks, 0);
    assert_eq!(fs::read(&dst)?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn invalid_config_leaves_destination_alone() -> Result<()> {
    let dir = TempDir::new().expect("unable to create temporary working directory");
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::write(&src, b"payload")?;
    fs::write(&dst, b"keep me")?;

    let err = copy_chunked(&src, &dst, PoolConfig::new(0), 16).unwrap_err();
    assert!(matches!(err, PoolError::InvalidWorkerCount(0)));
    assert_eq!(fs::read(&dst)?, b"keep me");
    Ok(())
}
