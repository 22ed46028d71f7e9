//! Chunked byte transfer on top of a [`WorkerPool`].
//!
//! The source is split into fixed-size chunks, one job per chunk, and a
//! [`ChunkWriter`] handler writes each chunk at its offset into a shared
//! sink. The pool only dispatches chunks; file handles belong to the
//! reader and the handler.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{debug, error, info};

use crate::{Handler, HandlerResult, Job, JobFailure, PoolConfig, PoolError, Result, WorkerPool};

const MAX_PREALLOC: usize = 64 * 1024;

/// A slice of the source stream and where it belongs in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    offset: u64,
    data: Vec<u8>,
}

impl Chunk {
    /// Byte offset of the chunk in the stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The chunk bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Splits a reader into sequenced chunk jobs.
///
/// Sequence numbers start at 0. Every chunk is `chunk_size` bytes except
/// possibly the last. Iteration stops after the first read error.
pub struct ChunkReader<R> {
    reader: R,
    chunk_size: usize,
    offset: u64,
    seq: u64,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Creates a chunk reader. A `chunk_size` of 0 is rejected.
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PoolError::InvalidChunkSize);
        }
        Ok(ChunkReader {
            reader,
            chunk_size,
            offset: 0,
            seq: 0,
            done: false,
        })
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Job<Chunk>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // Chunk sizes come from callers; grow past this only as bytes arrive.
        let mut data = Vec::with_capacity(self.chunk_size.min(MAX_PREALLOC));
        let read = (&mut self.reader)
            .take(self.chunk_size as u64)
            .read_to_end(&mut data);
        match read {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(len) => {
                let chunk = Chunk {
                    offset: self.offset,
                    data,
                };
                let job = Job::with_seq(self.seq, chunk);
                self.offset += len as u64;
                self.seq += 1;
                Some(Ok(job))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Writes chunks into a shared sink at their offsets.
///
/// Workers write concurrently, so the sink sits behind a `Mutex`; each
/// seek-and-write pair happens under one lock.
pub struct ChunkWriter<W> {
    sink: Arc<Mutex<W>>,
}

impl<W> ChunkWriter<W> {
    /// Creates a writer over a shared sink.
    pub fn new(sink: Arc<Mutex<W>>) -> Self {
        ChunkWriter { sink }
    }
}

impl<W> Handler<Chunk, usize> for ChunkWriter<W>
where
    W: Write + Seek + Send + 'static,
{
    fn handle(&self, job: Job<Chunk>) -> HandlerResult<usize> {
        let chunk = job.into_payload();
        let mut sink = self.sink.lock().map_err(|_| "chunk sink lock poisoned")?;
        sink.seek(SeekFrom::Start(chunk.offset))?;
        sink.write_all(&chunk.data)?;
        Ok(chunk.data.len())
    }
}

/// Outcome of [`copy_chunked`].
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Bytes written to the destination.
    pub bytes: u64,
    /// Chunks dispatched to the pool.
    pub chunks: u64,
    /// Chunks that failed, by sequence number.
    pub failed: Vec<(u64, JobFailure)>,
}

impl CopyReport {
    /// Returns `true` when every chunk was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copies `src` to `dst` in `chunk_size` chunks using a worker pool.
///
/// A failed chunk does not stop the copy; it is listed in the report and
/// the caller decides what to do with a partial destination.
pub fn copy_chunked(
    src: &Path,
    dst: &Path,
    config: PoolConfig,
    chunk_size: usize,
) -> Result<CopyReport> {
    config.validate()?;
    let source = File::open(src)?;
    let len = source.metadata()?.len();
    let chunks = ChunkReader::new(BufReader::new(source), chunk_size)?;

    let dest = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)?;
    dest.set_len(len)?;
    let sink = Arc::new(Mutex::new(dest));

    info!(
        "Copying {} bytes from {} to {} with {} workers",
        len,
        src.display(),
        dst.display(),
        config.workers
    );
    let mut pool: WorkerPool<Chunk, usize> =
        WorkerPool::with_config(config, ChunkWriter::new(sink.clone()))?;
    let feeder = pool.feed(chunks)?;

    let mut report = CopyReport::default();
    for result in pool.drain()? {
        report.chunks += 1;
        let seq = result.seq().unwrap_or_default();
        match result.into_outcome() {
            Ok(written) => report.bytes += written as u64,
            Err(failure) => {
                error!("Chunk {seq} failed: {failure}");
                report.failed.push((seq, failure));
            }
        }
    }

    match feeder.join() {
        Ok(fed) => {
            let fed = fed?;
            debug!("Reader produced {fed} chunks");
        }
        Err(_) => error!("Chunk reader thread panicked"),
    }

    let mut dest = sink
        .lock()
        .map_err(|_| io::Error::other("destination lock poisoned"))?;
    dest.flush()?;
    dest.sync_all()?;
    info!("Copied {} bytes in {} chunks", report.bytes, report.chunks);
    Ok(report)
}
