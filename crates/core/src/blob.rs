//! Append-only blob storage (the filebase)
//!
//! Record format, repeated until EOF:
//! ```text
//! fingerprint: string
//! segments:    { length: i32, bytes: [u8; length], more: bool } until more == false
//! ```
//! Segments only bound buffer sizes. A blob is the concatenation of its
//! segments, and a blob at or below the segment cap is exactly one segment.

use crate::codec;
use crate::error::{Error, Result};
use crate::hash::Fingerprint;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;

/// Largest segment written by default (fits in an i32 length)
pub const DEFAULT_SEGMENT_CAP: u32 = 2_000_000_000;

/// Appends blob records to a filebase stream
pub struct FilebaseWriter<W: Write> {
    writer: W,
    segment_cap: u32,
    bytes_written: u64,
}

impl<W: Write> FilebaseWriter<W> {
    pub fn new(writer: W, segment_cap: u32) -> Self {
        Self {
            writer,
            segment_cap: segment_cap.clamp(1, i32::MAX as u32),
            bytes_written: 0,
        }
    }

    /// Write one blob record from a stream of exactly `len` bytes
    ///
    /// The caller guarantees the fingerprint is not stored yet.
    pub fn write_blob<R: Read>(&mut self, fingerprint: &Fingerprint, mut content: R, len: u64) -> Result<u64> {
        let header = fingerprint.to_hex();
        codec::write_string(&mut self.writer, &header)?;
        let mut written = codec::string_len(&header);

        let mut remaining = len;
        loop {
            let segment = remaining.min(self.segment_cap as u64);
            codec::write_i32(&mut self.writer, segment as i32)?;

            let copied = io::copy(&mut (&mut content).take(segment), &mut self.writer)?;
            if copied != segment {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("content of {} ended after {} of {} bytes", fingerprint, len - remaining + copied, len),
                )));
            }

            remaining -= segment;
            let more = remaining > 0;
            codec::write_bool(&mut self.writer, more)?;
            written += 4 + segment + 1;

            if !more {
                break;
            }
        }

        self.bytes_written += written;
        Ok(written)
    }

    /// Copy the record whose header `reader` just returned, segments verbatim
    pub fn copy_blob<R: Read + Seek>(&mut self, fingerprint: &Fingerprint, reader: &mut FilebaseReader<R>) -> Result<u64> {
        let header = fingerprint.to_hex();
        codec::write_string(&mut self.writer, &header)?;
        let mut written = codec::string_len(&header);

        while let Some(len) = reader.next_segment()? {
            codec::write_i32(&mut self.writer, len as i32)?;
            io::copy(&mut reader.segment(), &mut self.writer)?;
            let more = reader.finish_segment()?;
            codec::write_bool(&mut self.writer, more)?;
            written += 4 + len as u64 + 1;
        }

        self.bytes_written += written;
        Ok(written)
    }

    /// Total bytes of all records written through this writer
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Next byte starts a record header (or EOF)
    Header,
    /// Next bytes are a segment length
    SegmentStart,
    /// Inside a segment's content
    InSegment { remaining: u64 },
}

/// Sequential scanner over a filebase
///
/// `next_blob` yields headers in file order. After a header, the blob's
/// segments are consumed with `next_segment`/`segment`/`finish_segment`, or
/// skipped wholesale with `skip_blob`. Moving to the next header skips
/// whatever is left of the current record without reading it into memory.
pub struct FilebaseReader<R> {
    inner: BufReader<R>,
    position: Position,
}

impl FilebaseReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read + Seek> FilebaseReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(256 * 1024, inner),
            position: Position::Header,
        }
    }

    /// Advance to the next record; `None` at the end of the filebase
    pub fn next_blob(&mut self) -> Result<Option<Fingerprint>> {
        self.skip_blob()?;

        match codec::read_string_or_eof(&mut self.inner)? {
            Some(header) => {
                self.position = Position::SegmentStart;
                Ok(Some(Fingerprint::from_hex(&header)?))
            }
            None => Ok(None),
        }
    }

    /// Enter the next segment of the current blob and return its length
    pub fn next_segment(&mut self) -> Result<Option<u32>> {
        loop {
            match self.position {
                Position::Header => return Ok(None),
                Position::InSegment { .. } => {
                    self.finish_segment()?;
                }
                Position::SegmentStart => {
                    let len = codec::read_i32(&mut self.inner)?;
                    if len < 0 {
                        return Err(Error::Corrupt(format!("negative segment length {}", len)));
                    }
                    self.position = Position::InSegment { remaining: len as u64 };
                    return Ok(Some(len as u32));
                }
            }
        }
    }

    /// Reader over the unread content of the current segment
    pub fn segment(&mut self) -> SegmentBody<'_, R> {
        SegmentBody { reader: self }
    }

    /// Skip what is left of the current segment and read its `more` flag
    pub fn finish_segment(&mut self) -> Result<bool> {
        match self.position {
            Position::InSegment { remaining } => {
                self.inner.seek_relative(remaining as i64)?;
                let more = codec::read_bool(&mut self.inner)?;
                self.position = if more { Position::SegmentStart } else { Position::Header };
                Ok(more)
            }
            Position::SegmentStart => Ok(true),
            Position::Header => Ok(false),
        }
    }

    /// Skip every remaining segment of the current blob
    pub fn skip_blob(&mut self) -> Result<()> {
        while self.position != Position::Header {
            if self.next_segment()?.is_some() {
                self.finish_segment()?;
            }
        }
        Ok(())
    }

    /// Stream every remaining segment of the current blob into `sink`
    pub fn read_blob_into<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64> {
        let mut total = 0;
        while self.next_segment()?.is_some() {
            total += io::copy(&mut self.segment(), sink)?;
            self.finish_segment()?;
        }
        Ok(total)
    }

    /// Headers and segment lengths of every record, in file order
    pub fn summarize(mut self) -> Result<Vec<BlobSummary>> {
        let mut summaries = Vec::new();
        while let Some(fingerprint) = self.next_blob()? {
            let mut segments = Vec::new();
            while let Some(len) = self.next_segment()? {
                segments.push(len);
                self.finish_segment()?;
            }
            summaries.push(BlobSummary { fingerprint, segments });
        }
        Ok(summaries)
    }
}

/// Shape of one filebase record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSummary {
    pub fingerprint: Fingerprint,
    pub segments: Vec<u32>,
}

impl BlobSummary {
    pub fn size(&self) -> u64 {
        self.segments.iter().map(|&len| len as u64).sum()
    }
}

/// Content of the segment the reader is positioned in
pub struct SegmentBody<'a, R> {
    reader: &'a mut FilebaseReader<R>,
}

impl<R: Read> Read for SegmentBody<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Position::InSegment { remaining } = &mut self.reader.position else {
            return Ok(0);
        };
        if *remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = (*remaining).min(buf.len() as u64) as usize;
        let n = self.reader.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "filebase ended inside a segment"));
        }
        *remaining -= n as u64;
        Ok(n)
    }
}
