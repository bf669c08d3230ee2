//! PNG chunk framing.
//!
//! Chunks are `length | type | data | crc32(type ++ data)`. The decoder reads
//! them from any [`Read`] without buffering whole chunks of image data: the
//! IDAT payloads are exposed as one continuous byte stream through
//! [`IdatReader`], and [`IdatWriter`] does the reverse on the encode side.

use std::io::{self, Read, Write};

use flate2::Crc;

use crate::error::{Error, Result};

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Largest chunk length the format allows (2^31 - 1).
const MAX_CHUNK_LENGTH: u32 = i32::MAX as u32;

/// CRC of a chunk's type and data, as stored after the data.
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(chunk_type);
    crc.update(data);
    crc.sum()
}

/// Write a PNG chunk (length, type, data, CRC32) to `out`.
pub fn write_chunk<W: Write + ?Sized>(
    out: &mut W,
    chunk_type: &[u8; 4],
    data: &[u8],
) -> io::Result<()> {
    let length = u32::try_from(data.len())
        .ok()
        .filter(|&len| len <= MAX_CHUNK_LENGTH)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "chunk too large"))?;
    out.write_all(&length.to_be_bytes())?;
    out.write_all(chunk_type)?;
    out.write_all(data)?;
    out.write_all(&chunk_crc(chunk_type, data).to_be_bytes())
}

/// Critical chunks have an uppercase first letter; a decoder must understand
/// every critical chunk it meets.
#[inline]
pub fn is_critical(chunk_type: &[u8; 4]) -> bool {
    chunk_type[0].is_ascii_uppercase()
}

/// Length and type of a chunk whose body has not been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Data length in bytes.
    pub length: u32,
    /// Four-letter chunk type.
    pub chunk_type: [u8; 4],
}

impl ChunkHeader {
    /// Chunk type as text, for diagnostics.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

/// Sequential chunk reader over a byte stream.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap `inner`, which must be positioned at the PNG signature.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consume and check the 8-byte signature.
    pub fn read_signature(&mut self) -> Result<()> {
        let mut signature = [0u8; 8];
        self.inner
            .read_exact(&mut signature)
            .map_err(|e| Error::from_read(e, "missing PNG signature"))?;
        if signature != PNG_SIGNATURE {
            return Err(Error::InvalidData("bad PNG signature".into()));
        }
        Ok(())
    }

    /// Read the next chunk's length and type.
    pub fn next_header(&mut self) -> Result<ChunkHeader> {
        let mut raw = [0u8; 8];
        self.inner
            .read_exact(&mut raw)
            .map_err(|e| Error::from_read(e, "missing chunk header"))?;
        let length = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let chunk_type = [raw[4], raw[5], raw[6], raw[7]];
        if length > MAX_CHUNK_LENGTH {
            return Err(Error::InvalidData(format!("chunk length {length} too large")));
        }
        if !chunk_type.iter().all(u8::is_ascii_alphabetic) {
            return Err(Error::InvalidData(format!("bad chunk type {chunk_type:02x?}")));
        }
        Ok(ChunkHeader { length, chunk_type })
    }

    /// Read the body of the chunk announced by `header` and verify its CRC.
    pub fn read_body(&mut self, header: &ChunkHeader) -> Result<Vec<u8>> {
        // Grows as bytes arrive instead of trusting the declared length.
        let mut data = Vec::new();
        (&mut self.inner)
            .take(u64::from(header.length))
            .read_to_end(&mut data)?;
        if data.len() != header.length as usize {
            return Err(Error::Truncated(format!("{} chunk", header.name())));
        }
        let stored = self.read_crc(header)?;
        if stored != chunk_crc(&header.chunk_type, &data) {
            return Err(Error::InvalidData(format!("CRC mismatch in {} chunk", header.name())));
        }
        Ok(data)
    }

    fn read_crc(&mut self, header: &ChunkHeader) -> Result<u32> {
        let mut raw = [0u8; 4];
        self.inner
            .read_exact(&mut raw)
            .map_err(|e| Error::from_read(e, &format!("{} chunk CRC", header.name())))?;
        Ok(u32::from_be_bytes(raw))
    }
}

fn invalid(err: Error) -> io::Error {
    match err {
        Error::Io(e) => e,
        Error::Truncated(_) => io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string()),
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

/// Concatenated payload of consecutive IDAT chunks.
///
/// Each chunk's CRC is checked as soon as its last byte has been consumed.
/// Reading stops (returns `Ok(0)`) at the first non-IDAT chunk header, which
/// is left in [`IdatReader::trailing`].
#[derive(Debug)]
pub struct IdatReader<'a, R> {
    chunks: &'a mut ChunkReader<R>,
    current: ChunkHeader,
    remaining: u32,
    crc: Crc,
    trailing: Option<ChunkHeader>,
}

impl<'a, R: Read> IdatReader<'a, R> {
    /// Start reading at the body of `first`, an IDAT header just returned by
    /// [`ChunkReader::next_header`].
    pub fn new(chunks: &'a mut ChunkReader<R>, first: ChunkHeader) -> Self {
        let mut crc = Crc::new();
        crc.update(&first.chunk_type);
        Self {
            chunks,
            current: first,
            remaining: first.length,
            crc,
            trailing: None,
        }
    }

    /// Header of the chunk that ended the IDAT run, once reached.
    pub fn trailing(&self) -> Option<&ChunkHeader> {
        self.trailing.as_ref()
    }

    fn finish_chunk(&mut self) -> Result<()> {
        let stored = self.chunks.read_crc(&self.current)?;
        if stored != self.crc.sum() {
            return Err(Error::InvalidData("CRC mismatch in IDAT chunk".into()));
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        self.finish_chunk()?;
        let header = self.chunks.next_header()?;
        if header.chunk_type != *b"IDAT" {
            self.trailing = Some(header);
            return Ok(false);
        }
        self.current = header;
        self.remaining = header.length;
        self.crc.reset();
        self.crc.update(&header.chunk_type);
        Ok(true)
    }
}

impl<R: Read> Read for IdatReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.remaining == 0 {
            if self.trailing.is_some() || !self.advance().map_err(invalid)? {
                return Ok(0);
            }
        }
        let want = buf.len().min(self.remaining as usize);
        let n = self.chunks.inner.read(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "IDAT chunk cut short"));
        }
        self.crc.update(&buf[..n]);
        self.remaining -= n as u32;
        Ok(n)
    }
}

/// Splits a byte stream into IDAT chunks of at most `chunk_size` bytes.
#[derive(Debug)]
pub struct IdatWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
    chunk_size: usize,
    chunks_written: usize,
}

impl<W: Write> IdatWriter<W> {
    /// Wrap `inner`. A `chunk_size` of zero is treated as one.
    pub fn new(inner: W, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.clamp(1, MAX_CHUNK_LENGTH as usize);
        Self {
            inner,
            pending: Vec::with_capacity(chunk_size.min(1 << 20)),
            chunk_size,
            chunks_written: 0,
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        write_chunk(&mut self.inner, b"IDAT", &self.pending)?;
        self.pending.clear();
        self.chunks_written += 1;
        Ok(())
    }

    /// Write out the last partial chunk and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() || self.chunks_written == 0 {
            self.emit()?;
        }
        log::trace!("wrote {} IDAT chunk(s)", self.chunks_written);
        Ok(self.inner)
    }
}

impl<W: Write> Write for IdatWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let room = self.chunk_size - self.pending.len();
        let n = room.min(data.len());
        self.pending.extend_from_slice(&data[..n]);
        if self.pending.len() == self.chunk_size {
            self.emit()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
