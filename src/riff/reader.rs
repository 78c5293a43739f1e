//! Chunk reader state machine
//!
//! `ChunkReader` walks a RIFF-style container one chunk at a time. The stream
//! cursor always matches [`ReaderState`]:
//!
//! - `ChunkInfo`: at the start of a chunk header
//! - `ChunkData`: at the start of the current chunk's payload
//! - `Unknown`: somewhere untrustworthy after a failed read; only
//!   [`ChunkReader::reposition`] or [`ChunkReader::close`] are accepted
//!
//! Payloads of odd length are followed by one pad byte, which is consumed
//! whenever the reader moves past the chunk.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use super::error::{OpenError, ReadError, ReadResult};
use super::fourcc::FourCc;
use crate::io::files::{open_for_read, FileError};

const FIELD_SIZE: usize = 4;

/// What the next operation on a [`ChunkReader`] may legally do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReaderState {
    /// No stream is bound
    #[default]
    Closed,
    /// Cursor is at a chunk header
    ChunkInfo,
    /// A header was read; cursor is at the start of its payload
    ChunkData,
    /// A read failed mid-structure
    Unknown,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier and payload length of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkHeader {
    pub id: FourCc,
    /// Payload length in bytes, excluding any pad byte
    pub length: u32,
}

impl ChunkHeader {
    pub fn new(id: FourCc, length: u32) -> Self {
        Self { id, length }
    }

    /// Whether a pad byte follows the payload
    pub fn has_padding(&self) -> bool {
        self.length % 2 == 1
    }

    /// Bytes between the end of this header and the next sibling header
    pub fn padded_length(&self) -> u64 {
        u64::from(self.length) + u64::from(self.length % 2)
    }
}

/// A saved reader position, see [`ChunkReader::bookmark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    pub offset: u64,
    pub header: ChunkHeader,
    pub state: ReaderState,
}

/// Reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Container tag expected at offset 0
    pub magic: FourCc,
    /// Accept a final odd-length chunk whose pad byte is cut off by the end
    /// of the stream
    pub lenient_trailing_pad: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            magic: FourCc::RIFF,
            lenient_trailing_pad: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Prolog {
    declared_size: u32,
    form_type: FourCc,
}

/// Stateful reader over a chunked container stream
#[derive(Debug)]
pub struct ChunkReader<S = File> {
    stream: Option<S>,
    options: ReaderOptions,
    prolog: Option<Prolog>,
    header: ChunkHeader,
    state: ReaderState,
}

impl<S> Default for ChunkReader<S> {
    fn default() -> Self {
        Self::with_options(ReaderOptions::default())
    }
}

impl<S> ChunkReader<S> {
    /// Create a closed reader expecting a "RIFF" container
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReaderOptions) -> Self {
        Self {
            stream: None,
            options,
            prolog: None,
            header: ChunkHeader::default(),
            state: ReaderState::Closed,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// The header most recently read, zeroed before the first read
    pub fn header(&self) -> ChunkHeader {
        self.header
    }

    /// Form type from the container prolog, `None` while closed
    pub fn form_type(&self) -> Option<FourCc> {
        self.prolog.map(|p| p.form_type)
    }

    /// Total size field from the container prolog. Never validated.
    pub fn declared_size(&self) -> Option<u32> {
        self.prolog.map(|p| p.declared_size)
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.state != ReaderState::Closed
    }

    /// Release the stream and return to `Closed`
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            log::debug!("closing chunk reader (state {})", self.state);
        }
        self.prolog = None;
        self.header = ChunkHeader::default();
        self.state = ReaderState::Closed;
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ReaderState]) -> ReadResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ReadError::WrongState {
                operation,
                state: self.state,
            })
        }
    }

    fn stream_mut(&mut self) -> ReadResult<&mut S> {
        self.stream.as_mut().ok_or(ReadError::WrongState {
            operation: "stream access",
            state: self.state,
        })
    }
}

impl ChunkReader<File> {
    /// Open a container file and read its prolog.
    ///
    /// A missing file and a permission failure are reported as
    /// [`OpenError::NotFound`] and [`OpenError::AccessDenied`]. On any error
    /// the reader stays closed.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), OpenError> {
        let path = path.as_ref();
        if self.is_open() {
            return Err(OpenError::AlreadyOpen);
        }

        let file = open_for_read(path).map_err(|err| match FileError::from(&err) {
            FileError::NotFound => OpenError::NotFound(path.to_path_buf()),
            FileError::PermissionDenied => OpenError::AccessDenied(path.to_path_buf()),
            _ => OpenError::Io(err),
        })?;

        log::debug!("opening chunk container {}", path.display());
        self.open_stream(file)
    }
}

impl<S: Read + Seek> ChunkReader<S> {
    /// Bind the reader to `stream` and read the 12-byte prolog from its
    /// current position.
    pub fn open_stream(&mut self, mut stream: S) -> Result<(), OpenError> {
        if self.is_open() {
            return Err(OpenError::AlreadyOpen);
        }

        let mut tag = [0u8; FIELD_SIZE];
        let mut size = [0u8; FIELD_SIZE];
        let mut form = [0u8; FIELD_SIZE];
        for field in [&mut tag, &mut size, &mut form] {
            let n = read_full(&mut stream, field)?;
            if n != FIELD_SIZE {
                return Err(OpenError::BadFormat(
                    "container prolog is shorter than 12 bytes".to_string(),
                ));
            }
        }

        let tag = FourCc::new(tag);
        if tag != self.options.magic {
            return Err(OpenError::BadFormat(format!(
                "expected container tag '{}', found '{}'",
                self.options.magic, tag
            )));
        }

        let prolog = Prolog {
            declared_size: u32::from_le_bytes(size),
            form_type: FourCc::new(form),
        };
        log::debug!(
            "opened '{}' container, form type '{}', declared size {}",
            tag,
            prolog.form_type,
            prolog.declared_size
        );

        self.stream = Some(stream);
        self.prolog = Some(prolog);
        self.header = ChunkHeader::default();
        self.state = ReaderState::ChunkInfo;
        Ok(())
    }

    /// Read the next chunk header.
    ///
    /// Returns [`ReadError::End`] with the state unchanged when no chunk id
    /// remains. A truncated length field yields [`ReadError::BadFormat`] and
    /// leaves the reader `Unknown`, as does any I/O error once the header
    /// read has started.
    pub fn read_chunk_info(&mut self) -> ReadResult<ChunkHeader> {
        self.expect_state("read_chunk_info", &[ReaderState::ChunkInfo])?;
        self.read_chunk_info_unchecked()
    }

    fn read_chunk_info_unchecked(&mut self) -> ReadResult<ChunkHeader> {
        let resume = self.state;
        self.state = ReaderState::Unknown;
        let mut id = [0u8; FIELD_SIZE];
        let n = read_full(self.stream_mut()?, &mut id)?;
        if n != FIELD_SIZE {
            if n > 0 {
                // Leave the cursor where the partial id began.
                self.stream_mut()?.seek(SeekFrom::Current(-(n as i64)))?;
            }
            self.state = resume;
            return Err(ReadError::End);
        }
        let id = FourCc::new(id);

        let mut length = [0u8; FIELD_SIZE];
        let n = read_full(self.stream_mut()?, &mut length)?;
        if n != FIELD_SIZE {
            log::warn!("chunk '{}' header truncated after {} length bytes", id, n);
            return Err(ReadError::BadFormat(format!(
                "chunk '{}' header is truncated",
                id
            )));
        }

        self.header = ChunkHeader::new(id, u32::from_le_bytes(length));
        self.state = ReaderState::ChunkData;
        log::trace!(
            "chunk '{}' ({:#010x}) length {}",
            id,
            id.as_u32_le(),
            self.header.length
        );
        Ok(self.header)
    }

    /// Copy the current chunk's payload into `buffer[..header.length]` and
    /// move past its pad byte.
    pub fn read_chunk_data(&mut self, buffer: &mut [u8]) -> ReadResult<()> {
        self.expect_state("read_chunk_data", &[ReaderState::ChunkData])?;

        let need = self.header.length as usize;
        if buffer.len() < need {
            return Err(ReadError::BufferTooSmall {
                need,
                have: buffer.len(),
            });
        }

        self.state = ReaderState::Unknown;
        let n = read_full(self.stream_mut()?, &mut buffer[..need])?;
        if n != need {
            log::warn!(
                "chunk '{}' payload truncated: {} of {} bytes",
                self.header.id,
                n,
                need
            );
            return Err(ReadError::BadFormat(format!(
                "chunk '{}' payload is truncated",
                self.header.id
            )));
        }

        self.consume_padding()?;
        self.state = ReaderState::ChunkInfo;
        Ok(())
    }

    /// Like [`read_chunk_data`](Self::read_chunk_data), returning the payload
    /// in a new vector. The vector grows with the bytes actually present, so
    /// a corrupt length does not trigger a huge allocation.
    pub fn read_chunk_vec(&mut self) -> ReadResult<Vec<u8>> {
        self.expect_state("read_chunk_vec", &[ReaderState::ChunkData])?;

        let need = u64::from(self.header.length);
        let mut data = Vec::new();
        self.state = ReaderState::Unknown;
        self.stream_mut()?.take(need).read_to_end(&mut data)?;
        if data.len() as u64 != need {
            log::warn!(
                "chunk '{}' payload truncated: {} of {} bytes",
                self.header.id,
                data.len(),
                need
            );
            return Err(ReadError::BadFormat(format!(
                "chunk '{}' payload is truncated",
                self.header.id
            )));
        }

        self.consume_padding()?;
        self.state = ReaderState::ChunkInfo;
        Ok(data)
    }

    /// Move to the next sibling header without copying the payload out.
    ///
    /// In `ChunkInfo` the header is read first, so `End` and `BadFormat`
    /// propagate from [`read_chunk_info`](Self::read_chunk_info).
    pub fn seek_next_chunk(&mut self) -> ReadResult<()> {
        match self.state {
            ReaderState::ChunkInfo => {
                self.read_chunk_info_unchecked()?;
                self.skip_payload()
            }
            ReaderState::ChunkData => self.skip_payload(),
            state => Err(ReadError::WrongState {
                operation: "seek_next_chunk",
                state,
            }),
        }
    }

    /// Read the current payload as a sequence of subchunks.
    ///
    /// The cursor does not move. Scanning is not bounded by the parent's
    /// length; record [`chunk_end`](Self::chunk_end) first if that matters.
    pub fn sink_to_subchunks(&mut self) -> ReadResult<()> {
        self.expect_state("sink_to_subchunks", &[ReaderState::ChunkData])?;
        self.state = ReaderState::ChunkInfo;
        Ok(())
    }

    /// Read the 4-byte list type that opens a `LIST`-style payload, then
    /// continue with its subchunks.
    pub fn sink_to_list(&mut self) -> ReadResult<FourCc> {
        self.expect_state("sink_to_list", &[ReaderState::ChunkData])?;
        if (self.header.length as usize) < FIELD_SIZE {
            return Err(ReadError::BadFormat(format!(
                "chunk '{}' is too short to hold a list type",
                self.header.id
            )));
        }

        self.state = ReaderState::Unknown;
        let mut list_type = [0u8; FIELD_SIZE];
        if read_full(self.stream_mut()?, &mut list_type)? != FIELD_SIZE {
            return Err(ReadError::BadFormat(format!(
                "list type of chunk '{}' is truncated",
                self.header.id
            )));
        }

        self.state = ReaderState::ChunkInfo;
        Ok(FourCc::new(list_type))
    }

    /// Scan forward through sibling chunks for `id`.
    ///
    /// On a match the reader is left in `ChunkData` at that chunk's payload.
    /// If the level ends first, position, header and state are restored to
    /// what they were before the call and [`ReadError::End`] is returned.
    pub fn find_chunk(&mut self, id: FourCc) -> ReadResult<ChunkHeader> {
        self.expect_state(
            "find_chunk",
            &[ReaderState::ChunkInfo, ReaderState::ChunkData],
        )?;
        let saved = self.bookmark()?;

        if self.state == ReaderState::ChunkData {
            self.skip_payload()?;
        }

        loop {
            match self.read_chunk_info_unchecked() {
                Ok(header) if header.id == id => return Ok(header),
                Ok(_) => self.skip_payload()?,
                Err(ReadError::End) => {
                    log::debug!("chunk '{}' not found, restoring offset {}", id, saved.offset);
                    self.restore(&saved)?;
                    return Err(ReadError::End);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Set cursor, stored header and state directly.
    ///
    /// This is the way out of `Unknown` and the way back up from a subchunk
    /// level. Repositioning to `Closed` closes the reader.
    pub fn reposition(
        &mut self,
        offset: u64,
        header: ChunkHeader,
        state: ReaderState,
    ) -> ReadResult<()> {
        if self.state == ReaderState::Closed {
            return Err(ReadError::WrongState {
                operation: "reposition",
                state: self.state,
            });
        }
        if state == ReaderState::Closed {
            self.close();
            return Ok(());
        }

        self.state = ReaderState::Unknown;
        self.stream_mut()?.seek(SeekFrom::Start(offset))?;
        self.header = header;
        self.state = state;
        log::trace!("repositioned to offset {} in state {}", offset, state);
        Ok(())
    }

    /// Snapshot of the current position, header and state
    pub fn bookmark(&mut self) -> ReadResult<Bookmark> {
        Ok(Bookmark {
            offset: self.position()?,
            header: self.header,
            state: self.state,
        })
    }

    pub fn restore(&mut self, bookmark: &Bookmark) -> ReadResult<()> {
        self.reposition(bookmark.offset, bookmark.header, bookmark.state)
    }

    /// Current stream offset
    pub fn position(&mut self) -> ReadResult<u64> {
        self.expect_state(
            "position",
            &[
                ReaderState::ChunkInfo,
                ReaderState::ChunkData,
                ReaderState::Unknown,
            ],
        )?;
        Ok(self.stream_mut()?.stream_position()?)
    }

    /// Offset of the header following the current chunk, pad byte included.
    ///
    /// Valid in `ChunkData`, before any of the payload is consumed.
    pub fn chunk_end(&mut self) -> ReadResult<u64> {
        self.expect_state("chunk_end", &[ReaderState::ChunkData])?;
        Ok(self.position()? + self.header.padded_length())
    }

    fn skip_payload(&mut self) -> ReadResult<()> {
        debug_assert_eq!(self.state, ReaderState::ChunkData);
        self.state = ReaderState::Unknown;
        let distance = self.header.padded_length() as i64;
        self.stream_mut()?.seek(SeekFrom::Current(distance))?;
        self.state = ReaderState::ChunkInfo;
        Ok(())
    }

    fn consume_padding(&mut self) -> ReadResult<()> {
        if !self.header.has_padding() {
            return Ok(());
        }
        let mut pad = [0u8; 1];
        if read_full(self.stream_mut()?, &mut pad)? == 1 {
            return Ok(());
        }
        if self.options.lenient_trailing_pad {
            log::warn!(
                "chunk '{}' is missing its pad byte at end of stream",
                self.header.id
            );
            return Ok(());
        }
        Err(ReadError::BadFormat(format!(
            "pad byte of chunk '{}' is missing",
            self.header.id
        )))
    }
}

/// Read until `buf` is full or the stream runs dry. Short counts are not
/// errors.
fn read_full<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
