//! Payload compression and decompression handling.
//!
//! Compressed payloads use an LZSS variant with a 4096 byte ring buffer. The stream is a sequence
//! of segments: one flag byte whose bits are read low bit first, then one piece per bit. A set bit
//! is a literal byte. A clear bit is a two byte back-reference `b0 b1` into the ring buffer:
//!
//! ```text
//! offset = b0 | (b1 & 0xF0) << 4     12 bit ring position
//! count  = (b1 & 0x0F) + 3           3..=18 bytes
//! ```
//!
//! The ring buffer starts zero filled with its write cursor at [`RING_START`]. Every byte emitted,
//! literal or copied, is written at the cursor. The final segment may hold fewer than eight pieces;
//! the declared compressed size marks the end of the stream.

use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::types::EntryDescriptor;

/// Size of the LZSS ring buffer
pub const RING_SIZE: usize = 4096;

/// Position of the ring buffer write cursor before the first byte is emitted
pub const RING_START: usize = 4078;

/// Shortest run a back-reference can copy
pub const MIN_MATCH: usize = 3;

/// Longest run a back-reference can copy
pub const MAX_MATCH: usize = 18;

const HASH_BITS: u32 = 12;
const HASH_SIZE: usize = 1 << HASH_BITS;
const MAX_CHAIN: usize = 256;
const NIL: usize = usize::MAX;

/// Identifies how a payload is stored inside the PRE file
///
/// The format has no explicit field for this; an entry is compressed exactly when its
/// descriptor carries a non-zero compressed size.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stores the data as it is
    #[default]
    None,

    /// Compress the data using the ring buffer LZSS scheme
    Lzss,
}

impl From<u32> for CompressionMethod {
    fn from(compressed_size: u32) -> Self {
        match compressed_size {
            0 => CompressionMethod::None,
            _ => CompressionMethod::Lzss,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::None => write!(f, "stored"),
            CompressionMethod::Lzss => write!(f, "lzss"),
        }
    }
}

/// Window of recently emitted bytes shared by literals and back-references
struct RingBuffer {
    data: [u8; RING_SIZE],
    cursor: usize,
}

impl RingBuffer {
    fn new() -> Self {
        Self {
            data: [0; RING_SIZE],
            cursor: RING_START,
        }
    }

    fn get(&self, position: usize) -> u8 {
        self.data[position % RING_SIZE]
    }

    fn push(&mut self, byte: u8) {
        self.data[self.cursor] = byte;
        self.cursor = (self.cursor + 1) % RING_SIZE;
    }
}

/// Collects decoded bytes, counting but not storing anything past the expected size.
struct Output {
    data: Vec<u8>,
    expected: usize,
    produced: usize,
}

impl Output {
    fn emit(&mut self, ring: &mut RingBuffer, byte: u8) {
        ring.push(byte);
        if self.produced < self.expected {
            self.data.push(byte);
        }
        self.produced += 1;
    }
}

/// Decompress the first `compressed_len` bytes of `input` into exactly `raw_len` bytes.
///
/// Fails with [`Error::TruncatedInput`] when `input` is shorter than `compressed_len` or a
/// back-reference is cut off by the end of the stream, and with [`Error::SizeMismatch`] when the
/// stream decodes to any length other than `raw_len`. No partial output is returned.
pub fn decompress(input: &[u8], compressed_len: usize, raw_len: usize) -> Result<Vec<u8>> {
    let input = input.get(..compressed_len).ok_or(Error::TruncatedInput)?;

    let mut ring = RingBuffer::new();
    let mut output = Output {
        // A back-reference expands two bytes into at most eighteen
        data: Vec::with_capacity(raw_len.min(input.len().saturating_mul(9))),
        expected: raw_len,
        produced: 0,
    };

    let mut position = 0;
    while position < input.len() {
        let flags = input[position];
        position += 1;

        for bit in 0..8 {
            // The last segment stops wherever the stream does
            if position >= input.len() {
                break;
            }

            if (flags >> bit) & 1 == 1 {
                let byte = input[position];
                position += 1;
                output.emit(&mut ring, byte);
            } else {
                let (b0, b1) = match input.get(position..position + 2) {
                    Some(&[b0, b1]) => (b0, b1),
                    _ => return Err(Error::TruncatedInput),
                };
                position += 2;

                let offset = (b0 as usize) | (((b1 as usize) & 0xF0) << 4);
                let count = ((b1 & 0x0F) as usize) + MIN_MATCH;

                // Byte at a time: the source may overlap bytes written by this same copy
                for i in 0..count {
                    let byte = ring.get(offset + i);
                    output.emit(&mut ring, byte);
                }
            }
        }
    }

    if output.produced != raw_len {
        return Err(Error::SizeMismatch {
            expected: raw_len,
            actual: output.produced,
        });
    }

    Ok(output.data)
}

/// Builds segments, opening a new flag byte every eight pieces.
struct SegmentWriter {
    data: Vec<u8>,
    flag_position: usize,
    pieces: u8,
}

impl SegmentWriter {
    fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            flag_position: 0,
            pieces: 8,
        }
    }

    fn next_piece(&mut self) -> u8 {
        if self.pieces == 8 {
            self.flag_position = self.data.len();
            self.data.push(0);
            self.pieces = 0;
        }
        let bit = self.pieces;
        self.pieces += 1;
        bit
    }

    fn literal(&mut self, byte: u8) {
        let bit = self.next_piece();
        self.data[self.flag_position] |= 1 << bit;
        self.data.push(byte);
    }

    fn reference(&mut self, offset: usize, count: usize) {
        debug_assert!(offset < RING_SIZE);
        debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&count));

        self.next_piece();
        self.data.push((offset & 0xFF) as u8);
        self.data.push((((offset >> 4) & 0xF0) | (count - MIN_MATCH)) as u8);
    }
}

/// Hash chains over positions of the window, newest first.
struct MatchFinder {
    head: Vec<usize>,
    previous: Vec<usize>,
}

impl MatchFinder {
    fn new(len: usize) -> Self {
        Self {
            head: vec![NIL; HASH_SIZE],
            previous: vec![NIL; len],
        }
    }

    fn hash(window: &[u8], position: usize) -> usize {
        let value = ((window[position] as usize) << 8)
            ^ ((window[position + 1] as usize) << 4)
            ^ (window[position + 2] as usize);
        value & (HASH_SIZE - 1)
    }

    fn insert(&mut self, window: &[u8], position: usize) {
        if position + MIN_MATCH > window.len() {
            return;
        }
        let hash = Self::hash(window, position);
        self.previous[position] = self.head[hash];
        self.head[hash] = position;
    }

    /// Longest earlier run matching `position`, as `(start, length)`.
    fn longest_match(&self, window: &[u8], position: usize) -> Option<(usize, usize)> {
        let limit = MAX_MATCH.min(window.len() - position);
        if limit < MIN_MATCH {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head[Self::hash(window, position)];
        let mut chain = 0;

        while candidate != NIL && chain < MAX_CHAIN {
            if position - candidate > RING_SIZE {
                break;
            }

            // Runs may extend past `position`; the decoder replays them byte by byte
            let length = (0..limit)
                .take_while(|&i| window[candidate + i] == window[position + i])
                .count();

            if length >= MIN_MATCH && best.map_or(true, |(_, l)| length > l) {
                best = Some((candidate, length));
                if length == limit {
                    break;
                }
            }

            candidate = self.previous[candidate];
            chain += 1;
        }

        best
    }
}

/// Compress `input` into a stream [`decompress`] turns back into `input`.
///
/// Uses greedy longest-match parsing over the 4096 byte window, including the zero filled ring
/// contents that precede the first byte.
pub fn compress(input: &[u8]) -> Vec<u8> {
    // The ring's initial zeros behave like RING_SIZE bytes of history before the input
    let mut window = vec![0u8; RING_SIZE];
    window.extend_from_slice(input);

    let mut finder = MatchFinder::new(window.len());
    for position in 0..RING_SIZE {
        finder.insert(&window, position);
    }

    let mut segments = SegmentWriter::new(input.len() + input.len() / 8 + 1);
    let mut position = RING_SIZE;

    while position < window.len() {
        match finder.longest_match(&window, position) {
            Some((start, length)) => {
                segments.reference((start + RING_START) % RING_SIZE, length);
                for p in position..position + length {
                    finder.insert(&window, p);
                }
                position += length;
            }
            None => {
                segments.literal(window[position]);
                finder.insert(&window, position);
                position += 1;
            }
        }
    }

    segments.data
}

/// Reader over one entry's payload
pub(crate) enum PreBlockReader<'a, R: Read + Seek> {
    Stored(io::Take<&'a mut R>),
    Decoded(Cursor<Vec<u8>>),
}

impl<'a, R: Read + Seek> PreBlockReader<'a, R> {
    #[tracing::instrument(level = "debug", skip(reader, descriptor))]
    pub fn new(reader: &'a mut R, start: u64, descriptor: &EntryDescriptor) -> Result<Self> {
        reader.seek(SeekFrom::Start(start))?;

        Ok(match descriptor.compression_method() {
            CompressionMethod::None => {
                PreBlockReader::Stored(reader.take(descriptor.raw_size as u64))
            }
            CompressionMethod::Lzss => {
                // Never allocate the declared size up front
                let mut compressed = Vec::new();
                reader
                    .take(descriptor.compressed_size as u64)
                    .read_to_end(&mut compressed)?;
                if compressed.len() != descriptor.compressed_size as usize {
                    return Err(Error::TruncatedInput);
                }

                PreBlockReader::Decoded(Cursor::new(decompress(
                    &compressed,
                    compressed.len(),
                    descriptor.raw_size as usize,
                )?))
            }
        })
    }
}

impl<R: Read + Seek> Read for PreBlockReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            PreBlockReader::Stored(r) => {
                let read = r.read(buf)?;
                if read == 0 && !buf.is_empty() && r.limit() > 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("stored payload ended {} bytes early", r.limit()),
                    ));
                }
                Ok(read)
            }
            PreBlockReader::Decoded(r) => r.read(buf),
        }
    }
}
