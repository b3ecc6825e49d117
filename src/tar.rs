//! Streaming TAR reader
//!
//! Parses fixed 512-byte USTAR headers and extracts regular-file contents.
//! Two operation modes, fixed at construction: buffer mode walks a fully
//! loaded archive with a read offset, streaming mode consumes appended
//! byte chunks through a sliding-window buffer. Invoking the other mode's
//! operation fails with [`TarError::ProgrammingError`].

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

// Re-export the crate's TAR error type for module consumers.
pub use crate::error::TarError;

/// Header/data block size; all archive arithmetic is in these units.
const BLOCK_SIZE: usize = 512;

/// Byte length of the NUL-terminated entry path field (first 100 bytes).
const PATH_LEN: usize = 100;
/// Byte offset of the octal file size field.
const SIZE_OFFSET: usize = 124;
/// Byte offset of the octal modification time field.
const MTIME_OFFSET: usize = 136;
/// Byte offset of the octal checksum field (8 bytes).
const CHECKSUM_OFFSET: usize = 148;
/// Byte offset of the entry type flag.
const TYPEFLAG_OFFSET: usize = 156;
/// Byte offset of the `ustar\0` magic.
const MAGIC_OFFSET: usize = 257;

/// One regular-file entry extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarEntry {
    /// Entry path from the header's 100-byte name field
    pub path: String,
    /// Modification time, Unix epoch seconds
    pub mtime: u64,
    /// File contents
    pub data: Vec<u8>,
}

/// Decoded 512-byte header block. Transient: parsed, used to slice out the
/// following data blocks, then dropped.
#[derive(Debug)]
struct TarHeader {
    is_file: bool,
    path: String,
    size: usize,
    mtime: u64,
}

enum Mode {
    Buffer { data: Vec<u8>, offset: usize },
    Streaming { buffer: Vec<u8> },
}

/// TAR archive reader.
///
/// # Buffer mode
/// ```no_run
/// use parsekit::{TarError, TarFile};
///
/// # fn main() -> Result<(), TarError> {
/// let mut tar = TarFile::open("bundle.tar")?;
/// loop {
///     match tar.extract_file() {
///         Ok(entry) => println!("{}: {} bytes", entry.path, entry.data.len()),
///         Err(TarError::EndOfFile) => break,
///         Err(err) => return Err(err),
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Streaming mode
/// ```
/// # fn next_chunk() -> Option<Vec<u8>> { None }
/// use parsekit::TarFile;
///
/// let mut tar = TarFile::streaming(None);
/// while let Some(chunk) = next_chunk() {
///     if let Ok(Some(entry)) = tar.consume(&chunk) {
///         println!("{}", entry.path);
///     }
/// }
/// ```
pub struct TarFile {
    mode: Mode,
}

impl TarFile {
    /// Buffer-mode reader over a fully loaded archive.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            mode: Mode::Buffer { data, offset: 0 },
        }
    }

    /// Buffer-mode reader loading the archive from disk.
    #[cfg(feature = "std")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TarError> {
        let data = std::fs::read(path).map_err(|err| TarError::Io(err.to_string()))?;
        Ok(Self::new(data))
    }

    /// Streaming-mode reader, optionally pre-seeded with initial bytes.
    pub fn streaming(initial: Option<&[u8]>) -> Self {
        let mut buffer = Vec::new();
        if let Some(bytes) = initial {
            buffer.extend_from_slice(bytes);
        }
        Self {
            mode: Mode::Streaming { buffer },
        }
    }

    /// Extract the next regular file from a buffer-mode reader.
    ///
    /// Non-file entries (directories, symlinks) are skipped. Signals
    /// [`TarError::EndOfFile`] at the archive terminator or when fewer
    /// than a full block remains. Fails with
    /// [`TarError::ProgrammingError`] on a streaming-mode reader.
    pub fn extract_file(&mut self) -> Result<TarEntry, TarError> {
        let Mode::Buffer { data, offset } = &mut self.mode else {
            return Err(TarError::ProgrammingError);
        };

        loop {
            if *offset + BLOCK_SIZE > data.len() {
                return Err(TarError::EndOfFile);
            }
            let header = parse_header(&data[*offset..*offset + BLOCK_SIZE])?;

            let mut file_data = None;
            if header.size > 0 {
                let start = *offset + BLOCK_SIZE;
                let end = start + header.size;
                if end > data.len() {
                    return Err(TarError::EndOfFile);
                }
                file_data = Some(data[start..end].to_vec());
            }

            *offset += BLOCK_SIZE + padded_size(header.size);

            if header.is_file {
                if let Some(data) = file_data {
                    return Ok(TarEntry {
                        path: header.path,
                        mtime: header.mtime,
                        data,
                    });
                }
            }
        }
    }

    /// Iterate over the remaining regular files of a buffer-mode reader.
    ///
    /// Stops at the clean end-of-archive marker; other errors are yielded.
    pub fn files(&mut self) -> Files<'_> {
        Files { tar: self }
    }

    /// Append bytes to a streaming-mode reader and return a completed
    /// file, if one is now fully buffered.
    ///
    /// Returns `Ok(None)` while more bytes are needed, and after fully
    /// consuming a non-file entry (those are never reported). Fails with
    /// [`TarError::ProgrammingError`] on a buffer-mode reader.
    pub fn consume(&mut self, bytes: &[u8]) -> Result<Option<TarEntry>, TarError> {
        let Mode::Streaming { buffer } = &mut self.mode else {
            return Err(TarError::ProgrammingError);
        };

        buffer.extend_from_slice(bytes);

        if buffer.len() > BLOCK_SIZE {
            let header = parse_header(&buffer[..BLOCK_SIZE])?;
            let end_offset = BLOCK_SIZE + padded_size(header.size);
            if buffer.len() > end_offset {
                let data = buffer[BLOCK_SIZE..BLOCK_SIZE + header.size].to_vec();
                buffer.drain(..end_offset);

                if header.is_file {
                    return Ok(Some(TarEntry {
                        path: header.path,
                        mtime: header.mtime,
                        data,
                    }));
                }
            }
        }
        Ok(None)
    }
}

/// Iterator over the regular files of a buffer-mode [`TarFile`].
pub struct Files<'a> {
    tar: &'a mut TarFile,
}

impl Iterator for Files<'_> {
    type Item = Result<TarEntry, TarError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.tar.extract_file() {
            Ok(entry) => Some(Ok(entry)),
            Err(TarError::EndOfFile) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Entry length rounded up to whole 512-byte blocks; exact multiples add
/// no padding block.
fn padded_size(size: usize) -> usize {
    if size == 0 {
        0
    } else {
        size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
    }
}

/// Parse one 512-byte header block.
///
/// A NUL first byte with no USTAR magic is the clean archive terminator
/// (`EndOfFile`); any other magic or checksum mismatch is `HeaderParse`.
fn parse_header(block: &[u8]) -> Result<TarHeader, TarError> {
    // magic "ustar\0" at 257..=262
    if &block[MAGIC_OFFSET..MAGIC_OFFSET + 5] != b"ustar" || block[MAGIC_OFFSET + 5] != 0 {
        if block[0] == 0 {
            return Err(TarError::EndOfFile);
        }
        return Err(TarError::HeaderParse);
    }

    // checksum: sum of all 512 bytes with the checksum field read as spaces
    let mut checksum: u32 = 0;
    for (index, &byte) in block.iter().enumerate() {
        if (CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8).contains(&index) {
            checksum += 32;
        } else {
            checksum += u32::from(byte);
        }
    }
    let stored = parse_octal(&block[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8]) as u32;
    if stored != checksum {
        log::warn!(
            "[TAR] header checksum mismatch: stored {:o}, computed {:o}",
            stored,
            checksum
        );
        return Err(TarError::HeaderParse);
    }

    // NUL or '0' marks a regular file; everything else is skipped
    let type_flag = block[TYPEFLAG_OFFSET];
    let is_file = type_flag == 0 || type_flag == b'0';

    let name_field = &block[..PATH_LEN];
    let name_len = name_field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(PATH_LEN);
    let path = String::from_utf8_lossy(&name_field[..name_len]).into_owned();

    let size = parse_octal(&block[SIZE_OFFSET..SIZE_OFFSET + 12]) as usize;
    let mtime = parse_octal(&block[MTIME_OFFSET..MTIME_OFFSET + 12]);

    log::debug!(
        "[TAR] header: path='{}' size={} mtime={} file={}",
        path,
        size,
        mtime,
        is_file
    );

    Ok(TarHeader {
        is_file,
        path,
        size,
        mtime,
    })
}

/// Base-8 field parse, `strtol`-style: leading spaces skipped, first
/// non-octal byte terminates.
fn parse_octal(field: &[u8]) -> u64 {
    let mut value = 0u64;
    let mut seen_digit = false;
    for &byte in field {
        match byte {
            b' ' if !seen_digit => continue,
            b'0'..=b'7' => {
                seen_digit = true;
                value = value * 8 + u64::from(byte - b'0');
            }
            _ => break,
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    /// Hand-build one archive entry: a valid USTAR header block plus the
    /// content padded to whole blocks.
    fn build_entry(path: &str, content: &[u8], mtime: u64, type_flag: u8) -> Vec<u8> {
        let mut block = [0u8; BLOCK_SIZE];
        block[..path.len()].copy_from_slice(path.as_bytes());
        let size_field = format!("{:011o}", content.len());
        block[SIZE_OFFSET..SIZE_OFFSET + 11].copy_from_slice(size_field.as_bytes());
        let mtime_field = format!("{:011o}", mtime);
        block[MTIME_OFFSET..MTIME_OFFSET + 11].copy_from_slice(mtime_field.as_bytes());
        block[TYPEFLAG_OFFSET] = type_flag;
        block[MAGIC_OFFSET..MAGIC_OFFSET + 6].copy_from_slice(b"ustar\0");

        let mut checksum: u32 = 8 * 32;
        for (index, &byte) in block.iter().enumerate() {
            if !(CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8).contains(&index) {
                checksum += u32::from(byte);
            }
        }
        let checksum_field = format!("{:06o}\0 ", checksum);
        block[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 8].copy_from_slice(checksum_field.as_bytes());

        let mut entry = block.to_vec();
        entry.extend_from_slice(content);
        let padding = padded_size(content.len()) - content.len();
        entry.extend_from_slice(&vec![0u8; padding]);
        entry
    }

    /// Two zero blocks: the clean end-of-archive marker.
    fn terminator() -> Vec<u8> {
        vec![0u8; BLOCK_SIZE * 2]
    }

    fn single_file_archive() -> Vec<u8> {
        let mut archive = build_entry("x.txt", b"hello", 1_445_000_000, b'0');
        archive.extend_from_slice(&terminator());
        archive
    }

    #[test]
    fn test_buffer_mode_round_trip() {
        let mut tar = TarFile::new(single_file_archive());
        let entry = tar.extract_file().unwrap();
        assert_eq!(entry.path, "x.txt");
        assert_eq!(entry.mtime, 1_445_000_000);
        assert_eq!(entry.data, b"hello");
        assert_eq!(tar.extract_file(), Err(TarError::EndOfFile));
    }

    #[test]
    fn test_buffer_mode_skips_non_file_entries() {
        let mut archive = build_entry("dir/", &[], 0, b'5');
        archive.extend_from_slice(&build_entry("dir/a.txt", b"abc", 7, b'0'));
        archive.extend_from_slice(&terminator());

        let mut tar = TarFile::new(archive);
        let entry = tar.extract_file().unwrap();
        assert_eq!(entry.path, "dir/a.txt");
        assert_eq!(entry.data, b"abc");
        assert_eq!(tar.extract_file(), Err(TarError::EndOfFile));
    }

    #[test]
    fn test_exact_block_multiple_has_no_padding_block() {
        let content = [b'z'; BLOCK_SIZE];
        let mut archive = build_entry("block.bin", &content, 0, b'0');
        // entry must be exactly header + one data block
        assert_eq!(archive.len(), BLOCK_SIZE * 2);
        archive.extend_from_slice(&build_entry("next.txt", b"ok", 0, b'0'));
        archive.extend_from_slice(&terminator());

        let mut tar = TarFile::new(archive);
        assert_eq!(tar.extract_file().unwrap().data.len(), BLOCK_SIZE);
        assert_eq!(tar.extract_file().unwrap().path, "next.txt");
    }

    #[test]
    fn test_checksum_mismatch_is_header_parse_error() {
        let mut archive = single_file_archive();
        archive[CHECKSUM_OFFSET] ^= 0x01;
        let mut tar = TarFile::new(archive);
        assert_eq!(tar.extract_file(), Err(TarError::HeaderParse));
    }

    #[test]
    fn test_bad_magic_is_header_parse_error() {
        let mut archive = single_file_archive();
        archive[MAGIC_OFFSET] = b'X';
        let mut tar = TarFile::new(archive);
        assert_eq!(tar.extract_file(), Err(TarError::HeaderParse));
    }

    #[test]
    fn test_truncated_data_is_end_of_file() {
        let mut archive = build_entry("x.txt", b"hello", 0, b'0');
        archive.truncate(BLOCK_SIZE + 2);
        let mut tar = TarFile::new(archive);
        assert_eq!(tar.extract_file(), Err(TarError::EndOfFile));
    }

    #[test]
    fn test_wrong_mode_is_programming_error() {
        let mut buffer_mode = TarFile::new(single_file_archive());
        assert_eq!(buffer_mode.consume(&[]), Err(TarError::ProgrammingError));

        let mut streaming_mode = TarFile::streaming(None);
        assert_eq!(
            streaming_mode.extract_file(),
            Err(TarError::ProgrammingError)
        );
    }

    #[test]
    fn test_streaming_single_chunk() {
        let archive = single_file_archive();
        let mut tar = TarFile::streaming(None);
        let entry = tar.consume(&archive).unwrap().unwrap();
        assert_eq!(entry.path, "x.txt");
        assert_eq!(entry.data, b"hello");
    }

    #[test]
    fn test_streaming_preseeded_buffer() {
        let archive = single_file_archive();
        let (head, tail) = archive.split_at(100);
        let mut tar = TarFile::streaming(Some(head));
        let entry = tar.consume(tail).unwrap().unwrap();
        assert_eq!(entry.path, "x.txt");
    }

    #[test]
    fn test_streaming_matches_buffer_mode() {
        let mut archive = build_entry("a.txt", b"first file", 1, b'0');
        archive.extend_from_slice(&build_entry("sub/", &[], 2, b'5'));
        archive.extend_from_slice(&build_entry("sub/b.bin", &[0xAAu8; 700], 3, b'0'));
        archive.extend_from_slice(&terminator());

        let mut buffered = Vec::new();
        let mut tar = TarFile::new(archive.clone());
        loop {
            match tar.extract_file() {
                Ok(entry) => buffered.push((entry.path, entry.data)),
                Err(TarError::EndOfFile) => break,
                Err(err) => panic!("unexpected error: {}", err),
            }
        }

        // feed the same bytes in fixed small chunks
        let mut streamed = Vec::new();
        let mut tar = TarFile::streaming(None);
        for chunk in archive.chunks(13) {
            match tar.consume(chunk) {
                Ok(Some(entry)) => streamed.push((entry.path, entry.data)),
                Ok(None) => {}
                Err(TarError::EndOfFile) => break,
                Err(err) => panic!("unexpected error: {}", err),
            }
        }

        assert_eq!(buffered, streamed);
        assert_eq!(buffered.len(), 2);
    }

    #[test]
    fn test_files_iterator() {
        let mut archive = build_entry("a", b"1", 0, b'0');
        archive.extend_from_slice(&build_entry("b", b"22", 0, b'0'));
        archive.extend_from_slice(&terminator());

        let mut tar = TarFile::new(archive);
        let names: Vec<String> = tar
            .files()
            .map(|entry| entry.unwrap().path)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"00000000005"), 5);
        assert_eq!(parse_octal(b"  17 "), 0o17);
        assert_eq!(parse_octal(b"0000644\0"), 0o644);
        assert_eq!(parse_octal(b"\0\0\0"), 0);
    }
}
