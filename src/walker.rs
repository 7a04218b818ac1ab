use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;

use log::debug;

use crate::constants::*;
use crate::data_padding;
use crate::error::IoResultExt;
use crate::name_padding;
use crate::Error;
use crate::Header;
use crate::Result;

/// Entry name together with its on-disk padding.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Name {
    raw: Vec<u8>,
    len: usize,
}

impl Name {
    fn new(raw: Vec<u8>) -> Self {
        let len = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        Self { raw, len }
    }

    /// Name without trailing NUL bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.len]
    }

    /// Name bytes as stored in the archive: trailing NUL and padding included.
    pub fn raw(&self) -> &[u8] {
        &self.raw[..]
    }

    /// Is this the name of the last entry?
    pub fn is_trailer(&self) -> bool {
        self.as_bytes() == TRAILER
    }

    /// Lossy UTF-8 conversion.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

/// Archive entry: its header and name. The data is never retained.
#[derive(Clone, Debug)]
pub struct Entry {
    /// Header offset.
    pub offset: u64,
    /// Parsed header.
    pub header: Header,
    /// Entry name.
    pub name: Name,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Scanning,
    Done,
}

/// Walks newc entries one by one until the trailer.
///
/// Each entry is consumed in three steps: [`read_header`](Walker::read_header),
/// [`read_name`](Walker::read_name), and then either
/// [`skip_data`](Walker::skip_data) or [`copy_data`](Walker::copy_data).
/// Offsets are counted from the position of the reader when the walker was created.
pub struct Walker<R> {
    reader: R,
    state: State,
    position: u64,
}

impl<R: Read + Seek> Walker<R> {
    /// Create new walker that reads the archive from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: State::Scanning,
            position: 0,
        }
    }

    /// Has the trailer been found?
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Current offset.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read the next header and return it along with its offset.
    ///
    /// Returns `None` after the trailer.
    pub fn read_header(&mut self) -> Result<Option<(u64, Header)>> {
        if self.state == State::Done {
            return Ok(None);
        }
        let offset = self.position;
        let mut block = [0_u8; HEADER_LEN];
        match self.reader.read_exact(&mut block[..]) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::MissingTrailer { offset });
            }
            Err(source) => {
                return Err(Error::Io {
                    op: "read header",
                    source,
                })
            }
        }
        self.position += HEADER_LEN as u64;
        let header = Header::parse(block, offset)?;
        debug!("header at offset {}:\n{}", offset, header);
        Ok(Some((offset, header)))
    }

    /// Read the name of the entry that `header` belongs to.
    ///
    /// Finding the trailer stops the walk, but its data still has to be skipped or copied.
    pub fn read_name(&mut self, header: &Header) -> Result<Name> {
        let name_len = header.name_len();
        let len = name_len as u64 + name_padding(name_len) as u64;
        let mut raw = Vec::new();
        self.reader
            .by_ref()
            .take(len)
            .read_to_end(&mut raw)
            .op("read name")?;
        if (raw.len() as u64) != len {
            return Err(Error::Io {
                op: "read name",
                source: ErrorKind::UnexpectedEof.into(),
            });
        }
        self.position += len;
        let name = Name::new(raw);
        debug!(
            "entry {:?}: name size {} + {}, data size {} + {}",
            name.to_string_lossy(),
            name_len,
            name_padding(name_len),
            header.file_size(),
            data_padding(header.file_size())
        );
        if name.is_trailer() {
            self.state = State::Done;
        }
        Ok(name)
    }

    /// Move past the data of the entry.
    ///
    /// Fails with `UnexpectedEof` if the data runs past the end of the stream.
    pub fn skip_data(&mut self, header: &Header) -> Result<()> {
        let len = data_len(header);
        let target = self
            .reader
            .seek(SeekFrom::Current(len as i64))
            .op("skip data")?;
        let end = self.reader.seek(SeekFrom::End(0)).op("skip data")?;
        if target > end {
            return Err(Error::Io {
                op: "skip data",
                source: ErrorKind::UnexpectedEof.into(),
            });
        }
        self.reader.seek(SeekFrom::Start(target)).op("skip data")?;
        self.position += len;
        Ok(())
    }

    /// Copy the data of the entry (padding included) to `writer`.
    pub fn copy_data<W: Write>(&mut self, header: &Header, writer: W) -> Result<()> {
        let len = data_len(header);
        let n = copy_exact(self.reader.by_ref(), writer, len).op("copy data")?;
        self.position += n;
        Ok(())
    }

    /// Copy everything from the current position to the end of the stream.
    pub fn copy_rest<W: Write>(&mut self, mut writer: W) -> Result<u64> {
        let n = std::io::copy(&mut self.reader, &mut writer).op("copy the end of the archive")?;
        self.position += n;
        Ok(n)
    }

    /// Read the next entry skipping its data.
    ///
    /// Returns `None` after the trailer. The trailer itself is returned as an entry.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let Some((offset, header)) = self.read_header()? else {
            return Ok(None);
        };
        let name = self.read_name(&header)?;
        self.skip_data(&header)?;
        Ok(Some(Entry {
            offset,
            header,
            name,
        }))
    }

    /// Get mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Get the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn data_len(header: &Header) -> u64 {
    let file_size = header.file_size();
    file_size as u64 + data_padding(file_size) as u64
}

fn copy_exact<R: Read, W: Write>(reader: R, mut writer: W, len: u64) -> std::io::Result<u64> {
    let n = std::io::copy(&mut reader.take(len), &mut writer)?;
    if n != len {
        return Err(ErrorKind::UnexpectedEof.into());
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use cpio_test::archive;
    use cpio_test::ArchiveBuilder;
    use cpio_test::TestEntry;

    use super::*;
    use crate::Field;

    #[test]
    fn walk_until_trailer() {
        let bytes = archive(&[
            TestEntry::dir("etc"),
            TestEntry::file("etc/hostname", "box\n"),
            TestEntry::file("hello.txt", "world"),
        ]);
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        let mut names = Vec::new();
        let mut offsets = Vec::new();
        while let Some(entry) = walker.next_entry().unwrap() {
            names.push(entry.name.to_string_lossy());
            offsets.push(entry.offset);
        }
        assert_eq!(vec!["etc", "etc/hostname", "hello.txt", "TRAILER!!!"], names);
        assert_eq!(0, offsets[0]);
        // "etc" + NUL = 4 bytes, padded to 6, no data
        assert_eq!(116, offsets[1]);
        assert!(walker.is_done());
        assert!(walker.next_entry().unwrap().is_none());
        assert!(walker.read_header().unwrap().is_none());
    }

    #[test]
    fn trailer_data_is_consumed() {
        let mut builder = ArchiveBuilder::new();
        builder.append(&TestEntry::file("a", "1"));
        let mut trailer = TestEntry::trailer();
        trailer.data = b"xyz".to_vec();
        builder.append(&trailer);
        let mut bytes = builder.into_bytes();
        bytes.extend_from_slice(b"slack");
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        while walker.next_entry().unwrap().is_some() {}
        let mut rest = Vec::new();
        walker.copy_rest(&mut rest).unwrap();
        assert_eq!(b"slack", &rest[..]);
        assert_eq!(bytes.len() as u64, walker.position());
    }

    #[test]
    fn name_keeps_padding() {
        let bytes = archive(&[TestEntry::file("ab", "")]);
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        let (offset, header) = walker.read_header().unwrap().unwrap();
        assert_eq!(0, offset);
        let name = walker.read_name(&header).unwrap();
        assert_eq!(b"ab", name.as_bytes());
        // 110 + 3 is padded to 116
        assert_eq!(b"ab\0\0\0\0", name.raw());
        assert!(!name.is_trailer());
        assert_eq!(116, walker.position());
    }

    #[test]
    fn copy_data_includes_padding() {
        let bytes = archive(&[TestEntry::file("hello.txt", "world")]);
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        let (_, header) = walker.read_header().unwrap().unwrap();
        walker.read_name(&header).unwrap();
        let mut data = Vec::new();
        walker.copy_data(&header, &mut data).unwrap();
        assert_eq!(b"world\0\0\0", &data[..]);
        let entry = walker.next_entry().unwrap().unwrap();
        assert!(entry.name.is_trailer());
    }

    #[test]
    fn missing_trailer() {
        let mut builder = ArchiveBuilder::new();
        builder.append(&TestEntry::file("a", "data"));
        let bytes = builder.into_bytes();
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        assert!(walker.next_entry().unwrap().is_some());
        match walker.next_entry() {
            Err(Error::MissingTrailer { offset }) => assert_eq!(bytes.len() as u64, offset),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn bad_magic_in_second_entry() {
        let mut bytes = archive(&[TestEntry::file("a", "12"), TestEntry::file("b", "34")]);
        let second = 116;
        bytes[second..second + 6].copy_from_slice(b"070702");
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        assert!(walker.next_entry().unwrap().is_some());
        assert!(matches!(
            walker.next_entry(),
            Err(Error::BadMagic { offset: 116, .. })
        ));
    }

    #[test]
    fn truncated_name() {
        let mut builder = ArchiveBuilder::new();
        builder.append(&TestEntry::file("a-long-name", ""));
        let mut bytes = builder.into_bytes();
        bytes.truncate(HEADER_LEN + 3);
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        let (_, header) = walker.read_header().unwrap().unwrap();
        let error = walker.read_name(&header).unwrap_err();
        assert!(error.is_io_kind(ErrorKind::UnexpectedEof), "{}", error);
    }

    #[test]
    fn truncated_data() {
        let bytes = archive(&[TestEntry::file("a", vec![7_u8; 100])]);
        let bytes = &bytes[..HEADER_LEN + 2 + 10];
        let mut walker = Walker::new(Cursor::new(bytes));
        let (_, header) = walker.read_header().unwrap().unwrap();
        assert_eq!(100, header.get(Field::FileSize));
        walker.read_name(&header).unwrap();
        let error = walker.copy_data(&header, std::io::sink()).unwrap_err();
        assert!(error.is_io_kind(ErrorKind::UnexpectedEof), "{}", error);
    }

    #[test]
    fn skip_data_past_the_end() {
        let bytes = archive(&[TestEntry::file("a", vec![7_u8; 100])]);
        let bytes = &bytes[..HEADER_LEN + 2 + 10];
        let mut walker = Walker::new(Cursor::new(bytes));
        let (_, header) = walker.read_header().unwrap().unwrap();
        walker.read_name(&header).unwrap();
        let error = walker.skip_data(&header).unwrap_err();
        assert!(error.is_io_kind(ErrorKind::UnexpectedEof), "{}", error);
        assert_eq!((HEADER_LEN + 2) as u64, walker.position());
    }

    #[test]
    fn skip_data_up_to_the_end() {
        let mut builder = ArchiveBuilder::new();
        builder.append(&TestEntry::file("a", "abcd"));
        let bytes = builder.into_bytes();
        let mut walker = Walker::new(Cursor::new(&bytes[..]));
        let (_, header) = walker.read_header().unwrap().unwrap();
        walker.read_name(&header).unwrap();
        walker.skip_data(&header).unwrap();
        assert_eq!(bytes.len() as u64, walker.position());
        assert_eq!(bytes.len() as u64, walker.get_mut().stream_position().unwrap());
    }

    #[test]
    fn walks_random_archives() {
        arbtest::arbtest(|u| {
            let archive: cpio_test::RandomArchive = u.arbitrary()?;
            let bytes = archive.bytes();
            let mut walker = Walker::new(Cursor::new(&bytes[..]));
            let mut names = Vec::new();
            while let Some(entry) = walker.next_entry().unwrap() {
                names.push(entry.name.as_bytes().to_vec());
            }
            assert_eq!(Some(TRAILER), names.pop().as_deref());
            assert_eq!(archive.names(), names);
            assert_eq!(
                (bytes.len() - archive.slack.len()) as u64,
                walker.position()
            );
            Ok(())
        });
    }
}
