pub const HEADER_LEN: usize = 110;
pub const MTIME_OFFSET: usize = 46;
pub const BLOCK_LEN: usize = 512;
pub const TRAILER: &[u8] = b"TRAILER!!!";

/// One archive member as written by [`ArchiveBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestEntry {
    pub name: Vec<u8>,
    pub ino: u32,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub mtime: u32,
    pub dev_major: u32,
    pub dev_minor: u32,
    pub rdev_major: u32,
    pub rdev_minor: u32,
    pub check: u32,
    pub data: Vec<u8>,
}

impl TestEntry {
    pub fn file<N: AsRef<[u8]>, D: AsRef<[u8]>>(name: N, data: D) -> Self {
        Self {
            name: name.as_ref().to_vec(),
            ino: 0,
            mode: 0o100644,
            uid: 1000,
            gid: 1000,
            nlink: 1,
            mtime: 1_700_000_000,
            dev_major: 8,
            dev_minor: 1,
            rdev_major: 0,
            rdev_minor: 0,
            check: 0,
            data: data.as_ref().to_vec(),
        }
    }

    pub fn dir<N: AsRef<[u8]>>(name: N) -> Self {
        let mut entry = Self::file(name, b"");
        entry.mode = 0o40755;
        entry.nlink = 2;
        entry
    }

    pub fn trailer() -> Self {
        Self {
            name: TRAILER.to_vec(),
            ino: 0,
            mode: 0,
            uid: 0,
            gid: 0,
            nlink: 1,
            mtime: 0,
            dev_major: 0,
            dev_minor: 0,
            rdev_major: 0,
            rdev_minor: 0,
            check: 0,
            data: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    pub fn with_ino(mut self, ino: u32) -> Self {
        self.ino = ino;
        self
    }

    /// Name length as stored in the header, trailing NUL included.
    pub fn name_len(&self) -> usize {
        self.name.len() + 1
    }
}

/// Writes newc archives into memory.
#[derive(Default)]
pub struct ArchiveBuilder {
    bytes: Vec<u8>,
    upper_case: bool,
    offsets: Vec<usize>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode header fields with upper-case hex digits (like the Linux kernel's `gen_init_cpio`).
    pub fn upper_case(mut self, value: bool) -> Self {
        self.upper_case = value;
        self
    }

    pub fn append(&mut self, entry: &TestEntry) -> &mut Self {
        self.offsets.push(self.bytes.len());
        let fields = [
            entry.ino,
            entry.mode,
            entry.uid,
            entry.gid,
            entry.nlink,
            entry.mtime,
            entry.data.len() as u32,
            entry.dev_major,
            entry.dev_minor,
            entry.rdev_major,
            entry.rdev_minor,
            entry.name_len() as u32,
            entry.check,
        ];
        self.bytes.extend_from_slice(b"070701");
        for value in fields {
            let s = if self.upper_case {
                format!("{:08X}", value)
            } else {
                format!("{:08x}", value)
            };
            self.bytes.extend_from_slice(s.as_bytes());
        }
        self.bytes.extend_from_slice(&entry.name);
        self.bytes.push(0);
        self.pad();
        self.bytes.extend_from_slice(&entry.data);
        self.pad();
        self
    }

    /// Offsets of the headers appended so far.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets[..]
    }

    /// Append the trailer and pad the archive to a 512-byte block boundary.
    pub fn finish(mut self) -> Vec<u8> {
        self.append(&TestEntry::trailer());
        let remainder = self.bytes.len() % BLOCK_LEN;
        if remainder != 0 {
            self.bytes.resize(self.bytes.len() + BLOCK_LEN - remainder, 0);
        }
        self.bytes
    }

    /// Append the trailer followed by arbitrary trailing bytes.
    pub fn finish_with<T: AsRef<[u8]>>(mut self, slack: T) -> Vec<u8> {
        self.append(&TestEntry::trailer());
        self.bytes.extend_from_slice(slack.as_ref());
        self.bytes
    }

    /// Bytes written so far, no trailer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn pad(&mut self) {
        let remainder = self.bytes.len() % 4;
        if remainder != 0 {
            self.bytes.resize(self.bytes.len() + 4 - remainder, 0);
        }
    }
}

/// Build a block-padded archive out of `entries`.
pub fn archive(entries: &[TestEntry]) -> Vec<u8> {
    let mut builder = ArchiveBuilder::new();
    for entry in entries {
        builder.append(entry);
    }
    builder.finish()
}

/// Positions of every header's mtime field in an archive built from `entries` (trailer included).
pub fn mtime_offsets(entries: &[TestEntry]) -> Vec<usize> {
    let mut builder = ArchiveBuilder::new();
    for entry in entries {
        builder.append(entry);
    }
    builder.append(&TestEntry::trailer());
    builder
        .offsets()
        .iter()
        .map(|offset| offset + MTIME_OFFSET)
        .collect()
}
