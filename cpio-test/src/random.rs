use arbitrary::Arbitrary;
use arbitrary::Unstructured;

use crate::ArchiveBuilder;
use crate::TestEntry;
use crate::TRAILER;

const MAX_NAME_LEN: usize = 32;

/// Randomly generated newc archive.
#[derive(Debug, Clone)]
pub struct RandomArchive {
    pub entries: Vec<TestEntry>,
    pub upper_case: bool,
    /// Bytes that follow the trailer entry.
    pub slack: Vec<u8>,
}

impl RandomArchive {
    pub fn bytes(&self) -> Vec<u8> {
        self.build(|entry| entry.clone())
    }

    /// What the archive must look like after every mtime is reset to zero.
    pub fn stripped_bytes(&self) -> Vec<u8> {
        self.build(|entry| entry.clone().with_mtime(0))
    }

    pub fn names(&self) -> Vec<Vec<u8>> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    fn build<F: Fn(&TestEntry) -> TestEntry>(&self, f: F) -> Vec<u8> {
        let mut builder = ArchiveBuilder::new().upper_case(self.upper_case);
        for entry in self.entries.iter() {
            builder.append(&f(entry));
        }
        builder.finish_with(&self.slack)
    }
}

impl<'a> Arbitrary<'a> for RandomArchive {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_entries: usize = u.int_in_range(0..=10)?;
        let mut entries = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let name_len: usize = u.int_in_range(1..=MAX_NAME_LEN)?;
            let mut name = u.bytes(name_len)?.to_vec();
            for b in name.iter_mut().filter(|b| **b == 0) {
                *b = b'x';
            }
            if name == TRAILER {
                // must not look like the end of the archive
                name.push(b'x');
            }
            let data_len: usize = u.int_in_range(0..=64)?;
            let data = u.bytes(data_len)?.to_vec();
            entries.push(TestEntry {
                name,
                ino: u.arbitrary()?,
                mode: u.arbitrary()?,
                uid: u.arbitrary()?,
                gid: u.arbitrary()?,
                nlink: u.arbitrary()?,
                mtime: u.arbitrary()?,
                dev_major: u.arbitrary()?,
                dev_minor: u.arbitrary()?,
                rdev_major: u.arbitrary()?,
                rdev_minor: u.arbitrary()?,
                check: u.arbitrary()?,
                data,
            });
        }
        let slack_len: usize = u.int_in_range(0..=600)?;
        let slack = u.bytes(slack_len)?.to_vec();
        Ok(Self {
            entries,
            upper_case: u.arbitrary()?,
            slack,
        })
    }
}
