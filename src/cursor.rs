use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;

/// Cursor over a random-access byte store that can patch bytes behind the read position.
///
/// The position is tracked locally, so reads and relative seeks never have to
/// ask the store where they are.
pub struct PatchCursor<S> {
    store: S,
    position: u64,
}

impl<S: Read + Write + Seek> PatchCursor<S> {
    /// Create a cursor positioned at the start of `store`.
    pub fn new(mut store: S) -> std::io::Result<Self> {
        store.seek(SeekFrom::Start(0))?;
        Ok(Self { store, position: 0 })
    }

    /// Current absolute position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the read position by `offset` bytes.
    pub fn seek_relative(&mut self, offset: i64) -> std::io::Result<u64> {
        self.position = self.store.seek(SeekFrom::Current(offset))?;
        Ok(self.position)
    }

    /// Write `bytes` at absolute `offset`, then return to the current position.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> std::io::Result<()> {
        let back = self.position;
        self.store.seek(SeekFrom::Start(offset))?;
        self.store.write_all(bytes)?;
        self.store.seek(SeekFrom::Start(back))?;
        Ok(())
    }

    /// Flush the underlying store.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.store.flush()
    }

    /// Get mutable reference to the underlying store.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Get the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: Read + Write + Seek> Read for PatchCursor<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.store.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<S: Read + Write + Seek> Seek for PatchCursor<S> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.position = self.store.seek(pos)?;
        Ok(self.position)
    }

    fn stream_position(&mut self) -> std::io::Result<u64> {
        Ok(self.position)
    }
}
