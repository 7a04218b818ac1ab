use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;

use log::info;
use tempfile::NamedTempFile;

use crate::constants::*;
use crate::error::IoResultExt;
use crate::Error;
use crate::PatchCursor;
use crate::Result;
use crate::Walker;
use crate::MTIME_OFFSET;

/// What was done to the archive.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Stats {
    /// The number of entries (trailer included) whose mtime was reset.
    pub entries: usize,
}

/// Reset modification time of every entry by patching `store` in place.
///
/// Entry sizes never change, so only the mtime fields are overwritten.
/// There is no rollback: on error the entries before the failed one stay patched.
pub fn strip_in_place<S: Read + Write + Seek>(store: S) -> Result<Stats> {
    let cursor = PatchCursor::new(store).op("rewind the archive")?;
    let mut walker = Walker::new(cursor);
    let mut stats = Stats::default();
    while let Some((offset, header)) = walker.read_header()? {
        walker
            .get_mut()
            .write_at(offset + MTIME_OFFSET as u64, &EPOCH_MTIME)
            .op("write mtime")?;
        let name = walker.read_name(&header)?;
        walker.skip_data(&header)?;
        stats.entries += 1;
        if !name.is_trailer() {
            info!("stripped {}", name.to_string_lossy());
        }
    }
    walker.get_mut().flush().op("flush the archive")?;
    Ok(stats)
}

/// Copy the archive from `input` to `output` resetting modification time of every entry.
///
/// Names, data, padding and everything after the trailer are copied verbatim.
pub fn strip_copy<R: Read + Seek, W: Write>(input: R, mut output: W) -> Result<Stats> {
    let mut walker = Walker::new(input);
    let mut stats = Stats::default();
    while let Some((_, mut header)) = walker.read_header()? {
        header.set_epoch_mtime();
        header.write(output.by_ref()).op("write header")?;
        let name = walker.read_name(&header)?;
        output.write_all(name.raw()).op("write name")?;
        walker.copy_data(&header, output.by_ref())?;
        stats.entries += 1;
        if !name.is_trailer() {
            info!("stripped {}", name.to_string_lossy());
        }
    }
    walker.copy_rest(output.by_ref())?;
    output.flush().op("flush the output")?;
    Ok(stats)
}

/// Reset modification time of every entry of the archive stored in `input`.
///
/// The archive is patched in place when `output` is `None` or points to the
/// same file. Otherwise the result is written to a temporary file next to `output`
/// that replaces `output` only when the whole archive has been copied.
pub fn strip_file(input: &Path, output: Option<&Path>) -> Result<Stats> {
    match output {
        Some(output) if !is_same_file(input, output) => {
            info!("stripping {} into {}", input.display(), output.display());
            let file = File::open(input).op("open the archive")?;
            let permissions = file.metadata().op("read archive metadata")?.permissions();
            let dir = match output.parent() {
                Some(dir) if dir != Path::new("") => dir,
                _ => Path::new("."),
            };
            let mut tmp = NamedTempFile::new_in(dir).op("create temporary file")?;
            let stats = strip_copy(BufReader::new(file), BufWriter::new(tmp.as_file_mut()))?;
            tmp.as_file()
                .set_permissions(permissions)
                .op("set output file permissions")?;
            tmp.persist(output).map_err(|e| Error::Io {
                op: "replace the output file",
                source: e.error,
            })?;
            Ok(stats)
        }
        _ => {
            info!("stripping {} in place", input.display());
            let mut file = File::options()
                .read(true)
                .write(true)
                .open(input)
                .op("open the archive")?;
            strip_in_place(&mut file)
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
