//! Durable corpus store backed by a JSON-lines file.
//!
//! Each line holds one serialized [`TrainingExample`]. Appends are serialized
//! by a mutex and synced before `save` returns. A failed append is truncated
//! away, and a torn final line left by a crash is dropped when the file is
//! opened.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::corpus::store::CorpusStore;
use crate::corpus::types::TrainingExample;
use crate::error::{Result, UrgencyError};

/// Corpus stored as one JSON document per line.
#[derive(Debug)]
pub struct JsonlCorpusStore {
    path: PathBuf,
    writer: Mutex<Appender>,
}

#[derive(Debug)]
struct Appender {
    file: File,
    count: usize,
}

/// Parsed contents of a corpus file.
struct Scan {
    examples: Vec<TrainingExample>,
    /// Byte length of the complete lines.
    intact_len: u64,
    /// The last line parsed but has no terminating newline.
    unterminated: bool,
}

impl JsonlCorpusStore {
    /// Open (creating if needed) the corpus file at `path`.
    ///
    /// Every existing line is parsed once so a corrupt file fails here rather
    /// than on the first retrain.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let scan = scan_examples(&path)?;
        let len = file.metadata()?.len();
        if scan.intact_len < len {
            log::warn!(
                "dropping {} bytes of torn trailing line from {}",
                len - scan.intact_len,
                path.display()
            );
            file.set_len(scan.intact_len)?;
            file.sync_data()?;
        } else if scan.unterminated {
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        let count = scan.examples.len();
        log::debug!("opened corpus {} with {count} examples", path.display());

        Ok(JsonlCorpusStore {
            path,
            writer: Mutex::new(Appender { file, count }),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse every example of a JSON-lines file.
///
/// Blank lines are skipped, as is an unparsable final line with no newline
/// (an interrupted append). Any other bad line is an error naming its number.
pub fn read_examples(path: &Path) -> Result<Vec<TrainingExample>> {
    Ok(scan_examples(path)?.examples)
}

fn scan_examples(path: &Path) -> Result<Scan> {
    let bytes = std::fs::read(path)?;
    let mut examples = Vec::new();
    let mut offset = 0usize;
    let mut unterminated = false;

    for (line_num, line) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
        let body = line.strip_suffix(b"\n");
        let complete = body.is_some();
        let body = body.unwrap_or(line);

        if !body.trim_ascii().is_empty() {
            match serde_json::from_slice::<TrainingExample>(body) {
                Ok(example) => {
                    examples.push(example);
                    unterminated = !complete;
                }
                Err(e) if !complete => {
                    log::warn!(
                        "{}: ignoring torn line {}: {e}",
                        path.display(),
                        line_num + 1
                    );
                    break;
                }
                Err(e) => {
                    return Err(UrgencyError::store(format!(
                        "{}: line {}: {e}",
                        path.display(),
                        line_num + 1
                    )));
                }
            }
        }
        offset += line.len();
    }

    Ok(Scan {
        examples,
        intact_len: offset as u64,
        unterminated,
    })
}

/// Write `line` through `writer` and sync `file`, truncating `file` back to
/// its previous length if any step fails.
fn append_line<W: Write>(file: &File, mut writer: W, line: &[u8]) -> Result<()> {
    let start = file.metadata()?.len();
    let written = writer
        .write_all(line)
        .and_then(|()| writer.flush())
        .and_then(|()| file.sync_data());

    if let Err(e) = written {
        if let Err(rollback) = file.set_len(start) {
            log::error!("failed to truncate partial append: {rollback}");
        }
        return Err(e.into());
    }
    Ok(())
}

impl CorpusStore for JsonlCorpusStore {
    fn find_all(&self) -> Result<Vec<TrainingExample>> {
        // Holding the writer lock keeps a half-written line out of the snapshot.
        let _guard = self.writer.lock();
        read_examples(&self.path)
    }

    fn save(&self, example: TrainingExample) -> Result<()> {
        let mut line = serde_json::to_string(&example)?;
        line.push('\n');

        let mut appender = self.writer.lock();
        append_line(&appender.file, &appender.file, line.as_bytes())?;
        appender.count += 1;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.writer.lock().count)
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
