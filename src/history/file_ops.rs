use std::{
    fs::File,
    io::{BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    str::{FromStr, SplitWhitespace},
};

use log::{debug, info};

use super::{HistoryError, HistoryRecord, HistoryStore};

/// Reads records in the length-prefixed text format:
///
/// ```text
/// <count>
/// <len(cmd)> <cmd> <numParams> <len(arg0)> <arg0> ...
/// ```
pub(super) fn decode<R: Read>(mut source: R) -> Result<Vec<HistoryRecord>, HistoryError> {
    let mut content = String::new();
    source.read_to_string(&mut content)?;

    let mut tokens = Tokens::new(&content);
    let count: usize = tokens.number("record count")?;
    // Counts come from the file, so nothing is preallocated from them.
    let mut records = Vec::new();

    for _ in 0..count {
        let command = tokens.text("command")?;
        let num_params: usize = tokens.number("argument count")?;
        let mut arguments = Vec::new();
        for _ in 0..num_params {
            arguments.push(tokens.text("argument")?);
        }
        records.push(HistoryRecord { command, arguments });
    }

    if let Some(extra) = tokens.advance() {
        return Err(HistoryError::Parse(format!(
            "unexpected token '{}' after {} records",
            extra, count
        )));
    }

    Ok(records)
}

pub(super) fn encode<W: Write>(records: &[HistoryRecord], sink: W) -> Result<(), HistoryError> {
    let mut sink = BufWriter::new(sink);

    writeln!(sink, "{}", records.len())?;
    for record in records {
        write!(
            sink,
            "{} {} {}",
            record.command.len(),
            record.command,
            record.arguments.len()
        )?;
        for arg in &record.arguments {
            write!(sink, " {} {}", arg.len(), arg)?;
        }
        writeln!(sink)?;
    }

    sink.flush()?;
    Ok(())
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            inner: content.split_whitespace(),
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<&'a str> {
        self.position += 1;
        self.inner.next()
    }

    fn required(&mut self, what: &str) -> Result<&'a str, HistoryError> {
        self.advance().ok_or_else(|| {
            HistoryError::Parse(format!("unexpected end of file, expected {}", what))
        })
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, HistoryError> {
        let token = self.required(what)?;
        token.parse().map_err(|_| {
            HistoryError::Parse(format!(
                "token {}: expected {}, found '{}'",
                self.position, what, token
            ))
        })
    }

    fn text(&mut self, what: &str) -> Result<String, HistoryError> {
        let len: usize = self.number(what)?;
        let token = self.required(what)?;
        if token.len() != len {
            return Err(HistoryError::Parse(format!(
                "token {}: {} '{}' does not match length {}",
                self.position, what, token, len
            )));
        }
        Ok(token.to_string())
    }
}

/// On-disk location of the persisted history.
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty history, not an error.
    pub fn load_into(&self, store: &mut HistoryStore) -> Result<usize, HistoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no history file at {}", self.path.display());
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let count = store.load(file)?;
        info!("loaded {} history records from {}", count, self.path.display());
        Ok(count)
    }

    pub fn save(&self, store: &HistoryStore) -> Result<(), HistoryError> {
        let file = File::create(&self.path)?;
        store.save(file)?;
        info!("saved {} history records to {}", store.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_format() {
        let input = "2\n9 movetodir 1 4 /tmp\n10 background 2 5 sleep 1 5\n";
        let records = decode(input.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].command, "movetodir");
        assert_eq!(records[0].arguments, vec!["/tmp"]);
        assert_eq!(records[1].to_string(), "background sleep 5");
    }

    #[test]
    fn test_encode_format() {
        let records = vec![
            HistoryRecord::new("whereami", Vec::new()),
            HistoryRecord::new("dalek", vec!["4242".to_string()]),
        ];
        let mut out = Vec::new();
        encode(&records, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2\n8 whereami 0\n5 dalek 1 4 4242\n"
        );
    }

    #[test]
    fn test_decode_empty_store() {
        assert!(decode("0\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let cases = [
            "",
            "x\n",
            "1\n",
            "1\n8 whereami\n",
            "1\n3 whereami 0\n",
            "1\n8 whereami 0\nextra\n",
            "1\n5 dalek 1 9 4242\n",
        ];

        for case in cases {
            assert!(
                matches!(decode(case.as_bytes()), Err(HistoryError::Parse(_))),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_decode_huge_counts_fail_cleanly() {
        for case in ["1000000000000000000\n", "1\n5 dalek 1000000000000000000\n"] {
            assert!(
                matches!(decode(case.as_bytes()), Err(HistoryError::Parse(_))),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("absent.txt"));
        let mut store = HistoryStore::new();

        assert_eq!(file.load_into(&mut store).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(&path, "3\n1 a 0\n1 b 0\n1 c 0\n").unwrap();

        let file = HistoryFile::new(&path);
        let mut store = HistoryStore::new();
        store.append("byebye", Vec::new());
        file.save(&store).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1\n6 byebye 0\n");

        let mut reloaded = HistoryStore::new();
        assert_eq!(file.load_into(&mut reloaded).unwrap(), 1);
        assert_eq!(reloaded, store);
    }
}
