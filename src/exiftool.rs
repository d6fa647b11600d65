//! Metadata extraction through a long-running `exiftool -stay_open` session.
//!
//! One session is started per run, answers a single batch request for all
//! files, and is shut down on every exit path.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DiffResult, ExifDiffError};
use crate::metadata::MetadataRecord;
use crate::utils::{decode_best_effort, trim_newline};

const READY: &str = "{ready}";

/// Anything that can turn a batch of files into metadata records, in order.
pub trait MetadataSource {
    fn fetch(&mut self, files: &[PathBuf]) -> DiffResult<Vec<MetadataRecord>>;
}

pub struct ExifTool {
    program: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl ExifTool {
    /// Spawns `program -stay_open True -@ -`. Diagnostics from the tool go
    /// straight to our stderr.
    pub fn start(program: &Path) -> DiffResult<Self> {
        let mut child = Command::new(program)
            .args(["-stay_open", "True", "-@", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ExifDiffError::ExifToolSpawn {
                program: program.to_path_buf(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExifDiffError::MetadataFetch(
                    "exiftool stdout was not captured".into(),
                ));
            }
        };
        debug!(program = ?program, pid = child.id(), "exiftool session started");

        Ok(ExifTool {
            program: program.to_path_buf(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }

    /// Sends one argument list terminated by `-execute` and returns everything
    /// printed before the `{ready}` marker.
    fn request(&mut self, args: &[&str]) -> DiffResult<String> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ExifDiffError::MetadataFetch("exiftool session is closed".into()))?;
        for arg in args {
            writeln!(stdin, "{arg}")?;
        }
        writeln!(stdin, "-execute")?;
        stdin.flush()?;

        let mut body = String::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.stdout.read_until(b'\n', &mut buf)? == 0 {
                return Err(ExifDiffError::MetadataFetch(format!(
                    "{:?} exited before finishing the request",
                    self.program
                )));
            }
            let line = decode_best_effort(&buf);
            if trim_newline(&line) == READY {
                break;
            }
            body.push_str(&line);
        }
        Ok(body)
    }

    /// Ends the session and reaps the process.
    pub fn close(mut self) -> DiffResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> DiffResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Dropping stdin after the stop request closes the pipe as well.
        let sent = match self.stdin.take() {
            Some(mut stdin) => send_stop(&mut stdin),
            None => Ok(()),
        };
        let status = self.child.wait()?;
        debug!(%status, "exiftool session stopped");
        sent?;
        Ok(())
    }
}

fn send_stop(stdin: &mut ChildStdin) -> io::Result<()> {
    writeln!(stdin, "-stay_open")?;
    writeln!(stdin, "False")?;
    stdin.flush()
}

impl Drop for ExifTool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("failed to stop exiftool session cleanly: {e}");
        }
    }
}

impl MetadataSource for ExifTool {
    fn fetch(&mut self, files: &[PathBuf]) -> DiffResult<Vec<MetadataRecord>> {
        let mut args = vec!["-json", "-a", "-G1"];
        for file in files {
            let name = file.to_str().ok_or_else(|| {
                ExifDiffError::MetadataFetch(format!("{file:?} is not valid UTF-8"))
            })?;
            if name.contains('\n') {
                return Err(ExifDiffError::MetadataFetch(format!(
                    "{file:?} contains a newline"
                )));
            }
            args.push(name);
        }

        info!(files = files.len(), "fetching metadata");
        let body = self.request(&args)?;
        parse_records(&body, files.len())
    }
}

/// Object entries in document order, duplicates included.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of metadata tags")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parses `exiftool -json` output into one record per requested file.
pub fn parse_records(body: &str, expected: usize) -> DiffResult<Vec<MetadataRecord>> {
    let objects: Vec<OrderedEntries> = if body.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(body)?
    };
    if objects.len() != expected {
        return Err(ExifDiffError::MetadataFetch(format!(
            "expected metadata for {expected} files, exiftool returned {}",
            objects.len()
        )));
    }

    Ok(objects
        .into_iter()
        .map(|OrderedEntries(entries)| {
            let record = MetadataRecord::from_entries(
                entries.iter().map(|(k, v)| (k.as_str(), value_text(v))),
            );
            debug!(
                source = record.get("SourceFile").unwrap_or("?"),
                tags = record.len(),
                duplicates = record.duplicates().len(),
                "parsed metadata record"
            );
            record
        })
        .collect())
}

/// Display text for a tag value; values are compared as these strings.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_document_order() {
        let body = r#"[{"SourceFile": "a.jpg", "File:Z": "last", "EXIF:A": "first"}]"#;
        let records = parse_records(body, 1).unwrap();
        assert_eq!(records[0].keys(), ["SourceFile", "File:Z", "EXIF:A"]);
    }

    #[test]
    fn duplicate_tags_keep_first_value() {
        let body = r#"[{"EXIF:Make": "Canon", "EXIF:Make": "Nikon"}]"#;
        let records = parse_records(body, 1).unwrap();
        assert_eq!(records[0].get("EXIF:Make"), Some("Canon"));
        assert_eq!(records[0].duplicates(), ["EXIF:Make"]);
    }

    #[test]
    fn values_become_text() {
        assert_eq!(value_text(&json!("f/2.8")), "f/2.8");
        assert_eq!(value_text(&json!(72)), "72");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(["a", 2])), "a, 2");
    }

    #[test]
    fn record_count_must_match() {
        let body = r#"[{"SourceFile": "a.jpg"}]"#;
        let err = parse_records(body, 2).unwrap_err();
        assert!(matches!(err, ExifDiffError::MetadataFetch(_)));
    }

    #[test]
    fn empty_output_is_a_fetch_error() {
        assert!(matches!(
            parse_records("\n", 1),
            Err(ExifDiffError::MetadataFetch(_))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_records("[{\"A\": ", 1),
            Err(ExifDiffError::ExifToolOutput(_))
        ));
    }

    #[test]
    fn missing_program_fails_to_start() {
        let err = ExifTool::start(Path::new("/nonexistent/exiftool")).err().unwrap();
        assert!(matches!(err, ExifDiffError::ExifToolSpawn { .. }));
    }
}
