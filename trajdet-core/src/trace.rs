//! Recorded event traces, one JSON object per line

use crate::error::DetectorError;
use crate::event::Event;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read every event of a trace file
pub fn read_trace(path: &Path) -> Result<Vec<Event>, DetectorError> {
    let file = File::open(path).map_err(|e| DetectorError::io(path, e))?;
    read_trace_from(BufReader::new(file), path)
}

/// Parse a trace; `origin` is only used in error messages. Blank lines are
/// skipped.
pub fn read_trace_from<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<Event>, DetectorError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DetectorError::io(origin, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line).map_err(|e| DetectorError::Parse {
            path: origin.to_path_buf(),
            line: idx + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Write `events` as a trace file
pub fn write_trace(path: &Path, events: &[Event]) -> Result<(), DetectorError> {
    let file = File::create(path).map_err(|e| DetectorError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_trace_to(&mut out, events).map_err(|e| DetectorError::io(path, e))?;
    out.flush().map_err(|e| DetectorError::io(path, e))
}

pub fn write_trace_to<W: Write>(out: &mut W, events: &[Event]) -> std::io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *out, event)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
