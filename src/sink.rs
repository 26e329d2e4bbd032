//! Append-only JSONL output

use std::io::Write;

use crate::encoder::RecordEncoder;
use crate::error::GenerateError;
use crate::types::GeneratedRecord;

/// Writes one JSON object per line and counts the lines written
pub struct RecordSink<W: Write> {
    writer: W,
    encoder: RecordEncoder,
    flush_each: bool,
    written: usize,
}

impl<W: Write> RecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            encoder: RecordEncoder::new(),
            flush_each: false,
            written: 0,
        }
    }

    /// Flush the writer after every record
    pub fn with_flush(mut self, flush_each: bool) -> Self {
        self.flush_each = flush_each;
        self
    }

    /// Append one record. On failure the sink stays usable for later
    /// records.
    pub fn write_record(&mut self, record: &GeneratedRecord) -> Result<(), GenerateError> {
        let line = self.encoder.to_json_line(record)?;
        writeln!(self.writer, "{line}")?;
        if self.flush_each {
            self.writer.flush()?;
        }
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W, GenerateError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
