//! Text export of scanned codes.
//!
//! Layout:
//! - header: title line, export date line, blank line
//! - one block per code: `Code:` and `Scanned:` lines
//! - a separator line between blocks when exporting several codes
//!
//! Exports are written to a temporary directory. Single-code files carry the
//! code's id in their name, full exports carry the export time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use super::format_timestamp;
use crate::error::Result;
use crate::store::ScannedCode;

pub const TITLE: &str = "StikQR Export";
pub const SEPARATOR: &str = "-------------------";

#[derive(Debug, Clone, Copy)]
pub struct ExportFormatter {
    offset: FixedOffset,
}

impl ExportFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        ExportFormatter { offset }
    }

    /// Formats times in the current local offset.
    pub fn local() -> Self {
        Self::new(super::local_offset())
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn format_single(&self, code: &ScannedCode, exported_at: DateTime<Utc>) -> String {
        let mut text = self.header(exported_at);
        self.push_block(&mut text, code);
        text
    }

    pub fn format_all(&self, codes: &[ScannedCode], exported_at: DateTime<Utc>) -> String {
        let mut text = self.header(exported_at);
        for (i, code) in codes.iter().enumerate() {
            if i > 0 {
                text.push_str(SEPARATOR);
                text.push('\n');
            }
            self.push_block(&mut text, code);
        }
        text
    }

    fn header(&self, exported_at: DateTime<Utc>) -> String {
        format!(
            "{TITLE}\nDate: {}\n\n",
            format_timestamp(exported_at, self.offset)
        )
    }

    fn push_block(&self, text: &mut String, code: &ScannedCode) {
        text.push_str(&format!("Code: {}\n", code.content));
        text.push_str(&format!(
            "Scanned: {}\n",
            format_timestamp(code.timestamp, self.offset)
        ));
    }
}

/// Writes formatted exports into a directory.
pub struct Exporter {
    formatter: ExportFormatter,
    dir: PathBuf,
}

impl Exporter {
    pub fn new(formatter: ExportFormatter, dir: impl Into<PathBuf>) -> Self {
        Exporter {
            formatter,
            dir: dir.into(),
        }
    }

    /// Exporter writing into the system temporary directory.
    pub fn temporary(formatter: ExportFormatter) -> Self {
        Self::new(formatter, std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn export_single(&self, code: &ScannedCode, exported_at: DateTime<Utc>) -> Result<PathBuf> {
        let name = format!("ScannedQRCode_{}.txt", code.id);
        let text = self.formatter.format_single(code, exported_at);
        self.write(&name, &text)
    }

    pub fn export_all(&self, codes: &[ScannedCode], exported_at: DateTime<Utc>) -> Result<PathBuf> {
        let name = format!("ScannedQRCodes_{}.txt", exported_at.format("%Y%m%d-%H%M%S%.3f"));
        let text = self.formatter.format_all(codes, exported_at);
        self.write(&name, &text)
    }

    fn write(&self, name: &str, text: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);

        // write beside the target and rename so a reader never sees half a file
        let partial = self.dir.join(format!(".{name}.partial"));
        let written = fs::write(&partial, text).and_then(|()| fs::rename(&partial, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial) {
                log::debug!("could not remove {}: {cleanup}", partial.display());
            }
            return Err(e.into());
        }

        log::info!("exported to {}", path.display());
        Ok(path)
    }
}
