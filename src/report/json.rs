//! JSON output for the scan history.
//!
//! Same records as the snapshot, most recent first, for scripting and piping.

use crate::error::Result;
use crate::store::ScannedCode;

pub fn render<'a>(codes: impl IntoIterator<Item = &'a ScannedCode>) -> Result<String> {
    let codes: Vec<&ScannedCode> = codes.into_iter().collect();
    Ok(serde_json::to_string_pretty(&codes)?)
}
