use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

/// Command that opens a file or URL with the desktop's default handler.
fn opener(platform: Platform) -> Option<(&'static str, &'static [&'static str])> {
    match platform {
        Platform::MacOS => Some(("open", &[])),
        Platform::Linux => Some(("xdg-open", &[])),
        Platform::Windows => Some(("cmd", &["/C", "start", ""])),
        Platform::Unknown => None,
    }
}

pub fn open(target: &str) -> Result<()> {
    let platform = detect();
    let (program, args) = opener(platform).ok_or_else(|| Error::Launch {
        program: "opener".to_string(),
        reason: format!("no default opener for {}", std::env::consts::OS),
    })?;

    let status = Command::new(program)
        .args(args)
        .arg(target)
        .status()
        .map_err(|e| Error::Launch {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Launch {
            program: program.to_string(),
            reason: format!("exited with {status}"),
        })
    }
}

/// True for content that a browser or mail client can handle.
pub fn is_openable_url(content: &str) -> bool {
    let Some((scheme, rest)) = content.split_once(':') else {
        return false;
    };

    let valid_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    let hierarchical = rest.starts_with("//") && rest.len() > 2;
    let opaque = matches!(
        scheme.to_ascii_lowercase().as_str(),
        "mailto" | "tel" | "sms"
    ) && !rest.is_empty();

    valid_scheme && !content.chars().any(char::is_whitespace) && (hierarchical || opaque)
}

/// Where finished exports go.
pub trait ShareSink {
    fn share(&self, path: &Path) -> Result<()>;
}

/// Prints the export path so it can be picked up by another tool.
pub struct PrintPath;

impl ShareSink for PrintPath {
    fn share(&self, path: &Path) -> Result<()> {
        println!("{}", path.display());
        Ok(())
    }
}

/// Opens the export with the desktop's default handler.
pub struct OpenWith;

impl ShareSink for OpenWith {
    fn share(&self, path: &Path) -> Result<()> {
        open(&path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_openable() {
        assert!(is_openable_url("https://example.com"));
        assert!(is_openable_url("http://example.com/path?q=1"));
        assert!(is_openable_url("mailto:someone@example.com"));
        assert!(is_openable_url("tel:+15551234567"));
    }

    #[test]
    fn plain_text_is_not_openable() {
        assert!(!is_openable_url("hello world"));
        assert!(!is_openable_url("example.com"));
        assert!(!is_openable_url("WIFI:S:home;T:WPA;P:secret;;"));
        assert!(!is_openable_url("https://"));
        assert!(!is_openable_url("1http://example.com"));
        assert!(!is_openable_url("https://example.com/a b"));
    }

    #[test]
    fn every_known_platform_has_an_opener() {
        for platform in [Platform::MacOS, Platform::Linux, Platform::Windows] {
            assert!(opener(platform).is_some());
        }
        assert!(opener(Platform::Unknown).is_none());
    }
}
