use anyhow::{Result, anyhow};
use regex::Regex;
use tracing::warn;

pub const DEFAULT_DELIMITER: &str = "GO";

const LINE_COMMENT_PREFIX: &str = "--";
const BYTE_ORDER_MARK: char = '\u{FEFF}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBatch {
    pub index: usize,
    pub sql: String,
}

/// Splits a script into batches on lines holding only the delimiter token.
///
/// Matching is case-sensitive and line-anchored: `GO` splits, while `go`,
/// `GOTO t` or `-- GO` stay inside the surrounding batch.
#[derive(Debug, Clone)]
pub struct BatchSplitter {
    delimiter: String,
    delimiter_line: Regex,
}

impl BatchSplitter {
    pub fn new(delimiter: &str) -> Result<Self> {
        let trimmed_delimiter = delimiter.trim();
        if trimmed_delimiter.is_empty() {
            return Err(anyhow!("Batch delimiter must not be empty"));
        }
        if trimmed_delimiter.contains(['\r', '\n']) {
            return Err(anyhow!("Batch delimiter must fit on a single line"));
        }

        let pattern = format!(r"(?m)^[ \t]*{}[ \t]*\r?$", regex::escape(trimmed_delimiter));
        let delimiter_line = Regex::new(&pattern)
            .map_err(|error| anyhow!("Invalid batch delimiter {trimmed_delimiter}: {error}"))?;

        Ok(Self {
            delimiter: trimmed_delimiter.to_string(),
            delimiter_line,
        })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn split(&self, script: &str) -> Vec<ScriptBatch> {
        // SSMS saves scripts with a BOM, which `trim` leaves in place.
        let script = script.strip_prefix(BYTE_ORDER_MARK).unwrap_or(script);
        self.delimiter_line
            .split(script)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .filter(|fragment| !is_comment_led(fragment))
            .enumerate()
            .map(|(position, fragment)| ScriptBatch {
                index: position + 1,
                sql: fragment.to_string(),
            })
            .collect()
    }
}

fn is_comment_led(fragment: &str) -> bool {
    if !fragment.starts_with(LINE_COMMENT_PREFIX) {
        return false;
    }

    // The whole fragment is dropped, statements after the leading comment included.
    let carries_statements = fragment.lines().map(str::trim).any(|line| {
        !line.is_empty() && !line.starts_with(LINE_COMMENT_PREFIX)
    });
    if carries_statements {
        warn!(
            first_line = fragment.lines().next().unwrap_or_default(),
            "skipping comment-led batch that also contains statements"
        );
    }
    true
}
