use std::path::PathBuf;

use thiserror::Error;

/// Restorable picker state: enough to resume browsing, or an outstanding
/// overwrite question, after a host-driven save/restore cycle.
///
/// The compact persistence format is intentionally dependency-free and
/// designed to be stable and forward-compatible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedState {
    /// Directory being browsed when the state was captured.
    pub current_path: PathBuf,
    /// Overwrite candidate awaiting an answer, if any.
    pub pending_confirmation: Option<PathBuf>,
}

/// Error reported by [`SavedState::deserialize_compact`].
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("saved state line {line}: {message}")]
pub struct SavedStateError {
    /// 1-based input line the error was detected on.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl SavedState {
    /// Serializes into a compact, line-based format.
    ///
    /// Format (v1):
    /// - First non-empty line: `v1`
    /// - Current directory: `d<TAB>path`
    /// - Pending confirmation: `c<TAB>path` (absent when none)
    ///
    /// Path fields are escaped.
    pub fn serialize_compact(&self) -> String {
        let mut out = String::new();
        out.push_str("v1\n");
        out.push_str("d\t");
        out.push_str(&escape_field(&self.current_path.display().to_string()));
        out.push('\n');
        if let Some(pending) = &self.pending_confirmation {
            out.push_str("c\t");
            out.push_str(&escape_field(&pending.display().to_string()));
            out.push('\n');
        }
        out
    }

    /// Deserializes the compact format produced by
    /// [`SavedState::serialize_compact`].
    pub fn deserialize_compact(input: &str) -> Result<Self, SavedStateError> {
        let mut version_ok = false;
        let mut current_path: Option<PathBuf> = None;
        let mut pending: Option<PathBuf> = None;

        for (line_idx, raw_line) in input.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw_line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            if !version_ok {
                if line == "v1" {
                    version_ok = true;
                    continue;
                }
                return Err(SavedStateError {
                    line: line_no,
                    message: "missing or unsupported version token".into(),
                });
            }

            let (kind, rest) = line.split_once('\t').ok_or_else(|| SavedStateError {
                line: line_no,
                message: "missing kind field".into(),
            })?;

            let value = unescape_field(rest).map_err(|msg| SavedStateError {
                line: line_no,
                message: msg.into(),
            })?;

            match kind {
                "d" => current_path = Some(PathBuf::from(value)),
                "c" => pending = Some(PathBuf::from(value)),
                _ => {
                    return Err(SavedStateError {
                        line: line_no,
                        message: format!("unknown record kind `{kind}`"),
                    });
                }
            }
        }

        let Some(current_path) = current_path else {
            return Err(SavedStateError {
                line: input.lines().count().max(1),
                message: "missing current directory record".into(),
            });
        };
        Ok(Self {
            current_path,
            pending_confirmation: pending,
        })
    }
}

fn escape_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_field(s: &str) -> Result<String, &'static str> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err("dangling escape");
        };
        match esc {
            '\\' => out.push('\\'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return Err("unknown escape"),
        }
    }
    Ok(out)
}
