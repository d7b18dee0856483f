//! Parsing standard three-way conflict markers out of a chunk file's text.

use xlvc_model::error::{Error, Result};

const OURS_MARKER: &str = "<<<<<<<";
const BASE_MARKER: &str = "|||||||";
const SEPARATOR_MARKER: &str = "=======";
const THEIRS_MARKER: &str = ">>>>>>>";

/// One conflicted region: the lines contributed by each side, and the base
/// lines if the file carries a three-way (diff3-style) base section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConflictRegion {
    pub ours_label: String,
    pub theirs_label: String,
    pub ours_lines: Vec<String>,
    pub base_lines: Option<Vec<String>>,
    pub theirs_lines: Vec<String>,
}

/// A piece of a file's text: either untouched lines or a conflicted region.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(Vec<String>),
    Conflict(ConflictRegion),
}

/// Which side of a [`ConflictRegion`] to take when flattening it back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Ours,
    Theirs,
}

/// Parse `text` into an ordered sequence of literal and conflicted segments.
///
/// Fails with [`Error::MalformedConflict`] if a start marker has no matching
/// separator and end within the file.
pub fn parse(text: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        if line.starts_with(OURS_MARKER) {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let ours_label = line[OURS_MARKER.len()..].trim().to_string();
            let mut ours_lines = Vec::new();
            let mut base_lines: Option<Vec<String>> = None;
            let mut in_base = false;
            let mut current_base = Vec::new();

            let separator_line = loop {
                match lines.next() {
                    Some(next) if next.starts_with(BASE_MARKER) => {
                        in_base = true;
                    }
                    Some(next) if next.starts_with(SEPARATOR_MARKER) => {
                        if in_base {
                            base_lines = Some(std::mem::take(&mut current_base));
                        }
                        break next;
                    }
                    Some(next) => {
                        if in_base {
                            current_base.push(next.to_string());
                        } else {
                            ours_lines.push(next.to_string());
                        }
                    }
                    None => {
                        return Err(Error::MalformedConflict(format!(
                            "conflict region starting with '{line}' has no '{SEPARATOR_MARKER}' separator"
                        )));
                    }
                }
            };
            let _ = separator_line;

            let mut theirs_lines = Vec::new();
            let theirs_label = loop {
                match lines.next() {
                    Some(next) if next.starts_with(THEIRS_MARKER) => {
                        break next[THEIRS_MARKER.len()..].trim().to_string();
                    }
                    Some(next) => theirs_lines.push(next.to_string()),
                    None => {
                        return Err(Error::MalformedConflict(format!(
                            "conflict region starting with '{line}' has no '{THEIRS_MARKER}' end marker"
                        )));
                    }
                }
            };

            segments.push(Segment::Conflict(ConflictRegion {
                ours_label,
                theirs_label,
                ours_lines,
                base_lines,
                theirs_lines,
            }));
        } else {
            literal.push(line.to_string());
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Flatten segments back to text, taking `side` for every conflicted region.
pub fn flatten(segments: &[Segment], side: Side) -> String {
    let mut lines = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(ls) => lines.extend(ls.iter().cloned()),
            Segment::Conflict(region) => match side {
                Side::Ours => lines.extend(region.ours_lines.iter().cloned()),
                Side::Theirs => lines.extend(region.theirs_lines.iter().cloned()),
            },
        }
    }
    lines.join("\n")
}

/// True if `text` contains at least one conflict marker.
pub fn has_conflict_markers(text: &str) -> bool {
    text.lines().any(|l| l.starts_with(OURS_MARKER))
}
