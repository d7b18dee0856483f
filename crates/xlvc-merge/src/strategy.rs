//! Conflict resolution strategies and the dispatcher that applies them to a
//! whole chunk file's text.

use xlvc_chunk::WorkbookChunk;
use xlvc_model::error::{Error, Result};
use xlvc_model::sheet::Sheet;

use crate::conflict::{self, ConflictRegion, Segment, Side};
use crate::semantic;

/// Which kind of chunk file is being resolved, since the semantic merge
/// rules differ between `workbook.json` and a `sheet_*.json` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Workbook,
    Sheet,
}

/// An enumerated resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStrategy {
    PreferOurs,
    PreferTheirs,
    Union,
    NewestByTimestamp,
    #[default]
    SemanticMerge,
    Interactive,
}

/// What an interactive callback decides for one conflict region.
pub enum InteractiveVerdict {
    UseOurs,
    UseTheirs,
    Union,
    /// Literal replacement text for this region (no markers).
    Literal(String),
}

/// Callback invoked once per conflict region under [`ResolutionStrategy::Interactive`].
pub trait InteractiveResolver {
    fn resolve(&self, region: &ConflictRegion) -> InteractiveVerdict;
}

/// Resolve every conflict region in `text` and return the merged file
/// content. `kind` selects which semantic merge rules apply when the
/// strategy (or a `newest_by_timestamp`/`semantic_merge` fallback) needs to
/// parse the file as a document.
pub fn resolve_file(
    text: &str,
    kind: ChunkKind,
    strategy: ResolutionStrategy,
    interactive: Option<&dyn InteractiveResolver>,
) -> Result<String> {
    let segments = conflict::parse(text)?;
    if !segments.iter().any(|s| matches!(s, Segment::Conflict(_))) {
        return Ok(text.to_string());
    }

    match strategy {
        ResolutionStrategy::PreferOurs => Ok(conflict::flatten(&segments, Side::Ours)),
        ResolutionStrategy::PreferTheirs => Ok(conflict::flatten(&segments, Side::Theirs)),
        ResolutionStrategy::Union => Ok(flatten_union(&segments)),
        ResolutionStrategy::NewestByTimestamp => newest_by_timestamp(&segments, kind),
        ResolutionStrategy::SemanticMerge => semantic_merge(&segments, kind),
        ResolutionStrategy::Interactive => {
            let resolver = interactive.ok_or_else(|| {
                Error::MalformedConflict("interactive strategy requires a resolver callback".to_string())
            })?;
            Ok(flatten_interactive(&segments, resolver))
        }
    }
}

fn flatten_union(segments: &[Segment]) -> String {
    let mut lines = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(ls) => lines.extend(ls.iter().cloned()),
            Segment::Conflict(region) => {
                lines.extend(region.ours_lines.iter().cloned());
                lines.extend(region.theirs_lines.iter().cloned());
            }
        }
    }
    lines.join("\n")
}

fn flatten_interactive(segments: &[Segment], resolver: &dyn InteractiveResolver) -> String {
    let mut lines = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(ls) => lines.extend(ls.iter().cloned()),
            Segment::Conflict(region) => match resolver.resolve(region) {
                InteractiveVerdict::UseOurs => lines.extend(region.ours_lines.iter().cloned()),
                InteractiveVerdict::UseTheirs => lines.extend(region.theirs_lines.iter().cloned()),
                InteractiveVerdict::Union => {
                    lines.extend(region.ours_lines.iter().cloned());
                    lines.extend(region.theirs_lines.iter().cloned());
                }
                InteractiveVerdict::Literal(text) => lines.extend(text.lines().map(str::to_string)),
            },
        }
    }
    lines.join("\n")
}

/// Parse both reconstructed sides as a document; keep the side with the
/// greater `modified` timestamp. If only one side parses, keep it. If
/// neither parses, fall back to `prefer_ours`.
fn newest_by_timestamp(segments: &[Segment], kind: ChunkKind) -> Result<String> {
    let ours_text = conflict::flatten(segments, Side::Ours);
    let theirs_text = conflict::flatten(segments, Side::Theirs);

    let ours_modified = parsed_modified(&ours_text, kind);
    let theirs_modified = parsed_modified(&theirs_text, kind);

    match (ours_modified, theirs_modified) {
        (Some(o), Some(t)) => Ok(if t > o { theirs_text } else { ours_text }),
        (Some(_), None) => Ok(ours_text),
        (None, Some(_)) => Ok(theirs_text),
        (None, None) => Ok(ours_text),
    }
}

fn parsed_modified(text: &str, kind: ChunkKind) -> Option<String> {
    match kind {
        ChunkKind::Sheet => serde_json::from_str::<Sheet>(text).ok().map(|_| String::new()),
        ChunkKind::Workbook => serde_json::from_str::<WorkbookChunk>(text)
            .ok()
            .and_then(|w| w.metadata.modified),
    }
}

/// Parse both reconstructed sides; if both parse, produce a merged document
/// per the field-by-field rules and re-serialize. On parse failure of
/// either side, fall back to `newest_by_timestamp`.
fn semantic_merge(segments: &[Segment], kind: ChunkKind) -> Result<String> {
    let ours_text = conflict::flatten(segments, Side::Ours);
    let theirs_text = conflict::flatten(segments, Side::Theirs);

    match kind {
        ChunkKind::Sheet => {
            let ours: Option<Sheet> = serde_json::from_str(&ours_text).ok();
            let theirs: Option<Sheet> = serde_json::from_str(&theirs_text).ok();
            match (ours, theirs) {
                (Some(o), Some(t)) => {
                    let merged = semantic::merge_sheets(&o, &t);
                    serde_json::to_string_pretty(&merged).map_err(|e| Error::Internal(e.to_string()))
                }
                _ => newest_by_timestamp(segments, kind),
            }
        }
        ChunkKind::Workbook => {
            let ours: Option<WorkbookChunk> = serde_json::from_str(&ours_text).ok();
            let theirs: Option<WorkbookChunk> = serde_json::from_str(&theirs_text).ok();
            match (ours, theirs) {
                (Some(o), Some(t)) => {
                    let merged = semantic::merge_workbook_chunks(&o, &t);
                    serde_json::to_string_pretty(&merged).map_err(|e| Error::Internal(e.to_string()))
                }
                _ => newest_by_timestamp(segments, kind),
            }
        }
    }
}
