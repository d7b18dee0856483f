//! xlvc-model: the document model, codec, and diff engine shared by the
//! watcher, chunk store, and merge resolver.

pub mod cell;
pub mod codec;
pub mod comment;
pub mod defined_names;
pub mod diff;
pub mod digest;
pub mod doc_props;
pub mod document;
pub mod error;
pub mod formula;
pub mod merge;
pub mod numfmt;
pub mod protection;
pub mod sheet;
pub mod sst;
pub mod style;
pub mod utils;
pub mod validation;
pub mod workbook_paths;
