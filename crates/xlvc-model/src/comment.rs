//! Comment management utilities.
//!
//! Provides functions for adding, querying, and removing cell comments.

use xlvc_xml::comments::{Authors, Comment, CommentList, CommentRun, CommentText, Comments};
use xlvc_xml::namespaces;

/// Configuration for a cell comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentConfig {
    /// The cell reference (e.g. "A1").
    pub cell: String,
    /// The author of the comment.
    pub author: String,
    /// The plain text of the comment.
    pub text: String,
}

/// Add a comment to a sheet's comments collection.
///
/// If `comments` is `None`, a new `Comments` structure is created.
pub fn add_comment(comments: &mut Option<Comments>, config: &CommentConfig) {
    let c = comments.get_or_insert_with(|| Comments {
        xmlns: namespaces::SPREADSHEET_ML.to_string(),
        authors: Authors {
            authors: Vec::new(),
        },
        comment_list: CommentList {
            comments: Vec::new(),
        },
    });

    // Find or add the author.
    let author_id = match c.authors.authors.iter().position(|a| a == &config.author) {
        Some(idx) => idx as u32,
        None => {
            c.authors.authors.push(config.author.clone());
            (c.authors.authors.len() - 1) as u32
        }
    };

    // Remove existing comment on the same cell if any.
    c.comment_list
        .comments
        .retain(|comment| comment.r#ref != config.cell);

    // Add the new comment.
    c.comment_list.comments.push(Comment {
        r#ref: config.cell.clone(),
        author_id,
        text: CommentText {
            runs: vec![CommentRun {
                rpr: None,
                t: config.text.clone(),
            }],
        },
    });
}

/// Get the comment for a specific cell.
///
/// Returns `None` if there is no comment on the cell.
pub fn get_comment(comments: &Option<Comments>, cell: &str) -> Option<CommentConfig> {
    let c = comments.as_ref()?;
    let comment = c.comment_list.comments.iter().find(|cm| cm.r#ref == cell)?;

    let author = c
        .authors
        .authors
        .get(comment.author_id as usize)
        .cloned()
        .unwrap_or_default();

    let text = comment
        .text
        .runs
        .iter()
        .map(|r| r.t.as_str())
        .collect::<Vec<_>>()
        .join("");

    Some(CommentConfig {
        cell: cell.to_string(),
        author,
        text,
    })
}

/// Remove a comment from a specific cell.
///
/// Returns `true` if a comment was found and removed.
pub fn remove_comment(comments: &mut Option<Comments>, cell: &str) -> bool {
    if let Some(ref mut c) = comments {
        let before = c.comment_list.comments.len();
        c.comment_list
            .comments
            .retain(|comment| comment.r#ref != cell);
        let removed = c.comment_list.comments.len() < before;

        // Clean up if no comments remain.
        if c.comment_list.comments.is_empty() {
            *comments = None;
        }

        removed
    } else {
        false
    }
}

/// Get all comments from a sheet's comments collection.
pub fn get_all_comments(comments: &Option<Comments>) -> Vec<CommentConfig> {
    match comments.as_ref() {
        Some(c) => c
            .comment_list
            .comments
            .iter()
            .map(|comment| {
                let author = c
                    .authors
                    .authors
                    .get(comment.author_id as usize)
                    .cloned()
                    .unwrap_or_default();
                let text = comment
                    .text
                    .runs
                    .iter()
                    .map(|r| r.t.as_str())
                    .collect::<Vec<_>>()
                    .join("");
                CommentConfig {
                    cell: comment.r#ref.clone(),
                    author,
                    text,
                }
            })
            .collect(),
        None => Vec::new(),
    }
}
