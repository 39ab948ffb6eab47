//! Assembling reply forests from parent pointers.
//!
//! Comments are stored flat with a `parent_id`. Trees exist only on read: the
//! rows are indexed into an arena and nodes are built from the roots down.

use std::collections::HashMap;

use serde::Serialize;

use crate::entity::comment;

/// A comment with its direct and indirect replies
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: comment::Model,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, itself included
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::depth).max().unwrap_or(0)
    }
}

/// Builds the forest for a set of comments.
///
/// Siblings keep insertion (id) order. A comment whose parent is not in the
/// set becomes a root.
pub fn build_forest(mut comments: Vec<comment::Model>) -> Vec<CommentNode> {
    comments.sort_by_key(|c| c.id);

    let index: HashMap<i32, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        match c.parent_id.and_then(|p| index.get(&p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<comment::Model>> = comments.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|root| assemble(root, &mut slots, &children))
        .collect()
}

fn assemble(
    at: usize,
    slots: &mut [Option<comment::Model>],
    children: &[Vec<usize>],
) -> Option<CommentNode> {
    let comment = slots[at].take()?;
    let replies = children[at]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(CommentNode { comment, replies })
}
