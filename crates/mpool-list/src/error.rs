//! List-specific error types.

use std::error::Error;
use std::fmt;

use crate::id::{ListId, NodeId};

/// Errors that can occur during list operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListError {
    /// The slot table could not grow to hold a new node.
    AllocationFailure,
    /// The handle was issued by a different list.
    ForeignNode {
        /// The handle that was passed in.
        node: NodeId,
        /// The list the operation was called on.
        list: ListId,
    },
    /// The handle refers to a node that has already been removed.
    StaleNode {
        /// The handle that was passed in.
        node: NodeId,
    },
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure => write!(f, "list node allocation failed"),
            Self::ForeignNode { node, list } => {
                write!(f, "node {node} does not belong to list {list}")
            }
            Self::StaleNode { node } => write!(f, "node {node} has been removed"),
        }
    }
}

impl Error for ListError {}
