//! Dense integer indexing of node labels.

use std::collections::HashMap;

use crate::error::ValidationError;

/// Bijection between node labels and matrix indices `0..n`.
///
/// Indices follow the order of the input list and stay fixed for the lifetime
/// of the index.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl NodeIndex {
    /// Index an ordered list of distinct labels.
    ///
    /// Returns [`ValidationError::DuplicateNode`] if a label repeats.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self, ValidationError> {
        let mut positions = HashMap::with_capacity(labels.len());
        let mut owned = Vec::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            let label = label.as_ref();
            if positions.insert(label.to_string(), i).is_some() {
                return Err(ValidationError::DuplicateNode(label.to_string()));
            }
            owned.push(label.to_string());
        }
        Ok(Self {
            labels: owned,
            positions,
        })
    }

    /// Number of indexed nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of `label`, if it is a node.
    #[inline]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Label at `index`, if in range.
    #[inline]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Index of `label`, or an [`ValidationError::UnknownNode`] naming `role`.
    pub fn resolve(&self, label: &str, role: &str) -> Result<usize, ValidationError> {
        self.index_of(label).ok_or_else(|| ValidationError::UnknownNode {
            role: role.to_string(),
            label: label.to_string(),
        })
    }
}
