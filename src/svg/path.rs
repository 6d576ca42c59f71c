use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a node as child indices starting at the root element.
///
/// Indices count every child node (text and comments included), so a path
/// is only meaningful against the tree it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root element itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Index of this node within its parent's children.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// True if `self` is `ancestor` or lies inside it.
    pub fn starts_with(&self, ancestor: &NodePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    /// Adjusts this path after the node at `removed` was taken out of the tree.
    ///
    /// Returns `None` if this path pointed at the removed node or inside it.
    pub fn after_removal(&self, removed: &NodePath) -> Option<Self> {
        if self.starts_with(removed) {
            return None;
        }
        let Some((&removed_index, removed_parent)) = removed.0.split_last() else {
            return Some(self.clone());
        };
        let depth = removed_parent.len();
        let mut indices = self.0.clone();
        if self.0.len() > depth && self.0[..depth] == *removed_parent && self.0[depth] > removed_index {
            indices[depth] -= 1;
        }
        Some(Self(indices))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        for (position, index) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_removal_shifts_later_siblings() {
        let removed = NodePath::from_indices(vec![1]);
        assert_eq!(
            NodePath::from_indices(vec![3, 0]).after_removal(&removed),
            Some(NodePath::from_indices(vec![2, 0]))
        );
        assert_eq!(
            NodePath::from_indices(vec![0]).after_removal(&removed),
            Some(NodePath::from_indices(vec![0]))
        );
        assert_eq!(NodePath::from_indices(vec![1, 4]).after_removal(&removed), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodePath::root().to_string(), "/");
        assert_eq!(NodePath::from_indices(vec![2, 5]).to_string(), "/2/5");
    }
}
