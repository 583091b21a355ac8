//! Degree of freedom tags associating basis functions with subcells.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Associates a degree of freedom with a subcell of the reference cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DofTag {
    pub subcell_dim: usize,
    pub subcell_ordinal: usize,
    /// Index of the degree of freedom among those on the same subcell.
    pub local_index: usize,
    /// Total number of degrees of freedom on the subcell.
    pub subcell_dof_count: usize,
}

impl DofTag {
    pub fn new(subcell_dim: usize, subcell_ordinal: usize, local_index: usize, subcell_dof_count: usize) -> Self {
        Self {
            subcell_dim,
            subcell_ordinal,
            local_index,
            subcell_dof_count,
        }
    }
}

/// The tags of all degrees of freedom of a basis, indexed by ordinal, together with the inverse
/// lookup from tag to ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofTags {
    tags: Vec<DofTag>,
    ordinals: FxHashMap<(usize, usize, usize), usize>,
}

impl DofTags {
    /// Creates the tag table from the tags of ordinals `0, 1, ...`.
    ///
    /// # Panics
    ///
    /// Panics if two ordinals share a tag, or a local index is not smaller than its subcell's
    /// degree of freedom count.
    pub fn from_tags(tags: Vec<DofTag>) -> Self {
        let mut ordinals = FxHashMap::default();
        for (ordinal, tag) in tags.iter().enumerate() {
            assert!(
                tag.local_index < tag.subcell_dof_count,
                "local index {} out of bounds for subcell with {} degrees of freedom",
                tag.local_index,
                tag.subcell_dof_count
            );
            let previous = ordinals.insert((tag.subcell_dim, tag.subcell_ordinal, tag.local_index), ordinal);
            assert!(previous.is_none(), "duplicate degree of freedom tag {tag:?}");
        }
        Self { tags, ordinals }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All tags, ordered by ordinal.
    pub fn all(&self) -> &[DofTag] {
        &self.tags
    }

    /// The tag of the degree of freedom with the given ordinal.
    pub fn tag(&self, ordinal: usize) -> Option<&DofTag> {
        self.tags.get(ordinal)
    }

    /// The ordinal of the degree of freedom with the given subcell and local index.
    pub fn ordinal(&self, subcell_dim: usize, subcell_ordinal: usize, local_index: usize) -> Option<usize> {
        self.ordinals
            .get(&(subcell_dim, subcell_ordinal, local_index))
            .copied()
    }

    /// Ordinals of the degrees of freedom on the given subcell, ordered by local index.
    pub fn dofs_on_subcell(&self, subcell_dim: usize, subcell_ordinal: usize) -> Vec<usize> {
        (0..self.num_dofs_on_subcell(subcell_dim, subcell_ordinal))
            .filter_map(|local| self.ordinal(subcell_dim, subcell_ordinal, local))
            .collect()
    }

    pub fn num_dofs_on_subcell(&self, subcell_dim: usize, subcell_ordinal: usize) -> usize {
        self.ordinal(subcell_dim, subcell_ordinal, 0)
            .map(|ordinal| self.tags[ordinal].subcell_dof_count)
            .unwrap_or(0)
    }
}
