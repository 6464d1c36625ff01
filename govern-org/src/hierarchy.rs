//! Organization hierarchy index
//!
//! Organizations form a forest through `parent_id`. The index is built once
//! from the flat organization list and answers ancestry questions for the
//! authorization rules; a structural change means building a new index.

use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use uuid::Uuid;

use crate::organization::Organization;

/// Structural errors detected while building the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// An organization is its own transitive parent
    #[error("organization {org_id} is part of a parent cycle")]
    Cycle {
        /// An organization on the cycle
        org_id: Uuid,
    },

    /// The same organization ID appeared twice in the input
    #[error("organization {org_id} appears more than once")]
    DuplicateOrganization {
        /// The repeated ID
        org_id: Uuid,
    },
}

/// Result type for hierarchy construction.
pub type HierarchyResult<T> = Result<T, HierarchyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done(usize),
}

/// Immutable parent/child index over a set of organizations.
///
/// # Examples
///
/// ```
/// use govern_org::{OrgHierarchy, Organization};
///
/// let group = Organization::new("Group");
/// let unit = Organization::new("Unit").with_parent(group.id);
/// let (group_id, unit_id) = (group.id, unit.id);
///
/// let hierarchy = OrgHierarchy::build([group, unit]).unwrap();
/// assert_eq!(hierarchy.ancestors_of(unit_id), vec![unit_id, group_id]);
/// assert!(hierarchy.is_descendant(unit_id, group_id));
/// assert!(!hierarchy.is_descendant(group_id, unit_id));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgHierarchy {
    orgs: Vec<Organization>,
    index: HashMap<Uuid, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    depths: Vec<usize>,
    roots: Vec<usize>,
}

impl OrgHierarchy {
    /// An index with no organizations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from a flat organization list.
    ///
    /// Children keep the relative order of the input. A `parent_id` naming
    /// an organization that is not in the input is treated as absent, so the
    /// organization becomes a root of the visible forest.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::DuplicateOrganization`] if an ID repeats
    /// - [`HierarchyError::Cycle`] if any parent chain loops
    pub fn build(organizations: impl IntoIterator<Item = Organization>) -> HierarchyResult<Self> {
        let orgs: Vec<Organization> = organizations.into_iter().collect();

        let mut index = HashMap::with_capacity(orgs.len());
        for (i, org) in orgs.iter().enumerate() {
            if index.insert(org.id, i).is_some() {
                return Err(HierarchyError::DuplicateOrganization { org_id: org.id });
            }
        }

        let parents: Vec<Option<usize>> = orgs
            .iter()
            .map(|org| match org.parent_id {
                Some(parent_id) => match index.get(&parent_id) {
                    Some(&p) => Some(p),
                    None => {
                        tracing::debug!(
                            org_id = %org.id,
                            parent_id = %parent_id,
                            "Parent organization not visible, treating as root"
                        );
                        None
                    }
                },
                None => None,
            })
            .collect();

        let depths = Self::compute_depths(&orgs, &parents)?;

        let mut children = vec![Vec::new(); orgs.len()];
        let mut roots = Vec::new();
        for (i, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }

        Ok(Self {
            orgs,
            index,
            parents,
            children,
            depths,
            roots,
        })
    }

    /// Depth of every node, detecting cycles.
    ///
    /// Each node is finished exactly once and every walk stops at a finished
    /// node, so the whole pass is linear in the node count and a single walk
    /// never takes more steps than there are nodes.
    fn compute_depths(
        orgs: &[Organization],
        parents: &[Option<usize>],
    ) -> HierarchyResult<Vec<usize>> {
        let n = orgs.len();
        let mut visit = vec![Visit::Unvisited; n];
        let mut path = Vec::new();

        for start in 0..n {
            if visit[start] != Visit::Unvisited {
                continue;
            }

            path.clear();
            let mut current = Some(start);
            let mut base_depth = 0;

            while let Some(node) = current {
                match visit[node] {
                    Visit::Done(depth) => {
                        base_depth = depth + 1;
                        break;
                    }
                    Visit::InProgress => {
                        return Err(HierarchyError::Cycle {
                            org_id: orgs[node].id,
                        });
                    }
                    Visit::Unvisited => {
                        if path.len() >= n {
                            return Err(HierarchyError::Cycle {
                                org_id: orgs[node].id,
                            });
                        }
                        visit[node] = Visit::InProgress;
                        path.push(node);
                        current = parents[node];
                    }
                }
            }

            for (offset, node) in path.iter().rev().enumerate() {
                visit[*node] = Visit::Done(base_depth + offset);
            }
        }

        Ok(visit
            .into_iter()
            .map(|v| match v {
                Visit::Done(depth) => depth,
                Visit::Unvisited | Visit::InProgress => 0,
            })
            .collect())
    }

    /// Organization by ID.
    pub fn get(&self, org_id: Uuid) -> Option<&Organization> {
        self.index.get(&org_id).map(|&i| &self.orgs[i])
    }

    /// Whether the organization is in the index.
    pub fn contains(&self, org_id: Uuid) -> bool {
        self.index.contains_key(&org_id)
    }

    /// Visible parent of an organization.
    pub fn parent_of(&self, org_id: Uuid) -> Option<Uuid> {
        let i = *self.index.get(&org_id)?;
        self.parents[i].map(|p| self.orgs[p].id)
    }

    /// Direct children in input order.
    pub fn children_of(&self, org_id: Uuid) -> Vec<Uuid> {
        match self.index.get(&org_id) {
            Some(&i) => self.children[i].iter().map(|&c| self.orgs[c].id).collect(),
            None => Vec::new(),
        }
    }

    /// Root organizations in input order.
    pub fn roots(&self) -> Vec<Uuid> {
        self.roots.iter().map(|&r| self.orgs[r].id).collect()
    }

    /// The organization followed by each ancestor up to its root.
    ///
    /// Empty for an unknown ID.
    pub fn ancestors_of(&self, org_id: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut current = self.index.get(&org_id).copied();
        while let Some(i) = current {
            chain.push(self.orgs[i].id);
            current = self.parents[i];
        }
        chain
    }

    /// Whether `candidate` sits strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: Uuid, ancestor: Uuid) -> bool {
        candidate != ancestor && self.ancestors_of(candidate).contains(&ancestor)
    }

    /// All organizations below `org_id`, breadth first.
    pub fn descendants_of(&self, org_id: Uuid) -> Vec<Uuid> {
        let Some(&start) = self.index.get(&org_id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut queue: VecDeque<usize> = self.children[start].iter().copied().collect();
        while let Some(i) = queue.pop_front() {
            result.push(self.orgs[i].id);
            queue.extend(self.children[i].iter().copied());
        }
        result
    }

    /// Distance from the organization to its root (roots are 0).
    pub fn depth_of(&self, org_id: Uuid) -> Option<usize> {
        self.index.get(&org_id).map(|&i| self.depths[i])
    }

    /// Iterate over organizations in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.orgs.iter()
    }

    /// Number of organizations.
    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }
}
