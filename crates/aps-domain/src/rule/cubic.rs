//! Cubic truncation rule: a slicing tree over three fields
//!
//! Polygons form one or more trees. Edges are ids into the rule's polygon
//! map. Only leaves (nodes with a parent and no children) are background
//! polygons; roots and interior nodes describe how the cube is sliced.
//!
//! A node's *level* is the path of sibling orders from its root. Leaves pad
//! (or truncate) the path with zeros to the rule's `level_depth`; interior
//! nodes report it unpadded; roots report `[]`.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{DomainError, Result};
use crate::id::EntityId;
use crate::parent::Parent;
use crate::polygon::{CubicPolygon, Polygon};
use crate::rule::constraint::{Constraint, RuleStatus};
use crate::rule::overlay::{self, OverlayCapable};
use crate::rule::{fractions_sum_to_one, RuleBase};

/// Number of background fields
pub const BACKGROUND_FIELDS: usize = 3;

/// Default depth levels are padded to
pub const DEFAULT_LEVEL_DEPTH: usize = 3;

/// Slicing direction of the first level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlicingDirection {
    /// Horizontal slices
    #[default]
    Horizontal,
    /// Vertical slices
    Vertical,
}

impl SlicingDirection {
    /// Get the direction name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SlicingDirection::Horizontal => "H",
            SlicingDirection::Vertical => "V",
        }
    }

    /// Parse a direction from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "H" => Some(SlicingDirection::Horizontal),
            "V" => Some(SlicingDirection::Vertical),
            _ => None,
        }
    }
}

const CONSTRAINTS: &[Constraint<CubicRule>] = &[
    Constraint::new("background polygons are cubic", |r| {
        r.non_overlay_polygons().iter().all(|p| p.as_cubic().is_some())
    }),
    Constraint::new("tree edges are consistent and acyclic", CubicRule::has_consistent_edges),
    Constraint::new("the tree has a root", |r| !r.roots().is_empty()),
    Constraint::new("sibling orders are unique", CubicRule::has_unique_sibling_orders),
    Constraint::new("leaves lie within the level depth", |r| {
        r.leaves()
            .iter()
            .all(|leaf| r.path(*leaf).is_some_and(|path| path.len() <= r.level_depth))
    }),
    Constraint::new("every leaf references a facies", |r| {
        let leaves = r.leaf_polygons();
        !leaves.is_empty() && leaves.iter().all(|p| p.facies().is_some())
    }),
    Constraint::new("fractions per facies sum to 1", |r| fractions_sum_to_one(r.leaf_polygons())),
    Constraint::new("exactly 3 distinct background fields are assigned", |r| {
        r.base.has_distinct_background_fields(BACKGROUND_FIELDS)
    }),
];

static OVERLAY_CONSTRAINTS: [Constraint<CubicRule>; 4] = overlay::constraints::<CubicRule>();

/// Cubic rule
#[derive(Debug, Clone, PartialEq)]
pub struct CubicRule {
    /// Shared state
    pub base: RuleBase,
    /// Whether overlay polygons take part
    pub overlay: bool,
    /// Slicing direction of the first level
    pub direction: SlicingDirection,
    /// Length leaf levels are padded to
    pub level_depth: usize,
}

impl CubicRule {
    /// Create an empty rule
    pub fn new(parent: Parent, name: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(parent, name, BACKGROUND_FIELDS),
            overlay: false,
            direction: SlicingDirection::default(),
            level_depth: DEFAULT_LEVEL_DEPTH,
        }
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.base.id = id;
        self
    }

    /// Use a specific level depth
    pub fn with_level_depth(mut self, depth: usize) -> Self {
        self.level_depth = depth;
        self
    }

    /// Look up a cubic polygon
    pub fn cubic(&self, id: EntityId) -> Option<&CubicPolygon> {
        self.base.polygon(id).and_then(Polygon::as_cubic)
    }

    fn cubic_mut(&mut self, id: EntityId) -> Option<&mut CubicPolygon> {
        self.base.polygon_mut(id).and_then(Polygon::as_cubic_mut)
    }

    fn cubic_polygons(&self) -> impl Iterator<Item = &CubicPolygon> {
        self.base.polygons.values().filter_map(Polygon::as_cubic)
    }

    fn sorted(&self, mut ids: Vec<EntityId>) -> Vec<EntityId> {
        ids.sort_by_key(|id| (self.cubic(*id).map_or(i32::MAX, |p| p.common.order), *id));
        ids
    }

    /// Root nodes, by order
    pub fn roots(&self) -> Vec<EntityId> {
        let roots = self
            .cubic_polygons()
            .filter(|p| p.is_root())
            .map(|p| p.common.id)
            .collect();
        self.sorted(roots)
    }

    /// Children of a node, by order
    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.cubic(id)
            .map(|p| self.sorted(p.children.clone()))
            .unwrap_or_default()
    }

    /// Leaf nodes, by level
    pub fn leaves(&self) -> Vec<EntityId> {
        let mut leaves: Vec<(Vec<i32>, EntityId)> = self
            .cubic_polygons()
            .filter(|p| !p.is_root() && p.is_leaf())
            .map(|p| (self.path(p.common.id).unwrap_or_default(), p.common.id))
            .collect();
        leaves.sort();
        leaves.into_iter().map(|(_, id)| id).collect()
    }

    /// Leaf nodes as polygons, by level
    pub fn leaf_polygons(&self) -> Vec<&Polygon> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.base.polygon(id))
            .collect()
    }

    /// Sibling orders from the root down to `id`, unpadded
    ///
    /// `None` when the node is missing, a parent is missing, or the parent
    /// chain loops.
    pub fn path(&self, id: EntityId) -> Option<Vec<i32>> {
        let mut orders = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.cubic(id)?;
        while let Some(parent) = current.parent {
            if !seen.insert(current.common.id) {
                return None;
            }
            orders.push(current.common.order);
            current = self.cubic(parent)?;
        }
        orders.reverse();
        Some(orders)
    }

    /// Level of a node
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::{CubicPolygon, CubicRule, EntityId, Parent, PolygonCommon};
    ///
    /// let mut rule = CubicRule::new(Parent::zone(EntityId::new()), "cubic");
    /// let root = rule.add_polygon(None, CubicPolygon::new(PolygonCommon::new(0))).unwrap();
    /// let slice = rule.add_polygon(Some(root), CubicPolygon::new(PolygonCommon::new(0))).unwrap();
    /// let leaf = rule.add_polygon(Some(slice), CubicPolygon::new(PolygonCommon::new(0))).unwrap();
    ///
    /// assert_eq!(rule.level(root).unwrap(), Vec::<i32>::new());
    /// assert_eq!(rule.level(slice).unwrap(), vec![1]);
    /// assert_eq!(rule.level(leaf).unwrap(), vec![1, 1, 0]);
    /// ```
    pub fn level(&self, id: EntityId) -> Option<Vec<i32>> {
        let node = self.cubic(id)?;
        let mut level = self.path(id)?;
        if !node.is_root() && node.is_leaf() {
            level.resize(self.level_depth, 0);
        }
        Some(level)
    }

    /// Depth index of a level: the position of its first zero, or its length
    pub fn at_level(level: &[i32]) -> usize {
        level.iter().position(|o| *o == 0).unwrap_or(level.len())
    }

    /// Attach a node under `parent`, or as a new root
    ///
    /// The node's order becomes one past its current sibling count.
    ///
    /// # Errors
    /// NotFound when `parent` is not a cubic polygon of this rule
    pub fn add_polygon(&mut self, parent: Option<EntityId>, mut polygon: CubicPolygon) -> Result<EntityId> {
        let siblings = match parent {
            Some(parent_id) => self
                .cubic(parent_id)
                .map(|p| p.children.len())
                .ok_or_else(|| {
                    DomainError::NotFound(format!(
                        "cubic polygon {} in rule '{}'",
                        parent_id, self.base.name
                    ))
                })?,
            None => self.roots().len(),
        };
        let id = polygon.common.id;
        polygon.common.order = siblings as i32 + 1;
        polygon.parent = parent;
        polygon.children.clear();
        if let Some(parent_node) = parent.and_then(|p| self.cubic_mut(p)) {
            parent_node.children.push(id);
        }
        self.base.insert_polygon(polygon);
        Ok(id)
    }

    /// Remove a node and its whole subtree, then renumber siblings
    ///
    /// Returns the removed polygons.
    ///
    /// # Errors
    /// NotFound when `id` is not a cubic polygon of this rule
    pub fn remove_polygon(&mut self, id: EntityId) -> Result<Vec<Polygon>> {
        let node = self.cubic(id).ok_or_else(|| {
            DomainError::NotFound(format!("cubic polygon {} in rule '{}'", id, self.base.name))
        })?;
        let parent = node.parent;

        let mut subtree = Vec::new();
        let mut queue = VecDeque::from([id]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            subtree.push(current);
            if let Some(p) = self.cubic(current) {
                queue.extend(p.children.iter().copied());
            }
        }

        if let Some(parent_node) = parent.and_then(|p| self.cubic_mut(p)) {
            parent_node.children.retain(|child| *child != id);
        }
        let removed = subtree
            .into_iter()
            .filter_map(|node| self.base.polygons.remove(&node))
            .collect();
        self.normalize_order(|_, _| {});
        Ok(removed)
    }

    /// Renumber every sibling set to 1..N by current order
    ///
    /// Walks breadth-first from each root's children. `on_change` is called
    /// with the id and new order of every polygon whose order changes.
    pub fn normalize_order(&mut self, mut on_change: impl FnMut(EntityId, i32)) {
        let mut queue: VecDeque<EntityId> = self.roots().into();
        let mut visited = HashSet::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            for (index, child) in self.children_of(node).into_iter().enumerate() {
                let order = index as i32 + 1;
                if let Some(polygon) = self.cubic_mut(child) {
                    if polygon.common.order != order {
                        polygon.common.order = order;
                        on_change(child, order);
                    }
                }
                queue.push_back(child);
            }
        }
    }

    /// Evaluate the rule's constraints, overlay constraints included
    pub fn status(&self) -> RuleStatus {
        RuleStatus::evaluate(self, CONSTRAINTS).merge(RuleStatus::evaluate(self, &OVERLAY_CONSTRAINTS))
    }

    fn has_consistent_edges(&self) -> bool {
        self.cubic_polygons().all(|node| {
            let id = node.common.id;
            let parent_ok = node
                .parent
                .map_or(true, |p| self.cubic(p).is_some_and(|q| q.children.contains(&id)));
            let children_ok = node
                .children
                .iter()
                .all(|c| self.cubic(*c).is_some_and(|child| child.parent == Some(id)));
            parent_ok && children_ok && self.path(id).is_some()
        })
    }

    fn has_unique_sibling_orders(&self) -> bool {
        let mut seen: HashMap<Option<EntityId>, HashSet<i32>> = HashMap::new();
        self.cubic_polygons()
            .all(|p| seen.entry(p.parent).or_default().insert(p.common.order))
    }
}

impl OverlayCapable for CubicRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn overlay_enabled(&self) -> bool {
        self.overlay
    }

    fn set_overlay(&mut self, enabled: bool) {
        self.overlay = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PolygonCommon;

    fn node() -> CubicPolygon {
        CubicPolygon::new(PolygonCommon::new(0).with_facies(EntityId::new()))
    }

    /// root -> [a -> [a1, a2], b]
    fn sample() -> (CubicRule, [EntityId; 5]) {
        let mut rule = CubicRule::new(Parent::zone(EntityId::new()), "cubic");
        let root = rule.add_polygon(None, node()).unwrap();
        let a = rule.add_polygon(Some(root), node()).unwrap();
        let b = rule.add_polygon(Some(root), node()).unwrap();
        let a1 = rule.add_polygon(Some(a), node()).unwrap();
        let a2 = rule.add_polygon(Some(a), node()).unwrap();
        for slot in 0..BACKGROUND_FIELDS {
            rule.base.set_background_field(slot, Some(EntityId::new())).unwrap();
        }
        (rule, [root, a, b, a1, a2])
    }

    #[test]
    fn test_levels() {
        let (rule, [root, a, b, a1, a2]) = sample();
        assert_eq!(rule.level(root).unwrap(), Vec::<i32>::new());
        assert_eq!(rule.level(a).unwrap(), vec![1]);
        assert_eq!(rule.level(b).unwrap(), vec![2, 0, 0]);
        assert_eq!(rule.level(a1).unwrap(), vec![1, 1, 0]);
        assert_eq!(rule.level(a2).unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_at_level() {
        assert_eq!(CubicRule::at_level(&[1, 2, 0]), 2);
        assert_eq!(CubicRule::at_level(&[2, 0, 0]), 1);
        assert_eq!(CubicRule::at_level(&[1, 1, 1]), 3);
        assert_eq!(CubicRule::at_level(&[]), 0);
    }

    #[test]
    fn test_leaves_are_background() {
        let (rule, [_, _, b, a1, a2]) = sample();
        assert_eq!(rule.leaves(), vec![a1, a2, b]);
        assert_eq!(rule.leaf_polygons().len(), 3);
    }

    #[test]
    fn test_sample_is_ready() {
        let (rule, _) = sample();
        assert!(rule.status().ready, "{:?}", rule.status().unmet);
    }

    #[test]
    fn test_remove_renumbers_siblings() {
        let (mut rule, [_, a, b, a1, a2]) = sample();
        let removed = rule.remove_polygon(a).unwrap();
        assert_eq!(removed.len(), 3);
        assert!(rule.cubic(a1).is_none() && rule.cubic(a2).is_none());
        assert_eq!(rule.cubic(b).unwrap().common.order, 1);
        assert_eq!(rule.level(b).unwrap(), vec![1, 0, 0]);
    }

    #[test]
    fn test_normalize_reports_only_changes() {
        let (mut rule, [_, a, b, a1, a2]) = sample();
        rule.base.polygon_mut(a1).unwrap().common_mut().order = 7;
        rule.base.polygon_mut(b).unwrap().common_mut().order = 5;

        let mut changes = Vec::new();
        rule.normalize_order(|id, order| changes.push((id, order)));
        changes.sort();

        let mut expected = vec![(b, 2), (a2, 1), (a1, 2)];
        expected.sort();
        assert_eq!(changes, expected);
        assert_eq!(rule.cubic(a).unwrap().common.order, 1);
    }

    #[test]
    fn test_broken_edge_not_ready() {
        let (mut rule, [root, a, ..]) = sample();
        if let Some(p) = rule.base.polygon_mut(root).and_then(Polygon::as_cubic_mut) {
            p.children.retain(|c| *c != a);
        }
        assert!(rule
            .status()
            .unmet
            .contains(&"tree edges are consistent and acyclic"));
    }

    #[test]
    fn test_cycle_not_ready() {
        let (mut rule, [root, a, ..]) = sample();
        if let Some(p) = rule.base.polygon_mut(root).and_then(Polygon::as_cubic_mut) {
            p.parent = Some(a);
        }
        if let Some(p) = rule.base.polygon_mut(a).and_then(Polygon::as_cubic_mut) {
            p.children.push(root);
        }
        let status = rule.status();
        assert!(status.unmet.contains(&"tree edges are consistent and acyclic"));
        assert!(status.unmet.contains(&"the tree has a root"));
    }

    #[test]
    fn test_too_deep_leaf() {
        let (mut rule, [_, _, _, a1, _]) = sample();
        rule.level_depth = 1;
        assert!(rule.status().unmet.contains(&"leaves lie within the level depth"));
        assert_eq!(rule.level(a1).unwrap(), vec![1]);
    }

    #[test]
    fn test_unknown_parent() {
        let mut rule = CubicRule::new(Parent::zone(EntityId::new()), "cubic");
        assert!(matches!(
            rule.add_polygon(Some(EntityId::new()), node()),
            Err(DomainError::NotFound(_))
        ));
    }
}
