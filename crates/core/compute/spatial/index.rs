//! Hierarchical grid-merge cluster index.
//!
//! Built once per request over the full normalized point set. Points are
//! projected to unit Web-Mercator space and merged bottom-up: level
//! `max_zoom + 1` holds every point as-is, and each level `z` below it is
//! produced from level `z + 1` by bucketing nodes into a grid whose cell
//! side equals the cluster radius at `z`, then merging every node with its
//! unmerged neighbours inside that radius.
//!
//! Storage is arena-style: nodes, child lists and per-level memberships are
//! flat vectors indexed by [`NodeId`]. Ids `0..points.len()` are leaves and
//! address `points` directly; higher ids are clusters in creation order.
//!
//! # Example
//!
//! ```rust
//! use geocluster::compute::spatial::{IndexOptions, SpatialClusterIndex};
//! use geocluster_types::bbox::BoundingBox;
//! use geocluster_types::point::Point;
//!
//! let points = vec![
//!     Point::new("gps:1", "gps", 34.0500, -118.2400),
//!     Point::new("gps:2", "gps", 34.0501, -118.2401),
//!     Point::new("gps:3", "gps", 37.7700, -122.4200),
//! ];
//! let index = SpatialClusterIndex::build(points, IndexOptions::default())?;
//! let entries = index.clusters_in(&BoundingBox::world(), 10.0);
//! assert_eq!(entries.len(), 2);
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

use super::projection::{lat_y, lng_x, x_lng, y_lat};
use crate::config::EngineConfig;
use crate::error::{ClusterError, Result};
use geocluster_types::bbox::BoundingBox;
use geocluster_types::point::Point;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Arena index of a node.
pub type NodeId = u32;

const NO_PARENT: NodeId = NodeId::MAX;

/// Highest level the index accepts; `2^z` must stay exact in `f64`.
const MAX_LEVEL: u8 = 30;

/// Build parameters for [`SpatialClusterIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    /// Cluster radius in pixels, relative to `extent`.
    pub radius: f64,
    /// Tile extent in pixels.
    pub extent: f64,
    pub min_zoom: u8,
    /// Most detailed level at which clusters form.
    pub max_zoom: u8,
    /// Minimum listings per cluster.
    pub min_points: u32,
}

impl IndexOptions {
    /// Options for one request: the radius comes from the zoom tier, the
    /// rest from engine configuration.
    pub fn from_config(config: &EngineConfig, radius: f64) -> Self {
        Self {
            radius,
            extent: config.extent,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            min_points: config.min_points,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ClusterError::IndexBuild(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ClusterError::IndexBuild(format!(
                "extent must be positive, got {}",
                self.extent
            )));
        }
        if self.min_zoom > self.max_zoom || self.max_zoom > MAX_LEVEL {
            return Err(ClusterError::IndexBuild(format!(
                "invalid zoom range {}..={}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_points < 2 {
            return Err(ClusterError::IndexBuild(
                "a cluster needs at least two points".to_string(),
            ));
        }
        Ok(())
    }

    /// Radius in projected unit space at `zoom`.
    fn radius_at(&self, zoom: u8) -> f64 {
        self.radius / (self.extent * 2f64.powi(i32::from(zoom)))
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default(), 40.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    x: f64,
    y: f64,
    count: u32,
    /// Level at which the node was created; `max_zoom + 1` for leaves.
    origin_zoom: u8,
    parent: NodeId,
    first_child: u32,
    child_count: u32,
}

/// A merged node as seen from outside the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterNode {
    pub id: NodeId,
    pub lat: f64,
    pub lng: f64,
    /// Exact number of leaves under this node; always at least 2.
    pub point_count: u32,
    pub origin_zoom: u8,
}

/// One result of a viewport query: a cluster, or a point that stands alone
/// at the queried zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexEntry<'a> {
    Cluster(ClusterNode),
    Leaf(&'a Point),
}

impl IndexEntry<'_> {
    pub fn point_count(&self) -> u32 {
        match self {
            Self::Cluster(node) => node.point_count,
            Self::Leaf(_) => 1,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }
}

/// Multi-resolution cluster structure over one request's points.
#[derive(Debug, Clone)]
pub struct SpatialClusterIndex {
    options: IndexOptions,
    points: Vec<Point>,
    nodes: Vec<Node>,
    child_ids: Vec<NodeId>,
    /// Node ids present at each level, indexed by zoom.
    levels: Vec<Vec<NodeId>>,
}

impl SpatialClusterIndex {
    /// Build the index over `points`, taking ownership of them.
    pub fn build(points: Vec<Point>, options: IndexOptions) -> Result<Self> {
        options.validate()?;
        if points.len() >= NO_PARENT as usize {
            return Err(ClusterError::IndexBuild(format!(
                "{} points exceed index capacity",
                points.len()
            )));
        }

        let leaf_zoom = options.max_zoom + 1;
        let mut nodes: Vec<Node> = Vec::with_capacity(points.len() * 2);
        nodes.extend(points.iter().map(|point| Node {
            x: lng_x(point.lng),
            y: lat_y(point.lat),
            count: 1,
            origin_zoom: leaf_zoom,
            parent: NO_PARENT,
            first_child: 0,
            child_count: 0,
        }));

        let mut child_ids = Vec::with_capacity(points.len());
        let mut levels = vec![Vec::new(); usize::from(leaf_zoom) + 1];
        levels[usize::from(leaf_zoom)] = (0..points.len() as NodeId).collect();

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let merged = merge_level(
                &mut nodes,
                &mut child_ids,
                &levels[usize::from(zoom) + 1],
                zoom,
                &options,
            );
            levels[usize::from(zoom)] = merged;
        }

        log::debug!(
            "Built cluster index: {} points, {} nodes, {} at level {}",
            points.len(),
            nodes.len(),
            levels[usize::from(options.min_zoom)].len(),
            options.min_zoom
        );

        Ok(Self {
            options,
            points,
            nodes,
            child_ids,
            levels,
        })
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Number of leaves (input points).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Level answering queries at `zoom`.
    fn level_for(&self, zoom: f64) -> usize {
        let max_level = f64::from(self.options.max_zoom + 1);
        let level = if zoom.is_finite() {
            zoom.floor()
        } else {
            max_level
        };
        level.clamp(f64::from(self.options.min_zoom), max_level) as usize
    }

    #[inline]
    fn is_leaf(&self, id: NodeId) -> bool {
        (id as usize) < self.points.len()
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id as usize)
            .ok_or(ClusterError::UnknownCluster(id))
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        let node = &self.nodes[id as usize];
        let start = node.first_child as usize;
        &self.child_ids[start..start + node.child_count as usize]
    }

    fn entry(&self, id: NodeId) -> IndexEntry<'_> {
        if self.is_leaf(id) {
            return IndexEntry::Leaf(&self.points[id as usize]);
        }
        let node = &self.nodes[id as usize];
        IndexEntry::Cluster(ClusterNode {
            id,
            lat: y_lat(node.y),
            lng: x_lng(node.x),
            point_count: node.count,
            origin_zoom: node.origin_zoom,
        })
    }

    /// Every node at `zoom` whose position lies inside `bbox`, in level order.
    ///
    /// A box crossing the antimeridian is matched against both of its
    /// longitude spans.
    pub fn clusters_in(&self, bbox: &BoundingBox, zoom: f64) -> Vec<IndexEntry<'_>> {
        let min_y = lat_y(bbox.north);
        let max_y = lat_y(bbox.south);
        let spans: SmallVec<[(f64, f64); 2]> = bbox
            .lng_spans()
            .iter()
            .map(|&(west, east)| (lng_x(west), lng_x(east)))
            .collect();

        self.levels[self.level_for(zoom)]
            .iter()
            .copied()
            .filter(|&id| {
                let node = &self.nodes[id as usize];
                node.y >= min_y
                    && node.y <= max_y
                    && spans
                        .iter()
                        .any(|&(min_x, max_x)| node.x >= min_x && node.x <= max_x)
            })
            .map(|id| self.entry(id))
            .collect()
    }

    /// Look up a cluster by id.
    pub fn cluster(&self, id: NodeId) -> Result<ClusterNode> {
        self.node(id)?;
        match self.entry(id) {
            IndexEntry::Cluster(node) => Ok(node),
            IndexEntry::Leaf(_) => Err(ClusterError::UnknownCluster(id)),
        }
    }

    /// Nodes merged into `id` when it was formed.
    pub fn children_of(&self, id: NodeId) -> Result<Vec<IndexEntry<'_>>> {
        self.node(id)?;
        Ok(self
            .children(id)
            .iter()
            .map(|&child| self.entry(child))
            .collect())
    }

    /// Up to `limit` leaves under `id`, depth-first, after skipping `offset`.
    ///
    /// Cost is bounded by `limit` and the tree depth, not by cluster size:
    /// whole sub-clusters inside the skipped range are stepped over by count.
    pub fn leaves_of(&self, id: NodeId, limit: usize, offset: usize) -> Result<Vec<&Point>> {
        let node = self.node(id)?;
        let mut leaves = Vec::with_capacity(limit.min(node.count as usize));
        if limit == 0 {
            return Ok(leaves);
        }
        if self.is_leaf(id) {
            if offset == 0 {
                leaves.push(&self.points[id as usize]);
            }
            return Ok(leaves);
        }

        let mut skipped = 0;
        self.append_leaves(id, limit, offset, &mut skipped, &mut leaves);
        Ok(leaves)
    }

    fn append_leaves<'a>(
        &'a self,
        id: NodeId,
        limit: usize,
        offset: usize,
        skipped: &mut usize,
        leaves: &mut Vec<&'a Point>,
    ) {
        for &child in self.children(id) {
            if leaves.len() >= limit {
                return;
            }
            if self.is_leaf(child) {
                if *skipped < offset {
                    *skipped += 1;
                } else {
                    leaves.push(&self.points[child as usize]);
                }
                continue;
            }

            let count = self.nodes[child as usize].count as usize;
            if *skipped + count <= offset {
                *skipped += count;
            } else {
                self.append_leaves(child, limit, offset, skipped, leaves);
            }
        }
    }

    /// Zoom at which `id` splits into its children.
    ///
    /// A cluster formed at level `z` is shown as one unit at every level up
    /// to `z`, so it expands at `z + 1`. That is always above any zoom at
    /// which the cluster can be returned. Leaves report `max_zoom + 1`.
    pub fn expansion_zoom(&self, id: NodeId) -> Result<u32> {
        let node = self.node(id)?;
        if self.is_leaf(id) {
            return Ok(u32::from(self.options.max_zoom) + 1);
        }
        debug_assert!(node.child_count >= 2);
        Ok(u32::from(node.origin_zoom) + 1)
    }

    /// Cluster that absorbed `id` on the next level down, if any.
    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        let node = self.node(id)?;
        Ok((node.parent != NO_PARENT).then_some(node.parent))
    }
}

/// Grid cell of a projected position for cells of side `r`.
#[inline]
fn cell_of(x: f64, y: f64, r: f64) -> (i64, i64) {
    ((x / r).floor() as i64, (y / r).floor() as i64)
}

/// Produce level `zoom` from the nodes of level `zoom + 1`.
///
/// Nodes are visited in level order, so the first-seen node anchors its
/// merge. Neighbours join in ascending id order, which is input order for
/// leaves and creation order for clusters.
fn merge_level(
    nodes: &mut Vec<Node>,
    child_ids: &mut Vec<NodeId>,
    previous: &[NodeId],
    zoom: u8,
    options: &IndexOptions,
) -> Vec<NodeId> {
    let r = options.radius_at(zoom);
    let r2 = r * r;

    let mut grid: FxHashMap<(i64, i64), SmallVec<[NodeId; 4]>> = FxHashMap::default();
    for &id in previous {
        let node = &nodes[id as usize];
        grid.entry(cell_of(node.x, node.y, r)).or_default().push(id);
    }

    let mut visited = vec![false; nodes.len()];
    let mut level = Vec::with_capacity(previous.len());
    let mut neighbors: Vec<NodeId> = Vec::new();

    for &id in previous {
        if visited[id as usize] {
            continue;
        }
        visited[id as usize] = true;

        let (x, y, count) = {
            let node = &nodes[id as usize];
            (node.x, node.y, node.count)
        };
        let (cx, cy) = cell_of(x, y, r);

        neighbors.clear();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &other in bucket {
                    if visited[other as usize] {
                        continue;
                    }
                    let node = &nodes[other as usize];
                    let (ddx, ddy) = (node.x - x, node.y - y);
                    if ddx * ddx + ddy * ddy <= r2 {
                        neighbors.push(other);
                    }
                }
            }
        }
        neighbors.sort_unstable();

        let total = count
            + neighbors
                .iter()
                .map(|&n| nodes[n as usize].count)
                .sum::<u32>();

        if neighbors.is_empty() || total < options.min_points {
            // Too few to merge: everything stays as-is on this level.
            level.push(id);
            for &other in &neighbors {
                visited[other as usize] = true;
                level.push(other);
            }
            continue;
        }

        let cluster_id = nodes.len() as NodeId;
        let mut wx = x * f64::from(count);
        let mut wy = y * f64::from(count);
        for &other in &neighbors {
            visited[other as usize] = true;
            let node = &mut nodes[other as usize];
            wx += node.x * f64::from(node.count);
            wy += node.y * f64::from(node.count);
            node.parent = cluster_id;
        }
        nodes[id as usize].parent = cluster_id;

        let first_child = child_ids.len() as u32;
        child_ids.push(id);
        child_ids.extend_from_slice(&neighbors);

        nodes.push(Node {
            x: wx / f64::from(total),
            y: wy / f64::from(total),
            count: total,
            origin_zoom: zoom,
            parent: NO_PARENT,
            first_child,
            child_count: neighbors.len() as u32 + 1,
        });
        level.push(cluster_id);
    }

    level
}
