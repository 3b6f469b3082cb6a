use std::collections::HashSet;

use crate::model::*;

/// Element ids the page scaffold owns; node ids never take them.
pub const RESERVED_IDS: [&str; 4] = ["title", "description", "tooltip", "legend"];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("record {path} has a non-numeric value {raw}")]
    InvalidValue { path: String, raw: String },
    #[error("record {path} has a negative or non-finite value {value}")]
    NegativeValue { path: String, value: f64 },
    #[error("record {path} has no value")]
    MissingValue { path: String },
}

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub node: NodeId,
    pub parent: Option<NodeId>,
    pub depth: u32,
    /// Unique, DOM-safe identifier derived from the full name path.
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// Own value for records, `None` for groups (empty ones included).
    pub value: Option<f64>,
    /// Sum of all descendant leaf values (own value for leaves).
    pub weight: f64,
    pub children: Vec<NodeId>,
}

impl HierarchyNode {
    /// Records are the leaves; a group without entries is not one.
    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    pub fn record(&self) -> Option<SalesRecord> {
        let value = self.value?;
        Some(SalesRecord {
            name: self.name.clone(),
            category: self.category.clone().unwrap_or_default(),
            value,
        })
    }
}

/// Weighted tree built from a [`Dataset`]. Nodes live in pre-order in a flat
/// arena, so `nodes[0]` is the root and every parent precedes its children.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub root: NodeId,
    pub nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn build(data: &Dataset) -> Result<Self, BuildError> {
        let mut nodes = Vec::with_capacity(128);
        let mut taken: HashSet<String> = RESERVED_IDS.iter().map(|s| s.to_string()).collect();
        let mut path = Vec::new();
        let root = insert(data, None, 0, &mut path, &mut nodes, &mut taken)?;

        // Pre-order arena: walking backwards visits children before parents.
        for i in (0..nodes.len()).rev() {
            if nodes[i].children.is_empty() {
                continue;
            }
            let sum: f64 = nodes[i]
                .children
                .iter()
                .map(|c| nodes[c.index()].weight)
                .sum();
            nodes[i].weight = sum;
        }

        let tree = Hierarchy { root, nodes };
        tracing::debug!(
            nodes = tree.nodes.len(),
            leaves = tree.leaves().count(),
            total = tree.total(),
            "hierarchy built"
        );
        Ok(tree)
    }

    pub fn get(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.index()]
    }

    pub fn root_node(&self) -> &HierarchyNode {
        self.get(self.root)
    }

    pub fn total(&self) -> f64 {
        self.root_node().weight
    }

    /// Leaves in document order.
    pub fn leaves(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Direct children of the root (the platform groups).
    pub fn top_level(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.root_node().children.iter().map(|c| self.get(*c))
    }

    pub fn find(&self, id: &str) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Names from the root down to `id`.
    pub fn path_of(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.get(n);
            out.push(node.name.as_str());
            cur = node.parent;
        }
        out.reverse();
        out
    }

    /// The top-level group a node belongs to, if it is below the root.
    pub fn group_of(&self, id: NodeId) -> Option<&HierarchyNode> {
        let mut cur = self.get(id);
        while let Some(parent) = cur.parent {
            if parent == self.root {
                return Some(cur);
            }
            cur = self.get(parent);
        }
        None
    }
}

fn insert(
    data: &DatasetNode,
    parent: Option<NodeId>,
    depth: u32,
    path: &mut Vec<String>,
    nodes: &mut Vec<HierarchyNode>,
    taken: &mut HashSet<String>,
) -> Result<NodeId, BuildError> {
    path.push(data.name.clone());
    let id = NodeId(nodes.len() as u32);
    let dom_id = unique_id(path, taken);

    let value = if data.is_record() {
        Some(leaf_value(data, path)?)
    } else {
        None
    };
    nodes.push(HierarchyNode {
        node: id,
        parent,
        depth,
        id: dom_id,
        name: data.name.clone(),
        category: data.category.clone(),
        value,
        weight: value.unwrap_or(0.0),
        children: Vec::with_capacity(data.children.len()),
    });

    for child in &data.children {
        let cid = insert(child, Some(id), depth + 1, path, nodes, taken)?;
        nodes[id.index()].children.push(cid);
    }
    path.pop();
    Ok(id)
}

fn leaf_value(data: &DatasetNode, path: &[String]) -> Result<f64, BuildError> {
    let raw = data.value.as_ref().ok_or_else(|| BuildError::MissingValue {
        path: path.join("/"),
    })?;
    let value = raw.parse().ok_or_else(|| BuildError::InvalidValue {
        path: path.join("/"),
        raw: raw.to_string(),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(BuildError::NegativeValue {
            path: path.join("/"),
            value,
        });
    }
    Ok(value)
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dash = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn unique_id(path: &[String], taken: &mut HashSet<String>) -> String {
    let mut base = path
        .iter()
        .map(|p| slug(p))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("--");
    if base.is_empty() {
        base.push_str("node");
    }
    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
