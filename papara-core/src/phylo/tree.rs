use crate::error::{PaparaError, PaparaResult};

#[derive(Debug, Clone)]
pub struct PhyloNode {
    pub label: Option<Box<str>>,
    pub branch_length: Option<f64>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl PhyloNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A placement edge: the branch between `child` and its `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub child: usize,
    pub parent: usize,
}

#[derive(Debug, Clone)]
pub struct PhyloTree {
    nodes: Vec<PhyloNode>,
    root: usize,
}

impl PhyloTree {
    pub(crate) fn from_nodes(nodes: Vec<PhyloNode>, root: usize) -> PaparaResult<Self> {
        if nodes.is_empty() || root >= nodes.len() {
            return Err(PaparaError::DegenerateTree {
                msg: "tree has no nodes".into(),
            });
        }
        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, idx: usize) -> &PhyloNode {
        &self.nodes[idx]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn leaves(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn leaf_labels(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.label.as_deref().unwrap_or("").to_string())
            .collect()
    }

    pub fn nodes(&self) -> &[PhyloNode] {
        &self.nodes
    }

    /// Children before parents.
    pub fn postorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                order.push(idx);
                continue;
            }
            stack.push((idx, true));
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    /// Parents before children.
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Branches a query can be placed on, in preorder of their child node.
    ///
    /// The tree is treated as unrooted: with a bifurcating root the two root
    /// branches form a single edge, reported once through the first child.
    pub fn edges(&self) -> Vec<Edge> {
        let root = self.node(self.root);
        let merged = if root.children.len() == 2 {
            Some(root.children[1])
        } else {
            None
        };
        self.preorder()
            .into_iter()
            .filter(|&idx| idx != self.root && Some(idx) != merged)
            .filter_map(|child| {
                self.nodes[child]
                    .parent
                    .map(|parent| Edge { child, parent })
            })
            .collect()
    }

    /// Display name of the subtree below `idx`: the leaf label, or the
    /// node index for unlabelled internal nodes.
    pub fn node_name(&self, idx: usize) -> String {
        match self.nodes[idx].label.as_deref() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("node{idx}"),
        }
    }
}
