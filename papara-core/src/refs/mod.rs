//! Reference alignment on its tree, summarised as one profile per edge.
//!
//! The profile column for an edge is the Fitch parsimony set of the two
//! subtrees the edge separates: each side is reduced to a state set by the
//! usual Fitch rule (`a & b` if non-empty, else `a | b`), and the two sides
//! are combined by the same rule.

use crate::alphabets::{is_gap, SeqKind, StateSet};
use crate::error::{PaparaError, PaparaResult};
use crate::io::Alignment;
use crate::phylo::{Edge, PhyloTree};
use crate::queries::Queries;
use crate::runlog::RunLog;
use bit_set::BitSet;
use std::collections::HashMap;


/// How reference gaps enter the edge profiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GapPolicy {
    /// Gaps are missing data; every column is scored with the plain gap
    /// weights.
    #[default]
    Plain,
    /// Gap is an extra parsimony state. Columns whose edge set is the gap
    /// alone are consensus-gap columns, where gapping the query scores
    /// `match_cgap`.
    ConsensusGap,
}

/// Per-edge profile: one state set per kept reference column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeProfile {
    states: Vec<StateSet>,
    cgap: BitSet,
}

impl EdgeProfile {
    pub fn new(states: Vec<StateSet>, cgap: BitSet) -> Self {
        Self { states, cgap }
    }

    /// Profile that matches nothing, used to pad lane groups.
    pub fn empty(len: usize) -> Self {
        Self {
            states: vec![0; len],
            cgap: BitSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateSet] {
        &self.states
    }

    pub fn is_cgap(&self, col: usize) -> bool {
        self.cgap.contains(col)
    }

    pub fn num_cgap(&self) -> usize {
        self.cgap.len()
    }

    /// Profile as a residue string, consensus-gap columns as `-`.
    pub fn render(&self, kind: SeqKind) -> Vec<u8> {
        self.states
            .iter()
            .enumerate()
            .map(|(col, &set)| if self.is_cgap(col) { b'-' } else { kind.decode(set) })
            .collect()
    }
}

#[inline]
fn fitch(a: StateSet, b: StateSet) -> StateSet {
    let both = a & b;
    if both != 0 {
        both
    } else {
        a | b
    }
}

#[derive(Debug)]
pub struct References {
    kind: SeqKind,
    policy: GapPolicy,
    tree: PhyloTree,
    names: Vec<Box<str>>,
    rows: Vec<Vec<u8>>,
    /// Alignment row of every leaf node, indexed by node.
    node_row: Vec<Option<usize>>,
    kept_columns: Vec<usize>,
    gap_counts: Vec<u32>,
    edges: Vec<Edge>,
    profiles: Vec<EdgeProfile>,
}

impl References {
    /// Checks the tree and alignment against each other and against the
    /// query alphabet, then builds the edge profiles.
    pub fn new(
        tree: PhyloTree,
        alignment: Alignment,
        queries: &Queries,
        policy: GapPolicy,
        log: &RunLog,
    ) -> PaparaResult<Self> {
        let kind = queries.kind();
        let Alignment { names, rows } = alignment;

        let mut row_of: HashMap<&str, usize> = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if row_of.insert(name, idx).is_some() {
                return Err(PaparaError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }
        if let Some(name) = queries.names().find(|q| row_of.contains_key(q)) {
            return Err(PaparaError::DuplicateName {
                name: name.to_string(),
            });
        }

        let mut node_row = vec![None; tree.num_nodes()];
        let mut seen = BitSet::with_capacity(names.len());
        for leaf in tree.leaves() {
            let label = tree.node(leaf).label.as_deref().unwrap_or("");
            let &row = row_of.get(label).ok_or_else(|| PaparaError::MissingTaxon {
                name: label.to_string(),
            })?;
            if !seen.insert(row) {
                return Err(PaparaError::DuplicateName {
                    name: label.to_string(),
                });
            }
            node_row[leaf] = Some(row);
        }
        if let Some(row) = (0..names.len()).find(|&r| !seen.contains(r)) {
            return Err(PaparaError::UnknownTaxon {
                name: names[row].to_string(),
            });
        }

        let ncols = rows.first().map_or(0, Vec::len);
        for (name, row) in names.iter().zip(&rows) {
            if row.len() != ncols {
                return Err(PaparaError::RaggedAlignment {
                    name: name.to_string(),
                    len: row.len(),
                    expected: ncols,
                });
            }
            if let Some(pos) = row.iter().position(|&b| !kind.is_valid(b)) {
                return Err(PaparaError::AlphabetMismatch {
                    msg: format!(
                        "reference '{name}' has '{}' at column {pos}, not a {kind} residue",
                        row[pos] as char
                    ),
                });
            }
        }

        let edges = tree.edges();
        if edges.is_empty() {
            return Err(PaparaError::DegenerateTree {
                msg: format!("{} leaves give no placement edge", tree.num_leaves()),
            });
        }

        let mut refs = Self {
            kind,
            policy,
            tree,
            names,
            rows,
            node_row,
            kept_columns: (0..ncols).collect(),
            gap_counts: Vec::new(),
            edges,
            profiles: Vec::new(),
        };
        refs.build_ref_vecs();
        log.info(format_args!(
            "references: {} taxa, {} columns, {} edges, {:?} gaps",
            refs.names.len(),
            ncols,
            refs.edges.len(),
            policy
        ));
        Ok(refs)
    }

    /// Drops the columns that are a gap in every reference row, then rebuilds
    /// the profiles. Returns the number of dropped columns.
    pub fn remove_full_gaps(&mut self, log: &RunLog) -> PaparaResult<usize> {
        let ncols = self.num_columns();
        let mut keep = BitSet::with_capacity(ncols);
        for row in &self.rows {
            for (col, &b) in row.iter().enumerate() {
                if !is_gap(b) {
                    keep.insert(col);
                }
            }
        }
        let removed = ncols - keep.len();
        if keep.is_empty() {
            return Err(PaparaError::DegenerateTree {
                msg: "reference alignment has only gap columns".into(),
            });
        }
        if removed > 0 {
            for row in &mut self.rows {
                *row = keep.iter().map(|col| row[col]).collect();
            }
            self.kept_columns = keep.iter().map(|col| self.kept_columns[col]).collect();
            self.build_ref_vecs();
        }
        log.info(format_args!(
            "removed {removed} gap-only columns, {} left",
            self.num_columns()
        ));
        Ok(removed)
    }

    /// Rebuilds every edge profile and the per-column gap counts from the
    /// current rows.
    pub fn build_ref_vecs(&mut self) {
        let ncols = self.num_columns();
        let gap_state: StateSet = match self.policy {
            GapPolicy::Plain => self.kind.all_states(),
            GapPolicy::ConsensusGap => 1 << self.kind.num_states(),
        };

        self.gap_counts = (0..ncols)
            .map(|col| self.rows.iter().filter(|r| is_gap(r[col])).count() as u32)
            .collect();

        let post = self.tree.postorder();
        let pre = self.tree.preorder();
        let nnodes = self.tree.num_nodes();
        let mut down = vec![0 as StateSet; nnodes];
        let mut up = vec![0 as StateSet; nnodes];
        let mut states = vec![Vec::with_capacity(ncols); self.edges.len()];
        let mut cgaps = vec![BitSet::new(); self.edges.len()];

        for col in 0..ncols {
            for &node in &post {
                let n = self.tree.node(node);
                down[node] = match self.node_row[node] {
                    Some(row) => {
                        let b = self.rows[row][col];
                        // validated in `new`
                        self.kind.encode(b).unwrap_or(gap_state)
                    }
                    None => n
                        .children
                        .iter()
                        .map(|&c| down[c])
                        .reduce(fitch)
                        .unwrap_or(0),
                };
            }

            // `up[c]`: set of everything outside the subtree of `c`
            for &node in &pre {
                let n = self.tree.node(node);
                for &child in &n.children {
                    let outside = n.parent.map(|_| up[node]);
                    up[child] = outside
                        .into_iter()
                        .chain(
                            n.children
                                .iter()
                                .filter(|&&s| s != child)
                                .map(|&s| down[s]),
                        )
                        .reduce(fitch)
                        .unwrap_or(0);
                }
            }

            for (e, edge) in self.edges.iter().enumerate() {
                let set = fitch(down[edge.child], up[edge.child]);
                let residues = set & self.kind.all_states();
                if self.policy == GapPolicy::ConsensusGap && set == gap_state {
                    cgaps[e].insert(col);
                }
                states[e].push(residues);
            }
        }

        self.profiles = states
            .into_iter()
            .zip(cgaps)
            .map(|(s, c)| EdgeProfile::new(s, c))
            .collect();
    }

    pub fn kind(&self) -> SeqKind {
        self.kind
    }

    pub fn policy(&self) -> GapPolicy {
        self.policy
    }

    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_columns(&self) -> usize {
        self.kept_columns.len()
    }

    pub fn edge_profile(&self, edge: usize) -> &EdgeProfile {
        &self.profiles[edge]
    }

    pub fn edge_endpoints(&self, edge: usize) -> Edge {
        self.edges[edge]
    }

    /// Label of an edge, named after the node below it.
    pub fn edge_name(&self, edge: usize) -> String {
        self.tree.node_name(self.edges[edge].child)
    }

    pub fn names(&self) -> &[Box<str>] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn max_name_length(&self) -> usize {
        self.names.iter().map(|n| n.len()).max().unwrap_or(0)
    }

    /// Original alignment index of every kept column.
    pub fn kept_columns(&self) -> &[usize] {
        &self.kept_columns
    }

    pub fn column_gap_count(&self, col: usize) -> u32 {
        self.gap_counts[col]
    }
}
