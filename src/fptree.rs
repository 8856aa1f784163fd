//! Arena-backed frequent-pattern tree.
//!
//! Items are addressed by rank (0 = most frequent item of the database). A
//! path inserted into the tree must be sorted by ascending rank, so frequent
//! items sit near the root and are shared by the most transactions.

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct FpNode {
    rank: u32,
    count: u64,
    parent: usize,
    children: Vec<usize>,
}

/// Prefix tree plus a header index from each rank to the nodes holding it
#[derive(Debug, Clone)]
pub(crate) struct FpTree {
    nodes: Vec<FpNode>,
    header: Vec<Vec<usize>>,
    rank_counts: Vec<u64>,
    /// Ranks with at least one node, in order of first insertion
    present: Vec<u32>,
}

/// A prefix path leading to some node, with that node's count
pub(crate) type PrefixPath = (Vec<u32>, u64);

impl FpTree {
    /// Empty tree able to hold ranks `0..rank_count`
    pub(crate) fn new(rank_count: usize) -> Self {
        let root = FpNode {
            rank: u32::MAX,
            count: 0,
            parent: ROOT,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            header: vec![Vec::new(); rank_count],
            rank_counts: vec![0; rank_count],
            present: Vec::new(),
        }
    }

    /// Build the conditional tree of a pattern base, keeping only ranks whose
    /// total count in the base reaches `min_count`.
    ///
    /// The tree only spans the ranks that occur in `paths`, so deep recursion
    /// levels stay small however many items the database holds.
    pub(crate) fn from_prefix_paths(paths: &[PrefixPath], min_count: u64) -> Self {
        // paths are rank-sorted, so the last rank of each is its highest
        let rank_count = paths
            .iter()
            .filter_map(|(path, _)| path.last())
            .max()
            .map_or(0, |&rank| rank as usize + 1);

        let mut counts = vec![0u64; rank_count];
        for (path, count) in paths {
            for &rank in path {
                counts[rank as usize] += count;
            }
        }

        let mut tree = Self::new(rank_count);
        let mut filtered = Vec::new();
        for (path, count) in paths {
            filtered.clear();
            filtered.extend(path.iter().copied().filter(|&r| counts[r as usize] >= min_count));
            if !filtered.is_empty() {
                tree.insert(&filtered, *count);
            }
        }
        tree
    }

    /// Insert a rank-sorted path, sharing existing prefixes
    pub(crate) fn insert(&mut self, path: &[u32], count: u64) {
        debug_assert!(path.windows(2).all(|w| w[0] < w[1]), "path must be rank-sorted");

        let mut current = ROOT;
        for &rank in path {
            let existing = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].rank == rank);

            let next = match existing {
                Some(child) => child,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(FpNode {
                        rank,
                        count: 0,
                        parent: current,
                        children: Vec::new(),
                    });
                    self.nodes[current].children.push(id);
                    let slot = &mut self.header[rank as usize];
                    if slot.is_empty() {
                        self.present.push(rank);
                    }
                    slot.push(id);
                    id
                }
            };

            self.nodes[next].count += count;
            self.rank_counts[rank as usize] += count;
            current = next;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of nodes excluding the root
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    #[cfg(test)]
    pub(crate) fn rank_count(&self) -> usize {
        self.rank_counts.len()
    }

    /// Total count of `rank` across all its nodes
    pub(crate) fn support(&self, rank: u32) -> u64 {
        self.rank_counts[rank as usize]
    }

    /// Ranks present in the tree, least frequent (highest rank) first
    pub(crate) fn ranks_bottom_up(&self) -> Vec<u32> {
        let mut ranks = self.present.clone();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        ranks
    }

    /// The tree's nodes as `(rank, count)` from the root down, if the tree is a
    /// single chain
    pub(crate) fn single_path(&self) -> Option<Vec<(u32, u64)>> {
        let mut path = Vec::new();
        let mut current = ROOT;
        loop {
            match self.nodes[current].children.as_slice() {
                [] => return Some(path),
                [only] => {
                    current = *only;
                    path.push((self.nodes[current].rank, self.nodes[current].count));
                }
                _ => return None,
            }
        }
    }

    /// Conditional pattern base of `rank`: for every node holding it, the ranks
    /// on the way up to the root (root side first) and the node's count
    pub(crate) fn prefix_paths(&self, rank: u32) -> Vec<PrefixPath> {
        self.header[rank as usize]
            .iter()
            .filter_map(|&node_id| {
                let node = &self.nodes[node_id];
                let mut path = Vec::new();
                let mut current = node.parent;
                while current != ROOT {
                    path.push(self.nodes[current].rank);
                    current = self.nodes[current].parent;
                }
                if path.is_empty() {
                    return None;
                }
                path.reverse();
                Some((path, node.count))
            })
            .collect()
    }
}
