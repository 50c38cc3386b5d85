//! Undirected edge list over arena slots.

/// Node count plus a sorted, de-duplicated list of edges `(i, j)` with `i < j`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    node_count: usize,
    edges: Vec<(u32, u32)>,
}

impl Adjacency {
    /// Normalize an arbitrary edge list: endpoints ordered, self-loops
    /// dropped, sorted and de-duplicated.
    pub fn from_edges(node_count: usize, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut edges: Vec<(u32, u32)> = edges
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        debug_assert!(edges.iter().all(|&(_, b)| (b as usize) < node_count));
        Self { node_count, edges }
    }

    /// A graph with nodes and no edges.
    pub fn empty(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Edges present in both graphs. Both lists are sorted, so this is a
    /// linear merge.
    pub fn intersect(&self, other: &Adjacency) -> Adjacency {
        debug_assert_eq!(self.node_count, other.node_count);
        let (a, b) = (&self.edges, &other.edges);
        let mut edges = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    edges.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Adjacency {
            node_count: self.node_count.max(other.node_count),
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_edges() {
        let adj = Adjacency::from_edges(4, vec![(2, 1), (1, 2), (3, 3), (0, 3)]);
        assert_eq!(adj.edges(), &[(0, 3), (1, 2)]);
    }

    #[test]
    fn intersect_keeps_common_edges() {
        let a = Adjacency::from_edges(4, vec![(0, 1), (1, 2), (2, 3)]);
        let b = Adjacency::from_edges(4, vec![(1, 2), (0, 3), (2, 3)]);
        assert_eq!(a.intersect(&b).edges(), &[(1, 2), (2, 3)]);
        assert_eq!(a.intersect(&Adjacency::empty(4)).edge_count(), 0);
    }
}
