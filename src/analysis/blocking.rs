//! Blocking relations between vines and deadlock detection
//!
//! Vine A blocks vine B when A covers the cell B's head would enter next. A cycle
//! in this relation is a permanent deadlock: no vine on the cycle can ever move.

use crate::spatial::geometry::Point;
use crate::spatial::level::Level;
use crate::spatial::vine::Vine;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Directed "blocks" graph over the vines of a level
#[derive(Clone, Debug)]
pub struct BlockingGraph {
    ids: Vec<String>,
    /// `blocks[a]` lists the vines whose next head cell `a` covers, ascending
    blocks: Vec<Vec<usize>>,
    /// `blocker[b]` is the vine covering the next head cell of `b`
    blocker: Vec<Option<usize>>,
}

/// DFS colouring used by the cycle search
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl BlockingGraph {
    /// Build the graph for a vine list
    pub fn build(vines: &[Vine]) -> Self {
        let mut owners: HashMap<Point, usize> = HashMap::new();
        for (index, vine) in vines.iter().enumerate() {
            for &cell in &vine.ordered_path {
                owners.insert(cell, index);
            }
        }

        let mut blocks = vec![Vec::new(); vines.len()];
        let mut blocker = vec![None; vines.len()];
        for (blocked, vine) in vines.iter().enumerate() {
            let Some(target) = vine.target() else {
                continue;
            };
            if let Some(&owner) = owners.get(&target) {
                if owner != blocked {
                    if let Some(list) = blocks.get_mut(owner) {
                        list.push(blocked);
                    }
                    if let Some(slot) = blocker.get_mut(blocked) {
                        *slot = Some(owner);
                    }
                }
            }
        }

        Self {
            ids: vines.iter().map(|v| v.id.clone()).collect(),
            blocks,
            blocker,
        }
    }

    /// Number of vines in the graph
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check for an empty graph
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Position of a vine in the graph
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    /// Identifier at a graph position
    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Check whether `blocker` covers the next head cell of `blocked`
    pub fn blocks(&self, blocker: &str, blocked: &str) -> bool {
        match (self.index_of(blocker), self.index_of(blocked)) {
            (Some(a), Some(b)) => self.blocker.get(b).copied().flatten() == Some(a),
            _ => false,
        }
    }

    /// Vines blocked by `id`
    pub fn blocked_by(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .and_then(|index| self.blocks.get(index))
            .map(|list| list.iter().filter_map(|&b| self.id(b)).collect())
            .unwrap_or_default()
    }

    /// Vine covering the next head cell of `id`
    pub fn blocker_of(&self, id: &str) -> Option<&str> {
        self.index_of(id)
            .and_then(|index| self.blocker.get(index).copied().flatten())
            .and_then(|b| self.id(b))
    }

    /// Number of vines `index` blocks
    pub fn out_degree(&self, index: usize) -> usize {
        self.blocks.get(index).map_or(0, Vec::len)
    }

    /// Adjacency listing keyed by blocker id, for reports
    pub fn edges(&self) -> BTreeMap<String, Vec<String>> {
        self.ids
            .iter()
            .enumerate()
            .filter(|&(index, _)| self.out_degree(index) > 0)
            .map(|(index, id)| {
                let blocked = self
                    .blocks
                    .get(index)
                    .map(|list| {
                        list.iter()
                            .filter_map(|&b| self.id(b).map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                (id.clone(), blocked)
            })
            .collect()
    }

    /// Check whether any vine transitively blocks itself
    pub fn has_cycle(&self) -> bool {
        !self.search_cycles(true).is_empty()
    }

    /// Every blocking cycle as an ordered chain of vine identifiers
    pub fn cycles(&self) -> Vec<Vec<String>> {
        self.search_cycles(false)
            .into_iter()
            .map(|chain| {
                chain
                    .into_iter()
                    .filter_map(|index| self.id(index).map(str::to_string))
                    .collect()
            })
            .collect()
    }

    /// Depth-first search with an explicit stack and an on-stack marker
    fn search_cycles(&self, stop_at_first: bool) -> Vec<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.len()];
        let mut chains = Vec::new();

        for start in 0..self.len() {
            if marks.get(start) != Some(&Mark::Unvisited) {
                continue;
            }
            // (node, next edge to follow)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            if let Some(mark) = marks.get_mut(start) {
                *mark = Mark::OnStack;
            }

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let next = self.blocks.get(node).and_then(|list| list.get(top.1)).copied();
                top.1 += 1;
                match next {
                    Some(next) => match marks.get(next).copied() {
                        Some(Mark::Unvisited) => {
                            if let Some(mark) = marks.get_mut(next) {
                                *mark = Mark::OnStack;
                            }
                            stack.push((next, 0));
                        }
                        Some(Mark::OnStack) => {
                            let from = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                            let chain: Vec<usize> = stack
                                .get(from..)
                                .unwrap_or(&[])
                                .iter()
                                .map(|&(n, _)| n)
                                .collect();
                            chains.push(chain);
                            if stop_at_first {
                                return chains;
                            }
                        }
                        _ => {}
                    },
                    None => {
                        if let Some(mark) = marks.get_mut(node) {
                            *mark = Mark::Done;
                        }
                        stack.pop();
                    }
                }
            }
        }

        chains
    }

    /// Longest blocking chain, counted in edges, ignoring vines on cycles
    pub fn max_depth(&self) -> usize {
        let mut indegree: Vec<usize> = self
            .blocker
            .iter()
            .map(|b| usize::from(b.is_some()))
            .collect();
        let mut depth = vec![0usize; self.len()];
        let mut queue: VecDeque<usize> = (0..self.len())
            .filter(|&i| indegree.get(i) == Some(&0))
            .collect();

        let mut max_depth = 0;
        while let Some(node) = queue.pop_front() {
            let node_depth = depth.get(node).copied().unwrap_or(0);
            max_depth = max_depth.max(node_depth);
            for &next in self.blocks.get(node).map_or(&[][..], Vec::as_slice) {
                if let Some(d) = depth.get_mut(next) {
                    *d = (*d).max(node_depth + 1);
                }
                if let Some(count) = indegree.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }
        max_depth
    }

    /// Vines worth removing to recover a failing placement
    ///
    /// Direct blockers of `failing` rank first, then vines blocking the most
    /// others; ties break on identifier so the order is reproducible.
    pub fn backtrack_candidates(&self, failing: &str, window: usize) -> Vec<String> {
        let failing_index = self.index_of(failing);
        let mut scored: Vec<(usize, &str)> = self
            .ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let direct = failing_index
                    .and_then(|f| self.blocker.get(f).copied().flatten())
                    .is_some_and(|b| b == index);
                let score = if direct { 1000 } else { 0 } + self.out_degree(index);
                (score, id.as_str())
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(window)
            .map(|(_, id)| id.to_string())
            .collect()
    }
}

/// Check a level for circular blocking
pub fn detect_cycle(level: &Level) -> bool {
    BlockingGraph::build(&level.vines).has_cycle()
}
