use super::editmap::{EditMap, EditVertex};
use super::types::VertexRef;
use disjoint_sets::UnionFind;
use log::{info, warn};

/// Groups of vertices sharing the same integer-truncated position.
///
/// Every group is represented by its first member in (x, y) order; members with equal keys keep
/// their creation order, so the representative is the earliest created vertex of the group.
pub struct DuplicateVertices {
    sets: UnionFind<usize>,
    first_in_set: Vec<Option<usize>>,
    num_duplicates: usize,
}

impl DuplicateVertices {
    pub fn detect(vertices: &[EditVertex]) -> DuplicateVertices {
        let key = |slot: usize| {
            let pos = vertices[slot].pos;
            (pos.x.trunc() as i64, pos.y.trunc() as i64)
        };

        let mut order = (0..vertices.len()).collect::<Vec<_>>();
        order.sort_by_key(|&slot| key(slot));

        let mut sets = UnionFind::new(vertices.len());
        let mut num_duplicates = 0;
        for pair in order.windows(2) {
            if key(pair[0]) == key(pair[1]) {
                sets.union(pair[0], pair[1]);
                num_duplicates += 1;
            }
        }

        let mut first_in_set = vec![None; vertices.len()];
        for &slot in &order {
            let root = sets.find(slot);
            if first_in_set[root].is_none() {
                first_in_set[root] = Some(slot);
            }
        }

        DuplicateVertices {
            sets,
            first_in_set,
            num_duplicates,
        }
    }

    pub fn num_duplicates(&self) -> usize {
        self.num_duplicates
    }

    pub fn find_canonical(&self, vertex: VertexRef) -> VertexRef {
        let root = self.sets.find(vertex.slot());
        self.first_in_set[root].map_or(vertex, VertexRef::from_slot)
    }

    /// Links every non-representative vertex to its group's representative.
    pub fn mark(&self, vertices: &mut [EditVertex]) {
        for (slot, vertex) in vertices.iter_mut().enumerate() {
            let this = VertexRef::from_slot(slot);
            let canonical = self.find_canonical(this);
            vertex.canonical = if canonical == this {
                None
            } else {
                Some(canonical)
            };
        }
    }
}

pub fn find_duplicate_vertices(map: &mut EditMap) -> DuplicateVertices {
    let duplicates = DuplicateVertices::detect(&map.vertices);
    duplicates.mark(&mut map.vertices);
    info!(
        "Found {} duplicate vertices out of {}.",
        duplicates.num_duplicates(),
        map.vertices.len()
    );
    duplicates
}

/// Points line endpoints at canonical vertices, moving reference counts along.
///
/// A line whose endpoints would collapse onto the same canonical vertex keeps its own vertices.
pub fn merge_duplicate_vertices(map: &mut EditMap, duplicates: &DuplicateVertices) {
    let EditMap {
        ref mut lines,
        ref mut vertices,
        ..
    } = *map;
    let mut num_redirected = 0;
    for (slot, line) in lines.iter_mut().enumerate() {
        let merged = [
            duplicates.find_canonical(line.v[0]),
            duplicates.find_canonical(line.v[1]),
        ];
        if merged == line.v {
            continue;
        }
        if merged[0] == merged[1] {
            warn!(
                "Line {} collapses onto vertex {} after merging duplicates, keeping its vertices.",
                slot + 1,
                merged[0].get()
            );
            continue;
        }
        for (old, new) in line.v.iter_mut().zip(merged.iter()) {
            if *old != *new {
                vertices[old.slot()].ref_count -= 1;
                vertices[new.slot()].ref_count += 1;
                *old = *new;
                num_redirected += 1;
            }
        }
    }
    info!("Redirected {} line endpoints to canonical vertices.", num_redirected);
}
