use super::editmap::{EditMap, EditOwner};
use super::types::LineRef;
use float_ord::FloatOrd;
use log::info;
use math::vector_to_degrees;
use std::cmp::Reverse;

/// Tolerance on the sum of a ring's relative angles.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Builds, for every vertex, the clockwise ring of lines touching it.
///
/// Each ring entry stores the clockwise turn from its line to the next entry's line; the last
/// entry closes the ring against the first, so the turns of a ring add up to 360 degrees.
pub fn build_owner_rings(map: &mut EditMap) {
    let EditMap {
        ref lines,
        ref mut vertices,
        ..
    } = *map;

    for vertex in vertices.iter_mut() {
        vertex.owners.clear();
    }
    for (slot, line) in lines.iter().enumerate() {
        let line_ref = LineRef::from_slot(slot);
        for vertex in &line.v {
            let owners = &mut vertices[vertex.slot()].owners;
            if owners.iter().all(|owner| owner.line != line_ref) {
                owners.push(EditOwner {
                    line: line_ref,
                    angle: 0.0,
                });
            }
        }
    }

    let mut num_owners = 0;
    for slot in 0..vertices.len() {
        if vertices[slot].owners.is_empty() {
            continue;
        }
        let pos = vertices[slot].pos;
        let mut sorted = vertices[slot]
            .owners
            .iter()
            .map(|owner| {
                let line = &lines[owner.line.slot()];
                let other = if line.v[0].slot() == slot {
                    line.v[1]
                } else {
                    line.v[0]
                };
                let absolute = vector_to_degrees(vertices[other.slot()].pos - pos);
                (absolute, owner.line)
            })
            .collect::<Vec<_>>();
        sorted.sort_by_key(|&(absolute, _)| Reverse(FloatOrd(absolute)));

        let first_angle = sorted[0].0;
        let ring = sorted
            .iter()
            .enumerate()
            .map(|(i_owner, &(absolute, line))| {
                let angle = match sorted.get(i_owner + 1) {
                    Some(&(next, _)) => absolute - next,
                    None => absolute - first_angle + 360.0,
                };
                EditOwner { line, angle }
            })
            .collect::<Vec<_>>();
        num_owners += ring.len();
        vertices[slot].owners = ring;
    }
    info!(
        "Built owner rings: {} owners over {} vertices.",
        num_owners,
        vertices.len()
    );
}

#[cfg(test)]
mod test {
    use super::{build_owner_rings, ANGLE_EPSILON};
    use crate::editmap::EditMap;
    use crate::types::LineRef;

    fn star(directions: &[[f64; 2]]) -> EditMap {
        let mut map = EditMap::new("STAR");
        let center = map.create_vertex(0.0, 0.0).expect("test: vertex");
        for &[x, y] in directions {
            let tip = map.create_vertex(x, y).expect("test: vertex");
            map.create_line_def(center, tip, None, None, 0)
                .expect("test: line");
        }
        map
    }

    fn line(index: u32) -> LineRef {
        LineRef::new(index).expect("test: zero line ref")
    }

    #[test]
    fn test_ring_is_clockwise() {
        // East, north, west, south.
        let mut map = star(&[[64.0, 0.0], [0.0, 64.0], [-64.0, 0.0], [0.0, -64.0]]);
        build_owner_rings(&mut map);
        let owners = &map.vertices()[0].owners;
        let lines = owners.iter().map(|owner| owner.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![line(4), line(3), line(2), line(1)]);
        for owner in owners {
            assert!((owner.angle - 90.0).abs() < ANGLE_EPSILON);
        }
    }

    #[test]
    fn test_ring_angles_sum_to_full_turn() {
        let mut map = star(&[
            [64.0, 3.0],
            [-5.0, 64.0],
            [-64.0, -64.0],
            [10.0, -1.0],
            [33.0, 90.0],
        ]);
        build_owner_rings(&mut map);
        for vertex in map.vertices() {
            let sum = vertex.owners.iter().map(|owner| owner.angle).sum::<f64>();
            assert_eq!(vertex.owners.len(), vertex.ref_count as usize);
            assert!((sum - 360.0).abs() < ANGLE_EPSILON, "sum was {}", sum);
            assert!(vertex.owners.iter().all(|owner| owner.angle >= 0.0));
        }
    }

    #[test]
    fn test_single_owner_ring() {
        let mut map = star(&[[64.0, 64.0]]);
        build_owner_rings(&mut map);
        let owners = &map.vertices()[1].owners;
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].angle, 360.0);
    }

    #[test]
    fn test_rebuild_does_not_duplicate() {
        let mut map = star(&[[64.0, 0.0], [0.0, 64.0]]);
        build_owner_rings(&mut map);
        build_owner_rings(&mut map);
        assert_eq!(map.vertices()[0].owners.len(), 2);
    }
}
