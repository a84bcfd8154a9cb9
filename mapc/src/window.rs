use super::editmap::{EditLine, EditMap};
use super::types::{LineRef, SectorRef};
use log::{debug, info};
use math::Pnt2d;
use std::f64;

/// Hits closer than this to the cast origin are treated as overlapping lines.
pub const DIST_EPSILON: f64 = 1.0 / 128.0;

#[derive(Copy, Clone, Debug)]
struct Hit {
    distance: f64,
    sector: Option<SectorRef>,
}

impl Hit {
    fn none() -> Self {
        Hit {
            distance: f64::INFINITY,
            sector: None,
        }
    }

    fn offer(&mut self, distance: f64, sector: Option<SectorRef>) {
        if distance < self.distance {
            self.distance = distance;
            self.sector = sector;
        }
    }
}

/// Finds one-sided lines that legacy renderers draw as windows onto a distant sector and
/// records that sector on them. Returns the number of lines marked.
pub fn detect_window_effects(map: &mut EditMap) -> usize {
    let candidates = window_candidates(map);
    let mut found = Vec::new();
    for &slot in &candidates {
        if let Some(sector) = test_for_window_effect(map, slot) {
            found.push((slot, sector));
        }
    }

    for &(slot, sector) in &found {
        debug!(
            "Line {} has a window effect onto {}.",
            slot + 1,
            sector
        );
        map.lines[slot].window_effect = Some(sector);
    }
    info!(
        "Window effects: {} candidate lines, {} marked.",
        candidates.len(),
        found.len()
    );
    found.len()
}

/// One-sided, non-polyobj lines touching a vertex where an odd number of one-sided lines meet
/// among more than one line.
fn window_candidates(map: &EditMap) -> Vec<usize> {
    let mut one_sided = vec![0usize; map.vertices.len()];
    let mut total = vec![0usize; map.vertices.len()];
    for line in &map.lines {
        for vertex in &line.v {
            total[vertex.slot()] += 1;
            if is_candidate_kind(line) {
                one_sided[vertex.slot()] += 1;
            }
        }
    }

    let odd_vertex = |slot: usize| one_sided[slot] % 2 == 1 && total[slot] > 1;
    map.lines
        .iter()
        .enumerate()
        .filter(|&(_, line)| is_candidate_kind(line))
        .filter(|&(_, line)| line.v.iter().any(|vertex| odd_vertex(vertex.slot())))
        .map(|(slot, _)| slot)
        .collect()
}

fn is_candidate_kind(line: &EditLine) -> bool {
    line.is_one_sided() && !line.is_polyobj()
}

/// Casts a ray through the midpoint of line `slot` along the axis it is least aligned with and
/// inspects the closest two-sided line hit on either side.
pub(crate) fn test_for_window_effect(map: &EditMap, slot: usize) -> Option<SectorRef> {
    let line = &map.lines[slot];
    let front_sector = map.side_sector(line.front)?;
    let (from, to) = map.line_points(line);
    let delta = to - from;
    let mid = Pnt2d::new((from.x + to.x) * 0.5, (from.y + to.y) * 0.5);
    let cast_horizontal = delta.x.abs() < delta.y.abs();

    let mut front = Hit::none();
    let mut back = Hit::none();
    for (other_slot, other) in map.lines.iter().enumerate() {
        if other_slot == slot || other.is_polyobj() || !other.is_two_sided() {
            continue;
        }
        let (other_from, other_to) = map.line_points(other);
        let other_delta = other_to - other_from;

        let (distance, is_front, hit_front_side) = if cast_horizontal {
            if other_delta.y.abs() < DIST_EPSILON
                || other_from.y.max(other_to.y) < mid.y - DIST_EPSILON
                || other_from.y.min(other_to.y) > mid.y + DIST_EPSILON
            {
                continue;
            }
            let distance =
                other_from.x + (mid.y - other_from.y) * other_delta.x / other_delta.y - mid.x;
            let is_front = (delta.y > 0.0) == (distance > 0.0);
            let hit_front_side = (delta.y > 0.0) ^ (other_delta.y > 0.0) ^ !is_front;
            (distance, is_front, hit_front_side)
        } else {
            if other_delta.x.abs() < DIST_EPSILON
                || other_from.x.max(other_to.x) < mid.x - DIST_EPSILON
                || other_from.x.min(other_to.x) > mid.x + DIST_EPSILON
            {
                continue;
            }
            let distance =
                other_from.y + (mid.x - other_from.x) * other_delta.y / other_delta.x - mid.y;
            let is_front = (delta.x > 0.0) != (distance > 0.0);
            let hit_front_side = (delta.x > 0.0) ^ (other_delta.x > 0.0) ^ !is_front;
            (distance, is_front, hit_front_side)
        };

        let distance = distance.abs();
        if distance < DIST_EPSILON {
            continue;
        }
        let hit_sector = map.side_sector(if hit_front_side {
            other.front
        } else {
            other.back
        });
        if is_front {
            front.offer(distance, hit_sector);
        } else {
            back.offer(distance, hit_sector);
        }
    }

    match (front.sector, back.sector) {
        (Some(front_open), Some(back_open)) if back_open == front_sector => Some(front_open),
        _ => None,
    }
}

/// The sector a line with a window effect reveals, if any.
pub fn window_effect_of(map: &EditMap, line: LineRef) -> Option<SectorRef> {
    map.line(line).and_then(|line| line.window_effect)
}
