use super::map::{LineDef, Map, SideDef};
use super::types::{LineIndex, SectorIndex};
use log::{debug, info};
use math::{Aabb2, Pnt3d};

/// For every sector, the lines with a side facing it, in ascending line order. A line with both
/// sides in the same sector is listed once.
pub fn sector_line_lists(
    lines: &[LineDef],
    sides: &[SideDef],
    num_sectors: usize,
) -> Vec<Vec<LineIndex>> {
    let mut lists: Vec<Vec<LineIndex>> = vec![Vec::new(); num_sectors];
    for (i_line, line) in lines.iter().enumerate() {
        for side in Some(line.front).into_iter().chain(line.back) {
            let sector = match sides.get(side) {
                Some(side) => side.sector,
                None => continue,
            };
            if let Some(list) = lists.get_mut(sector) {
                if list.last() != Some(&i_line) {
                    list.push(i_line);
                }
            }
        }
    }
    lists
}

/// Fills in each sector's line list, bounds and sound origin, and each plane's sound origin and
/// target height. Sectors bordered by no line are left with zero bounds.
pub fn finish_sectors(map: &mut Map) {
    let lists = sector_line_lists(&map.lines, &map.sides, map.sectors.len());
    let mut num_inert = 0;
    for (index, lines) in lists.into_iter().enumerate() {
        if lines.is_empty() {
            debug!("Sector {} has no lines.", index);
            num_inert += 1;
            map.sectors[index].bounds = Aabb2::zero();
            map.sectors[index].sound_origin = Pnt3d::new(0.0, 0.0, 0.0);
        } else {
            let bounds = Aabb2::from_points(
                lines
                    .iter()
                    .map(|&line| map.vertex_pos(map.lines[line].v[0])),
            );
            let center = bounds.center();
            let height = mid_height(map, index);
            let sector = &mut map.sectors[index];
            sector.bounds = bounds;
            sector.sound_origin = Pnt3d::new(center.x, center.y, height);
        }
        map.sectors[index].lines = lines;
    }

    let Map {
        ref sectors,
        ref mut planes,
        ..
    } = *map;
    for plane in planes.iter_mut() {
        let origin = sectors[plane.sector].sound_origin;
        plane.sound_origin = Pnt3d::new(origin.x, origin.y, plane.height);
        plane.target_height = plane.height;
    }
    info!(
        "Finished {} sectors ({} without lines) and {} planes.",
        sectors.len(),
        num_inert,
        planes.len()
    );
}

/// Halfway between floor and ceiling; a sector missing one of them uses the other's height.
fn mid_height(map: &Map, sector: SectorIndex) -> f64 {
    match (map.floor(sector), map.ceiling(sector)) {
        (Some(floor), Some(ceiling)) => (floor.height + ceiling.height) * 0.5,
        (Some(plane), None) | (None, Some(plane)) => plane.height,
        (None, None) => 0.0,
    }
}

#[cfg(test)]
mod test {
    use super::{finish_sectors, sector_line_lists};
    use crate::blockmap::DEFAULT_CELL_SIZE;
    use crate::editmap::EditMap;
    use crate::harden::harden;
    use crate::owners::build_owner_rings;
    use crate::types::{Surface, WHITE};

    fn room(with_orphan: bool) -> EditMap {
        let mut map = EditMap::new("ROOM");
        let v = map
            .create_vertices(&[[0.0, 0.0], [64.0, 0.0], [64.0, 64.0], [0.0, 64.0]])
            .expect("test: vertices");
        let sector = map.create_sector(1.0, WHITE).expect("test: sector");
        map.create_plane(sector, 0.0, Surface::default(), [0.0, 0.0, 1.0])
            .expect("test: floor");
        map.create_plane(sector, 128.0, Surface::default(), [0.0, 0.0, -1.0])
            .expect("test: ceiling");
        if with_orphan {
            let orphan = map.create_sector(1.0, WHITE).expect("test: sector");
            map.create_plane(orphan, 8.0, Surface::default(), [0.0, 0.0, 1.0])
                .expect("test: floor");
        }
        for i in 0..4 {
            let side = map
                .create_side_def(
                    sector,
                    0,
                    Surface::default(),
                    Surface::default(),
                    Surface::default(),
                )
                .expect("test: side");
            map.create_line_def(v[i], v[(i + 1) % 4], Some(side), None, 0)
                .expect("test: line");
        }
        build_owner_rings(&mut map);
        map
    }

    #[test]
    fn test_sound_origins() {
        let mut map = harden(&room(false), DEFAULT_CELL_SIZE).expect("test: harden");
        finish_sectors(&mut map);
        let sector = &map.sectors[0];
        assert_eq!(sector.lines, vec![0, 1, 2, 3]);
        assert_eq!(sector.bounds.min.x, 0.0);
        assert_eq!(sector.bounds.max.y, 64.0);
        assert_eq!(
            (sector.sound_origin.x, sector.sound_origin.y, sector.sound_origin.z),
            (32.0, 32.0, 64.0)
        );
        for plane in &map.planes {
            assert_eq!(plane.sound_origin.x, 32.0);
            assert_eq!(plane.sound_origin.z, plane.height);
            assert_eq!(plane.target_height, plane.height);
        }
    }

    #[test]
    fn test_sector_without_lines_is_inert() {
        let mut map = harden(&room(true), DEFAULT_CELL_SIZE).expect("test: harden");
        finish_sectors(&mut map);
        let orphan = &map.sectors[1];
        assert!(orphan.lines.is_empty());
        assert_eq!(orphan.bounds.size().x, 0.0);
        assert_eq!(orphan.bounds.min.x, 0.0);
        assert_eq!(map.planes[2].target_height, 8.0);
    }

    #[test]
    fn test_line_lists_skip_repeats() {
        let mut map = harden(&room(false), DEFAULT_CELL_SIZE).expect("test: harden");
        // Make the first line two-sided onto its own sector.
        let extra = map.sides[0].clone();
        map.sides.push(extra);
        map.lines[0].back = Some(4);
        let lists = sector_line_lists(&map.lines, &map.sides, map.sectors.len());
        assert_eq!(lists, vec![vec![0, 1, 2, 3]]);
    }
}
