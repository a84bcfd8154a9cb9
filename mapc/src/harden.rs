use super::blockmap::Blockmap;
use super::editmap::EditMap;
use super::errors::{ErrorKind, Result};
use super::geometry::LineGeometry;
use super::map::{LineDef, LineOwner, Map, Plane, PlaneKind, Polyobj, Sector, SideDef, Vertex};
use super::types::{LineRef, PolyobjRef, SectorRef, SideRef, VertexIndex, VertexRef};
use log::{debug, info};
use math::{Aabb2, Pnt3d};

/// Copies the editable map into flat arrays, rewriting every 1-based build reference into a
/// position in the corresponding runtime array.
///
/// Vertices no line references are dropped; every other record type keeps its count and order.
/// Sector bounds, sound origins and the BSP are left for later stages.
pub fn harden(edit: &EditMap, cell_size: f64) -> Result<Map> {
    let remap = VertexRemap::new(edit);
    let mut vertices = harden_vertices(edit, &remap);
    let mut sectors = harden_sectors(edit);
    let sides = harden_sides(edit)?;
    let lines = harden_lines(edit, &remap, &vertices)?;
    let polyobjs = harden_polyobjs(edit)?;
    let line_owners = link_owner_rings(edit, &remap, &mut vertices)?;
    let planes = harden_planes(edit, &mut sectors);

    info!("Hardened map '{}':", edit.id);
    info!("    {:4} vertices ({} pruned)", vertices.len(), remap.num_pruned);
    info!("    {:4} lines", lines.len());
    info!("    {:4} sides", sides.len());
    info!("    {:4} sectors", sectors.len());
    info!("    {:4} planes", planes.len());
    info!("    {:4} polyobjs", polyobjs.len());
    info!("    {:4} line owners", line_owners.len());

    let empty = Blockmap::empty(cell_size);
    Ok(Map {
        id: edit.id.clone(),
        vertices,
        line_owners,
        lines,
        sides,
        sectors,
        planes,
        polyobjs,
        segs: Vec::new(),
        subsectors: Vec::new(),
        nodes: Vec::new(),
        bounds: Aabb2::empty(),
        line_blockmap: empty.clone(),
        polyobj_blockmap: empty.clone(),
        subsector_blockmap: empty,
        properties: edit.properties.clone(),
    })
}

struct VertexRemap {
    runtime: Vec<Option<VertexIndex>>,
    kept: Vec<usize>,
    num_pruned: usize,
}

impl VertexRemap {
    fn new(edit: &EditMap) -> Self {
        let mut runtime = Vec::with_capacity(edit.vertices.len());
        let mut kept = Vec::with_capacity(edit.vertices.len());
        for (slot, vertex) in edit.vertices.iter().enumerate() {
            if vertex.ref_count > 0 {
                runtime.push(Some(kept.len()));
                kept.push(slot);
            } else {
                debug!("Pruning unused vertex {}.", slot + 1);
                runtime.push(None);
            }
        }
        VertexRemap {
            num_pruned: runtime.len() - kept.len(),
            runtime,
            kept,
        }
    }

    fn get(&self, vertex: VertexRef) -> Result<VertexIndex> {
        self.runtime
            .get(vertex.slot())
            .cloned()
            .and_then(|index| index)
            .ok_or_else(|| ErrorKind::dangling_reference(VertexRef::WHAT, &vertex).into())
    }
}

fn resolve<R: Copy + std::fmt::Debug>(
    what: &'static str,
    reference: R,
    slot: usize,
    len: usize,
) -> Result<usize> {
    if slot < len {
        Ok(slot)
    } else {
        Err(ErrorKind::dangling_reference(what, &reference).into())
    }
}

fn sector(edit: &EditMap, sector: SectorRef) -> Result<usize> {
    resolve(SectorRef::WHAT, sector, sector.slot(), edit.sectors.len())
}

fn side(edit: &EditMap, side: SideRef) -> Result<usize> {
    resolve(SideRef::WHAT, side, side.slot(), edit.sides.len())
}

fn line(edit: &EditMap, line: LineRef) -> Result<usize> {
    resolve(LineRef::WHAT, line, line.slot(), edit.lines.len())
}

fn polyobj(edit: &EditMap, polyobj: PolyobjRef) -> Result<usize> {
    resolve(PolyobjRef::WHAT, polyobj, polyobj.slot(), edit.polyobjs.len())
}

fn harden_vertices(edit: &EditMap, remap: &VertexRemap) -> Vec<Vertex> {
    remap
        .kept
        .iter()
        .map(|&slot| Vertex {
            pos: edit.vertices[slot].pos,
            first_owner: None,
            num_owners: 0,
        })
        .collect()
}

fn harden_sectors(edit: &EditMap) -> Vec<Sector> {
    edit.sectors
        .iter()
        .map(|sector| Sector {
            planes: Vec::with_capacity(sector.planes.len()),
            light: sector.light,
            tint: sector.tint,
            bounds: Aabb2::zero(),
            sound_origin: Pnt3d::new(0.0, 0.0, 0.0),
            lines: Vec::new(),
            subsectors: Vec::new(),
        })
        .collect()
}

fn harden_sides(edit: &EditMap) -> Result<Vec<SideDef>> {
    edit.sides
        .iter()
        .map(|side| {
            Ok(SideDef {
                sector: sector(edit, side.sector)?,
                line: side.line.map(|owner| line(edit, owner)).transpose()?,
                flags: side.flags,
                top: side.top,
                middle: side.middle,
                bottom: side.bottom,
            })
        })
        .collect()
}

fn harden_lines(edit: &EditMap, remap: &VertexRemap, vertices: &[Vertex]) -> Result<Vec<LineDef>> {
    edit.lines
        .iter()
        .enumerate()
        .map(|(slot, edit_line)| {
            let front = edit_line
                .front
                .ok_or_else(|| ErrorKind::missing_front_side(slot))?;
            let v = [remap.get(edit_line.v[0])?, remap.get(edit_line.v[1])?];
            Ok(LineDef {
                v,
                front: side(edit, front)?,
                back: edit_line.back.map(|back| side(edit, back)).transpose()?,
                flags: edit_line.flags,
                geometry: LineGeometry::between(vertices[v[0]].pos, vertices[v[1]].pos),
                polyobj: edit_line
                    .polyobj
                    .map(|owner| polyobj(edit, owner))
                    .transpose()?,
                window_effect: edit_line
                    .window_effect
                    .map(|revealed| sector(edit, revealed))
                    .transpose()?,
            })
        })
        .collect()
}

fn harden_polyobjs(edit: &EditMap) -> Result<Vec<Polyobj>> {
    edit.polyobjs
        .iter()
        .map(|polyobj| {
            Ok(Polyobj {
                anchor: polyobj.anchor,
                tag: polyobj.tag,
                sequence_type: polyobj.sequence_type,
                lines: polyobj
                    .lines
                    .iter()
                    .map(|&owned| line(edit, owned))
                    .collect::<Result<Vec<_>>>()?,
            })
        })
        .collect()
}

/// Flattens every kept vertex's owner ring into one array, linking each ring into a circle.
fn link_owner_rings(
    edit: &EditMap,
    remap: &VertexRemap,
    vertices: &mut [Vertex],
) -> Result<Vec<LineOwner>> {
    let mut line_owners = Vec::new();
    for (index, &slot) in remap.kept.iter().enumerate() {
        let owners = &edit.vertices[slot].owners;
        if owners.is_empty() {
            continue;
        }
        let first = line_owners.len();
        let count = owners.len();
        for (i_owner, owner) in owners.iter().enumerate() {
            line_owners.push(LineOwner {
                line: line(edit, owner.line)?,
                angle: owner.angle,
                next: first + (i_owner + 1) % count,
                prev: first + (i_owner + count - 1) % count,
            });
        }
        vertices[index].first_owner = Some(first);
        vertices[index].num_owners = count;
    }
    Ok(line_owners)
}

fn harden_planes(edit: &EditMap, sectors: &mut [Sector]) -> Vec<Plane> {
    let mut planes = Vec::new();
    for (index, (edit_sector, sector)) in edit.sectors.iter().zip(sectors).enumerate() {
        for edit_plane in &edit_sector.planes {
            sector.planes.push(planes.len());
            planes.push(Plane {
                sector: index,
                kind: if edit_plane.normal[2] >= 0.0 {
                    PlaneKind::Floor
                } else {
                    PlaneKind::Ceiling
                },
                height: edit_plane.height,
                target_height: edit_plane.height,
                surface: edit_plane.surface,
                normal: edit_plane.normal,
                sound_origin: Pnt3d::new(0.0, 0.0, edit_plane.height),
            });
        }
    }
    planes
}

#[cfg(test)]
mod test {
    use super::harden;
    use crate::blockmap::DEFAULT_CELL_SIZE;
    use crate::dedup::{find_duplicate_vertices, merge_duplicate_vertices};
    use crate::editmap::EditMap;
    use crate::errors::ErrorKind;
    use crate::map::PlaneKind;
    use crate::owners::build_owner_rings;
    use crate::types::{LineRef, Surface, WHITE};

    /// Two sectors sharing a two-sided line, plus an unused and a duplicate vertex.
    fn two_rooms() -> EditMap {
        let mut map = EditMap::new("ROOMS");
        let v = map
            .create_vertices(&[
                [0.0, 0.0],
                [64.0, 0.0],
                [64.0, 64.0],
                [0.0, 64.0],
                [128.0, 0.0],
                [128.0, 64.0],
                [500.0, 500.0],
                [64.0, 64.0],
            ])
            .expect("test: vertices");
        let left = map.create_sector(0.5, WHITE).expect("test: sector");
        let right = map.create_sector(1.0, WHITE).expect("test: sector");
        for &sector in &[left, right] {
            map.create_plane(sector, 0.0, Surface::default(), [0.0, 0.0, 1.0])
                .expect("test: floor");
            map.create_plane(sector, 128.0, Surface::default(), [0.0, 0.0, -1.0])
                .expect("test: ceiling");
        }
        let side = |map: &mut EditMap, sector| {
            map.create_side_def(
                sector,
                0,
                Surface::default(),
                Surface::default(),
                Surface::default(),
            )
            .expect("test: side")
        };
        let outline = [
            (v[0], v[1], left, None),
            (v[1], v[7], left, Some(right)),
            (v[2], v[3], left, None),
            (v[3], v[0], left, None),
            (v[1], v[4], right, None),
            (v[4], v[5], right, None),
            (v[5], v[2], right, None),
        ];
        for &(from, to, front, back) in &outline {
            let front = side(&mut map, front);
            let back = back.map(|back| side(&mut map, back));
            map.create_line_def(from, to, Some(front), back, 0)
                .expect("test: line");
        }
        map
    }

    fn prepared() -> EditMap {
        let mut map = two_rooms();
        let duplicates = find_duplicate_vertices(&mut map);
        merge_duplicate_vertices(&mut map, &duplicates);
        build_owner_rings(&mut map);
        map
    }

    #[test]
    fn test_counts_preserved() {
        let edit = prepared();
        let map = harden(&edit, DEFAULT_CELL_SIZE).expect("test: harden failed");
        assert_eq!(map.lines.len(), edit.lines().len());
        assert_eq!(map.sides.len(), edit.sides().len());
        assert_eq!(map.sectors.len(), edit.sectors().len());
        assert_eq!(map.polyobjs.len(), edit.polyobjs().len());
        // The unused vertex and the merged duplicate are pruned.
        assert_eq!(map.vertices.len(), 6);
        assert_eq!(map.planes.len(), 4);
        assert_eq!(map.ceiling(1).map(|plane| plane.kind), Some(PlaneKind::Ceiling));
    }

    #[test]
    fn test_references_remapped() {
        let edit = prepared();
        let map = harden(&edit, DEFAULT_CELL_SIZE).expect("test: harden failed");
        for (edit_line, line) in edit.lines().iter().zip(&map.lines) {
            let front = edit_line.front.expect("test: front");
            assert_eq!(
                map.sides[line.front].sector,
                edit.side(front).expect("test: side").sector.slot()
            );
            if let Some(back) = edit_line.back {
                let runtime_back = line.back.expect("test: back side lost");
                assert_eq!(
                    map.sides[runtime_back].sector,
                    edit.side(back).expect("test: side").sector.slot()
                );
            }
            for i in 0..2 {
                let original = edit.vertex(edit_line.v[i]).expect("test: vertex").pos;
                assert_eq!(map.vertex_pos(line.v[i]), original);
            }
        }
        for (index, side) in map.sides.iter().enumerate() {
            let owner = side.line.expect("test: side without line");
            let line = &map.lines[owner];
            assert!(line.front == index || line.back == Some(index));
        }
    }

    #[test]
    fn test_owner_rings_linked() {
        let edit = prepared();
        let map = harden(&edit, DEFAULT_CELL_SIZE).expect("test: harden failed");
        for (index, vertex) in map.vertices.iter().enumerate() {
            let first = vertex.first_owner.expect("test: vertex without owners");
            let mut forward = first;
            let mut backward = first;
            for _ in 0..vertex.num_owners {
                forward = map.line_owners[forward].next;
                backward = map.line_owners[backward].prev;
            }
            assert_eq!(forward, first);
            assert_eq!(backward, first);

            let sum = map.vertex_owners(index).map(|owner| owner.angle).sum::<f64>();
            assert!((sum - 360.0).abs() < 1e-9);
            for owner in map.vertex_owners(index) {
                assert!(map.lines[owner.line].v.contains(&index));
            }
        }
        // The vertex shared by both rooms and the dividing line has three owners.
        let shared = map
            .vertices
            .iter()
            .position(|vertex| vertex.pos.x == 64.0 && vertex.pos.y == 0.0)
            .expect("test: shared vertex");
        assert_eq!(map.vertices[shared].num_owners, 3);
    }

    #[test]
    fn test_missing_front_side_is_precondition() {
        let mut edit = prepared();
        let v = edit
            .create_vertices(&[[0.0, 200.0], [10.0, 200.0]])
            .expect("test: vertices");
        let line = edit
            .create_line_def(v[0], v[1], None, None, 0)
            .expect("test: line");
        assert_eq!(line, LineRef::new(8).expect("test: ref"));
        build_owner_rings(&mut edit);
        let error = harden(&edit, DEFAULT_CELL_SIZE).expect_err("test: accepted frontless line");
        match *error.kind() {
            ErrorKind::Precondition(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
    }
}
