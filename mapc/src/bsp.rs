use super::errors::{ErrorKind, Result};
use super::map::Map;
use super::types::{Facing, LineIndex, SectorIndex, VertexIndex};
use failchain::ensure;
use log::info;
use math::{Aabb2, Line2d, Pnt2d};
use serde::{Deserialize, Serialize};
use vec_map::VecMap;

/// A piece of a line bounding a subsector. Vertex indices may point past the map's original
/// vertices, at the ones appended by the BSP builder.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Seg {
    pub v: [VertexIndex; 2],
    pub line: Option<LineIndex>,
    pub facing: Facing,
}

/// A convex leaf of the BSP tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subsector {
    pub sector: Option<SectorIndex>,
    pub first_seg: usize,
    pub num_segs: usize,
    pub bounds: Aabb2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BspChild {
    Node(usize),
    Subsector(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BspNode {
    pub partition: Line2d,
    /// Right and left child bounds.
    pub bounds: [Aabb2; 2],
    /// Right and left children.
    pub children: [BspChild; 2],
}

#[derive(Clone, Debug, Default)]
pub struct BspOutput {
    /// Vertices created by splitting lines; they get appended to the map's vertices.
    pub new_vertices: Vec<Pnt2d>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    /// The root is the last node. Builders that do not partition leave this empty.
    pub nodes: Vec<BspNode>,
}

/// Partitions hardened geometry into convex leaves.
pub trait BspBuilder {
    fn debug_name(&self) -> &'static str;

    fn build(&mut self, map: &Map) -> Result<BspOutput>;
}

/// Emits one leaf per sector holding a seg for every line side facing it, with no partition
/// nodes. Leaves are only convex when the sectors are; never creates vertices.
#[derive(Copy, Clone, Debug, Default)]
pub struct SectorLeafBuilder;

impl BspBuilder for SectorLeafBuilder {
    fn debug_name(&self) -> &'static str {
        "sector leaves"
    }

    fn build(&mut self, map: &Map) -> Result<BspOutput> {
        let mut segs_by_sector = VecMap::<Vec<Seg>>::with_capacity(map.sectors.len());
        let mut faces_sector = false;
        for (i_line, line) in map.lines.iter().enumerate() {
            for &facing in &[Facing::Front, Facing::Back] {
                let sector = match map.line_sector(line, facing) {
                    Some(sector) => sector,
                    None => continue,
                };
                faces_sector = true;
                // Polyobject lines move at runtime and stay out of the static leaves.
                if line.is_polyobj() {
                    continue;
                }
                let v = match facing {
                    Facing::Front => line.v,
                    Facing::Back => [line.v[1], line.v[0]],
                };
                segs_by_sector
                    .entry(sector)
                    .or_insert_with(Vec::new)
                    .push(Seg {
                        v,
                        line: Some(i_line),
                        facing,
                    });
            }
        }
        ensure!(
            map.lines.is_empty() || faces_sector,
            ErrorKind::Bsp("no line has a side facing a sector".to_owned())
        );

        let mut output = BspOutput::default();
        for (sector, segs) in segs_by_sector {
            let bounds = Aabb2::from_points(
                segs.iter()
                    .flat_map(|seg| seg.v.iter())
                    .map(|&vertex| map.vertex_pos(vertex)),
            );
            output.subsectors.push(Subsector {
                sector: Some(sector),
                first_seg: output.segs.len(),
                num_segs: segs.len(),
                bounds,
            });
            output.segs.extend(segs);
        }
        info!(
            "Built {} subsectors and {} segs.",
            output.subsectors.len(),
            output.segs.len()
        );
        Ok(output)
    }
}
