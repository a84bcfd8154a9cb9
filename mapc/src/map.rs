use super::blockmap::Blockmap;
use super::bsp::{BspNode, Seg, Subsector};
use super::geometry::LineGeometry;
use super::properties::GameObjectProperties;
use super::types::{Facing, LineFlags, LineIndex, Normal, OwnerIndex, PlaneIndex, PolyobjIndex};
use super::types::{SectorIndex, SideFlags, SideIndex, SubsectorIndex, Surface, Tint};
use super::types::{line_flags, VertexIndex};
use math::{Aabb2, Pnt2d, Pnt3d};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Pnt2d,
    pub first_owner: Option<OwnerIndex>,
    pub num_owners: usize,
}

/// A node in a vertex's clockwise ring of lines.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineOwner {
    pub line: LineIndex,
    /// Clockwise turn in degrees to the line of `next`.
    pub angle: f64,
    pub next: OwnerIndex,
    pub prev: OwnerIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineDef {
    pub v: [VertexIndex; 2],
    pub front: SideIndex,
    pub back: Option<SideIndex>,
    pub flags: LineFlags,
    pub geometry: LineGeometry,
    pub polyobj: Option<PolyobjIndex>,
    pub window_effect: Option<SectorIndex>,
}

impl LineDef {
    pub fn side(&self, facing: Facing) -> Option<SideIndex> {
        match facing {
            Facing::Front => Some(self.front),
            Facing::Back => self.back,
        }
    }

    pub fn is_two_sided(&self) -> bool {
        self.back.is_some()
    }

    pub fn is_polyobj(&self) -> bool {
        self.polyobj.is_some()
    }

    pub fn blocking(&self) -> bool {
        self.flags & line_flags::BLOCKING != 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideDef {
    pub sector: SectorIndex,
    pub line: Option<LineIndex>,
    pub flags: SideFlags,
    pub top: Surface,
    pub middle: Surface,
    pub bottom: Surface,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub sector: SectorIndex,
    pub kind: PlaneKind,
    pub height: f64,
    pub target_height: f64,
    pub surface: Surface,
    pub normal: Normal,
    pub sound_origin: Pnt3d,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub planes: Vec<PlaneIndex>,
    pub light: f32,
    pub tint: Tint,
    pub bounds: Aabb2,
    pub sound_origin: Pnt3d,
    /// Bordering lines in ascending index order.
    pub lines: Vec<LineIndex>,
    pub subsectors: Vec<SubsectorIndex>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polyobj {
    pub anchor: Pnt2d,
    pub tag: i32,
    pub sequence_type: i32,
    pub lines: Vec<LineIndex>,
}

/// The compiled, immutable form of a map. All cross references are positions in its arrays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub id: String,
    pub vertices: Vec<Vertex>,
    pub line_owners: Vec<LineOwner>,
    pub lines: Vec<LineDef>,
    pub sides: Vec<SideDef>,
    pub sectors: Vec<Sector>,
    pub planes: Vec<Plane>,
    pub polyobjs: Vec<Polyobj>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<BspNode>,
    pub bounds: Aabb2,
    pub line_blockmap: Blockmap,
    pub polyobj_blockmap: Blockmap,
    pub subsector_blockmap: Blockmap,
    pub properties: GameObjectProperties,
}

impl Map {
    pub fn vertex_pos(&self, vertex: VertexIndex) -> Pnt2d {
        self.vertices[vertex].pos
    }

    pub fn line_points(&self, line: &LineDef) -> (Pnt2d, Pnt2d) {
        (self.vertex_pos(line.v[0]), self.vertex_pos(line.v[1]))
    }

    pub fn side_sector(&self, side: SideIndex) -> Option<SectorIndex> {
        self.sides.get(side).map(|side| side.sector)
    }

    pub fn line_sector(&self, line: &LineDef, facing: Facing) -> Option<SectorIndex> {
        line.side(facing).and_then(|side| self.side_sector(side))
    }

    pub fn floor(&self, sector: SectorIndex) -> Option<&Plane> {
        self.sector_plane(sector, PlaneKind::Floor)
    }

    pub fn ceiling(&self, sector: SectorIndex) -> Option<&Plane> {
        self.sector_plane(sector, PlaneKind::Ceiling)
    }

    fn sector_plane(&self, sector: SectorIndex, kind: PlaneKind) -> Option<&Plane> {
        self.sectors
            .get(sector)?
            .planes
            .iter()
            .map(|&plane| &self.planes[plane])
            .find(|plane| plane.kind == kind)
    }

    /// Walks a vertex's owner ring clockwise, starting at its first owner.
    pub fn vertex_owners(&self, vertex: VertexIndex) -> OwnerRing {
        let (next, remaining) = match self.vertices.get(vertex) {
            Some(Vertex {
                first_owner: Some(first),
                num_owners,
                ..
            }) => (*first, *num_owners),
            _ => (0, 0),
        };
        OwnerRing {
            owners: &self.line_owners,
            next,
            remaining,
        }
    }

    pub fn subsector_segs(&self, subsector: SubsectorIndex) -> &[Seg] {
        let subsector = &self.subsectors[subsector];
        &self.segs[subsector.first_seg..subsector.first_seg + subsector.num_segs]
    }
}

pub struct OwnerRing<'a> {
    owners: &'a [LineOwner],
    next: OwnerIndex,
    remaining: usize,
}

impl<'a> Iterator for OwnerRing<'a> {
    type Item = &'a LineOwner;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let owner = &self.owners[self.next];
        self.next = owner.next;
        Some(owner)
    }
}
