use super::errors::{ErrorKind, Result};
use super::properties::{GameObjectProperties, PropertyValue};
use super::types::{line_flags, LineFlags, Normal, SideFlags, Surface, Tint};
use super::types::{LineRef, PolyobjRef, SectorRef, SideRef, VertexRef};
use failchain::{bail, ensure};
use indexmap::IndexSet;
use log::debug;
use math::Pnt2d;

#[derive(Clone, Debug)]
pub struct EditVertex {
    pub pos: Pnt2d,
    pub canonical: Option<VertexRef>,
    pub ref_count: u32,
    /// Clockwise ring of lines touching this vertex, filled in by the owner ring builder.
    pub owners: Vec<EditOwner>,
}

/// One node of a vertex's owner ring; the next node is the following element, wrapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EditOwner {
    pub line: LineRef,
    /// Clockwise turn in degrees from this line to the next one in the ring.
    pub angle: f64,
}

#[derive(Clone, Debug)]
pub struct EditLine {
    pub v: [VertexRef; 2],
    pub front: Option<SideRef>,
    pub back: Option<SideRef>,
    pub flags: LineFlags,
    pub polyobj: Option<PolyobjRef>,
    pub window_effect: Option<SectorRef>,
}

impl EditLine {
    pub fn is_one_sided(&self) -> bool {
        self.front.is_some() && self.back.is_none()
    }

    pub fn is_two_sided(&self) -> bool {
        self.front.is_some() && self.back.is_some()
    }

    pub fn is_polyobj(&self) -> bool {
        self.polyobj.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct EditSide {
    pub sector: SectorRef,
    pub flags: SideFlags,
    pub top: Surface,
    pub middle: Surface,
    pub bottom: Surface,
    pub line: Option<LineRef>,
}

#[derive(Clone, Debug)]
pub struct EditPlane {
    pub height: f64,
    pub surface: Surface,
    pub normal: Normal,
}

#[derive(Clone, Debug)]
pub struct EditSector {
    pub light: f32,
    pub tint: Tint,
    pub planes: Vec<EditPlane>,
}

#[derive(Clone, Debug)]
pub struct EditPolyobj {
    pub lines: Vec<LineRef>,
    pub tag: i32,
    pub sequence_type: i32,
    pub anchor: Pnt2d,
}

/// The growable, build-time representation of a map, filled in one element at a time.
#[derive(Clone, Debug)]
pub struct EditMap {
    pub(crate) id: String,
    pub(crate) vertices: Vec<EditVertex>,
    pub(crate) lines: Vec<EditLine>,
    pub(crate) sides: Vec<EditSide>,
    pub(crate) sectors: Vec<EditSector>,
    pub(crate) polyobjs: Vec<EditPolyobj>,
    pub(crate) properties: GameObjectProperties,
}

impl EditMap {
    pub fn new(id: &str) -> EditMap {
        EditMap {
            id: id.to_owned(),
            vertices: Vec::new(),
            lines: Vec::new(),
            sides: Vec::new(),
            sectors: Vec::new(),
            polyobjs: Vec::new(),
            properties: GameObjectProperties::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vertices(&self) -> &[EditVertex] {
        &self.vertices
    }

    pub fn lines(&self) -> &[EditLine] {
        &self.lines
    }

    pub fn sides(&self) -> &[EditSide] {
        &self.sides
    }

    pub fn sectors(&self) -> &[EditSector] {
        &self.sectors
    }

    pub fn polyobjs(&self) -> &[EditPolyobj] {
        &self.polyobjs
    }

    pub fn properties(&self) -> &GameObjectProperties {
        &self.properties
    }

    pub fn vertex(&self, vertex: VertexRef) -> Option<&EditVertex> {
        self.vertices.get(vertex.slot())
    }

    pub fn line(&self, line: LineRef) -> Option<&EditLine> {
        self.lines.get(line.slot())
    }

    pub fn side(&self, side: SideRef) -> Option<&EditSide> {
        self.sides.get(side.slot())
    }

    pub fn sector(&self, sector: SectorRef) -> Option<&EditSector> {
        self.sectors.get(sector.slot())
    }

    /// The endpoints of `line`; the line's vertex references are valid by construction.
    pub(crate) fn line_points(&self, line: &EditLine) -> (Pnt2d, Pnt2d) {
        (
            self.vertices[line.v[0].slot()].pos,
            self.vertices[line.v[1].slot()].pos,
        )
    }

    pub(crate) fn side_sector(&self, side: Option<SideRef>) -> Option<SectorRef> {
        side.and_then(|side| self.side(side)).map(|side| side.sector)
    }

    pub fn create_vertex(&mut self, x: f64, y: f64) -> Result<VertexRef> {
        ensure!(
            x.is_finite() && y.is_finite(),
            ErrorKind::invalid_coordinate(x, y)
        );
        self.vertices.push(EditVertex {
            pos: Pnt2d::new(x, y),
            canonical: None,
            ref_count: 0,
            owners: Vec::new(),
        });
        Ok(VertexRef::from_slot(self.vertices.len() - 1))
    }

    /// Creates all vertices or none of them.
    pub fn create_vertices(&mut self, coords: &[[f64; 2]]) -> Result<Vec<VertexRef>> {
        if let Some(&[x, y]) = coords
            .iter()
            .find(|&&[x, y]| !x.is_finite() || !y.is_finite())
        {
            bail!(ErrorKind::invalid_coordinate(x, y));
        }
        coords
            .iter()
            .map(|&[x, y]| self.create_vertex(x, y))
            .collect()
    }

    pub fn create_sector(&mut self, light: f32, tint: Tint) -> Result<SectorRef> {
        self.sectors.push(EditSector {
            light: light.max(0.0).min(1.0),
            tint,
            planes: Vec::new(),
        });
        Ok(SectorRef::from_slot(self.sectors.len() - 1))
    }

    /// Returns the 1-based index of the new plane within its sector.
    pub fn create_plane(
        &mut self,
        sector: SectorRef,
        height: f64,
        surface: Surface,
        normal: Normal,
    ) -> Result<u32> {
        let planes = match self.sectors.get_mut(sector.slot()) {
            Some(sector) => &mut sector.planes,
            None => bail!(ErrorKind::invalid_reference(SectorRef::WHAT, sector.get())),
        };
        planes.push(EditPlane {
            height,
            surface,
            normal,
        });
        Ok(planes.len() as u32)
    }

    pub fn create_side_def(
        &mut self,
        sector: SectorRef,
        flags: SideFlags,
        top: Surface,
        middle: Surface,
        bottom: Surface,
    ) -> Result<SideRef> {
        ensure!(
            sector.slot() < self.sectors.len(),
            ErrorKind::invalid_reference(SectorRef::WHAT, sector.get())
        );
        self.sides.push(EditSide {
            sector,
            flags,
            top,
            middle,
            bottom,
            line: None,
        });
        Ok(SideRef::from_slot(self.sides.len() - 1))
    }

    pub fn create_line_def(
        &mut self,
        v1: VertexRef,
        v2: VertexRef,
        front: Option<SideRef>,
        back: Option<SideRef>,
        flags: LineFlags,
    ) -> Result<LineRef> {
        for &vertex in &[v1, v2] {
            ensure!(
                vertex.slot() < self.vertices.len(),
                ErrorKind::invalid_reference(VertexRef::WHAT, vertex.get())
            );
        }
        ensure!(
            v1 != v2 && self.vertices[v1.slot()].pos != self.vertices[v2.slot()].pos,
            ErrorKind::ZeroLength(v1.get(), v2.get())
        );

        let line_ref = LineRef::from_slot(self.lines.len());
        if let (Some(front), Some(back)) = (front, back) {
            ensure!(
                front != back,
                ErrorKind::SideInUse {
                    side: back.get(),
                    line: line_ref.get(),
                }
            );
        }
        for &side in front.iter().chain(back.iter()) {
            match self.sides.get(side.slot()) {
                Some(EditSide {
                    line: Some(owner), ..
                }) => bail!(ErrorKind::SideInUse {
                    side: side.get(),
                    line: owner.get(),
                }),
                Some(_) => {}
                None => bail!(ErrorKind::invalid_reference(SideRef::WHAT, side.get())),
            }
        }

        for &side in front.iter().chain(back.iter()) {
            self.sides[side.slot()].line = Some(line_ref);
        }
        self.vertices[v1.slot()].ref_count += 1;
        self.vertices[v2.slot()].ref_count += 1;

        let mut flags = flags & !line_flags::POLYOBJ;
        if back.is_some() {
            flags |= line_flags::TWO_SIDED;
        }
        self.lines.push(EditLine {
            v: [v1, v2],
            front,
            back,
            flags,
            polyobj: None,
            window_effect: None,
        });
        Ok(line_ref)
    }

    pub fn create_polyobj(
        &mut self,
        lines: &[LineRef],
        tag: i32,
        sequence_type: i32,
        anchor_x: f64,
        anchor_y: f64,
    ) -> Result<PolyobjRef> {
        ensure!(!lines.is_empty(), ErrorKind::EmptyPolyobj);
        ensure!(
            anchor_x.is_finite() && anchor_y.is_finite(),
            ErrorKind::invalid_coordinate(anchor_x, anchor_y)
        );
        for &line in lines {
            match self.lines.get(line.slot()) {
                Some(EditLine {
                    polyobj: Some(owner),
                    ..
                }) => bail!(ErrorKind::PolyobjLineInUse {
                    line: line.get(),
                    polyobj: owner.get(),
                }),
                Some(_) => {}
                None => bail!(ErrorKind::invalid_reference(LineRef::WHAT, line.get())),
            }
        }

        let polyobj = PolyobjRef::from_slot(self.polyobjs.len());
        for &line in lines {
            let line = &mut self.lines[line.slot()];
            line.polyobj = Some(polyobj);
            line.flags |= line_flags::POLYOBJ;
        }
        let owned = lines.iter().cloned().collect::<IndexSet<_>>();
        self.polyobjs.push(EditPolyobj {
            lines: owned.into_iter().collect(),
            tag,
            sequence_type,
            anchor: Pnt2d::new(anchor_x, anchor_y),
        });
        debug!(
            "Created {} with {} lines.",
            polyobj,
            self.polyobjs[polyobj.slot()].lines.len()
        );
        Ok(polyobj)
    }

    pub fn set_game_object_property(
        &mut self,
        object_type: &str,
        index: u32,
        property: &str,
        value: PropertyValue,
    ) {
        self.properties.set(object_type, index, property, value);
    }
}
