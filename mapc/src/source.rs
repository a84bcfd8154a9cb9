use super::compiler::Compiler;
use super::errors::{ErrorKind, Result};
use super::properties::PropertyValue;
use super::types::{LineFlags, LineRef, Normal, SectorRef, SideFlags, SideRef, Surface, Tint};
use super::types::{VertexRef, WHITE};
use failchain::{bail, ResultExt};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use toml;

fn default_light() -> f32 {
    1.0
}

fn default_tint() -> Tint {
    WHITE
}

fn default_floor_normal() -> Normal {
    [0.0, 0.0, 1.0]
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourcePlane {
    pub height: f64,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default = "default_floor_normal")]
    pub normal: Normal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceSector {
    #[serde(default = "default_light")]
    pub light: f32,
    #[serde(default = "default_tint")]
    pub tint: Tint,
    #[serde(default)]
    pub planes: Vec<SourcePlane>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceSide {
    pub sector: u32,
    #[serde(default)]
    pub flags: SideFlags,
    #[serde(default)]
    pub top: Surface,
    #[serde(default)]
    pub middle: Surface,
    #[serde(default)]
    pub bottom: Surface,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceLine {
    pub v1: u32,
    pub v2: u32,
    #[serde(default)]
    pub front: u32,
    #[serde(default)]
    pub back: u32,
    #[serde(default)]
    pub flags: LineFlags,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourcePolyobj {
    pub lines: Vec<u32>,
    #[serde(default)]
    pub tag: i32,
    #[serde(default)]
    pub sequence_type: i32,
    pub anchor: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceValueKind {
    Byte,
    Short,
    Int,
    Float,
    Angle,
    Text,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SourceProperty {
    pub object: String,
    pub index: u32,
    pub name: String,
    pub kind: SourceValueKind,
    pub value: toml::Value,
}

impl SourceProperty {
    fn to_value(&self) -> Result<PropertyValue> {
        let invalid = || {
            ErrorKind::CorruptSource(format!(
                "property {}[{}].{} is not a valid {:?}: {}",
                self.object, self.index, self.name, self.kind, self.value
            ))
        };
        let integer = self.value.as_integer();
        let float = self.value.as_float().or_else(|| integer.map(|value| value as f64));
        let value = match self.kind {
            SourceValueKind::Byte => integer
                .filter(|&value| value >= 0 && value <= i64::from(u8::max_value()))
                .map(|value| PropertyValue::Byte(value as u8)),
            SourceValueKind::Short => integer
                .filter(|&value| {
                    value >= i64::from(i16::min_value()) && value <= i64::from(i16::max_value())
                })
                .map(|value| PropertyValue::Short(value as i16)),
            SourceValueKind::Int => integer
                .filter(|&value| {
                    value >= i64::from(i32::min_value()) && value <= i64::from(i32::max_value())
                })
                .map(|value| PropertyValue::Int(value as i32)),
            SourceValueKind::Float => float.map(|value| PropertyValue::Float(value as f32)),
            SourceValueKind::Angle => float.map(PropertyValue::Angle),
            SourceValueKind::Text => self
                .value
                .as_str()
                .map(|text| PropertyValue::Text(text.to_owned())),
        };
        match value {
            Some(value) => Ok(value),
            None => bail!(invalid()),
        }
    }
}

/// A map described in TOML. References are 1-based, with 0 meaning none.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MapSource {
    pub id: Option<String>,
    pub vertices: Vec<[f64; 2]>,
    pub sectors: Vec<SourceSector>,
    pub sides: Vec<SourceSide>,
    pub lines: Vec<SourceLine>,
    pub polyobjs: Vec<SourcePolyobj>,
    pub properties: Vec<SourceProperty>,
}

fn required<R>(what: &'static str, index: u32, reference: Option<R>) -> Result<R> {
    match reference {
        Some(reference) => Ok(reference),
        None => bail!(ErrorKind::invalid_reference(what, index)),
    }
}

impl MapSource {
    pub fn from_file<P: AsRef<Path>>(path: &P) -> Result<MapSource> {
        let mut contents = String::new();
        let path = path.as_ref();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .chain_err(|| ErrorKind::on_file_open(path))?;
        MapSource::from_text(&contents)
    }

    pub fn from_text(text: &str) -> Result<MapSource> {
        toml::from_str(text).chain_err(ErrorKind::on_source_parse)
    }

    /// Feeds every element to `compiler`, which must already be building a map. Elements are
    /// created in file order, so their references match their positions in the file.
    pub fn load_into(&self, compiler: &mut Compiler) -> Result<()> {
        let vertices = compiler.create_vertices(&self.vertices)?;
        for sector in &self.sectors {
            let sector_ref = compiler.create_sector(sector.light, sector.tint)?;
            for plane in &sector.planes {
                compiler.create_plane(sector_ref, plane.height, plane.surface, plane.normal)?;
            }
        }
        for side in &self.sides {
            let sector = required(SectorRef::WHAT, side.sector, SectorRef::new(side.sector))?;
            compiler.create_side_def(sector, side.flags, side.top, side.middle, side.bottom)?;
        }
        for line in &self.lines {
            let vertex = |index: u32| {
                required(
                    VertexRef::WHAT,
                    index,
                    VertexRef::new(index).and_then(|_| vertices.get(index as usize - 1).cloned()),
                )
            };
            compiler.create_line_def(
                vertex(line.v1)?,
                vertex(line.v2)?,
                SideRef::new(line.front),
                SideRef::new(line.back),
                line.flags,
            )?;
        }
        for polyobj in &self.polyobjs {
            let lines = polyobj
                .lines
                .iter()
                .map(|&index| required(LineRef::WHAT, index, LineRef::new(index)))
                .collect::<Result<Vec<_>>>()?;
            compiler.create_polyobj(
                &lines,
                polyobj.tag,
                polyobj.sequence_type,
                polyobj.anchor[0],
                polyobj.anchor[1],
            )?;
        }
        for property in &self.properties {
            compiler.set_game_object_property(
                &property.object,
                property.index,
                &property.name,
                property.to_value()?,
            )?;
        }
        info!(
            "Loaded {} vertices, {} sectors, {} sides, {} lines, {} polyobjs and {} properties.",
            self.vertices.len(),
            self.sectors.len(),
            self.sides.len(),
            self.lines.len(),
            self.polyobjs.len(),
            self.properties.len()
        );
        Ok(())
    }
}
