#![cfg_attr(feature = "cargo-clippy", allow(clippy::too_many_arguments))]

mod archive;
mod blockmap;
mod bsp;
mod compiler;
mod config;
mod dedup;
mod editmap;
mod errors;
mod finalize;
mod finish;
mod geometry;
mod harden;
mod map;
mod owners;
mod properties;
mod source;
mod window;

pub mod types;

pub use self::archive::{read_map, ArchiveWriter, BincodeArchive, CACHE_MAGIC, CACHE_VERSION};
pub use self::blockmap::{Blockmap, DEFAULT_CELL_SIZE, MAX_BLOCKMAP_CELLS};
pub use self::bsp::{BspBuilder, BspChild, BspNode, BspOutput, Seg, SectorLeafBuilder, Subsector};
pub use self::compiler::Compiler;
pub use self::config::{CacheConfig, CompilerConfig};
pub use self::dedup::{find_duplicate_vertices, merge_duplicate_vertices, DuplicateVertices};
pub use self::editmap::{EditLine, EditMap, EditOwner, EditPlane, EditPolyobj, EditSector};
pub use self::editmap::{EditSide, EditVertex};
pub use self::errors::{Error, ErrorKind, Result};
pub use self::geometry::{LineGeometry, SlopeType};
pub use self::map::{LineDef, LineOwner, Map, OwnerRing, Plane, PlaneKind, Polyobj, Sector};
pub use self::map::{SideDef, Vertex};
pub use self::owners::{build_owner_rings, ANGLE_EPSILON};
pub use self::properties::{GameObjectProperties, PropertyValue};
pub use self::source::{MapSource, SourceLine, SourcePlane, SourcePolyobj, SourceProperty};
pub use self::source::{SourceSector, SourceSide, SourceValueKind};
pub use self::window::{detect_window_effects, window_effect_of, DIST_EPSILON};
