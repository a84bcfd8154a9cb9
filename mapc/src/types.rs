use serde::{Deserialize, Serialize};
use std::fmt;

pub type VertexIndex = usize;
pub type LineIndex = usize;
pub type SideIndex = usize;
pub type SectorIndex = usize;
pub type PlaneIndex = usize;
pub type PolyobjIndex = usize;
pub type OwnerIndex = usize;
pub type SegIndex = usize;
pub type SubsectorIndex = usize;

pub type MaterialId = u32;
pub type LineFlags = u16;
pub type SideFlags = u16;
pub type Tint = [f32; 3];
pub type Normal = [f32; 3];

pub const WHITE: Tint = [1.0, 1.0, 1.0];

macro_rules! build_ref {
    ($name:ident, $what:expr) => {
        /// A 1-based reference into the editable map; there is no zero reference.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const WHAT: &'static str = $what;

            pub fn new(index: u32) -> Option<Self> {
                if index == 0 {
                    None
                } else {
                    Some($name(index))
                }
            }

            pub(crate) fn from_slot(slot: usize) -> Self {
                $name(slot as u32 + 1)
            }

            pub fn get(self) -> u32 {
                self.0
            }

            pub fn slot(self) -> usize {
                self.0 as usize - 1
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} #{}", $what, self.0)
            }
        }
    };
}

build_ref!(VertexRef, "vertex");
build_ref!(LineRef, "line");
build_ref!(SideRef, "side");
build_ref!(SectorRef, "sector");
build_ref!(PolyobjRef, "polyobj");

pub mod line_flags {
    use super::LineFlags;

    pub const BLOCKING: LineFlags = 0x0001;
    pub const BLOCK_MONSTERS: LineFlags = 0x0002;
    pub const TWO_SIDED: LineFlags = 0x0004;
    pub const UPPER_UNPEGGED: LineFlags = 0x0008;
    pub const LOWER_UNPEGGED: LineFlags = 0x0010;
    pub const SECRET: LineFlags = 0x0020;
    pub const BLOCK_SOUND: LineFlags = 0x0040;
    pub const POLYOBJ: LineFlags = 0x8000;
}

/// Material, offset and tint of one wall or plane surface.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Surface {
    pub material: Option<MaterialId>,
    pub offset: [f32; 2],
    pub tint: Tint,
}

impl Default for Surface {
    fn default() -> Self {
        Surface {
            material: None,
            offset: [0.0, 0.0],
            tint: WHITE,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Front,
    Back,
}
