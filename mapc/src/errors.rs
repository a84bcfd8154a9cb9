use failchain::{BoxedError, ChainErrorKind};
use failure::Fail;
use std::fmt::Debug;
use std::path::Path;
use std::result::Result as StdResult;

pub type Error = BoxedError<ErrorKind>;
pub type Result<T> = StdResult<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Map `{}` is already being compiled.", 0)]
    AlreadyEditing(String),

    #[fail(display = "No map is being compiled.")]
    NotEditing,

    #[fail(display = "Invalid {} reference {}.", what, index)]
    InvalidReference { what: &'static str, index: u32 },

    #[fail(display = "Invalid coordinate ({}, {}).", 0, 1)]
    InvalidCoordinate(String, String),

    #[fail(display = "Side {} is already used by line {}.", side, line)]
    SideInUse { side: u32, line: u32 },

    #[fail(display = "Line between vertices {} and {} has zero length.", 0, 1)]
    ZeroLength(u32, u32),

    #[fail(display = "Line {} already belongs to polyobj {}.", line, polyobj)]
    PolyobjLineInUse { line: u32, polyobj: u32 },

    #[fail(display = "Polyobj has no lines.")]
    EmptyPolyobj,

    #[fail(display = "Map precondition violated: {}", 0)]
    Precondition(String),

    #[fail(display = "BSP build failed for map `{}`.", 0)]
    BspFailed(String),

    #[fail(display = "BSP builder error: {}", 0)]
    Bsp(String),

    #[fail(display = "Cache archive error: {}", 0)]
    Archive(String),

    #[fail(display = "Corrupt config file: {}", 0)]
    CorruptConfig(String),

    #[fail(display = "Corrupt map source: {}", 0)]
    CorruptSource(String),

    #[fail(display = "I/O error: {}", 0)]
    Io(String),
}

impl ChainErrorKind for ErrorKind {
    type Error = Error;
}

impl ErrorKind {
    pub(crate) fn invalid_reference(what: &'static str, index: u32) -> ErrorKind {
        ErrorKind::InvalidReference { what, index }
    }

    pub(crate) fn invalid_coordinate(x: f64, y: f64) -> ErrorKind {
        ErrorKind::InvalidCoordinate(x.to_string(), y.to_string())
    }

    pub(crate) fn missing_front_side(line: usize) -> ErrorKind {
        ErrorKind::Precondition(format!("line {} has no front side", line + 1))
    }

    pub(crate) fn dangling_reference<N: Debug>(what: &'static str, reference: &N) -> ErrorKind {
        ErrorKind::Precondition(format!("dangling {} reference {:?}", what, reference))
    }

    pub(crate) fn blockmap_too_large(width: f64, height: f64, cell_size: f64) -> ErrorKind {
        ErrorKind::Precondition(format!(
            "map of size {}x{} is too large for a blockmap with {} cell size",
            width, height, cell_size
        ))
    }

    pub(crate) fn on_file_open(path: &Path) -> ErrorKind {
        ErrorKind::Io(format!("Failed to open file `{}`.", path.display()))
    }

    pub(crate) fn on_file_create(path: &Path) -> ErrorKind {
        ErrorKind::Io(format!("Failed to create file `{}`.", path.display()))
    }

    pub(crate) fn on_config_parse() -> ErrorKind {
        ErrorKind::CorruptConfig("Failed to parse config file.".to_owned())
    }

    pub(crate) fn on_source_parse() -> ErrorKind {
        ErrorKind::CorruptSource("Failed to parse map source.".to_owned())
    }

    pub(crate) fn on_archive_write(map_id: &str) -> ErrorKind {
        ErrorKind::Archive(format!("Failed to write cache for map `{}`.", map_id))
    }

    pub(crate) fn on_archive_read(path: &Path) -> ErrorKind {
        ErrorKind::Archive(format!("Failed to read cache `{}`.", path.display()))
    }
}
