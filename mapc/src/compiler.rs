use super::archive::{ArchiveWriter, BincodeArchive};
use super::bsp::{BspBuilder, SectorLeafBuilder};
use super::config::CompilerConfig;
use super::dedup::{find_duplicate_vertices, merge_duplicate_vertices};
use super::editmap::EditMap;
use super::errors::{ErrorKind, Result};
use super::finalize::{apply_bsp, build_blockmaps};
use super::finish::finish_sectors;
use super::harden::harden;
use super::map::Map;
use super::owners::build_owner_rings;
use super::properties::PropertyValue;
use super::types::{LineFlags, LineRef, Normal, PolyobjRef, SectorRef, SideFlags, SideRef};
use super::types::{Surface, Tint, VertexRef};
use super::window::detect_window_effects;
use failchain::bail;
use log::{error, info, warn};

/// Drives one map at a time from construction calls to a compiled `Map`.
///
/// Between `begin_map` and `end_map` (or `abort_map`) the compiler owns an editable map that the
/// `create_*` calls fill in. The last successfully compiled map is kept until the next success.
pub struct Compiler {
    config: CompilerConfig,
    bsp: Box<dyn BspBuilder>,
    archive: Option<Box<dyn ArchiveWriter>>,
    editing: Option<EditMap>,
    last_built: Option<Map>,
}

impl Compiler {
    /// A compiler using the sector-leaf BSP builder and, if the config enables the cache, a
    /// `BincodeArchive` in the configured directory.
    pub fn new(config: CompilerConfig) -> Compiler {
        let archive = if config.cache.enabled {
            Some(Box::new(BincodeArchive::new(config.cache.directory.clone()))
                as Box<dyn ArchiveWriter>)
        } else {
            None
        };
        Compiler {
            config,
            bsp: Box::new(SectorLeafBuilder),
            archive,
            editing: None,
            last_built: None,
        }
    }

    pub fn with_bsp_builder<B: BspBuilder + 'static>(mut self, bsp: B) -> Compiler {
        self.bsp = Box::new(bsp);
        self
    }

    pub fn with_archive<A: ArchiveWriter + 'static>(mut self, archive: A) -> Compiler {
        self.archive = Some(Box::new(archive));
        self
    }

    pub fn without_archive(mut self) -> Compiler {
        self.archive = None;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// The map being built, if any.
    pub fn editing(&self) -> Option<&EditMap> {
        self.editing.as_ref()
    }

    pub fn begin_map(&mut self, id: &str) -> Result<()> {
        if let Some(ref current) = self.editing {
            bail!(ErrorKind::AlreadyEditing(current.id().to_owned()));
        }
        info!("Beginning map '{}'.", id);
        self.editing = Some(EditMap::new(id));
        Ok(())
    }

    /// Drops the map being built, if any.
    pub fn abort_map(&mut self) {
        if let Some(map) = self.editing.take() {
            warn!("Aborted map '{}'.", map.id());
        }
    }

    fn edit(&mut self) -> Result<&mut EditMap> {
        match self.editing {
            Some(ref mut map) => Ok(map),
            None => bail!(ErrorKind::NotEditing),
        }
    }

    pub fn create_vertex(&mut self, x: f64, y: f64) -> Result<VertexRef> {
        self.edit()?.create_vertex(x, y)
    }

    pub fn create_vertices(&mut self, coords: &[[f64; 2]]) -> Result<Vec<VertexRef>> {
        self.edit()?.create_vertices(coords)
    }

    pub fn create_sector(&mut self, light: f32, tint: Tint) -> Result<SectorRef> {
        self.edit()?.create_sector(light, tint)
    }

    pub fn create_plane(
        &mut self,
        sector: SectorRef,
        height: f64,
        surface: Surface,
        normal: Normal,
    ) -> Result<u32> {
        self.edit()?.create_plane(sector, height, surface, normal)
    }

    pub fn create_side_def(
        &mut self,
        sector: SectorRef,
        flags: SideFlags,
        top: Surface,
        middle: Surface,
        bottom: Surface,
    ) -> Result<SideRef> {
        self.edit()?.create_side_def(sector, flags, top, middle, bottom)
    }

    pub fn create_line_def(
        &mut self,
        v1: VertexRef,
        v2: VertexRef,
        front: Option<SideRef>,
        back: Option<SideRef>,
        flags: LineFlags,
    ) -> Result<LineRef> {
        self.edit()?.create_line_def(v1, v2, front, back, flags)
    }

    pub fn create_polyobj(
        &mut self,
        lines: &[LineRef],
        tag: i32,
        sequence_type: i32,
        anchor_x: f64,
        anchor_y: f64,
    ) -> Result<PolyobjRef> {
        self.edit()?.create_polyobj(lines, tag, sequence_type, anchor_x, anchor_y)
    }

    pub fn set_game_object_property(
        &mut self,
        object_type: &str,
        index: u32,
        property: &str,
        value: PropertyValue,
    ) -> Result<()> {
        self.edit()?.set_game_object_property(object_type, index, property, value);
        Ok(())
    }

    /// Compiles the map being built. On failure the editable map is consumed and the previously
    /// built map, if any, stays available.
    pub fn end_map(&mut self) -> Result<&Map> {
        let mut edit = match self.editing.take() {
            Some(edit) => edit,
            None => bail!(ErrorKind::NotEditing),
        };
        info!("Compiling map '{}'...", edit.id());

        let duplicates = find_duplicate_vertices(&mut edit);
        merge_duplicate_vertices(&mut edit, &duplicates);
        if self.config.window_effects {
            detect_window_effects(&mut edit);
        }
        build_owner_rings(&mut edit);

        let cell_size = self.config.blockmap_cell_size;
        let mut map = harden(&edit, cell_size)?;
        drop(edit);
        finish_sectors(&mut map);
        build_blockmaps(&mut map, cell_size)?;

        let output = match self.bsp.build(&map) {
            Ok(output) => output,
            Err(cause) => {
                error!(
                    "BSP builder '{}' failed on map '{}': {}",
                    self.bsp.debug_name(),
                    map.id,
                    cause
                );
                bail!(ErrorKind::BspFailed(map.id));
            }
        };
        apply_bsp(&mut map, output);

        if let Some(ref mut archive) = self.archive {
            if let Err(cause) = archive.write_map(&map) {
                error!("Could not cache map '{}': {}", map.id, cause);
            }
        }
        info!("Compiled map '{}'.", map.id);
        Ok(self.last_built.insert(map))
    }

    pub fn last_built_map(&self) -> Option<&Map> {
        self.last_built.as_ref()
    }

    pub fn take_last_built_map(&mut self) -> Option<Map> {
        self.last_built.take()
    }
}

#[cfg(test)]
mod test {
    use super::Compiler;
    use crate::archive::ArchiveWriter;
    use crate::bsp::{BspBuilder, BspOutput};
    use crate::config::CompilerConfig;
    use crate::errors::{ErrorKind, Result};
    use crate::map::Map;
    use crate::properties::PropertyValue;
    use crate::types::{Surface, WHITE};
    use failchain::bail;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FailingBsp;

    impl BspBuilder for FailingBsp {
        fn debug_name(&self) -> &'static str {
            "failing"
        }

        fn build(&mut self, _map: &Map) -> Result<BspOutput> {
            bail!(ErrorKind::Bsp("always fails".to_owned()))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingArchive {
        written: Rc<RefCell<Vec<String>>>,
    }

    impl ArchiveWriter for RecordingArchive {
        fn write_map(&mut self, map: &Map) -> Result<()> {
            self.written.borrow_mut().push(map.id.clone());
            Ok(())
        }
    }

    fn build_square(compiler: &mut Compiler, id: &str) {
        compiler.begin_map(id).expect("test: begin");
        let v = compiler
            .create_vertices(&[[0.0, 0.0], [64.0, 0.0], [64.0, 64.0], [0.0, 64.0]])
            .expect("test: vertices");
        let sector = compiler.create_sector(0.75, WHITE).expect("test: sector");
        compiler
            .create_plane(sector, 0.0, Surface::default(), [0.0, 0.0, 1.0])
            .expect("test: floor");
        compiler
            .create_plane(sector, 96.0, Surface::default(), [0.0, 0.0, -1.0])
            .expect("test: ceiling");
        for i in 0..4 {
            let side = compiler
                .create_side_def(
                    sector,
                    0,
                    Surface::default(),
                    Surface::default(),
                    Surface::default(),
                )
                .expect("test: side");
            compiler
                .create_line_def(v[i], v[(i + 1) % 4], Some(side), None, 0)
                .expect("test: line");
        }
    }

    #[test]
    fn test_square_room() {
        let archive = RecordingArchive::default();
        let mut compiler = Compiler::new(CompilerConfig::default()).with_archive(archive.clone());
        build_square(&mut compiler, "SQUARE");
        compiler
            .set_game_object_property("thing", 1, "type", PropertyValue::Int(1))
            .expect("test: property");

        let map = compiler.end_map().expect("test: end_map failed");
        assert_eq!(map.vertices.len(), 4);
        assert_eq!(map.lines.len(), 4);
        assert_eq!(map.sectors[0].lines, vec![0, 1, 2, 3]);
        assert_eq!(map.sectors[0].bounds.max.x, 64.0);
        let origin = map.sectors[0].sound_origin;
        assert_eq!((origin.x, origin.y, origin.z), (32.0, 32.0, 48.0));
        assert_eq!(map.sectors[0].subsectors, vec![0]);
        assert_eq!(map.subsector_segs(0).len(), 4);
        assert_eq!(
            map.properties.get("thing", 1, "type"),
            Some(&PropertyValue::Int(1))
        );
        assert!(map.lines.iter().all(|line| line.window_effect.is_none()));

        assert!(!compiler.is_editing());
        assert!(compiler.last_built_map().is_some());
        assert_eq!(*archive.written.borrow(), vec!["SQUARE".to_owned()]);
    }

    #[test]
    fn test_empty_map() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        compiler.begin_map("EMPTY").expect("test: begin");
        let map = compiler.end_map().expect("test: empty map failed");
        assert!(map.vertices.is_empty());
        assert!(map.bounds.is_empty());
        assert!(map.line_blockmap.is_empty());
        assert!(map.subsectors.is_empty());
    }

    #[test]
    fn test_bsp_failure_keeps_previous_map() {
        let archive = RecordingArchive::default();
        let mut compiler = Compiler::new(CompilerConfig::default()).with_archive(archive.clone());
        build_square(&mut compiler, "FIRST");
        compiler.end_map().expect("test: first map");

        let mut compiler = compiler.with_bsp_builder(FailingBsp);
        build_square(&mut compiler, "SECOND");
        let error = compiler.end_map().expect_err("test: BSP failure ignored");
        assert_eq!(*error.kind(), ErrorKind::BspFailed("SECOND".to_owned()));
        assert_eq!(
            compiler.last_built_map().map(|map| &map.id[..]),
            Some("FIRST")
        );
        assert!(!compiler.is_editing());
        assert_eq!(*archive.written.borrow(), vec!["FIRST".to_owned()]);

        let previous = compiler.take_last_built_map().expect("test: first map lost");
        assert_eq!(previous.id, "FIRST");
        assert!(compiler.last_built_map().is_none());
    }

    #[test]
    fn test_oversized_map_rejected() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        build_square(&mut compiler, "FIRST");
        compiler.end_map().expect("test: first map");

        compiler.begin_map("HUGE").expect("test: begin");
        let v = compiler
            .create_vertices(&[[0.0, 0.0], [1e30, 0.0], [0.0, 1.0]])
            .expect("test: vertices");
        let sector = compiler.create_sector(1.0, WHITE).expect("test: sector");
        for i in 0..3 {
            let side = compiler
                .create_side_def(
                    sector,
                    0,
                    Surface::default(),
                    Surface::default(),
                    Surface::default(),
                )
                .expect("test: side");
            compiler
                .create_line_def(v[i], v[(i + 1) % 3], Some(side), None, 0)
                .expect("test: line");
        }
        let error = compiler.end_map().expect_err("test: huge map compiled");
        match *error.kind() {
            ErrorKind::Precondition(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
        assert!(!compiler.is_editing());
        assert_eq!(
            compiler.last_built_map().map(|map| &map.id[..]),
            Some("FIRST")
        );
    }

    #[test]
    fn test_editing_state() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        let idle = compiler
            .create_vertex(0.0, 0.0)
            .expect_err("test: created while idle");
        assert_eq!(*idle.kind(), ErrorKind::NotEditing);
        assert!(compiler.end_map().is_err());

        compiler.begin_map("ONE").expect("test: begin");
        let twice = compiler.begin_map("TWO").expect_err("test: began twice");
        assert_eq!(*twice.kind(), ErrorKind::AlreadyEditing("ONE".to_owned()));

        compiler.create_vertex(1.0, 2.0).expect("test: vertex");
        compiler.abort_map();
        assert!(!compiler.is_editing());
        compiler.begin_map("TWO").expect("test: begin after abort");
        assert_eq!(compiler.editing().map(|map| map.vertices().len()), Some(0));
    }

    #[test]
    fn test_duplicate_vertices_merged() {
        let mut compiler = Compiler::new(CompilerConfig::default());
        compiler.begin_map("DUP").expect("test: begin");
        let v = compiler
            .create_vertices(&[[0.0, 0.0], [64.0, 0.0], [0.0, 64.0], [0.5, 0.25]])
            .expect("test: vertices");
        let sector = compiler.create_sector(1.0, WHITE).expect("test: sector");
        let outline = [(v[0], v[1]), (v[1], v[2]), (v[2], v[3])];
        for &(from, to) in &outline {
            let side = compiler
                .create_side_def(
                    sector,
                    0,
                    Surface::default(),
                    Surface::default(),
                    Surface::default(),
                )
                .expect("test: side");
            compiler
                .create_line_def(from, to, Some(side), None, 0)
                .expect("test: line");
        }
        let map = compiler.end_map().expect("test: end_map failed");
        assert_eq!(map.vertices.len(), 3);
        assert_eq!(map.lines[2].v[1], map.lines[0].v[0]);
        for vertex in 0..map.vertices.len() {
            assert_eq!(map.vertex_owners(vertex).count(), 2);
        }
    }
}
