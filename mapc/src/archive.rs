use super::errors::{ErrorKind, Result};
use super::map::Map;
use bincode;
use failchain::{ensure, ResultExt};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CACHE_MAGIC: [u8; 4] = *b"MAPC";
pub const CACHE_VERSION: u32 = 1;

/// Persists compiled maps.
pub trait ArchiveWriter {
    fn write_map(&mut self, map: &Map) -> Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct CacheHeader {
    magic: [u8; 4],
    version: u32,
}

/// Writes one `bincode` file per map id into a directory.
#[derive(Clone, Debug)]
pub struct BincodeArchive {
    directory: PathBuf,
}

impl BincodeArchive {
    pub fn new<P: Into<PathBuf>>(directory: P) -> BincodeArchive {
        BincodeArchive {
            directory: directory.into(),
        }
    }


    pub fn path_for(&self, map_id: &str) -> PathBuf {
        let name = map_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect::<String>();
        self.directory.join(format!("{}.mapc", name))
    }
}

impl ArchiveWriter for BincodeArchive {
    fn write_map(&mut self, map: &Map) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .chain_err(|| ErrorKind::on_file_create(&self.directory))?;
        let path = self.path_for(&map.id);
        let mut file = BufWriter::new(
            File::create(&path).chain_err(|| ErrorKind::on_file_create(&path))?,
        );
        let header = CacheHeader {
            magic: CACHE_MAGIC,
            version: CACHE_VERSION,
        };
        bincode::serialize_into(&mut file, &header)
            .chain_err(|| ErrorKind::on_archive_write(&map.id))?;
        bincode::serialize_into(&mut file, map).chain_err(|| ErrorKind::on_archive_write(&map.id))?;
        file.flush().chain_err(|| ErrorKind::on_archive_write(&map.id))?;
        info!("Cached map '{}' in {:?}.", map.id, path);
        Ok(())
    }
}

/// Reads a map written by `BincodeArchive`, rejecting files from other versions.
pub fn read_map(path: &Path) -> Result<Map> {
    let mut file = BufReader::new(File::open(path).chain_err(|| ErrorKind::on_file_open(path))?);
    let header: CacheHeader =
        bincode::deserialize_from(&mut file).chain_err(|| ErrorKind::on_archive_read(path))?;
    ensure!(
        header.magic == CACHE_MAGIC && header.version == CACHE_VERSION,
        ErrorKind::Archive(format!(
            "`{}` is not a version {} map cache.",
            path.display(),
            CACHE_VERSION
        ))
    );
    bincode::deserialize_from(&mut file).chain_err(|| ErrorKind::on_archive_read(path))
}

#[cfg(test)]
mod test {
    use super::{read_map, ArchiveWriter, BincodeArchive};
    use crate::compiler::Compiler;
    use crate::config::CompilerConfig;
    use crate::types::{Surface, WHITE};
    use std::env;
    use std::fs;

    #[test]
    fn test_cache_round_trip() {
        let directory = env::temp_dir().join(format!("mapc-archive-test-{}", std::process::id()));
        let mut compiler = Compiler::new(CompilerConfig::default());
        compiler.begin_map("E1M1").expect("test: begin");
        let v = compiler
            .create_vertices(&[[0.0, 0.0], [64.0, 0.0], [0.0, 64.0]])
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
        let map = compiler.end_map().expect("test: end").clone();

        let mut archive = BincodeArchive::new(&directory);
        archive.write_map(&map).expect("test: write");
        let path = archive.path_for("E1M1");
        let read = read_map(&path).expect("test: read");
        assert_eq!(read, map);

        fs::write(&path, b"not a cache").expect("test: overwrite");
        assert!(read_map(&path).is_err());
        fs::remove_dir_all(&directory).expect("test: cleanup");
    }

    #[test]
    fn test_path_sanitized() {
        let archive = BincodeArchive::new("cache");
        assert_eq!(
            archive.path_for("maps/E1 M1"),
            std::path::Path::new("cache").join("maps_E1_M1.mapc")
        );
    }
}
