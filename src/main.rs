use clap::{value_t, App, AppSettings, Arg};
use failure::Fail;
use log::{error, info};
use mapc::{read_map, Compiler, CompilerConfig, Map, MapSource, Result};
use std::path::PathBuf;
use std::process;

pub enum RunMode {
    Compile {
        map_file: PathBuf,
        config_file: Option<PathBuf>,
        id: Option<String>,
        no_cache: bool,
    },
    Inspect {
        cache_file: PathBuf,
    },
}

impl RunMode {
    pub fn from_args() -> RunMode {
        let matches = App::new("Rust Map Compiler")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Compiles editable level descriptions into runtime maps.")
            .settings(&[AppSettings::ColoredHelp])
            .arg(
                Arg::with_name("map")
                    .long("map")
                    .short("m")
                    .help("TOML map source to compile")
                    .value_name("FILE")
                    .required_unless("inspect"),
            )
            .arg(
                Arg::with_name("config")
                    .long("config")
                    .short("c")
                    .help("path to TOML compiler config")
                    .value_name("FILE"),
            )
            .arg(
                Arg::with_name("id")
                    .long("id")
                    .help("map id, overriding the one in the source")
                    .value_name("NAME"),
            )
            .arg(
                Arg::with_name("no-cache")
                    .long("no-cache")
                    .help("do not write the compiled map to the cache"),
            )
            .arg(
                Arg::with_name("inspect")
                    .long("inspect")
                    .help("print a summary of a cached map, then exit")
                    .value_name("FILE")
                    .conflicts_with("map"),
            )
            .get_matches();

        if let Some(cache_file) = matches.value_of("inspect") {
            return RunMode::Inspect {
                cache_file: cache_file.into(),
            };
        }
        RunMode::Compile {
            map_file: value_t!(matches, "map", String)
                .unwrap_or_else(|e| e.exit())
                .into(),
            config_file: matches.value_of("config").map(PathBuf::from),
            id: matches.value_of("id").map(str::to_owned),
            no_cache: matches.is_present("no-cache"),
        }
    }
}

fn summarize(map: &Map) {
    info!("Map '{}':", map.id);
    info!("    {:6} vertices", map.vertices.len());
    info!("    {:6} lines", map.lines.len());
    info!("    {:6} sides", map.sides.len());
    info!("    {:6} sectors", map.sectors.len());
    info!("    {:6} polyobjs", map.polyobjs.len());
    info!("    {:6} subsectors", map.subsectors.len());
    info!(
        "    {:6} window effects",
        map.lines
            .iter()
            .filter(|line| line.window_effect.is_some())
            .count()
    );
    info!(
        "    {}x{} blockmap cells",
        map.line_blockmap.width(),
        map.line_blockmap.height()
    );
}

fn run(mode: RunMode) -> Result<()> {
    match mode {
        RunMode::Compile {
            map_file,
            config_file,
            id,
            no_cache,
        } => {
            let config = match config_file {
                Some(path) => CompilerConfig::from_file(&path)?,
                None => CompilerConfig::default(),
            };
            let source = MapSource::from_file(&map_file)?;
            let id = id
                .or_else(|| source.id.clone())
                .or_else(|| {
                    map_file
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "MAP".to_owned());

            let mut compiler = Compiler::new(config);
            if no_cache {
                compiler = compiler.without_archive();
            }
            compiler.begin_map(&id)?;
            if let Err(e) = source.load_into(&mut compiler) {
                compiler.abort_map();
                return Err(e);
            }
            summarize(compiler.end_map()?);
        }
        RunMode::Inspect { cache_file } => {
            summarize(&read_map(&cache_file)?);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(RunMode::from_args()) {
        error!("{}", e);
        for cause in (&e as &dyn Fail).iter_causes() {
            error!("    caused by: {}", cause);
        }
        process::exit(1);
    }
}
