use super::blockmap::Blockmap;
use super::bsp::BspOutput;
use super::errors::Result;
use super::map::{Map, Vertex};
use log::{info, warn};
use math::Aabb2;

fn vertex_bounds(map: &Map) -> Aabb2 {
    Aabb2::from_points(map.vertices.iter().map(|vertex| vertex.pos))
}

/// Computes the map bounds and links lines and polyobjects into grids over them.
pub fn build_blockmaps(map: &mut Map, cell_size: f64) -> Result<()> {
    map.bounds = vertex_bounds(map);

    let mut lines = Blockmap::new(&map.bounds, cell_size)?;
    let mut polyobjs = lines.same_grid();
    for (i_line, line) in map.lines.iter().enumerate() {
        let (from, to) = map.line_points(line);
        lines.link_segment(i_line, from, to);
    }
    for (i_polyobj, polyobj) in map.polyobjs.iter().enumerate() {
        for &line in &polyobj.lines {
            let (from, to) = map.line_points(&map.lines[line]);
            polyobjs.link_segment(i_polyobj, from, to);
        }
    }
    info!(
        "Built {}x{} blockmaps with {} cell size.",
        lines.width(),
        lines.height(),
        lines.cell_size()
    );
    map.line_blockmap = lines;
    map.polyobj_blockmap = polyobjs;
    Ok(())
}

/// Moves the BSP builder's output into the map and derives everything that depends on it.
pub fn apply_bsp(map: &mut Map, output: BspOutput) {
    let BspOutput {
        new_vertices,
        segs,
        subsectors,
        nodes,
    } = output;
    let num_new_vertices = new_vertices.len();
    map.vertices
        .extend(new_vertices.into_iter().map(|pos| Vertex {
            pos,
            first_owner: None,
            num_owners: 0,
        }));
    map.segs = segs;
    map.subsectors = subsectors;
    map.nodes = nodes;

    let Map {
        ref mut sectors,
        ref subsectors,
        ..
    } = *map;
    for sector in sectors.iter_mut() {
        sector.subsectors.clear();
    }
    for (i_subsector, subsector) in subsectors.iter().enumerate() {
        let sector = match subsector.sector {
            Some(sector) if sector < sectors.len() => sector,
            _ => {
                warn!("Subsector {} does not belong to a sector.", i_subsector);
                continue;
            }
        };
        sectors[sector].subsectors.push(i_subsector);
    }

    map.bounds = vertex_bounds(map);
    let mut subsectors = map.line_blockmap.same_grid();
    for (i_subsector, subsector) in map.subsectors.iter().enumerate() {
        subsectors.link_box(i_subsector, &subsector.bounds);
    }
    map.subsector_blockmap = subsectors;

    info!(
        "Finalized map '{}': {} BSP vertices, {} segs, {} subsectors, {} nodes.",
        map.id,
        num_new_vertices,
        map.segs.len(),
        map.subsectors.len(),
        map.nodes.len()
    );
}
