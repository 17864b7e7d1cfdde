use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use brushgeo::{build_map, BuildConfig, EntityBuild};

/// Converts a Valve-220 `.map` file into per-texture triangle meshes.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the input .map file.
    path: PathBuf,
    /// Swaps Y and Z on every brush plane point before clipping.
    #[arg(long)]
    swap_yz: bool,
    /// Disables snapping emitted positions to the nearest world unit.
    #[arg(long)]
    no_snap: bool,
    /// Writes the combined geometry of every entity as a Wavefront OBJ.
    #[arg(long)]
    dump_obj: Option<PathBuf>,
    /// Enables debug-level tracing.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("brushgeo=debug")
    } else {
        EnvFilter::new("brushgeo=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = BuildConfig::default();
    config.parse.swap_yz = args.swap_yz;
    config.mesher.snap_positions = !args.no_snap;

    let parse_options = config.parse;
    let map = map::Map::from_file(&args.path, parse_options)
        .with_context(|| format!("failed to load {}", args.path.display()))?;

    let build = build_map(&map, &config);

    report_entity("worldspawn", &build.world);
    for (classname, entities) in &build.entities_by_class {
        for (i, entity) in entities.iter().enumerate() {
            report_entity(&format!("{classname}[{i}]"), entity);
        }
    }

    if let Some(obj_path) = &args.dump_obj {
        let obj = dump_obj(&build);
        fs::write(obj_path, obj)
            .with_context(|| format!("failed to write {}", obj_path.display()))?;
        info!(path = %obj_path.display(), "wrote OBJ dump");
    }

    Ok(())
}

fn report_entity(label: &str, build: &EntityBuild) {
    let triangles: usize = build
        .meshes
        .iter()
        .map(|m| m.indices.len() / 3)
        .sum();
    let vertices: usize = build.meshes.iter().map(|m| m.positions.len()).sum();

    println!(
        "{label}: {} texture(s), {triangles} triangle(s), {vertices} vertex/vertices, {} warning(s), {} error(s)",
        build.meshes.len(),
        build.warnings.len(),
        build.errors.len(),
    );
    for warning in &build.warnings {
        println!("  warning: {warning}");
    }
    for error in &build.errors {
        println!("  error: {error}");
    }
}

/// Renders every entity's meshes as one Wavefront OBJ, offsetting each
/// texture mesh's indices by the running vertex count.
fn dump_obj(build: &brushgeo::MapBuild) -> String {
    let mut out = String::new();
    let mut next_index = 1usize; // OBJ indices are 1-based

    let mut emit = |out: &mut String, next_index: &mut usize, entity: &EntityBuild, label: &str| {
        for mesh in &entity.meshes {
            out.push_str(&format!("g {label}_{}\n", mesh.texture_id));
            for p in &mesh.positions {
                out.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
            }
            for uv in &mesh.uvs {
                out.push_str(&format!("vt {} {}\n", uv[0], uv[1]));
            }
            for tri in mesh.indices.chunks_exact(3) {
                out.push_str(&format!(
                    "f {}/{} {}/{} {}/{}\n",
                    *next_index + tri[0] as usize,
                    *next_index + tri[0] as usize,
                    *next_index + tri[1] as usize,
                    *next_index + tri[1] as usize,
                    *next_index + tri[2] as usize,
                    *next_index + tri[2] as usize,
                ));
            }
            *next_index += mesh.positions.len();
        }
    };

    emit(&mut out, &mut next_index, &build.world, "worldspawn");
    for (classname, entities) in &build.entities_by_class {
        for (i, entity) in entities.iter().enumerate() {
            emit(&mut out, &mut next_index, entity, &format!("{classname}_{i}"));
        }
    }

    out
}
