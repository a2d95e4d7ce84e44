//! Octree file inspection utility
//!
//! Loads a saved octree and prints a summary of its cells and primitives.
//!
//! Usage:
//!     octree_info [OPTIONS] <FILE>
//!
//! Options:
//!     --json                  Print the stats report as JSON
//!     --verify                Check the fingerprint and invariants only
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use octcull::core::logging;
use octcull::octree::Octree;

fn print_help() {
    eprintln!("octree_info - Octree file inspection utility");
    eprintln!();
    eprintln!("Usage: octree_info [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --json                  Print the stats report as JSON");
    eprintln!("    --verify                Check the fingerprint and invariants only");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    octree_info scene.oct");
    eprintln!("    octree_info --json scene.oct > stats.json");
}

#[derive(Debug)]
struct Args {
    path: PathBuf,
    json: bool,
    verify: bool,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing octree file".to_string());
    }

    let mut json = false;
    let mut verify = false;
    let mut path: Option<PathBuf> = None;

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--json" => json = true,
            "--verify" => verify = true,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            file => {
                if path.is_some() {
                    return Err("Multiple octree files specified".to_string());
                }
                path = Some(PathBuf::from(file));
            }
        }
    }

    let path = path.ok_or("Missing octree file")?;
    Ok(Args { path, json, verify })
}

fn print_summary(octree: &Octree) {
    let stats = octree.stats();
    println!("Bounds: {:?} .. {:?}", octree.min, octree.max);
    println!("Max level: {}", stats.max_level);
    println!("Node transforms: {}", octree.transforms.len());
    println!(
        "Stored data: graphics={} collisions={}",
        octree.options.graphics(),
        octree.options.collisions()
    );
    println!();
    println!("Cells: {}", stats.cell_count);
    for (level, (total, filled)) in stats
        .cells_per_level
        .iter()
        .zip(&stats.non_empty_cells_per_level)
        .enumerate()
    {
        println!("  level {}: {:>6} cells, {:>6} with geometry", level, total, filled);
    }
    println!();
    println!("Primitives: {}", stats.primitive_count);
    println!("Leaf triangles: {} opaque, {} transparent", stats.leaf_opaque_triangles, stats.leaf_transparent_triangles);
    println!("Collision triangles: {}", stats.collision_triangles);
    println!(
        "Buffers: {:.2} MB vertices, {:.2} MB indices",
        stats.vertex_bytes as f64 / (1024.0 * 1024.0),
        stats.index_bytes as f64 / (1024.0 * 1024.0)
    );
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let octree = match Octree::load(&args.path) {
        Ok(octree) => octree,
        Err(e) => {
            eprintln!("Error loading {}: {}", args.path.display(), e);
            std::process::exit(if e.is_fatal() { 2 } else { 1 });
        }
    };

    if args.verify {
        println!("{}: OK ({:.2}s)", args.path.display(), start.elapsed().as_secs_f64());
        return;
    }

    if args.json {
        match serde_json::to_string_pretty(&octree.stats()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing stats: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Octree: {}", args.path.display());
    println!("=======");
    print_summary(&octree);
}
