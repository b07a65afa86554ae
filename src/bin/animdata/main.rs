//! animdata CLI - Tool for inspecting animation clips and placement definitions.

use std::env;
use std::path::Path;
use std::sync::Arc;

use animdata::clip::{Clip, EventRegistry};
use animdata::core::{ClipCache, LoadOptions};
use animdata::eval::{Animator, PartSnapshot};
use animdata::format::{decode_clip, encode_clip};
use animdata::space::{PlacementDef, RequirementRole};
use animdata::util::Mat4;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - show clip summary
        "info" | "i" => {
            let path = require_arg(&filtered_args, 1, "animdata info <clip.anim>");
            cmd_info(path);
        }

        // Tree command - show part hierarchy
        "tree" | "t" => {
            let path = require_arg(&filtered_args, 1, "animdata tree <clip.anim>");
            cmd_tree(path);
        }

        // Events command - list events, optionally in a window
        "events" | "e" => {
            let path = require_arg(&filtered_args, 1, "animdata events <clip.anim> [start end]");
            let window = match (filtered_args.get(2), filtered_args.get(3)) {
                (Some(start), Some(end)) => Some((parse_time(start), parse_time(end))),
                _ => None,
            };
            cmd_events(path, window);
        }

        // Sample command - composed snapshots at a time
        "sample" | "s" => {
            let usage = "animdata sample <clip.anim> <time> [--mirror-x] [--mirror-y] [--json]";
            let path = require_arg(&filtered_args, 1, usage);
            let time = parse_time(require_arg(&filtered_args, 2, usage));
            let flags = &filtered_args[3..];
            cmd_sample(
                path,
                time,
                flags.contains(&"--mirror-x"),
                flags.contains(&"--mirror-y"),
                flags.contains(&"--json"),
            );
        }

        // Copy command - decode then re-encode
        "copy" | "c" => {
            let usage = "animdata copy <in.anim> <out.anim>";
            let input = require_arg(&filtered_args, 1, usage);
            let output = require_arg(&filtered_args, 2, usage);
            cmd_copy(input, output);
        }

        // Placement command - check a placement definition
        "placement" | "p" => {
            let path = require_arg(&filtered_args, 1, "animdata placement <def.json>");
            cmd_placement(path);
        }

        "help" | "h" | "-h" | "--help" => print_help(),

        // Passing a clip directly is the same as 'info'
        path if path.ends_with(".anim") => cmd_info(path),

        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'animdata help' for usage");
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("animdata - animation clip toolkit");
    println!();
    println!("USAGE:");
    println!("    animdata [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info      <clip>                  Show clip summary");
    println!("    t, tree      <clip>                  Show part hierarchy");
    println!("    e, events    <clip> [start end]      List events, optionally in a time window");
    println!("    s, sample    <clip> <time> [flags]   Show composed part snapshots at a time");
    println!("    c, copy      <in> <out>              Decode and re-encode a clip");
    println!("    p, placement <def.json>              Check a placement definition");
    println!("    h, help                              Show this help");
    println!();
    println!("SAMPLE FLAGS:");
    println!("    --mirror-x   Mirror along X");
    println!("    --mirror-y   Mirror along Y");
    println!("    --json       Print JSON");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("RUST_LOG overrides the log level when set.");
}

fn require_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> &'a str {
    match args.get(index) {
        Some(arg) => arg,
        None => {
            eprintln!("Error: missing argument");
            eprintln!("Usage: {}", usage);
            std::process::exit(1);
        }
    }
}

fn parse_time(s: &str) -> f32 {
    match s.parse() {
        Ok(t) => t,
        Err(_) => {
            eprintln!("Error: '{}' is not a time in seconds", s);
            std::process::exit(1);
        }
    }
}

fn open_clip(path: &str) -> Arc<Clip> {
    info!("Opening clip: {}", path);
    let cache = ClipCache::new();
    match cache.load(path, LoadOptions::UNCACHED) {
        Ok(clip) => clip,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str) {
    let clip = open_clip(path);

    let mut animated = 0;
    let mut constant = 0;
    for part in clip.parts() {
        for (_, curve) in part.curves() {
            if curve.as_constant().is_some() {
                constant += 1;
            } else if !curve.is_empty() {
                animated += 1;
            }
        }
    }

    println!("Clip: {}", clip.name());
    println!("File: {}", path);
    println!("Duration: {:.3}s", clip.duration());
    println!("Parts: {} ({} roots)", clip.parts().len(), clip.roots().count());
    println!("Events: {}", clip.events().len());
    println!("Curves: {} animated, {} constant", animated, constant);
    if !clip.validate() {
        println!("Warning: duration is shorter than the last key ({:.3}s)", clip.max_key_time());
    }
}

fn cmd_tree(path: &str) {
    let clip = open_clip(path);
    println!("Clip: {}", clip.name());
    println!();
    for root in clip.roots() {
        print_tree(&clip, root.index(), 0);
    }
}

fn print_tree(clip: &Clip, index: usize, depth: usize) {
    let Some(part) = clip.part(index) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let texture = match &part.texture_path {
        Some(t) => format!(" [{}]", t),
        None => String::new(),
    };
    let keyed = part.curves().filter(|(_, c)| !c.is_empty()).count();
    println!("{}{} ({} curves){}", indent, part.name(), keyed, texture);
    for child in clip.children_of(index) {
        print_tree(clip, child.index(), depth + 1);
    }
}

fn cmd_events(path: &str, window: Option<(f32, f32)>) {
    let clip = open_clip(path);
    let events: Vec<_> = match window {
        Some((start, end)) => clip.events_in_window(start, end).collect(),
        None => clip.events().iter().collect(),
    };
    println!("Clip: {} ({} events)", clip.name(), events.len());
    for event in events {
        println!("  {}", event);
    }
}

fn cmd_sample(path: &str, time: f32, mirror_x: bool, mirror_y: bool, json_mode: bool) {
    let clip = open_clip(path);
    let mut animator = Animator::new(&clip);
    animator.set_mirror(mirror_x, mirror_y);
    animator.seek(time);
    let frame = animator.frame();
    debug!("Composed {} snapshots", frame.len());

    if json_mode {
        let parts: Vec<serde_json::Value> = frame.iter().map(snapshot_json).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "clip": clip.name(),
                "time": time,
                "mirror": [mirror_x, mirror_y],
                "parts": parts,
            }))
            .unwrap_or_default()
        );
    } else {
        println!("Clip: {} at {:.3}s", clip.name(), time);
        println!();
        for snap in &frame {
            let p = snap.world_position(&Mat4::IDENTITY, animdata::util::Vec3::ZERO);
            println!(
                "{}{} pos=({:.3}, {:.3}, {:.3}) yaw={:.1} color={:?}",
                if snap.active { "  " } else { "- " },
                snap.part_name.as_deref().unwrap_or("?"),
                p.x,
                p.y,
                p.z,
                snap.world_rotation(&Mat4::IDENTITY),
                snap.color.to_array(),
            );
        }
    }
}

fn snapshot_json(snap: &PartSnapshot) -> serde_json::Value {
    serde_json::json!({
        "name": snap.part_name,
        "texture": snap.texture_path,
        "active": snap.active,
        "flip": [snap.flip_x, snap.flip_y],
        "color": snap.color.to_array(),
        "data": [snap.data_a, snap.data_b, snap.data_c],
        "local_position": snap.local_position.to_array(),
        "local_rotation": snap.local_rotation.to_array(),
        "local_scale": snap.local_scale.to_array(),
        "world": snap.world_matrix.to_cols_array_2d(),
    })
}

fn cmd_copy(input: &str, output: &str) {
    let clip = open_clip(input);
    let bytes = match encode_clip(&clip) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to encode {}: {}", clip.name(), e);
            std::process::exit(1);
        }
    };

    // Re-read what we wrote before touching the output file.
    match decode_clip(&bytes, &EventRegistry::default()) {
        Ok(back) if back == *clip => debug!("Round-trip check passed"),
        Ok(_) => {
            eprintln!("Round-trip mismatch for {}", input);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to re-read encoded clip: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(Path::new(output), &bytes) {
        eprintln!("Failed to write {}: {}", output, e);
        std::process::exit(1);
    }
    println!("Wrote {} ({} bytes, {} parts)", output, bytes.len(), clip.parts().len());
}

fn cmd_placement(path: &str) {
    let def = match PlacementDef::load(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("Placement: {} ({:?}, {} pawns, p={})", def.name, def.kind, def.pawn_count, def.relative_probability);
    println!("Data: {}", def.full_data_path("<root>").display());

    for pawn in (0..def.pawn_count.min(256)).map(|p| p as u8) {
        let start = def.try_get_cell(RequirementRole::PawnStart, pawn, false, false);
        let end = def.try_get_cell(RequirementRole::PawnEnd, pawn, false, false);
        println!("  pawn {}: start {:?} end {:?}", pawn, start, end);
    }
    let clear: Vec<_> = def.must_be_clear_cells(false, false, Default::default()).collect();
    println!("  must be clear: {} cells", clear.len());

    let errors = def.config_errors();
    if errors.is_empty() {
        println!("No config errors");
    } else {
        println!("Config errors:");
        for e in &errors {
            println!("  {}", e);
        }
        std::process::exit(2);
    }
}
