//! bt - inspect and generate BT files
//!
//! Usage:
//!   bt info <file>               header summary
//!   bt tree <file> [--depth N]   structure of the stored tree
//!   bt show <file> [--depth N]   info followed by tree
//!   bt make <file> [--config C]  write a demo file with every node type
//!   bt version | help
//!
//! Set RUST_LOG=tagtree=debug to see section deduplication decisions.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

mod common;

use common::padding;
use tagtree::binary::{
    endianness_name, native_endianness, Header, MappedFile, NodeView, SectionArena, Tag,
    WriteConfig, FORMAT_VERSION, HEADER_SIZE,
};

const DEFAULT_DEPTH: usize = 3;

// ============================================================================
// Tree printer
// ============================================================================

fn elided(out: &mut impl Write, flags: &mut Vec<bool>, count: usize) -> io::Result<()> {
    flags.push(false);
    padding(out, flags)?;
    writeln!(out, "(... {} more)", count)?;
    flags.pop();
    Ok(())
}

fn visit(out: &mut impl Write, node: NodeView<'_>, depth: usize, flags: &mut Vec<bool>) -> Result<()> {
    write!(out, "{}", node.name())?;

    match node.variant() {
        Some(Tag::Bool) => writeln!(out, " {}", node.as_bool()?)?,
        Some(Tag::Int8) => writeln!(out, " {}", node.as_i8()?)?,
        Some(Tag::Int16) => writeln!(out, " {}", node.as_i16()?)?,
        Some(Tag::Int32) => writeln!(out, " {}", node.as_i32()?)?,
        Some(Tag::Int64) => writeln!(out, " {}", node.as_i64()?)?,
        Some(Tag::Float32) => writeln!(out, " {}", node.as_f32()?)?,
        Some(Tag::Float64) => writeln!(out, " {}", node.as_f64()?)?,
        Some(Tag::Text) => writeln!(out, " \"{}\"", node.as_text()?.to_string_lossy())?,
        Some(Tag::Dict) => {
            let dict = node.as_dict()?;
            writeln!(out, " ({} entries)", dict.len())?;

            if flags.len() > depth && !dict.is_empty() {
                elided(out, flags, dict.len())?;
                return Ok(());
            }

            let mut remaining = dict.len();
            for (key, child) in dict {
                remaining -= 1;
                flags.push(remaining > 0);
                padding(out, flags)?;
                write!(out, "{} ", key)?;
                visit(out, child, depth, flags)?;
                flags.pop();
            }
        }
        Some(Tag::List) => {
            let list = node.as_list()?;
            writeln!(out, "<{}> ({} entries)", list.element_name(), list.len())?;

            if flags.len() > depth && !list.is_empty() {
                elided(out, flags, list.len())?;
                return Ok(());
            }

            let mut remaining = list.len();
            for (index, child) in list.iter().enumerate() {
                remaining -= 1;
                flags.push(remaining > 0);
                padding(out, flags)?;
                write!(out, "{} ", index)?;
                visit(out, child, depth, flags)?;
                flags.pop();
            }
        }
        None => writeln!(out, " (tag 0x{:02x})", node.tag())?,
    }

    Ok(())
}

// ============================================================================
// Modes
// ============================================================================

/// Returns false when the file cannot be read by this build.
fn info(out: &mut impl Write, path: &Path) -> Result<bool> {
    let file = MappedFile::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let bytes = file.bytes();

    if bytes.len() < HEADER_SIZE {
        writeln!(
            out,
            "Not a valid BT file, expected at least {} bytes! Aborting...",
            HEADER_SIZE
        )?;
        return Ok(false);
    }

    let header = Header::decode(bytes)?;
    writeln!(
        out,
        "Size             : {} bytes ({} bytes of data)",
        bytes.len(),
        bytes.len() - HEADER_SIZE
    )?;
    writeln!(out, "Version    +0x04 : BT v{}", header.version)?;
    writeln!(out, "Endianness +0x05 : {}", endianness_name(header.endian))?;
    writeln!(out, "Flags      +0x06 : {}", header.flags)?;
    writeln!(out, "Root       +0x08 : 0x{:x}", header.root_offset)?;

    if !header.readable() {
        writeln!(out, "Encoding differs, this file can't be read! Aborting...")?;
        return Ok(false);
    }
    Ok(true)
}

fn tree(out: &mut impl Write, path: &Path, depth: usize) -> Result<()> {
    let file = MappedFile::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let root = file.document()?.root()?;
    visit(out, root, depth, &mut Vec::new())
}

/// Demo document containing at least one node of every type. Dicts 3 and 8
/// and the repeated text are identical, so they end up deduplicated.
fn make(path: &Path, config: &WriteConfig) -> Result<()> {
    let mut arena = SectionArena::new();
    let mut root = arena.root()?.dict();
    root.put(1)?.float64(213.7);
    root.put(2)?.float32(423.6);

    {
        let mut text = root.put(4)?.dict();
        text.put(0)?.text("Hello World!")?;
        text.put(1)?.text("Bit by bit into the abyss!")?;
        let mut lines = text.put(2)?.list(Tag::Text);
        lines.push_text("I see you're driven by your detestation")?;
        lines.push_text("Your every step is stoked with animus")?;
        lines.push_text("You need a different type of motivation")?;
        lines.push_text("Or there's no way that you can handle this")?;
    }

    for key in [3, 8] {
        let mut numbers = root.put(key)?.dict();
        numbers.put(0)?.int64(0x0AAA_AAAA_AAAA_AAAA);
        numbers.put(1)?.int32(0x0BBB_BBBB);
        numbers.put(2)?.int16(0x0CCC);
        numbers.put(3)?.int8(0x0D);
    }

    root.put(5)?.text("Bit by bit into the abyss!")?;
    root.put(6)?.bool(true);

    {
        let mut points = root.put(7)?.list(Tag::Dict);
        for (x, y) in [(1.0f32, 2.0f32), (3.5, -1.25)] {
            let mut point = points.push_dict()?;
            point.put(0)?.float32(x);
            point.put(1)?.float32(y);
        }
    }

    let emission = arena.emit(config)?;
    std::fs::write(path, &emission.bytes)
        .with_context(|| format!("cannot write {}", path.display()))?;

    tracing::info!(
        "wrote {} bytes (dedup hits: {}, skipped: {} bytes)",
        emission.bytes.len(),
        emission.stats.hits,
        emission.stats.bytes_skipped
    );
    println!("File generated, it contains at least one instance of each node type.");
    println!("You can display it using 'bt show {}'", path.display());
    Ok(())
}

fn version() {
    println!(
        "BT v{} ({})",
        FORMAT_VERSION,
        endianness_name(native_endianness())
    );
}

fn usage(hint: bool) {
    println!("Usage: bt <mode> [file] [options]");
    if hint {
        println!("Try 'bt help' for more details");
    }
}

fn help() {
    usage(false);
    println!("A helper utility for the BT binary tree format");
    println!();
    println!("Modes:");
    println!("   version     : Show version and exit");
    println!("   help        : Show this page and exit");
    println!("   info <file> : Show basic stats about a BT file");
    println!("   tree <file> : Show the structure stored in given file");
    println!("   show <file> : Show a combination of the 'info' and 'tree' modes");
    println!("   make <file> : Generate an example file and exit");
    println!();
    println!("Options:");
    println!("   --depth N   : Nesting shown by 'tree' and 'show' (default {})", DEFAULT_DEPTH);
    println!("   --config C  : JSON write configuration used by 'make'");
}

// ============================================================================
// Entry point
// ============================================================================

fn option<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn run(args: &[String]) -> Result<i32> {
    let depth = match option(args, "--depth") {
        Some(value) => value
            .parse::<usize>()
            .with_context(|| format!("invalid --depth '{}'", value))?,
        None => DEFAULT_DEPTH,
    };

    let mode = args.first().map(String::as_str);
    let file = args.get(1).filter(|a| !a.starts_with("--")).map(PathBuf::from);
    let mut stdout = io::stdout().lock();

    match (mode, file) {
        (Some("help"), _) => help(),
        (Some("version"), _) => version(),
        (Some("info"), Some(path)) => {
            if !info(&mut stdout, &path)? {
                return Ok(1);
            }
        }
        (Some("tree"), Some(path)) => tree(&mut stdout, &path, depth)?,
        (Some("show"), Some(path)) => {
            if !info(&mut stdout, &path)? {
                return Ok(1);
            }
            writeln!(stdout)?;
            tree(&mut stdout, &path, depth)?;
        }
        (Some("make"), Some(path)) => {
            let config = match option(args, "--config") {
                Some(config) => WriteConfig::read_from(Path::new(config))
                    .with_context(|| format!("cannot load config {}", config))?,
                None => WriteConfig::default(),
            };
            make(&path, &config)?;
        }
        (Some(other), None) if ["info", "tree", "show", "make"].contains(&other) => {
            bail!("mode '{}' needs a file argument", other)
        }
        _ => {
            usage(true);
            return Ok(1);
        }
    }

    Ok(0)
}

fn main() {
    common::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(1);
        }
    }
}
