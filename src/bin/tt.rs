//! tt - validate and print TT files
//!
//! Usage:
//!   tt check <file>   parse the file and report the first error
//!   tt tree <file>    print the parsed structure
//!   tt fmt <file>     print the file in canonical TT layout

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;

mod common;

use common::padding;
use tagtree::text::{read_text_file, TextDict, TextValue};
use tagtree::TreeError;

fn visit(out: &mut impl Write, value: &TextValue, flags: &mut Vec<bool>) -> io::Result<()> {
    write!(out, "{}", value.variant())?;

    match value {
        TextValue::Bool(v) => writeln!(out, " {}", v),
        TextValue::String(v) => writeln!(out, " \"{}\"", v),
        TextValue::Integer(v) => writeln!(out, " {}", v),
        TextValue::Number(v) => writeln!(out, " {:?}", v),
        TextValue::List(list) => {
            writeln!(out, " ({} entries)", list.len())?;
            let mut remaining = list.len();
            for (index, item) in list.iter().enumerate() {
                remaining -= 1;
                flags.push(remaining > 0);
                padding(out, flags)?;
                write!(out, "{} ", index)?;
                visit(out, item, flags)?;
                flags.pop();
            }
            Ok(())
        }
        TextValue::Dict(dict) => visit_dict(out, dict, flags),
    }
}

fn visit_dict(out: &mut impl Write, dict: &TextDict, flags: &mut Vec<bool>) -> io::Result<()> {
    writeln!(out, " ({} entries)", dict.len())?;
    let mut remaining = dict.len();
    for (key, item) in dict.sorted() {
        remaining -= 1;
        flags.push(remaining > 0);
        padding(out, flags)?;
        write!(out, "{} ", key)?;
        visit(out, item, flags)?;
        flags.pop();
    }
    Ok(())
}

fn usage() {
    println!("Usage: tt <check|tree|fmt> <file>");
}

/// Parse `path`, printing positioned errors the way compilers do.
fn load(path: &Path) -> Result<Option<TextDict>> {
    match read_text_file(path) {
        Ok(dict) => Ok(Some(dict)),
        Err(TreeError::Parse(err)) => {
            eprintln!("{}", err.located(&path.display().to_string()));
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn run(args: &[String]) -> Result<i32> {
    let (Some(mode), Some(file)) = (args.first(), args.get(1)) else {
        usage();
        return Ok(1);
    };
    let path = Path::new(file);

    if !["check", "tree", "fmt"].contains(&mode.as_str()) {
        usage();
        return Ok(1);
    }

    let Some(dict) = load(path)? else {
        return Ok(1);
    };

    let mut stdout = io::stdout().lock();
    match mode.as_str() {
        "check" => writeln!(stdout, "{}: ok ({} top-level keys)", path.display(), dict.len())?,
        "tree" => {
            write!(stdout, "Dict")?;
            visit_dict(&mut stdout, &dict, &mut Vec::new())?;
        }
        _ => writeln!(stdout, "{}", dict)?,
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
