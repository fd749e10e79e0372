//! Helpers shared by the `bt` and `tt` tools.

use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

/// Branch prefix for one line of a box-drawing tree. Each flag tells
/// whether the ancestor at that level still has siblings below it.
pub fn padding(out: &mut impl Write, flags: &[bool]) -> io::Result<()> {
    let Some((last, parents)) = flags.split_last() else {
        return Ok(());
    };
    for &more in parents {
        out.write_all(if more { "│  " } else { "   " }.as_bytes())?;
    }
    out.write_all(if *last { "├─ " } else { "└─ " }.as_bytes())
}

/// Log to stderr, filtered by `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(flags: &[bool]) -> String {
        let mut out = Vec::new();
        padding(&mut out, flags).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_padding() {
        assert_eq!(render(&[]), "");
        assert_eq!(render(&[true]), "├─ ");
        assert_eq!(render(&[false]), "└─ ");
        assert_eq!(render(&[true, false, true]), "│     ├─ ");
    }
}
