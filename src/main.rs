use std::path::PathBuf;
use std::process;

use anyhow::Context;

use bindweld::{Model, Target};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") || args.is_empty() {
        print_help();
        return;
    }

    match parse_args(&args).and_then(run) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("[ERROR] {e:#}");
            process::exit(1);
        }
    }
}

#[derive(Debug)]
struct Options {
    target: Option<Target>,
    source: PathBuf,
    dest: PathBuf,
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut target = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-g" {
            let value = iter
                .next()
                .context("-g expects a generator name (c or rust)")?;
            target = Some(match value.as_str() {
                "c" => Target::C,
                "rust" => Target::Rust,
                other => anyhow::bail!("unknown generator '{other}' (expected c or rust)"),
            });
        } else {
            positional.push(arg.clone());
        }
    }

    let [source, dest] = positional.as_slice() else {
        anyhow::bail!("expected <source-module> and <dest-dir> (see --help)");
    };
    Ok(Options {
        target,
        source: PathBuf::from(source),
        dest: PathBuf::from(dest),
    })
}

fn run(opts: Options) -> anyhow::Result<()> {
    // The description is a compiled module exposing a `root` constructor,
    // built against this same bindweld version.
    let library = unsafe { libloading::Library::new(&opts.source) }
        .with_context(|| format!("failed to load source module '{}'", opts.source.display()))?;
    let root: libloading::Symbol<'_, fn() -> Model> =
        unsafe { library.get(b"root") }.with_context(|| {
            format!(
                "the source module '{}' does not expose a `root` symbol",
                opts.source.display()
            )
        })?;
    let model = root();

    tracing::info!(source = %opts.source.display(), dest = %opts.dest.display(), "starting generation");
    bindweld::generate(&model, opts.target, &opts.dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_generator_and_positionals() {
        let opts = parse_args(&args(&["-g", "rust", "desc.so", "out"])).unwrap();
        assert_eq!(opts.target, Some(Target::Rust));
        assert_eq!(opts.source, PathBuf::from("desc.so"));
        assert_eq!(opts.dest, PathBuf::from("out"));
    }

    #[test]
    fn defaults_to_all_generators() {
        let opts = parse_args(&args(&["desc.so", "out"])).unwrap();
        assert_eq!(opts.target, None);
    }

    #[test]
    fn rejects_unknown_generator() {
        let err = parse_args(&args(&["-g", "swift", "desc.so", "out"])).unwrap_err();
        assert!(err.to_string().contains("unknown generator"));
    }

    #[test]
    fn rejects_missing_positionals() {
        assert!(parse_args(&args(&["desc.so"])).is_err());
        assert!(parse_args(&args(&["a", "b", "c"])).is_err());
    }
}

fn print_help() {
    println!("bindweld");
    println!();
    println!("USAGE:");
    println!("    bindweld [-g c|rust] <source-module> <dest-dir>");
    println!();
    println!("ARGS:");
    println!("    <source-module>  Compiled interface description exposing `root`");
    println!("    <dest-dir>       Directory receiving the generated artifacts");
    println!();
    println!("OPTIONS:");
    println!("    -g c|rust        Run a single generator (default: all)");
    println!("    -h, --help       Print this help message");
}
