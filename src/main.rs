//! ungz - gunzip with a from-scratch inflate core
//!
//! Decompresses gzip members whose deflate payload uses dynamic Huffman
//! coding, with a hand-written RFC 1951 decoder end to end: LSB-first bit
//! reading, canonical code construction, trie descent, and the LZ77
//! back-reference copy loop.

use std::process;

mod bits;
mod cli;
mod codelen;
mod decompression;
mod error;
mod gzip;
mod huffman;
mod inflate;
#[cfg(test)]
mod test_utils;
mod utils;

use cli::UngzArgs;
use error::UngzError;

const VERSION: &str = concat!("ungz ", env!("CARGO_PKG_VERSION"));

fn main() {
    let result = run();

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("ungz: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32, UngzError> {
    let args = UngzArgs::parse()?;

    if args.version {
        println!("{}", VERSION);
        return Ok(0);
    }

    if args.help {
        print_help();
        return Ok(0);
    }

    if args.license {
        print_license();
        return Ok(0);
    }

    if args.list && !args.quiet {
        println!(
            "{:>16} {:>16} {:>7} {}",
            "compressed", "uncompressed", "ratio", "name"
        );
    }

    let mut exit_code = 0;

    if args.files.is_empty() {
        exit_code = decompression::decompress_stdin(&args)?;
    } else {
        for file in &args.files {
            match decompression::decompress_file(file, &args) {
                Ok(code) => {
                    if code != 0 {
                        exit_code = code;
                    }
                }
                Err(e) => {
                    eprintln!("ungz: {}: {}", file, e);
                    exit_code = 1;
                }
            }
        }
    }

    Ok(exit_code)
}

fn print_help() {
    println!("Usage: ungz [OPTION]... [FILE]...");
    println!();
    println!("Decompress gzip FILEs in place (by default, FILE.gz -> FILE).");
    println!("With no FILE, or when FILE is -, read standard input.");
    println!();
    println!("Options:");
    println!("  -c, --stdout     Write to stdout, keep original files");
    println!("  -t, --test       Check integrity, produce no output");
    println!("  -l, --list       List sizes and ratio without decompressing");
    println!("  -k, --keep       Keep original files");
    println!("  -f, --force      Force overwrite of output files");
    println!("  -r, --recursive  Recurse into directories");
    println!("  -S, --suffix S   Expected input suffix (default .gz)");
    println!("  -q, --quiet      Suppress output");
    println!("  -v, --verbose    Per-file statistics");
    println!("  -h, --help       Show this help");
    println!("  -V, --version    Show version");
    println!("  -L, --license    Show license");
    println!();
    println!("Examples:");
    println!("  ungz file.txt.gz         Decompress file.txt.gz -> file.txt");
    println!("  ungz -c file.txt.gz      Decompress to stdout");
    println!("  cat file.gz | ungz > f   Decompress stdin to stdout");
}

fn print_license() {
    println!("ungz - gunzip with a from-scratch inflate core");
    println!();
    println!("zlib License - see LICENSE file for details.");
}
