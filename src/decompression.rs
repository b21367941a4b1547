//! File and stream orchestration around the decode core.
//!
//! Each input is mapped into memory, decoded in full, and written out
//! exactly once — never per-block rewrites. gzip-compatible behavior
//! otherwise: strip the suffix for the output name, remove the source
//! unless asked to keep it, keep going after per-file failures.

use std::fs::{self, File};
use std::io::{stdin, stdout, BufWriter, Read, Write};
use std::path::Path;

use memmap2::Mmap;
use walkdir::WalkDir;

use crate::cli::UngzArgs;
use crate::error::{UngzError, UngzResult};
use crate::gzip::{GzipHeader, GzipTrailer, TRAILER_LEN};
use crate::inflate::Inflater;
use crate::utils::{format_ratio, format_size, has_suffix, strip_suffix};

/// Output writer buffer size.
const STREAM_BUFFER_SIZE: usize = 256 * 1024;

/// Worst-case deflate expansion; bounds the untrusted ISIZE hint so a
/// forged trailer cannot force a huge preallocation.
const MAX_EXPANSION: usize = 1032;

/// A fully decoded gzip member.
pub struct DecodedMember {
    pub header: GzipHeader,
    pub trailer: GzipTrailer,
    pub data: Vec<u8>,
    pub blocks: usize,
}

/// Decode one complete gzip member held in memory.
pub fn decode_member(data: &[u8]) -> UngzResult<DecodedMember> {
    let (header, deflate_start) = GzipHeader::parse(data)?;
    let trailer = GzipTrailer::parse(data)?;
    let deflate_end = data.len() - TRAILER_LEN;
    if deflate_start > deflate_end {
        return Err(UngzError::invalid_header("no room for a deflate stream"));
    }

    let hint = (trailer.isize as usize).min(data.len().saturating_mul(MAX_EXPANSION));
    let mut inflater = Inflater::with_size_hint(&data[deflate_start..deflate_end], hint);
    inflater.decode_to_end()?;

    Ok(DecodedMember {
        header,
        trailer,
        blocks: inflater.blocks_decoded(),
        data: inflater.into_output(),
    })
}

pub fn decompress_file(filename: &str, args: &UngzArgs) -> UngzResult<i32> {
    if filename == "-" {
        return decompress_stdin(args);
    }

    let input_path = Path::new(filename);
    if !input_path.exists() {
        return Err(UngzError::FileNotFound(filename.to_string()));
    }
    if input_path.is_dir() {
        if args.recursive {
            return decompress_dir(input_path, args);
        }
        return Err(UngzError::invalid_argument(format!(
            "{} is a directory",
            filename
        )));
    }

    let input_file = File::open(input_path)?;
    let compressed_size = input_file.metadata()?.len() as usize;
    let mmap = unsafe { Mmap::map(&input_file)? };

    if args.list {
        return list_file(input_path, &mmap, args);
    }

    // Pick the output before decoding so a bad name or an existing file
    // fails cheaply.
    let output_path = if args.stdout || args.test {
        None
    } else {
        let stripped = strip_suffix(input_path, &args.suffix).ok_or_else(|| {
            UngzError::invalid_argument(format!("{}: unknown suffix", filename))
        })?;
        if stripped.exists() && !args.force {
            return Err(UngzError::invalid_argument(format!(
                "output file {} already exists",
                stripped.display()
            )));
        }
        Some(stripped)
    };

    let member = decode_member(&mmap)?;

    // The whole stream decoded cleanly; write the output exactly once.
    if args.test {
        if args.verbosity >= 2 {
            eprintln!("{}: OK ({} block(s))", filename, member.blocks);
        }
    } else if let Some(ref output_path) = output_path {
        let output_file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, output_file);
        writer.write_all(&member.data)?;
        writer.flush()?;
    } else {
        let stdout = stdout();
        let mut writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, stdout.lock());
        writer.write_all(&member.data)?;
        writer.flush()?;
    }

    if args.verbosity >= 2 && !args.test {
        print_stats(input_path, compressed_size, &member);
    }

    if !args.keep && !args.stdout && !args.test {
        fs::remove_file(input_path)?;
    }

    Ok(0)
}

pub fn decompress_stdin(args: &UngzArgs) -> UngzResult<i32> {
    if args.list {
        return Err(UngzError::invalid_argument("--list requires a file"));
    }

    let mut data = Vec::new();
    stdin().lock().read_to_end(&mut data)?;

    let member = decode_member(&data)?;

    if args.test {
        if args.verbosity >= 2 {
            eprintln!("stdin: OK ({} block(s))", member.blocks);
        }
        return Ok(0);
    }

    let stdout = stdout();
    let mut writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, stdout.lock());
    writer.write_all(&member.data)?;
    writer.flush()?;

    if args.verbosity >= 2 {
        print_stats(Path::new("stdin"), data.len(), &member);
    }

    Ok(0)
}

fn decompress_dir(dir: &Path, args: &UngzArgs) -> UngzResult<i32> {
    let mut exit_code = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_suffix(entry.path(), &args.suffix) {
            continue;
        }
        let name = entry.path().display().to_string();
        if let Err(e) = decompress_file(&name, args) {
            eprintln!("ungz: {}: {}", name, e);
            exit_code = 1;
        }
    }
    Ok(exit_code)
}

/// `--list`: report sizes and ratio from the container fields alone.
fn list_file(path: &Path, data: &[u8], args: &UngzArgs) -> UngzResult<i32> {
    let (header, _) = GzipHeader::parse(data)?;
    let trailer = GzipTrailer::parse(data)?;
    let uncompressed = trailer.isize as usize;

    let name = header.file_name.unwrap_or_else(|| {
        strip_suffix(path, &args.suffix)
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    });
    println!(
        "{:>16} {:>16} {:>7} {}",
        data.len(),
        uncompressed,
        format_ratio(data.len(), uncompressed),
        name
    );
    Ok(0)
}

fn print_stats(path: &Path, compressed: usize, member: &DecodedMember) {
    let stored_name = member.header.file_name.as_deref().unwrap_or("-");
    eprintln!(
        "{}: {} -> {} ({} saved, {} block(s), stored name {})",
        path.display(),
        format_size(compressed),
        format_size(member.data.len()),
        format_ratio(compressed, member.data.len()),
        member.blocks,
        stored_name
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_slices_eq;
    use crate::test_utils::{lengths_table, write_dynamic_block, BitWriter};
    use std::io::Write as _;

    #[test]
    fn decodes_a_hand_built_member() {
        let litlen = lengths_table(&[(0x61, 2), (0x62, 2), (256, 2)], 257);
        let mut w = BitWriter::new();
        write_dynamic_block(&mut w, true, &litlen, &[0], |w, lit, _| {
            w.write_code(lit[0x61].unwrap());
            w.write_code(lit[0x62].unwrap());
            w.write_code(lit[256].unwrap());
        });
        let block = w.finish();

        // FNAME header, the block, then an 8-byte trailer (CRC unchecked).
        let mut member = vec![0x1f, 0x8b, 0x08, 0x08, 0, 0, 0, 0, 0, 0xff];
        member.extend_from_slice(b"ab.txt\0");
        member.extend_from_slice(&block);
        member.extend_from_slice(&[0, 0, 0, 0, 2, 0, 0, 0]);

        let decoded = decode_member(&member).unwrap();
        assert_eq!(decoded.data, b"ab");
        assert_eq!(decoded.blocks, 1);
        assert_eq!(decoded.header.file_name.as_deref(), Some("ab.txt"));
        assert_eq!(decoded.trailer.isize, 2);
    }

    #[test]
    fn round_trips_a_flate2_member() {
        let mut text = String::new();
        for i in 0..500 {
            text.push_str(&format!(
                "record {}: lorem ipsum dolor sit amet, consectetur adipiscing elit. ",
                i
            ));
        }
        let original = text.as_bytes();

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = decode_member(&compressed).unwrap();
        assert_slices_eq!(decoded.data, original);
        assert_eq!(decoded.trailer.isize as usize, original.len());
    }

    #[test]
    fn member_without_room_for_a_stream_is_rejected() {
        let data = [0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0, 0xff];
        assert!(matches!(
            decode_member(&data),
            Err(UngzError::InvalidHeader(_))
        ));
    }
}
