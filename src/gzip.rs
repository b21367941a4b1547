//! GZIP container framing (RFC 1952).
//!
//! The container work is fixed-offset field extraction: two magic bytes, a
//! method byte, a flag byte, then the optional fields the flags announce.
//! The deflate payload runs from the end of the header to the 8-byte
//! CRC-32/ISIZE trailer. Trailer fields are reported, never validated
//! against the decoded output.

#![allow(dead_code)]

use crate::error::{UngzError, UngzResult};

const GZIP_ID1: u8 = 0x1f;
const GZIP_ID2: u8 = 0x8b;

/// CM field value for deflate, the only method ever assigned.
const GZIP_CM_DEFLATE: u8 = 8;

const FLAG_TEXT: u8 = 0x01;
const FLAG_HCRC: u8 = 0x02;
const FLAG_EXTRA: u8 = 0x04;
const FLAG_NAME: u8 = 0x08;
const FLAG_COMMENT: u8 = 0x10;

/// Fixed header length before any optional field.
const BASE_HEADER_LEN: usize = 10;

/// Trailer length: CRC-32 + ISIZE.
pub const TRAILER_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct GzipHeader {
    pub mtime: u32,
    pub xfl: u8,
    pub os: u8,
    pub is_text: bool,
    pub extra: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub comment: Option<String>,
    pub header_crc: Option<u16>,
}

impl GzipHeader {
    /// Parse the member header; returns the header and the byte offset
    /// where the raw deflate stream begins.
    pub fn parse(data: &[u8]) -> UngzResult<(GzipHeader, usize)> {
        if data.len() < BASE_HEADER_LEN {
            return Err(UngzError::invalid_header("truncated header"));
        }
        if data[0] != GZIP_ID1 || data[1] != GZIP_ID2 {
            return Err(UngzError::invalid_header(format!(
                "bad magic bytes {:02x} {:02x}",
                data[0], data[1]
            )));
        }
        if data[2] != GZIP_CM_DEFLATE {
            return Err(UngzError::invalid_header(format!(
                "unknown compression method {}",
                data[2]
            )));
        }

        let flags = data[3];
        let mut header = GzipHeader {
            mtime: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            xfl: data[8],
            os: data[9],
            is_text: flags & FLAG_TEXT != 0,
            ..Default::default()
        };
        let mut offset = BASE_HEADER_LEN;

        if flags & FLAG_EXTRA != 0 {
            if offset + 2 > data.len() {
                return Err(UngzError::invalid_header("truncated extra field"));
            }
            let xlen = u16::from_le_bytes([data[offset], data[offset + 1]]) as usize;
            offset += 2;
            if offset + xlen > data.len() {
                return Err(UngzError::invalid_header("truncated extra field"));
            }
            header.extra = Some(data[offset..offset + xlen].to_vec());
            offset += xlen;
        }
        if flags & FLAG_NAME != 0 {
            let (name, next) = read_cstring(data, offset, "file name")?;
            header.file_name = Some(name);
            offset = next;
        }
        if flags & FLAG_COMMENT != 0 {
            let (comment, next) = read_cstring(data, offset, "comment")?;
            header.comment = Some(comment);
            offset = next;
        }
        if flags & FLAG_HCRC != 0 {
            if offset + 2 > data.len() {
                return Err(UngzError::invalid_header("truncated header crc"));
            }
            header.header_crc = Some(u16::from_le_bytes([data[offset], data[offset + 1]]));
            offset += 2;
        }

        Ok((header, offset))
    }
}

/// NUL-terminated ISO 8859-1 string field.
fn read_cstring(data: &[u8], start: usize, what: &str) -> UngzResult<(String, usize)> {
    let rest = data
        .get(start..)
        .ok_or_else(|| UngzError::invalid_header(format!("truncated {}", what)))?;
    let end = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| UngzError::invalid_header(format!("unterminated {}", what)))?;
    let text = rest[..end].iter().map(|&b| b as char).collect();
    Ok((text, start + end + 1))
}

#[derive(Debug, Clone, Copy)]
pub struct GzipTrailer {
    /// CRC-32 of the uncompressed data, as recorded by the compressor.
    pub crc32: u32,
    /// Uncompressed size mod 2^32; used only as a preallocation hint.
    pub isize: u32,
}

impl GzipTrailer {
    /// Read CRC-32 and ISIZE from the final 8 bytes of the member.
    pub fn parse(data: &[u8]) -> UngzResult<GzipTrailer> {
        if data.len() < BASE_HEADER_LEN + TRAILER_LEN {
            return Err(UngzError::invalid_header("truncated member"));
        }
        let t = &data[data.len() - TRAILER_LEN..];
        Ok(GzipTrailer {
            crc32: u32::from_le_bytes([t[0], t[1], t[2], t[3]]),
            isize: u32::from_le_bytes([t[4], t[5], t[6], t[7]]),
        })
    }
}
