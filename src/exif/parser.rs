//! Minimal EXIF reader for the two tags focal statistics need.
//!
//! Extracts:
//! - Model (IFD0 tag `0x0110`, ASCII): the camera body
//! - FocalLength (Exif sub-IFD tag `0x920A`, RATIONAL): millimetres, as
//!   written by the lens, before any crop-factor scaling
//!
//! Containers, detected by magic bytes rather than extension:
//! - JPEG: APP1 segment starting with `Exif\0\0`, followed by a TIFF block
//! - TIFF and TIFF-based RAW (ARW, NEF, CR2, DNG): the file is the TIFF block
//! - PNG: the `eXIf` chunk holds a TIFF block
//!
//! Every read is bounds-checked; malformed input yields empty data, never a
//! panic.

use std::collections::HashSet;

/// Tags extracted from an image file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    pub focal_length: Option<f64>,
    pub camera_model: Option<String>,
}

const TAG_MODEL: u16 = 0x0110;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_FOCAL_LENGTH: u16 = 0x920A;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

/// Upper bound on IFDs visited per file; guards against offset cycles.
const MAX_IFDS: usize = 16;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Parse EXIF from a whole file's bytes.
pub fn parse_exif(data: &[u8]) -> ExifData {
    if data.starts_with(JPEG_SOI) {
        find_jpeg_exif(data).map(parse_tiff).unwrap_or_default()
    } else if data.starts_with(PNG_SIGNATURE) {
        find_png_exif(data).map(parse_tiff).unwrap_or_default()
    } else if data.starts_with(b"II") || data.starts_with(b"MM") {
        parse_tiff(data)
    } else {
        ExifData::default()
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Find the TIFF block inside a JPEG's `Exif` APP1 segment.
fn find_jpeg_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = JPEG_SOI.len();
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS starts entropy-coded data; EOI ends the image
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_end = (pos + 2 + seg_len).min(data.len());
        let segment = &data[pos + 4..seg_end];
        if marker == 0xE1 && segment.starts_with(EXIF_HEADER) {
            return Some(&segment[EXIF_HEADER.len()..]);
        }
        pos += 2 + seg_len;
    }
    None
}

/// Find the `eXIf` chunk payload in a PNG.
fn find_png_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();
    // Chunk: length (4, BE) + type (4) + data + CRC (4)
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let start = pos + 8;
        let end = start.checked_add(len)?;
        if end > data.len() {
            return None;
        }
        match kind {
            b"eXIf" => return Some(&data[start..end]),
            b"IEND" => return None,
            _ => {}
        }
        pos = end + 4;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF structure
// ---------------------------------------------------------------------------

/// Bounds-checked reads in the block's byte order.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    fn u16(&self, offset: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes(offset, 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    fn u32(&self, offset: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes(offset, 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }
}

/// One 12-byte IFD entry.
struct IfdEntry {
    tag: u16,
    typ: u16,
    count: usize,
    /// Offset of the entry's 4-byte value/offset field.
    field_offset: usize,
}

fn type_size(typ: u16) -> usize {
    match typ {
        1 | 2 | 6 | 7 => 1, // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,         // SHORT, SSHORT
        4 | 9 | 11 => 4,    // LONG, SLONG, FLOAT
        5 | 10 | 12 => 8,   // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

impl IfdEntry {
    /// Where the value bytes live: inline when they fit in 4 bytes,
    /// otherwise at the offset stored in the field.
    fn value_offset(&self, r: &TiffReader) -> Option<usize> {
        let byte_len = self.count.checked_mul(type_size(self.typ))?;
        if byte_len <= 4 {
            Some(self.field_offset)
        } else {
            r.u32(self.field_offset).map(|o| o as usize)
        }
    }

    fn ascii(&self, r: &TiffReader) -> Option<String> {
        if self.typ != TYPE_ASCII {
            return None;
        }
        let bytes = r.bytes(self.value_offset(r)?, self.count)?;
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches('\0').trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn number(&self, r: &TiffReader) -> Option<f64> {
        let offset = self.value_offset(r)?;
        match self.typ {
            TYPE_RATIONAL => {
                let num = r.u32(offset)?;
                let den = r.u32(offset + 4)?;
                (den != 0).then(|| num as f64 / den as f64)
            }
            TYPE_SHORT => r.u16(offset).map(f64::from),
            TYPE_LONG => r.u32(offset).map(f64::from),
            _ => None,
        }
    }
}

fn read_ifd(r: &TiffReader, offset: usize) -> Option<(Vec<IfdEntry>, usize)> {
    let count = r.u16(offset)? as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let at = offset + 2 + i * 12;
        entries.push(IfdEntry {
            tag: r.u16(at)?,
            typ: r.u16(at + 2)?,
            count: r.u32(at + 4)? as usize,
            field_offset: at + 8,
        });
    }
    let next = r.u32(offset + 2 + count * 12).unwrap_or(0) as usize;
    Some((entries, next))
}

/// Extract Model and FocalLength from a TIFF block.
///
/// Walks the IFD0 chain and any Exif sub-IFD it points to. The first
/// non-empty value of each tag wins; a zero focal length counts as absent
/// (manual lenses report 0).
pub fn parse_tiff(data: &[u8]) -> ExifData {
    let big_endian = match data.get(0..2) {
        Some(b"MM") => true,
        Some(b"II") => false,
        _ => return ExifData::default(),
    };
    let r = TiffReader { data, big_endian };
    if r.u16(2) != Some(42) {
        return ExifData::default();
    }

    let mut result = ExifData::default();
    let mut pending: Vec<usize> = r.u32(4).map(|o| vec![o as usize]).unwrap_or_default();
    let mut visited = HashSet::new();

    while let Some(offset) = pending.pop() {
        if offset == 0 || visited.len() >= MAX_IFDS || !visited.insert(offset) {
            continue;
        }
        let Some((entries, next)) = read_ifd(&r, offset) else {
            continue;
        };
        for entry in &entries {
            match entry.tag {
                TAG_MODEL if result.camera_model.is_none() => {
                    result.camera_model = entry.ascii(&r);
                }
                TAG_FOCAL_LENGTH if result.focal_length.is_none() => {
                    result.focal_length = entry.number(&r).filter(|f| *f > 0.0 && f.is_finite());
                }
                TAG_EXIF_IFD => {
                    if let Some(sub) = r.u32(entry.field_offset) {
                        pending.push(sub as usize);
                    }
                }
                _ => {}
            }
        }
        pending.push(next);
    }

    result
}
