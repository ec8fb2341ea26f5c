//! MATLAB MAT-files
//!
//! Level 4 files and Level 5 files (`-v6`, and `-v7` with zlib compressed
//! variables) are read in either byte order and written little-endian.
//! Variables of Level 5 files can be nested in 1x1 structs and are addressed
//! with a dotted path like `"s.tab1"`.
use std::{
    fs,
    io::{Read, Write},
    path::Path,
    str::FromStr,
};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use log::warn;
use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::{matrix::transpose_in_place, FileError};

use super::try_buffer;

const HEADER_LEN: usize = 128;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_UINT64: u32 = 13;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

const MX_STRUCT_CLASS: u8 = 2;
const MX_DOUBLE_CLASS: u8 = 6;
const FLAG_COMPLEX: u32 = 0x0800;

/// File version used when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVersion {
    /// Level 4
    V4,
    /// Level 5 without compression
    V6,
    /// Level 5 with compressed variables
    V7,
}

impl FromStr for MatVersion {
    type Err = FileError;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        match version {
            "4" => Ok(MatVersion::V4),
            "6" => Ok(MatVersion::V6),
            "7" => Ok(MatVersion::V7),
            _ => Err(FileError::InvalidVersion(version.into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    V4,
    V5 { big_endian: bool },
}

/// A variable of a MAT-file
#[derive(Debug, Clone, PartialEq)]
enum MatArray {
    /// Numeric data in column-major order, converted to `f64`
    Numeric {
        class: u8,
        dims: Vec<usize>,
        complex: bool,
        real: Vec<f64>,
    },
    /// Fields of the first struct element
    Struct {
        dims: Vec<usize>,
        fields: Vec<(String, MatArray)>,
    },
    Other {
        dims: Vec<usize>,
    },
}

impl MatArray {
    fn dims(&self) -> &[usize] {
        match self {
            MatArray::Numeric { dims, .. }
            | MatArray::Struct { dims, .. }
            | MatArray::Other { dims } => dims,
        }
    }

    fn is_double(&self) -> bool {
        matches!(self, MatArray::Numeric { class, .. } if *class == MX_DOUBLE_CLASS)
    }
}

/// A top level entry of a MAT-file
#[derive(Debug)]
struct Entry {
    name: String,
    start: usize,
    end: usize,
    /// The inflated `miMATRIX` element of a compressed entry
    inflated: Option<Vec<u8>>,
}

struct MatFile<'b> {
    bytes: &'b [u8],
    file: &'b str,
    format: Format,
}

impl<'b> MatFile<'b> {
    fn new(bytes: &'b [u8], file: &'b str) -> Self {
        MatFile {
            bytes,
            file,
            format: detect_format(bytes),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> FileError {
        FileError::InvalidMatFile {
            file: self.file.into(),
            reason: reason.into(),
        }
    }

    fn get<'d>(&self, data: &'d [u8], start: usize, len: usize) -> Result<&'d [u8], FileError> {
        start
            .checked_add(len)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| self.invalid("unexpected end of data"))
    }

    fn u32(&self, data: &[u8], pos: usize, big_endian: bool) -> Result<u32, FileError> {
        let bytes: [u8; 4] = self
            .get(data, pos, 4)?
            .try_into()
            .map_err(|_| self.invalid("unexpected end of data"))?;
        Ok(if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    fn entries(&self) -> Result<Vec<Entry>, FileError> {
        match self.format {
            Format::V4 => self.v4_entries(),
            Format::V5 { big_endian } => self.v5_entries(big_endian),
        }
    }

    /// Find and decode the variable `name` on the top level of the file
    fn variable(&self, name: &str) -> Result<Option<MatArray>, FileError> {
        let Some(entry) = self.entries()?.into_iter().find(|entry| entry.name == name) else {
            return Ok(None);
        };
        let data = match &entry.inflated {
            Some(inflated) => &inflated[..],
            None => &self.bytes[entry.start..entry.end],
        };
        match self.format {
            Format::V4 => self.v4_array(data).map(Some),
            Format::V5 { big_endian } => {
                let (_, content, _) = self.element(data, 0, big_endian)?;
                self.v5_array(content, big_endian)
                    .map(|(_, array)| Some(array))
            }
        }
    }

    /// Follow a dotted path through 1x1 structs
    fn lookup(&self, path: &str) -> Result<MatArray, FileError> {
        let mut parts = path.split('.');
        let root = parts.next().unwrap_or(path);
        let not_found = || FileError::TableNotFound {
            table: path.into(),
            file: self.file.into(),
        };
        let mut array = self.variable(root)?.ok_or_else(not_found)?;
        for part in parts {
            match array {
                MatArray::Struct { ref dims, .. } if dims[..] != [1, 1] => break,
                MatArray::Struct { fields, .. } => {
                    array = fields
                        .into_iter()
                        .find(|(name, _)| name == part)
                        .map(|(_, field)| field)
                        .ok_or_else(not_found)?;
                }
                _ => break,
            }
        }
        Ok(array)
    }

    // ----- Level 4 -----

    fn v4_entries(&self) -> Result<Vec<Entry>, FileError> {
        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < self.bytes.len() {
            let header = self.v4_header(&self.bytes[pos..])?;
            let end = pos
                .checked_add(header.len)
                .ok_or_else(|| self.invalid("matrix too large"))?;
            if end > self.bytes.len() {
                return Err(self.invalid("unexpected end of data"));
            }
            entries.push(Entry {
                name: header.name,
                start: pos,
                end,
                inflated: None,
            });
            pos = end;
        }
        Ok(entries)
    }

    fn v4_header(&self, data: &[u8]) -> Result<V4Header, FileError> {
        // the thousands digit of the type is the byte order, 0 for little-endian
        let big_endian = if self.u32(data, 0, false)? < 1000 {
            false
        } else {
            let mopt = self.u32(data, 0, true)?;
            if !(1000..2000).contains(&mopt) {
                return Err(self.invalid("unknown Level 4 matrix type"));
            }
            true
        };
        let field = |i: usize| self.u32(data, 4 * i, big_endian).map(|v| v as usize);
        let mopt = field(0)? % 1000;
        let (precision, kind) = ((mopt / 10) % 10, mopt % 10);
        let rows = field(1)?;
        let cols = field(2)?;
        let complex = field(3)? != 0;
        let name_len = field(4)?;
        let name = self.get(data, 20, name_len)?;
        let name = String::from_utf8_lossy(name)
            .trim_end_matches('\0')
            .to_string();
        let width = match precision {
            0 => 8,
            1 | 2 => 4,
            3 | 4 => 2,
            5 => 1,
            _ => return Err(self.invalid("unknown Level 4 precision")),
        };
        let values = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(if complex { 2 } else { 1 }))
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| self.invalid("matrix too large"))?;
        let data_start = name_len
            .checked_add(20)
            .ok_or_else(|| self.invalid("matrix too large"))?;
        let len = data_start
            .checked_add(values)
            .ok_or_else(|| self.invalid("matrix too large"))?;
        Ok(V4Header {
            big_endian,
            precision,
            width,
            kind,
            rows,
            cols,
            complex,
            name,
            data_start,
            len,
        })
    }

    fn v4_array(&self, data: &[u8]) -> Result<MatArray, FileError> {
        let header = self.v4_header(data)?;
        let dims = vec![header.rows, header.cols];
        if header.kind != 0 {
            return Ok(MatArray::Other { dims });
        }
        let mi_type = match header.precision {
            0 => MI_DOUBLE,
            1 => MI_SINGLE,
            2 => MI_INT32,
            3 => MI_INT16,
            4 => MI_UINT16,
            _ => MI_UINT8,
        };
        let count = header.rows * header.cols;
        let real = self.get(data, header.data_start, count * header.width)?;
        Ok(MatArray::Numeric {
            class: MX_DOUBLE_CLASS,
            dims,
            complex: header.complex,
            real: self.decode(mi_type, real, header.big_endian)?,
        })
    }

    // ----- Level 5 -----

    /// Read the data element at `pos`, returns its type, its data and the
    /// position of the next element
    fn element<'d>(
        &self,
        data: &'d [u8],
        pos: usize,
        big_endian: bool,
    ) -> Result<(u32, &'d [u8], usize), FileError> {
        let first = self.u32(data, pos, big_endian)?;
        if first >> 16 != 0 {
            // small data element, type and size share the first four bytes
            let len = (first >> 16) as usize;
            if len > 4 {
                return Err(self.invalid("invalid small data element"));
            }
            return Ok((first & 0xffff, self.get(data, pos + 4, len)?, pos + 8));
        }
        let len = self.u32(data, pos + 4, big_endian)? as usize;
        let content = self.get(data, pos + 8, len)?;
        let next = if first == MI_COMPRESSED {
            pos + 8 + len
        } else {
            pos + 8 + len.next_multiple_of(8)
        };
        Ok((first, content, next))
    }

    fn v5_entries(&self, big_endian: bool) -> Result<Vec<Entry>, FileError> {
        let mut entries = Vec::new();
        let mut pos = HEADER_LEN;
        while pos + 8 <= self.bytes.len() {
            let (mi_type, content, next) = self.element(self.bytes, pos, big_endian)?;
            let (name, inflated) = match mi_type {
                MI_MATRIX => (self.v5_name(content, big_endian)?, None),
                MI_COMPRESSED => {
                    let inflated = self.inflate(content)?;
                    let (mi_type, matrix, _) = self.element(&inflated, 0, big_endian)?;
                    if mi_type != MI_MATRIX {
                        return Err(self.invalid(format!(
                            "unexpected compressed data element type {mi_type}"
                        )));
                    }
                    (self.v5_name(matrix, big_endian)?, Some(inflated))
                }
                _ => return Err(self.invalid(format!("unexpected data element type {mi_type}"))),
            };
            let end = next.min(self.bytes.len());
            entries.push(Entry {
                name,
                start: pos,
                end,
                inflated,
            });
            pos = next;
        }
        Ok(entries)
    }

    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>, FileError> {
        let mut inflated = Vec::new();
        ZlibDecoder::new(data)
            .read_to_end(&mut inflated)
            .map_err(|err| self.invalid(format!("corrupt compressed variable: {err}")))?;
        Ok(inflated)
    }

    fn v5_name(&self, content: &[u8], big_endian: bool) -> Result<String, FileError> {
        let (_, _, pos) = self.element(content, 0, big_endian)?;
        let (_, _, pos) = self.element(content, pos, big_endian)?;
        let (_, name, _) = self.element(content, pos, big_endian)?;
        Ok(String::from_utf8_lossy(name)
            .trim_end_matches('\0')
            .to_string())
    }

    /// Decode the content of a `miMATRIX` element
    fn v5_array(&self, content: &[u8], big_endian: bool) -> Result<(String, MatArray), FileError> {
        if content.is_empty() {
            let empty = MatArray::Numeric {
                class: MX_DOUBLE_CLASS,
                dims: vec![0, 0],
                complex: false,
                real: Vec::new(),
            };
            return Ok((String::new(), empty));
        }
        let (mi_type, flags, pos) = self.element(content, 0, big_endian)?;
        if mi_type != MI_UINT32 || flags.len() < 4 {
            return Err(self.invalid("missing array flags"));
        }
        let flags = self.u32(flags, 0, big_endian)?;
        let class = (flags & 0xff) as u8;
        let complex = flags & FLAG_COMPLEX != 0;

        let (mi_type, dims, pos) = self.element(content, pos, big_endian)?;
        if mi_type != MI_INT32 {
            return Err(self.invalid("missing array dimensions"));
        }
        let dims = (0..dims.len() / 4)
            .map(|i| self.u32(dims, 4 * i, big_endian).map(|d| d as usize))
            .collect::<Result<Vec<_>, _>>()?;

        let (_, name, mut pos) = self.element(content, pos, big_endian)?;
        let name = String::from_utf8_lossy(name)
            .trim_end_matches('\0')
            .to_string();

        let array = match class {
            MX_STRUCT_CLASS => {
                let (_, field_len, next) = self.element(content, pos, big_endian)?;
                let field_len = self.u32(field_len, 0, big_endian)? as usize;
                let (_, names, next) = self.element(content, next, big_endian)?;
                pos = next;
                let names = if field_len == 0 {
                    Vec::new()
                } else {
                    names
                        .chunks(field_len)
                        .map(|name| {
                            String::from_utf8_lossy(name)
                                .trim_end_matches('\0')
                                .to_string()
                        })
                        .collect()
                };
                let mut fields = Vec::with_capacity(names.len());
                if dims.iter().product::<usize>() > 0 {
                    for field_name in names {
                        let (mi_type, field, next) = self.element(content, pos, big_endian)?;
                        if mi_type != MI_MATRIX {
                            return Err(self.invalid("invalid struct field"));
                        }
                        let (_, field) = self.v5_array(field, big_endian)?;
                        fields.push((field_name, field));
                        pos = next;
                    }
                }
                MatArray::Struct { dims, fields }
            }
            6..=15 => {
                let (mi_type, real, _) = self.element(content, pos, big_endian)?;
                MatArray::Numeric {
                    class,
                    dims,
                    complex,
                    real: self.decode(mi_type, real, big_endian)?,
                }
            }
            _ => MatArray::Other { dims },
        };
        Ok((name, array))
    }

    fn decode(&self, mi_type: u32, data: &[u8], big_endian: bool) -> Result<Vec<f64>, FileError> {
        let width = match mi_type {
            MI_INT8 | MI_UINT8 => 1,
            MI_INT16 | MI_UINT16 => 2,
            MI_INT32 | MI_UINT32 | MI_SINGLE => 4,
            MI_DOUBLE | MI_INT64 | MI_UINT64 => 8,
            _ => return Err(self.invalid(format!("unexpected numeric data type {mi_type}"))),
        };
        let mut values = try_buffer(data.len() / width).ok_or_else(|| {
            self.invalid(format!("not enough memory for {} values", data.len() / width))
        })?;
        for chunk in data.chunks_exact(width) {
            let mut bytes = [0u8; 8];
            bytes[..width].copy_from_slice(chunk);
            if big_endian {
                bytes[..width].reverse();
            }
            let value = match mi_type {
                MI_INT8 => bytes[0] as i8 as f64,
                MI_UINT8 => bytes[0] as f64,
                MI_INT16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
                MI_UINT16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
                MI_INT32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
                MI_UINT32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
                MI_SINGLE => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
                MI_INT64 => i64::from_le_bytes(bytes) as f64,
                MI_UINT64 => u64::from_le_bytes(bytes) as f64,
                _ => f64::from_le_bytes(bytes),
            };
            values.push(value);
        }
        Ok(values)
    }
}

struct V4Header {
    big_endian: bool,
    precision: usize,
    width: usize,
    kind: usize,
    rows: usize,
    cols: usize,
    complex: bool,
    name: String,
    data_start: usize,
    len: usize,
}

fn detect_format(bytes: &[u8]) -> Format {
    if bytes.len() >= HEADER_LEN {
        match &bytes[126..128] {
            b"IM" if bytes[124..126] == [0x00, 0x01] => return Format::V5 { big_endian: false },
            b"MI" if bytes[124..126] == [0x01, 0x00] => return Format::V5 { big_endian: true },
            _ => {}
        }
    }
    Format::V4
}

fn read_file(file_name: &str) -> Result<Vec<u8>, FileError> {
    fs::read(file_name).map_err(|source| FileError::Open {
        file: file_name.into(),
        source,
    })
}

fn check_extension(file_name: &str) -> Result<(), FileError> {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some("mat" | "MAT") => Ok(()),
        _ => Err(FileError::NotMatFile(file_name.into())),
    }
}

/// Check that `array` is a real double matrix and return it in row-major order
fn into_matrix(array: MatArray, name: &str) -> Result<Array2<f64>, FileError> {
    if array.dims().len() != 2 {
        return Err(FileError::Rank { table: name.into() });
    }
    if !array.is_double() {
        return Err(FileError::NotDouble { table: name.into() });
    }
    let MatArray::Numeric {
        dims,
        complex,
        mut real,
        ..
    } = array
    else {
        return Err(FileError::NotDouble { table: name.into() });
    };
    if complex {
        return Err(FileError::Complex { table: name.into() });
    }
    let (rows, cols) = (dims[0], dims[1]);
    if real.len() != rows * cols {
        return Err(FileError::Rank { table: name.into() });
    }
    transpose_in_place(&mut real, cols, rows);
    Array2::from_shape_vec((rows, cols), real).map_err(|_| FileError::Rank { table: name.into() })
}

/// Read the table matrix `table_name` from a MAT-file
pub fn read_table(table_name: &str, file_name: &str) -> Result<Array2<f64>, FileError> {
    let bytes = read_file(file_name)?;
    let mat = MatFile::new(&bytes, file_name);
    into_matrix(mat.lookup(table_name)?, table_name)
}

/// The dimensions `(rows, cols)` of the 2D array `array_name` of a MAT-file
pub fn dim_double_array_2d(file_name: &str, array_name: &str) -> Result<(usize, usize), FileError> {
    check_extension(file_name)?;
    let bytes = read_file(file_name)?;
    let array = MatFile::new(&bytes, file_name).lookup(array_name)?;
    match array.dims() {
        [rows, cols] => Ok((*rows, *cols)),
        _ => Err(FileError::Rank {
            table: array_name.into(),
        }),
    }
}

/// Read the `rows x cols` array `array_name` of a MAT-file.
/// The array on file must have exactly this shape.
pub fn read_double_array_2d(
    file_name: &str,
    array_name: &str,
    rows: usize,
    cols: usize,
) -> Result<Array2<f64>, FileError> {
    check_extension(file_name)?;
    let bytes = read_file(file_name)?;
    let array = into_matrix(MatFile::new(&bytes, file_name).lookup(array_name)?, array_name)?;
    let (file_rows, file_cols) = array.dim();
    let mismatch = |requested, axis| FileError::DimensionMismatch {
        requested,
        axis,
        table: array_name.into(),
        rows: file_rows,
        cols: file_cols,
        file: file_name.into(),
    };
    if rows != file_rows {
        return Err(mismatch(rows, "rows"));
    }
    if cols != file_cols {
        return Err(mismatch(cols, "columns"));
    }
    Ok(array)
}

/// Write `array` as variable `array_name` to a MAT-file.
///
/// With `append` the variables already on file are kept, except a variable
/// with the same name which is replaced. The format of an existing file is
/// kept as well. [`MatVersion::V7`] compresses the new variable unless the
/// existing file is a Level 4 file.
pub fn write_double_array_2d<S>(
    file_name: &str,
    array_name: &str,
    array: &ArrayBase<S, Ix2>,
    append: bool,
    version: MatVersion,
) -> Result<(), FileError>
where
    S: Data<Elem = f64>,
{
    check_extension(file_name)?;
    let existing = if append && Path::new(file_name).exists() {
        Some(read_file(file_name)?)
    } else {
        None
    };

    let (format, mut out) = match &existing {
        Some(bytes) => {
            let mat = MatFile::new(bytes, file_name);
            let mut out = Vec::with_capacity(bytes.len());
            if matches!(mat.format, Format::V5 { .. }) {
                out.extend_from_slice(&bytes[..HEADER_LEN]);
            }
            for entry in mat.entries()? {
                if entry.name != array_name {
                    out.extend_from_slice(&bytes[entry.start..entry.end]);
                }
            }
            (mat.format, out)
        }
        None => match version {
            MatVersion::V4 => (Format::V4, Vec::new()),
            MatVersion::V6 | MatVersion::V7 => (Format::V5 { big_endian: false }, v5_header()),
        },
    };
    if version == MatVersion::V7 && format == Format::V4 {
        warn!("appending to the version 4 file \"{file_name}\" without compression");
    }

    // MAT-files store arrays column by column
    let mut data = try_buffer::<f64>(array.len()).ok_or_else(|| FileError::Allocation {
        table: array_name.into(),
        rows: array.nrows(),
        cols: array.ncols(),
        file: file_name.into(),
    })?;
    data.extend(array.t().iter().copied());

    let io_error = |source: std::io::Error| FileError::Io {
        file: file_name.into(),
        source,
    };
    match format {
        Format::V4 => push_v4_matrix(&mut out, array_name, array.nrows(), array.ncols(), &data),
        Format::V5 { big_endian } if version == MatVersion::V7 => {
            let mut matrix = Vec::new();
            push_v5_matrix(
                &mut matrix,
                array_name,
                array.nrows(),
                array.ncols(),
                &data,
                big_endian,
            );
            push_compressed(&mut out, &matrix, big_endian).map_err(io_error)?;
        }
        Format::V5 { big_endian } => push_v5_matrix(
            &mut out,
            array_name,
            array.nrows(),
            array.ncols(),
            &data,
            big_endian,
        ),
    }
    fs::write(file_name, out).map_err(io_error)
}

fn v5_header() -> Vec<u8> {
    let mut header = format!(
        "MATLAB 5.0 MAT-file, Platform: {}, Created by: ndarray-tables",
        std::env::consts::OS
    )
    .into_bytes();
    header.resize(116, b' ');
    header.extend_from_slice(&[0; 8]);
    // version 0x0100 and endian indicator, little-endian
    header.extend_from_slice(&[0x00, 0x01, b'I', b'M']);
    header
}

fn push_u32(out: &mut Vec<u8>, value: u32, big_endian: bool) {
    if big_endian {
        out.extend_from_slice(&value.to_be_bytes());
    } else {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

fn push_element(out: &mut Vec<u8>, mi_type: u32, data: &[u8], big_endian: bool) {
    if data.len() <= 4 && mi_type != MI_MATRIX {
        push_u32(out, ((data.len() as u32) << 16) | mi_type, big_endian);
        out.extend_from_slice(data);
        out.resize(out.len() + 4 - data.len(), 0);
        return;
    }
    push_u32(out, mi_type, big_endian);
    push_u32(out, data.len() as u32, big_endian);
    out.extend_from_slice(data);
    out.resize(out.len() + data.len().next_multiple_of(8) - data.len(), 0);
}

/// Push `element` as a `miCOMPRESSED` element, which is not padded
fn push_compressed(out: &mut Vec<u8>, element: &[u8], big_endian: bool) -> std::io::Result<()> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(element)?;
    let compressed = encoder.finish()?;
    push_u32(out, MI_COMPRESSED, big_endian);
    push_u32(out, compressed.len() as u32, big_endian);
    out.extend_from_slice(&compressed);
    Ok(())
}

fn push_v5_matrix(
    out: &mut Vec<u8>,
    name: &str,
    rows: usize,
    cols: usize,
    data: &[f64],
    big_endian: bool,
) {
    let mut flags = Vec::with_capacity(8);
    push_u32(&mut flags, MX_DOUBLE_CLASS as u32, big_endian);
    push_u32(&mut flags, 0, big_endian);
    let mut dims = Vec::with_capacity(8);
    push_u32(&mut dims, rows as u32, big_endian);
    push_u32(&mut dims, cols as u32, big_endian);
    let mut real = Vec::with_capacity(8 * data.len());
    for value in data {
        if big_endian {
            real.extend_from_slice(&value.to_be_bytes());
        } else {
            real.extend_from_slice(&value.to_le_bytes());
        }
    }

    let mut content = Vec::with_capacity(real.len() + 64 + name.len());
    push_element(&mut content, MI_UINT32, &flags, big_endian);
    push_element(&mut content, MI_INT32, &dims, big_endian);
    push_element(&mut content, MI_INT8, name.as_bytes(), big_endian);
    push_element(&mut content, MI_DOUBLE, &real, big_endian);
    push_element(out, MI_MATRIX, &content, big_endian);
}

fn push_v4_matrix(out: &mut Vec<u8>, name: &str, rows: usize, cols: usize, data: &[f64]) {
    // type 0: little-endian, double precision, full matrix
    for field in [0, rows as u32, cols as u32, 0, name.len() as u32 + 1] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    for value in data {
        out.extend_from_slice(&value.to_le_bytes());
    }
}
