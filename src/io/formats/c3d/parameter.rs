// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! C3D parameter section parser.
//!
//! The parameter section is a flat list of group and parameter records.
//! Groups carry a negative id, parameters carry the positive id of the group
//! they belong to, and records may appear in any order.
//!
//! # Record Format
//!
//! ```text
//! i8  name_len   (negative = locked, 0 = end of section)
//! i8  id         (negative = group, positive = parameter of group id)
//! u8  name[|name_len|]
//! i16 offset     (to next record, counted from this field; 0 = last)
//! -- group --
//! u8  desc_len, desc
//! -- parameter --
//! i8  type       (-1 char, 1 byte, 2 int16, 4 float)
//! u8  ndims, u8 dims[ndims]
//! data[|type| * product(dims)]
//! u8  desc_len, desc
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::core::Processor;
use crate::{CodecError, Result};

/// Size of the parameter section header preceding the first record.
pub const SECTION_HEADER_SIZE: usize = 4;

/// Raw parameter values, in file storage order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterData {
    /// Character data (type -1)
    Char(Vec<u8>),
    /// Byte data (type 1)
    Byte(Vec<u8>),
    /// Signed 16-bit integers (type 2)
    Int16(Vec<i16>),
    /// 32-bit floats (type 4)
    Float(Vec<f32>),
}

impl ParameterData {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            ParameterData::Char(v) | ParameterData::Byte(v) => v.len(),
            ParameterData::Int16(v) => v.len(),
            ParameterData::Float(v) => v.len(),
        }
    }

    /// Whether no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterData::Char(_) => "char",
            ParameterData::Byte(_) => "byte",
            ParameterData::Int16(_) => "int16",
            ParameterData::Float(_) => "float",
        }
    }
}

/// A single named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Upper-case parameter name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Whether the record was marked locked
    pub locked: bool,
    dimensions: Vec<usize>,
    data: ParameterData,
}

impl Parameter {
    /// Create a parameter from decoded parts.
    pub fn new(name: impl Into<String>, dimensions: Vec<usize>, data: ParameterData) -> Self {
        Self {
            name: name.into().to_uppercase(),
            description: String::new(),
            locked: false,
            dimensions,
            data,
        }
    }

    /// Declared dimensions (first dimension varies fastest).
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Raw stored data.
    pub fn data(&self) -> &ParameterData {
        &self.data
    }

    /// Whether the parameter holds no values.
    ///
    /// A zero leading dimension counts as empty even if other dimensions
    /// are non-zero.
    pub fn is_empty(&self) -> bool {
        self.dimensions.first() == Some(&0) || self.data.is_empty()
    }

    /// First element as a float, for numeric parameters.
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.as_f64_vec().and_then(|v| v.first().copied())
    }

    /// All elements as floats, for numeric parameters.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match &self.data {
            ParameterData::Char(_) => None,
            ParameterData::Byte(v) => Some(v.iter().map(|&b| b as f64).collect()),
            ParameterData::Int16(v) => Some(v.iter().map(|&i| i as f64).collect()),
            ParameterData::Float(v) => Some(v.iter().map(|&f| f as f64).collect()),
        }
    }

    /// All elements as integers, for integral parameters.
    pub fn as_i64_vec(&self) -> Option<Vec<i64>> {
        match &self.data {
            ParameterData::Byte(v) => Some(v.iter().map(|&b| b as i64).collect()),
            ParameterData::Int16(v) => Some(v.iter().map(|&i| i as i64).collect()),
            _ => None,
        }
    }

    /// First element as a non-negative count.
    pub fn as_count(&self) -> Option<usize> {
        match &self.data {
            // Counts above 32767 are written as the unsigned reinterpretation.
            ParameterData::Int16(v) => v.first().map(|&i| i as u16 as usize),
            ParameterData::Byte(v) => v.first().map(|&b| b as usize),
            ParameterData::Float(v) => v
                .first()
                .filter(|f| f.is_finite() && **f >= 0.0)
                .map(|&f| f as usize),
            ParameterData::Char(_) => None,
        }
    }

    /// Character data split into strings, with trailing blanks trimmed.
    ///
    /// The first dimension is the string length and the remaining
    /// dimensions give the array shape. Returns `None` for non-char data.
    pub fn raw_strings(&self) -> Option<Vec<&[u8]>> {
        let ParameterData::Char(bytes) = &self.data else {
            return None;
        };

        let strings = match self.dimensions.split_first() {
            None => vec![bytes.as_slice()],
            Some((&0, _)) => Vec::new(),
            Some((&len, rest)) => {
                let count: usize = rest.iter().product();
                bytes.chunks(len).take(count).collect()
            }
        };

        Some(strings.into_iter().map(trim_trailing_blanks).collect())
    }

    /// Number of strings stored in a char parameter.
    pub fn string_count(&self) -> usize {
        self.raw_strings().map(|s| s.len()).unwrap_or(0)
    }
}

fn trim_trailing_blanks(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    &bytes[..end]
}

/// A named parameter group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    /// Group id (positive)
    pub id: u8,
    /// Upper-case group name
    pub name: String,
    /// Free-text description
    pub description: String,
    parameters: HashMap<String, Parameter>,
}

impl Group {
    /// Create an empty group.
    pub fn new(id: u8, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into().to_uppercase(),
            ..Self::default()
        }
    }

    /// Look up a parameter by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(&name.to_uppercase())
    }

    /// Add or replace a parameter.
    pub fn insert(&mut self, parameter: Parameter) {
        self.parameters.insert(parameter.name.clone(), parameter);
    }

    /// Iterate over parameters in no particular order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }
}

/// Parsed parameter section.
#[derive(Debug, Clone, Default)]
pub struct ParameterSection {
    groups: HashMap<String, Group>,
}

/// Bounds-checked byte cursor over the parameter section.
struct SectionCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SectionCursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(CodecError::format(
                "ParameterSection::parse",
                format!(
                    "record at byte {} needs {n} bytes, section has {}",
                    self.pos,
                    self.bytes.len()
                ),
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn text(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.take(n)?).trim().to_string())
    }
}

impl ParameterSection {
    /// Parse the parameter section.
    ///
    /// `bytes` starts at the section header; records begin after
    /// [`SECTION_HEADER_SIZE`] bytes.
    pub fn parse(bytes: &[u8], processor: Processor) -> Result<Self> {
        let mut cursor = SectionCursor {
            bytes,
            pos: SECTION_HEADER_SIZE,
        };
        let mut groups: HashMap<u8, Group> = HashMap::new();
        let mut pending: Vec<(u8, Parameter)> = Vec::new();

        while cursor.pos + 2 <= bytes.len() {
            let name_len = cursor.u8()? as i8;
            let id = cursor.u8()? as i8;
            if name_len == 0 || id == 0 {
                break;
            }

            let name = cursor.text(name_len.unsigned_abs() as usize)?.to_uppercase();
            let offset_pos = cursor.pos;
            let offset = processor.i16_from(cursor.take(2)?);

            if id < 0 {
                let desc_len = cursor.u8()? as usize;
                let description = cursor.text(desc_len)?;
                let group_id = id.unsigned_abs();
                let group = groups
                    .entry(group_id)
                    .or_insert_with(|| Group::new(group_id, &name));
                group.name = name;
                group.description = description;
            } else {
                let mut parameter = Self::parse_parameter(&mut cursor, processor, name)?;
                parameter.locked = name_len < 0;
                pending.push((id as u8, parameter));
            }

            if offset <= 0 {
                break;
            }
            cursor.pos = offset_pos + offset as usize;
        }

        for (group_id, parameter) in pending {
            match groups.get_mut(&group_id) {
                Some(group) => group.insert(parameter),
                None => debug!(
                    parameter = %parameter.name,
                    group_id,
                    "dropping parameter of undeclared group"
                ),
            }
        }

        let groups: HashMap<String, Group> = groups
            .into_values()
            .map(|group| (group.name.clone(), group))
            .collect();
        debug!(groups = groups.len(), "parsed parameter section");

        Ok(Self { groups })
    }

    fn parse_parameter(
        cursor: &mut SectionCursor<'_>,
        processor: Processor,
        name: String,
    ) -> Result<Parameter> {
        let type_code = cursor.u8()? as i8;
        let ndims = cursor.u8()? as usize;
        let dimensions: Vec<usize> = cursor.take(ndims)?.iter().map(|&d| d as usize).collect();
        let count: usize = dimensions.iter().product();

        let data = match type_code {
            -1 => ParameterData::Char(cursor.take(count)?.to_vec()),
            1 => ParameterData::Byte(cursor.take(count)?.to_vec()),
            2 => ParameterData::Int16(
                cursor
                    .take(count * 2)?
                    .chunks_exact(2)
                    .map(|w| processor.i16_from(w))
                    .collect(),
            ),
            4 => ParameterData::Float(
                cursor
                    .take(count * 4)?
                    .chunks_exact(4)
                    .map(|w| processor.f32_from(w))
                    .collect(),
            ),
            other => {
                return Err(CodecError::format(
                    "ParameterSection::parse",
                    format!("parameter '{name}' has unknown data type {other}"),
                ))
            }
        };

        let desc_len = cursor.u8()? as usize;
        let description = cursor.text(desc_len)?;

        Ok(Parameter {
            name,
            description,
            locked: false,
            dimensions,
            data,
        })
    }

    /// Look up a group by name (case-insensitive).
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(&name.to_uppercase())
    }

    /// Look up `GROUP:PARAMETER`.
    pub fn get(&self, group: &str, parameter: &str) -> Option<&Parameter> {
        self.group(group).and_then(|g| g.get(parameter))
    }

    /// Collect a label list spread over `NAME`, `NAME2`, `NAME3`, ...
    ///
    /// Large captures continue label arrays in numbered sibling
    /// parameters once the first one reaches 255 entries.
    pub fn continued_strings(&self, group: &str, parameter: &str) -> Vec<&[u8]> {
        let mut out = Vec::new();
        let Some(first) = self.get(group, parameter).and_then(|p| p.raw_strings()) else {
            return out;
        };
        out.extend(first);
        for n in 2.. {
            match self
                .get(group, &format!("{parameter}{n}"))
                .and_then(|p| p.raw_strings())
            {
                Some(more) => out.extend(more),
                None => break,
            }
        }
        out
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the section declared no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over groups in no particular order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }
}
