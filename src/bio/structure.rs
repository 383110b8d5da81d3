//! Structure file entry point
//!
//! The file format is decided once from the path (`.cif`, `.cif.gz`, `.pdb`,
//! `.pdb.gz`, `.ent`) and every reader below matches on [`StructureFormat`].
//! Only the coordinate records are read: PDB `ATOM`/`HETATM` lines and the
//! mmCIF `_atom_site` loop.

use crate::{DanbError, Result};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureFormat {
    Cif,
    Pdb,
}

impl StructureFormat {
    /// Detect the format and compression from a file name.
    pub fn from_path(path: &Path) -> Result<(Self, bool)> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".cif") {
            Ok((StructureFormat::Cif, false))
        } else if name.ends_with(".cif.gz") {
            Ok((StructureFormat::Cif, true))
        } else if name.ends_with(".pdb") || name.ends_with(".ent") {
            Ok((StructureFormat::Pdb, false))
        } else if name.ends_with(".pdb.gz") {
            Ok((StructureFormat::Pdb, true))
        } else {
            Err(DanbError::UnsupportedFileFormat(path.display().to_string()))
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            StructureFormat::Cif => "cif",
            StructureFormat::Pdb => "pdb",
        }
    }
}

/// One coordinate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub serial: u32,
    pub name: String,
    pub res_name: String,
    pub chain_id: String,
    pub res_seq: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub element: String,
    pub hetero: bool,
}

/// Open a structure file, transparently decompressing `.gz` inputs.
pub fn open_structure(path: &Path) -> Result<(StructureFormat, Box<dyn BufRead>)> {
    let (format, gzipped) = StructureFormat::from_path(path)?;
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if gzipped {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok((format, reader))
}

/// Read the atoms of the `model_idx`-th model (0-based) of a structure file.
pub fn read_structure<P: AsRef<Path>>(path: P, model_idx: usize) -> Result<Vec<Atom>> {
    let path = path.as_ref();
    let (format, reader) = open_structure(path)?;
    debug!("Reading {:?} model {} from {}", format, model_idx, path.display());

    let models = match format {
        StructureFormat::Pdb => read_pdb_models(reader)?,
        StructureFormat::Cif => read_cif_models(reader)?,
    };

    let available = models.len();
    models.into_iter().nth(model_idx).ok_or_else(|| {
        DanbError::Parse(format!(
            "model index {} out of range ({} models in {})",
            model_idx,
            available,
            path.display()
        ))
    })
}

fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &str, line_no: usize) -> Result<T> {
    value.parse().map_err(|_| {
        DanbError::Parse(format!("line {}: invalid {} '{}'", line_no, field, value))
    })
}

/// Alternate location selection for one model.
///
/// Atoms without an altloc (blank, `.` or `?`) are always kept; for a residue
/// with conformers only the first altloc id seen survives.
#[derive(Default)]
struct AltLocFilter {
    first: HashMap<(String, i32, String), String>,
}

impl AltLocFilter {
    fn keep(&mut self, atom: &Atom, ins_code: &str, alt_loc: &str) -> bool {
        if matches!(alt_loc, "" | "." | "?") {
            return true;
        }
        let key = (atom.chain_id.clone(), atom.res_seq, ins_code.to_string());
        let first = self.first.entry(key).or_insert_with(|| alt_loc.to_string());
        *first == alt_loc
    }
}

fn read_pdb_models(reader: Box<dyn BufRead>) -> Result<Vec<Vec<Atom>>> {
    let mut models = Vec::new();
    let mut current = Vec::new();
    let mut altlocs = AltLocFilter::default();
    let mut in_model = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        if line.starts_with("MODEL") {
            in_model = true;
            current = Vec::new();
            altlocs = AltLocFilter::default();
        } else if line.starts_with("ENDMDL") {
            models.push(std::mem::take(&mut current));
            in_model = false;
        } else if line.starts_with("ATOM") || line.starts_with("HETATM") {
            let mut element = column(&line, 76, 78).to_string();
            let name = column(&line, 12, 16).to_string();
            if element.is_empty() {
                element = name.chars().filter(|c| c.is_ascii_alphabetic()).take(1).collect();
            }

            let atom = Atom {
                serial: parse_field(column(&line, 6, 11), "serial", line_no)?,
                name,
                res_name: column(&line, 17, 20).to_string(),
                chain_id: column(&line, 21, 22).to_string(),
                res_seq: parse_field(column(&line, 22, 26), "residue number", line_no)?,
                x: parse_field(column(&line, 30, 38), "x", line_no)?,
                y: parse_field(column(&line, 38, 46), "y", line_no)?,
                z: parse_field(column(&line, 46, 54), "z", line_no)?,
                element,
                hetero: line.starts_with("HETATM"),
            };
            if altlocs.keep(&atom, column(&line, 26, 27), column(&line, 16, 17)) {
                current.push(atom);
            }
        }
    }

    // Single-model files carry no MODEL/ENDMDL records
    if !current.is_empty() || (models.is_empty() && !in_model) {
        models.push(current);
    }

    Ok(models)
}

/// Split an mmCIF data line into tokens, honouring single and double quotes.
fn cif_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '\'' || c == '"' {
            chars.next();
            let mut token = String::new();
            while let Some(ch) = chars.next() {
                let closes = ch == c && chars.peek().map_or(true, |n| n.is_whitespace());
                if closes {
                    break;
                }
                token.push(ch);
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(token);
        }
    }

    tokens
}

fn optional_value(row: &[String], column: Option<usize>) -> &str {
    column.map_or("", |c| row[c].as_str())
}

fn read_cif_models(reader: Box<dyn BufRead>) -> Result<Vec<Vec<Atom>>> {
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    let mut after_loop = false;
    let mut in_atom_site = false;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if in_atom_site {
            if trimmed.starts_with("_atom_site.") && rows.is_empty() {
                headers.push(trimmed.trim_start_matches("_atom_site.").to_string());
            } else if trimmed == "loop_"
                || trimmed.starts_with('_')
                || trimmed.starts_with('#')
                || trimmed.starts_with("data_")
            {
                break;
            } else if !trimmed.is_empty() {
                rows.push((idx + 1, cif_tokens(trimmed)));
            }
        } else if trimmed == "loop_" {
            after_loop = true;
        } else if after_loop && trimmed.starts_with("_atom_site.") {
            in_atom_site = true;
            headers.push(trimmed.trim_start_matches("_atom_site.").to_string());
        } else {
            after_loop = false;
        }
    }

    if headers.is_empty() {
        return Err(DanbError::Parse("no _atom_site loop found".to_string()));
    }

    let col = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        col(name).ok_or_else(|| DanbError::Parse(format!("_atom_site.{} column missing", name)))
    };

    let group = col("group_PDB");
    let serial = required("id")?;
    let atom_name = col("auth_atom_id").map_or_else(|| required("label_atom_id"), Ok)?;
    let res_name = col("auth_comp_id").map_or_else(|| required("label_comp_id"), Ok)?;
    let chain = col("auth_asym_id").map_or_else(|| required("label_asym_id"), Ok)?;
    let res_seq = col("auth_seq_id").map_or_else(|| required("label_seq_id"), Ok)?;
    let (x, y, z) = (required("Cartn_x")?, required("Cartn_y")?, required("Cartn_z")?);
    let element = col("type_symbol");
    let model = col("pdbx_PDB_model_num");
    let alt_id = col("label_alt_id");
    let ins_code = col("pdbx_PDB_ins_code");

    let mut model_order: Vec<String> = Vec::new();
    let mut models: Vec<(Vec<Atom>, AltLocFilter)> = Vec::new();

    for (line_no, row) in rows {
        if row.len() != headers.len() {
            return Err(DanbError::Parse(format!(
                "line {}: expected {} _atom_site values, found {}",
                line_no,
                headers.len(),
                row.len()
            )));
        }

        let model_key = model.map(|m| row[m].clone()).unwrap_or_default();
        let slot = match model_order.iter().position(|k| *k == model_key) {
            Some(pos) => pos,
            None => {
                model_order.push(model_key);
                models.push((Vec::new(), AltLocFilter::default()));
                models.len() - 1
            }
        };

        let atom = Atom {
            serial: parse_field(&row[serial], "id", line_no)?,
            name: row[atom_name].clone(),
            res_name: row[res_name].clone(),
            chain_id: row[chain].clone(),
            // Non-polymer atoms may carry '.' or '?' as seq_id
            res_seq: match row[res_seq].as_str() {
                "." | "?" => 0,
                value => parse_field(value, "seq_id", line_no)?,
            },
            x: parse_field(&row[x], "Cartn_x", line_no)?,
            y: parse_field(&row[y], "Cartn_y", line_no)?,
            z: parse_field(&row[z], "Cartn_z", line_no)?,
            element: element.map(|e| row[e].clone()).unwrap_or_default(),
            hetero: group.map_or(false, |g| row[g] == "HETATM"),
        };
        let (atoms, altlocs) = &mut models[slot];
        if altlocs.keep(&atom, optional_value(&row, ins_code), optional_value(&row, alt_id)) {
            atoms.push(atom);
        }
    }

    Ok(models.into_iter().map(|(atoms, _)| atoms).collect())
}
