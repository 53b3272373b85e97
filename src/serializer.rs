//! Plain-text dumps of a [`ReachabilityMap`].
//!
//! Layout, one line per cell in i/j/k order:
//!
//! ```text
//! Matrix Name: <name>
//! Format: [i, j, k] = [element_1, ... element_n]
//!
//! [0, 0, 0] = [0.1, -1.2, 0.0, 0.4]
//! [0, 0, 1] =
//! ```
//!
//! A cell whose value cannot be written as a list of numbers is written with an
//! empty value; the rest of the dump is unaffected.

use crate::grid::ArrayIndex;
use crate::map::{Cell, ReachabilityMap};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const FORMAT_LINE: &str = "Format: [i, j, k] = [element_1, ... element_n]";

/// A cell value that has no flat numeric representation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum ConversionError {
    #[error("component {position} is not a finite number ({value})")]
    NonFinite { position: usize, value: f64 },
}

/// Checks that every component of a joint vector can be written as a number.
pub fn numeric_form(values: &[f64]) -> std::result::Result<&[f64], ConversionError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(ConversionError::NonFinite {
            position,
            value: values[position],
        }),
        None => Ok(values),
    }
}

fn format_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", items.join(", "))
}

fn write_header<W: Write>(out: &mut W, name: &str) -> Result<()> {
    writeln!(out, "Matrix Name: {name}")?;
    writeln!(out, "{FORMAT_LINE}")?;
    writeln!(out)?;
    Ok(())
}

fn write_line<W: Write>(out: &mut W, index: ArrayIndex, value: &str) -> Result<()> {
    let [i, j, k] = index;
    writeln!(out, "[{i}, {j}, {k}] = {value}")?;
    Ok(())
}

/// Writes the solution grid to `out`. Returns the number of cells that had to be
/// blanked because their value could not be converted.
pub fn write_solutions_to<W: Write>(out: &mut W, name: &str, map: &ReachabilityMap) -> Result<usize> {
    write_header(out, name)?;

    let mut blanked = 0;
    for (index, cell) in map.iter() {
        let value = match cell.solution().map(numeric_form) {
            None => String::new(),
            Some(Ok(values)) => format_list(values),
            Some(Err(e)) => {
                log::warn!("Cell {index:?} written empty: {e}");
                blanked += 1;
                String::new()
            }
        };
        write_line(out, index, &value)?;
    }
    Ok(blanked)
}

/// Writes the success grid (`0` / `1` per cell) to `out`.
pub fn write_success_grid_to<W: Write>(out: &mut W, name: &str, map: &ReachabilityMap) -> Result<()> {
    write_header(out, name)?;
    for (index, cell) in map.iter() {
        let flag = u8::from(matches!(cell, Cell::Reached(_)));
        write_line(out, index, &flag.to_string())?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| Error::Destination {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes the solution grid to a file, named after `path` in the header.
pub fn write_solutions(map: &ReachabilityMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing solutions to {}...", path.display());

    let mut out = create(path)?;
    let blanked = write_solutions_to(&mut out, &path.display().to_string(), map)?;
    out.flush()?;

    if blanked > 0 {
        log::warn!("{blanked} cells could not be converted and were written empty");
    }
    log::info!("Finished writing solutions to {}.", path.display());
    Ok(())
}

/// Writes the success grid to a file, named after `path` in the header.
pub fn write_success_grid(map: &ReachabilityMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing success grid to {}...", path.display());

    let mut out = create(path)?;
    write_success_grid_to(&mut out, &path.display().to_string(), map)?;
    out.flush()?;

    log::info!("Finished writing success grid to {}.", path.display());
    Ok(())
}
