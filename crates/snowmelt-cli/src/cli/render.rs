//! Text rendering for the report subcommands.
//!
//! Field tables follow one layout for every scheme: a centered label row
//! (`name (bits)`), optional binary row, then decimal and hex rows, each
//! column sized to its widest cell.

use std::io::{self, Write};

use chrono_tz::Tz;
use snowmelt::{CalendarStamp, DecodedId, FieldValue};

/// Centers `s` within `width`, biasing leftover padding to the right.
fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let len = s.len();
    if len >= width {
        return s;
    }
    let pad = width - len;
    let left = pad / 2;
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// Binary rendering of `value` padded to `width` bits, grouped in octets
/// from the least significant end.
pub fn group_bits(value: u32, width: u8) -> String {
    let bits = format!("{value:0w$b}", w = width as usize);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = bits.len();
    while end > 8 {
        groups.push(&bits[end - 8..end]);
        end -= 8;
    }
    groups.push(&bits[..end]);
    groups.reverse();
    groups.join(" ")
}

/// Hex rendering of a field value, zero-padded to the field's nibbles.
pub fn field_hex(value: u32, width: u8) -> String {
    format!("0x{value:0w$x}", w = (width as usize).div_ceil(4))
}

fn write_border(out: &mut impl Write, indent: &str, columns: &[usize]) -> io::Result<()> {
    write!(out, "{indent}+")?;
    for &w in columns {
        write!(out, "{}+", "-".repeat(w))?;
    }
    writeln!(out)
}

/// One bordered table of field values: labels, optional binary, decimal,
/// and hex rows.
pub fn write_field_table(
    out: &mut impl Write,
    indent: &str,
    fields: &[FieldValue],
    with_binary: bool,
) -> io::Result<()> {
    let binary: Vec<String> = fields
        .iter()
        .map(|f| group_bits(f.value, f.width))
        .collect();
    let columns: Vec<usize> = fields
        .iter()
        .zip(&binary)
        .map(|(f, bin)| {
            let label_len = format!("{} ({})", f.name, f.width).len();
            let dec_len = f.value.to_string().len();
            let hex_len = field_hex(f.value, f.width).len();
            let bin_len = if with_binary { bin.len() } else { 0 };
            label_len.max(dec_len).max(hex_len).max(bin_len) + 2
        })
        .collect();

    write_border(out, indent, &columns)?;

    write!(out, "{indent}|")?;
    for (f, &w) in fields.iter().zip(&columns) {
        write!(out, "{}|", center(format!("{} ({})", f.name, f.width), w))?;
    }
    writeln!(out)?;

    write_border(out, indent, &columns)?;

    if with_binary {
        write!(out, "{indent}|")?;
        for (bin, &w) in binary.iter().zip(&columns) {
            write!(out, "{}|", center(bin, w))?;
        }
        writeln!(out)?;
    }

    write!(out, "{indent}|")?;
    for (f, &w) in fields.iter().zip(&columns) {
        write!(out, "{}|", center(f.value, w))?;
    }
    writeln!(out)?;

    write!(out, "{indent}|")?;
    for (f, &w) in fields.iter().zip(&columns) {
        write!(out, "{}|", center(field_hex(f.value, f.width), w))?;
    }
    writeln!(out)?;

    write_border(out, indent, &columns)
}

/// The per-ID decode block: calendar views and the low-32 renderings.
pub fn write_decoded(
    out: &mut impl Write,
    index: usize,
    decoded: &DecodedId,
    stamp: &CalendarStamp,
    tz: Tz,
) -> io::Result<()> {
    writeln!(out, "[{index}] ID {}", decoded.id)?;
    writeln!(out, "    raw        : {:#018x}", decoded.id)?;
    writeln!(out, "    utc        : {}", stamp.utc_rfc3339())?;
    writeln!(
        out,
        "    zoned      : {} ({})",
        stamp.zoned_rfc3339(),
        tz.name()
    )?;
    writeln!(out, "    timestamp  : {}", decoded.timestamp_sec)?;
    writeln!(out, "    low32 dec  : {}", decoded.low32)?;
    writeln!(out, "    low32 hex  : {:#010x}", decoded.low32)?;
    writeln!(out, "    low32 bin  : {:#034b}", decoded.low32)
}

/// `key : value` line at the report's standard alignment.
pub fn write_kv(out: &mut impl Write, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(out, "  {key:<11}: {value}")
}

/// Section heading.
pub fn write_heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "=== {title} ===")
}
