use core::fmt;

/// One named bit field of a packed ID, used for debug rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub bits: u8,
    pub value: u64,
}

/// Renders a packed ID as a table of its bit fields.
///
/// ```text
/// RingflakeId {
///     raw id     : 0x0000000a00021001 (42949808129)
///     layout     :
///         +--------------+----------------+------------------+---------------+---------------+
///         | reserved (1) | timestamp (41) | datacenter ID (5) | worker ID (5) | sequence (12) |
///         ...
/// ```
pub(crate) fn write_bit_layout_debug(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    raw: u64,
    fields: &[FieldLayout],
) -> fmt::Result {
    let visible: Vec<_> = fields.iter().filter(|field| field.bits > 0).collect();

    let widths: Vec<usize> = visible
        .iter()
        .map(|field| {
            let label = format!("{} ({})", field.name, field.bits).len();
            let dec = field.value.to_string().len();
            let hex = format!("0x{:x}", field.value).len();
            label.max(dec).max(hex) + 2
        })
        .collect();

    let border = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
        write!(f, "        +")?;
        for &w in &widths {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    };

    let row = |f: &mut fmt::Formatter<'_>, cells: &mut dyn Iterator<Item = String>| -> fmt::Result {
        write!(f, "        |")?;
        for (cell, &w) in cells.zip(&widths) {
            write!(f, "{cell:^w$}|")?;
        }
        writeln!(f)
    };

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{raw:016x} ({raw})")?;
    writeln!(f, "    layout     :")?;
    border(f)?;
    row(
        f,
        &mut visible.iter().map(|field| format!("{} ({})", field.name, field.bits)),
    )?;
    border(f)?;
    row(f, &mut visible.iter().map(|field| field.value.to_string()))?;
    row(f, &mut visible.iter().map(|field| format!("0x{:x}", field.value)))?;
    border(f)?;
    write!(f, "}}")
}
