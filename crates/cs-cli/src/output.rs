//! JSON-lines rendering.

use std::io::Write;

use serde::Serialize;

/// Write each item as one compact JSON object per line.
pub fn write_json_lines<W, T>(out: &mut W, items: impl IntoIterator<Item = T>) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    for item in items {
        serde_json::to_writer(&mut *out, &item)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
