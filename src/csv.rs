// src/csv.rs
//! The quoted, comma-joined row format of the tabular export.
//!
//! Every value is wrapped in `"` and joined with `,`. There is no escaping:
//! reading splits on the literal `","` between values.

/* ---------------- Writing ---------------- */

/// `"a","b","c"`
pub fn quote_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(cell.as_ref());
        out.push('"');
    }
    out
}

/* ---------------- Parsing ---------------- */

/// Split one quoted row back into values. A leading or trailing bare `,`
/// stands for an empty value.
pub fn split_quoted(line: &str) -> Vec<String> {
    let mut line = s!(line);
    if line.ends_with(',') {
        line.push_str("\"\"");
    }
    if line.starts_with(',') {
        line.insert_str(0, "\"\"");
    }

    let mut values: Vec<String> = line.split("\",\"").map(str::to_owned).collect();
    if let Some(first) = values.first_mut() {
        if first.starts_with('"') {
            first.remove(0);
        }
    }
    if let Some(last) = values.last_mut() {
        if last.ends_with('"') {
            last.pop();
        }
    }
    values
}
