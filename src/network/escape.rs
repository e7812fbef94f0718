// Terse-mode field splitting. nmcli -t separates fields with ':' and escapes a
// literal ':' or '\' inside a field with a preceding '\', so SSIDs such as
// "Cafe:Guest" cannot be split naively.

pub const NMCLI_DELIMITER: char = ':';
pub const NMCLI_ESCAPE: char = '\\';

/// Split one record left to right. `<escape><c>` appends a literal `c`; an
/// unescaped delimiter ends the field; a lone escape at end of line is kept.
pub fn split_escaped(line: &str, delimiter: char, escape: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            match chars.next() {
                Some(literal) => current.push(literal),
                None => current.push(c),
            }
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

/// Inverse of `split_escaped` for one field.
pub fn escape_field(field: &str, delimiter: char, escape: char) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if c == delimiter || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

/// nmcli terse record → fields.
pub fn split_terse(line: &str) -> Vec<String> {
    split_escaped(line, NMCLI_DELIMITER, NMCLI_ESCAPE)
}
