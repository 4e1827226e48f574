//! Course id canonicalization.

/// Separator between the department prefix and the course number.
pub const ID_SEPARATOR: char = '-';

/// Normalize a free-form course id into `"XX-NNN"` form.
///
/// Ids without a separator and at least five characters long get one inserted
/// after the two-character department prefix. Anything else, including short
/// ids and ids already containing a separator, is returned as-is.
pub fn standardize_id(id: &str) -> String {
    if id.contains(ID_SEPARATOR) || id.chars().count() < 5 {
        return id.to_string();
    }
    // At least five chars, so the split point exists.
    let split = id.char_indices().nth(2).map(|(i, _)| i).unwrap_or(id.len());
    format!("{}{}{}", &id[..split], ID_SEPARATOR, &id[split..])
}
