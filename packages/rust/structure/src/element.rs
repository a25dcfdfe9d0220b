//! Element inference from atom names.
//!
//! Structure files in the CSML archive do not carry a trustworthy element
//! column, so the element is guessed from the atom name alone, using the
//! CHARMM/AMBER naming conventions.

/// Hydrogen symbol as returned by [`infer_element`].
pub const HYDROGEN: &str = "H";

/// Signature of an element inference function, injectable into the deriver.
pub type InferElement = fn(&str) -> String;

/// Atom and ion names whose element cannot be read off the first letters.
const NAME_TABLE: &[(&str, &str)] = &[
    // calcium
    ("CAL", "CA"),
    ("C0", "CA"),
    ("CA2+", "CA"),
    // cesium
    ("CES", "CS"),
    ("CS", "CS"),
    ("CS+", "CS"),
    // chloride
    ("CLA", "CL"),
    ("CLAL", "CL"),
    ("CL", "CL"),
    ("CL-", "CL"),
    // iron
    ("FE", "FE"),
    ("FE2", "FE"),
    // lithium
    ("LIT", "LI"),
    ("LI", "LI"),
    ("LI+", "LI"),
    ("QL", "LI"),
    // magnesium
    ("MG", "MG"),
    ("MG2+", "MG"),
    // potassium
    ("K", "K"),
    ("POT", "K"),
    ("K+", "K"),
    ("QK", "K"),
    // sodium
    ("SOD", "NA"),
    ("NA", "NA"),
    ("NA+", "NA"),
    ("QN", "NA"),
    ("ZN", "ZN"),
    ("CU", "CU"),
    ("QC", "CE"),
    ("RB", "RB"),
    ("QR", "RB"),
    // special carbons
    ("BC", "C"),
    ("AC", "C"),
    // virtual sites
    ("MW", "DUMMY"),
];

/// Elements recognized inside composite atom names.
const BASIC_ELEMENTS: &[&str] = &[
    "H", "LI", "BE", "B", "C", "N", "O", "F", "NA", "MG", "AL", "P", "SI", "S", "CL", "K",
];

fn lookup_name(name: &str) -> Option<&'static str> {
    NAME_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, element)| *element)
}

fn is_basic_element(name: &str) -> bool {
    BASIC_ELEMENTS.contains(&name)
}

/// Conventional capitalization: `CL` → `Cl`. Longer pseudo-symbols are kept.
fn symbol_case(symbol: &str) -> String {
    if symbol.len() > 2 {
        return symbol.to_string();
    }
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Guess the element symbol of an atom from its name.
///
/// 1. Exact match in the ion/alias table (`SOD` → `Na`, `CA2+` → `Ca`).
/// 2. Drop `*`, `+`, `-`; keep the leading non-digit run, uppercased; retry the table.
/// 3. Shrink from the right: the whole name, the name minus its last or first
///    character is a basic element → that element; two characters or fewer →
///    the first character.
///
/// Names made only of digits and symbols are returned with symbols removed.
pub fn infer_element(atom_name: &str) -> String {
    if atom_name.is_empty() {
        return String::new();
    }

    if let Some(element) = lookup_name(&atom_name.to_uppercase()) {
        return symbol_case(element);
    }

    let no_symbols: String = atom_name
        .chars()
        .filter(|c| !matches!(c, '*' | '+' | '-'))
        .collect();

    let mut name = no_symbols
        .split(|c: char| c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .unwrap_or("")
        .to_uppercase();

    if let Some(element) = lookup_name(&name) {
        return symbol_case(element);
    }

    while !name.is_empty() {
        if is_basic_element(&name) {
            return symbol_case(&name);
        }
        let first_len = name.chars().next().map_or(0, char::len_utf8);
        let last_len = name.chars().next_back().map_or(0, char::len_utf8);

        let without_last = &name[..name.len() - last_len];
        if is_basic_element(without_last) {
            return symbol_case(without_last);
        }
        let without_first = &name[first_len..];
        if is_basic_element(without_first) {
            return symbol_case(without_first);
        }
        if name.chars().count() <= 2 {
            return symbol_case(&name[..first_len]);
        }
        name.pop();
    }

    no_symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_lipid_atom_names() {
        assert_eq!(infer_element("C1"), "C");
        assert_eq!(infer_element("C21"), "C");
        assert_eq!(infer_element("O3"), "O");
        assert_eq!(infer_element("P"), "P");
        assert_eq!(infer_element("N"), "N");
        assert_eq!(infer_element("H3A"), "H");
        assert_eq!(infer_element("HA"), "H");
        assert_eq!(infer_element("OC2"), "O");
    }

    #[test]
    fn names_resembling_heavier_elements() {
        // Alpha carbon, not calcium; hydroxyl hydrogen, not holmium.
        assert_eq!(infer_element("CA"), "C");
        assert_eq!(infer_element("HO"), "H");
        assert_eq!(infer_element("he"), "H");
        assert_eq!(infer_element("N0A"), "N");
        assert_eq!(infer_element("C0U"), "C");
    }

    #[test]
    fn ion_table() {
        assert_eq!(infer_element("SOD"), "Na");
        assert_eq!(infer_element("Na+"), "Na");
        assert_eq!(infer_element("Ca2+"), "Ca");
        assert_eq!(infer_element("CLA"), "Cl");
        assert_eq!(infer_element("zn"), "Zn");
        assert_eq!(infer_element("POT"), "K");
        assert_eq!(infer_element("MW"), "DUMMY");
    }

    #[test]
    fn symbols_and_leading_digits() {
        assert_eq!(infer_element("AO5*"), "O");
        assert_eq!(infer_element("F-"), "F");
        assert_eq!(infer_element("OH-"), "O");
        assert_eq!(infer_element("1he2"), "H");
        assert_eq!(infer_element("3hg2"), "H");
    }

    #[test]
    fn degenerate_names() {
        assert_eq!(infer_element(""), "");
        assert_eq!(infer_element("123"), "123");
        assert_eq!(infer_element("1+"), "1");
    }
}
