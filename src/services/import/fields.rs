// src/services/import/fields.rs

const TRUTHY: [&str; 4] = ["si", "sí", "true", "1"];

/// Coluna `activo`: só estes valores contam como verdadeiro; vazio é falso.
pub fn parse_truthy(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    TRUTHY.contains(&value.as_str())
}

/// Texto aparado, ou `None` se vazio.
pub fn optional(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_tokens() {
        for yes in ["si", "SI", "Sí", " true ", "1"] {
            assert!(parse_truthy(yes), "{yes}");
        }
        for no in ["no", "", "false", "0", "yes", "verdadero"] {
            assert!(!parse_truthy(no), "{no}");
        }
    }

    #[test]
    fn optional_drops_blank() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" 7500000 "), Some("7500000".to_string()));
    }
}
