//! Identifier helpers shared by resolution and template data.
//!
//! Case conversion follows one word-splitting routine so that header
//! guards, nested type names and template filters agree with each other.

use crate::domain::error::DomainError;

/// Words reserved by the generated C++ code.
const RESERVED_WORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "constexpr", "continue", "decltype", "default", "delete", "do", "double",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "nullptr",
    "operator", "or", "private", "protected", "public", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "while", "xor",
];

/// Convert a string to snake_case.
///
/// | Input | Output |
/// |-------|--------|
/// | "EvseManager" | "evse_manager" |
/// | "power-meter" | "power_meter" |
/// | "OCPPGateway" | "ocpp_gateway" |
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Upper-case snake form used for include guards.
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Capitalize the first character and keep the rest untouched.
///
/// Nested inline types are named this way after their property:
/// `charging_state` becomes `Charging_state`, `limits` becomes `Limits`.
pub fn to_capital_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Convert a string to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| to_capital_case(w))
        .collect()
}

/// Check that `name` can be emitted as an identifier.
///
/// `context` describes where the name came from and ends up in the error.
pub fn validate_identifier(name: &str, context: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidIdentifier {
        name: name.to_string(),
        context: context.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("identifier is empty")),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
            return Err(invalid("must start with a letter or underscore"));
        }
        Some(_) => {}
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("contains characters outside [A-Za-z0-9_]"));
    }

    if RESERVED_WORDS.contains(&name) {
        return Err(invalid("is a reserved word"));
    }

    Ok(())
}

/// Split a string into words based on casing and separators.
///
/// 1. **Explicit separators:** `_`, `-`, `.`, `/`, whitespace
/// 2. **Case transition (camelCase):** `aB` splits between `a` and `B`
/// 3. **Acronym boundary:** `OCPPGateway` splits between `P` and `G`
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if matches!(c, '_' | '-' | '.' | '/') || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_pascal_and_acronyms() {
        assert_eq!(to_snake_case("EvseManager"), "evse_manager");
        assert_eq!(to_snake_case("OCPPGateway"), "ocpp_gateway");
        assert_eq!(to_snake_case("power-meter"), "power_meter");
        assert_eq!(to_snake_case("ISO15118Charger"), "iso15118_charger");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn screaming_snake_for_guards() {
        assert_eq!(to_screaming_snake_case("PowerMeter"), "POWER_METER");
        assert_eq!(to_screaming_snake_case("evse/board"), "EVSE_BOARD");
    }

    #[test]
    fn capital_case_only_touches_first_char() {
        assert_eq!(to_capital_case("limits"), "Limits");
        assert_eq!(to_capital_case("charging_state"), "Charging_state");
        assert_eq!(to_capital_case(""), "");
    }

    #[test]
    fn pascal_case_joins_words() {
        assert_eq!(to_pascal_case("power_meter"), "PowerMeter");
        assert_eq!(to_pascal_case("evse-manager"), "EvseManager");
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(validate_identifier("max_current", "property").is_ok());
        assert!(validate_identifier("_private", "property").is_ok());
        assert!(validate_identifier("1st", "property").is_err());
        assert!(validate_identifier("with-dash", "property").is_err());
        assert!(validate_identifier("", "property").is_err());

        let err = validate_identifier("class", "property of Foo").unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdentifier { ref reason, .. } if reason.contains("reserved")));
    }
}
