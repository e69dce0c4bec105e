//! Diagnostic codes for categorizing compiler errors and warnings.
//!
//! Codes follow the format `{prefix}{number}` with one number range per
//! pipeline pass: `E1xxx` lexing, `E2xxx` parsing, `E3xxx` validation,
//! `E4xxx` type checking, `E9xxx` internal.

/// A unique code identifying a diagnostic message
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// The prefix ("E" for error, "W" for warning)
    pub prefix: &'static str,
    /// The numeric identifier
    pub number: u32,
}

impl DiagnosticCode {
    /// Create a new diagnostic code
    #[inline]
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    /// Get the full code string (e.g. "E2001")
    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // Lexing
    /// E1001: unterminated string literal
    pub const E_LEX_UNTERMINATED_STRING: Self = Self::new("E", 1001);
    /// E1002: unrecognized symbol
    pub const E_LEX_UNKNOWN_SYMBOL: Self = Self::new("E", 1002);

    // Parsing
    /// E2001: unexpected token
    pub const E_PARSE_UNEXPECTED_TOKEN: Self = Self::new("E", 2001);
    /// E2002: unexpected end of file
    pub const E_PARSE_UNEXPECTED_EOF: Self = Self::new("E", 2002);
    /// E2003: malformed expression
    pub const E_PARSE_MALFORMED_EXPR: Self = Self::new("E", 2003);
    /// E2004: invalid type syntax
    pub const E_PARSE_INVALID_TYPE: Self = Self::new("E", 2004);

    // Validation
    /// E3001: duplicated declaration
    pub const E_VALIDATE_DUPLICATE: Self = Self::new("E", 3001);
    /// E3002: unknown variable
    pub const E_VALIDATE_UNKNOWN_VAR: Self = Self::new("E", 3002);
    /// E3003: unknown function
    pub const E_VALIDATE_UNKNOWN_FUN: Self = Self::new("E", 3003);
    /// E3004: unknown dis
    pub const E_VALIDATE_UNKNOWN_DIS: Self = Self::new("E", 3004);
    /// E3005: generic argument count mismatch
    pub const E_VALIDATE_GENERIC_COUNT: Self = Self::new("E", 3005);
    /// E3006: missing variant
    pub const E_VALIDATE_NO_VARIANT: Self = Self::new("E", 3006);
    /// E3007: invalid assignment
    pub const E_VALIDATE_BAD_ASSIGN: Self = Self::new("E", 3007);

    // Type checking
    /// E4001: type mismatch
    pub const E_TYPE_MISMATCH: Self = Self::new("E", 4001);
    /// E4002: argument count mismatch
    pub const E_TYPE_ARITY: Self = Self::new("E", 4002);
    /// E4003: callee is not a function
    pub const E_TYPE_NOT_CALLABLE: Self = Self::new("E", 4003);
    /// E4004: member access on a non-dis or unrefined value
    pub const E_TYPE_BAD_MEMBER_BASE: Self = Self::new("E", 4004);
    /// E4005: variant has no such member
    pub const E_TYPE_NO_MEMBER: Self = Self::new("E", 4005);
    /// E4006: pattern on a non-dis type
    pub const E_TYPE_PATTERN_NON_DIS: Self = Self::new("E", 4006);
    /// E4007: variant argument count mismatch in a pattern
    pub const E_TYPE_VARIANT_ARITY: Self = Self::new("E", 4007);
    /// E4008: non-exhaustive fit
    pub const E_TYPE_NON_EXHAUSTIVE: Self = Self::new("E", 4008);
    /// E4009: return type mismatch
    pub const E_TYPE_RETURN_MISMATCH: Self = Self::new("E", 4009);
    /// E4010: unknown type
    pub const E_TYPE_UNKNOWN: Self = Self::new("E", 4010);

    // Internal
    /// E9999: internal compiler error
    pub const E_INTERNAL: Self = Self::new("E", 9999);

    // Warnings
    /// W0001: unused variable
    pub const W_UNUSED_VARIABLE: Self = Self::new("W", 1);
}

impl std::fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiagnosticCode({})", self.as_str())
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(DiagnosticCode::new("E", 1).as_str(), "E0001");
        assert_eq!(DiagnosticCode::E_PARSE_UNEXPECTED_TOKEN.as_str(), "E2001");
        assert_eq!(DiagnosticCode::W_UNUSED_VARIABLE.as_str(), "W0001");
    }

    #[test]
    fn test_display_and_debug() {
        let code = DiagnosticCode::E_TYPE_MISMATCH;
        assert_eq!(format!("{}", code), "E4001");
        assert_eq!(format!("{:?}", code), "DiagnosticCode(E4001)");
    }

    #[test]
    fn test_equality() {
        assert_eq!(DiagnosticCode::new("E", 3001), DiagnosticCode::E_VALIDATE_DUPLICATE);
        assert_ne!(DiagnosticCode::E_LEX_UNKNOWN_SYMBOL, DiagnosticCode::E_LEX_UNTERMINATED_STRING);
    }
}
