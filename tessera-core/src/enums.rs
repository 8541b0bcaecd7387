//! Enum metadata.

use alloc::vec::Vec;

use crate::{EnumKind, SchemaError};

/// The backing value of an enum case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backing {
    /// An integer backing.
    Int(i64),
    /// A string backing.
    String(&'static str),
}

/// One case of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumCase {
    /// Case name.
    pub name: &'static str,
    /// Backing value, for backed enums.
    pub backing: Option<Backing>,
}

/// Metadata describing an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Registered name.
    pub name: &'static str,
    /// Representation.
    pub kind: EnumKind,
    /// Cases in declaration order.
    pub cases: Vec<EnumCase>,
}

impl EnumDescriptor {
    /// A unit enum with these case names.
    pub fn unit(name: &'static str, cases: &[&'static str]) -> Self {
        EnumDescriptor {
            name,
            kind: EnumKind::Unit,
            cases: cases
                .iter()
                .map(|&name| EnumCase {
                    name,
                    backing: None,
                })
                .collect(),
        }
    }

    /// An int-backed enum.
    pub fn int_backed(name: &'static str, cases: &[(&'static str, i64)]) -> Self {
        EnumDescriptor {
            name,
            kind: EnumKind::Int,
            cases: cases
                .iter()
                .map(|&(name, value)| EnumCase {
                    name,
                    backing: Some(Backing::Int(value)),
                })
                .collect(),
        }
    }

    /// A string-backed enum.
    pub fn string_backed(name: &'static str, cases: &[(&'static str, &'static str)]) -> Self {
        EnumDescriptor {
            name,
            kind: EnumKind::String,
            cases: cases
                .iter()
                .map(|&(name, value)| EnumCase {
                    name,
                    backing: Some(Backing::String(value)),
                })
                .collect(),
        }
    }

    /// Looks a case up by name.
    pub fn case(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Looks a case up by integer backing.
    pub fn case_by_int(&self, value: i64) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|c| c.backing == Some(Backing::Int(value)))
    }

    /// Looks a case up by string backing.
    pub fn case_by_str(&self, value: &str) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|c| matches!(c.backing, Some(Backing::String(s)) if s == value))
    }

    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        for case in &self.cases {
            let valid = matches!(
                (self.kind, case.backing),
                (EnumKind::Unit, None)
                    | (EnumKind::Int, Some(Backing::Int(_)))
                    | (EnumKind::String, Some(Backing::String(_)))
            );
            if !valid {
                return Err(SchemaError::InvalidEnumBacking {
                    enumeration: self.name,
                    case: case.name,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_cases_by_backing() {
        let suit = EnumDescriptor::string_backed("Suit", &[("Hearts", "H"), ("Spades", "S")]);
        assert_eq!(suit.case_by_str("S").map(|c| c.name), Some("Spades"));
        assert_eq!(suit.case_by_str("X"), None);

        let priority = EnumDescriptor::int_backed("Priority", &[("Low", 1), ("High", 10)]);
        assert_eq!(priority.case_by_int(10).map(|c| c.name), Some("High"));
        assert_eq!(priority.case("Low").and_then(|c| c.backing), Some(Backing::Int(1)));
    }

    #[test]
    fn rejects_inconsistent_backings() {
        let mut broken = EnumDescriptor::unit("Size", &["Small"]);
        broken.cases[0].backing = Some(Backing::Int(1));
        assert_eq!(
            broken.validate(),
            Err(SchemaError::InvalidEnumBacking {
                enumeration: "Size",
                case: "Small"
            })
        );
    }
}
