// 🏷️ Categories - Fixed category sets scoped per transaction kind
//
// Every transaction carries a Kind (income or expense) and a category label.
// The label must come from the set that belongs to its kind; the sets are
// closed and ship with the binary.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// KIND
// ============================================================================

/// Income or expense classification of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money coming in
    Income,

    /// Money going out
    Expense,
}

impl Kind {
    /// Stored representation (matches the JSON `type` field)
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }

    /// Label shown in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Income => "Ingreso",
            Kind::Expense => "Gasto",
        }
    }

    /// Sign prefix used when listing amounts
    pub fn sign(&self) -> char {
        match self {
            Kind::Income => '+',
            Kind::Expense => '-',
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Kind::Income => Kind::Expense,
            Kind::Expense => Kind::Income,
        }
    }

    /// Categories a transaction of this kind may use
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Kind::Income => INCOME_CATEGORIES,
            Kind::Expense => EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Ok(Kind::Income),
            "expense" | "gasto" => Ok(Kind::Expense),
            other => Err(anyhow!("Unknown kind '{}' (expected income or expense)", other)),
        }
    }
}

// ============================================================================
// CATEGORY SETS
// ============================================================================

pub const INCOME_CATEGORIES: &[&str] = &[
    "Sueldo",
    "Trabajos Extras",
    "Regalos",
    "Devoluciones",
    "Papas",
    "Otros Ingresos",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Transporte",
    "Alimentación",
    "Servicios",
    "Gasto Innecesario",
    "Productos de Limpieza",
    "Productos de Cuidado Personal",
    "Fotocopias",
    "Casa",
    "Otros Gastos",
];

/// Check that `category` belongs to the set for `kind`
pub fn is_valid_category(kind: Kind, category: &str) -> bool {
    kind.categories().contains(&category)
}

/// Position of `category` inside the set for `kind`
pub fn category_index(kind: Kind, category: &str) -> Option<usize> {
    kind.categories().iter().position(|c| *c == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_scoped_by_kind() {
        assert!(is_valid_category(Kind::Expense, "Transporte"));
        assert!(is_valid_category(Kind::Income, "Sueldo"));

        // Sets never overlap
        assert!(!is_valid_category(Kind::Income, "Transporte"));
        assert!(!is_valid_category(Kind::Expense, "Sueldo"));
        assert!(!is_valid_category(Kind::Expense, ""));
    }

    #[test]
    fn test_category_index() {
        assert_eq!(category_index(Kind::Expense, "Transporte"), Some(0));
        assert_eq!(category_index(Kind::Expense, "Otros Gastos"), Some(8));
        assert_eq!(category_index(Kind::Income, "Casa"), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("income".parse::<Kind>().unwrap(), Kind::Income);
        assert_eq!("Gasto".parse::<Kind>().unwrap(), Kind::Expense);
        assert!("transfer".parse::<Kind>().is_err());
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&Kind::Expense).unwrap();
        assert_eq!(json, "\"expense\"");

        let kind: Kind = serde_json::from_str("\"income\"").unwrap();
        assert_eq!(kind, Kind::Income);
        assert_eq!(kind.toggle(), Kind::Expense);
    }
}
