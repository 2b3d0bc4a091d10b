use crate::category::{is_valid_category, Kind};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One recorded income or expense event
///
/// Serialized shape matches what the tracker has always stored:
/// `{"id", "description", "amount", "type", "category", "date"}`.
/// `id` and `kind` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Creation timestamp in milliseconds, unique within a ledger
    pub id: i64,

    pub description: String,

    /// Always >= 0, the sign comes from `kind`
    pub amount: f64,

    #[serde(rename = "type")]
    pub kind: Kind,

    pub category: String,

    /// Creation date, `d/m/yyyy`
    pub date: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }

    /// Amount with its sign prefix, e.g. `-$1.234,5`
    pub fn signed_display(&self) -> String {
        format!("{}${}", self.kind.sign(), format_money(self.amount))
    }
}

// ============================================================================
// FORM INPUT
// ============================================================================

/// Raw values typed into the "new transaction" form
///
/// Amount stays a string until validation so an empty or non-numeric field
/// can be rejected the same way as an empty description.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: String,
    pub kind: Kind,
    pub category: String,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: Kind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind,
            category: category.into(),
        }
    }

    /// Validated (description, amount, category), or None when any field is
    /// missing or the category does not belong to the kind
    pub fn validate(&self) -> Option<(String, f64, String)> {
        validate_fields(self.kind, &self.description, &self.amount, &self.category)
    }
}

/// Values an edit may replace: description, category, amount
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditFields {
    pub description: String,
    pub amount: String,
    pub category: String,
}

impl EditFields {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
        }
    }

    /// Draft pre-filled from an existing record
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            description: tx.description.clone(),
            amount: format_amount_input(tx.amount),
            category: tx.category.clone(),
        }
    }
}

pub(crate) fn validate_fields(
    kind: Kind,
    description: &str,
    amount: &str,
    category: &str,
) -> Option<(String, f64, String)> {
    let description = description.trim();
    if description.is_empty() || category.is_empty() {
        return None;
    }
    if !is_valid_category(kind, category) {
        return None;
    }
    let amount = parse_amount(amount)?;
    Some((description.to_string(), amount, category.to_string()))
}

/// Parse a user-typed amount; empty, non-numeric, negative and non-finite
/// values are rejected
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Accept a decimal comma as typed in es-AR
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => None,
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Creation date in the `d/m/yyyy` form shown next to each record
pub fn format_date(now: &DateTime<Local>) -> String {
    now.format("%-d/%-m/%Y").to_string()
}

/// es-AR money formatting: `.` groups thousands, `,` separates decimals,
/// trailing zero decimals dropped
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if frac != 0 {
        if frac % 10 == 0 {
            grouped.push_str(&format!(",{}", frac / 10));
        } else {
            grouped.push_str(&format!(",{:02}", frac));
        }
    }

    if value < 0.0 && cents != 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Amount as it goes back into an input box (no grouping); f64 Display
/// never uses an exponent, so the text parses back to the same value
fn format_amount_input(amount: f64) -> String {
    format!("{}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("200"), Some(200.0));
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("0"), Some(0.0));

        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let ok = NewTransaction::new("Colectivo", "200", Kind::Expense, "Transporte");
        assert_eq!(
            ok.validate(),
            Some(("Colectivo".to_string(), 200.0, "Transporte".to_string()))
        );

        let no_desc = NewTransaction::new("  ", "200", Kind::Expense, "Transporte");
        assert!(no_desc.validate().is_none());

        let no_amount = NewTransaction::new("Colectivo", "", Kind::Expense, "Transporte");
        assert!(no_amount.validate().is_none());

        let no_category = NewTransaction::new("Colectivo", "200", Kind::Expense, "");
        assert!(no_category.validate().is_none());

        let wrong_set = NewTransaction::new("Colectivo", "200", Kind::Income, "Transporte");
        assert!(wrong_set.validate().is_none());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0");
        assert_eq!(format_money(500.0), "500");
        assert_eq!(format_money(1234.5), "1.234,5");
        assert_eq!(format_money(1234567.25), "1.234.567,25");
        assert_eq!(format_money(-300.0), "-300");
        assert_eq!(format_money(0.05), "0,05");
    }

    #[test]
    fn test_format_date() {
        let dt = Local.with_ymd_and_hms(2026, 3, 7, 10, 30, 0).unwrap();
        assert_eq!(format_date(&dt), "7/3/2026");
    }

    #[test]
    fn test_json_shape() {
        let tx = Transaction {
            id: 1_700_000_000_000,
            description: "Colectivo".to_string(),
            amount: 200.0,
            kind: Kind::Expense,
            category: "Transporte".to_string(),
            date: "14/11/2023".to_string(),
        };

        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["id"], 1_700_000_000_000i64);
        assert_eq!(value["amount"], 200.0);
        assert!(value.get("kind").is_none());
        assert_eq!(tx.signed_display(), "-$200");
    }

    #[test]
    fn test_edit_fields_from_transaction() {
        let tx = Transaction {
            id: 1,
            description: "Sueldo octubre".to_string(),
            amount: 1500.0,
            kind: Kind::Income,
            category: "Sueldo".to_string(),
            date: "1/10/2026".to_string(),
        };

        let draft = EditFields::from_transaction(&tx);
        assert_eq!(draft.amount, "1500");
        assert_eq!(draft.category, "Sueldo");
    }

    #[test]
    fn test_edit_draft_keeps_huge_amount() {
        let tx = Transaction {
            id: 1,
            description: "Herencia".to_string(),
            amount: 2e19,
            kind: Kind::Income,
            category: "Regalos".to_string(),
            date: "1/10/2026".to_string(),
        };

        let draft = EditFields::from_transaction(&tx);
        assert_eq!(draft.amount, "20000000000000000000");
        assert_eq!(
            parse_amount(&draft.amount),
            Some(2e19),
            "Draft amount must parse back unchanged"
        );

        let small = Transaction { amount: 350.5, ..tx };
        assert_eq!(EditFields::from_transaction(&small).amount, "350.5");
    }
}
