// 📒 Ledger Store - Ordered, newest-first sequence of transactions
//
// Every operation is a total, synchronous, in-memory transform. Invalid
// input never errors: the operation is simply skipped and the caller is
// told whether anything changed.

use crate::transaction::{format_date, validate_fields, EditFields, NewTransaction, Transaction};
use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};

/// The complete ordered set of transactions for a session
///
/// Invariants: ids are unique, amounts are >= 0, newest record first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records already in newest-first order (e.g. loaded from storage)
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Record a new transaction stamped with the current local time
    ///
    /// Returns the new id, or None when a field was empty/invalid and the
    /// ledger was left untouched.
    pub fn add(&mut self, input: NewTransaction) -> Option<i64> {
        self.add_at(input, Local::now())
    }

    /// Same as [`Ledger::add`] with an explicit clock reading
    pub fn add_at(&mut self, input: NewTransaction, now: DateTime<Local>) -> Option<i64> {
        let Some((description, amount, category)) = input.validate() else {
            debug!("add skipped: incomplete or invalid fields");
            return None;
        };

        let id = self.next_id(now.timestamp_millis());
        let tx = Transaction {
            id,
            description,
            amount,
            kind: input.kind,
            category,
            date: format_date(&now),
        };

        self.transactions.insert(0, tx);
        debug!("added transaction {}", id);
        Some(id)
    }

    /// Replace description, category and amount of the record with `id`
    ///
    /// Kind and id are never touched. Returns false when the id is absent or
    /// the new values fail validation (category checked against the
    /// record's own kind).
    pub fn update(&mut self, id: i64, fields: &EditFields) -> bool {
        let Some(tx) = self.transactions.iter_mut().find(|tx| tx.id == id) else {
            return false;
        };

        let Some((description, amount, category)) =
            validate_fields(tx.kind, &fields.description, &fields.amount, &fields.category)
        else {
            debug!("update of {} skipped: invalid fields", id);
            return false;
        };

        tx.description = description;
        tx.amount = amount;
        tx.category = category;
        true
    }

    /// Delete the record with `id`; false when absent
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|tx| tx.id != id);
        self.transactions.len() != before
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Millisecond timestamp, bumped past every existing id so two records
    /// created within the same millisecond still get distinct ids
    ///
    /// When the largest id is already `i64::MAX` the new id goes below the
    /// smallest one instead.
    fn next_id(&self, now_ms: i64) -> i64 {
        let ids = || self.transactions.iter().map(|tx| tx.id);
        match ids().max() {
            Some(max) if max >= now_ms => match max.checked_add(1) {
                Some(id) => id,
                None => ids().min().unwrap_or(max).saturating_sub(1),
            },
            _ => now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Kind;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    fn expense(description: &str, amount: &str, category: &str) -> NewTransaction {
        NewTransaction::new(description, amount, Kind::Expense, category)
    }

    #[test]
    fn test_add_prepends_new_record() {
        let mut ledger = Ledger::new();

        let first = ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        let second = ledger
            .add_at(NewTransaction::new("Sueldo", "500", Kind::Income, "Sueldo"), at(2_000))
            .unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.transactions()[0].id, second, "Newest record must come first");
        assert_eq!(ledger.transactions()[1].id, first);
        assert_eq!(first, 1_000_000);
    }

    #[test]
    fn test_add_with_empty_field_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        let snapshot = ledger.clone();

        assert!(ledger.add_at(expense("", "200", "Transporte"), at(2_000)).is_none());
        assert!(ledger.add_at(expense("Pan", "", "Alimentación"), at(2_000)).is_none());
        assert!(ledger.add_at(expense("Pan", "100", ""), at(2_000)).is_none());
        assert!(ledger.add_at(expense("Pan", "abc", "Alimentación"), at(2_000)).is_none());
        assert!(ledger.add_at(expense("Pan", "100", "Sueldo"), at(2_000)).is_none());

        assert_eq!(ledger, snapshot, "Rejected adds must leave the ledger unchanged");
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut ledger = Ledger::new();
        let now = at(5_000);

        let a = ledger.add_at(expense("A", "1", "Casa"), now).unwrap();
        let b = ledger.add_at(expense("B", "2", "Casa"), now).unwrap();
        let c = ledger.add_at(expense("C", "3", "Casa"), now).unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(c, a + 2);
    }

    #[test]
    fn test_next_id_at_i64_max_does_not_overflow() {
        let mut ledger = Ledger::from_transactions(vec![Transaction {
            id: i64::MAX,
            description: "Importado".to_string(),
            amount: 10.0,
            kind: Kind::Expense,
            category: "Casa".to_string(),
            date: "1/1/2026".to_string(),
        }]);

        let id = ledger.add_at(expense("Pan", "80", "Alimentación"), at(1_000)).unwrap();
        assert_eq!(id, i64::MAX - 1);

        let next = ledger.add_at(expense("Leche", "40", "Alimentación"), at(1_000)).unwrap();
        assert_eq!(next, i64::MAX - 2, "Ids must stay unique below the smallest one");
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_update_replaces_editable_fields_only() {
        let mut ledger = Ledger::new();
        let id = ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        let date = ledger.get(id).unwrap().date.clone();

        let changed = ledger.update(id, &EditFields::new("Supermercado", "350.5", "Alimentación"));
        assert!(changed);

        let tx = ledger.get(id).unwrap();
        assert_eq!(tx.description, "Supermercado");
        assert_eq!(tx.amount, 350.5);
        assert_eq!(tx.category, "Alimentación");
        assert_eq!(tx.kind, Kind::Expense);
        assert_eq!(tx.date, date);
    }

    #[test]
    fn test_update_missing_or_invalid_is_noop() {
        let mut ledger = Ledger::new();
        let id = ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        let snapshot = ledger.clone();

        assert!(!ledger.update(id + 99, &EditFields::new("X", "1", "Casa")));
        // Income category on an expense record
        assert!(!ledger.update(id, &EditFields::new("X", "1", "Sueldo")));
        assert!(!ledger.update(id, &EditFields::new("X", "-1", "Casa")));

        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn test_remove() {
        let mut ledger = Ledger::new();
        let id = ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        ledger.add_at(expense("Pan", "80", "Alimentación"), at(2_000)).unwrap();

        assert!(!ledger.remove(42), "Unknown id must not remove anything");
        assert_eq!(ledger.len(), 2);

        assert!(ledger.remove(id));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(id).is_none());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut ledger = Ledger::new();
        ledger.add_at(expense("Colectivo", "200", "Transporte"), at(1_000)).unwrap();
        ledger
            .add_at(NewTransaction::new("Sueldo", "500", Kind::Income, "Sueldo"), at(2_000))
            .unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.starts_with('['));

        let restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger, "Round trip must keep order and values");
    }
}
