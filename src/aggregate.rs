// 📊 Aggregator - Totals, category breakdown and balance message
//
// Pure functions over a ledger snapshot. Nothing here mutates or caches;
// the session decides when to recompute.

use crate::category::Kind;
use crate::ledger::Ledger;
use serde::Serialize;

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    /// Share of total expense, 0.0..=100.0
    pub percentage: f64,
}

/// Everything the summary view shows, computed in one pass
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub categories: Vec<CategoryTotal>,
}

pub fn summarize(ledger: &Ledger) -> Summary {
    let total_income = total_for(ledger, Kind::Income);
    let total_expense = total_for(ledger, Kind::Expense);

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count: ledger.len(),
        categories: category_breakdown(ledger),
    }
}

pub fn total_income(ledger: &Ledger) -> f64 {
    total_for(ledger, Kind::Income)
}

pub fn total_expense(ledger: &Ledger) -> f64 {
    total_for(ledger, Kind::Expense)
}

pub fn balance(ledger: &Ledger) -> f64 {
    total_income(ledger) - total_expense(ledger)
}

fn total_for(ledger: &Ledger, kind: Kind) -> f64 {
    ledger
        .iter()
        .filter(|tx| tx.kind == kind)
        .map(|tx| tx.amount)
        .sum()
}

/// Expense amounts grouped by category, in order of first appearance
/// (newest record first)
pub fn expenses_by_category(ledger: &Ledger) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for tx in ledger.iter().filter(|tx| tx.is_expense()) {
        match totals.iter_mut().find(|(category, _)| *category == tx.category) {
            Some((_, amount)) => *amount += tx.amount,
            None => totals.push((tx.category.clone(), tx.amount)),
        }
    }

    totals
}

/// Per-category totals with their share of total expense
///
/// Percentages are 0 when total expense is 0 (only zero-amount expenses).
pub fn category_breakdown(ledger: &Ledger) -> Vec<CategoryTotal> {
    let grouped = expenses_by_category(ledger);
    let total: f64 = grouped.iter().map(|(_, amount)| amount).sum();

    grouped
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            percentage: percentage_of(amount, total),
            category,
            amount,
        })
        .collect()
}

fn percentage_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

// ============================================================================
// MOTIVATIONAL MESSAGE
// ============================================================================

const POSITIVE_MESSAGES: [&str; 5] = [
    "¡Excelente {name}! 💪 Estás ahorrando y construyendo tu futuro financiero.",
    "¡Vas muy bien! 🌟 Tus ingresos superan tus gastos, sigue así.",
    "¡Increíble gestión! 💚 Estás en el camino correcto hacia la estabilidad financiera.",
    "¡Felicitaciones! 🎉 Tu disciplina financiera está dando frutos.",
    "¡Eres una crack! ✨ Mantener este balance positivo te acerca a tus metas.",
];

const IMPROVEMENT_MESSAGES: [&str; 5] = [
    "{name}, es momento de revisar tus gastos 💡 Pequeños cambios hacen grandes diferencias.",
    "No te preocupes 🤗 Identifica esos 'gastos innecesarios' y verás la mejora.",
    "¡Tranquila! 💪 Cada mes es una nueva oportunidad de mejorar tu balance.",
    "Revisa tus categorías 📊 ¿Hay algo que puedas reducir este mes?",
    "¡Tú puedes! 🌟 Enfócate en lo esencial y verás resultados pronto.",
];

/// Index into a message list: |floor(balance / 1000)| mod len
fn message_index(balance: f64, len: usize) -> usize {
    let thousands = (balance / 1000.0).floor().abs();
    // Saturating cast keeps absurd balances in range
    (thousands as u64 % len as u64) as usize
}

/// Encouraging line for the current balance, addressed to `name`
pub fn motivational_message(balance: f64, name: &str) -> String {
    let messages = if balance > 0.0 {
        &POSITIVE_MESSAGES
    } else {
        &IMPROVEMENT_MESSAGES
    };
    messages[message_index(balance, messages.len())].replace("{name}", name)
}
