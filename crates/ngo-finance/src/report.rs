use ngo_core::{
    FinanceSummary, PurchaseHistoryFilter, PurchaseHistoryRow, Transaction, TransactionType,
    round2,
};
use rust_decimal::Decimal;

/// Totals a set of ledger rows. Used per school and for central finance.
/// Totals saturate at `Decimal::MAX` instead of overflowing.
pub fn summarize(entries: &[Transaction]) -> FinanceSummary {
    let total_for = |kind: TransactionType| -> Decimal {
        entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| round2(entry.amount))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    };

    let total_income = round2(total_for(TransactionType::Income));
    let total_expense = round2(total_for(TransactionType::Expense));

    FinanceSummary {
        total_income,
        total_expense,
        net_balance: round2(total_income.saturating_sub(total_expense)),
    }
}

/// Projects item-bearing income rows into purchase history, keeping ledger order.
pub fn purchase_history(
    entries: &[Transaction],
    filter: &PurchaseHistoryFilter,
) -> Vec<PurchaseHistoryRow> {
    entries
        .iter()
        .filter(|entry| entry.kind == TransactionType::Income)
        .filter_map(|entry| {
            let item_name = entry.item_name.as_ref()?;
            Some(PurchaseHistoryRow {
                date: entry.date,
                school_id: entry.school_id.clone(),
                student_id: entry.student_id.clone(),
                item_name: item_name.clone(),
                quantity: entry.quantity,
            })
        })
        .filter(|row| matches_history_filter(row, filter))
        .collect()
}

fn matches_history_filter(row: &PurchaseHistoryRow, filter: &PurchaseHistoryFilter) -> bool {
    if filter.start_date.is_some_and(|start| row.date < start) {
        return false;
    }
    if filter.end_date.is_some_and(|end| row.date > end) {
        return false;
    }

    let exact = |wanted: &Option<String>, actual: Option<&str>| {
        wanted.as_deref().is_none_or(|wanted| actual == Some(wanted))
    };

    exact(&filter.student_id, row.student_id.as_deref())
        && exact(&filter.item_name, Some(row.item_name.as_str()))
        && exact(&filter.school_id, row.school_id.as_deref())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use ngo_core::NewTransaction;
    use uuid::Uuid;

    use super::*;

    fn row(
        kind: TransactionType,
        day: u32,
        amount: &str,
        item_name: Option<&str>,
        student_id: Option<&str>,
    ) -> Transaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            kind,
            category: "test".to_string(),
            school_id: Some("S1".to_string()),
            school_name: None,
            student_id: student_id.map(str::to_string),
            item_name: item_name.map(str::to_string),
            quantity: item_name.map(|_| 2),
            price: None,
            amount: amount.parse().unwrap(),
            description: None,
        }
        .into_transaction(Uuid::now_v7(), Utc::now())
    }

    #[test]
    fn summary_nets_income_against_expense() {
        let entries = vec![
            row(TransactionType::Income, 1, "60", Some("Notebook"), Some("STU-1")),
            row(TransactionType::Income, 2, "10.005", None, None),
            row(TransactionType::Expense, 3, "25.50", None, None),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.total_income, "70.01".parse::<Decimal>().unwrap());
        assert_eq!(summary.total_expense, "25.50".parse::<Decimal>().unwrap());
        assert_eq!(summary.net_balance, "44.51".parse::<Decimal>().unwrap());
    }

    #[test]
    fn huge_totals_saturate() {
        let max = Decimal::MAX.to_string();
        let entries = vec![
            row(TransactionType::Income, 1, &max, None, None),
            row(TransactionType::Income, 2, &max, None, None),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.total_income, Decimal::MAX);
        assert_eq!(summary.net_balance, Decimal::MAX);
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        assert_eq!(summarize(&[]), FinanceSummary::default());
    }

    #[test]
    fn history_keeps_only_item_income() {
        let entries = vec![
            row(TransactionType::Income, 1, "60", Some("Notebook"), Some("STU-1")),
            row(TransactionType::Income, 2, "10", None, Some("STU-1")),
            row(TransactionType::Expense, 3, "25", Some("Notebook"), None),
        ];

        let history = purchase_history(&entries, &PurchaseHistoryFilter::default());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].item_name, "Notebook");
        assert_eq!(history[0].quantity, Some(2));
    }

    #[test]
    fn history_date_bounds_are_inclusive() {
        let entries = vec![
            row(TransactionType::Income, 1, "1", Some("Pen"), Some("STU-1")),
            row(TransactionType::Income, 5, "1", Some("Pen"), Some("STU-2")),
            row(TransactionType::Income, 9, "1", Some("Book"), Some("STU-1")),
        ];
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d);

        let between = PurchaseHistoryFilter {
            start_date: day(1),
            end_date: day(5),
            ..Default::default()
        };
        assert_eq!(purchase_history(&entries, &between).len(), 2);

        let from = PurchaseHistoryFilter {
            start_date: day(5),
            ..Default::default()
        };
        assert_eq!(purchase_history(&entries, &from).len(), 2);

        let student_pens = PurchaseHistoryFilter {
            student_id: Some("STU-1".to_string()),
            item_name: Some("Pen".to_string()),
            ..Default::default()
        };
        let rows = purchase_history(&entries, &student_pens);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(1).unwrap());
    }
}
