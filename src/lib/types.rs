use std::str::FromStr;

use im::HashMap;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::utils::OrDefault;

pub const TENDER_COUNT: usize = 5;

pub const DEFAULT_STORE_COLUMN: &str = "Store Name";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
// Source exports cut header names at twelve characters.
pub const DEFAULT_CUSTOMER_COUNT_COLUMN: &str = "Customer Cou";
pub const DEFAULT_DEPOSIT_COLUMN: &str = "Deposit";
pub const DEFAULT_TENDER_COLUMNS: [&str; TENDER_COUNT] = ["#1", "#2", "#3", "#4", "#5"];

#[derive(Default, Hash, Eq, PartialEq, Clone, Debug)]
pub struct StoreName(String);

impl StoreName {
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Debug)]
pub struct MonetaryAmount(Decimal);

impl MonetaryAmount {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parses a cell as a decimal amount. Plain and scientific notation are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
            .map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the sum leaves the range of the decimal type.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Two decimal places, halves rounded away from zero (`0.125` -> `0.13`, `-0.125` -> `-0.13`).
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Fixed two decimal places, the form amounts take in an IIF document.
    pub fn two_places(&self) -> String {
        format!("{:.2}", self.rounded().0)
    }

    /// Shortest representation that still carries a fractional digit: `10.0`, `5.25`, `0.0`.
    pub fn display(&self) -> String {
        let normalized = self.0.normalize();
        if normalized.scale() == 0 {
            format!("{}.0", normalized)
        } else {
            normalized.to_string()
        }
    }
}

/// The five numbered tender amounts of a deposit row, in column order.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct TenderFields([MonetaryAmount; TENDER_COUNT]);

impl TenderFields {
    pub fn new(amounts: [MonetaryAmount; TENDER_COUNT]) -> Self {
        Self(amounts)
    }

    /// Sum of all five tenders rounded to two decimal places, `None` on overflow.
    pub fn total(&self) -> Option<MonetaryAmount> {
        self.0
            .iter()
            .try_fold(MonetaryAmount::default(), |acc, amount| acc.checked_add(*amount))
            .map(|sum| sum.rounded())
    }

    /// Tenders joined with `+`, up to and including the last non-zero one. The first tender is
    /// always shown, so an all-zero row displays as `0.0`.
    pub fn display(&self) -> String {
        let shown = self
            .0
            .iter()
            .rposition(|amount| !amount.is_zero())
            .map_or(1, |idx| idx + 1);
        self.0[..shown]
            .iter()
            .map(MonetaryAmount::display)
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Names of the columns of a deposit export that carry row structure rather than split amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub store: String,
    pub date: String,
    pub customer_count: String,
    pub tenders: [String; TENDER_COUNT],
    /// Column whose GL account, together with the store, selects the bank account of the deposit.
    pub deposit: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            store: DEFAULT_STORE_COLUMN.to_string(),
            date: DEFAULT_DATE_COLUMN.to_string(),
            customer_count: DEFAULT_CUSTOMER_COUNT_COLUMN.to_string(),
            tenders: DEFAULT_TENDER_COLUMNS.map(String::from),
            deposit: DEFAULT_DEPOSIT_COLUMN.to_string(),
        }
    }
}

impl ColumnLayout {
    /// Store, date, customer count and tender columns never become split lines.
    pub fn is_structural(&self, column: &str) -> bool {
        column == self.store
            || column == self.date
            || column == self.customer_count
            || self.tenders.iter().any(|tender| tender == column)
    }
}

/// One line of the deposit export with its cells still as text. Parsing happens while building,
/// so that a bad cell only costs its own row or store.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRow {
    /// Line in the source file, the header being line 1.
    pub line: usize,
    pub store: StoreName,
    pub date: String,
    pub tenders: [String; TENDER_COUNT],
    pub customer_count: Option<String>,
    /// Every non-structural column with its cell, in header order.
    pub amounts: Vec<(String, String)>,
}

/// Original column name to general ledger account name.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct GlMapping(HashMap<String, String>);

impl GlMapping {
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self(mapping)
    }

    /// Trimmed column names without an entry are returned as they are.
    pub fn map_column(&self, column: &str) -> String {
        let column = column.trim();
        match self.0.get(column) {
            Some(account) => account.clone(),
            None => column.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for GlMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// (GL column name, store name) to the bank account the deposit lands in.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct BankMapping(HashMap<(String, String), String>);

impl BankMapping {
    pub fn new(mapping: HashMap<(String, String), String>) -> Self {
        Self(mapping)
    }

    /// Empty when the pair has no entry.
    pub fn account_for(&self, column: &str, store: &StoreName) -> String {
        self.0
            .get_or_default(&(column.trim().to_string(), store.value().to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<((String, String), String)> for BankMapping {
    fn from_iter<I: IntoIterator<Item = ((String, String), String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{BankMapping, ColumnLayout, GlMapping, MonetaryAmount, StoreName, TenderFields};

    fn amount(raw: &str) -> MonetaryAmount {
        MonetaryAmount::parse(raw).unwrap()
    }

    fn tenders(raw: [&str; 5]) -> TenderFields {
        TenderFields::new(raw.map(amount))
    }

    #[test]
    fn amounts_parse_plain_and_scientific() {
        assert_eq!(amount(" 12.50 ").value(), Decimal::new(1250, 2));
        assert_eq!(amount("1.5e2").value(), Decimal::new(150, 0));
        assert_eq!(MonetaryAmount::parse("abc"), None);
        assert_eq!(MonetaryAmount::parse(""), None);
    }

    #[test]
    fn display_keeps_one_fractional_digit() {
        assert_eq!(amount("10.00").display(), "10.0");
        assert_eq!(amount("0").display(), "0.0");
        assert_eq!(amount("5.250").display(), "5.25");
        assert_eq!(amount("-1.5").display(), "-1.5");
    }

    #[test]
    fn two_places_pads_and_rounds() {
        assert_eq!(amount("0").two_places(), "0.00");
        assert_eq!(amount("3.5").two_places(), "3.50");
        assert_eq!(amount("1.005").two_places(), "1.01");
        assert_eq!(amount("1.015").two_places(), "1.02");
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(amount("0.125").rounded(), amount("0.13"));
        assert_eq!(amount("-0.125").rounded(), amount("-0.13"));
        assert_eq!(amount("0.124").rounded(), amount("0.12"));
    }

    #[test]
    fn total_sums_all_tenders_and_rounds() {
        let sut = tenders(["10.00", "5.00", "0", "0", "0"]);
        assert_eq!(sut.total(), Some(amount("15.00")));

        let sut = tenders(["0.333", "0.333", "0.333", "0", "0.001"]);
        assert_eq!(sut.total(), Some(amount("1.00")));
    }

    #[test]
    fn total_overflow_is_none() {
        let max = "79228162514264337593543950335";
        assert_eq!(tenders([max, max, "0", "0", "0"]).total(), None);
        assert!(tenders([max, "0", "0", "0", "0"]).total().is_some());
    }

    #[test]
    fn display_drops_trailing_zero_tenders() {
        assert_eq!(tenders(["10.00", "5.00", "0", "0", "0"]).display(), "10.0+5.0");
        assert_eq!(tenders(["1", "2", "3", "4", "5"]).display(), "1.0+2.0+3.0+4.0+5.0");
    }

    #[test]
    fn display_keeps_inner_zero_tenders() {
        assert_eq!(
            tenders(["100", "0", "0", "0", "25"]).display(),
            "100.0+0.0+0.0+0.0+25.0"
        );
        assert_eq!(tenders(["0", "7.5", "0", "0", "0"]).display(), "0.0+7.5");
    }

    #[test]
    fn display_of_all_zero_tenders_is_first_field() {
        assert_eq!(tenders(["0", "0", "0", "0", "0"]).display(), "0.0");
    }

    #[test]
    fn layout_marks_structural_columns() {
        let layout = ColumnLayout::default();
        assert!(layout.is_structural("Store Name"));
        assert!(layout.is_structural("Customer Cou"));
        assert!(layout.is_structural("#4"));
        assert!(!layout.is_structural("Net Sales"));
        assert!(!layout.is_structural("Deposit"));
    }

    #[test]
    fn unmapped_columns_pass_through_trimmed() {
        let sut: GlMapping = [(String::from("Net Sales"), String::from("Food Sales"))]
            .into_iter()
            .collect();
        assert_eq!(sut.map_column(" Net Sales  "), "Food Sales");
        assert_eq!(sut.map_column("Paid Outs   "), "Paid Outs");
    }

    #[test]
    fn bank_mapping_miss_is_empty() {
        let sut: BankMapping = [(
            (String::from("Undeposited Funds"), String::from("Downtown")),
            String::from("Checking"),
        )]
        .into_iter()
        .collect();
        assert_eq!(
            sut.account_for("Undeposited Funds", &StoreName::new("Downtown")),
            "Checking"
        );
        assert_eq!(sut.account_for("Undeposited Funds", &StoreName::new("Airport")), "");
    }
}
