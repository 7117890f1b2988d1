use chrono::NaiveDate;
use im::Vector;

use crate::types::{MonetaryAmount, StoreName};

pub const TRNS_HEADER: &str = "!TRNS\tTRNSID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR";
pub const SPL_HEADER: &str = "!SPL\tSPLID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR";
pub const ENDTRNS_HEADER: &str = "!ENDTRNS";
pub const ENDTRNS: &str = "ENDTRNS";
pub const DATE_FORMAT: &str = "%m/%d/%Y";

const TRANSACTION_TYPE: &str = "DEPOSIT";
const NOT_CLEARED: &str = "N";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Trns,
    Spl,
}

impl LineKind {
    fn tag(&self) -> &'static str {
        match self {
            LineKind::Trns => "TRNS",
            LineKind::Spl => "SPL",
        }
    }
}

/// A TRNS or SPL record. Both share the same field order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLine {
    pub kind: LineKind,
    pub date: NaiveDate,
    pub account: String,
    pub amount: MonetaryAmount,
    pub docnum: String,
    pub memo: String,
}

// A record must stay on one line and keep its field count.
fn field(text: &str) -> String {
    text.replace(|c: char| matches!(c, '\t' | '\r' | '\n'), " ")
}

impl TransactionLine {
    pub fn render(&self) -> String {
        [
            self.kind.tag().to_string(),
            String::new(),
            TRANSACTION_TYPE.to_string(),
            self.date.format(DATE_FORMAT).to_string(),
            field(&self.account),
            String::new(),
            self.amount.two_places(),
            field(&self.docnum),
            field(&self.memo),
            NOT_CLEARED.to_string(),
        ]
        .join("\t")
    }
}

/// Everything one deposit row contributes to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositBlock {
    pub trns: TransactionLine,
    pub splits: Vector<TransactionLine>,
}

impl DepositBlock {
    fn render_into(&self, out: &mut String) {
        for line in std::iter::once(&self.trns).chain(self.splits.iter()) {
            out.push_str(&line.render());
            out.push('\n');
        }
        out.push_str(ENDTRNS);
        out.push('\n');
    }
}

/// The finished IIF text for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IifDocument {
    store: StoreName,
    contents: String,
}

impl IifDocument {
    pub fn from_blocks<'a, I>(store: StoreName, blocks: I) -> Self
    where
        I: IntoIterator<Item = &'a DepositBlock>,
    {
        let mut contents = [TRNS_HEADER, SPL_HEADER, ENDTRNS_HEADER].join("\n");
        contents.push('\n');
        for block in blocks {
            block.render_into(&mut contents);
        }
        Self { store, contents }
    }

    pub fn store(&self) -> &StoreName {
        &self.store
    }

    /// `<store>.iif`, with path separators in the store name replaced.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .store
            .value()
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}.iif", stem)
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }

    /// Number of TRNS...ENDTRNS blocks.
    pub fn block_count(&self) -> usize {
        self.contents.lines().filter(|line| *line == ENDTRNS).count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use im::Vector;
    use rust_decimal::Decimal;

    use super::{DepositBlock, IifDocument, LineKind, TransactionLine};
    use crate::types::{MonetaryAmount, StoreName};

    fn line(kind: LineKind, account: &str, cents: i64, memo: &str) -> TransactionLine {
        TransactionLine {
            kind,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            account: account.to_string(),
            amount: MonetaryAmount::new(Decimal::new(cents, 2)),
            docnum: String::new(),
            memo: memo.to_string(),
        }
    }

    #[test]
    fn trns_line_field_order() {
        let sut = line(LineKind::Trns, "Checking", 1500, "10.0+5.0").render();
        assert_eq!(sut, "TRNS\t\tDEPOSIT\t01/05/2024\tChecking\t\t15.00\t\t10.0+5.0\tN");
    }

    #[test]
    fn empty_account_keeps_its_field() {
        let sut = line(LineKind::Trns, "", 0, "0.0").render();
        assert_eq!(sut, "TRNS\t\tDEPOSIT\t01/05/2024\t\t\t0.00\t\t0.0\tN");
        assert_eq!(sut.split('\t').count(), 10);
    }

    #[test]
    fn tabs_and_newlines_in_text_are_flattened() {
        let sut = line(LineKind::Spl, "Sales\tFood", -125, "two\nlines").render();
        assert_eq!(sut, "SPL\t\tDEPOSIT\t01/05/2024\tSales Food\t\t-1.25\t\ttwo lines\tN");
    }

    #[test]
    fn document_has_header_and_one_block_per_row() {
        let block = DepositBlock {
            trns: line(LineKind::Trns, "Checking", 2000, "20.0"),
            splits: Vector::unit(line(LineKind::Spl, "Food Sales", 2000, "12")),
        };
        let sut = IifDocument::from_blocks(StoreName::new("Downtown"), [block.clone(), block].iter());

        let expected = "\
!TRNS\tTRNSID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR
!SPL\tSPLID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR
!ENDTRNS
TRNS\t\tDEPOSIT\t01/05/2024\tChecking\t\t20.00\t\t20.0\tN
SPL\t\tDEPOSIT\t01/05/2024\tFood Sales\t\t20.00\t\t12\tN
ENDTRNS
TRNS\t\tDEPOSIT\t01/05/2024\tChecking\t\t20.00\t\t20.0\tN
SPL\t\tDEPOSIT\t01/05/2024\tFood Sales\t\t20.00\t\t12\tN
ENDTRNS
";
        assert_eq!(sut.contents(), expected);
        assert_eq!(sut.block_count(), 2);
    }

    #[test]
    fn file_name_is_store_name() {
        let sut = IifDocument::from_blocks(StoreName::new("Mall A/B"), std::iter::empty());
        assert_eq!(sut.file_name(), "Mall A_B.iif");
        assert_eq!(sut.block_count(), 0);
    }
}
