/// Where the memo of a split line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoSource {
    Fixed(&'static str),
    /// The row's customer count cell.
    CustomerCount,
    /// The `+` joined tender amounts also shown on the TRNS line.
    TenderDisplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoRule {
    pub source: MemoSource,
    /// Emit the split even when the amount is zero.
    pub always_emit: bool,
}

/// Memo table, keyed by the exact (trimmed) column name of the deposit export.
pub fn memo_rule(column: &str) -> Option<MemoRule> {
    let (source, always_emit) = match column {
        "Net Sales" => (MemoSource::CustomerCount, true),
        "Deposit" => (MemoSource::TenderDisplay, true),
        "Over/Short" => (MemoSource::Fixed("Cash Over/Short"), true),
        "Sales Tax" => (MemoSource::Fixed("Sales Tax Collected"), false),
        "Paid Outs" => (MemoSource::Fixed("Paid Outs"), false),
        "Gift Cert Sold" => (MemoSource::Fixed("Gift Certificates Sold"), false),
        "Gift Cert Redm" => (MemoSource::Fixed("Gift Certificates Redeemed"), false),
        "Tips" => (MemoSource::Fixed("Tips Paid"), false),
        _ => return None,
    };
    Some(MemoRule {
        source,
        always_emit,
    })
}

/// Per-row values that derived memos draw from.
#[derive(Debug, Clone, Copy)]
pub struct MemoContext<'a> {
    pub customer_count: Option<&'a str>,
    pub tender_display: &'a str,
}

pub fn resolve_memo(column: &str, context: &MemoContext) -> String {
    match memo_rule(column).map(|rule| rule.source) {
        Some(MemoSource::Fixed(memo)) => memo.to_string(),
        Some(MemoSource::CustomerCount) => context.customer_count.unwrap_or_default().to_string(),
        Some(MemoSource::TenderDisplay) => context.tender_display.to_string(),
        None => String::new(),
    }
}

pub fn always_emitted(column: &str) -> bool {
    memo_rule(column).map_or(false, |rule| rule.always_emit)
}
