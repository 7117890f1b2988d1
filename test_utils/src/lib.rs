use std::{collections::HashSet, str::FromStr};

use rust_decimal::Decimal;

const HEADER: &str = "\
!TRNS\tTRNSID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR
!SPL\tSPLID\tTRNSTYPE\tDATE\tACCNT\tCLASS\tAMOUNT\tDOCNUM\tMEMO\tCLEAR
!ENDTRNS
";

// Only used during testing so no need to return result
/// Expected IIF document: the standard header followed by one tab separated line per entry.
pub fn create_iif(lines: Vec<Vec<&'static str>>) -> String {
    let mut data = String::from(HEADER);
    for line in lines {
        data.push_str(&line.join("\t"));
        data.push('\n');
    }
    data
}

/// TRNS line of a deposit, the way the builder lays out its fields.
pub fn trns(date: &'static str, account: &'static str, amount: &'static str, memo: &'static str) -> Vec<&'static str> {
    vec!["TRNS", "", "DEPOSIT", date, account, "", amount, "", memo, "N"]
}

pub fn spl(date: &'static str, account: &'static str, amount: &'static str, memo: &'static str) -> Vec<&'static str> {
    vec!["SPL", "", "DEPOSIT", date, account, "", amount, "", memo, "N"]
}

pub fn endtrns() -> Vec<&'static str> {
    vec!["ENDTRNS"]
}

/// AMOUNT field of every TRNS and SPL line, in document order.
pub fn iif_amounts(document: &str) -> Vec<Decimal> {
    document
        .lines()
        .filter(|line| line.starts_with("TRNS\t") || line.starts_with("SPL\t"))
        .map(|line| Decimal::from_str(line.split('\t').nth(6).unwrap()).unwrap())
        .collect()
}

// Documents are written one file per store. This compares the produced names without depending
// on directory listing order
pub fn assert_unsorted_eq(s1: &[String], s2: &[String]) {
    let sut1: HashSet<&String> = s1.iter().collect();
    let sut2: HashSet<&String> = s2.iter().collect();
    if s1.len() != s2.len() {
        panic!("lists do not contain the same number of entries");
    }

    sut1.iter().for_each(|k| {
        if !sut2.contains(k) {
            panic!("{} not found in both lists", k)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::{assert_unsorted_eq, create_iif, endtrns, iif_amounts, spl, trns};

    #[test]
    fn create_iif_with_no_lines_is_header_only() {
        let sut = create_iif(vec![]);
        assert_eq!(sut.lines().count(), 3);
        assert!(sut.ends_with("!ENDTRNS\n"));
    }

    #[test]
    fn create_iif_joins_fields_with_tabs() {
        let sut = create_iif(vec![trns("01/15/2024", "Checking", "15.00", "10.0+5.0"), endtrns()]);
        assert!(sut.ends_with("TRNS\t\tDEPOSIT\t01/15/2024\tChecking\t\t15.00\t\t10.0+5.0\tN\nENDTRNS\n"));
    }

    #[test]
    fn amounts_are_read_from_trns_and_spl_lines() {
        let doc = create_iif(vec![
            trns("01/15/2024", "Checking", "15.00", "10.0+5.0"),
            spl("01/15/2024", "Sales", "-3.25", ""),
            endtrns(),
        ]);
        let sut = iif_amounts(&doc);
        assert_eq!(
            sut,
            vec![Decimal::from_str("15.00").unwrap(), Decimal::from_str("-3.25").unwrap()]
        );
    }

    #[test]
    fn two_unsorted_lists_will_assert_eq() {
        let l1 = vec![String::from("a.iif"), String::from("b.iif")];
        let l2 = vec![String::from("b.iif"), String::from("a.iif")];
        assert_unsorted_eq(&l1, &l2);
    }

    #[test]
    #[should_panic]
    fn two_unequal_len_lists_will_assert_false() {
        let l1 = vec![String::from("a.iif")];
        let l2 = vec![String::from("b.iif"), String::from("a.iif")];
        assert_unsorted_eq(&l1, &l2);
    }

    #[test]
    #[should_panic]
    fn two_unequal_lists_will_assert_false() {
        let l1 = vec![String::from("a.iif"), String::from("c.iif")];
        let l2 = vec![String::from("b.iif"), String::from("a.iif")];
        assert_unsorted_eq(&l1, &l2);
    }
}
