// Per-person honorarium records and the database column contract.

use serde::Serialize;

pub const COL_NAME: &str = "Nama";
pub const COL_PREP: &str = "Honorarium Persiapan UKOMNAS";
pub const COL_BRIEFING: &str = "Honorarium Pemantauan Briefing UKOMNAS";
pub const COL_EXECUTION: &str = "Honorarium Pelaksanaan UKOMNAS";
pub const COL_TAX: &str = "PPH21";

/// Column names the source database must contain, verbatim.
///
/// The Indonesian headers are part of the upstream form contract, not
/// placeholders — schema errors quote this full set to the user.
pub const REQUIRED_COLUMNS: [&str; 5] = [COL_NAME, COL_PREP, COL_BRIEFING, COL_EXECUTION, COL_TAX];

/// One normalized row of the source database.
///
/// Monetary fields are coerced to numbers at the loader boundary; a cell
/// that could not be parsed arrives here as 0.0. Names need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub prep_amount: f64,
    pub briefing_amount: f64,
    pub execution_amount: f64,
    pub withholding_tax: f64,
}

impl Record {
    /// Gross honorarium: the sum of the three component amounts.
    pub fn total_honorarium(&self) -> f64 {
        self.prep_amount + self.briefing_amount + self.execution_amount
    }

    /// Net payable after PPH21 withholding. Negative when the tax exceeds
    /// the gross — no clamping.
    pub fn net_amount(&self) -> f64 {
        self.total_honorarium() - self.withholding_tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prep: f64, briefing: f64, execution: f64, tax: f64) -> Record {
        Record {
            name: "Budi".into(),
            prep_amount: prep,
            briefing_amount: briefing,
            execution_amount: execution,
            withholding_tax: tax,
        }
    }

    #[test]
    fn total_is_sum_of_components() {
        let r = record(500_000.0, 300_000.0, 200_000.0, 100_000.0);
        assert_eq!(r.total_honorarium(), 1_000_000.0);
        assert_eq!(r.net_amount(), 900_000.0);
    }

    #[test]
    fn total_with_zero_components() {
        let r = record(0.0, 0.0, 0.0, 0.0);
        assert_eq!(r.total_honorarium(), 0.0);
        assert_eq!(r.net_amount(), 0.0);

        let r = record(0.0, 250_000.0, 0.0, 0.0);
        assert_eq!(r.total_honorarium(), 250_000.0);
    }

    #[test]
    fn net_goes_negative_when_tax_exceeds_gross() {
        let r = record(0.0, 0.0, 100.0, 500.0);
        assert_eq!(r.total_honorarium(), 100.0);
        assert_eq!(r.net_amount(), -400.0);
    }
}
