// Fixed cell-address contract for the SPD template.

use crate::record::Record;

/// A value to be written into a single template cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellWrite {
    Text(String),
    Number(f64),
}

/// Role → cell address mapping for one template layout.
///
/// Addresses are A1-style and resolve against the workbook's first sheet.
/// The mapping is an implicit schema contract with the shipped form: the
/// filler does not validate that the opened template actually has this
/// shape, it writes to these addresses unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct TemplateLayout {
    pub name: &'static str,
    pub prep_amount: &'static str,
    pub briefing_amount: &'static str,
    pub execution_amount: &'static str,
    pub total_honorarium: &'static str,
    pub withholding_tax: &'static str,
    pub net_amount: &'static str,
}

/// The SPD 3-honor form layout.
pub const SPD_LAYOUT: TemplateLayout = TemplateLayout {
    name: "D26",
    prep_amount: "C11",
    briefing_amount: "C12",
    execution_amount: "C13",
    total_honorarium: "C14",
    withholding_tax: "C16",
    net_amount: "C18",
};

impl TemplateLayout {
    /// Expand a record into the (address, value) writes for this layout.
    ///
    /// Derived amounts are computed here, fresh per call; nothing is ever
    /// read back from the document.
    pub fn writes(&self, record: &Record) -> Vec<(&'static str, CellWrite)> {
        vec![
            (self.name, CellWrite::Text(record.name.clone())),
            (self.prep_amount, CellWrite::Number(record.prep_amount)),
            (self.briefing_amount, CellWrite::Number(record.briefing_amount)),
            (self.execution_amount, CellWrite::Number(record.execution_amount)),
            (self.total_honorarium, CellWrite::Number(record.total_honorarium())),
            (self.withholding_tax, CellWrite::Number(record.withholding_tax)),
            (self.net_amount, CellWrite::Number(record.net_amount())),
        ]
    }
}
