// Aligned preview table for normalized records.

use unicode_width::UnicodeWidthStr;

use spdgen_core::Record;

const HEADERS: [&str; 7] = [
    "Nama",
    "Persiapan",
    "Briefing",
    "Pelaksanaan",
    "PPH21",
    "Total",
    "Netto",
];

const NAME_WIDTH_MAX: usize = 32;

/// Render records as an aligned table: name left-aligned, amounts
/// right-aligned, derived totals included.
pub fn render_table(records: &[Record]) -> String {
    let rows: Vec<[String; 7]> = records
        .iter()
        .map(|r| {
            [
                truncate_display(&r.name, NAME_WIDTH_MAX),
                fmt_amount(r.prep_amount),
                fmt_amount(r.briefing_amount),
                fmt_amount(r.execution_amount),
                fmt_amount(r.withholding_tax),
                fmt_amount(r.total_honorarium()),
                fmt_amount(r.net_amount()),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| display_width(h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    let mut out = String::new();

    let header: Vec<String> = HEADERS
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { pad_right(h, widths[i]) } else { pad_left(h, widths[i]) })
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 0 {
                    pad_right(cell, widths[i])
                } else {
                    pad_left(cell, widths[i])
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

fn fmt_amount(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Display width of a string, accounting for CJK double-width, emoji, etc.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if
/// truncated. Uses Unicode display width so CJK alignment stays correct.
fn truncate_display(s: &str, width: usize) -> String {
    let str_width = display_width(s);
    if str_width <= width {
        return s.to_string();
    }

    // Walk chars, accumulating display width, stop at width - 2 to leave
    // room for ".."
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(sw)))
}

fn pad_left(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(sw)), s)
}
