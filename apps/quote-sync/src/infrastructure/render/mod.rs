//! Terminal Table Renderer
//!
//! Formats a [`DisplaySnapshot`] as the plain-text stock table printed by
//! the binary.

use std::fmt::Write as _;

use crate::domain::display::DisplaySnapshot;

const HEADERS: [&str; 4] = ["Symbol", "Open Price", "Current Price", "Refresh Interval"];

/// Render the stock list.
///
/// While the loading flag is up nothing but `Loading...` is shown; an empty
/// list renders a single placeholder row.
#[must_use]
pub fn render_table(snapshot: &DisplaySnapshot) -> String {
    if snapshot.loading {
        return "Loading...\n".to_string();
    }

    let rows: Vec<[String; 4]> = snapshot
        .quotes
        .iter()
        .map(|q| {
            [
                q.symbol.clone(),
                format!("{:.2}", q.open_price.round_dp(2)),
                format!("{:.2}", q.current_price.round_dp(2)),
                format!("{}s", q.refresh_interval),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::from("Stock List\n");
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));

    if rows.is_empty() {
        out.push_str("No stocks available\n");
    } else {
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
    }

    let _ = writeln!(
        out,
        "[{}] {} quotes, revision {}",
        snapshot.connection.as_str(),
        rows.len(),
        snapshot.revision
    );
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display::ConnectionState;
    use crate::domain::quotes::{QuoteList, QuoteRecord};
    use rust_decimal::Decimal;

    #[test]
    fn loading_hides_table() {
        let snapshot = DisplaySnapshot {
            loading: true,
            ..Default::default()
        };
        assert_eq!(render_table(&snapshot), "Loading...\n");
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let rendered = render_table(&DisplaySnapshot::default());
        assert!(rendered.contains("No stocks available"));
        assert!(rendered.contains("Symbol"));
    }

    #[test]
    fn prices_use_two_decimals_and_interval_seconds() {
        let snapshot = DisplaySnapshot {
            quotes: QuoteList::from(vec![QuoteRecord::new(
                "AAPL",
                Decimal::new(10, 0),
                Decimal::new(105_678, 4),
                5,
            )]),
            connection: ConnectionState::Open,
            revision: 4,
            ..Default::default()
        };

        let rendered = render_table(&snapshot);
        assert!(rendered.contains("AAPL"));
        assert!(rendered.contains("10.00"));
        assert!(rendered.contains("10.57"));
        assert!(rendered.contains("5s"));
        assert!(rendered.contains("[open] 1 quotes, revision 4"));
    }
}
