//! Plain-text rendering of the dashboard and financial analysis pages

use std::{collections::BTreeMap, io::Write};

use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    ops,
    types::{money, ItemCollection},
};

/// Width of the longest bar in a chart, in characters
const BAR_WIDTH: usize = 40;

/// Formats an amount with two decimal places
fn amount(value: Decimal) -> String {
    money(value).to_string()
}

/// Writes one labelled line per entry, with a bar scaled to the largest value.
/// Zero and negative values get no bar.
fn write_bars<W, I>(out: &mut W, rows: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (String, Decimal)>,
{
    let rows: Vec<_> = rows.into_iter().collect();
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = rows
        .iter()
        .map(|(_, value)| *value)
        .max()
        .unwrap_or(Decimal::ZERO);
    for (label, value) in &rows {
        let length = if max > Decimal::ZERO && *value > Decimal::ZERO {
            (*value / max * Decimal::from(BAR_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0)
        } else {
            0
        };
        writeln!(
            out,
            "  {label:<label_width$}  {:>10}  {}",
            amount(*value),
            "#".repeat(length)
        )?;
    }
    Ok(())
}

fn write_category_means<W: Write>(
    out: &mut W,
    title: &str,
    means: BTreeMap<String, Decimal>,
) -> std::io::Result<()> {
    writeln!(out, "{title}")?;
    if means.is_empty() {
        writeln!(out, "  No data yet.")?;
        return Ok(());
    }
    write_bars(out, means)
}

/// Renders the dashboard: headline totals and a chart of sales per month.
pub fn write_dashboard<W: Write>(out: &mut W, items: &ItemCollection) -> std::io::Result<()> {
    let totals = ops::totals(items);
    writeln!(out, "Sales summary")?;
    writeln!(out, "  Total sales:   {:>10}", amount(totals.total_sales))?;
    writeln!(out, "  Total costs:   {:>10}", amount(totals.total_costs))?;
    writeln!(out, "  Total profit:  {:>10}", amount(totals.total_profit))?;
    writeln!(out, "  Items sold:    {:>10}", totals.sold_count)?;
    writeln!(out, "  Active items:  {:>10}", totals.active_count)?;
    writeln!(out)?;

    let months = ops::monthly_sales(items);
    if months.is_empty() {
        writeln!(out, "No sales with a recorded date to chart yet.")?;
        return Ok(());
    }
    writeln!(out, "Monthly sales")?;
    write_bars(
        out,
        months
            .into_iter()
            .map(|(month, total)| (month.to_string(), total)),
    )
}

/// Renders the financial analysis: profit recomputed for every item, averaged
/// per category, followed by the per-item profit table.
pub fn write_analysis<W: Write>(out: &mut W, items: &ItemCollection) -> std::io::Result<()> {
    write_category_means(
        out,
        "Mean profit by category",
        ops::mean_profit_by_category(items),
    )?;
    writeln!(out)?;
    write_category_means(
        out,
        "Mean purchase price by category",
        ops::mean_purchase_price_by_category(items),
    )?;
    writeln!(out)?;

    writeln!(out, "Profit by item")?;
    let lines = ops::profit_table(items);
    if lines.is_empty() {
        writeln!(out, "  No sold items yet.")?;
        return Ok(());
    }
    let category_width = lines.iter().map(|l| l.category.len()).max().unwrap_or(0);
    let description_width = lines.iter().map(|l| l.description.len()).max().unwrap_or(0);
    for line in &lines {
        writeln!(
            out,
            "  {:<category_width$}  {:<description_width$}  {:>10}",
            line.category,
            line.description,
            amount(line.profit)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::types::Item;

    use super::*;

    fn sample() -> ItemCollection {
        ItemCollection::new()
            .append(
                Item::new(Some("shoes".to_string()), "trainers", dec!(10), dec!(18), None)
                    .with_costs(dec!(1), dec!(0))
                    .with_sale(dec!(20), NaiveDate::from_ymd_opt(2024, 3, 5)),
            )
            .append(Item::new(Some("coats".to_string()), "parka", dec!(5), dec!(12), None))
    }

    fn render<F>(render: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
    {
        let mut output = vec![];
        render(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_dashboard() {
        let items = sample();
        let text = render(|out| write_dashboard(out, &items));
        assert!(text.contains("Total sales:        20.00"));
        assert!(text.contains("Total costs:        16.00"));
        assert!(text.contains("Total profit:        9.00"));
        assert!(text.contains("Active items:           1"));
        assert!(text.contains(&format!("2024-03       20.00  {}", "#".repeat(BAR_WIDTH))));
    }

    #[test]
    fn test_dashboard_without_dated_sales() {
        let items = ItemCollection::new();
        let text = render(|out| write_dashboard(out, &items));
        assert!(text.contains("Total sales:         0.00"));
        assert!(text.contains("No sales with a recorded date to chart yet."));
        assert!(!text.contains("Monthly sales"));
    }

    #[test]
    fn test_bars_scale_to_largest() {
        let text = render(|out| {
            write_bars(
                out,
                vec![
                    ("a".to_string(), dec!(10)),
                    ("b".to_string(), dec!(5)),
                    ("c".to_string(), dec!(-2)),
                ],
            )
        });
        let bars: Vec<usize> = text
            .lines()
            .map(|line| line.chars().filter(|c| *c == '#').count())
            .collect();
        assert_eq!(bars, vec![BAR_WIDTH, BAR_WIDTH / 2, 0]);
    }

    #[test]
    fn test_analysis() {
        let items = sample();
        let text = render(|out| write_analysis(out, &items));
        let profit_section = text.split("Mean purchase price").next().unwrap();
        assert!(profit_section.contains("shoes"));
        assert!(!profit_section.contains("coats"));
        assert!(text.contains("coats        5.00"));
        assert!(text.contains("shoes  trainers        9.00"));
    }

    #[test]
    fn test_analysis_empty() {
        let items = ItemCollection::new();
        let text = render(|out| write_analysis(out, &items));
        assert!(text.contains("No data yet."));
        assert!(text.contains("No sold items yet."));
    }
}
