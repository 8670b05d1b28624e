use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::types::{Item, ProfitLine, Totals, YearMonth};

impl Item {
    /// Sum of everything spent on the item: purchase, shipping and other costs.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.purchase_price + self.shipping_cost + self.other_costs
    }

    /// Profit on the item, or `None` if it has not sold.
    ///
    /// Always derived from the current field values, never stored.
    #[must_use]
    pub fn profit(&self) -> Option<Decimal> {
        self.sale_price.map(|sale_price| sale_price - self.total_cost())
    }
}

/// Profit on `item`, or `None` if it has not sold. See [`Item::profit`].
#[must_use]
pub fn compute_profit(item: &Item) -> Option<Decimal> {
    item.profit()
}

/// Computes the dashboard figures.
///
/// Costs are summed over every item, sold or not. Unsold items contribute
/// nothing to sales or profit.
pub fn totals<'a, I>(items: I) -> Totals
where
    I: IntoIterator<Item = &'a Item>,
{
    items.into_iter().fold(Totals::default(), |mut totals, item| {
        totals.total_costs += item.total_cost();
        match (item.sale_price, item.profit()) {
            (Some(sale_price), Some(profit)) => {
                totals.total_sales += sale_price;
                totals.total_profit += profit;
                totals.sold_count += 1;
            }
            _ => totals.active_count += 1,
        }
        totals
    })
}

/// Sums sale prices per calendar month of the sale date, oldest month first.
///
/// Only items with both a sale price and a sale date count. An empty result means
/// there is nothing to chart.
pub fn monthly_sales<'a, I>(items: I) -> BTreeMap<YearMonth, Decimal>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut months: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for item in items {
        if let (Some(sale_price), Some(sold_date)) = (item.sale_price, item.sold_date) {
            *months.entry(sold_date.into()).or_default() += sale_price;
        }
    }
    months
}

/// Mean profit per category, over sold items only.
///
/// Categories with no sold items are left out rather than reported as zero.
pub fn mean_profit_by_category<'a, I>(items: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Item>,
{
    mean_by_category(items, Item::profit)
}

/// Mean purchase price per category, over every item.
pub fn mean_purchase_price_by_category<'a, I>(items: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Item>,
{
    mean_by_category(items, |item| Some(item.purchase_price))
}

/// Category, description and profit of every sold item that has a category, in order.
pub fn profit_table<'a, I>(items: I) -> Vec<ProfitLine>
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .filter_map(|item| {
            Some(ProfitLine {
                category: item.category.clone()?,
                description: item.description.clone(),
                profit: item.profit()?,
            })
        })
        .collect()
}

/// Groups `value` by category and averages it. Items without a category, or
/// for which `value` is `None`, are skipped.
fn mean_by_category<'a, I, F>(items: I, value: F) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Item>,
    F: Fn(&Item) -> Option<Decimal>,
{
    let mut sums: BTreeMap<&str, (Decimal, u32)> = BTreeMap::new();
    for item in items {
        if let (Some(category), Some(amount)) = (item.category(), value(item)) {
            let (sum, count) = sums.entry(category).or_default();
            *sum += amount;
            *count += 1;
        }
    }
    sums.into_iter()
        .map(|(category, (sum, count))| (category.to_string(), sum / Decimal::from(count)))
        .collect()
}
