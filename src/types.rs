//! Common datatypes supporting functions throughout the resale ledger

use std::fmt::Display;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// The number of decimals to track for all amounts
pub const MONEY_SCALE: u32 = 2;

/// Column names of the backing CSV file, in order.
pub const COLUMNS: [&str; 10] = [
    "category",
    "description",
    "purchase_price",
    "asking_price",
    "sale_price",
    "listed_date",
    "sold_date",
    "shipping_cost",
    "other_costs",
    "profit",
];

/// A single item bought for resale.
///
/// Profit is not a field: it is derived from the monetary fields every time it is
/// asked for (see [`Item::profit`]), so it can never drift out of sync with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Free-form classification, if any
    pub category: Option<String>,
    /// What the item is
    pub description: String,
    /// What was paid for the item
    pub purchase_price: Decimal,
    /// The price the item is listed at
    pub asking_price: Decimal,
    /// What the item sold for. Absent while the item is still active.
    pub sale_price: Option<Decimal>,
    /// When the item was listed
    pub listed_date: Option<NaiveDate>,
    /// When the item sold
    pub sold_date: Option<NaiveDate>,
    /// Postage and packaging
    pub shipping_cost: Decimal,
    /// Any other expense attributed to the item
    pub other_costs: Decimal,
}

impl Item {
    /// Creates a new, unsold item with zero expenses.
    #[must_use]
    pub fn new(
        category: Option<String>,
        description: impl Into<String>,
        purchase_price: Decimal,
        asking_price: Decimal,
        listed_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            category: category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            description: Into::<String>::into(description).trim().to_string(),
            purchase_price: money(purchase_price),
            asking_price: money(asking_price),
            sale_price: None,
            listed_date,
            sold_date: None,
            shipping_cost: Decimal::new(0, MONEY_SCALE),
            other_costs: Decimal::new(0, MONEY_SCALE),
        }
    }

    /// Sets the shipping and other costs
    #[must_use]
    pub fn with_costs(mut self, shipping_cost: Decimal, other_costs: Decimal) -> Self {
        self.shipping_cost = money(shipping_cost);
        self.other_costs = money(other_costs);
        self
    }

    /// Records a sale. The date is optional, matching rows that were sold without one.
    #[must_use]
    pub fn with_sale(mut self, sale_price: Decimal, sold_date: Option<NaiveDate>) -> Self {
        self.sale_price = Some(money(sale_price));
        self.sold_date = sold_date;
        self
    }

    /// Returns whether the item has sold
    #[must_use]
    #[inline]
    pub fn is_sold(&self) -> bool {
        self.sale_price.is_some()
    }

    /// Returns the category, if the item has one
    #[must_use]
    #[inline]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Rescales an amount to [`MONEY_SCALE`]
pub(crate) fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(MONEY_SCALE);
    amount
}

/// An ordered collection of [`Item`]s.
///
/// Order is insertion order and is preserved through save and load. No field is
/// unique; identical items may appear more than once.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ItemCollection {
    /// Storage for the items, in insertion order
    pub(crate) items: Vec<Item>,
}

impl ItemCollection {
    /// Creates a new, empty [`ItemCollection`].
    #[must_use]
    pub fn new() -> Self {
        ItemCollection::default()
    }

    /// Returns a collection with `item` added at the end, leaving the rest untouched.
    #[must_use]
    pub fn append(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Adds `item` at the end, in place
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Number of items
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether there are no items
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the items in order
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Returns the last item, if any
    #[must_use]
    pub fn last(&self) -> Option<&Item> {
        self.items.last()
    }

    /// Items whose category equals `category` exactly. `None` keeps every item.
    pub fn filter_by_category<'a>(
        &'a self,
        category: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| category.is_none_or(|wanted| item.category() == Some(wanted)))
    }

    /// Distinct categories, in the order they first appear
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.items.iter().filter_map(Item::category) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a ItemCollection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ItemCollection {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Item> for ItemCollection {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Headline figures for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of sale prices of sold items
    pub total_sales: Decimal,
    /// Sum of purchase, shipping and other costs over every item, sold or not
    pub total_costs: Decimal,
    /// Sum of profit over sold items
    pub total_profit: Decimal,
    /// Number of sold items
    pub sold_count: usize,
    /// Number of items not yet sold
    pub active_count: usize,
}

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Calendar year
    pub year: i32,
    /// Month of the year, 1 to 12
    pub month: u32,
}

impl YearMonth {
    /// Creates a new [`YearMonth`]
    #[must_use]
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month())
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One line of the per-item profit table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfitLine {
    /// The item's category
    pub category: String,
    /// The item's description
    pub description: String,
    /// The item's profit
    pub profit: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn item(category: &str) -> Item {
        Item::new(Some(category.to_string()), "thing", dec!(1), dec!(2), None)
    }

    #[test]
    fn test_blank_category_is_absent() {
        let item = Item::new(Some("  ".to_string()), "thing", dec!(1), dec!(2), None);
        assert_eq!(item.category(), None);
    }

    #[test]
    fn test_text_fields_are_trimmed() {
        let item = Item::new(Some(" shoes ".to_string()), "  trainers \t", dec!(1), dec!(2), None);
        assert_eq!(item.category(), Some("shoes"));
        assert_eq!(item.description, "trainers");
    }

    #[test]
    fn test_amounts_are_rescaled() {
        let item = Item::new(None, "thing", dec!(2.477), dec!(5), None).with_costs(dec!(1), dec!(0));
        assert_eq!(item.purchase_price.to_string(), "2.48");
        assert_eq!(item.asking_price.to_string(), "5.00");
        assert_eq!(item.shipping_cost.to_string(), "1.00");
    }

    #[test]
    fn test_append_preserves_order() {
        let original = ItemCollection::new().append(item("a")).append(item("b"));
        let appended = original.clone().append(item("c"));
        assert_eq!(appended.len(), 3);
        assert_eq!(appended.last(), Some(&item("c")));
        assert!(appended.iter().take(2).eq(original.iter()));
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut items = ItemCollection::new();
        items.push(item("a"));
        items.push(item("a"));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let items: ItemCollection = vec![
            item("shoes"),
            Item::new(None, "unknown", dec!(1), dec!(1), None),
            item("coats"),
            item("shoes"),
        ]
        .into_iter()
        .collect();
        assert_eq!(items.categories(), vec!["shoes", "coats"]);
    }

    #[test]
    fn test_filter_by_category() {
        let items: ItemCollection = vec![item("shoes"), item("coats"), item("shoes")]
            .into_iter()
            .collect();
        assert_eq!(items.filter_by_category(Some("shoes")).count(), 2);
        assert_eq!(items.filter_by_category(Some("hats")).count(), 0);
        assert_eq!(items.filter_by_category(None).count(), 3);
    }

    #[test]
    fn test_year_month_ordering_and_display() {
        assert!(YearMonth::new(2023, 12) < YearMonth::new(2024, 1));
        assert_eq!(YearMonth::new(2024, 3).to_string(), "2024-03");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(YearMonth::from(date), YearMonth::new(2024, 3));
    }
}
