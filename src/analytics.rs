use std::collections::{BTreeMap, HashMap, HashSet};

use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;

use crate::errors::AnalyticsError;
use crate::models::Transaction;

pub const DEFAULT_TOP_LIMIT: usize = 5;
pub const DEFAULT_LOW_THRESHOLD: i64 = 10;

const HUNDRED: Decimal = dec!(100);

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct RegionStats {
    #[getset(get = "pub")]
    region: String,
    #[getset(get_copy = "pub")]
    sales: Decimal,
    #[getset(get_copy = "pub")]
    count: usize,
    #[getset(get_copy = "pub")]
    percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ProductSales {
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    quantity: i64,
    #[getset(get_copy = "pub")]
    revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct CustomerStats {
    #[getset(get = "pub")]
    customer_id: String,
    #[getset(get_copy = "pub")]
    spent: Decimal,
    #[getset(get_copy = "pub")]
    orders: usize,
    #[getset(get_copy = "pub")]
    average: Decimal,
    #[getset(get = "pub")]
    products_bought: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct DailyStats {
    #[getset(get = "pub")]
    date: String,
    #[getset(get_copy = "pub")]
    sales: Decimal,
    #[getset(get_copy = "pub")]
    count: usize,
    #[getset(get_copy = "pub")]
    unique_customers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Getters, CopyGetters)]
pub struct PeakDay {
    #[getset(get = "pub")]
    date: String,
    #[getset(get_copy = "pub")]
    sales: Decimal,
    #[getset(get_copy = "pub")]
    count: usize,
}

/// Accumulators keyed by string, iterated in first-seen order.
struct Groups<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V: Default> Groups<V> {
    fn new() -> Self {
        Groups {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

/// `part` as a percentage of `whole`, 2 dp. Zero when `whole` is zero.
fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal, AnalyticsError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let percent = part
        .checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or(AnalyticsError::ValueOverflow)?;
    Ok(percent.round_dp(2))
}

fn add_amount(acc: &mut Decimal, tx: &Transaction) -> Result<(), AnalyticsError> {
    *acc = acc
        .checked_add(tx.amount())
        .ok_or(AnalyticsError::ValueOverflow)?;
    Ok(())
}

pub fn calculate_total_revenue(transactions: &[Transaction]) -> Result<Decimal, AnalyticsError> {
    let mut total = Decimal::ZERO;
    for tx in transactions {
        add_amount(&mut total, tx)?;
    }
    Ok(total)
}

/// Sales per region, largest first.
pub fn region_wise_sales(transactions: &[Transaction]) -> Result<Vec<RegionStats>, AnalyticsError> {
    let total = calculate_total_revenue(transactions)?;

    let mut groups: Groups<(Decimal, usize)> = Groups::new();
    for tx in transactions {
        let (sales, count) = groups.entry(tx.region());
        add_amount(sales, tx)?;
        *count += 1;
    }

    let mut regions = Vec::new();
    for (region, (sales, count)) in groups.into_entries() {
        regions.push(RegionStats {
            region,
            sales,
            count,
            percent: percent_of(sales, total)?,
        });
    }

    regions.sort_by(|a, b| b.sales.cmp(&a.sales));
    Ok(regions)
}

fn product_totals(transactions: &[Transaction]) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut groups: Groups<(i64, Decimal)> = Groups::new();
    for tx in transactions {
        let (quantity, revenue) = groups.entry(tx.product_name());
        *quantity = quantity
            .checked_add(tx.quantity())
            .ok_or(AnalyticsError::ValueOverflow)?;
        add_amount(revenue, tx)?;
    }

    Ok(groups
        .into_entries()
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductSales {
            name,
            quantity,
            revenue,
        })
        .collect())
}

/// The `limit` products with the highest total quantity sold.
pub fn top_selling_products(
    transactions: &[Transaction],
    limit: usize,
) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut products = product_totals(transactions)?;
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(limit);
    Ok(products)
}

/// Every product whose total quantity is below `threshold`, lowest first.
pub fn low_performing_products(
    transactions: &[Transaction],
    threshold: i64,
) -> Result<Vec<ProductSales>, AnalyticsError> {
    let mut products: Vec<ProductSales> = product_totals(transactions)?
        .into_iter()
        .filter(|p| p.quantity < threshold)
        .collect();
    products.sort_by_key(|p| p.quantity);
    Ok(products)
}

/// Spend per customer, biggest spender first.
pub fn customer_analysis(transactions: &[Transaction]) -> Result<Vec<CustomerStats>, AnalyticsError> {
    let mut groups: Groups<(Decimal, usize, Vec<String>)> = Groups::new();
    for tx in transactions {
        let (spent, orders, products) = groups.entry(tx.customer_id());
        add_amount(spent, tx)?;
        *orders += 1;
        if !products.contains(tx.product_name()) {
            products.push(tx.product_name().clone());
        }
    }

    let mut customers: Vec<CustomerStats> = groups
        .into_entries()
        .into_iter()
        .map(|(customer_id, (spent, orders, products_bought))| {
            let average = if orders == 0 {
                Decimal::ZERO
            } else {
                (spent / Decimal::from(orders)).round_dp(2)
            };
            CustomerStats {
                customer_id,
                spent,
                orders,
                average,
                products_bought,
            }
        })
        .collect();

    customers.sort_by(|a, b| b.spent.cmp(&a.spent));
    Ok(customers)
}

/// Sales per date key, ascending by key.
pub fn daily_sales_trend(transactions: &[Transaction]) -> Result<Vec<DailyStats>, AnalyticsError> {
    let mut days: BTreeMap<&str, (Decimal, usize, HashSet<&str>)> = BTreeMap::new();
    for tx in transactions {
        let (sales, count, customers) = days.entry(tx.date().as_str()).or_default();
        add_amount(sales, tx)?;
        *count += 1;
        customers.insert(tx.customer_id().as_str());
    }

    Ok(days
        .into_iter()
        .map(|(date, (sales, count, customers))| DailyStats {
            date: date.to_string(),
            sales,
            count,
            unique_customers: customers.len(),
        })
        .collect())
}

/// The day with the strictly greatest sales. Earliest date wins a tie.
/// Empty input yields an empty date with zero sales.
pub fn find_peak_sales_day(transactions: &[Transaction]) -> Result<PeakDay, AnalyticsError> {
    let mut peak = PeakDay::default();
    for day in daily_sales_trend(transactions)? {
        if day.sales > peak.sales {
            peak = PeakDay {
                date: day.date,
                sales: day.sales,
                count: day.count,
            };
        }
    }
    Ok(peak)
}

/// Every aggregation over one transaction set, computed together.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct SalesAnalytics {
    #[getset(get_copy = "pub")]
    total_revenue: Decimal,
    #[getset(get = "pub")]
    regions: Vec<RegionStats>,
    #[getset(get = "pub")]
    top_products: Vec<ProductSales>,
    #[getset(get = "pub")]
    low_products: Vec<ProductSales>,
    #[getset(get = "pub")]
    customers: Vec<CustomerStats>,
    #[getset(get = "pub")]
    daily: Vec<DailyStats>,
    #[getset(get = "pub")]
    peak: PeakDay,
}

impl SalesAnalytics {
    /// Fails with [`AnalyticsError::ValueOverflow`] when a total leaves the
    /// `Decimal` or `i64` range.
    pub fn compute(
        transactions: &[Transaction],
        top_limit: usize,
        low_threshold: i64,
    ) -> Result<Self, AnalyticsError> {
        Ok(SalesAnalytics {
            total_revenue: calculate_total_revenue(transactions)?,
            regions: region_wise_sales(transactions)?,
            top_products: top_selling_products(transactions, top_limit)?,
            low_products: low_performing_products(transactions, low_threshold)?,
            customers: customer_analysis(transactions)?,
            daily: daily_sales_trend(transactions)?,
            peak: find_peak_sales_day(transactions)?,
        })
    }
}
