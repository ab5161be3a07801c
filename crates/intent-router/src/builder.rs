use supplychain_core_types::{CandidateQuery, Intent};

use crate::modifiers::{wants_full_ranking, wants_region_grouping, RegionLiteral};
use crate::thresholds::MovementClass;

const TABLE: &str = "inventory";

const QUARTER: &str = "strftime('%Y', `order date (DateOrders)`) || '-Q' || \
((CAST(strftime('%m', `order date (DateOrders)`) AS INTEGER) + 2) / 3)";

enum Predicate {
    RegionEquals(RegionLiteral),
    Fixed(&'static str),
}

impl Predicate {
    fn render(&self) -> String {
        match self {
            Predicate::RegionEquals(region) => format!("`Order Region` = {}", region.to_sql()),
            Predicate::Fixed(clause) => (*clause).to_string(),
        }
    }
}

/// Clause skeleton of a single-table aggregation.
struct QueryTemplate {
    select: String,
    filter: Option<Predicate>,
    group_by: Option<&'static str>,
    order_by: Option<&'static str>,
    limit: Option<u32>,
}

impl QueryTemplate {
    fn select(columns: impl Into<String>) -> Self {
        Self {
            select: columns.into(),
            filter: None,
            group_by: None,
            order_by: None,
            limit: None,
        }
    }

    fn filter(mut self, predicate: Option<Predicate>) -> Self {
        self.filter = predicate;
        self
    }

    fn group_by(mut self, columns: &'static str) -> Self {
        self.group_by = Some(columns);
        self
    }

    fn order_by(mut self, columns: &'static str) -> Self {
        self.order_by = Some(columns);
        self
    }

    fn limit(mut self, rows: Option<u32>) -> Self {
        self.limit = rows;
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("SELECT {} FROM {TABLE}", self.select);
        if let Some(predicate) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.render());
        }
        if let Some(group_by) = self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }
        if let Some(order_by) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }
}

/// Maps an intent plus question modifiers onto one of the fixed templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqlTemplateBuilder;

impl SqlTemplateBuilder {
    pub fn new() -> Self {
        Self
    }

    /// `None` for intents with no direct structured form. Inventory movement
    /// is resolved through [`SqlTemplateBuilder::movement`] once its definition
    /// is known.
    pub fn build(&self, intent: Intent, text: &str) -> Option<CandidateQuery> {
        let template = match intent {
            Intent::SalesAggregation => sales_aggregation(text),
            Intent::OrderDistribution => QueryTemplate::select(
                "`Customer Segment`, `Order Region`, COUNT(*) AS order_count",
            )
            .group_by("`Customer Segment`, `Order Region`")
            .order_by("order_count DESC"),
            Intent::CustomerRanking => QueryTemplate::select(
                "`Customer Id`, `Customer Fname`, `Customer Lname`, SUM(Sales) AS total_sales",
            )
            .group_by("`Customer Id`, `Customer Fname`, `Customer Lname`")
            .order_by("total_sales DESC")
            .limit(Some(10)),
            Intent::ProfitMargin => QueryTemplate::select(
                "`Product Name`, MAX(`Order Item Profit Ratio`) AS max_profit_margin",
            )
            .group_by("`Product Name`")
            .order_by("max_profit_margin DESC")
            .limit(Some(10)),
            Intent::AverageShippingDelay => average_shipping_delay(text),
            Intent::DecliningSales => QueryTemplate::select(format!(
                "`Category Name` AS `Product Category`, {QUARTER} AS quarter, SUM(Sales) AS total_sales"
            ))
            .group_by("`Category Name`, quarter")
            .order_by("`Category Name`, quarter"),
            Intent::DeliveryPerformance => {
                let worst_only = !wants_full_ranking(text);
                QueryTemplate::select(
                    "`Shipping Mode`, AVG(CASE WHEN `Delivery Status` = 'Shipping on time' \
                     THEN 1 ELSE 0 END) AS on_time_rate",
                )
                .group_by("`Shipping Mode`")
                .order_by("on_time_rate ASC")
                .limit(worst_only.then_some(1))
            }
            Intent::InventoryMovement | Intent::DocumentTopic(_) | Intent::Unclassified => {
                return None
            }
        };
        Some(CandidateQuery::new(template.render(), intent))
    }

    pub fn movement(&self, class: MovementClass) -> CandidateQuery {
        let predicate = match class {
            MovementClass::NoMover => "`Days for shipping (real)` >= 180",
            MovementClass::SlowMoving => "`Days for shipping (real)` BETWEEN 90 AND 179",
        };
        let template = QueryTemplate::select("*").filter(Some(Predicate::Fixed(predicate)));
        CandidateQuery::new(template.render(), Intent::InventoryMovement)
    }
}

fn sales_aggregation(text: &str) -> QueryTemplate {
    if let Some(region) = RegionLiteral::detect(text) {
        return QueryTemplate::select("SUM(Sales) AS total_sales")
            .filter(Some(Predicate::RegionEquals(region)));
    }
    if wants_region_grouping(text) {
        return QueryTemplate::select("`Order Region`, SUM(Sales) AS total_sales")
            .group_by("`Order Region`")
            .order_by("total_sales DESC");
    }
    QueryTemplate::select("SUM(Sales) AS total_sales")
}

fn average_shipping_delay(text: &str) -> QueryTemplate {
    let days = "AVG(julianday(`shipping date (DateOrders)`) - julianday(`order date (DateOrders)`)) AS avg_days";
    if wants_region_grouping(text) {
        QueryTemplate::select(format!("`Order Region`, {days}"))
            .group_by("`Order Region`")
            .order_by("avg_days DESC")
    } else {
        QueryTemplate::select(format!("`Order Country`, {days}"))
            .group_by("`Order Country`")
            .order_by("avg_days DESC")
    }
}
