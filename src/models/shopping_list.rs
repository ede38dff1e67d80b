use sea_orm::FromQueryResult;
use serde::Serialize;

/// One line of the aggregated shopping list: an ingredient under one unit with
/// the amounts of every cart recipe summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
