//! Pharmacy inventory models.

use serde::{Deserialize, Serialize};

/// A single product in the pharmacy inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    /// Record UUID
    pub id: String,
    /// Product name
    pub name: String,
    /// Units on hand, never negative
    pub quantity: i64,
    /// Unit price, never negative
    pub price: f64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: Option<String>,
}

impl InventoryItem {
    /// Create a new inventory item.
    pub fn new(name: String, quantity: i64, price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            quantity,
            price,
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        }
    }

    /// Whether any stock remains.
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Partial field update for an inventory item. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl InventoryUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.price.is_none()
    }
}
