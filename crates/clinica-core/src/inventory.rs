//! Inventory service: validated CRUD plus name search.

use thiserror::Error;

use crate::composer::ErrorMap;
use crate::db::{Database, DbError};
use crate::models::{InventoryItem, InventoryUpdate};

/// Candidates below this Jaro-Winkler similarity are not worth suggesting.
const FUZZY_THRESHOLD: f64 = 0.7;

/// Inventory service errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Validation failed ({} field(s))", .0.len())]
    Invalid(ErrorMap),

    #[error("Inventory item not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory reader/writer.
pub struct InventoryService<'a> {
    db: &'a Database,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a product. Rejected before any store call when the name is empty
    /// or a quantity/price is negative.
    pub fn create_item(&self, name: &str, quantity: i64, price: f64) -> InventoryResult<InventoryItem> {
        let mut errors = ErrorMap::new();
        if name.trim().is_empty() {
            errors.insert("name", "El nombre es obligatorio".into());
        }
        if quantity < 0 {
            errors.insert("quantity", "La cantidad no puede ser negativa".into());
        }
        if !(price >= 0.0) || !price.is_finite() {
            errors.insert("price", "El precio no puede ser negativo".into());
        }
        if !errors.is_empty() {
            return Err(InventoryError::Invalid(errors));
        }

        let item = InventoryItem::new(name.trim().to_string(), quantity, price);
        self.db.insert_item(&item)?;
        tracing::info!(item_id = %item.id, name = %item.name, "Inventory item created");
        Ok(item)
    }

    /// Merge a partial update into a stored item and return the new state.
    pub fn update_item(&self, id: &str, update: &InventoryUpdate) -> InventoryResult<InventoryItem> {
        let mut errors = ErrorMap::new();
        if let Some(name) = update.name.as_deref() {
            if name.trim().is_empty() {
                errors.insert("name", "El nombre es obligatorio".into());
            }
        }
        if let Some(quantity) = update.quantity {
            if quantity < 0 {
                errors.insert("quantity", "La cantidad no puede ser negativa".into());
            }
        }
        if let Some(price) = update.price {
            if !(price >= 0.0) || !price.is_finite() {
                errors.insert("price", "El precio no puede ser negativo".into());
            }
        }
        if !errors.is_empty() {
            return Err(InventoryError::Invalid(errors));
        }

        if update.is_empty() {
            return self.get_item(id);
        }
        if !self.db.update_item_fields(id, update)? {
            return Err(InventoryError::NotFound(id.into()));
        }
        self.get_item(id)
    }

    /// Remove a product. Past consultations keep their denormalized copies.
    pub fn delete_item(&self, id: &str) -> InventoryResult<()> {
        if !self.db.delete_item(id)? {
            return Err(InventoryError::NotFound(id.into()));
        }
        tracing::info!(item_id = %id, "Inventory item deleted");
        Ok(())
    }

    /// Fetch one item.
    pub fn get_item(&self, id: &str) -> InventoryResult<InventoryItem> {
        self.db
            .get_item(id)?
            .ok_or_else(|| InventoryError::NotFound(id.into()))
    }

    /// Full inventory snapshot, name-ordered.
    pub fn list_items(&self) -> InventoryResult<Vec<InventoryItem>> {
        Ok(self.db.list_items()?)
    }

    /// Search by product name: FTS prefix match first, Jaro-Winkler ranking
    /// as a typo-tolerant fallback when nothing matches.
    pub fn search_items(&self, query: &str, limit: usize) -> InventoryResult<Vec<InventoryItem>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_items();
        }

        let hits = self.db.search_items_fts(query, limit)?;
        if !hits.is_empty() {
            return Ok(hits);
        }

        let query_lower = query.to_lowercase();
        let mut scored: Vec<(f64, InventoryItem)> = self
            .db
            .list_items()?
            .into_iter()
            .map(|item| {
                let score = strsim::jaro_winkler(&query_lower, &item.name.to_lowercase());
                (score, item)
            })
            .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().take(limit).map(|(_, item)| item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_item() {
        let db = setup();
        let service = InventoryService::new(&db);

        let item = service.create_item("Paracetamol 500mg", 20, 1.5).unwrap();
        assert_eq!(service.get_item(&item.id).unwrap().quantity, 20);
    }

    #[test]
    fn test_create_rejects_invalid_fields() {
        let db = setup();
        let service = InventoryService::new(&db);

        let err = service.create_item("", -1, -2.0).unwrap_err();
        match err {
            InventoryError::Invalid(errors) => {
                assert!(errors.contains_key("name"));
                assert!(errors.contains_key("quantity"));
                assert!(errors.contains_key("price"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        // Nothing was stored
        assert!(service.list_items().unwrap().is_empty());

        // Zero quantity and price are allowed
        assert!(service.create_item("Gasa estéril", 0, 0.0).is_ok());
    }

    #[test]
    fn test_update_item() {
        let db = setup();
        let service = InventoryService::new(&db);
        let item = service.create_item("Paracetamol 500mg", 20, 1.5).unwrap();

        let updated = service
            .update_item(
                &item.id,
                &InventoryUpdate {
                    price: Some(1.75),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price, 1.75);
        assert_eq!(updated.quantity, 20);

        let err = service
            .update_item(
                &item.id,
                &InventoryUpdate {
                    quantity: Some(-5),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, InventoryError::Invalid(_)));
    }

    #[test]
    fn test_update_missing_item() {
        let db = setup();
        let service = InventoryService::new(&db);
        let err = service
            .update_item(
                "ghost",
                &InventoryUpdate {
                    quantity: Some(1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn test_delete_item() {
        let db = setup();
        let service = InventoryService::new(&db);
        let item = service.create_item("Paracetamol 500mg", 20, 1.5).unwrap();

        service.delete_item(&item.id).unwrap();
        assert!(matches!(
            service.get_item(&item.id),
            Err(InventoryError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_item(&item.id),
            Err(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_search_prefix_then_fuzzy() {
        let db = setup();
        let service = InventoryService::new(&db);
        service.create_item("Amoxicilina 500mg", 30, 4.0).unwrap();
        service.create_item("Paracetamol 500mg", 20, 1.5).unwrap();

        // Prefix hit via FTS
        let results = service.search_items("amoxi", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Amoxicilina 500mg");

        // Typo falls back to fuzzy ranking
        let results = service.search_items("paracetamoll 500mg", 10).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].name, "Paracetamol 500mg");

        // Empty query lists everything
        assert_eq!(service.search_items("  ", 10).unwrap().len(), 2);
    }
}
