use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{reject_blank, require_text};
use crate::repos::MenuRow;
use crate::services::menus::{MenuPatch, NewMenu};

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub stock: i32,
}

impl CreateMenuRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        require_text(&self.name, "name is required")?;
        require_text(&self.category, "category is required")?;
        if self.price <= 0 {
            return Err("price must be greater than 0");
        }
        if self.stock < 0 {
            return Err("stock must not be negative");
        }
        Ok(())
    }
}

impl From<CreateMenuRequest> for NewMenu {
    fn from(r: CreateMenuRequest) -> Self {
        Self {
            name: r.name,
            price: r.price,
            description: r.description,
            category: r.category,
            stock: r.stock,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

impl UpdateMenuRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        reject_blank(self.name.as_deref(), "name cannot be empty")?;
        reject_blank(self.category.as_deref(), "category cannot be empty")?;
        if let Some(price) = self.price
            && price <= 0
        {
            return Err("price must be greater than 0");
        }
        if let Some(stock) = self.stock
            && stock < 0
        {
            return Err("stock must not be negative");
        }
        Ok(())
    }
}

impl From<UpdateMenuRequest> for MenuPatch {
    fn from(r: UpdateMenuRequest) -> Self {
        Self {
            name: r.name,
            price: r.price,
            category: r.category,
            description: r.description,
            stock: r.stock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub menu_id: Uuid,
    pub name: String,
    pub price: i64,
    pub description: String,
    pub category: String,
    pub rating: f64,
    pub stock: i32,
    pub merchant_id: Uuid,
}

impl From<MenuRow> for MenuResponse {
    fn from(m: MenuRow) -> Self {
        Self {
            menu_id: m.menu_id,
            name: m.name,
            price: m.price,
            description: m.description,
            category: m.category,
            rating: m.rating,
            stock: m.stock,
            merchant_id: m.merchant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_bounds_apply_only_to_supplied_fields() {
        assert!(UpdateMenuRequest::default().validate().is_ok());

        let zero_stock = UpdateMenuRequest {
            stock: Some(0),
            ..Default::default()
        };
        assert!(zero_stock.validate().is_ok());

        let free = UpdateMenuRequest {
            price: Some(0),
            ..Default::default()
        };
        assert_eq!(free.validate(), Err("price must be greater than 0"));

        let blank = UpdateMenuRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }
}
