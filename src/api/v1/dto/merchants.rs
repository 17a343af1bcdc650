use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{reject_blank, require_text};
use crate::repos::MerchantRow;
use crate::services::merchants::{MerchantPatch, NewMerchant};

#[derive(Debug, Deserialize)]
pub struct CreateMerchantRequest {
    pub name: String,
    pub address: String,
    pub category: String,
    pub description: String,
}

impl CreateMerchantRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        require_text(&self.name, "name is required")?;
        require_text(&self.address, "address is required")?;
        require_text(&self.category, "category is required")?;
        require_text(&self.description, "description is required")?;
        Ok(())
    }
}

impl From<CreateMerchantRequest> for NewMerchant {
    fn from(r: CreateMerchantRequest) -> Self {
        Self {
            name: r.name,
            address: r.address,
            category: r.category,
            description: r.description,
        }
    }
}

// None: 変更しない / Some(v): v に更新 (空文字の description も可)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMerchantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl UpdateMerchantRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        reject_blank(self.name.as_deref(), "name cannot be empty")?;
        reject_blank(self.address.as_deref(), "address cannot be empty")?;
        reject_blank(self.category.as_deref(), "category cannot be empty")?;
        Ok(())
    }
}

impl From<UpdateMerchantRequest> for MerchantPatch {
    fn from(r: UpdateMerchantRequest) -> Self {
        Self {
            name: r.name,
            address: r.address,
            category: r.category,
            description: r.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MerchantResponse {
    pub merchant_id: Uuid,
    pub name: String,
    pub rating: f64,
    pub address: String,
    pub category: String,
    pub description: String,
    pub user_id: Uuid,
    pub owner: String,
}

impl From<MerchantRow> for MerchantResponse {
    fn from(m: MerchantRow) -> Self {
        Self {
            merchant_id: m.merchant_id,
            name: m.name,
            rating: m.rating,
            address: m.address,
            category: m.category,
            description: m.description,
            user_id: m.user_id,
            owner: m.owner,
        }
    }
}
