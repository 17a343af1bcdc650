use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{reject_blank, require_text};
use crate::repos::DriverRow;
use crate::services::drivers::{DriverPatch, NewDriver};

#[derive(Debug, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub license: String,
    pub area: String,
}

impl CreateDriverRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        require_text(&self.name, "name is required")?;
        require_text(&self.license, "license is required")?;
        require_text(&self.area, "area is required")?;
        Ok(())
    }
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(r: CreateDriverRequest) -> Self {
        Self {
            name: r.name,
            license: r.license,
            area: r.area,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDriverRequest {
    pub name: Option<String>,
    pub license: Option<String>,
    pub area: Option<String>,
}

impl UpdateDriverRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        reject_blank(self.name.as_deref(), "name cannot be empty")?;
        reject_blank(self.license.as_deref(), "license cannot be empty")?;
        reject_blank(self.area.as_deref(), "area cannot be empty")?;
        Ok(())
    }
}

impl From<UpdateDriverRequest> for DriverPatch {
    fn from(r: UpdateDriverRequest) -> Self {
        Self {
            name: r.name,
            license: r.license,
            area: r.area,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub driver_id: Uuid,
    pub name: String,
    pub rating: f64,
    pub license: String,
    pub area: String,
    pub income: i64,
    pub user_id: Uuid,
    pub username: String,
}

impl From<DriverRow> for DriverResponse {
    fn from(d: DriverRow) -> Self {
        Self {
            driver_id: d.driver_id,
            name: d.name,
            rating: d.rating,
            license: d.license,
            area: d.area,
            income: d.income,
            user_id: d.user_id,
            username: d.username,
        }
    }
}
