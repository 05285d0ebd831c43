use serde::Deserialize;

/// Full-replacement payload shared by create and update.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub units_in_stock: i32,
}

impl ProductPayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().len() < 3 {
            return Err("name must be at least 3 chars");
        }
        if self.name.len() > 255 {
            return Err("name must be <= 255 chars");
        }
        if let Some(desc) = &self.description
            && desc.len() > 1000
        {
            return Err("description must be <= 1000 chars");
        }
        if !(self.price > 0.0) {
            return Err("price must be greater than zero");
        }
        if self.units_in_stock < 0 {
            return Err("units_in_stock cannot be negative");
        }
        Ok(())
    }
}
