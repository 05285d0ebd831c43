use serde::Deserialize;
use uuid::Uuid;

pub const ORDER_STATUSES: [&str; 3] = ["pending", "completed", "cancelled"];

#[derive(Debug, Deserialize)]
pub struct OrderItemPayload {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub items: Vec<OrderItemPayload>,
}

impl OrderPayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.items.is_empty() {
            return Err("order must contain at least one item");
        }
        for item in &self.items {
            if item.quantity <= 0 {
                return Err("item quantity must be greater than zero");
            }
            if !(item.price > 0.0) {
                return Err("item price must be greater than zero");
            }
        }
        Ok(())
    }

    /// Order total as quoted by the client; each line is re-checked against
    /// the persisted product price before anything is written.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderUpdatePayload {
    pub status: String,
}

impl OrderUpdatePayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !ORDER_STATUSES.contains(&self.status.as_str()) {
            return Err("status must be one of pending, completed, cancelled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_over_line_items() {
        let payload = OrderPayload {
            items: vec![
                OrderItemPayload {
                    product_id: Uuid::new_v4(),
                    quantity: 2,
                    price: 10.0,
                },
                OrderItemPayload {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                    price: 5.5,
                },
            ],
        };
        assert!(payload.validate().is_ok());
        assert!((payload.total() - 25.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_orders_and_unknown_statuses_are_rejected() {
        assert!(OrderPayload { items: vec![] }.validate().is_err());
        assert!(
            OrderUpdatePayload {
                status: "shipped".to_string()
            }
            .validate()
            .is_err()
        );
    }
}
