use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::roles::{Capability, Role, capabilities_for};

/// Per-capability grant flags embedded in every access token.
///
/// The snapshot is total over the capability universe: every flag is present
/// and explicit, `true` for capabilities in the role's set and `false` for
/// the rest. A claims consumer never needs the role registry to answer "can
/// this token do X". None of the fields are defaultable — a token missing a
/// flag fails decoding instead of being read as denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(rename = "order:create")]
    pub order_create: bool,
    #[serde(rename = "order:read")]
    pub order_read: bool,
    #[serde(rename = "order:update")]
    pub order_update: bool,
    #[serde(rename = "order:cancel")]
    pub order_cancel: bool,
    #[serde(rename = "product:create")]
    pub product_create: bool,
    #[serde(rename = "product:read")]
    pub product_read: bool,
    #[serde(rename = "product:update")]
    pub product_update: bool,
    #[serde(rename = "product:delete")]
    pub product_delete: bool,
}

impl CapabilitySet {
    /// All flags off.
    pub fn none() -> Self {
        Self {
            order_create: false,
            order_read: false,
            order_update: false,
            order_cancel: false,
            product_create: false,
            product_read: false,
            product_update: false,
            product_delete: false,
        }
    }

    /// Snapshot for `role`: registry members on, everything else off.
    pub fn for_role(role: Role) -> Self {
        let mut set = Self::none();
        for cap in capabilities_for(role) {
            set.grant(*cap);
        }
        set
    }

    pub fn grant(&mut self, capability: Capability) {
        *self.flag_mut(capability) = true;
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::OrderCreate => self.order_create,
            Capability::OrderRead => self.order_read,
            Capability::OrderUpdate => self.order_update,
            Capability::OrderCancel => self.order_cancel,
            Capability::ProductCreate => self.product_create,
            Capability::ProductRead => self.product_read,
            Capability::ProductUpdate => self.product_update,
            Capability::ProductDelete => self.product_delete,
        }
    }

    fn flag_mut(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::OrderCreate => &mut self.order_create,
            Capability::OrderRead => &mut self.order_read,
            Capability::OrderUpdate => &mut self.order_update,
            Capability::OrderCancel => &mut self.order_cancel,
            Capability::ProductCreate => &mut self.product_create,
            Capability::ProductRead => &mut self.product_read,
            Capability::ProductUpdate => &mut self.product_update,
            Capability::ProductDelete => &mut self.product_delete,
        }
    }
}

/// Decoded access-token payload.
///
/// Built fresh per request by the token parser after signature verification;
/// never cached, never mutated. Rotation mints a brand-new token rather than
/// patching claims. Decoding is strict: every field is mandatory and a shape
/// mismatch anywhere surfaces as a single malformed-token error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub id: Uuid,
    pub role: Role,
    /// Absolute expiry, epoch seconds.
    pub exp: i64,
    #[serde(flatten)]
    pub capabilities: CapabilitySet,
}

impl Claims {
    pub fn is_expired(&self, now_epoch: i64) -> bool {
        now_epoch > self.exp
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.allows(capability)
    }
}
