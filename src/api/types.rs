//! Request and response bodies of the backend's REST API
//!
//! Response types are lenient: fields the workflow does not depend on are
//! optional, and unknown enum values are kept rather than rejected, so a
//! backend that grows a new status does not break a smoke run.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Declares a string enum as the backend spells it, with an `Other`
/// fallback for values this tool does not know about.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::from(raw.as_str()))
            }
        }
    };
}

wire_enum! {
    /// Order lifecycle status
    OrderStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Shipped => "SHIPPED",
        Delivered => "DELIVERED",
        Cancelled => "CANCELLED",
    }
}

wire_enum! {
    /// Return request status
    ReturnStatus {
        Requested => "REQUESTED",
        InEvaluation => "IN_EVALUATION",
        Approved => "APPROVED",
        Completed => "COMPLETED",
        Rejected => "REJECTED",
    }
}

impl ReturnStatus {
    /// Approved returns are refunded; the backend may report either the
    /// approval itself or the completed refund.
    pub fn is_refunded(&self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

wire_enum! {
    /// Why the customer is sending the item back
    ReturnReason {
        Defective => "DEFECTIVE",
        NotAsDescribed => "NOT_AS_DESCRIBED",
        WrongItem => "WRONG_ITEM",
        DamagedShipping => "DAMAGED_SHIPPING",
        ChangedMind => "CHANGED_MIND",
        OtherReason => "OTHER",
    }
}

wire_enum! {
    /// Where an approved refund goes
    RefundMethod {
        Wallet => "WALLET",
        Original => "ORIGINAL",
    }
}

wire_enum! {
    /// Wallet ledger entry kind
    TransactionType {
        Refund => "REFUND",
        Deposit => "DEPOSIT",
        Purchase => "PURCHASE",
        Withdrawal => "WITHDRAWAL",
    }
}

/// A list endpoint body: either a bare array or a paginated page
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Plain(items) => items,
            Listing::Paginated { results } => results,
        }
    }
}

/// A foreign key rendered either as a bare id or as a nested object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(i64),
    Nested { id: i64 },
}

impl IdRef {
    pub fn id(&self) -> i64 {
        match self {
            IdRef::Id(id) | IdRef::Nested { id } => *id,
        }
    }
}

// === Auth ===

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// === Catalogue and orders ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product: Option<IdRef>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Product of the first line item, if the listing includes items
    pub fn first_product_id(&self) -> Option<i64> {
        self.items.first().and_then(|item| item.product).map(|p| p.id())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub product: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// === Returns ===

#[derive(Debug, Clone, Serialize)]
pub struct NewReturn {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub reason: ReturnReason,
    pub description: String,
    pub refund_method: RefundMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub id: i64,
    pub status: ReturnStatus,
    #[serde(default)]
    pub reason: Option<ReturnReason>,
    #[serde(default)]
    pub refund_method: Option<RefundMethod>,
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of a manager action (evaluate, approve, reject)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnTransition {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<ReturnStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationNotes<'a> {
    pub evaluation_notes: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RejectionReason<'a> {
    pub rejection_reason: &'a str,
}

// === Warranties ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warranty {
    pub id: i64,
    #[serde(default)]
    pub order: Option<IdRef>,
    #[serde(default)]
    pub product: Option<IdRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Warranty {
    pub fn covers_order(&self, order_id: i64) -> bool {
        self.order.map(|o| o.id()) == Some(order_id)
    }
}

// === Wallet ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub balance: Decimal,
    #[serde(default)]
    pub user: Option<IdRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub balance: Decimal,
    #[serde(default)]
    pub wallet_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: i64,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub balance_after: Option<Decimal>,
    #[serde(default)]
    pub is_credit: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatistics {
    #[serde(default)]
    pub total_credits: Option<Decimal>,
    #[serde(default)]
    pub total_debits: Option<Decimal>,
    #[serde(default)]
    pub transaction_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// === Audit ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_accepts_bare_array_and_page() {
        let plain: Listing<Product> =
            serde_json::from_value(json!([{"id": 1, "name": "Monitor"}])).unwrap();
        assert_eq!(plain.into_items().len(), 1);

        let page: Listing<Product> = serde_json::from_value(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "name": "Monitor"}, {"id": 2, "name": "Teclado"}]
        }))
        .unwrap();
        assert_eq!(page.into_items().len(), 2);

        let empty: Listing<Product> = serde_json::from_value(json!([])).unwrap();
        assert!(empty.into_items().is_empty());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let status: ReturnStatus = serde_json::from_value(json!("ON_HOLD")).unwrap();
        assert_eq!(status, ReturnStatus::Other("ON_HOLD".to_string()));
        assert_eq!(status.to_string(), "ON_HOLD");
        assert!(!status.is_refunded());
    }

    #[test]
    fn test_refunded_statuses() {
        assert!(ReturnStatus::Approved.is_refunded());
        assert!(ReturnStatus::Completed.is_refunded());
        assert!(!ReturnStatus::Rejected.is_refunded());
        assert!(!ReturnStatus::InEvaluation.is_refunded());
    }

    #[test]
    fn test_money_accepts_string_or_number() {
        let wallet: Wallet = serde_json::from_value(json!({
            "id": 7, "balance": "1250.50", "user": 3, "created_at": "2025-11-10T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(wallet.balance, Decimal::new(125050, 2));

        let balance: WalletBalance =
            serde_json::from_value(json!({"balance": 99.5, "wallet_id": 7})).unwrap();
        assert_eq!(balance.balance, Decimal::new(995, 1));
    }

    #[test]
    fn test_order_item_product_id_or_object() {
        let order: Order = serde_json::from_value(json!({
            "id": 10,
            "status": "PAID",
            "total_price": "300.00",
            "items": [{"product": {"id": 153, "name": "Monitor"}, "quantity": 1}]
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.first_product_id(), Some(153));

        let order: Order = serde_json::from_value(json!({
            "id": 11, "status": "DELIVERED", "items": [{"product": 42, "quantity": 2}]
        }))
        .unwrap();
        assert_eq!(order.first_product_id(), Some(42));
    }

    #[test]
    fn test_new_return_wire_format() {
        let body = serde_json::to_value(NewReturn {
            order_id: 5,
            product_id: 153,
            quantity: 1,
            reason: ReturnReason::Defective,
            description: "Pantalla con píxeles muertos".to_string(),
            refund_method: RefundMethod::Wallet,
        })
        .unwrap();
        assert_eq!(body["reason"], "DEFECTIVE");
        assert_eq!(body["refund_method"], "WALLET");
        assert_eq!(body["order_id"], 5);
    }

    #[test]
    fn test_return_record_keeps_extra_fields() {
        let record: ReturnRecord = serde_json::from_value(json!({
            "id": 9,
            "status": "REQUESTED",
            "reason": "DEFECTIVE",
            "refund_method": "WALLET",
            "order": 5,
            "requested_at": "2025-11-10T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.status, ReturnStatus::Requested);
        assert_eq!(record.extra.get("order"), Some(&json!(5)));
    }

    #[test]
    fn test_warranty_matches_order() {
        let warranty: Warranty =
            serde_json::from_value(json!({"id": 3, "order": {"id": 5}, "status": "ACTIVE"}))
                .unwrap();
        assert!(warranty.covers_order(5));
        assert!(!warranty.covers_order(6));
    }
}
