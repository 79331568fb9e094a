//! Checkout and order types.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{OrderId, ProductId};

/// Problems with a delivery address submitted at checkout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryAddressError {
    /// A field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The email is malformed.
    #[error("please enter a valid email address")]
    InvalidEmail,
}

/// Where an order is shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipcode")]
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl DeliveryAddress {
    /// Check every field is filled in and the email is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first blank field, or [`DeliveryAddressError::InvalidEmail`].
    pub fn validate(&self) -> Result<(), DeliveryAddressError> {
        let fields = [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Email", &self.email),
            ("Street", &self.street),
            ("City", &self.city),
            ("State", &self.state),
            ("Zipcode", &self.postal_code),
            ("Country", &self.country),
            ("Phone", &self.phone),
        ];
        if let Some((label, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DeliveryAddressError::MissingField(*label));
        }
        Email::parse(&self.email).map_err(|_| DeliveryAddressError::InvalidEmail)?;
        Ok(())
    }

    /// One-line rendering for order history.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {}, {}, {}, {} {}, {}",
            self.first_name,
            self.last_name,
            self.street,
            self.city,
            self.state,
            self.postal_code,
            self.country
        )
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Card,
}

impl PaymentMethod {
    /// Label shown in order history.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Cash on delivery",
            Self::Card => "Card",
        }
    }
}

/// Order status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    OrderPlaced,
    Packing,
    Shipped,
    OutForDelivery,
    Delivered,
    /// Any status string this storefront does not know about.
    Other(String),
}

impl OrderStatus {
    /// The backend's wording for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OrderPlaced => "Order Placed",
            Self::Packing => "Packing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Order Placed" => Self::OrderPlaced,
            "Packing" => Self::Packing,
            "Shipped" => Self::Shipped,
            "Out for delivery" => Self::OutForDelivery,
            "Delivered" => Self::Delivered,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub size: String,
    pub quantity: u32,
    #[serde(rename = "image", default)]
    pub images: Vec<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub address: DeliveryAddress,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment: bool,
    /// Placement time in milliseconds since the epoch.
    pub date: i64,
}

impl Order {
    /// Placement time, if the stored timestamp is representable.
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.date).single()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            street: "1 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
            country: "India".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    #[test]
    fn test_address_validate() {
        assert!(address().validate().is_ok());

        let mut missing = address();
        missing.street.clear();
        assert_eq!(
            missing.validate(),
            Err(DeliveryAddressError::MissingField("Street"))
        );

        let mut bad_email = address();
        bad_email.email = "asha@example".to_string();
        assert_eq!(bad_email.validate(), Err(DeliveryAddressError::InvalidEmail));
    }

    #[test]
    fn test_status_round_trip_keeps_unknown() {
        let status: OrderStatus = serde_json::from_str("\"Shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        let other: OrderStatus = serde_json::from_str("\"Lost\"").unwrap();
        assert_eq!(other.as_str(), "Lost");
    }

    #[test]
    fn test_order_deserialize() {
        let json = r#"{
            "_id": "o1",
            "items": [{"_id": "p1", "name": "Tee", "price": 20, "size": "M", "quantity": 2, "image": ["/a.png"]}],
            "amount": 50,
            "address": {"firstName": "Asha", "zipcode": "560001"},
            "status": "Packing",
            "paymentMethod": "cod",
            "payment": false,
            "date": 1716634345448
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.address.postal_code, "560001");
        assert_eq!(order.status, OrderStatus::Packing);
        assert!(order.placed_at().is_some());
    }
}
