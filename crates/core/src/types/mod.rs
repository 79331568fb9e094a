//! Core types for Threadline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;
pub mod profile;

pub use cart::{Cart, CartLine};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{
    DeliveryAddress, DeliveryAddressError, Order, OrderItem, OrderStatus, PaymentMethod,
};
pub use phone::{MobileNumber, MobileNumberError};
pub use price::CurrencyCode;
pub use product::{Product, find_product};
pub use profile::{ProfileError, ProfileField, ProfileImage, ProfileImageError, UserProfile};
