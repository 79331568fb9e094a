//! Storefront business logic, independent of HTTP.
//!
//! # Services
//!
//! - `catalog` - Collection filtering, search, home page selections
//! - `product_detail` - Product lookup, image/size selection, related products
//! - `cart` - Add-to-cart validation and totals
//! - `profile` - Profile editor state machine over local storage

pub mod cart;
pub mod catalog;
pub mod product_detail;
pub mod profile;

pub use cart::{CartError, CartService, CartTotals};
pub use catalog::{CatalogQuery, SortOrder};
pub use product_detail::{AddToCartRequest, ProductDetail};
pub use profile::{EditorMode, ProfileEditor, ProfileEditorError};
