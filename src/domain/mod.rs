//! Business rules preserved from the storefront: weight-based pricing,
//! delivery fee tiering, PIX discount, kit pricing, the order status machine
//! and analytics growth math. Pure code, no I/O.

pub mod cart;
pub mod order;
pub mod pricing;
pub mod weight;

pub use cart::{Cart, CartError, CartLine};
pub use order::{OrderStatus, OrderStatusError, PaymentMethod};
pub use pricing::{CheckoutQuote, KitLine, PricingSettings};
pub use weight::WeightUnit;
