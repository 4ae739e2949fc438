//! UI Components
//!
//! Pages and the small widgets they share.

mod admin_categories;
mod admin_products;
mod admin_token;
mod cart_page;
mod checkout;
mod checkout_form;
mod customize;
mod delete_confirm_button;
mod enhanced_checkout;
mod header;
mod order_tracking;
mod product_card;
mod product_detail;
mod shop_page;

pub use admin_categories::AdminCategoriesPage;
pub use admin_products::AdminProductsPage;
pub use admin_token::AdminTokenBar;
pub use cart_page::{CartLine, CartPage};
pub use checkout::{CheckoutPage, PaymentOptions, ReviewDetails};
pub use checkout_form::{place_order, OrderDraft, OrderSummary, ShippingForm, StepIndicator};
pub use customize::CustomizePage;
pub use delete_confirm_button::DeleteConfirmButton;
pub use enhanced_checkout::EnhancedCheckoutPage;
pub use header::{Header, NavLink};
pub use order_tracking::{OrderPlacedPage, TrackOrderPage};
pub use product_card::ProductCard;
pub use product_detail::ProductDetail;
pub use shop_page::ShopPage;
