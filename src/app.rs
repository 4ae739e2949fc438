//! Storefront App
//!
//! Root component: header, current page and the shared context/store.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::browser;
use crate::components::{
    AdminCategoriesPage, AdminProductsPage, CartPage, CheckoutPage, CustomizePage, EnhancedCheckoutPage, Header,
    OrderPlacedPage, ProductDetail, ShopPage, TrackOrderPage,
};
use crate::context::{AppContext, View};
use crate::store::{store_set_cart, AppState};
use crate::tracking;

#[component]
pub fn App() -> impl IntoView {
    let page = browser::current_page();
    let initial = if page.query_params().contains_key("token") {
        View::TrackOrder
    } else {
        View::from_path(&page.path())
    };

    let (view, set_view) = signal(initial);
    let cart = tracking::cart();
    let (cart_count, set_cart_count) = signal(cart.item_count());

    let store = Store::new(AppState {
        cart: cart.load(),
        ..Default::default()
    });

    // Provide context to all children
    provide_context(AppContext::new((view, set_view), cart_count));
    provide_context(store);

    // Any tab-local cart write fires `cartUpdated`
    browser::on_cart_updated(move |count| {
        set_cart_count.set(count);
        store_set_cart(&store, tracking::cart().load());
    });

    view! {
        <div class="storefront">
            <Header />
            <main class="page">
                {move || match view.get() {
                    View::Shop { category } => view! { <ShopPage category=category /> }.into_any(),
                    View::Product(id) => view! { <ProductDetail product_id=id /> }.into_any(),
                    View::Cart => view! { <CartPage /> }.into_any(),
                    View::Checkout => view! { <CheckoutPage /> }.into_any(),
                    View::EnhancedCheckout => view! { <EnhancedCheckoutPage /> }.into_any(),
                    View::Customize(product_id) => view! { <CustomizePage product_id=product_id /> }.into_any(),
                    View::TrackOrder => view! { <TrackOrderPage /> }.into_any(),
                    View::OrderPlaced { order_number, pin } => {
                        view! { <OrderPlacedPage order_number=order_number pin=pin /> }.into_any()
                    }
                    View::AdminProducts => view! { <AdminProductsPage /> }.into_any(),
                    View::AdminCategories => view! { <AdminCategoriesPage /> }.into_any(),
                }}
            </main>
            <footer class="site-footer">
                <span>"Otaku Threads · Printed in India"</span>
            </footer>
        </div>
    }
}
