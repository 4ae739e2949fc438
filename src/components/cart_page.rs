//! Cart Page Component
//!
//! Quantity edits and removal over the stored cart.

use leptos::prelude::*;
use storefront_core::{CartItem, OrderTotals, StoreResult};

use crate::browser;
use crate::components::OrderSummary;
use crate::config;
use crate::context::{use_app_context, View};
use crate::models::format_price;
use crate::store::{use_app_store, AppStateStoreFields};
use crate::tracking;

/// Log and surface a failed cart write; the `cartUpdated` listener syncs the store on success
fn report(result: StoreResult<Vec<CartItem>>) {
    if let Err(e) = result {
        log::error!("cart: {}", e);
        browser::alert("Could not update your cart. Please try again.");
    }
}

#[component]
pub fn CartPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let free_threshold = config::get().free_shipping_threshold;

    let totals = Memo::new(move |_| OrderTotals::compute(&store.cart().read(), None, 0.0, free_threshold));

    view! {
        <section class="cart-page">
            <h1>"Your Cart"</h1>
            <Show
                when=move || !store.cart().read().is_empty()
                fallback=move || view! {
                    <div class="empty">
                        <p>"Your cart is empty."</p>
                        <button class="btn btn-primary" on:click=move |_| ctx.navigate(View::home())>
                            "Continue shopping"
                        </button>
                    </div>
                }
            >
                <ul class="cart-lines">
                    <For
                        each=move || store.cart().get()
                        key=|item| (item.id.clone(), item.quantity)
                        children=|item| view! { <CartLine item=item /> }
                    />
                </ul>
                <OrderSummary totals=totals />
                {move || {
                    let remaining = free_threshold - totals.get().subtotal;
                    (remaining > 0.0).then(|| view! {
                        <p class="notice">"Add " {format_price(remaining)} " more for free shipping"</p>
                    })
                }}
                <div class="cart-actions">
                    <button class="btn" on:click=move |_| ctx.navigate(View::home())>"Keep shopping"</button>
                    <button class="btn" on:click=move |_| ctx.navigate(View::Checkout)>"Checkout"</button>
                    <button class="btn btn-primary" on:click=move |_| ctx.navigate(View::EnhancedCheckout)>
                        "Express checkout"
                    </button>
                </div>
            </Show>
        </section>
    }
}

#[component]
pub fn CartLine(item: CartItem) -> impl IntoView {
    let id = item.id.clone();
    let id_dec = id.clone();
    let id_inc = id.clone();
    let quantity = item.quantity;
    let variant = [item.size.clone(), item.color.clone()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ");
    let design_text = item.custom_design.as_ref().and_then(|d| d.text.clone());

    view! {
        <li class="cart-line">
            {item.image.clone().map(|src| view! { <img src=src alt="" /> })}
            <div class="cart-line-info">
                <span class="name">{item.name.clone()}</span>
                {(!variant.is_empty()).then(|| view! { <span class="variant">{variant}</span> })}
                {design_text.map(|t| view! { <span class="variant">"\u{201c}" {t} "\u{201d}"</span> })}
                <span class="price">{format_price(item.price)}</span>
            </div>
            <div class="qty-control">
                <button class="qty-btn" on:click=move |_| report(tracking::cart().update_quantity(&id_dec, quantity - 1))>
                    "-"
                </button>
                <span class="qty">{quantity}</span>
                <button class="qty-btn" on:click=move |_| report(tracking::cart().update_quantity(&id_inc, quantity + 1))>
                    "+"
                </button>
            </div>
            <span class="line-total">{format_price(item.line_total())}</span>
            <button class="link-btn" on:click=move |_| report(tracking::cart().remove_item(&id))>"Remove"</button>
        </li>
    }
}
