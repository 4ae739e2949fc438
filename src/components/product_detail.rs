//! Product Detail Component
//!
//! Variant selection and add-to-cart for a single product.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::browser;
use crate::context::{use_app_context, View};
use crate::models::{format_price, Product};
use crate::tracking;

#[component]
pub fn ProductDetail(product_id: String) -> impl IntoView {
    let (product, set_product) = signal::<Option<Product>>(None);
    let (error, set_error) = signal::<Option<String>>(None);

    spawn_local(async move {
        match api::get_product(&product_id).await {
            Ok(p) => {
                tracking::view_item(&p.to_cart_item(1, None, None));
                set_product.set(Some(p));
            }
            Err(e) => {
                log::warn!("product {}: {}", product_id, e);
                set_error.set(Some(e));
            }
        }
    });

    view! {
        <section class="product-detail">
            {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
            {move || product.get().map(|p| view! { <ProductView product=p /> })}
        </section>
    }
}

#[component]
fn ProductView(product: Product) -> impl IntoView {
    let ctx = use_app_context();
    let (size, set_size) = signal(product.sizes.first().cloned());
    let (color, set_color) = signal(product.colors.first().cloned());
    let (quantity, set_quantity) = signal(1u32);
    let (added, set_added) = signal(false);

    let sizes = product.sizes.clone();
    let colors = product.colors.clone();
    let in_stock = product.in_stock();
    let customizable = product.customizable;
    let id = product.id.clone();
    let item_source = product.clone();

    let add_to_cart = move |_| {
        let item = item_source.to_cart_item(quantity.get(), size.get(), color.get());
        match tracking::add_to_cart(item) {
            Ok(_) => set_added.set(true),
            Err(e) => {
                log::error!("cart: {}", e);
                browser::alert("Could not update your cart. Please try again.");
            }
        }
    };

    view! {
        <div class="product-gallery">
            {product.images.iter().map(|src| view! { <img src=src.clone() alt=product.name.clone() /> }).collect_view()}
        </div>
        <div class="product-info">
            <h1>{product.name.clone()}</h1>
            <p class="price">{format_price(product.price)}</p>
            <p class="description">{product.description.clone()}</p>

            {(!sizes.is_empty()).then(|| view! {
                <div class="option-row">
                    <span class="option-label">"Size"</span>
                    {sizes.into_iter().map(|s| {
                        let value = s.clone();
                        let label = s.clone();
                        view! {
                            <button
                                class="chip"
                                class:active=move || size.get().as_deref() == Some(s.as_str())
                                on:click=move |_| set_size.set(Some(value.clone()))
                            >
                                {label}
                            </button>
                        }
                    }).collect_view()}
                </div>
            })}

            {(!colors.is_empty()).then(|| view! {
                <div class="option-row">
                    <span class="option-label">"Colour"</span>
                    {colors.into_iter().map(|c| {
                        let value = c.clone();
                        let label = c.clone();
                        view! {
                            <button
                                class="chip"
                                class:active=move || color.get().as_deref() == Some(c.as_str())
                                on:click=move |_| set_color.set(Some(value.clone()))
                            >
                                {label}
                            </button>
                        }
                    }).collect_view()}
                </div>
            })}

            <div class="option-row">
                <span class="option-label">"Qty"</span>
                <button class="qty-btn" on:click=move |_| set_quantity.update(|q| *q = (*q).saturating_sub(1).max(1))>"-"</button>
                <span class="qty">{move || quantity.get()}</span>
                <button class="qty-btn" on:click=move |_| set_quantity.update(|q| *q += 1)>"+"</button>
            </div>

            <button class="btn btn-primary" disabled=move || !in_stock on:click=add_to_cart>
                {if in_stock { "Add to cart" } else { "Sold out" }}
            </button>
            {customizable.then(|| view! {
                <button class="btn" on:click=move |_| ctx.navigate(View::Customize(Some(id.clone())))>
                    "Customize this"
                </button>
            })}
            <Show when=move || added.get()>
                <p class="notice">
                    "Added to cart. "
                    <button class="link-btn" on:click=move |_| ctx.navigate(View::Cart)>"View cart"</button>
                </p>
            </Show>
        </div>
    }
}
