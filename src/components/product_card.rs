//! Product Card Component

use leptos::prelude::*;

use crate::components::NavLink;
use crate::context::View;
use crate::models::{format_price, Product};

#[component]
pub fn ProductCard(product: Product) -> impl IntoView {
    let image = product.image().unwrap_or_default();
    let on_sale = product.compare_at_price.filter(|was| *was > product.price);
    let sold_out = !product.in_stock();

    view! {
        <article class="product-card" class:sold-out=sold_out>
            <NavLink to=View::Product(product.id.clone()) class="product-card-link">
                <img src=image alt=product.name.clone() loading="lazy" />
                <h3>{product.name.clone()}</h3>
                <p class="price">
                    <span>{format_price(product.price)}</span>
                    {on_sale.map(|was| view! { <s class="was-price">{format_price(was)}</s> })}
                </p>
                {sold_out.then(|| view! { <span class="badge">"Sold out"</span> })}
                {product.customizable.then(|| view! { <span class="badge badge-accent">"Customizable"</span> })}
            </NavLink>
        </article>
    }
}
