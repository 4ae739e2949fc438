//! Shop Page Component
//!
//! Category filter bar and product grid.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::components::ProductCard;
use crate::context::{use_app_context, View};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ShopPage(category: Option<String>) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (loading, set_loading) = signal(true);
    let active = category.clone();

    // Categories change rarely; load once per visit
    spawn_local(async move {
        match api::list_categories().await {
            Ok(categories) => *store.categories().write() = categories,
            Err(e) => log::warn!("shop: categories failed: {}", e),
        }
    });

    spawn_local(async move {
        match api::list_products(category.as_deref()).await {
            Ok(products) => {
                *store.products().write() = products;
                *store.catalog_error().write() = None;
            }
            Err(e) => {
                log::error!("shop: products failed: {}", e);
                *store.catalog_error().write() = Some(e);
            }
        }
        set_loading.set(false);
    });

    let all_active = active.is_none();

    view! {
        <section class="shop">
            <nav class="category-bar">
                <button
                    class="chip"
                    class:active=all_active
                    on:click=move |_| ctx.navigate(View::home())
                >
                    "All"
                </button>
                <For
                    each=move || store.categories().get()
                    key=|c| c.id.clone()
                    children=move |c| {
                        let is_active = active.as_deref() == Some(c.id.as_str());
                        let id = c.id.clone();
                        view! {
                            <button
                                class="chip"
                                class:active=is_active
                                on:click=move |_| ctx.navigate(View::Shop { category: Some(id.clone()) })
                            >
                                {c.name}
                            </button>
                        }
                    }
                />
            </nav>

            {move || store.catalog_error().get().map(|e| view! { <p class="error">{e}</p> })}

            <Show when=move || !loading.get() fallback=|| view! { <p class="loading">"Loading..."</p> }>
                <Show
                    when=move || !store.products().read().is_empty()
                    fallback=|| view! { <p class="empty">"No products here yet."</p> }
                >
                    <div class="product-grid">
                        <For
                            each=move || store.products().get()
                            key=|p| p.id.clone()
                            children=|p| view! { <ProductCard product=p /> }
                        />
                    </div>
                </Show>
            </Show>
        </section>
    }
}
