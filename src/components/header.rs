//! Header Component
//!
//! Site navigation with the live cart badge.

use leptos::ev::MouseEvent;
use leptos::prelude::*;

use crate::context::{use_app_context, View};

/// In-app link; pushes history instead of reloading
#[component]
pub fn NavLink(to: View, #[prop(optional, into)] class: String, children: Children) -> impl IntoView {
    let ctx = use_app_context();
    let href = to.path();
    view! {
        <a
            href=href
            class=class
            on:click=move |ev: MouseEvent| {
                ev.prevent_default();
                ctx.navigate(to.clone());
            }
        >
            {children()}
        </a>
    }
}

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app_context();
    let is_admin = move || matches!(ctx.view.get(), View::AdminProducts | View::AdminCategories);

    view! {
        <header class="site-header">
            <NavLink to=View::home() class="brand">"Otaku Threads"</NavLink>
            <nav class="site-nav">
                <Show
                    when=is_admin
                    fallback=|| view! {
                        <NavLink to=View::home()>"Shop"</NavLink>
                        <NavLink to=View::Customize(None)>"Design Your Own"</NavLink>
                        <NavLink to=View::TrackOrder>"Track Order"</NavLink>
                    }
                >
                    <NavLink to=View::AdminProducts>"Products"</NavLink>
                    <NavLink to=View::AdminCategories>"Categories"</NavLink>
                    <NavLink to=View::home()>"Back to store"</NavLink>
                </Show>
            </nav>
            <NavLink to=View::Cart class="cart-link">
                "Cart"
                <Show when=move || { ctx.cart_count.get() > 0 }>
                    <span class="cart-badge">{move || ctx.cart_count.get()}</span>
                </Show>
            </NavLink>
        </header>
    }
}
