//! Delete Confirm Button Component
//!
//! Inline two-step delete used by the admin tables.

use leptos::prelude::*;

/// Shows "Delete"; once clicked, asks "Sure?" with confirm/cancel
#[component]
pub fn DeleteConfirmButton(#[prop(into)] on_confirm: Callback<()>) -> impl IntoView {
    let (confirming, set_confirming) = signal(false);

    view! {
        <Show
            when=move || confirming.get()
            fallback=move || view! {
                <button
                    class="btn btn-danger btn-small"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirming.set(true);
                    }
                >
                    "Delete"
                </button>
            }
        >
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Sure?"</span>
                <button
                    class="btn btn-danger btn-small"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirming.set(false);
                        on_confirm.run(());
                    }
                >
                    "Yes"
                </button>
                <button
                    class="btn btn-small"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirming.set(false);
                    }
                >
                    "No"
                </button>
            </span>
        </Show>
    }
}
