//! Admin Token Bar Component

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::api;

/// Stores the bearer token used by admin endpoints
#[component]
pub fn AdminTokenBar() -> impl IntoView {
    let (signed_in, set_signed_in) = signal(api::has_admin_token());
    let (token, set_token) = signal(String::new());

    let save = move |ev: SubmitEvent| {
        ev.prevent_default();
        api::set_admin_token(&token.get());
        set_token.set(String::new());
        set_signed_in.set(api::has_admin_token());
    };

    let (log_lines, set_log_lines) = signal(Vec::<String>::new());
    let toggle_log = move |_| {
        if log_lines.with(Vec::is_empty) {
            set_log_lines.set(rolling_logger::recent_lines());
        } else {
            set_log_lines.set(Vec::new());
        }
    };

    let sign_out = move |_| {
        api::set_admin_token("");
        set_signed_in.set(false);
    };

    view! {
        <div class="admin-token">
            <Show
                when=move || signed_in.get()
                fallback=move || view! {
                    <form on:submit=save>
                        <input
                            type="password"
                            placeholder="Admin token"
                            prop:value=move || token.get()
                            on:input=move |ev| set_token.set(event_target_value(&ev))
                        />
                        <button type="submit" class="btn">"Save"</button>
                    </form>
                }
            >
                <span>"Signed in as admin"</span>
                <button class="link-btn" on:click=sign_out>"Sign out"</button>
                <button class="link-btn" on:click=toggle_log>"Recent log"</button>
                <Show when=move || !log_lines.with(Vec::is_empty)>
                    <pre class="admin-log">{move || log_lines.get().join("\n")}</pre>
                </Show>
            </Show>
        </div>
    }
}
