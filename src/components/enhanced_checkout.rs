//! Enhanced Checkout Page Component
//!
//! Four-step flow: Cart Review -> Shipping -> Payment -> Confirmation,
//! with coupons and live courier rates.

use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::{json, Map, Value};
use storefront_core::{CheckoutSnapshot, Coupon, EnhancedCheckoutStep, OrderTotals};

use crate::api;
use crate::browser::{self, BrowserStorage};
use crate::components::{
    place_order, CartLine, NavLink, OrderDraft, OrderSummary, PaymentOptions, ReviewDetails, ShippingForm,
    StepIndicator,
};
use crate::config;
use crate::context::{use_app_context, View};
use crate::models::{format_price, Order, ShippingRate};
use crate::store::{use_app_store, AppStateStoreFields};
use crate::tracking;

/// Indian PIN codes are six digits
fn is_postal_code(value: &str) -> bool {
    let value = value.trim();
    value.len() == 6 && value.chars().all(|c| c.is_ascii_digit())
}

#[component]
pub fn EnhancedCheckoutPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let cfg = config::get();

    let snapshot = CheckoutSnapshot::load(&BrowserStorage::Session).unwrap_or_default();
    // A finished order never resumes at confirmation
    let resume_step = match snapshot.enhanced_step {
        EnhancedCheckoutStep::Confirmation => EnhancedCheckoutStep::CartReview,
        step => step,
    };
    let step = RwSignal::new(resume_step);
    let shipping = RwSignal::new(snapshot.shipping);
    let payment = RwSignal::new(snapshot.payment_method);
    let coupon = RwSignal::new(None::<Coupon>);
    let (coupon_code, set_coupon_code) = signal(snapshot.coupon_code.clone().unwrap_or_default());
    let (coupon_error, set_coupon_error) = signal::<Option<String>>(None);
    let rates = RwSignal::new(Vec::<ShippingRate>::new());
    let selected_rate = RwSignal::new(None::<ShippingRate>);
    let (placing, set_placing) = signal(false);
    let placed = RwSignal::new(None::<Order>);

    let shipping_rate = move || selected_rate.with(|r| r.as_ref().map_or(cfg.flat_shipping_rate, |r| r.cost));
    let totals = Memo::new(move |_| {
        OrderTotals::compute(
            &store.cart().read(),
            coupon.get().as_ref(),
            shipping_rate(),
            cfg.free_shipping_threshold,
        )
    });

    let apply_coupon = move |code: String| {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return;
        }
        let subtotal = totals.get_untracked().subtotal;
        spawn_local(async move {
            match api::validate_coupon(&code, subtotal).await {
                Ok(valid) if valid.is_applicable(subtotal) => {
                    set_coupon_error.set(None);
                    coupon.set(Some(valid));
                }
                Ok(valid) => {
                    let min = valid.min_order_amount.unwrap_or_default();
                    set_coupon_error.set(Some(format!("{} needs an order of at least {}", valid.code, format_price(min))));
                }
                Err(e) => set_coupon_error.set(Some(e)),
            }
        });
    };

    if let Some(code) = snapshot.coupon_code {
        apply_coupon(code);
    }

    // Quote couriers once a full PIN code is entered
    Effect::new(move |previous: Option<String>| {
        let postal_code = shipping.with(|s| s.postal_code.trim().to_string());
        if previous.as_deref() != Some(postal_code.as_str()) && is_postal_code(&postal_code) {
            let lookup = postal_code.clone();
            spawn_local(async move {
                match api::shipping_rates(&lookup).await {
                    Ok(quotes) => {
                        selected_rate.set(quotes.iter().min_by(|a, b| a.cost.total_cmp(&b.cost)).cloned());
                        rates.set(quotes);
                    }
                    Err(e) => {
                        log::warn!("checkout: no rates for {}: {}", lookup, e);
                        rates.set(Vec::new());
                        selected_rate.set(None);
                    }
                }
            });
        }
        postal_code
    });

    Effect::new(move |_| {
        let snapshot = CheckoutSnapshot {
            enhanced_step: step.get(),
            shipping: shipping.get(),
            payment_method: payment.get(),
            coupon_code: coupon.get().map(|c| c.code),
            ..CheckoutSnapshot::load(&BrowserStorage::Session).unwrap_or_default()
        };
        if let Err(e) = snapshot.sync(&BrowserStorage::Session) {
            log::debug!("checkout: snapshot not saved: {}", e);
        }
    });

    let start = move |_: MouseEvent| {
        let items = store.cart().get_untracked();
        tracking::begin_checkout(&items, totals.get_untracked().total);
        step.set(EnhancedCheckoutStep::Shipping);
    };

    let continue_to_payment = move |_: MouseEvent| match shipping.with(|s| s.validate()) {
        Ok(()) => {
            let mut params = Map::new();
            if let Some(rate) = selected_rate.get_untracked() {
                params.insert("shipping_tier".into(), Value::String(rate.courier));
            }
            tracking::event("add_shipping_info", params);
            step.set(EnhancedCheckoutStep::Payment);
        }
        Err(message) => browser::alert(&message),
    };

    let submit = move |_: MouseEvent| {
        if placing.get() {
            return;
        }
        let draft = OrderDraft {
            items: store.cart().get(),
            shipping: shipping.get(),
            payment_method: payment.get(),
            coupon: coupon.get(),
            shipping_rate: shipping_rate(),
        };
        tracking::event("add_payment_info", json_params(&[("payment_type", json!(draft.payment_method.as_str()))]));
        set_placing.set(true);
        spawn_local(async move {
            match place_order(draft).await {
                Ok(order) => {
                    placed.set(Some(order));
                    step.set(EnhancedCheckoutStep::Confirmation);
                }
                Err(message) => {
                    log::warn!("checkout: {}", message);
                    browser::alert(&message);
                }
            }
            set_placing.set(false);
        });
    };

    let step_labels: Vec<&'static str> = EnhancedCheckoutStep::ALL.iter().map(|s| s.label()).collect();
    let step_index = Signal::derive(move || step.get().index());
    let back = move |_: MouseEvent| step.update(|s| *s = s.prev());

    view! {
        <section class="checkout enhanced">
            <h1>"Express Checkout"</h1>
            <StepIndicator labels=step_labels current=step_index />
            <div class="checkout-body">
                <div class="checkout-step">
                    {move || match step.get() {
                        EnhancedCheckoutStep::CartReview => view! {
                            <h2>"Review your cart"</h2>
                            <Show
                                when=move || !store.cart().read().is_empty()
                                fallback=move || view! {
                                    <p class="empty">"Your cart is empty."</p>
                                    <NavLink to=View::home()>"Back to shop"</NavLink>
                                }
                            >
                                <ul class="cart-lines">
                                    <For
                                        each=move || store.cart().get()
                                        key=|item| (item.id.clone(), item.quantity)
                                        children=|item| view! { <CartLine item=item /> }
                                    />
                                </ul>
                                <form class="coupon-form" on:submit=move |ev| {
                                    ev.prevent_default();
                                    apply_coupon(coupon_code.get());
                                }>
                                    <input
                                        type="text"
                                        placeholder="Coupon code"
                                        prop:value=move || coupon_code.get()
                                        on:input=move |ev| set_coupon_code.set(event_target_value(&ev))
                                    />
                                    <button type="submit" class="btn">"Apply"</button>
                                </form>
                                {move || coupon_error.get().map(|e| view! { <p class="error">{e}</p> })}
                                {move || coupon.get().map(|c| view! {
                                    <p class="notice">
                                        {format!("{} applied", c.code)}
                                        <button class="link-btn" on:click=move |_| coupon.set(None)>"Remove"</button>
                                    </p>
                                })}
                                <div class="step-actions">
                                    <button class="btn btn-primary" on:click=start>"Continue"</button>
                                </div>
                            </Show>
                        }.into_any(),
                        EnhancedCheckoutStep::Shipping => view! {
                            <h2>"Shipping"</h2>
                            <ShippingForm shipping=shipping />
                            <Show when=move || !rates.with(Vec::is_empty)>
                                <fieldset class="rates">
                                    <legend>"Courier"</legend>
                                    <For
                                        each=move || rates.get()
                                        key=|r| r.courier.clone()
                                        children=move |rate| {
                                            let courier = rate.courier.clone();
                                            let label = format!(
                                                "{} · {}{}",
                                                rate.courier,
                                                format_price(rate.cost),
                                                rate.estimated_days.as_ref().map(|d| format!(" · {} days", d)).unwrap_or_default(),
                                            );
                                            view! {
                                                <label class="radio">
                                                    <input
                                                        type="radio"
                                                        name="courier"
                                                        prop:checked=move || selected_rate.with(|r| r.as_ref().is_some_and(|r| r.courier == courier))
                                                        on:change=move |_| selected_rate.set(Some(rate.clone()))
                                                    />
                                                    {label}
                                                </label>
                                            }
                                        }
                                    />
                                </fieldset>
                            </Show>
                            <div class="step-actions">
                                <button class="btn" on:click=back>"Back"</button>
                                <button class="btn btn-primary" on:click=continue_to_payment>"Continue to payment"</button>
                            </div>
                        }.into_any(),
                        EnhancedCheckoutStep::Payment => view! {
                            <h2>"Payment"</h2>
                            <PaymentOptions payment=payment />
                            <ReviewDetails shipping=shipping payment=payment />
                            <div class="step-actions">
                                <button class="btn" on:click=back>"Back"</button>
                                <button class="btn btn-primary" disabled=move || placing.get() on:click=submit>
                                    {move || if placing.get() { "Placing order..." } else { "Place order" }}
                                </button>
                            </div>
                        }.into_any(),
                        EnhancedCheckoutStep::Confirmation => view! {
                            <h2>"Thank you!"</h2>
                            {move || placed.get().map(|order| view! {
                                <p>"Order " <strong>{order.order_number.clone()}</strong> " is confirmed."</p>
                                {order.tracking_pin.clone().map(|pin| view! {
                                    <p>"Your tracking PIN is " <strong>{pin}</strong> ". Keep it to check your order status."</p>
                                })}
                            })}
                            <div class="step-actions">
                                <button class="btn" on:click=move |_| ctx.navigate(View::TrackOrder)>"Track order"</button>
                                <button class="btn btn-primary" on:click=move |_| ctx.navigate(View::home())>"Keep shopping"</button>
                            </div>
                        }.into_any(),
                    }}
                </div>
                <aside>
                    <OrderSummary totals=totals />
                </aside>
            </div>
        </section>
    }
}

fn json_params(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_shape() {
        assert!(is_postal_code("411001"));
        assert!(is_postal_code(" 560034 "));
        assert!(!is_postal_code("4110"));
        assert!(!is_postal_code("41100A"));
    }
}
