//! Customize Page Component
//!
//! Print your own text on a customizable blank and add it to the cart.

use leptos::prelude::*;
use leptos::task::spawn_local;
use storefront_core::domain::new_id;
use storefront_core::{CartItem, CustomDesign};

use crate::api;
use crate::browser;
use crate::context::{use_app_context, View};
use crate::models::{format_price, Product};
use crate::tracking;

const PLACEMENTS: &[(&str, &str)] = &[("front", "Front"), ("back", "Back"), ("left-chest", "Left chest")];

const INK_COLORS: &[&str] = &["#ffffff", "#111111", "#e63946", "#f4a261", "#2a9d8f", "#7b2cbf"];

const MAX_TEXT_LEN: usize = 40;

/// Cart line for a design on `blank`
fn design_item(
    blank: &Product,
    text: &str,
    ink: &str,
    placement: &str,
    size: Option<String>,
    color: Option<String>,
) -> CartItem {
    let design = CustomDesign {
        design_id: new_id("design"),
        base_product_id: Some(blank.id.clone()),
        preview_url: None,
        text: Some(text.trim().to_string()),
        placement: Some(placement.to_string()),
        ink_color: Some(ink.to_string()),
    };
    let mut item = CartItem::custom(format!("Custom {}", blank.name), blank.price, design).with_variant(size, color);
    item.image = blank.image();
    item
}

#[component]
pub fn CustomizePage(product_id: Option<String>) -> impl IntoView {
    let ctx = use_app_context();
    let blanks = RwSignal::new(Vec::<Product>::new());
    let selected = RwSignal::new(None::<Product>);
    let (text, set_text) = signal(String::new());
    let (ink, set_ink) = signal(INK_COLORS[0].to_string());
    let (placement, set_placement) = signal(PLACEMENTS[0].0.to_string());
    let size = RwSignal::new(None::<String>);
    let color = RwSignal::new(None::<String>);

    let select = move |product: Product| {
        size.set(product.sizes.first().cloned());
        color.set(product.colors.first().cloned());
        selected.set(Some(product));
    };

    spawn_local(async move {
        match api::list_products(None).await {
            Ok(products) => {
                let customizable: Vec<Product> = products.into_iter().filter(|p| p.customizable).collect();
                let initial = product_id
                    .as_deref()
                    .and_then(|id| customizable.iter().find(|p| p.id == id))
                    .or(customizable.first())
                    .cloned();
                blanks.set(customizable);
                if let Some(product) = initial {
                    select(product);
                }
            }
            Err(e) => log::error!("customize: {}", e),
        }
    });

    let add_to_cart = move |_| {
        let Some(blank) = selected.get() else {
            return;
        };
        let message = text.get();
        if message.trim().is_empty() {
            browser::alert("Add some text for your design first.");
            return;
        }
        let item = design_item(&blank, &message, &ink.get(), &placement.get(), size.get(), color.get());
        if let Some(design) = &item.custom_design {
            tracking::customize(&blank.id, &design.design_id);
        }
        match tracking::add_to_cart(item) {
            Ok(_) => ctx.navigate(View::Cart),
            Err(e) => {
                log::error!("cart: {}", e);
                browser::alert("Could not update your cart. Please try again.");
            }
        }
    };

    view! {
        <section class="customize">
            <h1>"Design Your Tee"</h1>
            <div class="customize-body">
                <div
                    class="design-preview"
                    style:background-color=move || color.get().unwrap_or_else(|| "#222".to_string())
                >
                    {move || selected.get().and_then(|p| p.image()).map(|src| view! { <img src=src alt="" /> })}
                    <span
                        class=move || format!("design-text placement-{}", placement.get())
                        style:color=move || ink.get()
                    >
                        {move || text.get()}
                    </span>
                </div>

                <div class="design-controls">
                    <label class="field">
                        <span>"Base"</span>
                        <select on:change=move |ev| {
                            let id = event_target_value(&ev);
                            if let Some(p) = blanks.with(|b| b.iter().find(|p| p.id == id).cloned()) {
                                select(p);
                            }
                        }>
                            <For
                                each=move || blanks.get()
                                key=|p| p.id.clone()
                                children=move |p| {
                                    let id = p.id.clone();
                                    view! {
                                        <option
                                            value=p.id.clone()
                                            selected=move || selected.with(|s| s.as_ref().is_some_and(|s| s.id == id))
                                        >
                                            {format!("{} · {}", p.name, format_price(p.price))}
                                        </option>
                                    }
                                }
                            />
                        </select>
                    </label>

                    <label class="field">
                        <span>"Text"</span>
                        <input
                            type="text"
                            maxlength=MAX_TEXT_LEN.to_string()
                            placeholder="Your text"
                            prop:value=move || text.get()
                            on:input=move |ev| set_text.set(event_target_value(&ev))
                        />
                    </label>

                    <div class="option-row">
                        <span class="option-label">"Ink"</span>
                        {INK_COLORS.iter().map(|&c| view! {
                            <button
                                class="swatch"
                                class:active=move || ink.get() == c
                                style:background-color=c
                                aria-label=c
                                on:click=move |_| set_ink.set(c.to_string())
                            ></button>
                        }).collect_view()}
                    </div>

                    <div class="option-row">
                        <span class="option-label">"Placement"</span>
                        {PLACEMENTS.iter().map(|&(value, label)| view! {
                            <button
                                class="chip"
                                class:active=move || placement.get() == value
                                on:click=move |_| set_placement.set(value.to_string())
                            >
                                {label}
                            </button>
                        }).collect_view()}
                    </div>

                    {move || selected.get().map(|p| view! {
                        <VariantPicker label="Size" options=p.sizes.clone() value=size />
                        <VariantPicker label="Colour" options=p.colors.clone() value=color />
                    })}

                    <button
                        class="btn btn-primary"
                        disabled=move || selected.with(Option::is_none)
                        on:click=add_to_cart
                    >
                        {move || selected.get().map(|p| format!("Add to cart · {}", format_price(p.price))).unwrap_or_else(|| "Add to cart".to_string())}
                    </button>
                </div>
            </div>
        </section>
    }
}

#[component]
fn VariantPicker(label: &'static str, options: Vec<String>, value: RwSignal<Option<String>>) -> impl IntoView {
    (!options.is_empty()).then(|| view! {
        <div class="option-row">
            <span class="option-label">{label}</span>
            {options.into_iter().map(|option| {
                let current = option.clone();
                let choice = option.clone();
                view! {
                    <button
                        class="chip"
                        class:active=move || value.with(|v| v.as_deref() == Some(current.as_str()))
                        on:click=move |_| value.set(Some(choice.clone()))
                    >
                        {option}
                    </button>
                }
            }).collect_view()}
        </div>
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_item_is_its_own_line() {
        let blank = Product {
            id: "tee-black".into(),
            name: "Black Tee".into(),
            description: String::new(),
            price: 699.0,
            compare_at_price: None,
            images: vec!["/img/black.png".into()],
            category: None,
            sizes: vec!["M".into()],
            colors: vec!["Black".into()],
            stock: None,
            customizable: true,
            featured: false,
        };
        let a = design_item(&blank, " Nakama ", "#e63946", "back", Some("M".into()), None);
        let b = design_item(&blank, "Nakama", "#ffffff", "back", Some("M".into()), None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.product_id(), "tee-black");
        assert_eq!(a.custom_design.as_ref().and_then(|d| d.text.as_deref()), Some("Nakama"));
        assert_eq!(a.custom_design.as_ref().and_then(|d| d.ink_color.as_deref()), Some("#e63946"));
        assert_eq!(b.custom_design.as_ref().and_then(|d| d.ink_color.as_deref()), Some("#ffffff"));
        assert_eq!(a.name, "Custom Black Tee");
        assert_eq!(a.image.as_deref(), Some("/img/black.png"));
    }
}
