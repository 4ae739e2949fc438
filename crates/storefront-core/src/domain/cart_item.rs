//! Cart Item Entity

use serde::{Deserialize, Serialize};

/// Reference to a design produced on the Customize page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDesign {
    pub design_id: String,
    /// Catalog product the design is printed on
    #[serde(default)]
    pub base_product_id: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub placement: Option<String>,
    /// Text colour as a CSS hex value
    #[serde(default)]
    pub ink_color: Option<String>,
}

/// One line of the cart, keyed by product id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub custom_design: Option<CustomDesign>,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            size: None,
            color: None,
            image: None,
            custom_design: None,
        }
    }

    /// Cart line for a custom design; keyed by design id so two designs on
    /// the same blank never merge
    pub fn custom(name: impl Into<String>, price: f64, design: CustomDesign) -> Self {
        let mut item = Self::new(design.design_id.clone(), name, price, 1);
        item.custom_design = Some(design);
        item
    }

    pub fn with_variant(mut self, size: Option<String>, color: Option<String>) -> Self {
        self.size = size;
        self.color = color;
        self
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn is_custom(&self) -> bool {
        self.custom_design.is_some()
    }

    /// Catalog product to bill; the blank for custom designs
    pub fn product_id(&self) -> &str {
        self.custom_design
            .as_ref()
            .and_then(|d| d.base_product_id.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_stored_shape() {
        let raw = r#"{"_id":"p1","name":"Akatsuki Tee","price":500,"quantity":2,"size":"L"}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id, "p1");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.size.as_deref(), Some("L"));
        assert_eq!(item.line_total(), 1000.0);
        assert!(!item.is_custom());
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let item: CartItem = serde_json::from_str(r#"{"_id":"p2","name":"Cap","price":250}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_custom_lines_bill_the_blank() {
        let design = CustomDesign {
            design_id: "design_1".into(),
            base_product_id: Some("tee-black".into()),
            preview_url: None,
            text: Some("Plus Ultra".into()),
            placement: Some("front".into()),
            ink_color: Some("#e63946".into()),
        };
        let item = CartItem::custom("Custom Tee", 799.0, design);
        assert_eq!(item.id, "design_1");
        assert_eq!(item.product_id(), "tee-black");
        assert!(item.is_custom());
        assert_eq!(CartItem::new("p1", "Tee", 1.0, 1).product_id(), "p1");

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["customDesign"]["inkColor"], "#e63946");
    }
}
