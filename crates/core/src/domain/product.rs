use serde::{Deserialize, Serialize};

/// Product description fed into a pipeline run. Set once at construction
/// and never mutated by workers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default)]
    pub key_ingredients: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub skin_types: Vec<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub usage_instructions: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl ProductInput {
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            concentration: None,
            key_ingredients: Vec::new(),
            benefits: Vec::new(),
            price: None,
            currency: default_currency(),
            size: None,
            skin_types: Vec::new(),
            side_effects: None,
            usage_instructions: None,
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.key_ingredients = ingredients;
        self
    }

    pub fn with_benefits(mut self, benefits: Vec<String>) -> Self {
        self.benefits = benefits;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage_instructions = Some(usage.into());
        self
    }

    pub fn with_skin_types(mut self, skin_types: Vec<String>) -> Self {
        self.skin_types = skin_types;
        self
    }

    pub fn with_side_effects(mut self, side_effects: impl Into<String>) -> Self {
        self.side_effects = Some(side_effects.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder() {
        let product = ProductInput::new("Vitamin C Serum", "GlowLabs")
            .with_ingredients(vec!["Vitamin C".to_string(), "Ferulic Acid".to_string()])
            .with_price(699.0);

        assert_eq!(product.name, "Vitamin C Serum");
        assert_eq!(product.brand, "GlowLabs");
        assert_eq!(product.key_ingredients.len(), 2);
        assert_eq!(product.price, Some(699.0));
        assert_eq!(product.currency, "INR");
    }

    #[test]
    fn test_product_deserialization_defaults() {
        let json = r#"{"name":"Serum","brand":"Acme"}"#;
        let product: ProductInput = serde_json::from_str(json).unwrap();

        assert_eq!(product.name, "Serum");
        assert!(product.key_ingredients.is_empty());
        assert_eq!(product.currency, "INR");
        assert!(product.price.is_none());
    }
}
