use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::app::PagesiftError;

/// Rule names accepted by `general` templates.
pub const GENERAL_NAMES: &[&str] = &["publish_datetime"];

/// Rule names accepted by `product` templates.
pub const PRODUCT_NAMES: &[&str] = &[
    "title",
    "description",
    "price",
    "low_price",
    "currency",
    "availability",
    "brand",
    "image_urls",
    "color",
    "size",
    "material",
    "fit",
    "gender",
    "category",
    "manufacturer",
    "additional_image_links",
    "itemCondition",
    "list_price",
    "free_shipping_limit",
    "min_shipping_length",
    "shipping_earliest_arrival_date",
    "shipping_latest_arrival_date",
    "shipping_geo",
    "shipping_method",
    "shipping_policy",
    "return_length",
    "return_policy",
    "dimension",
    "size_type",
    "size_system",
    "sale_label",
    "scarcity_label",
    "free_shipping_label",
    "free_return_label",
    "best_seller_label",
    "new_arrival_label",
    "avg_review_rating",
    "num_ratings",
    "review_link",
    "review_low_rating",
    "review_high_rating",
    "item_id",
    "item_set_id",
    "gtin",
    "upc",
    "mpn",
    "has_variants",
    "variant_skus",
    "promo_code",
    "image_link",
    "sale_price",
    "low_list_price",
    "high_list_price",
    "low_sale_price",
    "high_sale_price",
    "is_item",
    "is_item_set",
    "variant_availability",
];

// Lookups are case-insensitive, so the sets hold lowercased names.
static GENERAL_SET: LazyLock<HashSet<String>> = LazyLock::new(|| lowercased(GENERAL_NAMES));
static PRODUCT_SET: LazyLock<HashSet<String>> = LazyLock::new(|| lowercased(PRODUCT_NAMES));

fn lowercased(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_ascii_lowercase()).collect()
}

/// Template type; selects the closed vocabulary of permitted rule names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateType {
    General,
    Product,
}

impl TemplateType {
    pub const ALL: [TemplateType; 2] = [TemplateType::General, TemplateType::Product];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Product => "product",
        }
    }

    /// Permitted rule names, in their canonical spelling.
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Self::General => GENERAL_NAMES,
            Self::Product => PRODUCT_NAMES,
        }
    }

    /// Whether `name` belongs to this vocabulary, ignoring ASCII case.
    pub fn permits(&self, name: &str) -> bool {
        let set = match self {
            Self::General => &*GENERAL_SET,
            Self::Product => &*PRODUCT_SET,
        };
        set.contains(&name.to_ascii_lowercase())
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = PagesiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(TemplateType::as_str).collect();
                PagesiftError::Validation(format!(
                    "type `{}` must be one of {{{}}}",
                    s,
                    known.join(", ")
                ))
            })
    }
}
