//! Best-effort facet inference
//!
//! The product table has no size/color/fabric columns, so these facets are
//! guessed from the product's name and description by plain substring
//! containment. The result is a hint for filtering, not catalog data: a
//! product that never mentions its fabric simply has no fabric facet.

use serde::Serialize;

use crate::model::Product;

pub const SIZES: [&str; 4] = ["single", "double", "queen", "king"];

/// `grey` is matched too but reported as `gray`.
pub const COLORS: [&str; 8] = [
    "white", "beige", "gray", "blue", "red", "green", "purple", "yellow",
];

pub const FABRICS: [&str; 6] = ["cotton", "polyester", "linen", "velvet", "silk", "sheer"];

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub sizes: Vec<&'static str>,
    pub colors: Vec<&'static str>,
    pub fabrics: Vec<&'static str>,
}

impl Facets {
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| *s == size)
    }

    pub fn has_color(&self, color: &str) -> bool {
        let color = canonical_color(color);
        self.colors.iter().any(|c| *c == color)
    }

    pub fn has_fabric(&self, fabric: &str) -> bool {
        self.fabrics.iter().any(|f| *f == fabric)
    }
}

/// Maps the British spelling onto the palette entry.
pub fn canonical_color(color: &str) -> &str {
    if color == "grey" {
        "gray"
    } else {
        color
    }
}

fn matching(text: &str, vocabulary: &[&'static str]) -> Vec<&'static str> {
    vocabulary.iter().copied().filter(|word| text.contains(word)).collect()
}

/// Infers facets from already lower-cased text.
pub fn infer_from_text(text: &str) -> Facets {
    let colors = COLORS
        .iter()
        .copied()
        .filter(|color| text.contains(color) || (*color == "gray" && text.contains("grey")))
        .collect();

    Facets {
        sizes: matching(text, &SIZES),
        colors,
        fabrics: matching(text, &FABRICS),
    }
}

pub fn infer(product: &Product) -> Facets {
    infer_from_text(&product.search_text())
}

/// Fabric paragraph shown on the product detail page.
pub fn fabric_blurb(facets: &Facets) -> String {
    if facets.fabrics.is_empty() {
        return "Crafted from premium quality materials, this product offers excellent \
                durability and comfort."
            .to_string();
    }
    let list = facets
        .fabrics
        .iter()
        .map(|f| crate::render::title_case(f))
        .collect::<Vec<_>>()
        .join(", ");
    let plural = if facets.fabrics.len() > 1 { "s" } else { "" };
    format!(
        "This product is crafted from high-quality {list} fabric{plural}, ensuring durability and comfort."
    )
}
