//! Fixed in-memory product catalog.
//!
//! Every page reads products from here; there is no product API behind it.

use std::collections::BTreeMap;

use ecommerce_hub_core::ProductId;
use ecommerce_hub_core::cart::CartItem;
use ecommerce_hub_core::types::Money;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Why a variant selection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("unknown {group} option: {option}")]
    UnknownOption { group: String, option: String },
    #[error("{option} is not available")]
    Unavailable { option: String },
    #[error("no {group} option is available")]
    NoneAvailable { group: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOption {
    pub id: &'static str,
    pub name: &'static str,
    pub available: bool,
}

/// A set of mutually exclusive options, e.g. color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGroup {
    pub id: &'static str,
    pub label: &'static str,
    pub options: Vec<VariantOption>,
}

impl VariantGroup {
    /// Resolve a requested option, falling back to the first available one.
    ///
    /// # Errors
    ///
    /// Returns `VariantError` for unknown or unavailable options.
    pub fn resolve(&self, requested: Option<&str>) -> Result<&VariantOption, VariantError> {
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let option = self.options.iter().find(|o| o.id == id).ok_or_else(|| {
                    VariantError::UnknownOption {
                        group: self.id.to_string(),
                        option: id.to_string(),
                    }
                })?;
                if option.available {
                    Ok(option)
                } else {
                    Err(VariantError::Unavailable {
                        option: option.name.to_string(),
                    })
                }
            }
            None => self
                .options
                .iter()
                .find(|o| o.available)
                .ok_or_else(|| VariantError::NoneAvailable {
                    group: self.id.to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: &'static str,
    pub brand: &'static str,
    pub category: &'static str,
    pub price: Money,
    pub original_price: Option<Money>,
    /// Tenths of a star, e.g. 45 for 4.5.
    pub rating_tenths: u8,
    pub review_count: u32,
    pub description: &'static str,
    pub features: Vec<&'static str>,
    pub specifications: Vec<(&'static str, &'static str)>,
    pub images: Vec<&'static str>,
    pub variants: Vec<VariantGroup>,
    pub stock: u32,
    pub estimated_delivery: &'static str,
    pub is_new: bool,
    pub related: Vec<ProductId>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Percent off the original price, rounded to the nearest whole percent.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?.amount();
        if original <= self.price.amount() || original.is_zero() {
            return None;
        }
        let percent = (original - self.price.amount()) / original * Decimal::ONE_HUNDRED;
        percent.round().to_u32()
    }

    #[must_use]
    pub fn rating(&self) -> String {
        format!("{}.{}", self.rating_tenths / 10, self.rating_tenths % 10)
    }

    #[must_use]
    pub fn image(&self) -> &'static str {
        self.images.first().copied().unwrap_or("/static/images/no_image.png")
    }

    /// Resolve a variant selection for every group and describe it, e.g.
    /// `Midnight Black / Regular`. Products without variants yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `VariantError` if any selection is unknown or unavailable.
    pub fn describe_variant(
        &self,
        selection: &BTreeMap<String, String>,
    ) -> Result<Option<String>, VariantError> {
        if self.variants.is_empty() {
            return Ok(None);
        }
        let names = self
            .variants
            .iter()
            .map(|group| {
                group
                    .resolve(selection.get(group.id).map(String::as_str))
                    .map(|option| option.name)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(names.join(" / ")))
    }

    /// A cart line for this product.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32, variant: Option<String>) -> CartItem {
        CartItem::new(
            self.id,
            self.name,
            self.price,
            quantity,
            self.stock,
            self.image(),
            variant,
        )
    }
}

/// Homepage category tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub description: &'static str,
    pub product_count: u32,
}

pub const CATEGORIES: [Category; 6] = [
    Category {
        name: "Electronics",
        description: "Latest tech gadgets and devices",
        product_count: 245,
    },
    Category {
        name: "Fashion",
        description: "Trendy clothing and accessories",
        product_count: 189,
    },
    Category {
        name: "Home & Kitchen",
        description: "Everything for your home",
        product_count: 156,
    },
    Category {
        name: "Sports & Fitness",
        description: "Gear up for an active lifestyle",
        product_count: 98,
    },
    Category {
        name: "Books & Media",
        description: "Knowledge and entertainment",
        product_count: 312,
    },
    Category {
        name: "Beauty & Health",
        description: "Self-care essentials",
        product_count: 127,
    },
];

/// Products featured on the homepage.
pub const FEATURED: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Suggestions shown on the cart page.
pub const CART_SUGGESTIONS: [u32; 4] = [8, 12, 13, 14];

/// The catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products for the given ids, skipping unknown ones.
    #[must_use]
    pub fn select(&self, ids: &[u32]) -> Vec<&Product> {
        ids.iter()
            .filter_map(|id| self.get(ProductId::new(*id)))
            .collect()
    }

    #[must_use]
    pub fn related(&self, product: &Product) -> Vec<&Product> {
        product.related.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// The demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        let headphones = Product {
            id: ProductId::new(1),
            name: "Premium Wireless Bluetooth Headphones",
            brand: "AudioTech",
            category: "Electronics > Audio",
            price: Money::from_cents(19_999),
            original_price: Some(Money::from_cents(29_999)),
            rating_tenths: 45,
            review_count: 342,
            description: "Experience premium sound quality with these wireless Bluetooth \
                headphones featuring active noise cancellation, 30-hour battery life, and \
                superior comfort for all-day listening.",
            features: vec![
                "Active Noise Cancellation",
                "30-hour battery life",
                "Quick charge: 15 min = 3 hours playback",
                "Premium comfort padding",
                "Bluetooth 5.0 connectivity",
                "Built-in microphone for calls",
            ],
            specifications: vec![
                ("Driver Size", "40mm"),
                ("Frequency Response", "20Hz - 20kHz"),
                ("Impedance", "32Ω"),
                ("Weight", "290g"),
                ("Wireless Range", "10m"),
                ("Charging Port", "USB-C"),
            ],
            images: vec![
                "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=600&h=600&fit=crop",
                "https://images.unsplash.com/photo-1484704849700-f032a568e944?w=600&h=600&fit=crop",
                "https://images.unsplash.com/photo-1583394838336-acd977736f90?w=600&h=600&fit=crop",
                "https://images.unsplash.com/photo-1487215078519-e21cc028cb29?w=600&h=600&fit=crop",
            ],
            variants: vec![
                VariantGroup {
                    id: "color",
                    label: "Color",
                    options: vec![
                        option("black", "Midnight Black", true),
                        option("white", "Pearl White", true),
                        option("blue", "Ocean Blue", false),
                    ],
                },
                VariantGroup {
                    id: "size",
                    label: "Size",
                    options: vec![
                        option("regular", "Regular", true),
                        option("large", "Large", true),
                    ],
                },
            ],
            stock: 15,
            estimated_delivery: "2-3 business days",
            is_new: false,
            related: vec![ProductId::new(9), ProductId::new(10), ProductId::new(11), ProductId::new(8)],
        };

        let mut products = vec![headphones];
        products.extend(
            [
                simple(2, "Organic Cotton T-Shirt", "Fashion", 2_999, Some(3_999), 45, 89, 8, false,
                    "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400&h=400&fit=crop"),
                simple(3, "Smart Fitness Watch", "Electronics", 29_999, None, 47, 203, 12, true,
                    "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=400&h=400&fit=crop"),
                simple(4, "Leather Crossbody Bag", "Accessories", 8_999, Some(11_999), 46, 67, 3, false,
                    "https://images.unsplash.com/photo-1553062407-98eeb64c6a62?w=400&h=400&fit=crop"),
                simple(5, "Ceramic Coffee Mug Set", "Home & Kitchen", 2_499, None, 44, 156, 25, false,
                    "https://images.unsplash.com/photo-1514228742587-6b1558fcf93a?w=400&h=400&fit=crop"),
                simple(6, "Wireless Charging Pad", "Electronics", 3_999, Some(4_999), 43, 91, 18, false,
                    "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=400&h=400&fit=crop"),
                simple(7, "Minimalist Desk Lamp", "Home & Office", 7_999, None, 49, 45, 7, true,
                    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=400&fit=crop"),
                simple(8, "Bluetooth Speaker", "Electronics", 5_999, Some(7_999), 45, 178, 0, false,
                    "https://images.unsplash.com/photo-1608043152269-423dbba4e7e1?w=400&h=400&fit=crop"),
                simple(9, "Wireless Earbuds Pro", "Electronics", 14_999, Some(19_999), 43, 128, 25, true,
                    "https://images.unsplash.com/photo-1572569511254-d8f925fe2cbb?w=300&h=300&fit=crop"),
                simple(10, "Gaming Headset RGB", "Electronics", 8_999, None, 41, 89, 12, false,
                    "https://images.unsplash.com/photo-1599669454699-248893623440?w=300&h=300&fit=crop"),
                simple(11, "Studio Monitor Headphones", "Electronics", 29_999, None, 47, 256, 8, false,
                    "https://images.unsplash.com/photo-1524678606370-a47ad25cb82a?w=300&h=300&fit=crop"),
                simple(12, "Laptop Stand", "Home & Office", 4_999, None, 48, 89, 20, false,
                    "https://images.unsplash.com/photo-1527864550417-7fd91fc51a46?w=400&h=400&fit=crop"),
                simple(13, "Wireless Mouse", "Electronics", 3_999, Some(5_999), 43, 256, 30, false,
                    "https://images.unsplash.com/photo-1527814050087-3793815479db?w=400&h=400&fit=crop"),
                simple(14, "Phone Case", "Accessories", 1_999, None, 46, 342, 50, false,
                    "https://images.unsplash.com/photo-1556656793-08538906a9f8?w=400&h=400&fit=crop"),
            ],
        );
        Self { products }
    }
}

const fn option(id: &'static str, name: &'static str, available: bool) -> VariantOption {
    VariantOption {
        id,
        name,
        available,
    }
}

#[allow(clippy::too_many_arguments)]
fn simple(
    id: u32,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
    original_cents: Option<i64>,
    rating_tenths: u8,
    review_count: u32,
    stock: u32,
    is_new: bool,
    image: &'static str,
) -> Product {
    Product {
        id: ProductId::new(id),
        name,
        brand: "EcommerceHub",
        category,
        price: Money::from_cents(price_cents),
        original_price: original_cents.map(Money::from_cents),
        rating_tenths,
        review_count,
        description: "",
        features: Vec::new(),
        specifications: Vec::new(),
        images: vec![image],
        variants: Vec::new(),
        stock,
        estimated_delivery: "5-7 business days",
        is_new,
        related: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headphones() -> Product {
        Catalog::demo().get(ProductId::new(1)).unwrap().clone()
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.get(ProductId::new(3)).unwrap().name, "Smart Fitness Watch");
        assert!(catalog.get(ProductId::new(999)).is_none());
        assert_eq!(catalog.select(&FEATURED).len(), 8);
        assert_eq!(catalog.related(&headphones()).len(), 4);
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(headphones().discount_percent(), Some(33));
        let catalog = Catalog::demo();
        assert_eq!(catalog.get(ProductId::new(3)).unwrap().discount_percent(), None);
        assert_eq!(catalog.get(ProductId::new(2)).unwrap().discount_percent(), Some(25));
    }

    #[test]
    fn test_default_variant_is_first_available() {
        let variant = headphones().describe_variant(&BTreeMap::new()).unwrap();
        assert_eq!(variant.as_deref(), Some("Midnight Black / Regular"));
    }

    #[test]
    fn test_variant_selection() {
        let product = headphones();
        let mut selection = BTreeMap::new();
        selection.insert("color".to_string(), "white".to_string());
        selection.insert("size".to_string(), "large".to_string());
        assert_eq!(
            product.describe_variant(&selection).unwrap().as_deref(),
            Some("Pearl White / Large")
        );

        selection.insert("color".to_string(), "blue".to_string());
        assert_eq!(
            product.describe_variant(&selection),
            Err(VariantError::Unavailable {
                option: "Ocean Blue".to_string()
            })
        );

        selection.insert("color".to_string(), "green".to_string());
        assert!(matches!(
            product.describe_variant(&selection),
            Err(VariantError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_products_without_variants() {
        let catalog = Catalog::demo();
        let mug = catalog.get(ProductId::new(5)).unwrap();
        assert_eq!(mug.describe_variant(&BTreeMap::new()).unwrap(), None);
        assert_eq!(mug.rating(), "4.4");
    }
}
