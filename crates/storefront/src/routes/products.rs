//! Product detail and add-to-cart handlers.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use ecommerce_hub_core::ProductId;
use ecommerce_hub_core::cart::CartError;
use serde::Deserialize;
use tracing::instrument;

use super::account::OptionView;
use super::{Layout, not_found_page};
use crate::catalog::{Product, VariantGroup};
use crate::error::{Result, add_breadcrumb};
use crate::models::{LocalStorage, session, session_keys};
use crate::services::reviews::{self, RATING_DISTRIBUTION, Review, ReviewSort, ReviewSubmission};
use crate::state::AppState;

/// Product tile on the homepage, related products and cart suggestions.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub rating: String,
    pub review_count: u32,
    pub image: String,
    pub in_stock: bool,
    pub is_new: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.to_string(),
            price: product.price.to_string(),
            original_price: product.original_price.map(|price| price.to_string()),
            discount_percent: product.discount_percent(),
            rating: product.rating(),
            review_count: product.review_count,
            image: product.image().to_string(),
            in_stock: product.in_stock(),
            is_new: product.is_new,
        }
    }
}

/// A variant picker group.
#[derive(Debug, Clone)]
pub struct VariantGroupView {
    pub id: String,
    pub label: String,
    pub options: Vec<VariantOptionView>,
}

#[derive(Debug, Clone)]
pub struct VariantOptionView {
    pub id: String,
    pub name: String,
    pub available: bool,
    pub selected: bool,
}

impl From<&VariantGroup> for VariantGroupView {
    fn from(group: &VariantGroup) -> Self {
        let default = group.resolve(None).ok().map(|option| option.id);
        Self {
            id: group.id.to_string(),
            label: group.label.to_string(),
            options: group
                .options
                .iter()
                .map(|option| VariantOptionView {
                    id: option.id.to_string(),
                    name: option.name.to_string(),
                    available: option.available,
                    selected: Some(option.id) == default,
                })
                .collect(),
        }
    }
}

/// One review in the product page list.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub name: String,
    pub initials: String,
    pub rating: u8,
    pub stars: String,
    pub title: String,
    pub comment: String,
    pub date: String,
    pub helpful: u32,
    pub verified: bool,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        let filled = usize::from(review.rating.min(5));
        Self {
            name: review.name.to_string(),
            initials: review.initials.to_string(),
            rating: review.rating,
            stars: format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)),
            title: review.title.to_string(),
            comment: review.comment.to_string(),
            date: review.date.format("%B %-d, %Y").to_string(),
            helpful: review.helpful,
            verified: review.verified,
        }
    }
}

/// Query parameters of the product page.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub sort: Option<String>,
}

/// Product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductCardView,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub features: Vec<String>,
    pub specifications: Vec<(String, String)>,
    pub images: Vec<String>,
    pub variants: Vec<VariantGroupView>,
    pub stock: u32,
    pub low_stock: bool,
    pub estimated_delivery: String,
    pub related: Vec<ProductCardView>,
    pub reviews: Vec<ReviewView>,
    pub review_sort_options: Vec<OptionView>,
    /// Star count and percent share, 5 stars first.
    pub rating_distribution: Vec<(u8, u8)>,
    pub notice: Option<String>,
}

/// Stock level below which the page warns "only N left".
const LOW_STOCK_THRESHOLD: u32 = 10;

fn parse_id(raw: &str) -> Option<ProductId> {
    raw.parse().ok()
}

fn review_sort_options(selected: ReviewSort) -> Vec<OptionView> {
    ReviewSort::ALL
        .into_iter()
        .map(|sort| OptionView {
            value: sort.as_str(),
            label: sort.label(),
            selected: sort == selected,
        })
        .collect()
}

/// Display a product with its reviews, most helpful first unless `?sort=`
/// names another order.
#[instrument(skip(state, storage))]
pub async fn show(
    State(state): State<AppState>,
    storage: LocalStorage,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Response> {
    let layout = Layout::from_storage(&storage);
    let Some(product) = parse_id(&id).and_then(|id| state.catalog().get(id)) else {
        return Ok(not_found_page(layout));
    };

    let notice = session::take::<String>(storage.session(), session_keys::PRODUCT_NOTICE).await?;
    let sort = query
        .sort
        .as_deref()
        .and_then(|sort| sort.parse::<ReviewSort>().ok())
        .unwrap_or_default();

    Ok(ProductShowTemplate {
        layout,
        product: ProductCardView::from(product),
        brand: product.brand.to_string(),
        category: product.category.to_string(),
        description: product.description.to_string(),
        features: product.features.iter().map(ToString::to_string).collect(),
        specifications: product
            .specifications
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect(),
        images: product.images.iter().map(ToString::to_string).collect(),
        variants: product.variants.iter().map(VariantGroupView::from).collect(),
        stock: product.stock,
        low_stock: product.in_stock() && product.stock < LOW_STOCK_THRESHOLD,
        estimated_delivery: product.estimated_delivery.to_string(),
        related: state
            .catalog()
            .related(product)
            .into_iter()
            .map(ProductCardView::from)
            .collect(),
        reviews: reviews::sort_reviews(&reviews::demo_reviews(), sort)
            .iter()
            .map(ReviewView::from)
            .collect(),
        review_sort_options: review_sort_options(sort),
        rating_distribution: RATING_DISTRIBUTION.to_vec(),
        notice,
    }
    .into_response())
}

/// Split the posted add-to-cart form into quantity and variant selection.
///
/// Variant choices arrive as `variant_<group>=<option>`.
fn parse_selection(fields: &[(String, String)]) -> (Option<u32>, BTreeMap<String, String>) {
    let mut quantity = Some(1);
    let mut selection = BTreeMap::new();
    for (name, value) in fields {
        if name == "quantity" {
            quantity = value.trim().parse().ok();
        } else if let Some(group) = name.strip_prefix("variant_") {
            selection.insert(group.to_string(), value.clone());
        }
    }
    (quantity, selection)
}

/// Notice shown when a cart change is refused.
pub(super) fn cart_error_message(err: &CartError) -> String {
    match err {
        CartError::OutOfStock => "This product is out of stock".to_string(),
        CartError::QuantityOutOfRange { max, .. } => {
            format!("Please choose a quantity between 1 and {max}")
        }
        CartError::LineNotFound(_) => "That item is no longer in your cart".to_string(),
    }
}

/// Add a product to the cart, then show the cart.
///
/// Refused selections go back to the product page with a notice.
#[instrument(skip(state, storage, fields))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    mut storage: LocalStorage,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let Some(product) = parse_id(&id).and_then(|id| state.catalog().get(id)) else {
        return Ok(not_found_page(Layout::from_storage(&storage)));
    };
    let back = format!("/products/{}", product.id);

    let (quantity, selection) = parse_selection(&fields);
    let variant = match product.describe_variant(&selection) {
        Ok(variant) => variant,
        Err(err) => {
            let message = format!("Please choose another option: {err}");
            storage
                .session()
                .insert(session_keys::PRODUCT_NOTICE, &message)
                .await?;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    let mut cart = storage.cart();
    let item = product.to_cart_item(quantity.unwrap_or(0), variant);
    match cart.add(item) {
        Ok(line_quantity) => {
            storage.set_cart(&cart)?;
            storage.save().await?;
            let product_id = product.id.to_string();
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product_id.as_str())][..]),
            );
            tracing::info!(product_id = %product.id, line_quantity, "Added to cart");
            let notice = format!("{} added to your cart", product.name);
            storage
                .session()
                .insert(session_keys::CART_NOTICE, &notice)
                .await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(err) => {
            storage
                .session()
                .insert(session_keys::PRODUCT_NOTICE, cart_error_message(&err))
                .await?;
            Ok(Redirect::to(&back).into_response())
        }
    }
}

/// Save a product to the wishlist.
#[instrument(skip(state, storage, fields))]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    mut storage: LocalStorage,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let Some(product) = parse_id(&id).and_then(|id| state.catalog().get(id)) else {
        return Ok(not_found_page(Layout::from_storage(&storage)));
    };
    let (_, selection) = parse_selection(&fields);
    let variant = product.describe_variant(&selection).ok().flatten();

    let mut wishlist = storage.wishlist();
    wishlist.push(product.to_cart_item(1, variant), state.now());
    storage.set_wishlist(&wishlist)?;
    storage.save().await?;

    storage
        .session()
        .insert(session_keys::PRODUCT_NOTICE, "Saved to your wishlist")
        .await?;
    Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
}

/// Write-review form.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

/// Accept a review for a product and return to its page with a notice.
#[instrument(skip(state, storage, form))]
pub async fn submit_review(
    State(state): State<AppState>,
    storage: LocalStorage,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let Some(product) = parse_id(&id).and_then(|id| state.catalog().get(id)) else {
        return Ok(not_found_page(Layout::from_storage(&storage)));
    };
    let submission =
        ReviewSubmission::parse(&form.rating, &form.name, &form.title, &form.comment);
    let notice = match submission {
        Ok(review) => {
            reviews::submit(product.id, &review);
            "Thank you for your review!".to_string()
        }
        Err(err) => err.to_string(),
    };
    storage
        .session()
        .insert(session_keys::PRODUCT_NOTICE, &notice)
        .await?;
    Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_view_formatting() {
        let all = reviews::demo_reviews();
        let view = ReviewView::from(&all[1]);
        assert_eq!(view.date, "January 10, 2025");
        assert_eq!(view.stars, "★★★★☆");
        assert!(view.verified);
    }

    #[test]
    fn test_parse_selection() {
        let fields = vec![
            ("quantity".to_string(), "3".to_string()),
            ("variant_color".to_string(), "white".to_string()),
            ("variant_size".to_string(), "large".to_string()),
        ];
        let (quantity, selection) = parse_selection(&fields);
        assert_eq!(quantity, Some(3));
        assert_eq!(selection.get("color").map(String::as_str), Some("white"));
        assert_eq!(selection.len(), 2);

        let (quantity, _) = parse_selection(&[("quantity".to_string(), "lots".to_string())]);
        assert_eq!(quantity, None);

        let (quantity, selection) = parse_selection(&[]);
        assert_eq!(quantity, Some(1));
        assert!(selection.is_empty());
    }
}
