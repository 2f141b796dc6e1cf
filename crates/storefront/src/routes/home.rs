//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use super::products::ProductCardView;
use crate::catalog::{CATEGORIES, Category, FEATURED};
use crate::models::LocalStorage;
use crate::state::AppState;

/// A hero carousel slide.
#[derive(Debug, Clone, Copy)]
pub struct HeroSlide {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub cta: &'static str,
    pub image: &'static str,
}

pub const HERO_SLIDES: [HeroSlide; 2] = [
    HeroSlide {
        title: "Summer Collection 2024",
        subtitle: "Discover the latest trends",
        description: "Shop our curated selection of premium fashion items with up to 50% off selected styles",
        cta: "Shop Now",
        image: "https://images.unsplash.com/photo-1441986300917-64674bd600d8?w=1200&h=600&fit=crop",
    },
    HeroSlide {
        title: "Tech Essentials",
        subtitle: "Power up your lifestyle",
        description: "From smartphones to smart home devices, find everything you need for a connected life",
        cta: "Explore Tech",
        image: "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=1200&h=600&fit=crop",
    },
];

/// Newsletter form state.
#[derive(Debug, Clone, Default)]
pub struct NewsletterView {
    pub email: String,
    pub error: Option<String>,
    pub subscribed: bool,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub slides: Vec<HeroSlide>,
    pub categories: Vec<Category>,
    pub featured: Vec<ProductCardView>,
    pub newsletter: NewsletterView,
}

impl HomeTemplate {
    #[must_use]
    pub fn new(state: &AppState, layout: Layout, newsletter: NewsletterView) -> Self {
        Self {
            layout,
            slides: HERO_SLIDES.to_vec(),
            categories: CATEGORIES.to_vec(),
            featured: state
                .catalog()
                .select(&FEATURED)
                .into_iter()
                .map(ProductCardView::from)
                .collect(),
            newsletter,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub newsletter: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, storage))]
pub async fn home(
    State(state): State<AppState>,
    storage: LocalStorage,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let newsletter = NewsletterView {
        subscribed: query.newsletter.as_deref() == Some("subscribed"),
        ..NewsletterView::default()
    };
    HomeTemplate::new(&state, Layout::from_storage(&storage), newsletter)
}
