//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use ecommerce_hub_core::OrderStatus;
use ecommerce_hub_core::checkout::OrderConfirmation;
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use super::products::cart_error_message;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{LocalStorage, session, session_keys};
use crate::services::account::{self, AccountAddress, Profile};
use crate::services::orders::{OrderRecord, OrderSort, filter_orders};

/// Orders shown on the overview tab.
const RECENT_ORDERS: usize = 3;

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Orders,
    Addresses,
    Wishlist,
    Profile,
}

impl Tab {
    pub const ALL: [Self; 5] = [
        Self::Overview,
        Self::Orders,
        Self::Addresses,
        Self::Wishlist,
        Self::Profile,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Orders => "orders",
            Self::Addresses => "addresses",
            Self::Wishlist => "wishlist",
            Self::Profile => "profile",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Dashboard",
            Self::Orders => "Orders",
            Self::Addresses => "Addresses",
            Self::Wishlist => "Wishlist",
            Self::Profile => "Profile",
        }
    }

    /// Parse a `?tab=` value; unknown values fall back to the overview.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|value| Self::ALL.into_iter().find(|tab| tab.as_str() == value))
            .unwrap_or_default()
    }
}

/// Sidebar link.
#[derive(Debug, Clone)]
pub struct TabView {
    pub id: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// A select option.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub image: String,
}

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub number: String,
    pub status: &'static str,
    pub status_id: &'static str,
    pub placed_on: String,
    pub total: String,
    pub item_count: usize,
    pub tracking_number: Option<String>,
    pub can_cancel: bool,
    pub can_return: bool,
    pub items: Vec<OrderLineView>,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            number: order.order_number.clone(),
            status: order.status.label(),
            status_id: order.status.as_str(),
            placed_on: order.placed_at.format("%b %-d, %Y").to_string(),
            total: order.total.to_string(),
            item_count: order.items.len(),
            tracking_number: order.tracking_number.clone(),
            can_cancel: order.can_cancel(),
            can_return: order.can_return(),
            items: order
                .items
                .iter()
                .map(|line| OrderLineView {
                    name: line.name.clone(),
                    variant: line.variant.clone(),
                    quantity: line.quantity,
                    price: line.price.to_string(),
                    image: line.image.clone(),
                })
                .collect(),
        }
    }
}

/// Address display data for templates.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub kind: &'static str,
    pub name: String,
    pub company: Option<String>,
    pub lines: Vec<String>,
    pub phone: String,
    pub is_default: bool,
}

impl From<&AccountAddress> for AddressView {
    fn from(address: &AccountAddress) -> Self {
        let mut lines = vec![address.address1.clone()];
        lines.extend(address.address2.clone());
        lines.push(format!(
            "{}, {} {}",
            address.city, address.state, address.zip_code
        ));
        lines.push(address.country.clone());
        Self {
            kind: address.kind.label(),
            name: format!("{} {}", address.first_name, address.last_name),
            company: address.company.clone(),
            lines,
            phone: address.phone.clone(),
            is_default: address.is_default,
        }
    }
}

/// Wishlist entry display data.
#[derive(Debug, Clone)]
pub struct WishlistView {
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub variant: Option<String>,
    pub price: String,
    pub image: String,
    pub in_stock: bool,
    pub added_on: String,
}

/// Account dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub layout: Layout,
    pub tab: &'static str,
    pub tabs: Vec<TabView>,
    pub profile: Profile,
    pub total_spent: String,
    pub member_since: String,
    pub recent_orders: Vec<OrderView>,
    pub orders: Vec<OrderView>,
    pub status_options: Vec<OptionView>,
    pub sort_options: Vec<OptionView>,
    pub status_filter: Option<&'static str>,
    pub addresses: Vec<AddressView>,
    pub wishlist: Vec<WishlistView>,
    pub error: Option<String>,
}

/// Query parameters of the dashboard.
#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub tab: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub error: Option<String>,
}

/// Form naming a wishlist entry.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub line_id: String,
}

/// Orders placed this session, newest first, followed by the demo history.
async fn all_orders(storage: &LocalStorage) -> Result<Vec<OrderRecord>> {
    let placed =
        session::read::<Vec<OrderConfirmation>>(storage.session(), session_keys::SESSION_ORDERS)
            .await?
            .unwrap_or_default();
    let mut orders: Vec<OrderRecord> = placed.iter().rev().map(OrderRecord::from).collect();
    orders.extend(account::order_history());
    Ok(orders)
}

fn status_options(selected: Option<OrderStatus>) -> Vec<OptionView> {
    std::iter::once(OptionView {
        value: "all",
        label: "All Orders",
        selected: selected.is_none(),
    })
    .chain(OrderStatus::ALL.into_iter().map(|status| OptionView {
        value: status.as_str(),
        label: status.label(),
        selected: selected == Some(status),
    }))
    .collect()
}

fn sort_options(selected: OrderSort) -> Vec<OptionView> {
    OrderSort::ALL
        .into_iter()
        .map(|sort| OptionView {
            value: sort.as_str(),
            label: sort.label(),
            selected: sort == selected,
        })
        .collect()
}

/// Display the account dashboard.
#[instrument(skip(current_user, storage))]
pub async fn index(
    RequireAuth(current_user): RequireAuth,
    storage: LocalStorage,
    Query(query): Query<AccountQuery>,
) -> Result<Response> {
    let tab = Tab::parse(query.tab.as_deref());
    let status = query
        .status
        .as_deref()
        .and_then(|status| status.parse::<OrderStatus>().ok());
    let sort = query
        .sort
        .as_deref()
        .and_then(|sort| sort.parse::<OrderSort>().ok())
        .unwrap_or_default();

    let wishlist = storage.wishlist();
    let profile = account::profile(&current_user.email, wishlist.len());
    let orders = all_orders(&storage).await?;

    Ok(AccountIndexTemplate {
        layout: Layout::from_storage(&storage),
        tab: tab.as_str(),
        tabs: Tab::ALL
            .into_iter()
            .map(|candidate| TabView {
                id: candidate.as_str(),
                label: candidate.label(),
                active: candidate == tab,
            })
            .collect(),
        total_spent: profile.total_spent.to_string(),
        member_since: profile.member_since_display(),
        profile,
        recent_orders: filter_orders(&orders, None, OrderSort::Newest)
            .iter()
            .take(RECENT_ORDERS)
            .map(OrderView::from)
            .collect(),
        orders: filter_orders(&orders, status, sort)
            .iter()
            .map(OrderView::from)
            .collect(),
        status_options: status_options(status),
        sort_options: sort_options(sort),
        status_filter: status.map(|status| status.as_str()),
        addresses: account::addresses().iter().map(AddressView::from).collect(),
        wishlist: wishlist
            .items()
            .iter()
            .map(|saved| WishlistView {
                line_id: saved.item.line_id.clone(),
                product_id: saved.item.product_id.to_string(),
                name: saved.item.name.clone(),
                variant: saved.item.variant.clone(),
                price: saved.item.unit_price.to_string(),
                image: saved.item.image.clone(),
                in_stock: saved.item.stock > 0,
                added_on: saved.added_at.format("%b %-d, %Y").to_string(),
            })
            .collect(),
        error: query.error,
    }
    .into_response())
}

fn to_wishlist() -> Redirect {
    Redirect::to("/account?tab=wishlist")
}

/// Remove a wishlist entry.
#[instrument(skip_all, fields(line_id = %form.line_id))]
pub async fn remove_from_wishlist(
    RequireAuth(_user): RequireAuth,
    mut storage: LocalStorage,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let mut wishlist = storage.wishlist();
    if wishlist.take(&form.line_id).is_some() {
        storage.set_wishlist(&wishlist)?;
        storage.save().await?;
    }
    Ok(to_wishlist().into_response())
}

/// Move a wishlist entry into the cart. If the cart refuses it the entry
/// stays in the wishlist.
#[instrument(skip_all, fields(line_id = %form.line_id))]
pub async fn move_to_cart(
    RequireAuth(_user): RequireAuth,
    mut storage: LocalStorage,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let mut wishlist = storage.wishlist();
    let Some(saved) = wishlist.take(&form.line_id) else {
        return Ok(to_wishlist().into_response());
    };

    let mut cart = storage.cart();
    if let Err(err) = cart.add(saved.item.clone()) {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("tab", Tab::Wishlist.as_str())
            .append_pair("error", &cart_error_message(&err))
            .finish();
        return Ok(Redirect::to(&format!("/account?{query}")).into_response());
    }

    storage.set_cart(&cart)?;
    storage.set_wishlist(&wishlist)?;
    storage.save().await?;
    tracing::info!(line_id = %form.line_id, "Moved wishlist item to cart");
    Ok(to_wishlist().into_response())
}
