//! Checkout route handlers.
//!
//! Handlers are thin: the checkout service owns every transition, and each
//! response carries the full checkout view rendered from the shopper's state
//! after the call.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use hearth_core::{DeliveryMethod, OrderId, Price};

use super::cart::TAX_LABEL;
use crate::cart::{CartLedger, CartLineItem};
use crate::checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutState, CheckoutStep, CompletionNotice,
    OrderSnapshot, PaymentPhase, PaymentStage, ShippingForm, WidgetLaunch,
};
use crate::config::CheckoutConfig;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, ShopperSession};
use crate::models::{CustomOrder, ShopperId};
use crate::services::NotificationResult;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Payment sub-state while awaiting payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Ready,
    Processing,
    Succeeded,
}

/// A selectable delivery method with its price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOption {
    pub method: DeliveryMethod,
    pub label: &'static str,
    pub price: String,
    pub selected: bool,
}

/// One line of the order summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
}

/// Order totals as shown beside every checkout step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub items: Vec<SummaryLine>,
    pub items_price: String,
    pub shipping_price: String,
    pub tax: &'static str,
    pub total: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl OrderSummary {
    fn new(items: Vec<SummaryLine>, items_price: Price, shipping_price: Price) -> Self {
        let total = items_price + shipping_price;
        Self {
            items,
            items_price: items_price.display(),
            shipping_price: shipping_price.display(),
            tax: TAX_LABEL,
            total: total.display(),
            total_amount: total.amount,
        }
    }

    fn custom_line(order: &CustomOrder) -> SummaryLine {
        SummaryLine {
            name: order.description.clone(),
            quantity: 1,
            line_price: order.price.display(),
        }
    }

    fn cart_lines(lines: &[CartLineItem]) -> Vec<SummaryLine> {
        lines
            .iter()
            .map(|line| SummaryLine {
                name: line.name.clone(),
                quantity: line.quantity,
                line_price: line.line_total().display(),
            })
            .collect()
    }

    /// Totals before shipping is submitted: live cart plus the draft's method.
    fn draft(checkout: &CheckoutOrchestrator, cart: &CartLedger, shipping: Price) -> Self {
        match checkout.custom_order() {
            Some(order) => Self::new(vec![Self::custom_line(order)], order.price, shipping),
            None => Self::new(Self::cart_lines(cart.lines()), cart.total(), shipping),
        }
    }

    /// Totals frozen at shipping submission.
    fn staged(stage: &PaymentStage) -> Self {
        let items = match stage.snapshot() {
            OrderSnapshot::Cart { lines, .. } => Self::cart_lines(lines),
            OrderSnapshot::Custom { order } => vec![Self::custom_line(order)],
        };
        Self::new(items, stage.items_price(), stage.shipping_price())
    }
}

/// Checkout display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub payment_status: Option<PaymentStatus>,
    pub notice: Option<String>,
    pub shipping: Option<ShippingForm>,
    pub delivery_options: Vec<DeliveryOption>,
    pub summary: Option<OrderSummary>,
    pub tx_ref: Option<String>,
    pub order_id: Option<OrderId>,
    pub redirect_after_ms: Option<u64>,
    pub is_custom_order: bool,
}

impl CheckoutView {
    /// Render the checkout against the shopper's live cart.
    #[must_use]
    pub fn render(
        checkout: &CheckoutOrchestrator,
        cart: &CartLedger,
        config: &CheckoutConfig,
    ) -> Self {
        let mut view = Self {
            step: checkout.step(),
            payment_status: None,
            notice: None,
            shipping: None,
            delivery_options: Vec::new(),
            summary: None,
            tx_ref: None,
            order_id: None,
            redirect_after_ms: None,
            is_custom_order: checkout.custom_order().is_some(),
        };

        match checkout.state() {
            CheckoutState::CollectingShipping { collector, notice } => {
                let draft = collector.draft();
                view.notice.clone_from(notice);
                view.delivery_options = delivery_options(draft.delivery_method);
                view.summary = Some(OrderSummary::draft(
                    checkout,
                    cart,
                    collector.shipping_price(),
                ));
                view.shipping = Some(draft.clone());
            }
            CheckoutState::AwaitingPayment { stage, phase } => {
                view.summary = Some(OrderSummary::staged(stage));
                match phase {
                    PaymentPhase::Ready { notice, .. } => {
                        view.payment_status = Some(PaymentStatus::Ready);
                        view.notice.clone_from(notice);
                    }
                    PaymentPhase::Processing { attempt } => {
                        view.payment_status = Some(PaymentStatus::Processing);
                        view.tx_ref = Some(attempt.tx_ref().to_string());
                    }
                    PaymentPhase::Succeeded { payment } => {
                        view.payment_status = Some(PaymentStatus::Succeeded);
                        view.tx_ref = Some(payment.receipt.tx_ref.clone());
                    }
                }
            }
            CheckoutState::CreatingOrder { stage, payment } => {
                view.summary = Some(OrderSummary::staged(stage));
                view.tx_ref = Some(payment.receipt.tx_ref.clone());
            }
            CheckoutState::OrderFailed {
                stage,
                payment,
                error,
            } => {
                view.summary = Some(OrderSummary::staged(stage));
                view.tx_ref = Some(payment.receipt.tx_ref.clone());
                view.notice = Some(error.clone());
            }
            CheckoutState::Confirmed { order } => {
                let details = &order.details;
                let items = details
                    .items
                    .iter()
                    .map(|item| SummaryLine {
                        name: item.name.clone(),
                        quantity: item.quantity,
                        line_price: Price::ngn(item.price)
                            .times(item.quantity)
                            .display(),
                    })
                    .collect();
                view.summary = Some(OrderSummary::new(
                    items,
                    Price::ngn(details.items_price),
                    Price::ngn(details.shipping_price),
                ));
                view.tx_ref = Some(details.payment_result.tx_ref.clone());
                view.order_id = Some(order.id.clone());
                view.redirect_after_ms =
                    u64::try_from(config.confirmation_redirect.as_millis()).ok();
            }
        }

        view
    }
}

fn delivery_options(selected: DeliveryMethod) -> Vec<DeliveryOption> {
    DeliveryMethod::ALL
        .into_iter()
        .map(|method| DeliveryOption {
            method,
            label: method.label(),
            price: method.shipping_price().display(),
            selected: method == selected,
        })
        .collect()
}

async fn current_view(state: &AppState, shopper_id: &ShopperId) -> Result<CheckoutView> {
    let shared = state.sessions().get_or_create(shopper_id).await;
    let shopper = shared.lock().await;
    let checkout = shopper.checkout.as_ref().ok_or(CheckoutError::NotStarted)?;
    Ok(CheckoutView::render(
        checkout,
        &shopper.cart,
        &state.config().checkout,
    ))
}

// =============================================================================
// Requests
// =============================================================================

/// Begin checkout request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeginCheckoutRequest {
    /// Pay for this custom order instead of the cart.
    pub custom_order: Option<CustomOrder>,
}

/// Initiate payment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    /// Whether the gateway script finished loading in the browser.
    pub widget_loaded: bool,
}

/// Widget dismissal relayed by the browser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissalRequest {
    pub tx_ref: String,
}

/// Result of a gateway notification, with the checkout it left behind.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    #[serde(flatten)]
    pub result: NotificationResult,
    pub checkout: CheckoutView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Start a checkout for the cart or a custom order.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn begin(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<BeginCheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutView>)> {
    let is_custom = request.custom_order.is_some();
    state
        .checkout()
        .begin(&shopper_id, user, request.custom_order)
        .await?;

    add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("custom_order", if is_custom { "true" } else { "false" })]),
    );

    let view = current_view(&state, &shopper_id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Show the current checkout.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn show(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
) -> Result<Json<CheckoutView>> {
    Ok(Json(current_view(&state, &shopper_id).await?))
}

/// Save the shipping draft.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn update_shipping(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Json(form): Json<ShippingForm>,
) -> Result<Json<CheckoutView>> {
    state.checkout().update_shipping(&shopper_id, form).await?;
    Ok(Json(current_view(&state, &shopper_id).await?))
}

/// Validate shipping and move to payment.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn submit_shipping(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    OptionalAuth(user): OptionalAuth,
    Json(form): Json<ShippingForm>,
) -> Result<Json<CheckoutView>> {
    let total = state
        .checkout()
        .submit_shipping(&shopper_id, user, form)
        .await?;

    info!(total = %total.amount, "Shipping submitted");
    add_breadcrumb("checkout", "Shipping submitted", None);

    Ok(Json(current_view(&state, &shopper_id).await?))
}

/// Go back to the shipping step.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn back(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
) -> Result<Json<CheckoutView>> {
    state.checkout().step_back(&shopper_id).await?;
    Ok(Json(current_view(&state, &shopper_id).await?))
}

/// Open a payment attempt; the browser launches the widget with the result.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn initiate_payment(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<WidgetLaunch>> {
    let launch = state
        .checkout()
        .initiate_payment(&shopper_id, user, request.widget_loaded)
        .await?;

    add_breadcrumb(
        "payment",
        "Payment widget launched",
        Some(&[("tx_ref", launch.tx_ref.as_str())]),
    );

    Ok(Json(launch))
}

/// Retry payment after the order could not be saved.
#[instrument(skip_all, fields(shopper_id = %shopper_id))]
pub async fn restart_payment(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
) -> Result<Json<CheckoutView>> {
    state.checkout().restart_payment(&shopper_id).await?;
    Ok(Json(current_view(&state, &shopper_id).await?))
}

/// Gateway completion callback, relayed by the browser.
#[instrument(skip_all, fields(shopper_id = %shopper_id, tx_ref = %notice.tx_ref))]
pub async fn payment_completion(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Json(notice): Json<CompletionNotice>,
) -> Result<Json<NotificationResponse>> {
    add_breadcrumb(
        "payment",
        "Completion received",
        Some(&[("status", notice.status.as_str())]),
    );

    let result = state
        .checkout()
        .handle_completion(&shopper_id, notice)
        .await?;
    let checkout = current_view(&state, &shopper_id).await?;

    Ok(Json(NotificationResponse { result, checkout }))
}

/// Gateway dismissal callback, relayed by the browser.
#[instrument(skip_all, fields(shopper_id = %shopper_id, tx_ref = %request.tx_ref))]
pub async fn payment_dismissal(
    State(state): State<AppState>,
    ShopperSession(shopper_id): ShopperSession,
    Json(request): Json<DismissalRequest>,
) -> Result<Json<NotificationResponse>> {
    let result = state
        .checkout()
        .handle_dismissal(&shopper_id, &request.tx_ref)
        .await?;
    let checkout = current_view(&state, &shopper_id).await?;

    Ok(Json(NotificationResponse { result, checkout }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use hearth_core::{ProductId, ProductType};

    fn cart() -> CartLedger {
        let mut cart = CartLedger::new();
        cart.add(
            CartItem {
                id: ProductId::new("A"),
                name: "Cedar candle".to_string(),
                unit_price: Price::ngn(Decimal::from(2000)),
                product_type: ProductType::Candle,
            },
            1,
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_shipping_view_prices_draft_method() {
        let mut checkout = CheckoutOrchestrator::new(None, None);
        checkout
            .update_shipping(ShippingForm {
                delivery_method: DeliveryMethod::LocalDelivery,
                ..ShippingForm::default()
            })
            .unwrap();

        let view = CheckoutView::render(&checkout, &cart(), &CheckoutConfig::default());
        let summary = view.summary.unwrap();

        assert_eq!(view.step, CheckoutStep::CollectingShipping);
        assert_eq!(summary.shipping_price, "₦3,500.00");
        assert_eq!(summary.total, "₦5,500.00");
        assert_eq!(summary.tax, "Included");
        assert!(view.delivery_options.iter().any(|o| o.selected
            && o.method == DeliveryMethod::LocalDelivery));
        assert!(view.redirect_after_ms.is_none());
    }

    #[test]
    fn test_view_wire_shape() {
        let checkout = CheckoutOrchestrator::new(None, None);
        let view = CheckoutView::render(&checkout, &cart(), &CheckoutConfig::default());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["step"], "COLLECTING_SHIPPING");
        assert_eq!(json["isCustomOrder"], false);
        assert_eq!(json["deliveryOptions"].as_array().unwrap().len(), 3);
        assert_eq!(json["summary"]["totalAmount"], serde_json::json!(2000.0));
    }
}
