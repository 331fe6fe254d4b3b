//! Shipping details collection.
//!
//! Validation is local and synchronous: nothing here talks to a server, and a
//! failed submission reports every offending field at once so the form can
//! mark them all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hearth_core::{DeliveryMethod, Email, Price};

use crate::models::{CurrentUser, ShippingAddress};

/// Raw shipping form as submitted by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub delivery_method: DeliveryMethod,
}

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShippingField {
    Email,
    FirstName,
    LastName,
    Phone,
    Address,
    City,
    State,
}

/// A single field-level rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: ShippingField,
    pub message: String,
}

/// Shipping form rejected; carries every failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("please check your shipping details ({} field(s) need attention)", .errors.len())]
pub struct ShippingValidationError {
    errors: Vec<FieldError>,
}

impl ShippingValidationError {
    /// Field-level errors, in form order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether the given field was rejected.
    #[must_use]
    pub fn has(&self, field: ShippingField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Validated recipient details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl Recipient {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Submitted shipping choice. Only [`ShippingCollector::submit`] builds one,
/// and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSelection {
    recipient: Recipient,
    delivery_method: DeliveryMethod,
    shipping_price: Price,
}

impl ShippingSelection {
    #[must_use]
    pub const fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    #[must_use]
    pub const fn delivery_method(&self) -> DeliveryMethod {
        self.delivery_method
    }

    #[must_use]
    pub const fn shipping_price(&self) -> Price {
        self.shipping_price
    }

    /// Address block recorded on the order.
    #[must_use]
    pub fn to_shipping_address(&self) -> ShippingAddress {
        let r = &self.recipient;
        ShippingAddress {
            full_name: r.full_name(),
            email: r.email.to_string(),
            phone: r.phone.clone(),
            address: r.address.clone(),
            city: r.city.clone(),
            state: r.state.clone(),
            country: r.country.clone(),
            postal_code: r.postal_code.clone(),
            delivery_method: self.delivery_method,
        }
    }
}

/// Collects the shipping form for one checkout attempt.
#[derive(Debug, Clone, Default)]
pub struct ShippingCollector {
    draft: ShippingForm,
}

impl ShippingCollector {
    /// Start a collector, prefilling contact details from the signed-in user.
    #[must_use]
    pub fn new(user: Option<&CurrentUser>) -> Self {
        let mut draft = ShippingForm::default();
        if let Some(user) = user {
            draft.email = user.email.to_string();
            if let Some((first, last)) = user
                .display_name
                .as_deref()
                .and_then(|name| name.trim().split_once(' '))
            {
                draft.first_name = first.to_string();
                draft.last_name = last.trim().to_string();
            }
        }
        Self { draft }
    }

    /// Current draft.
    #[must_use]
    pub const fn draft(&self) -> &ShippingForm {
        &self.draft
    }

    /// Replace the draft with what the shopper typed.
    pub fn update(&mut self, form: ShippingForm) {
        self.draft = form;
    }

    /// Change the delivery method on the draft.
    pub const fn select_delivery_method(&mut self, method: DeliveryMethod) {
        self.draft.delivery_method = method;
    }

    /// Shipping price for the draft's delivery method.
    #[must_use]
    pub fn shipping_price(&self) -> Price {
        self.draft.delivery_method.shipping_price()
    }

    /// Validate the draft and produce a selection.
    ///
    /// # Errors
    ///
    /// Returns a [`ShippingValidationError`] listing every missing or invalid
    /// required field. Country and postal code are optional.
    pub fn submit(&self) -> Result<ShippingSelection, ShippingValidationError> {
        let form = &self.draft;
        let mut errors = Vec::new();

        let email = match Email::parse(&form.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push(FieldError {
                    field: ShippingField::Email,
                    message: e.to_string(),
                });
                None
            }
        };

        let first_name = required(&form.first_name, ShippingField::FirstName, &mut errors);
        let last_name = required(&form.last_name, ShippingField::LastName, &mut errors);
        let phone = required(&form.phone, ShippingField::Phone, &mut errors);
        let address = required(&form.address, ShippingField::Address, &mut errors);
        let city = required(&form.city, ShippingField::City, &mut errors);
        let state = required(&form.state, ShippingField::State, &mut errors);

        let Some(email) = email else {
            return Err(ShippingValidationError { errors });
        };
        if !errors.is_empty() {
            return Err(ShippingValidationError { errors });
        }

        Ok(ShippingSelection {
            recipient: Recipient {
                email,
                first_name,
                last_name,
                phone,
                address,
                city,
                state,
                country: optional(form.country.as_deref()),
                postal_code: optional(form.postal_code.as_deref()),
            },
            delivery_method: form.delivery_method,
            shipping_price: form.delivery_method.shipping_price(),
        })
    }
}

fn required(value: &str, field: ShippingField, errors: &mut Vec<FieldError>) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError {
            field,
            message: "this field is required".to_string(),
        });
    }
    value.to_string()
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
