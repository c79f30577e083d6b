//! Pure field mapping from local entities to remote payloads
//!
//! Deterministic functions with no I/O. Monetary values cross from
//! integer minor units to decimal major units here and nowhere else.

use dealsync_domain::constants::DEFAULT_COUNTRY_ID;
use dealsync_domain::{Customer, CustomerType, Invoice};

use crate::remote::{
    ContactPayload, InvoicePayload, InvoicePositionPayload, CONTACT_TYPE_COMPANY,
    CONTACT_TYPE_PERSON, POSITION_TYPE_CUSTOM,
};

/// Remote country ids, keyed by ISO 3166 alpha-2 code
const COUNTRY_IDS: &[(&str, i64)] = &[("CH", 1), ("DE", 2), ("AT", 3), ("FR", 4), ("IT", 5)];

/// Remote salutation ids
const SALUTATION_IDS: &[(&str, i64)] = &[("Herr", 1), ("Frau", 2), ("Firma", 3)];

/// Standard VAT tax id on the remote platform
const STANDARD_TAX_ID: i64 = 16;

fn country_id(code: &str) -> i64 {
    COUNTRY_IDS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(DEFAULT_COUNTRY_ID, |(_, id)| *id)
}

fn salutation_id(salutation: &str) -> Option<i64> {
    SALUTATION_IDS.iter().find(|(s, _)| *s == salutation).map(|(_, id)| *id)
}

/// Convert integer minor units to a decimal major-unit string with two
/// fraction digits (e.g. 1050 -> "10.50").
#[must_use]
pub fn minor_to_major(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

/// Map a local customer to a remote contact payload.
///
/// Companies become company-type contacts named after the firm; private
/// individuals become person-type contacts with the last name in the
/// primary name field.
#[must_use]
pub fn contact_payload(customer: &Customer) -> ContactPayload {
    let is_company = customer.customer_type == CustomerType::Company;

    let name_1 = if is_company {
        customer.company_name.clone().unwrap_or_else(|| customer.last_name.clone())
    } else {
        customer.last_name.clone()
    };

    ContactPayload {
        contact_type_id: if is_company { CONTACT_TYPE_COMPANY } else { CONTACT_TYPE_PERSON },
        name_1,
        name_2: if is_company { None } else { Some(customer.first_name.clone()) },
        salutation_id: customer.salutation.as_deref().and_then(salutation_id),
        address: customer.street.clone(),
        postcode: customer.postal_code.clone(),
        city: customer.city.clone(),
        country_id: country_id(&customer.country),
        mail: customer.email.clone(),
        phone_fixed: customer.phone.clone(),
        phone_mobile: customer.mobile.clone(),
    }
}

/// Map a local invoice to a remote invoice payload.
///
/// `remote_contact_id` must already exist on the remote side; the engine
/// syncs the customer first when needed.
#[must_use]
pub fn invoice_payload(invoice: &Invoice, remote_contact_id: i64) -> InvoicePayload {
    InvoicePayload {
        title: Some(format!("Rechnung {}", invoice.invoice_number)),
        contact_id: remote_contact_id,
        is_valid_from: invoice.invoice_date.format("%Y-%m-%d").to_string(),
        is_valid_to: invoice.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
        // VAT exclusive, net amounts
        mwst_type: 0,
        mwst_is_net: true,
        api_reference: Some(invoice.id.to_string()),
        positions: invoice
            .items
            .iter()
            .map(|item| InvoicePositionPayload {
                position_type: POSITION_TYPE_CUSTOM.to_string(),
                amount: format_quantity(item.quantity),
                unit_price: minor_to_major(item.unit_price_minor),
                text: item.title.clone(),
                tax_id: STANDARD_TAX_ID,
            })
            .collect(),
    }
}
