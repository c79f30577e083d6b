//! Wire types for the remote accounting API
//!
//! Field names follow the remote platform's JSON schema exactly; these
//! types are plain data carriers with no business interpretation.
//! Response types derive `Default` so that a 204/empty-body response can
//! be represented as an empty value rather than an error.

use serde::{Deserialize, Serialize};

/// Remote contact type: 1 = company, 2 = person
pub const CONTACT_TYPE_COMPANY: i64 = 1;
/// Remote contact type id for private individuals
pub const CONTACT_TYPE_PERSON: i64 = 2;

/// Payload for contact create/update calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPayload {
    pub contact_type_id: i64,
    /// Company name, or last name for persons
    pub name_1: String,
    /// First name for persons, absent for companies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salutation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_fixed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mobile: Option<String>,
}

/// A contact as returned by the remote API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    #[serde(default)]
    pub contact_type_id: i64,
    #[serde(default)]
    pub name_1: String,
    #[serde(default)]
    pub name_2: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Search criterion for the contact search endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ContactSearchCriterion {
    pub field: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
}

/// Position type used for free-form invoice lines
pub const POSITION_TYPE_CUSTOM: &str = "KbPositionCustom";

/// One line item within an invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePositionPayload {
    #[serde(rename = "type")]
    pub position_type: String,
    /// Quantity as a decimal string
    pub amount: String,
    /// Unit price in decimal major units, two fraction digits
    pub unit_price: String,
    pub text: String,
    pub tax_id: i64,
}

/// Payload for invoice creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub contact_id: i64,
    /// Invoice date (ISO 8601 date)
    pub is_valid_from: String,
    /// Due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid_to: Option<String>,
    /// VAT mode: 0 = exclusive
    pub mwst_type: i64,
    pub mwst_is_net: bool,
    /// Local invoice id, stored remotely for cross-referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_reference: Option<String>,
    pub positions: Vec<InvoicePositionPayload>,
}

/// An invoice as returned by the remote API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteInvoice {
    pub id: i64,
    #[serde(default)]
    pub document_nr: String,
    #[serde(default)]
    pub contact_id: i64,
    #[serde(default)]
    pub kb_item_status_id: i64,
    #[serde(default)]
    pub total: Option<String>,
}

/// Company profile of the connected remote account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
}

/// Rendered PDF of a remote invoice (base64 content)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicePdf {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub content: String,
}

/// Payload for sending an invoice by email through the remote system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendInvoicePayload {
    pub recipient_email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_as_open: Option<bool>,
}

/// Result of the invoice email endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendInvoiceResult {
    #[serde(default)]
    pub success: bool,
}
