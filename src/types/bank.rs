#![allow(missing_docs)]
//! Investor-scoped bank account types.

use serde::Deserialize;

use crate::types::enums::AccountType;

/// A bank account registered against an investor.
///
/// Returned by `GET /investors/{id}/bank-accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub account_number: String,
    #[serde(alias = "ifsc")]
    pub ifsc_code: String,
    pub account_type: Option<AccountType>,
}
