use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use moneta_core::category::id_text;
use moneta_core::{Category, CategoryKind, DateRange, LedgerEntry, Money, Wallet};

use crate::error::LedgerError;
use crate::token::TokenCache;

const API_URL: &str = "https://web.moneylover.me/api";
const LOGIN_URL: &str = "https://web.moneylover.me/api/user/login-url";
const TOKEN_URL: &str = "https://oauth.moneylover.me/token";

/// Token acquisition is quick; bulk reads and writes are not.
const AUTH_TIMEOUT: Duration = Duration::from_secs(5);
const API_TIMEOUT: Duration = Duration::from_secs(120);

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload for recording a new entry in a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub wallet_id: String,
    pub category_id: String,
    pub amount: Money,
    pub note: String,
    pub date: NaiveDate,
}

/// Blocking client for the wallet service. Every endpoint is a POST with
/// an `AuthJWT` bearer token; calls do not retry, a failure aborts the
/// operation in progress.
pub struct LedgerClient {
    http: Client,
    base_url: String,
    token: String,
}

impl LedgerClient {
    /// Reuses a cached token when fresh, otherwise asks for credentials
    /// (via `credentials`, called at most once) and logs in.
    pub fn connect<F>(cache: &TokenCache, credentials: F) -> Result<Self, LedgerError>
    where
        F: FnOnce() -> Result<Credentials, LedgerError>,
    {
        let token = match cache.load() {
            Some(token) => {
                debug!("using cached access token");
                token
            }
            None => {
                let token = login(&credentials()?)?;
                cache.store(&token)?;
                token
            }
        };
        Ok(Self::with_token(token))
    }

    pub fn with_token(token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: API_URL.to_string(),
            token,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Wallet summaries: id, name, first balance entry as currency+amount.
    pub fn wallets(&self) -> Result<Vec<Wallet>, LedgerError> {
        let data = self.post("/wallet/list", Payload::None)?;
        let raw: Vec<RawWallet> = serde_json::from_value(data)?;
        raw.into_iter().map(RawWallet::into_wallet).collect()
    }

    /// Categories available in one wallet. Rows with a type code the
    /// service has not documented are dropped with a warning.
    pub fn wallet_categories(&self, wallet_id: &str) -> Result<Vec<Category>, LedgerError> {
        let data = self.post(
            "/category/list",
            Payload::Form(&[("walletId", wallet_id)]),
        )?;
        let raw: Vec<RawCategory> = serde_json::from_value(data)?;
        Ok(raw
            .into_iter()
            .filter_map(|category| category.into_category(wallet_id))
            .collect())
    }

    /// Entries recorded in the wallet between two dates, inclusive.
    pub fn transactions(
        &self,
        wallet_id: &str,
        range: DateRange,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let body = json!({
            "startDate": range.start.format(WIRE_DATE_FORMAT).to_string(),
            "endDate": range.end.format(WIRE_DATE_FORMAT).to_string(),
            "walletId": wallet_id,
        });
        let data = self.post("/transaction/list", Payload::Json(&body))?;
        let listing: RawTransactionList = serde_json::from_value(data)?;
        listing
            .transactions
            .into_iter()
            .map(RawTransaction::into_entry)
            .collect()
    }

    /// Records an entry and returns the service's confirmation record.
    pub fn add_transaction(&self, entry: &NewEntry) -> Result<Value, LedgerError> {
        let body = json!({
            "with": [],
            "account": entry.wallet_id,
            "category": entry.category_id,
            "amount": entry.amount.to_f64(),
            "note": entry.note,
            "displayDate": entry.date.format(WIRE_DATE_FORMAT).to_string(),
        });
        self.post("/transaction/add", Payload::Json(&body))
    }

    fn post(&self, path: &str, payload: Payload<'_>) -> Result<Value, LedgerError> {
        let mut request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("authorization", format!("AuthJWT {}", self.token))
            .timeout(API_TIMEOUT);
        request = match payload {
            Payload::None => request,
            Payload::Json(body) => request.json(body),
            Payload::Form(fields) => request.form(fields),
        };
        let response = request.send()?.error_for_status()?;
        unwrap_envelope(response.json()?)
    }
}

enum Payload<'a> {
    None,
    Json(&'a Value),
    Form(&'a [(&'a str, &'a str)]),
}

/// Two-step login: the login-url endpoint hands out a request token and a
/// URL whose `client=` parameter identifies this app, then the OAuth token
/// endpoint trades those plus the credentials for an access token.
pub fn login(credentials: &Credentials) -> Result<String, LedgerError> {
    let http = Client::new();

    let response: Value = http
        .post(LOGIN_URL)
        .timeout(AUTH_TIMEOUT)
        .send()?
        .error_for_status()?
        .json()?;
    let request_token = response["data"]["request_token"]
        .as_str()
        .ok_or_else(|| LedgerError::Login("no request token in response".into()))?;
    let login_url = response["data"]["login_url"]
        .as_str()
        .ok_or_else(|| LedgerError::Login("no login url in response".into()))?;
    let client_id = client_id_from_login_url(login_url)
        .ok_or_else(|| LedgerError::Login("login url carries no client id".into()))?;
    debug!("request token and client id received");

    let token_response: Value = http
        .post(TOKEN_URL)
        .timeout(AUTH_TIMEOUT)
        .header("Authorization", format!("Bearer {request_token}"))
        .header("client", client_id)
        .form(&[
            ("email", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()?
        .error_for_status()?
        .json()?;

    let token = token_response["access_token"]
        .as_str()
        .ok_or_else(|| LedgerError::Login("no access token in response".into()))?;
    info!("logged in, access token received");
    Ok(token.to_string())
}

fn client_id_from_login_url(url: &str) -> Option<&str> {
    url.split("client=").nth(1)?.split('&').next()
}

/// The service wraps every response in `{error/e, msg, data}`; a non-zero
/// code inside a 2xx body is still a failure.
fn unwrap_envelope(payload: Value) -> Result<Value, LedgerError> {
    if let Some(code) = payload.get("error") {
        if code.as_i64() != Some(0) {
            return Err(api_error(code, &payload));
        }
    }
    if let Some(code) = payload.get("e") {
        return Err(api_error(code, &payload));
    }
    match payload.get("data") {
        Some(data) => Ok(data.clone()),
        None => Err(LedgerError::Shape("response carries no data field".into())),
    }
}

fn api_error(code: &Value, payload: &Value) -> LedgerError {
    LedgerError::Api {
        code: code.as_i64().unwrap_or(-1),
        message: payload
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

// ── response records ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawWallet {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    /// One map per currency; the first entry carries the display balance.
    #[serde(default)]
    balance: Vec<HashMap<String, Value>>,
}

impl RawWallet {
    fn into_wallet(self) -> Result<Wallet, LedgerError> {
        let (currency, amount) = self
            .balance
            .first()
            .and_then(|entry| entry.iter().next())
            .ok_or_else(|| LedgerError::Shape(format!("wallet {:?} has no balance", self.name)))?;
        let balance = parse_money(amount)
            .ok_or_else(|| LedgerError::Shape(format!("wallet {:?} balance", self.name)))?;
        Ok(Wallet {
            id: self.id,
            name: self.name,
            balance,
            currency: currency.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(rename = "_id", deserialize_with = "id_text::deserialize")]
    id: String,
    name: String,
    #[serde(default, deserialize_with = "id_text::deserialize_opt")]
    parent: Option<String>,
    #[serde(rename = "type")]
    kind_code: i64,
}

impl RawCategory {
    fn into_category(self, wallet_id: &str) -> Option<Category> {
        let Some(kind) = CategoryKind::from_code(self.kind_code) else {
            warn!(name = %self.name, code = self.kind_code, "dropping category with unknown type code");
            return None;
        };
        Some(Category {
            id: self.id,
            name: self.name,
            parent: self.parent,
            wallet_id: wallet_id.to_string(),
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTransactionList {
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    amount: f64,
    #[serde(rename = "displayDate")]
    display_date: String,
    #[serde(default)]
    category: Option<RawTransactionCategory>,
}

#[derive(Debug, Deserialize)]
struct RawTransactionCategory {
    name: String,
}

impl RawTransaction {
    fn into_entry(self) -> Result<LedgerEntry, LedgerError> {
        let date = parse_display_date(&self.display_date).ok_or_else(|| {
            LedgerError::Shape(format!("transaction date {:?}", self.display_date))
        })?;
        let amount = Decimal::try_from(self.amount)
            .map(Money::from_decimal)
            .map_err(|_| LedgerError::Shape(format!("transaction amount {}", self.amount)))?;
        Ok(LedgerEntry {
            note: self.note,
            amount,
            date,
            category: self.category.map(|category| category.name),
        })
    }
}

/// Display dates arrive as ISO timestamps; only the day matters here.
fn parse_display_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.get(..10)?, WIRE_DATE_FORMAT).ok()
}

fn parse_money(value: &Value) -> Option<Money> {
    if let Some(text) = value.as_str() {
        return Decimal::from_str(text).ok().map(Money::from_decimal);
    }
    value
        .as_f64()
        .and_then(|f| Decimal::try_from(f).ok())
        .map(Money::from_decimal)
}
