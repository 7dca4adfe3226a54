//! HTTP client for the backend under test
//!
//! One method per endpoint. Every call sends JSON, attaches the acting
//! role's bearer token, and fails with [`Error::UnexpectedStatus`] unless the
//! backend answers with exactly the status that endpoint promises.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    AuditEntry, EvaluationNotes, Listing, NewOrder, NewReturn, Order, OrderStatus, Product,
    Profile, RejectionReason, ReturnRecord, ReturnTransition, StatusUpdate, TokenPair,
    TokenRequest, Wallet, WalletBalance, WalletStatistics, WalletTransaction, Warranty,
};
use crate::common::{truncate_chars, Error, Result};
use crate::session::AccessToken;

/// Error bodies longer than this are cut when they are not JSON
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the e-commerce REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    preview_chars: usize,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("returns-smoke/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            preview_chars: 300,
        })
    }

    /// How much of each response body is traced at debug level
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // === Auth ===

    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenPair> {
        let body = TokenRequest { username, password };
        self.call(Method::POST, "token/", None, &[], Some(&body), StatusCode::OK)
            .await
    }

    pub async fn profile(&self, token: &AccessToken) -> Result<Profile> {
        self.get("users/profile/", token).await
    }

    // === Catalogue and orders ===

    pub async fn list_products(&self, token: &AccessToken) -> Result<Vec<Product>> {
        self.get_list("products/", token).await
    }

    pub async fn list_orders(&self, token: &AccessToken) -> Result<Vec<Order>> {
        self.get_list("orders/", token).await
    }

    pub async fn create_order(&self, token: &AccessToken, order: &NewOrder) -> Result<Order> {
        self.call(
            Method::POST,
            "orders/",
            Some(token),
            &[],
            Some(order),
            StatusCode::CREATED,
        )
        .await
    }

    pub async fn update_order_status(
        &self,
        token: &AccessToken,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order> {
        let path = format!("orders/{}/", order_id);
        self.patch_status(&path, token, status).await
    }

    /// Status update through the admin-only order route
    pub async fn admin_update_order_status(
        &self,
        token: &AccessToken,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Order> {
        let path = format!("orders/admin/{}/", order_id);
        self.patch_status(&path, token, status).await
    }

    // === Returns ===

    pub async fn create_return(
        &self,
        token: &AccessToken,
        request: &NewReturn,
    ) -> Result<ReturnRecord> {
        self.call(
            Method::POST,
            "deliveries/returns/",
            Some(token),
            &[],
            Some(request),
            StatusCode::CREATED,
        )
        .await
    }

    pub async fn get_return(&self, token: &AccessToken, return_id: i64) -> Result<ReturnRecord> {
        self.get(&format!("deliveries/returns/{}/", return_id), token)
            .await
    }

    pub async fn send_to_evaluation(
        &self,
        token: &AccessToken,
        return_id: i64,
    ) -> Result<ReturnTransition> {
        let path = format!("deliveries/returns/{}/send_to_evaluation/", return_id);
        let empty = serde_json::json!({});
        self.post_ok(&path, token, &empty).await
    }

    pub async fn approve_return(
        &self,
        token: &AccessToken,
        return_id: i64,
        evaluation_notes: &str,
    ) -> Result<ReturnTransition> {
        let path = format!("deliveries/returns/{}/approve/", return_id);
        self.post_ok(&path, token, &EvaluationNotes { evaluation_notes })
            .await
    }

    pub async fn reject_return(
        &self,
        token: &AccessToken,
        return_id: i64,
        rejection_reason: &str,
    ) -> Result<ReturnTransition> {
        let path = format!("deliveries/returns/{}/reject/", return_id);
        self.post_ok(&path, token, &RejectionReason { rejection_reason })
            .await
    }

    /// Returns requested by the token's owner
    pub async fn my_returns(&self, token: &AccessToken) -> Result<Vec<ReturnRecord>> {
        self.get_list("deliveries/returns/my_returns/", token).await
    }

    /// Every return in the system (manager view)
    pub async fn all_returns(&self, token: &AccessToken) -> Result<Vec<ReturnRecord>> {
        self.get_list("deliveries/returns/", token).await
    }

    // === Warranties ===

    pub async fn list_warranties(&self, token: &AccessToken) -> Result<Vec<Warranty>> {
        self.get_list("deliveries/warranties/", token).await
    }

    pub async fn get_warranty(&self, token: &AccessToken, warranty_id: i64) -> Result<Warranty> {
        self.get(&format!("deliveries/warranties/{}/", warranty_id), token)
            .await
    }

    // === Wallet ===

    pub async fn my_wallet(&self, token: &AccessToken) -> Result<Wallet> {
        self.get("users/wallets/my_wallet/", token).await
    }

    pub async fn my_balance(&self, token: &AccessToken) -> Result<WalletBalance> {
        self.get("users/wallets/my_balance/", token).await
    }

    pub async fn my_transactions(&self, token: &AccessToken) -> Result<Vec<WalletTransaction>> {
        self.get_list("users/wallet-transactions/my_transactions/", token)
            .await
    }

    pub async fn wallet_statistics(&self, token: &AccessToken) -> Result<WalletStatistics> {
        self.get("users/wallet-transactions/statistics/", token)
            .await
    }

    // === Audit ===

    pub async fn audit_log(&self, token: &AccessToken, page_size: u32) -> Result<Vec<AuditEntry>> {
        let query = [("page_size", page_size.to_string())];
        let listing: Listing<AuditEntry> = self
            .call(
                Method::GET,
                "audit_log/",
                Some(token),
                &query,
                None::<&()>,
                StatusCode::OK,
            )
            .await?;
        Ok(listing.into_items())
    }

    // === Plumbing ===

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &AccessToken) -> Result<T> {
        self.call(Method::GET, path, Some(token), &[], None::<&()>, StatusCode::OK)
            .await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, token: &AccessToken) -> Result<Vec<T>> {
        let listing: Listing<T> = self.get(path, token).await?;
        Ok(listing.into_items())
    }

    async fn post_ok<B, T>(&self, path: &str, token: &AccessToken, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, path, Some(token), &[], Some(body), StatusCode::OK)
            .await
    }

    async fn patch_status(
        &self,
        path: &str,
        token: &AccessToken,
        status: OrderStatus,
    ) -> Result<Order> {
        let body = StatusUpdate { status };
        self.call(Method::PATCH, path, Some(token), &[], Some(&body), StatusCode::OK)
            .await
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
        query: &[(&str, String)],
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| Error::InvalidBaseUrl {
                url: format!("{}{}", self.base, path),
                reason: e.to_string(),
            })?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token.bearer());
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, %url, "sending request");

        let response = request.send().await.map_err(|source| Error::Transport {
            endpoint: path.to_string(),
            source,
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|source| Error::Transport {
            endpoint: path.to_string(),
            source,
        })?;

        tracing::debug!(
            %method,
            endpoint = path,
            status = status.as_u16(),
            body = %truncate_chars(&text, self.preview_chars),
            "response received"
        );

        if status != expected {
            return Err(Error::unexpected_status(
                method.as_str(),
                path,
                status.as_u16(),
                error_body(&text),
            ));
        }

        serde_json::from_str(&text).map_err(|e| Error::decode(path, e))
    }
}

/// Parse the base URL, making sure relative endpoint paths join under it
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&with_slash).map_err(|e| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}

/// Error body for diagnostics: pretty JSON when it parses, else cut text
fn error_body(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| truncate_chars(text, ERROR_BODY_LIMIT)),
        Err(_) => truncate_chars(text.trim(), ERROR_BODY_LIMIT),
    }
}
