// ============================================================================
// API Client : Backend pleb-wallet
// ============================================================================
// Récupère les soldes, l'historique des invoices et l'identité utilisateur,
// et soumet les paiements au backend custodial
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::models::{Invoice, User};

// ============================================================================
// Structures pour parser les réponses JSON du backend
// ============================================================================
// Le backend renvoie des enveloppes différentes par endpoint, on définit une
// structure par réponse pour que serde désérialise automatiquement
// ============================================================================

/// Réponse de GET /lightning/balance
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    total_balance: i64,
}

/// Réponse de GET /lightning/channelbalance
#[derive(Debug, Deserialize)]
struct ChannelBalanceResponse {
    balance: i64,
}

/// Réponse de POST /lightning/pay
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReceipt {
    /// Hash du paiement effectué
    pub payment_hash: String,

    /// Identifiant de suivi côté backend
    pub checking_id: String,
}

/// Réponse de POST /lightning/invoice
#[derive(Debug, Deserialize)]
struct InvoiceCreatedResponse {
    payment_request: String,
}

/// Corps de POST /lightning/pay
#[derive(Debug, Serialize)]
struct PayRequest<'a> {
    payment_request: &'a str,
    user_id: i64,
}

/// Corps de POST /lightning/invoice
#[derive(Debug, Serialize)]
struct CreateInvoiceRequest<'a> {
    value: i64,
    memo: &'a str,
    user_id: i64,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère l'identité de l'utilisateur authentifié (GET /users/user)
///
/// Appelée au plus une fois par exécution, uniquement si un token est présent.
/// L'échec n'est pas fatal : la session reste anonyme.
///
/// CONCEPT RUST : #[instrument]
/// - Macro tracing qui ajoute automatiquement un span
/// - skip(token) : le token ne doit jamais apparaître dans les logs
#[instrument(skip(config, token))]
pub async fn fetch_user(config: &Config, token: &str) -> Result<User> {
    let url = config.endpoint("/users/user");
    debug!(url = %url, "Fetching user identity");

    let response = authed_client(token)?
        .get(&url)
        .send()
        .await
        .context("Échec de la requête GET /users/user")?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, "Backend refused user lookup");
        anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
    }

    let user: User = response
        .json()
        .await
        .context("Échec du parsing JSON de /users/user")?;

    info!(user_id = user.id, "User identity fetched");
    Ok(user)
}

/// Récupère le solde onchain du wallet en sats (GET /lightning/balance)
pub async fn fetch_wallet_balance(config: &Config) -> Result<i64> {
    let url = config.endpoint("/lightning/balance");
    debug!(url = %url, "Fetching wallet balance");

    let response = reqwest::get(&url)
        .await
        .context("Échec de la requête GET /lightning/balance")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
    }

    let balance: BalanceResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de /lightning/balance")?;

    Ok(balance.total_balance)
}

/// Récupère le solde des canaux Lightning en sats (GET /lightning/channelbalance)
pub async fn fetch_channel_balance(config: &Config) -> Result<i64> {
    let url = config.endpoint("/lightning/channelbalance");
    debug!(url = %url, "Fetching channel balance");

    let response = reqwest::get(&url)
        .await
        .context("Échec de la requête GET /lightning/channelbalance")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
    }

    let balance: ChannelBalanceResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de /lightning/channelbalance")?;

    Ok(balance.balance)
}

/// Récupère la liste complète des invoices (GET /lightning/invoices)
///
/// La liste renvoyée remplace intégralement la précédente côté appelant :
/// pas de merge incrémental
pub async fn fetch_transactions(config: &Config) -> Result<Vec<Invoice>> {
    let url = config.endpoint("/lightning/invoices");
    debug!(url = %url, "Fetching transactions");

    let response = reqwest::get(&url)
        .await
        .context("Échec de la requête GET /lightning/invoices")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Le backend a retourné une erreur : HTTP {}", status);
    }

    let invoices: Vec<Invoice> = response
        .json()
        .await
        .context("Échec du parsing JSON de /lightning/invoices")?;

    debug!(count = invoices.len(), "Transactions fetched");
    Ok(invoices)
}

/// Paye une invoice BOLT11 (POST /lightning/pay)
///
/// Requiert un token et l'identité résolue : le backend attache le paiement
/// au user_id fourni
#[instrument(skip(config, token, payment_request), fields(user_id = user_id))]
pub async fn pay_invoice(
    config: &Config,
    token: &str,
    payment_request: &str,
    user_id: i64,
) -> Result<PaymentReceipt> {
    let url = config.endpoint("/lightning/pay");
    let body = PayRequest {
        payment_request,
        user_id,
    };

    debug!(url = %url, "Paying invoice");

    let response = authed_client(token)?
        .post(&url)
        .json(&body)
        .send()
        .await
        .context("Échec de la requête POST /lightning/pay")?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, "Backend refused payment");
        anyhow::bail!("Le backend a refusé le paiement : HTTP {}", status);
    }

    let receipt: PaymentReceipt = response
        .json()
        .await
        .context("Échec du parsing JSON de /lightning/pay")?;

    info!(payment_hash = %receipt.payment_hash, "Invoice paid");
    Ok(receipt)
}

/// Crée une invoice à recevoir (POST /lightning/invoice)
///
/// Retourne la payment request BOLT11 à afficher telle quelle
#[instrument(skip(config, token), fields(value = value, user_id = user_id))]
pub async fn create_invoice(
    config: &Config,
    token: &str,
    value: i64,
    memo: &str,
    user_id: i64,
) -> Result<String> {
    let url = config.endpoint("/lightning/invoice");
    let body = CreateInvoiceRequest {
        value,
        memo,
        user_id,
    };

    debug!(url = %url, "Creating invoice");

    let response = authed_client(token)?
        .post(&url)
        .json(&body)
        .send()
        .await
        .context("Échec de la requête POST /lightning/invoice")?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, "Backend refused invoice creation");
        anyhow::bail!("Le backend a refusé la création d'invoice : HTTP {}", status);
    }

    let created: InvoiceCreatedResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de /lightning/invoice")?;

    info!("Invoice created");
    Ok(created.payment_request)
}

/// Construit un client HTTP avec le header Authorization
///
/// Le backend attend le token brut dans Authorization (pas de préfixe Bearer),
/// comme le fait le frontend web d'origine
fn authed_client(token: &str) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

    let mut headers = HeaderMap::new();
    let mut value =
        HeaderValue::from_str(token).context("Token invalide pour un header HTTP")?;
    // Le token ne doit pas fuiter dans les logs des intermédiaires
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .context("Échec de la création du client HTTP")
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_balance_response() {
        let json = r#"{"total_balance": 123456}"#;
        let parsed: BalanceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_balance, 123456);
    }

    #[test]
    fn test_deserialize_channel_balance_response() {
        let json = r#"{"balance": 98765}"#;
        let parsed: ChannelBalanceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.balance, 98765);
    }

    #[test]
    fn test_deserialize_payment_receipt() {
        let json = r#"{"payment_hash": "abc123", "checking_id": "chk456"}"#;
        let receipt: PaymentReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.payment_hash, "abc123");
        assert_eq!(receipt.checking_id, "chk456");
    }

    #[test]
    fn test_serialize_pay_request() {
        let body = PayRequest {
            payment_request: "lnbc1",
            user_id: 7,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["payment_request"], "lnbc1");
        assert_eq!(json["user_id"], 7);
    }

    #[test]
    fn test_serialize_create_invoice_request() {
        let body = CreateInvoiceRequest {
            value: 500,
            memo: "pleb-wallet-be",
            user_id: 7,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["value"], 500);
        assert_eq!(json["memo"], "pleb-wallet-be");
        assert_eq!(json["user_id"], 7);
    }

    #[test]
    fn test_authed_client_rejects_invalid_token() {
        // Un token avec un retour à la ligne n'est pas un header valide
        assert!(authed_client("bad\ntoken").is_err());
        assert!(authed_client("goodtoken").is_ok());
    }
}
