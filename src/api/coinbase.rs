// ============================================================================
// API Client : Coinbase (prix spot BTC-USD)
// ============================================================================
// Récupère le prix spot depuis l'API publique Coinbase
//
// Le montant est renvoyé comme une STRING décimale ("64123.456789") :
// on le parse en f64 puis on l'arrondit à 2 décimales avant tout usage,
// y compris la déduplication de la série de prix
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// URL de l'API spot Coinbase
const SPOT_URL: &str = "https://api.coinbase.com/v2/prices/BTC-USD/spot";

// ============================================================================
// Structures pour parser la réponse JSON de Coinbase
// ============================================================================

/// Réponse complète : { "data": { "amount": "...", ... } }
#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: SpotData,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    /// Montant décimal sous forme de string
    amount: String,
}

/// Récupère le prix spot BTC-USD en USD, arrondi à 2 décimales
///
/// CONCEPT RUST : async/await
/// - reqwest::get() retourne une Future
/// - .await suspend l'exécution jusqu'à la réponse
/// - ? propage l'erreur (réseau, statut HTTP, parsing)
pub async fn fetch_spot_price() -> Result<f64> {
    debug!(url = SPOT_URL, "Fetching BTC-USD spot price");

    let response = reqwest::get(SPOT_URL)
        .await
        .context("Échec de la requête vers Coinbase")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Coinbase a retourné une erreur : HTTP {}", status);
    }

    let spot: SpotResponse = response
        .json()
        .await
        .context("Échec du parsing JSON de la réponse Coinbase")?;

    let price = parse_spot_amount(&spot.data.amount)?;
    debug!(price = price, "Spot price fetched");
    Ok(price)
}

/// Parse le montant décimal de Coinbase et l'arrondit à 2 décimales
///
/// L'arrondi se fait AVANT usage : le prix affiché et le prix comparé par
/// la série sont la même valeur
fn parse_spot_amount(amount: &str) -> Result<f64> {
    let value: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("Montant Coinbase invalide : {:?}", amount))?;

    Ok((value * 100.0).round() / 100.0)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spot_amount_rounds_to_cents() {
        assert_eq!(parse_spot_amount("64123.456789").unwrap(), 64123.46);
        assert_eq!(parse_spot_amount("64123.454").unwrap(), 64123.45);
        assert_eq!(parse_spot_amount("50000").unwrap(), 50000.0);
    }

    #[test]
    fn test_parse_spot_amount_rejects_garbage() {
        assert!(parse_spot_amount("not-a-number").is_err());
        assert!(parse_spot_amount("").is_err());
    }

    #[test]
    fn test_deserialize_spot_response() {
        let json = r#"{"data": {"base": "BTC", "currency": "USD", "amount": "50000.00"}}"#;
        let spot: SpotResponse = serde_json::from_str(json).unwrap();
        assert_eq!(spot.data.amount, "50000.00");
    }
}
