// ============================================================================
// Structure : Invoice
// ============================================================================
// Représente une transaction Lightning telle que renvoyée par le backend
// (GET /lightning/invoices)
//
// CONCEPTS RUST :
// 1. Serde : désérialisation JSON automatique depuis le backend
// 2. Option<T> : champs que le backend peut omettre selon l'état de l'invoice
// 3. Display formatting : formatage pour la liste des transactions
// ============================================================================

use serde::Deserialize;

/// Une invoice Lightning du wallet (envoyée ou reçue)
///
/// La liste complète est remplacée à chaque fetch réussi : pas de merge
/// incrémental, pas de déduplication côté client. Le backend est la seule
/// source de vérité.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    /// Identifiant de l'invoice côté backend
    pub id: i64,

    /// La payment request BOLT11 (ex: "lnbc500n1...")
    pub payment_request: String,

    /// Montant en sats
    pub value: i64,

    /// Memo attaché à l'invoice
    /// CONCEPT RUST : Option pour les champs nullables du JSON
    pub memo: Option<String>,

    /// true si c'est un paiement sortant, false si c'est une réception
    pub send: bool,

    /// true si l'invoice a été réglée
    pub settled: bool,
}

impl Invoice {
    /// Formatte l'invoice pour l'affichage dans la liste des transactions
    ///
    /// Format : "▲ sent      500 sats  ✓  memo"
    ///          "▼ received 1000 sats  …  memo"
    pub fn display(&self) -> String {
        let (arrow, direction) = if self.send {
            ("▲", "sent")
        } else {
            ("▼", "received")
        };

        // ✓ réglée, … en attente
        let status = if self.settled { "✓" } else { "…" };

        let memo = self.memo.as_deref().unwrap_or("");

        format!(
            "{} {:<8} {:>10} sats  {}  {}",
            arrow, direction, self.value, status, memo
        )
    }

    /// Retourne true si l'invoice est un paiement sortant réglé
    pub fn is_settled_send(&self) -> bool {
        self.send && self.settled
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Payload représentatif du backend pleb-wallet
    const INVOICE_JSON: &str = r#"{
        "id": 12,
        "payment_request": "lnbc5u1pleb",
        "value": 500,
        "memo": "pleb-wallet-be",
        "send": false,
        "settled": true
    }"#;

    #[test]
    fn test_deserialize_invoice() {
        let invoice: Invoice = serde_json::from_str(INVOICE_JSON).unwrap();

        assert_eq!(invoice.id, 12);
        assert_eq!(invoice.payment_request, "lnbc5u1pleb");
        assert_eq!(invoice.value, 500);
        assert_eq!(invoice.memo.as_deref(), Some("pleb-wallet-be"));
        assert!(!invoice.send);
        assert!(invoice.settled);
    }

    #[test]
    fn test_deserialize_invoice_without_memo() {
        let json = r#"{
            "id": 3,
            "payment_request": "lnbc1",
            "value": 21,
            "memo": null,
            "send": true,
            "settled": false
        }"#;

        let invoice: Invoice = serde_json::from_str(json).unwrap();
        assert!(invoice.memo.is_none());
        assert!(invoice.send);
    }

    #[test]
    fn test_deserialize_invoice_list() {
        let json = format!("[{}, {}]", INVOICE_JSON, INVOICE_JSON);
        let invoices: Vec<Invoice> = serde_json::from_str(&json).unwrap();
        assert_eq!(invoices.len(), 2);
    }

    #[test]
    fn test_display_received() {
        let invoice: Invoice = serde_json::from_str(INVOICE_JSON).unwrap();
        let line = invoice.display();

        assert!(line.contains("▼"));
        assert!(line.contains("received"));
        assert!(line.contains("500 sats"));
        assert!(line.contains("✓"));
    }

    #[test]
    fn test_is_settled_send() {
        let mut invoice: Invoice = serde_json::from_str(INVOICE_JSON).unwrap();
        assert!(!invoice.is_settled_send());

        invoice.send = true;
        assert!(invoice.is_settled_send());
    }
}
