// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Single writer : seules la boucle UI applique les mises à jour
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Chaque tranche d'état (prix, soldes, invoices, session) est mise à jour
//   indépendamment : un fetch en échec ne touche aucune autre tranche
// ============================================================================

use chrono::Utc;
use tracing::info;

use crate::api::PaymentReceipt;
use crate::models::{Invoice, PriceSeries};
use crate::poller::PollerUpdate;
use crate::session::Session;

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Représente les différents écrans de l'application
// - Pattern "State Machine" : un seul écran actif à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : soldes, prix, transactions, graphique
    Dashboard,

    /// Modal d'envoi : coller une invoice BOLT11 à payer
    SendModal,

    /// Modal de réception : saisir un montant pour créer une invoice
    ReceiveModal,
}

// ============================================================================
// Structure : PaymentModal
// ============================================================================

/// État du modal de paiement (send ou receive)
///
/// Tout est vidé à la fermeture du modal, comme le clearForms() de l'UI web
#[derive(Debug, Clone, Default)]
pub struct PaymentModal {
    /// Buffer de saisie : invoice à payer (send) ou montant en sats (receive)
    pub input: String,

    /// Invoice créée par le backend, affichée telle quelle
    pub created_invoice: Option<String>,

    /// Reçu du paiement envoyé (payment_hash + checking_id)
    pub receipt: Option<PaymentReceipt>,

    /// Message d'erreur inline ; le modal reste ouvert
    pub error: Option<String>,
}

impl PaymentModal {
    /// Vide tout l'état du modal
    pub fn clear(&mut self) {
        self.input.clear();
        self.created_invoice = None;
        self.receipt = None;
        self.error = None;
    }

    /// Montant saisi dans le modal receive, si valide
    pub fn amount(&self) -> Option<i64> {
        self.input.parse().ok().filter(|v| *v > 0)
    }
}

/// État principal de l'application
///
/// CONCEPT RUST : Struct possédant toutes ses tranches d'état
/// - Pas de globals : App est passée par référence au rendering et
///   aux handlers de complétion de fetch
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Dernier prix spot BTC-USD connu (None avant le premier fetch réussi)
    pub price: Option<f64>,

    /// Série de prix accumulée pour le graphique
    pub chart: PriceSeries,

    /// Solde onchain en sats (dernière valeur connue)
    pub balance: Option<i64>,

    /// Solde des canaux Lightning en sats (dernière valeur connue)
    pub channel_balance: Option<i64>,

    /// Liste des invoices, remplacée intégralement à chaque fetch réussi
    pub transactions: Vec<Invoice>,

    /// Session (anonyme ou authentifiée)
    pub session: Session,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// État du modal de paiement
    pub modal: PaymentModal,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    pub confirm_quit: bool,
}

impl App {
    /// Crée l'état initial de l'application
    pub fn new(session: Session) -> Self {
        Self {
            running: true,
            price: None,
            chart: PriceSeries::new(),
            balance: None,
            channel_balance: None,
            transactions: Vec::new(),
            session,
            current_screen: Screen::Dashboard,
            modal: PaymentModal::default(),
            confirm_quit: false,
        }
    }

    // ========================================================================
    // Application des mises à jour du poller
    // ========================================================================

    /// Applique une mise à jour remontée par le poller
    ///
    /// Chaque variante ne touche que sa propre tranche d'état
    pub fn apply_update(&mut self, update: PollerUpdate) {
        match update {
            PollerUpdate::Price(value) => {
                self.record_price(Utc::now().timestamp_millis(), value);
            }
            PollerUpdate::WalletBalance(sats) => {
                self.balance = Some(sats);
            }
            PollerUpdate::ChannelBalance(sats) => {
                self.channel_balance = Some(sats);
            }
            PollerUpdate::Transactions(invoices) => {
                // Remplacement intégral, pas de merge
                self.transactions = invoices;
            }
            PollerUpdate::User(user) => {
                self.session.resolve(user);
            }
        }
    }

    /// Enregistre une observation de prix à l'instant donné
    ///
    /// Le prix affiché est toujours mis à jour ; la série du graphique
    /// applique sa propre règle de déduplication (voir PriceSeries::append)
    pub fn record_price(&mut self, timestamp_ms: i64, value: f64) {
        self.price = Some(value);
        self.chart = self.chart.append(timestamp_ms, value);
    }

    // ========================================================================
    // Résultats du flux de paiement
    // ========================================================================

    /// Enregistre le reçu d'un paiement envoyé
    ///
    /// N'écrase pas une invoice créée : les deux sections sont indépendantes
    pub fn payment_sent(&mut self, receipt: PaymentReceipt) {
        info!(payment_hash = %receipt.payment_hash, "Payment receipt stored");
        self.modal.receipt = Some(receipt);
        self.modal.error = None;
    }

    /// Enregistre l'invoice créée, à afficher telle quelle
    ///
    /// Ne remplit JAMAIS les champs de paiement envoyé
    pub fn invoice_created(&mut self, payment_request: String) {
        self.modal.created_invoice = Some(payment_request);
        self.modal.error = None;
    }

    /// Affiche l'échec d'un paiement ou d'une création d'invoice
    ///
    /// Le message est montré dans le modal, qui reste ouvert
    pub fn payment_failed(&mut self, message: String) {
        self.modal.error = Some(message);
    }

    // ========================================================================
    // Navigation et modals
    // ========================================================================

    /// Ouvre le modal d'envoi (refusé si la session est anonyme)
    pub fn open_send_modal(&mut self) {
        if !self.session.is_logged_in() {
            return;
        }
        self.modal.clear();
        self.current_screen = Screen::SendModal;
    }

    /// Ouvre le modal de réception (refusé si la session est anonyme)
    pub fn open_receive_modal(&mut self) {
        if !self.session.is_logged_in() {
            return;
        }
        self.modal.clear();
        self.current_screen = Screen::ReceiveModal;
    }

    /// Ferme le modal et vide tout son état
    pub fn close_modal(&mut self) {
        self.modal.clear();
        self.current_screen = Screen::Dashboard;
    }

    /// Vérifie si on est sur le dashboard
    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    /// Vérifie si un modal est ouvert
    pub fn is_in_modal(&self) -> bool {
        matches!(self.current_screen, Screen::SendModal | Screen::ReceiveModal)
    }

    /// Ajoute un caractère au buffer de saisie du modal
    pub fn append_char(&mut self, c: char) {
        self.modal.input.push(c);
    }

    /// Supprime le dernier caractère du buffer de saisie
    pub fn backspace(&mut self) {
        self.modal.input.pop();
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression : quit réel
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn logged_in_app() -> App {
        let mut session = Session::from_credential(Some("token".to_string()));
        let user: User = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        session.resolve(user);
        App::new(session)
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(Session::from_credential(None));

        assert!(app.is_running());
        assert!(app.price.is_none());
        assert!(app.chart.is_empty());
        assert!(app.transactions.is_empty());
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_updates_touch_only_their_slice() {
        let mut app = App::new(Session::from_credential(None));

        app.apply_update(PollerUpdate::WalletBalance(1000));
        assert_eq!(app.balance, Some(1000));
        assert!(app.channel_balance.is_none());
        assert!(app.price.is_none());

        // Le solde de canal arrive indépendamment : le reste ne bouge pas
        app.apply_update(PollerUpdate::ChannelBalance(500));
        assert_eq!(app.balance, Some(1000));
        assert_eq!(app.channel_balance, Some(500));
        assert!(app.transactions.is_empty());
    }

    #[test]
    fn test_record_price_feeds_chart() {
        let mut app = App::new(Session::from_credential(None));

        app.record_price(1000, 50000.0);
        app.record_price(2000, 50001.0);

        assert_eq!(app.price, Some(50001.0));
        assert_eq!(app.chart.len(), 2);
    }

    #[test]
    fn test_record_price_updates_display_even_when_chart_rejects() {
        let mut app = App::new(Session::from_credential(None));

        app.record_price(1000, 50000.0);
        // Même valeur : la série rejette le point, mais le prix affiché
        // est quand même rafraîchi
        app.record_price(2000, 50000.0);

        assert_eq!(app.price, Some(50000.0));
        assert_eq!(app.chart.len(), 1);
    }

    #[test]
    fn test_transactions_replaced_wholesale() {
        let mut app = App::new(Session::from_credential(None));

        let first: Vec<Invoice> = serde_json::from_str(
            r#"[{"id": 1, "payment_request": "lnbc1", "value": 10, "memo": null, "send": false, "settled": true}]"#,
        )
        .unwrap();
        let second: Vec<Invoice> = serde_json::from_str(
            r#"[{"id": 2, "payment_request": "lnbc2", "value": 20, "memo": null, "send": true, "settled": false},
                {"id": 3, "payment_request": "lnbc3", "value": 30, "memo": null, "send": false, "settled": false}]"#,
        )
        .unwrap();

        app.apply_update(PollerUpdate::Transactions(first));
        assert_eq!(app.transactions.len(), 1);

        app.apply_update(PollerUpdate::Transactions(second));
        assert_eq!(app.transactions.len(), 2);
        assert_eq!(app.transactions[0].id, 2);
    }

    #[test]
    fn test_modals_require_login() {
        let mut app = App::new(Session::from_credential(None));

        app.open_send_modal();
        assert!(app.is_on_dashboard());

        app.open_receive_modal();
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_modal_lifecycle() {
        let mut app = logged_in_app();

        app.open_send_modal();
        assert_eq!(app.current_screen, Screen::SendModal);

        app.append_char('l');
        app.append_char('n');
        app.append_char('x');
        app.backspace();
        assert_eq!(app.modal.input, "ln");

        app.payment_failed("no route".to_string());
        assert_eq!(app.modal.error.as_deref(), Some("no route"));
        // Une erreur ne ferme pas le modal
        assert!(app.is_in_modal());

        app.close_modal();
        assert!(app.is_on_dashboard());
        assert!(app.modal.input.is_empty());
        assert!(app.modal.error.is_none());
    }

    #[test]
    fn test_invoice_created_does_not_touch_receipt() {
        let mut app = logged_in_app();
        app.open_receive_modal();

        app.invoice_created("lnbc500n1".to_string());

        assert_eq!(app.modal.created_invoice.as_deref(), Some("lnbc500n1"));
        // Les champs de paiement envoyé restent vides
        assert!(app.modal.receipt.is_none());
    }

    #[test]
    fn test_receive_amount_parsing() {
        let mut modal = PaymentModal::default();

        modal.input = "500".to_string();
        assert_eq!(modal.amount(), Some(500));

        modal.input = "0".to_string();
        assert_eq!(modal.amount(), None);

        modal.input = "abc".to_string();
        assert_eq!(modal.amount(), None);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new(Session::from_credential(None));

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }
}
