// ============================================================================
// Poller : rafraîchissement périodique des données
// ============================================================================
// Thread d'arrière-plan qui interroge le backend et Coinbase à deux cadences :
// - cadence rapide (5 s)  : prix spot BTC-USD uniquement
// - cadence lente  (30 s) : solde onchain + solde des canaux + invoices
// Un premier round complet part immédiatement au démarrage.
//
// CONCEPTS RUST :
// 1. Thread + runtime tokio : appels async dans un thread standard
// 2. mpsc channels : les résultats remontent vers la boucle UI,
//    le signal d'arrêt descend vers le poller
// 3. recv_timeout : sert à la fois de sleep et de réveil d'annulation
//
// Politique d'échec : chaque fetch qui échoue est loggé et n'émet AUCUNE
// mise à jour (la dernière valeur connue reste affichée). Un échec n'arrête
// jamais la boucle et ne bloque pas les autres fetches du même round.
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::api::{backend, coinbase};
use crate::config::Config;
use crate::models::{Invoice, User};

/// Période de la cadence rapide (prix spot)
pub const FAST_PERIOD: Duration = Duration::from_millis(5000);

/// Période de la cadence lente (soldes + invoices)
pub const SLOW_PERIOD: Duration = Duration::from_millis(30000);

/// Granularité de la boucle : vérification d'arrêt toutes les 250 ms
const TICK: Duration = Duration::from_millis(250);

// ============================================================================
// PollerUpdate : résultats remontés vers la boucle UI
// ============================================================================
// Une variante par tranche d'état : chaque tranche est mise à jour
// indépendamment des autres, jamais en bloc
// ============================================================================

/// Mise à jour d'une tranche d'état, émise après un fetch réussi
#[derive(Debug)]
pub enum PollerUpdate {
    /// Prix spot BTC-USD (USD, arrondi à 2 décimales)
    Price(f64),

    /// Solde onchain du wallet (sats)
    WalletBalance(i64),

    /// Solde des canaux Lightning (sats)
    ChannelBalance(i64),

    /// Liste complète des invoices (remplace la précédente)
    Transactions(Vec<Invoice>),

    /// Identité résolue (au plus une fois par exécution)
    User(User),
}

// ============================================================================
// PollSchedule : décision pure de cadence
// ============================================================================

/// Ce qui est dû pour un round de polling donné
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuePolls {
    /// Cadence rapide due (prix spot)
    pub fast: bool,

    /// Cadence lente due (soldes + invoices)
    pub slow: bool,
}

impl DuePolls {
    /// Vrai si aucune cadence n'est due
    pub fn is_idle(&self) -> bool {
        !self.fast && !self.slow
    }
}

/// Décide, à chaque tick, quelles cadences doivent fetcher
///
/// CONCEPT RUST : logique pure et testable
/// - Aucune I/O : due() ne dépend que de l'instant fourni
/// - Le premier appel rend les deux cadences dues (fetch initial au montage)
#[derive(Debug)]
pub struct PollSchedule {
    fast_period: Duration,
    slow_period: Duration,

    /// Instant du dernier fetch rapide (None = jamais fetché)
    last_fast: Option<Instant>,

    /// Instant du dernier fetch lent (None = jamais fetché)
    last_slow: Option<Instant>,
}

impl PollSchedule {
    /// Crée un planning avec les périodes données
    pub fn new(fast_period: Duration, slow_period: Duration) -> Self {
        Self {
            fast_period,
            slow_period,
            last_fast: None,
            last_slow: None,
        }
    }

    /// Retourne les cadences dues à l'instant `now` et les marque comme servies
    ///
    /// Les deux cadences sont indépendantes : elles peuvent être dues
    /// ensemble (premier round, ou toutes les 30 s)
    pub fn due(&mut self, now: Instant) -> DuePolls {
        let fast = match self.last_fast {
            None => true,
            Some(last) => now.duration_since(last) >= self.fast_period,
        };

        let slow = match self.last_slow {
            None => true,
            Some(last) => now.duration_since(last) >= self.slow_period,
        };

        if fast {
            self.last_fast = Some(now);
        }
        if slow {
            self.last_slow = Some(now);
        }

        DuePolls { fast, slow }
    }
}

// ============================================================================
// PollerHandle : annulation déterministe
// ============================================================================

/// Handle du thread de polling
///
/// CONCEPT RUST : Drop pour l'annulation inconditionnelle
/// - stop() arrête le poller et attend la fin du thread
/// - Si stop() n'a pas été appelé, Drop le fait : le thread ne survit
///   jamais au handle, même en cas de teardown précoce
/// - L'arrêt n'a lieu qu'UNE seule fois (le JoinHandle est consommé)
pub struct PollerHandle {
    shutdown_tx: mpsc::Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Arrête le poller et attend la fin du thread
    ///
    /// Après le retour de stop(), plus aucun fetch n'est émis et plus
    /// aucune mise à jour n'est envoyée
    pub fn stop(&mut self) {
        // Le send échoue si le thread est déjà terminé : sans importance
        let _ = self.shutdown_tx.send(());

        // take() garantit un join unique, même si Drop repasse ici
        if let Some(thread) = self.thread.take() {
            debug!("Waiting for poller thread to stop");
            let _ = thread.join();
            info!("Poller thread stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Lancement du poller
// ============================================================================

/// Lance le thread de polling
///
/// # Arguments
/// * `config` - Configuration (URL du backend)
/// * `credential` - Token éventuel ; si présent, l'identité est résolue
///   une seule fois au démarrage (Session Gate)
/// * `update_tx` - Sender vers la boucle UI
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - block_on() bloque le thread poller, jamais l'UI
pub fn spawn_poller(
    config: Config,
    credential: Option<String>,
    update_tx: mpsc::Sender<PollerUpdate>,
) -> PollerHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let thread = std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, poller disabled");
                return;
            }
        };

        info!("Poller thread started");

        // Résolution d'identité : une seule fois par exécution, et
        // uniquement si un token est présent. L'échec est silencieux :
        // la session reste anonyme.
        if let Some(token) = &credential {
            match runtime.block_on(backend::fetch_user(&config, token)) {
                Ok(user) => {
                    let _ = update_tx.send(PollerUpdate::User(user));
                }
                Err(e) => {
                    error!(error = ?e, "Identity resolution failed, staying anonymous");
                }
            }
        }

        let mut schedule = PollSchedule::new(FAST_PERIOD, SLOW_PERIOD);

        loop {
            // L'arrêt est vérifié AVANT chaque round : après un stop(),
            // aucun fetch supplémentaire ne part
            match shutdown_rx.try_recv() {
                Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
                Err(mpsc::TryRecvError::Empty) => {}
            }

            let due = schedule.due(Instant::now());
            if !due.is_idle() {
                runtime.block_on(run_due_polls(due, &config, &update_tx));
            }

            // recv_timeout sert de sleep interruptible : un signal d'arrêt
            // réveille la boucle immédiatement au lieu d'attendre le tick
            match shutdown_rx.recv_timeout(TICK) {
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => {}
            }
        }

        info!("Poller thread exiting");
    });

    PollerHandle {
        shutdown_tx,
        thread: Some(thread),
    }
}

/// Exécute les fetches dus pour ce round
///
/// CONCEPT RUST : tokio::join!
/// - Les fetches du round partent en parallèle
/// - join! attend TOUTES les futures : l'échec de l'une n'annule pas
///   les autres (chaque branche rend son propre Result)
async fn run_due_polls(
    due: DuePolls,
    config: &Config,
    update_tx: &mpsc::Sender<PollerUpdate>,
) {
    let price = async {
        if due.fast {
            Some(coinbase::fetch_spot_price().await)
        } else {
            None
        }
    };

    let wallet = async {
        if due.slow {
            Some(backend::fetch_wallet_balance(config).await)
        } else {
            None
        }
    };

    let channel = async {
        if due.slow {
            Some(backend::fetch_channel_balance(config).await)
        } else {
            None
        }
    };

    let transactions = async {
        if due.slow {
            Some(backend::fetch_transactions(config).await)
        } else {
            None
        }
    };

    let (price, wallet, channel, transactions) =
        tokio::join!(price, wallet, channel, transactions);

    // Chaque tranche est appliquée indépendamment. Échec = log + no-op
    // délibéré : la dernière valeur connue reste affichée, pas de retry.
    // Les send ignorent l'erreur : si la boucle UI a été démontée, la mise
    // à jour est simplement perdue au lieu d'écrire dans un état libéré.
    if let Some(result) = price {
        match result {
            Ok(value) => {
                let _ = update_tx.send(PollerUpdate::Price(value));
            }
            Err(e) => error!(error = ?e, "Price fetch failed, keeping last value"),
        }
    }

    if let Some(result) = wallet {
        match result {
            Ok(sats) => {
                let _ = update_tx.send(PollerUpdate::WalletBalance(sats));
            }
            Err(e) => error!(error = ?e, "Wallet balance fetch failed, keeping last value"),
        }
    }

    if let Some(result) = channel {
        match result {
            Ok(sats) => {
                let _ = update_tx.send(PollerUpdate::ChannelBalance(sats));
            }
            Err(e) => error!(error = ?e, "Channel balance fetch failed, keeping last value"),
        }
    }

    if let Some(result) = transactions {
        match result {
            Ok(invoices) => {
                let _ = update_tx.send(PollerUpdate::Transactions(invoices));
            }
            Err(e) => error!(error = ?e, "Transactions fetch failed, keeping last value"),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> PollSchedule {
        PollSchedule::new(FAST_PERIOD, SLOW_PERIOD)
    }

    #[test]
    fn test_first_round_is_full_fetch() {
        let mut schedule = schedule();
        let due = schedule.due(Instant::now());

        // Au montage : les quatre fetches partent (prix + soldes + invoices)
        assert!(due.fast);
        assert!(due.slow);
    }

    #[test]
    fn test_nothing_due_within_fast_period() {
        let mut schedule = schedule();
        let start = Instant::now();

        let _ = schedule.due(start);
        let due = schedule.due(start + Duration::from_millis(4999));

        assert!(due.is_idle());
    }

    #[test]
    fn test_fast_due_after_five_seconds() {
        let mut schedule = schedule();
        let start = Instant::now();

        let _ = schedule.due(start);
        let due = schedule.due(start + Duration::from_millis(5000));

        assert!(due.fast);
        assert!(!due.slow);
    }

    #[test]
    fn test_slow_due_after_thirty_seconds() {
        let mut schedule = schedule();
        let start = Instant::now();

        let _ = schedule.due(start);
        let due = schedule.due(start + Duration::from_millis(30000));

        // À 30 s, les deux cadences tombent ensemble
        assert!(due.fast);
        assert!(due.slow);
    }

    #[test]
    fn test_due_resets_the_clock() {
        let mut schedule = schedule();
        let start = Instant::now();

        let _ = schedule.due(start);
        let _ = schedule.due(start + Duration::from_millis(5000));

        // Le fetch de t+5s a resservi la cadence rapide : rien à t+6s
        let due = schedule.due(start + Duration::from_millis(6000));
        assert!(due.is_idle());

        // Mais la cadence redevient due à t+10s
        let due = schedule.due(start + Duration::from_millis(10000));
        assert!(due.fast);
    }

    #[test]
    fn test_cadences_are_independent() {
        let mut schedule = schedule();
        let start = Instant::now();

        let _ = schedule.due(start);

        // Cinq rounds rapides pendant que la cadence lente attend
        for i in 1..=5 {
            let due = schedule.due(start + Duration::from_millis(5000 * i));
            assert!(due.fast);
            assert!(!due.slow);
        }

        let due = schedule.due(start + Duration::from_millis(30000));
        assert!(due.slow);
    }
}
