// ============================================================================
// pleb-wallet-tui : Dashboard TUI pour un wallet Lightning custodial
// ============================================================================
// Programme TUI qui interroge le backend pleb-wallet (soldes, invoices) et
// Coinbase (prix spot BTC-USD), affiche un graphique de prix en direct et
// propose un modal pour envoyer ou recevoir des paiements
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. RAII : restauration automatique du terminal avec Drop
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use plebwallet::api::{self, PaymentReceipt};
use plebwallet::app::{App, Screen};
use plebwallet::config::Config;
use plebwallet::poller::{spawn_poller, PollerUpdate};
use plebwallet::session::Session;
use plebwallet::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand : Commandes pour le worker thread de paiement
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (POST vers le backend)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread de paiement
#[derive(Debug, Clone)]
enum AppCommand {
    /// Payer une invoice BOLT11 (POST /lightning/pay)
    /// - payment_request : l'invoice collée par l'utilisateur
    /// - user_id : identité résolue, attachée au paiement
    PayInvoice {
        payment_request: String,
        user_id: i64,
    },

    /// Créer une invoice à recevoir (POST /lightning/invoice)
    /// - value : montant en sats saisi dans le modal
    CreateInvoice {
        value: i64,
        user_id: i64,
    },
}

/// Résultats renvoyés par le worker thread de paiement
#[derive(Debug)]
enum AppResult {
    /// Paiement effectué : le reçu est affiché dans le modal
    PaymentSent {
        receipt: PaymentReceipt,
    },

    /// Invoice créée : la payment request est affichée telle quelle
    InvoiceCreated {
        payment_request: String,
    },

    /// Échec du paiement ou de la création : message inline dans le modal,
    /// le modal reste ouvert
    PaymentError {
        message: String,
    },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ./logs/pleb-wallet-tui.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=plebwallet=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Rotation quotidienne : nouveau fichier chaque jour, évite que les
    // logs deviennent trop gros
    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "pleb-wallet-tui.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: plebwallet::poller)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true), // Inclut le numéro de ligne
        )
        .with(
            // Filtre les logs par niveau
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour plebwallet, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plebwallet=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("pleb-wallet-tui starting up");

    // Charge la configuration et la session (token lu UNE seule fois)
    let config = Config::from_env();
    info!(backend_url = %config.backend_url, "Configuration loaded");

    let session = Session::load(&config.token_path);
    let credential = session.credential().map(|t| t.to_string());

    // Crée l'état de l'application
    // CONCEPT : Single writer
    // - App est possédée par la boucle UI, seule à la muter
    // - Le poller et le worker communiquent uniquement via channels
    let mut app = App::new(session);

    // Channels :
    // - update_tx/rx : mises à jour du poller vers la boucle UI
    // - command_tx/rx : commandes de paiement vers le worker
    // - result_tx/rx : résultats de paiement vers la boucle UI
    let (update_tx, update_rx) = mpsc::channel::<PollerUpdate>();
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Lance le poller : fetch initial immédiat des quatre tranches, puis
    // cadence rapide (prix, 5 s) et cadence lente (soldes + invoices, 30 s)
    info!("Spawning poller thread");
    let mut poller = spawn_poller(config.clone(), credential.clone(), update_tx.clone());

    // Lance le worker de paiement en arrière-plan
    info!("Spawning payment worker thread");
    spawn_payment_worker(command_rx, result_tx, update_tx, config, credential);

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(
        &mut terminal,
        &mut app,
        &events,
        command_tx,
        result_rx,
        update_rx,
    );

    // Arrête le poller AVANT de rendre la main : annulation déterministe,
    // exactement une fois (Drop ne refera rien après ce stop)
    poller.stop();

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread : paiements
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes async
// - Reçoit des AppCommand via un channel (command_rx)
// - Envoie des AppResult via un autre channel (result_tx)
// - Permet de faire des POST sans bloquer l'UI
// ============================================================================

/// Worker thread qui exécute les paiements en arrière-plan
///
/// # Arguments
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats vers le modal
/// * `update_tx` - Sender des mises à jour d'état (refresh après paiement)
/// * `config` - Configuration (URL du backend)
/// * `credential` - Token pour les endpoints authentifiés
fn spawn_payment_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    update_tx: mpsc::Sender<PollerUpdate>,
    config: Config,
    credential: Option<String>,
) {
    std::thread::spawn(move || {
        // Runtime tokio propre à ce thread
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, payment worker disabled");
                return;
            }
        };

        // Boucle de traitement des commandes
        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Payment worker received command");

                    // Les commandes ne partent que depuis une session
                    // authentifiée, mais le worker revérifie le token
                    let token = match &credential {
                        Some(token) => token.clone(),
                        None => {
                            let _ = result_tx.send(AppResult::PaymentError {
                                message: "Not logged in".to_string(),
                            });
                            continue;
                        }
                    };

                    match command {
                        AppCommand::PayInvoice {
                            payment_request,
                            user_id,
                        } => {
                            let result = runtime.block_on(api::pay_invoice(
                                &config,
                                &token,
                                &payment_request,
                                user_id,
                            ));

                            match result {
                                Ok(receipt) => {
                                    info!(payment_hash = %receipt.payment_hash, "Payment sent");
                                    let _ = result_tx.send(AppResult::PaymentSent { receipt });

                                    // Le paiement a changé les soldes : refresh
                                    // immédiat au lieu d'attendre la cadence
                                    // lente (équivalent du reload de la page web)
                                    runtime.block_on(refresh_after_payment(&config, &update_tx));
                                }
                                Err(e) => {
                                    error!(error = ?e, "Payment failed");
                                    let _ = result_tx.send(AppResult::PaymentError {
                                        message: e.to_string(),
                                    });
                                }
                            }
                        }

                        AppCommand::CreateInvoice { value, user_id } => {
                            // Memo fixe, comme le frontend web d'origine
                            let result = runtime.block_on(api::create_invoice(
                                &config,
                                &token,
                                value,
                                "pleb-wallet-be",
                                user_id,
                            ));

                            match result {
                                Ok(payment_request) => {
                                    info!("Invoice created");
                                    let _ = result_tx
                                        .send(AppResult::InvoiceCreated { payment_request });
                                }
                                Err(e) => {
                                    error!(error = ?e, "Invoice creation failed");
                                    let _ = result_tx.send(AppResult::PaymentError {
                                        message: e.to_string(),
                                    });
                                }
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Payment worker exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

/// Rafraîchit soldes et invoices juste après un paiement réussi
///
/// Les trois fetches partent en parallèle et échouent indépendamment ;
/// un échec est loggé et laisse la dernière valeur connue affichée
async fn refresh_after_payment(config: &Config, update_tx: &mpsc::Sender<PollerUpdate>) {
    let (wallet, channel, transactions) = tokio::join!(
        api::fetch_wallet_balance(config),
        api::fetch_channel_balance(config),
        api::fetch_transactions(config),
    );

    match wallet {
        Ok(sats) => {
            let _ = update_tx.send(PollerUpdate::WalletBalance(sats));
        }
        Err(e) => error!(error = ?e, "Post-payment balance refresh failed"),
    }

    match channel {
        Ok(sats) => {
            let _ = update_tx.send(PollerUpdate::ChannelBalance(sats));
        }
        Err(e) => error!(error = ?e, "Post-payment channel refresh failed"),
    }

    match transactions {
        Ok(invoices) => {
            let _ = update_tx.send(PollerUpdate::Transactions(invoices));
        }
        Err(e) => error!(error = ?e, "Post-payment transactions refresh failed"),
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Game Loop / Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   1. Appliquer les mises à jour (poller + worker)
//   2. Dessiner l'interface (render)
//   3. Traiter les événements (input)
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// CONCEPT : Single writer
/// - Seule cette boucle mute App : les callbacks de complétion de fetch
///   sont drainés ici, une tranche d'état à la fois
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
    update_rx: mpsc::Receiver<PollerUpdate>,
) -> Result<()> {
    loop {
        if !app.is_running() {
            break;
        }

        // ========================================
        // 0. MISES À JOUR : draine le poller
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - On draine tout ce qui est arrivé depuis la dernière itération
        // - Chaque mise à jour ne touche que sa tranche d'état
        while let Ok(update) = update_rx.try_recv() {
            app.apply_update(update);
        }

        // Résultats du worker de paiement
        match result_rx.try_recv() {
            Ok(AppResult::PaymentSent { receipt }) => {
                app.payment_sent(receipt);
            }
            Ok(AppResult::InvoiceCreated { payment_request }) => {
                app.invoice_created(payment_request);
            }
            Ok(AppResult::PaymentError { message }) => {
                error!(message = %message, "Payment flow error");
                app.payment_failed(message);
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Pas de résultat, c'est normal
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Payment worker disconnected!");
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        terminal.draw(|frame| {
            render(frame, app);
        })?;

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                handle_event(app, event, &command_tx);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Modifie l'état de app selon l'événement
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching complexe avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Navigation contextuelle selon l'écran actuel
/// - command_tx : pour envoyer des commandes au worker thread
fn handle_event(
    app: &mut App,
    event: plebwallet::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    use plebwallet::ui::events::{
        get_char_from_event, is_backspace_event, is_digit_event, is_enter_event,
        is_escape_event, is_invoice_char_event, is_quit_event, is_receive_event, is_send_event,
        Event,
    };

    match event {
        // 'q' : quit two-step (seulement sur le dashboard : dans les modals,
        // 'q' est un caractère de saisie valide pour une invoice)
        Event::Key(_) if is_quit_event(&event) && app.is_on_dashboard() => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // 's' : ouvrir le modal d'envoi (refusé si session anonyme)
        Event::Key(_) if is_send_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            info!("User opened send modal");
            app.open_send_modal();
        }

        // 'r' : ouvrir le modal de réception (refusé si session anonyme)
        Event::Key(_) if is_receive_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            info!("User opened receive modal");
            app.open_receive_modal();
        }

        // ESC : fermer le modal et vider tout son état
        Event::Key(_) if is_escape_event(&event) && app.is_in_modal() => {
            info!("User closed modal");
            app.close_modal();
        }

        // Enter : soumettre le formulaire du modal
        Event::Key(_) if is_enter_event(&event) && app.is_in_modal() => {
            submit_modal(app, command_tx);
        }

        // Backspace : supprimer le dernier caractère
        Event::Key(_) if is_backspace_event(&event) && app.is_in_modal() => {
            app.backspace();
        }

        // Saisie dans le modal send : caractères d'invoice BOLT11
        Event::Key(_)
            if is_invoice_char_event(&event) && app.current_screen == Screen::SendModal =>
        {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        // Saisie dans le modal receive : chiffres uniquement
        Event::Key(_)
            if is_digit_event(&event) && app.current_screen == Screen::ReceiveModal =>
        {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Tick => {
            // Tick régulier : rien à faire, le render draine les channels
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit si active
            app.cancel_quit();
        }
    }
}

/// Soumet le formulaire du modal courant au worker de paiement
///
/// L'identité est lue au moment de la soumission : les modals ne s'ouvrent
/// que pour une session authentifiée, donc user est forcément résolu ici
fn submit_modal(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    let user_id = match app.session.user() {
        Some(user) => user.id,
        None => return,
    };

    match app.current_screen {
        Screen::SendModal => {
            let payment_request = app.modal.input.trim().to_string();
            if payment_request.is_empty() {
                debug!("Empty payment request, ignoring submit");
                return;
            }

            info!("User submitted invoice for payment");
            let _ = command_tx.send(AppCommand::PayInvoice {
                payment_request,
                user_id,
            });
        }

        Screen::ReceiveModal => {
            let value = match app.modal.amount() {
                Some(value) => value,
                None => {
                    debug!("Invalid amount, ignoring submit");
                    return;
                }
            };

            info!(value = value, "User submitted invoice creation");
            let _ = command_tx.send(AppCommand::CreateInvoice { value, user_id });
        }

        Screen::Dashboard => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Crossterm gère tout ça de manière cross-platform
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup et RAII
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
