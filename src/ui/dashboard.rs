// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui :
// header (statut de session), cartes de soldes et de prix, liste des
// transactions, graphique de prix, footer (aide clavier)
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{chart, modal};

/// Dessine l'interface complète
///
/// Le dashboard est toujours dessiné ; si un modal est ouvert, il est
/// rendu par-dessus (comme le modal de l'UI web d'origine)
pub fn render(frame: &mut Frame, app: &App) {
    render_dashboard(frame, app);

    if app.is_in_modal() {
        modal::render_modal(frame, app);
    }
}

/// Dessine le dashboard
fn render_dashboard(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let chunks = create_layout(size);

    render_header(frame, app, chunks[0]);
    render_balance_cards(frame, app, chunks[1]);
    render_main_row(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================

/// Crée le layout principal (header, cartes, contenu, footer)
///
/// CONCEPT RATATUI : Layout
/// - split() découpe un Rect en plusieurs zones
/// - Length(n) : exactement n lignes ; Min(0) : tout le reste
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Length(4), // Cartes de soldes : 4 lignes
            Constraint::Min(0),    // Transactions + graphique : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec() // Convertit Rc<[Rect]> en Vec<Rect>
}

// ============================================================================
// Header : Titre et statut de session
// ============================================================================

/// Dessine le header avec le statut de connexion
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let session_span = if app.session.is_logged_in() {
        let name = app
            .session
            .user()
            .map(|u| u.display_name())
            .unwrap_or_default();
        Span::styled(
            format!("logged in as {}", name),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("anonymous", Style::default().fg(Color::Gray))
    };

    let text = vec![Line::from(vec![
        Span::styled(
            "⚡ pleb wallet",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  —  "),
        session_span,
    ])];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Cartes : Soldes et prix
// ============================================================================

/// Dessine la rangée de cartes : soldes du wallet et prix BTC
fn render_balance_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
        .to_vec();

    // Carte des soldes : la dernière valeur connue reste affichée même
    // quand un fetch échoue
    let balances = vec![
        Line::from(format!(
            "Onchain balance: {} sats",
            format_sats(app.balance)
        )),
        Line::from(format!(
            "Channel balance: {} sats",
            format_sats(app.channel_balance)
        )),
    ];

    let balance_card = Paragraph::new(balances)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Balances "),
        )
        .alignment(Alignment::Center);

    frame.render_widget(balance_card, cards[0]);

    // Carte du prix spot
    let price_line = match app.price {
        Some(price) => Line::from(Span::styled(
            format!("${:.2}", price),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from("Loading..."),
    };

    let price_card = Paragraph::new(vec![Line::from("Price"), price_line])
        .block(Block::default().borders(Borders::ALL).title(" BTC-USD "))
        .alignment(Alignment::Center);

    frame.render_widget(price_card, cards[1]);
}

// ============================================================================
// Contenu principal : Transactions + Graphique
// ============================================================================

/// Dessine la rangée principale : liste des transactions et graphique
fn render_main_row(frame: &mut Frame, app: &App, area: Rect) {
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
        .to_vec();

    render_transactions(frame, app, row[0]);
    chart::render_chart(frame, app, row[1]);
}

/// Dessine la liste des transactions
///
/// CONCEPT RATATUI : List widget
/// - Un ListItem par invoice, formaté par le modèle
fn render_transactions(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .transactions
        .iter()
        .map(|invoice| {
            let color = if invoice.send {
                Color::Red
            } else {
                Color::Green
            };
            ListItem::new(invoice.display()).style(Style::default().fg(color))
        })
        .collect();

    let title = format!(" Transactions ({}) ", app.transactions.len());

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    frame.render_widget(list, area);
}

// ============================================================================
// Footer : Aide clavier
// ============================================================================

/// Dessine le footer avec les raccourcis clavier disponibles
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.is_awaiting_quit_confirmation() {
        vec![Line::from(Span::styled(
            "Presser 'q' à nouveau pour quitter",
            Style::default().fg(Color::Red),
        ))]
    } else if app.session.is_logged_in() {
        vec![Line::from(vec![
            Span::styled("[s]", Style::default().fg(Color::Yellow)),
            Span::raw(" Send  "),
            Span::styled("[r]", Style::default().fg(Color::Yellow)),
            Span::raw(" Receive  "),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ])]
    } else {
        // Session anonyme : send/receive désactivés, on affiche le hint
        // de login de l'UI d'origine
        vec![Line::from(Span::styled(
            "Login to create invoices or Login as an admin to pay invoices",
            Style::default().fg(Color::Gray),
        ))]
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Formatte un solde optionnel en sats
fn format_sats(sats: Option<i64>) -> String {
    match sats {
        Some(value) => value.to_string(),
        None => "—".to_string(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sats() {
        assert_eq!(format_sats(Some(1234)), "1234");
        assert_eq!(format_sats(None), "—");
    }

    #[test]
    fn test_create_layout_has_four_zones() {
        let area = Rect::new(0, 0, 80, 24);
        let chunks = create_layout(area);
        assert_eq!(chunks.len(), 4);
    }
}
