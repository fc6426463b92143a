// ============================================================================
// Modal - Rendu du modal de paiement (send / receive)
// ============================================================================
// Dessine le modal par-dessus le dashboard :
// - send : coller une invoice BOLT11 et la payer
// - receive : saisir un montant et créer une invoice
// Le modal affiche aussi l'invoice créée, le reçu du paiement envoyé et
// les erreurs inline (le modal reste ouvert en cas d'erreur)
//
// CONCEPT RATATUI : Clear widget
// - Efface la zone du modal avant de dessiner par-dessus le dashboard
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};

/// Dessine le modal de paiement par-dessus le dashboard
pub fn render_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, frame.size());

    // Efface la zone avant de dessiner le modal
    frame.render_widget(Clear, area);

    let title = match app.current_screen {
        Screen::SendModal => " Send payment ",
        Screen::ReceiveModal => " Receive payment ",
        Screen::Dashboard => return, // jamais appelé sur le dashboard
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    frame.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Formulaire de saisie
            Constraint::Min(0),    // Résultat (invoice créée / reçu / erreur)
            Constraint::Length(1), // Aide clavier
        ])
        .split(area)
        .to_vec();

    render_form(frame, app, inner[0]);
    render_result(frame, app, inner[1]);
    render_help(frame, inner[2]);
}

/// Dessine le champ de saisie du modal
fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let label = match app.current_screen {
        Screen::SendModal => "paste an invoice",
        Screen::ReceiveModal => "enter amount (sats)",
        Screen::Dashboard => return,
    };

    // Curseur textuel en fin de saisie
    let input_line = Line::from(vec![
        Span::raw(truncate_input(&app.modal.input, area.width)),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(Block::default().borders(Borders::ALL).title(label));

    frame.render_widget(paragraph, area);
}

/// Dessine la zone de résultat du modal
///
/// Trois sections indépendantes, comme dans l'UI web d'origine :
/// invoice créée, paiement envoyé, erreur. Une invoice créée ne remplit
/// jamais la section "payment sent".
fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(invoice) = &app.modal.created_invoice {
        lines.push(Line::from(Span::styled(
            "Invoice created",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        // La payment request est affichée telle quelle, à copier-coller
        lines.push(Line::from(invoice.as_str()));
        lines.push(Line::from(""));
    }

    if let Some(receipt) = &app.modal.receipt {
        lines.push(Line::from(Span::styled(
            "Payment sent",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!(
            "Payment hash: {}",
            receipt.payment_hash
        )));
        lines.push(Line::from(format!("Checking id: {}", receipt.checking_id)));
        lines.push(Line::from(""));
    }

    if let Some(error) = &app.modal.error {
        lines.push(Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Dessine l'aide clavier du modal
fn render_help(frame: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
        Span::raw(" Submit  "),
        Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
        Span::raw(" Close"),
    ]);

    let paragraph = Paragraph::new(vec![help]).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Tronque la saisie par la gauche pour garder la fin visible
///
/// Les invoices BOLT11 sont plus longues que le modal : on montre la fin,
/// là où l'utilisateur tape
fn truncate_input(input: &str, width: u16) -> String {
    let max = width.saturating_sub(4) as usize;
    let count = input.chars().count();

    if count <= max {
        input.to_string()
    } else {
        let skipped: String = input.chars().skip(count - max).collect();
        format!("…{}", skipped)
    }
}

/// Calcule un Rect centré de percent_x % / percent_y % de la zone donnée
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(60, 60, area);

        assert!(rect.x >= area.x);
        assert!(rect.y >= area.y);
        assert!(rect.right() <= area.right());
        assert!(rect.bottom() <= area.bottom());
    }

    #[test]
    fn test_truncate_input_keeps_tail() {
        let long = "lnbc".repeat(20);
        let truncated = truncate_input(&long, 20);

        assert!(truncated.starts_with('…'));
        assert!(truncated.ends_with("lnbc"));
        assert!(truncated.chars().count() <= 17);
    }

    #[test]
    fn test_truncate_input_short_is_untouched() {
        assert_eq!(truncate_input("500", 20), "500");
    }
}
