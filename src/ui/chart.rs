// ============================================================================
// Chart - Rendu du graphique de prix
// ============================================================================
// Affiche la série de prix BTC-USD accumulée en graphique ligne (x = temps,
// y = prix). Aucun lissage, aucun ré-échantillonnage : chaque point accepté
// par la série est rendu tel quel.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use chrono::{TimeZone, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;

/// Dessine le graphique de prix
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    // Tant que la série est vide, affiche un message d'attente
    if app.chart.is_empty() {
        render_no_data(frame, area, "En attente du premier prix...");
        return;
    }

    let points = app.chart.chart_points();

    // Bornes des axes, calculées sur la série complète
    // CONCEPT RUST : unwrap_or
    // - La série n'est pas vide ici, mais on reste défensif côté types
    let (min_price, max_price) = app.chart.value_bounds().unwrap_or((0.0, 1.0));
    let (first_ts, last_ts) = app.chart.time_bounds().unwrap_or((0, 1));

    // Ajoute une marge de 5% pour que le graphique respire
    let margin = ((max_price - min_price) * 0.05).max(1.0);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    // Un seul point : élargit l'axe x pour que le point soit visible
    let x_max = if last_ts > first_ts {
        last_ts as f64
    } else {
        first_ts as f64 + 1.0
    };

    let datasets = vec![Dataset::default()
        .name("BTC-USD")
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points)];

    let x_axis = Axis::default()
        .title("Heure")
        .style(Style::default().fg(Color::Gray))
        .bounds([first_ts as f64, x_max])
        .labels(vec![
            Span::raw(format_time(first_ts)),
            Span::raw(format_time(last_ts)),
        ]);

    let y_axis = Axis::default()
        .title("Prix ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.0}", y_min)),
            Span::raw(format!("${:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" 📈 BTC-USD "),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Formatte un timestamp en millisecondes en heure locale lisible (HH:MM:SS)
fn format_time(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(datetime) => datetime.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Affiche un message quand il n'y a pas encore de données
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(" 📈 BTC-USD ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        // 1970-01-01 00:00:01 UTC
        assert_eq!(format_time(1000), "00:00:01");
    }
}
