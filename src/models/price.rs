// ============================================================================
// Structures : PricePoint et PriceSeries
// ============================================================================
// Représente l'historique du prix BTC-USD affiché dans le graphique
//
// CONCEPTS RUST :
// 1. Pure function : append() ne modifie pas self, retourne une nouvelle série
// 2. Clone-on-update : on copie la série précédente puis on ajoute le point
// 3. Slices : points() expose &[PricePoint] sans céder l'ownership
// ============================================================================

/// Un échantillon de prix à un instant donné
///
/// CONCEPT RUST : #[derive(Copy)]
/// - Deux champs scalaires, la copie est triviale
/// - Permet de passer le point par valeur sans move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Timestamp en millisecondes depuis l'epoch Unix
    pub timestamp_ms: i64,

    /// Prix en USD, déjà arrondi à 2 décimales
    pub value: f64,
}

/// Série ordonnée d'échantillons de prix
///
/// La série est append-only : jamais tronquée, jamais ré-échantillonnée.
/// Elle grandit pendant toute la durée de vie du process et disparaît
/// avec lui (comme l'état d'une page avant rechargement).
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Crée une série vide
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Applique une nouvelle observation de prix et retourne la série résultante
    ///
    /// CONCEPT RUST : Pure function
    /// - Aucune mutation de self, aucun état caché
    /// - La série retournée ne dépend que de (self, timestamp_ms, value)
    /// - Testable de manière isolée
    ///
    /// Règle de déduplication (comportement historique du wallet, conservé
    /// tel quel) : le point est rejeté si son timestamp est égal à celui du
    /// dernier point OU si sa valeur est égale à celle du dernier point.
    /// Il n'est ajouté que si les DEUX champs diffèrent.
    pub fn append(&self, timestamp_ms: i64, value: f64) -> PriceSeries {
        // Série vide : le premier point est toujours accepté
        if self.points.is_empty() {
            return Self {
                points: vec![PricePoint { timestamp_ms, value }],
            };
        }

        // Compare avec le dernier point de la série
        // CONCEPT RUST : indexation sûre
        // - On vient de vérifier que la série n'est pas vide
        // - last() retourne donc forcément Some
        let last = self.points[self.points.len() - 1];

        // Timestamp identique OU valeur identique : on rejette le point
        if last.timestamp_ms == timestamp_ms || last.value == value {
            return self.clone();
        }

        // Les deux champs diffèrent : on copie la série et on ajoute le point
        let mut points = self.points.clone();
        points.push(PricePoint { timestamp_ms, value });
        Self { points }
    }

    /// Retourne les points de la série dans l'ordre d'insertion
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Retourne le dernier point de la série
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Nombre de points dans la série
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convertit la série en points (x, y) pour le widget Chart de ratatui
    ///
    /// L'axe x est le timestamp en millisecondes converti en f64.
    /// Aucun lissage ni ré-échantillonnage : les points sont rendus tels quels.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.timestamp_ms as f64, p.value))
            .collect()
    }

    /// Retourne (min, max) des valeurs de la série pour borner l'axe y
    ///
    /// CONCEPT RUST : fold
    /// - min et max calculés en un seul passage
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), p| (min.min(p.value), max.max(p.value)),
        ))
    }

    /// Retourne (premier, dernier) timestamp pour borner l'axe x
    pub fn time_bounds(&self) -> Option<(i64, i64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.timestamp_ms, last.timestamp_ms))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_on_empty_series() {
        let series = PriceSeries::new();
        let series = series.append(1000, 50000.0);

        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().timestamp_ms, 1000);
        assert_eq!(series.last().unwrap().value, 50000.0);
    }

    #[test]
    fn test_append_rejects_duplicate_timestamp() {
        let series = PriceSeries::new().append(1000, 50000.0);

        // Même timestamp, prix différent : rejeté
        let series = series.append(1000, 50001.0);

        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().value, 50000.0);
    }

    #[test]
    fn test_append_rejects_duplicate_value() {
        let series = PriceSeries::new().append(1000, 50000.0);

        // Timestamp différent, même prix : rejeté aussi
        let series = series.append(2000, 50000.0);

        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().timestamp_ms, 1000);
    }

    #[test]
    fn test_append_when_both_fields_differ() {
        let series = PriceSeries::new().append(1000, 50000.0);
        let series = series.append(2000, 50001.0);

        assert_eq!(series.len(), 2);
        // Les points précédents sont conservés dans l'ordre
        assert_eq!(series.points()[0].timestamp_ms, 1000);
        assert_eq!(series.points()[0].value, 50000.0);
        assert_eq!(series.points()[1].timestamp_ms, 2000);
        assert_eq!(series.points()[1].value, 50001.0);
    }

    #[test]
    fn test_append_is_pure() {
        let original = PriceSeries::new().append(1000, 50000.0);
        let _ = original.append(2000, 50001.0);

        // La série d'origine n'est pas modifiée par append()
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn test_stable_quote_stream() {
        // Trois observations successives d'un cours stable puis en hausse :
        // (1000, 50000.00), (2000, 50000.00), (3000, 50001.00)
        // Le point du milieu est rejeté (prix inchangé malgré le nouveau
        // timestamp), le troisième est accepté.
        let series = PriceSeries::new()
            .append(1000, 50000.0)
            .append(2000, 50000.0)
            .append(3000, 50001.0);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0], PricePoint { timestamp_ms: 1000, value: 50000.0 });
        assert_eq!(series.points()[1], PricePoint { timestamp_ms: 3000, value: 50001.0 });
    }

    #[test]
    fn test_chart_points_and_bounds() {
        let series = PriceSeries::new()
            .append(1000, 50000.0)
            .append(2000, 49000.0)
            .append(3000, 51000.0);

        let points = series.chart_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], (1000.0, 50000.0));

        assert_eq!(series.value_bounds(), Some((49000.0, 51000.0)));
        assert_eq!(series.time_bounds(), Some((1000, 3000)));
    }

    #[test]
    fn test_bounds_on_empty_series() {
        let series = PriceSeries::new();
        assert!(series.value_bounds().is_none());
        assert!(series.time_bounds().is_none());
        assert!(series.is_empty());
    }
}
