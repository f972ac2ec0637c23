//! Column role detection.
//!
//! Finds the **article** column (the product identifier used to filter
//! forecasts) and the **target** column (the demand values).
//!
//! Article detection runs an ordered list of [`ArticleStrategy`]
//! implementations and stops at the first match:
//!
//! 1. [`ExactName`] - a column named exactly like a candidate (case-insensitive)
//! 2. [`NameContains`] - a column whose name contains a candidate
//! 3. [`LowCardinalityText`] - a text column with few distinct values
//!
//! Derived calendar columns, the date column and the target column are never
//! candidates. Not finding an article column is not an error; the roster
//! then only holds [`ALL_ARTICLES`].

mod strategies;

pub use strategies::{ArticleStrategy, ExactName, LowCardinalityText, NameContains};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::is_system_column;
use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::utils::text_values;

/// Sentinel roster entry meaning "every article".
pub const ALL_ARTICLES: &str = "All";

/// Which strategy found the article column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStrategy {
    ExactName,
    NameContains,
    LowCardinalityText,
}

impl DetectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionStrategy::ExactName => "exact_name",
            DetectionStrategy::NameContains => "name_contains",
            DetectionStrategy::LowCardinalityText => "low_cardinality_text",
        }
    }
}

impl std::fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of article column detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetection {
    pub column: String,
    pub strategy: DetectionStrategy,
}

/// Distinct article values in order of first appearance, always led by
/// [`ALL_ARTICLES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRoster(Vec<String>);

impl Default for ArticleRoster {
    fn default() -> Self {
        Self(vec![ALL_ARTICLES.to_string()])
    }
}

impl ArticleRoster {
    /// Build a roster from the distinct values of `column`.
    pub fn from_column(column: &Column) -> Result<Self> {
        let mut entries = vec![ALL_ARTICLES.to_string()];
        let mut seen = std::collections::HashSet::new();
        for value in text_values(column.as_materialized_series())?.into_iter().flatten() {
            if seen.insert(value.clone()) {
                entries.push(value);
            }
        }
        Ok(Self(entries))
    }

    /// All entries, including the leading sentinel.
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Article values only, without the sentinel.
    pub fn articles(&self) -> &[String] {
        &self.0[1..]
    }

    /// Whether `value` is a valid filter (the sentinel or a known article).
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A roster always holds the sentinel, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Roles detected for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// `None` when no strategy matched ("undetected").
    pub article: Option<ArticleDetection>,
    /// `None` when the target column is absent ("none detected").
    pub target: Option<String>,
    pub roster: ArticleRoster,
}

/// Detects article and target columns.
pub struct ColumnRoleDetector {
    date_column: String,
    target_column: String,
    strategies: Vec<Box<dyn ArticleStrategy>>,
}

impl Default for ColumnRoleDetector {
    fn default() -> Self {
        Self::new(&ProcessingConfig::default())
    }
}

impl ColumnRoleDetector {
    /// Create a detector with the standard strategy order.
    pub fn new(config: &ProcessingConfig) -> Self {
        let candidates: Vec<String> = config
            .article_candidates
            .iter()
            .map(|c| c.to_lowercase())
            .collect();

        Self::with_strategies(
            config,
            vec![
                Box::new(ExactName::new(candidates.clone())),
                Box::new(NameContains::new(candidates)),
                Box::new(LowCardinalityText::new(config.article_cardinality_ratio)),
            ],
        )
    }

    /// Create a detector with a custom strategy list, run in order.
    pub fn with_strategies(
        config: &ProcessingConfig,
        strategies: Vec<Box<dyn ArticleStrategy>>,
    ) -> Self {
        Self {
            date_column: config.date_column.clone(),
            target_column: config.target_column.clone(),
            strategies,
        }
    }

    /// Find the article column, if any.
    pub fn detect_article(&self, df: &DataFrame) -> Option<ArticleDetection> {
        let eligible: Vec<&Column> = df
            .get_columns()
            .iter()
            .filter(|c| {
                let name = c.name().as_str();
                !is_system_column(name) && name != self.date_column && name != self.target_column
            })
            .collect();

        for strategy in &self.strategies {
            if let Some(column) = strategy.detect(&eligible, df.height()) {
                info!(
                    "Article column '{}' detected by {}",
                    column,
                    strategy.kind()
                );
                return Some(ArticleDetection {
                    column,
                    strategy: strategy.kind(),
                });
            }
            debug!("Article strategy {} found nothing", strategy.kind());
        }

        info!("No article column detected");
        None
    }

    /// Return the target column name if it is present (exact, case-sensitive).
    pub fn detect_target(&self, df: &DataFrame) -> Option<String> {
        df.get_column_names()
            .iter()
            .find(|name| name.as_str() == self.target_column)
            .map(|name| name.to_string())
    }

    /// Detect every role and build the article roster.
    pub fn detect(&self, df: &DataFrame) -> Result<ColumnRoles> {
        let article = self.detect_article(df);
        let roster = match &article {
            Some(detection) => ArticleRoster::from_column(df.column(&detection.column)?)?,
            None => ArticleRoster::default(),
        };

        Ok(ColumnRoles {
            article,
            target: self.detect_target(df),
            roster,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn products_frame() -> DataFrame {
        let products = ["pan", "leche", "huevos"];
        let producto: Vec<&str> = (0..100).map(|i| products[i % 3]).collect();
        let fecha: Vec<String> = (0..100).map(|i| format!("2024-01-{:02}", i % 28 + 1)).collect();
        let demanda: Vec<f64> = (0..100).map(|i| i as f64).collect();
        df!["fecha" => fecha, "producto" => producto, "demanda" => demanda].unwrap()
    }

    #[test]
    fn test_exact_name_wins() {
        let roles = ColumnRoleDetector::default().detect(&products_frame()).unwrap();

        assert_eq!(
            roles.article,
            Some(ArticleDetection {
                column: "producto".to_string(),
                strategy: DetectionStrategy::ExactName,
            })
        );
        assert_eq!(roles.target.as_deref(), Some("demanda"));
        assert_eq!(roles.roster.entries(), &["All", "pan", "leche", "huevos"]);
        assert_eq!(roles.roster.articles().len(), 3);
    }

    #[test]
    fn test_candidate_priority_beats_column_order() {
        let df = df![
            "nombre" => ["a", "b"],
            "Articulo" => ["x", "y"],
        ]
        .unwrap();
        let detection = ColumnRoleDetector::default().detect_article(&df).unwrap();
        assert_eq!(detection.column, "Articulo");
        assert_eq!(detection.strategy, DetectionStrategy::ExactName);
    }

    #[test]
    fn test_name_contains() {
        let df = df!["codigo_producto" => ["a", "b"], "demanda" => [1, 2]].unwrap();
        let detection = ColumnRoleDetector::default().detect_article(&df).unwrap();
        assert_eq!(detection.column, "codigo_producto");
        assert_eq!(detection.strategy, DetectionStrategy::NameContains);
    }

    #[test]
    fn test_low_cardinality_fallback() {
        let tienda: Vec<&str> = (0..20).map(|i| if i % 2 == 0 { "norte" } else { "sur" }).collect();
        let id: Vec<String> = (0..20).map(|i| format!("row-{i}")).collect();
        let df = df!["id" => id, "tienda" => tienda, "demanda" => vec![1.0; 20]].unwrap();

        let detection = ColumnRoleDetector::default().detect_article(&df).unwrap();
        assert_eq!(detection.column, "tienda");
        assert_eq!(detection.strategy, DetectionStrategy::LowCardinalityText);
    }

    #[test]
    fn test_undetected_gives_sentinel_roster() {
        let df = df!["demanda" => [1.0, 2.0], "precio" => [3.0, 4.0]].unwrap();
        let roles = ColumnRoleDetector::default().detect(&df).unwrap();
        assert_eq!(roles.article, None);
        assert_eq!(roles.roster, ArticleRoster::default());
        assert_eq!(roles.roster.entries(), &["All"]);
        assert!(roles.roster.articles().is_empty());
    }

    #[test]
    fn test_system_date_and_target_columns_excluded() {
        let config = ProcessingConfig::builder()
            .date_column("name")
            .target_column("producto")
            .build()
            .unwrap();
        let df = df![
            "name" => ["2024-01-01", "2024-01-02"],
            "producto" => [1.0, 2.0],
            "nombre_dia" => ["Lunes", "Martes"],
        ]
        .unwrap();
        assert_eq!(ColumnRoleDetector::new(&config).detect_article(&df), None);
    }

    #[test]
    fn test_target_is_exact_and_case_sensitive() {
        let detector = ColumnRoleDetector::default();
        let df = df!["Demanda" => [1.0]].unwrap();
        assert_eq!(detector.detect_target(&df), None);

        let df = df!["demanda" => [1.0]].unwrap();
        assert_eq!(detector.detect_target(&df).as_deref(), Some("demanda"));
    }

    #[test]
    fn test_roster_skips_nulls_and_keeps_first_appearance_order() {
        let column: Column = Series::new("sku".into(), &[Some("b"), None, Some("a"), Some("b")]).into();
        let roster = ArticleRoster::from_column(&column).unwrap();
        assert_eq!(roster.entries(), &["All", "b", "a"]);
        assert!(roster.contains("All"));
        assert!(roster.contains("a"));
        assert!(!roster.contains("c"));
    }

    #[test]
    fn test_numeric_article_values_render_as_text() {
        let df = df!["sku" => [101i64, 102, 101]].unwrap();
        let roles = ColumnRoleDetector::default().detect(&df).unwrap();
        assert_eq!(roles.roster.entries(), &["All", "101", "102"]);
    }
}
