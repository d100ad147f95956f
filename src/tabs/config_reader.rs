use crate::tabs::*;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

pub const DEFAULT_TABLE_DELIMITER: &str = "|";
pub const DEFAULT_FIELD_DELIMITER: u8 = b'\t';

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
    #[serde(rename = "flatFile")]
    pub flat_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TabSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstTableSheetIndex")]
    _first_table_sheet_index: Option<JSValue>,
    #[serde(rename = "indexSheetName")]
    pub index_sheet_name: Option<String>,
    #[serde(rename = "tableDelimiter")]
    pub table_delimiter: Option<String>,
    #[serde(rename = "fieldDelimiter")]
    _field_delimiter: Option<String>,
}

impl TabSource {
    pub fn from_input(provider: String, file_path: String) -> TabSource {
        TabSource {
            provider,
            file_path,
            _first_table_sheet_index: None,
            index_sheet_name: None,
            table_delimiter: None,
            _field_delimiter: None,
        }
    }

    /// Sheets before this index (starting at 0) are not tables.
    pub fn first_table_sheet_index(&self) -> TabsResult<usize> {
        match &self._first_table_sheet_index {
            None => Ok(0),
            x => read_js_int(x),
        }
    }

    pub fn table_delimiter(&self) -> String {
        self.table_delimiter
            .clone()
            .unwrap_or_else(|| DEFAULT_TABLE_DELIMITER.to_string())
    }

    pub fn field_delimiter(&self) -> TabsResult<u8> {
        match self._field_delimiter.as_deref() {
            None => Ok(DEFAULT_FIELD_DELIMITER),
            Some("\\t") => Ok(b'\t'),
            Some(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
            Some(s) => InvalidDelimiterSnafu { delimiter: s }.fail(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StatTesting {
    pub batches: Option<String>,
    #[serde(rename = "confidenceLevel")]
    pub confidence_level: Option<f64>,
    #[serde(rename = "recomputeSignificance")]
    pub recompute_significance: Option<bool>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TabsConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "tabSources")]
    pub tab_sources: Vec<TabSource>,
    #[serde(rename = "statTesting")]
    pub stat_testing: Option<StatTesting>,
    #[serde(rename = "excludedTables")]
    pub excluded_tables: Option<Vec<JSValue>>,
    #[serde(rename = "skippedStubLabels")]
    pub skipped_stub_labels: Option<Vec<String>>,
}

impl TabsConfig {
    pub fn from_input(project_name: String, source: TabSource) -> TabsConfig {
        TabsConfig {
            output_settings: OutputSettings {
                project_name,
                output_directory: None,
                summary_file: None,
                flat_file: None,
            },
            tab_sources: vec![source],
            stat_testing: None,
            excluded_tables: None,
            skipped_stub_labels: None,
        }
    }
}

pub fn read_config(path: &str) -> BTabsResult<TabsConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: TabsConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> BTabsResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_summary: {} bytes", contents.len());
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> TabsResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize).context(ParsingJsonNumberSnafu {
            value: n.to_string(),
        }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu { value: s.clone() }),
        _ => None.context(ParsingJsonNumberSnafu {
            value: format!("{:?}", x),
        }),
    }
}

// Table ids are written as numbers or strings.
fn read_js_table_id(x: &JSValue) -> TabsResult<TableId> {
    match x {
        JSValue::Number(n) => Ok(TableId(n.to_string())),
        JSValue::String(s) => Ok(TableId(s.trim().to_string())),
        _ => whatever!("Cannot read the table identifier {:?}", x),
    }
}

/// Merges the configuration and the command line options.
pub fn tabulation_options(
    config: &TabsConfig,
    overrides: &Overrides,
) -> TabsResult<TabulationOptions> {
    let stat_testing = config.stat_testing.clone();
    let level = overrides
        .confidence
        .or_else(|| stat_testing.as_ref().and_then(|s| s.confidence_level))
        .unwrap_or(0.95);
    let confidence =
        ConfidenceLevel::from_level(level).context(InvalidConfidenceSnafu { level })?;

    let mut excluded_tables: BTreeSet<TableId> = BTreeSet::new();
    match &overrides.exclude {
        Some(ids) => {
            for id in ids.iter().filter(|s| !s.trim().is_empty()) {
                excluded_tables.insert(TableId(id.trim().to_string()));
            }
        }
        None => {
            for js in config.excluded_tables.iter().flatten() {
                excluded_tables.insert(read_js_table_id(js)?);
            }
        }
    }

    Ok(TabulationOptions {
        stat_batches: overrides
            .batches
            .clone()
            .or_else(|| stat_testing.as_ref().and_then(|s| s.batches.clone())),
        confidence,
        recompute_significance: stat_testing
            .as_ref()
            .and_then(|s| s.recompute_significance)
            .unwrap_or(false),
        excluded_tables,
        skipped_stub_labels: config.skipped_stub_labels.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(js: &str) -> TabsConfig {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn options_from_config() {
        let c = config(
            r#"{
            "outputSettings": {"projectName": "Tracker"},
            "tabSources": [{"provider": "excel", "filePath": "t.xlsx", "firstTableSheetIndex": "2"}],
            "statTesting": {"batches": "AB,CD", "confidenceLevel": 0.9},
            "excludedTables": [56, "113"],
            "skippedStubLabels": ["Mean"]
        }"#,
        );
        assert_eq!(c.tab_sources[0].first_table_sheet_index().unwrap(), 2);
        assert_eq!(c.tab_sources[0].table_delimiter(), "|");
        assert_eq!(c.tab_sources[0].field_delimiter().unwrap(), b'\t');
        let o = tabulation_options(&c, &Overrides::default()).unwrap();
        assert_eq!(o.stat_batches.as_deref(), Some("AB,CD"));
        assert_eq!(o.confidence, ConfidenceLevel::P90);
        assert!(!o.recompute_significance);
        assert!(o.excluded_tables.contains(&TableId::from("56")));
        assert!(o.excluded_tables.contains(&TableId::from("113")));
        assert_eq!(o.skipped_stub_labels, vec!["Mean".to_string()]);
    }

    #[test]
    fn command_line_wins() {
        let c = config(
            r#"{
            "outputSettings": {"projectName": "Tracker"},
            "tabSources": [{"provider": "text", "filePath": "t.txt", "fieldDelimiter": ";"}],
            "excludedTables": [56]
        }"#,
        );
        let overrides = Overrides {
            batches: Some("A/B".to_string()),
            exclude: Some(vec!["3".to_string(), " ".to_string()]),
            confidence: Some(0.99),
            ..Overrides::default()
        };
        let o = tabulation_options(&c, &overrides).unwrap();
        assert_eq!(o.stat_batches.as_deref(), Some("A/B"));
        assert_eq!(o.confidence, ConfidenceLevel::P99);
        assert_eq!(o.excluded_tables.len(), 1);
        assert!(o.excluded_tables.contains(&TableId::from("3")));
        assert_eq!(c.tab_sources[0].field_delimiter().unwrap(), b';');
    }

    #[test]
    fn invalid_values() {
        let c = config(
            r#"{
            "outputSettings": {"projectName": "Tracker"},
            "tabSources": [{"provider": "text", "filePath": "t.txt", "fieldDelimiter": "||"}],
            "statTesting": {"confidenceLevel": 0.97}
        }"#,
        );
        assert!(matches!(
            tabulation_options(&c, &Overrides::default()),
            Err(TabsError::InvalidConfidence { .. })
        ));
        assert!(matches!(
            c.tab_sources[0].field_delimiter(),
            Err(TabsError::InvalidDelimiter { .. })
        ));
    }
}
