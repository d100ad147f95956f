use log::{debug, info, warn};

use crosstab::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

mod config_reader;
mod io_common;
mod io_excel;
mod io_text;
mod output;

use crate::tabs::config_reader::*;
use crate::tabs::io_common::simplify_file_name;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TabsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing sheet {sheet} in {path}"))]
    MissingSheet { path: String, sheet: String },
    #[snafu(display("Error reading sheet {sheet} in {path}"))]
    ReadingSheet {
        source: calamine::XlsxError,
        path: String,
        sheet: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningText {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error parsing the number {value} in the configuration"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Missing parent directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Invalid delimiter {delimiter:?}: expected a single character"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("Unsupported confidence level {level}"))]
    InvalidConfidence { level: f64 },
    #[snafu(display("Tabulation stopped: {source}"))]
    Tabulation { source: CrosstabError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TabsResult<T> = Result<T, TabsError>;
pub type BTabsResult<T> = Result<T, Box<TabsError>>;

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub batches: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub confidence: Option<f64>,
    pub out: Option<String>,
    pub flat_out: Option<String>,
}

fn read_tab_source(root_path: &Path, cfs: &TabSource) -> BTabsResult<Vec<SourceTable>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read tab file {:?}", p2);
    match cfs.provider.as_str() {
        "excel" => io_excel::read_excel_tables(&p2, cfs),
        "text" => io_text::read_text_tables(&p2, cfs),
        x => Ok(tabs_whatever(format!("Provider not implemented {:?}", x))?),
    }
}

fn default_provider(input_type: &Option<String>, path: &str) -> String {
    match input_type {
        Some(t) => t.clone(),
        None if path.ends_with(".xlsx") => "excel".to_string(),
        None => "text".to_string(),
    }
}

/// Loads the configuration, or builds one from the input file. Returns the
/// directory the paths of the configuration are relative to.
fn load_config(
    config_path: &Option<String>,
    overrides: &Overrides,
) -> BTabsResult<(TabsConfig, PathBuf)> {
    match (config_path, &overrides.input) {
        (Some(path), _) => {
            let mut config = read_config(path)?;
            let root = Path::new(path)
                .parent()
                .context(MissingParentDirSnafu { path: path.clone() })?;
            if let Some(input) = &overrides.input {
                config.tab_sources = vec![TabSource::from_input(
                    default_provider(&overrides.input_type, input),
                    input.clone(),
                )];
            }
            Ok((config, root.to_path_buf()))
        }
        (None, Some(input)) => {
            let project_name = simplify_file_name(input);
            let config = TabsConfig::from_input(
                project_name,
                TabSource::from_input(default_provider(&overrides.input_type, input), input.clone()),
            );
            Ok((config, PathBuf::new()))
        }
        (None, None) => Ok(tabs_whatever(
            "Either a configuration file or an input file must be provided".to_string(),
        )?),
    }
}

fn write_summary(out: &str, pretty_js: &str) -> BTabsResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

fn output_path(root: &Path, settings: &OutputSettings, file: &str) -> String {
    let dir = match &settings.output_directory {
        Some(d) => root.join(d),
        None => root.to_path_buf(),
    };
    dir.join(file).display().to_string()
}

pub fn run_tabs(
    config_path: Option<String>,
    overrides: &Overrides,
    check_summary_path: Option<String>,
) -> BTabsResult<()> {
    let (config, root_p) = load_config(&config_path, overrides)?;
    info!("config: {:?}", config);

    let options = tabulation_options(&config, overrides)?;
    debug!("run_tabs: options: {:?}", options);

    if config.tab_sources.is_empty() {
        tabs_whatever::<()>("No tab source found in the configuration".to_string())?;
    }

    let mut sources: Vec<SourceTable> = Vec::new();
    for cfs in config.tab_sources.iter() {
        let mut file_tables = read_tab_source(&root_p, cfs)?;
        sources.append(&mut file_tables);
    }
    info!("run_tabs: {} tables read", sources.len());

    let result = run_tabulation(&sources, &options).context(TabulationSnafu {})?;
    for f in result.failures.iter() {
        warn!("Table {} could not be parsed: {}", f.id, f.error);
    }
    info!(
        "run_tabs: {} tables parsed, {} failed, {} excluded",
        result.tables.len(),
        result.failures.len(),
        result.skipped.len()
    );

    // Assemble the final json
    let result_js = output::build_summary_js(&config.output_settings.project_name, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = overrides.out.clone().or_else(|| {
        config
            .output_settings
            .summary_file
            .as_ref()
            .map(|f| output_path(&root_p, &config.output_settings, f))
    });
    match out {
        Some(out) => write_summary(&out, &pretty_js_stats)?,
        None => println!("stats:{}", pretty_js_stats),
    }

    let flat_out = overrides.flat_out.clone().or_else(|| {
        config
            .output_settings
            .flat_file
            .as_ref()
            .map(|f| output_path(&root_p, &config.output_settings, f))
    });
    if let Some(flat_out) = flat_out {
        output::write_flat_csv(&flat_out, &result.tables)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            tabs_whatever::<()>(
                "Difference detected between computed summary and reference summary".to_string(),
            )?;
        }
    }

    Ok(())
}

fn tabs_whatever<T>(message: String) -> TabsResult<T> {
    whatever!("{}", message)
}

fn run_tabs_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> BTabsResult<()> {
    let test_dir = option_env!("TABS_TEST_DIR").unwrap_or(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data"
    ));
    info!("Running test {}", test_name);
    let res = run_tabs(
        Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        &Overrides {
            out: Some("stdout".to_string()),
            ..Overrides::default()
        },
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
    );
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        } else {
            eprintln!("No trace found");
        }
    }
    res
}

pub fn test_wrapper(test_name: &str) -> BTabsResult<()> {
    run_tabs_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
