use clap::Parser;

/// This is a tabulation program for crosstab (banner) tables.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the tab sources and the stat testing settings.
    /// For more information about the file format, read the documentation of the crosstab crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, totaltabs will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the tables will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the rows of all the tables sharing the banner of the first table are
    /// written in CSV format to the given location.
    #[clap(long, value_parser)]
    pub flat_out: Option<String>,

    /// (file path or empty) The file containing the tables, when no configuration file is used.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (excel or text, default guessed from the file extension) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (string, optional) The stat batches, for example 'AB,CD' or 'A/B/C,D/E'. If not specified, they are read from
    /// the 'Statistics:' line of the tables.
    #[clap(short, long, value_parser)]
    pub batches: Option<String>,

    /// (list of comma-separated table numbers) The tables to leave out.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// (0.80, 0.85, 0.90, 0.95 or 0.99) The confidence level of the significance tests.
    #[clap(long, value_parser)]
    pub confidence: Option<f64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
