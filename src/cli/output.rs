use clap::ValueEnum;

/// Rendering for command results. `human` prints tables and summaries;
/// `json` and `yaml` print the serialized envelope or policy snapshot.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}
