use std::path::PathBuf;

use clap::Parser;

use qfetch_core::Overrides;

/// Run a SQL query on AWS Athena and download the result CSV.
///
/// Flags override environment variables (`AWS_PROFILE`, `ATHENA_DATABASE`,
/// `ATHENA_OUTPUT_LOCATION`, ...), which override built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "qfetch", version, about = "Run an Athena query and save the result as a CSV")]
pub struct CliArgs {
    /// The SQL query to execute
    #[arg(required_unless_present = "show_config")]
    pub query: Option<String>,

    /// Athena database name [default: $ATHENA_DATABASE or "default"]
    #[arg(long)]
    pub database: Option<String>,

    /// S3 result location, e.g. s3://my-bucket/path (trailing '/' is stripped)
    #[arg(long)]
    pub output_location: Option<String>,

    /// AWS credential profile [default: $AWS_PROFILE or "default"]
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region (uses the profile's region if not set)
    #[arg(long)]
    pub region: Option<String>,

    /// Athena workgroup (uses the account default if not set)
    #[arg(long)]
    pub workgroup: Option<String>,

    /// Local file path to save the result CSV [default: out.csv]
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Delay between status polls in milliseconds [default: 2000]
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Cancel the query if it has not finished after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print a JSON run summary instead of text
    #[arg(long)]
    pub json: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub show_config: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile.clone(),
            region: self.region.clone(),
            database: self.database.clone(),
            workgroup: self.workgroup.clone(),
            output_location: self.output_location.clone(),
            poll_interval_ms: self.poll_interval_ms,
            timeout_seconds: self.timeout_secs,
            output_file: self.output_file.clone(),
        }
    }
}
