use clap::Parser;

use stats_cache::cli::{Cli, run};
use stats_cache::config::log_path;
use stats_cache::logging::{LogConfig, LogFormat, init_logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        })
        .with_log_file((!cli.log_stderr).then(log_path));
    let _guard = init_logging(&log_config)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
