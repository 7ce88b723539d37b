//! Read-only query tool over a collection directory.
//!
//! Usage: `jsonrepo_cli <ClassName> <field,field,...> [name=value ...]`
//!
//! Reads collections from `JSONREPO_DATA_DIR` (default `./data`) and prints
//! the query result as a JSON array. Logs go to the directory named by
//! `JSONREPO_LOG_DIR` when set.

use jsonrepo_core::{
    default_log_level, init_logging, FieldModel, JsonCollectionStore, QueryParams, Record,
    RecordRepository, StoreConfig,
};
use std::process::ExitCode;

const USAGE: &str = "usage: jsonrepo_cli <ClassName> <field,field,...> [name=value ...]";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.first().map(String::as_str) == Some("--version") {
        println!("jsonrepo_core version={}", jsonrepo_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    let [class_name, fields, params @ ..] = args else {
        return Err(USAGE.to_string());
    };

    if let Ok(log_dir) = std::env::var("JSONREPO_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let model = FieldModel::new(
        class_name.as_str(),
        fields.split(',').map(str::trim).filter(|name| !name.is_empty()),
    );
    let config = StoreConfig::from_env();
    let mut store = JsonCollectionStore::new(model, &config);
    store.load().map_err(|err| err.to_string())?;

    let params = QueryParams::from_pairs(params.iter().map(|param| {
        let (name, value) = param.split_once('=').unwrap_or((param.as_str(), ""));
        (name.to_string(), value.to_string())
    }));
    let results = store
        .get_all(&params)
        .into_iter()
        .map(Record::into_value)
        .collect::<Vec<_>>();

    serde_json::to_string_pretty(&results).map_err(|err| err.to_string())
}
