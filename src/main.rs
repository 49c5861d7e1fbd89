#![allow(non_snake_case)]
use RustedFracCalc::Examples::fractional_examples::fractional_examples_with;
use RustedFracCalc::fractional::resolver::FractionalResolver;
use RustedFracCalc::Utils::resolver_config::ResolverConfig;
use log::{error, info};
use std::path::Path;

/// Runs the demo cases. An optional first argument is the path of a TOML configuration.
fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match ResolverConfig::from_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}; using the default configuration", e);
                ResolverConfig::default()
            }
        },
        None => ResolverConfig::default(),
    };
    if !config.init_logging() {
        error!("logger was already initialized");
    }
    info!("configuration: {:?}", config);
    let resolver = FractionalResolver::new().with_config(config);
    for example in 0..=4 {
        fractional_examples_with(&resolver, example);
    }
}
