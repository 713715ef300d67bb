mod debug_report;

use anyhow::{Context as _, Result, bail};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use value_mappr::{Dictionary, FlattenDepth, Options, OptionsConfig, Resolver, StageFlags, map_all};

fn main() -> ExitCode {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    };

    let (dictionary, options) = match load_inputs(&config) {
        Ok(inputs) => inputs,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    };

    match run(&config, &dictionary, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

struct CliConfig {
    dictionary: Option<PathBuf>,
    options: Option<PathBuf>,
    stages: StageFlags,
    shallow: bool,
    keys: Vec<String>,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig> {
    let mut config = CliConfig {
        dictionary: None,
        options: None,
        stages: StageFlags::empty(),
        shallow: false,
        keys: Vec::new(),
        json: false,
        color: io::stdout().is_terminal(),
    };
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("value-mappr {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--alias" => config.stages |= StageFlags::ALIAS,
            "--map" => config.stages |= StageFlags::MAP,
            "--flatten" => config.stages |= StageFlags::FLATTEN,
            "--all" => config.stages = StageFlags::all(),
            "--shallow" => config.shallow = true,
            "--json" => config.json = true,
            "--color" => config.color = true,
            "--no-color" => config.color = false,
            "-d" | "--dictionary" => {
                let value = args.next().context("--dictionary expects a path")?;
                set_once(&mut config.dictionary, value, "--dictionary")?;
            }
            "-o" | "--options" => {
                let value = args.next().context("--options expects a path")?;
                set_once(&mut config.options, value, "--options")?;
            }
            "-k" | "--key" => {
                let value = args.next().context("--key expects a value")?;
                config.keys.push(value);
            }
            _ if arg.starts_with("--dictionary=") => {
                set_once(&mut config.dictionary, arg.trim_start_matches("--dictionary=").to_string(), "--dictionary")?;
            }
            _ if arg.starts_with("--options=") => {
                set_once(&mut config.options, arg.trim_start_matches("--options=").to_string(), "--options")?;
            }
            _ if arg.starts_with("--key=") => config.keys.push(arg.trim_start_matches("--key=").to_string()),
            _ if arg.starts_with('-') => bail!("unknown option '{arg}'\n\n{}", help_text()),
            _ => config.keys.push(arg),
        }
    }

    Ok(config)
}

fn set_once(slot: &mut Option<PathBuf>, value: String, flag: &str) -> Result<()> {
    if slot.is_some() {
        bail!("{flag} provided multiple times");
    }
    *slot = Some(PathBuf::from(value));
    Ok(())
}

fn load_inputs(config: &CliConfig) -> Result<(Dictionary, Options)> {
    let raw = match &config.dictionary {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read dictionary {}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read dictionary from stdin")?;
            buffer
        }
    };
    if raw.trim().is_empty() {
        bail!("no dictionary provided\n\n{}", help_text());
    }
    let dictionary: Dictionary = serde_json::from_str(&raw).context("dictionary must be a JSON object")?;

    let file_config = match &config.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read options {}", path.display()))?;
            serde_json::from_str::<OptionsConfig>(&text)
                .with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => OptionsConfig::default(),
    };

    Ok((dictionary, merge_options(file_config, config.stages, config.shallow)))
}

/// Command-line toggles are added on top of the options file.
fn merge_options(file_config: OptionsConfig, stages: StageFlags, shallow: bool) -> Options {
    let mut options = Options::from(file_config);
    options.stages |= stages;
    if shallow {
        options = options.with_flatten_depth(FlattenDepth::Shallow);
    }
    options
}

fn run(config: &CliConfig, dictionary: &Dictionary, options: Options) -> Result<()> {
    if config.json && config.keys.is_empty() {
        let mapped = map_all(dictionary, options)?;
        println!("{}", serde_json::to_string_pretty(&mapped)?);
        return Ok(());
    }

    let resolver = Resolver::new(dictionary, options)?;
    let keys: Vec<&str> = if config.keys.is_empty() {
        dictionary.keys().map(String::as_str).collect()
    } else {
        config.keys.iter().map(String::as_str).collect()
    };

    if config.json {
        let mut out = serde_json::Map::new();
        for key in keys {
            let resolution = resolver.lookup(key)?;
            out.insert(key.to_string(), serde_json::to_value(&resolution)?);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut details = Vec::with_capacity(keys.len());
    for key in keys {
        details.push(resolver.lookup_verbose(key)?);
    }
    debug_report::print_run(resolver.pipeline().names(), &details, config.color);
    Ok(())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "value-mappr {version}

Resolve alias chains in a JSON dictionary.

Usage:
  value-mappr [OPTIONS] [KEY...]
  value-mappr [OPTIONS] --dictionary <path> --key <key>

Without keys, every key of the dictionary is resolved in insertion order.

Options:
  -d, --dictionary <path>    JSON object to resolve against. Reads stdin when omitted.
  -o, --options <path>       JSON options file: alias, map, flatten, flattenDepth,
                             middlewares (registered stage names).
  -k, --key <key>            Key to resolve. May be repeated.
  --alias                    Follow string values as keys.
  --map                      Resolve array elements as aliases.
  --flatten                  Flatten nested arrays.
  --all                      Enable alias, map and flatten.
  --shallow                  Flatten only one level (enables --flatten).
  --json                     Print JSON instead of the report.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {debug_env}=1       Trace pipeline assembly and every lookup hop on stderr.

Exit codes:
  0  Success.
  1  Resolution error (unknown stage, alias cycle).
  2  Invalid arguments or input.
",
        version = env!("CARGO_PKG_VERSION"),
        debug_env = "VALUE_MAPPR_DEBUG",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shallow_enables_one_level_flatten() {
        let dictionary: Dictionary = serde_json::from_value(json!({ "x": [[1, [2]], 3] })).unwrap();
        let options = merge_options(OptionsConfig::default(), StageFlags::empty(), true);

        assert!(options.stages.contains(StageFlags::FLATTEN));
        let mapped = map_all(&dictionary, options).unwrap();
        assert_eq!(mapped.get("x"), Some(&json!([1, [2], 3])));
    }

    #[test]
    fn flags_add_to_the_options_file() {
        let file_config: OptionsConfig = serde_json::from_value(json!({ "alias": true })).unwrap();
        let options = merge_options(file_config, StageFlags::MAP, false);

        assert_eq!(options.stages, StageFlags::ALIAS | StageFlags::MAP);
        assert_eq!(options.flatten_depth, FlattenDepth::Deep);
    }
}
