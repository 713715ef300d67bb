use crate::engine::{Resolver, StageFlags};
use crate::{Dictionary, Error, Resolution, Stage};
use serde::{Deserialize, Serialize};

/// How far the flatten stage collapses nested arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlattenDepth {
    /// Remove one level of nesting.
    Shallow,
    /// Remove every level of nesting.
    #[default]
    Deep,
}

/// A stage appended after the built-ins.
#[derive(Debug, Clone)]
pub enum Middleware {
    /// Looked up in the stage registry when the pipeline is assembled.
    Named(String),
    /// Used as given.
    Stage(Stage),
}

impl From<Stage> for Middleware {
    fn from(stage: Stage) -> Self {
        Middleware::Stage(stage)
    }
}

impl From<&str> for Middleware {
    fn from(name: &str) -> Self {
        Middleware::Named(name.to_string())
    }
}

impl From<String> for Middleware {
    fn from(name: String) -> Self {
        Middleware::Named(name)
    }
}

/// Resolver configuration.
///
/// Nothing is enabled by default: a resolver built from `Options::default()`
/// returns raw dictionary values.
///
/// ```
/// use value_mappr::{FlattenDepth, Options, StageFlags};
///
/// let options = Options::new().with_alias().with_map().with_flatten_depth(FlattenDepth::Shallow);
/// assert_eq!(options.stages, StageFlags::ALIAS | StageFlags::MAP | StageFlags::FLATTEN);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Built-in stages to run.
    pub stages: StageFlags,
    /// Depth used by the flatten stage.
    pub flatten_depth: FlattenDepth,
    /// Extra stages, run after the built-ins in this order.
    pub middlewares: Vec<Middleware>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias, map and flatten all enabled.
    pub fn all() -> Self {
        Options { stages: StageFlags::all(), ..Self::default() }
    }

    pub fn with_alias(mut self) -> Self {
        self.stages |= StageFlags::ALIAS;
        self
    }

    pub fn with_map(mut self) -> Self {
        self.stages |= StageFlags::MAP;
        self
    }

    pub fn with_flatten(mut self) -> Self {
        self.stages |= StageFlags::FLATTEN;
        self
    }

    /// Set the flatten depth and enable the flatten stage.
    pub fn with_flatten_depth(mut self, depth: FlattenDepth) -> Self {
        self.flatten_depth = depth;
        self.with_flatten()
    }

    pub fn with_middleware(mut self, middleware: impl Into<Middleware>) -> Self {
        self.middlewares.push(middleware.into());
        self
    }
}

/// Serializable form of [`Options`], as read from a JSON config file.
///
/// ```json
/// { "alias": true, "map": true, "flatten": true, "flattenDepth": "shallow", "middlewares": ["upper"] }
/// ```
///
/// Every field is optional. Middlewares can only be given by name here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OptionsConfig {
    pub alias: bool,
    pub map: bool,
    pub flatten: bool,
    pub flatten_depth: FlattenDepth,
    pub middlewares: Vec<String>,
}

impl From<OptionsConfig> for Options {
    fn from(config: OptionsConfig) -> Self {
        let mut stages = StageFlags::empty();
        stages.set(StageFlags::ALIAS, config.alias);
        stages.set(StageFlags::MAP, config.map);
        stages.set(StageFlags::FLATTEN, config.flatten);

        Options {
            stages,
            flatten_depth: config.flatten_depth,
            middlewares: config.middlewares.into_iter().map(Middleware::Named).collect(),
        }
    }
}

/// Resolve a single key without keeping the resolver around.
pub fn resolve(dictionary: &Dictionary, key: &str, options: Options) -> Result<Resolution, Error> {
    Resolver::new(dictionary, options)?.lookup(key)
}

/// Resolve every key of `dictionary` and keep only the values.
///
/// Keys come out in the dictionary's insertion order. Keys that resolve to
/// nothing are left out, the same way a JSON encoder drops an undefined
/// property.
///
/// ```
/// use serde_json::json;
/// use value_mappr::{Options, map_all};
///
/// let dictionary = json!({ "a": "b", "b": 1, "c": "nope" });
/// let mapped = map_all(dictionary.as_object().unwrap(), Options::new().with_alias()).unwrap();
///
/// assert_eq!(serde_json::Value::Object(mapped), json!({ "a": 1, "b": 1 }));
/// ```
pub fn map_all(dictionary: &Dictionary, options: Options) -> Result<Dictionary, Error> {
    let resolver = Resolver::new(dictionary, options)?;
    let mut out = Dictionary::new();
    for key in dictionary.keys() {
        if let Some(value) = resolver.lookup(key)?.value {
            out.insert(key.clone(), value);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dictionary(value: serde_json::Value) -> Dictionary {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn config_parses_camel_case() {
        let config: OptionsConfig = serde_json::from_value(json!({
            "alias": true,
            "flattenDepth": "shallow",
            "middlewares": ["flatten"]
        }))
        .unwrap();

        assert_eq!(
            config,
            OptionsConfig {
                alias: true,
                map: false,
                flatten: false,
                flatten_depth: FlattenDepth::Shallow,
                middlewares: vec!["flatten".into()],
            }
        );

        let options = Options::from(config);
        assert_eq!(options.stages, StageFlags::ALIAS);
        assert_eq!(options.flatten_depth, FlattenDepth::Shallow);
        assert!(matches!(options.middlewares.as_slice(), [Middleware::Named(name)] if name == "flatten"));
    }

    #[test]
    fn config_defaults_to_nothing_enabled() {
        let config: OptionsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, OptionsConfig::default());
        assert!(Options::from(config).stages.is_empty());
    }

    #[test]
    fn config_rejects_unknown_fields() {
        assert!(serde_json::from_str::<OptionsConfig>(r#"{ "alais": true }"#).is_err());
    }

    #[test]
    fn map_all_keeps_insertion_order() {
        let dict = dictionary(json!({ "z": "y", "y": 1, "m": ["z", "y"], "a": [[1], [2]] }));
        let mapped = map_all(&dict, Options::all()).unwrap();

        let keys: Vec<&String> = mapped.keys().collect();
        assert_eq!(keys, vec!["z", "y", "m", "a"]);
        assert_eq!(serde_json::Value::Object(mapped), json!({ "z": 1, "y": 1, "m": [1, 1], "a": [1, 2] }));
    }

    #[test]
    fn map_all_surfaces_configuration_errors() {
        let dict = dictionary(json!({ "a": 1 }));
        let err = map_all(&dict, Options::new().with_middleware("api_test_missing")).unwrap_err();
        assert_eq!(err, Error::UnknownStage("api_test_missing".into()));
    }

    #[test]
    fn resolve_is_a_one_shot_lookup() {
        let dict = dictionary(json!({ "a": "b", "b": true }));
        let res = resolve(&dict, "a", Options::new().with_alias()).unwrap();
        assert_eq!(res.value, Some(json!(true)));
        assert_eq!(res.aliases_used, vec!["a", "b"]);
    }
}
