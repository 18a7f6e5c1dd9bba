//! Rule table: ordered mapping from input pattern to transform chain.
//!
//! Rules are evaluated in declaration order and only the first matching
//! rule's chain applies. Inputs matching no rule pass through untouched.

use crate::plan::{Pattern, PlanError};
use crate::profile::BuildProfile;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Loader id of the style extraction stage.
pub const EXTRACT_LOADER: &str = "extract-styles";
/// Loader id of the cascade transform stage.
pub const CSS_LOADER: &str = "css-loader";
/// Loader id of the style preprocessor stage.
pub const SASS_LOADER: &str = "sass-loader";
/// Loader id of the script compiler.
pub const BABEL_LOADER: &str = "babel-loader";
/// Loader id of the file copier.
pub const FILE_LOADER: &str = "file-loader";

/// Opaque reference to an external transform plus its per-stage options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRef {
    /// Identifier resolved by the engine's registry
    pub loader: String,
    /// Stage configuration, empty when the stage takes none
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl TransformRef {
    /// A transform with no options.
    pub fn new(loader: &str) -> Self {
        Self { loader: loader.to_string(), options: BTreeMap::new() }
    }

    /// Add an option.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Look up an option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// What family of inputs a rule handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Script,
    Image,
    Font,
    Style,
}

/// One entry in the rule table.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub kind: RuleKind,
    #[serde(rename = "test")]
    pub pattern: Pattern,
    #[serde(rename = "use")]
    pub chain: Vec<TransformRef>,
}

impl Rule {
    fn new(kind: RuleKind, pattern: &str, chain: Vec<TransformRef>) -> Result<Self, PlanError> {
        Ok(Self { kind, pattern: Pattern::new(pattern)?, chain })
    }

    /// Whether this rule applies to an input identifier.
    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }
}

/// Ordered rules for one profile.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// All rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The first rule matching `input`, if any.
    pub fn rule_for(&self, input: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(input))
    }

    /// The transform chain for `input`.
    ///
    /// `None` means the input passes through unmodified.
    pub fn chain_for(&self, input: &str) -> Option<&[TransformRef]> {
        self.rule_for(input).map(|r| r.chain.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Style chain: extraction, cascade transform, preprocessor. The order is
/// fixed; only the extraction stage's hot-replacement flag follows the profile.
pub fn style_chain(profile: BuildProfile) -> Vec<TransformRef> {
    vec![
        TransformRef::new(EXTRACT_LOADER).with_option("hot", !profile.is_production()),
        TransformRef::new(CSS_LOADER).with_option("sourceMap", true),
        TransformRef::new(SASS_LOADER),
    ]
}

/// Build the rule table for a profile.
pub fn build_rules(profile: BuildProfile) -> Result<RuleTable, PlanError> {
    let rules = vec![
        Rule::new(RuleKind::Script, r"\.es6$", vec![TransformRef::new(BABEL_LOADER)])?,
        Rule::new(RuleKind::Script, r"\.jsx$", vec![TransformRef::new(BABEL_LOADER)])?,
        Rule::new(RuleKind::Image, r"(?i)\.(jpe?g|png|gif)$", vec![TransformRef::new(FILE_LOADER)])?,
        Rule::new(
            RuleKind::Font,
            r"\.(woff|woff2|ttf|eot|svg|otf)($|\?)",
            vec![TransformRef::new(FILE_LOADER)],
        )?,
        Rule::new(RuleKind::Style, r"\.(sass|scss|css)$", style_chain(profile))?,
    ];
    Ok(RuleTable { rules })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaders(chain: &[TransformRef]) -> Vec<&str> {
        chain.iter().map(|t| t.loader.as_str()).collect()
    }

    #[test]
    fn test_rule_order() {
        let table = build_rules(BuildProfile::Development).expect("rules should build");
        let kinds: Vec<RuleKind> = table.rules().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RuleKind::Script, RuleKind::Script, RuleKind::Image, RuleKind::Font, RuleKind::Style]
        );
    }

    #[test]
    fn test_script_inputs() {
        let table = build_rules(BuildProfile::Development).expect("rules should build");
        assert_eq!(loaders(table.chain_for("src/app.es6").expect("chain should exist")), vec![BABEL_LOADER]);
        assert_eq!(loaders(table.chain_for("src/view.jsx").expect("chain should exist")), vec![BABEL_LOADER]);
    }

    #[test]
    fn test_image_inputs_case_insensitive() {
        let table = build_rules(BuildProfile::Production).expect("rules should build");
        for input in ["a.jpg", "a.jpeg", "a.PNG", "a.Gif"] {
            assert_eq!(loaders(table.chain_for(input).expect("chain should exist")), vec![FILE_LOADER], "{}", input);
        }
    }

    #[test]
    fn test_font_inputs_with_query() {
        let table = build_rules(BuildProfile::Development).expect("rules should build");
        for input in ["f.woff", "f.woff2", "f.ttf?v=4.7.0", "icons.svg", "f.eot?#iefix", "f.otf"] {
            let rule = table.rule_for(input).expect("a rule should match");
            assert_eq!(rule.kind, RuleKind::Font, "{}", input);
        }
    }

    #[test]
    fn test_style_chain_order_both_profiles() {
        for profile in [BuildProfile::Development, BuildProfile::Production] {
            let table = build_rules(profile).expect("rules should build");
            for input in ["a.css", "a.scss", "a.sass"] {
                let chain = table.chain_for(input).expect("chain should exist");
                assert_eq!(loaders(chain), vec![EXTRACT_LOADER, CSS_LOADER, SASS_LOADER]);
            }
        }
    }

    #[test]
    fn test_style_extraction_hot_only_in_development() {
        let dev = build_rules(BuildProfile::Development).expect("rules should build");
        let prod = build_rules(BuildProfile::Production).expect("rules should build");
        assert_eq!(dev.chain_for("a.css").expect("chain should exist")[0].option("hot"), Some(&Value::Bool(true)));
        assert_eq!(prod.chain_for("a.css").expect("chain should exist")[0].option("hot"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_css_loader_source_maps() {
        let table = build_rules(BuildProfile::Production).expect("rules should build");
        let chain = table.chain_for("a.scss").expect("chain should exist");
        assert_eq!(chain[1].option("sourceMap"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_non_style_chains_profile_invariant() {
        let dev = build_rules(BuildProfile::Development).expect("rules should build");
        let prod = build_rules(BuildProfile::Production).expect("rules should build");
        for input in ["a.es6", "a.jsx", "a.png", "a.woff"] {
            assert_eq!(dev.chain_for(input), prod.chain_for(input), "{}", input);
        }
    }

    #[test]
    fn test_unmatched_input_passes_through() {
        let table = build_rules(BuildProfile::Development).expect("rules should build");
        assert!(table.chain_for("src/index.js").is_none());
        assert!(table.chain_for("README.md").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = build_rules(BuildProfile::Development).expect("rules should build");
        let rule = table.rule_for("legacy.jsx.es6").expect("a rule should match");
        assert_eq!(rule.pattern.as_str(), r"\.es6$");
        assert_eq!(table.rule_for("logo.svg").expect("a rule should match").kind, RuleKind::Font);
    }
}
