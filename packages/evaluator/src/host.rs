//! Collaborators supplied by the host CMS.
//!
//! The renderer never talks to storage, users or the shortcode engine
//! directly. Everything it needs from the outside world comes through these
//! traits; the in-memory implementations below back the tests and any host
//! that can hand its data over up front.

use crate::shortcodes::ShortcodeRegistry;
use crate::value::{Map, Value};
use etch_common::{AssetLoader, Block, MemoryAssetLoader};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::rc::Rc;

/// Request state: the current post, site, user and stored options
pub trait Environment {
    fn current_post(&self) -> Value;
    fn site(&self) -> Value;
    fn current_user(&self) -> Value;
    fn url(&self) -> Value;
    /// Values exposed to templates as `options.*`
    fn options(&self) -> Value;
    /// A raw stored option, looked up by option name
    fn option(&self, name: &str) -> Option<Value>;
}

/// A reusable block pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: String,
    pub post_type: String,
    pub blocks: Vec<Block>,
    /// Raw property definitions stored alongside the pattern
    pub properties: Vec<Json>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id: id.into(),
            post_type: "wp_block".to_string(),
            blocks,
            properties: Vec::new(),
        }
    }

    pub fn with_properties(mut self, properties: Json) -> Self {
        self.properties = match properties {
            Json::Array(items) => items,
            _ => Vec::new(),
        };
        self
    }

    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = post_type.into();
        self
    }
}

pub trait PatternStore {
    fn find_pattern(&self, id: &str) -> Option<Rc<Pattern>>;
}

/// Query backends for loop presets
pub trait DataSource {
    fn query_posts(&self, args: &Value) -> Vec<Value>;
    fn query_users(&self, args: &Value) -> Vec<Value>;
    fn query_terms(&self, args: &Value) -> Vec<Value>;
}

pub trait ShortcodeEngine {
    fn do_shortcode(&self, content: &str) -> String;
}

pub trait HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Environment with fixed values
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    post: Value,
    site: Value,
    user: Value,
    url: Value,
    options: Value,
    stored: HashMap<String, Value>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, post: Json) -> Self {
        self.post = Value::from(post);
        self
    }

    pub fn with_site(mut self, site: Json) -> Self {
        self.site = Value::from(site);
        self
    }

    pub fn with_user(mut self, user: Json) -> Self {
        self.user = Value::from(user);
        self
    }

    pub fn with_url(mut self, url: Json) -> Self {
        self.url = Value::from(url);
        self
    }

    pub fn with_options(mut self, options: Json) -> Self {
        self.options = Value::from(options);
        self
    }

    /// Store a raw option, e.g. the loop preset table
    pub fn with_option(mut self, name: impl Into<String>, value: Json) -> Self {
        self.stored.insert(name.into(), Value::from(value));
        self
    }
}

impl Environment for StaticEnvironment {
    fn current_post(&self) -> Value {
        self.post.clone()
    }

    fn site(&self) -> Value {
        self.site.clone()
    }

    fn current_user(&self) -> Value {
        self.user.clone()
    }

    fn url(&self) -> Value {
        self.url.clone()
    }

    fn options(&self) -> Value {
        self.options.clone()
    }

    fn option(&self, name: &str) -> Option<Value> {
        self.stored.get(name).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPatternStore {
    patterns: HashMap<String, Rc<Pattern>>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pattern(&mut self, pattern: Pattern) {
        self.patterns.insert(pattern.id.clone(), Rc::new(pattern));
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.add_pattern(pattern);
        self
    }
}

impl PatternStore for MemoryPatternStore {
    fn find_pattern(&self, id: &str) -> Option<Rc<Pattern>> {
        self.patterns.get(id).cloned()
    }
}

/// Posts, users and terms held in memory.
///
/// Honors the common query arguments: `post_type` (string, list or `any`),
/// `posts_per_page` (`-1` for all), `offset`, `role`, `taxonomy` and
/// `number`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSource {
    pub posts: Vec<Value>,
    pub users: Vec<Value>,
    pub terms: Vec<Value>,
}

const DEFAULT_POSTS_PER_PAGE: usize = 10;

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, posts: Json) -> Self {
        self.posts = json_list(posts);
        self
    }

    pub fn with_users(mut self, users: Json) -> Self {
        self.users = json_list(users);
        self
    }

    pub fn with_terms(mut self, terms: Json) -> Self {
        self.terms = json_list(terms);
        self
    }
}

fn json_list(value: Json) -> Vec<Value> {
    match Value::from(value) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Apply `offset` then a limit; negative or missing limits take everything
fn paginate(items: Vec<Value>, args: &Value, limit_key: &str, default_limit: Option<usize>) -> Vec<Value> {
    let offset = args
        .get("offset")
        .and_then(Value::as_number)
        .map(|n| n.max(0.0) as usize)
        .unwrap_or(0);
    let limit = match args.get(limit_key).and_then(Value::as_number) {
        Some(n) if n < 0.0 => None,
        Some(n) => Some(n as usize),
        None => default_limit,
    };

    let skipped = items.into_iter().skip(offset);
    match limit {
        Some(limit) => skipped.take(limit).collect(),
        None => skipped.collect(),
    }
}

/// Whether `field` of `item` matches a filter that may be a string or a list
fn field_matches(item: &Value, field: &str, filter: &Value, fallback: &str) -> bool {
    let actual = item
        .get(field)
        .map(Value::to_string)
        .unwrap_or_else(|| fallback.to_string());
    match filter {
        Value::Array(options) => options.iter().any(|option| option.to_string() == actual),
        other => other.to_string() == actual,
    }
}

impl DataSource for MemoryDataSource {
    fn query_posts(&self, args: &Value) -> Vec<Value> {
        let post_type = args.get("post_type").cloned().unwrap_or_else(|| Value::string("post"));
        let matching = self
            .posts
            .iter()
            .filter(|post| {
                post_type.as_str() == Some("any")
                    || field_matches(post, "post_type", &post_type, "post")
            })
            .cloned()
            .collect();
        paginate(matching, args, "posts_per_page", Some(DEFAULT_POSTS_PER_PAGE))
    }

    fn query_users(&self, args: &Value) -> Vec<Value> {
        let role = args.get("role").filter(|role| !role.is_empty());
        let matching = self
            .users
            .iter()
            .filter(|user| match role {
                Some(role) => {
                    let wanted = role.to_string();
                    match user.get("roles") {
                        Some(Value::Array(roles)) => roles.iter().any(|r| r.to_string() == wanted),
                        _ => field_matches(user, "role", role, ""),
                    }
                }
                None => true,
            })
            .cloned()
            .collect();
        paginate(matching, args, "number", None)
    }

    fn query_terms(&self, args: &Value) -> Vec<Value> {
        let taxonomy = args.get("taxonomy").filter(|taxonomy| !taxonomy.is_empty());
        let matching = self
            .terms
            .iter()
            .filter(|term| match taxonomy {
                Some(taxonomy) => field_matches(term, "taxonomy", taxonomy, ""),
                None => true,
            })
            .cloned()
            .collect();
        paginate(matching, args, "number", None)
    }
}

/// Every collaborator the renderer consumes
pub struct Host {
    pub environment: Box<dyn Environment>,
    pub patterns: Box<dyn PatternStore>,
    pub data: Box<dyn DataSource>,
    pub shortcodes: Box<dyn ShortcodeEngine>,
    /// When unset the renderer builds an allow-list sanitizer from its config
    pub sanitizer: Option<Box<dyn HtmlSanitizer>>,
    pub assets: Box<dyn AssetLoader>,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }
}

impl Default for Host {
    fn default() -> Self {
        HostBuilder::default().build()
    }
}

#[derive(Default)]
pub struct HostBuilder {
    environment: Option<Box<dyn Environment>>,
    patterns: Option<Box<dyn PatternStore>>,
    data: Option<Box<dyn DataSource>>,
    shortcodes: Option<Box<dyn ShortcodeEngine>>,
    sanitizer: Option<Box<dyn HtmlSanitizer>>,
    assets: Option<Box<dyn AssetLoader>>,
}

impl HostBuilder {
    pub fn environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Box::new(environment));
        self
    }

    pub fn patterns(mut self, patterns: impl PatternStore + 'static) -> Self {
        self.patterns = Some(Box::new(patterns));
        self
    }

    pub fn data(mut self, data: impl DataSource + 'static) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    pub fn shortcodes(mut self, shortcodes: impl ShortcodeEngine + 'static) -> Self {
        self.shortcodes = Some(Box::new(shortcodes));
        self
    }

    pub fn sanitizer(mut self, sanitizer: impl HtmlSanitizer + 'static) -> Self {
        self.sanitizer = Some(Box::new(sanitizer));
        self
    }

    pub fn assets(mut self, assets: impl AssetLoader + 'static) -> Self {
        self.assets = Some(Box::new(assets));
        self
    }

    pub fn build(self) -> Host {
        Host {
            environment: self
                .environment
                .unwrap_or_else(|| Box::new(StaticEnvironment::new())),
            patterns: self
                .patterns
                .unwrap_or_else(|| Box::new(MemoryPatternStore::new())),
            data: self.data.unwrap_or_else(|| Box::new(MemoryDataSource::new())),
            shortcodes: self
                .shortcodes
                .unwrap_or_else(|| Box::new(ShortcodeRegistry::new())),
            sanitizer: self.sanitizer,
            assets: self.assets.unwrap_or_else(|| Box::new(MemoryAssetLoader::new())),
        }
    }
}

/// Global namespaces as one object, keyed by namespace
pub(crate) fn global_namespaces(environment: &dyn Environment) -> Map {
    let mut globals = Map::new();
    globals.insert("this".to_string(), environment.current_post());
    globals.insert("site".to_string(), environment.site());
    globals.insert("user".to_string(), environment.current_user());
    globals.insert("url".to_string(), environment.url());
    globals.insert("options".to_string(), environment.options());
    globals
}
