use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// The subset of `swift package dump-package` output webber cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwiftPackage {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub targets: Option<Vec<Target>>,
    #[serde(default)]
    pub dependencies: Option<Vec<DependencyGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub name: String,
    /// Product kind tags, e.g. `{"executable": null}` or `{"library": ["automatic"]}`.
    #[serde(rename = "type", default)]
    pub kind: Option<HashMap<String, Value>>,
}

impl Product {
    pub fn is_executable(&self) -> bool {
        self.kind
            .as_ref()
            .is_some_and(|kind| kind.contains_key("executable"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub resources: Option<Vec<Resource>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub path: String,
    pub rule: ResourceRule,
    #[serde(default)]
    pub localization: Option<Localization>,
}

/// Either a bare `"copy"` / `"process"` or a keyed object such as
/// `{"process": {"localization": "base"}}`. Any object without a `process`
/// key counts as `copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRule {
    Process,
    Copy,
}

impl<'de> Deserialize<'de> for ResourceRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRule {
            Name(String),
            Keyed(HashMap<String, Value>),
        }

        match RawRule::deserialize(deserializer)? {
            RawRule::Name(name) => match name.as_str() {
                "process" => Ok(ResourceRule::Process),
                "copy" => Ok(ResourceRule::Copy),
                other => Err(serde::de::Error::unknown_variant(other, &["process", "copy"])),
            },
            RawRule::Keyed(map) if map.contains_key("process") => Ok(ResourceRule::Process),
            RawRule::Keyed(_) => Ok(ResourceRule::Copy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Localization {
    Default,
    Base,
}

/// One entry of the `dependencies` array. Remote packages are listed under
/// `scm`, path-based ones under `fileSystem` (newer toolchains).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyGroup {
    #[serde(default)]
    pub scm: Option<Vec<Dependency>>,
    #[serde(rename = "fileSystem", default)]
    pub file_system: Option<Vec<Dependency>>,
}

impl DependencyGroup {
    pub fn all(&self) -> impl Iterator<Item = Dependency> + '_ {
        let scm = self.scm.iter().flatten().cloned();
        let file_system = self.file_system.iter().flatten().cloned().map(|mut dep| {
            dep.local = true;
            dep
        });
        scm.chain(file_system)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub identity: String,
    pub local: bool,
    pub url: Option<String>,
}

impl<'de> Deserialize<'de> for Dependency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawDependency {
            identity: String,
            #[serde(default)]
            requirement: Option<HashMap<String, Value>>,
            #[serde(default)]
            location: Option<Value>,
            #[serde(default)]
            path: Option<String>,
        }

        let raw = RawDependency::deserialize(deserializer)?;
        let local = raw
            .requirement
            .as_ref()
            .is_some_and(|req| req.contains_key("localPackage"));
        let url = match raw.location {
            Some(Value::String(location)) => Some(location),
            _ => raw.path,
        };
        Ok(Dependency {
            identity: raw.identity,
            local,
            url,
        })
    }
}

impl SwiftPackage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn executable_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().flatten().filter(|p| p.is_executable())
    }

    pub fn has_executable_product(&self, name: &str) -> bool {
        self.executable_products().any(|p| p.name == name)
    }

    /// First executable product that is not `excluding`.
    pub fn executable_name(&self, excluding: Option<&str>) -> Option<&str> {
        self.executable_products()
            .find(|p| Some(p.name.as_str()) != excluding)
            .map(|p| p.name.as_str())
    }

    /// `Sources` directories of local dependencies referenced by absolute location.
    pub fn local_dependency_sources(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .flatten()
            .flat_map(|group| group.all())
            .filter(|dep| dep.local)
            .filter_map(|dep| dep.url)
            .filter(|url| !url.starts_with("../") && !url.starts_with("./"))
            .map(|url| format!("{}/Sources", url))
            .collect()
    }
}
