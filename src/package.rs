//! Search packages
//!
//! A package is a named set of search resources, each described by a URL
//! template taken from its OpenSearch description. Rendering a package for
//! a query expands every template against a single parameter (by default
//! `searchTerms`) holding the user's query.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::encoding::Encoder;
use crate::error::Result;
use crate::expander::Expander;
use crate::params::Params;

fn default_query_param() -> String {
    "searchTerms".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// URL template, e.g. `http://example.org/search?q={searchTerms}`
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Variable the query is bound to
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// A resource with its template expanded for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryLink {
    pub name: String,
    pub description: Option<String>,
    pub query_uri: String,
    /// Whether `query_uri` parses as an absolute URL
    pub is_absolute: bool,
}

impl Package {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Expand every resource template with the query bound to `query_param`
    #[instrument(skip(self, expander), fields(package = %self.name))]
    pub fn query_links<E: Encoder>(&self, expander: &Expander<E>, query: &str) -> Result<Vec<QueryLink>> {
        let params = Params::new().with(self.query_param.as_str(), query);

        self.resources
            .iter()
            .map(|resource| -> Result<QueryLink> {
                let query_uri = expander.expand(&resource.template, &params)?;
                let is_absolute = url::Url::parse(&query_uri).is_ok();
                if !is_absolute {
                    warn!(
                        resource = %resource.name,
                        uri = %query_uri,
                        "expanded template is not an absolute URL"
                    );
                }
                Ok(QueryLink {
                    name: resource.name.clone(),
                    description: resource.description.clone(),
                    query_uri,
                    is_absolute,
                })
            })
            .collect()
    }
}
