//! Named value transforms applied while serializing PHP arrays.
pub mod class_constant;
pub mod single_line_array;

use crate::error::MergeError;
use crate::logging::Log;
use crate::php::PhpValue;

pub use class_constant::ClassConstant;
pub use single_line_array::SingleLineArray;

/// A stateless transform of a rendered literal.
///
/// `rendered` is the literal produced so far (possibly by earlier filters);
/// `original` is the value it was rendered from.
pub trait Filter: Send + Sync {
    /// Name used in recipes.
    fn name(&self) -> &'static str;

    /// Transform `rendered`.
    fn apply(&self, rendered: String, original: &PhpValue) -> String;
}

/// Name-to-filter lookup.
pub struct FilterRegistry {
    filters: Vec<Box<dyn Filter>>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterRegistry {
    /// Registry holding every built-in filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: vec![Box::new(ClassConstant), Box::new(SingleLineArray)],
        }
    }

    /// Return `true` if a filter named `name` is registered.
    #[must_use]
    pub fn supports(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Look up a filter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(AsRef::as_ref)
    }

    /// Run `names` in order over `rendered`.
    ///
    /// Unknown names are reported through `log` and skipped; the value
    /// passes through them unchanged.
    pub fn apply_all(
        &self,
        names: &[String],
        rendered: String,
        original: &PhpValue,
        package: &str,
        log: &dyn Log,
    ) -> String {
        names.iter().fold(rendered, |value, name| {
            if let Some(filter) = self.get(name) {
                filter.apply(value, original)
            } else {
                let err = MergeError::UnknownFilter {
                    package: package.to_string(),
                    filter: name.clone(),
                };
                log.warn(&err.to_string());
                value
            }
        })
    }
}
