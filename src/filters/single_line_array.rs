//! `single_line_array`: render a nested array on one line.
use super::Filter;
use crate::php::{PhpValue, export_inline};

/// Turns a multi-line array literal into `['dev' => true, 'test' => true]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLineArray;

impl Filter for SingleLineArray {
    fn name(&self) -> &'static str {
        "single_line_array"
    }

    fn apply(&self, rendered: String, original: &PhpValue) -> String {
        match original {
            PhpValue::Array(_) => export_inline(original),
            _ => rendered,
        }
    }
}
