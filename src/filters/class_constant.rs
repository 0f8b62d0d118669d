//! `class_constant`: render a string as a `Name::class` constant.
use super::Filter;
use crate::php::PhpValue;

/// Turns `'App\Kernel'` into `App\Kernel::class`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassConstant;

impl Filter for ClassConstant {
    fn name(&self) -> &'static str {
        "class_constant"
    }

    fn apply(&self, rendered: String, original: &PhpValue) -> String {
        match original {
            PhpValue::String(name) => format!("{name}::class"),
            _ => rendered,
        }
    }
}
