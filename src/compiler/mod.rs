//! 编译模块：将指纹库编译为可执行的正则模式
pub mod pattern;
pub mod compiler;

pub use self::pattern::{CompiledCatalog, CompiledTechnology, HeaderRule, ValueMatcher};
pub use self::compiler::CatalogCompiler;
