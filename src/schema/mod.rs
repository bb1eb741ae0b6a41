//! 模式定义系统模块
//!
//! 提供字段类型、模式构建、全局注册表和便捷构造函数

pub mod convenience;
pub mod field_types;
pub mod meta;
pub mod registry;

// 重新导出核心类型
pub use convenience::*;
pub use field_types::{ClaimFunction, ExportLevel, FieldDefinition, FieldType};
pub use meta::{PolymorphicClaimHook, Schema, SchemaBuilder, Serializable, SerializableAccessor};
pub use registry::{
    get_schema, is_subclass, register_schema, register_schema_with_parent, subclasses_of,
};
