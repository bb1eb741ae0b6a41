//! rat_schema - 模式驱动的数据转换引擎
//!
//! 提供统一的导入/导出管线：不可信输入按模式整形为可信数据，
//! 可信数据按角色与导出级别整形为输出映射，支持嵌套与多态模型

// 导出所有公共模块
pub mod error;
pub mod schema;
pub mod transform;
pub mod types;

// 重新导出常用类型和函数
pub use error::{SchemaError, SchemaResult};
pub use types::{json_value_to_data_value, DataMap, DataValue, OrderedMap};
pub use schema::{
    boolean_field, datetime_field, dict_field, float_field, integer_field, json_field, list_field,
    model_field, poly_model_field, poly_model_field_with_claim, string_field, uuid_field,
};
pub use schema::{
    get_schema, is_subclass, register_schema, register_schema_with_parent, subclasses_of,
    ClaimFunction, ExportLevel, FieldDefinition, FieldType, PolymorphicClaimHook, Schema,
    SchemaBuilder, Serializable, SerializableAccessor,
};
pub use transform::{
    convert, expand, flatten, flatten_to_dict, to_dict, to_native, to_primitive, validate,
    Context, ExportFormat, ExportOptions, FieldConverter, FieldMapping, ImportOptions, Role,
    RoleKind, EMPTY_DICT, EMPTY_LIST,
};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
