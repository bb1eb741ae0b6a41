//! 数据转换引擎模块
//!
//! 对外暴露导入（convert/validate）、导出（to_native/to_dict/to_primitive）
//! 和扁平化（flatten/expand）入口；内部由导入/导出循环驱动，
//! 上下文携带激活的字段转换器沿递归链传递

pub mod compound;
pub mod context;
pub mod converters;
pub mod export_loop;
pub mod flatten;
pub mod import_loop;
pub mod role;

use std::sync::Arc;

use rat_logger::debug;

use crate::error::SchemaResult;
use crate::schema::meta::Schema;
use crate::types::{DataMap, DataValue};

pub use context::{Context, ExportOptions, FieldMapping, ImportOptions};
pub use converters::{ExportFormat, FieldConverter};
pub use flatten::{expand, flatten, flatten_to_dict, EMPTY_DICT, EMPTY_LIST};
pub use role::{Role, RoleKind};

/// 把不可信的输入映射转换为可信数据
///
/// 只做类型强制，不执行业务规则验证；输入为null时视为无输入，
/// 仅按选项铺默认值和初始值
pub fn convert(
    schema: &Arc<Schema>,
    input: &DataValue,
    options: ImportOptions,
) -> SchemaResult<DataMap> {
    debug!("导入模式: {}, 严格模式={}", schema.name, options.strict);
    let context = Context::for_import(FieldConverter::Import { validate: false }, &options);
    import_loop::import_with_trusted(schema, input, options.trusted_data.as_ref(), &context)
}

/// 转换并验证输入映射
///
/// 在类型强制之后追加各字段的业务规则验证
pub fn validate(
    schema: &Arc<Schema>,
    input: &DataValue,
    options: ImportOptions,
) -> SchemaResult<DataMap> {
    debug!("验证模式: {}", schema.name);
    let context = Context::for_import(FieldConverter::Import { validate: true }, &options);
    import_loop::import_with_trusted(schema, input, options.trusted_data.as_ref(), &context)
}

/// 导出为保留内部类型的映射（日期、UUID、嵌套实例保持原样）
pub fn to_native(
    schema: &Arc<Schema>,
    instance: &DataValue,
    options: ExportOptions,
) -> SchemaResult<DataMap> {
    let context = Context::for_export(
        FieldConverter::Export {
            format: ExportFormat::Native,
            model_exception: false,
        },
        &options,
    );
    export_loop::export_loop(schema, instance, &context)
}

/// 导出为普通映射
///
/// 标量保持内部类型，嵌套模型降级为普通映射
pub fn to_dict(
    schema: &Arc<Schema>,
    instance: &DataValue,
    options: ExportOptions,
) -> SchemaResult<DataMap> {
    let context = Context::for_export(
        FieldConverter::Export {
            format: ExportFormat::Native,
            model_exception: true,
        },
        &options,
    );
    export_loop::export_loop(schema, instance, &context)
}

/// 导出为可直接序列化的基元映射
pub fn to_primitive(
    schema: &Arc<Schema>,
    instance: &DataValue,
    options: ExportOptions,
) -> SchemaResult<DataMap> {
    debug!("导出模式: {}, 角色={:?}", schema.name, options.role);
    let context = Context::for_export(
        FieldConverter::Export {
            format: ExportFormat::Primitive,
            model_exception: false,
        },
        &options,
    );
    export_loop::export_loop(schema, instance, &context)
}
