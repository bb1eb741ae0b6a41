//! 导出循环模块
//!
//! 把可信数据整形为输出映射：解析角色谓词、逐字段调用导出转换器、
//! 按有效导出级别过滤空值，最后按声明的输出顺序重排

use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::field_types::{ExportLevel, FieldDefinition};
use crate::schema::meta::Schema;
use crate::transform::context::Context;
use crate::transform::role::Role;
use crate::types::{DataMap, DataValue};

/// 对单个模式执行导出循环
pub(crate) fn export_loop(
    schema: &Arc<Schema>,
    instance: &DataValue,
    context: &Context,
) -> SchemaResult<DataMap> {
    let source = match instance {
        DataValue::Object(map) => map,
        DataValue::Model { data, .. } => data,
        other => {
            return Err(SchemaError::conversion(
                &schema.name,
                format!("模型导出需要映射或模型实例，收到: {}", other.type_name()),
            ));
        }
    };

    let gottago = resolve_role(schema, context)?;
    let mut output = DataMap::new();

    for (field_name, field) in &schema.fields {
        let value = source
            .get(field_name)
            .cloned()
            .unwrap_or(DataValue::Undefined);
        export_field(schema, field_name, field, value, &gottago, context, &mut output)?;
    }
    // 计算字段的值不来自存储数据，通过访问器即时求值
    for (name, serializable) in &schema.serializables {
        let value = serializable.resolve(source);
        export_field(
            schema,
            name,
            &serializable.field,
            value,
            &gottago,
            context,
            &mut output,
        )?;
    }

    if let Some(order) = &schema.field_order {
        reorder(&mut output, order);
    }

    Ok(output)
}

/// 解析本次导出生效的角色谓词
///
/// 请求的角色未定义时报错；关闭报错后回退到"default"角色或全保留
fn resolve_role(schema: &Arc<Schema>, context: &Context) -> SchemaResult<Role> {
    match &context.role {
        Some(name) => {
            if let Some(role) = schema.role(name) {
                Ok(role.clone())
            } else if context.raise_error_on_role {
                Err(SchemaError::RoleError {
                    schema: schema.name.clone(),
                    role: name.clone(),
                })
            } else {
                Ok(default_role(schema))
            }
        }
        None => Ok(default_role(schema)),
    }
}

fn default_role(schema: &Arc<Schema>) -> Role {
    schema.role("default").cloned().unwrap_or_else(Role::wholelist)
}

/// 导出单个字段
#[allow(clippy::too_many_arguments)]
fn export_field(
    schema: &Arc<Schema>,
    field_name: &str,
    field: &FieldDefinition,
    value: DataValue,
    gottago: &Role,
    context: &Context,
    output: &mut DataMap,
) -> SchemaResult<()> {
    if gottago.rejects(field_name) {
        return Ok(());
    }
    let level = field.effective_export_level(context.export_level);
    if level == ExportLevel::Drop {
        return Ok(());
    }

    let serialized_name = field.serialized_name.as_deref().unwrap_or(field_name);
    let converted = if !value.is_null() && !value.is_undefined() {
        context
            .field_converter
            .run(field, serialized_name, &value, schema, context)?
    } else {
        value
    };

    if let Some(final_value) = filter_by_level(field, level, converted) {
        output.insert(serialized_name.to_string(), final_value);
    }
    Ok(())
}

/// 级别过滤：未定义、null、空复合值各有自己的门槛，被过滤时返回None；
/// 幸存的未定义归一为null
pub(crate) fn filter_by_level(
    field: &FieldDefinition,
    level: ExportLevel,
    value: DataValue,
) -> Option<DataValue> {
    if level == ExportLevel::Drop {
        return None;
    }
    match &value {
        DataValue::Undefined => {
            if level <= ExportLevel::Default {
                None
            } else {
                Some(DataValue::Null)
            }
        }
        DataValue::Null => {
            if level <= ExportLevel::NotNone {
                None
            } else {
                Some(DataValue::Null)
            }
        }
        other => {
            if field.is_compound()
                && other.compound_len() == Some(0)
                && level <= ExportLevel::Nonempty
            {
                None
            } else {
                Some(value)
            }
        }
    }
}

/// 按声明的输出顺序重排
///
/// 未列出的键视作位置-1，稳定排序后整体排在最前且保持相对顺序
fn reorder(output: &mut DataMap, order: &[String]) {
    let mut pairs: Vec<(String, DataValue)> = std::mem::take(output).into_iter().collect();
    pairs.sort_by_key(|(key, _)| {
        order
            .iter()
            .position(|name| name == key)
            .map(|index| index as i64)
            .unwrap_or(-1)
    });
    *output = pairs.into_iter().collect();
}
