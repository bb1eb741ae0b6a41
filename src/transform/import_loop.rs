//! 导入循环模块
//!
//! 把不可信的输入映射按模式整形为可信数据：别名扫描取值、默认值填充、
//! 字段转换与验证、严格模式的未声明键检查，字段错误逐个聚合后整体上报

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::meta::Schema;
use crate::transform::context::Context;
use crate::types::{DataMap, DataValue};

/// 对单个模式执行导入循环
pub(crate) fn import_loop(
    schema: &Arc<Schema>,
    input: &DataValue,
    context: &Context,
) -> SchemaResult<DataMap> {
    import_with_trusted(schema, input, None, context)
}

/// 带可信底座的导入循环
///
/// trusted中已有的字段在输入未提供时原样保留，不被默认值覆盖
pub(crate) fn import_with_trusted(
    schema: &Arc<Schema>,
    input: &DataValue,
    trusted: Option<&DataMap>,
    context: &Context,
) -> SchemaResult<DataMap> {
    // Null/Undefined视为无输入：只铺默认值和初始值，不触发字段转换
    let input_map = match input {
        DataValue::Object(map) => Some(map),
        DataValue::Model { data, .. } => Some(data),
        DataValue::Null | DataValue::Undefined => None,
        other => {
            return Err(SchemaError::conversion(
                &schema.name,
                format!("模型转换需要映射或模型实例，收到: {}", other.type_name()),
            ));
        }
    };

    let mut data = trusted.cloned().unwrap_or_default();
    let mut errors: HashMap<String, SchemaError> = HashMap::new();

    for (field_name, field) in &schema.fields {
        let serialized_field_name = field
            .serialized_name
            .as_deref()
            .unwrap_or(field_name.as_str());

        // 按声明顺序扫描全部候选键，后出现的键覆盖先出现的
        let mut raw = DataValue::Undefined;
        if let Some(input_map) = input_map {
            for key in trial_keys(field_name, field, context) {
                if let Some(value) = input_map.get(key) {
                    raw = value.clone();
                }
            }
        }

        if raw.is_undefined() {
            // 可信底座已有的字段保持原值
            if data.contains_key(field_name) {
                continue;
            }
            if context.apply_defaults {
                if let Some(default) = &field.default {
                    raw = default.clone();
                }
            }
            if raw.is_undefined() && context.init_values {
                raw = DataValue::Null;
            }
        }

        // 无输入时字段不经过转换器，必填检查也不触发
        if input_map.is_none() {
            data.insert(field_name.clone(), raw);
            continue;
        }

        // 进入复合字段时派生子上下文，父层的别名不向下泄漏
        let branched;
        let field_context = if field.is_compound() {
            branched = context.branch(
                context
                    .mapping
                    .nested_for(field_name)
                    .cloned()
                    .unwrap_or_default(),
            );
            &branched
        } else {
            context
        };

        match field_context
            .field_converter
            .run(field, serialized_field_name, &raw, schema, field_context)
        {
            Ok(value) => {
                data.insert(field_name.clone(), value);
            }
            Err(error) if error.is_data_error() => {
                // 嵌套模型的部分结果保留下来，调用方可以检视
                if let SchemaError::DataError { partial_data, .. } = &error {
                    data.insert(field_name.clone(), DataValue::Object(partial_data.clone()));
                }
                errors.insert(serialized_field_name.to_string(), error);
            }
            Err(error) => return Err(error),
        }
    }

    if context.strict {
        if let Some(input_map) = input_map {
            for (key, _) in input_map.iter() {
                if !is_declared_key(schema, key, context) {
                    errors.insert(
                        key.clone(),
                        SchemaError::conversion(key, "未声明的字段"),
                    );
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(data)
    } else {
        Err(SchemaError::DataError {
            errors,
            partial_data: strip_undefined(&data),
        })
    }
}

/// 字段的候选输入键，按优先级从低到高排列
fn trial_keys<'a>(
    field_name: &'a str,
    field: &'a crate::schema::field_types::FieldDefinition,
    context: &'a Context,
) -> impl Iterator<Item = &'a str> {
    field
        .deserialize_from
        .iter()
        .map(String::as_str)
        .chain(context.mapping.aliases_for(field_name).iter().map(String::as_str))
        .chain(field.serialized_name.as_deref())
        .chain(std::iter::once(field_name))
}

/// 判断输入键是否被模式声明（字段名、输出键名、别名或计算字段名）
fn is_declared_key(schema: &Arc<Schema>, key: &str, context: &Context) -> bool {
    for (field_name, field) in &schema.fields {
        if trial_keys(field_name, field, context).any(|candidate| candidate == key) {
            return true;
        }
    }
    schema
        .serializables
        .iter()
        .any(|(name, serializable)| {
            name == key || serializable.field.serialized_name.as_deref() == Some(key)
        })
}

/// 去掉未定义条目，作为失败时的部分结果
fn strip_undefined(data: &DataMap) -> DataMap {
    data.iter()
        .filter(|(_, value)| !value.is_undefined())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
