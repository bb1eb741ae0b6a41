//! 复合字段转换模块
//!
//! 列表、字典按元素递归并聚合子错误；模型引用按实际模式递归回导入/导出循环；
//! 多态引用先选定目标模式再按模型处理

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::field_types::{ClaimFunction, ExportLevel, FieldDefinition, FieldType};
use crate::schema::meta::Schema;
use crate::schema::registry;
use crate::transform::context::Context;
use crate::transform::converters::ExportFormat;
use crate::transform::{export_loop, import_loop};
use crate::types::{DataMap, DataValue};

/// 复合字段的导入转换
pub(crate) fn convert_compound(
    field: &FieldDefinition,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    context: &Context,
) -> SchemaResult<DataValue> {
    match &field.field_type {
        FieldType::List {
            field: item_field,
            min_size,
            max_size,
        } => convert_list(item_field, field_name, value, owner, context, *min_size, *max_size),
        FieldType::Dict { field: value_field } => {
            convert_dict(value_field, field_name, value, owner, context)
        }
        FieldType::Model { schema } => convert_model(schema, field_name, value, owner, context),
        FieldType::Poly {
            schemas,
            allow_subclasses,
            claim,
        } => convert_poly(
            schemas,
            *allow_subclasses,
            claim.as_ref(),
            field_name,
            value,
            owner,
            context,
        ),
        // 标量类型不会到达这里
        _ => Ok(value.clone()),
    }
}

/// 列表转换
///
/// 先整形为元素序列（映射取值序列），检查长度边界，再逐元素递归
fn convert_list(
    item_field: &FieldDefinition,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    context: &Context,
    min_size: Option<usize>,
    max_size: Option<usize>,
) -> SchemaResult<DataValue> {
    let items: Vec<DataValue> = match value {
        DataValue::Array(items) => items.clone(),
        // 映射按插入顺序取值序列
        DataValue::Object(map) => map.values().cloned().collect(),
        other => {
            return Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为列表", other.type_name()),
            ));
        }
    };

    if let Some(min) = min_size {
        if items.len() < min {
            return Err(SchemaError::validation(
                field_name,
                format!("列表元素数量不能少于{}", min),
            ));
        }
    }
    if let Some(max) = max_size {
        if items.len() > max {
            return Err(SchemaError::validation(
                field_name,
                format!("列表元素数量不能超过{}", max),
            ));
        }
    }

    let mut converted = Vec::with_capacity(items.len());
    let mut errors: HashMap<String, SchemaError> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        match context
            .field_converter
            .run(item_field, &index.to_string(), item, owner, context)
        {
            Ok(value) => converted.push(value),
            Err(error) if error.is_data_error() => {
                errors.insert(index.to_string(), error);
            }
            Err(error) => return Err(error),
        }
    }

    if errors.is_empty() {
        Ok(DataValue::Array(converted))
    } else {
        Err(SchemaError::CompoundError { errors })
    }
}

/// 字典转换，键固定为字符串，逐值递归
fn convert_dict(
    value_field: &FieldDefinition,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    context: &Context,
) -> SchemaResult<DataValue> {
    let map = match value {
        DataValue::Object(map) => map,
        other => {
            return Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为字典", other.type_name()),
            ));
        }
    };

    let mut converted = DataMap::new();
    let mut errors: HashMap<String, SchemaError> = HashMap::new();
    for (key, item) in map.iter() {
        match context
            .field_converter
            .run(value_field, key, item, owner, context)
        {
            Ok(value) => {
                converted.insert(key.clone(), value);
            }
            Err(error) if error.is_data_error() => {
                errors.insert(key.clone(), error);
            }
            Err(error) => return Err(error),
        }
    }

    if errors.is_empty() {
        Ok(DataValue::Object(converted))
    } else {
        Err(SchemaError::CompoundError { errors })
    }
}

/// 模型引用转换
///
/// 已有实例允许目标模式自身或其后代（可替换性），映射按声明模式导入
fn convert_model(
    schema_name: &str,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    context: &Context,
) -> SchemaResult<DataValue> {
    match value {
        DataValue::Model { schema: actual, .. } => {
            if !registry::is_subclass(actual, schema_name) {
                return Err(SchemaError::conversion(
                    field_name,
                    format!("模型实例类型不匹配: 期望{}，收到{}", schema_name, actual),
                ));
            }
            let target = registry::resolve_schema(actual, owner)?;
            import_as_model(&target, value, context)
        }
        DataValue::Object(_) => {
            let target = registry::resolve_schema(schema_name, owner)?;
            import_as_model(&target, value, context)
        }
        other => Err(SchemaError::conversion(
            field_name,
            format!("模型转换需要映射或模型实例，收到: {}", other.type_name()),
        )),
    }
}

/// 多态模型引用转换
fn convert_poly(
    schemas: &[String],
    allow_subclasses: bool,
    claim: Option<&ClaimFunction>,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    context: &Context,
) -> SchemaResult<DataValue> {
    match value {
        // 已成形的实例只做归属检查，原样通过
        DataValue::Model { schema: actual, .. } => {
            if !is_allowed(actual, schemas, allow_subclasses) {
                return Err(SchemaError::PolymorphicError {
                    field: field_name.to_string(),
                    message: format!("模型实例{}不在候选模式范围内", actual),
                });
            }
            Ok(value.clone())
        }
        DataValue::Object(map) => {
            let target = find_model(schemas, allow_subclasses, claim, field_name, map, owner)?;
            import_as_model(&target, value, context)
        }
        other => Err(SchemaError::conversion(
            field_name,
            format!("模型转换需要映射或模型实例，收到: {}", other.type_name()),
        )),
    }
}

/// 判断模式名是否落在多态候选范围内
fn is_allowed(name: &str, schemas: &[String], allow_subclasses: bool) -> bool {
    if allow_subclasses {
        schemas
            .iter()
            .any(|candidate| registry::is_subclass(name, candidate))
    } else {
        schemas.iter().any(|candidate| candidate == name)
    }
}

/// 为多态输入选定目标模式
///
/// 认领函数配置后完全接管选择；否则枚举候选运行各模式的认领钩子，
/// 恰好一个匹配时采用，无匹配时回退到首个未定义钩子的候选
fn find_model(
    schemas: &[String],
    allow_subclasses: bool,
    claim: Option<&ClaimFunction>,
    field_name: &str,
    data: &DataMap,
    owner: &Arc<Schema>,
) -> SchemaResult<Arc<Schema>> {
    if let Some(claim) = claim {
        let name = claim.claim(data).ok_or_else(|| SchemaError::PolymorphicError {
            field: field_name.to_string(),
            message: "认领函数未能确定目标模式".to_string(),
        })?;
        if !is_allowed(&name, schemas, allow_subclasses) {
            return Err(SchemaError::PolymorphicError {
                field: field_name.to_string(),
                message: format!("认领函数返回的模式{}不在候选范围内", name),
            });
        }
        return registry::resolve_schema(&name, owner);
    }

    let candidates = collect_candidates(schemas, allow_subclasses, owner)?;
    let mut matches: Vec<Arc<Schema>> = Vec::new();
    let mut fallback: Option<Arc<Schema>> = None;
    for candidate in &candidates {
        match candidate.run_claim(data) {
            Some(true) => matches.push(candidate.clone()),
            Some(false) => {}
            None => {
                if fallback.is_none() {
                    fallback = Some(candidate.clone());
                }
            }
        }
    }

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => fallback.ok_or_else(|| SchemaError::PolymorphicError {
            field: field_name.to_string(),
            message: "没有模式认领该输入".to_string(),
        }),
        _ => Err(SchemaError::PolymorphicError {
            field: field_name.to_string(),
            message: format!(
                "多个模式认领了该输入: {}",
                matches
                    .iter()
                    .map(|schema| schema.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}

/// 展开候选模式集合，按声明顺序、去重，子模式紧随其父之后
fn collect_candidates(
    schemas: &[String],
    allow_subclasses: bool,
    owner: &Arc<Schema>,
) -> SchemaResult<Vec<Arc<Schema>>> {
    let mut candidates: Vec<Arc<Schema>> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for name in schemas {
        let schema = registry::resolve_schema(name, owner)?;
        if !seen.contains(&schema.name) {
            seen.push(schema.name.clone());
            candidates.push(schema);
        }
        if allow_subclasses {
            for child in registry::subclasses_of(name) {
                if !seen.contains(&child.name) {
                    seen.push(child.name.clone());
                    candidates.push(child);
                }
            }
        }
    }
    Ok(candidates)
}

/// 以目标模式执行导入并打上实例标签
fn import_as_model(
    target: &Arc<Schema>,
    value: &DataValue,
    context: &Context,
) -> SchemaResult<DataValue> {
    let data = import_loop::import_loop(target, value, context)?;
    Ok(DataValue::model(target.name.clone(), data))
}

/// 复合字段的导出转换
pub(crate) fn export_compound(
    field: &FieldDefinition,
    field_name: &str,
    value: &DataValue,
    owner: &Arc<Schema>,
    format: ExportFormat,
    context: &Context,
) -> SchemaResult<DataValue> {
    match &field.field_type {
        FieldType::List {
            field: item_field, ..
        } => {
            let items = match value {
                DataValue::Array(items) => items,
                other => {
                    return Err(SchemaError::conversion(
                        field_name,
                        format!("无法将{}导出为列表", other.type_name()),
                    ));
                }
            };
            let item_level = item_field.effective_export_level(context.export_level);
            // 元素级别为Drop时全部元素都会被滤掉，不再逐个转换
            if item_level == ExportLevel::Drop {
                return Ok(DataValue::Array(Vec::new()));
            }
            let mut exported = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let converted = context.field_converter.run(
                    item_field,
                    &index.to_string(),
                    item,
                    owner,
                    context,
                )?;
                // 元素级过滤沿用标量导出的级别规则，空列表是合法输出
                if let Some(value) = export_loop::filter_by_level(item_field, item_level, converted)
                {
                    exported.push(value);
                }
            }
            Ok(DataValue::Array(exported))
        }
        FieldType::Dict { field: value_field } => {
            let map = match value {
                DataValue::Object(map) => map,
                other => {
                    return Err(SchemaError::conversion(
                        field_name,
                        format!("无法将{}导出为字典", other.type_name()),
                    ));
                }
            };
            let value_level = value_field.effective_export_level(context.export_level);
            if value_level == ExportLevel::Drop {
                return Ok(DataValue::Object(DataMap::new()));
            }
            let mut exported = DataMap::new();
            for (key, item) in map.iter() {
                let converted = context
                    .field_converter
                    .run(value_field, key, item, owner, context)?;
                if let Some(value) =
                    export_loop::filter_by_level(value_field, value_level, converted)
                {
                    exported.insert(key.clone(), value);
                }
            }
            Ok(DataValue::Object(exported))
        }
        FieldType::Model { schema } => {
            let target = match value {
                DataValue::Model { schema: actual, .. } => {
                    if !registry::is_subclass(actual, schema) {
                        return Err(SchemaError::conversion(
                            field_name,
                            format!("模型实例类型不匹配: 期望{}，收到{}", schema, actual),
                        ));
                    }
                    registry::resolve_schema(actual, owner)?
                }
                DataValue::Object(_) => registry::resolve_schema(schema, owner)?,
                other => {
                    return Err(SchemaError::conversion(
                        field_name,
                        format!("模型导出需要映射或模型实例，收到: {}", other.type_name()),
                    ));
                }
            };
            export_as_model(&target, value, format, context)
        }
        FieldType::Poly {
            schemas,
            allow_subclasses,
            claim,
        } => {
            let target = match value {
                DataValue::Model { schema: actual, .. } => {
                    if !is_allowed(actual, schemas, *allow_subclasses) {
                        return Err(SchemaError::PolymorphicError {
                            field: field_name.to_string(),
                            message: format!("模型实例{}不在候选模式范围内", actual),
                        });
                    }
                    registry::resolve_schema(actual, owner)?
                }
                DataValue::Object(map) => find_model(
                    schemas,
                    *allow_subclasses,
                    claim.as_ref(),
                    field_name,
                    map,
                    owner,
                )?,
                other => {
                    return Err(SchemaError::conversion(
                        field_name,
                        format!("模型导出需要映射或模型实例，收到: {}", other.type_name()),
                    ));
                }
            };
            export_as_model(&target, value, format, context)
        }
        // 标量类型不会到达这里
        _ => Ok(value.clone()),
    }
}

/// 以目标模式执行导出，Native格式保留实例标签，Primitive格式降级为普通映射
fn export_as_model(
    target: &Arc<Schema>,
    value: &DataValue,
    format: ExportFormat,
    context: &Context,
) -> SchemaResult<DataValue> {
    let data = export_loop::export_loop(target, value, context)?;
    match format {
        ExportFormat::Native => Ok(DataValue::model(target.name.clone(), data)),
        ExportFormat::Primitive => Ok(DataValue::Object(data)),
    }
}
