//! 字段转换器模块
//!
//! 导入导出共用同一套循环，差异全部收敛到字段转换器：
//! 导入方向做类型强制和业务规则验证，导出方向做格式化输出

use std::sync::Arc;

use chrono::DateTime;
use uuid::Uuid;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::field_types::{FieldDefinition, FieldType};
use crate::schema::meta::Schema;
use crate::transform::compound;
use crate::transform::context::Context;
use crate::types::DataValue;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// 保留引擎内部类型（日期、UUID等保持原样）
    Native,
    /// 降级为可直接序列化的基元类型
    Primitive,
}

impl ExportFormat {
    /// 取相反的格式
    pub fn flipped(self) -> Self {
        match self {
            ExportFormat::Native => ExportFormat::Primitive,
            ExportFormat::Primitive => ExportFormat::Native,
        }
    }
}

/// 字段转换器
///
/// 循环对每个字段值调用run，复合字段在run内部递归回循环
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldConverter {
    /// 导入方向：类型强制，validate开启时追加业务规则验证
    Import { validate: bool },
    /// 导出方向：model_exception开启时模型引用字段翻转格式
    Export {
        format: ExportFormat,
        model_exception: bool,
    },
}

impl FieldConverter {
    /// 对单个字段值执行转换
    pub fn run(
        &self,
        field: &FieldDefinition,
        field_name: &str,
        value: &DataValue,
        owner: &Arc<Schema>,
        context: &Context,
    ) -> SchemaResult<DataValue> {
        match self {
            FieldConverter::Import { validate } => {
                if value.is_undefined() || value.is_null() {
                    if field.required && !context.partial {
                        return Err(SchemaError::conversion(field_name, "必填字段不能为空"));
                    }
                    return Ok(value.clone());
                }
                let converted = if field.is_compound() {
                    compound::convert_compound(field, field_name, value, owner, context)?
                } else {
                    convert_scalar(&field.field_type, field_name, value)?
                };
                if *validate {
                    field.validate_with_field_name(&converted, field_name)?;
                }
                Ok(converted)
            }
            FieldConverter::Export {
                format,
                model_exception,
            } => {
                // 空值不做格式化，交由导出循环按级别过滤
                if value.is_null() || value.is_undefined() {
                    return Ok(value.clone());
                }
                // 例外只覆盖单模型引用字段，多态字段保持当前格式
                let format = if *model_exception && matches!(field.field_type, FieldType::Model { .. })
                {
                    format.flipped()
                } else {
                    *format
                };
                if field.is_compound() {
                    compound::export_compound(field, field_name, value, owner, format, context)
                } else {
                    Ok(export_scalar(value, format))
                }
            }
        }
    }
}

/// 标量类型强制
///
/// 宽松接受常见的等价表示（数字字符串、整数布尔等），无法强制时报转换错误
fn convert_scalar(
    field_type: &FieldType,
    field_name: &str,
    value: &DataValue,
) -> SchemaResult<DataValue> {
    match field_type {
        FieldType::String { .. } => match value {
            DataValue::String(_) => Ok(value.clone()),
            DataValue::Int(i) => Ok(DataValue::String(i.to_string())),
            DataValue::Float(f) => Ok(DataValue::String(f.to_string())),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为字符串", other.type_name()),
            )),
        },
        FieldType::Integer { .. } => match value {
            DataValue::Int(_) => Ok(value.clone()),
            DataValue::Float(f) if f.fract() == 0.0 => Ok(DataValue::Int(*f as i64)),
            DataValue::String(s) => s.trim().parse::<i64>().map(DataValue::Int).map_err(|_| {
                SchemaError::conversion(field_name, format!("无法将'{}'转换为整数", s))
            }),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为整数", other.type_name()),
            )),
        },
        FieldType::Float { .. } => match value {
            DataValue::Float(_) => Ok(value.clone()),
            DataValue::Int(i) => Ok(DataValue::Float(*i as f64)),
            DataValue::String(s) => s.trim().parse::<f64>().map(DataValue::Float).map_err(|_| {
                SchemaError::conversion(field_name, format!("无法将'{}'转换为浮点数", s))
            }),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为浮点数", other.type_name()),
            )),
        },
        FieldType::Boolean => match value {
            DataValue::Bool(_) => Ok(value.clone()),
            DataValue::String(s) => match s.as_str() {
                "true" | "1" => Ok(DataValue::Bool(true)),
                "false" | "0" => Ok(DataValue::Bool(false)),
                _ => Err(SchemaError::conversion(
                    field_name,
                    format!("无法将'{}'转换为布尔值", s),
                )),
            },
            DataValue::Int(0) => Ok(DataValue::Bool(false)),
            DataValue::Int(1) => Ok(DataValue::Bool(true)),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为布尔值", other.type_name()),
            )),
        },
        FieldType::DateTime => match value {
            DataValue::DateTime(_) => Ok(value.clone()),
            DataValue::String(s) => DateTime::parse_from_rfc3339(s)
                .map(DataValue::DateTime)
                .map_err(|e| {
                    SchemaError::conversion(field_name, format!("日期时间格式无效: {}", e))
                }),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为日期时间", other.type_name()),
            )),
        },
        FieldType::Uuid => match value {
            DataValue::Uuid(_) => Ok(value.clone()),
            DataValue::String(s) => Uuid::parse_str(s).map(DataValue::Uuid).map_err(|_| {
                SchemaError::conversion(field_name, format!("无法将'{}'转换为UUID", s))
            }),
            other => Err(SchemaError::conversion(
                field_name,
                format!("无法将{}转换为UUID", other.type_name()),
            )),
        },
        // JSON字段接受任意值
        FieldType::Json => Ok(value.clone()),
        // 复合类型不会到达这里
        FieldType::List { .. }
        | FieldType::Dict { .. }
        | FieldType::Model { .. }
        | FieldType::Poly { .. } => Ok(value.clone()),
    }
}

/// 标量导出格式化
fn export_scalar(value: &DataValue, format: ExportFormat) -> DataValue {
    match format {
        ExportFormat::Native => value.clone(),
        ExportFormat::Primitive => match value {
            DataValue::DateTime(dt) => DataValue::String(dt.to_rfc3339()),
            DataValue::Uuid(u) => DataValue::String(u.to_string()),
            other => other.clone(),
        },
    }
}
