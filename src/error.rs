//! 错误类型定义
//!
//! 错误分两类：数据错误（转换、验证、聚合）由循环逐字段捕获并汇总，
//! 配置错误（角色缺失、模型引用无法解析、多态歧义）属于程序员错误，立即向上传播

use std::collections::HashMap;
use thiserror::Error;

use crate::types::DataMap;

/// 统一的Result类型
pub type SchemaResult<T> = Result<T, SchemaError>;

/// 转换引擎错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// 转换错误：单个值的类型或形状不匹配
    #[error("转换错误: 字段 {field}: {message}")]
    ConversionError { field: String, message: String },

    /// 验证错误：值形状正确但违反业务规则（长度、范围等）
    #[error("验证错误: 字段 {field}: {message}")]
    ValidationError { field: String, message: String },

    /// 复合字段聚合错误：按索引或键记录嵌套集合中失败的元素
    #[error("复合字段转换失败，共 {} 个元素错误", errors.len())]
    CompoundError { errors: HashMap<String, SchemaError> },

    /// 顶层聚合错误：按输出字段名记录所有失败字段，并附带已成功转换的部分数据
    #[error("数据转换失败，共 {} 个字段错误", errors.len())]
    DataError {
        errors: HashMap<String, SchemaError>,
        partial_data: DataMap,
    },

    /// 角色未定义
    #[error("模式 {schema} 未定义角色 \"{role}\"")]
    RoleError { schema: String, role: String },

    /// 模型引用无法解析
    #[error("无法解析模型引用 \"{name}\"")]
    ModelResolutionError { name: String },

    /// 多态字段解析失败（歧义或无匹配）
    #[error("多态字段解析失败: 字段 {field}: {message}")]
    PolymorphicError { field: String, message: String },

    /// 模式定义错误（字段名重复等）
    #[error("模式定义错误: {schema}: {message}")]
    SchemaDefinitionError { schema: String, message: String },
}

impl SchemaError {
    /// 是否属于数据错误
    ///
    /// 数据错误由导入/导出循环逐字段捕获汇总，配置错误直接向上传播
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SchemaError::ConversionError { .. }
                | SchemaError::ValidationError { .. }
                | SchemaError::CompoundError { .. }
                | SchemaError::DataError { .. }
        )
    }

    /// 构造转换错误
    pub fn conversion(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::ConversionError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 构造验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
