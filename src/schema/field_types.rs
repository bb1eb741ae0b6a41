//! 字段类型定义模块
//!
//! 定义模式字段的类型、描述符和导出级别策略

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::types::{DataMap, DataValue};

/// 导出级别
///
/// 控制导出时哪些值被省略，形成全序：Drop < Default < NotNone < Nonempty。
/// 字段策略与上下文覆盖同时存在时取更严格（更小）的一方，Drop直接胜出
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExportLevel {
    /// 永不导出
    Drop,
    /// 仅导出有值的字段（过滤未定义）
    Default,
    /// 进一步过滤null值
    NotNone,
    /// 进一步过滤空的复合值
    Nonempty,
}

impl Default for ExportLevel {
    fn default() -> Self {
        // 未设值的字段以null形式出现在导出结果中，空复合值被过滤
        ExportLevel::Nonempty
    }
}

/// 多态字段的自定义认领函数
///
/// 输入待转换的映射，返回认领该输入的模式名；配置后完全接管模型选择
#[derive(Clone)]
pub struct ClaimFunction(Arc<dyn Fn(&DataMap) -> Option<String> + Send + Sync>);

impl ClaimFunction {
    /// 包装认领函数
    pub fn new(f: impl Fn(&DataMap) -> Option<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// 对输入执行认领
    pub fn claim(&self, data: &DataMap) -> Option<String> {
        (self.0)(data)
    }
}

impl std::fmt::Debug for ClaimFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<claim_function>")
    }
}

impl PartialEq for ClaimFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// 字段类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    /// 字符串类型
    String {
        max_length: Option<usize>,
        min_length: Option<usize>,
        regex: Option<String>,
    },
    /// 整数类型
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    /// 浮点数类型
    Float {
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    /// 布尔类型
    Boolean,
    /// 日期时间类型
    DateTime,
    /// UUID类型
    Uuid,
    /// JSON类型
    Json,
    /// 列表类型（复合）
    List {
        field: Box<FieldDefinition>,
        min_size: Option<usize>,
        max_size: Option<usize>,
    },
    /// 字典类型（复合），键固定为字符串
    Dict { field: Box<FieldDefinition> },
    /// 模型引用类型（复合），按名称引用目标模式
    Model { schema: String },
    /// 多态模型引用类型（复合），候选模式集合
    Poly {
        schemas: Vec<String>,
        allow_subclasses: bool,
        #[serde(skip)]
        claim: Option<ClaimFunction>,
    },
}

/// 字段定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// 字段类型
    pub field_type: FieldType,
    /// 是否必填
    pub required: bool,
    /// 默认值
    pub default: Option<DataValue>,
    /// 输出时使用的替代键名
    pub serialized_name: Option<String>,
    /// 输入时额外接受的别名键，按声明顺序尝试
    pub deserialize_from: Vec<String>,
    /// 导出级别策略
    pub export_level: ExportLevel,
    /// 字段描述
    pub description: Option<String>,
}

impl FieldDefinition {
    /// 创建新的字段定义
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
            serialized_name: None,
            deserialize_from: Vec::new(),
            export_level: ExportLevel::default(),
            description: None,
        }
    }

    /// 设置为必填字段
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 设置默认值
    pub fn with_default(mut self, value: impl Into<DataValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// 设置输出键名
    pub fn with_serialized_name(mut self, name: &str) -> Self {
        self.serialized_name = Some(name.to_string());
        self
    }

    /// 添加输入别名键
    pub fn with_deserialize_from(mut self, alias: &str) -> Self {
        self.deserialize_from.push(alias.to_string());
        self
    }

    /// 设置导出级别
    pub fn with_export_level(mut self, level: ExportLevel) -> Self {
        self.export_level = level;
        self
    }

    /// 设置字段描述
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// 是否为复合字段（值本身是需要递归转换的嵌套结构）
    pub fn is_compound(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::List { .. }
                | FieldType::Dict { .. }
                | FieldType::Model { .. }
                | FieldType::Poly { .. }
        )
    }

    /// 计算有效导出级别
    ///
    /// 上下文提供全局覆盖时取更严格的一方
    pub fn effective_export_level(&self, context_level: Option<ExportLevel>) -> ExportLevel {
        match context_level {
            Some(level) => self.export_level.min(level),
            None => self.export_level,
        }
    }

    /// 验证已转换的字段值是否满足业务规则
    ///
    /// 在导入循环的validate动作中执行，此时值的形状已经由转换保证
    pub fn validate_with_field_name(&self, value: &DataValue, field_name: &str) -> SchemaResult<()> {
        // 空值不参与业务规则验证，必填检查由转换器的required逻辑负责
        if matches!(value, DataValue::Null | DataValue::Undefined) {
            return Ok(());
        }

        match &self.field_type {
            FieldType::String {
                max_length,
                min_length,
                regex,
            } => {
                if let DataValue::String(s) = value {
                    if let Some(max_len) = max_length {
                        if s.chars().count() > *max_len {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("字符串长度不能超过{}", max_len),
                            ));
                        }
                    }
                    if let Some(min_len) = min_length {
                        if s.chars().count() < *min_len {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("字符串长度不能少于{}", min_len),
                            ));
                        }
                    }
                    if let Some(pattern) = regex {
                        let regex = regex::Regex::new(pattern).map_err(|e| {
                            SchemaError::validation(
                                field_name,
                                format!("正则表达式无效: {}", e),
                            )
                        })?;
                        if !regex.is_match(s) {
                            return Err(SchemaError::validation(
                                field_name,
                                "字符串不匹配正则表达式".to_string(),
                            ));
                        }
                    }
                }
            }
            FieldType::Integer {
                min_value,
                max_value,
            } => {
                if let DataValue::Int(i) = value {
                    if let Some(min_val) = min_value {
                        if *i < *min_val {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("整数值不能小于{}", min_val),
                            ));
                        }
                    }
                    if let Some(max_val) = max_value {
                        if *i > *max_val {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("整数值不能大于{}", max_val),
                            ));
                        }
                    }
                }
            }
            FieldType::Float {
                min_value,
                max_value,
            } => {
                if let DataValue::Float(f) = value {
                    if let Some(min_val) = min_value {
                        if *f < *min_val {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("浮点数值不能小于{}", min_val),
                            ));
                        }
                    }
                    if let Some(max_val) = max_value {
                        if *f > *max_val {
                            return Err(SchemaError::validation(
                                field_name,
                                format!("浮点数值不能大于{}", max_val),
                            ));
                        }
                    }
                }
            }
            // 其余类型没有额外的业务规则；列表长度在转换阶段检查
            _ => {}
        }

        Ok(())
    }
}
