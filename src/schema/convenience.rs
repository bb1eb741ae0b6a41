//! 模式便捷函数模块
//!
//! 提供创建各种字段类型的便捷函数

use crate::schema::field_types::{ClaimFunction, FieldDefinition, FieldType};

/// 便捷函数：创建字符串字段
pub fn string_field(
    max_length: Option<usize>,
    min_length: Option<usize>,
    regex: Option<String>,
) -> FieldDefinition {
    FieldDefinition::new(FieldType::String {
        max_length,
        min_length,
        regex,
    })
}

/// 便捷函数：创建整数字段
pub fn integer_field(min_value: Option<i64>, max_value: Option<i64>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Integer {
        min_value,
        max_value,
    })
}

/// 便捷函数：创建浮点数字段
pub fn float_field(min_value: Option<f64>, max_value: Option<f64>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Float {
        min_value,
        max_value,
    })
}

/// 便捷函数：创建布尔字段
pub fn boolean_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Boolean)
}

/// 便捷函数：创建日期时间字段
pub fn datetime_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::DateTime)
}

/// 便捷函数：创建UUID字段
pub fn uuid_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Uuid)
}

/// 便捷函数：创建JSON字段
pub fn json_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Json)
}

/// 便捷函数：创建列表字段
pub fn list_field(
    item_field: FieldDefinition,
    min_size: Option<usize>,
    max_size: Option<usize>,
) -> FieldDefinition {
    FieldDefinition::new(FieldType::List {
        field: Box::new(item_field),
        min_size,
        max_size,
    })
}

/// 便捷函数：创建字典字段，值类型统一
pub fn dict_field(value_field: FieldDefinition) -> FieldDefinition {
    FieldDefinition::new(FieldType::Dict {
        field: Box::new(value_field),
    })
}

/// 便捷函数：创建模型引用字段
///
/// 目标模式按名称引用，允许引用所属模式自身（自引用）
pub fn model_field(schema_name: &str) -> FieldDefinition {
    FieldDefinition::new(FieldType::Model {
        schema: schema_name.to_string(),
    })
}

/// 便捷函数：创建多态模型引用字段
///
/// 传入单个候选时允许其已注册的子模式参与匹配，多个候选时只做精确匹配
pub fn poly_model_field<I, S>(schema_names: I) -> FieldDefinition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let schemas: Vec<String> = schema_names.into_iter().map(Into::into).collect();
    let allow_subclasses = schemas.len() == 1;
    FieldDefinition::new(FieldType::Poly {
        schemas,
        allow_subclasses,
        claim: None,
    })
}

/// 便捷函数：创建带自定义认领函数的多态模型引用字段
pub fn poly_model_field_with_claim<I, S>(schema_names: I, claim: ClaimFunction) -> FieldDefinition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let schemas: Vec<String> = schema_names.into_iter().map(Into::into).collect();
    let allow_subclasses = schemas.len() == 1;
    FieldDefinition::new(FieldType::Poly {
        schemas,
        allow_subclasses,
        claim: Some(claim),
    })
}
