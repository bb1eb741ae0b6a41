//! 转换上下文模块
//!
//! 上下文在顶层调用时构建一次，之后沿递归链只读传递；
//! 进入带子模式的复合字段时通过branch派生仅覆盖mapping的子上下文

use std::collections::HashMap;

use crate::schema::field_types::ExportLevel;
use crate::transform::converters::FieldConverter;
use crate::types::{DataMap, DataValue};

/// 字段名重映射表
///
/// aliases为字段提供额外的输入键，nested为复合字段提供子模式自己的重映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    aliases: HashMap<String, Vec<String>>,
    nested: HashMap<String, FieldMapping>,
}

impl FieldMapping {
    /// 创建空映射表
    pub fn new() -> Self {
        Self::default()
    }

    /// 为字段添加输入别名
    pub fn alias(mut self, field: &str, alias: &str) -> Self {
        self.aliases
            .entry(field.to_string())
            .or_default()
            .push(alias.to_string());
        self
    }

    /// 为复合字段设置子模式的重映射表
    pub fn nested(mut self, field: &str, mapping: FieldMapping) -> Self {
        self.nested.insert(field.to_string(), mapping);
        self
    }

    /// 查询字段的别名列表
    pub fn aliases_for(&self, field: &str) -> &[String] {
        self.aliases
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 查询复合字段的子映射表
    pub fn nested_for(&self, field: &str) -> Option<&FieldMapping> {
        self.nested.get(field)
    }

    /// 是否为字段声明了别名
    pub fn has_aliases(&self, field: &str) -> bool {
        self.aliases.contains_key(field)
    }
}

/// 转换上下文
///
/// 顶层调用构建后不再修改；并发调用各自构建独立的上下文即可安全使用
#[derive(Debug, Clone)]
pub struct Context {
    /// 当前激活的字段转换器
    pub field_converter: FieldConverter,
    /// 字段名重映射表
    pub mapping: FieldMapping,
    /// 允许部分数据（放过必填检查）
    pub partial: bool,
    /// 拒绝未声明的输入键
    pub strict: bool,
    /// 缺失字段以null落地
    pub init_values: bool,
    /// 缺失字段应用默认值
    pub apply_defaults: bool,
    /// 本次调用是否执行转换
    pub convert: bool,
    /// 本次调用是否执行验证
    pub validate: bool,
    /// 是否为新建实例
    pub new: bool,
    /// 导出使用的角色名
    pub role: Option<String>,
    /// 请求的角色未定义时是否报错
    pub raise_error_on_role: bool,
    /// 全局导出级别覆盖
    pub export_level: Option<ExportLevel>,
    /// 调用方自备的跨层数据
    pub app_data: HashMap<String, DataValue>,
}

impl Context {
    /// 从导入选项构建上下文
    pub(crate) fn for_import(converter: FieldConverter, options: &ImportOptions) -> Self {
        let validate = matches!(converter, FieldConverter::Import { validate: true });
        Self {
            field_converter: converter,
            mapping: options.mapping.clone(),
            partial: options.partial,
            strict: options.strict,
            init_values: options.init_values,
            apply_defaults: options.apply_defaults,
            convert: true,
            validate,
            new: options.new,
            role: None,
            raise_error_on_role: true,
            export_level: None,
            app_data: options.app_data.clone(),
        }
    }

    /// 从导出选项构建上下文
    pub(crate) fn for_export(converter: FieldConverter, options: &ExportOptions) -> Self {
        Self {
            field_converter: converter,
            mapping: FieldMapping::default(),
            partial: false,
            strict: false,
            init_values: false,
            apply_defaults: false,
            convert: false,
            validate: false,
            new: false,
            role: options.role.clone(),
            raise_error_on_role: options.raise_error_on_role,
            export_level: options.export_level,
            app_data: options.app_data.clone(),
        }
    }

    /// 派生子上下文，仅覆盖mapping，其余选项保持不变
    pub fn branch(&self, mapping: FieldMapping) -> Self {
        let mut child = self.clone();
        child.mapping = mapping;
        child
    }
}

/// 导入选项
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// 字段名重映射表
    pub mapping: FieldMapping,
    /// 允许部分数据，放过必填检查
    pub partial: bool,
    /// 拒绝未声明的输入键
    pub strict: bool,
    /// 缺失字段以null落地
    pub init_values: bool,
    /// 缺失字段应用默认值
    pub apply_defaults: bool,
    /// 是否为新建实例
    pub new: bool,
    /// 预先验证过的可信数据，导入结果在其上叠加
    pub trusted_data: Option<DataMap>,
    /// 调用方自备的跨层数据
    pub app_data: HashMap<String, DataValue>,
}

impl ImportOptions {
    /// 创建默认导入选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置字段名重映射表
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// 允许部分数据
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    /// 启用严格模式
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// 缺失字段以null落地
    pub fn init_values(mut self) -> Self {
        self.init_values = true;
        self
    }

    /// 缺失字段应用默认值
    pub fn apply_defaults(mut self) -> Self {
        self.apply_defaults = true;
        self
    }

    /// 标记为新建实例
    pub fn new_instance(mut self) -> Self {
        self.new = true;
        self
    }

    /// 设置可信数据底座
    pub fn with_trusted_data(mut self, data: DataMap) -> Self {
        self.trusted_data = Some(data);
        self
    }

    /// 设置跨层数据
    pub fn with_app_data(mut self, app_data: HashMap<String, DataValue>) -> Self {
        self.app_data = app_data;
        self
    }
}

/// 导出选项
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// 使用的角色名
    pub role: Option<String>,
    /// 请求的角色未定义时是否报错，关闭后回退到"default"角色或全保留
    pub raise_error_on_role: bool,
    /// 全局导出级别覆盖，与字段策略取更严格的一方
    pub export_level: Option<ExportLevel>,
    /// 调用方自备的跨层数据
    pub app_data: HashMap<String, DataValue>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            role: None,
            raise_error_on_role: true,
            export_level: None,
            app_data: HashMap::new(),
        }
    }
}

impl ExportOptions {
    /// 创建默认导出选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置角色
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// 角色未定义时不报错，回退到"default"角色或全保留
    pub fn tolerate_unknown_role(mut self) -> Self {
        self.raise_error_on_role = false;
        self
    }

    /// 设置全局导出级别覆盖
    pub fn with_export_level(mut self, level: ExportLevel) -> Self {
        self.export_level = Some(level);
        self
    }

    /// 设置跨层数据
    pub fn with_app_data(mut self, app_data: HashMap<String, DataValue>) -> Self {
        self.app_data = app_data;
        self
    }
}
