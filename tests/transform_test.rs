//! 转换引擎集成测试
//!
//! 覆盖导入/导出全流程：类型强制、严格模式、默认值、别名、
//! 角色过滤、导出级别、嵌套与多态模型、扁平化往返

use rat_schema::*;

/// 构造输入映射
fn object(entries: Vec<(&str, DataValue)>) -> DataValue {
    DataValue::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

#[test]
fn test_import_export_roundtrip() {
    let schema = Schema::builder("RoundtripPerson")
        .field("name", string_field(None, None, None).required())
        .field("age", integer_field(None, None))
        .register()
        .unwrap();

    let input = object(vec![
        ("name", DataValue::String("张三".to_string())),
        // 数字字符串被强制为整数
        ("age", DataValue::String("30".to_string())),
    ]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::String("张三".to_string())));
    assert_eq!(data.get("age"), Some(&DataValue::Int(30)));

    let exported = to_primitive(
        &schema,
        &DataValue::Object(data.clone()),
        ExportOptions::new(),
    )
    .unwrap();
    let reimported = convert(
        &schema,
        &DataValue::Object(exported),
        ImportOptions::new(),
    )
    .unwrap();
    assert_eq!(reimported.get("name"), data.get("name"));
    assert_eq!(reimported.get("age"), data.get("age"));
}

#[test]
fn test_strict_mode_rejects_rogue_fields() {
    let schema = Schema::builder("StrictOnlyName")
        .field("name", string_field(None, None, None))
        .register()
        .unwrap();

    let input = object(vec![
        ("unknown_key", DataValue::Int(1)),
        ("name", DataValue::String("x".to_string())),
    ]);

    let err = convert(&schema, &input, ImportOptions::new().strict()).unwrap_err();
    match err {
        SchemaError::DataError { errors, .. } => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(
                errors.get("unknown_key"),
                Some(SchemaError::ConversionError { .. })
            ));
        }
        other => panic!("期望DataError，收到: {:?}", other),
    }

    // 非严格模式下未声明的键被忽略
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::String("x".to_string())));
    assert!(data.get("unknown_key").is_none());
}

#[test]
fn test_list_size_bounds() {
    let schema = Schema::builder("BoundedList")
        .field(
            "items",
            list_field(integer_field(None, None), Some(2), Some(3)),
        )
        .register()
        .unwrap();

    let too_few = object(vec![("items", DataValue::Array(vec![DataValue::Int(1)]))]);
    let err = convert(&schema, &too_few, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError { errors, .. } => match errors.get("items") {
            Some(SchemaError::ValidationError { message, .. }) => {
                assert!(message.contains("2"));
            }
            other => panic!("期望ValidationError，收到: {:?}", other),
        },
        other => panic!("期望DataError，收到: {:?}", other),
    }

    let too_many = object(vec![(
        "items",
        DataValue::Array(vec![
            DataValue::Int(1),
            DataValue::Int(2),
            DataValue::Int(3),
            DataValue::Int(4),
        ]),
    )]);
    let err = convert(&schema, &too_many, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError { errors, .. } => match errors.get("items") {
            Some(SchemaError::ValidationError { message, .. }) => {
                assert!(message.contains("3"));
            }
            other => panic!("期望ValidationError，收到: {:?}", other),
        },
        other => panic!("期望DataError，收到: {:?}", other),
    }

    let just_right = object(vec![(
        "items",
        DataValue::Array(vec![DataValue::Int(1), DataValue::Int(2)]),
    )]);
    let data = convert(&schema, &just_right, ImportOptions::new()).unwrap();
    assert_eq!(
        data.get("items"),
        Some(&DataValue::Array(vec![DataValue::Int(1), DataValue::Int(2)]))
    );
}

#[test]
fn test_list_element_errors_aggregate_by_index() {
    let schema = Schema::builder("AggregatedList")
        .field("items", list_field(integer_field(None, None), None, None))
        .register()
        .unwrap();

    let input = object(vec![(
        "items",
        DataValue::Array(vec![
            DataValue::Int(1),
            DataValue::String("不是数字".to_string()),
            DataValue::Int(3),
        ]),
    )]);
    let err = convert(&schema, &input, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError { errors, .. } => match errors.get("items") {
            Some(SchemaError::CompoundError { errors }) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains_key("1"));
            }
            other => panic!("期望CompoundError，收到: {:?}", other),
        },
        other => panic!("期望DataError，收到: {:?}", other),
    }
}

#[test]
fn test_partial_failure_preserves_converted_data() {
    let schema = Schema::builder("PartialTwoFields")
        .field("a", string_field(None, None, None))
        .field("b", integer_field(None, None))
        .register()
        .unwrap();

    let input = object(vec![
        ("a", DataValue::String("ok".to_string())),
        ("b", DataValue::String("无效整数".to_string())),
    ]);
    let err = convert(&schema, &input, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError {
            errors,
            partial_data,
        } => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains_key("b"));
            assert_eq!(
                partial_data.get("a"),
                Some(&DataValue::String("ok".to_string()))
            );
            assert!(partial_data.get("b").is_none());
        }
        other => panic!("期望DataError，收到: {:?}", other),
    }
}

#[test]
fn test_required_field_missing() {
    let schema = Schema::builder("RequiredName")
        .field("name", string_field(None, None, None).required())
        .register()
        .unwrap();

    let err = convert(&schema, &object(vec![]), ImportOptions::new()).unwrap_err();
    assert!(matches!(err, SchemaError::DataError { .. }));

    // partial选项放过必填检查
    let data = convert(&schema, &object(vec![]), ImportOptions::new().partial()).unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::Undefined));
}

#[test]
fn test_defaults_and_init_values() {
    let schema = Schema::builder("DefaultsModel")
        .field("status", string_field(None, None, None).with_default("active"))
        .field("note", string_field(None, None, None))
        .register()
        .unwrap();

    let data = convert(
        &schema,
        &object(vec![]),
        ImportOptions::new().apply_defaults().init_values(),
    )
    .unwrap();
    assert_eq!(
        data.get("status"),
        Some(&DataValue::String("active".to_string()))
    );
    // 没有默认值的缺失字段以null落地
    assert_eq!(data.get("note"), Some(&DataValue::Null));

    // 两个选项都不开时缺失字段保持未定义
    let data = convert(&schema, &object(vec![]), ImportOptions::new()).unwrap();
    assert_eq!(data.get("status"), Some(&DataValue::Undefined));
}

#[test]
fn test_input_aliases_last_match_wins() {
    let schema = Schema::builder("AliasedModel")
        .field(
            "name",
            string_field(None, None, None)
                .with_serialized_name("Name")
                .with_deserialize_from("nick"),
        )
        .register()
        .unwrap();

    let data = convert(
        &schema,
        &object(vec![("nick", DataValue::String("小名".to_string()))]),
        ImportOptions::new(),
    )
    .unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::String("小名".to_string())));

    let data = convert(
        &schema,
        &object(vec![("Name", DataValue::String("大名".to_string()))]),
        ImportOptions::new(),
    )
    .unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::String("大名".to_string())));

    // 候选键按优先级从低到高扫描，字段本名最后胜出
    let data = convert(
        &schema,
        &object(vec![
            ("nick", DataValue::String("小名".to_string())),
            ("name", DataValue::String("本名".to_string())),
        ]),
        ImportOptions::new(),
    )
    .unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::String("本名".to_string())));
}

#[test]
fn test_context_mapping_aliases() {
    let schema = Schema::builder("MappedModel")
        .field("title", string_field(None, None, None))
        .register()
        .unwrap();

    let mapping = FieldMapping::new().alias("title", "headline");
    let data = convert(
        &schema,
        &object(vec![("headline", DataValue::String("头条".to_string()))]),
        ImportOptions::new().with_mapping(mapping),
    )
    .unwrap();
    assert_eq!(
        data.get("title"),
        Some(&DataValue::String("头条".to_string()))
    );
}

#[test]
fn test_serialized_name_used_on_export() {
    let schema = Schema::builder("SerializedNameModel")
        .field(
            "internal_id",
            integer_field(None, None).with_serialized_name("id"),
        )
        .register()
        .unwrap();

    let data = convert(
        &schema,
        &object(vec![("id", DataValue::Int(7))]),
        ImportOptions::new(),
    )
    .unwrap();
    // 内部数据用字段本名存储
    assert_eq!(data.get("internal_id"), Some(&DataValue::Int(7)));

    let exported = to_primitive(&schema, &DataValue::Object(data), ExportOptions::new()).unwrap();
    assert_eq!(exported.get("id"), Some(&DataValue::Int(7)));
    assert!(exported.get("internal_id").is_none());
}

#[test]
fn test_role_filtering() {
    let schema = Schema::builder("RolePerson")
        .field("name", string_field(None, None, None))
        .field("secret", string_field(None, None, None))
        .role("public", Role::whitelist(["name"]))
        .register()
        .unwrap();

    let instance = object(vec![
        ("name", DataValue::String("张三".to_string())),
        ("secret", DataValue::String("密码".to_string())),
    ]);

    let exported = to_primitive(
        &schema,
        &instance,
        ExportOptions::new().with_role("public"),
    )
    .unwrap();
    assert_eq!(exported.len(), 1);
    assert!(exported.get("secret").is_none());

    // 未定义的角色默认报错
    let err = to_primitive(&schema, &instance, ExportOptions::new().with_role("missing"))
        .unwrap_err();
    assert!(matches!(err, SchemaError::RoleError { .. }));

    // 关闭报错后回退到全保留
    let exported = to_primitive(
        &schema,
        &instance,
        ExportOptions::new()
            .with_role("missing")
            .tolerate_unknown_role(),
    )
    .unwrap();
    assert_eq!(exported.len(), 2);
}

#[test]
fn test_default_role_applies_without_request() {
    let schema = Schema::builder("DefaultRoleModel")
        .field("name", string_field(None, None, None))
        .field("internal", string_field(None, None, None))
        .role("default", Role::blacklist(["internal"]))
        .register()
        .unwrap();

    let instance = object(vec![
        ("name", DataValue::String("a".to_string())),
        ("internal", DataValue::String("b".to_string())),
    ]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(exported.get("internal").is_none());
    assert!(exported.get("name").is_some());
}

#[test]
fn test_export_level_not_none() {
    let schema = Schema::builder("NotNoneModel")
        .field(
            "note",
            string_field(None, None, None).with_export_level(ExportLevel::NotNone),
        )
        .register()
        .unwrap();

    // null值被过滤
    let exported = to_primitive(
        &schema,
        &object(vec![("note", DataValue::Null)]),
        ExportOptions::new(),
    )
    .unwrap();
    assert!(exported.get("note").is_none());

    // 空字符串不是null，保留
    let exported = to_primitive(
        &schema,
        &object(vec![("note", DataValue::String(String::new()))]),
        ExportOptions::new(),
    )
    .unwrap();
    assert_eq!(exported.get("note"), Some(&DataValue::String(String::new())));
}

#[test]
fn test_export_level_drop_and_override() {
    let schema = Schema::builder("DropModel")
        .field("visible", string_field(None, None, None))
        .field(
            "hidden",
            string_field(None, None, None).with_export_level(ExportLevel::Drop),
        )
        .register()
        .unwrap();

    let instance = object(vec![
        ("visible", DataValue::String("a".to_string())),
        ("hidden", DataValue::String("b".to_string())),
    ]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(exported.get("hidden").is_none());

    // 上下文覆盖取更严格的一方，Drop直接清空输出
    let exported = to_primitive(
        &schema,
        &instance,
        ExportOptions::new().with_export_level(ExportLevel::Drop),
    )
    .unwrap();
    assert!(exported.is_empty());
}

#[test]
fn test_unset_field_exports_as_null_by_default() {
    let schema = Schema::builder("UnsetNullModel")
        .field("name", string_field(None, None, None))
        .field("age", integer_field(None, None))
        .register()
        .unwrap();

    let exported = to_primitive(
        &schema,
        &object(vec![("name", DataValue::String("x".to_string()))]),
        ExportOptions::new(),
    )
    .unwrap();
    // 默认级别下未设值的字段归一为null出现在输出中
    assert_eq!(exported.get("age"), Some(&DataValue::Null));
}

#[test]
fn test_empty_compound_filtered_by_default() {
    let schema = Schema::builder("EmptyCompoundModel")
        .field("tags", list_field(string_field(None, None, None), None, None))
        .register()
        .unwrap();

    let exported = to_primitive(
        &schema,
        &object(vec![("tags", DataValue::Array(Vec::new()))]),
        ExportOptions::new(),
    )
    .unwrap();
    assert!(exported.get("tags").is_none());
}

#[test]
fn test_nested_model_convert_and_export_formats() {
    register_schema(
        Schema::builder("NestedAddress")
            .field("city", string_field(None, None, None).required())
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("NestedPerson")
        .field("name", string_field(None, None, None))
        .field("address", model_field("NestedAddress"))
        .register()
        .unwrap();

    let input = object(vec![
        ("name", DataValue::String("张三".to_string())),
        ("address", object(vec![("city", DataValue::String("上海".to_string()))])),
    ]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    // 嵌套模型转换后打上实例标签
    match data.get("address") {
        Some(DataValue::Model { schema, data }) => {
            assert_eq!(schema, "NestedAddress");
            assert_eq!(data.get("city"), Some(&DataValue::String("上海".to_string())));
        }
        other => panic!("期望Model实例，收到: {:?}", other),
    }

    let instance = DataValue::Object(data);
    // to_native保留实例标签
    let native = to_native(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(matches!(native.get("address"), Some(DataValue::Model { .. })));
    // to_dict把嵌套模型降级为普通映射
    let dict = to_dict(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(matches!(dict.get("address"), Some(DataValue::Object(_))));
    // to_primitive同样降级
    let primitive = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(matches!(primitive.get("address"), Some(DataValue::Object(_))));
}

#[test]
fn test_nested_model_errors_keep_partial_data() {
    register_schema(
        Schema::builder("PartialAddress")
            .field("city", string_field(None, None, None).required())
            .field("zip", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("PartialNestedPerson")
        .field("address", model_field("PartialAddress"))
        .register()
        .unwrap();

    let input = object(vec![(
        "address",
        object(vec![("zip", DataValue::String("200000".to_string()))]),
    )]);
    let err = convert(&schema, &input, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError {
            errors,
            partial_data,
        } => {
            assert!(matches!(
                errors.get("address"),
                Some(SchemaError::DataError { .. })
            ));
            // 嵌套的部分结果写回输出
            match partial_data.get("address") {
                Some(DataValue::Object(inner)) => {
                    assert_eq!(
                        inner.get("zip"),
                        Some(&DataValue::String("200000".to_string()))
                    );
                }
                other => panic!("期望部分数据，收到: {:?}", other),
            }
        }
        other => panic!("期望DataError，收到: {:?}", other),
    }
}

#[test]
fn test_polymorphic_resolution_by_claim_hook() {
    register_schema(
        Schema::builder("PolyCat")
            .field("kind", string_field(None, None, None))
            .field("lives", integer_field(None, None))
            .claim(|data| data.get("kind") == Some(&DataValue::String("cat".to_string())))
            .build()
            .unwrap(),
    )
    .unwrap();
    register_schema(
        Schema::builder("PolyDog")
            .field("kind", string_field(None, None, None))
            .claim(|data| data.get("kind") == Some(&DataValue::String("dog".to_string())))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("PolyOwner")
        .field("pet", poly_model_field(["PolyCat", "PolyDog"]))
        .register()
        .unwrap();

    let input = object(vec![(
        "pet",
        object(vec![
            ("kind", DataValue::String("cat".to_string())),
            ("lives", DataValue::Int(9)),
        ]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("pet") {
        Some(DataValue::Model { schema, .. }) => assert_eq!(schema, "PolyCat"),
        other => panic!("期望Model实例，收到: {:?}", other),
    }

    // 没有模式认领且没有回退候选时属于配置错误，立即向上传播而不聚合
    let input = object(vec![(
        "pet",
        object(vec![("kind", DataValue::String("fish".to_string()))]),
    )]);
    let err = convert(&schema, &input, ImportOptions::new()).unwrap_err();
    assert!(matches!(err, SchemaError::PolymorphicError { .. }));
}

#[test]
fn test_polymorphic_ambiguity_fails() {
    register_schema(
        Schema::builder("PolyGreedyA")
            .field("kind", string_field(None, None, None))
            .claim(|_| true)
            .build()
            .unwrap(),
    )
    .unwrap();
    register_schema(
        Schema::builder("PolyGreedyB")
            .field("kind", string_field(None, None, None))
            .claim(|_| true)
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("PolyGreedyOwner")
        .field("pet", poly_model_field(["PolyGreedyA", "PolyGreedyB"]))
        .register()
        .unwrap();

    let input = object(vec![(
        "pet",
        object(vec![("kind", DataValue::String("x".to_string()))]),
    )]);
    let err = convert(&schema, &input, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::PolymorphicError { field, message } => {
            assert_eq!(field, "pet");
            assert!(message.contains("多个模式"));
        }
        other => panic!("期望PolymorphicError，收到: {:?}", other),
    }
}

#[test]
fn test_polymorphic_fallback_to_hookless_candidate() {
    register_schema(
        Schema::builder("PolyPlain")
            .field("kind", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    register_schema(
        Schema::builder("PolyPicky")
            .field("kind", string_field(None, None, None))
            .claim(|data| data.get("kind") == Some(&DataValue::String("picky".to_string())))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("PolyFallbackOwner")
        .field("pet", poly_model_field(["PolyPlain", "PolyPicky"]))
        .register()
        .unwrap();

    // 钩子都不匹配时回退到首个没有钩子的候选
    let input = object(vec![(
        "pet",
        object(vec![("kind", DataValue::String("other".to_string()))]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("pet") {
        Some(DataValue::Model { schema, .. }) => assert_eq!(schema, "PolyPlain"),
        other => panic!("期望Model实例，收到: {:?}", other),
    }
}

#[test]
fn test_polymorphic_custom_claim_function() {
    register_schema(
        Schema::builder("ClaimedLeft")
            .field("side", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    register_schema(
        Schema::builder("ClaimedRight")
            .field("side", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();

    let claim = ClaimFunction::new(|data| match data.get("side") {
        Some(DataValue::String(s)) if s == "left" => Some("ClaimedLeft".to_string()),
        Some(DataValue::String(s)) if s == "right" => Some("ClaimedRight".to_string()),
        _ => None,
    });
    let schema = Schema::builder("ClaimedOwner")
        .field(
            "value",
            poly_model_field_with_claim(["ClaimedLeft", "ClaimedRight"], claim),
        )
        .register()
        .unwrap();

    let input = object(vec![(
        "value",
        object(vec![("side", DataValue::String("right".to_string()))]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("value") {
        Some(DataValue::Model { schema, .. }) => assert_eq!(schema, "ClaimedRight"),
        other => panic!("期望Model实例，收到: {:?}", other),
    }
}

#[test]
fn test_polymorphic_subclass_expansion() {
    register_schema(
        Schema::builder("PolyBaseShape")
            .field("kind", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    register_schema_with_parent(
        Schema::builder("PolyCircle")
            .field("kind", string_field(None, None, None))
            .field("radius", float_field(None, None))
            .claim(|data| data.get("kind") == Some(&DataValue::String("circle".to_string())))
            .build()
            .unwrap(),
        "PolyBaseShape",
    )
    .unwrap();
    // 单候选时允许其子模式参与匹配
    let schema = Schema::builder("PolyShapeOwner")
        .field("shape", poly_model_field(["PolyBaseShape"]))
        .register()
        .unwrap();

    let input = object(vec![(
        "shape",
        object(vec![
            ("kind", DataValue::String("circle".to_string())),
            ("radius", DataValue::Float(2.0)),
        ]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("shape") {
        Some(DataValue::Model { schema, .. }) => assert_eq!(schema, "PolyCircle"),
        other => panic!("期望Model实例，收到: {:?}", other),
    }
}

#[test]
fn test_polymorphic_fallback_prefers_first_registered_subclass() {
    register_schema(
        Schema::builder("LineupParent")
            .field("kind", string_field(None, None, None))
            .claim(|_| false)
            .build()
            .unwrap(),
    )
    .unwrap();
    for name in ["LineupFirstChild", "LineupSecondChild"] {
        register_schema_with_parent(
            Schema::builder(name)
                .field("kind", string_field(None, None, None))
                .build()
                .unwrap(),
            "LineupParent",
        )
        .unwrap();
    }
    let schema = Schema::builder("LineupOwner")
        .field("pet", poly_model_field(["LineupParent"]))
        .register()
        .unwrap();

    // 子模式按注册顺序排队，回退命中最先注册的无钩子候选
    let input = object(vec![(
        "pet",
        object(vec![("kind", DataValue::String("any".to_string()))]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("pet") {
        Some(DataValue::Model { schema, .. }) => assert_eq!(schema, "LineupFirstChild"),
        other => panic!("期望Model实例，收到: {:?}", other),
    }
}

#[test]
fn test_serializable_computed_on_export() {
    let schema = Schema::builder("ComputedModel")
        .field("first", string_field(None, None, None))
        .field("last", string_field(None, None, None))
        .serializable(
            "full_name",
            string_field(None, None, None),
            |data| match (data.get("first"), data.get("last")) {
                (Some(DataValue::String(first)), Some(DataValue::String(last))) => {
                    DataValue::String(format!("{}{}", last, first))
                }
                _ => DataValue::Undefined,
            },
        )
        .register()
        .unwrap();

    let instance = object(vec![
        ("first", DataValue::String("三".to_string())),
        ("last", DataValue::String("张".to_string())),
    ]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert_eq!(
        exported.get("full_name"),
        Some(&DataValue::String("张三".to_string()))
    );
}

#[test]
fn test_field_order_reorders_output() {
    let schema = Schema::builder("OrderedOutputModel")
        .field("b", integer_field(None, None))
        .field("a", integer_field(None, None))
        .field("z", integer_field(None, None))
        .field_order(["a", "b"])
        .register()
        .unwrap();

    let instance = object(vec![
        ("b", DataValue::Int(2)),
        ("a", DataValue::Int(1)),
        ("z", DataValue::Int(26)),
    ]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    let keys: Vec<&str> = exported.keys().map(String::as_str).collect();
    // 未列出的z排在最前，其余按声明顺序
    assert_eq!(keys, ["z", "a", "b"]);
}

#[test]
fn test_dict_field_conversion() {
    let schema = Schema::builder("DictModel")
        .field("scores", dict_field(integer_field(None, None)))
        .register()
        .unwrap();

    let input = object(vec![(
        "scores",
        object(vec![
            ("math", DataValue::String("90".to_string())),
            ("art", DataValue::Int(85)),
        ]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    match data.get("scores") {
        Some(DataValue::Object(scores)) => {
            assert_eq!(scores.get("math"), Some(&DataValue::Int(90)));
            assert_eq!(scores.get("art"), Some(&DataValue::Int(85)));
        }
        other => panic!("期望Object，收到: {:?}", other),
    }
}

#[test]
fn test_validate_applies_business_rules() {
    let schema = Schema::builder("ValidatedModel")
        .field("name", string_field(Some(3), None, None))
        .register()
        .unwrap();

    let input = object(vec![("name", DataValue::String("abcd".to_string()))]);
    // convert只做类型强制，不检查长度
    assert!(convert(&schema, &input, ImportOptions::new()).is_ok());
    // validate追加业务规则验证
    let err = validate(&schema, &input, ImportOptions::new()).unwrap_err();
    match err {
        SchemaError::DataError { errors, .. } => {
            assert!(matches!(
                errors.get("name"),
                Some(SchemaError::ValidationError { .. })
            ));
        }
        other => panic!("期望DataError，收到: {:?}", other),
    }
}

#[test]
fn test_flatten_and_expand_via_schema() {
    register_schema(
        Schema::builder("FlattenAddress")
            .field("city", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("FlattenPerson")
        .field("name", string_field(None, None, None))
        .field("address", model_field("FlattenAddress"))
        .field("tags", list_field(string_field(None, None, None), None, None))
        .register()
        .unwrap();

    let input = object(vec![
        ("name", DataValue::String("张三".to_string())),
        ("address", object(vec![("city", DataValue::String("上海".to_string()))])),
        (
            "tags",
            DataValue::Array(vec![
                DataValue::String("a".to_string()),
                DataValue::String("b".to_string()),
            ]),
        ),
    ]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    let flat = flatten(
        &schema,
        &DataValue::Object(data),
        ExportOptions::new(),
        None,
    )
    .unwrap();
    assert_eq!(flat.get("name"), Some(&DataValue::String("张三".to_string())));
    assert_eq!(
        flat.get("address.city"),
        Some(&DataValue::String("上海".to_string()))
    );
    assert_eq!(flat.get("tags.0"), Some(&DataValue::String("a".to_string())));
    assert_eq!(flat.get("tags.1"), Some(&DataValue::String("b".to_string())));

    let expanded = expand(&flat);
    match expanded.get("address") {
        Some(DataValue::Object(address)) => {
            assert_eq!(
                address.get("city"),
                Some(&DataValue::String("上海".to_string()))
            );
        }
        other => panic!("期望Object，收到: {:?}", other),
    }
}

#[test]
fn test_null_input_seeds_defaults_without_conversion() {
    let schema = Schema::builder("SeededModel")
        .field("name", string_field(None, None, None).required())
        .field(
            "status",
            string_field(None, None, None).with_default("active"),
        )
        .field(
            "count",
            integer_field(None, None).with_default(DataValue::String("7".to_string())),
        )
        .register()
        .unwrap();

    // 无输入时只铺默认值和初始值，必填检查不触发
    let data = convert(
        &schema,
        &DataValue::Null,
        ImportOptions::new().apply_defaults().init_values(),
    )
    .unwrap();
    assert_eq!(data.get("name"), Some(&DataValue::Null));
    assert_eq!(
        data.get("status"),
        Some(&DataValue::String("active".to_string()))
    );
    // 默认值按原样落位，不经过类型强制
    assert_eq!(data.get("count"), Some(&DataValue::String("7".to_string())));
}

#[test]
fn test_to_dict_keeps_polymorphic_instances_native() {
    register_schema(
        Schema::builder("NativePolyNote")
            .field("text", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("NativePolyOwner")
        .field("note", poly_model_field(["NativePolyNote"]))
        .register()
        .unwrap();

    let input = object(vec![(
        "note",
        object(vec![("text", DataValue::String("备注".to_string()))]),
    )]);
    let data = convert(&schema, &input, ImportOptions::new()).unwrap();
    let instance = DataValue::Object(data);

    // to_dict只降级单模型引用字段，多态字段保持实例标签
    let dict = to_dict(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(matches!(dict.get("note"), Some(DataValue::Model { .. })));
    // to_primitive仍然全量降级
    let primitive = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(matches!(primitive.get("note"), Some(DataValue::Object(_))));
}

#[test]
fn test_list_export_drop_level_skips_elements() {
    register_schema(
        Schema::builder("DropItemNote")
            .field("text", string_field(None, None, None))
            .build()
            .unwrap(),
    )
    .unwrap();
    let schema = Schema::builder("DropListModel")
        .field(
            "notes",
            list_field(
                model_field("DropItemNote").with_export_level(ExportLevel::Drop),
                None,
                None,
            ),
        )
        .register()
        .unwrap();

    // 元素级别为Drop时整体清空，混入的非法元素也不会触发转换错误
    let instance = object(vec![("notes", DataValue::Array(vec![DataValue::Int(1)]))]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    assert!(exported.get("notes").is_none());
}

#[test]
fn test_dict_export_filters_values_by_level() {
    let schema = Schema::builder("DictFilterModel")
        .field(
            "notes",
            dict_field(string_field(None, None, None).with_export_level(ExportLevel::NotNone)),
        )
        .register()
        .unwrap();

    let instance = object(vec![(
        "notes",
        object(vec![
            ("kept", DataValue::String("有内容".to_string())),
            ("dropped", DataValue::Null),
        ]),
    )]);
    let exported = to_primitive(&schema, &instance, ExportOptions::new()).unwrap();
    match exported.get("notes") {
        Some(DataValue::Object(notes)) => {
            assert_eq!(
                notes.get("kept"),
                Some(&DataValue::String("有内容".to_string()))
            );
            assert!(notes.get("dropped").is_none());
        }
        other => panic!("期望Object，收到: {:?}", other),
    }
}

#[test]
fn test_trusted_data_not_overwritten_by_defaults() {
    let schema = Schema::builder("TrustedModel")
        .field(
            "status",
            string_field(None, None, None).with_default("active"),
        )
        .register()
        .unwrap();

    let trusted: DataMap = [(
        "status".to_string(),
        DataValue::String("archived".to_string()),
    )]
    .into_iter()
    .collect();
    let data = convert(
        &schema,
        &object(vec![]),
        ImportOptions::new()
            .apply_defaults()
            .with_trusted_data(trusted),
    )
    .unwrap();
    // 可信底座里的值不被默认值覆盖
    assert_eq!(
        data.get("status"),
        Some(&DataValue::String("archived".to_string()))
    );
}
