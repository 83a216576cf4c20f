// ==========================================
// 批量导入管道集成测试
// ==========================================
// 测试目标: 完整管道 解码 → 字段解析 → 校验 → SQLite 提交
// ==========================================


use statement_registry::config::config_keys;
use statement_registry::domain::{DeclaredFormat, EntityType};
use statement_registry::importer::{generate_template, BulkImporter, ImportError};
use statement_registry::logging;
use test_helpers::{create_test_db, create_test_importer, csv, insert_test_config, xlsx};

#[tokio::test]
async fn test_example_branch_scenario() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            csv(&[
                "code,name",
                ",Kigali Main Branch",
                "KGL,Kigali Main Branch",
                "KGL,Dup",
            ]),
            DeclaredFormat::Csv,
            EntityType::Branch,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failed_count(), 2);
    assert_eq!(result.errors().len(), 2);
    assert!(result.errors()[0].starts_with("Row 1:"));
    assert!(result.errors()[0].contains("Branch code is required"));
    assert_eq!(result.errors()[1], "Row 3: Branch code already exists");

    let branches = importer.gateway().list_branches().unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].name, "Kigali Main Branch");
}

#[tokio::test]
async fn test_totals_equal_non_blank_rows() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            csv(&[
                "accountNumber,customerName,phoneNumber",
                "4001,Jane Doe,0788000001",
                "",
                ",,",
                "4002,,0788000002",
                "4003,John Doe,",
                "4004,Ann,0788000004",
            ]),
            DeclaredFormat::Csv,
            EntityType::Registration,
        )
        .await
        .unwrap();

    // 6 行数据中 2 行空白
    assert_eq!(result.total_processed(), 4);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failed_count(), 2);
    assert_eq!(
        result.errors(),
        &[
            "Row 2: Customer name is required".to_string(),
            "Row 3: Phone number is required".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_intra_batch_uniqueness_both_orders() {
    logging::init_test();

    for lines in [
        ["code,name", "KGL,Kigali", "kgl,Kigali again"],
        ["code,name", "kgl,Kigali again", "KGL,Kigali"],
    ] {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path);

        let result = importer
            .run_import(csv(&lines), DeclaredFormat::Csv, EntityType::Branch)
            .await
            .unwrap();

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.errors(), &["Row 2: Branch code already exists".to_string()]);
    }
}

#[tokio::test]
async fn test_phone_emptied_by_cleaning_is_rejected() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            csv(&["accountNumber,customerName,phoneNumber", "4001,Jane,--"]),
            DeclaredFormat::Csv,
            EntityType::Registration,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.errors(), &["Row 1: Phone number is required".to_string()]);
    assert!(importer.gateway().list_registrations().unwrap().is_empty());
}

#[tokio::test]
async fn test_uniqueness_against_existing_state() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    importer
        .run_import(csv(&["code,name", "KGL,Kigali"]), DeclaredFormat::Csv, EntityType::Branch)
        .await
        .unwrap();

    // 第二次运行的快照包含上一次的提交
    let second = importer
        .run_import(csv(&["code,name", "KGL,Kigali"]), DeclaredFormat::Csv, EntityType::Branch)
        .await
        .unwrap();

    assert_eq!(second.success_count(), 0);
    assert_eq!(second.errors(), &["Row 1: Branch code already exists".to_string()]);
}

#[tokio::test]
async fn test_template_round_trip_all_entities_both_formats() {
    logging::init_test();

    for format in [DeclaredFormat::Csv, DeclaredFormat::Spreadsheet] {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path);

        // 按依赖顺序: 网点 → 签发人 → 账户登记
        for entity_type in EntityType::ALL {
            let template = generate_template(entity_type, format, b',').unwrap();

            let result = importer
                .run_import(template.bytes, format, entity_type)
                .await
                .unwrap();

            assert_eq!(
                (result.success_count(), result.failed_count()),
                (1, 0),
                "{} template ({}) should import cleanly: {:?}",
                entity_type,
                format,
                result.errors()
            );
        }

        let registrations = importer.gateway().list_registrations().unwrap();
        assert_eq!(registrations[0].account_number, "4001234567");
        assert_eq!(registrations[0].email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(registrations[0].branch, "default-branch");
        assert_eq!(registrations[0].issued_by, "default-issuer");
    }
}

#[tokio::test]
async fn test_alias_headers_resolve_like_primary() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            csv(&[
                "Account Number,Full Name,Phone Number,Email,ID Number",
                "4001 234 567,  Jane   Doe ,(0788) 123-456,Jane@Example.COM,",
            ]),
            DeclaredFormat::Csv,
            EntityType::Registration,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1, "{:?}", result.errors());

    let stored = &importer.gateway().list_registrations().unwrap()[0];
    assert_eq!(stored.account_number, "4001234567");
    assert_eq!(stored.customer_name, "Jane Doe");
    assert_eq!(stored.phone_number, "0788123456");
    assert_eq!(stored.email.as_deref(), Some("jane@example.com"));
    assert_eq!(stored.id_number, None);
}

#[tokio::test]
async fn test_malformed_row_does_not_affect_others() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            xlsx(
                &["code", "name"],
                &[&["KGL", "Kigali"], &["", ""], &["HYE", "Huye"]],
            ),
            DeclaredFormat::Spreadsheet,
            EntityType::Branch,
        )
        .await
        .unwrap();

    // 第 2 行空白被跳过，不计入行号
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failed_count(), 0);

    let result = importer
        .run_import(
            csv(&["code,name", "MUS,", "RBV,Rubavu"]),
            DeclaredFormat::Csv,
            EntityType::Branch,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.errors(), &["Row 1: Branch name is required".to_string()]);
}

#[tokio::test]
async fn test_issuer_requires_branch() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    importer
        .run_import(csv(&["code,name", "KGL,Kigali"]), DeclaredFormat::Csv, EntityType::Branch)
        .await
        .unwrap();

    let result = importer
        .run_import(
            csv(&[
                "Issuer Name,Branch Code",
                "JDoe,kgl",
                "asmith,HYE",
                "jdoe,KGL",
            ]),
            DeclaredFormat::Csv,
            EntityType::Issuer,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(
        result.errors(),
        &[
            "Row 2: Branch not found".to_string(),
            "Row 3: Issuer already exists".to_string(),
        ]
    );

    let issuers = importer.gateway().list_issuers().unwrap();
    assert_eq!(issuers[0].name, "jdoe");
    assert_eq!(issuers[0].branch_code, "KGL");
}

#[tokio::test]
async fn test_structural_failures_produce_no_result() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let corrupt = importer
        .run_import(
            b"PK\x03\x04 not really a zip".to_vec(),
            DeclaredFormat::Spreadsheet,
            EntityType::Branch,
        )
        .await;
    assert!(matches!(corrupt, Err(ImportError::Decode(_))));

    let empty = importer
        .run_import(Vec::new(), DeclaredFormat::Csv, EntityType::Branch)
        .await;
    assert!(matches!(empty, Err(ImportError::Decode(_))));

    assert!(importer.gateway().list_branches().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_utf8_in_data_row_aborts_whole_file() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let mut bytes = b"code,name\nKGL,Kigali\n".to_vec();
    bytes.extend_from_slice(&[b'H', b'Y', b'E', b',', 0xFF, 0xFE, b'\n']);

    let outcome = importer
        .run_import(bytes, DeclaredFormat::Csv, EntityType::Branch)
        .await;

    assert!(matches!(outcome, Err(ImportError::Decode(_))));
    // 解码在行循环之前完成，第一行也不会被提交
    assert!(importer.gateway().list_branches().unwrap().is_empty());
}

#[tokio::test]
async fn test_config_drives_delimiter_and_registration_defaults() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::CSV_DELIMITER, ";").unwrap();
    insert_test_config(&db_path, config_keys::REGISTRATION_BRANCH, "KGL").unwrap();
    insert_test_config(&db_path, config_keys::REGISTRATION_ISSUED_BY, "jdoe").unwrap();
    let importer = create_test_importer(&db_path);

    let result = importer
        .run_import(
            csv(&[
                "accountNumber;customerName;phoneNumber",
                "4001;Jane Doe;0788000001",
            ]),
            DeclaredFormat::Csv,
            EntityType::Registration,
        )
        .await
        .unwrap();

    assert_eq!(result.success_count(), 1, "{:?}", result.errors());
    let stored = &importer.gateway().list_registrations().unwrap()[0];
    assert_eq!(stored.branch, "KGL");
    assert_eq!(stored.issued_by, "jdoe");
}
