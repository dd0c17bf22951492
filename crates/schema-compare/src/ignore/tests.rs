use super::*;
use proptest::prelude::*;

fn log(
    kind: CompareType,
    state: CompareState,
    name: &str,
    attribute: CompareAttribute,
    expected: Option<&str>,
    found: Option<&str>,
) -> CompareLog {
    CompareLog::new(
        kind,
        state,
        Some(name.to_string()),
        attribute,
        expected.map(str::to_string),
        found.map(str::to_string),
    )
}

fn renamed_table() -> CompareLog {
    log(
        CompareType::Entity,
        CompareState::NotInDatabase,
        "Book",
        CompareAttribute::TableName,
        Some("Books"),
        None,
    )
}

#[test]
fn test_rule_rejects_ok_and_debug() {
    assert!(IgnoreRule::new(CompareType::Entity, CompareState::Ok).is_err());
    assert!(IgnoreRule::new(CompareType::Entity, CompareState::Debug).is_err());
    assert!(IgnoreRule::new(CompareType::Entity, CompareState::NotChecked).is_ok());
    assert!(matches!(
        IgnoreRule::parse("OK: Entity 'Book'"),
        Err(CompareError::Config(_))
    ));
}

#[test]
fn test_verdict_must_match_exactly() {
    let rule = IgnoreRule::new(CompareType::MatchAnything, CompareState::Different).unwrap();
    assert!(!rule.matches(&renamed_table()));

    let rule = IgnoreRule::new(CompareType::MatchAnything, CompareState::NotInDatabase).unwrap();
    assert!(rule.matches(&renamed_table()));
}

#[test]
fn test_kind_name_and_attribute_filters() {
    let base = IgnoreRule::new(CompareType::Entity, CompareState::NotInDatabase).unwrap();
    assert!(base.matches(&renamed_table()));
    assert_eq!(base.attribute(), CompareAttribute::MatchAnything);

    assert!(base.clone().with_name("Book").matches(&renamed_table()));
    assert!(!base.clone().with_name("Author").matches(&renamed_table()));
    assert!(
        base.clone()
            .with_attribute(CompareAttribute::TableName)
            .matches(&renamed_table())
    );
    assert!(
        !base
            .with_attribute(CompareAttribute::ColumnName)
            .matches(&renamed_table())
    );

    let property = IgnoreRule::new(CompareType::Property, CompareState::NotInDatabase).unwrap();
    assert!(!property.matches(&renamed_table()));
}

#[test]
fn test_rule_values() {
    assert!(RuleValue::Wildcard.matches(None));
    assert!(RuleValue::Wildcard.matches(Some("x")));
    assert!(RuleValue::Absent.matches(None));
    assert!(!RuleValue::Absent.matches(Some("x")));
    assert!(RuleValue::present("x").matches(Some("x")));
    assert!(!RuleValue::present("x").matches(Some("y")));
    assert!(!RuleValue::present("x").matches(None));

    assert_eq!(RuleValue::from_option(None), RuleValue::Wildcard);
    assert_eq!(RuleValue::from_option(Some("<null>")), RuleValue::Absent);
    assert_eq!(RuleValue::from_option(Some("int")), RuleValue::present("int"));
}

#[test]
fn test_expected_value_filter() {
    let rule = IgnoreRule::new(CompareType::Entity, CompareState::NotInDatabase)
        .unwrap()
        .with_expected(RuleValue::present("Books"));
    assert!(rule.matches(&renamed_table()));

    let rule = rule.with_expected(RuleValue::present("Authors"));
    assert!(!rule.matches(&renamed_table()));
}

#[test]
fn test_parse_rule_from_report_line() {
    let rule = IgnoreRule::parse(
        "DIFFERENT: Book->Property 'Price', column type. Expected = decimal(9,2), found = money",
    )
    .unwrap();
    assert_eq!(rule.kind(), CompareType::Property);
    assert_eq!(rule.state(), CompareState::Different);
    assert_eq!(rule.name(), Some("Price"));
    assert_eq!(rule.attribute(), CompareAttribute::ColumnType);
    assert_eq!(rule.expected(), &RuleValue::present("decimal(9,2)"));
    assert_eq!(rule.found(), &RuleValue::present("money"));

    let candidate = log(
        CompareType::Property,
        CompareState::Different,
        "Price",
        CompareAttribute::ColumnType,
        Some("decimal(9,2)"),
        Some("money"),
    );
    assert!(rule.matches(&candidate));

    let other = log(
        CompareType::Property,
        CompareState::Different,
        "Price",
        CompareAttribute::ColumnType,
        Some("decimal(9,2)"),
        Some("float"),
    );
    assert!(!rule.matches(&other));
}

#[test]
fn test_parse_missing_segments_are_wildcards() {
    let rule = IgnoreRule::parse("NOT IN DATABASE: Entity 'Book'").unwrap();
    assert_eq!(rule.attribute(), CompareAttribute::NotSet);
    assert_eq!(rule.expected(), &RuleValue::Wildcard);
    assert_eq!(rule.found(), &RuleValue::Wildcard);

    let rule = IgnoreRule::parse("NOT IN DATABASE: Entity '', table name").unwrap();
    assert_eq!(rule.name(), None);
    assert_eq!(rule.expected(), &RuleValue::Wildcard);
    assert!(rule.matches(&renamed_table()));
}

#[test]
fn test_parse_null_token_only_matches_absent() {
    let rule = IgnoreRule::parse(
        "DIFFERENT: Message->Property 'IntRequiredDefault0', default value sql. Expected = 0, found = <null>",
    )
    .unwrap();
    assert_eq!(rule.found(), &RuleValue::Absent);

    let absent = log(
        CompareType::Property,
        CompareState::Different,
        "IntRequiredDefault0",
        CompareAttribute::DefaultValueSql,
        Some("0"),
        None,
    );
    let present = log(
        CompareType::Property,
        CompareState::Different,
        "IntRequiredDefault0",
        CompareAttribute::DefaultValueSql,
        Some("0"),
        Some("1"),
    );
    assert!(rule.matches(&absent));
    assert!(!rule.matches(&present));
}

#[test]
fn test_ignore_list_parse_lines() {
    let text = "NOT IN DATABASE: Entity 'Book', table name. Expected = Books\r\n\r\n   \nEXTRA IN DATABASE: Column 'Books', column name. Found = ExtraColumn\n";
    let list = IgnoreList::parse_lines(text).unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.should_ignore(&renamed_table()));
    assert!(list.should_ignore(&log(
        CompareType::Column,
        CompareState::ExtraInDatabase,
        "Books",
        CompareAttribute::ColumnName,
        None,
        Some("ExtraColumn"),
    )));
    assert!(!list.should_ignore(&log(
        CompareType::Column,
        CompareState::ExtraInDatabase,
        "Books",
        CompareAttribute::ColumnName,
        None,
        Some("Other"),
    )));
}

#[test]
fn test_ignore_list_parse_error_is_reported() {
    let err = IgnoreList::parse_lines("NOT IN DATABASE: Entity 'Book'\nNOPE: Entity 'Book'").unwrap_err();
    assert!(matches!(err, CompareError::Parse { .. }));
}

#[test]
fn test_empty_list_ignores_nothing() {
    let list = IgnoreList::new();
    assert!(list.is_empty());
    assert!(!list.should_ignore(&renamed_table()));
}

#[test]
fn test_from_iterator() {
    let list: IgnoreList = [CompareState::Different, CompareState::NotInDatabase]
        .into_iter()
        .map(|state| IgnoreRule::new(CompareType::MatchAnything, state).unwrap())
        .collect();
    assert_eq!(list.rules().len(), 2);
    assert!(list.should_ignore(&renamed_table()));
}

fn arb_error_state() -> impl Strategy<Value = CompareState> {
    prop::sample::select(
        CompareState::ALL
            .iter()
            .copied()
            .filter(|s| *s > CompareState::Ok)
            .collect::<Vec<_>>(),
    )
}

#[test]
fn test_trailing_space_value_suppresses_itself() {
    let record = log(
        CompareType::Property,
        CompareState::Different,
        "Created",
        CompareAttribute::DefaultValueSql,
        Some("getdate()"),
        Some("getdate() "),
    );
    let list = IgnoreList::parse_lines(&format!("{record}\r\n")).unwrap();
    assert!(list.should_ignore(&record));

    let trimmed = log(
        CompareType::Property,
        CompareState::Different,
        "Created",
        CompareAttribute::DefaultValueSql,
        Some("getdate()"),
        Some("getdate()"),
    );
    assert!(!list.should_ignore(&trimmed));
}

proptest! {
    #[test]
    fn rendered_line_suppresses_its_record(
        kind in prop::sample::select(CompareType::ALL),
        state in arb_error_state(),
        attribute in prop::sample::select(CompareAttribute::ALL),
        name in prop::option::of("[A-Za-z0-9_]{1,12}"),
        expected in prop::option::of("[A-Za-z0-9_(),]{1,12}"),
        found in prop::option::of("[A-Za-z0-9_()]{1,12} {0,2}"),
    ) {
        let record = CompareLog::new(kind, state, name, attribute, expected, found);
        let list = IgnoreList::parse_lines(&record.to_string()).unwrap();
        prop_assert!(list.should_ignore(&record));
    }
}
