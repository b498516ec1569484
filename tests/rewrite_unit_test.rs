//! Unit tests for the rewrite rules through the public library API.

use mssql2pg::rewrite::{RewriteWarning, RuleReport, NUMERIC_PATTERN};
use mssql2pg::{rewrite, Pipeline, Rule};

#[test]
fn test_len_case_insensitive() {
    for input in ["LEN(x)", "Len(x)", "len(x)"] {
        assert_eq!(rewrite(Rule::LengthFunction, input), "length(x)");
    }
}

#[test]
fn test_len_nested_parentheses() {
    assert_eq!(
        rewrite(Rule::LengthFunction, "len(coalesce(a,0))"),
        "length(coalesce(a,0))"
    );
}

#[test]
fn test_len_deeper_nesting() {
    assert_eq!(
        rewrite(
            Rule::LengthFunction,
            "where len(replace(ltrim(rtrim(name)), ' ', '')) > 3"
        ),
        "where length(replace(ltrim(rtrim(name)), ' ', '')) > 3"
    );
}

#[test]
fn test_empty_string_cast() {
    assert_eq!(
        rewrite(Rule::TypeCast, "convert(nvarchar(20), '')"),
        "''::varchar(20)"
    );
}

#[test]
fn test_disallowed_cast_type_is_byte_identical() {
    for input in [
        "convert(uniqueidentifier, id)",
        "CONVERT(varbinary(16), hash)",
        "convert(xml, '<a/>')",
    ] {
        assert_eq!(rewrite(Rule::TypeCast, input), input);
    }
}

#[test]
fn test_cast_type_mapping() {
    let cases = [
        ("convert(nvarchar(50), a.name)", "a.name::varchar(50)"),
        ("convert(nchar(1), flag)", "flag::char(1)"),
        ("convert(double, ratio)", "ratio::double precision"),
        ("convert(datetime, created)", "created::timestamp"),
        ("convert(datetime2, created)", "created::timestamp"),
        ("convert(money, price)", "price::numeric"),
        ("convert(decimal(10,2), price)", "price::decimal(10,2)"),
        ("convert(date, created)", "created::date"),
    ];
    for (input, expected) in cases {
        assert_eq!(rewrite(Rule::TypeCast, input), expected, "input: {}", input);
    }
}

#[test]
fn test_modifier_stripping() {
    assert_eq!(
        rewrite(Rule::TopPercent, "select top 100 percent * from t"),
        "select  * from t"
    );
}

#[test]
fn test_null_check_simplification() {
    assert_eq!(
        rewrite(Rule::NullCheck, "isnull(col, '') != ''"),
        "col IS NOT NULL"
    );
}

#[test]
fn test_numeric_test() {
    assert_eq!(
        rewrite(Rule::NumericTest, "isnumeric(col) = 1"),
        r"col ~ '^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$'"
    );
    assert!(NUMERIC_PATTERN.starts_with("'^"));
}

#[test]
fn test_date_format() {
    assert_eq!(
        rewrite(Rule::DateFormat, "convert(varchar(10), somedate, 120)"),
        "TO_CHAR(somedate, 'YYYY-MM-DD')"
    );
}

#[test]
fn test_date_format_takes_precedence_in_pipeline() {
    let output = Pipeline::default().run("select convert(varchar(10), somedate, 120) from t");

    assert_eq!(output.text, "select TO_CHAR(somedate, 'YYYY-MM-DD') from t");
    let cast = output
        .counts
        .iter()
        .find(|c| c.rule == Rule::TypeCast)
        .unwrap();
    assert_eq!(cast.substitutions, 0);
}

#[test]
fn test_pipeline_rejects_cast_before_date_format() {
    assert!(Pipeline::new(vec![Rule::TypeCast, Rule::LengthFunction, Rule::DateFormat]).is_err());
    assert!(Pipeline::from_names("type-cast,date-format").is_err());
}

#[test]
fn test_no_match_returns_input() {
    let input = "SELECT a, b FROM dbo.t WHERE length(a) > 0";
    for rule in Rule::ALL {
        assert_eq!(rewrite(rule, input), input);
    }
    assert_eq!(Pipeline::default().rewrite(input), input);
}

#[test]
fn test_pipeline_idempotent() {
    let pipeline = Pipeline::default();
    let input = "CREATE VIEW dbo.v AS SELECT TOP 100 PERCENT \
                 convert(nvarchar(20), p.name) AS name, \
                 convert(varchar(10), p.born, 120) AS born, \
                 len(isnull(p.nick, '')) AS nick_len \
                 FROM people p \
                 WHERE isnull(p.email, '') != '' AND isnumeric(p.zip) = 1";
    let once = pipeline.rewrite(input);
    assert_eq!(pipeline.rewrite(&once), once);
}

#[test]
fn test_full_view_definition() {
    let input = "CREATE VIEW dbo.v_people AS SELECT TOP 100 PERCENT \
                 convert(nvarchar(20), p.name) AS name, \
                 convert(varchar(10), p.born, 120) AS born, \
                 LEN(coalesce(p.nick, p.name)) AS nick_len \
                 FROM people p \
                 WHERE isnull(p.email, '') != '' AND isnumeric(p.zip) = 1";

    let output = Pipeline::default().rewrite(input);

    assert_eq!(
        output,
        format!(
            "CREATE VIEW dbo.v_people AS SELECT  \
             p.name::varchar(20) AS name, \
             TO_CHAR(p.born, 'YYYY-MM-DD') AS born, \
             length(coalesce(p.nick, p.name)) AS nick_len \
             FROM people p \
             WHERE p.email IS NOT NULL AND p.zip ~ {}",
            NUMERIC_PATTERN
        )
    );
}

#[test]
fn test_unbalanced_len_reported_not_rewritten() {
    let mut report = RuleReport::default();
    let input = "select len(a from t";
    let output = Rule::LengthFunction.apply_with(input, &mut report);

    assert_eq!(output, input);
    assert!(matches!(
        report.warnings.as_slice(),
        [RewriteWarning::UnbalancedCall { offset: 7, .. }]
    ));
}

#[test]
fn test_rules_are_thread_safe() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let input = format!("select len(col_{}) from t", i);
                rewrite(Rule::LengthFunction, &input)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            format!("select length(col_{}) from t", i)
        );
    }
}

#[test]
fn test_pipeline_many_unclosed_len_calls() {
    let input = "len(".repeat(10_000);
    let output = Pipeline::default().run(&input);

    assert_eq!(output.text, input);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.total_substitutions(), 0);
}

#[test]
fn test_deeply_nested_len_calls() {
    let depth = 5_000;
    let input = format!("{}x{}", "LEN(".repeat(depth), ")".repeat(depth));

    assert_eq!(
        rewrite(Rule::LengthFunction, &input),
        format!("{}x{}", "length(".repeat(depth), ")".repeat(depth))
    );
}

#[test]
fn test_word_boundaries_are_unicode_aware() {
    // An identifier continuing from non-ASCII letters is one word
    assert_eq!(rewrite(Rule::LengthFunction, "名称len(x)"), "名称len(x)");
    assert_eq!(rewrite(Rule::LengthFunction, "名称 len(x)"), "名称 length(x)");
    assert_eq!(
        rewrite(Rule::TypeCast, "éconvert(int, a)"),
        "éconvert(int, a)"
    );
}
