//! Round-trip properties over a small multi-dialect corpus
//!
//! Every source must parse losslessly, print verbatim under `layout:
//! preserve`, format idempotently and keep all of its comments.

use sqlfmt_core::cst::{parse_sql, print_verbatim, tokenize};
use sqlfmt_core::dialect::ParamTypeSet;
use sqlfmt_core::{
    Dialect, FormatOptions, KeywordCase, LayoutMode, RoundTripValidator, SqlFormatter,
    StylePolicy,
};

const COMMON: &[&str] = &[
    "select 1",
    "SELECT a, b FROM t WHERE a = 1;\n",
    "-- report header\n\nselect a, -- first column\n       b /* second */\n  from t\n where a = 1;\n\n-- trailing note\n",
    "with recent as (select * from orders where total > 10)\nselect r.id, count(*) n from recent r left join items i on i.order_id = r.id group by r.id having count(*) > 1 order by 2 desc;\n",
    "select case when a is null then 'none' when a < 0 then 'negative' else 'positive' end as sign from t",
    "select a from t where a not in (1, 2, 3) and b between 1 and 10 and not exists (select 1 from u where u.id = t.id)",
    "select a from t union all select b from u union select c from v",
    "insert into t (a, b) values (1, 'one'), (2, 'two');\nupdate t set a = a + 1 where b = 'one';\ndelete from t where a > 100;\n",
    "select cast(a as varchar(20)), -b, - -c, (a + b) * c from t",
    "select t.a,u.b from t inner join u on t.id=u.id cross join v",
    "select a from t order by a asc nulls first limit 5 offset 10",
    "select count(distinct a), max(b) from t group by c, d",
];

fn dialect_samples(dialect: &Dialect) -> &'static [&'static str] {
    match dialect.name {
        "sqlite" => &[
            "select [first name], `last`, \"id\" from people where x == :x or y = ?2",
            "insert into log default values returning id",
            "insert into kv (k, v) values ('a', 1) on conflict (k) do update set v = excluded.v",
            "select name from t where name collate nocase = 'x' and a is not distinct from b",
        ],
        "postgresql" => &[
            "select a::numeric(10, 2), b from t where id = $1 and name ilike $2",
            "select $$ body $$, E'esc\\n' from t /* outer /* nested */ comment */",
            "update t set a = 1 from u where t.id = u.id returning *",
            "select distinct on (customer_id) customer_id, placed_at from orders order by customer_id, placed_at desc limit all",
            "select id from jobs where state = 'queued' order by id limit 10 for update skip locked",
            "select * from t for no key update of t for key share nowait",
            "select tags[1], (string_to_array(path, '/'))[2:3], array[1, 2, 3], array[[1], [2]], array(select id from t) from docs",
            "select a from t where a is distinct from b and name ~* '^a' and code !~ '[0-9]' and body ~ 'x' and body !~* 'y'",
            "select a from t where created_at > now() - interval '1 day' and label collate \"C\" < 'm'",
            "select x.a, x.b from (select 1, 2) as x(a, b) join u y (c) on y.c = x.a",
            "insert into counters (k, n) values ('a', 1) on conflict (k) do update set n = counters.n + excluded.n where counters.n < 100 returning n",
            "insert into t (a) values (1) on conflict on constraint t_pkey do nothing",
        ],
        "mysql" => &[
            "# hash comment\nselect `a` from t where b = \"text\" and c = 'it\\'s' and d = ?",
            "insert t values (1)",
            "select * from t where a && b || c",
            "select * from t where a = 1 for update",
            "select name collate utf8mb4_bin from t for share skip locked",
        ],
        "bigquery" => &[
            "select a, b, from `project.dataset.t` where c = @param",
            "delete t where a = 1",
            "select date '2024-01-01', a is distinct from b from t",
        ],
        _ => &[],
    }
}

fn corpus(dialect: &Dialect) -> impl Iterator<Item = &'static str> {
    COMMON.iter().copied().chain(dialect_samples(dialect).iter().copied())
}

#[test]
fn test_parse_is_lossless() {
    for &dialect in Dialect::all() {
        for source in corpus(dialect) {
            let parse = parse_sql(source, dialect)
                .unwrap_or_else(|e| panic!("{dialect}: failed to parse {source:?}: {e}"));
            assert_eq!(parse.root.text().to_string(), source, "{dialect}");
        }
    }
}

#[test]
fn test_verbatim_printing_reproduces_input() {
    for &dialect in Dialect::all() {
        let options = FormatOptions::new()
            .layout(LayoutMode::Preserve)
            .keyword_case(KeywordCase::Preserve);
        let policy = StylePolicy::resolve(&options, dialect.name).unwrap();
        for source in corpus(dialect) {
            let parse = parse_sql(source, dialect).unwrap();
            assert_eq!(print_verbatim(&parse.root, &policy), source, "{dialect}");
        }
    }
}

#[test]
fn test_trivia_is_complete() {
    for &dialect in Dialect::all() {
        for source in corpus(dialect) {
            let lexed = tokenize(
                source,
                dialect,
                ParamTypeSet::from_slice(dialect.default_param_types),
            );
            let parse = parse_sql(source, dialect).unwrap();
            let in_tree = parse
                .root
                .descendants_with_tokens()
                .filter_map(|element| element.into_token())
                .filter(|token| token.kind().is_trivia())
                .count();
            assert_eq!(in_tree, lexed.stream.trivia_count(), "{dialect}: {source:?}");
        }
    }
}

#[test]
fn test_validator_accepts_corpus() {
    for &dialect in Dialect::all() {
        let policy = StylePolicy::resolve(&FormatOptions::new(), dialect.name).unwrap();
        let validator = RoundTripValidator::new(policy);
        for source in corpus(dialect) {
            let result = validator.validate(source).unwrap();
            assert!(
                result.is_valid(),
                "{dialect}: {source:?}\n{:?}\n{}",
                result.issues,
                result.formatted
            );
        }
    }
}

#[test]
fn test_canonical_formatting_is_idempotent() {
    for &dialect in Dialect::all() {
        for width in [20, 40, 80] {
            let options = FormatOptions::new()
                .canonical_syntax(true)
                .print_width(width);
            let policy = StylePolicy::resolve(&options, dialect.name).unwrap();
            let validator = RoundTripValidator::new(policy);
            for source in corpus(dialect) {
                let result = validator.validate(source).unwrap();
                assert!(
                    result.is_valid(),
                    "{dialect} @ {width}: {source:?}\n{:?}\n{}",
                    result.issues,
                    result.formatted
                );
            }
        }
    }
}

#[test]
fn test_keyword_case_leaves_identifiers_alone() {
    let options = FormatOptions::new().keyword_case(KeywordCase::Upper);
    let formatter = SqlFormatter::new(&options, "sqlite").unwrap();
    let formatted = formatter
        .format("select MixedCase, lower_case from SomeTable where Flag = 'Text'")
        .unwrap();
    assert_eq!(
        formatted,
        "SELECT MixedCase, lower_case FROM SomeTable WHERE Flag = 'Text'"
    );
}

#[test]
fn test_formatting_is_deterministic() {
    let formatter = SqlFormatter::new(&FormatOptions::new().print_width(30), "postgresql").unwrap();
    let sources: Vec<&str> = corpus(&sqlfmt_core::POSTGRESQL).collect();
    let first = formatter.format_many(&sources);
    let second = formatter.format_many(&sources);
    let first: Vec<_> = first.into_iter().map(|r| r.unwrap()).collect();
    let second: Vec<_> = second.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_postgres_extensions_format_idempotently() {
    let formatter = SqlFormatter::new(&FormatOptions::new(), "postgresql").unwrap();
    let cases = [
        (
            "select distinct on (a) a, b from t order by a limit all for update of t nowait",
            "SELECT DISTINCT ON (a) a, b FROM t ORDER BY a LIMIT ALL FOR UPDATE OF t NOWAIT",
        ),
        (
            "select tags[1:2], array[1,2], interval '1 day' from t x(tags)",
            "SELECT tags[1:2], ARRAY[1, 2], INTERVAL '1 day' FROM t x(tags)",
        ),
        (
            "insert into t (a) values (1) on conflict (a) do nothing",
            "INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO NOTHING",
        ),
    ];
    for (source, expected) in cases {
        let once = formatter.format(source).unwrap();
        assert_eq!(once, expected);
        assert_eq!(formatter.format(&once).unwrap(), once);
    }
}
