//! Benchmarks for the lex → parse → print pipeline
//!
//! Measures each stage separately on a mid-sized report query and the whole
//! pipeline on a multi-statement file, serial and through `format_many`.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlfmt_core::cst::{parse_sql, print_tree, tokenize};
use sqlfmt_core::dialect::ParamTypeSet;
use sqlfmt_core::{FormatOptions, POSTGRESQL, SqlFormatter, StylePolicy};
use std::hint::black_box;

const REPORT_QUERY: &str = r#"-- monthly revenue per customer
with paid as (
    select o.customer_id, o.total, o.created_at
    from orders o
    where o.status = 'paid' and o.created_at >= $1 -- window start
)
select c.id, c.name, count(*) as orders, sum(p.total) as revenue,
       case when sum(p.total) > 1000 then 'gold' when sum(p.total) > 100 then 'silver' else 'bronze' end tier
from customers c
left join paid p on p.customer_id = c.id
where c.deleted_at is null
group by c.id, c.name
having count(*) > 0
order by revenue desc nulls last
limit 100;
"#;

fn migration_file(statements: usize) -> String {
    let mut source = String::new();
    for i in 0..statements {
        source.push_str(&format!(
            "insert into audit (id, kind, payload) values ({i}, 'update', '{{}}');\n\
             update accounts set balance = balance - {i} where id = {i} and balance >= {i};\n\
             select id, balance from accounts where id in (select account_id from audit where id = {i});\n"
        ));
    }
    source
}

fn bench_stages(c: &mut Criterion) {
    let params = ParamTypeSet::from_slice(POSTGRESQL.default_param_types);
    let policy = StylePolicy::resolve(&FormatOptions::new(), "postgresql").unwrap();
    let parse = parse_sql(REPORT_QUERY, &POSTGRESQL).unwrap();

    let mut group = c.benchmark_group("stages");
    group.throughput(Throughput::Bytes(REPORT_QUERY.len() as u64));
    group.bench_function("lex", |b| {
        b.iter(|| tokenize(black_box(REPORT_QUERY), &POSTGRESQL, params));
    });
    group.bench_function("parse", |b| {
        b.iter(|| parse_sql(black_box(REPORT_QUERY), &POSTGRESQL));
    });
    group.bench_function("print", |b| {
        b.iter(|| print_tree(black_box(&parse.root), &policy));
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let formatter = SqlFormatter::new(&FormatOptions::new().canonical_syntax(true), "postgresql")
        .unwrap();

    let mut group = c.benchmark_group("pipeline");
    for statements in [10, 100] {
        let source = migration_file(statements);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("format", statements),
            &source,
            |b, source| b.iter(|| formatter.format(black_box(source))),
        );
    }

    let files: Vec<String> = (0..32).map(|_| REPORT_QUERY.to_string()).collect();
    group.bench_function("format_many_32", |b| {
        b.iter(|| formatter.format_many(black_box(&files)));
    });
    group.finish();
}

criterion_group!(benches, bench_stages, bench_pipeline);
criterion_main!(benches);
