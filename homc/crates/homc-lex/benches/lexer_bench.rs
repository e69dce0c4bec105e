use criterion::{black_box, criterion_group, criterion_main, Criterion};
use homc_lex::lex;
use homc_util::span::SourceFile;

fn bench_lexer(c: &mut Criterion) {
    let unit = "dis Nat { Zero, Succ(p: Nat) }\n\
                fun add(a: Nat, b: Nat) -> Nat {\n\
                    ret fit b { Zero => a, Succ => Nat::Succ(add(a, b.p)) };\n\
                }\n";
    let source: String = std::iter::repeat(unit).take(200).collect();
    let file = SourceFile::new(0, "bench.hom", source.as_str());

    c.bench_function("lex_200_functions", |b| {
        b.iter(|| {
            let tokens = lex(black_box(&file));
            black_box(tokens.len())
        })
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
