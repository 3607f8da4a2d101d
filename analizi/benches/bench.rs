use analizi::{parse_commands, Environment, IoState};
use criterion::{criterion_group, criterion_main, Criterion};

const PRELUDE: &str = "
axiom N : Type.{1}
axiom zero : N
axiom add : N -> N -> N
axiom mul : N -> N -> N
axiom neg : N -> N
axiom ite : N -> N -> N -> N
infixl `+`:65 := add
infixl `*`:70 := mul
prefix `-`:100 := neg
notation `if` c `then` t `else` e := ite c t e
";

/// Operator chains of the given length, one `check` per line.
fn chains(lines: usize, len: usize) -> String {
    let ops = [" + ", " * ", " + - "];
    let mut s = String::from(PRELUDE);
    for i in 0..lines {
        s += "check if zero then zero";
        for j in 0..len {
            s += ops[(i + j) % ops.len()];
            s += "zero";
        }
        s += " else zero\n";
    }
    s
}

/// Definitions with many binders, each used in the body.
fn binders(lines: usize, len: usize) -> String {
    let mut s = String::from(PRELUDE);
    for i in 0..lines {
        s += &format!("definition d{} (x0 : N)", i);
        (1..len).for_each(|j| s += &format!(" (x{} : N)", j));
        s += " : N := x0";
        (1..len).for_each(|j| s += &format!(" + x{}", j));
        s += "\n";
    }
    s
}

fn run(src: &str) -> bool {
    let mut env = Environment::new();
    let mut ios = IoState::sink();
    parse_commands(&mut env, &mut ios, src, "<bench>", None, true).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let chains = chains(100, 50);
    let binders = binders(100, 20);

    c.bench_function("chains", |b| b.iter(|| run(&chains)));
    c.bench_function("binders", |b| b.iter(|| run(&binders)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
