use analizi::env::DeclKind;
use analizi::expr::{Binder, BinderInfo};
use analizi::io::{OptionValue, SharedBuf, VERBOSE};
use analizi::script::Scripting;
use analizi::{parse_commands, parse_commands_file, Environment, Error, Expr, IoState, Name, Parser, Pos};

struct Run {
    ok: bool,
    env: Environment,
    out: String,
    err: String,
}

fn run_with(src: &str, scripting: Option<&mut dyn Scripting>) -> Run {
    let (out, err) = (SharedBuf::new(), SharedBuf::new());
    let mut ios = IoState::new(Box::new(out.clone()), Box::new(err.clone()));
    let mut env = Environment::new();
    let ok = parse_commands(&mut env, &mut ios, src, "test", scripting, false).unwrap();
    let (out, err) = (out.contents(), err.contents());
    Run { ok, env, out, err }
}

fn run(src: &str) -> Run {
    run_with(src, None)
}

fn c(s: &str) -> Expr {
    Expr::constant(Name::new(s), Vec::new())
}

const PRELUDE: &str = "
axiom N : Prop
axiom x : N
axiom y : N
axiom z : N
axiom add : N
axiom mul : N
";

#[test]
fn errors_are_isolated() {
    let r = run("check foo\naxiom A : Prop\ncheck A\n");
    assert!(!r.ok);
    assert!(r.env.get("A").is_some());
    assert_eq!(r.err, "test:1:6: error: unknown identifier 'foo'\n");
    assert_eq!(r.out, "A : Prop\n");
}

#[test]
fn lexical_errors_are_isolated() {
    let r = run("check $ x\naxiom A : Prop\n");
    assert!(!r.ok);
    assert!(r.env.get("A").is_some());
    assert!(r.err.starts_with("test:1:6: error:"));
}

#[test]
fn exceptions_abort() {
    let mut env = Environment::new();
    let mut ios = IoState::sink();
    let src = "check foo\naxiom A : Prop\n";
    let r = parse_commands(&mut env, &mut ios, src, "test", None, true);
    match r {
        Err(Error::Parse(e)) => assert_eq!(e.pos, Pos::new(1, 6)),
        _ => panic!("parse error expected"),
    }
    assert!(env.get("A").is_none());
}

#[test]
fn interrupt() {
    use std::sync::{atomic::AtomicBool, Arc};
    let mut ios = IoState::sink();
    let p = Parser::from_str(Environment::new(), &mut ios, "axiom A : Prop\n");
    let mut p = p.with_interrupt(Arc::new(AtomicBool::new(true)));
    assert!(matches!(p.parse_commands(), Err(Error::Interrupt)));
    assert!(p.env().get("A").is_none());
}

#[test]
fn file_input() {
    let dir = std::env::temp_dir();
    let path = dir.join("analizi-file-input.lean");
    std::fs::write(&path, "axiom A : Prop\ncheck B\n").unwrap();
    let err = SharedBuf::new();
    let mut ios = IoState::new(Box::new(std::io::sink()), Box::new(err.clone()));
    let mut env = Environment::new();
    let ok = parse_commands_file(&mut env, &mut ios, &path, None, false).unwrap();
    assert!(!ok && env.get("A").is_some());
    assert!(err.contents().ends_with(":2:6: error: unknown identifier 'B'\n"));
    std::fs::remove_file(&path).unwrap();

    let missing = dir.join("analizi-missing-input.lean");
    let r = parse_commands_file(&mut env, &mut ios, missing, None, false);
    assert!(matches!(r, Err(Error::Io(_))));
}

#[test]
fn reintroduction() {
    let r = run("axiom A : Prop\naxiom A : Prop\naxiom B : Prop\n");
    assert!(!r.ok);
    assert!(r.env.get("B").is_some());
    assert_eq!(r.err, "test:2:0: error: already declared object 'A'\n");
}

#[test]
fn infix_precedence() {
    let src = "
infixl `+`:65 := add
infixl `*`:70 := mul
check x + y * z
check (x + y) * z
check x * y + z
check x + y + z
";
    let r = run(&(PRELUDE.to_string() + src));
    assert!(r.ok, "{}", r.err);
    let expected = "add x (mul y z)\nmul (add x y) z\nadd (mul x y) z\nadd (add x y) z\n";
    assert_eq!(r.out, expected);
}

#[test]
fn infixr_and_prefix() {
    let src = "
infixr `^`:75 := add
prefix `-`:100 := mul
postfix `!`:110 := mul
check x ^ y ^ z
check - x ^ y
check x !
";
    let r = run(&(PRELUDE.to_string() + src));
    assert!(r.ok, "{}", r.err);
    assert_eq!(r.out, "add x (add y z)\nadd (mul x) y\nmul x\n");
}

#[test]
fn mixfix() {
    let src = "
axiom ite : N
notation `if` c `then` t `else` e := ite c t e
notation a `∘`:60 b:60 := mul a b
check if x then y else z
check x ∘ y ∘ z
";
    let r = run(&(PRELUDE.to_string() + src));
    assert!(r.ok, "{}", r.err);
    assert_eq!(r.out, "ite x y z\nmul (mul x y) z\n");
}

#[test]
fn local_notation() {
    let src = "
section
local infixl `+`:65 := add
infixl `*`:70 := mul
check x + x
end
check x * x
check x + x
";
    let r = run(&(PRELUDE.to_string() + src));
    assert!(!r.ok);
    assert_eq!(r.out, "add x x\nmul x x\nx : N\n");
    assert_eq!(r.err, "test:15:8: error: command expected\n");
}

#[test]
fn max_arguments() {
    let src = "universe u
check Type.{max u}
check Type.{max u u}
check Type.{imax u}
check Type.{max}
check Type.{imax u u}
";
    let r = run(src);
    assert!(!r.ok);
    let msgs = [
        "test:2:12: error: invalid level expression, max must have at least two arguments",
        "test:4:12: error: invalid level expression, imax must have at least two arguments",
        "test:5:12: error: invalid level expression, max must have at least two arguments",
    ];
    assert_eq!(r.err.lines().collect::<Vec<_>>(), msgs);
    assert_eq!(r.out.lines().count(), 2);
}

#[test]
fn level_offsets() {
    let src = "check Type.{1000000}
axiom A : Prop
check Type.{1000+100}
check Type.{2+1}
";
    let r = run(src);
    assert!(!r.ok);
    assert!(r.env.get("A").is_some());
    let msgs = [
        "test:1:12: error: invalid level expression, offset exceeds 1024",
        "test:3:17: error: invalid level expression, offset exceeds 1024",
    ];
    assert_eq!(r.err.lines().collect::<Vec<_>>(), msgs);
    assert_eq!(r.out, "Type.{3} : Type.{4}\n");
}

#[test]
fn section_variables() {
    let src = "
axiom nat : Type.{1}
section
variable n : nat
definition f := n
definition g (m : nat) := m
end
";
    let r = run(src);
    assert!(r.ok, "{}", r.err);

    let b = |x: &str| Binder {
        name: Name::new(x),
        ty: c("nat"),
        info: BinderInfo::Explicit,
    };
    let f = r.env.get("f").unwrap();
    assert_eq!(f.kind, DeclKind::Definition);
    assert_eq!(f.ty, Expr::pi(b("n"), Expr::placeholder()));
    assert_eq!(f.value, Some(Expr::lambda(b("n"), Expr::var(0))));

    // `g` does not use `n`
    let g = r.env.get("g").unwrap();
    assert_eq!(g.value, Some(Expr::lambda(b("m"), Expr::var(0))));
}

#[test]
fn variables_outside_sections() {
    let r = run("variables (A : Type) (a : A)\ncheck a\n");
    assert!(r.ok, "{}", r.err);
    let a = r.env.get("a").unwrap();
    assert_eq!(a.kind, DeclKind::Axiom);
    let l = analizi::Level::Param(Name::new("l_1"));
    assert_eq!(a.ty, Expr::constant(Name::new("A"), vec![l]));
    assert_eq!(r.env.get("A").unwrap().univ_params, [Name::new("l_1")]);
}

#[test]
fn universe_params() {
    let src = "definition id.{u} {A : Type.{u}} (a : A) : A := a\ntheorem t : Prop := Prop\n";
    let r = run(src);
    assert!(r.ok, "{}", r.err);
    let id = r.env.get("id").unwrap();
    assert_eq!(id.univ_params, [Name::new("u")]);
    assert_eq!(id.ty.to_string(), "Π {A : Type.{u}}, A → A");
    assert_eq!(r.env.get("t").unwrap().kind, DeclKind::Theorem);
}

#[test]
fn sections() {
    let r = run("section s\nend t\nend s\nend\n");
    let msg = "test:2:0: error: invalid 'end', expected name 's'\n\
               test:4:0: error: invalid 'end', there is no open section\n";
    assert_eq!(r.err, msg);
}

#[test]
fn options() {
    let r = run("set_option verbose false\ncheck Prop\nprint \"hi\"\n");
    assert!(r.ok);
    assert_eq!(r.out, "");

    let r = run("set_option show_errors false\ncheck foo\n");
    assert!(!r.ok);
    assert_eq!(r.err, "");

    let mut ios = IoState::sink();
    let mut env = Environment::new();
    let src = "set_option verbose false";
    parse_commands(&mut env, &mut ios, src, "test", None, true).unwrap();
    assert_eq!(ios.options.get(VERBOSE), Some(&OptionValue::Bool(false)));
}

#[test]
fn eval_unfolds() {
    let src = "
axiom A : Prop
axiom a : A
definition k (x : A) (y : A) := x
definition b := a
eval k b a
print k
";
    let r = run(src);
    assert!(r.ok, "{}", r.err);
    let expected = "a\ndefinition k : A → A → _ := fun (x : A) (y : A), x\n";
    assert_eq!(r.out, expected);
}

#[test]
fn eval_diverges() {
    let src = "axiom A : Prop
eval (fun x : A, x x) (fun x : A, x x)
axiom B : Prop
";
    let r = run(src);
    assert!(!r.ok);
    assert!(r.env.get("B").is_some());
    let msg = "test:2:0: error: no weak head normal form found within 10000 steps\n";
    assert_eq!(r.err, msg);
}

/// Declares an axiom of type `Prop` named like the contents of a script,
/// and evaluates scripts to `Prop`.
struct Declare;

impl Scripting for Declare {
    fn run(&mut self, code: &str, env: &mut Environment, _: &mut IoState, _: Pos) -> Result<(), String> {
        use analizi::env::Decl;
        let decl = Decl::axiom(Name::new(code.trim()), Vec::new(), Expr::prop());
        env.add(decl).map_err(|e| e.to_string())
    }

    fn eval_expr(&mut self, _: &str, _: &Environment, _: Pos) -> Result<Expr, String> {
        Ok(Expr::prop())
    }
}

#[test]
fn scripts() {
    let src = "(* B *)\ncheck B\naxiom c : (* anything *)\n(* B *)\n";
    let mut script = Declare;
    let r = run_with(src, Some(&mut script));
    assert!(!r.ok);
    assert_eq!(r.out, "B : Prop\n");
    assert_eq!(r.env.get("c").unwrap().ty, Expr::prop());
    assert_eq!(r.err, "test:4:0: error: already declared object 'B'\n");

    let r = run("(* B *)\naxiom A : Prop\n");
    assert!(!r.ok && r.env.get("A").is_some());
}
