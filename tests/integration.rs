use approx::{assert_abs_diff_eq, assert_relative_eq};
use equation_roots::{
    bisection, compile, false_position, newton_raphson, parse_tolerance,
    scan_intervals, CompileError, ErrorKind, Interval, Method, Record,
    SolveError, SolverConfig, Status, Tolerance, DEFAULT_SCAN_STEP,
};

fn config(tolerance: &str) -> SolverConfig {
    SolverConfig::new(tolerance.parse().unwrap())
}

#[test]
fn bisection_half_width_is_non_increasing_and_bounded() {
    let brackets = vec![
        ("x^2 - 4", 0.0, 3.0),
        ("cos(x) = x", 0.0, 1.0),
        ("x^3 - x - 2", 1.0, 2.0),
        ("exp(x) - 10", -3.0, 7.5),
        ("sin(x)", 2.0, 4.0),
    ];

    for tolerance in &[1e-3, 1e-6, 1e-10] {
        for &(src, a, b) in &brackets {
            let f = compile(src).unwrap();
            let config = SolverConfig::new(Tolerance::new(*tolerance).unwrap());

            let run = bisection(&f, a, b, &config).unwrap();

            let bound = ((b - a) / tolerance).log2().floor() as usize + 1;
            assert_eq!(run.result().status, Status::Converged, "{}", src);
            assert!(
                run.result().iterations <= bound,
                "{} took {} iterations, expected at most {}",
                src,
                run.result().iterations,
                bound
            );
            for pair in run.records().windows(2) {
                assert!(pair[1].error <= pair[0].error, "{}", src);
            }
        }
    }
}

#[test]
fn quadratic_has_roots_at_plus_and_minus_two() {
    let f = compile("x^2-4").unwrap();

    assert_abs_diff_eq!(f.evaluate(2.0), 0.0, epsilon = f64::EPSILON);
    assert_abs_diff_eq!(f.evaluate(-2.0), 0.0, epsilon = f64::EPSILON);
}

#[test]
fn both_sides_of_an_equation_become_a_difference() {
    let with_equals = compile("cos(x)=x").unwrap();
    let difference = compile("cos(x)-x").unwrap();

    for i in -100..=100 {
        let x = f64::from(i) * 0.137;
        assert_eq!(with_equals.evaluate(x), difference.evaluate(x), "x = {}", x);
    }
}

#[test]
fn tolerance_formats_agree() {
    let scientific = parse_tolerance("1e-4").unwrap();
    let decimal = parse_tolerance("0.0001").unwrap();

    assert_eq!(scientific, decimal);
    assert_eq!(decimal, 1e-4);
    assert_relative_eq!(parse_tolerance("1x10^-4").unwrap(), 1e-4);
    assert_relative_eq!(parse_tolerance("10^-4").unwrap(), 1e-4);
    assert_relative_eq!(parse_tolerance("10-4").unwrap(), 1e-4);
}

#[test]
fn bisect_a_quadratic() {
    let f = compile("x^2-4").unwrap();

    let run = bisection(&f, 0.0, 3.0, &config("1e-6")).unwrap();

    assert!(run.result().converged());
    assert_abs_diff_eq!(run.result().root, 2.0, epsilon = 1e-6);
    assert_eq!(run.columns(), Method::Bisection.columns());
}

#[test]
fn bisection_without_a_sign_change() {
    let f = compile("x^2-4").unwrap();

    let got = bisection(&f, 3.0, 5.0, &config("1e-6")).unwrap_err();

    assert_eq!(
        got,
        SolveError::NoSignChange {
            a: 3.0,
            b: 5.0,
            f_a: 5.0,
            f_b: 21.0
        }
    );
    assert_eq!(got.kind(), ErrorKind::Precondition);
}

#[test]
fn newton_converges_quadratically_to_root_two() {
    let f = compile("x^2-2").unwrap();
    let derivative = f.derivative();

    let run = newton_raphson(&f, &derivative, 1.0, &config("1e-10")).unwrap();

    assert!(run.result().converged());
    assert_relative_eq!(run.result().root, 1.41421356, max_relative = 1e-8);
    assert!((4..=6).contains(&run.result().iterations));

    let errors: Vec<f64> = run.records().iter().map(|r| r.error).collect();
    for pair in errors.windows(2).take(3) {
        let c = pair[1] / (pair[0] * pair[0]);
        assert!(0.2 < c && c < 0.5, "errors: {:?}", errors);
    }
}

#[test]
fn scanning_sine_finds_sign_changes_but_not_every_root() {
    let f = compile("sin(x)").unwrap();

    let intervals =
        scan_intervals(&f, -10.0, 10.0, DEFAULT_SCAN_STEP).unwrap();

    // sin has a root at every multiple of pi in [-10, 10]
    let roots: Vec<f64> =
        (-3..=3).map(|k| f64::from(k) * std::f64::consts::PI).collect();
    for interval in &intervals {
        assert_eq!(interval.width(), 1.0);
        assert_eq!(
            roots.iter().filter(|&&r| interval.contains(r)).count(),
            1,
            "{}",
            interval
        );
    }
    for root in roots.iter().filter(|r| **r != 0.0) {
        assert!(
            intervals.iter().any(|i| i.contains(*root)),
            "nothing brackets {}",
            root
        );
    }

    // x = 0 is sampled exactly, so no sign change is seen around it
    assert_eq!(intervals.len(), roots.len() - 1);
    assert!(!intervals.iter().any(|i| i.contains(0.0)));
}

#[test]
fn every_scanned_interval_is_a_valid_bracket() {
    let f = compile("x^3 - 6*x^2 + 11*x - 6.5").unwrap();

    let intervals = scan_intervals(&f, -1.0, 5.0, 0.25).unwrap();
    assert!(!intervals.is_empty());

    for Interval { lo, hi } in intervals {
        let run = false_position(&f, lo, hi, &config("1e-9")).unwrap();
        assert!(run.result().converged());
        assert!(lo <= run.result().root && run.result().root <= hi);
    }
}

#[test]
fn oscillating_newton_hits_the_iteration_cap() {
    let f = compile("x^3 - 2*x + 2").unwrap();
    let derivative = f.derivative();
    let config = config("1e-6").with_max_iterations(40);

    let run = newton_raphson(&f, &derivative, 0.0, &config).unwrap();

    assert_eq!(run.result().status, Status::MaxIterationsReached);
    assert_eq!(run.records().len(), 40);
    assert_eq!(run.records().last().unwrap().index(), 40);
}

#[test]
fn rows_line_up_with_columns() {
    let f = compile("x^3 - x - 2").unwrap();
    let derivative = f.derivative();

    let bisected = bisection(&f, 1.0, 2.0, &config("1e-4")).unwrap();
    let regula_falsi = false_position(&f, 1.0, 2.0, &config("1e-4")).unwrap();
    let newton = newton_raphson(&f, &derivative, 1.5, &config("1e-4")).unwrap();

    for row in bisected.rows() {
        assert_eq!(row.len(), bisected.columns().len());
    }
    for row in regula_falsi.rows() {
        assert_eq!(row.len(), regula_falsi.columns().len());
    }
    for (i, row) in newton.rows().enumerate() {
        assert_eq!(row.len(), newton.columns().len());
        assert_eq!(row[0], (i + 1) as f64);
    }
    assert_eq!(regula_falsi.columns()[7], "|f(c)|");
    assert_eq!(newton.columns()[5], "|x_new - x|");
}

#[test]
fn compile_errors_are_parse_errors() {
    let inputs = vec!["", "x = 1 = 2", "2 +* x", "foo(x)", "y + 1"];

    for src in inputs {
        let got: CompileError = compile(src).unwrap_err();

        assert_eq!(got.kind(), ErrorKind::Parse, "{:?}", src);
        assert!(!got.to_string().is_empty());
    }
}

#[test]
fn undefined_bracket_end_is_reported() {
    let f = compile("log(x) + 1").unwrap();

    let got = bisection(&f, -1.0, 1.0, &config("1e-6")).unwrap_err();

    assert_eq!(
        got.to_string(),
        SolveError::NumericDomain {
            x: -1.0,
            value: f64::NAN
        }
        .to_string()
    );
    assert_eq!(got.kind(), ErrorKind::NumericDomain);
}

#[test]
fn a_pole_at_the_midpoint_is_reported() {
    // both ends are defined, but the first midpoint is x = 0
    let f = compile("1/x").unwrap();

    let got = bisection(&f, -1.0, 1.0, &config("1e-6")).unwrap_err();

    assert!(
        matches!(got, SolveError::NumericDomain { x, .. } if x == 0.0),
        "{:?}",
        got
    );
    assert_eq!(got.kind(), ErrorKind::NumericDomain);
}

#[test]
fn every_method_returns_its_best_estimate_at_the_cap() {
    let f = compile("exp(x) - 2").unwrap();
    let derivative = f.derivative();
    let config = config("1e-15").with_max_iterations(3);

    let bisected = bisection(&f, 0.0, 3.0, &config).unwrap();
    let regula_falsi = false_position(&f, 0.0, 3.0, &config).unwrap();
    let newton = newton_raphson(&f, &derivative, 3.0, &config).unwrap();

    for result in &[bisected.result(), regula_falsi.result(), newton.result()]
    {
        assert_eq!(result.status, Status::MaxIterationsReached);
        assert_eq!(result.iterations, 3);
        assert!(result.root.is_finite());
    }
    assert_eq!(regula_falsi.result().root, regula_falsi.records()[2].c);
}
