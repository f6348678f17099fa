use equation_roots::{
    bisection, compile, false_position, newton_raphson, scan_intervals,
    Method, Record, RootResult, SolverConfig, Tolerance, DEFAULT_SCAN_STEP,
};
use std::{error::Error, fmt::Display};

const USAGE: &str = "\
Usage:
    cli bisection <equation> <tolerance> <a> <b>
    cli false-position <equation> <tolerance> <a> <b>
    cli newton <equation> <tolerance> <x0>
    cli scan <equation> <min> <max> [step]";

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["bisection", equation, tolerance, a, b] => {
            let f = compile(equation)?;
            let config = SolverConfig::new(tolerance.parse()?);
            let run = bisection(&f, a.parse()?, b.parse()?, &config)?;
            print_table(Method::Bisection, run.records());
            print_result(run.result());
        },
        ["false-position", equation, tolerance, a, b] => {
            let f = compile(equation)?;
            let config = SolverConfig::new(tolerance.parse()?);
            let run = false_position(&f, a.parse()?, b.parse()?, &config)?;
            print_table(Method::FalsePosition, run.records());
            print_result(run.result());
        },
        ["newton", equation, tolerance, x0] => {
            let f = compile(equation)?;
            let derivative = f.derivative();
            println!("f'(x) = {}", derivative);

            let tolerance: Tolerance = tolerance.parse()?;
            let config = SolverConfig::new(tolerance);
            let run = newton_raphson(&f, &derivative, x0.parse()?, &config)?;
            print_table(Method::NewtonRaphson, run.records());
            print_result(run.result());
        },
        ["scan", equation, min, max, rest @ ..] => {
            let f = compile(equation)?;
            let step = match rest {
                [] => DEFAULT_SCAN_STEP,
                [step] => step.parse()?,
                _ => return usage(),
            };

            for interval in scan_intervals(&f, min.parse()?, max.parse()?, step)?
            {
                println!("{}", interval);
            }
        },
        _ => return usage(),
    }

    Ok(())
}

fn print_table<R: Record>(method: Method, records: &[R]) {
    println!("{}", join(method.columns()));

    for record in records {
        println!("{}", join(record.values().iter()));
    }
}

fn print_result(result: &RootResult) {
    println!();
    println!(
        "{}: root = {} after {} iterations ({:?}, error = {}, f(root) = {})",
        result.method,
        result.root,
        result.iterations,
        result.status,
        result.error,
        result.f_root
    );
}

fn join<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn usage() -> Result<(), Box<dyn Error>> {
    eprintln!("{}", USAGE);
    std::process::exit(1);
}
