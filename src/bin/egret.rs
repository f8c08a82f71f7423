//! Thin CLI wrapper over [`egret::run_engine`]: parses positional
//! `regex`/`base_substring` arguments plus the four mode flags and prints the
//! returned lines, one per line, matching the original tool's console output.

use std::process::ExitCode;

use egret::run_engine;

struct Args {
    regex: String,
    base_substring: String,
    check_mode: bool,
    web_mode: bool,
    debug_mode: bool,
    stat_mode: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut check_mode = false;
    let mut web_mode = false;
    let mut debug_mode = false;
    let mut stat_mode = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--check" => check_mode = true,
            "--web" => web_mode = true,
            "--debug" => debug_mode = true,
            "--stat" => stat_mode = true,
            other => positional.push(other.to_string()),
        }
    }

    if positional.len() != 2 {
        return Err("usage: egret <regex> <base_substring> [--check] [--web] [--debug] [--stat]".to_string());
    }
    let mut it = positional.into_iter();
    Ok(Args {
        regex: it.next().unwrap_or_default(),
        base_substring: it.next().unwrap_or_default(),
        check_mode,
        web_mode,
        debug_mode,
        stat_mode,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run_engine(
        &args.regex,
        &args.base_substring,
        args.check_mode,
        args.web_mode,
        args.debug_mode,
        args.stat_mode,
    ) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
